//! Genomic search window around a variant breakpoint.

/// Flanking distance searched on each side of the breakpoint, in bases.
pub const WINDOW_FLANK: u32 = 1000;

/// A closed reference interval searched for supporting evidence.
///
/// Invariant: `1 <= start <= end <= contig_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicWindow {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
}

impl GenomicWindow {
    /// Derive the window around a 0-based breakpoint position, clamped to
    /// `[1, contig_len]`. A `contig_len` of `None` leaves the upper end
    /// unclamped (contig length unknown).
    pub fn around(chrom: &str, pos: u32, contig_len: Option<u32>) -> Self {
        let start = if pos > WINDOW_FLANK { pos - WINDOW_FLANK } else { 1 };
        let end = match contig_len {
            Some(len) if pos + WINDOW_FLANK > len => len,
            _ => pos + WINDOW_FLANK,
        };
        GenomicWindow {
            chrom: chrom.to_string(),
            start,
            end: end.max(start),
        }
    }

    /// Inclusive membership test.
    pub fn contains(&self, pos: u32) -> bool {
        pos >= self.start && pos <= self.end
    }

    /// Region string for indexed queries, e.g. `chr1:4000-6000`.
    pub fn region_string(&self) -> String {
        format!("{}:{}-{}", self.chrom, self.start, self.end)
    }
}
