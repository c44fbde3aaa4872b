//! Insertion evidence extraction and consensus orchestration.
//!
//! For one insertion-type variant call, scans the reads overlapping a window
//! around the breakpoint for CIGAR insertion operations of a compatible size,
//! keeps the best-supporting sub-sequence per read, and collapses the pool to
//! a single consensus sequence.

use anyhow::Result;
use log::warn;

use crate::input::{AlignmentInput, AlignmentRecord};
use crate::utils::align::AlignScoring;
use crate::var::cigar::CigarWalker;
use crate::var::consensus::consensus_of;
use crate::var::window::GenomicWindow;

/// Smallest insertion operation considered SV-scale, in bases.
pub const MIN_SV_SIZE: usize = 30;
/// Accepted band for op length relative to the variant's reported size.
/// Guards against matching an unrelated, wrongly-sized insertion nearby.
pub const SIZE_RATIO_MIN: f64 = 0.75;
pub const SIZE_RATIO_MAX: f64 = 1.33;

/// One insertion-type variant call, immutable after construction.
#[derive(Debug, Clone)]
pub struct InsertionVariant {
    pub id: String,
    pub chrom: String,
    /// 0-based breakpoint position.
    pub pos: u32,
    /// Reported signed SVLEN; zero means the size is unusable.
    pub size: i64,
    /// Read names the caller reported as supporting. Informational only —
    /// evidence is re-collected from the alignments, not matched by name.
    pub qnames: Vec<String>,
    pub window: GenomicWindow,
}

impl InsertionVariant {
    pub fn new(
        id: &str,
        chrom: &str,
        pos: u32,
        size: i64,
        qnames: Vec<String>,
        contig_len: Option<u32>,
    ) -> Self {
        InsertionVariant {
            id: id.to_string(),
            chrom: chrom.to_string(),
            pos,
            size,
            qnames,
            window: GenomicWindow::around(chrom, pos, contig_len),
        }
    }
}

/// An extracted insertion sub-sequence from one read.
#[derive(Debug, Clone)]
pub struct InsertionCandidate {
    /// `variant_id/read_name/chrom/ref_pos/query_start`
    pub name: String,
    /// Reference position right after the insertion operation.
    pub ref_pos: u32,
    /// Offset of the inserted bases in the read's query sequence.
    pub query_start: usize,
    pub sequence: Vec<u8>,
}

/// All qualifying insertion sub-sequences of one read: long enough, inside
/// the window, and within the size-ratio band of the reported SVLEN.
pub fn extract_candidates(
    var: &InsertionVariant,
    rec: &AlignmentRecord,
) -> Vec<InsertionCandidate> {
    if var.size == 0 {
        return Vec::new();
    }
    let reported = var.size.unsigned_abs() as f64;

    let mut out = Vec::new();
    for ev in CigarWalker::new(rec.pos, rec.cigar_ops()) {
        if ev.len < MIN_SV_SIZE {
            continue;
        }
        if !var.window.contains(ev.ref_pos) {
            continue;
        }
        let ratio = ev.len as f64 / reported;
        if !(SIZE_RATIO_MIN..=SIZE_RATIO_MAX).contains(&ratio) {
            continue;
        }
        if ev.query_end > rec.sequence().len() {
            // CIGAR runs past the stored sequence; nothing to extract
            continue;
        }
        let start = ev.query_end - ev.len;
        out.push(InsertionCandidate {
            name: format!(
                "{}/{}/{}/{}/{}",
                var.id,
                rec.name().unwrap_or("*"),
                var.window.chrom,
                ev.ref_pos,
                start
            ),
            ref_pos: ev.ref_pos,
            query_start: start,
            sequence: rec.sequence()[start..ev.query_end].to_vec(),
        });
    }
    out
}

/// The candidate closest to the breakpoint; ties keep the first encountered.
pub fn select_closest(
    candidates: Vec<InsertionCandidate>,
    pos: u32,
) -> Option<InsertionCandidate> {
    let mut best: Option<(u32, InsertionCandidate)> = None;
    for cand in candidates {
        let dist = cand.ref_pos.abs_diff(pos);
        match &best {
            Some((best_dist, _)) if dist >= *best_dist => {}
            _ => best = Some((dist, cand)),
        }
    }
    best.map(|(_, cand)| cand)
}

/// One read's winning candidate, or `None` if it has no qualifying insertion.
pub fn best_supporting_candidate(
    var: &InsertionVariant,
    rec: &AlignmentRecord,
) -> Option<InsertionCandidate> {
    select_closest(extract_candidates(var, rec), var.pos)
}

/// Pool the per-read winners from a record stream. An empty pool is not an
/// error; it is logged and the variant ends up with an empty consensus.
pub fn collect_candidates<I>(var: &InsertionVariant, records: I) -> Result<Vec<InsertionCandidate>>
where
    I: IntoIterator<Item = Result<AlignmentRecord>>,
{
    let mut pool = Vec::new();
    for result in records {
        let rec = result?;
        if let Some(cand) = best_supporting_candidate(var, &rec) {
            pool.push(cand);
        }
    }
    if pool.is_empty() {
        warn!(
            "no supporting insertion sequence found for variant {}",
            var.id
        );
    }
    Ok(pool)
}

/// Indexed-query front end of [`collect_candidates`].
pub fn collect_supporting_sequences(
    bam: &mut AlignmentInput,
    var: &InsertionVariant,
) -> Result<Vec<InsertionCandidate>> {
    let records = bam.query(&var.window.region_string())?;
    collect_candidates(var, records)
}

/// Recovered consensus for one variant. An empty sequence means no supporting
/// evidence was found and the variant must produce no output.
#[derive(Debug, Clone)]
pub struct InsertionConsensus {
    pub id: String,
    pub sequence: Vec<u8>,
}

impl InsertionConsensus {
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Full recovery for one variant: evidence collection, then consensus.
pub fn recover_insertion(
    bam: &mut AlignmentInput,
    var: &InsertionVariant,
) -> Result<InsertionConsensus> {
    let pool = collect_supporting_sequences(bam, var)?;
    let sequences: Vec<Vec<u8>> = pool.into_iter().map(|c| c.sequence).collect();
    Ok(InsertionConsensus {
        id: var.id.clone(),
        sequence: consensus_of(&sequences, &AlignScoring::default()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::CigarKind;

    fn variant(size: i64) -> InsertionVariant {
        InsertionVariant::new("ins1", "chr1", 5000, size, Vec::new(), Some(20000))
    }

    fn read(name: &str, pos: u32, cigar: Vec<(CigarKind, usize)>, seq: Vec<u8>) -> AlignmentRecord {
        AlignmentRecord {
            name: Some(name.to_string()),
            pos,
            seq,
            cigar,
        }
    }

    /// 210M 100I 140M starting at ref 4800: insertion lands at ref 5010,
    /// query offsets [210, 310).
    fn supporting_read(name: &str) -> (AlignmentRecord, Vec<u8>) {
        let inserted: Vec<u8> = b"ACGT".iter().cycle().take(100).copied().collect();
        let mut seq = vec![b'A'; 210];
        seq.extend_from_slice(&inserted);
        seq.extend(vec![b'T'; 140]);
        let rec = read(
            name,
            4800,
            vec![
                (CigarKind::Match, 210),
                (CigarKind::Insertion, 100),
                (CigarKind::Match, 140),
            ],
            seq,
        );
        (rec, inserted)
    }

    #[test]
    fn test_extract_exact_substring() {
        let var = variant(100);
        let (rec, inserted) = supporting_read("read1");
        let cands = extract_candidates(&var, &rec);
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].sequence, inserted);
        assert_eq!(cands[0].ref_pos, 5010);
        assert_eq!(cands[0].query_start, 210);
        assert_eq!(cands[0].name, "ins1/read1/chr1/5010/210");
    }

    #[test]
    fn test_extract_rejects_short_insertion() {
        let var = variant(30);
        let rec = read(
            "r",
            4900,
            vec![
                (CigarKind::Match, 50),
                (CigarKind::Insertion, 29),
                (CigarKind::Match, 50),
            ],
            vec![b'A'; 129],
        );
        assert!(extract_candidates(&var, &rec).is_empty());
    }

    #[test]
    fn test_extract_rejects_outside_window() {
        let var = variant(100);
        // Insertion at ref 2100, window is [4000, 6000]
        let rec = read(
            "r",
            2000,
            vec![
                (CigarKind::Match, 100),
                (CigarKind::Insertion, 100),
                (CigarKind::Match, 100),
            ],
            vec![b'A'; 300],
        );
        assert!(extract_candidates(&var, &rec).is_empty());
    }

    #[test]
    fn test_extract_ratio_band() {
        let case = |op_len: usize, reported: i64| {
            let var = variant(reported);
            let rec = read(
                "r",
                4900,
                vec![
                    (CigarKind::Match, 50),
                    (CigarKind::Insertion, op_len),
                    (CigarKind::Match, 50),
                ],
                vec![b'C'; 100 + op_len],
            );
            extract_candidates(&var, &rec).len()
        };
        assert_eq!(case(74, 100), 0); // 0.74 < 0.75
        assert_eq!(case(75, 100), 1); // boundaries are inclusive
        assert_eq!(case(133, 100), 1);
        assert_eq!(case(134, 100), 0); // 1.34 > 1.33
        assert_eq!(case(200, 100), 0);
    }

    #[test]
    fn test_zero_or_negative_reported_size() {
        let (rec, _) = supporting_read("read1");
        assert!(extract_candidates(&variant(0), &rec).is_empty());
        // Deletions carry negative SVLEN; an INS record should not, but the
        // magnitude is what the band is measured against
        assert_eq!(extract_candidates(&variant(-100), &rec).len(), 1);
    }

    #[test]
    fn test_select_closest_to_breakpoint() {
        let cand = |ref_pos: u32| InsertionCandidate {
            name: format!("c{}", ref_pos),
            ref_pos,
            query_start: 0,
            sequence: b"A".to_vec(),
        };
        let best = select_closest(vec![cand(5040), cand(5010), cand(4800)], 5000).unwrap();
        assert_eq!(best.ref_pos, 5010);

        // Equidistant: first encountered wins
        let best = select_closest(vec![cand(4990), cand(5010)], 5000).unwrap();
        assert_eq!(best.ref_pos, 4990);

        assert!(select_closest(Vec::new(), 5000).is_none());
    }

    #[test]
    fn test_best_candidate_among_multiple_insertions() {
        let var = variant(100);
        // Two qualifying insertions, the second one closer to pos 5000
        let mut seq = vec![b'A'; 50];
        seq.extend(vec![b'G'; 90]);
        seq.extend(vec![b'A'; 300]);
        seq.extend(vec![b'C'; 100]);
        seq.extend(vec![b'A'; 50]);
        let rec = read(
            "r",
            4500,
            vec![
                (CigarKind::Match, 50),
                (CigarKind::Insertion, 90), // ref 4550
                (CigarKind::Match, 300),
                (CigarKind::Insertion, 100), // ref 4850
                (CigarKind::Match, 50),
            ],
            seq,
        );
        let best = best_supporting_candidate(&var, &rec).unwrap();
        assert_eq!(best.ref_pos, 4850);
        assert_eq!(best.sequence, vec![b'C'; 100]);
    }

    #[test]
    fn test_collect_pool_skips_non_supporting_reads() {
        let var = variant(100);
        let (good1, _) = supporting_read("read1");
        let (good2, _) = supporting_read("read2");
        let plain = read("read3", 4500, vec![(CigarKind::Match, 1000)], vec![b'A'; 1000]);

        let records = vec![Ok(good1), Ok(plain), Ok(good2)];
        let pool = collect_candidates(&var, records).unwrap();
        assert_eq!(pool.len(), 2);
        assert!(pool[0].name.starts_with("ins1/read1/"));
        assert!(pool[1].name.starts_with("ins1/read2/"));
    }

    #[test]
    fn test_end_to_end_single_read() {
        let var = variant(100);
        assert_eq!(var.window.start, 4000);
        assert_eq!(var.window.end, 6000);

        let (rec, inserted) = supporting_read("read1");
        let pool = collect_candidates(&var, vec![Ok(rec)]).unwrap();
        let sequences: Vec<Vec<u8>> = pool.into_iter().map(|c| c.sequence).collect();
        let consensus = consensus_of(&sequences, &AlignScoring::default());
        assert_eq!(consensus, inserted);
    }

    #[test]
    fn test_end_to_end_no_evidence() {
        let var = variant(100);
        let plain = read("read1", 4500, vec![(CigarKind::Match, 1000)], vec![b'A'; 1000]);
        let pool = collect_candidates(&var, vec![Ok(plain)]).unwrap();
        assert!(pool.is_empty());
        let sequences: Vec<Vec<u8>> = pool.into_iter().map(|c| c.sequence).collect();
        assert!(consensus_of(&sequences, &AlignScoring::default()).is_empty());
    }
}
