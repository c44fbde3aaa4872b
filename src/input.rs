//! Indexed BAM input via noodles.

use std::fs::File;

use anyhow::Result;

use noodles::bam;
use noodles::bgzf;
use noodles::core::Region;
use noodles::sam;

pub use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;

/// One decoded alignment record, reduced to what insertion extraction needs.
#[derive(Debug, Clone)]
pub struct AlignmentRecord {
    /// Read name, if present.
    pub name: Option<String>,
    /// 0-based alignment start on the reference.
    pub pos: u32,
    /// Full decoded query sequence (ASCII bases).
    pub seq: Vec<u8>,
    /// Decoded CIGAR as (kind, length) pairs.
    pub cigar: Vec<(CigarKind, usize)>,
}

impl AlignmentRecord {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn sequence(&self) -> &[u8] {
        &self.seq
    }

    pub fn cigar_ops(&self) -> &[(CigarKind, usize)] {
        &self.cigar
    }
}

/// Decode a noodles BAM record, skipping unmapped records (no start position).
fn decode_bam_record(rec: &bam::Record) -> Result<Option<AlignmentRecord>> {
    let name = rec
        .name()
        .map(|n| String::from_utf8_lossy(n.as_ref()).to_string());

    let pos = match rec.alignment_start() {
        Some(Ok(p)) => (p.get() - 1) as u32, // 1-based to 0-based
        Some(Err(e)) => return Err(e.into()),
        None => return Ok(None),
    };

    let seq: Vec<u8> = rec.sequence().iter().collect();

    let mut cigar = Vec::new();
    for op_result in rec.cigar().iter() {
        let op = op_result?;
        cigar.push((op.kind(), op.len()));
    }

    Ok(Some(AlignmentRecord {
        name,
        pos,
        seq,
        cigar,
    }))
}

/// Indexed alignment input over a coordinate-sorted BAM.
///
/// The index is required: region queries are the only access pattern, so a
/// missing index is an open-time error rather than a degraded mode.
pub struct AlignmentInput {
    reader: bam::io::IndexedReader<bgzf::Reader<File>>,
    header: sam::Header,
}

impl AlignmentInput {
    /// Open a BAM file together with its index.
    pub fn open(path: &str) -> Result<Self> {
        let mut reader = bam::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to open BAM {} with its index: {}. \
                     Create an index with 'samtools index {}'.",
                    path,
                    e,
                    path
                )
            })?;
        let header = reader.read_header()?;
        Ok(AlignmentInput { reader, header })
    }

    /// Length of a reference sequence from the BAM header, if known.
    pub fn reference_length(&self, name: &str) -> Option<u32> {
        self.header
            .reference_sequences()
            .get(name.as_bytes())
            .map(|map| map.length().get() as u32)
    }

    /// Query mapped records overlapping a region string like `chr1:4000-6000`.
    pub fn query(&mut self, region: &str) -> Result<RegionIterator> {
        let parsed_region: Region = region
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid region '{}': {}", region, e))?;

        let header = &self.header;
        let mut records = Vec::new();
        for result in self.reader.query(header, &parsed_region)? {
            let rec = result?;
            if let Some(decoded) = decode_bam_record(&rec)? {
                records.push(decoded);
            }
        }
        Ok(RegionIterator { records, index: 0 })
    }
}

/// Iterator over decoded alignment records in a genomic region.
pub struct RegionIterator {
    records: Vec<AlignmentRecord>,
    index: usize,
}

impl Iterator for RegionIterator {
    type Item = Result<AlignmentRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index < self.records.len() {
            let rec = self.records[self.index].clone();
            self.index += 1;
            Some(Ok(rec))
        } else {
            None
        }
    }
}
