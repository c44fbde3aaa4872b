//! Consensus building over supporting insertion sequences.
//!
//! Sequences are folded into a running multiple alignment one at a time: the
//! first sequence seeds the alignment, each subsequent one is globally aligned
//! against the current column profile and spliced in, and the consensus is the
//! plurality base per column. The exact consensus can depend on fold-in order
//! under indel ambiguity; callers feed sequences in a fixed order.

use crate::utils::align::{global_align, AlignOp, AlignScoring};

const GAP: u8 = b'-';

/// Narrow interface to a consensus capability: feed sequences one at a time,
/// then emit a single representative sequence.
pub trait ConsensusEngine {
    fn add_sequence(&mut self, seq: &[u8]);
    fn consensus(&self) -> Vec<u8>;
}

/// Progressive profile-alignment consensus engine.
pub struct ProgressiveMsa {
    scoring: AlignScoring,
    /// Equal-length rows over the alignment columns, `-` for gaps.
    rows: Vec<Vec<u8>>,
}

impl ProgressiveMsa {
    pub fn new(scoring: AlignScoring) -> Self {
        ProgressiveMsa {
            scoring,
            rows: Vec::new(),
        }
    }

    /// Plurality non-gap base per column. Every column holds at least one
    /// non-gap base by construction.
    fn profile(&self) -> Vec<u8> {
        let ncols = self.rows.first().map_or(0, |r| r.len());
        let mut profile = Vec::with_capacity(ncols);
        for c in 0..ncols {
            let mut counts = [0u32; 256];
            for row in &self.rows {
                if row[c] != GAP {
                    counts[row[c] as usize] += 1;
                }
            }
            let mut best = 0usize;
            for b in 1..256 {
                if counts[b] > counts[best] {
                    best = b;
                }
            }
            profile.push(best as u8);
        }
        profile
    }
}

impl ConsensusEngine for ProgressiveMsa {
    fn add_sequence(&mut self, seq: &[u8]) {
        if self.rows.is_empty() {
            self.rows.push(seq.to_vec());
            return;
        }

        let template = self.profile();
        let aln = global_align(&template, seq, &self.scoring);

        // Re-emit every column in order, opening new columns where the query
        // has bases the profile lacks.
        let n_old = self.rows.len();
        let mut out: Vec<Vec<u8>> = vec![Vec::new(); n_old + 1];
        let mut t = 0;
        let mut q = 0;
        for &(op, len) in &aln.ops {
            for _ in 0..len {
                match op {
                    AlignOp::Align => {
                        for (r, row) in self.rows.iter().enumerate() {
                            out[r].push(row[t]);
                        }
                        out[n_old].push(seq[q]);
                        t += 1;
                        q += 1;
                    }
                    AlignOp::GapInQuery => {
                        for (r, row) in self.rows.iter().enumerate() {
                            out[r].push(row[t]);
                        }
                        out[n_old].push(GAP);
                        t += 1;
                    }
                    AlignOp::GapInTemplate => {
                        for out_row in out.iter_mut().take(n_old) {
                            out_row.push(GAP);
                        }
                        out[n_old].push(seq[q]);
                        q += 1;
                    }
                }
            }
        }
        self.rows = out;
    }

    fn consensus(&self) -> Vec<u8> {
        let ncols = self.rows.first().map_or(0, |r| r.len());
        let mut out = Vec::with_capacity(ncols);
        for c in 0..ncols {
            let mut counts = [0u32; 256];
            let mut n_base = 0u32;
            let mut n_gap = 0u32;
            for row in &self.rows {
                let b = row[c];
                if b == GAP {
                    n_gap += 1;
                } else {
                    counts[b as usize] += 1;
                    n_base += 1;
                }
            }
            // Columns where gaps outnumber bases are deletions from the consensus
            if n_gap > n_base {
                continue;
            }
            let mut best = 0usize;
            for b in 1..256 {
                if counts[b] > counts[best] {
                    best = b;
                }
            }
            out.push(best as u8);
        }
        out
    }
}

/// Collapse a pool of supporting sequences to one consensus.
///
/// Zero sequences produce an empty consensus; a single sequence is passed
/// through verbatim; two or more go through the progressive alignment.
pub fn consensus_of(sequences: &[Vec<u8>], scoring: &AlignScoring) -> Vec<u8> {
    match sequences {
        [] => Vec::new(),
        [only] => only.clone(),
        _ => {
            let mut msa = ProgressiveMsa::new(scoring.clone());
            for seq in sequences {
                msa.add_sequence(seq);
            }
            msa.consensus()
        }
    }
}
