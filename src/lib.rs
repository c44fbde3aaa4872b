//! svinseq — insertion sequence recovery for structural variant calls.
//!
//! Given a VCF of structural variant calls and a sorted, indexed BAM of the
//! aligned reads that produced them, recovers the actual inserted sequence for
//! each insertion-type variant: reads overlapping a window around the
//! breakpoint are scanned for CIGAR insertions of a compatible size, the best
//! supporting sub-sequence per read is pooled, and the pool is collapsed to a
//! single consensus emitted as FASTA.

pub mod input;
pub mod output;
pub mod utils;
pub mod var;
pub mod vcf;
