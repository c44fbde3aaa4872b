pub mod cigar;
pub mod consensus;
pub mod insertion;
pub mod window;
