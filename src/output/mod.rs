//! FASTA output for recovered insertion sequences.
//!
//! Sequence records go to one sink (stdout or a file); diagnostics go to the
//! log and are never interleaved with sequence output.

use std::io::{self, Write};

/// Writes `>id` / sequence pairs. The sequence is kept on a single line so a
/// variant's consensus is always exactly two lines of output.
pub struct FastaWriter<W: Write> {
    inner: W,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(inner: W) -> Self {
        FastaWriter { inner }
    }

    pub fn write_record(&mut self, id: &str, sequence: &[u8]) -> io::Result<()> {
        writeln!(self.inner, ">{}", id)?;
        self.inner.write_all(sequence)?;
        self.inner.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
