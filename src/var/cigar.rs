//! CIGAR operation predicates and insertion-event scanning.

use crate::input::CigarKind;

/// Whether an op kind consumes reference bases (M/D/N/=/X).
pub fn consumes_reference(kind: CigarKind) -> bool {
    matches!(
        kind,
        CigarKind::Match
            | CigarKind::Deletion
            | CigarKind::Skip
            | CigarKind::SequenceMatch
            | CigarKind::SequenceMismatch
    )
}

/// Whether an op kind consumes query bases (M/I/S/=/X).
pub fn consumes_query(kind: CigarKind) -> bool {
    matches!(
        kind,
        CigarKind::Match
            | CigarKind::Insertion
            | CigarKind::SoftClip
            | CigarKind::SequenceMatch
            | CigarKind::SequenceMismatch
    )
}

/// One insertion operation found while walking a read's CIGAR.
///
/// `ref_pos` is the reference position immediately *after* the insertion and
/// `query_end` the query offset immediately after it, so the inserted bases
/// occupy `query_end - len .. query_end` of the query sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionEvent {
    pub ref_pos: u32,
    pub query_end: usize,
    pub len: usize,
}

/// Iterator over the insertion operations of one alignment.
///
/// Both counters are advanced for an op before the op is inspected, so the
/// position attributed to an insertion is the one right after it. Insertions
/// consume query but not reference.
pub struct CigarWalker<'a> {
    ops: std::slice::Iter<'a, (CigarKind, usize)>,
    ref_pos: u32,
    query_pos: usize,
}

impl<'a> CigarWalker<'a> {
    pub fn new(alignment_start: u32, ops: &'a [(CigarKind, usize)]) -> Self {
        CigarWalker {
            ops: ops.iter(),
            ref_pos: alignment_start,
            query_pos: 0,
        }
    }
}

impl Iterator for CigarWalker<'_> {
    type Item = InsertionEvent;

    fn next(&mut self) -> Option<InsertionEvent> {
        for &(kind, len) in self.ops.by_ref() {
            if consumes_reference(kind) {
                self.ref_pos += len as u32;
            }
            if consumes_query(kind) {
                self.query_pos += len;
            }
            if kind == CigarKind::Insertion {
                return Some(InsertionEvent {
                    ref_pos: self.ref_pos,
                    query_end: self.query_pos,
                    len,
                });
            }
        }
        None
    }
}
