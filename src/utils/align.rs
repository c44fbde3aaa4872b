//! Global pairwise sequence alignment with linear gap cost.

/// Alignment scoring parameters (linear gap model).
#[derive(Debug, Clone)]
pub struct AlignScoring {
    pub match_score: i32,
    pub mismatch_score: i32,
    pub gap_score: i32,
}

impl Default for AlignScoring {
    fn default() -> Self {
        Self {
            match_score: 5,
            mismatch_score: -4,
            gap_score: -8,
        }
    }
}

/// A single alignment operation between a template and a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignOp {
    /// One template base paired with one query base (match or mismatch)
    Align,
    /// Template base with no query counterpart
    GapInQuery,
    /// Query base with no template counterpart
    GapInTemplate,
}

/// Result of a global alignment.
pub struct Alignment {
    pub score: i32,
    /// Run-length encoded operations, template-order.
    pub ops: Vec<(AlignOp, usize)>,
}

// Traceback codes
const TB_ALIGN: u8 = 0;
const TB_UP: u8 = 1; // gap in query, consumes template
const TB_LEFT: u8 = 2; // gap in template, consumes query

/// End-to-end Needleman-Wunsch over byte sequences, case-insensitive on bases.
pub fn global_align(template: &[u8], query: &[u8], scoring: &AlignScoring) -> Alignment {
    let n = template.len();
    let m = query.len();
    let cols = m + 1;

    let mut score = vec![0i32; (n + 1) * cols];
    let mut trace = vec![TB_ALIGN; (n + 1) * cols];

    for j in 1..=m {
        score[j] = j as i32 * scoring.gap_score;
        trace[j] = TB_LEFT;
    }
    for i in 1..=n {
        score[i * cols] = i as i32 * scoring.gap_score;
        trace[i * cols] = TB_UP;
    }

    for i in 1..=n {
        for j in 1..=m {
            let s = if template[i - 1].eq_ignore_ascii_case(&query[j - 1]) {
                scoring.match_score
            } else {
                scoring.mismatch_score
            };
            let diag = score[(i - 1) * cols + (j - 1)] + s;
            let up = score[(i - 1) * cols + j] + scoring.gap_score;
            let left = score[i * cols + (j - 1)] + scoring.gap_score;

            let idx = i * cols + j;
            if diag >= up && diag >= left {
                score[idx] = diag;
                trace[idx] = TB_ALIGN;
            } else if up >= left {
                score[idx] = up;
                trace[idx] = TB_UP;
            } else {
                score[idx] = left;
                trace[idx] = TB_LEFT;
            }
        }
    }

    // Traceback from the bottom-right corner, then reverse
    let mut ops: Vec<(AlignOp, usize)> = Vec::new();
    let mut push = |ops: &mut Vec<(AlignOp, usize)>, op: AlignOp| {
        if let Some(last) = ops.last_mut() {
            if last.0 == op {
                last.1 += 1;
                return;
            }
        }
        ops.push((op, 1));
    };

    let mut i = n;
    let mut j = m;
    while i > 0 || j > 0 {
        let op = if i == 0 {
            TB_LEFT
        } else if j == 0 {
            TB_UP
        } else {
            trace[i * cols + j]
        };
        match op {
            TB_ALIGN => {
                push(&mut ops, AlignOp::Align);
                i -= 1;
                j -= 1;
            }
            TB_UP => {
                push(&mut ops, AlignOp::GapInQuery);
                i -= 1;
            }
            _ => {
                push(&mut ops, AlignOp::GapInTemplate);
                j -= 1;
            }
        }
    }
    ops.reverse();

    Alignment {
        score: score[n * cols + m],
        ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(t: &[u8], q: &[u8]) -> Alignment {
        global_align(t, q, &AlignScoring::default())
    }

    fn op_total(a: &Alignment, op: AlignOp) -> usize {
        a.ops.iter().filter(|o| o.0 == op).map(|o| o.1).sum()
    }

    #[test]
    fn test_identical_sequences() {
        let a = align(b"ACGTACGT", b"ACGTACGT");
        assert_eq!(a.score, 40);
        assert_eq!(a.ops, vec![(AlignOp::Align, 8)]);
    }

    #[test]
    fn test_single_mismatch() {
        let a = align(b"ACGT", b"ACTT");
        // 3 * 5 - 4
        assert_eq!(a.score, 11);
        assert_eq!(a.ops, vec![(AlignOp::Align, 4)]);
    }

    #[test]
    fn test_insertion_in_query() {
        let a = align(b"ACGT", b"ACGGT");
        assert_eq!(a.score, 4 * 5 - 8);
        assert_eq!(op_total(&a, AlignOp::Align), 4);
        assert_eq!(op_total(&a, AlignOp::GapInTemplate), 1);
    }

    #[test]
    fn test_deletion_from_query() {
        let a = align(b"ACGGT", b"ACGT");
        assert_eq!(op_total(&a, AlignOp::Align), 4);
        assert_eq!(op_total(&a, AlignOp::GapInQuery), 1);
    }

    #[test]
    fn test_empty_template() {
        let a = align(b"", b"ACGT");
        assert_eq!(a.score, -32);
        assert_eq!(a.ops, vec![(AlignOp::GapInTemplate, 4)]);
    }

    #[test]
    fn test_empty_query() {
        let a = align(b"ACGT", b"");
        assert_eq!(a.score, -32);
        assert_eq!(a.ops, vec![(AlignOp::GapInQuery, 4)]);
    }

    #[test]
    fn test_both_empty() {
        let a = align(b"", b"");
        assert_eq!(a.score, 0);
        assert!(a.ops.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let a = align(b"acgt", b"ACGT");
        assert_eq!(a.score, 20);
        assert_eq!(a.ops, vec![(AlignOp::Align, 4)]);
    }

    #[test]
    fn test_ops_cover_both_sequences() {
        let a = align(b"AAACCCGGG", b"AAAGGG");
        let t_len = op_total(&a, AlignOp::Align) + op_total(&a, AlignOp::GapInQuery);
        let q_len = op_total(&a, AlignOp::Align) + op_total(&a, AlignOp::GapInTemplate);
        assert_eq!(t_len, 9);
        assert_eq!(q_len, 6);
    }
}
