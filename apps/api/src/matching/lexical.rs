//! Character-level Ratcliff/Obershelp similarity for the quick `/api/compare` check.
//! Independent of the semantic scorer and never used as its fallback.

use std::collections::HashMap;

/// `2·M / T` where `M` is the number of characters in matching blocks and `T` the combined length.
/// Two empty strings are identical (1.0). Not symmetric: popular characters are pruned from `b` only.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// `b` at least this long has its popular characters left out of the match index.
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// Sum of the lengths of the matching blocks: the longest common run, then recursively
/// the blocks to its left and right.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let index = BIndex::new(b);
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = index.longest_match(a, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Positions of each character of `b`, ascending.
///
/// When `b` has `AUTOJUNK_MIN_LEN` characters or more, a character occurring more than
/// `len / 100 + 1` times is popular and gets no entry. Blocks can still grow over popular
/// characters once a non-popular seed is found.
struct BIndex<'a> {
    b: &'a [char],
    positions: HashMap<char, Vec<usize>>,
}

impl<'a> BIndex<'a> {
    fn new(b: &'a [char]) -> Self {
        let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            positions.entry(*c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            positions.retain(|_, js| js.len() <= limit);
        }

        Self { b, positions }
    }

    /// Longest common run of `a[alo..ahi]` and `b[blo..bhi]` as `(start_a, start_b, len)`.
    /// Earliest start in `a` wins ties, then earliest in `b`.
    fn longest_match(
        &self,
        a: &[char],
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let b = self.b;
        let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
        // run length ending at (i - 1, j), keyed by j
        let mut run_at: HashMap<usize, usize> = HashMap::new();

        for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
            let mut next = HashMap::new();
            if let Some(js) = self.positions.get(c) {
                for &j in js {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = j
                        .checked_sub(1)
                        .and_then(|p| run_at.get(&p))
                        .copied()
                        .unwrap_or(0);
                    let k = prev + 1;
                    next.insert(j, k);
                    if k > best_k {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_k = k;
                    }
                }
            }
            run_at = next;
        }

        while best_i > alo && best_j > blo && a[best_i - 1] == b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_k += 1;
        }
        while best_i + best_k < ahi && best_j + best_k < bhi && a[best_i + best_k] == b[best_j + best_k]
        {
            best_k += 1;
        }

        (best_i, best_j, best_k)
    }
}
