//! Ratcliff/Obershelp string similarity.
//!
//! The similarity of two strings is `2 * M / T`, where `T` is their combined
//! length and `M` is the number of characters in matching blocks. Blocks are
//! found by taking the longest common substring and recursing into the
//! pieces on either side of it.

/// Similarity of `a` and `b` in `[0, 1]`; two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// The best `n` candidates scoring at least `cutoff` against `word`, best
/// first.
///
/// Equal scores are ordered by candidate, highest first.
pub fn close_matches<'a>(
    word: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    n: usize,
    cutoff: f64,
) -> Vec<&'a str> {
    let mut scored = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = ratio(candidate, word);
            (score >= cutoff).then_some((score, candidate))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|(lscore, lhs), (rscore, rhs)| {
        rscore.total_cmp(lscore).then_with(|| rhs.cmp(lhs))
    });
    scored
        .into_iter()
        .take(n)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, size)`.
///
/// Among blocks of equal size the one starting earliest in `a` wins, then
/// the one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // `prev[j + 1]` is the length of the run ending at `a[i - 1]` and `b[j]`.
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            let run = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            cur[j + 1] = run;
            if run > best_size {
                best_i = i + 1 - run;
                best_j = j + 1 - run;
                best_size = run;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_size)
}
