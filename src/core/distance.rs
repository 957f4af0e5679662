//! core/distance.rs
//! Heuristic string similarity used to spot renamed files.
//!
//! Not an edit distance. Equal-length strings score the fraction of
//! positions that match or sit in an adjacent swap. For unequal lengths the
//! longer string has characters dropped until the lengths agree, then the
//! rest is scored the same way. The 0.85 discovery threshold is tuned to
//! this exact procedure, so keep it as is.
//!
//! Characters compare case-insensitively.

/// Score for "can't tell": one side is absent.
pub const NEUTRAL: f32 = 0.5;

/// Best of both directions, in `0.0..=1.0`.
pub fn compare(a: Option<&str>, b: Option<&str>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => similarity(a, b).max(similarity(b, a)),
        _ => NEUTRAL,
    }
}

/// One direction of the comparison.
pub fn similarity(a: &str, b: &str) -> f32 {
    let one = fold(a);
    let two = fold(b);

    if one.len() == two.len() {
        if one.is_empty() {
            return 1.0;
        }
        let score = (0..one.len())
            .filter(|&i| one[i] == two[i] || (i > 0 && one[i - 1] == two[i] && one[i] == two[i - 1]))
            .count();
        return score as f32 / one.len() as f32;
    }

    let longest = one.len().max(two.len());
    let a_is_long = one.len() > two.len();
    let (mut long, short) = if a_is_long { (one, two) } else { (two, one) };

    let mut score = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    // Walk the shorter string, pruning the longer one on mismatches.
    while i < short.len() {
        if long[i] == short[i] {
            score += 1;
            i += 1;
        } else if i + 1 < short.len() && long[i + 1] == short[i] && long[i] == short[i + 1] {
            score += 1;
            i += 2;
        } else {
            long.remove(i);
            start = i;
        }
        if long.len() == short.len() {
            break;
        }
    }

    if long.len() == short.len() {
        // Swap check reads `a`'s side first, whichever is longer.
        let (first, second) = if a_is_long { (&long, &short) } else { (&short, &long) };
        for i in start..short.len() {
            if long[i] == short[i] || (i > 0 && first[i - 1] == short[i] && long[i] == second[i - 1]) {
                score += 1;
            }
        }
    }

    score as f32 / longest as f32
}

/// One lowercase char per input char, so lengths never change.
fn fold(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}
