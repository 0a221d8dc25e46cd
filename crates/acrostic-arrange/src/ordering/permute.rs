// Lexicographic permutations of `0..n`.

/// Iterator over all permutations of `0..n` in lexicographic order.
///
/// `n == 0` yields a single empty permutation.
#[derive(Debug, Clone)]
pub struct Permutations {
    current: Vec<usize>,
    done: bool,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Self {
            current: (0..n).collect(),
            done: false,
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let out = self.current.clone();
        if !next_permutation(&mut self.current) {
            self.done = true;
        }
        Some(out)
    }
}

/// Rearrange `v` into the next permutation in lexicographic order.
///
/// Returns `false` (leaving `v` as the last permutation) when there is none.
pub fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// Number of permutations of `n` items, saturating at `u128::MAX`.
pub fn factorial(n: usize) -> u128 {
    (1..=n as u128).fold(1u128, |acc, x| acc.saturating_mul(x))
}
