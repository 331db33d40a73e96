//! Statistical helpers shared by unit tests.

/// Upper bound on the uniform chi-square statistic for the bin counts used in
/// tests (at most 10 bins). Far beyond the 0.1% critical value of 27.9 for 9
/// degrees of freedom, so a genuinely uniform source essentially never trips it.
pub(crate) const UNIFORM_CHI_SQUARE_LIMIT: f64 = 45.0;

/// Pearson chi-square statistic of `counts` against a uniform distribution
pub(crate) fn chi_square(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}
