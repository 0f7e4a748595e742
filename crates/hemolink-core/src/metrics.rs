//! Rank-quality metrics over graded relevance sequences (rank 1 first).

/// `1 / rank` of the first positive grade, or 0 when none is positive.
pub fn reciprocal_rank(grades: &[u8]) -> f64 {
    grades
        .iter()
        .position(|&g| g > 0)
        .map(|idx| 1.0 / (idx + 1) as f64)
        .unwrap_or(0.0)
}

/// Discounted cumulative gain with exponential gain `2^g - 1`.
pub fn dcg(grades: &[u8]) -> f64 {
    grades
        .iter()
        .enumerate()
        .map(|(i, &g)| (2f64.powi(g as i32) - 1.0) / ((i + 2) as f64).log2())
        .sum()
}

/// DCG normalized by the DCG of the same grades sorted descending.
/// Returns 0 when every grade is 0.
pub fn ndcg_at_k(grades: &[u8]) -> f64 {
    let mut ideal = grades.to_vec();
    ideal.sort_unstable_by(|a, b| b.cmp(a));
    let idcg = dcg(&ideal);
    if idcg == 0.0 {
        return 0.0;
    }
    (dcg(grades) / idcg).min(1.0)
}

/// Fraction of the first `k` slots holding an item that satisfies
/// `is_relevant`. Missing slots count as misses; `k == 0` yields 0.
pub fn precision_at_k<T, F>(items: &[T], k: usize, is_relevant: F) -> f64
where
    F: Fn(&T) -> bool,
{
    if k == 0 {
        return 0.0;
    }
    let hits = items.iter().take(k).filter(|item| is_relevant(item)).count();
    hits as f64 / k as f64
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reciprocal_rank() {
        assert!((reciprocal_rank(&[0, 0, 3, 0]) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(reciprocal_rank(&[0, 0, 0]), 0.0);
        assert_eq!(reciprocal_rank(&[1, 7, 7]), 1.0);
        assert_eq!(reciprocal_rank(&[]), 0.0);
    }

    #[test]
    fn test_ndcg_ideal_ordering() {
        assert!((ndcg_at_k(&[3, 2, 1]) - 1.0).abs() < 1e-12);
        assert!((ndcg_at_k(&[7]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ndcg_all_zero_is_zero() {
        assert_eq!(ndcg_at_k(&[0, 0, 0]), 0.0);
        assert_eq!(ndcg_at_k(&[]), 0.0);
    }

    #[test]
    fn test_ndcg_penalizes_late_hits() {
        let late = ndcg_at_k(&[0, 0, 3]);
        let early = ndcg_at_k(&[3, 0, 0]);
        assert!(late < early);
        assert!(late > 0.0 && late < 1.0);
        // 7 / log2(4) over 7 / log2(2)
        assert!((late - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_precision_at_k() {
        let items = [true, false, true];
        assert!((precision_at_k(&items, 3, |x| *x) - 2.0 / 3.0).abs() < 1e-12);
        assert!((precision_at_k(&items, 5, |x| *x) - 0.4).abs() < 1e-12);
        assert_eq!(precision_at_k(&items, 1, |x| *x), 1.0);
        assert_eq!(precision_at_k(&items, 0, |x| *x), 0.0);
        assert_eq!(precision_at_k::<bool, _>(&[], 5, |x| *x), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 0.0, 0.5]), 0.5);
    }
}
