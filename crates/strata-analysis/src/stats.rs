//! Small statistics helpers shared by analytics, history and health.

use statrs::statistics::{Data, OrderStatistics};

/// The `p`th percentile (0..=100) of `values`. 0 for an empty slice.
pub fn percentile(values: &[f64], p: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut data = Data::new(values.to_vec());
    data.percentile(p.min(100))
}

/// Shannon entropy of `counts` divided by log2 of the number of non-zero
/// entries, in [0, 1]. Fewer than two entries give 0.
pub fn normalized_entropy(counts: &[f64]) -> f64 {
    let nonzero: Vec<f64> = counts.iter().copied().filter(|&c| c > 0.0).collect();
    if nonzero.len() < 2 {
        return 0.0;
    }
    let total: f64 = nonzero.iter().sum();
    let h: f64 = nonzero
        .iter()
        .map(|&c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum();
    (h / (nonzero.len() as f64).log2()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_bounds() {
        let v: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_eq!(percentile(&[], 90), 0.0);
        assert_eq!(percentile(&v, 0), 1.0);
        assert_eq!(percentile(&v, 100), 10.0);
        let p90 = percentile(&v, 90);
        assert!(p90 > 8.0 && p90 <= 10.0);
    }

    #[test]
    fn test_entropy() {
        assert_eq!(normalized_entropy(&[5.0]), 0.0);
        assert!((normalized_entropy(&[2.0, 2.0, 2.0, 2.0]) - 1.0).abs() < 1e-12);
        let skewed = normalized_entropy(&[10.0, 1.0]);
        assert!(skewed > 0.0 && skewed < 0.5);
    }
}
