//! Descriptive statistics over a value sequence.
//!
//! Mirrors the subset of a "describe" summary the pipeline needs: count, mean,
//! sample standard deviation (n - 1 denominator), min and max.

use nalgebra::DVector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` when `n < 2`.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Summarize a sequence. Returns `None` for an empty sequence.
pub fn describe(values: &DVector<f64>) -> Option<Describe> {
    let n = values.len();
    if n == 0 {
        return None;
    }

    // `variance` is the population variance; rescale to the sample estimator.
    let std = (n > 1).then(|| {
        let n = n as f64;
        (values.variance() * n / (n - 1.0)).sqrt()
    });

    Some(Describe {
        n,
        mean: values.mean(),
        std,
        min: values.min(),
        max: values.max(),
    })
}

/// Min-max normalize into `[0, 1]`.
///
/// Returns `None` when the sequence is empty or constant (`max == min`), where
/// the normalization is undefined.
pub fn min_max_normalize(values: &DVector<f64>) -> Option<DVector<f64>> {
    if values.is_empty() {
        return None;
    }
    let min = values.min();
    let range = values.max() - min;
    if !(range > 0.0) {
        return None;
    }
    Some(values.map(|x| (x - min) / range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_sample_estimator() {
        let v = DVector::from_vec(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let d = describe(&v).unwrap();
        assert_eq!(d.n, 8);
        assert!((d.mean - 5.0).abs() < 1e-12);
        // Population std is exactly 2; sample std is 2 * sqrt(8/7).
        assert!((d.std.unwrap() - 2.0 * (8.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(d.min, 2.0);
        assert_eq!(d.max, 9.0);
    }

    #[test]
    fn describe_single_value_has_no_std() {
        let d = describe(&DVector::from_vec(vec![3.0])).unwrap();
        assert_eq!(d.mean, 3.0);
        assert!(d.std.is_none());
    }

    #[test]
    fn describe_empty_is_none() {
        assert!(describe(&DVector::from_vec(Vec::new())).is_none());
    }

    #[test]
    fn normalize_constant_sequence_is_undefined() {
        assert!(min_max_normalize(&DVector::from_vec(vec![4.0, 4.0])).is_none());
        let n = min_max_normalize(&DVector::from_vec(vec![0.0, 5.0, 10.0])).unwrap();
        assert_eq!(n.as_slice(), &[0.0, 0.5, 1.0]);
    }
}
