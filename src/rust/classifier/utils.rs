use ndarray::Array1;

pub(crate) fn log_sum_exp(scores: &Array1<f64>) -> f64 {
    let max = scores.fold(f64::NEG_INFINITY, |m, &s| m.max(s));
    if !max.is_finite() {
        return max;
    }
    max + scores.iter().map(|&s| (s - max).exp()).sum::<f64>().ln()
}

/// Numerically stable softmax.
pub(crate) fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let lse = log_sum_exp(scores);
    scores.mapv(|s| (s - lse).exp())
}

/// Index of the largest value; the first one wins ties.
pub(crate) fn argmax(values: &Array1<f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&array![1.0, 2.0, 3.0]);
        assert!((p.sum() - 1.0).abs() < 1e-12);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn test_softmax_large_scores() {
        let p = softmax(&array![1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        assert_eq!(argmax(&array![0.2, 0.5, 0.5]), Some(1));
        assert_eq!(argmax(&Array1::<f64>::zeros(0)), None);
    }
}
