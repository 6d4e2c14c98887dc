use ndarray::Array1;

use crate::error::ClassifyError;

/// How far a raw score vector may drift from summing to one before it is
/// rescaled.
pub const SUM_TOLERANCE: f32 = 1e-3;

/// Applies softmax to a 1D array and returns a new Array1<f32>.
pub fn softmax(slice: &Array1<f32>) -> Array1<f32> {
    let max_val = slice.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp_vals: Array1<f32> = slice.mapv(|x| (x - max_val).exp());
    let sum_exp: f32 = exp_vals.sum();
    exp_vals.mapv(|v| v / sum_exp)
}

/// Index and value of the maximum. Ties resolve to the first index.
pub fn argmax_and_max(values: &[f32]) -> (usize, f32) {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(max_idx, max_val), (i, &val)| {
            if val > max_val { (i, val) } else { (max_idx, max_val) }
        })
}

/// Rescales `raw` in place so it sums to one, unless it already does or its
/// sum cannot be divided by.
pub fn normalize_scores(raw: &mut [f32]) {
    let sum: f32 = raw.iter().sum();
    if !sum.is_finite() || sum <= 0.0 || (sum - 1.0).abs() <= SUM_TOLERANCE {
        return;
    }
    raw.iter_mut().for_each(|v| *v /= sum);
}

/// Turns classifier output into a probability vector. Output with a negative
/// or non-finite entry is treated as logits and softmaxed; anything else is
/// rescaled by [`normalize_scores`].
pub fn to_probabilities(mut raw: Vec<f32>) -> Vec<f32> {
    if raw.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return softmax(&Array1::from(raw)).to_vec();
    }
    normalize_scores(&mut raw);
    raw
}

/// Projects a raw output vector onto `target` categories by index modulo:
/// `mapped[i] = raw[i % raw.len()]`.
///
/// This does not reflect any training against the target labels. Mass is
/// reused cyclically when the network has fewer outputs than categories and
/// the tail is discarded when it has more. It is kept exactly as deployed
/// for compatibility with existing clients.
///
/// `raw` must not be empty.
pub fn remap_modulo(raw: &[f32], target: usize) -> Vec<f32> {
    debug_assert!(!raw.is_empty());
    (0..target).map(|i| raw[i % raw.len()]).collect()
}

/// Divides every entry by the total so the distribution sums to one.
pub fn renormalize(mut mapped: Vec<f32>) -> Result<Vec<f32>, ClassifyError> {
    let sum: f32 = mapped.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(ClassifyError::DegenerateDistribution { sum });
    }
    mapped.iter_mut().for_each(|v| *v /= sum);
    Ok(mapped)
}
