use crate::measurement::Measurement;

/// Build the feature vector `[zReal_1..zReal_N, zImag_1..zImag_N]`, both
/// halves ordered by ascending frequency.
///
/// The sort is stable: measurements sharing a frequency keep their input order.
pub fn build_feature_vector(batch: &[Measurement]) -> Vec<f64> {
    let mut sorted: Vec<&Measurement> = batch.iter().collect();
    // `+ 0.0` folds -0.0 into 0.0 so signed zeros tie instead of ordering.
    sorted.sort_by(|a, b| (a.frequency + 0.0).total_cmp(&(b.frequency + 0.0)));

    let mut features = Vec::with_capacity(sorted.len() * 2);
    features.extend(sorted.iter().map(|m| m.z_real));
    features.extend(sorted.iter().map(|m| m.z_imag));
    features
}
