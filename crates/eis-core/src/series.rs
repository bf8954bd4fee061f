use serde::Serialize;

use crate::measurement::Measurement;

/// One point of a Nyquist plot (real part against negated imaginary part).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NyquistRow {
    pub source_key: String,
    pub sequence_index: i64,
    pub frequency: f64,
    pub z_real: f64,
    pub neg_z_imag: f64,
    pub highlighted: bool,
}

/// Series rows in plot order (ascending sequence index, stable), flagging
/// any whose source key is in `highlighted`.
pub fn nyquist_rows(series: &[Measurement], highlighted: &[String]) -> Vec<NyquistRow> {
    let mut ordered: Vec<&Measurement> = series.iter().collect();
    ordered.sort_by_key(|m| m.sequence_index);

    ordered
        .into_iter()
        .map(|m| NyquistRow {
            source_key: m.source_key.clone(),
            sequence_index: m.sequence_index,
            frequency: m.frequency,
            z_real: m.z_real,
            neg_z_imag: -m.z_imag,
            highlighted: highlighted.iter().any(|h| *h == m.source_key),
        })
        .collect()
}

/// `(min, max)` frequency of the series, or None when empty.
pub fn frequency_range(series: &[Measurement]) -> Option<(f64, f64)> {
    series.iter().map(|m| m.frequency).fold(None, |acc, f| match acc {
        None => Some((f, f)),
        Some((lo, hi)) => Some((lo.min(f), hi.max(f))),
    })
}
