//! Measurement records as delivered by the fetch layer.
//!
//! Records arrive as loosely-typed JSON objects. Field names follow the
//! camelCase wire format, and the original table column names (`Frequency`,
//! `Zreal`, `Zimg`, `EIS_Data_Point`, `SK`) are accepted as aliases.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EisError, Result};

const FREQUENCY: &[&str] = &["frequency", "Frequency"];
const Z_REAL: &[&str] = &["zReal", "Zreal"];
const Z_IMAG: &[&str] = &["zImag", "Zimg", "zImg"];
const SEQUENCE_INDEX: &[&str] = &["sequenceIndex", "EIS_Data_Point"];
const SOURCE_KEY: &[&str] = &["sourceKey", "SK"];

/// One impedance reading at one frequency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(alias = "Frequency")]
    pub frequency: f64,
    #[serde(alias = "Zreal")]
    pub z_real: f64,
    #[serde(alias = "Zimg", alias = "zImg")]
    pub z_imag: f64,
    /// Plot/sort order within the series, not arrival order.
    #[serde(default, alias = "EIS_Data_Point")]
    pub sequence_index: i64,
    /// Stable per-record key; used as the highlight identity.
    #[serde(default, alias = "SK")]
    pub source_key: String,
    /// Passthrough fields the pipeline does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Measurement {
    pub fn new(frequency: f64, z_real: f64, z_imag: f64) -> Self {
        Self {
            frequency,
            z_real,
            z_imag,
            sequence_index: 0,
            source_key: String::new(),
            extra: Map::new(),
        }
    }

    pub fn with_key(mut self, sequence_index: i64, source_key: &str) -> Self {
        self.sequence_index = sequence_index;
        self.source_key = source_key.to_string();
        self
    }

    /// Decode a raw record. Only the three numeric fields are mandatory;
    /// everything not recognised is kept in `extra`.
    pub fn from_record(record: &Value) -> Result<Self> {
        let obj = record
            .as_object()
            .ok_or_else(|| EisError::InvalidInput("record is not an object".to_string()))?;

        let frequency = required_number(obj, FREQUENCY)?;
        let z_real = required_number(obj, Z_REAL)?;
        let z_imag = required_number(obj, Z_IMAG)?;
        let sequence_index = lookup(obj, SEQUENCE_INDEX)
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let source_key = lookup(obj, SOURCE_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let known: Vec<&str> = [FREQUENCY, Z_REAL, Z_IMAG, SEQUENCE_INDEX, SOURCE_KEY].concat();
        let extra = obj
            .iter()
            .filter(|(k, _)| !known.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            frequency,
            z_real,
            z_imag,
            sequence_index,
            source_key,
            extra,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.frequency.is_finite() && self.z_real.is_finite() && self.z_imag.is_finite()
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn required_number(obj: &Map<String, Value>, names: &[&str]) -> Result<f64> {
    match lookup(obj, names) {
        Some(v) => v.as_f64().ok_or_else(|| {
            EisError::InvalidInput(format!("field '{}' is not numeric: {v}", names[0]))
        }),
        None => Err(EisError::InvalidInput(format!(
            "missing field '{}'",
            names[0]
        ))),
    }
}

/// True if the record is an object carrying numeric frequency, zReal and zImag.
pub fn is_valid_record(record: &Value) -> bool {
    let Some(obj) = record.as_object() else {
        return false;
    };
    [FREQUENCY, Z_REAL, Z_IMAG]
        .iter()
        .all(|names| lookup(obj, names).is_some_and(Value::is_number))
}

/// Highlight identity of a raw record, if it carries one.
/// Works on records that would fail validation.
pub fn record_id(record: &Value) -> Option<&str> {
    record
        .as_object()
        .and_then(|obj| lookup(obj, SOURCE_KEY))
        .and_then(Value::as_str)
}

/// Decode a whole batch, failing on the first malformed record.
pub fn decode_measurements(batch: &[Value]) -> Result<Vec<Measurement>> {
    batch
        .iter()
        .enumerate()
        .map(|(i, record)| {
            Measurement::from_record(record)
                .map_err(|e| EisError::InvalidInput(format!("record {i}: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_camel_case() {
        let m = Measurement::from_record(&json!({
            "frequency": 10.0,
            "zReal": 0.25,
            "zImag": -0.5,
            "sequenceIndex": 3,
            "sourceKey": "DATA#3",
            "channel": "7"
        }))
        .unwrap();
        assert_eq!(m.frequency, 10.0);
        assert_eq!(m.z_real, 0.25);
        assert_eq!(m.z_imag, -0.5);
        assert_eq!(m.sequence_index, 3);
        assert_eq!(m.source_key, "DATA#3");
        assert_eq!(m.extra.get("channel"), Some(&json!("7")));
        assert_eq!(m.extra.len(), 1);
    }

    #[test]
    fn test_from_record_table_aliases() {
        let m = Measurement::from_record(&json!({
            "Frequency": 1000,
            "Zreal": 1,
            "Zimg": 2,
            "EIS_Data_Point": 9,
            "SK": "POINT#9",
            "PK": "TEST#1#CH#2"
        }))
        .unwrap();
        assert_eq!(m.frequency, 1000.0);
        assert_eq!(m.z_imag, 2.0);
        assert_eq!(m.sequence_index, 9);
        assert_eq!(m.source_key, "POINT#9");
        assert!(m.extra.contains_key("PK"));
        assert!(!m.extra.contains_key("SK"));
    }

    #[test]
    fn test_optional_fields_default() {
        let m = Measurement::from_record(&json!({"frequency": 1, "zReal": 2, "zImag": 3})).unwrap();
        assert_eq!(m.sequence_index, 0);
        assert!(m.source_key.is_empty());
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let err = Measurement::from_record(&json!({"frequency": 1, "zReal": "x", "zImag": 2}))
            .unwrap_err();
        assert!(err.to_string().contains("zReal"), "{err}");
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = Measurement::from_record(&json!({"frequency": 1, "zReal": 2})).unwrap_err();
        assert!(err.to_string().contains("missing field 'zImag'"), "{err}");
    }

    #[test]
    fn test_is_valid_record() {
        assert!(is_valid_record(&json!({"frequency": 1, "zReal": 2, "zImag": 3})));
        assert!(is_valid_record(&json!({"Frequency": 1, "Zreal": 2, "Zimg": 3})));
        assert!(!is_valid_record(&json!({"frequency": 1, "zReal": "x", "zImag": 2})));
        assert!(!is_valid_record(&json!({"frequency": null, "zReal": 1, "zImag": 2})));
        assert!(!is_valid_record(&json!([1, 2, 3])));
    }

    #[test]
    fn test_record_id_ignores_validity() {
        assert_eq!(record_id(&json!({"SK": "a"})), Some("a"));
        assert_eq!(record_id(&json!({"sourceKey": "b", "zReal": "bad"})), Some("b"));
        assert_eq!(record_id(&json!({"frequency": 1})), None);
        assert_eq!(record_id(&json!("scalar")), None);
    }

    #[test]
    fn test_decode_reports_index() {
        let batch = vec![
            json!({"frequency": 1, "zReal": 2, "zImag": 3}),
            json!({"frequency": 1, "zReal": 2}),
        ];
        let err = decode_measurements(&batch).unwrap_err();
        assert!(err.to_string().contains("record 1"), "{err}");
    }

    #[test]
    fn test_serde_accepts_aliases() {
        let m: Measurement =
            serde_json::from_value(json!({"Frequency": 5, "Zreal": 1.5, "Zimg": -2, "SK": "k"}))
                .unwrap();
        assert_eq!(m, Measurement::new(5.0, 1.5, -2.0).with_key(0, "k"));
    }
}
