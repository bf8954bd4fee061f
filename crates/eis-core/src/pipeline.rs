//! Validate → feature vector → projection → category.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::category::{Categorizer, Category};
use crate::constants::{CLAMP_RANGE, FAR_THRESHOLD, NEAR_THRESHOLD};
use crate::error::{EisError, Result};
use crate::feature::build_feature_vector;
use crate::measurement::{Measurement, decode_measurements, is_valid_record};
use crate::projector::{Basis, Projector};

/// A measurement batch reduced to one labeled point in the projection cube.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub category: Category,
}

impl ProjectedPoint {
    pub fn distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Projection constants: basis, clamp range and category thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub basis: Basis,
    pub clamp: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            basis: Basis::default(),
            clamp: CLAMP_RANGE,
            near: NEAR_THRESHOLD,
            far: FAR_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EisPipeline {
    projector: Projector,
    categorizer: Categorizer,
}

impl EisPipeline {
    pub fn new(config: &ProjectionConfig) -> Self {
        Self {
            projector: Projector::new(config.basis.clone(), config.clamp),
            categorizer: Categorizer::new(config.near, config.far),
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// False for an empty batch or any record lacking numeric
    /// frequency / zReal / zImag. Never fails.
    pub fn validate(&self, batch: &[Value]) -> bool {
        !batch.is_empty() && batch.iter().all(is_valid_record)
    }

    /// Project a raw batch. Callers should `validate` first; a batch that
    /// would not validate is rejected with `InvalidInput`.
    pub fn process(&self, batch: &[Value]) -> Result<ProjectedPoint> {
        if batch.is_empty() {
            return Err(EisError::InvalidInput("empty batch".to_string()));
        }
        let measurements = decode_measurements(batch)?;
        self.process_measurements(&measurements)
    }

    pub fn process_measurements(&self, batch: &[Measurement]) -> Result<ProjectedPoint> {
        if batch.is_empty() {
            return Err(EisError::InvalidInput("empty batch".to_string()));
        }
        if let Some(i) = batch.iter().position(|m| !m.is_finite()) {
            return Err(EisError::InvalidInput(format!(
                "record {i}: non-finite measurement"
            )));
        }

        let features = build_feature_vector(batch);
        let [x, y, z] = self.projector.project(&features);
        let category = self.categorizer.categorize(x, y, z);

        Ok(ProjectedPoint { x, y, z, category })
    }
}

static DEFAULT_PIPELINE: LazyLock<EisPipeline> = LazyLock::new(EisPipeline::default);

/// [`EisPipeline::validate`] with the reference constants.
pub fn validate(batch: &[Value]) -> bool {
    DEFAULT_PIPELINE.validate(batch)
}

/// [`EisPipeline::process`] with the reference constants.
pub fn process(batch: &[Value]) -> Result<ProjectedPoint> {
    DEFAULT_PIPELINE.process(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit_config() -> ProjectionConfig {
        ProjectionConfig {
            basis: Basis::new(vec![1.0], vec![0.0, 1.0], vec![0.0, 0.0, 1.0]),
            ..ProjectionConfig::default()
        }
    }

    #[test]
    fn test_validate_examples() {
        assert!(!validate(&[]));
        assert!(!validate(&[json!({"frequency": 1, "zReal": "x", "zImag": 2})]));
        assert!(validate(&[json!({"frequency": 1, "zReal": 2, "zImag": 3})]));
    }

    #[test]
    fn test_validate_rejects_one_bad_record() {
        let batch = vec![
            json!({"frequency": 1, "zReal": 2, "zImag": 3}),
            json!({"frequency": 2, "zImag": 3}),
        ];
        assert!(!validate(&batch));
    }

    #[test]
    fn test_process_empty_is_invalid_input() {
        assert!(matches!(process(&[]), Err(EisError::InvalidInput(_))));
        let pipeline = EisPipeline::default();
        assert!(matches!(
            pipeline.process_measurements(&[]),
            Err(EisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_process_malformed_is_invalid_input() {
        let batch = vec![json!({"frequency": 1, "zReal": "x", "zImag": 2})];
        assert!(matches!(process(&batch), Err(EisError::InvalidInput(_))));
    }

    #[test]
    fn test_process_non_finite_rejected() {
        let pipeline = EisPipeline::default();
        let batch = vec![Measurement::new(1.0, f64::INFINITY, 0.0)];
        assert!(pipeline.process_measurements(&batch).is_err());
    }

    #[test]
    fn test_process_small_point_is_a() {
        // Two measurements: features [zr_lo, zr_hi, zi_lo, zi_hi] against a
        // basis that picks one feature per axis.
        let pipeline = EisPipeline::new(&unit_config());
        let batch = vec![
            json!({"frequency": 100.0, "zReal": 0.2, "zImag": 0.1}),
            json!({"frequency": 1.0, "zReal": 0.1, "zImag": 0.3}),
        ];
        let p = pipeline.process(&batch).unwrap();
        assert_eq!((p.x, p.y, p.z), (0.1, 0.2, 0.3));
        assert_eq!(p.category, Category::A);
    }

    #[test]
    fn test_process_clamps_and_categorizes_c() {
        let pipeline = EisPipeline::new(&unit_config());
        let batch = vec![
            json!({"frequency": 1.0, "zReal": 40.0, "zImag": -9.0}),
            json!({"frequency": 2.0, "zReal": -12.0, "zImag": 0.0}),
        ];
        let p = pipeline.process(&batch).unwrap();
        assert_eq!((p.x, p.y, p.z), (5.0, -5.0, -5.0));
        assert_eq!(p.category, Category::C);
    }

    #[test]
    fn test_process_is_deterministic() {
        let batch: Vec<Value> = (0..13)
            .map(|i| {
                json!({
                    "Frequency": 10f64.powf(i as f64 / 3.0),
                    "Zreal": 0.01 * i as f64,
                    "Zimg": -0.02 * i as f64,
                })
            })
            .collect();
        let a = process(&batch).unwrap();
        let b = process(&batch).unwrap();
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.z.to_bits(), b.z.to_bits());
        assert_eq!(a.category, b.category);
    }

    #[test]
    fn test_alias_and_camel_case_agree() {
        let camel = vec![
            json!({"frequency": 2, "zReal": 0.4, "zImag": -0.1}),
            json!({"frequency": 1, "zReal": 0.3, "zImag": -0.2}),
        ];
        let table = vec![
            json!({"Frequency": 2, "Zreal": 0.4, "Zimg": -0.1}),
            json!({"Frequency": 1, "Zreal": 0.3, "Zimg": -0.2}),
        ];
        assert_eq!(process(&camel).unwrap(), process(&table).unwrap());
    }

    #[test]
    fn test_point_serializes_with_letter_category() {
        let p = ProjectedPoint {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            category: Category::A,
        };
        let v = serde_json::to_value(p).unwrap();
        assert_eq!(v["category"], "A");
        assert_eq!(p.distance(), 0.0);
    }
}
