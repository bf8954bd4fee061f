use serde::{Deserialize, Serialize};

use crate::constants::{CLAMP_RANGE, V1, V2, V3};

/// The three basis vectors spanning the projection space.
///
/// Defaults to the reference vectors. Lengths need not match each other or
/// the feature vector; see [`dot_prefix`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Basis {
    pub v1: Vec<f64>,
    pub v2: Vec<f64>,
    pub v3: Vec<f64>,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            v1: V1.to_vec(),
            v2: V2.to_vec(),
            v3: V3.to_vec(),
        }
    }
}

impl Basis {
    pub fn new(v1: Vec<f64>, v2: Vec<f64>, v3: Vec<f64>) -> Self {
        Self { v1, v2, v3 }
    }

    pub fn axes(&self) -> [&[f64]; 3] {
        [&self.v1, &self.v2, &self.v3]
    }

    /// True if a feature vector of `len` entries overlaps every axis exactly.
    pub fn matches_len(&self, len: usize) -> bool {
        self.axes().iter().all(|axis| axis.len() == len)
    }
}

/// Dot product over the overlapping prefix of `a` and `b`.
///
/// Extra trailing entries on either side are ignored rather than rejected.
/// Accumulates left to right from zero so results are reproducible.
pub fn dot_prefix(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).fold(0.0, |acc, (x, y)| acc + x * y)
}

/// Linear map from feature space to a clamped 3D cube.
#[derive(Clone, Debug, PartialEq)]
pub struct Projector {
    basis: Basis,
    clamp: f64,
}

impl Default for Projector {
    fn default() -> Self {
        Self::new(Basis::default(), CLAMP_RANGE)
    }
}

impl Projector {
    pub fn new(basis: Basis, clamp: f64) -> Self {
        Self { basis, clamp }
    }

    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn clamp_range(&self) -> f64 {
        self.clamp
    }

    /// Raw dot products, before clamping.
    pub fn raw(&self, features: &[f64]) -> [f64; 3] {
        self.basis.axes().map(|axis| dot_prefix(features, axis))
    }

    /// Project and clamp each coordinate to `[-clamp, clamp]`.
    pub fn project(&self, features: &[f64]) -> [f64; 3] {
        self.raw(features)
            .map(|v| v.max(-self.clamp).min(self.clamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_basis() -> Basis {
        Basis::new(
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        )
    }

    #[test]
    fn test_dot_prefix_equal_lengths() {
        assert_eq!(dot_prefix(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_dot_prefix_truncates_to_shorter() {
        assert_eq!(dot_prefix(&[1.0, 2.0], &[4.0, 5.0, 6.0]), 14.0);
        assert_eq!(dot_prefix(&[1.0, 2.0, 3.0, 100.0], &[4.0, 5.0, 6.0]), 32.0);
        assert_eq!(dot_prefix(&[], &[4.0]), 0.0);
    }

    #[test]
    fn test_reference_basis_shape() {
        let basis = Basis::default();
        assert!(basis.matches_len(26));
        assert!(!basis.matches_len(24));
    }

    #[test]
    fn test_project_identity_basis() {
        let p = Projector::new(unit_basis(), 5.0);
        assert_eq!(p.project(&[0.1, -0.2, 0.3]), [0.1, -0.2, 0.3]);
    }

    #[test]
    fn test_clamp_upper_and_lower() {
        let p = Projector::new(unit_basis(), 5.0);
        assert_eq!(p.raw(&[12.0, -7.5, 5.0]), [12.0, -7.5, 5.0]);
        assert_eq!(p.project(&[12.0, -7.5, 5.0]), [5.0, -5.0, 5.0]);
    }

    #[test]
    fn test_reference_first_component() {
        // A one-hot feature picks out the first column of the reference basis.
        let mut features = vec![0.0; 26];
        features[0] = 1.0;
        let [x, y, z] = Projector::default().project(&features);
        assert_relative_eq!(x, V1[0]);
        assert_relative_eq!(y, V2[0]);
        assert_relative_eq!(z, V3[0]);
    }

    #[test]
    fn test_custom_clamp() {
        let p = Projector::new(unit_basis(), 1.0);
        assert_eq!(p.project(&[2.0, 0.5, -3.0]), [1.0, 0.5, -1.0]);
    }
}
