use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{FAR_THRESHOLD, NEAR_THRESHOLD};

/// Distance bucket of a projected point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    A,
    B,
    C,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::A => "A",
            Category::B => "B",
            Category::C => "C",
        }
    }

    /// Legend label.
    pub fn label(self) -> &'static str {
        match self {
            Category::A => "Category A",
            Category::B => "Category B",
            Category::C => "Category C",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buckets points by Euclidean distance from the origin.
///
/// `d < near` is A, `near <= d < far` is B, everything else is C.
/// A boundary value always lands in the upper bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Categorizer {
    near: f64,
    far: f64,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(NEAR_THRESHOLD, FAR_THRESHOLD)
    }
}

impl Categorizer {
    pub fn new(near: f64, far: f64) -> Self {
        Self { near, far }
    }

    pub fn thresholds(&self) -> (f64, f64) {
        (self.near, self.far)
    }

    pub fn categorize(&self, x: f64, y: f64, z: f64) -> Category {
        let distance = (x * x + y * y + z * z).sqrt();
        if distance < self.near {
            Category::A
        } else if distance < self.far {
            Category::B
        } else {
            Category::C
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_a() {
        assert_eq!(Categorizer::default().categorize(0.0, 0.0, 0.0), Category::A);
    }

    #[test]
    fn test_boundaries_go_up() {
        let c = Categorizer::default();
        assert_eq!(c.categorize(0.5, 0.0, 0.0), Category::B);
        assert_eq!(c.categorize(0.0, 0.0, -1.0), Category::C);
        assert_eq!(c.categorize(0.0, -0.5, 0.0), Category::B);
    }

    #[test]
    fn test_interior_values() {
        let c = Categorizer::default();
        assert_eq!(c.categorize(0.2, 0.2, 0.2), Category::A);
        assert_eq!(c.categorize(0.5, 0.5, 0.0), Category::B);
        assert_eq!(c.categorize(5.0, -5.0, 5.0), Category::C);
    }

    #[test]
    fn test_custom_thresholds() {
        let c = Categorizer::new(2.0, 3.0);
        assert_eq!(c.categorize(1.0, 0.0, 0.0), Category::A);
        assert_eq!(c.categorize(2.0, 0.0, 0.0), Category::B);
        assert_eq!(c.categorize(3.0, 0.0, 0.0), Category::C);
    }

    #[test]
    fn test_nan_falls_through_to_c() {
        assert_eq!(Categorizer::default().categorize(f64::NAN, 0.0, 0.0), Category::C);
    }

    #[test]
    fn test_serde_as_letter() {
        assert_eq!(serde_json::to_string(&Category::B).unwrap(), "\"B\"");
        let c: Category = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(c, Category::C);
    }
}
