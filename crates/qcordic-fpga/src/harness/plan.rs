//! Test plans: directed, swept and random vector sets

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use qcordic_core::CordicMode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::types::TestVector;

/// Default rotation sweep step in degrees
pub const ROTATION_SWEEP_STEP_DEG: f64 = 5.0;

/// Default vectoring grid step
pub const VECTORING_SWEEP_STEP: f64 = 0.5;

/// Half-width of the vectoring grid and of random vectoring inputs
pub const VECTORING_EXTENT: f64 = 2.0;

/// Suite a vector belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    /// Single 45 degree rotation of (1, 0)
    Directed,
    /// Rotation of (1, 0) from 0 to 90 degrees
    RotationSweep,
    /// 2-D grid over [-2, 2]², x = 0 excluded
    VectoringSweep,
    /// Seeded random vectors
    Random,
    /// Caller-supplied vectors
    Custom,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suite::Directed => "directed",
            Suite::RotationSweep => "rotation_sweep",
            Suite::VectoringSweep => "vectoring_sweep",
            Suite::Random => "random",
            Suite::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A vector tagged with its suite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlannedVector {
    pub suite: Suite,
    pub vector: TestVector,
}

/// Ordered list of vectors to run against a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    vectors: Vec<PlannedVector>,
}

impl TestPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rotate (1, 0) by 0.785398 rad
    pub fn directed() -> Self {
        let mut plan = Self::new();
        plan.push(Suite::Directed, TestVector::rotation(1.0, 0.0, 0.785398));
        plan
    }

    /// Rotate (1, 0) through 0..=90 degrees in `step_deg` increments.
    pub fn rotation_sweep(step_deg: f64) -> Self {
        let mut plan = Self::new();
        for deg in grid(0.0, 90.0, step_deg) {
            plan.push(
                Suite::RotationSweep,
                TestVector::rotation(1.0, 0.0, deg.to_radians()),
            );
        }
        plan
    }

    /// Vectoring over the `[-2, 2]²` grid at `step`, skipping the `x = 0` column.
    pub fn vectoring_sweep(step: f64) -> Self {
        let mut plan = Self::new();
        let axis = grid(-VECTORING_EXTENT, VECTORING_EXTENT, step);
        for &x in &axis {
            if x.abs() < step / 2.0 {
                continue;
            }
            for &y in &axis {
                plan.push(Suite::VectoringSweep, TestVector::vectoring(x, y));
            }
        }
        plan
    }

    /// Directed vector followed by both sweeps at their default steps
    pub fn standard() -> Self {
        let mut plan = Self::directed();
        plan.extend(Self::rotation_sweep(ROTATION_SWEEP_STEP_DEG));
        plan.extend(Self::vectoring_sweep(VECTORING_SWEEP_STEP));
        plan
    }

    /// Reproducible random vectors.
    ///
    /// Rotation draws `(x, y)` from `[-1, 1]²` and angles from `[-π/2, π/2]`;
    /// vectoring draws `(x, y)` from `[-2, 2]²` with zero initial angle.
    pub fn random(count: usize, seed: u64, mode: CordicMode) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut plan = Self::new();
        for _ in 0..count {
            let vector = match mode {
                CordicMode::Rotation => TestVector::rotation(
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-1.0..=1.0),
                    rng.gen_range(-FRAC_PI_2..=FRAC_PI_2),
                ),
                CordicMode::Vectoring => TestVector::vectoring(
                    rng.gen_range(-VECTORING_EXTENT..=VECTORING_EXTENT),
                    rng.gen_range(-VECTORING_EXTENT..=VECTORING_EXTENT),
                ),
            };
            plan.push(Suite::Random, vector);
        }
        plan
    }

    pub fn push(&mut self, suite: Suite, vector: TestVector) {
        self.vectors.push(PlannedVector { suite, vector });
    }

    /// Append all vectors of `other`
    pub fn extend(&mut self, other: TestPlan) {
        self.vectors.extend(other.vectors);
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[PlannedVector] {
        &self.vectors
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedVector> {
        self.vectors.iter()
    }
}

impl FromIterator<TestVector> for TestPlan {
    fn from_iter<I: IntoIterator<Item = TestVector>>(iter: I) -> Self {
        let mut plan = Self::new();
        for vector in iter {
            plan.push(Suite::Custom, vector);
        }
        plan
    }
}

/// Points `start, start + step, ...` up to and including `end`.
///
/// Computed by index so accumulated rounding never drops the end point.
fn grid(start: f64, end: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || end < start {
        return vec![start];
    }
    let count = ((end - start) / step + 1e-9).floor() as usize;
    (0..=count).map(|k| start + k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directed() {
        let plan = TestPlan::directed();
        assert_eq!(plan.len(), 1);
        let v = plan.vectors()[0].vector;
        assert_eq!((v.x, v.y, v.z), (1.0, 0.0, 0.785398));
        assert_eq!(v.mode, CordicMode::Rotation);
    }

    #[test]
    fn test_rotation_sweep_covers_end_points() {
        let plan = TestPlan::rotation_sweep(5.0);
        assert_eq!(plan.len(), 19);
        let first = plan.vectors()[0].vector;
        let last = plan.vectors()[18].vector;
        assert_eq!(first.z, 0.0);
        assert!((last.z - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_vectoring_sweep_excludes_x_zero() {
        let plan = TestPlan::vectoring_sweep(0.5);
        // 9 grid points per axis, x = 0 column dropped
        assert_eq!(plan.len(), 8 * 9);
        assert!(plan.iter().all(|p| p.vector.x != 0.0));
        assert!(plan.iter().all(|p| p.vector.mode == CordicMode::Vectoring));
        assert!(plan
            .iter()
            .any(|p| p.vector.x == -2.0 && p.vector.y == 2.0));
    }

    #[test]
    fn test_random_is_reproducible() {
        let a = TestPlan::random(32, 7, CordicMode::Rotation);
        let b = TestPlan::random(32, 7, CordicMode::Rotation);
        let c = TestPlan::random(32, 8, CordicMode::Rotation);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|p| p.vector.z.abs() <= FRAC_PI_2));

        let v = TestPlan::random(32, 7, CordicMode::Vectoring);
        assert!(v
            .iter()
            .all(|p| p.vector.x.abs() <= 2.0 && p.vector.y.abs() <= 2.0 && p.vector.z == 0.0));
    }

    #[test]
    fn test_standard_plan_order() {
        let plan = TestPlan::standard();
        assert_eq!(plan.vectors()[0].suite, Suite::Directed);
        assert_eq!(plan.vectors()[1].suite, Suite::RotationSweep);
        assert_eq!(plan.vectors()[plan.len() - 1].suite, Suite::VectoringSweep);
        assert_eq!(plan.len(), 1 + 19 + 72);
    }

    #[test]
    fn test_custom_plan_from_vectors() {
        let plan: TestPlan = vec![TestVector::vectoring(3.0, 4.0)].into_iter().collect();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.vectors()[0].suite, Suite::Custom);
        assert_eq!(Suite::VectoringSweep.to_string(), "vectoring_sweep");
    }
}
