//! Inclusive integer ranges used by animation effects.

use rand::Rng;
use serde::Serialize;

/// An inclusive `[min, max]` range that values are drawn from uniformly.
///
/// # Examples
///
/// ```
/// use hue_animator::EffectRange;
/// use rand::SeedableRng;
///
/// let range = EffectRange::new(10, 20).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let value = range.sample(&mut rng);
/// assert!((10..=20).contains(&value));
///
/// assert!(EffectRange::new(5, 4).is_none());
/// ```
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct EffectRange {
    min: i64,
    max: i64,
}

impl EffectRange {
    /// Returns None if `min > max`.
    pub fn new(min: i64, max: i64) -> Option<Self> {
        (min <= max).then_some(EffectRange { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Draw a value uniformly from the range, both ends included.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.min..=self.max)
    }
}
