//! Procedural scatter of decorative plants over the ground plane.

use serde::Deserialize;

use crate::random::RandomSource;
use crate::session::{PlacedObject, PlantKind};

/// Plants scattered into a fresh world when nothing else is configured.
pub const DEFAULT_PLANT_COUNT: usize = 30;

/// Draws below this select a tree.
const TREE_THRESHOLD: f64 = 0.5;
/// Draws below this (and at or above the tree threshold) select a bush.
const BUSH_THRESHOLD: f64 = 0.8;

/// Errors raised while validating generation parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("plant count must not be negative, got {0}")]
    NegativeCount(i64),
    #[error("bounds must be finite, got [{min}, {max}]")]
    NonFiniteBounds { min: f64, max: f64 },
    #[error("bounds are inverted: min {min} is greater than max {max}")]
    InvertedBounds { min: f64, max: f64 },
}

/// Inclusive range used for both the x and z axes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: -90.0,
            max: 90.0,
        }
    }
}

impl Bounds {
    /// Map a unit sample onto the range.
    pub fn sample(&self, u: f64) -> f64 {
        self.min + u * (self.max - self.min)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(ConfigError::NonFiniteBounds {
                min: self.min,
                max: self.max,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Validated generation parameters.
///
/// Deserializes through [`RawGeneratorConfig`] so that a negative count in a
/// config file is reported as a [`ConfigError`] rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "RawGeneratorConfig")]
pub struct GeneratorConfig {
    count: usize,
    bounds: Bounds,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawGeneratorConfig {
    count: i64,
    bounds: Bounds,
}

impl Default for RawGeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PLANT_COUNT as i64,
            bounds: Bounds::default(),
        }
    }
}

impl TryFrom<RawGeneratorConfig> for GeneratorConfig {
    type Error = ConfigError;

    fn try_from(raw: RawGeneratorConfig) -> Result<Self, Self::Error> {
        Self::new(raw.count, raw.bounds)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PLANT_COUNT,
            bounds: Bounds::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(count: i64, bounds: Bounds) -> Result<Self, ConfigError> {
        let count = usize::try_from(count).map_err(|_| ConfigError::NegativeCount(count))?;
        bounds.validate()?;
        Ok(Self { count, bounds })
    }

    /// Same bounds, different count.
    pub fn with_count(self, count: i64) -> Result<Self, ConfigError> {
        Self::new(count, self.bounds)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

impl PlantKind {
    /// Select a kind from a unit draw: 50% tree, 30% bush, 20% flower.
    pub fn from_draw(t: f64) -> Self {
        if t < TREE_THRESHOLD {
            PlantKind::Tree
        } else if t < BUSH_THRESHOLD {
            PlantKind::Bush
        } else {
            PlantKind::Flower
        }
    }
}

/// Scatter `count` plants uniformly over `bounds` on both ground axes.
///
/// Each plant consumes three draws in order: x, z, then the kind selector.
/// Output order is generation order.
pub fn generate<R: RandomSource + ?Sized>(
    count: usize,
    bounds: Bounds,
    source: &mut R,
) -> Vec<PlacedObject> {
    let plants: Vec<PlacedObject> = (0..count)
        .map(|_| {
            let x = bounds.sample(source.next_unit());
            let z = bounds.sample(source.next_unit());
            let kind = PlantKind::from_draw(source.next_unit());
            PlacedObject::on_ground(kind, x, z)
        })
        .collect();

    tracing::debug!(
        count,
        min = bounds.min,
        max = bounds.max,
        "generated plant scatter"
    );
    plants
}

/// Anything that can produce the initial plant list for a fresh session.
pub trait Generate {
    fn generate(&mut self, config: &GeneratorConfig) -> Vec<PlacedObject>;
}

/// The standard generator: uniform scatter driven by an owned random source.
#[derive(Debug, Clone)]
pub struct WorldGenerator<R> {
    source: R,
}

impl<R: RandomSource> WorldGenerator<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn into_source(self) -> R {
        self.source
    }
}

impl<R: RandomSource> Generate for WorldGenerator<R> {
    fn generate(&mut self, config: &GeneratorConfig) -> Vec<PlacedObject> {
        generate(config.count, config.bounds, &mut self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{RngSource, ScriptedSource};

    #[test]
    fn returns_exactly_count_plants_within_bounds() {
        let bounds = Bounds::default();
        let mut source = RngSource::seeded(42);
        let plants = generate(500, bounds, &mut source);
        assert_eq!(plants.len(), 500);
        for plant in &plants {
            assert!(bounds.contains(plant.position.x));
            assert!(bounds.contains(plant.position.z));
            assert_eq!(plant.position.y, 0.0);
        }
    }

    #[test]
    fn zero_count_yields_empty_world() {
        let mut source = ScriptedSource::new([0.5]);
        assert!(generate(0, Bounds::default(), &mut source).is_empty());
        assert_eq!(source.draws_taken(), 0);
    }

    #[test]
    fn kind_thresholds_break_ties_downward() {
        let mut source = ScriptedSource::new([
            0.0, 0.0, 0.49, //
            0.0, 0.0, 0.79, //
            0.0, 0.0, 0.99,
        ]);
        let kinds: Vec<PlantKind> = generate(3, Bounds::default(), &mut source)
            .iter()
            .map(|p| p.kind)
            .collect();
        assert_eq!(kinds, [PlantKind::Tree, PlantKind::Bush, PlantKind::Flower]);
    }

    #[test]
    fn exact_threshold_values() {
        assert_eq!(PlantKind::from_draw(0.5), PlantKind::Bush);
        assert_eq!(PlantKind::from_draw(0.8), PlantKind::Flower);
        assert_eq!(PlantKind::from_draw(0.0), PlantKind::Tree);
    }

    #[test]
    fn draws_map_onto_default_bounds() {
        let mut source = ScriptedSource::new([0.0, 0.5, 0.1]);
        let plants = generate(1, Bounds::default(), &mut source);
        assert_eq!(plants[0].position.x, -90.0);
        assert_eq!(plants[0].position.z, 0.0);
        assert_eq!(source.draws_taken(), 3);
    }

    #[test]
    fn same_seed_same_world() {
        let config = GeneratorConfig::default();
        let a = WorldGenerator::new(RngSource::seeded(9)).generate(&config);
        let b = WorldGenerator::new(RngSource::seeded(9)).generate(&config);
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_PLANT_COUNT);
    }

    #[test]
    fn kind_mix_roughly_matches_ratio() {
        let mut source = RngSource::seeded(1234);
        let plants = generate(10_000, Bounds::default(), &mut source);
        let trees = plants.iter().filter(|p| p.kind == PlantKind::Tree).count();
        let bushes = plants.iter().filter(|p| p.kind == PlantKind::Bush).count();
        let flowers = plants.len() - trees - bushes;
        assert!((4_700..5_300).contains(&trees), "trees = {trees}");
        assert!((2_700..3_300).contains(&bushes), "bushes = {bushes}");
        assert!((1_700..2_300).contains(&flowers), "flowers = {flowers}");
    }

    #[test]
    fn negative_count_rejected() {
        let err = GeneratorConfig::new(-1, Bounds::default()).unwrap_err();
        assert_eq!(err, ConfigError::NegativeCount(-1));
    }

    #[test]
    fn inverted_or_non_finite_bounds_rejected() {
        let inverted = Bounds {
            min: 10.0,
            max: -10.0,
        };
        assert!(matches!(
            GeneratorConfig::new(5, inverted),
            Err(ConfigError::InvertedBounds { .. })
        ));
        let infinite = Bounds {
            min: f64::NEG_INFINITY,
            max: 0.0,
        };
        assert!(matches!(
            GeneratorConfig::new(5, infinite),
            Err(ConfigError::NonFiniteBounds { .. })
        ));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: GeneratorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());

        let config: GeneratorConfig =
            serde_json::from_str(r#"{"count": 5, "bounds": {"min": -1.0, "max": 1.0}}"#).unwrap();
        assert_eq!(config.count(), 5);
        assert_eq!(config.bounds().max, 1.0);
    }

    #[test]
    fn config_file_with_negative_count_fails() {
        let result = serde_json::from_str::<GeneratorConfig>(r#"{"count": -3}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("must not be negative"), "{err}");
    }
}
