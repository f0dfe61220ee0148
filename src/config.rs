//! Adapter configuration: window, smoothing and calibration constants.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::DifficultyParams;

/// Construction-time settings for a [`DifficultyAdapter`](crate::DifficultyAdapter).
///
/// Every field has a serde default, so a partial JSON document (or `{}`)
/// deserializes into a usable config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Sessions kept after a trim. History may grow to twice this before trimming.
    #[serde(default = "AdapterConfig::default_window_size")]
    pub window_size: usize,
    /// EMA smoothing factor in (0, 1]; higher weighs recent sessions more.
    #[serde(default = "AdapterConfig::default_ema_alpha")]
    pub ema_alpha: f64,
    #[serde(default)]
    pub calibration: SkillCalibration,
    #[serde(default)]
    pub anchors: DifficultyAnchors,
}

impl AdapterConfig {
    const fn default_window_size() -> usize {
        20
    }

    const fn default_ema_alpha() -> f64 {
        0.3
    }

    /// Defaults with a different window and smoothing factor.
    pub fn with_window(window_size: usize, ema_alpha: f64) -> Self {
        Self {
            window_size,
            ema_alpha,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the matching
    /// variant for any invariant violation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(ConfigError::AlphaOutOfRange(self.ema_alpha));
        }
        self.calibration.validate()?;
        self.anchors.validate()
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            window_size: Self::default_window_size(),
            ema_alpha: Self::default_ema_alpha(),
            calibration: SkillCalibration::default(),
            anchors: DifficultyAnchors::default(),
        }
    }
}

/// Constants that turn smoothed metrics into a skill scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillCalibration {
    /// Score-per-second treated as expert pace (signal = 1).
    #[serde(default = "SkillCalibration::default_reference_sps")]
    pub reference_score_per_second: f64,
    /// Weight of the merge signal; the score-rate signal gets the remainder.
    #[serde(default = "SkillCalibration::default_merge_weight")]
    pub merge_weight: f64,
    /// Merge ratio below which a session counts as a struggle.
    #[serde(default = "SkillCalibration::default_struggle_ratio")]
    pub struggle_merge_ratio: f64,
    /// Consecutive most-recent struggling sessions needed to flag the player.
    #[serde(default = "SkillCalibration::default_struggle_streak")]
    pub struggle_streak: usize,
}

impl SkillCalibration {
    const fn default_reference_sps() -> f64 {
        50.0
    }

    const fn default_merge_weight() -> f64 {
        0.6
    }

    const fn default_struggle_ratio() -> f64 {
        0.2
    }

    const fn default_struggle_streak() -> usize {
        3
    }

    #[inline]
    pub fn score_rate_weight(&self) -> f64 {
        1.0 - self.merge_weight
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let r = self.reference_score_per_second;
        if !(r > 0.0 && r.is_finite()) {
            return Err(ConfigError::ReferenceRate(r));
        }
        if !(0.0..=1.0).contains(&self.merge_weight) {
            return Err(ConfigError::MergeWeight(self.merge_weight));
        }
        if !(0.0..=1.0).contains(&self.struggle_merge_ratio) {
            return Err(ConfigError::StruggleRatio(self.struggle_merge_ratio));
        }
        if self.struggle_streak == 0 {
            return Err(ConfigError::ZeroStreak);
        }
        Ok(())
    }
}

impl Default for SkillCalibration {
    fn default() -> Self {
        Self {
            reference_score_per_second: Self::default_reference_sps(),
            merge_weight: Self::default_merge_weight(),
            struggle_merge_ratio: Self::default_struggle_ratio(),
            struggle_streak: Self::default_struggle_streak(),
        }
    }
}

/// Interpolation endpoints: `low` at skill 0, `high` at skill 1.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAnchors {
    #[serde(default = "DifficultyAnchors::default_low")]
    pub low: DifficultyParams,
    #[serde(default = "DifficultyAnchors::default_high")]
    pub high: DifficultyParams,
}

impl DifficultyAnchors {
    const fn default_low() -> DifficultyParams {
        DifficultyParams::EASY
    }

    const fn default_high() -> DifficultyParams {
        DifficultyParams {
            drop_speed_multiplier: 1.6,
            max_fruit_tier: 8,
            gravity_multiplier: 1.3,
            spawn_variety: 7,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let (lo, hi) = (&self.low, &self.high);
        let pairs = [
            ("drop_speed_multiplier", lo.drop_speed_multiplier, hi.drop_speed_multiplier),
            ("max_fruit_tier", f64::from(lo.max_fruit_tier), f64::from(hi.max_fruit_tier)),
            ("gravity_multiplier", lo.gravity_multiplier, hi.gravity_multiplier),
            ("spawn_variety", f64::from(lo.spawn_variety), f64::from(hi.spawn_variety)),
        ];
        for (field, low, high) in pairs {
            if !(low <= high) {
                return Err(ConfigError::InvertedAnchor { field, low, high });
            }
        }
        Ok(())
    }
}

impl Default for DifficultyAnchors {
    fn default() -> Self {
        Self {
            low: Self::default_low(),
            high: Self::default_high(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let cfg = AdapterConfig::default();
        assert_eq!(cfg.window_size, 20);
        assert_eq!(cfg.ema_alpha, 0.3);
        assert_eq!(cfg.calibration.reference_score_per_second, 50.0);
        assert!((cfg.calibration.score_rate_weight() - 0.4).abs() < 1e-12);
        assert_eq!(cfg.anchors.high.max_fruit_tier, 8);
        cfg.validate().unwrap();
    }

    #[test]
    fn empty_json_is_default() {
        let cfg = AdapterConfig::from_json("{}").unwrap();
        assert_eq!(cfg, AdapterConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let cfg =
            AdapterConfig::from_json(r#"{ "ema_alpha": 0.5, "calibration": { "struggle_streak": 4 } }"#)
                .unwrap();
        assert_eq!(cfg.ema_alpha, 0.5);
        assert_eq!(cfg.window_size, 20);
        assert_eq!(cfg.calibration.struggle_streak, 4);
        assert_eq!(cfg.calibration.merge_weight, 0.6);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            AdapterConfig::with_window(0, 0.3).validate(),
            Err(ConfigError::ZeroWindow)
        ));
        assert!(matches!(
            AdapterConfig::with_window(5, 0.0).validate(),
            Err(ConfigError::AlphaOutOfRange(_))
        ));
        assert!(matches!(
            AdapterConfig::with_window(5, f64::NAN).validate(),
            Err(ConfigError::AlphaOutOfRange(_))
        ));
        AdapterConfig::with_window(5, 1.0).validate().unwrap();

        let mut cfg = AdapterConfig::default();
        cfg.anchors.high.gravity_multiplier = 0.1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedAnchor { field: "gravity_multiplier", .. })
        ));

        let mut cfg = AdapterConfig::default();
        cfg.calibration.reference_score_per_second = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::ReferenceRate(_))));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            AdapterConfig::from_json("{ window_size: "),
            Err(ConfigError::Parse(_))
        ));
    }
}
