use serde::{Deserialize, Serialize};

/// Tuning coefficients the game loop applies to the next session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// 0.5 (easy) to 2.0 (hard).
    pub drop_speed_multiplier: f64,
    /// Highest piece tier that may spawn.
    pub max_fruit_tier: u32,
    /// Physics gravity scale.
    pub gravity_multiplier: f64,
    /// Distinct piece kinds in the spawn rotation.
    pub spawn_variety: u32,
}

impl DifficultyParams {
    pub const EASY: Self = Self {
        drop_speed_multiplier: 0.6,
        max_fruit_tier: 3,
        gravity_multiplier: 0.8,
        spawn_variety: 3,
    };

    pub const NORMAL: Self = Self {
        drop_speed_multiplier: 1.0,
        max_fruit_tier: 5,
        gravity_multiplier: 1.0,
        spawn_variety: 5,
    };

    pub const HARD: Self = Self {
        drop_speed_multiplier: 1.4,
        max_fruit_tier: 7,
        gravity_multiplier: 1.2,
        spawn_variety: 7,
    };
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_normal() {
        assert_eq!(DifficultyParams::default(), DifficultyParams::NORMAL);
    }

    #[test]
    fn presets_are_ordered() {
        let (e, n, h) = (DifficultyParams::EASY, DifficultyParams::NORMAL, DifficultyParams::HARD);
        assert!(e.drop_speed_multiplier < n.drop_speed_multiplier);
        assert!(n.drop_speed_multiplier < h.drop_speed_multiplier);
        assert!(e.max_fruit_tier < n.max_fruit_tier && n.max_fruit_tier < h.max_fruit_tier);
        assert!(e.spawn_variety < h.spawn_variety);
    }
}
