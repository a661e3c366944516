//! Navigation tunables.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every constant the navigator and the per-turn analysis depend on.
///
/// Scenario files may carry a partial object; missing fields take the
/// defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Leaving a cell costs `resource / move_cost_ratio` (default: 10).
    pub move_cost_ratio: u32,
    /// Maximum resource a unit may carry (default: 1000).
    pub capacity: u32,
    /// A rival is worth attacking when its value exceeds ours by this factor (default: 1.75).
    pub combat_value_ratio: f64,
    /// Margin our value needs over a neighbouring rival's to risk a cell it could claim (default: 1.25).
    pub caution_ratio: f64,
    /// Start-cell resource at or above which a unit may swap with a friend (default: 10).
    pub swap_resource_threshold: u32,
    /// A non-closer neighbour is attractive with this much more resource than the start (default: 1.5).
    pub detour_resource_ratio: f64,
    /// Wall-clock budget for resolution per turn, in milliseconds (default: 1900).
    pub turn_budget_ms: u64,
    /// Radius of the inspiration disc (default: 4).
    pub inspiration_radius: i32,
    /// Rival units within the inspiration radius needed to inspire a cell (default: 2).
    pub inspiration_ship_count: u32,
    /// Extraction multiplier on an inspired cell (default: 3).
    pub inspired_multiplier: u32,
    /// One turn of mining extracts `ceil(resource / extraction_ratio)` (default: 4).
    pub extraction_ratio: u32,
    /// Radius for counting allies and rivals around a cell (default: 4).
    pub presence_radius: i32,
    /// Combat is favourable when allies exceed rivals by this factor (default: 1.35).
    pub combat_presence_ratio: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            move_cost_ratio: 10,
            capacity: 1000,
            combat_value_ratio: 1.75,
            caution_ratio: 1.25,
            swap_resource_threshold: 10,
            detour_resource_ratio: 1.5,
            turn_budget_ms: 1900,
            inspiration_radius: 4,
            inspiration_ship_count: 2,
            inspired_multiplier: 3,
            extraction_ratio: 4,
            presence_radius: 4,
            combat_presence_ratio: 1.35,
        }
    }
}

impl NavConfig {
    /// The per-turn resolution budget.
    #[must_use]
    pub const fn turn_budget(&self) -> Duration {
        Duration::from_millis(self.turn_budget_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: NavConfig =
            serde_json::from_str(r#"{ "capacity": 500, "turn_budget_ms": 50 }"#).unwrap();
        assert_eq!(config.capacity, 500);
        assert_eq!(config.turn_budget(), Duration::from_millis(50));
        assert_eq!(config.move_cost_ratio, 10);
        assert_eq!(config.swap_resource_threshold, 10);
        assert!((config.combat_value_ratio - 1.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: NavConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, NavConfig::default());
    }
}
