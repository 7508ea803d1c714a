//! Scoring Engine
//!
//! Pure functions that turn persisted activity into the numbers the UI shows:
//!
//! - **breakdown**: today's per-pillar XP and total (`DailyBreakdown`)
//! - **streaks**: consecutive-day runs per pillar (`Streaks`)
//! - **weekly**: fixed 7-day chart series
//!
//! Nothing here touches storage; the tracker loads state and passes slices in.
//! "Which day" questions are answered by a [`Clock`](crate::tracker::Clock).

pub mod breakdown;
pub mod streaks;
pub mod weekly;

pub use breakdown::{daily_breakdown, meal_xp, nutrition_raw_for_day};
pub use streaks::{compute_streaks, streak_ending_at, ActivityDays};
pub use weekly::{weekly_detailed_stats, weekly_wellness_history, WEEK_LENGTH};

use serde::Deserialize;

/// Point values and daily goals
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScoringRules {
    /// XP for a completed healthy meal without an explicit score
    #[serde(default = "default_healthy_meal_xp")]
    pub healthy_meal_xp: i32,

    /// XP for a completed unhealthy meal without an explicit score
    #[serde(default = "default_unhealthy_meal_xp")]
    pub unhealthy_meal_xp: i32,

    #[serde(default = "default_nutrition_goal")]
    pub nutrition_goal: u32,

    #[serde(default = "default_xp_per_exercise_minute")]
    pub xp_per_exercise_minute: u32,

    #[serde(default = "default_exercise_goal")]
    pub exercise_goal: u32,

    #[serde(default = "default_xp_per_water_cup")]
    pub xp_per_water_cup: u32,

    #[serde(default = "default_hydration_goal")]
    pub hydration_goal: u32,

    /// Cups shown as the hydration target in labels
    #[serde(default = "default_daily_cup_goal")]
    pub daily_cup_goal: u32,

    /// Lower bound applied to advisory score impacts
    #[serde(default = "default_score_impact_min")]
    pub score_impact_min: i32,

    /// Upper bound applied to advisory score impacts
    #[serde(default = "default_score_impact_max")]
    pub score_impact_max: i32,
}

fn default_healthy_meal_xp() -> i32 {
    100
}

fn default_unhealthy_meal_xp() -> i32 {
    -50
}

fn default_nutrition_goal() -> u32 {
    500
}

fn default_xp_per_exercise_minute() -> u32 {
    5
}

fn default_exercise_goal() -> u32 {
    300
}

fn default_xp_per_water_cup() -> u32 {
    25
}

fn default_hydration_goal() -> u32 {
    200
}

fn default_daily_cup_goal() -> u32 {
    8
}

fn default_score_impact_min() -> i32 {
    -100
}

fn default_score_impact_max() -> i32 {
    150
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            healthy_meal_xp: default_healthy_meal_xp(),
            unhealthy_meal_xp: default_unhealthy_meal_xp(),
            nutrition_goal: default_nutrition_goal(),
            xp_per_exercise_minute: default_xp_per_exercise_minute(),
            exercise_goal: default_exercise_goal(),
            xp_per_water_cup: default_xp_per_water_cup(),
            hydration_goal: default_hydration_goal(),
            daily_cup_goal: default_daily_cup_goal(),
            score_impact_min: default_score_impact_min(),
            score_impact_max: default_score_impact_max(),
        }
    }
}

impl ScoringRules {
    /// Default XP for a meal verdict
    pub fn default_meal_xp(&self, is_healthy: bool) -> i32 {
        if is_healthy {
            self.healthy_meal_xp
        } else {
            self.unhealthy_meal_xp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let rules = ScoringRules::default();
        assert_eq!(rules.default_meal_xp(true), 100);
        assert_eq!(rules.default_meal_xp(false), -50);
        assert_eq!(rules.nutrition_goal, 500);
        assert_eq!(rules.exercise_goal, 300);
        assert_eq!(rules.hydration_goal, 200);
    }

    #[test]
    fn test_partial_rules_from_toml() {
        let rules: ScoringRules = toml::from_str("hydration_goal = 250").unwrap();
        assert_eq!(rules.hydration_goal, 250);
        assert_eq!(rules.xp_per_water_cup, 25);
    }
}
