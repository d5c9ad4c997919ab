//! Goal evaluation for a day's totals

use serde::Serialize;

use crate::models::{Nutrition, UserProfile};

/// Calorie goal used when no profile exists
pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

/// Body weight used when no profile exists
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Daily protein target per kilogram of body weight
pub const PROTEIN_G_PER_KG: f64 = 1.2;

/// Daily targets derived from the profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Targets {
    pub calorie_goal: f64,
    pub protein_target: f64,
}

impl Targets {
    pub fn for_profile(profile: Option<&UserProfile>) -> Self {
        let calorie_goal = profile.map_or(DEFAULT_CALORIE_GOAL, |p| p.calorie_goal);
        let weight_kg = profile.map_or(DEFAULT_WEIGHT_KG, |p| p.weight_kg);
        Self {
            calorie_goal,
            protein_target: weight_kg * PROTEIN_G_PER_KG,
        }
    }
}

/// Whether a day's totals met its targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalEvaluation {
    pub calorie_goal: f64,
    pub protein_target: f64,
    /// At or under the calorie goal
    pub hit_calorie_goal: bool,
    /// At or over the protein target
    pub hit_protein_goal: bool,
}

impl GoalEvaluation {
    /// Both goals met; what the goal streak counts
    pub fn hit_all(&self) -> bool {
        self.hit_calorie_goal && self.hit_protein_goal
    }
}

pub fn evaluate(totals: &Nutrition, profile: Option<&UserProfile>) -> GoalEvaluation {
    let targets = Targets::for_profile(profile);
    GoalEvaluation {
        calorie_goal: targets.calorie_goal,
        protein_target: targets.protein_target,
        hit_calorie_goal: totals.calories <= targets.calorie_goal,
        hit_protein_goal: totals.protein >= targets.protein_target,
    }
}
