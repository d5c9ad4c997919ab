//! Shared nutrition totals
//!
//! Used by meals, daily summaries, and the aggregator.

use serde::{Deserialize, Serialize};

/// Calories plus the three tracked macros
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

impl Nutrition {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_of_nothing_is_zero() {
        let total: Nutrition = std::iter::empty().sum();
        assert_eq!(total, Nutrition::zero());
    }

    #[test]
    fn test_sum_adds_fieldwise() {
        let a = Nutrition { calories: 500.0, protein: 30.0, carbs: 40.0, fat: 10.0 };
        let b = Nutrition { calories: 250.0, protein: 5.0, carbs: 0.0, fat: 12.5 };
        let total: Nutrition = vec![a, b].into_iter().sum();
        assert_eq!(total, Nutrition { calories: 750.0, protein: 35.0, carbs: 40.0, fat: 22.5 });
    }
}
