//! Data models
//!
//! Rust structs representing database entities.

mod daily_summary;
pub mod dates;
mod meal;
mod nutrition;
mod profile;
mod streak;

pub use daily_summary::{DailySummary, SummaryFigures};
pub use meal::{Meal, MealCreate, MealOrigin, MealUpdate};
pub use nutrition::Nutrition;
pub use profile::{ProfileSet, UserProfile};
pub use streak::{Streak, StreakKind};
