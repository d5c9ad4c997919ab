//! Data reset MCP Tool

use serde::Serialize;

use crate::db::{Database, DbError};
use crate::models::{DailySummary, Meal, Streak, UserProfile};

/// Rows removed by reset_all_data
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResetResponse {
    pub meals_deleted: usize,
    pub summaries_deleted: usize,
    pub streaks_deleted: usize,
    pub profile_deleted: bool,
}

/// Delete every meal, summary, streak, and the profile, in one transaction.
/// The only path that removes summaries.
pub fn reset_all_data(db: &Database) -> Result<ResetResponse, String> {
    let response = db
        .transaction(|tx| {
            Ok::<_, DbError>(ResetResponse {
                meals_deleted: Meal::delete_all(tx)?,
                summaries_deleted: DailySummary::delete_all(tx)?,
                streaks_deleted: Streak::delete_all(tx)?,
                profile_deleted: UserProfile::delete(tx)?,
            })
        })
        .map_err(|e| format!("Failed to reset data: {}", e))?;

    tracing::warn!(
        meals = response.meals_deleted,
        summaries = response.summaries_deleted,
        streaks = response.streaks_deleted,
        "all data reset"
    );
    Ok(response)
}
