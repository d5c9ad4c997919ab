//! Meal Streak MCP Server Implementation
//!
//! Implements the MCP server with all meal streak tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::engine::Engine;
use crate::tools::status::{StatusTracker, USAGE_INSTRUCTIONS};
use crate::tools::{data, meals, profile, streaks, summaries};

/// Meal Streak MCP Service
#[derive(Clone)]
pub struct MealStreakService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    engine: Engine<Local>,
    tool_router: ToolRouter<MealStreakService>,
}

impl MealStreakService {
    pub fn new(database_path: PathBuf, database: Database, engine: Engine<Local>) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, *engine.options()))),
            database,
            engine,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    /// RFC 3339; defaults to now
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogEstimatedMealParams {
    /// Raw body returned by the estimation service
    pub response_body: String,
    pub notes: Option<String>,
    pub request_id: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MealIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealParams {
    pub id: i64,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub timestamp: Option<String>,
}

// ============================================================================
// Profile / Summary / Streak Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProfileParams {
    #[serde(default)]
    pub name: String,
    pub weight_kg: f64,
    pub calorie_goal: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// YYYY-MM-DD; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListSummariesParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_summary_limit")]
    pub limit: i64,
}

fn default_summary_limit() -> i64 { 31 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecentActivityParams {
    /// Days to look back (default 30)
    pub days: Option<u64>,
    /// Maximum entries (default 7)
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BackfillParams {
    pub start_date: String,
    /// Defaults to today
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResetParams {
    /// Must be true; guards against accidental wipes
    #[serde(default)]
    pub force: bool,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl MealStreakService {
    // --- Status ---

    #[tool(description = "Get the current status of the meal streak service including build info, database status, streak options, and process information")]
    async fn status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for logging meals, goals, and streaks. Call this when starting a new session.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Meals ---

    #[tool(description = "Log a meal entered by hand. Calories required; protein, carbs, and fat in grams are optional.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let meal = meals::log_meal(&self.database, p.title, p.notes, p.calories, p.protein, p.carbs, p.fat, p.timestamp.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&meal)
    }

    #[tool(description = "Log a meal from a photo estimation response body (JSON with calories, proteinG, carbsG, fatG, label). Unreadable bodies log a 0-calorie meal flagged for manual entry.")]
    fn log_estimated_meal(&self, Parameters(p): Parameters<LogEstimatedMealParams>) -> Result<CallToolResult, McpError> {
        let result = meals::log_estimated_meal(&self.database, &p.response_body, p.notes, p.request_id, p.timestamp.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a meal by ID")]
    fn get_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => serde_json::to_string_pretty(&meal),
            None => Ok(format!(r#"{{"error": "Meal not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Edit a meal. Only supplied fields change; the meal is marked as edited.")]
    fn update_meal(&self, Parameters(p): Parameters<UpdateMealParams>) -> Result<CallToolResult, McpError> {
        let result = meals::update_meal(&self.database, p.id, p.title, p.notes, p.calories, p.protein, p.carbs, p.fat, p.timestamp.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(meal) => serde_json::to_string_pretty(&meal),
            None => Ok(format!(r#"{{"error": "Meal not found", "id": {}}}"#, p.id)),
        }.map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Delete a meal")]
    fn delete_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let deleted = meals::delete_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        let json = serde_json::json!({"success": deleted, "id": p.id}).to_string();
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List the meals logged on a day (default today) with their totals")]
    fn list_meals(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meals(&self.database, &self.engine, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Profile ---

    #[tool(description = "Get the user profile and the daily calorie goal and protein target derived from it")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Set the user profile: name, weight in kg (protein target is 1.2 g/kg), and daily calorie goal")]
    fn set_profile(&self, Parameters(p): Parameters<SetProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::set_profile(&self.database, p.name, p.weight_kg, p.calorie_goal)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Summaries ---

    #[tool(description = "Recompute and store the daily summary (totals and goal flags) for a day, default today")]
    fn compute_daily_summary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = summaries::compute_daily_summary(&self.database, &self.engine, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List stored daily summaries in a date range, newest first")]
    fn list_summaries(&self, Parameters(p): Parameters<ListSummariesParams>) -> Result<CallToolResult, McpError> {
        let result = summaries::list_summaries(&self.database, p.start_date.as_deref(), p.end_date.as_deref(), p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Recent stored summaries with a status per day: goals_hit, logged, or empty")]
    fn recent_activity(&self, Parameters(p): Parameters<RecentActivityParams>) -> Result<CallToolResult, McpError> {
        let result = summaries::recent_activity(&self.database, &self.engine, p.days, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Live totals and progress toward the calorie goal and protein target for a day, default today. Does not store anything.")]
    fn daily_progress(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = summaries::daily_progress(&self.database, &self.engine, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Recompute the stored summaries for every day in a date range (at most 366 days)")]
    fn backfill_summaries(&self, Parameters(p): Parameters<BackfillParams>) -> Result<CallToolResult, McpError> {
        let result = summaries::backfill_summaries(&self.database, &self.engine, &p.start_date, p.end_date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Streaks ---

    #[tool(description = "Evaluate a day (default today) for the logging and goal streaks. Safe to call repeatedly; a day already counted is skipped.")]
    fn update_streaks(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = streaks::update_streaks(&self.database, &self.engine, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the current and longest logging and goal streaks")]
    fn get_streaks(&self) -> Result<CallToolResult, McpError> {
        let result = streaks::get_streaks(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Data ---

    #[tool(description = "Delete all meals, summaries, streaks, and the profile. Requires force=true.")]
    fn reset_all_data(&self, Parameters(p): Parameters<ResetParams>) -> Result<CallToolResult, McpError> {
        if !p.force {
            return Err(McpError::invalid_params("reset_all_data requires force=true", None));
        }
        let result = data::reset_all_data(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for MealStreakService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealstreak".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Meal Streak Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Meal Streak Tracker - meal logging, daily summaries, and logging/goal streaks. \
                 Call usage_instructions first. \
                 Meals: log_meal/log_estimated_meal/get_meal/update_meal/delete_meal/list_meals. \
                 Profile: get_profile/set_profile. \
                 Summaries: compute_daily_summary/list_summaries/recent_activity/daily_progress/backfill_summaries. \
                 Streaks: update_streaks/get_streaks. \
                 Data: reset_all_data (force=true)."
                    .into(),
            ),
        }
    }
}
