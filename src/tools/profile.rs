//! Profile MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::engine::Targets;
use crate::models::{ProfileSet, UserProfile};

/// Profile plus the daily targets derived from it
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// `None` until a profile has been set; targets then use the defaults
    pub profile: Option<UserProfile>,
    pub targets: Targets,
}

pub fn get_profile(db: &Database) -> Result<ProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::get(&conn).map_err(|e| format!("Failed to get profile: {}", e))?;
    Ok(ProfileResponse {
        targets: Targets::for_profile(profile.as_ref()),
        profile,
    })
}

/// Set or replace the profile. Existing summaries keep the goals they were
/// computed with.
pub fn set_profile(db: &Database, name: String, weight_kg: f64, calorie_goal: f64) -> Result<ProfileResponse, String> {
    let data = ProfileSet {
        name,
        weight_kg,
        calorie_goal,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = UserProfile::set(&conn, &data).map_err(|e| format!("Failed to set profile: {}", e))?;
    tracing::info!(weight_kg, calorie_goal, "profile updated");

    Ok(ProfileResponse {
        targets: Targets::for_profile(Some(&profile)),
        profile: Some(profile),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::setup;

    #[test]
    fn test_defaults_before_profile_is_set() {
        let db = setup();
        let response = get_profile(&db).unwrap();
        assert!(response.profile.is_none());
        assert_eq!(response.targets.calorie_goal, 2000.0);
        assert_eq!(response.targets.protein_target, 84.0);
    }

    #[test]
    fn test_set_profile_derives_targets() {
        let db = setup();
        let response = set_profile(&db, "Sam".into(), 80.0, 2200.0).unwrap();
        assert_eq!(response.targets.calorie_goal, 2200.0);
        assert!((response.targets.protein_target - 96.0).abs() < 1e-9);

        let again = set_profile(&db, "Sam".into(), 75.0, 2100.0).unwrap();
        assert_eq!(again.profile.unwrap().weight_kg, 75.0);
    }

    #[test]
    fn test_set_profile_rejects_zero_goal() {
        let db = setup();
        assert!(set_profile(&db, "Sam".into(), 70.0, 0.0).is_err());
        assert!(set_profile(&db, "Sam".into(), -1.0, 2000.0).is_err());
    }
}
