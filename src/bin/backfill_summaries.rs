//! Utility to recompute stored daily summaries for a date range
//!
//! Usage: backfill_summaries <start YYYY-MM-DD> [end YYYY-MM-DD]
//! The end date defaults to today.

use mealstreak::build_info::BuildInfo;
use mealstreak::config::Config;
use mealstreak::db::{self, Database};
use mealstreak::engine::Engine;
use mealstreak::tools::summaries::{backfill_summaries, DayStatus};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(start) = args.next() else {
        eprintln!("Usage: backfill_summaries <start YYYY-MM-DD> [end YYYY-MM-DD]");
        std::process::exit(2);
    };
    let end = args.next();

    let config = Config::from_env();
    println!("{}", BuildInfo::current().label());
    println!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let database = Database::new(&config.database_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let engine = Engine::local(config.streaks);
    let result = backfill_summaries(&database, &engine, &start, end.as_deref())?;

    println!("Recomputed {} days ({} to {}):", result.days, result.start, result.end);
    for summary in &result.summaries {
        let status = match DayStatus::of(summary) {
            DayStatus::GoalsHit => "goals hit",
            DayStatus::Logged => "logged",
            DayStatus::Empty => "-",
        };
        println!(
            "  {}  {:>7.0} kcal / {:>5.0}  {:>5.1} g / {:>5.1}  {}",
            summary.date,
            summary.total_calories,
            summary.calorie_goal,
            summary.total_protein,
            summary.protein_target,
            status
        );
    }

    Ok(())
}
