//! Headless Report Generator
//!
//! Reads a session store directory and prints aggregate, dead-skill,
//! ranking or comparison reports as JSON or text for downstream tooling.

use clap::Parser;

use combat_telemetry::core::error::Result;
use combat_telemetry::{
    PerformanceAnalyzer, RotationAnalyzer, SessionStore, TelemetryConfig,
};

/// Headless report generator over a session store
#[derive(Parser, Debug)]
#[command(name = "telemetry_report")]
#[command(about = "Generate combat telemetry reports from stored sessions")]
struct Args {
    /// Directory holding the per-session JSON records
    #[arg(long, default_value = "sessions")]
    store_dir: String,

    /// Print aggregate statistics over every stored session
    #[arg(long)]
    aggregate: bool,

    /// Print the dead-skill report
    #[arg(long)]
    dead_skills: bool,

    /// Print the N most efficient rotations
    #[arg(long)]
    top: Option<usize>,

    /// Compare two or more sessions by id
    #[arg(long, num_args = 2..)]
    compare: Vec<String>,

    /// Performance report for one session id
    #[arg(long)]
    session: Option<String>,

    /// Config file with tuned thresholds (TOML)
    #[arg(long)]
    config: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("combat_telemetry=info")
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(combat_telemetry::PersistenceError::from)?;
            match TelemetryConfig::from_toml_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Invalid config {}: {}", path, e);
                    std::process::exit(2);
                }
            }
        }
        None => TelemetryConfig::default(),
    };

    let store = SessionStore::open(&args.store_dir)?;
    let rotation = RotationAnalyzer::new(config.clone());
    let performance = PerformanceAnalyzer::new(config);
    let json_output = args.format == "json";

    if args.aggregate {
        let stats = store.aggregate_statistics()?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&stats).map_err(combat_telemetry::PersistenceError::from)?);
        } else {
            println!(
                "{} sessions, {:.0}s total, {:.0} damage, avg {:.1} dps",
                stats.total_sessions,
                stats.total_duration_seconds,
                stats.total_damage,
                stats.average_dps
            );
        }
    }

    if args.dead_skills {
        let summaries: Vec<_> = store
            .load_all()?
            .into_iter()
            .map(|r| r.summary)
            .collect();
        let dead = rotation.find_dead_skills(&summaries);
        if json_output {
            println!("{}", serde_json::to_string_pretty(&dead).map_err(combat_telemetry::PersistenceError::from)?);
        } else {
            for skill in dead {
                println!(
                    "{}: {} uses ({:.2}%) - {}",
                    skill.skill_name,
                    skill.usage_count,
                    skill.usage_percentage,
                    skill.recommended_action.as_str()
                );
            }
        }
    }

    if let Some(limit) = args.top {
        let corpus = store.load_all()?;
        let ranked = rotation.rank_most_efficient(&corpus, limit);
        if json_output {
            println!("{}", serde_json::to_string_pretty(&ranked).map_err(combat_telemetry::PersistenceError::from)?);
        } else {
            for (i, analysis) in ranked.iter().enumerate() {
                println!(
                    "{}. {} score={:.3} dps={:.1}",
                    i + 1,
                    analysis.rotation_id,
                    analysis.efficiency_score,
                    analysis.dps
                );
            }
        }
    }

    if !args.compare.is_empty() {
        let report = store.compare(&args.compare)?;
        if json_output {
            println!("{}", serde_json::to_string_pretty(&report).map_err(combat_telemetry::PersistenceError::from)?);
        } else {
            println!(
                "best: {} (dps {:.1}..{:.1})",
                report.best_performing_session, report.dps_range.min, report.dps_range.max
            );
        }
    }

    if let Some(id) = &args.session {
        match store.load(id)? {
            Some(record) => {
                let report =
                    combat_telemetry::report::performance_report(&performance, &record.summary);
                println!("{:#}", report);
            }
            None => {
                eprintln!("No such session: {}", id);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
