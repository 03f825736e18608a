//! Combat Telemetry - Entry Point
//!
//! Interactive loop for driving the telemetry engine by hand: start a
//! session, feed it events, watch live stats, end and inspect reports.
//! The real deployment embeds the library in an automation loop; this
//! binary exists for manual testing and demos.

use combat_telemetry::core::error::Result;
use combat_telemetry::{CombatTelemetry, TelemetryConfig};

use std::io::{self, Write};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("combat_telemetry=debug")
        .init();

    tracing::info!("Combat telemetry starting...");

    let config = match std::fs::read_to_string("telemetry.toml") {
        Ok(text) => match TelemetryConfig::from_toml_str(&text) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Invalid telemetry.toml ({}), using defaults", e);
                TelemetryConfig::default()
            }
        },
        Err(_) => TelemetryConfig::default(),
    };

    let mut engine = CombatTelemetry::open("sessions", config)?;

    println!("\n=== COMBAT TELEMETRY ===");
    println!("Live session recording and rotation analysis");
    println!();
    println!("Commands:");
    println!("  start [id]                    - Start a session");
    println!("  use <ability> <target> <dmg> <xp> - Record an ability use");
    println!("  kill <enemy> <xp>             - Record an enemy kill");
    println!("  death                         - Record a player death");
    println!("  stats                         - Show live session stats");
    println!("  end                           - End the session and save it");
    println!("  report <id>                   - Performance report for a session");
    println!("  rotation                      - Cross-session rotation statistics");
    println!("  quit / q                      - Exit");

    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        let outcome = match parts.as_slice() {
            &["start"] => engine.start_session(None).map(|id| {
                println!("Session started: {}", id);
            }),
            &["start", id] => engine.start_session(Some(id.to_string())).map(|id| {
                println!("Session started: {}", id);
            }),
            &["use", ability, target, damage, xp] => {
                let damage: f64 = damage.parse().unwrap_or(0.0);
                let xp: f64 = xp.parse().unwrap_or(0.0);
                let result =
                    engine.record_ability_use(ability, target, damage, "unknown", true, 0.0, xp);
                if result.is_ok() {
                    println!("  current dps: {:.1}", engine.current_dps());
                }
                result
            }
            &["kill", enemy, xp] => {
                let xp: f64 = xp.parse().unwrap_or(0.0);
                engine.record_enemy_kill(enemy, xp)
            }
            &["death"] => engine.record_player_death(),
            &["stats"] => {
                println!("{:#}", engine.session_stats());
                Ok(())
            }
            &["end"] => engine.end_session().map(|end| {
                println!(
                    "Session {} ended: {:.1} dps over {:.0}s",
                    end.summary.session_id, end.summary.dps, end.summary.duration
                );
                if let Some(e) = end.persistence_error {
                    println!("WARNING: summary not persisted: {}", e);
                }
            }),
            &["report", id] => match engine.get_performance_report(id) {
                Ok(Some(report)) => {
                    println!("{:#}", report);
                    Ok(())
                }
                Ok(None) => {
                    println!("No such session: {}", id);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            &["rotation"] => engine.get_rotation_statistics().map(|stats| {
                println!("{:#}", stats);
            }),
            &["quit"] | &["q"] => break,
            &[] => Ok(()),
            _ => {
                println!("Unknown command");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("Error: {}", e);
        }
    }

    tracing::info!("Combat telemetry shutting down");
    Ok(())
}
