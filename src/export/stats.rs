//! Statistics display
//!
//! Formats the stored registry's aggregate counts and the most recent run
//! for the terminal.

use crate::storage::{RunLog, StoreStatistics};

/// Prints registry statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - Aggregate counts loaded from the store
/// * `last_run` - The most recent run entry, if one exists
pub fn print_statistics(stats: &StoreStatistics, last_run: Option<&RunLog>) {
    println!("=== Registry Statistics ===\n");

    println!("Overview:");
    println!("  Active companies: {}", stats.active_companies);
    println!("  Delisted companies: {}", stats.delisted_companies);
    println!("  Harvest runs recorded: {}", stats.total_runs);
    println!();

    if !stats.by_market.is_empty() {
        println!("Active Companies by Market:");
        for (market, count) in &stats.by_market {
            let percentage = if stats.active_companies > 0 {
                (*count as f64 / stats.active_companies as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", market, count, percentage);
        }
        println!();
    }

    if !stats.by_shariah_board.is_empty() {
        println!("Active Companies by Certifying Board:");
        for (board, count) in &stats.by_shariah_board {
            println!("  {}: {}", board, count);
        }
        println!();
    }

    match last_run {
        Some(run) => {
            println!("Last Run:");
            println!("  At: {}", run.run_at.to_rfc3339());
            println!("  Status: {}", run.status.to_db_string());
            println!("  Companies: {}", run.total_companies);
            println!(
                "  Changes: {} new, {} updated, {} delisted",
                run.new_companies, run.updated_companies, run.delisted_companies
            );
            println!("  Duration: {}s", run.duration_seconds);
            if let Some(error) = &run.error_message {
                println!("  Errors: {}", error);
            }
        }
        None => println!("No harvest runs recorded yet."),
    }
}
