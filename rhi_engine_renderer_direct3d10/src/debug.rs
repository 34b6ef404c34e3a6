/// Direct3D 10 validation reporting
///
/// Backend-reported failures (invalid handles, native limits, unbalanced debug
/// events) are counted in process-wide statistics. Identical messages are grouped:
/// the first occurrence is logged, repeats only bump the counters, so a failure
/// repeated every frame does not flood the log.

use colored::*;
use rhi_engine::{engine_error, engine_warn};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::direct3d10::LOG_SOURCE;

/// Global validation statistics (thread-safe atomic counters)
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Global message tracker for grouping identical messages
static MESSAGE_TRACKER: Mutex<Option<MessageTracker>> = Mutex::new(None);

/// Validation counters snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings
    }
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
        }
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
    }
}

struct MessageTracker {
    messages: FxHashMap<String, u32>,
}

impl MessageTracker {
    fn track_message(&mut self, message: &str) -> u32 {
        let count = self.messages.entry(message.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// Count `message` and return how many times it was seen, this one included
fn track_message(message: &str) -> u32 {
    let mut tracker = MESSAGE_TRACKER.lock().unwrap_or_else(PoisonError::into_inner);
    tracker
        .get_or_insert_with(|| MessageTracker {
            messages: FxHashMap::default(),
        })
        .track_message(message)
}

/// Report a failure that made the backend skip a command or an operation
pub fn report_error(message: &str) {
    VALIDATION_STATS.errors.fetch_add(1, Ordering::Relaxed);
    if track_message(message) == 1 {
        engine_error!(LOG_SOURCE, "{}", message);
    }
}

/// Report a suspicious but tolerated situation
pub fn report_warning(message: &str) {
    VALIDATION_STATS.warnings.fetch_add(1, Ordering::Relaxed);
    if track_message(message) == 1 {
        engine_warn!(LOG_SOURCE, "{}", message);
    }
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

/// Zero the counters and forget grouped messages
pub fn reset_validation_stats() {
    VALIDATION_STATS.reset();
    *MESSAGE_TRACKER.lock().unwrap_or_else(PoisonError::into_inner) = None;
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Direct3D 10 Validation Report ===".bright_blue().bold());

    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());

    let tracker = MESSAGE_TRACKER.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(tracker) = tracker.as_ref() {
        let mut repeated: Vec<(&String, &u32)> = tracker.messages.iter().filter(|(_, count)| **count > 1).collect();
        repeated.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if !repeated.is_empty() {
            println!("\n  {} {} message(s) appeared multiple times", "ℹ".cyan(), repeated.len());
            for (message, count) in repeated {
                println!("    {} {}", format!("x{}", count).bright_black(), message);
            }
        }
    }

    println!("{}\n", "=====================================".bright_blue().bold());
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
