/*!
 * Scheduler Reports
 * Shell-style rendering of snapshots and the sinks that receive them
 */

use crate::core::config::ReportMode;
use crate::process::scheduler::Snapshot;
use crate::process::types::ItemView;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::info;

const RULE: &str = "---------------------------";

/// Destination for periodic snapshots
pub trait ReportSink: Send + Sync {
    fn report(&self, snapshot: &Snapshot);
}

/// Prints the rendered report to stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn report(&self, snapshot: &Snapshot) {
        println!("{}", snapshot);
    }
}

/// Emits the snapshot as a structured tracing event
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, snapshot: &Snapshot) {
        let levels = serde_json::to_string(&snapshot.levels).unwrap_or_default();
        let waiting = serde_json::to_string(&snapshot.waiting).unwrap_or_default();
        info!(
            tick = snapshot.tick,
            running = snapshot.running,
            detached = snapshot.detached,
            ready = snapshot.ready_len(),
            sleeping = snapshot.waiting_len(),
            %levels,
            %waiting,
            "Scheduler snapshot"
        );
    }
}

/// Build the sink for a configured report mode
pub fn sink_for(mode: ReportMode) -> Option<Arc<dyn ReportSink>> {
    match mode {
        ReportMode::Stdout => Some(Arc::new(StdoutSink)),
        ReportMode::Log => Some(Arc::new(LogSink)),
        ReportMode::Off => None,
    }
}

fn write_items(out: &mut String, items: &[ItemView]) {
    for item in items {
        let _ = write!(out, "{} ", item);
    }
}

/// Render a snapshot in the shell report layout
///
/// ```text
/// Running: [1]  Background: [0]
/// ---------------------------
/// DQ: [1][B] (bottom)
/// P => [0][F] (top)
/// ---------------------------
/// WQ: [2][B] - remaining: 2s
/// ...
/// ```
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Running: [{}]  Background: [{}]",
        snapshot.running, snapshot.detached
    );
    out.push_str(RULE);
    out.push('\n');

    out.push_str("DQ: ");
    if snapshot.ready_len() == 0 {
        out.push_str("(empty)\n");
    } else {
        let top = snapshot.levels.len() - 1;
        for (index, level) in snapshot.levels.iter().enumerate() {
            if index > 0 {
                out.push_str("P => ");
            }
            write_items(&mut out, level);
            if index == top {
                out.push_str("(top)\n");
            } else if index == 0 {
                out.push_str("(bottom)\n");
            } else {
                out.push('\n');
            }
        }
    }

    out.push_str(RULE);
    out.push('\n');

    out.push_str("WQ: ");
    if snapshot.waiting.is_empty() {
        out.push_str("(empty)");
    } else {
        let waiting: Vec<String> = snapshot
            .waiting
            .iter()
            .map(|item| format!("{} - remaining: {}s", item, item.remaining_ticks))
            .collect();
        out.push_str(&waiting.join(" "));
    }
    out.push_str("\n...");
    out
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}
