// Deliverable tracker: evaluates a declarative checklist of milestones
// against a project tree, prints a report and writes `.progress.json`.
// Apart from that one snapshot file the tree is only ever read.

pub mod checklist;
pub mod checks;
pub mod report;

use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::Write;

use crate::config::{TrackerConfig, SNAPSHOT_FILE};
pub use checklist::{Check, CheckKind, Checklist, Milestone};
pub use report::{
    evaluate, group_by_status, render_report, MilestoneReport, MilestoneStatus, Report, Snapshot,
    Summary,
};

/// One tracker run: load, evaluate, print to `out`, write the snapshot.
/// Returns the snapshot that was written.
pub fn run(
    config: &TrackerConfig,
    now: DateTime<Local>,
    color: bool,
    out: &mut impl Write,
) -> Result<Snapshot> {
    let checklist = Checklist::load(&config.checklist)?;
    let prs = evaluate(&config.project_root, &checklist);
    let snapshot = Snapshot::new(now.to_rfc3339(), config.checklist_display(), prs);

    let generated = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let title = checklist.title();
    let report = Report {
        title: &title,
        generated: &generated,
        snapshot: &snapshot,
        color,
    };
    write!(out, "{report}")?;
    snapshot.write(&config.snapshot_path())?;
    writeln!(out, "  JSON report written to {SNAPSHOT_FILE}\n")?;
    Ok(snapshot)
}
