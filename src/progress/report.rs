// Milestone classification, totals, status grouping, the printed report
// and the `.progress.json` snapshot.

use anyhow::{Context, Result};
use crossterm::style::{style, Color, Stylize};
use serde::ser::Serializer;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

use super::checklist::{Checklist, Milestone};
use super::checks::evaluate_check;

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Complete,
    InProgress,
    NotStarted,
    NoChecks,
}

impl MilestoneStatus {
    pub fn classify(passed: usize, total: usize) -> Self {
        if total == 0 {
            MilestoneStatus::NoChecks
        } else if passed == total {
            MilestoneStatus::Complete
        } else if passed > 0 {
            MilestoneStatus::InProgress
        } else {
            MilestoneStatus::NotStarted
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneReport {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub status: MilestoneStatus,
    pub progress: String,
    pub percent: u32,
    pub details: Vec<CheckResult>,
}

impl MilestoneReport {
    pub fn passed(&self) -> usize {
        self.details.iter().filter(|d| d.exists).count()
    }

    pub fn total(&self) -> usize {
        self.details.len()
    }
}

/// round(100 * passed / total), ties to even; 0 when there is nothing to
/// count.
pub fn percent(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * passed as f64 / total as f64).round_ties_even() as u32
}

pub fn evaluate_milestone(root: &Path, milestone: &Milestone) -> MilestoneReport {
    let details: Vec<CheckResult> = milestone
        .checks
        .iter()
        .map(|check| CheckResult {
            kind: check.kind.clone(),
            path: check.path.clone(),
            exists: evaluate_check(root, check),
        })
        .collect();
    let passed = details.iter().filter(|d| d.exists).count();
    let total = details.len();
    MilestoneReport {
        id: milestone.id.clone(),
        name: milestone.name.clone(),
        status: MilestoneStatus::classify(passed, total),
        progress: format!("{passed}/{total}"),
        percent: percent(passed, total),
        details,
    }
}

/// Evaluate every milestone, keeping checklist order.
pub fn evaluate(root: &Path, checklist: &Checklist) -> Vec<MilestoneReport> {
    checklist
        .milestones
        .iter()
        .map(|m| evaluate_milestone(root, m))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub complete: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub no_checks: usize,
    pub total: usize,
    pub trackable: usize,
    pub overall_checks_passed: usize,
    pub overall_checks_total: usize,
    pub overall_percent: u32,
}

impl Summary {
    pub fn from_milestones(prs: &[MilestoneReport]) -> Self {
        let count = |status: MilestoneStatus| prs.iter().filter(|m| m.status == status).count();
        let no_checks = count(MilestoneStatus::NoChecks);
        let passed: usize = prs.iter().map(MilestoneReport::passed).sum();
        let total: usize = prs.iter().map(MilestoneReport::total).sum();
        Summary {
            complete: count(MilestoneStatus::Complete),
            in_progress: count(MilestoneStatus::InProgress),
            not_started: count(MilestoneStatus::NotStarted),
            no_checks,
            total: prs.len(),
            trackable: prs.len() - no_checks,
            overall_checks_passed: passed,
            overall_checks_total: total,
            overall_percent: percent(passed, total),
        }
    }
}

/// Numeric ordering key from the first run of digits in an id
/// (`PR-012` -> 12).
pub fn ordering_key(id: &str) -> Option<u64> {
    let start = id.find(|c: char| c.is_ascii_digit())?;
    let digits: String = id[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Milestones bucketed by status, each bucket ordered by `ordering_key`
/// with key-less ids last.
#[derive(Debug, Default)]
pub struct Grouped<'a> {
    pub complete: Vec<&'a MilestoneReport>,
    pub in_progress: Vec<&'a MilestoneReport>,
    pub not_started: Vec<&'a MilestoneReport>,
    pub no_checks: Vec<&'a MilestoneReport>,
}

pub fn group_by_status(prs: &[MilestoneReport]) -> Grouped<'_> {
    let mut grouped = Grouped::default();
    for m in prs {
        match m.status {
            MilestoneStatus::Complete => grouped.complete.push(m),
            MilestoneStatus::InProgress => grouped.in_progress.push(m),
            MilestoneStatus::NotStarted => grouped.not_started.push(m),
            MilestoneStatus::NoChecks => grouped.no_checks.push(m),
        }
    }
    for bucket in [
        &mut grouped.complete,
        &mut grouped.in_progress,
        &mut grouped.not_started,
        &mut grouped.no_checks,
    ] {
        bucket.sort_by_key(|m| {
            let key = ordering_key(&m.id);
            (key.is_none(), key)
        });
    }
    grouped
}

/// The `.progress.json` document.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub timestamp: String,
    pub config_file: String,
    #[serde(serialize_with = "serialize_prs")]
    pub prs: Vec<MilestoneReport>,
    pub summary: Summary,
}

fn serialize_prs<S: Serializer>(prs: &[MilestoneReport], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(prs.iter().map(|m| (&m.id, m)))
}

impl Snapshot {
    pub fn new(timestamp: String, config_file: String, prs: Vec<MilestoneReport>) -> Self {
        let summary = Summary::from_milestones(&prs);
        Snapshot {
            timestamp,
            config_file,
            prs,
            summary,
        }
    }

    /// Overwrite `path` with the pretty-printed snapshot.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self).context("Failed to serialize snapshot")?;
        json.push('\n');
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot written");
        Ok(())
    }
}

fn heading(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        style(text).with(color).bold().to_string()
    } else {
        text.to_string()
    }
}

/// Human-readable report: banner, one section per non-empty status group
/// (per-check breakdown only for in-progress milestones) and the totals.
pub struct Report<'a> {
    pub title: &'a str,
    pub generated: &'a str,
    pub snapshot: &'a Snapshot,
    pub color: bool,
}

impl Report<'_> {
    fn section(
        &self,
        f: &mut fmt::Formatter<'_>,
        label: &str,
        color: Color,
        marker: &str,
        milestones: &[&MilestoneReport],
    ) -> fmt::Result {
        if milestones.is_empty() {
            return Ok(());
        }
        writeln!(f, "  {}", heading(label, color, self.color))?;
        for m in milestones {
            if m.status == MilestoneStatus::InProgress {
                writeln!(f, "    {marker} {}: {} ({})", m.id, m.name, m.progress)?;
                for detail in &m.details {
                    let icon = if detail.exists { "+" } else { "-" };
                    writeln!(f, "        {icon} {}", detail.path)?;
                }
            } else {
                writeln!(f, "    {marker} {}: {}", m.id, m.name)?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        let grouped = group_by_status(&self.snapshot.prs);
        let summary = &self.snapshot.summary;

        writeln!(f, "\n{rule}")?;
        writeln!(f, "  {}", self.title)?;
        writeln!(f, "  Generated: {}", self.generated)?;
        writeln!(f, "{rule}\n")?;

        self.section(f, "COMPLETED:", Color::Green, "[x]", &grouped.complete)?;
        self.section(f, "IN PROGRESS:", Color::Yellow, "[~]", &grouped.in_progress)?;
        self.section(f, "NOT STARTED:", Color::Red, "[ ]", &grouped.not_started)?;
        self.section(f, "NO CHECKS:", Color::DarkGrey, "[?]", &grouped.no_checks)?;

        writeln!(f, "{rule}")?;
        write!(
            f,
            "  Summary: {}/{} complete, {} in progress, {} not started",
            summary.complete, summary.trackable, summary.in_progress, summary.not_started
        )?;
        if summary.no_checks > 0 {
            write!(f, ", {} without checks", summary.no_checks)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "  Overall: {}/{} checks ({}%)",
            summary.overall_checks_passed, summary.overall_checks_total, summary.overall_percent
        )?;
        writeln!(f, "{rule}\n")
    }
}

pub fn render_report(title: &str, generated: &str, snapshot: &Snapshot, color: bool) -> String {
    Report {
        title,
        generated,
        snapshot,
        color,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::checklist::Check;
    use std::fs;
    use tempfile::tempdir;

    fn milestone(id: &str, checks: Vec<Check>) -> Milestone {
        Milestone {
            id: id.to_string(),
            name: format!("{id} name"),
            checks,
        }
    }

    fn report(id: &str, status: MilestoneStatus) -> MilestoneReport {
        MilestoneReport {
            id: id.to_string(),
            name: id.to_string(),
            status,
            progress: "0/0".to_string(),
            percent: 0,
            details: Vec::new(),
        }
    }

    #[test]
    fn file_present_dir_missing_is_in_progress() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("a"), "").unwrap();
        fs::create_dir(root.path().join("b")).unwrap();

        let m = milestone("PR-1", vec![Check::new("file", "a"), Check::new("dir", "b")]);
        let r = evaluate_milestone(root.path(), &m);
        assert_eq!(r.status, MilestoneStatus::InProgress);
        assert_eq!(r.progress, "1/2");
        assert_eq!(r.percent, 50);
    }

    #[test]
    fn zero_checks_is_no_checks() {
        let root = tempdir().unwrap();
        let r = evaluate_milestone(root.path(), &milestone("PR-9", vec![]));
        assert_eq!(r.status, MilestoneStatus::NoChecks);
        assert_eq!(r.progress, "0/0");
        assert_eq!(r.percent, 0);
    }

    #[test]
    fn classify_covers_all_states() {
        assert_eq!(MilestoneStatus::classify(0, 0), MilestoneStatus::NoChecks);
        assert_eq!(MilestoneStatus::classify(0, 3), MilestoneStatus::NotStarted);
        assert_eq!(MilestoneStatus::classify(2, 3), MilestoneStatus::InProgress);
        assert_eq!(MilestoneStatus::classify(3, 3), MilestoneStatus::Complete);
    }

    #[test]
    fn percent_rounds_half_to_even() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 12);
        assert_eq!(percent(3, 8), 38);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn overall_percent_skips_milestones_without_checks() {
        let root = tempdir().unwrap();
        for f in ["a", "b", "c"] {
            fs::write(root.path().join(f), "").unwrap();
        }
        let checklist = Checklist {
            project: None,
            milestones: vec![
                milestone("PR-1", vec![Check::new("file", "a"), Check::new("file", "b")]),
                milestone(
                    "PR-2",
                    vec![
                        Check::new("file", "c"),
                        Check::new("file", "x"),
                        Check::new("file", "y"),
                    ],
                ),
                milestone("PR-3", vec![]),
            ],
        };
        let summary = Summary::from_milestones(&evaluate(root.path(), &checklist));
        assert_eq!(summary.overall_checks_passed, 3);
        assert_eq!(summary.overall_checks_total, 5);
        assert_eq!(summary.overall_percent, 60);
        assert_eq!(summary.complete, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.no_checks, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.trackable, 2);
    }

    #[test]
    fn ordering_key_uses_first_digit_run() {
        assert_eq!(ordering_key("PR-012"), Some(12));
        assert_eq!(ordering_key("M3-beta2"), Some(3));
        assert_eq!(ordering_key("docs"), None);
    }

    #[test]
    fn groups_sort_by_numeric_key_with_unkeyed_last() {
        let prs = vec![
            report("extra", MilestoneStatus::NotStarted),
            report("PR-10", MilestoneStatus::NotStarted),
            report("PR-2", MilestoneStatus::NotStarted),
            report("PR-5", MilestoneStatus::Complete),
        ];
        let grouped = group_by_status(&prs);
        let ids: Vec<_> = grouped.not_started.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["PR-2", "PR-10", "extra"]);
        assert_eq!(grouped.complete.len(), 1);
        assert!(grouped.in_progress.is_empty());
    }

    #[test]
    fn snapshot_keys_prs_by_id_in_checklist_order() {
        let prs = vec![
            report("PR-2", MilestoneStatus::NoChecks),
            report("PR-1", MilestoneStatus::NoChecks),
        ];
        let snapshot = Snapshot::new("t".into(), "scripts/deliverables.json".into(), prs);
        let json = serde_json::to_value(&snapshot).unwrap();
        let keys: Vec<_> = json["prs"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["PR-2", "PR-1"]);
        assert_eq!(json["prs"]["PR-1"]["status"], "no_checks");
        assert!(json["prs"]["PR-1"].get("id").is_none());
        assert_eq!(json["config_file"], "scripts/deliverables.json");
        assert_eq!(json["summary"]["no_checks"], 2);
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("a"), "").unwrap();
        let checklist = Checklist {
            project: None,
            milestones: vec![
                milestone("PR-1", vec![Check::new("file", "a"), Check::new("dir", "b")]),
                milestone("PR-2", vec![]),
            ],
        };
        let first = Snapshot::new("one".into(), "c".into(), evaluate(root.path(), &checklist));
        let second = Snapshot::new("two".into(), "c".into(), evaluate(root.path(), &checklist));
        let a = serde_json::to_value(&first).unwrap();
        let b = serde_json::to_value(&second).unwrap();
        assert_eq!(a["prs"], b["prs"]);
        assert_eq!(a["summary"], b["summary"]);
    }

    #[test]
    fn report_lists_breakdown_only_for_in_progress() {
        let root = tempdir().unwrap();
        fs::write(root.path().join("a"), "").unwrap();
        fs::write(root.path().join("done"), "").unwrap();
        let checklist = Checklist {
            project: Some("Family Recipes".into()),
            milestones: vec![
                milestone("PR-1", vec![Check::new("file", "done")]),
                milestone("PR-2", vec![Check::new("file", "a"), Check::new("dir", "b")]),
                milestone("PR-3", vec![Check::new("file", "nope")]),
                milestone("PR-4", vec![]),
            ],
        };
        let snapshot = Snapshot::new("t".into(), "c".into(), evaluate(root.path(), &checklist));
        let text = render_report(&checklist.title(), "2026-01-01 00:00:00", &snapshot, false);

        assert!(text.contains("  FAMILY RECIPES - Progress Report\n"));
        assert!(text.contains("    [x] PR-1: PR-1 name\n"));
        assert!(text.contains("    [~] PR-2: PR-2 name (1/2)\n        + a\n        - b\n"));
        assert!(text.contains("    [ ] PR-3: PR-3 name\n"));
        assert!(text.contains("    [?] PR-4: PR-4 name\n"));
        assert!(!text.contains("+ done"));
        assert!(!text.contains("- nope"));
        assert!(text.contains("  Summary: 1/3 complete, 1 in progress, 1 not started, 1 without checks\n"));
        assert!(text.contains("  Overall: 2/4 checks (50%)\n"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let snapshot = Snapshot::new("t".into(), "c".into(), Vec::new());
        let text = render_report("Progress Report", "now", &snapshot, false);
        assert!(!text.contains("COMPLETED"));
        assert!(!text.contains("NO CHECKS"));
        assert!(text.contains("  Summary: 0/0 complete, 0 in progress, 0 not started\n"));
        assert!(text.contains("  Overall: 0/0 checks (0%)\n"));
    }
}
