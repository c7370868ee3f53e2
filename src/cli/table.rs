//! Table output formatting for CLI commands
//!
//! Violation and policy tables using comfy-table, color-coded when the
//! terminal supports it.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets};

use super::output::truncate;
use crate::domain::models::{Policy, Severity, Violation, ViolationStatus};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: console::colors_enabled(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn format_violations(&self, violations: &[Violation]) -> String {
        let mut table = base_table();
        table.set_header(header(&["ID", "Status", "Severity", "Policy", "Title", "Last seen"]));

        for violation in violations {
            let status = match violation.status {
                ViolationStatus::Open => "OPEN",
                ViolationStatus::Resolved => "RESOLVED",
            };
            let (status_cell, severity_cell) = if self.use_colors {
                (
                    Cell::new(status).fg(status_color(violation.status)),
                    Cell::new(violation.severity).fg(severity_color(violation.severity)),
                )
            } else {
                (
                    Cell::new(format!("{} {status}", status_icon(violation.status))),
                    Cell::new(violation.severity),
                )
            };

            table.add_row(vec![
                Cell::new(&violation.id),
                status_cell,
                severity_cell,
                Cell::new(&violation.policy_id),
                Cell::new(truncate(&violation.title, 48)),
                Cell::new(violation.last_seen_at.format("%Y-%m-%d %H:%M:%S")),
            ]);
        }

        table.to_string()
    }

    pub fn format_policies(&self, policies: &[Policy]) -> String {
        let mut table = base_table();
        table.set_header(header(&["ID", "Name", "Version", "Description"]));

        for policy in policies {
            let id_cell = if self.use_colors {
                Cell::new(&policy.id).fg(Color::Cyan)
            } else {
                Cell::new(&policy.id)
            };
            table.add_row(vec![
                id_cell,
                Cell::new(&policy.name),
                Cell::new(&policy.version),
                Cell::new(truncate(&policy.description, 48)),
            ]);
        }

        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

const fn status_color(status: ViolationStatus) -> Color {
    match status {
        ViolationStatus::Open => Color::Red,
        ViolationStatus::Resolved => Color::Green,
    }
}

const fn status_icon(status: ViolationStatus) -> &'static str {
    match status {
        ViolationStatus::Open => "\u{25cf}",
        ViolationStatus::Resolved => "\u{2713}",
    }
}

const fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CandidateViolation, ViolationDetails};
    use chrono::Utc;

    fn violation(id: &str) -> Violation {
        Violation::open(
            CandidateViolation {
                id: id.to_string(),
                title: "Secret/token-like string found".to_string(),
                summary: String::new(),
                source_id: "google-drive".to_string(),
                policy_id: "secrets-handling".to_string(),
                severity: Severity::High,
                details: ViolationDetails {
                    rule: String::new(),
                    evidence: String::new(),
                    location: String::new(),
                    recommendation: String::new(),
                },
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_violation_table_without_colors() {
        let rendered = TableFormatter::with_colors(false).format_violations(&[violation("b-003")]);
        assert!(rendered.contains("b-003"));
        assert!(rendered.contains("OPEN"));
        assert!(rendered.contains("high"));
        assert!(rendered.contains("secrets-handling"));
    }

    #[test]
    fn test_new_follows_terminal_color_setting() {
        console::set_colors_enabled(false);
        assert!(!TableFormatter::new().use_colors);
        console::set_colors_enabled(true);
        assert!(TableFormatter::new().use_colors);
    }

    #[test]
    fn test_policy_table() {
        let policy = Policy::from_file_stem("data_retention", "data_retention.md", "Text".into());
        let rendered = TableFormatter::with_colors(false).format_policies(&[policy]);
        assert!(rendered.contains("data-retention"));
        assert!(rendered.contains("Data Retention"));
    }
}
