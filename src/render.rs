// Plain-text views of the command center. Nothing here mutates state.

use crate::agent::Agent;
use crate::logbook::{LogEntry, Severity};
use crate::metrics::FleetMetrics;
use std::fmt::Write;

pub fn log_line(entry: &LogEntry) -> String {
    let marker = match entry.severity {
        Severity::Info => " ",
        Severity::Success => "+",
        Severity::Warning => "!",
        Severity::Error => "x",
        Severity::System => ">",
    };
    format!(
        "[{}] {} {:<9} {}",
        entry.timestamp.format("%H:%M:%S"),
        marker,
        entry.source,
        entry.message
    )
}

pub fn roster_table(agents: &[Agent], metrics: &FleetMetrics) -> String {
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "╔═════════════╦══════════╦═══════╦═══════╦════════════╦══════════════════════════════╗");
    let _ = writeln!(out, "║ Agent       ║ Status   ║ CPU   ║ MEM   ║ Uptime     ║ Task                         ║");
    let _ = writeln!(out, "╠═════════════╬══════════╬═══════╬═══════╬════════════╬══════════════════════════════╣");

    for agent in agents {
        let _ = writeln!(
            out,
            "║ {:<11} ║ {:<8} ║ {:>4}% ║ {:>4}% ║ {:>10} ║ {:<28} ║",
            agent.name,
            agent.status.label().to_uppercase(),
            agent.cpu.round(),
            agent.memory.round(),
            format_uptime(agent.uptime_secs),
            truncate(&agent.task, 28),
        );
    }

    let _ = writeln!(out, "╚═════════════╩══════════╩═══════╩═══════╩════════════╩══════════════════════════════╝");
    let _ = writeln!(out, "{}", metrics.summary());
    out
}

pub fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logbook::LogId;
    use chrono::{Local, TimeZone};

    #[test]
    fn uptime_as_clock() {
        assert_eq!(format_uptime(0), "00:00:00");
        assert_eq!(format_uptime(3_725), "01:02:05");
        assert_eq!(format_uptime(86_399), "23:59:59");
    }

    #[test]
    fn log_line_layout() {
        let entry = LogEntry {
            id: LogId::new(1),
            timestamp: Local.with_ymd_and_hms(2025, 3, 1, 9, 5, 7).unwrap(),
            source: "USER".to_string(),
            severity: Severity::Error,
            message: "Unknown command: x.".to_string(),
        };
        assert_eq!(log_line(&entry), "[09:05:07] x USER      Unknown command: x.");
    }

    #[test]
    fn long_tasks_are_cut() {
        assert_eq!(truncate("abcdef", 6), "abcdef");
        assert_eq!(truncate("abcdefgh", 6), "abc...");
    }
}
