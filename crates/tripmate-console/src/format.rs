//! Event formatting.

use std::sync::OnceLock;
use std::time::Instant;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::Level;

use crate::EventVisitor;

static EPOCH: OnceLock<Instant> = OnceLock::new();

pub(crate) fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "partition_start" => format_partition_start(v),
        "partition_end" => format_partition_end(v),
        "strategy_fallback" => format_strategy_fallback(v),
        "refine_end" => format_refine_end(v),
        "conflicts_detected" => format_conflicts(v),
        "batch_start" => format_batch_start(v),
        "batch_progress" => format_batch_progress(v, level),
        "batch_end" => format_batch_end(v),
        "queue_start" => format!(
            "{} {} Job queue │ {} workers",
            format_elapsed(),
            "▶".bright_green().bold(),
            count(v, "workers").bright_yellow()
        ),
        "job_enqueued" => format_job_enqueued(v),
        "job_completed" => format_job_completed(v),
        "job_retry" => format_job_retry(v),
        "job_failed" => format_job_failed(v),
        "shutdown" => format_shutdown(v),
        "cache_error" => format!(
            "{} {} Cache │ {}",
            format_elapsed(),
            "⚠".yellow().bold(),
            v.text("error").unwrap_or("unknown error").yellow()
        ),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    let epoch = EPOCH.get_or_init(Instant::now);
    format!("{:>7.3}s", epoch.elapsed().as_secs_f64())
        .bright_black()
        .to_string()
}

fn count(v: &EventVisitor, name: &str) -> String {
    v.count(name).to_formatted_string(&Locale::en)
}

fn format_partition_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Partitioning │ {} participants │ groups of {} │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v, "participants").bright_yellow(),
        count(v, "target_group_size").bright_yellow(),
        v.text("algorithm").unwrap_or("hybrid").white().bold()
    )
}

fn format_partition_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Partitioned │ {} groups │ objective {} │ {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v, "groups").white(),
        format_objective(v.float("objective")),
        v.text("algorithm_used").unwrap_or("unknown").white().bold(),
        format_duration_ms(v.count("elapsed_ms")).yellow()
    );
    if v.flag("degraded") {
        output.push_str(&format!(" │ {}", "degraded".yellow().bold()));
    }
    output
}

fn format_strategy_fallback(v: &EventVisitor) -> String {
    format!(
        "{} {} {} failed │ {} │ {} fallbacks left",
        format_elapsed(),
        "⚠".yellow().bold(),
        v.text("strategy").unwrap_or("strategy").white().bold(),
        v.text("error").unwrap_or("unknown error").yellow(),
        count(v, "remaining")
    )
}

fn format_refine_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Refinement │ {} steps │ {} moves │ {} → {} │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        count(v, "steps").white(),
        count(v, "moves_evaluated").bright_magenta(),
        format_objective(v.float("initial_objective")),
        format_objective(v.float("final_objective")),
        v.text("stop").unwrap_or("").bright_black()
    )
}

fn format_conflicts(v: &EventVisitor) -> String {
    let risk = v.float("overall_risk").unwrap_or(0.0);
    let risk_str = format!("{:.2}", risk);
    let risk_colored = if risk > 0.5 {
        risk_str.bright_red().bold().to_string()
    } else if risk > 0.0 {
        risk_str.yellow().to_string()
    } else {
        risk_str.bright_green().to_string()
    };
    format!(
        "{} {} Conflicts │ {} participants │ {} findings │ {} flagged pairs │ risk {}",
        format_elapsed(),
        "⚑".bright_blue(),
        count(v, "participants").bright_yellow(),
        count(v, "conflicts").white(),
        count(v, "flagged_pairs").white(),
        risk_colored
    )
}

fn format_batch_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Batch │ {} participants │ {} pairs │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v, "participants").bright_yellow(),
        count(v, "pairs").bright_yellow(),
        v.text("strategy").unwrap_or("direct").white().bold()
    )
}

fn format_batch_progress(v: &EventVisitor, level: Level) -> String {
    if level < Level::DEBUG {
        return String::new();
    }
    format!(
        "{} {} {:>6}/{} units │ {}",
        format_elapsed(),
        "⚡".bright_cyan(),
        count(v, "processed").white(),
        count(v, "total"),
        v.text("phase").unwrap_or("").to_lowercase().bright_black()
    )
}

fn format_batch_end(v: &EventVisitor) -> String {
    format!(
        "{} {} Batch complete │ {} pairs │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v, "pairs").bright_magenta().bold(),
        format_duration_ms(v.count("duration_ms")).yellow()
    )
}

fn format_job_enqueued(v: &EventVisitor) -> String {
    format!(
        "{} {} Job {} │ {} │ {} │ position {}",
        format_elapsed(),
        "+".bright_green().bold(),
        short_id(v.text("job_id").unwrap_or("")).bright_white(),
        v.text("kind").unwrap_or("job"),
        v.text("priority").unwrap_or("Normal").to_lowercase(),
        count(v, "queue_position")
    )
}

fn format_job_completed(v: &EventVisitor) -> String {
    format!(
        "{} {} Job {} │ {} │ {}",
        format_elapsed(),
        "✓".bright_green().bold(),
        short_id(v.text("job_id").unwrap_or("")).bright_white(),
        v.text("kind").unwrap_or("job"),
        format_duration_ms(v.count("elapsed_ms")).yellow()
    )
}

fn format_job_retry(v: &EventVisitor) -> String {
    format!(
        "{} {} Job {} │ retry {} in {} │ {}",
        format_elapsed(),
        "↻".yellow().bold(),
        short_id(v.text("job_id").unwrap_or("")).bright_white(),
        count(v, "retry"),
        format_duration_ms(v.count("delay_ms")),
        v.text("error").unwrap_or("").yellow()
    )
}

fn format_job_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} Job {} │ {} │ {}",
        format_elapsed(),
        "✗".bright_red().bold(),
        short_id(v.text("job_id").unwrap_or("")).bright_white(),
        v.text("kind").unwrap_or("job"),
        v.text("error").unwrap_or("").bright_red()
    )
}

fn format_shutdown(v: &EventVisitor) -> String {
    match v.text("phase") {
        Some("stopped") => format!(
            "{} {} Queue stopped │ {} cancelled │ {} finished in grace │ {} aborted",
            format_elapsed(),
            "■".bright_cyan().bold(),
            count(v, "cancelled"),
            count(v, "completed_in_grace").bright_green(),
            count(v, "aborted").bright_red()
        ),
        _ => format!(
            "{} {} Queue draining │ {} cancelled │ {} in flight │ {} grace",
            format_elapsed(),
            "◀".bright_blue(),
            count(v, "cancelled"),
            count(v, "in_flight").white(),
            format_duration_ms(v.count("grace_ms")).yellow()
        ),
    }
}

fn format_objective(value: Option<f64>) -> String {
    match value {
        Some(x) if x.is_finite() => format!("{:.2}", x).bright_magenta().to_string(),
        _ => "N/A".white().to_string(),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub(crate) fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1_500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3f2a9c1e-0000-4000-8000-000000000000"), "3f2a9c1e");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_unknown_events_are_silent() {
        assert!(format_event(&visitor("refine_step"), Level::TRACE).is_empty());
        assert!(format_event(&EventVisitor::default(), Level::INFO).is_empty());
    }

    #[test]
    fn test_degraded_partition_is_marked() {
        let mut v = visitor("partition_end");
        v.counts.insert("groups", 3);
        v.floats.insert("objective", 71.25);
        v.flags.insert("degraded", true);

        let line = format_event(&v, Level::INFO);
        assert!(line.contains("Partitioned"));
        assert!(line.contains("71.25"));
        assert!(line.contains("degraded"));
    }

    #[test]
    fn test_shutdown_phases() {
        let mut v = visitor("shutdown");
        v.text.insert("phase", "stopped".to_string());
        assert!(format_event(&v, Level::INFO).contains("Queue stopped"));

        v.text.insert("phase", "draining".to_string());
        assert!(format_event(&v, Level::INFO).contains("Queue draining"));
    }
}
