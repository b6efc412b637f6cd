//! End-of-session text: the stats block, the outcome message and the
//! notification body.

use chrono::{DateTime, Local};

use crate::pool::{SessionOutcome, SessionReport};
use crate::types::stats::StatsSnapshot;

const RULE: &str = "============================================================";

/// Pre-launch line announcing pool size and auto-stop time.
pub fn launch_banner(workers: usize, deadline: DateTime<Local>) -> String {
    format!(
        "🚀 Starting extraction with {} parallel workers\n⏱️  Auto-stop at {}",
        workers,
        deadline.format("%H:%M:%S")
    )
}

/// Final statistics block.
pub fn stats_block(stats: &StatsSnapshot) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "📊 SESSION STATISTICS".to_string(),
        RULE.to_string(),
        format!("✅ URLs processed: {}", stats.processed),
        format!("📧 Emails found: {}", stats.emails_found),
        format!("🔗 Social profiles found: {}", stats.social_found),
        format!("❌ Errors: {}", stats.errors),
    ];
    if stats.write_failures > 0 {
        lines.push(format!("⚠️  Rows not saved: {}", stats.write_failures));
    }
    lines.push(RULE.to_string());
    lines.join("\n")
}

/// Headline for the outcome, used in the notification title.
pub fn outcome_title(outcome: SessionOutcome) -> &'static str {
    match outcome {
        SessionOutcome::Completed => "Extraction completed",
        SessionOutcome::AutoStopped => "Extraction auto-stopped",
        SessionOutcome::Interrupted => "Extraction interrupted",
        SessionOutcome::NoWorkers => "Extraction failed to start",
    }
}

/// Outcome message shown to the user and sent as the notification body.
pub fn outcome_message(project: &str, report: &SessionReport) -> String {
    let headline = match report.outcome {
        SessionOutcome::Completed => "✅ EXTRACTION COMPLETED!".to_string(),
        SessionOutcome::AutoStopped => {
            let minutes = report.elapsed.as_secs() / 60;
            format!("⏱️ SESSION STOPPED - time limit reached after {} min", minutes)
        }
        SessionOutcome::Interrupted => "⚠️ SESSION INTERRUPTED by user".to_string(),
        SessionOutcome::NoWorkers => "❌ NO WORKER STARTED - the browser could not be launched".to_string(),
    };

    let mut message = format!(
        "{}\n\nProject: {}\n✅ Processed: {}\n📧 Emails: {}",
        headline, project, report.stats.processed, report.stats.emails_found
    );

    if report.outcome != SessionOutcome::Completed || report.remaining > 0 {
        message.push_str(&format!(
            "\n\n{} URLs left. Run again and choose 'Resume' to continue!",
            report.remaining
        ));
    }
    message
}

/// HTML body for the notification channel.
pub fn notification_text(project: &str, report: &SessionReport) -> String {
    format!(
        "🔍 <b>{}</b>\n\n{}",
        outcome_title(report.outcome),
        escape_html(&outcome_message(project, report))
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
