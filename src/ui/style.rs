use console::style;
use std::fmt::Display;

use crate::incident::LogEntryKind;

/// Green bold: success checkmarks, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Red bold: failures, blocked requests
pub fn failure<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// White bold: section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: subtitles, secondary text, decorative lines
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: pending approvals, warnings
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Green: confirmed values, identifiers
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: bullet points, agent output
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// Label for an operations-log entry, coloured by outcome.
pub fn entry_label(kind: LogEntryKind) -> String {
    let label = kind.label();
    match kind {
        LogEntryKind::ExecutionSuccess => success(label),
        LogEntryKind::Plan => yellow(label),
        LogEntryKind::Diagnosis | LogEntryKind::OracleReply => accent(label),
        LogEntryKind::StatusCheck | LogEntryKind::OperatorMessage | LogEntryKind::Notice => {
            header(label)
        }
        k if k.is_failure() => failure(label),
        _ => header(label),
    }
}
