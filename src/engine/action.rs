use crate::error::ActionParseError;
use crate::gateway::{ToolArguments, ToolName};
use std::fmt;

const ACTION_MARKER: &str = "action:";

/// A remediation step parsed from the planner's `Action: <tool> <args>` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedAction {
    pub tool: ToolName,
    pub argument: String,
}

impl ProposedAction {
    pub fn new(tool: ToolName, argument: impl Into<String>) -> Self {
        Self {
            tool,
            argument: argument.into(),
        }
    }

    /// Parse planner output. Tolerates surrounding quotes, markdown emphasis
    /// and leading prose, but the tool must be on the allow-list and carry an
    /// argument. Every line carrying the marker is tried in order; the first
    /// one that parses wins, otherwise the first line's error is returned.
    pub fn parse(text: &str) -> Result<Self, ActionParseError> {
        let mut first_err = None;
        for (line, rest) in text
            .lines()
            .filter_map(|line| marker_end(line).map(|at| (line, &line[at..])))
        {
            match Self::parse_after_marker(line, rest) {
                Ok(action) => return Ok(action),
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        Err(first_err.unwrap_or_else(|| ActionParseError::Malformed(text.trim().to_string())))
    }

    fn parse_after_marker(line: &str, rest: &str) -> Result<Self, ActionParseError> {
        let mut tokens = rest.split_whitespace().map(clean_token).filter(|t| !t.is_empty());
        let tool_token = tokens
            .next()
            .ok_or_else(|| ActionParseError::Malformed(line.trim().to_string()))?;
        let tool = ToolName::parse(tool_token)
            .ok_or_else(|| ActionParseError::UnknownTool(tool_token.to_string()))?;

        let argument = tokens
            .map(|token| match token.split_once('=') {
                Some((key, value)) if key == tool.argument_key() => value,
                _ => token,
            })
            .find(|value| !value.is_empty())
            .ok_or_else(|| ActionParseError::MissingArgument(tool.as_str().to_string()))?;

        Ok(Self::new(tool, argument))
    }

    pub fn arguments(&self) -> ToolArguments {
        self.tool.arguments(self.argument.clone())
    }
}

impl fmt::Display for ProposedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action: {} {}", self.tool, self.argument)
    }
}

/// Byte offset just past the first `action:` marker that starts a word.
fn marker_end(line: &str) -> Option<usize> {
    let lower = line.to_ascii_lowercase();
    lower
        .match_indices(ACTION_MARKER)
        .map(|(at, _)| at)
        .find(|&at| {
            lower[..at]
                .chars()
                .next_back()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '_'))
        })
        .map(|at| at + ACTION_MARKER.len())
}

fn clean_token(token: &str) -> &str {
    token
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*' | '<' | '>' | '[' | ']'))
        .trim_end_matches(['.', ',', ';', ':'])
}

/// First infrastructure identifier in `text`, e.g. `DB_SHARD_04`.
///
/// An identifier is an upper-case word joined by underscores that contains
/// at least one digit.
pub fn find_resource_id(text: &str) -> Option<String> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .find(|word| {
            word.len() >= 4
                && word.contains('_')
                && word.starts_with(|c: char| c.is_ascii_uppercase())
                && word.chars().any(|c| c.is_ascii_digit())
                && word
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        })
        .map(str::to_string)
}
