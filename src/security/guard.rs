use serde::{Deserialize, Serialize};

/// Substrings that mark operator free text as destructive intent.
pub const BUILTIN_DENYLIST: &[&str] = &[
    "delete", "destroy", "drop", "wipe", "truncate", "rm -rf", "rm -fr",
];

/// Fixed user-facing message for blocked operator input.
pub const REJECTION_MESSAGE: &str =
    "Request blocked by safety guard: destructive operations require the approval workflow.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GuardVerdict {
    Allowed,
    Blocked { token: String },
}

impl GuardVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// The rejection message, present only for blocked input.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Allowed => None,
            Self::Blocked { .. } => Some(REJECTION_MESSAGE),
        }
    }
}

/// Denylist classifier for the manual operator channel.
///
/// Engine-initiated tool calls never pass through here; they are limited to
/// the tool allow-list instead.
#[derive(Debug, Clone)]
pub struct SafetyGuard {
    denylist: Vec<String>,
}

impl SafetyGuard {
    pub fn new() -> Self {
        Self {
            denylist: BUILTIN_DENYLIST.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// Add operator-configured tokens on top of the built-in list.
    pub fn with_extra_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            let token = normalize(token.as_ref());
            if !token.is_empty() && !self.denylist.contains(&token) {
                self.denylist.push(token);
            }
        }
        self
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    pub fn classify(&self, text: &str) -> GuardVerdict {
        let haystack = normalize(text);
        self.denylist
            .iter()
            .find(|token| haystack.contains(token.as_str()))
            .map_or(GuardVerdict::Allowed, |token| GuardVerdict::Blocked {
                token: token.clone(),
            })
    }
}

impl Default for SafetyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase and collapse whitespace runs so `RM  -RF` matches `rm -rf`.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
