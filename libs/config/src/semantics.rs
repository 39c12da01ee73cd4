//! Invocation semantics switch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Duplicate-handling policy of the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvocationSemantics {
    /// Every delivered datagram executes; retries may re-execute
    AtLeastOnce,
    /// Replies are cached by correlation id; a retry is answered from the cache
    #[default]
    AtMostOnce,
}

impl InvocationSemantics {
    pub fn deduplicates(self) -> bool {
        self == InvocationSemantics::AtMostOnce
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InvocationSemantics::AtLeastOnce => "at-least-once",
            InvocationSemantics::AtMostOnce => "at-most-once",
        }
    }
}

impl FromStr for InvocationSemantics {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "at-least-once" => Ok(InvocationSemantics::AtLeastOnce),
            "at-most-once" => Ok(InvocationSemantics::AtMostOnce),
            other => Err(format!(
                "unknown invocation semantics '{}': expected at-least-once or at-most-once",
                other
            )),
        }
    }
}

impl fmt::Display for InvocationSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
