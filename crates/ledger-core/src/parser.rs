//! Line parser: raw input → command token + argument.

/// One submitted input line, split into its command token and argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// First whitespace-delimited word, lower-cased.
    pub token: String,
    /// Everything after the first run of whitespace, trimmed. May be empty.
    pub argument: String,
}

impl CommandInvocation {
    pub fn has_argument(&self) -> bool {
        !self.argument.is_empty()
    }
}

/// Splits `raw` on its first run of whitespace.
///
/// Leading whitespace is skipped. Empty input yields an empty token; callers
/// reject that before dispatch.
pub fn parse_line(raw: &str) -> CommandInvocation {
    let trimmed = raw.trim_start();
    let (token, rest) = match trimmed.find(char::is_whitespace) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };

    CommandInvocation {
        token: token.to_lowercase(),
        argument: rest.trim().to_string(),
    }
}
