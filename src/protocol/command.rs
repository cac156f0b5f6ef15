//! Wire command parsing.
//!
//! A command is one line of ASCII text, `VERB URI ARGS`, separated by
//! whitespace. ARGS is the opaque remainder of the line and may be empty.
//! Trailing whitespace and NUL padding are ignored.

use super::error::CommandError;
use std::fmt;
use std::str::FromStr;

/// The four CRUD verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl FromStr for Verb {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(Self::Create),
            "READ" => Ok(Self::Read),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(CommandError::UnknownVerb(s.to_string())),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A parsed, not yet dispatched, command line.
///
/// The verb is kept as text: it is only decoded after the URI has been
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub verb: &'a str,
    pub uri: &'a str,
    pub args: &'a str,
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let line = line.trim_matches(|c: char| c == '\0' || c.is_whitespace());
        let (verb, rest) = split_token(line);
        let (uri, args) = split_token(rest);
        if verb.is_empty() || uri.is_empty() {
            return Err(CommandError::Malformed(line.to_string()));
        }
        Ok(Self { verb, uri, args })
    }

    pub fn verb(&self) -> Result<Verb, CommandError> {
        self.verb.parse()
    }
}

/// Splits off the first whitespace separated token. The remainder is returned
/// with its leading whitespace removed.
pub(crate) fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command() {
        let command = Command::parse("CREATE /pipelines p0 videotestsrc ! fakesink").unwrap();
        assert_eq!(command.verb, "CREATE");
        assert_eq!(command.uri, "/pipelines");
        assert_eq!(command.args, "p0 videotestsrc ! fakesink");
        assert_eq!(command.verb().unwrap(), Verb::Create);
    }

    #[test]
    fn test_parse_ignores_padding() {
        let command = Command::parse("  read   /pipelines/p0/state \0\0\0").unwrap();
        assert_eq!(command.uri, "/pipelines/p0/state");
        assert_eq!(command.args, "");
        assert_eq!(command.verb().unwrap(), Verb::Read);
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(Command::parse(""), Err(CommandError::Malformed(_))));
        assert!(matches!(Command::parse("READ"), Err(CommandError::Malformed(_))));
    }

    #[test]
    fn test_unknown_verb_is_deferred() {
        let command = Command::parse("FROBNICATE /pipelines/p0 x=1").unwrap();
        assert_eq!(
            command.verb().unwrap_err(),
            CommandError::UnknownVerb("FROBNICATE".into())
        );
    }
}
