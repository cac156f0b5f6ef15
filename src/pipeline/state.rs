//! Pipeline states.

use std::fmt;
use std::str::FromStr;

/// The states a pipeline moves through, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PipelineState {
    #[default]
    Null,
    Ready,
    Paused,
    Playing,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Ready => "ready",
            Self::Paused => "paused",
            Self::Playing => "playing",
        }
    }
}

impl FromStr for PipelineState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "null" => Ok(Self::Null),
            "ready" => Ok(Self::Ready),
            "paused" => Ok(Self::Paused),
            "playing" => Ok(Self::Playing),
            _ => Err(format!("unknown pipeline state: {s}")),
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("PLAYING".parse::<PipelineState>().unwrap(), PipelineState::Playing);
        assert_eq!("null".parse::<PipelineState>().unwrap(), PipelineState::default());
        assert!("running".parse::<PipelineState>().is_err());
    }
}
