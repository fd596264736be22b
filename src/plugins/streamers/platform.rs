use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Streaming platforms a guild can follow streamers on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StreamPlatform {
    Twitch,
    Mixer,
}

impl StreamPlatform {
    pub const ALL: [StreamPlatform; 2] = [StreamPlatform::Twitch, StreamPlatform::Mixer];

    /// Stored form, also used by the legacy settings format
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamPlatform::Twitch => "TWITCH",
            StreamPlatform::Mixer => "MIXER",
        }
    }

    /// Parse user input, ignoring case
    pub fn parse_loose(value: &str) -> Option<Self> {
        value.trim().to_uppercase().parse().ok()
    }
}

impl fmt::Display for StreamPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a platform name that is not exactly one of the stored forms
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stream platform '{0}'")]
pub struct UnknownPlatform(pub String);

impl FromStr for StreamPlatform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StreamPlatform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_is_exact() {
        assert_eq!("TWITCH".parse::<StreamPlatform>().unwrap(), StreamPlatform::Twitch);
        assert!("twitch".parse::<StreamPlatform>().is_err());
        assert!("YOUTUBE".parse::<StreamPlatform>().is_err());
    }

    #[test]
    fn user_input_ignores_case() {
        assert_eq!(StreamPlatform::parse_loose(" mixer "), Some(StreamPlatform::Mixer));
        assert_eq!(StreamPlatform::parse_loose("hitbox"), None);
    }
}
