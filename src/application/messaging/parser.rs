//! Command parser - splits raw chat text into a command invocation

/// A parsed command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    /// Everything after the command name, trimmed
    pub raw_args: String,
}

/// Split raw arguments on whitespace
pub fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(|s| s.to_string()).collect()
}

/// Recognises prefixed commands in chat text
pub struct CommandParser {
    command_prefix: String,
}

impl CommandParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Parse a chat line; returns `None` for anything that is not a command
    pub fn parse(&self, text: &str) -> Option<Invocation> {
        let text = text.trim();
        let cmd_text = text.strip_prefix(self.command_prefix.as_str())?;

        let mut parts = cmd_text.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            return None;
        }

        Some(Invocation {
            name: name.to_lowercase(),
            raw_args: parts.next().unwrap_or("").trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_args() {
        let parser = CommandParser::new("!");
        let inv = parser.parse("!AddStreamer  twitch   ninja ").unwrap();

        assert_eq!(inv.name, "addstreamer");
        assert_eq!(inv.raw_args, "twitch   ninja");
        assert_eq!(split_args(&inv.raw_args), vec!["twitch", "ninja"]);
    }

    #[test]
    fn ignores_plain_text() {
        let parser = CommandParser::new("!");
        assert!(parser.parse("hello there").is_none());
        assert!(parser.parse("!").is_none());
        assert!(parser.parse("! help").is_none());
    }

    #[test]
    fn supports_longer_prefixes() {
        let parser = CommandParser::new("lb.");
        assert_eq!(parser.parse("lb.help").unwrap().name, "help");
        assert!(parser.parse("!help").is_none());
    }
}
