use super::settings::GuildId;

/// Kinds of guild lifecycle events plugins can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuildEventKind {
    GuildJoined,
}

impl GuildEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            GuildEventKind::GuildJoined => "guild-joined",
        }
    }
}

/// A guild lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuildEvent {
    Joined { guild_id: GuildId },
}

impl GuildEvent {
    pub fn joined(guild_id: impl Into<GuildId>) -> Self {
        GuildEvent::Joined { guild_id: guild_id.into() }
    }

    pub fn kind(&self) -> GuildEventKind {
        match self {
            GuildEvent::Joined { .. } => GuildEventKind::GuildJoined,
        }
    }

    pub fn guild_id(&self) -> &str {
        match self {
            GuildEvent::Joined { guild_id } => guild_id,
        }
    }
}
