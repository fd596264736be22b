//! Live status lookups against the streaming platforms

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::platform::StreamPlatform;

/// Twitch API endpoint
const TWITCH_API_BASE: &str = "https://api.twitch.tv/kraken";

/// Mixer API endpoint
const MIXER_API_BASE: &str = "https://mixer.com/api/v1";

/// What a platform reports about a streamer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStatus {
    pub live: bool,
    /// Stream title
    pub status: Option<String>,
    pub game: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl StreamStatus {
    pub fn offline() -> Self {
        Self::default()
    }
}

/// Status lookup errors
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no Twitch client id configured")]
    MissingClientId,
}

/// Capability to ask a platform about a streamer
#[async_trait]
pub trait StatusChecker: Send + Sync {
    async fn check_status(&self, platform: StreamPlatform, username: &str) -> Result<StreamStatus, StatusError>;

    async fn streamer_exists(&self, platform: StreamPlatform, username: &str) -> Result<bool, StatusError>;
}

/// Twitch `streams/<user>` response
#[derive(Deserialize, Debug)]
struct TwitchStreamResponse {
    stream: Option<TwitchStream>,
}

#[derive(Deserialize, Debug)]
struct TwitchStream {
    game: Option<String>,
    created_at: Option<String>,
    channel: Option<TwitchChannel>,
}

#[derive(Deserialize, Debug)]
struct TwitchChannel {
    status: Option<String>,
}

/// Mixer `channels/<user>` response
#[derive(Deserialize, Debug)]
struct MixerChannelResponse {
    #[serde(default)]
    online: bool,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<MixerType>,
}

#[derive(Deserialize, Debug)]
struct MixerType {
    name: Option<String>,
}

/// Parse a Twitch stream response body
pub fn parse_twitch_stream(body: &str) -> Result<StreamStatus, StatusError> {
    let response: TwitchStreamResponse =
        serde_json::from_str(body).map_err(|e| StatusError::Parse(e.to_string()))?;

    let Some(stream) = response.stream else {
        return Ok(StreamStatus::offline());
    };

    Ok(StreamStatus {
        live: true,
        status: stream.channel.and_then(|c| c.status),
        game: stream.game,
        started_at: stream
            .created_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc)),
    })
}

/// Parse a Mixer channel response body
pub fn parse_mixer_channel(body: &str) -> Result<StreamStatus, StatusError> {
    let response: MixerChannelResponse =
        serde_json::from_str(body).map_err(|e| StatusError::Parse(e.to_string()))?;

    if !response.online {
        return Ok(StreamStatus::offline());
    }

    Ok(StreamStatus {
        live: true,
        status: response.name,
        game: response.kind.and_then(|k| k.name),
        started_at: None,
    })
}

/// HTTP implementation of [`StatusChecker`]. Failed requests are not retried.
pub struct HttpStatusChecker {
    client: Client,
    twitch_client_id: Option<String>,
    twitch_base: String,
    mixer_base: String,
}

impl HttpStatusChecker {
    pub fn new(twitch_client_id: Option<String>) -> Self {
        Self {
            client: Client::new(),
            twitch_client_id,
            twitch_base: TWITCH_API_BASE.to_string(),
            mixer_base: MIXER_API_BASE.to_string(),
        }
    }

    /// Point the checker at other API hosts
    pub fn with_endpoints(mut self, twitch_base: impl Into<String>, mixer_base: impl Into<String>) -> Self {
        self.twitch_base = twitch_base.into();
        self.mixer_base = mixer_base.into();
        self
    }

    fn request(&self, platform: StreamPlatform, path: &str) -> Result<reqwest::RequestBuilder, StatusError> {
        match platform {
            StreamPlatform::Twitch => {
                let client_id = self.twitch_client_id.as_deref().ok_or(StatusError::MissingClientId)?;
                Ok(self
                    .client
                    .get(format!("{}/{}", self.twitch_base, path))
                    .header("Client-ID", client_id))
            }
            StreamPlatform::Mixer => Ok(self.client.get(format!("{}/{}", self.mixer_base, path))),
        }
    }

    async fn fetch(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), StatusError> {
        let response = request
            .send()
            .await
            .map_err(|e| StatusError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| StatusError::Network(e.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl StatusChecker for HttpStatusChecker {
    async fn check_status(&self, platform: StreamPlatform, username: &str) -> Result<StreamStatus, StatusError> {
        let path = match platform {
            StreamPlatform::Twitch => format!("streams/{}", username),
            StreamPlatform::Mixer => format!("channels/{}", username),
        };
        let (status, body) = self.fetch(self.request(platform, &path)?).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(StreamStatus::offline());
        }
        if !status.is_success() {
            return Err(StatusError::Api(format!("status: {}, body: {}", status, body)));
        }

        match platform {
            StreamPlatform::Twitch => parse_twitch_stream(&body),
            StreamPlatform::Mixer => parse_mixer_channel(&body),
        }
    }

    async fn streamer_exists(&self, platform: StreamPlatform, username: &str) -> Result<bool, StatusError> {
        let (status, body) = self
            .fetch(self.request(platform, &format!("channels/{}", username))?)
            .await?;

        match status {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => Ok(false),
            s => Err(StatusError::Api(format!("status: {}, body: {}", s, body))),
        }
    }
}
