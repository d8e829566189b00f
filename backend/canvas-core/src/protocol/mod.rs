//! Wire types for the canvas channel.
//!
//! Inbound frames are JSON objects discriminated by a `type` field. The state
//! fetch returns the same shape (or `null` for no state), so the live channel
//! and the initial fetch share one model.

use serde::{Deserialize, Deserializer};

/// How a content body should be interpreted when displayed.
///
/// `Html` is trusted: it only ever originates from the authenticated server
/// channel and is inserted as markup verbatim. Everything unrecognized is
/// handled as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    Markdown,
    Html,
    Text,
}

impl ContentFormat {
    /// Map a wire name to a format. Formats are server-controlled; anything
    /// this client does not recognize renders defensively as text.
    pub fn from_name(name: &str) -> Self {
        match name {
            "markdown" => ContentFormat::Markdown,
            "html" => ContentFormat::Html,
            _ => ContentFormat::Text,
        }
    }
}

impl Default for ContentFormat {
    fn default() -> Self {
        ContentFormat::Text
    }
}

impl<'de> Deserialize<'de> for ContentFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(ContentFormat::from_name(&raw))
    }
}

/// A frame pushed by the server over the live channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Keep-alive; carries no display effect.
    Ping,
    /// Wipe the canvas back to the waiting placeholder.
    Clear,
    /// Replace the canvas with new content.
    Canvas {
        #[serde(default)]
        format: ContentFormat,
        #[serde(default)]
        content: String,
    },
}

impl ServerFrame {
    /// Parse a raw text frame. Unknown `type` values and malformed JSON both
    /// fail here; callers discard such frames.
    pub fn parse(raw: &str) -> Result<ServerFrame, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The displayable payload this frame carries, if any.
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            ServerFrame::Ping => None,
            ServerFrame::Clear => Some(Payload::Clear),
            ServerFrame::Canvas { format, content } => Some(Payload::Content {
                format,
                body: content,
            }),
        }
    }
}

/// The discriminated unit of displayable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// No content; the display shows the waiting placeholder.
    Clear,
    /// Content to render. An empty body still renders (as empty content),
    /// it is not collapsed into `Clear`.
    Content {
        format: ContentFormat,
        body: String,
    },
}
