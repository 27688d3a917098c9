//! Chat completion payload types.
//!
//! Only the fields the gateway needs to route are typed. Everything else in a
//! message, a content part or the request body is kept in a flattened JSON map
//! so that payloads pass through without losing unknown fields.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// A JSON object, as returned by `chat` and `list_models`.
pub type JsonObject = serde_json::Map<String, Value>;

/// Chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequestBody {
    /// Model ID. Optional: upstreams serving a single model ignore it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Messages array.
    pub messages: Vec<Message>,

    /// Any other request parameters, passed through untouched.
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl ChatRequestBody {
    /// Creates a body with no model and no extra parameters.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            messages,
            extra: JsonObject::new(),
        }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: Role,

    /// Message content. `None` when the key is absent, `Some(None)` for an
    /// explicit `null` (assistant messages carrying `tool_calls`).
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub content: Option<Option<Content>>,

    /// Other message fields (`name`, `tool_calls`, ...).
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl Message {
    /// Creates a message with the given role and content.
    pub fn new(role: Role, content: impl Into<Content>) -> Self {
        Self {
            role,
            content: Some(Some(content.into())),
            extra: JsonObject::new(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, Content::Text(content.into()))
    }

    /// Creates a user message.
    pub fn user(content: impl Into<Content>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, Content::Text(content.into()))
    }

    /// Returns the content parts of this message; empty for string content.
    pub fn parts(&self) -> &[ContentPart] {
        match &self.content {
            Some(Some(Content::Parts(parts))) => parts,
            _ => &[],
        }
    }
}

/// Marks a present key as `Some`, so a `null` value survives as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Message role.
///
/// Unknown roles are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// System message.
    System,
    /// User message.
    User,
    /// Assistant message.
    Assistant,
    /// Tool result message.
    Tool,
    /// Any other role.
    Other(String),
}

impl Role {
    /// Returns the wire spelling of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::Other(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "tool" => Role::Tool,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// Message content: a plain string or a list of typed parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Text content.
    Text(String),
    /// Multipart content.
    Parts(Vec<ContentPart>),
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Vec<ContentPart>> for Content {
    fn from(parts: Vec<ContentPart>) -> Self {
        Content::Parts(parts)
    }
}

/// One element of a multipart content list.
///
/// Only the `type` discriminator is interpreted; the rest of the part is kept
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// The `type` discriminator.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PartKind>,

    /// Type-specific fields.
    #[serde(flatten)]
    pub fields: JsonObject,
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        let mut fields = JsonObject::new();
        fields.insert("text".to_string(), Value::String(text.into()));
        Self {
            kind: Some(PartKind::Text),
            fields,
        }
    }

    /// Creates an `input_audio` part carrying base64 data.
    pub fn input_audio(audio: InputAudio) -> Self {
        let mut fields = JsonObject::new();
        fields.insert(
            "input_audio".to_string(),
            json!({ "data": audio.data, "format": audio.format }),
        );
        Self {
            kind: Some(PartKind::InputAudio),
            fields,
        }
    }

    /// Returns true if the discriminator marks this part as audio.
    pub fn is_audio(&self) -> bool {
        self.kind.as_ref().is_some_and(PartKind::is_audio)
    }
}

/// Content part discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PartKind {
    /// `text`
    Text,
    /// `image_url`
    ImageUrl,
    /// `input_audio`
    InputAudio,
    /// `audio`
    Audio,
    /// Any other discriminator.
    Other(String),
}

impl PartKind {
    /// Returns true for the discriminators recognized as audio.
    pub fn is_audio(&self) -> bool {
        matches!(self, PartKind::InputAudio | PartKind::Audio)
    }

    /// Returns the wire spelling of the discriminator.
    pub fn as_str(&self) -> &str {
        match self {
            PartKind::Text => "text",
            PartKind::ImageUrl => "image_url",
            PartKind::InputAudio => "input_audio",
            PartKind::Audio => "audio",
            PartKind::Other(other) => other,
        }
    }
}

impl From<String> for PartKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => PartKind::Text,
            "image_url" => PartKind::ImageUrl,
            "input_audio" => PartKind::InputAudio,
            "audio" => PartKind::Audio,
            _ => PartKind::Other(value),
        }
    }
}

impl From<PartKind> for String {
    fn from(kind: PartKind) -> Self {
        match kind {
            PartKind::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// Audio payload of an `input_audio` part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputAudio {
    /// Base64-encoded audio.
    pub data: String,
    /// Container format tag.
    pub format: String,
}

impl InputAudio {
    /// Creates a WAV audio payload from already-encoded data.
    pub fn wav(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            format: "wav".to_string(),
        }
    }
}
