//! Type definitions for OpenAI-compatible chat payloads.

pub mod chat;

pub use chat::{
    ChatRequestBody, Content, ContentPart, InputAudio, JsonObject, Message, PartKind, Role,
};
