//! Multimodal chat prompt sent to the inference provider.

use serde::Serialize;

use crate::config::EdgeConfig;

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: Vec<ContentPart> },
}

/// One part of a multimodal user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Model input, without the model identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInput {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub stream: bool,
}

impl ModelInput {
    /// System instruction plus a user message carrying the text request and the image.
    pub fn for_image(config: &EdgeConfig, data_url: String) -> Self {
        Self {
            messages: vec![
                ChatMessage::System {
                    content: config.system_prompt.clone(),
                },
                ChatMessage::User {
                    content: vec![
                        ContentPart::Text {
                            text: config.user_instruction(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: data_url },
                        },
                    ],
                },
            ],
            temperature: config.temperature,
            stream: false,
        }
    }

    /// The system instruction, if present.
    pub fn system_prompt(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            ChatMessage::System { content } => Some(content.as_str()),
            ChatMessage::User { .. } => None,
        })
    }

    /// The image URL attached to the user message, if present.
    pub fn image_url(&self) -> Option<&str> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                ChatMessage::User { content } => Some(content),
                ChatMessage::System { .. } => None,
            })
            .flatten()
            .find_map(|part| match part {
                ContentPart::ImageUrl { image_url } => Some(image_url.url.as_str()),
                ContentPart::Text { .. } => None,
            })
    }
}
