//! Wire types for the Gemini `generateContent` REST call.
//!
//! Only the fields this crate reads or writes are modelled; everything else
//! in the vendor response is ignored by serde.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Request
// ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub role: &'a str,
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData<'a> {
    pub mime_type: &'a str,
    /// Base64 without data-URI prefix.
    pub data: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    /// One user turn: the instruction first, then each image in order.
    pub fn user_turn(prompt: &'a str, images: &[InlineData<'a>]) -> Self {
        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(Part::Text { text: prompt });
        parts.extend(images.iter().map(|img| Part::InlineData {
            inline_data: InlineData {
                mime_type: img.mime_type,
                data: img.data,
            },
        }));

        Self {
            contents: vec![Content { role: "user", parts }],
        }
    }
}

// ──────────────────────────────────────────────
// Response
// ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    /// Thinking models return their reasoning as parts flagged `thought`.
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated answer text of the first candidate, thought parts excluded.
    /// `None` when there is no text at all.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_text_then_images() {
        let images = [
            InlineData {
                mime_type: "image/jpeg",
                data: "FRONT",
            },
            InlineData {
                mime_type: "image/jpeg",
                data: "BACK",
            },
        ];
        let request = GenerateContentRequest::user_turn("read the card", &images);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "read the card" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "FRONT" } },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "BACK" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn response_text_joins_parts_and_skips_thoughts() {
        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "thinking about it", "thought": true },
                    { "text": "{\"name\":" },
                    { "text": "\"X\"}" }
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 42 }
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"name\":\"X\"}"));
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn response_without_candidates_has_no_text() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert!(response.text().is_none());
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }
}
