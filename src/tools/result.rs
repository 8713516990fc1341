// ABOUTME: Defines ToolResult and ToolContent types returned by the group tools
// ABOUTME: Text content blocks plus an optional structured payload
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

//! # Tool Result Types
//!
//! Every tool answers with one or more text blocks. Successful lookups also carry
//! the same payload as `structuredContent` so agents can skip re-parsing the text.

use serde::{Deserialize, Serialize};

use crate::models::ToolValue;

/// Content block kind; only text is produced
pub const TEXT_CONTENT_TYPE: &str = "text";

/// One content block of a tool result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolContent {
    /// Always `text`
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text payload
    pub text: String,
}

impl ToolContent {
    /// Create a text block
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: TEXT_CONTENT_TYPE.to_owned(),
            text: text.into(),
        }
    }
}

/// Result returned by tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    /// Text blocks shown to the agent
    pub content: Vec<ToolContent>,
    /// Machine-readable payload, absent for plain messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<ToolValue>,
    /// Text blocks mirror the payload pretty-printed
    #[serde(skip)]
    pretty: bool,
}

impl ToolResult {
    /// Create a message-only result
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            structured_content: None,
            pretty: false,
        }
    }

    /// Create a result carrying `payload` as compact JSON text and as structured content
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the payload cannot be converted to JSON
    pub fn structured<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Self::render(payload, false)
    }

    /// Like [`Self::structured`] with pretty-printed text
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the payload cannot be converted to JSON
    pub fn structured_pretty<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Self::render(payload, true)
    }

    fn render<T: Serialize>(payload: &T, pretty: bool) -> Result<Self, serde_json::Error> {
        Ok(Self {
            content: vec![ToolContent::text(render_text(payload, pretty)?)],
            structured_content: Some(ToolValue::from_serializable(payload)?),
            pretty,
        })
    }

    /// Whether the result carries a structured payload
    #[must_use]
    pub const fn is_structured(&self) -> bool {
        self.structured_content.is_some()
    }

    /// Text of the first content block
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|block| block.text.as_str())
    }

    /// Text of every content block, in order
    #[must_use]
    pub fn texts(&self) -> ToolValue {
        ToolValue::List(
            self.content
                .iter()
                .map(|block| ToolValue::from(block.text.as_str()))
                .collect(),
        )
    }

    /// Replace the structured payload and re-render the text blocks from it,
    /// keeping the original layout
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the payload cannot be converted to JSON
    pub fn with_structured(mut self, payload: ToolValue) -> Result<Self, serde_json::Error> {
        self.content = vec![ToolContent::text(render_text(&payload, self.pretty)?)];
        self.structured_content = Some(payload);
        Ok(self)
    }

    /// Overwrite block texts in order; blocks without a replacement string keep theirs
    #[must_use]
    pub fn with_texts(mut self, texts: ToolValue) -> Self {
        if let ToolValue::List(items) = texts {
            for (block, item) in self.content.iter_mut().zip(items) {
                if let ToolValue::String(text) = item {
                    block.text = text;
                }
            }
        }
        self
    }
}

fn render_text<T: Serialize>(payload: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(payload)
    } else {
        serde_json::to_string(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_text_result_omits_structured_content() {
        let rendered = serde_json::to_value(ToolResult::text("hello")).unwrap();
        assert_eq!(rendered, json!({"content": [{"type": "text", "text": "hello"}]}));
    }

    #[test]
    fn test_structured_result_mirrors_payload() {
        let result = ToolResult::structured(&json!({"id": "g1"})).unwrap();
        assert_eq!(result.first_text(), Some(r#"{"id":"g1"}"#));
        let rendered = serde_json::to_value(&result).unwrap();
        assert_eq!(rendered["structuredContent"], json!({"id": "g1"}));
    }

    #[test]
    fn test_replaced_payload_keeps_layout() {
        let result = ToolResult::structured_pretty(&json!({"id": "g1"})).unwrap();
        let replaced = result
            .with_structured(ToolValue::from(json!({"id": "g2"})))
            .unwrap();

        assert_eq!(replaced.first_text(), Some("{\n  \"id\": \"g2\"\n}"));
        assert_eq!(
            replaced.structured_content.map(Value::from),
            Some(json!({"id": "g2"}))
        );
    }

    #[test]
    fn test_with_texts_rewrites_blocks() {
        let result = ToolResult::text("call 555-123-4567")
            .with_texts(ToolValue::from(json!(["call [MASKED_PHONE]"])));
        assert_eq!(result.first_text(), Some("call [MASKED_PHONE]"));
        assert_eq!(result.texts(), ToolValue::from(json!(["call [MASKED_PHONE]"])));
    }
}
