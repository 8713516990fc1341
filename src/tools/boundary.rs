// ABOUTME: Strictness policy applied to tool outputs before they reach an agent
// ABOUTME: Validates each output and passes, masks, or blocks it per the configured mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Family Serve

use tracing::debug;

use super::result::ToolResult;
use crate::config::environment::OutputValidationMode;
use crate::errors::{AppError, AppResult, OutputBlockedError};
use crate::models::ToolValue;
use crate::security::output_validation::{OutputValidationContext, OutputValidator};

/// Output gate between tool handlers and callers
#[derive(Debug, Clone, Default)]
pub struct ToolBoundary {
    validator: OutputValidator,
}

impl ToolBoundary {
    /// Gate enforcing the validator's strictness mode
    #[must_use]
    pub const fn new(validator: OutputValidator) -> Self {
        Self { validator }
    }

    /// Strictness in effect
    #[must_use]
    pub const fn mode(&self) -> OutputValidationMode {
        self.validator.mode()
    }

    /// Validate `output` and apply the strictness mode.
    ///
    /// - `warn`: the original output, findings only logged
    /// - `mask`: PII replaced by placeholders when the output is flagged
    /// - `block`: an error naming the tool and finding types when flagged
    ///
    /// # Errors
    ///
    /// Returns [`OutputBlockedError`] in `block` mode when the output is flagged
    pub fn enforce(
        &self,
        tool_name: &str,
        output: ToolValue,
    ) -> Result<ToolValue, OutputBlockedError> {
        self.gate(tool_name, output).map(Gated::into_value)
    }

    /// Apply the strictness mode to a tool result.
    ///
    /// The structured payload is validated when present, otherwise the text
    /// blocks are. A masked payload is re-rendered into the text blocks so both
    /// views agree.
    ///
    /// # Errors
    ///
    /// Returns an `OUTPUT_BLOCKED` error in `block` mode when the result is flagged,
    /// or a serialization error if a masked payload cannot be rendered
    pub fn enforce_result(
        &self,
        tool_name: &str,
        mut result: ToolResult,
    ) -> AppResult<ToolResult> {
        if let Some(payload) = result.structured_content.take() {
            return match self.gate(tool_name, payload)? {
                Gated::Unchanged(payload) => {
                    result.structured_content = Some(payload);
                    Ok(result)
                }
                Gated::Masked(payload) => result.with_structured(payload).map_err(AppError::from),
            };
        }
        match self.gate(tool_name, result.texts())? {
            Gated::Unchanged(_) => Ok(result),
            Gated::Masked(texts) => Ok(result.with_texts(texts)),
        }
    }

    fn gate(&self, tool_name: &str, output: ToolValue) -> Result<Gated, OutputBlockedError> {
        let result = self
            .validator
            .validate_output(output, OutputValidationContext { tool_name });
        if result.safe {
            return Ok(Gated::Unchanged(result.original_output));
        }

        match self.validator.mode() {
            OutputValidationMode::Warn => Ok(Gated::Unchanged(result.original_output)),
            OutputValidationMode::Mask => {
                debug!(tool = %tool_name, "Masking flagged tool output");
                Ok(Gated::Masked(OutputValidator::mask_pii(&result.original_output)))
            }
            OutputValidationMode::Block => Err(OutputBlockedError {
                tool_name: tool_name.to_owned(),
                finding_types: result.flagged_types(),
            }),
        }
    }
}

enum Gated {
    Unchanged(ToolValue),
    Masked(ToolValue),
}

impl Gated {
    fn into_value(self) -> ToolValue {
        match self {
            Self::Unchanged(value) | Self::Masked(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::OutputValidationConfig;
    use serde_json::{json, Value};

    fn boundary(mode: OutputValidationMode) -> ToolBoundary {
        ToolBoundary::new(OutputValidator::new(&OutputValidationConfig {
            mode,
            ..OutputValidationConfig::default()
        }))
    }

    #[test]
    fn test_masked_payload_rerenders_text() {
        let result = ToolResult::structured(&json!({"note": "reach sarah@example.com"})).unwrap();
        let masked = boundary(OutputValidationMode::Mask)
            .enforce_result("tool", result)
            .unwrap();

        let structured = Value::from(masked.structured_content.clone().unwrap());
        assert_eq!(structured, json!({"note": "reach [MASKED_EMAIL]"}));
        let text: Value = serde_json::from_str(masked.first_text().unwrap()).unwrap();
        assert_eq!(text, structured);
    }

    #[test]
    fn test_text_only_result_masked_in_place() {
        let result = ToolResult::text("No group found for name: sarah@example.com");
        let masked = boundary(OutputValidationMode::Mask)
            .enforce_result("tool", result)
            .unwrap();
        assert_eq!(
            masked.first_text(),
            Some("No group found for name: [MASKED_EMAIL]")
        );
        assert!(!masked.is_structured());
    }

    #[test]
    fn test_clean_result_untouched() {
        let result = ToolResult::structured_pretty(&json!({"id": "g1"})).unwrap();
        let passed = boundary(OutputValidationMode::Block)
            .enforce_result("tool", result.clone())
            .unwrap();
        assert_eq!(passed, result);
    }
}
