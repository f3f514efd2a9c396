use serde::{Deserialize, Serialize};

use crate::capability::Attachment;
use crate::media;

pub mod clerk;
pub mod delegate;
pub mod investigator;
pub mod press_release;
pub mod prompts;

/// Prefix of the sentinel text written into every string field of a stage
/// result that degraded. Renderers show it as-is; code must branch on
/// `StageStatus`, not on this string.
pub const FAILURE_PREFIX: &str = "Stage failure:";

pub const NO_INPUT_DETAIL: &str = "no input provided";
pub const EMPTY_RESPONSE_DETAIL: &str = "empty response from capability";

/// Sentinel used by the orchestrator's intake backstop when a request with
/// no usable content slips past the boundary check.
pub const NO_VALID_INPUT_SENTINEL: &str =
    "Invalid input: no file content or text was supplied for analysis.";

/// Default for any field a populated capability response omitted.
pub const FIELD_NOT_PROVIDED: &str = "Not provided by the capability";

pub fn failure_text(detail: &str) -> String {
    format!("{FAILURE_PREFIX} {detail}")
}

pub fn is_failure_text(text: &str) -> bool {
    text.trim_start().starts_with(FAILURE_PREFIX)
}

/// Why a stage result is degraded. Carried alongside the sentinel text so
/// consumers never have to string-match a prefix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DegradeReason {
    NoInput,
    EmptyResponse,
    CapabilityError,
    InvalidRequest,
    CriticalError,
}

/// Tagged outcome of a stage. A `Degraded` result still carries a fully
/// populated payload; no field of any stage result is ever absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Degraded { reason: DegradeReason, detail: String },
}

impl StageStatus {
    pub fn degraded(reason: DegradeReason, detail: impl Into<String>) -> Self {
        StageStatus::Degraded {
            reason,
            detail: detail.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StageStatus::Ok)
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_ok()
    }
}

/// Input handed to a stage by the orchestrator: either an attachment the
/// capability can ingest directly, or text (supplied directly, or a
/// synthesized system notice standing in for an unprocessable file).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageInput {
    pub file: Option<Attachment>,
    pub text: Option<String>,
    pub file_name: Option<String>,
    pub media_capable: bool,
}

impl StageInput {
    pub fn from_text(text: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            file: None,
            text: Some(text.into()),
            file_name,
            media_capable: false,
        }
    }

    pub fn from_file(file: Attachment, file_name: Option<String>) -> Self {
        Self {
            file: Some(file),
            text: None,
            file_name,
            media_capable: true,
        }
    }

    pub fn has_content(&self) -> bool {
        if self.file.is_some() {
            return true;
        }
        self.text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn is_system_notice(&self) -> bool {
        self.text
            .as_deref()
            .map(media::is_system_notice)
            .unwrap_or(false)
    }
}
