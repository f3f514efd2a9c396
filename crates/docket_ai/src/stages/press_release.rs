use serde::{Deserialize, Serialize};

use crate::capability::{Capability, CapabilityRequest};

use super::clerk::ClerkResult;
use super::delegate::DelegateResult;
use super::{prompts, DegradeReason, StageInput, StageStatus, EMPTY_RESPONSE_DETAIL, NO_INPUT_DETAIL};

/// The press release carries a stronger guarantee than the other stages:
/// `text` is never empty. Total upstream failure still yields a
/// publishable holding statement via the deterministic fallback below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PressReleaseResult {
    pub status: StageStatus,
    pub text: String,
}

/// Deterministic holding statement, a pure function of the file name.
pub fn fallback_statement(file_name: Option<&str>) -> String {
    match file_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!(
            "Authorities are reviewing material (\"{name}\") connected to an ongoing investigation. Further information will be released once it no longer risks compromising the inquiry."
        ),
        None => "Authorities are reviewing material connected to an ongoing investigation. Further information will be released once it no longer risks compromising the inquiry.".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct RawPressReleaseOutput {
    text: Option<String>,
}

/// Consumes the clerk's and the delegate's results (not the
/// investigator's). Never returns an error and never returns blank text.
pub fn run_press_release(
    cap: &dyn Capability,
    model: &str,
    input: &StageInput,
    clerk: &ClerkResult,
    delegate: &DelegateResult,
) -> PressReleaseResult {
    let fallback = fallback_statement(input.file_name.as_deref());

    if !input.has_content() {
        return PressReleaseResult {
            status: StageStatus::degraded(DegradeReason::NoInput, NO_INPUT_DETAIL),
            text: fallback,
        };
    }

    let req = CapabilityRequest {
        task: "press_release",
        model: model.to_string(),
        prompt: prompts::press_release_prompt(input, clerk, delegate),
        attachment: None,
    };

    match cap.invoke(&req) {
        Err(e) => {
            tracing::warn!(stage = "press_release", error = %e, "stage degraded, using fallback statement");
            PressReleaseResult {
                status: StageStatus::degraded(DegradeReason::CapabilityError, e.to_string()),
                text: fallback,
            }
        }
        Ok(None) => PressReleaseResult {
            status: StageStatus::degraded(DegradeReason::EmptyResponse, EMPTY_RESPONSE_DETAIL),
            text: fallback,
        },
        Ok(Some(value)) => {
            let text = serde_json::from_value::<RawPressReleaseOutput>(value)
                .ok()
                .and_then(|raw| raw.text)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());

            match text {
                Some(text) => PressReleaseResult {
                    status: StageStatus::Ok,
                    text,
                },
                None => PressReleaseResult {
                    status: StageStatus::degraded(
                        DegradeReason::EmptyResponse,
                        "blank press release from capability",
                    ),
                    text: fallback,
                },
            }
        }
    }
}
