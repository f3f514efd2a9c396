use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use docket_ai::capability::{Capability, CapabilityRequest};
use docket_ai::classify::{
    classify_text_for_crimes, usable_for_classification, MIN_CLASSIFIABLE_CHARS,
};
use docket_ai::media;
use docket_ai::stages::{DegradeReason, StageStatus, NO_VALID_INPUT_SENTINEL};
use docket_core::error::AppError;

const MODEL: &str = "test-model";

struct OneShot {
    response: Result<Option<Value>, AppError>,
    calls: Mutex<usize>,
}

impl OneShot {
    fn ok(value: Value) -> Self {
        Self {
            response: Ok(Some(value)),
            calls: Mutex::new(0),
        }
    }

    fn err(err: AppError) -> Self {
        Self {
            response: Err(err),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Capability for OneShot {
    fn invoke(&self, _req: &CapabilityRequest) -> Result<Option<Value>, AppError> {
        *self.calls.lock().unwrap() += 1;
        match &self.response {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(e.clone()),
        }
    }
}

const LONG_TEXT: &str =
    "The subject transferred funds repeatedly between shell accounts to disguise their origin.";

#[test]
fn short_text_skips_the_capability() {
    let cap = OneShot::ok(json!({}));
    let result = classify_text_for_crimes(&cap, MODEL, "too short", None);

    assert_eq!(cap.calls(), 0);
    assert!(result.tags.is_empty());
    assert!(result
        .overall_assessment
        .contains(&MIN_CLASSIFIABLE_CHARS.to_string()));
    assert!(matches!(
        result.status,
        StageStatus::Degraded {
            reason: DegradeReason::NoInput,
            ..
        }
    ));
}

#[test]
fn usability_gate_covers_all_sentinels() {
    assert!(usable_for_classification(LONG_TEXT));

    assert!(!usable_for_classification(""));
    assert!(!usable_for_classification("   "));
    assert!(!usable_for_classification("Stage failure: empty response from capability"));
    assert!(!usable_for_classification(&media::system_notice(
        Some("archive.zip"),
        Some("application/zip")
    )));
    assert!(!usable_for_classification(NO_VALID_INPUT_SENTINEL));
}

#[test]
fn capability_failure_yields_empty_classification_with_explanation() {
    let cap = OneShot::err(AppError::new("AI_CAPABILITY_FAILED", "status 503"));
    let result = classify_text_for_crimes(&cap, MODEL, LONG_TEXT, Some("Source file: ledger.txt"));

    assert_eq!(cap.calls(), 1);
    assert!(result.tags.is_empty());
    assert!(result.overall_assessment.contains("Classification unavailable"));
    assert!(matches!(
        result.status,
        StageStatus::Degraded {
            reason: DegradeReason::CapabilityError,
            ..
        }
    ));
}

#[test]
fn confidence_is_clamped_into_unit_interval() {
    let cap = OneShot::ok(json!({
        "tags": [
            { "kind": "money_laundering", "rationale": "Layered transfers.", "confidence": 1.7 },
            { "kind": "fraud", "rationale": "Misrepresented origin.", "confidence": -0.3 },
            { "kind": "tax_evasion", "rationale": "Unreported income.", "confidence": 0.55 }
        ],
        "overall_assessment": "Multiple indicators of financial crime."
    }));

    let result = classify_text_for_crimes(&cap, MODEL, LONG_TEXT, None);

    assert_eq!(result.status, StageStatus::Ok);
    let confidences: Vec<f64> = result.tags.iter().map(|t| t.confidence).collect();
    assert_eq!(confidences, vec![1.0, 0.0, 0.55]);
}

#[test]
fn missing_tag_fields_get_defaults() {
    let cap = OneShot::ok(json!({
        "tags": [{ "confidence": 0.4 }],
        "overall_assessment": "One weak indicator."
    }));

    let result = classify_text_for_crimes(&cap, MODEL, LONG_TEXT, None);

    assert_eq!(result.tags.len(), 1);
    assert!(!result.tags[0].kind.is_empty());
    assert!(!result.tags[0].rationale.is_empty());
    assert!(result.tags[0].parties.is_empty());
    assert!(result.tags[0].excerpts.is_empty());
}
