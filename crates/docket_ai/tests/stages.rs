use std::sync::Mutex;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use docket_ai::capability::{Capability, CapabilityRequest};
use docket_ai::media;
use docket_ai::stages::clerk::{run_clerk, ClerkReport, ClerkResult};
use docket_ai::stages::delegate::run_delegate;
use docket_ai::stages::investigator::{run_investigator, InvestigatorResult};
use docket_ai::stages::press_release::{fallback_statement, run_press_release};
use docket_ai::stages::{
    DegradeReason, StageInput, StageStatus, FIELD_NOT_PROVIDED,
};
use docket_core::error::AppError;

const MODEL: &str = "test-model";

/// Single-response mock that also captures the prompts it was sent.
struct OneShot {
    response: Result<Option<Value>, AppError>,
    prompts: Mutex<Vec<String>>,
}

impl OneShot {
    fn ok(value: Value) -> Self {
        Self {
            response: Ok(Some(value)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self {
            response: Ok(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn err(err: AppError) -> Self {
        Self {
            response: Err(err),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Capability for OneShot {
    fn invoke(&self, req: &CapabilityRequest) -> Result<Option<Value>, AppError> {
        self.prompts.lock().unwrap().push(req.prompt.clone());
        match &self.response {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(e.clone()),
        }
    }
}

fn text_input(text: &str) -> StageInput {
    StageInput::from_text(text, Some("stmt.txt".to_string()))
}

fn empty_input() -> StageInput {
    StageInput {
        file: None,
        text: None,
        file_name: None,
        media_capable: false,
    }
}

fn ok_clerk() -> ClerkResult {
    ClerkResult {
        status: StageStatus::Ok,
        extracted_text: "Extracted statement text.".to_string(),
        language: "en".to_string(),
        summary: "Short summary.".to_string(),
        key_entities: vec!["witness".to_string()],
        report: ClerkReport {
            title: "Record entry".to_string(),
            body: "Formal body.".to_string(),
        },
    }
}

fn ok_investigator() -> InvestigatorResult {
    InvestigatorResult {
        status: StageStatus::Ok,
        observations: "Consistent account.".to_string(),
        leads: vec!["Check CCTV".to_string()],
    }
}

#[test]
fn investigator_skips_capability_without_input() {
    let cap = OneShot::ok(json!({}));
    let result = run_investigator(&cap, MODEL, &empty_input());

    assert_eq!(cap.call_count(), 0);
    assert!(result.observations.starts_with("Stage failure:"));
    assert!(matches!(
        result.status,
        StageStatus::Degraded {
            reason: DegradeReason::NoInput,
            ..
        }
    ));
}

#[test]
fn investigator_absorbs_capability_error_as_sentinel() {
    let cap = OneShot::err(AppError::new("AI_CAPABILITY_FAILED", "status 500"));
    let result = run_investigator(&cap, MODEL, &text_input("some evidence text"));

    assert!(result.observations.starts_with("Stage failure:"));
    assert!(result.observations.contains("status 500"));
    assert!(result.leads.is_empty());
}

#[test]
fn investigator_flags_empty_response() {
    let cap = OneShot::empty();
    let result = run_investigator(&cap, MODEL, &text_input("some evidence text"));

    assert!(result.observations.contains("empty response"));
    assert!(matches!(
        result.status,
        StageStatus::Degraded {
            reason: DegradeReason::EmptyResponse,
            ..
        }
    ));
}

#[test]
fn investigator_defaults_missing_fields() {
    let cap = OneShot::ok(json!({ "leads": ["one lead"] }));
    let result = run_investigator(&cap, MODEL, &text_input("some evidence text"));

    assert_eq!(result.status, StageStatus::Ok);
    assert_eq!(result.observations, FIELD_NOT_PROVIDED);
    assert_eq!(result.leads, vec!["one lead".to_string()]);
}

#[test]
fn clerk_pins_plain_text_as_extraction() {
    let cap = OneShot::ok(json!({
        "extracted_text": "something else entirely",
        "language": "en",
        "summary": "Summary.",
        "key_entities": [],
        "report": { "title": "t", "body": "b" }
    }));
    let result = run_clerk(&cap, MODEL, &text_input("the original statement"));

    assert_eq!(result.extracted_text, "the original statement");
    assert_eq!(result.language, "en");
}

#[test]
fn clerk_pins_system_notice_verbatim() {
    let notice = media::system_notice(Some("archive.zip"), Some("application/zip"));
    let cap = OneShot::ok(json!({
        "language": "en",
        "summary": "Unprocessable file.",
        "key_entities": ["archive.zip"]
    }));
    let result = run_clerk(&cap, MODEL, &StageInput::from_text(notice.clone(), None));

    assert_eq!(result.extracted_text, notice);
    // Omitted report object falls back field by field.
    assert_eq!(result.report.title, FIELD_NOT_PROVIDED);
    assert_eq!(result.report.body, FIELD_NOT_PROVIDED);
}

#[test]
fn clerk_failure_fills_every_field() {
    let cap = OneShot::err(AppError::new("AI_CAPABILITY_UNREACHABLE", "connect refused"));
    let result = run_clerk(&cap, MODEL, &text_input("statement"));

    for field in [
        &result.extracted_text,
        &result.language,
        &result.summary,
        &result.report.title,
        &result.report.body,
    ] {
        assert!(field.starts_with("Stage failure:"), "unfilled field: {field}");
    }
    assert!(result.key_entities.is_empty());
}

#[test]
fn delegate_prompt_carries_upstream_failure_text() {
    let cap = OneShot::ok(json!({
        "overall_assessment": "Evaluation compromised.",
        "suggested_actions": [],
        "legal_considerations": "None."
    }));

    let mut clerk = ok_clerk();
    clerk.extracted_text = "Stage failure: empty response from capability".to_string();

    let _ = run_delegate(&cap, MODEL, &text_input("statement"), &ok_investigator(), &clerk);

    // The delegate must see upstream failure text so it can account for it.
    assert!(cap.last_prompt().contains("Stage failure: empty response"));
    assert!(cap.last_prompt().contains("Consistent account."));
}

#[test]
fn press_release_falls_back_on_error_and_is_deterministic() {
    let input = text_input("statement");
    let clerk = ok_clerk();
    let delegate = docket_ai::stages::delegate::DelegateResult {
        status: StageStatus::Ok,
        overall_assessment: "Assessment.".to_string(),
        suggested_actions: vec![],
        legal_considerations: "None.".to_string(),
    };

    let first = run_press_release(
        &OneShot::err(AppError::new("AI_CAPABILITY_FAILED", "boom")),
        MODEL,
        &input,
        &clerk,
        &delegate,
    );
    let second = run_press_release(
        &OneShot::err(AppError::new("AI_CAPABILITY_FAILED", "boom")),
        MODEL,
        &input,
        &clerk,
        &delegate,
    );

    assert_eq!(first.text, second.text);
    assert_eq!(first.text, fallback_statement(Some("stmt.txt")));
    assert!(!first.text.trim().is_empty());
    assert!(first.status.is_degraded());
}

#[test]
fn press_release_replaces_blank_output_with_fallback() {
    let cap = OneShot::ok(json!({ "text": "   " }));
    let result = run_press_release(
        &cap,
        MODEL,
        &text_input("statement"),
        &ok_clerk(),
        &docket_ai::stages::delegate::DelegateResult {
            status: StageStatus::Ok,
            overall_assessment: "Assessment.".to_string(),
            suggested_actions: vec![],
            legal_considerations: "None.".to_string(),
        },
    );

    assert_eq!(result.text, fallback_statement(Some("stmt.txt")));
    assert!(matches!(
        result.status,
        StageStatus::Degraded {
            reason: DegradeReason::EmptyResponse,
            ..
        }
    ));
}

#[test]
fn press_release_keeps_capability_text_when_present() {
    let cap = OneShot::ok(json!({ "text": "Authorities confirm an arrest was made." }));
    let result = run_press_release(
        &cap,
        MODEL,
        &text_input("statement"),
        &ok_clerk(),
        &docket_ai::stages::delegate::DelegateResult {
            status: StageStatus::Ok,
            overall_assessment: "Assessment.".to_string(),
            suggested_actions: vec![],
            legal_considerations: "None.".to_string(),
        },
    );

    assert_eq!(result.text, "Authorities confirm an arrest was made.");
    assert_eq!(result.status, StageStatus::Ok);
}
