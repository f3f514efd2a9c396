//! End-to-end path: analyze a document, attach the result to a case,
//! render the dossier.

use serde_json::{json, Value};

use docket_ai::capability::{Capability, CapabilityRequest};
use docket_ai::pipeline::{analyze_document, AnalysisRequest};
use docket_core::db;
use docket_core::domain::AnalysisKind;
use docket_core::report::generate_case_markdown;
use docket_core::repo::{append_analysis, create_case, CreateAnalysisInput, CreateCaseInput};
use docket_core::error::AppError;

const MODEL: &str = "test-model";

struct CannedCapability;

impl Capability for CannedCapability {
    fn invoke(&self, req: &CapabilityRequest) -> Result<Option<Value>, AppError> {
        let v = match req.task {
            "investigator" => json!({
                "observations": "The statement places the subject at the scene.",
                "leads": ["Verify the alibi with the employer"]
            }),
            "clerk" => json!({
                "language": "en",
                "summary": "Witness statement placing the subject at the scene.",
                "key_entities": ["subject", "scene"],
                "report": { "title": "Record entry 1", "body": "Formal record of the statement." }
            }),
            "delegate" => json!({
                "overall_assessment": "Statement supports continued investigation.",
                "suggested_actions": ["Schedule a follow-up interview"],
                "legal_considerations": "No custodial measures warranted yet."
            }),
            "press_release" => json!({
                "text": "Police confirm an investigation is underway; no further details at this time."
            }),
            "crime_classification" => json!({
                "tags": [{
                    "kind": "trespass",
                    "rationale": "Unauthorized presence described.",
                    "confidence": 0.6,
                    "parties": ["subject"],
                    "excerpts": ["the subject entered the yard"]
                }],
                "overall_assessment": "One plausible indicator."
            }),
            other => panic!("unexpected capability task: {other}"),
        };
        Ok(Some(v))
    }
}

#[test]
fn analysis_attaches_to_a_case_and_renders() {
    let mut conn = db::open_in_memory().expect("open");
    db::migrate(&mut conn).expect("migrate");

    let case = create_case(
        &conn,
        CreateCaseInput {
            name: "Case 2026-0117".to_string(),
            description: "Trespass complaint.".to_string(),
            created_at: "2026-03-01T09:00:00Z".to_string(),
        },
    )
    .expect("create case");

    let req = AnalysisRequest {
        plain_text: Some(
            "The witness states that the subject entered the yard without permission at dusk."
                .to_string(),
        ),
        file_name: Some("stmt.txt".to_string()),
        ..Default::default()
    };
    let analysis = analyze_document(&CannedCapability, MODEL, &req).expect("analyze");

    let record = append_analysis(
        &conn,
        CreateAnalysisInput {
            case_id: case.id,
            kind: AnalysisKind::Document,
            original_file_name: req.file_name.clone(),
            summary: analysis.summary.clone(),
            result: serde_json::to_value(&analysis).expect("encode"),
            created_at: "2026-03-01T11:00:00Z".to_string(),
        },
    )
    .expect("append");

    assert_eq!(record.case_id, case.id);
    assert_eq!(record.summary, "Witness statement placing the subject at the scene.");
    // The stored payload round-trips the full pipeline result.
    assert_eq!(
        record.result.get("extracted_text").and_then(Value::as_str),
        req.plain_text.as_deref()
    );

    let md = generate_case_markdown(&conn, case.id).expect("report");
    assert!(md.contains("Case 2026-0117"));
    assert!(md.contains("the subject entered the yard without permission"));
    assert!(md.contains("trespass: Unauthorized presence described."));
    assert!(md.contains("Police confirm an investigation is underway"));
}
