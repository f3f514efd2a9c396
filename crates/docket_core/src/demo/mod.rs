use rusqlite::Connection;
use serde_json::json;

use crate::domain::{AnalysisKind, Case};
use crate::error::AppError;
use crate::repo::{append_analysis, create_case, CreateAnalysisInput, CreateCaseInput};

/// Seed one deterministic demo case with canned analyses so the report and
/// detail views have something to show on a fresh store.
pub fn seed_demo_case(conn: &Connection) -> Result<Case, AppError> {
    let case = create_case(
        conn,
        CreateCaseInput {
            name: "Demo case 001".to_string(),
            description: "Deterministic sample data for development and demos.".to_string(),
            created_at: "2026-03-01T09:00:00Z".to_string(),
        },
    )?;

    append_analysis(
        conn,
        CreateAnalysisInput {
            case_id: case.id,
            kind: AnalysisKind::Document,
            original_file_name: Some("witness_statement.txt".to_string()),
            summary: "Witness statement covering the events of 2026-02-27.".to_string(),
            result: json!({
                "extracted_text": "Witness reports seeing two individuals leave the premises at 23:40.",
                "summary": "Witness statement covering the events of 2026-02-27.",
                "key_entities": ["premises", "two individuals"],
                "language": "en",
                "investigator": {
                    "observations": "Statement is internally consistent; timeline matches CCTV window.",
                    "leads": ["Request CCTV footage for 23:30-23:50"]
                },
                "delegate": {
                    "overall_assessment": "Credible statement; corroboration pending.",
                    "suggested_actions": ["Interview the second witness"],
                    "legal_considerations": "None at this stage."
                },
                "press_release": { "text": "Authorities are reviewing a witness statement related to an ongoing case." },
                "crime_classification": {
                    "tags": [],
                    "overall_assessment": "No chargeable conduct identified in this statement alone."
                }
            }),
            created_at: "2026-03-01T10:00:00Z".to_string(),
        },
    )?;

    append_analysis(
        conn,
        CreateAnalysisInput {
            case_id: case.id,
            kind: AnalysisKind::Audio,
            original_file_name: Some("interview_2026-03-01.m4a".to_string()),
            summary: "Consolidated transcript of the suspect interview.".to_string(),
            result: json!({
                "merged_transcript": "[interviewer] State your name. [subject] ...",
                "summary": "Subject declined to answer most questions.",
                "speakers": ["interviewer", "subject"]
            }),
            created_at: "2026-03-01T14:30:00Z".to_string(),
        },
    )?;

    // Re-read so modified_at reflects the appended analyses.
    crate::repo::get_case(conn, case.id)
}
