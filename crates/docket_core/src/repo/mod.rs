use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{AnalysisKind, AnalysisRecord, Case, CaseStatus};
use crate::error::AppError;
use crate::validate::validate_case;

/// Case store contract: plain CRUD over a single connection. There is no
/// isolation between callers and no optimistic concurrency; concurrent
/// updates to the same case are last-write-wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCaseInput {
    pub name: String,
    pub description: String,
    pub created_at: String, // RFC3339
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCasePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CaseStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateAnalysisInput {
    pub case_id: i64,
    pub kind: AnalysisKind,
    pub original_file_name: Option<String>,
    pub summary: String,
    pub result: serde_json::Value,
    pub created_at: String, // RFC3339
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseDetail {
    pub case: Case,
    pub analyses: Vec<AnalysisRecord>,
    pub warnings: Vec<crate::domain::ValidationWarning>,
}

#[derive(Debug, Clone, Serialize)]
struct AnalysisHashPayload<'a> {
    case_id: i64,
    kind: &'a str,
    original_file_name: Option<&'a str>,
    summary: &'a str,
    result_json: &'a str,
    created_at: &'a str,
}

fn compute_analysis_hash(input: &CreateAnalysisInput, result_json: &str) -> Result<String, AppError> {
    let payload = AnalysisHashPayload {
        case_id: input.case_id,
        kind: input.kind.as_str(),
        original_file_name: input.original_file_name.as_deref(),
        summary: input.summary.as_str(),
        result_json,
        created_at: input.created_at.as_str(),
    };
    let json = serde_json::to_string(&payload).map_err(|e| {
        AppError::new("DB_ANALYSIS_HASH_FAILED", "Failed to serialize analysis hash payload")
            .with_details(e.to_string())
    })?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(hex::encode(digest))
}

fn case_row(row: &rusqlite::Row<'_>) -> Result<Case, rusqlite::Error> {
    let status_raw: String = row.get(3)?;
    let status = CaseStatus::from_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "invalid case status",
            )),
        )
    })?;

    Ok(Case {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status,
        created_at: row.get(4)?,
        modified_at: row.get(5)?,
    })
}

pub fn create_case(conn: &Connection, input: CreateCaseInput) -> Result<Case, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::new("DB_CASE_INVALID", "Case name is required"));
    }

    conn.execute(
        r#"
        INSERT INTO cases(name, description, status, created_at, modified_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
        params![
            input.name,
            input.description,
            CaseStatus::Open.as_str(),
            input.created_at
        ],
    )
    .map_err(|e| {
        AppError::new("DB_CASE_CREATE_FAILED", "Failed to create case").with_details(e.to_string())
    })?;

    get_case(conn, conn.last_insert_rowid())
}

pub fn get_case(conn: &Connection, id: i64) -> Result<Case, AppError> {
    conn.query_row(
        "SELECT id, name, description, status, created_at, modified_at FROM cases WHERE id = ?1",
        [id],
        case_row,
    )
    .map_err(|e| AppError::new("DB_CASE_NOT_FOUND", "Case not found").with_details(e.to_string()))
}

pub fn list_cases(conn: &Connection) -> Result<Vec<Case>, AppError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, status, created_at, modified_at FROM cases ORDER BY id ASC",
        )
        .map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to prepare cases query")
                .with_details(e.to_string())
        })?;

    let rows = stmt.query_map([], case_row).map_err(|e| {
        AppError::new("DB_QUERY_FAILED", "Failed to query cases").with_details(e.to_string())
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to decode case row")
                .with_details(e.to_string())
        })?);
    }

    Ok(out)
}

/// Patch semantics: only supplied fields change. Last write wins; callers
/// racing on the same case will simply overwrite each other.
pub fn update_case(
    conn: &Connection,
    id: i64,
    patch: UpdateCasePatch,
    modified_at: &str,
) -> Result<Case, AppError> {
    let current = get_case(conn, id)?;

    let name = patch.name.unwrap_or(current.name);
    if name.trim().is_empty() {
        return Err(AppError::new("DB_CASE_INVALID", "Case name is required"));
    }
    let description = patch.description.unwrap_or(current.description);
    let status = patch.status.unwrap_or(current.status);

    conn.execute(
        r#"
        UPDATE cases
        SET name = ?1, description = ?2, status = ?3, modified_at = ?4
        WHERE id = ?5
        "#,
        params![name, description, status.as_str(), modified_at, id],
    )
    .map_err(|e| {
        AppError::new("DB_CASE_UPDATE_FAILED", "Failed to update case").with_details(e.to_string())
    })?;

    get_case(conn, id)
}

pub fn delete_case(conn: &Connection, id: i64) -> Result<(), AppError> {
    // Attached analyses go with the case (ON DELETE CASCADE).
    let affected = conn
        .execute("DELETE FROM cases WHERE id = ?1", [id])
        .map_err(|e| {
            AppError::new("DB_CASE_DELETE_FAILED", "Failed to delete case")
                .with_details(e.to_string())
        })?;

    if affected == 0 {
        return Err(AppError::new("DB_CASE_NOT_FOUND", "Case not found")
            .with_details(format!("id={id}")));
    }

    Ok(())
}

fn analysis_row(row: &rusqlite::Row<'_>) -> Result<AnalysisRecord, rusqlite::Error> {
    let kind_raw: String = row.get(3)?;
    let kind = AnalysisKind::from_str(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "invalid analysis kind",
            )),
        )
    })?;

    let result_json: String = row.get(6)?;
    let result: serde_json::Value = serde_json::from_str(&result_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(AnalysisRecord {
        id: row.get(0)?,
        case_id: row.get(1)?,
        created_at: row.get(2)?,
        kind,
        original_file_name: row.get(4)?,
        summary: row.get(5)?,
        result,
        artifact_hash: row.get(7)?,
    })
}

/// Append one analysis run to a case and bump the case's `modified_at`.
/// Records are immutable afterwards; there is no update or single-record
/// delete operation.
pub fn append_analysis(
    conn: &Connection,
    input: CreateAnalysisInput,
) -> Result<AnalysisRecord, AppError> {
    if input.summary.trim().is_empty() {
        return Err(AppError::new(
            "DB_ANALYSIS_INVALID",
            "Analysis summary is required",
        ));
    }

    // Ensure the case exists before inserting so callers get a stable code.
    let case = get_case(conn, input.case_id)?;

    let result_json = serde_json::to_string(&input.result).map_err(|e| {
        AppError::new("DB_ANALYSIS_INVALID", "Failed to encode analysis result")
            .with_details(e.to_string())
    })?;
    let artifact_hash = compute_analysis_hash(&input, &result_json)?;

    conn.execute(
        r#"
        INSERT INTO analyses(case_id, created_at, kind, original_file_name, summary, result_json, artifact_hash)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            input.case_id,
            input.created_at,
            input.kind.as_str(),
            input.original_file_name,
            input.summary,
            result_json,
            artifact_hash
        ],
    )
    .map_err(|e| {
        AppError::new("DB_ANALYSIS_CREATE_FAILED", "Failed to store analysis")
            .with_details(e.to_string())
    })?;

    let id = conn.last_insert_rowid();

    conn.execute(
        "UPDATE cases SET modified_at = ?1 WHERE id = ?2",
        params![input.created_at, case.id],
    )
    .map_err(|e| {
        AppError::new("DB_CASE_UPDATE_FAILED", "Failed to touch case after analysis")
            .with_details(e.to_string())
    })?;

    get_analysis(conn, id)?.ok_or_else(|| {
        AppError::new(
            "DB_ANALYSIS_CREATE_FAILED",
            "Analysis stored but could not be read back",
        )
    })
}

pub fn get_analysis(conn: &Connection, id: i64) -> Result<Option<AnalysisRecord>, AppError> {
    conn.query_row(
        r#"
        SELECT id, case_id, created_at, kind, original_file_name, summary, result_json, artifact_hash
        FROM analyses
        WHERE id = ?1
        "#,
        [id],
        analysis_row,
    )
    .optional()
    .map_err(|e| {
        AppError::new("DB_QUERY_FAILED", "Failed to query analysis").with_details(e.to_string())
    })
}

pub fn list_analyses_for_case(
    conn: &Connection,
    case_id: i64,
) -> Result<Vec<AnalysisRecord>, AppError> {
    let mut stmt = conn
        .prepare(
            r#"
        SELECT id, case_id, created_at, kind, original_file_name, summary, result_json, artifact_hash
        FROM analyses
        WHERE case_id = ?1
        ORDER BY created_at ASC, id ASC
        "#,
        )
        .map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to prepare analyses query")
                .with_details(e.to_string())
        })?;

    let rows = stmt.query_map([case_id], analysis_row).map_err(|e| {
        AppError::new("DB_QUERY_FAILED", "Failed to query analyses").with_details(e.to_string())
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| {
            AppError::new("DB_QUERY_FAILED", "Failed to decode analysis row")
                .with_details(e.to_string())
        })?);
    }

    Ok(out)
}

pub fn get_case_detail(conn: &Connection, case_id: i64) -> Result<CaseDetail, AppError> {
    let case = get_case(conn, case_id)?;
    let mut warnings = validate_case(&case);
    warnings.sort_by(|a, b| a.code.cmp(&b.code));
    let analyses = list_analyses_for_case(conn, case_id)?;

    Ok(CaseDetail {
        case,
        analyses,
        warnings,
    })
}
