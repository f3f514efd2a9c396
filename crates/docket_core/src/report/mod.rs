use rusqlite::Connection;
use serde_json::Value;

use crate::error::AppError;
use crate::repo::get_case_detail;

fn json_str<'a>(v: &'a Value, key: &str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or("UNKNOWN")
}

fn json_nested_str<'a>(v: &'a Value, outer: &str, key: &str) -> &'a str {
    v.get(outer)
        .and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
}

fn json_string_list(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Generate a deterministic Markdown dossier for one case.
///
/// Analyses render in storage order (created_at, id) and degraded results
/// render exactly like healthy ones; sentinel text stays visible in the
/// output instead of being filtered.
pub fn generate_case_markdown(conn: &Connection, case_id: i64) -> Result<String, AppError> {
    let detail = get_case_detail(conn, case_id)?;
    let mut out = String::new();

    out.push_str(&format!("# Case dossier: {}\n\n", detail.case.name));
    out.push_str(&format!("- Status: {}\n", detail.case.status.as_str()));
    out.push_str(&format!("- Created: {}\n", detail.case.created_at));
    out.push_str(&format!("- Modified: {}\n", detail.case.modified_at));
    out.push_str(&format!("- Analyses: {}\n", detail.analyses.len()));
    out.push('\n');

    if !detail.case.description.trim().is_empty() {
        out.push_str(&format!("{}\n\n", detail.case.description.trim()));
    }

    if !detail.warnings.is_empty() {
        out.push_str("## Validation warnings\n\n");
        for w in &detail.warnings {
            out.push_str(&format!("- `{}` {}\n", w.code, w.message));
        }
        out.push('\n');
    }

    for (idx, analysis) in detail.analyses.iter().enumerate() {
        out.push_str(&format!(
            "## Analysis {} ({})\n\n",
            idx + 1,
            analysis.kind.as_str()
        ));
        out.push_str(&format!("- Date: {}\n", analysis.created_at));
        if let Some(name) = analysis.original_file_name.as_deref() {
            out.push_str(&format!("- Source file: {name}\n"));
        }
        out.push_str(&format!("- Fingerprint: {}\n\n", analysis.artifact_hash));

        out.push_str(&format!("{}\n\n", analysis.summary));

        let r = &analysis.result;

        out.push_str("### Extracted content\n\n");
        out.push_str(&format!("{}\n\n", json_str(r, "extracted_text")));

        out.push_str("### Investigator observations\n\n");
        out.push_str(&format!(
            "{}\n\n",
            json_nested_str(r, "investigator", "observations")
        ));
        let leads = r
            .get("investigator")
            .map(|i| json_string_list(i, "leads"))
            .unwrap_or_default();
        for lead in &leads {
            out.push_str(&format!("- Lead: {lead}\n"));
        }
        if !leads.is_empty() {
            out.push('\n');
        }

        out.push_str("### Assessment\n\n");
        out.push_str(&format!(
            "{}\n\n",
            json_nested_str(r, "delegate", "overall_assessment")
        ));

        out.push_str("### Press release\n\n");
        out.push_str(&format!("{}\n\n", json_nested_str(r, "press_release", "text")));

        let tags = r
            .get("crime_classification")
            .and_then(|c| c.get("tags"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        out.push_str("### Classification\n\n");
        if tags.is_empty() {
            out.push_str(&format!(
                "{}\n\n",
                json_nested_str(r, "crime_classification", "overall_assessment")
            ));
        } else {
            for tag in tags {
                out.push_str(&format!(
                    "- {}: {}\n",
                    json_str(tag, "kind"),
                    json_str(tag, "rationale")
                ));
            }
            out.push('\n');
            out.push_str(&format!(
                "{}\n\n",
                json_nested_str(r, "crime_classification", "overall_assessment")
            ));
        }
    }

    Ok(out)
}
