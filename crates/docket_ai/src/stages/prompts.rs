use super::clerk::ClerkResult;
use super::delegate::DelegateResult;
use super::investigator::InvestigatorResult;
use super::StageInput;

/// Version tag recorded in analysis provenance; bump when any prompt here
/// changes in a way that affects output shape or meaning.
pub const PROMPT_VERSION: &str = "docket_prompts_v1";

fn input_block(input: &StageInput) -> String {
    let name = input.file_name.as_deref().unwrap_or("not recorded");
    match (&input.file, input.text.as_deref()) {
        (Some(file), _) => format!(
            "An evidence file is attached to this request.\nFile name: {name}\nMedia type: {}",
            file.media_type
        ),
        (None, Some(text)) => format!("File name: {name}\n\nEvidence text:\n{text}"),
        (None, None) => format!("File name: {name}\n\nEvidence text:\n(none)"),
    }
}

pub fn investigator_prompt(input: &StageInput) -> String {
    format!(
        r#"You are the investigator on a law-enforcement case team. Examine the evidence below and record what you observe.

Rules (non-negotiable):
1) Base every observation strictly on the evidence provided. Do not invent facts.
2) Leads must be concrete follow-up actions, one per entry.
3) If the evidence is insufficient for an observation, say so explicitly.

{evidence}

Output:
- Return a single JSON object, nothing else.
- Fields: "observations" (string), "leads" (array of strings).
"#,
        evidence = input_block(input)
    )
}

pub fn clerk_prompt(input: &StageInput) -> String {
    format!(
        r#"You are the case clerk responsible for the formal record. Process the evidence below.

Rules (non-negotiable):
1) If a file is attached, extract its full text content faithfully; describe images factually.
2) If the evidence text begins with "[system notice]", transcribe that notice verbatim as the extracted text and derive key entities from the file name and media type only.
3) Otherwise treat the evidence text as the extracted text and summarize it.
4) Do not invent content that is not present in the evidence.

{evidence}

Output:
- Return a single JSON object, nothing else.
- Fields: "extracted_text" (string), "language" (BCP 47 tag of the evidence language), "summary" (string), "key_entities" (array of strings), "report" (object with "title" and "body" strings, written as a formal case record entry).
"#,
        evidence = input_block(input)
    )
}

pub fn delegate_prompt(
    input: &StageInput,
    investigator: &InvestigatorResult,
    clerk: &ClerkResult,
) -> String {
    format!(
        r#"You are the delegate in charge of this case. Review the original evidence and the work of the investigator and the clerk, then give your assessment.

Rules (non-negotiable):
1) If any upstream field below begins with "Stage failure:", state plainly that the evaluation is compromised by that failure. Do not fabricate an assessment over missing work.
2) Suggested actions must be concrete and assignable.
3) Legal considerations must be stated neutrally; cite no statute you are not certain applies.

{evidence}

Investigator observations:
{observations}

Investigator leads:
{leads}

Clerk extracted text:
{extracted}

Clerk summary:
{summary}

Output:
- Return a single JSON object, nothing else.
- Fields: "overall_assessment" (string), "suggested_actions" (array of strings), "legal_considerations" (string).
"#,
        evidence = input_block(input),
        observations = investigator.observations,
        leads = investigator.leads.join("; "),
        extracted = clerk.extracted_text,
        summary = clerk.summary,
    )
}

pub fn press_release_prompt(
    input: &StageInput,
    clerk: &ClerkResult,
    delegate: &DelegateResult,
) -> String {
    format!(
        r#"You are the press officer. Draft a short public statement about the case material below.

Rules (non-negotiable):
1) Neutral, factual tone. No speculation, no names of uncharged individuals.
2) Never disclose investigative detail that could compromise the inquiry.
3) If the material below contains failure notices, issue a brief holding statement instead of reporting specifics.

{evidence}

Clerk summary:
{summary}

Delegate assessment:
{assessment}

Output:
- Return a single JSON object, nothing else.
- Fields: "text" (string, the full statement).
"#,
        evidence = input_block(input),
        summary = clerk.summary,
        assessment = delegate.overall_assessment,
    )
}

pub fn classification_prompt(text: &str, context: Option<&str>) -> String {
    let context = context.unwrap_or("none");
    format!(
        r#"You are a legal analyst. Classify potential criminal conduct described in the text below.

Rules (non-negotiable):
1) Tag only conduct actually described in the text. Do not speculate.
2) "confidence" is a number between 0 and 1.
3) "excerpts" must quote the text verbatim.
4) If nothing in the text suggests criminal conduct, return an empty "tags" array and explain why in "overall_assessment".

Context: {context}

Text:
{text}

Output:
- Return a single JSON object, nothing else.
- Fields: "tags" (array of objects with "kind", "rationale", "confidence", "parties" (array of strings), "excerpts" (array of strings)), "overall_assessment" (string).
"#
    )
}

pub fn audio_consolidation_prompt(segments_block: &str) -> String {
    format!(
        r#"You are the case clerk. Consolidate the transcript segments below into one coherent transcript.

Rules (non-negotiable):
1) Preserve every utterance; merge only ordering and speaker attribution.
2) Keep the source labels as speaker markers.
3) Do not paraphrase or invent dialogue.

Transcript segments:
{segments_block}

Output:
- Return a single JSON object, nothing else.
- Fields: "merged_transcript" (string), "summary" (string), "speakers" (array of strings).
"#
    )
}

pub fn financial_analysis_prompt(report_text: &str, context: Option<&str>) -> String {
    let context = context.unwrap_or("none");
    format!(
        r#"You are a financial analyst supporting an investigation. Analyze the financial report below.

Rules (non-negotiable):
1) Use only figures present in the report; never compute numbers that are not stated.
2) Mark an indicator as a concern only with a stated reason.
3) Red flags must each be supported by the report text.

Context: {context}

Report:
{report_text}

Output:
- Return a single JSON object, nothing else.
- Fields: "summary" (string), "indicators" (array of objects with "label", "value", "concern" (boolean)), "red_flags" (array of strings).
"#
    )
}
