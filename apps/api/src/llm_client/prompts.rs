// Shared prompt fragments.
// Each artifact defines its own template in generation/prompts.rs; the pieces
// that frame the two inputs are common to both and live here.

/// Describes the two inputs the model is about to receive. `resume_label`
/// names the first one, since the artifacts word it differently.
pub fn inputs_preamble(resume_label: &str) -> String {
    format!("I will give you:\n1) {resume_label}\n2) A specific job description")
}

/// Trailing section carrying the raw inputs.
/// Replace `{resume}` and `{job_description}` before sending.
pub const INPUTS_SECTION: &str = "\
Candidate resume:
{resume}

Job description:
{job_description}";

/// Fills `INPUTS_SECTION` with the two inputs.
///
/// Placeholders are substituted in one pass so text inside the résumé that
/// happens to look like a placeholder is left alone.
pub fn render_inputs(resume: &str, job_description: &str) -> String {
    let (head, rest) = INPUTS_SECTION
        .split_once("{resume}")
        .unwrap_or((INPUTS_SECTION, ""));
    let (middle, tail) = rest.split_once("{job_description}").unwrap_or((rest, ""));
    format!("{head}{resume}{middle}{job_description}{tail}")
}
