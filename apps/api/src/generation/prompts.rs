// Prompt constants for the two generation gateways.
// Reuses the input framing from llm_client::prompts.

use crate::llm_client::prompts::{inputs_preamble, render_inputs};
use crate::models::ArtifactKind;

/// System prompt for the résumé rewrite.
pub const RESUME_SYSTEM: &str = "You are a helpful assistant that writes high-quality, \
    job-tailored resumes for software and tech roles.";

/// Task section for the résumé rewrite.
pub const RESUME_TASK: &str = "\
Your task:
- Rewrite and improve the resume content so it is tailored specifically to the job description given.
- Focus on clear bullet points with strong action verbs and measurable impact.
- Include relevant keywords from the job description where it makes sense.
- Keep it concise and professional.
- Return the result as plain text with sections like \"Summary\", \"Experience\", \"Skills\".";

/// System prompt for the cover letter.
pub const COVER_LETTER_SYSTEM: &str =
    "You write concise, effective cover letters tailored to specific roles.";

/// Task section for the cover letter.
pub const COVER_LETTER_TASK: &str = "\
Your task:
- Write a tailored cover letter for this job.
- Use a professional, confident tone.
- Make it 3-5 short paragraphs.
- Reference 2-3 concrete experiences or skills from the resume.
- Avoid generic buzzwords and keep it specific to the job.

Return only the final cover letter text, no explanations.";

/// A ready-to-send system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: &'static str,
    pub user: String,
}

/// Builds the fixed instructional prompt for `kind` from the two inputs.
pub fn format_prompt(kind: ArtifactKind, resume: &str, job_description: &str) -> PromptPair {
    let (system, persona, resume_label, task) = match kind {
        ArtifactKind::Resume => (
            RESUME_SYSTEM,
            "You are an expert technical recruiter and resume writer.",
            "A candidate's current resume",
            RESUME_TASK,
        ),
        ArtifactKind::Cover => (
            COVER_LETTER_SYSTEM,
            "You are an expert career coach and cover letter writer.",
            "A candidate's resume",
            COVER_LETTER_TASK,
        ),
    };

    let user = format!(
        "{persona}\n\n{}\n\n{task}\n\n{}\n",
        inputs_preamble(resume_label),
        render_inputs(resume, job_description)
    );

    PromptPair { system, user }
}
