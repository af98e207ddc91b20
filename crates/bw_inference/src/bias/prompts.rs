//! Prompt text sent to the language model.
//!
//! The wording is part of the contract with the model: changing it changes
//! scores. Bump `PROMPT_VERSION` with any edit so cached results from the old
//! wording stop being served.

use bw_core::{CompletionRequest, SourceReputation};
use crate::util::truncate_to_char_boundary;

pub const PROMPT_VERSION: &str = "v1";

const MAX_CONTENT_BYTES: usize = 6000;

pub const RUBRIC: &str = "Score political bias on a 0-100 scale:
- 0-20: Highly Liberal
- 21-40: Liberal
- 41-60: Neutral/Centrist
- 61-80: Conservative
- 81-100: Highly Conservative";

const ANALYSIS_DIMENSIONS: &str = "Ground your reasoning in:
1. Source context: the outlet's known editorial stance
2. Language choice: loaded, emotional or partisan wording
3. Framing: how the issue and the people involved are presented
4. Source selection: whose voices are quoted and whose are missing
5. Fact selection: which facts are emphasized or omitted
6. Implicit assumptions: what the article takes for granted";

const NO_DEFAULT_NEUTRAL: &str = "Do not default to Neutral/Centrist. Most news coverage carries some lean; \
score 41-60 only when the coverage is genuinely balanced.";

const REPLY_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"biasScore": <0-100>, "biasLabel": "<band label>", "confidence": <0.0-1.0>, "reasoning": "<2-4 sentences>", "indicators": ["<short tag>", ...], "sourceReliability": "<High|Medium|Low|Mixed>"}"#;

const REPUTATION_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"biasScore": <0-100>, "biasLabel": "<band label>", "confidence": <0.0-1.0>, "reasoning": "<2-4 sentences>", "indicators": ["<short tag>", ...], "reliability": "<High|Medium|Low|Mixed>"}"#;

fn analyst_system() -> String {
    format!(
        "You are a media bias analyst. You assess political lean carefully and explain your evidence.\n\n{}\n\n{}",
        RUBRIC, NO_DEFAULT_NEUTRAL
    )
}

/// Tier one: score the article directly.
pub fn direct_request(title: &str, source: &str, content: &str) -> CompletionRequest {
    let user = format!(
        "Analyze the political bias of this article.\n\n\
         Source: {}\nTitle: {}\n\nContent:\n{}\n\n{}\n\n{}",
        source,
        title,
        truncate_to_char_boundary(content, MAX_CONTENT_BYTES),
        ANALYSIS_DIMENSIONS,
        REPLY_FORMAT
    );
    CompletionRequest::new(analyst_system(), user)
        .max_tokens(800)
        .temperature(0.3)
}

/// Tier two, first call: the outlet as a whole, independent of any article.
pub fn reputation_request(source: &str) -> CompletionRequest {
    let user = format!(
        "Assess the overall political bias of the news source \"{}\".\n\n\
         Base the assessment on its editorial history, ownership, and record of \
         factual reliability, not on any single story.\n\n{}",
        source, REPUTATION_FORMAT
    );
    CompletionRequest::new(analyst_system(), user)
        .max_tokens(600)
        .temperature(0.2)
}

/// Tier two, second call: does this article follow the outlet's pattern?
pub fn content_against_source_request(
    reputation: &SourceReputation,
    title: &str,
    content: &str,
) -> CompletionRequest {
    let user = format!(
        "The source \"{}\" has an established bias score of {:.0} ({}).\n\
         Source profile: {}\n\n\
         Decide whether this specific article aligns with or deviates from that \
         pattern, and give a final score for the article itself.\n\n\
         Title: {}\n\nContent:\n{}\n\n{}\n\n{}",
        reputation.source,
        reputation.bias_score,
        reputation.bias_label,
        reputation.reasoning,
        title,
        truncate_to_char_boundary(content, MAX_CONTENT_BYTES),
        ANALYSIS_DIMENSIONS,
        REPLY_FORMAT
    );
    CompletionRequest::new(analyst_system(), user)
        .max_tokens(600)
        .temperature(0.3)
}
