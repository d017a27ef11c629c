//! AI copy generation for poster and flyer text.
//!
//! DESIGN
//! ======
//! Builds a single prompt from the request, asks the LLM once, and splits the
//! reply on `N.` markers into at most three options. No tools, no history.

#[cfg(test)]
#[path = "content_test.rs"]
mod content_test;

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ErrorCode;
use crate::llm::types::{LlmError, Message};
use crate::state::AppState;

/// Number of options the prompt asks for and the parser keeps.
pub const MAX_OPTIONS: usize = 3;

pub const DEFAULT_TONE: &str = "Professional";

const SYSTEM_PROMPT: &str = "You write short marketing copy for posters and flyers.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Headline,
    Tagline,
    Description,
    Cta,
    Social,
}

impl ContentType {
    pub const ALL: [Self; 5] = [Self::Headline, Self::Tagline, Self::Description, Self::Cta, Self::Social];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Headline => "Headline",
            Self::Tagline => "Tagline",
            Self::Description => "Description",
            Self::Cta => "Call to Action",
            Self::Social => "Social Media",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Headline => "Catchy headlines for your design",
            Self::Tagline => "Short memorable phrases",
            Self::Description => "Detailed product or service descriptions",
            Self::Cta => "Compelling action phrases",
            Self::Social => "Social media captions and posts",
        }
    }
}

/// Body of `POST /api/ai/generate`. Only `businessType` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentRequest {
    pub business_type: String,
    pub industry: String,
    pub content_type: ContentType,
    pub tone: Option<String>,
    /// Free-form extra requirements.
    pub extra: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub options: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("business type required")]
    MissingBusinessType,
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl ErrorCode for ContentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingBusinessType => "E_MISSING_BUSINESS_TYPE",
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::Llm(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            _ => false,
        }
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Ask the configured LLM for copy options.
///
/// # Errors
///
/// Returns [`ContentError::MissingBusinessType`] for a blank business type,
/// [`ContentError::LlmNotConfigured`] when no client is installed, and
/// [`ContentError::Llm`] when the provider call fails.
pub async fn generate(state: &AppState, request: &ContentRequest) -> Result<GeneratedContent, ContentError> {
    if request.business_type.trim().is_empty() {
        return Err(ContentError::MissingBusinessType);
    }
    let Some(llm) = state.llm.as_ref() else {
        return Err(ContentError::LlmNotConfigured);
    };

    let prompt = build_prompt(request);
    let response = llm
        .chat(state.ai_max_tokens, SYSTEM_PROMPT, &[Message::user(prompt)])
        .await?;
    let options = parse_options(&response.text);
    info!(
        content_type = request.content_type.name(),
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        options = options.len(),
        "content generated"
    );
    Ok(GeneratedContent { options })
}

#[must_use]
pub fn build_prompt(request: &ContentRequest) -> String {
    let kind = request.content_type;
    let mut prompt = format!(
        "Generate {MAX_OPTIONS} {} options for a {} business",
        kind.name().to_lowercase(),
        request.business_type.trim()
    );
    let industry = request.industry.trim();
    if !industry.is_empty() {
        let _ = write!(prompt, " in the {industry} industry");
    }
    prompt.push_str(".\n\n");

    let tone = request
        .tone
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TONE);
    let _ = writeln!(prompt, "Tone: {tone}");
    let _ = writeln!(prompt, "Content Type: {}", kind.description());
    if let Some(extra) = request.extra.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        let _ = writeln!(prompt, "Additional requirements: {extra}");
    }
    prompt.push_str(
        "\nMake them compelling, concise, and suitable for poster/flyer design. \
         Return only the text options, numbered 1-3.",
    );
    prompt
}

/// Split model output on `N.` markers into trimmed, non-empty options.
#[must_use]
pub fn parse_options(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if bytes.get(i) == Some(&b'.') {
            parts.push(&text[start..run_start]);
            i += 1;
            start = i;
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .take(MAX_OPTIONS)
        .map(str::to_owned)
        .collect()
}
