//! Client for the generative-language service that explains verses.
//!
//! Every request carries the same safety preamble as a system instruction,
//! user questions are trimmed, capped and screened before anything goes on the
//! wire, and every answer ends with the fixed disclaimer.

use crate::api::models::{Surah, Verse};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const MAX_QUESTION_CHARS: usize = 1000;

const BLOCKED_PATTERNS: &[&str] = &["hack", "exploit", "bypass"];

pub const DISCLAIMER: &str = "\n\n⚠️ **Important:** This text was generated by AI and is only a study aid. Consult trusted tafsir sources for accurate and complete information.";

const SAFETY_PREAMBLE: &str = "You are an assistant that gives helpful explanations of Quran verses.

RULES:
1. Base every explanation only on the supplied translation and trusted tafsir sources.
2. Never add your own interpretation or speculation.
3. Do not give wrong information; say \"I don't know\" when you don't.
4. Use the supplied translation when explaining a verse.
5. Keep explanations short, clear and to the point.
6. Do not issue religious rulings; only explain.
7. Where schools of thought or scholars disagree, state the views neutrally.
8. Always include the warning \"This is an AI explanation, consult trusted tafsir sources\".

Answer in the language of the supplied translation.";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExplainError {
    #[error("API credential not found. Enter your Gemini API key in the AI panel.")]
    MissingCredential,

    #[error("This question cannot be processed for safety reasons.")]
    UnsafeQuestion,

    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Could not get an explanation: {0}")]
    Failed(String),
}

/// Result of validating a credential against the service.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCheck {
    pub valid: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

impl GenerateRequest {
    fn user_text(text: String) -> Content {
        Content {
            role: Some("user"),
            parts: vec![Part { text }],
        }
    }

    fn guarded(prompt: String) -> Self {
        Self {
            contents: vec![Self::user_text(prompt)],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: SAFETY_PREAMBLE.to_string(),
                }],
            }),
            generation_config: Some(GenerationConfig::default()),
        }
    }

    fn key_check() -> Self {
        Self {
            contents: vec![Self::user_text("Test".to_string())],
            system_instruction: None,
            generation_config: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
}

fn extract_text(body: &str) -> Result<String, ExplainError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ExplainError::Failed(format!("invalid API response ({e})")))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ExplainError::Failed("invalid API response".to_string()));
    }
    Ok(text)
}

/// Trims, caps and screens a user question.
pub fn sanitize_question(question: &str) -> Result<String, ExplainError> {
    let trimmed = question.trim();
    let mut sanitized: String = trimmed.chars().take(MAX_QUESTION_CHARS).collect();
    if trimmed.chars().count() > MAX_QUESTION_CHARS {
        sanitized.push_str("...");
    }

    let lowered = sanitized.to_lowercase();
    if BLOCKED_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return Err(ExplainError::UnsafeQuestion);
    }
    Ok(sanitized)
}

fn verse_prompt(verse: &Verse, question: Option<&str>) -> String {
    let translation = if verse.translation.is_empty() {
        &verse.text
    } else {
        &verse.translation
    };
    let mut prompt = String::from("Explain the following verse of the Quran:\n\n");
    prompt.push_str(&format!("Arabic: {}\n", verse.text));
    prompt.push_str(&format!("Translation: {translation}\n"));
    prompt.push_str(&format!("Surah: {}\n", verse.surah.localized_name));
    prompt.push_str(&format!("Verse: {}\n\n", verse.reference.ayah));
    if let Some(question) = question {
        prompt.push_str(&format!("Question: {question}\n\n"));
    }
    prompt
}

fn free_question_prompt(question: &str) -> String {
    format!(
        "A question about the Quran: {question}\n\nAnswer only from Quran verses and trusted tafsir sources."
    )
}

fn surah_prompt(surah: &Surah) -> String {
    let verses: Vec<String> = surah
        .verses
        .iter()
        .map(|v| {
            let body = if v.translation.is_empty() {
                &v.text
            } else {
                &v.translation
            };
            format!("Verse {}: {}", v.reference.ayah, body)
        })
        .collect();
    format!(
        "{} (surah {})\n\nVerse count: {}\n\nVerses:\n{}\n\nExplain this surah as a whole and name its main themes.",
        surah.info.localized_name,
        surah.info.number,
        surah.info.verse_count.unwrap_or(surah.verses.len() as u16),
        verses.join("\n\n")
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationClient {
    api_key: Option<String>,
    endpoint: String,
    model: String,
}

impl ExplanationClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: GEMINI_MODEL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key).filter(|k| !k.trim().is_empty());
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }

    fn credential(&self) -> Result<&str, ExplainError> {
        self.api_key.as_deref().ok_or(ExplainError::MissingCredential)
    }

    pub async fn explain_verse(
        &self,
        verse: &Verse,
        question: Option<&str>,
    ) -> Result<String, ExplainError> {
        let question = match question.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => Some(sanitize_question(q)?),
            None => None,
        };
        let answer = self
            .generate(verse_prompt(verse, question.as_deref()))
            .await?;
        Ok(answer + DISCLAIMER)
    }

    pub async fn ask(&self, question: &str, context: Option<&Verse>) -> Result<String, ExplainError> {
        let question = sanitize_question(question)?;
        if question.is_empty() {
            return Err(ExplainError::EmptyQuestion);
        }
        let prompt = match context {
            Some(verse) => verse_prompt(verse, Some(&question)),
            None => free_question_prompt(&question),
        };
        let answer = self.generate(prompt).await?;
        Ok(answer + DISCLAIMER)
    }

    pub async fn explain_surah(&self, surah: &Surah) -> Result<String, ExplainError> {
        let answer = self.generate(surah_prompt(surah)).await?;
        Ok(answer + DISCLAIMER)
    }

    async fn generate(&self, prompt: String) -> Result<String, ExplainError> {
        let key = self.credential()?;
        let body = GenerateRequest::guarded(prompt);

        let response = HTTP_CLIENT
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("explanation request failed: {e}");
                ExplainError::Failed(e.to_string())
            })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ExplainError::Failed(e.to_string()))?;

        if !status.is_success() {
            let message =
                error_message(&text).unwrap_or_else(|| format!("API error: {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), "explanation rejected: {message}");
            return Err(ExplainError::Failed(message));
        }
        extract_text(&text)
    }

    /// Validates `api_key`, or the configured key when `None`.
    pub async fn check_key(&self, api_key: Option<&str>) -> KeyCheck {
        let Some(key) = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .or(self.api_key.as_deref())
        else {
            return KeyCheck {
                valid: false,
                message: "No API key entered.".to_string(),
            };
        };

        let response = HTTP_CLIENT
            .post(self.url())
            .header("x-goog-api-key", key)
            .json(&GenerateRequest::key_check())
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => KeyCheck {
                valid: true,
                message: "API key is valid.".to_string(),
            },
            Ok(response) => {
                let body = response.text().await.unwrap_or_default();
                KeyCheck {
                    valid: false,
                    message: error_message(&body).unwrap_or_else(|| "API key is invalid.".to_string()),
                }
            }
            Err(e) => {
                tracing::warn!("key check failed: {e}");
                KeyCheck {
                    valid: false,
                    message: "An error occurred while checking the API key.".to_string(),
                }
            }
        }
    }
}
