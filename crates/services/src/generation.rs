use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use study_core::model::{FlashcardDraft, QuizSets, Subject, SubjectDifficulty};

use crate::error::GenerationError;

//
// ─── REQUEST ───────────────────────────────────────────────────────────────────
//

/// How much content to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationAmount {
    Few,
    #[default]
    Normal,
    ALot,
}

impl GenerationAmount {
    #[must_use]
    pub fn max_flashcards(self) -> u32 {
        match self {
            GenerationAmount::Few => 5,
            GenerationAmount::Normal => 10,
            GenerationAmount::ALot => 20,
        }
    }

    #[must_use]
    pub fn max_questions_per_type(self) -> u32 {
        match self {
            GenerationAmount::Few => 3,
            GenerationAmount::Normal => 5,
            GenerationAmount::ALot => 8,
        }
    }
}

/// Input for every generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub material: String,
    pub difficulty: SubjectDifficulty,
    pub amount: GenerationAmount,
    /// Topics to emphasise; empty for none.
    pub focus: String,
}

impl GenerationRequest {
    /// Request built from a subject's current material.
    #[must_use]
    pub fn for_subject(subject: &Subject, amount: GenerationAmount) -> Self {
        Self {
            material: subject.material.clone(),
            difficulty: subject.difficulty,
            amount,
            focus: String::new(),
        }
    }

    #[must_use]
    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = focus.into();
        self
    }

    /// # Errors
    ///
    /// Returns `GenerationError::MissingMaterial` if the material is blank.
    pub fn ensure_material(&self) -> Result<(), GenerationError> {
        if self.material.trim().is_empty() {
            return Err(GenerationError::MissingMaterial);
        }
        Ok(())
    }
}

//
// ─── GENERATOR SEAM ────────────────────────────────────────────────────────────
//

/// Produces study content from material. Implemented over HTTP in
/// production and by fakes in tests.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns `GenerationError` if the material is missing or generation fails.
    async fn generate_summary(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError>;

    /// # Errors
    ///
    /// Returns `GenerationError` if the material is missing or generation fails.
    async fn generate_flashcards(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<FlashcardDraft>, GenerationError>;

    /// # Errors
    ///
    /// Returns `GenerationError` if the material is missing or generation fails.
    async fn generate_quiz(
        &self,
        request: &GenerationRequest,
    ) -> Result<QuizSets, GenerationError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GeneratorConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("STUDY_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("STUDY_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("STUDY_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// `ContentGenerator` backed by an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct HttpContentGenerator {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl HttpContentGenerator {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GeneratorConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GeneratorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn complete(
        &self,
        task: &str,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        request.ensure_material()?;
        let config = self.config.as_ref().ok_or(GenerationError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: task.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: describe(request),
                },
            ],
            temperature: 0.2,
        };

        tracing::debug!(model = %config.model, task, "requesting generated content");
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "content generation failed");
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(content)
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate_summary(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        self.complete(SUMMARY_TASK, request).await
    }

    async fn generate_flashcards(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<FlashcardDraft>, GenerationError> {
        let content = self.complete(FLASHCARDS_TASK, request).await?;
        let parsed: FlashcardsPayload = parse_json(&content)?;
        let max = usize::try_from(request.amount.max_flashcards()).unwrap_or(usize::MAX);
        Ok(parsed.flashcards.into_iter().take(max).collect())
    }

    async fn generate_quiz(
        &self,
        request: &GenerationRequest,
    ) -> Result<QuizSets, GenerationError> {
        let content = self.complete(QUIZ_TASK, request).await?;
        let mut sets: QuizSets = parse_json(&content)?;
        let max = usize::try_from(request.amount.max_questions_per_type()).unwrap_or(usize::MAX);
        for questions in sets.values_mut() {
            questions.truncate(max);
        }
        Ok(sets)
    }
}

const SUMMARY_TASK: &str = "Summarize the study material in Markdown.";
const FLASHCARDS_TASK: &str = "Return JSON {\"flashcards\":[{\"term\":..,\"definition\":..}]} built from the study material.";
const QUIZ_TASK: &str = "Return JSON with keys MultipleChoice, TrueFalse, FillInTheBlank, each an array of {\"question\",\"options\",\"correct_answer\",\"explanation\"} built from the study material.";

fn describe(request: &GenerationRequest) -> String {
    let mut text = format!(
        "difficulty: {:?}\nmax_flashcards: {}\nmax_questions_per_type: {}\n",
        request.difficulty,
        request.amount.max_flashcards(),
        request.amount.max_questions_per_type(),
    );
    if !request.focus.trim().is_empty() {
        text.push_str(&format!("focus: {}\n", request.focus.trim()));
    }
    text.push_str("material:\n");
    text.push_str(&request.material);
    text
}

/// Parse a JSON reply, tolerating a surrounding Markdown code fence.
fn parse_json<T: DeserializeOwned>(content: &str) -> Result<T, GenerationError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(|e| GenerationError::Malformed(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct FlashcardsPayload {
    flashcards: Vec<FlashcardDraft>,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::QuizType;

    fn request(material: &str) -> GenerationRequest {
        GenerationRequest {
            material: material.into(),
            difficulty: SubjectDifficulty::Medium,
            amount: GenerationAmount::Few,
            focus: String::new(),
        }
    }

    #[test]
    fn amounts_map_to_limits() {
        assert_eq!(GenerationAmount::Few.max_flashcards(), 5);
        assert_eq!(GenerationAmount::Normal.max_questions_per_type(), 5);
        assert_eq!(GenerationAmount::ALot.max_flashcards(), 20);
        assert_eq!(GenerationAmount::ALot.max_questions_per_type(), 8);
    }

    #[tokio::test]
    async fn blank_material_is_rejected_before_any_request() {
        let generator = HttpContentGenerator::new(None);
        let err = generator.generate_summary(&request("   ")).await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingMaterial));
    }

    #[tokio::test]
    async fn unconfigured_generator_is_disabled() {
        let generator = HttpContentGenerator::new(None);
        assert!(!generator.enabled());
        let err = generator
            .generate_flashcards(&request("Photosynthesis converts light."))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Disabled));
    }

    #[test]
    fn parses_fenced_flashcards() {
        let reply = "```json\n{\"flashcards\":[{\"term\":\"ATP\",\"definition\":\"energy\"}]}\n```";
        let parsed: FlashcardsPayload = parse_json(reply).unwrap();
        assert_eq!(parsed.flashcards, vec![FlashcardDraft::new("ATP", "energy")]);
    }

    #[test]
    fn parses_quiz_sets_by_type() {
        let reply = r#"{"TrueFalse":[{"question":"Sky is blue","options":["True","False"],"correct_answer":["True"],"explanation":""}]}"#;
        let sets: QuizSets = parse_json(reply).unwrap();
        assert_eq!(sets[&QuizType::TrueFalse].len(), 1);
    }

    #[test]
    fn malformed_reply_is_reported() {
        let err = parse_json::<FlashcardsPayload>("not json").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn request_description_includes_focus() {
        let text = describe(&request("Cells").with_focus(" mitochondria "));
        assert!(text.contains("focus: mitochondria"));
        assert!(text.ends_with("material:\nCells"));
    }
}
