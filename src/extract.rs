use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::AppError;

/// Structured record proposed by the extractor. Nothing is persisted until
/// the caller decides to materialize it into an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCandidate {
    pub company_name: String,
    pub position_title: String,
    pub job_url: String,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub clean_text_content: Option<String>,
    pub ai_advice: Option<String>,
    pub application_deadline: Option<NaiveDateTime>,
}

#[async_trait]
pub trait JobExtractor: Send + Sync {
    async fn extract(&self, clean_text: &str, source_url: &str)
        -> Result<JobCandidate, AppError>;
}

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const EXTRACTION_INSTRUCTION: &str = "\
You are extracting structured data from the text of a job posting. Respond \
with a single JSON object and nothing else, using exactly these keys: \
company_name, position_title, location, salary, description, requirements, \
application_deadline, advice. company_name and position_title must quote the \
posting. Use null for anything the posting does not state; never invent a \
value. application_deadline must be an ISO date (YYYY-MM-DD) when the posting \
names one, otherwise null. advice is two or three sentences on how to \
approach this application.";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// What the model is asked to emit. Required-field checks happen afterwards
/// in [`parse_candidate`], so a partial object deserializes fine here.
#[derive(Debug, Deserialize)]
struct RawCandidate {
    company_name: Option<String>,
    position_title: Option<String>,
    location: Option<String>,
    salary: Option<String>,
    description: Option<String>,
    requirements: Option<String>,
    application_deadline: Option<String>,
    advice: Option<String>,
}

pub struct OpenAiExtractor {
    api_key: String,
    model: String,
    client: Client,
}

impl OpenAiExtractor {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.extract_timeout_secs))
            .build()?;
        Ok(Self {
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            client,
        })
    }
}

#[async_trait]
impl JobExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        clean_text: &str,
        source_url: &str,
    ) -> Result<JobCandidate, AppError> {
        let trimmed = clean_text.trim();
        if trimmed.is_empty() {
            return Err(AppError::ExtractionInvalid(
                "page contained no readable text".to_string(),
            ));
        }

        let prompt = format!("{EXTRACTION_INSTRUCTION}\n\nPosting text:\n{trimmed}");
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| AppError::ExtractionUnavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExtractionUnavailable(format!(
                "request failed with status {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| AppError::ExtractionUnavailable(err.to_string()))?;
        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| AppError::ExtractionUnavailable("empty completion".to_string()))?;

        parse_candidate(content, source_url, trimmed)
    }
}

/// Validates and repairs the model output. Missing optional fields are kept
/// absent; missing required fields fail rather than being substituted.
pub fn parse_candidate(
    raw: &str,
    source_url: &str,
    clean_text: &str,
) -> Result<JobCandidate, AppError> {
    let payload = strip_code_fence(raw);
    let parsed: RawCandidate = serde_json::from_str(payload).map_err(|err| {
        AppError::ExtractionInvalid(format!("malformed extraction response: {err}"))
    })?;

    let company_name = non_empty(parsed.company_name)
        .ok_or_else(|| AppError::ExtractionInvalid("missing company name".to_string()))?;
    let position_title = non_empty(parsed.position_title)
        .ok_or_else(|| AppError::ExtractionInvalid("missing position title".to_string()))?;

    Ok(JobCandidate {
        company_name,
        position_title,
        job_url: source_url.to_string(),
        location: non_empty(parsed.location),
        salary: non_empty(parsed.salary),
        description: non_empty(parsed.description),
        requirements: non_empty(parsed.requirements),
        clean_text_content: Some(clean_text.to_string()),
        ai_advice: non_empty(parsed.advice),
        application_deadline: parsed
            .application_deadline
            .as_deref()
            .and_then(parse_deadline_date),
    })
}

/// Models occasionally wrap the payload in a markdown fence despite the
/// instruction. Tolerated rather than failed.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| !v.eq_ignore_ascii_case("null") && !v.eq_ignore_ascii_case("unknown"))
}

/// Normalizes a deadline-like string to an end-of-day timestamp. Anything
/// that does not match a known format is dropped, never guessed.
pub fn parse_deadline_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime);
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(23, 59, 59);
        }
    }
    None
}
