//! LLM generation client
//!
//! Thin chat-completions client for the remediation step. Includes
//! automatic retry with exponential backoff for rate limits.

use serde::{Deserialize, Serialize};

use crate::config::Config;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_SECS: u64 = 2;
const BACKOFF_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, Copy)]
pub enum Model {
    /// Full analysis of failure logs against project context.
    Analysis,
}

impl Model {
    pub fn id(&self) -> &'static str {
        match self {
            Model::Analysis => "gpt-4o",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Model::Analysis => "GPT-4o",
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            Model::Analysis => 8192,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

/// Get the configured API key, if any.
fn api_key() -> Option<String> {
    Config::load().get_api_key()
}

/// Check if generation is available (API key is set).
pub fn is_available() -> bool {
    api_key().is_some()
}

/// Call the chat completions API with system and user prompts.
///
/// `model_override` substitutes the model id when set (from config or the
/// CLI); otherwise the typed model's id is used. Temperature is pinned low
/// so the output format contract is followed as written.
pub async fn call_llm(
    system: &str,
    user: &str,
    model: Model,
    model_override: Option<&str>,
) -> anyhow::Result<String> {
    let api_key = api_key().ok_or_else(|| {
        anyhow::anyhow!("No API key configured. Set OPENAI_API_KEY to enable remediation.")
    })?;

    let client = reqwest::Client::new();

    let request = ChatRequest {
        model: model_override.unwrap_or(model.id()).to_string(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: system.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: user.to_string(),
            },
        ],
        max_tokens: model.max_tokens(),
        temperature: 0.0,
        stream: false,
    };

    let mut retry_count = 0;

    loop {
        let response = client
            .post(OPENAI_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let parsed: ChatResponse = serde_json::from_str(&text)
                .map_err(|e| anyhow::anyhow!("Failed to parse API response: {}\n{}", e, text))?;

            return Ok(parsed
                .choices
                .first()
                .map(|c| c.message.content.clone())
                .unwrap_or_default());
        }

        if status.as_u16() == 429 && retry_count < MAX_RETRIES {
            retry_count += 1;
            let backoff = INITIAL_BACKOFF_SECS * BACKOFF_MULTIPLIER.pow(retry_count - 1);
            eprintln!(
                "  Rate limited. Retrying in {}s (attempt {}/{})",
                backoff, retry_count, MAX_RETRIES
            );
            tokio::time::sleep(tokio::time::Duration::from_secs(backoff)).await;
            continue;
        }

        let error_msg = match status.as_u16() {
            401 => "Invalid API key. Check OPENAI_API_KEY.".to_string(),
            429 => format!(
                "Rate limited after {} retries. Try again in a few minutes.",
                retry_count
            ),
            500..=599 => format!(
                "API server error ({}). The service may be temporarily unavailable.",
                status
            ),
            _ => format!("API error {}: {}", status, crate::util::truncate(&text, 200)),
        };
        return Err(anyhow::anyhow!("{}", error_msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids() {
        assert_eq!(Model::Analysis.id(), "gpt-4o");
        assert_eq!(Model::Analysis.name(), "GPT-4o");
        assert!(Model::Analysis.max_tokens() > 0);
    }
}
