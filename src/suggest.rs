//! Next-word suggestions from a chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::SuggestError;
use crate::words::WordList;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful follow-up word generator which provides the next most relevant words.";

#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Candidate next words for a non-blank context.
    async fn suggest(&self, context: &str) -> Result<WordList, SuggestError>;
}

/// Default list for a blank context without touching the service, otherwise
/// ask the service and give up after `timeout`.
pub async fn fetch_words(
    service: &dyn SuggestionService,
    context: &str,
    timeout: Duration,
) -> Result<WordList, SuggestError> {
    if context.trim().is_empty() {
        return Ok(WordList::defaults());
    }
    tokio::time::timeout(timeout, service.suggest(context))
        .await
        .map_err(|_| SuggestError::Timeout(timeout))?
}

pub fn build_prompt(template: &str, context: &str) -> String {
    format!(
        "{}\n<Context Starts>\n{}\n<Context Ends>\n",
        template.trim_end(),
        context.trim()
    )
}

/// Read the `options` list out of the model's JSON reply.
pub fn parse_options(content: &str) -> Result<WordList, SuggestError> {
    let value: Value = serde_json::from_str(content).map_err(SuggestError::InvalidJson)?;
    let options = value
        .get("options")
        .and_then(Value::as_array)
        .ok_or(SuggestError::MissingOptions)?;

    let words = options
        .iter()
        .map(|v| v.as_str().ok_or(SuggestError::MissingOptions))
        .collect::<Result<Vec<_>, _>>()?;

    WordList::new(words).map_err(|_| SuggestError::EmptyOptions)
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    response_format: ResponseFormat,
}

impl<'a> ChatCompletionRequest<'a> {
    /// System instruction plus the user prompt, asking for a JSON object.
    fn new(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Content of the first choice.
    fn into_content(self) -> Result<String, SuggestError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(SuggestError::MissingContent)
    }
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client (Groq by default).
#[derive(Clone)]
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    prompt_template: String,
}

impl ChatCompletionsClient {
    pub fn new(
        config: &LlmConfig,
        api_key: String,
        prompt_template: String,
    ) -> Result<Self, SuggestError> {
        if api_key.is_empty() {
            return Err(SuggestError::Disabled("no API key configured".into()));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt_template,
        })
    }
}

#[async_trait]
impl SuggestionService for ChatCompletionsClient {
    async fn suggest(&self, context: &str) -> Result<WordList, SuggestError> {
        let prompt = build_prompt(&self.prompt_template, context);
        let request = ChatCompletionRequest::new(&self.model, &prompt);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SuggestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        let content = body.into_content()?;

        let words = parse_options(&content)?;
        debug!(model = %self.model, words = ?words.as_slice(), "received suggestions");
        Ok(words)
    }
}

/// Stand-in when no API key is configured. Every request fails, so the word
/// list stays as it is.
pub struct DisabledSuggester {
    reason: String,
}

impl DisabledSuggester {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SuggestionService for DisabledSuggester {
    async fn suggest(&self, _context: &str) -> Result<WordList, SuggestError> {
        Err(SuggestError::Disabled(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::words::DEFAULT_WORDS;

    struct Counting {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl Counting {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl SuggestionService for Counting {
        async fn suggest(&self, _context: &str) -> Result<WordList, SuggestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(WordList::new(["water", "food", "help"]).unwrap())
        }
    }

    #[test]
    fn parses_options_object() {
        let words = parse_options(r#"{"options": ["water", " food ", ""]}"#).unwrap();
        assert_eq!(words.as_slice(), ["water", "food"]);
    }

    #[test]
    fn rejects_malformed_replies() {
        assert!(matches!(parse_options("water, food"), Err(SuggestError::InvalidJson(_))));
        assert!(matches!(
            parse_options(r#"{"words": ["water"]}"#),
            Err(SuggestError::MissingOptions)
        ));
        assert!(matches!(
            parse_options(r#"{"options": "water"}"#),
            Err(SuggestError::MissingOptions)
        ));
        assert!(matches!(
            parse_options(r#"{"options": ["water", 3]}"#),
            Err(SuggestError::MissingOptions)
        ));
        assert!(matches!(
            parse_options(r#"{"options": []}"#),
            Err(SuggestError::EmptyOptions)
        ));
    }

    #[test]
    fn prompt_delimits_context() {
        let prompt = build_prompt("Suggest words.\n", " I Need");
        assert_eq!(
            prompt,
            "Suggest words.\n<Context Starts>\nI Need\n<Context Ends>\n"
        );
    }

    #[test]
    fn request_asks_for_json_object() {
        let prompt = build_prompt("Suggest words.", " I Need");
        let request = ChatCompletionRequest::new("llama3-8b-8192", &prompt);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "llama3-8b-8192");
        assert_eq!(body["stream"], false);
        assert_eq!(body["response_format"], serde_json::json!({"type": "json_object"}));

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], SYSTEM_PROMPT);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(
            messages[1]["content"],
            "Suggest words.\n<Context Starts>\nI Need\n<Context Ends>\n"
        );
    }

    #[test]
    fn response_content_comes_from_first_choice() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [
                {"message": {"role": "assistant", "content": "{\"options\": [\"water\"]}"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]}"#,
        )
        .unwrap();
        let content = body.into_content().unwrap();
        assert_eq!(parse_options(&content).unwrap().as_slice(), ["water"]);
    }

    #[test]
    fn response_without_content_is_rejected() {
        let bodies = [
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
            r#"{"choices": [{"message": {"role": "assistant"}}]}"#,
            r#"{"choices": []}"#,
            r#"{}"#,
        ];
        for raw in bodies {
            let body: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
            assert!(
                matches!(body.into_content(), Err(SuggestError::MissingContent)),
                "{raw}"
            );
        }
    }

    #[tokio::test]
    async fn blank_context_uses_defaults_without_calling_service() {
        let service = Counting::new(Duration::ZERO);
        for context in ["", "   "] {
            let words = fetch_words(&service, context, Duration::from_secs(1))
                .await
                .unwrap();
            assert_eq!(words.len(), DEFAULT_WORDS.len());
        }
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn context_calls_service() {
        let service = Counting::new(Duration::ZERO);
        let words = fetch_words(&service, " I", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(words.as_slice(), ["water", "food", "help"]);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_service_times_out() {
        let service = Counting::new(Duration::from_secs(30));
        let result = fetch_words(&service, " I", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(SuggestError::Timeout(_))));
    }

    #[tokio::test]
    async fn disabled_service_fails() {
        let service = DisabledSuggester::new("no key");
        let result = fetch_words(&service, " I", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(SuggestError::Disabled(_))));
    }

    #[test]
    fn client_requires_api_key() {
        let result = ChatCompletionsClient::new(&LlmConfig::default(), String::new(), String::new());
        assert!(matches!(result, Err(SuggestError::Disabled(_))));
    }
}
