//! OpenAiStrategist - Chat-completions backend for agent players
//!
//! Talks to any OpenAI-compatible endpoint. The model is asked to reason in
//! prose, finish with its move, and hand back its rewritten notes inside a
//! `<memory>` block.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use orchestrator::{Strategist, StrategistError, StrategistReply, StrategistRequest};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::StrategistConfig;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const MEMORY_OPEN: &str = "<memory>";
const MEMORY_CLOSE: &str = "</memory>";

const SYSTEM_PROMPT: &str = "\
You are a chess player in the middle of a game. Each turn you receive your \
private notes from earlier turns, the position and the list of legal moves.

Think about the position in a few sentences, then state your move in \
Standard Algebraic Notation on its own line as `Move: <san>`. The move must \
be one of the legal moves you were given.

After the move, rewrite your notes for your next turn inside \
<memory></memory> tags. Keep the headings Phase Assessment, Opponent Model, \
Plan and Critical Moments. Your opponent never sees these notes.";

/// Strategist backed by a chat-completions API
#[derive(Clone)]
pub struct OpenAiStrategist {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
    temperature: Option<f32>,
}

impl OpenAiStrategist {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: None,
        }
    }

    /// Build from configuration, reading the API key from the environment
    pub fn from_config(config: &StrategistConfig) -> Result<Self, StrategistError> {
        let var = config
            .api_key_env
            .clone()
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
        let api_key = env::var(&var).map_err(|_| StrategistError::MissingApiKey { var })?;

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut strategist = Self::new(api_key, model)
            .with_timeout(config.timeout_secs)?
            .with_temperature(config.temperature);
        if let Some(base_url) = &config.base_url {
            strategist = strategist.with_base_url(base_url);
        }
        Ok(strategist)
    }

    /// Point at another OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whole-request timeout, enforced by the HTTP client
    pub fn with_timeout(mut self, secs: u64) -> Result<Self, StrategistError> {
        self.client = Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()
            .map_err(|e| StrategistError::Internal(format!("failed to build HTTP client: {e}")))?;
        self.timeout_secs = secs;
        Ok(self)
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String, StrategistError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                self.map_transport_error(err)
            } else {
                StrategistError::MalformedResponse(err.to_string())
            }
        })?;

        extract_text_response(parsed)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> StrategistError {
        if err.is_timeout() {
            StrategistError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            StrategistError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl std::fmt::Debug for OpenAiStrategist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiStrategist")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Strategist for OpenAiStrategist {
    fn identifier(&self) -> String {
        self.model.clone()
    }

    async fn generate(&self, request: &StrategistRequest) -> Result<StrategistReply, StrategistError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", build_user_prompt(request)),
            ],
            temperature: self.temperature,
        };

        debug!(
            game_id = %request.game_id,
            side = %request.side,
            model = %self.model,
            "Sending chat completion request"
        );
        let content = self.send_request(&body).await?;

        let reply = parse_reply(&content);
        if reply.memory.is_none() {
            warn!(
                game_id = %request.game_id,
                side = %request.side,
                "Reply had no memory block, keeping previous notes"
            );
        }
        Ok(reply)
    }
}

/// Prompt describing the position for one turn
pub fn build_user_prompt(request: &StrategistRequest) -> String {
    let transcript = if request.transcript.is_empty() {
        "(no moves yet)".to_string()
    } else {
        request.transcript.join(" ")
    };

    format!(
        "You are {name}, playing {side}. Move {number}.\n\
         \n\
         ## Your notes\n\
         {memory}\n\
         \n\
         ## Position\n\
         FEN: {fen}\n\
         \n\
         {board}\n\
         Evaluation: {evaluation}\n\
         \n\
         ## Moves so far\n\
         {transcript}\n\
         \n\
         ## Legal moves\n\
         {legal}\n",
        name = request.player_name,
        side = request.side,
        number = request.move_number,
        memory = request.memory.trim_end(),
        fen = request.fen,
        board = request.board.render_ascii(),
        evaluation = request.evaluation.summary(),
        legal = request.legal_moves.join(", "),
    )
}

/// Split a completion into the move text and the `<memory>` block
///
/// Without a complete block the whole completion is the move text and the
/// memory is left unchanged.
pub fn parse_reply(content: &str) -> StrategistReply {
    let Some(open) = content.rfind(MEMORY_OPEN) else {
        return StrategistReply {
            text: content.trim().to_string(),
            memory: None,
        };
    };
    let body_start = open + MEMORY_OPEN.len();
    let Some(close) = content[body_start..].find(MEMORY_CLOSE) else {
        return StrategistReply {
            text: content.trim().to_string(),
            memory: None,
        };
    };
    let body_end = body_start + close;

    let memory = content[body_start..body_end].trim();
    let mut text = String::with_capacity(content.len());
    text.push_str(content[..open].trim_end());
    let rest = content[body_end + MEMORY_CLOSE.len()..].trim();
    if !rest.is_empty() {
        text.push('\n');
        text.push_str(rest);
    }

    StrategistReply {
        text: text.trim().to_string(),
        memory: (!memory.is_empty()).then(|| memory.to_string()),
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String, StrategistError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| StrategistError::MalformedResponse("response contained no content".into()))
}

fn map_http_error(status: StatusCode, body: &str) -> StrategistError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());

    StrategistError::Status {
        status: status.as_u16(),
        body: message,
    }
}
