//! The relay pipeline.
//!
//! `Received → Validated → AgentResolved → UpstreamCalled → Succeeded | Failed`.
//! Processing stops at the first failure.

use serde_json::Value;

use dipthinq_types::{
    ChatError,
    agent::Agent,
    config::GenerationParams,
    message::ChatTurn,
    model::FALLBACK_MODEL_ID,
    relay::{RelayReply, RelayRequest},
};

use crate::config::RelayConfig;
use crate::error::{ApiError, INVALID_BODY, MISSING_FIELDS};
use crate::upstream::{CompletionRequest, OpenRouterClient, UpstreamResponse};

pub struct Relay {
    client: OpenRouterClient,
    api_key: Option<String>,
    params: GenerationParams,
}

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub message: String,
    pub agent: &'static Agent,
    pub model_id: String,
    pub history: Vec<ChatTurn>,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> dipthinq_types::Result<Self> {
        Ok(Self {
            client: OpenRouterClient::new(config)?,
            api_key: config.api_key().map(str::to_string),
            params: GenerationParams::default(),
        })
    }

    /// Handle one raw `/api/chat` body.
    pub async fn handle(&self, body: &[u8]) -> Result<RelayReply, ApiError> {
        let request = validate(body)?;

        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("OPENROUTER_API_KEY is not set");
            return Err(ChatError::Config(
                "Please add OPENROUTER_API_KEY to the relay environment".to_string(),
            )
            .into());
        };

        let messages = build_messages(request.agent, request.history, request.message);
        let completion = CompletionRequest {
            model: &request.model_id,
            messages: &messages,
            params: self.params,
        };

        tracing::debug!(
            agent = request.agent.id,
            model = %request.model_id,
            turns = messages.len(),
            "forwarding chat turn"
        );

        let upstream = self
            .client
            .chat_completions(api_key, &completion)
            .await
            .inspect_err(|e| tracing::error!("Error calling OpenRouter API: {}", e))?;

        interpret(upstream, &request.model_id)
    }
}

/// Parse and check the inbound body. Unknown agents resolve to the default.
///
/// An empty body counts as one without fields; anything else that is not a
/// request object is rejected as unreadable.
pub fn validate(body: &[u8]) -> Result<ValidatedRequest, ChatError> {
    let request: RelayRequest = if body.trim_ascii().is_empty() {
        RelayRequest::default()
    } else {
        serde_json::from_slice(body).map_err(|e| {
            tracing::warn!("Rejecting unreadable chat request: {}", e);
            ChatError::InvalidRequest(INVALID_BODY.to_string())
        })?
    };

    let message = request.message.filter(|m| !m.is_empty());
    let agent_id = request.agent_id.filter(|a| !a.is_empty());
    let (Some(message), Some(agent_id)) = (message, agent_id) else {
        tracing::warn!("Rejecting chat request without message or agentId");
        return Err(ChatError::InvalidRequest(MISSING_FIELDS.to_string()));
    };

    let agent = Agent::resolve(&agent_id);
    if agent.id != agent_id {
        tracing::debug!("Unknown agent {:?}, using {}", agent_id, agent.id);
    }

    let model_id = request
        .model_id
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_MODEL_ID.to_string());

    Ok(ValidatedRequest {
        message,
        agent,
        model_id,
        history: request.history,
    })
}

/// System prompt, then the caller's history verbatim, then the new user turn.
pub fn build_messages(agent: &Agent, history: Vec<ChatTurn>, message: String) -> Vec<ChatTurn> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatTurn::system(agent.system_prompt));
    messages.extend(history);
    messages.push(ChatTurn::user(message));
    messages
}

/// Turn the upstream answer into a reply or a failure.
pub fn interpret(upstream: UpstreamResponse, model_id: &str) -> Result<RelayReply, ApiError> {
    if !upstream.is_success() {
        tracing::error!("OpenRouter API error ({}): {}", upstream.status, upstream.body);
        let details = serde_json::from_str::<Value>(&upstream.body)
            .unwrap_or_else(|_| Value::String(upstream.body.clone()));
        let message = upstream_message(&details);
        return Err(ApiError::from(ChatError::Upstream {
            status: upstream.status,
            details,
            message,
        })
        .with_model(model_id));
    }

    let data: Value = serde_json::from_str(&upstream.body).map_err(|e| {
        tracing::error!("Unreadable response from OpenRouter: {}", e);
        ChatError::Other(format!("Unreadable response from AI service: {}", e))
    })?;

    let Some(message) = data.pointer("/choices/0/message").filter(|m| m.is_object()) else {
        tracing::error!("Unexpected response format: {}", data);
        return Err(ChatError::MalformedUpstreamResponse(data.to_string()).into());
    };

    let response = message
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string);
    let model = data
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or("unknown")
        .to_string();

    Ok(RelayReply {
        response,
        model,
        requested_model: Some(model_id.to_string()),
    })
}

/// Best human-readable message from an upstream error body:
/// `error.message`, else `error`, else the whole body.
pub fn upstream_message(details: &Value) -> String {
    let text = match details.get("error") {
        Some(Value::Object(err)) => match err.get("message").and_then(Value::as_str) {
            Some(msg) => msg.to_string(),
            None => Value::Object(err.clone()).to_string(),
        },
        Some(Value::String(err)) if !err.is_empty() => err.clone(),
        _ => match details {
            Value::String(raw) => raw.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        },
    };

    if text.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        text
    }
}
