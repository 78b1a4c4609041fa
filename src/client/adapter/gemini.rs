//! Gemini `generateContent` adapter.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::traits::ProviderAdapter;
use crate::client::{GenerateRequest, ProviderConfig};
use crate::types::{Content, FinishReason, GenerateResponse, Part, Role, ToolCall, Usage};
use crate::{Error, Result};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTools>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<WireToolConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<WireFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<WireFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionResponse {
    name: String,
    response: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTools {
    function_declarations: Vec<WireFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct WireFunctionDeclaration {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireToolConfig {
    function_calling_config: WireFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct WireFunctionCallingConfig {
    mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<WireThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireThinkingConfig {
    include_thoughts: bool,
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
    #[serde(default)]
    usage_metadata: Option<WireUsage>,
    #[serde(default)]
    prompt_feedback: Option<WirePromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCandidate {
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    finish_reason: Option<FinishReason>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    thoughts_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Adapter for the Gemini REST API authenticated with an API key.
pub struct GeminiAdapter {
    config: ProviderConfig,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("base_url", &self.config.base_url)
            .field("configured", &self.config.is_configured())
            .finish()
    }
}

impl GeminiAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url,
            model.trim_start_matches("models/")
        )
    }

    fn transform_request(request: &GenerateRequest) -> WireRequest {
        let contents = request
            .contents
            .iter()
            .map(to_wire_content)
            .filter(|c| !c.parts.is_empty())
            .collect();

        let system_instruction = request.system_instruction.as_ref().map(|text| WireContent {
            role: None,
            parts: vec![WirePart {
                text: Some(text.clone()),
                ..Default::default()
            }],
        });

        let (tools, tool_config) = if request.tools.is_empty() {
            (Vec::new(), None)
        } else {
            let declarations = request
                .tools
                .iter()
                .map(|t| WireFunctionDeclaration {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                })
                .collect();
            (
                vec![WireTools {
                    function_declarations: declarations,
                }],
                Some(WireToolConfig {
                    function_calling_config: WireFunctionCallingConfig { mode: "AUTO" },
                }),
            )
        };

        let generation = &request.generation;
        let generation_config = (generation.temperature.is_some()
            || generation.max_output_tokens.is_some()
            || generation.thinking.is_some())
        .then(|| WireGenerationConfig {
            temperature: generation.temperature,
            max_output_tokens: generation.max_output_tokens,
            thinking_config: generation.thinking.map(|t| WireThinkingConfig {
                include_thoughts: t.include_thoughts,
                thinking_budget: t.budget_tokens,
            }),
        });

        WireRequest {
            contents,
            system_instruction,
            tools,
            tool_config,
            generation_config,
        }
    }

    fn transform_response(model: &str, response: WireResponse) -> Result<GenerateResponse> {
        let usage = response
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                thinking_tokens: u.thoughts_token_count,
            })
            .unwrap_or_default();

        let Some(candidate) = response.candidates.into_iter().next() else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(Error::Api {
                    message: format!("prompt blocked: {reason}"),
                    status: None,
                    error_type: Some(reason),
                });
            }
            return Err(Error::Parse("response contained no candidates".into()));
        };

        let parts = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(from_wire_part)
            .collect();

        Ok(GenerateResponse {
            model: model.to_string(),
            parts,
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

fn to_wire_content(content: &Content) -> WireContent {
    let role = match content.role {
        Role::User | Role::Tool => "user",
        Role::Model => "model",
    };
    let parts = content
        .parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { text } => Some(WirePart {
                text: Some(text.clone()),
                ..Default::default()
            }),
            Part::Thought { .. } => None,
            Part::FunctionCall(call) => Some(WirePart {
                function_call: Some(WireFunctionCall {
                    name: call.name.clone(),
                    args: call.args.clone(),
                }),
                ..Default::default()
            }),
            Part::FunctionResponse { name, response } => Some(WirePart {
                function_response: Some(WireFunctionResponse {
                    name: name.clone(),
                    response: response.clone(),
                }),
                ..Default::default()
            }),
        })
        .collect();
    WireContent {
        role: Some(role.to_string()),
        parts,
    }
}

fn from_wire_part(part: WirePart) -> Option<Part> {
    if let Some(call) = part.function_call {
        return Some(Part::FunctionCall(ToolCall::new(call.name, call.args)));
    }
    match part.text {
        Some(text) if part.thought => Some(Part::Thought { text }),
        Some(text) => Some(Part::Text { text }),
        None => None,
    }
}

fn error_from_status(status: u16, body: &str, retry_after: Option<Duration>) -> Error {
    if status == 429 {
        return Error::RateLimit { retry_after };
    }
    match serde_json::from_str::<WireErrorBody>(body) {
        Ok(parsed) => Error::Api {
            message: parsed.error.message,
            status: Some(status),
            error_type: parsed.error.status,
        },
        Err(_) => Error::Api {
            message: body.to_string(),
            status: Some(status),
            error_type: None,
        },
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn send(
        &self,
        http: &reqwest::Client,
        request: GenerateRequest,
    ) -> Result<GenerateResponse> {
        let key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| Error::NotConfigured("GEMINI_API_KEY is not set".into()))?;

        let url = self.endpoint(&request.model);
        let body = Self::transform_request(&request);

        let response = http
            .post(&url)
            .header(API_KEY_HEADER, key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_status(status.as_u16(), &text, retry_after));
        }

        let wire: WireResponse = response.json().await?;
        Self::transform_response(&request.model, wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ThinkingConfig;
    use crate::types::ToolDefinition;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> GeminiAdapter {
        GeminiAdapter::new(ProviderConfig::new("test-key").with_base_url(server.uri()))
    }

    #[test]
    fn test_transform_request_shape() {
        let request = GenerateRequest::new(
            "gemini-2.5-flash",
            vec![
                Content::user("plan our set"),
                Content::model(vec![
                    Part::Thought {
                        text: "hidden".into(),
                    },
                    Part::FunctionCall(ToolCall::new("searchCarols", json!({"query": "snow"}))),
                ]),
                Content::tool_responses(vec![Part::function_response(
                    "searchCarols",
                    json!({"count": 1}),
                )]),
            ],
        )
        .with_system("You help carolers")
        .with_tools(vec![ToolDefinition::new(
            "searchCarols",
            "Search carols",
            json!({"type": "object", "properties": {}}),
        )])
        .with_temperature(0.7)
        .with_thinking(ThinkingConfig::high());

        let wire = serde_json::to_value(GeminiAdapter::transform_request(&request)).unwrap();

        assert_eq!(wire["systemInstruction"]["parts"][0]["text"], "You help carolers");
        assert_eq!(wire["contents"].as_array().unwrap().len(), 3);
        assert_eq!(wire["contents"][1]["role"], "model");
        assert_eq!(wire["contents"][1]["parts"].as_array().unwrap().len(), 1);
        assert_eq!(
            wire["contents"][1]["parts"][0]["functionCall"]["name"],
            "searchCarols"
        );
        assert_eq!(wire["contents"][2]["role"], "user");
        assert_eq!(
            wire["contents"][2]["parts"][0]["functionResponse"]["response"]["count"],
            1
        );
        assert_eq!(
            wire["tools"][0]["functionDeclarations"][0]["name"],
            "searchCarols"
        );
        assert_eq!(wire["toolConfig"]["functionCallingConfig"]["mode"], "AUTO");
        assert_eq!(
            wire["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            8192
        );
        assert_eq!(
            wire["generationConfig"]["thinkingConfig"]["includeThoughts"],
            true
        );
    }

    #[test]
    fn test_plain_request_omits_optional_sections() {
        let wire = serde_json::to_value(GeminiAdapter::transform_request(
            &GenerateRequest::prompt("m", "hi"),
        ))
        .unwrap();
        assert!(wire.get("tools").is_none());
        assert!(wire.get("toolConfig").is_none());
        assert!(wire.get("generationConfig").is_none());
        assert!(wire.get("systemInstruction").is_none());
        assert!(wire["contents"][0]["parts"][0].get("thought").is_none());
    }

    #[test]
    fn test_transform_response_parts() {
        let wire: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "weighing options", "thought": true},
                    {"text": "Let me search."},
                    {"functionCall": {"name": "searchCarols", "args": {"query": "joy"}}}
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 8, "thoughtsTokenCount": 30}
        }))
        .unwrap();

        let response = GeminiAdapter::transform_response("gemini-2.5-pro", wire).unwrap();
        assert_eq!(response.model, "gemini-2.5-pro");
        assert_eq!(response.thoughts(), ["weighing options"]);
        assert_eq!(response.text(), "Let me search.");
        assert_eq!(response.function_calls()[0].args["query"], "joy");
        assert_eq!(response.finish_reason, Some(FinishReason::Stop));
        assert_eq!(response.usage.total(), 50);
    }

    #[test]
    fn test_blocked_prompt_is_api_error() {
        let wire: WireResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        let err = GeminiAdapter::transform_response("m", wire).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let empty: WireResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            GeminiAdapter::transform_response("m", empty),
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_send_round_trip() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "ping"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "pong"}]}, "finishReason": "STOP"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = adapter(&server)
            .send(
                &reqwest::Client::new(),
                GenerateRequest::prompt("gemini-2.5-flash", "ping"),
            )
            .await
            .unwrap();
        assert_eq!(response.text(), "pong");
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-9-ultra:generateContent"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "code": 404,
                    "message": "models/gemini-9-ultra is not found for API version v1beta",
                    "status": "NOT_FOUND"
                }
            })))
            .mount(&server)
            .await;

        let err = adapter(&server)
            .send(
                &reqwest::Client::new(),
                GenerateRequest::prompt("gemini-9-ultra", "ping"),
            )
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn test_rate_limit_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("quota"),
            )
            .mount(&server)
            .await;

        let err = adapter(&server)
            .send(&reqwest::Client::new(), GenerateRequest::prompt("m", "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let adapter = GeminiAdapter::new(ProviderConfig::default());
        assert!(!adapter.is_configured());
        let err = adapter
            .send(&reqwest::Client::new(), GenerateRequest::prompt("m", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotConfigured(_)));
    }
}
