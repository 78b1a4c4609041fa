//! Scripted model adapter for assistant tests.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::{AgentConfig, EventAssistant};
use crate::client::{Client, GenerateRequest, ProviderAdapter};
use crate::models::PROBE_PROMPT;
use crate::store::MemoryStore;
use crate::types::{GenerateResponse, Part, Role, ToolCall, Usage};
use crate::{Error, Result};

pub enum Step {
    Reply(GenerateResponse),
    /// Fails with an API error carrying this HTTP status.
    Fail(u16),
}

#[derive(Default)]
struct Script {
    steps: VecDeque<Step>,
    repeating: Option<GenerateResponse>,
    missing_models: HashSet<String>,
    requests: Vec<GenerateRequest>,
    probes: Vec<String>,
}

/// Answers generation calls from a fixed script.
///
/// Availability probes are answered without consuming script steps and are
/// recorded separately from real requests.
#[derive(Clone)]
pub struct ScriptedAdapter {
    script: Arc<Mutex<Script>>,
    configured: bool,
}

impl std::fmt::Debug for ScriptedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedAdapter")
            .field("configured", &self.configured)
            .finish()
    }
}

impl ScriptedAdapter {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                steps: steps.into(),
                ..Script::default()
            })),
            configured: true,
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(vec![])
        }
    }

    /// Served once the script runs out.
    pub fn repeating(self, response: GenerateResponse) -> Self {
        self.script.lock().unwrap().repeating = Some(response);
        self
    }

    pub fn missing_model(self, model: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .missing_models
            .insert(model.to_string());
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.script.lock().unwrap().probes.clone()
    }

    fn is_probe(request: &GenerateRequest) -> bool {
        request.tools.is_empty()
            && request.system_instruction.is_none()
            && request.contents.len() == 1
            && request.contents[0].role == Role::User
            && request.contents[0].text() == PROBE_PROMPT
    }
}

fn not_found(model: &str) -> Error {
    Error::Api {
        message: format!("models/{} is not found", model),
        status: Some(404),
        error_type: Some("NOT_FOUND".into()),
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedAdapter {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(
        &self,
        _http: &reqwest::Client,
        request: GenerateRequest,
    ) -> Result<GenerateResponse> {
        let mut script = self.script.lock().unwrap();

        if Self::is_probe(&request) {
            script.probes.push(request.model.clone());
            if script.missing_models.contains(&request.model) {
                return Err(not_found(&request.model));
            }
            return Ok(text_reply("pong"));
        }

        let model = request.model.clone();
        script.requests.push(request);
        if script.missing_models.contains(&model) {
            return Err(not_found(&model));
        }

        match script.steps.pop_front() {
            Some(Step::Reply(mut response)) => {
                response.model = model;
                Ok(response)
            }
            Some(Step::Fail(status)) => Err(Error::Api {
                message: "scripted failure".into(),
                status: Some(status),
                error_type: None,
            }),
            None => match script.repeating.clone() {
                Some(mut response) => {
                    response.model = model;
                    Ok(response)
                }
                None => Err(Error::Api {
                    message: "script exhausted".into(),
                    status: Some(500),
                    error_type: None,
                }),
            },
        }
    }
}

fn with_usage(mut response: GenerateResponse) -> GenerateResponse {
    response.usage = Usage {
        input_tokens: 100,
        output_tokens: 20,
        thinking_tokens: 0,
    };
    response
}

pub fn text_reply(text: &str) -> GenerateResponse {
    with_usage(GenerateResponse::new("scripted", vec![Part::text(text)]))
}

pub fn call_reply(calls: &[(&str, Value)]) -> GenerateResponse {
    with_usage(GenerateResponse::new(
        "scripted",
        calls
            .iter()
            .map(|(name, args)| Part::FunctionCall(ToolCall::new(*name, args.clone())))
            .collect(),
    ))
}

pub fn thought_reply(thought: &str, text: &str) -> GenerateResponse {
    with_usage(GenerateResponse::new(
        "scripted",
        vec![
            Part::Thought {
                text: thought.into(),
            },
            Part::text(text),
        ],
    ))
}

pub fn client(adapter: &ScriptedAdapter) -> Client {
    Client::with_http(adapter.clone(), reqwest::Client::new())
}

pub fn assistant(adapter: &ScriptedAdapter, store: MemoryStore) -> EventAssistant {
    assistant_with(adapter, store, AgentConfig::default())
}

pub fn assistant_with(
    adapter: &ScriptedAdapter,
    store: MemoryStore,
    config: AgentConfig,
) -> EventAssistant {
    EventAssistant::builder()
        .client(client(adapter))
        .stores(Arc::new(store))
        .config(config)
        .build()
        .unwrap()
}
