//! The tool-calling loop.

use std::time::Instant;

use tracing::{Instrument, debug, info, instrument, warn};

use super::assistant::EventAssistant;
use super::events::{AgentResult, AiRequest, AiResponse, ToolCallRecord};
use super::prompt::system_prompt;
use super::state::{AgentMetrics, LoopControl};
use crate::client::GenerateRequest;
use crate::observability::{ApiCallSpan, tool_span};
use crate::tools::{ToolAccess, ToolContext, ToolRegistry};
use crate::types::{Content, EventContext, Part, ToolCall};
use crate::{Error, Result};

impl EventAssistant {
    /// Answers `prompt` for `event`, letting the model call the tools
    /// `access` allows until it replies in plain text.
    ///
    /// Every round is one model call. Calls requested in a round are run in
    /// order and answered together in a single tool turn.
    #[instrument(skip(self, prompt, event, access), fields(event_id = %event.event_id))]
    pub async fn run(
        &self,
        prompt: &str,
        event: &EventContext,
        access: ToolAccess,
    ) -> Result<AgentResult> {
        self.client.ensure_configured()?;
        if prompt.trim().is_empty() {
            return Err(Error::InvalidRequest("prompt must not be empty".into()));
        }
        self.admit(&event.event_id).await?;

        self.metrics.record_request_start();
        let result = self.run_loop(prompt, event, &access).await;
        self.metrics.record_request_end(result.is_ok());
        result
    }

    /// HTTP entry point: an optional `tool` restricts the model to that tool.
    pub async fn handle(&self, request: AiRequest, event: &EventContext) -> Result<AiResponse> {
        let forced = request
            .tool
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(tool) = forced
            && !self.tools.contains(tool)
        {
            return Err(Error::InvalidRequest(format!("unknown tool: {}", tool)));
        }

        let access = ToolAccess::forced(forced);
        self.run(&request.prompt, event, access)
            .await
            .map(AiResponse::from)
    }

    async fn run_loop(
        &self,
        prompt: &str,
        event: &EventContext,
        access: &ToolAccess,
    ) -> Result<AgentResult> {
        let execution_start = Instant::now();

        let model = self.resolve_model(self.config.variant).await;
        let history = self.load_history(event).await;
        let system = system_prompt(event, &history, self.config.history_window);
        let tools = self.tools.filtered(access);
        let definitions = tools.definitions();
        let context = ToolContext::new(&event.event_id);

        let mut contents = vec![Content::user(prompt)];
        let mut records = Vec::new();
        let mut metrics = AgentMetrics {
            model: model.clone(),
            ..AgentMetrics::default()
        };

        info!(
            model = %model,
            tools = definitions.len(),
            history = history.len(),
            "Starting assistant run"
        );

        let response_text = loop {
            metrics.rounds += 1;

            let mut request = GenerateRequest::new(&model, contents.clone())
                .with_system(system.clone())
                .with_tools(definitions.clone());
            if let Some(temperature) = self.config.temperature {
                request = request.with_temperature(temperature);
            }

            let span = ApiCallSpan::new(&model, &event.event_id, metrics.rounds);
            let response = match self
                .client
                .send(request)
                .instrument(span.span().clone())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(round = metrics.rounds, error = %e, "Model call failed");
                    return Err(e);
                }
            };
            span.record_usage(response.usage.input_tokens, response.usage.output_tokens);
            let latency_ms = span.finish();

            self.metrics.record_api_call(
                latency_ms,
                response.usage.input_tokens,
                response.usage.output_tokens,
            );
            metrics.record_api_call(latency_ms as u64);
            metrics.add_usage(&response.usage);

            contents.push(Content::model(response.parts.clone()));

            if !response.wants_tool_use() {
                debug!(round = metrics.rounds, "No tool calls requested, finishing");
                break response.text();
            }

            if LoopControl::after_round(metrics.rounds, self.config.max_rounds)
                == LoopControl::Exhausted
            {
                warn!(
                    rounds = metrics.rounds,
                    pending = response.function_calls().len(),
                    "Tool loop exhausted"
                );
                return Err(Error::ToolLoopExhausted {
                    rounds: metrics.rounds,
                });
            }

            let calls: Vec<ToolCall> = response.function_calls().into_iter().cloned().collect();
            let mut parts = Vec::with_capacity(calls.len());
            for call in calls {
                let record = self
                    .dispatch(&tools, call, &context, &mut metrics)
                    .await;
                parts.push(Part::function_response(
                    &record.tool,
                    record.result.to_response(),
                ));
                records.push(record);
            }
            contents.push(Content::tool_responses(parts));
        };

        metrics.execution_time_ms = execution_start.elapsed().as_millis() as u64;

        info!(
            rounds = metrics.rounds,
            tool_calls = metrics.tool_calls,
            total_tokens = metrics.total_tokens(),
            execution_time_ms = metrics.execution_time_ms,
            "Assistant run completed"
        );

        Ok(AgentResult {
            response: response_text,
            tool_calls: records,
            metrics,
            model,
        })
    }

    async fn dispatch(
        &self,
        tools: &ToolRegistry,
        call: ToolCall,
        context: &ToolContext,
        metrics: &mut AgentMetrics,
    ) -> ToolCallRecord {
        let span = tool_span(&call.name, context.event_id());
        let start = Instant::now();
        let result = tools
            .execute(&call.name, call.args.clone(), context)
            .instrument(span.clone())
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let is_error = result.is_error();
        span.record("is_error", is_error);
        self.metrics.record_tool_call(!is_error);
        metrics.record_tool(&call.name, duration_ms, is_error);

        if is_error {
            warn!(
                tool = %call.name,
                error = result.error.as_deref().unwrap_or_default(),
                "Tool call failed"
            );
        } else {
            debug!(tool = %call.name, duration_ms, "Tool call completed");
        }

        ToolCallRecord {
            tool: call.name,
            args: call.args,
            result,
        }
    }
}
