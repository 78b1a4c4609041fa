//! Assistant loop tests against a scripted model.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use self::helpers::{
    ScriptedAdapter, Step, assistant, assistant_with, call_reply, client, text_reply,
    thought_reply,
};
use super::{
    AgentConfig, AiRequest, CarolRequest, EventAssistant, Momentum, REASONING_PLACEHOLDER,
    ReasoningMode,
};
use crate::Error;
use crate::ratelimit::SlidingWindowLimiter;
use crate::store::MemoryStore;
use crate::tools::ToolAccess;
use crate::tools::testing::{FailingStore, chat, songbook};
use crate::types::{Carol, Energy, EventContext, Part, Role};

fn event() -> EventContext {
    EventContext::new("evt-1", "Maple Street Carols").theme("Traditional")
}

#[tokio::test]
async fn test_two_tool_rounds_then_answer() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(call_reply(&[("searchCarols", json!({"query": "christmas"}))])),
        Step::Reply(call_reply(&[(
            "suggestSetlist",
            json!({"theme": "christmas", "duration": "45 minutes"}),
        )])),
        Step::Reply(text_reply("Here is a 45 minute set.")),
    ]);
    let assistant = assistant(&adapter, songbook());

    let result = assistant
        .run("Plan a 45 minute Christmas set", &event(), ToolAccess::all())
        .await
        .unwrap();

    assert_eq!(result.response, "Here is a 45 minute set.");
    assert_eq!(result.tools_used(), vec!["searchCarols", "suggestSetlist"]);
    assert!(result.tool_calls.iter().all(|r| r.result.success));
    assert_eq!(result.tool_calls[1].result.data["songCount"], 5);
    assert_eq!(result.metrics.rounds, 3);
    assert_eq!(result.metrics.tool_calls, 2);
    assert_eq!(result.metrics.input_tokens, 300);
    assert_eq!(result.model, "gemini-2.5-flash");

    let requests = adapter.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].tools.len(), 4);
    let roles: Vec<Role> = requests[2].contents.iter().map(|c| c.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Model, Role::Tool, Role::Model, Role::Tool]
    );
    assert_eq!(adapter.probes(), vec!["gemini-2.5-flash"]);

    let summary = assistant.metrics().summary();
    assert_eq!(summary.successful_requests, 1);
    assert_eq!(summary.total_tool_calls, 2);
}

#[tokio::test]
async fn test_unknown_tool_is_reported_and_loop_continues() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(call_reply(&[("playKazoo", json!({}))])),
        Step::Reply(text_reply("I can't play the kazoo, but I can search carols.")),
    ]);
    let assistant = assistant(&adapter, songbook());

    let result = assistant
        .run("Play the kazoo", &event(), ToolAccess::all())
        .await
        .unwrap();

    assert_eq!(result.tool_calls.len(), 1);
    let record = &result.tool_calls[0];
    assert!(record.result.is_error());
    assert_eq!(record.result.error.as_deref(), Some("unknown tool: playKazoo"));
    assert_eq!(result.metrics.errors, 1);
    assert!(!result.response.is_empty());

    let requests = adapter.requests();
    match &requests[1].contents[2].parts[0] {
        Part::FunctionResponse { name, response } => {
            assert_eq!(name, "playKazoo");
            assert_eq!(response["success"], false);
        }
        other => panic!("expected function response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_multiple_calls_answered_in_one_turn() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(call_reply(&[
            ("summarizeChat", json!({})),
            ("addContribution", json!({"category": "Food"})),
        ])),
        Step::Reply(text_reply("Everyone is excited; bring hot cocoa.")),
    ]);
    let assistant = assistant(&adapter, chat("evt-1").await);

    let result = assistant
        .run("What's the vibe and what should I bring?", &event(), ToolAccess::all())
        .await
        .unwrap();

    assert_eq!(result.tools_used(), vec!["summarizeChat", "addContribution"]);
    assert_eq!(result.tool_calls[0].result.data["messageCount"], 3);

    let second = &adapter.requests()[1];
    let tool_turn = second.contents.last().unwrap();
    assert_eq!(tool_turn.role, Role::Tool);
    assert_eq!(tool_turn.parts.len(), 2);
}

#[tokio::test]
async fn test_tool_store_failure_does_not_abort_run() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(call_reply(&[("searchCarols", json!({"query": "snow"}))])),
        Step::Reply(text_reply("The songbook is unavailable right now.")),
    ]);
    let assistant = EventAssistant::builder()
        .client(client(&adapter))
        .stores(Arc::new(FailingStore))
        .build()
        .unwrap();

    let result = assistant
        .run("Find snow songs", &event(), ToolAccess::all())
        .await
        .unwrap();
    assert!(result.tool_calls[0].result.is_error());
    assert_eq!(result.response, "The songbook is unavailable right now.");
}

#[tokio::test]
async fn test_loop_exhaustion() {
    let adapter = ScriptedAdapter::new(vec![])
        .repeating(call_reply(&[("searchCarols", json!({"query": "bells"}))]));
    let assistant = assistant_with(
        &adapter,
        songbook(),
        AgentConfig::default().with_max_rounds(3),
    );

    let err = assistant
        .run("Keep searching", &event(), ToolAccess::all())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ToolLoopExhausted { rounds: 3 }));
    assert!(err.is_resource_limit());
    assert_eq!(adapter.requests().len(), 3);
    assert_eq!(assistant.metrics().summary().failed_requests, 1);
}

#[tokio::test]
async fn test_missing_model_falls_back_without_reprobe() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(text_reply("First answer")),
        Step::Reply(text_reply("Second answer")),
    ])
    .missing_model("gemini-2.5-flash");
    let assistant = assistant(&adapter, songbook());

    let first = assistant.run("Hello", &event(), ToolAccess::all()).await.unwrap();
    let second = assistant.run("Again", &event(), ToolAccess::all()).await.unwrap();

    assert_eq!(first.model, "gemini-2.0-flash");
    assert_eq!(second.response, "Second answer");
    assert_eq!(adapter.probes(), vec!["gemini-2.5-flash"]);
    assert!(adapter.requests().iter().all(|r| r.model == "gemini-2.0-flash"));
    assert_eq!(assistant.metrics().summary().model_fallbacks, 2);
}

#[tokio::test]
async fn test_unconfigured_assistant_fails_before_any_call() {
    let adapter = ScriptedAdapter::unconfigured();
    let assistant = assistant(&adapter, songbook());

    let err = assistant
        .run("Hello", &event(), ToolAccess::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotConfigured(_)));
    assert!(adapter.requests().is_empty());
    assert!(adapter.probes().is_empty());
}

#[tokio::test]
async fn test_empty_prompt_rejected() {
    let adapter = ScriptedAdapter::new(vec![]);
    let assistant = assistant(&adapter, songbook());
    let err = assistant
        .run("   ", &event(), ToolAccess::all())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_rate_limited_per_event() {
    let adapter = ScriptedAdapter::new(vec![])
        .repeating(text_reply("ok"));
    let assistant = EventAssistant::builder()
        .client(client(&adapter))
        .stores(Arc::new(songbook()))
        .rate_limiter(Arc::new(SlidingWindowLimiter::new(
            1,
            Duration::from_secs(60),
        )))
        .build()
        .unwrap();

    assistant.run("one", &event(), ToolAccess::all()).await.unwrap();
    let err = assistant
        .run("two", &event(), ToolAccess::all())
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 429);
    assert!(err.retry_after().is_some());
    assert_eq!(adapter.requests().len(), 1);

    let other = EventContext::new("evt-2", "Other Street");
    assistant.run("three", &other, ToolAccess::all()).await.unwrap();
}

#[tokio::test]
async fn test_model_error_propagates() {
    let adapter = ScriptedAdapter::new(vec![Step::Fail(503)]);
    let assistant = assistant(&adapter, songbook());

    let err = assistant
        .run("Hello", &event(), ToolAccess::all())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(503));
    assert!(err.is_retryable());
    assert_eq!(assistant.metrics().summary().failed_requests, 1);
}

#[tokio::test]
async fn test_system_prompt_carries_event_and_recent_chat() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply("Hi!"))]);
    let assistant = assistant(&adapter, chat("evt-1").await);

    assistant
        .run("Who is coming?", &event(), ToolAccess::all())
        .await
        .unwrap();

    let system = adapter.requests()[0].system_instruction.clone().unwrap();
    assert!(system.contains("Name: Maple Street Carols"));
    assert!(system.contains("Theme: Traditional"));
    assert!(system.contains(
        "- Ana: Can't wait to sing carols this year\n- Ben: What time should we meet?"
    ));
    assert!(system.contains("- Cleo: Venue is the old square by the fountain"));
}

#[tokio::test]
async fn test_tool_access_none_sends_no_tools() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply("Hello there"))]);
    let assistant = assistant(&adapter, songbook());

    assistant
        .run("Hello", &event(), ToolAccess::none())
        .await
        .unwrap();
    assert!(adapter.requests()[0].tools.is_empty());
}

#[tokio::test]
async fn test_handle_with_forced_tool() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(call_reply(&[("summarizeChat", json!({}))])),
        Step::Reply(text_reply("The group is excited.")),
    ]);
    let assistant = assistant(&adapter, chat("evt-1").await);

    let response = assistant
        .handle(
            AiRequest::new("How is everyone feeling?").with_tool("summarizeChat"),
            &event(),
        )
        .await
        .unwrap();

    assert_eq!(response.response, "The group is excited.");
    assert_eq!(response.tool_calls.len(), 1);

    let tools = &adapter.requests()[0].tools;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "summarizeChat");

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["toolCalls"][0]["tool"], "summarizeChat");
}

#[tokio::test]
async fn test_handle_rejects_unknown_forced_tool() {
    let adapter = ScriptedAdapter::new(vec![]);
    let assistant = assistant(&adapter, songbook());

    let err = assistant
        .handle(AiRequest::new("Hi").with_tool("playKazoo"), &event())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(adapter.requests().is_empty());
}

#[tokio::test]
async fn test_handle_blank_tool_means_all_tools() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply("Hi"))]);
    let assistant = assistant(&adapter, songbook());

    let request: AiRequest =
        serde_json::from_value(json!({"prompt": "Hi", "tool": " "})).unwrap();
    assistant.handle(request, &event()).await.unwrap();
    assert_eq!(adapter.requests()[0].tools.len(), 4);
}

#[tokio::test]
async fn test_reasoning_returns_thoughts() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(thought_reply(
        "Open high, close gently.",
        "Start with Jingle Bells.",
    ))]);
    let assistant = assistant(&adapter, songbook());

    let output = assistant
        .generate_with_reasoning("What should we open with?", Some("Be brief."))
        .await
        .unwrap();

    assert_eq!(output.mode, ReasoningMode::Reasoned);
    assert_eq!(output.thinking, "Open high, close gently.");
    assert_eq!(output.response, "Start with Jingle Bells.");

    let request = &adapter.requests()[0];
    assert_eq!(request.model, "gemini-2.5-pro");
    assert_eq!(request.generation.temperature, Some(0.7));
    let thinking = request.generation.thinking.unwrap();
    assert!(thinking.include_thoughts);
    assert_eq!(thinking.budget_tokens, 8192);
    assert_eq!(request.system_instruction.as_deref(), Some("Be brief."));
}

#[tokio::test]
async fn test_reasoning_without_thoughts_uses_placeholder() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply("Silent Night."))]);
    let assistant = assistant(&adapter, songbook());

    let output = assistant.generate_with_reasoning("Next?", None).await.unwrap();
    assert_eq!(output.mode, ReasoningMode::Reasoned);
    assert_eq!(output.thinking, REASONING_PLACEHOLDER);
}

#[tokio::test]
async fn test_reasoning_falls_back_to_plain_generation() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Fail(400),
        Step::Reply(text_reply("Deck the Halls.")),
    ]);
    let assistant = assistant(&adapter, songbook());

    let output = assistant.generate_with_reasoning("Next?", None).await.unwrap();
    assert!(output.is_fallback());
    assert_eq!(output.thinking, REASONING_PLACEHOLDER);
    assert_eq!(output.response, "Deck the Halls.");

    let requests = adapter.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].generation.thinking.is_none());
    assert_eq!(requests[1].model, requests[0].model);
    assert_eq!(assistant.metrics().summary().reasoning_fallbacks, 1);
}

#[tokio::test]
async fn test_reasoning_fails_when_fallback_fails() {
    let adapter = ScriptedAdapter::new(vec![Step::Fail(500), Step::Fail(500)]);
    let assistant = assistant(&adapter, songbook());
    assert!(assistant.generate_with_reasoning("Next?", None).await.is_err());
}

#[tokio::test]
async fn test_generate_carol_from_fenced_json() {
    let body = "Here you go!\n```json\n{\"title\": \"Lanterns on Maple Street\", \
                \"lyrics\": \"Lanterns glow\\nVoices rise\", \"energy\": \"HIGH\", \
                \"tags\": [\" Winter \", \"\"]}\n```";
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply(body))]);
    let assistant = assistant(&adapter, songbook());

    let carol = assistant
        .generate_carol(&CarolRequest::new("lanterns").mood("joyful"))
        .await
        .unwrap();

    assert_eq!(carol.title, "Lanterns on Maple Street");
    assert_eq!(carol.lyrics, vec!["Lanterns glow", "Voices rise"]);
    assert_eq!(carol.energy, Energy::High);
    assert_eq!(carol.tags, vec!["winter"]);
    assert_eq!(adapter.requests()[0].model, "gemini-2.5-flash");
}

#[tokio::test]
async fn test_generate_carol_defaults_energy() {
    let body = r#"{"title": "Quiet Snow", "lyrics": ["Soft and slow"], "energy": "sleepy"}"#;
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply(body))]);
    let assistant = assistant(&adapter, songbook());

    let carol = assistant
        .generate_carol(&CarolRequest::new("snow"))
        .await
        .unwrap();
    assert_eq!(carol.energy, Energy::Medium);
    assert!(carol.tags.is_empty());
}

#[tokio::test]
async fn test_generate_carol_malformed_output() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply("I'd love to help!"))]);
    let assistant = assistant(&adapter, songbook());

    let err = assistant
        .generate_carol(&CarolRequest::new("snow"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedOutput { .. }));
    assert!(err.to_string().starts_with("Failed to generate carol"));
}

#[tokio::test]
async fn test_generate_carol_requires_theme() {
    let adapter = ScriptedAdapter::new(vec![]);
    let assistant = assistant(&adapter, songbook());
    let err = assistant
        .generate_carol(&CarolRequest::new(" "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_translate_carol() {
    let body = r#"{"title": "Noche de paz", "lyrics": ["Noche de paz, noche de amor", "Todo duerme en derredor", "Extra line"]}"#;
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply(body))]);
    let assistant = assistant(&adapter, songbook());

    let silent_night = Carol::new(
        "silent-night",
        "Silent Night",
        "Franz Gruber",
        Energy::Low,
        "2:50",
    )
    .lyrics(["Silent night, holy night", "All is calm, all is bright"]);
    let translated = assistant
        .translate_carol(&silent_night, " Spanish ")
        .await
        .unwrap();

    assert_eq!(translated.title, "Noche de paz");
    assert_eq!(translated.language, "Spanish");
    assert_eq!(translated.lyrics.len(), 3);

    let prompt = adapter.requests()[0].contents[0].text();
    assert!(prompt.contains("into Spanish"));
    assert!(prompt.contains("All is calm, all is bright"));
}

#[tokio::test]
async fn test_translate_carol_rejects_bad_input() {
    let adapter = ScriptedAdapter::new(vec![]);
    let assistant = assistant(&adapter, songbook());
    let no_lyrics = Carol::new("jingle-bells", "Jingle Bells", "Pierpont", Energy::High, "2:10");
    let with_lyrics = no_lyrics.clone().lyrics(["Dashing through the snow"]);

    assert!(matches!(
        assistant.translate_carol(&with_lyrics, "").await,
        Err(Error::InvalidRequest(_))
    ));
    assert!(matches!(
        assistant.translate_carol(&no_lyrics, "French").await,
        Err(Error::InvalidRequest(_))
    ));
    assert!(adapter.requests().is_empty());
}

fn candidates() -> Vec<Carol> {
    vec![
        Carol::new("jingle-bells", "Jingle Bells", "Pierpont", Energy::High, "2:10"),
        Carol::new("silent-night", "Silent Night", "Gruber", Energy::Low, "2:50"),
        Carol::new("deck-the-halls", "Deck the Halls", "Traditional", Energy::High, "1:50"),
    ]
}

#[tokio::test]
async fn test_recommend_next_filters_ids() {
    let body = r#"```json
{"recommendations": [
  {"carolId": "jingle-bells", "reason": "Already sung", "momentum": "building"},
  {"carolId": "deck-the-halls", "reason": "Keeps the energy up", "momentum": "building"},
  {"carolId": "rudolph", "reason": "Not in the songbook", "momentum": "building"},
  {"carolId": "silent-night", "reason": "A calm close", "momentum": "winding_down"}
]}
```"#;
    let adapter = ScriptedAdapter::new(vec![Step::Reply(thought_reply("Energy is high.", body))]);
    let assistant = assistant(&adapter, songbook());

    let recommendations = assistant
        .recommend_next(&event(), &candidates(), &["jingle-bells".to_string()])
        .await
        .unwrap();

    let ids: Vec<_> = recommendations.iter().map(|r| r.carol_id.as_str()).collect();
    assert_eq!(ids, vec!["deck-the-halls", "silent-night"]);
    assert_eq!(recommendations[0].momentum, Momentum::Building);
    assert_eq!(recommendations[1].momentum, Momentum::WindingDown);

    let prompt = adapter.requests()[0].contents[0].text();
    assert!(prompt.contains("- Jingle Bells"));
    assert!(!prompt.contains("- jingle-bells:"));
}

#[tokio::test]
async fn test_recommend_next_with_everything_played() {
    let adapter = ScriptedAdapter::new(vec![]);
    let assistant = assistant(&adapter, songbook());
    let played: Vec<String> = candidates().into_iter().map(|c| c.id).collect();

    let recommendations = assistant
        .recommend_next(&event(), &candidates(), &played)
        .await
        .unwrap();
    assert!(recommendations.is_empty());
    assert!(adapter.requests().is_empty());
}

#[tokio::test]
async fn test_recommend_next_malformed() {
    let adapter = ScriptedAdapter::new(vec![Step::Reply(text_reply("Sing whatever you like."))]);
    let assistant = assistant(&adapter, songbook());

    let err = assistant
        .recommend_next(&event(), &candidates(), &[])
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to recommend next carol"));
}

#[tokio::test]
async fn test_empty_store_still_answers() {
    let adapter = ScriptedAdapter::new(vec![
        Step::Reply(call_reply(&[("searchCarols", json!({"query": "anything"}))])),
        Step::Reply(text_reply("The songbook is empty.")),
    ]);
    let assistant = assistant(&adapter, MemoryStore::new());

    let result = assistant
        .run("Find a song", &event(), ToolAccess::all())
        .await
        .unwrap();
    assert!(result.tool_calls[0].result.success);
    assert_eq!(result.tool_calls[0].result.data["count"], 0);
}
