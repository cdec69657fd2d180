//! Agent strategy: tool-calling model with last-word weather fallback

mod common;

use common::{FakeCompletion, Harness};
use serde_json::json;
use skysense::llm::{LlmResponse, Role, ToolCall};
use skysense::dispatcher::CITY_WEATHER_UNAVAILABLE;
use skysense::{ClientError, DispatchStrategy, Dispatcher};

fn agent_dispatcher(harness: &Harness) -> Dispatcher {
    Dispatcher::new(harness.weather(), harness.completion_client()).with_agent(4)
}

/// Calls `WeatherTool` once, then answers with the tool output
fn weather_tool_model(city: &'static str) -> FakeCompletion {
    FakeCompletion::new(move |messages, tools_offered| {
        assert!(tools_offered);
        match messages.last() {
            Some(last) if last.role == Role::Tool => Ok(LlmResponse::Text {
                text: format!("Here you go: {}", last.content.clone().unwrap_or_default()),
            }),
            _ => Ok(LlmResponse::ToolCalls {
                text: None,
                calls: vec![ToolCall {
                    id: "call_0".to_string(),
                    name: "WeatherTool".to_string(),
                    arguments: json!({ "city": city }),
                }],
            }),
        }
    })
}

#[tokio::test]
async fn agent_answers_through_weather_tool() {
    let harness = Harness::new(Some(weather_tool_model("Pune")));
    let dispatcher = agent_dispatcher(&harness);
    assert_eq!(dispatcher.strategy(), DispatchStrategy::Agent);

    let reply = dispatcher.respond("how warm is it in pune today").await;

    assert_eq!(reply, "Here you go: It's 27.5°C in Pune with haze.");
    assert_eq!(harness.completion().requests().len(), 2);
    assert_eq!(harness.geocoder.queries(), vec!["Pune".to_string()]);
}

#[tokio::test]
async fn agent_direct_answer_skips_weather() {
    let harness = Harness::new(Some(FakeCompletion::echo("agent")));
    let reply = agent_dispatcher(&harness).respond("tell me a joke").await;

    assert_eq!(reply, "agent: tell me a joke");
    assert_eq!(harness.geocoder.calls(), 0);
}

#[tokio::test]
async fn agent_failure_falls_back_to_last_word() {
    let harness = Harness::new(Some(FakeCompletion::failing(ClientError::Status {
        status: 500,
    })));
    let reply = agent_dispatcher(&harness).respond("weather for pune").await;

    assert_eq!(reply, "It's 27.5°C in Pune with haze.");
}

#[tokio::test]
async fn failed_tool_falls_back_to_last_word() {
    let harness = Harness::new(Some(weather_tool_model("Atlantis")));
    let reply = agent_dispatcher(&harness).respond("forecast new york").await;

    assert_eq!(reply, CITY_WEATHER_UNAVAILABLE);
    assert_eq!(
        harness.geocoder.queries(),
        vec!["Atlantis".to_string(), "york".to_string()]
    );
}

#[tokio::test]
async fn agent_without_completion_uses_fallback() {
    let harness = Harness::new(None);
    let reply = agent_dispatcher(&harness).respond("pune").await;

    assert_eq!(reply, "It's 27.5°C in Pune with haze.");
}

#[tokio::test]
async fn unknown_last_word_gets_city_apology() {
    let harness = Harness::new(None);
    let reply = agent_dispatcher(&harness).respond("weather in pune?").await;

    assert_eq!(reply, "Sorry, I couldn't fetch the weather for that city.");
    assert_eq!(harness.geocoder.queries(), vec!["pune?".to_string()]);
}

#[tokio::test]
async fn empty_message_gets_city_apology() {
    let harness = Harness::new(None);
    let reply = agent_dispatcher(&harness).respond("   ").await;

    assert_eq!(reply, CITY_WEATHER_UNAVAILABLE);
    assert_eq!(harness.geocoder.calls(), 0);
}
