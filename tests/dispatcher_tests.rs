//! Heuristic dispatch against in-process fakes

mod common;

use common::{FakeCompletion, FakeConditions, Harness};
use skysense::ClientError;
use skysense::dispatcher::{
    CHAT_FALLBACK, Dispatcher, GREETING_FALLBACK, NAME_FALLBACK, WEATHER_UNAVAILABLE,
};

fn dispatcher(harness: &Harness) -> Dispatcher {
    Dispatcher::new(harness.weather(), harness.completion_client())
}

#[tokio::test]
async fn weather_query_without_completion_returns_summary() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness)
        .respond("What's the weather in Pune?")
        .await;

    assert_eq!(reply, "It's 27.5°C in Pune with haze.");
    assert_eq!(harness.geocoder.queries(), vec!["pune".to_string()]);
}

#[tokio::test]
async fn weather_query_is_rewritten_politely() {
    let harness = Harness::new(Some(FakeCompletion::echo("polite")));
    let reply = dispatcher(&harness)
        .respond("temperature of Pune?")
        .await;

    assert_eq!(reply, "polite: Rewrite this politely: It's 27.5°C in Pune with haze.");
    assert_eq!(
        harness.completion().prompts(),
        vec!["Rewrite this politely: It's 27.5°C in Pune with haze.".to_string()]
    );
}

#[tokio::test]
async fn failed_rewrite_keeps_raw_summary() {
    let harness = Harness::new(Some(FakeCompletion::failing(ClientError::Status {
        status: 503,
    })));
    let reply = dispatcher(&harness).respond("weather in pune").await;

    assert_eq!(reply, "It's 27.5°C in Pune with haze.");
}

#[tokio::test]
async fn unknown_city_in_weather_query_gets_fixed_apology() {
    let harness = Harness::new(Some(FakeCompletion::echo("chat")));
    let reply = dispatcher(&harness)
        .respond("what's the weather in Qwxzzz")
        .await;

    assert_eq!(reply, WEATHER_UNAVAILABLE);
    assert_eq!(reply, "Sorry, I could not fetch the weather right now.");
    assert!(harness.completion().requests().is_empty());
}

#[tokio::test]
async fn weather_service_failure_gets_fixed_apology() {
    let harness = Harness::with_conditions(
        FakeConditions::failing(ClientError::Transport("timed out".to_string())),
        None,
    );
    let reply = dispatcher(&harness).respond("climate of pune").await;

    assert_eq!(reply, WEATHER_UNAVAILABLE);
}

#[tokio::test]
async fn bare_city_reports_weather() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness).respond("pune").await;

    assert!(reply.contains("Pune"));
    assert!(reply.contains("°C"));
    assert_eq!(harness.geocoder.calls(), 1);
    assert_eq!(harness.conditions.calls(), 1);
}

#[tokio::test]
async fn weather_query_takes_single_token_after_marker() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness)
        .respond("temperature of new york")
        .await;

    assert_eq!(reply, WEATHER_UNAVAILABLE);
    assert_eq!(harness.geocoder.queries(), vec!["new".to_string()]);
}

#[tokio::test]
async fn two_word_city_is_title_cased() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness).respond("New York").await;

    assert_eq!(reply, "It's 27.5°C in New York with haze.");
}

#[tokio::test]
async fn bare_city_is_rewritten_when_completion_available() {
    let harness = Harness::new(Some(FakeCompletion::echo("polite")));
    let reply = dispatcher(&harness).respond("pune").await;

    assert_eq!(reply, "polite: Rewrite this politely: It's 27.5°C in Pune with haze.");
}

#[tokio::test]
async fn unknown_bare_city_falls_through_to_chat() {
    let harness = Harness::new(Some(FakeCompletion::echo("chat")));
    let reply = dispatcher(&harness).respond("atlantis").await;

    assert_eq!(reply, "chat: atlantis");
    assert_eq!(harness.geocoder.calls(), 1);
    assert_eq!(harness.conditions.calls(), 0);
}

#[tokio::test]
async fn unknown_bare_city_without_completion_gets_chat_fallback() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness).respond("atlantis").await;

    assert_eq!(reply, CHAT_FALLBACK);
}

#[tokio::test]
async fn bare_city_with_failing_conditions_falls_through_to_chat() {
    let harness = Harness::with_conditions(
        FakeConditions::failing(ClientError::Status { status: 401 }),
        Some(FakeCompletion::echo("chat")),
    );
    let reply = dispatcher(&harness).respond("pune").await;

    assert_eq!(reply, "chat: pune");
}

#[tokio::test]
async fn stop_words_never_reach_geocoder() {
    for message in ["hi", "thanks", "Hello", "ok pune", "why?"] {
        let harness = Harness::new(None);
        let reply = dispatcher(&harness).respond(message).await;

        assert_eq!(reply, GREETING_FALLBACK, "message: {message}");
        assert_eq!(harness.geocoder.calls(), 0, "message: {message}");
    }
}

#[tokio::test]
async fn stop_word_is_answered_by_completion() {
    let harness = Harness::new(Some(FakeCompletion::echo("chat")));
    let reply = dispatcher(&harness).respond("  hey ").await;

    assert_eq!(reply, "chat: hey");
    assert_eq!(harness.geocoder.calls(), 0);
}

#[tokio::test]
async fn capitalized_single_word_is_treated_as_a_name() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness).respond("Satyam").await;

    assert_eq!(reply, NAME_FALLBACK);
    assert_eq!(harness.geocoder.calls(), 0);
}

#[tokio::test]
async fn general_chat_uses_trimmed_original_message() {
    let harness = Harness::new(Some(FakeCompletion::echo("chat")));
    let reply = dispatcher(&harness).respond("  Tell me a Joke?  ").await;

    assert_eq!(reply, "chat: Tell me a Joke?");
    let requests = harness.completion().requests();
    assert_eq!(
        requests[0][0].content.as_deref(),
        Some("You are a helpful assistant.")
    );
    assert_eq!(harness.geocoder.calls(), 0);
}

#[tokio::test]
async fn general_chat_failure_gets_fixed_fallback() {
    let harness = Harness::new(Some(FakeCompletion::failing(ClientError::Transport(
        "connection refused".to_string(),
    ))));
    let reply = dispatcher(&harness).respond("tell me a joke").await;

    assert_eq!(reply, "Sorry, I could not generate a response.");
}

#[tokio::test]
async fn empty_message_goes_to_chat_fallback() {
    let harness = Harness::new(None);
    let reply = dispatcher(&harness).respond("   ").await;

    assert_eq!(reply, CHAT_FALLBACK);
    assert_eq!(harness.geocoder.calls(), 0);
}

#[tokio::test]
async fn respond_is_deterministic_for_fixed_remotes() {
    let harness = Harness::new(Some(FakeCompletion::echo("chat")));
    let dispatcher = dispatcher(&harness);

    for message in ["weather in pune", "hi", "Satyam", "atlantis", "tell me a joke"] {
        let first = dispatcher.respond(message).await;
        let second = dispatcher.respond(message).await;
        assert_eq!(first, second, "message: {message}");
    }
}
