//! In-process stand-ins for the remote services

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use skysense::llm::{LlmResponse, Message, ToolDefinition};
use skysense::{
    ClientError, ClientResult, CompletionClient, CompletionProvider, ConditionsSource,
    Coordinates, CurrentConditions, Geocoder, WeatherClient,
};

/// Geocoder backed by a fixed table of lower-case city names
#[derive(Default)]
pub struct FakeGeocoder {
    cities: HashMap<String, Coordinates>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with_city(mut self, city: &str, latitude: f64, longitude: f64) -> Self {
        self.cities
            .insert(city.to_lowercase(), Coordinates::new(latitude, longitude));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, city: &str) -> ClientResult<Coordinates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(city.to_string());
        self.cities
            .get(&city.to_lowercase())
            .copied()
            .ok_or_else(|| ClientError::NotFound(city.to_string()))
    }
}

/// Returns the same conditions everywhere, or a fixed failure
pub struct FakeConditions {
    result: ClientResult<CurrentConditions>,
    calls: AtomicUsize,
}

impl FakeConditions {
    pub fn ok(temperature: f64, description: &str) -> Self {
        Self {
            result: Ok(CurrentConditions {
                temperature: serde_json::Number::from_f64(temperature).unwrap(),
                description: description.to_string(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ClientError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConditionsSource for FakeConditions {
    async fn current_conditions(
        &self,
        _coordinates: Coordinates,
    ) -> ClientResult<CurrentConditions> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

type Responder = dyn Fn(&[Message], bool) -> ClientResult<LlmResponse> + Send + Sync;

/// Completion provider driven by a closure; records every request
pub struct FakeCompletion {
    responder: Box<Responder>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl FakeCompletion {
    /// `responder` receives the messages and whether tools were offered
    pub fn new(
        responder: impl Fn(&[Message], bool) -> ClientResult<LlmResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every prompt with `"<prefix>: <last user or tool message>"`
    pub fn echo(prefix: &'static str) -> Self {
        Self::new(move |messages, _| {
            let last = messages
                .last()
                .and_then(|m| m.content.clone())
                .unwrap_or_default();
            Ok(LlmResponse::Text {
                text: format!("{prefix}: {last}"),
            })
        })
    }

    pub fn failing(error: ClientError) -> Self {
        Self::new(move |_, _| Err(error.clone()))
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    /// Content of the user turn of every request
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|messages| messages.get(1).and_then(|m| m.content.clone()))
            .collect()
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    fn name(&self) -> &str {
        "fake"
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
    ) -> ClientResult<LlmResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        (self.responder)(messages, tools.is_some_and(|t| !t.is_empty()))
    }
}

/// Remote layer made of fakes, kept around so tests can inspect calls
pub struct Harness {
    pub geocoder: Arc<FakeGeocoder>,
    pub conditions: Arc<FakeConditions>,
    pub completion: Option<Arc<FakeCompletion>>,
}

impl Harness {
    /// Pune and New York are known; conditions are 27.5°C with haze
    pub fn new(completion: Option<FakeCompletion>) -> Self {
        Self::with_conditions(FakeConditions::ok(27.5, "haze"), completion)
    }

    pub fn with_conditions(conditions: FakeConditions, completion: Option<FakeCompletion>) -> Self {
        Self {
            geocoder: Arc::new(
                FakeGeocoder::default()
                    .with_city("pune", 18.5204, 73.8567)
                    .with_city("new york", 40.7128, -74.0060),
            ),
            conditions: Arc::new(conditions),
            completion: completion.map(Arc::new),
        }
    }

    pub fn weather(&self) -> WeatherClient {
        WeatherClient::new(self.geocoder.clone(), self.conditions.clone())
    }

    pub fn completion_client(&self) -> Option<CompletionClient> {
        self.completion.clone().map(|provider| {
            let provider: Arc<dyn CompletionProvider> = provider;
            CompletionClient::new(provider, "You are a helpful assistant.")
        })
    }

    pub fn completion(&self) -> &FakeCompletion {
        self.completion.as_deref().expect("completion configured")
    }
}
