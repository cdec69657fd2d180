//! Message dispatcher
//!
//! [`Dispatcher::respond`] turns one raw message into one reply. It never
//! fails: every remote failure is absorbed and replaced by a fixed reply.

pub mod classifier;

pub use classifier::{Classification, Intent, classify, extract_city, tokenize};

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, instrument, warn};

use crate::agent::{Agent, AgentError, ToolTable, WeatherTool};
use crate::config::{DispatchStrategy, SkySenseConfig};
use crate::error::ClientError;
use crate::llm::CompletionClient;
use crate::models::WeatherSummary;
use crate::weather::WeatherClient;

/// Reply when an explicit weather question cannot be answered
pub const WEATHER_UNAVAILABLE: &str = "Sorry, I could not fetch the weather right now.";
/// Reply to small talk when the completion path is unavailable
pub const GREETING_FALLBACK: &str = "Hello! How can I help you?";
/// Reply to a probable personal name when the completion path is unavailable
pub const NAME_FALLBACK: &str = "How can I help you?";
/// Reply when general conversation cannot be answered
pub const CHAT_FALLBACK: &str = "Sorry, I could not generate a response.";
/// Reply when the agent fallback cannot find weather for the last word
pub const CITY_WEATHER_UNAVAILABLE: &str = "Sorry, I couldn't fetch the weather for that city.";

const REWRITE_PROMPT: &str = "Rewrite this politely:";

/// Routes messages to weather lookups or chat completion
pub struct Dispatcher {
    weather: WeatherClient,
    completion: Option<CompletionClient>,
    strategy: DispatchStrategy,
    agent: Option<Agent>,
}

impl Dispatcher {
    /// Heuristic dispatcher. `completion` is `None` when no completion key is
    /// configured; weather lookups and fixed replies still work.
    pub fn new(weather: WeatherClient, completion: Option<CompletionClient>) -> Self {
        Self {
            weather,
            completion,
            strategy: DispatchStrategy::Heuristic,
            agent: None,
        }
    }

    /// Switch to the agent strategy with `WeatherTool` registered
    #[must_use]
    pub fn with_agent(mut self, max_steps: u32) -> Self {
        self.agent = self.completion.clone().map(|completion| {
            let tools = ToolTable::new().with_tool(Arc::new(WeatherTool::new(self.weather.clone())));
            Agent::new(completion, tools, max_steps)
        });
        self.strategy = DispatchStrategy::Agent;
        self
    }

    /// Build the dispatcher and its remote clients from configuration
    pub fn from_config(config: &SkySenseConfig) -> Result<Self> {
        let weather = WeatherClient::openweather(&config.weather)?;
        let completion = CompletionClient::from_config(&config.completion)?;

        if completion.is_none() {
            warn!("No completion API key configured, chat replies fall back to fixed text");
        }
        if config.weather.api_key.is_none() {
            warn!("No weather API key configured, weather lookups will fail");
        }

        let dispatcher = Self::new(weather, completion);
        Ok(match config.dispatch.strategy {
            DispatchStrategy::Heuristic => dispatcher,
            DispatchStrategy::Agent => dispatcher.with_agent(config.dispatch.agent_max_steps),
        })
    }

    pub fn strategy(&self) -> DispatchStrategy {
        self.strategy
    }

    pub fn completion_enabled(&self) -> bool {
        self.completion.is_some()
    }

    /// Produce the reply for one message
    #[instrument(skip(self, message), fields(strategy = ?self.strategy, message_len = message.len()))]
    pub async fn respond(&self, message: &str) -> String {
        match self.strategy {
            DispatchStrategy::Heuristic => self.respond_heuristic(message).await,
            DispatchStrategy::Agent => self.respond_with_agent(message).await,
        }
    }

    async fn respond_heuristic(&self, message: &str) -> String {
        let Classification {
            original, intent, ..
        } = classify(message);
        info!(intent = intent.label(), "Classified message");

        match intent {
            Intent::WeatherQuery { city } => match self.weather.fetch(&city).await {
                Ok(summary) => self.polish(summary).await,
                Err(_) => WEATHER_UNAVAILABLE.to_string(),
            },
            Intent::SmallTalk => self.chat_or(&original, GREETING_FALLBACK).await,
            Intent::ProbableName => self.chat_or(&original, NAME_FALLBACK).await,
            Intent::CandidateCity { city } => match self.bare_city_weather(&city).await {
                Some(summary) => self.polish(summary).await,
                None => {
                    debug!("'{}' is not a known city, answering as conversation", city);
                    self.chat_or(&original, CHAT_FALLBACK).await
                }
            },
            Intent::General => self.chat_or(&original, CHAT_FALLBACK).await,
        }
    }

    /// Geocode once, then fetch conditions at the resolved coordinates
    async fn bare_city_weather(&self, city: &str) -> Option<WeatherSummary> {
        let coordinates = self.weather.resolve(city).await.ok()?;
        self.weather.fetch_at(city, coordinates).await.ok()
    }

    async fn respond_with_agent(&self, message: &str) -> String {
        let outcome = match &self.agent {
            Some(agent) => agent.run(message).await,
            None => Err(AgentError::Completion(ClientError::MissingCredential(
                "completion",
            ))),
        };

        match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Agent failed, falling back to last-word weather lookup: {}", e);
                self.last_word_weather(message).await
            }
        }
    }

    async fn last_word_weather(&self, message: &str) -> String {
        let Some(city) = message.split_whitespace().last() else {
            return CITY_WEATHER_UNAVAILABLE.to_string();
        };

        match self.weather.fetch(city).await {
            Ok(summary) => summary.to_string(),
            Err(_) => CITY_WEATHER_UNAVAILABLE.to_string(),
        }
    }

    /// Ask the model to reword a weather summary, keeping the raw summary on failure
    async fn polish(&self, summary: WeatherSummary) -> String {
        let summary = summary.to_string();
        self.complete(&format!("{REWRITE_PROMPT} {summary}"))
            .await
            .unwrap_or(summary)
    }

    async fn chat_or(&self, prompt: &str, fallback: &str) -> String {
        self.complete(prompt)
            .await
            .unwrap_or_else(|| fallback.to_string())
    }

    async fn complete(&self, prompt: &str) -> Option<String> {
        self.completion.as_ref()?.complete(prompt).await.ok()
    }
}
