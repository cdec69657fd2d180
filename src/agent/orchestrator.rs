//! Agent orchestration loop

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::tools::{ToolError, ToolTable};
use crate::error::ClientError;
use crate::llm::{CompletionClient, LlmResponse, Message, ToolCall};

/// Reasons an agent run ends without an answer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("completion failed: {0}")]
    Completion(#[from] ClientError),

    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool '{name}' failed: {source}")]
    Tool {
        name: String,
        #[source]
        source: ToolError,
    },

    #[error("model returned an empty answer")]
    EmptyAnswer,

    #[error("no final answer after {0} model calls")]
    StepLimit(u32),
}

enum AgentState {
    CallModel,
    InvokeTools(Vec<ToolCall>),
    Finished(String),
}

/// Model plus tool table, bounded by a maximum number of model calls
pub struct Agent {
    completion: CompletionClient,
    tools: ToolTable,
    max_steps: u32,
}

impl Agent {
    pub fn new(completion: CompletionClient, tools: ToolTable, max_steps: u32) -> Self {
        Self {
            completion,
            tools,
            max_steps: max_steps.max(1),
        }
    }

    /// Answer `input`, invoking tools as the model requests them
    #[instrument(name = "agent.run", skip(self, input), fields(tools = self.tools.len(), max_steps = self.max_steps))]
    pub async fn run(&self, input: &str) -> Result<String, AgentError> {
        let definitions = self.tools.definitions();
        let mut messages = vec![
            Message::system(self.completion.system_prompt()),
            Message::user(input),
        ];
        let mut model_calls = 0;
        let mut state = AgentState::CallModel;

        loop {
            state = match state {
                AgentState::CallModel => {
                    if model_calls == self.max_steps {
                        warn!("Agent gave up after {} model calls", model_calls);
                        return Err(AgentError::StepLimit(model_calls));
                    }
                    model_calls += 1;

                    let response = self
                        .completion
                        .provider()
                        .chat(&messages, Some(definitions.as_slice()))
                        .await?;
                    Self::next_state(response, &mut messages)?
                }
                AgentState::InvokeTools(calls) => {
                    for call in calls {
                        let output = self.invoke(&call).await?;
                        messages.push(Message::tool_result(call.id, output));
                    }
                    AgentState::CallModel
                }
                AgentState::Finished(text) => {
                    info!("Agent finished after {} model calls", model_calls);
                    return Ok(text);
                }
            };
        }
    }

    /// Decide what follows a model response and record the assistant turn
    fn next_state(
        response: LlmResponse,
        messages: &mut Vec<Message>,
    ) -> Result<AgentState, AgentError> {
        match response {
            LlmResponse::ToolCalls { calls, .. } if !calls.is_empty() => {
                debug!(
                    "Model requested tools: {:?}",
                    calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
                );
                messages.push(Message::assistant_tool_calls(calls.clone()));
                Ok(AgentState::InvokeTools(calls))
            }
            response => match response.text().map(str::trim) {
                Some(text) if !text.is_empty() => Ok(AgentState::Finished(text.to_string())),
                _ => Err(AgentError::EmptyAnswer),
            },
        }
    }

    async fn invoke(&self, call: &ToolCall) -> Result<String, AgentError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| AgentError::UnknownTool(call.name.clone()))?;

        debug!("Invoking tool '{}' with {}", call.name, call.arguments);
        tool.invoke(&call.arguments)
            .await
            .map_err(|source| AgentError::Tool {
                name: call.name.clone(),
                source,
            })
    }
}
