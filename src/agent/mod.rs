//! Tool-calling agent
//!
//! The model is offered a fixed [`ToolTable`]; [`Agent::run`] drives an
//! explicit state machine: call the model, invoke whatever tools it asks
//! for, feed the results back, until the model answers with text.

pub mod orchestrator;
pub mod tools;

pub use orchestrator::{Agent, AgentError};
pub use tools::{Tool, ToolError, ToolTable, WeatherTool};
