pub mod memory;
pub mod react;
pub mod stock_tool;

use async_trait::async_trait;

pub use memory::ConversationMemory;
pub use react::{AgentReply, ReactAgent, ToolStep};
pub use stock_tool::StockPriceTool;

#[cfg(test)]
mod memory_tests;

/// A named, described, single-string-argument callable the agent may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Tool output is plain text fed back to the model as an observation.
    async fn call(&self, input: &str) -> String;
}
