use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::{ConversationMemory, Tool};
use crate::error::LlmError;
use crate::llm::ChatModel;

pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit.";

/// One tool invocation made while answering
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolStep {
    pub tool: String,
    pub input: String,
    pub observation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentReply {
    pub answer: String,
    pub steps: Vec<ToolStep>,
}

/// What the model asked for in one reply
#[derive(Debug, PartialEq)]
pub(crate) enum Decision {
    Act { thought: String, tool: String, input: String },
    Finish(String),
}

/// Zero-shot ReAct agent: the model either names a tool to call or gives
/// a final answer; tool observations are fed back until it finishes.
pub struct ReactAgent {
    llm: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    memory: Arc<ConversationMemory>,
    max_iterations: usize,
}

impl ReactAgent {
    pub fn new(
        llm: Arc<dyn ChatModel>,
        tools: Vec<Arc<dyn Tool>>,
        memory: Arc<ConversationMemory>,
        max_iterations: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            memory,
            max_iterations,
        }
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn system_prompt(&self) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect();
        let tool_names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();

        format!(
            r#"You are a helpful financial assistant. Answer the user's question as best you can.
You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Previous messages in this conversation are your chat history."#,
            tools = tool_lines.join("\n"),
            names = tool_names.join(", ")
        )
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
    }

    pub async fn run(&self, question: &str) -> Result<AgentReply, LlmError> {
        let system_prompt = self.system_prompt();
        let history = self.memory.history();
        let mut scratchpad = String::new();
        let mut steps = Vec::new();

        for iteration in 1..=self.max_iterations {
            let input = format!("Question: {}\n{}Thought:", question, scratchpad);
            let reply = self.llm.generate(&system_prompt, &history, &input).await?;

            match parse_reply(&reply) {
                Decision::Finish(answer) => {
                    info!(
                        "🤖 [AGENT] Final answer after {} step(s)",
                        steps.len()
                    );
                    self.memory.record(question, &answer);
                    return Ok(AgentReply { answer, steps });
                }
                Decision::Act { thought, tool, input } => {
                    let observation = match self.find_tool(&tool) {
                        Some(t) => t.call(&input).await,
                        None => {
                            warn!("⚠️ [AGENT] Unknown tool requested: {}", tool);
                            let names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
                            format!(
                                "{} is not a valid tool, try one of [{}].",
                                tool,
                                names.join(", ")
                            )
                        }
                    };
                    info!(
                        "🤖 [AGENT] Step {}: {}({:?}) -> {}",
                        iteration, tool, input, observation
                    );

                    scratchpad.push_str(&format!(
                        "Thought: {}\nAction: {}\nAction Input: {}\nObservation: {}\n",
                        thought, tool, input, observation
                    ));
                    steps.push(ToolStep {
                        tool,
                        input,
                        observation,
                    });
                }
            }
        }

        warn!(
            "⚠️ [AGENT] Iteration limit ({}) reached",
            self.max_iterations
        );
        let answer = ITERATION_LIMIT_ANSWER.to_string();
        self.memory.record(question, &answer);
        Ok(AgentReply { answer, steps })
    }
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let line = line.trim();
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(line[label.len()..].trim())
    } else {
        None
    }
}

/// Parse one model reply. An action wins only if it comes before any final
/// answer; a reply with neither marker is taken as the answer verbatim.
pub(crate) fn parse_reply(reply: &str) -> Decision {
    let mut thought_lines = Vec::new();
    let mut action: Option<String> = None;
    let mut action_input: Option<String> = None;
    let lines: Vec<&str> = reply.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = strip_label(line, "Final Answer:") {
            if action.is_none() {
                let mut answer = vec![rest];
                answer.extend_from_slice(&lines[i + 1..]);
                return Decision::Finish(answer.join("\n").trim().to_string());
            }
            break;
        }
        if let Some(rest) = strip_label(line, "Action Input:") {
            action_input = Some(clean_input(rest));
            // Anything after the input (e.g. an invented Observation) is ignored
            if action.is_some() {
                break;
            }
            continue;
        }
        if let Some(rest) = strip_label(line, "Action:") {
            action = Some(rest.to_string());
            continue;
        }
        if action.is_none() {
            let text = strip_label(line, "Thought:").unwrap_or(line.trim());
            if !text.is_empty() {
                thought_lines.push(text.to_string());
            }
        }
    }

    match action {
        Some(tool) if !tool.is_empty() => Decision::Act {
            thought: thought_lines.join(" "),
            tool,
            input: action_input.unwrap_or_default(),
        },
        _ => Decision::Finish(reply.trim().to_string()),
    }
}

fn clean_input(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}
