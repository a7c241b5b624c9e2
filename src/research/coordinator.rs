//! Research pipeline coordination
//!
//! The coordinator owns the full query path: ensure worker sessions are
//! live, fan the query out, compact the bundle, and hand the bounded
//! context to the LLM together with the conversation history and the raw
//! question.

use super::ResearchBundle;
use super::compactor::ContextCompactor;
use super::dispatcher::FanOutDispatcher;
use super::session::SessionManager;
use crate::llm::LLMClient;
use crate::types::{Message, Result};
use crate::utils::config::ResearchConfig;
use std::time::Duration;

/// Behavior rules for the research chat assistant.
///
/// The error-segment rule is a contract with the compactor: per-tool
/// failures appear in the context as labeled `[... MCP Error ...]` strings
/// and the model is told to disregard them rather than hallucinate around
/// them.
const CHAT_SYSTEM_PROMPT: &str = "\
You are HatchUp Chat, a smart VC research assistant.

BEHAVIOR:
1. If the user says \"Hello\" or engages in small talk, reply conversationally and politely. Do NOT generate a business report for greetings.
2. If the user asks a specific question or topic (e.g., \"AI Agents\", \"Market for EV batteries\"), use the provided [Context] to generate a structured analysis:
   - Key Insights
   - Market Signals
   - Risks
3. IGNORE error messages in the context (e.g., \"MCP Error\", \"Tool not found\").
4. Do NOT hallucinate acronyms or facts. If the context is empty or irrelevant, say so.

Your goal is to be a helpful, chatty partner who offers deep research when asked.";

/// Orchestrates live research and answer generation for one user session.
pub struct ResearchCoordinator {
    llm: Box<dyn LLMClient>,
    sessions: SessionManager,
    dispatcher: FanOutDispatcher,
    compactor: ContextCompactor,
    history_window: usize,
    session_id: uuid::Uuid,
}

impl ResearchCoordinator {
    pub fn new(llm: Box<dyn LLMClient>, sessions: SessionManager, config: &ResearchConfig) -> Self {
        Self {
            llm,
            sessions,
            dispatcher: FanOutDispatcher::new(Duration::from_secs(config.call_timeout_secs)),
            compactor: ContextCompactor::new(config.char_budget),
            history_window: config.history_window,
            session_id: uuid::Uuid::new_v4(),
        }
    }

    /// Identifier for this coordinator's session scope, for log correlation.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Run the live searches for a query: ensure sessions, fan out, collect.
    pub async fn run_searches(&self, query: &str) -> Result<ResearchBundle> {
        let sessions = self.sessions.ensure_sessions().await?;
        Ok(self
            .dispatcher
            .dispatch(self.sessions.registry(), sessions, query)
            .await)
    }

    /// Render a bundle into the bounded context string.
    pub fn build_context(&self, bundle: &ResearchBundle) -> String {
        self.compactor.compact(self.sessions.registry(), bundle)
    }

    /// Answer a question with live research context and recent history.
    pub async fn answer(&self, query: &str, history: &[Message]) -> Result<String> {
        let bundle = self.run_searches(query).await?;
        let context = self.build_context(&bundle);
        let prompt = self.build_user_prompt(&context, history, query);

        tracing::debug!(
            session = %self.session_id,
            failures = bundle.failure_count(),
            sources = bundle.len(),
            "generating answer from research bundle"
        );

        self.llm.generate_with_system(CHAT_SYSTEM_PROMPT, &prompt).await
    }

    /// Streaming variant of [`answer`]: returns the compacted context along
    /// with the token stream, so callers can surface the sources.
    ///
    /// [`answer`]: ResearchCoordinator::answer
    pub async fn answer_stream(
        &self,
        query: &str,
        history: &[Message],
    ) -> Result<(
        String,
        Box<dyn futures::Stream<Item = Result<String>> + Send + Unpin>,
    )> {
        let bundle = self.run_searches(query).await?;
        let context = self.build_context(&bundle);
        let prompt = self.build_user_prompt(&context, history, query);

        let stream = self
            .llm
            .stream_with_system(CHAT_SYSTEM_PROMPT, &prompt)
            .await?;
        Ok((context, stream))
    }

    /// Assemble the user prompt: live context, recent history window, and
    /// the current question.
    fn build_user_prompt(&self, context: &str, history: &[Message], query: &str) -> String {
        let start = history.len().saturating_sub(self.history_window);
        let history_text = history[start..]
            .iter()
            .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "[Context from Live Tools]\n{}\n\n[Conversation History]\n{}\n\n[Current User Input]\n{}",
            context, history_text, query
        )
    }
}
