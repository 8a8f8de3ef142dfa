//! Session driver: one utterance in, one message out, until told to stop
//!
//! Each cycle: listen -> (exit phrase? pending confirmation?) -> think ->
//! respond directly or dispatch -> emit. Failures inside a cycle become an
//! apology and the loop carries on after a short pause. An exit phrase,
//! closed input, an interrupt or a run of consecutive failures end the
//! session.

use crate::actions::descriptor::ActionDescriptor;
use crate::command::dispatcher::ActionDispatcher;
use crate::core::config::SessionConfig;
use crate::core::error::{AgentError, Result};
use crate::llm::parser::CommandParser;
use crate::session::console::{Console, Emission, Heard};
use std::future::Future;
use std::time::Duration;

pub const FAREWELL: &str = "Goodbye! Shutting down OS Agent.";
pub const APOLOGY: &str = "Sorry, something went wrong.";
pub const UNCLEAR_REPLY: &str = "Sorry, I didn't catch that. Could you repeat?";
pub const HEARING_TROUBLE: &str = "I'm having trouble hearing you.";

const CONFIRM_HINT: &str = "Say yes to proceed or no to cancel.";

/// Consecutive failed cycles tolerated before the session gives up
pub const MAX_CONSECUTIVE_FAILURES: u32 = 5;
const FAILURE_BACKOFF: Duration = Duration::from_millis(200);

const EXIT_PHRASES: [&str; 4] = ["exit", "quit", "stop", "goodbye"];
const AFFIRMATIVE: [&str; 11] = [
    "yes", "y", "yeah", "yep", "sure", "ok", "okay", "confirm", "confirmed", "do it", "proceed",
];
const NEGATIVE: [&str; 6] = ["no", "n", "nope", "cancel", "abort", "never mind"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Affirmative,
    Negative,
    Other,
}

pub struct ControlLoop<C: Console> {
    parser: CommandParser,
    dispatcher: ActionDispatcher,
    console: C,
    state: LoopState,
    /// Gated action from the previous cycle, valid for one cycle only
    pending: Option<ActionDescriptor>,
    carry_confirmation: bool,
    emission: Emission,
    failures: u32,
}

impl<C: Console> ControlLoop<C> {
    pub fn new(
        parser: CommandParser,
        dispatcher: ActionDispatcher,
        console: C,
        session: &SessionConfig,
    ) -> Self {
        let emission = if session.background_speech {
            Emission::Background
        } else {
            Emission::Blocking
        };
        Self {
            parser,
            dispatcher,
            console,
            state: LoopState::Running,
            pending: None,
            carry_confirmation: session.carry_confirmation,
            emission,
            failures: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending(&self) -> Option<&ActionDescriptor> {
        self.pending.as_ref()
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run cycles until terminated.
    ///
    /// `interrupt` resolving ends the session at once, abandoning any cycle
    /// in flight (a running shell command is killed with it).
    pub async fn run<F>(&mut self, interrupt: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        while self.state == LoopState::Running {
            let outcome = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                result = self.cycle() => Some(result),
            };

            match outcome {
                None => self.interrupted().await,
                Some(Ok(())) => self.failures = 0,
                Some(Err(e)) => self.recover(e).await,
            }
        }

        tracing::info!("Session terminated");
    }

    /// One listen/think/act/emit pass
    pub async fn cycle(&mut self) -> Result<()> {
        let Some(heard) = self.console.listen().await? else {
            return Ok(());
        };

        let utterance = match heard {
            Heard::Utterance(text) => text,
            Heard::Timeout => return Ok(()),
            Heard::Unclear => return self.say(UNCLEAR_REPLY).await,
            Heard::ServiceError(detail) | Heard::OtherError(detail) => {
                tracing::warn!(%detail, "Input capture failed");
                return self.say(HEARING_TROUBLE).await;
            }
            Heard::Closed => return self.terminate().await,
        };

        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Ok(());
        }
        if is_exit_phrase(utterance) {
            return self.terminate().await;
        }

        if let Some(pending) = self.pending.take() {
            match classify_reply(utterance) {
                Reply::Affirmative => {
                    tracing::info!(action = %pending.action, "Pending action confirmed");
                    let envelope = self.dispatcher.dispatch(&pending.confirmed()).await;
                    return self.say(&envelope.message).await;
                }
                Reply::Negative => {
                    return self.say(&format!("Cancelled {}.", pending.action)).await;
                }
                Reply::Other => {
                    tracing::debug!(action = %pending.action, "Pending action dropped");
                }
            }
        }

        tracing::info!(%utterance, "Processing utterance");
        let descriptor = self.parser.think(utterance).await;
        self.handle(descriptor).await
    }

    async fn handle(&mut self, descriptor: ActionDescriptor) -> Result<()> {
        let conversational = self
            .dispatcher
            .catalog()
            .spec(&descriptor.action)
            .map(|spec| spec.kind)
            .filter(|kind| kind.is_conversational());

        if let Some(kind) = conversational {
            let message = descriptor
                .message()
                .or(kind.default_message())
                .unwrap_or_default()
                .to_string();
            return self.say(&message).await;
        }

        let envelope = self.dispatcher.dispatch(&descriptor).await;

        if self.carry_confirmation
            && self
                .dispatcher
                .awaits_confirmation(&descriptor.action, &descriptor.params)
        {
            self.pending = Some(descriptor);
            return self
                .say(&format!("{} {}", envelope.message, CONFIRM_HINT))
                .await;
        }

        self.say(&envelope.message).await
    }

    async fn say(&mut self, message: &str) -> Result<()> {
        self.console.emit(message, self.emission).await
    }

    async fn terminate(&mut self) -> Result<()> {
        self.state = LoopState::Terminated;
        self.pending = None;
        self.console.emit(FAREWELL, Emission::Blocking).await
    }

    async fn interrupted(&mut self) {
        tracing::info!("Interrupted by user");
        if let Err(e) = self.terminate().await {
            tracing::error!(error = %e, "Failed to emit farewell");
        }
    }

    async fn recover(&mut self, error: AgentError) {
        self.failures += 1;
        tracing::error!(error = %error, failures = self.failures, "Cycle failed");
        if self.state != LoopState::Running {
            return;
        }
        if let Err(e) = self.console.emit(APOLOGY, Emission::Blocking).await {
            tracing::error!(error = %e, "Failed to emit apology");
        }

        if self.failures >= MAX_CONSECUTIVE_FAILURES {
            tracing::error!("Console keeps failing, ending session");
            if let Err(e) = self.terminate().await {
                tracing::error!(error = %e, "Failed to emit farewell");
            }
            return;
        }
        tokio::time::sleep(FAILURE_BACKOFF * self.failures).await;
    }
}

pub fn is_exit_phrase(utterance: &str) -> bool {
    let lower = utterance.trim().to_lowercase();
    EXIT_PHRASES.contains(&lower.as_str())
}

fn classify_reply(utterance: &str) -> Reply {
    let lower = utterance
        .trim()
        .trim_end_matches(|c: char| c == '.' || c == '!')
        .to_lowercase();
    if AFFIRMATIVE.contains(&lower.as_str()) {
        Reply::Affirmative
    } else if NEGATIVE.contains(&lower.as_str()) {
        Reply::Negative
    } else {
        Reply::Other
    }
}
