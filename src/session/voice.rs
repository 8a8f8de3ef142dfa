//! Voice console backed by external recognizer and synthesizer programs
//!
//! The recognizer prints what it heard on stdout, or one of the tokens
//! `ERROR:TIMEOUT`, `ERROR:UNCLEAR`, `ERROR:SERVICE:<detail>`,
//! `ERROR:<detail>`. The synthesizer receives the message as its last
//! argument.

use crate::core::config::VoiceConfig;
use crate::core::error::{AgentError, Result};
use crate::session::console::{Console, Emission, Heard};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub struct VoiceConsole {
    listen_command: Vec<String>,
    speak_command: Vec<String>,
    listen_timeout: Duration,
}

impl VoiceConsole {
    /// Build the console and run the one-time calibration command, if any
    pub async fn start(config: &VoiceConfig) -> Result<Self> {
        if config.listen_command.is_empty() || config.speak_command.is_empty() {
            return Err(AgentError::ConfigError(
                "voice mode needs listen_command and speak_command".into(),
            ));
        }

        if let Some(calibrate) = &config.calibrate_command {
            println!("Calibrating microphone for ambient noise... Please wait.");
            let status = program(calibrate)?
                .stdin(Stdio::null())
                .status()
                .await
                .map_err(|e| AgentError::ConsoleError(format!("Calibration failed: {}", e)))?;
            if !status.success() {
                tracing::warn!(?status, "Calibration command exited unsuccessfully");
            }
            println!("Microphone ready!");
        }

        Ok(Self {
            listen_command: config.listen_command.clone(),
            speak_command: config.speak_command.clone(),
            listen_timeout: Duration::from_secs(config.listen_timeout_secs),
        })
    }
}

#[async_trait]
impl Console for VoiceConsole {
    async fn listen(&mut self) -> Result<Option<Heard>> {
        println!("Listening...");
        let mut cmd = program(&self.listen_command)?;
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return Ok(Some(Heard::ServiceError(e.to_string()))),
        };

        let output = match tokio::time::timeout(self.listen_timeout, child.wait_with_output()).await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Ok(Some(Heard::OtherError(e.to_string()))),
            Err(_) => return Ok(Some(Heard::Timeout)),
        };

        let heard = parse_recognizer_output(&String::from_utf8_lossy(&output.stdout));
        if let Some(Heard::Utterance(text)) = &heard {
            println!("You said: {}", text);
        }
        Ok(heard)
    }

    async fn emit(&mut self, message: &str, emission: Emission) -> Result<()> {
        println!("Agent: {}", message);

        let mut cmd = program(&self.speak_command)?;
        cmd.arg(message)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                // Text was already printed, so a silent synthesizer is not fatal
                tracing::warn!(error = %e, "Speech synthesis unavailable");
                return Ok(());
            }
        };

        match emission {
            Emission::Blocking => {
                if let Err(e) = child.wait().await {
                    tracing::warn!(error = %e, "Speech synthesis failed");
                }
            }
            Emission::Background => {
                tokio::spawn(async move {
                    if let Err(e) = child.wait().await {
                        tracing::warn!(error = %e, "Speech synthesis failed");
                    }
                });
            }
        }
        Ok(())
    }
}

fn program(argv: &[String]) -> Result<Command> {
    let (first, rest) = argv
        .split_first()
        .ok_or_else(|| AgentError::ConfigError("empty voice command".into()))?;
    let mut cmd = Command::new(first);
    cmd.args(rest);
    Ok(cmd)
}

/// Map recognizer stdout to an input event; blank output is no input
pub fn parse_recognizer_output(raw: &str) -> Option<Heard> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    let heard = match text {
        "ERROR:TIMEOUT" => Heard::Timeout,
        "ERROR:UNCLEAR" => Heard::Unclear,
        _ => {
            if let Some(detail) = text.strip_prefix("ERROR:SERVICE:") {
                Heard::ServiceError(detail.to_string())
            } else if let Some(detail) = text.strip_prefix("ERROR:") {
                Heard::OtherError(detail.to_string())
            } else {
                Heard::Utterance(text.to_string())
            }
        }
    };
    Some(heard)
}
