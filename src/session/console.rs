//! Input/output collaborators for the control loop

use crate::core::error::{AgentError, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

/// One result from the input side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    Utterance(String),
    /// Nobody spoke before the capture window closed
    Timeout,
    /// Sound was captured but not recognized
    Unclear,
    /// The recognition service failed
    ServiceError(String),
    OtherError(String),
    /// Input is exhausted (end of file, closed pipe)
    Closed,
}

/// How `emit` relates to the next `listen`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emission {
    /// Return once the message has been fully delivered
    #[default]
    Blocking,
    /// Start delivery and return immediately. The next listen may begin
    /// before the message has finished playing.
    Background,
}

#[async_trait]
pub trait Console: Send {
    /// Wait for the next input. `Ok(None)` means nothing this cycle.
    async fn listen(&mut self) -> Result<Option<Heard>>;

    async fn emit(&mut self, message: &str, emission: Emission) -> Result<()>;
}

/// Line-oriented console over any async reader/writer pair
pub struct TextConsole<R, W> {
    reader: R,
    writer: W,
    prompt: &'static str,
}

impl TextConsole<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> TextConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            prompt: "You: ",
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> Console for TextConsole<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn listen(&mut self) -> Result<Option<Heard>> {
        self.writer.write_all(self.prompt.as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(|e| AgentError::ConsoleError(format!("Failed to read input: {}", e)))?;

        if read == 0 {
            return Ok(Some(Heard::Closed));
        }
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        Ok(Some(Heard::Utterance(line.to_string())))
    }

    /// Text output is immediate, so both emission modes behave the same
    async fn emit(&mut self, message: &str, _emission: Emission) -> Result<()> {
        self.writer
            .write_all(format!("Agent: {}\n", message).as_bytes())
            .await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_console_reads_lines() {
        let input: &[u8] = b"open notepad\n\n  hello  \n";
        let mut console = TextConsole::new(input, Vec::new());

        assert_eq!(
            console.listen().await.unwrap(),
            Some(Heard::Utterance("open notepad".into()))
        );
        assert_eq!(console.listen().await.unwrap(), None);
        assert_eq!(
            console.listen().await.unwrap(),
            Some(Heard::Utterance("hello".into()))
        );
        assert_eq!(console.listen().await.unwrap(), Some(Heard::Closed));
    }

    #[tokio::test]
    async fn test_text_console_emit_format() {
        let input: &[u8] = b"";
        let mut console = TextConsole::new(input, Vec::new());
        console.emit("Hello", Emission::Blocking).await.unwrap();
        console.emit("Bye", Emission::Background).await.unwrap();

        let written = String::from_utf8(console.into_writer()).unwrap();
        assert_eq!(written, "Agent: Hello\nAgent: Bye\n");
    }
}
