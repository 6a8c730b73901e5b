use std::io::Write;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::{CompletionService, InputSource, TurnRenderer};
use crate::domain::{DomainError, RequestError, Transcript, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Terminated,
}

/// The interactive conversation loop.
///
/// Reads a line, appends it as a user turn, sends the whole transcript to the
/// completion service, appends and prints the reply, and repeats until input
/// runs out or a call fails. The completion service is borrowed for the
/// lifetime of the session; the transcript is owned by it.
pub struct ChatSessionUseCase<'a> {
    completion: &'a dyn CompletionService,
    renderer: &'a dyn TurnRenderer,
    transcript: Transcript,
    state: SessionState,
}

impl<'a> ChatSessionUseCase<'a> {
    pub fn new(completion: &'a dyn CompletionService, renderer: &'a dyn TurnRenderer) -> Self {
        Self {
            completion,
            renderer,
            transcript: Transcript::new(),
            state: SessionState::AwaitingInput,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the loop to completion.
    ///
    /// Returns `Ok(())` on end of input. A failed or cancelled completion call
    /// ends the session and is returned unchanged; the user turn that
    /// triggered it stays in the transcript.
    pub async fn execute<I, W>(
        &mut self,
        input: &mut I,
        output: &mut W,
        cancel: &CancellationToken,
    ) -> Result<(), DomainError>
    where
        I: InputSource + ?Sized,
        W: Write + ?Sized,
    {
        if self.state == SessionState::Terminated {
            debug!("Session already terminated; nothing to do");
            return Ok(());
        }

        let result = self.converse(input, output, cancel).await;
        self.state = SessionState::Terminated;

        match &result {
            Ok(()) => info!(
                "Input exhausted after {} turns; ending session",
                self.transcript.len()
            ),
            Err(e) => warn!(
                "Session aborted with {} turns in transcript: {}",
                self.transcript.len(),
                e
            ),
        }

        result
    }

    async fn converse<I, W>(
        &mut self,
        input: &mut I,
        output: &mut W,
        cancel: &CancellationToken,
    ) -> Result<(), DomainError>
    where
        I: InputSource + ?Sized,
        W: Write + ?Sized,
    {
        let mut out = WriteAdapter(output);
        self.renderer.banner(&mut out)?;

        loop {
            self.renderer.prompt(&mut out)?;
            out.flush()?;

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Cancelled while awaiting input");
                    None
                }
                line = input.next_line() => line?,
            };
            let Some(line) = next else {
                return Ok(());
            };

            self.transcript.append(Turn::user_text(line));
            debug!(
                "Sending turn {} ({} turns in transcript)",
                self.transcript.len() / 2 + 1,
                self.transcript.len()
            );

            let start_time = Instant::now();
            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(RequestError::Cancelled),
                reply = self.completion.complete(self.transcript.snapshot()) => reply,
            }?;
            debug!(
                "Reply with {} content blocks in {:?}",
                reply.content().len(),
                start_time.elapsed()
            );

            self.transcript.append(reply);
            if let Some(turn) = self.transcript.last() {
                self.renderer.reply(&mut out, turn)?;
            }
            out.flush()?;
        }
    }
}

/// Lets an unsized writer be handed to the renderer as `&mut dyn Write`.
struct WriteAdapter<'w, W: Write + ?Sized>(&'w mut W);

impl<W: Write + ?Sized> Write for WriteAdapter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}
