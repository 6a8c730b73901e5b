use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::CompletionService;
use crate::domain::{ContentBlock, RequestError, Turn};

enum Step {
    Reply(Turn),
    Fail(RequestError),
    Hang,
}

/// Deterministic in-process [`CompletionService`].
///
/// Replays a queue of canned outcomes in order and records every transcript
/// it was asked to complete. Once the queue is empty each further call fails
/// with a transport error.
#[derive(Default)]
pub struct ScriptedCompletion {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_text(self, text: impl Into<String>) -> Self {
        self.reply(Turn::assistant(vec![ContentBlock::text(text)]))
    }

    pub fn reply(self, turn: Turn) -> Self {
        self.push(Step::Reply(turn))
    }

    pub fn fail(self, error: RequestError) -> Self {
        self.push(Step::Fail(error))
    }

    /// Next call never completes; only cancellation ends it.
    pub fn hang(self) -> Self {
        self.push(Step::Hang)
    }

    /// Every transcript received so far, in call order.
    pub fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(self, step: Step) -> Self {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(step);
        }
        self
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, transcript: &[Turn]) -> Result<Turn, RequestError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(transcript.to_vec());
        }

        let step = self
            .steps
            .lock()
            .map_err(|_| RequestError::transport("script lock poisoned"))?
            .pop_front();

        match step {
            Some(Step::Reply(turn)) => Ok(turn),
            Some(Step::Fail(error)) => Err(error),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(RequestError::transport("no scripted reply left")),
        }
    }
}
