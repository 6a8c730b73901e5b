//! Session loop tests.
//!
//! Drive `ChatSessionUseCase` with in-memory input, a `Vec<u8>` output and a
//! scripted completion service.

use std::time::Duration;

use chat_agent::{
    ChatSessionUseCase, ContentBlock, LineInput, RequestError, Role, ScriptedCompletion,
    SessionState, TerminalRenderer, Turn,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn plain_renderer() -> TerminalRenderer {
    TerminalRenderer::default().with_color(false)
}

struct RunOutcome {
    result: Result<(), chat_agent::DomainError>,
    output: String,
    transcript: Vec<Turn>,
    state: SessionState,
}

async fn run_session(completion: &ScriptedCompletion, stdin: &str) -> RunOutcome {
    let renderer = plain_renderer();
    let mut session = ChatSessionUseCase::new(completion, &renderer);
    let mut input = LineInput::new(stdin.as_bytes());
    let mut output = Vec::new();

    let result = session
        .execute(&mut input, &mut output, &CancellationToken::new())
        .await;

    RunOutcome {
        result,
        output: String::from_utf8(output).expect("output is utf-8"),
        transcript: session.transcript().snapshot().to_vec(),
        state: session.state(),
    }
}

#[tokio::test]
async fn test_hello_scenario_prints_only_the_reply() {
    let completion = ScriptedCompletion::new().reply_text("Hi there!");

    let outcome = run_session(&completion, "Hello\n").await;

    assert!(outcome.result.is_ok());
    assert!(outcome.output.contains("Claude: Hi there!\n"));
    assert!(
        !outcome.output.contains("Hello"),
        "user input must not be echoed: {:?}",
        outcome.output
    );
    assert_eq!(outcome.transcript.len(), 2);
    assert_eq!(outcome.transcript[0], Turn::user_text("Hello"));
}

#[tokio::test]
async fn test_transcript_alternates_and_has_two_turns_per_input() {
    let completion = ScriptedCompletion::new()
        .reply_text("one")
        .reply_text("two")
        .reply_text("three");

    let outcome = run_session(&completion, "a\nb\nc\n").await;

    assert!(outcome.result.is_ok());
    assert_eq!(outcome.transcript.len(), 6);
    for (i, turn) in outcome.transcript.iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(turn.role(), expected, "turn {i}");
    }
}

#[tokio::test]
async fn test_each_request_is_the_full_history_up_to_the_new_user_turn() {
    let completion = ScriptedCompletion::new()
        .reply_text("first reply")
        .reply_text("second reply")
        .reply_text("third reply");

    let outcome = run_session(&completion, "first\nsecond\nthird\n").await;
    let requests = completion.requests();

    assert!(outcome.result.is_ok());
    assert_eq!(requests.len(), 3);
    for (k, request) in requests.iter().enumerate() {
        assert_eq!(request.len(), 2 * k + 1);
        assert_eq!(request.as_slice(), &outcome.transcript[..2 * k + 1]);
    }
}

#[tokio::test]
async fn test_end_of_input_without_turns_makes_no_calls() {
    let completion = ScriptedCompletion::new();

    let outcome = run_session(&completion, "").await;

    assert!(outcome.result.is_ok());
    assert_eq!(completion.call_count(), 0);
    assert!(outcome.transcript.is_empty());
    assert_eq!(outcome.state, SessionState::Terminated);
    assert_eq!(
        outcome.output,
        "Chat with Claude (use 'ctrl-c' to quit)\nYou: "
    );
}

#[tokio::test]
async fn test_failure_keeps_user_turn_and_aborts() {
    let completion = ScriptedCompletion::new()
        .reply_text("fine")
        .fail(RequestError::service(429, "rate_limit_error", "slow down"))
        .reply_text("never used");

    let outcome = run_session(&completion, "one\ntwo\nthree\n").await;

    let err = outcome.result.expect_err("second call fails");
    assert!(err.is_request_error());
    assert_eq!(
        err.to_string(),
        "Service error (429) rate_limit_error: slow down"
    );
    assert_eq!(completion.call_count(), 2, "no retry, no further turns");
    assert_eq!(outcome.transcript.len(), 3);
    assert_eq!(outcome.transcript[2], Turn::user_text("two"));
    assert_eq!(outcome.state, SessionState::Terminated);
}

#[tokio::test]
async fn test_non_text_blocks_are_kept_but_not_printed() {
    let tool_use = json!({
        "type": "tool_use",
        "id": "toolu_01",
        "name": "read_file",
        "input": {"path": "main.go"}
    });
    let completion = ScriptedCompletion::new().reply(Turn::assistant(vec![
        ContentBlock::from_value(tool_use.clone()),
        ContentBlock::text("Let me look."),
    ]));

    let outcome = run_session(&completion, "read main.go\n").await;

    assert!(outcome.result.is_ok());
    assert!(outcome.output.contains("Claude: Let me look.\n"));
    assert!(!outcome.output.contains("toolu_01"));
    assert!(!outcome.output.contains("tool_use"));

    let reply = &outcome.transcript[1];
    assert_eq!(reply.content().len(), 2);
    assert_eq!(reply.content()[0], ContentBlock::Other(tool_use));
}

#[tokio::test]
async fn test_empty_line_is_sent_as_is() {
    let completion = ScriptedCompletion::new().reply_text("You sent nothing.");

    let outcome = run_session(&completion, "\n").await;

    assert!(outcome.result.is_ok());
    assert_eq!(completion.requests()[0], vec![Turn::user_text("")]);
}

#[tokio::test]
async fn test_cancellation_mid_call_aborts_with_user_turn_kept() {
    let completion = ScriptedCompletion::new().hang();
    let renderer = plain_renderer();
    let mut session = ChatSessionUseCase::new(&completion, &renderer);
    let mut input = LineInput::new("Hello\n".as_bytes());
    let mut output = Vec::<u8>::new();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = session
        .execute(&mut input, &mut output, &cancel)
        .await
        .expect_err("cancelled call fails");

    assert!(err.is_cancelled());
    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript().last().map(Turn::role), Some(Role::User));
}

#[tokio::test]
async fn test_terminated_session_does_not_run_again() {
    let completion = ScriptedCompletion::new().reply_text("hi").reply_text("again");
    let renderer = plain_renderer();
    let mut session = ChatSessionUseCase::new(&completion, &renderer);
    let cancel = CancellationToken::new();

    let mut first = LineInput::new("hello\n".as_bytes());
    session
        .execute(&mut first, &mut Vec::<u8>::new(), &cancel)
        .await
        .expect("first run ends cleanly");

    let mut second = LineInput::new("more\n".as_bytes());
    let mut output = Vec::<u8>::new();
    session
        .execute(&mut second, &mut output, &cancel)
        .await
        .expect("terminated session returns immediately");

    assert_eq!(completion.call_count(), 1);
    assert!(output.is_empty());
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn test_non_utf8_line_is_sent_with_replacement_characters() {
    let completion = ScriptedCompletion::new().reply_text("Bonjour");
    let renderer = plain_renderer();
    let mut session = ChatSessionUseCase::new(&completion, &renderer);
    let mut input = LineInput::new(&b"caf\xe9\n"[..]);
    let mut output = Vec::<u8>::new();

    session
        .execute(&mut input, &mut output, &CancellationToken::new())
        .await
        .expect("invalid UTF-8 does not end the session");

    assert_eq!(completion.call_count(), 1);
    assert_eq!(
        completion.requests()[0],
        vec![Turn::user_text("caf\u{FFFD}")]
    );
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn test_cancellation_while_awaiting_input_ends_cleanly() {
    let completion = ScriptedCompletion::new().reply_text("never used");
    let renderer = plain_renderer();
    let mut session = ChatSessionUseCase::new(&completion, &renderer);

    // The writer half stays open, so the reader never yields a line.
    let (_writer, reader) = tokio::io::duplex(64);
    let mut input = LineInput::new(tokio::io::BufReader::new(reader));
    let mut output = Vec::<u8>::new();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        session.execute(&mut input, &mut output, &cancel),
    )
    .await
    .expect("cancellation ends the wait for input");

    assert!(result.is_ok(), "got {result:?}");
    assert_eq!(completion.call_count(), 0);
    assert!(session.transcript().is_empty());
    assert_eq!(session.state(), SessionState::Terminated);
}
