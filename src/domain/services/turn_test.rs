use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::model_list;
use super::model_set;
use super::run_turn;
use super::TurnConfig;
use crate::domain::models::Author;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::CompletionRequest;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;

enum Scripted {
    Reply(String),
    Stream(Vec<String>),
    Fail(String),
}

type CallLog = Arc<Mutex<Vec<CompletionRequest>>>;

struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    calls: CallLog,
}

impl ScriptedBackend {
    fn new(script: Vec<Scripted>) -> (BackendBox, CallLog) {
        let calls: CallLog = Arc::new(Mutex::new(vec![]));
        let backend = Box::new(ScriptedBackend {
            script: Mutex::new(VecDeque::from(script)),
            calls: calls.clone(),
        });

        return (backend, calls);
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn list_models<'a>(&'a self) -> Result<Vec<String>> {
        return Ok(vec![
            "llama3-70b-8192".to_string(),
            "llama3-8b-8192".to_string(),
        ]);
    }

    async fn complete<'a>(
        &self,
        request: CompletionRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());

        let entry = self.script.lock().unwrap().pop_front().unwrap();
        match entry {
            Scripted::Reply(text) => return Ok(text),
            Scripted::Stream(fragments) => {
                for fragment in &fragments {
                    tx.send(Event::CompletionDelta(fragment.to_string()))?;
                }
                return Ok(fragments.concat());
            }
            Scripted::Fail(detail) => bail!(detail),
        }
    }
}

fn turn_config(model: &str, stream: bool) -> TurnConfig {
    return TurnConfig {
        model: model.to_string(),
        fallback_model: "llama-3.1-8b-instant".to_string(),
        stream,
    };
}

fn transcript_fixture() -> Vec<Message> {
    return vec![
        Message::new(Author::Assistant, "How may I help you?"),
        Message::new(Author::User, "Say hi to the world"),
    ];
}

#[tokio::test]
async fn it_completes_with_the_primary_model() -> Result<()> {
    let (backend, calls) = ScriptedBackend::new(vec![Scripted::Reply("Hello world".to_string())]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let reply = run_turn(
        &backend,
        turn_config("llama3-70b-8192", false),
        transcript_fixture(),
        &tx,
    )
    .await?;

    assert_eq!(reply.author, Author::Assistant);
    assert_eq!(reply.text, "Hello world");
    assert_eq!(reply.message_type(), MessageType::Normal);

    let requests = calls.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "llama3-70b-8192");
    assert!(!requests[0].stream);
    assert_eq!(requests[0].messages.len(), 2);

    assert!(rx.try_recv().is_err());

    return Ok(());
}

#[tokio::test]
async fn it_streams_the_primary_reply() -> Result<()> {
    let (backend, _calls) = ScriptedBackend::new(vec![Scripted::Stream(vec![
        "Hel".to_string(),
        "lo".to_string(),
        " world".to_string(),
    ])]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let reply = run_turn(
        &backend,
        turn_config("llama3-70b-8192", true),
        transcript_fixture(),
        &tx,
    )
    .await?;

    // The streamed fragments concatenate to the same final content.
    assert_eq!(reply.text, "Hello world");

    let mut fragments = vec![];
    while let Ok(event) = rx.try_recv() {
        if let Event::CompletionDelta(text) = event {
            fragments.push(text);
        }
    }
    assert_eq!(fragments, vec!["Hel", "lo", " world"]);

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_exactly_once_on_failure() -> Result<()> {
    let (backend, calls) = ScriptedBackend::new(vec![
        Scripted::Fail("rate limited".to_string()),
        Scripted::Reply("OK".to_string()),
    ]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let reply = run_turn(
        &backend,
        turn_config("llama3-70b-8192", true),
        transcript_fixture(),
        &tx,
    )
    .await?;

    // The fallback reply is stored verbatim, the error draft is discarded.
    assert_eq!(reply.text, "OK");
    assert_eq!(reply.message_type(), MessageType::Normal);

    let requests = calls.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].model, "llama-3.1-8b-instant");
    assert!(!requests[1].stream);
    assert_eq!(requests[0].messages, requests[1].messages);

    // The draft was visible while the retry ran, embedding model and error.
    let notice = match rx.try_recv()? {
        Event::FallbackNotice(msg) => msg,
        _ => bail!("Wrong event from recv"),
    };
    assert!(notice.text.contains("llama3-70b-8192"));
    assert!(notice.text.contains("rate limited"));

    return Ok(());
}

#[tokio::test]
async fn it_reports_both_failures_in_one_message() -> Result<()> {
    let (backend, calls) = ScriptedBackend::new(vec![
        Scripted::Fail("404".to_string()),
        Scripted::Fail("timeout".to_string()),
    ]);
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();

    let reply = run_turn(
        &backend,
        turn_config("bad-model", false),
        transcript_fixture(),
        &tx,
    )
    .await?;

    assert_eq!(reply.author, Author::Assistant);
    assert_eq!(reply.message_type(), MessageType::Error);
    assert!(reply.text.contains("bad-model"));
    assert!(reply.text.contains("404"));
    assert!(reply.text.contains("timeout"));

    let requests = calls.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_lists_models_with_indexes() -> Result<()> {
    let (backend, _calls) = ScriptedBackend::new(vec![]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    model_list(&backend, &tx).await?;

    let msg = match rx.try_recv()? {
        Event::WorkerMessage(msg) => msg,
        _ => bail!("Wrong event from recv"),
    };
    assert_eq!(msg.text, "- (1) llama3-70b-8192\n- (2) llama3-8b-8192");

    return Ok(());
}

#[tokio::test]
async fn it_sets_a_model_by_name() -> Result<()> {
    let (backend, _calls) = ScriptedBackend::new(vec![]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    model_set(&backend, &tx, "llama3-8b-8192").await?;

    let msg = match rx.try_recv()? {
        Event::WorkerMessage(msg) => msg,
        _ => bail!("Wrong event from recv"),
    };
    assert_eq!(msg.message_type(), MessageType::Normal);
    assert_eq!(msg.text, "llama3-8b-8192 has entered the chat.");

    return Ok(());
}

#[tokio::test]
async fn it_sets_a_model_by_index() -> Result<()> {
    let (backend, _calls) = ScriptedBackend::new(vec![]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    model_set(&backend, &tx, "2").await?;

    let msg = match rx.try_recv()? {
        Event::WorkerMessage(msg) => msg,
        _ => bail!("Wrong event from recv"),
    };
    assert_eq!(msg.text, "llama3-8b-8192 has entered the chat.");

    return Ok(());
}

#[tokio::test]
async fn it_rejects_a_model_outside_the_allow_list() -> Result<()> {
    let (backend, _calls) = ScriptedBackend::new(vec![]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    model_set(&backend, &tx, "gpt-4").await?;

    let msg = match rx.try_recv()? {
        Event::WorkerMessage(msg) => msg,
        _ => bail!("Wrong event from recv"),
    };
    assert_eq!(msg.message_type(), MessageType::Error);
    assert!(msg.text.contains("gpt-4"));

    return Ok(());
}

#[tokio::test]
async fn it_rejects_an_out_of_range_model_index() -> Result<()> {
    let (backend, _calls) = ScriptedBackend::new(vec![]);
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    model_set(&backend, &tx, "9").await?;

    let msg = match rx.try_recv()? {
        Event::WorkerMessage(msg) => msg,
        _ => bail!("Wrong event from recv"),
    };
    assert_eq!(msg.message_type(), MessageType::Error);

    return Ok(());
}
