//! Generation request lifecycle against a scripted client

mod common;

use codecraft::app::generation::{
    GenerationCoordinator, GenerationEvent, GenerationStatus, TriggerOutcome, TriggerRejection,
};
use codecraft::app::preview::RenderEpoch;
use common::{let_tasks_run, new_buffer, wait_for_event, ScriptedClient};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Notify;

#[tokio::test]
async fn test_blank_prompts_issue_no_request() {
    let client = Arc::new(ScriptedClient::replying("<p>never</p>"));
    let mut coordinator = GenerationCoordinator::new(client.clone(), Handle::current());

    for prompt in ["", "   ", "\n\t "] {
        assert_eq!(
            coordinator.trigger(prompt),
            TriggerOutcome::Rejected(TriggerRejection::EmptyPrompt)
        );
        assert!(!coordinator.can_trigger(prompt));
    }
    let_tasks_run().await;

    assert_eq!(client.calls(), 0);
    assert_eq!(coordinator.requests_issued(), 0);
    assert_eq!(coordinator.status(), &GenerationStatus::Idle);
}

#[tokio::test]
async fn test_trigger_while_in_flight_is_ignored() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::replying("<p>first</p>").gated(gate.clone()));
    let mut buffer = new_buffer("<p>start</p>");
    let mut coordinator = GenerationCoordinator::new(client.clone(), Handle::current());

    assert!(matches!(
        coordinator.trigger("a pomodoro timer"),
        TriggerOutcome::Started(_)
    ));
    let_tasks_run().await;
    assert!(coordinator.status().is_in_flight());

    assert_eq!(
        coordinator.trigger("something else entirely"),
        TriggerOutcome::Rejected(TriggerRejection::AlreadyInFlight)
    );
    assert!(coordinator.poll(&mut buffer).is_none());
    assert_eq!(buffer.source(), "<p>start</p>");

    gate.notify_one();
    let event = wait_for_event(&mut coordinator, &mut buffer).await;

    assert!(matches!(event, GenerationEvent::Succeeded { .. }));
    assert_eq!(client.calls(), 1);
    assert_eq!(coordinator.requests_issued(), 1);
    assert_eq!(buffer.source(), "<p>first</p>");
}

#[tokio::test(start_paused = true)]
async fn test_success_replaces_source_and_preview_together() {
    let client = Arc::new(ScriptedClient::replying("<h1>Todo</h1>"));
    let mut buffer = new_buffer("<p>start</p>");
    let mut coordinator = GenerationCoordinator::new(client, Handle::current());

    // An edit still waiting out the quiet period is superseded
    buffer.edit("<p>half-typed");
    assert!(buffer.publisher().has_pending());
    let before = buffer.published().epoch;

    coordinator.trigger("a todo app");
    let event = wait_for_event(&mut coordinator, &mut buffer).await;

    let expected_epoch = RenderEpoch::new(before.value() + 1);
    assert_eq!(event, GenerationEvent::Succeeded { epoch: expected_epoch });
    assert_eq!(coordinator.status(), &GenerationStatus::Succeeded);
    assert_eq!(buffer.source(), "<h1>Todo</h1>");
    assert_eq!(&*buffer.published().document, "<h1>Todo</h1>");
    assert_eq!(buffer.published().epoch, expected_epoch);
    assert!(!buffer.publisher().has_pending());

    // The superseded edit never lands
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(&*buffer.published().document, "<h1>Todo</h1>");
    assert_eq!(buffer.published().epoch, expected_epoch);
}

#[tokio::test]
async fn test_failure_leaves_documents_untouched() {
    let client = Arc::new(ScriptedClient::failing("quota exceeded"));
    let mut buffer = new_buffer("<p>keep me</p>");
    let mut coordinator = GenerationCoordinator::new(client, Handle::current());
    let published_before = buffer.published();

    coordinator.trigger("a landing page");
    let event = wait_for_event(&mut coordinator, &mut buffer).await;

    assert!(matches!(event, GenerationEvent::Failed { .. }));
    assert!(matches!(coordinator.status(), GenerationStatus::Failed(message) if message.contains("quota exceeded")));
    assert_eq!(buffer.source(), "<p>keep me</p>");
    assert_eq!(buffer.published(), published_before);

    // A failed request does not block the next one
    assert!(coordinator.can_trigger("try again"));
}

#[tokio::test]
async fn test_fenced_output_is_cleaned() {
    let client = Arc::new(ScriptedClient::replying("```html\n<p>x</p>\n```"));
    let mut buffer = new_buffer("");
    let mut coordinator = GenerationCoordinator::new(client, Handle::current());

    coordinator.trigger("a paragraph");
    wait_for_event(&mut coordinator, &mut buffer).await;

    assert_eq!(buffer.source(), "\n<p>x</p>\n");
    assert_eq!(&*buffer.published().document, "\n<p>x</p>\n");
}

#[tokio::test]
async fn test_blank_output_counts_as_failure() {
    let client = Arc::new(ScriptedClient::replying("```html\n   \n```"));
    let mut buffer = new_buffer("<p>old</p>");
    let mut coordinator = GenerationCoordinator::new(client, Handle::current());
    let published_before = buffer.published();

    coordinator.trigger("nothing");
    let event = wait_for_event(&mut coordinator, &mut buffer).await;

    assert!(matches!(event, GenerationEvent::Failed { .. }));
    assert_eq!(buffer.source(), "<p>old</p>");
    assert_eq!(buffer.published(), published_before);
}

#[tokio::test]
async fn test_listener_called_on_completion() {
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = completions.clone();
    let client = Arc::new(ScriptedClient::replying("<p>done</p>"));
    let mut buffer = new_buffer("");
    let mut coordinator = GenerationCoordinator::new(client, Handle::current())
        .with_listener(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

    coordinator.trigger("anything");
    wait_for_event(&mut coordinator, &mut buffer).await;

    assert_eq!(completions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_drop_cancels_in_flight_request() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::replying("<p>late</p>").gated(gate));
    let mut coordinator = GenerationCoordinator::new(client.clone(), Handle::current());

    coordinator.trigger("slow page");
    let_tasks_run().await;
    assert_eq!(client.calls(), 1);

    drop(coordinator);
    let_tasks_run().await;

    // Only the test still holds the client once the task has wound down
    assert_eq!(Arc::strong_count(&client), 1);
}
