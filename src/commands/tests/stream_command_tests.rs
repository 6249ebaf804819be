use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

type Item = ProducedOutcome<&'static str, String>;

fn progress(items: Vec<Item>) -> impl Stream<Item = Item> {
    stream::iter(items)
}

#[tokio::test]
async fn test_execute_stream_without_producer() {
    let mut command: StreamCommand<&'static str> = StreamCommand::new();
    assert!(matches!(
        command.execute_stream(),
        Err(CommandError::NoOperation {
            command: "StreamCommand"
        })
    ));
}

#[tokio::test]
async fn test_forwards_elements_unmodified() {
    let mut command = StreamCommand::with_producer(|| {
        progress(vec![
            Ok(Outcome::running("a")),
            Ok(Outcome::running("b")),
            Ok(Outcome::success("done").with_details("1")),
        ])
    });
    let items: Vec<_> = command.execute_stream().unwrap().collect().await;
    assert_eq!(
        items,
        vec![
            Outcome::running("a"),
            Outcome::running("b"),
            Outcome::success("done").with_details("1"),
        ]
    );
    assert_eq!(command.last_result(), Some(Outcome::success("done").with_details("1")));
}

#[tokio::test]
async fn test_fault_ends_stream_with_single_failure() {
    let polled = Arc::new(AtomicUsize::new(0));
    let counter = polled.clone();
    let mut command = StreamCommand::with_producer(move || {
        let counter = counter.clone();
        progress(vec![
            Ok(Outcome::running("a")),
            Ok(Outcome::running("b")),
            Err(anyhow::anyhow!("camera unplugged")),
            Ok(Outcome::running("never")),
        ])
        .inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    });

    let items: Vec<_> = command.execute_stream().unwrap().collect().await;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Outcome::running("a"));
    assert_eq!(items[1], Outcome::running("b"));
    assert!(items[2].is_critical());
    assert_eq!(
        items[2].failure_or_none().map(String::as_str),
        Some("camera unplugged")
    );
    // No element past the fault was requested.
    assert_eq!(polled.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_panic_in_producer_stream_is_contained() {
    let mut command: StreamCommand<&'static str> = StreamCommand::with_producer(|| {
        stream::iter(0..3).map(|i| -> ProducedOutcome<&'static str, String> {
            if i == 1 {
                panic!("decoder crashed");
            }
            Ok(Outcome::running("tick"))
        })
    });
    let items: Vec<_> = command.execute_stream().unwrap().collect().await;
    assert_eq!(items.len(), 2);
    assert!(items[1].is_failure());
    assert!(command.last_result().unwrap().is_critical());
}

#[tokio::test]
async fn test_panic_while_building_producer() {
    let mut command: StreamCommand<&'static str> = StreamCommand::new();
    let items: Vec<_> = command
        .execute_stream_with(|| -> futures::stream::Empty<ProducedOutcome<&'static str, String>> {
            panic!("no producer")
        })
        .unwrap()
        .collect()
        .await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].failure_or_none().map(String::as_str), Some("no producer"));
}

#[tokio::test]
async fn test_each_execution_restarts_producer() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let mut command = StreamCommand::with_producer(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        progress(vec![Ok(Outcome::success("ok"))])
    });
    let first: Vec<_> = command.execute_stream().unwrap().collect().await;
    let second: Vec<_> = command.execute_stream().unwrap().collect().await;
    assert_eq!(first, second);
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
