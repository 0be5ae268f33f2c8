use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use voxlate_core::{
    EngineErrorDescriptor, EngineErrorKind, RecognitionEvent, RecognizerConfig, RecognizerError,
    ResultSlot,
};
use voxlate_engine::{
    create_recognizer, EngineRegistry, Recognizer, RecognizerCallbacks, ScriptStep,
    ScriptedEngine, StdinEngine,
};

fn transcript_log() -> (Arc<Mutex<Vec<String>>>, RecognizerCallbacks, mpsc::UnboundedReceiver<()>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (end_tx, end_rx) = mpsc::unbounded_channel();
    let (l1, l2, l3, l4) = (log.clone(), log.clone(), log.clone(), log.clone());
    let callbacks = RecognizerCallbacks::new()
        .on_start(move || l1.lock().unwrap().push("start".to_string()))
        .on_interim(move |t| l2.lock().unwrap().push(format!("interim:{t}")))
        .on_final(move |t| l3.lock().unwrap().push(format!("final:{t}")))
        .on_error(move |e| l4.lock().unwrap().push(format!("error:{}", e.kind)))
        .on_end(move || {
            let _ = end_tx.send(());
        });
    (log, callbacks, end_rx)
}

async fn wait_for_end(rx: &mut mpsc::UnboundedReceiver<()>) {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for on_end")
        .expect("channel closed");
}

#[tokio::test]
async fn test_scripted_session_end_to_end() {
    let engine = ScriptedEngine::with_script(vec![
        ScriptStep::Batch(RecognitionEvent::new(0, vec![ResultSlot::interim("buenos")])),
        ScriptStep::Batch(RecognitionEvent::new(
            0,
            vec![ResultSlot::finalized("buenos dias "), ResultSlot::interim("que")],
        )),
        ScriptStep::Error(EngineErrorDescriptor::new(EngineErrorKind::Network, "flaky")),
        ScriptStep::Batch(RecognitionEvent::new(
            1,
            vec![ResultSlot::finalized("buenos dias"), ResultSlot::finalized(" que tal")],
        )),
    ]);
    let (log, callbacks, mut end_rx) = transcript_log();
    let config = RecognizerConfig {
        interim_results: true,
        continuous: false,
        language: Some("es-ES".to_string()),
    };
    let recognizer = Recognizer::new(Some(Box::new(engine)), config, callbacks);

    recognizer.start().await.unwrap();
    wait_for_end(&mut end_rx).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "start",
            "interim:buenos",
            "final:buenos dias",
            "interim:que",
            "error:network",
            "final:que tal",
        ]
    );
    assert!(!recognizer.is_listening());
}

#[tokio::test]
async fn test_registry_scripted_engine_start_stop() {
    let registry = EngineRegistry::new();
    let (log, callbacks, mut end_rx) = transcript_log();
    let recognizer = create_recognizer(&registry, "scripted", RecognizerConfig::default(), callbacks);

    recognizer.start().await.unwrap();
    recognizer.stop().await;
    wait_for_end(&mut end_rx).await;

    assert_eq!(*log.lock().unwrap(), vec!["start"]);
    assert!(!recognizer.is_listening());

    // A second session on the same handle works after the first ended
    recognizer.start().await.unwrap();
    recognizer.destroy().await;
    wait_for_end(&mut end_rx).await;
}

#[tokio::test]
async fn test_stdin_engine_with_interims() {
    let engine = StdinEngine::from_reader(&b"good morning everyone\n"[..]);
    let (log, callbacks, mut end_rx) = transcript_log();
    let config = RecognizerConfig {
        interim_results: true,
        ..Default::default()
    };
    let recognizer = Recognizer::new(Some(Box::new(engine)), config, callbacks);

    recognizer.start().await.unwrap();
    wait_for_end(&mut end_rx).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "start",
            "interim:good",
            "interim:good morning",
            "final:good morning everyone",
        ]
    );
}

#[tokio::test]
async fn test_host_without_capability() {
    let registry = EngineRegistry::empty();
    let (log, callbacks, _end_rx) = transcript_log();
    let recognizer = create_recognizer(&registry, "stdin", RecognizerConfig::default(), callbacks);

    for _ in 0..2 {
        match recognizer.start().await {
            Err(RecognizerError::CapabilityUnavailable(_)) => {}
            other => panic!("expected CapabilityUnavailable, got {other:?}"),
        }
        assert!(!recognizer.is_listening());
    }
    recognizer.stop().await;
    recognizer.destroy().await;
    assert!(log.lock().unwrap().is_empty());
}
