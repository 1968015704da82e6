use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use loader_engine::{ControllerSettings, FetchFailure, LoadController, Phase, Presentation};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LookupError {
    NotFound,
}

type Controller = LoadController<&'static str, String, LookupError>;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(loader_logging::initialize_for_tests);
}

/// Every identity takes one second; `"B"` always fails with `NotFound`.
fn spawn_catalog(calls: Arc<AtomicUsize>) -> Controller {
    let fetcher = move |id: &'static str| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(1)).await;
            match id {
                "B" => Err(FetchFailure::Failed(LookupError::NotFound)),
                other => Ok(format!("data{other}")),
            }
        }
    };
    LoadController::spawn(fetcher, "A", ControllerSettings::labelled("catalog")).expect("spawn")
}

#[tokio::test(start_paused = true)]
async fn loads_once_and_ignores_reannouncement() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = spawn_catalog(calls.clone());
    assert_eq!(controller.current_phase(), Phase::Idle);

    controller.on_identity_changed("A");
    controller.flush().await.unwrap();
    assert_eq!(controller.current_phase(), Phase::Loading);

    let operation = controller
        .wait_for(|op| op.phase.is_loaded())
        .await
        .unwrap();
    assert_eq!(operation.id, "A");
    assert_eq!(operation.phase, Phase::Loaded("dataA".to_string()));

    controller.on_identity_changed("A");
    controller.on_identity_changed("A");
    controller.flush().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.current_phase(), Phase::Loaded("dataA".to_string()));
}

#[tokio::test(start_paused = true)]
async fn failure_waits_for_explicit_retry() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = spawn_catalog(calls.clone());

    controller.on_identity_changed("B");
    controller
        .wait_for(|op| op.phase.is_error())
        .await
        .unwrap();
    assert_eq!(
        controller.current_phase(),
        Phase::Error(LookupError::NotFound)
    );

    controller.on_identity_changed("B");
    controller.flush().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        controller.current_phase(),
        Phase::Error(LookupError::NotFound)
    );

    controller.retry();
    controller.flush().await.unwrap();
    assert_eq!(controller.current_phase(), Phase::Loading);
    controller
        .wait_for(|op| op.phase.is_error())
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_handle_from_presentation_refetches() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = spawn_catalog(calls.clone());

    controller.on_identity_changed("B");
    controller
        .wait_for(|op| op.phase.is_error())
        .await
        .unwrap();

    let retry = match controller.present() {
        Presentation::Failed { error, retry } => {
            assert_eq!(error, LookupError::NotFound);
            retry
        }
        other => panic!("expected failure presentation, got {other:?}"),
    };

    retry.retry();
    controller.flush().await.unwrap();
    assert!(matches!(controller.present(), Presentation::Loading));
    controller
        .wait_for(|op| op.phase.is_error())
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn switching_away_from_error_loads_new_identity() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let controller = spawn_catalog(calls.clone());

    controller.on_identity_changed("B");
    controller
        .wait_for(|op| op.phase.is_error())
        .await
        .unwrap();

    controller.on_identity_changed("C");
    let operation = controller
        .wait_for(|op| op.phase.is_loaded())
        .await
        .unwrap();
    assert_eq!(operation.id, "C");
    assert!(matches!(controller.present(), Presentation::Content(data) if data == "dataC"));
}

/// `"slow"` resolves after five seconds, anything else after one.
fn spawn_racing(cancel_superseded: bool, finished: Arc<Mutex<Vec<&'static str>>>) -> Controller {
    let fetcher = move |id: &'static str| {
        let finished = finished.clone();
        async move {
            let delay = if id == "slow" { 5 } else { 1 };
            tokio::time::sleep(Duration::from_secs(delay)).await;
            finished.lock().unwrap().push(id);
            Ok::<_, FetchFailure<LookupError>>(format!("data-{id}"))
        }
    };
    let settings = ControllerSettings {
        cancel_superseded,
        ..ControllerSettings::labelled("racing")
    };
    LoadController::spawn(fetcher, "slow", settings).expect("spawn")
}

#[tokio::test(start_paused = true)]
async fn newer_identity_wins_and_superseded_fetch_is_cancelled() {
    init_logging();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let controller = spawn_racing(true, finished.clone());

    controller.on_identity_changed("slow");
    controller.on_identity_changed("fast");
    let operation = controller
        .wait_for(|op| op.phase.is_loaded())
        .await
        .unwrap();
    assert_eq!(operation.id, "fast");

    tokio::time::sleep(Duration::from_secs(10)).await;
    controller.flush().await.unwrap();
    assert_eq!(*finished.lock().unwrap(), vec!["fast"]);
    assert_eq!(
        controller.current_phase(),
        Phase::Loaded("data-fast".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn late_result_of_superseded_fetch_is_discarded() {
    init_logging();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let controller = spawn_racing(false, finished.clone());

    controller.on_identity_changed("slow");
    controller.on_identity_changed("fast");
    controller
        .wait_for(|op| op.phase.is_loaded())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_secs(10)).await;
    controller.flush().await.unwrap();
    // The slow fetch ran to completion but its result never became current.
    assert_eq!(*finished.lock().unwrap(), vec!["fast", "slow"]);
    let operation = controller.operation();
    assert_eq!(operation.id, "fast");
    assert_eq!(operation.phase, Phase::Loaded("data-fast".to_string()));
}
