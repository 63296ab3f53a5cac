use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::DuplexStream;

use crate::protocol::frame::write_frame;
use crate::protocol::message::{PartialResult, WorkerFrame, WorkerRef};
use crate::reducer::errors::CoordinationError;
use crate::reducer::listener::ReplicationListener;
use crate::reducer::pending::PendingRequest;

fn listener_set(ids: &[u32]) -> (HashMap<u32, Arc<ReplicationListener>>, Vec<DuplexStream>) {
    let mut listeners = HashMap::new();
    let mut worker_sides = Vec::new();
    for &id in ids {
        let (worker_side, reducer_side) = tokio::io::duplex(64 * 1024);
        listeners.insert(id, ReplicationListener::spawn(id, reducer_side));
        worker_sides.push(worker_side);
    }
    (listeners, worker_sides)
}

fn target(id: u32) -> WorkerRef {
    WorkerRef {
        worker_id: id,
        listener_id: id,
    }
}

fn sales(category: &str, count: u64) -> PartialResult {
    PartialResult::CategorySales(vec![(category.to_string(), count)])
}

#[tokio::test]
async fn resolve_all_completes_only_after_every_monitor() {
    let (listeners, mut worker_sides) = listener_set(&[1, 2, 3]);
    let pending =
        PendingRequest::prepare(42, &[target(1), target(2), target(3)], &listeners).unwrap();
    assert_eq!(pending.len(), 3);

    let collector = tokio::spawn(pending.resolve_all());

    // Two of three delivered: the request must still be blocked.
    for (i, side) in worker_sides.iter_mut().take(2).enumerate() {
        write_frame(
            side,
            &WorkerFrame::Partial {
                request_id: 42,
                result: sales("pizza", i as u64 + 1),
            },
        )
        .await
        .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!collector.is_finished());

    write_frame(
        &mut worker_sides[2],
        &WorkerFrame::Partial {
            request_id: 42,
            result: sales("burger", 9),
        },
    )
    .await
    .unwrap();

    let partials = collector.await.unwrap();
    assert_eq!(partials.len(), 3);
    assert!(partials.contains(&sales("burger", 9)));
}

#[tokio::test]
async fn unknown_listener_fails_preparation() {
    let (listeners, _worker_sides) = listener_set(&[1]);

    let err = PendingRequest::prepare(1, &[target(1), target(99)], &listeners).unwrap_err();
    assert!(matches!(err, CoordinationError::UnknownListener(99)));
}

#[tokio::test]
async fn single_target_request_resolves() {
    let (listeners, mut worker_sides) = listener_set(&[5]);
    let pending = PendingRequest::prepare(8, &[target(5)], &listeners).unwrap();

    write_frame(
        &mut worker_sides[0],
        &WorkerFrame::Partial {
            request_id: 8,
            result: sales("sushi", 4),
        },
    )
    .await
    .unwrap();

    assert_eq!(pending.resolve_all().await, vec![sales("sushi", 4)]);
}
