use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;

use crate::protocol::frame::write_frame;
use crate::protocol::message::{PartialResult, WorkerFrame};
use crate::reducer::listener::ReplicationListener;

fn shops_named(names: &[&str]) -> PartialResult {
    use crate::domain::shop::{Location, Shop};
    PartialResult::Shops(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Shop {
                id: i as u32,
                name: name.to_string(),
                food_category: "pizza".to_string(),
                stars: 4.0,
                votes: 10,
                location: Location {
                    latitude: 0.0,
                    longitude: 0.0,
                },
                logo_path: String::new(),
                products: vec![],
            })
            .collect(),
    )
}

#[tokio::test]
async fn delivery_resolves_the_registered_monitor() {
    let (mut worker_side, reducer_side) = tokio::io::duplex(64 * 1024);
    let listener = ReplicationListener::spawn(1, reducer_side);

    let monitor = listener.register_monitor(42);

    write_frame(
        &mut worker_side,
        &WorkerFrame::Partial {
            request_id: 42,
            result: shops_named(&["S1"]),
        },
    )
    .await
    .unwrap();

    assert_eq!(monitor.wait().await, shops_named(&["S1"]));
}

#[tokio::test]
async fn delivery_before_registration_is_kept() {
    let (mut worker_side, reducer_side) = tokio::io::duplex(64 * 1024);
    let listener = ReplicationListener::spawn(1, reducer_side);

    write_frame(
        &mut worker_side,
        &WorkerFrame::Partial {
            request_id: 7,
            result: shops_named(&["S1", "S2"]),
        },
    )
    .await
    .unwrap();

    // Let the receive loop consume the frame before anyone registers.
    tokio::time::sleep(Duration::from_millis(20)).await;

    let monitor = listener.register_monitor(7);
    assert!(monitor.is_resolved());
    assert_eq!(monitor.wait().await, shops_named(&["S1", "S2"]));
}

#[tokio::test]
async fn register_twice_returns_the_same_instance() {
    let (_worker_side, reducer_side) = tokio::io::duplex(1024);
    let listener = ReplicationListener::spawn(1, reducer_side);

    let first = listener.register_monitor(3);
    let second = listener.register_monitor(3);
    assert!(Arc::ptr_eq(&first, &second));

    let other = listener.register_monitor(4);
    assert!(!Arc::ptr_eq(&first, &other));
}

#[tokio::test]
async fn connection_close_leaves_monitors_unresolved() {
    let (worker_side, reducer_side) = tokio::io::duplex(1024);
    let listener = ReplicationListener::spawn(1, reducer_side);

    let monitor = listener.register_monitor(9);
    drop(worker_side);

    // The loop exits; the monitor stays blocked forever (no failover).
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!monitor.is_resolved());
    let timed_out = tokio::time::timeout(Duration::from_millis(50), monitor.wait()).await;
    assert!(timed_out.is_err());
}

#[tokio::test]
async fn garbage_frame_terminates_the_loop_only() {
    let (mut worker_side, reducer_side) = tokio::io::duplex(1024);
    let listener = ReplicationListener::spawn(1, reducer_side);
    let monitor = listener.register_monitor(11);

    // A length prefix promising more than the cap is fatal to this reader.
    worker_side.write_u32(u32::MAX).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Registration still works against the dead listener; the monitor is
    // simply never resolved.
    assert!(!monitor.is_resolved());
    let again = listener.register_monitor(11);
    assert!(Arc::ptr_eq(&monitor, &again));
}

#[tokio::test]
async fn duplicate_partial_does_not_overwrite() {
    let (mut worker_side, reducer_side) = tokio::io::duplex(64 * 1024);
    let listener = ReplicationListener::spawn(1, reducer_side);
    let monitor = listener.register_monitor(5);

    write_frame(
        &mut worker_side,
        &WorkerFrame::Partial {
            request_id: 5,
            result: shops_named(&["first"]),
        },
    )
    .await
    .unwrap();
    write_frame(
        &mut worker_side,
        &WorkerFrame::Partial {
            request_id: 5,
            result: shops_named(&["second"]),
        },
    )
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(monitor.wait().await, shops_named(&["first"]));
}
