use std::sync::Arc;
use std::time::Duration;

use crate::protocol::message::PartialResult;
use crate::reducer::errors::CoordinationError;
use crate::reducer::monitor::RequestMonitor;

fn sales(category: &str, count: u64) -> PartialResult {
    PartialResult::CategorySales(vec![(category.to_string(), count)])
}

#[tokio::test]
async fn wait_blocks_until_delivery() {
    let monitor = Arc::new(RequestMonitor::new());

    let waiter = {
        let monitor = Arc::clone(&monitor);
        tokio::spawn(async move { monitor.wait().await })
    };

    // Give the waiter time to park before delivering.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    monitor.deliver(sales("pizza", 3)).unwrap();
    assert_eq!(waiter.await.unwrap(), sales("pizza", 3));
}

#[tokio::test]
async fn delivery_before_wait_is_not_lost() {
    let monitor = RequestMonitor::new();
    monitor.deliver(sales("burger", 1)).unwrap();

    assert!(monitor.is_resolved());
    assert_eq!(monitor.wait().await, sales("burger", 1));
}

#[tokio::test]
async fn second_delivery_is_refused() {
    let monitor = RequestMonitor::new();
    monitor.deliver(sales("pizza", 3)).unwrap();

    let err = monitor.deliver(sales("pizza", 99)).unwrap_err();
    assert!(matches!(err, CoordinationError::DoubleDelivery));

    // First value stands.
    assert_eq!(monitor.wait().await, sales("pizza", 3));
}

#[tokio::test]
async fn unresolved_monitor_keeps_blocking() {
    let monitor = RequestMonitor::new();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), monitor.wait()).await;
    assert!(timed_out.is_err(), "wait returned without a delivery");
    assert!(!monitor.is_resolved());
}
