use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use orderdesk_core::Order;

use crate::contracts::SourceError;
use crate::contracts::SubmitOutcome;
use crate::schedule::CancelToken;
use crate::source::fetch_orders;
use crate::source::OrderSource;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Fetched {
        fetch_id: u64,
        result: Result<Vec<Order>, SourceError>,
    },
    Submitted {
        order_id: String,
        outcome: SubmitOutcome,
    },
}

/// Runs one fetch off the UI thread. Nothing is sent once `token` is cancelled.
pub fn spawn_fetch(
    source: Arc<dyn OrderSource>,
    fetch_id: u64,
    token: CancelToken,
    tx: Sender<WorkerEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let result = fetch_orders(source.as_ref());
        if token.is_cancelled() {
            tracing::debug!(fetch_id, "fetch cancelled; dropping result");
            return;
        }
        if let Err(err) = &result {
            tracing::warn!(fetch_id, error = %err, "fetch failed");
        }
        let _ = tx.send(WorkerEvent::Fetched { fetch_id, result });
    })
}

pub fn spawn_submit(
    source: Arc<dyn OrderSource>,
    order: Order,
    token: CancelToken,
    tx: Sender<WorkerEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let outcome = source.submit(&order);
        if token.is_cancelled() {
            return;
        }
        let _ = tx.send(WorkerEvent::Submitted {
            order_id: order.id().to_string(),
            outcome,
        });
    })
}
