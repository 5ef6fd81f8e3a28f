use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};

use crate::fetch::source::{FetchError, PointSource};
use crate::QueryPoint;

/// Period between query fetches when nothing else is configured.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(2);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefreshError {
    #[error("refresh period must be greater than zero")]
    ZeroPeriod,
}

/// Outcome of one query fetch, tagged with the tick that issued it.
#[derive(Debug)]
pub struct QueryFetch {
    pub seq: u64,
    pub result: Result<QueryPoint, FetchError>,
}

/// Handle to a running refresh task. Dropping it aborts the task.
#[derive(Debug)]
pub struct RefreshHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Stops the timer, cancels fetches still in flight and waits for the
    /// task to finish.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Starts polling `source` for the query point: once immediately, then every
/// `period`. Every tick issues its own fetch even if earlier ones are still
/// outstanding, so outcomes arrive in completion order, not tick order.
pub fn spawn_query_refresh<P>(
    source: Arc<P>,
    period: Duration,
) -> Result<(RefreshHandle, mpsc::UnboundedReceiver<QueryFetch>), RefreshError>
where
    P: PointSource + ?Sized + 'static,
{
    if period.is_zero() {
        return Err(RefreshError::ZeroPeriod);
    }
    let (tx, rx) = mpsc::unbounded_channel();
    let (stop_tx, mut stop_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inflight = JoinSet::new();
        let mut seq = 0u64;

        info!("query refresh started, period {:?}", period);
        loop {
            tokio::select! {
                _ = &mut stop_rx => break,
                _ = ticker.tick() => {
                    seq += 1;
                    debug!("issuing query fetch #{seq}");
                    let source = Arc::clone(&source);
                    let tx = tx.clone();
                    let this_seq = seq;
                    inflight.spawn(async move {
                        let result = source.fetch_query().await;
                        let _ = tx.send(QueryFetch { seq: this_seq, result });
                    });
                }
                Some(_) = inflight.join_next(), if !inflight.is_empty() => {}
            }
        }
        inflight.abort_all();
        info!("query refresh stopped after {seq} fetches");
    });

    Ok((
        RefreshHandle {
            stop: Some(stop_tx),
            task: Some(task),
        },
        rx,
    ))
}
