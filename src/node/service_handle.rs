use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long `shutdown()` lets in-flight requests drain.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

struct NamedTask {
    name: &'static str,
    handle: JoinHandle<Result<()>>,
}

/// Background tasks of a running notary plus the stop signal they watch.
pub struct ServiceHandle {
    stop_tx: watch::Sender<bool>,
    tasks: Vec<NamedTask>,
    drain_timeout: Duration,
}

impl ServiceHandle {
    /// New handle and the first receiver of its stop signal.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (stop_tx, stop_rx) = watch::channel(false);
        (Self { stop_tx, tasks: Vec::new(), drain_timeout: DEFAULT_DRAIN_TIMEOUT }, stop_rx)
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    pub fn attach(&mut self, name: &'static str, handle: JoinHandle<Result<()>>) {
        self.tasks.push(NamedTask { name, handle });
    }

    /// True once every attached task has exited.
    pub fn all_finished(&self) -> bool {
        self.tasks.iter().all(|t| t.handle.is_finished())
    }

    /// Signal stop, then wait for each task; tasks still running after the
    /// drain timeout are aborted.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.stop_tx.send(true);

        for NamedTask { name, mut handle } in self.tasks {
            match tokio::time::timeout(self.drain_timeout, &mut handle).await {
                Ok(Ok(Ok(()))) => info!(task = name, "stopped"),
                Ok(Ok(Err(e))) => error!(task = name, "task returned error: {:?}", e),
                Ok(Err(e)) => error!(task = name, "task join error: {:?}", e),
                Err(_) => {
                    warn!(task = name, timeout = ?self.drain_timeout, "drain timed out, aborting");
                    handle.abort();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_signals_tasks() {
        let (mut svc, mut rx) = ServiceHandle::new();
        svc.attach("watcher", tokio::spawn(async move {
            rx.wait_for(|stop| *stop).await?;
            Ok(())
        }));
        assert!(!svc.all_finished());
        svc.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_task_does_not_fail_shutdown() {
        let (mut svc, _rx) = ServiceHandle::new();
        svc.attach("broken", tokio::spawn(async { Err(anyhow::anyhow!("boom")) }));
        svc.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stuck_task_is_aborted_after_drain_timeout() {
        let (svc, _rx) = ServiceHandle::new();
        let mut svc = svc.with_drain_timeout(Duration::from_millis(20));
        svc.attach("stuck", tokio::spawn(async {
            std::future::pending::<()>().await;
            Ok(())
        }));
        svc.shutdown().await.unwrap();
    }
}
