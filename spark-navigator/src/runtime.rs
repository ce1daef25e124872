use crate::config::{NavigatorConfig, SettleMode};
use crate::dispatch::CommandDispatcher;
use crate::navigate::engine::{Maneuver, NavigationEngine};
use anyhow::Result;
use log::{debug, info, warn};
use spark_detect::DetectionSource;
use spark_transport::{AnnouncementSink, MotionSink};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Maneuver batches waiting for the actuation task.
const ACTUATION_QUEUE_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub maneuvers: u64,
    pub failed_maneuvers: u64,
    pub sequence_id: u32,
}

/// The control loop: read a frame, decide, dispatch.
pub struct Navigator<S, M, A> {
    engine: NavigationEngine,
    source: S,
    dispatcher: Arc<CommandDispatcher<M, A>>,
    settle_mode: SettleMode,
}

impl<S, M, A> Navigator<S, M, A>
where
    S: DetectionSource,
    M: MotionSink + 'static,
    A: AnnouncementSink + 'static,
{
    /// The dispatcher shares the engine's sequence counter.
    pub fn new(config: &NavigatorConfig, source: S, motion: M, announcer: A) -> Self {
        let engine = NavigationEngine::new(config);
        let dispatcher = CommandDispatcher::new(motion, announcer, engine.sequence());
        Self {
            engine,
            source,
            dispatcher: Arc::new(dispatcher),
            settle_mode: config.maneuver.settle_mode,
        }
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    /// Runs until the source is exhausted or `shutdown` resolves.
    ///
    /// In blocking mode every maneuver is dispatched before the next frame is read.
    /// In cooldown mode maneuvers go to a separate actuation task and frames keep
    /// flowing; the engine suppresses decisions until the settle window closes.
    /// Maneuvers already queued are still carried out before this returns.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        let (tx, worker) = match self.settle_mode {
            SettleMode::Blocking => (None, None),
            SettleMode::Cooldown => {
                let (tx, mut rx) = mpsc::channel::<Vec<Maneuver>>(ACTUATION_QUEUE_DEPTH);
                let dispatcher = Arc::clone(&self.dispatcher);
                let worker = tokio::spawn(async move {
                    let mut failed = 0u64;
                    while let Some(batch) = rx.recv().await {
                        failed += dispatcher.execute_all(&batch).await as u64;
                    }
                    failed
                });
                (Some(tx), Some(worker))
            }
        };

        tokio::pin!(shutdown);
        loop {
            let frame = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Stop signal received");
                    break;
                }
                frame = self.source.next_frame() => frame?,
            };
            let Some(frame) = frame else {
                info!("Detection input exhausted");
                break;
            };
            summary.frames += 1;

            let maneuvers = self.engine.process_frame(&frame, Instant::now());
            if maneuvers.is_empty() {
                continue;
            }
            summary.maneuvers += maneuvers.len() as u64;

            match &tx {
                Some(tx) => {
                    if tx.send(maneuvers).await.is_err() {
                        warn!("Actuation task stopped; dropping maneuvers");
                    }
                }
                None => {
                    let failed = self.dispatcher.execute_all(&maneuvers).await;
                    summary.failed_maneuvers += failed as u64;
                }
            }
        }

        drop(tx);
        if let Some(worker) = worker {
            debug!("Waiting for queued maneuvers");
            summary.failed_maneuvers += worker.await?;
        }

        summary.sequence_id = self.engine.sequence_id();
        info!(
            "Processed {} frame(s), {} maneuver(s), {} failed, next sequence id {}",
            summary.frames, summary.maneuvers, summary.failed_maneuvers, summary.sequence_id
        );
        Ok(summary)
    }
}
