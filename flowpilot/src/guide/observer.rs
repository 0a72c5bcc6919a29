//! Observation loop driving a [`RealTimeGuide`]

use std::future::pending;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::predicates::EditorView;
use super::{Options, RealTimeGuide};

/// Where the observer reads the current editor view from
#[async_trait]
pub trait ViewSource: Send + Sync {
    async fn current_view(&self) -> EditorView;
}

/// Background task that checks the guide's current step after editor changes.
///
/// Change signals and poll ticks both funnel into one debounced check. A
/// signal pushes the pending check back; a tick only schedules one when none
/// is pending. The task ends on [`GuideObserver::stop`] or once the guide is
/// no longer guiding.
pub struct GuideObserver {
    signals: mpsc::UnboundedSender<()>,
    cancel: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl GuideObserver {
    pub fn spawn(
        guide: Arc<Mutex<RealTimeGuide>>,
        source: Arc<dyn ViewSource>,
        options: &Options,
    ) -> Self {
        let (signals, signal_rx) = mpsc::unbounded_channel();
        let (cancel, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run(guide, source, options.clone(), signal_rx, cancel_rx));

        Self {
            signals,
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Report that the editor changed
    pub fn notify_change(&self) {
        // the loop may already have ended
        let _ = self.signals.send(());
    }

    /// Stop observing. Safe to call repeatedly and from any task.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = handle.take() {
            handle.abort();
            debug!("Guide observer stopped");
        }
    }

    pub fn is_finished(&self) -> bool {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for GuideObserver {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    guide: Arc<Mutex<RealTimeGuide>>,
    source: Arc<dyn ViewSource>,
    options: Options,
    mut signals: mpsc::UnboundedReceiver<()>,
    mut cancel: watch::Receiver<bool>,
) {
    info!("Guide observer starting...");

    let mut poll = interval(options.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut deadline: Option<Instant> = None;

    loop {
        let scheduled = deadline;
        let pending_check = async move {
            match scheduled {
                Some(at) => sleep_until(at).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancel.changed() => {
                break;
            }
            Some(()) = signals.recv() => {
                deadline = Some(Instant::now() + options.debounce);
            }
            _ = poll.tick() => {
                if deadline.is_none() {
                    deadline = Some(Instant::now() + options.debounce);
                }
            }
            _ = pending_check => {
                deadline = None;
                let view = source.current_view().await;
                let mut guide = guide.lock().unwrap_or_else(|e| e.into_inner());
                guide.check(&view);
                if !guide.is_guiding() {
                    break;
                }
            }
        }
    }

    info!("Guide observer shutting down...");
}
