//! A guided fix: guide state machine plus its observer

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedReceiver;

use crate::models::pattern::{Pattern, StepProgress};

use super::observer::{GuideObserver, ViewSource};
use super::{GuideEvent, GuideState, Options, RealTimeGuide};

pub struct GuideSession {
    guide: Arc<Mutex<RealTimeGuide>>,
    observer: GuideObserver,
    events: UnboundedReceiver<GuideEvent>,
}

impl GuideSession {
    /// Start guiding through `pattern` while observing `source`.
    ///
    /// Returns `None` when the pattern has no manual steps.
    pub fn start(pattern: &Pattern, source: Arc<dyn ViewSource>, options: &Options) -> Option<Self> {
        let (mut guide, events) = RealTimeGuide::new();
        guide.start(pattern)?;

        let guide = Arc::new(Mutex::new(guide));
        let observer = GuideObserver::spawn(guide.clone(), source, options);
        Some(Self {
            guide,
            observer,
            events,
        })
    }

    fn with_guide<T>(&self, f: impl FnOnce(&mut RealTimeGuide) -> T) -> T {
        let mut guide = self.guide.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guide)
    }

    /// Report an editor change
    pub fn notify_change(&self) {
        self.observer.notify_change();
    }

    /// Next guide event, `None` once the session is over and drained
    pub async fn next_event(&mut self) -> Option<GuideEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<GuideEvent> {
        self.events.try_recv().ok()
    }

    pub fn confirm(&self) -> bool {
        let advanced = self.with_guide(|g| g.confirm());
        self.stop_when_done();
        advanced
    }

    /// Skip the current step. Finishing the last one ends observation.
    pub fn force_next_step(&self) -> bool {
        let advanced = self.with_guide(|g| g.force_next_step());
        self.stop_when_done();
        advanced
    }

    fn stop_when_done(&self) {
        if !self.with_guide(|g| g.is_guiding()) {
            self.observer.stop();
        }
    }

    pub fn progress(&self) -> Option<StepProgress> {
        self.with_guide(|g| g.current_step())
    }

    pub fn state(&self) -> GuideState {
        self.with_guide(|g| g.state())
    }

    /// Stop guiding and observing. Idempotent.
    pub fn stop(&self) {
        self.with_guide(|g| g.stop());
        self.observer.stop();
    }

    pub fn is_observing(&self) -> bool {
        !self.observer.is_finished()
    }
}
