//! Real-time guidance through manual remediation steps.
//!
//! [`RealTimeGuide`] is the state machine; [`observer::GuideObserver`] drives
//! it from editor change signals and a fallback poll.

pub mod observer;
pub mod predicates;
pub mod session;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::models::pattern::{GuideStep, Pattern, StepProgress, StepTarget};

use self::predicates::{is_step_completed, EditorView};

/// Guide options
#[derive(Debug, Clone)]
pub struct Options {
    /// Quiet period after the last change signal before a check runs
    pub debounce: Duration,

    /// Fallback poll interval
    pub poll_interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GuideState {
    Idle,
    Guiding {
        #[serde(rename = "stepIndex")]
        step_index: usize,
    },
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GuideEvent {
    StepCompleted { index: usize, step: GuideStep },
    AllCompleted,
}

/// Tracks progress through one pattern's manual steps
pub struct RealTimeGuide {
    pattern_id: Option<String>,
    steps: Vec<GuideStep>,
    state: GuideState,
    events: UnboundedSender<GuideEvent>,
}

impl RealTimeGuide {
    /// Create an idle guide and the receiver its events are sent to
    pub fn new() -> (Self, UnboundedReceiver<GuideEvent>) {
        let (events, rx) = unbounded_channel();
        let guide = Self {
            pattern_id: None,
            steps: Vec::new(),
            state: GuideState::Idle,
            events,
        };
        (guide, rx)
    }

    /// Start guiding through `pattern`, replacing any current session.
    ///
    /// Stays idle when the pattern has no manual steps.
    pub fn start(&mut self, pattern: &Pattern) -> Option<StepProgress> {
        if pattern.manual_steps.is_empty() {
            warn!("Pattern '{}' has no manual steps, guide stays idle", pattern.id);
            self.pattern_id = None;
            self.steps.clear();
            self.state = GuideState::Idle;
            return None;
        }

        info!(
            "Starting guide for pattern '{}' with {} step(s)",
            pattern.id,
            pattern.manual_steps.len()
        );
        self.pattern_id = Some(pattern.id.clone());
        self.steps = pattern.manual_steps.clone();
        self.state = GuideState::Guiding { step_index: 0 };
        self.current_step()
    }

    /// Evaluate the current step against `view`, advancing when it is done
    pub fn check(&mut self, view: &EditorView) -> bool {
        let GuideState::Guiding { step_index } = self.state else {
            return false;
        };
        if !is_step_completed(&self.steps[step_index], view) {
            return false;
        }
        self.advance(step_index);
        true
    }

    /// Complete a pending user confirmation step
    pub fn confirm(&mut self) -> bool {
        match self.state {
            GuideState::Guiding { step_index } if self.steps[step_index].target == StepTarget::UserConfirmation => {
                self.advance(step_index);
                true
            }
            _ => false,
        }
    }

    /// Advance regardless of the current step's predicate
    pub fn force_next_step(&mut self) -> bool {
        let GuideState::Guiding { step_index } = self.state else {
            return false;
        };
        debug!("Forcing step {} forward", step_index + 1);
        self.advance(step_index);
        true
    }

    /// End the session. A completed session stays completed.
    pub fn stop(&mut self) {
        if let GuideState::Guiding { step_index } = self.state {
            info!("Guide stopped at step {}", step_index + 1);
            self.state = GuideState::Idle;
        }
    }

    pub fn state(&self) -> GuideState {
        self.state
    }

    pub fn is_guiding(&self) -> bool {
        matches!(self.state, GuideState::Guiding { .. })
    }

    pub fn pattern_id(&self) -> Option<&str> {
        self.pattern_id.as_deref()
    }

    pub fn current_step(&self) -> Option<StepProgress> {
        let GuideState::Guiding { step_index } = self.state else {
            return None;
        };
        let total = self.steps.len();
        Some(StepProgress {
            index: step_index,
            total,
            step: self.steps[step_index].clone(),
            percentage: ((step_index as f64 / total as f64) * 100.0).round() as u32,
        })
    }

    fn advance(&mut self, step_index: usize) {
        let step = self.steps[step_index].clone();
        info!("Step {} completed: {}", step_index + 1, step.description);
        self.emit(GuideEvent::StepCompleted {
            index: step_index,
            step,
        });

        let next = step_index + 1;
        if next >= self.steps.len() {
            info!("All {} step(s) completed", self.steps.len());
            self.state = GuideState::Completed;
            self.emit(GuideEvent::AllCompleted);
        } else {
            self.state = GuideState::Guiding { step_index: next };
        }
    }

    fn emit(&self, event: GuideEvent) {
        if self.events.send(event).is_err() {
            debug!("Guide event dropped, no receiver");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pattern::PatternCategory;
    use crate::models::security::Severity;

    fn pattern(steps: Vec<GuideStep>) -> Pattern {
        Pattern {
            id: "p".to_string(),
            title: "P".to_string(),
            description: String::new(),
            detection_keywords: Vec::new(),
            severity: Severity::Low,
            category: PatternCategory::Code,
            before: String::new(),
            after: String::new(),
            auto_fix: None,
            signals_data_loss: false,
            manual_steps: steps,
        }
    }

    #[test]
    fn test_start_without_steps_stays_idle() {
        let (mut guide, _rx) = RealTimeGuide::new();
        assert!(guide.start(&pattern(Vec::new())).is_none());
        assert_eq!(guide.state(), GuideState::Idle);
    }

    #[test]
    fn test_confirmation_only_advances_on_confirm() {
        let (mut guide, mut rx) = RealTimeGuide::new();
        guide.start(&pattern(vec![
            GuideStep::new("confirm", StepTarget::UserConfirmation),
            GuideStep::new("open", StepTarget::Node),
        ]));

        let view = EditorView {
            settings_panel_open: true,
            ..Default::default()
        };
        assert!(!guide.check(&view));
        assert!(guide.confirm());
        assert_eq!(guide.state(), GuideState::Guiding { step_index: 1 });
        assert!(!guide.confirm());
        assert!(matches!(rx.try_recv(), Ok(GuideEvent::StepCompleted { index: 0, .. })));
    }

    #[test]
    fn test_progress_percentage() {
        let (mut guide, _rx) = RealTimeGuide::new();
        let steps = (0..3).map(|i| GuideStep::new(format!("s{}", i), StepTarget::Node)).collect();
        let progress = guide.start(&pattern(steps)).unwrap();
        assert_eq!((progress.index, progress.total, progress.percentage), (0, 3, 0));

        guide.force_next_step();
        assert_eq!(guide.current_step().unwrap().percentage, 33);
        guide.force_next_step();
        assert_eq!(guide.current_step().unwrap().percentage, 67);
        guide.force_next_step();
        assert_eq!(guide.state(), GuideState::Completed);
        assert!(guide.current_step().is_none());
        assert!(!guide.force_next_step());
    }

    #[test]
    fn test_stop_from_guiding() {
        let (mut guide, _rx) = RealTimeGuide::new();
        guide.start(&pattern(vec![GuideStep::new("open", StepTarget::Node)]));
        guide.stop();
        guide.stop();
        assert_eq!(guide.state(), GuideState::Idle);
    }
}
