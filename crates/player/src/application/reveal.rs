//! Reveal Sequencer
//!
//! Stages the disclosure of one answer on the answers screen: the players who
//! picked it appear one after another, then the card flips to show the author
//! and whether the answer was correct.
//!
//! The whole schedule is computed up front from the number of selectors and
//! two durations. The server waits the same total time before sending the next
//! answer, so both sides must be configured with identical values.

use std::time::Duration;

use drawesome_shared::{AnswerReveal, PlayerRef};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::session::SessionEvent;

/// Server-side `DISPLAY_SELECTED_DURATION`.
pub const DISPLAY_SELECTED_DURATION: Duration = Duration::from_millis(1_000);

/// Server-side `WAIT_BEFORE_FLIP_DURATION`.
pub const WAIT_BEFORE_FLIP_DURATION: Duration = Duration::from_millis(3_000);

/// The two durations a reveal is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    /// Gap between consecutive selectors (`k`)
    pub stagger: Duration,
    /// Pause after the last selector before the flip (`w`)
    pub settle: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            stagger: DISPLAY_SELECTED_DURATION,
            settle: WAIT_BEFORE_FLIP_DURATION,
        }
    }
}

/// Offsets from the start of a reveal, independent of what is revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSchedule {
    pub selectors: Vec<Duration>,
    pub correctness: Duration,
}

impl RevealSchedule {
    /// Total time the reveal occupies.
    pub fn duration(&self) -> Duration {
        self.correctness
    }
}

/// Compute the schedule for `n` selectors.
///
/// With no selectors the flip still waits one stagger interval. Otherwise
/// selector `i` appears at `k * (i + 1)` and the flip happens at `k * n + w`.
pub fn schedule(n: usize, timing: RevealTiming) -> RevealSchedule {
    let beats = |count: usize| {
        timing
            .stagger
            .saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
    };

    if n == 0 {
        return RevealSchedule {
            selectors: Vec::new(),
            correctness: timing.stagger,
        };
    }

    RevealSchedule {
        selectors: (1..=n).map(beats).collect(),
        correctness: beats(n).saturating_add(timing.settle),
    }
}

/// One visible change on the answer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealStep {
    ShowSelector { index: usize, selector: PlayerRef },
    RevealCorrectness { author: PlayerRef, is_correct: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStep {
    pub delay: Duration,
    pub step: RevealStep,
}

/// Pair every step of a reveal with its offset, in firing order.
pub fn plan(record: &AnswerReveal, is_correct: bool, timing: RevealTiming) -> Vec<ScheduledStep> {
    let schedule = schedule(record.selected_by.len(), timing);

    let mut steps: Vec<ScheduledStep> = schedule
        .selectors
        .iter()
        .zip(&record.selected_by)
        .enumerate()
        .map(|(index, (delay, selector))| ScheduledStep {
            delay: *delay,
            step: RevealStep::ShowSelector {
                index,
                selector: selector.clone(),
            },
        })
        .collect();

    steps.push(ScheduledStep {
        delay: schedule.correctness,
        step: RevealStep::RevealCorrectness {
            author: record.author.clone(),
            is_correct,
        },
    });
    steps
}

/// Runs at most one reveal at a time.
///
/// Each run is tagged with a generation. Starting a new run or cancelling
/// stops the previous timer task, and steps it already queued are rejected by
/// [`RevealSequencer::is_current`].
#[derive(Debug)]
pub struct RevealSequencer {
    timing: RevealTiming,
    generation: u64,
    running: Option<CancellationToken>,
}

impl RevealSequencer {
    pub fn new(timing: RevealTiming) -> Self {
        Self {
            timing,
            generation: 0,
            running: None,
        }
    }

    /// Cancel any running reveal and schedule a new one for `record`.
    ///
    /// Steps are delivered to `events` as [`SessionEvent::Reveal`].
    /// Returns the generation of the new run.
    pub fn start(
        &mut self,
        record: &AnswerReveal,
        is_correct: bool,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let token = CancellationToken::new();
        let steps = plan(record, is_correct, self.timing);

        tracing::debug!(
            generation,
            selectors = record.selected_by.len(),
            duration_ms = steps.last().map(|s| s.delay.as_millis()).unwrap_or_default(),
            "Starting answer reveal"
        );

        let task_token = token.clone();
        let started = Instant::now();
        tokio::spawn(async move {
            for ScheduledStep { delay, step } in steps {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => return,
                    _ = tokio::time::sleep_until(started + delay) => {}
                }
                if events
                    .send(SessionEvent::Reveal { generation, step })
                    .is_err()
                {
                    return;
                }
            }
        });

        self.running = Some(token);
        generation
    }

    /// Stop the running reveal, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.running.take() {
            tracing::debug!(generation = self.generation, "Cancelling answer reveal");
            token.cancel();
        }
    }

    /// Whether a step tagged with `generation` belongs to the live run.
    pub fn is_current(&self, generation: u64) -> bool {
        self.running.is_some() && generation == self.generation
    }

    /// Mark the live run as finished once its last step has been applied.
    pub fn finish(&mut self, generation: u64) {
        if self.is_current(generation) {
            self.running = None;
        }
    }
}

impl Default for RevealSequencer {
    fn default() -> Self {
        Self::new(RevealTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: Duration = Duration::from_millis(1_000);
    const W: Duration = Duration::from_millis(3_000);

    fn timing() -> RevealTiming {
        RevealTiming {
            stagger: K,
            settle: W,
        }
    }

    fn player(nickname: &str) -> PlayerRef {
        PlayerRef {
            nickname: nickname.into(),
            avatar: None,
        }
    }

    fn record(text: &str, selectors: &[&str]) -> AnswerReveal {
        AnswerReveal {
            text: text.into(),
            author: player("author"),
            selected_by: selectors.iter().map(|s| player(s)).collect(),
        }
    }

    #[test]
    fn test_schedule_without_selectors_waits_one_beat() {
        let schedule = schedule(0, timing());
        assert!(schedule.selectors.is_empty());
        assert_eq!(schedule.correctness, K);
    }

    #[test]
    fn test_schedule_with_three_selectors() {
        let schedule = schedule(3, timing());
        assert_eq!(schedule.selectors, vec![K, K * 2, K * 3]);
        assert_eq!(schedule.correctness, K * 3 + W);
        assert_eq!(schedule.duration(), Duration::from_millis(6_000));
    }

    #[test]
    fn test_plan_orders_selectors_before_flip() {
        let steps = plan(&record("a cat", &["ann", "bob"]), true, timing());
        assert_eq!(steps.len(), 3);
        assert_eq!(
            steps[1].step,
            RevealStep::ShowSelector {
                index: 1,
                selector: player("bob"),
            }
        );
        assert_eq!(
            steps[2].step,
            RevealStep::RevealCorrectness {
                author: player("author"),
                is_correct: true,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_fire_at_scheduled_offsets() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sequencer = RevealSequencer::new(timing());
        let started = Instant::now();
        let generation = sequencer.start(&record("a cat", &["ann", "bob", "cid"]), false, tx);

        let mut offsets = Vec::new();
        for _ in 0..4 {
            let Some(SessionEvent::Reveal { generation: g, .. }) = rx.recv().await else {
                panic!("expected a reveal step");
            };
            assert_eq!(g, generation);
            offsets.push(started.elapsed());
        }
        assert_eq!(offsets, vec![K, K * 2, K * 3, K * 3 + W]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_run() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sequencer = RevealSequencer::new(timing());

        let first = sequencer.start(&record("first", &["ann", "bob"]), true, tx.clone());
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let second = sequencer.start(&record("second", &[]), false, tx);
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));

        // The selector queued before the restart is stale
        let mut current_steps = Vec::new();
        for _ in 0..2 {
            let Some(SessionEvent::Reveal { generation, step }) = rx.recv().await else {
                panic!("expected a reveal step");
            };
            if sequencer.is_current(generation) {
                current_steps.push(step);
            }
        }
        assert_eq!(
            current_steps,
            vec![RevealStep::RevealCorrectness {
                author: player("author"),
                is_correct: false,
            }]
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_pending_steps() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sequencer = RevealSequencer::new(timing());
        let generation = sequencer.start(&record("gone", &["ann"]), true, tx);
        sequencer.cancel();

        assert!(!sequencer.is_current(generation));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }
}
