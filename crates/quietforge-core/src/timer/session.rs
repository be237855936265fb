//! Ritual session controller.
//!
//! Drives one run of a ritual. Each `tick(now)` advances the clock, resolves
//! the active section and fires cues on boundary crossings. The host owns
//! the frame loop; the session never schedules itself.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused -> Completed
//!            \          /
//!             -> Exited
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = RitualSession::new(ritual, cues, sink);
//! session.start(now_ms);
//! while session.wants_frames() {
//!     session.tick(now_ms); // Returns Some(Event) on boundaries and completion
//!     render(session.frame());
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Elapsed, RitualClock};
use crate::breath::{compute_phase, idle_state, BreathPattern, BreathState};
use crate::cues::{Cue, CuePlayer};
use crate::events::Event;
use crate::journal::{JournalEntry, JournalSink};
use crate::ritual::{Ritual, Section, SectionKind, SectionPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    /// Terminal: the ritual ran to the end and was journaled.
    Completed,
    /// Terminal: the user left early.
    Exited,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Exited)
    }
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionFrame {
    pub state: SessionState,
    pub elapsed: Elapsed,
    pub position: SectionPosition,
    pub section_label: String,
    pub section_kind: &'static str,
    /// Glow state; breath sections only.
    pub breath: Option<BreathState>,
    /// Posture and presence prompt for this point in the section.
    pub prompt: Option<String>,
    /// Whole seconds left in the ritual, rounded up.
    pub remaining_secs: u64,
    /// 0.0 ..= 1.0 across the whole ritual.
    pub progress: f64,
}

pub struct RitualSession<C, J> {
    ritual: Ritual,
    clock: RitualClock,
    state: SessionState,
    position: SectionPosition,
    /// Section index seen on the previous tick.
    last_index: usize,
    cues: C,
    sink: J,
    entry_id: Option<String>,
}

impl<C: CuePlayer, J: JournalSink> RitualSession<C, J> {
    pub fn new(ritual: Ritual, cues: C, sink: J) -> Self {
        let clock = RitualClock::new(ritual.total_secs() as f64);
        let position = ritual.resolve(0.0);
        Self {
            ritual,
            clock,
            state: SessionState::Idle,
            position,
            last_index: position.index,
            cues,
            sink,
            entry_id: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn ritual(&self) -> &Ritual {
        &self.ritual
    }

    pub fn elapsed(&self) -> Elapsed {
        self.clock.elapsed()
    }

    pub fn position(&self) -> SectionPosition {
        self.position
    }

    pub fn current_section(&self) -> &Section {
        self.ritual.section_at(&self.position)
    }

    pub fn cues(&self) -> &C {
        &self.cues
    }

    pub fn sink(&self) -> &J {
        &self.sink
    }

    /// Id of the journal entry handed to the sink, once completed.
    pub fn journal_entry_id(&self) -> Option<&str> {
        self.entry_id.as_deref()
    }

    /// Whether the host should keep delivering ticks. `false` means any
    /// scheduled frame callback must be cancelled.
    pub fn wants_frames(&self) -> bool {
        self.state == SessionState::Running
    }

    /// 0.0 .. 1.0 across the whole ritual.
    pub fn progress(&self) -> f64 {
        let total = self.ritual.total_secs() as f64;
        (self.clock.elapsed().fine_secs / total).clamp(0.0, 1.0)
    }

    pub fn remaining_secs(&self) -> u64 {
        let total = self.ritual.total_secs() as f64;
        (total - self.clock.elapsed().fine_secs).max(0.0).ceil() as u64
    }

    pub fn frame(&self) -> SessionFrame {
        let section = self.current_section();
        let offset = self.position.offset_secs;

        let breath = match &section.kind {
            SectionKind::Breath { pattern, .. } => Some(breath_at(section, *pattern, offset)),
            _ => None,
        };
        let prompt = match &section.kind {
            SectionKind::Posture { prompts } | SectionKind::Presence { prompts } => {
                prompt_at(prompts, offset, section.duration_secs())
            }
            _ => None,
        };

        SessionFrame {
            state: self.state,
            elapsed: self.clock.elapsed(),
            position: self.position,
            section_label: section.label.clone(),
            section_kind: section.kind.tag(),
            breath,
            prompt,
            remaining_secs: self.remaining_secs(),
            progress: self.progress(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let frame = self.frame();
        Event::StateSnapshot {
            state: self.state,
            ritual_id: self.ritual.id().to_string(),
            section_index: frame.position.index,
            section_label: frame.section_label,
            breath: frame.breath,
            elapsed_secs: frame.elapsed.fine_secs,
            remaining_secs: frame.remaining_secs,
            progress_pct: frame.progress * 100.0,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start from idle or resume from pause.
    pub fn start(&mut self, now_ms: f64) -> Option<Event> {
        match self.state {
            SessionState::Idle => {
                if !self.clock.start(now_ms) {
                    return None;
                }
                self.state = SessionState::Running;
                info!(ritual = self.ritual.id(), "ritual started");
                Some(Event::SessionStarted {
                    ritual_id: self.ritual.id().to_string(),
                    total_secs: self.ritual.total_secs(),
                    at: Utc::now(),
                })
            }
            SessionState::Paused => {
                if !self.clock.start(now_ms) {
                    return None;
                }
                self.state = SessionState::Running;
                Some(Event::SessionResumed {
                    elapsed_secs: self.clock.elapsed().fine_secs,
                    at: Utc::now(),
                })
            }
            SessionState::Running | SessionState::Completed | SessionState::Exited => None,
        }
    }

    pub fn pause(&mut self, now_ms: f64) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }
        self.clock.pause(now_ms);
        self.position = self.ritual.resolve(self.clock.elapsed().fine_secs);
        self.state = SessionState::Paused;
        Some(Event::SessionPaused {
            elapsed_secs: self.clock.elapsed().fine_secs,
            at: Utc::now(),
        })
    }

    /// Leave before the end. No completion cue and no journal entry.
    pub fn request_exit(&mut self, now_ms: f64) -> Option<Event> {
        if self.state.is_terminal() {
            return None;
        }
        if self.clock.is_running() {
            self.clock.pause(now_ms);
        }
        self.state = SessionState::Exited;
        let elapsed_secs = self.clock.elapsed().fine_secs;
        info!(ritual = self.ritual.id(), elapsed_secs, "ritual exited early");
        Some(Event::SessionExited {
            ritual_id: self.ritual.id().to_string(),
            elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Advance to `now_ms`.
    ///
    /// Returns an event when a section boundary is crossed or the ritual
    /// completes. Ignored unless running.
    pub fn tick(&mut self, now_ms: f64) -> Option<Event> {
        if self.state != SessionState::Running {
            return None;
        }

        let elapsed = self.clock.tick(now_ms);
        let total = self.ritual.total_secs() as f64;
        self.position = self.ritual.resolve(elapsed.fine_secs);

        if elapsed.fine_secs >= total {
            return Some(self.complete(now_ms));
        }

        if self.position.index == self.last_index {
            return None;
        }

        // One cue per tick, however many boundaries a stalled host skipped.
        let from_index = self.last_index;
        self.last_index = self.position.index;
        let section = self.ritual.section_at(&self.position);
        debug!(from = from_index, to = self.position.index, label = %section.label, "section entered");
        self.play(Cue::Transition);

        Some(Event::SectionEntered {
            index: self.position.index,
            from_index,
            label: section.label.clone(),
            kind: section.kind.tag().to_string(),
            at: Utc::now(),
        })
    }

    fn complete(&mut self, now_ms: f64) -> Event {
        self.clock.pause(now_ms);
        self.state = SessionState::Completed;
        self.last_index = self.position.index;
        self.play(Cue::Completion);

        let entry = JournalEntry::for_ritual(&self.ritual, Utc::now());
        let entry_id = entry.id.clone();
        if let Err(e) = self.sink.submit_completed_session(entry) {
            warn!(ritual = self.ritual.id(), error = %e, "journal submission failed");
        }
        self.entry_id = Some(entry_id.clone());
        info!(ritual = self.ritual.id(), entry = %entry_id, "ritual completed");

        Event::SessionCompleted {
            ritual_id: self.ritual.id().to_string(),
            entry_id,
            at: Utc::now(),
        }
    }

    fn play(&self, cue: Cue) {
        if let Err(e) = self.cues.play(cue) {
            warn!(?cue, error = %e, "cue playback failed");
        }
    }
}

/// Glow state `offset` seconds into a breath section. Once a cycle limit is
/// spent the glow idles for the rest of the section.
fn breath_at(section: &Section, pattern: BreathPattern, offset: f64) -> BreathState {
    match section.cycle_budget_secs() {
        Some(budget) if offset >= budget => idle_state(offset - budget, pattern.cycle_secs()),
        _ => compute_phase(pattern, offset),
    }
}

/// Prompts share the section evenly, in order.
fn prompt_at(prompts: &[String], offset: f64, duration_secs: u64) -> Option<String> {
    if prompts.is_empty() {
        return None;
    }
    let slot = duration_secs as f64 / prompts.len() as f64;
    let index = ((offset / slot).floor().max(0.0) as usize).min(prompts.len() - 1);
    Some(prompts[index].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::BreathPhase;
    use crate::error::{CueError, JournalError};
    use crate::ritual::RitualDefinition;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct CueCounter {
        transitions: Cell<u32>,
        completions: Cell<u32>,
    }

    impl CuePlayer for CueCounter {
        fn play_transition_cue(&self) -> Result<(), CueError> {
            self.transitions.set(self.transitions.get() + 1);
            Ok(())
        }

        fn play_completion_cue(&self) -> Result<(), CueError> {
            self.completions.set(self.completions.get() + 1);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        entries: RefCell<Vec<JournalEntry>>,
    }

    impl JournalSink for CollectingSink {
        fn submit_completed_session(&self, entry: JournalEntry) -> Result<(), JournalError> {
            self.entries.borrow_mut().push(entry);
            Ok(())
        }
    }

    struct BrokenCues;

    impl CuePlayer for BrokenCues {
        fn play_transition_cue(&self) -> Result<(), CueError> {
            Err(CueError::Playback("no device".into()))
        }

        fn play_completion_cue(&self) -> Result<(), CueError> {
            Err(CueError::Playback("no device".into()))
        }
    }

    struct BrokenSink;

    impl JournalSink for BrokenSink {
        fn submit_completed_session(&self, _entry: JournalEntry) -> Result<(), JournalError> {
            Err(JournalError::BusWrite {
                key: "suite.journals".into(),
                message: "disk full".into(),
            })
        }
    }

    /// 2s intention then 3s presence.
    fn five_second_ritual() -> Ritual {
        Ritual::new(RitualDefinition::new(
            "five",
            "Five Seconds",
            vec![Section::intention("Set", 2), Section::presence("Rest", 3)],
        ))
        .unwrap()
    }

    fn session(ritual: Ritual) -> RitualSession<CueCounter, CollectingSink> {
        RitualSession::new(ritual, CueCounter::default(), CollectingSink::default())
    }

    #[test]
    fn new_session_is_idle() {
        let s = session(five_second_ritual());
        assert_eq!(s.state(), SessionState::Idle);
        assert!(!s.wants_frames());
        assert_eq!(s.remaining_secs(), 5);
        assert_eq!(s.frame().section_label, "Set");
    }

    #[test]
    fn initial_tick_fires_no_cue() {
        let mut s = session(five_second_ritual());
        assert!(matches!(s.start(0.0), Some(Event::SessionStarted { .. })));
        assert!(s.tick(0.0).is_none());
        assert!(s.tick(16.0).is_none());
        assert_eq!(s.cues().transitions.get(), 0);
    }

    #[test]
    fn one_transition_cue_per_boundary() {
        let mut s = session(five_second_ritual());
        s.start(0.0);

        let mut entered = 0;
        let mut now = 0.0;
        while now < 4_000.0 {
            if let Some(Event::SectionEntered { index, from_index, .. }) = s.tick(now) {
                assert_eq!((from_index, index), (0, 1));
                entered += 1;
            }
            now += 16.0;
        }

        assert_eq!(entered, 1);
        assert_eq!(s.cues().transitions.get(), 1);
        assert_eq!(s.cues().completions.get(), 0);
        assert_eq!(s.frame().section_label, "Rest");
    }

    #[test]
    fn boundary_instant_belongs_to_next_section() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        assert!(s.tick(1_999.0).is_none());
        assert!(matches!(s.tick(2_000.0), Some(Event::SectionEntered { index: 1, .. })));
    }

    #[test]
    fn stalled_host_crossing_two_boundaries_cues_once() {
        let ritual = Ritual::new(RitualDefinition::new(
            "three",
            "Three",
            vec![
                Section::intention("A", 1),
                Section::intention("B", 1),
                Section::presence("C", 3),
            ],
        ))
        .unwrap();
        let mut s = session(ritual);
        s.start(0.0);
        s.tick(500.0);
        let event = s.tick(2_500.0);
        assert!(matches!(
            event,
            Some(Event::SectionEntered { index: 2, from_index: 0, .. })
        ));
        assert_eq!(s.cues().transitions.get(), 1);
    }

    #[test]
    fn completion_happens_exactly_once() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.tick(2_500.0);

        let event = s.tick(5_200.0);
        let Some(Event::SessionCompleted { ritual_id, entry_id, .. }) = event else {
            panic!("expected completion, got {event:?}");
        };
        assert_eq!(ritual_id, "five");
        assert_eq!(s.state(), SessionState::Completed);
        assert!(!s.wants_frames());
        assert_eq!(s.journal_entry_id(), Some(entry_id.as_str()));

        for now in [5_216.0, 6_000.0, 60_000.0] {
            assert!(s.tick(now).is_none());
        }
        assert!(s.start(70_000.0).is_none());
        assert!(s.request_exit(80_000.0).is_none());

        let entries = s.sink().entries.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, entry_id);
        assert_eq!(entries[0].ritual_name, "Five Seconds");
        assert!(entries[0].note.is_none());
        assert_eq!(s.cues().completions.get(), 1);
        // Completion supersedes the transition into the last section.
        assert_eq!(s.cues().transitions.get(), 1);
    }

    #[test]
    fn completed_frame_shows_full_progress() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.tick(9_000.0);
        let frame = s.frame();
        assert_eq!(frame.elapsed.whole_secs, 5);
        assert_eq!(frame.remaining_secs, 0);
        assert_eq!(frame.progress, 1.0);
        assert_eq!(frame.position.index, 1);
        assert_eq!(frame.position.remaining_secs, 0.0);
    }

    #[test]
    fn exit_never_journals() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.tick(4_990.0);
        assert!(matches!(s.request_exit(4_995.0), Some(Event::SessionExited { .. })));
        assert_eq!(s.state(), SessionState::Exited);

        assert!(s.tick(10_000.0).is_none());
        assert!(s.start(10_000.0).is_none());
        assert!(s.sink().entries.borrow().is_empty());
        assert_eq!(s.cues().completions.get(), 0);
        assert!(s.journal_entry_id().is_none());
    }

    #[test]
    fn exit_while_paused_or_idle() {
        let mut s = session(five_second_ritual());
        assert!(s.request_exit(0.0).is_some());

        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.pause(1_000.0);
        assert!(s.request_exit(50_000.0).is_some());
        assert_eq!(s.elapsed().fine_secs, 1.0);
    }

    #[test]
    fn pause_freezes_time_and_resume_continues() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.tick(1_000.0);
        assert!(matches!(s.pause(1_500.0), Some(Event::SessionPaused { .. })));
        assert!(!s.wants_frames());
        assert!(s.tick(90_000.0).is_none());
        assert_eq!(s.elapsed().fine_secs, 1.5);

        assert!(matches!(s.start(100_000.0), Some(Event::SessionResumed { .. })));
        s.tick(100_000.0);
        assert!((s.elapsed().fine_secs - 1.5).abs() < 1e-9);
        assert!(matches!(s.tick(100_500.0), Some(Event::SectionEntered { index: 1, .. })));
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut s = session(five_second_ritual());
        assert!(s.pause(0.0).is_none());
        assert!(s.start(0.0).is_some());
        assert!(s.start(10.0).is_none());
        assert!(s.pause(20.0).is_some());
        assert!(s.pause(30.0).is_none());
    }

    #[test]
    fn non_finite_start_is_rejected() {
        let mut s = session(five_second_ritual());
        assert!(s.start(f64::NAN).is_none());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn bounded_breath_section_idles_after_limit() {
        let pattern = BreathPattern::Box4444;
        let cycle = pattern.cycle_secs();
        let ritual = Ritual::new(RitualDefinition::new(
            "box",
            "Box",
            vec![Section::breath("Box", 60, pattern).with_cycles(2)],
        ))
        .unwrap();
        let mut s = session(ritual);
        s.start(0.0);

        s.tick((cycle + 0.5) * 1000.0);
        let breath = s.frame().breath.unwrap();
        assert_eq!(breath, compute_phase(pattern, cycle + 0.5));
        assert_eq!(breath.phase, Some(BreathPhase::Inhale));

        s.tick((2.0 * cycle + 0.5) * 1000.0);
        let breath = s.frame().breath.unwrap();
        assert_eq!(breath.phase, None);
        assert_eq!(breath, idle_state(0.5, cycle));
    }

    #[test]
    fn unbounded_breath_section_keeps_cycling() {
        let pattern = BreathPattern::Box4444;
        let ritual = Ritual::new(RitualDefinition::new(
            "box",
            "Box",
            vec![Section::breath("Box", 60, pattern)],
        ))
        .unwrap();
        let mut s = session(ritual);
        s.start(0.0);
        s.tick(48_500.0);
        assert_eq!(s.frame().breath.unwrap(), compute_phase(pattern, 48.5));
    }

    #[test]
    fn prompts_rotate_through_section() {
        let ritual = Ritual::new(RitualDefinition::new(
            "posture",
            "Posture",
            vec![Section::posture("Check", 30)
                .with_prompts(vec!["Feet".into(), "Spine".into(), "Jaw".into()])],
        ))
        .unwrap();
        let mut s = session(ritual);
        s.start(0.0);
        assert_eq!(s.frame().prompt.as_deref(), Some("Feet"));
        s.tick(10_000.0);
        assert_eq!(s.frame().prompt.as_deref(), Some("Spine"));
        s.tick(29_999.0);
        assert_eq!(s.frame().prompt.as_deref(), Some("Jaw"));
        assert!(s.frame().breath.is_none());
    }

    #[test]
    fn failing_collaborators_do_not_halt_the_session() {
        let mut s = RitualSession::new(five_second_ritual(), BrokenCues, BrokenSink);
        s.start(0.0);
        assert!(s.tick(2_100.0).is_some());
        assert!(matches!(s.tick(5_000.0), Some(Event::SessionCompleted { .. })));
        assert_eq!(s.state(), SessionState::Completed);
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.tick(2_500.0);
        let Event::StateSnapshot {
            state,
            section_index,
            remaining_secs,
            progress_pct,
            ..
        } = s.snapshot()
        else {
            panic!("expected snapshot");
        };
        assert_eq!(state, SessionState::Running);
        assert_eq!(section_index, 1);
        assert_eq!(remaining_secs, 3);
        assert!((progress_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn pause_past_the_end_completes_after_resume() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.tick(1_000.0);
        assert!(matches!(s.pause(9_000.0), Some(Event::SessionPaused { .. })));
        assert_eq!(s.state(), SessionState::Paused);
        assert_eq!(s.elapsed().fine_secs, 5.0);
        assert!(s.sink().entries.borrow().is_empty());

        assert!(matches!(s.start(20_000.0), Some(Event::SessionResumed { .. })));
        assert!(matches!(s.tick(20_016.0), Some(Event::SessionCompleted { .. })));
        assert!(s.tick(20_032.0).is_none());
        assert_eq!(s.state(), SessionState::Completed);
        assert_eq!(s.cues().completions.get(), 1);
        assert_eq!(s.sink().entries.borrow().len(), 1);
    }

    #[test]
    fn exit_while_paused_past_the_end_journals_nothing() {
        let mut s = session(five_second_ritual());
        s.start(0.0);
        s.pause(9_000.0);
        assert!(matches!(s.request_exit(9_500.0), Some(Event::SessionExited { .. })));
        assert_eq!(s.state(), SessionState::Exited);
        assert!(s.start(10_000.0).is_none());
        assert!(s.tick(10_016.0).is_none());
        assert_eq!(s.cues().completions.get(), 0);
        assert!(s.sink().entries.borrow().is_empty());
        assert!(s.journal_entry_id().is_none());
    }
}
