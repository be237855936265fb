//! Audio cue triggers.
//!
//! The session controller fires a cue when a section boundary is crossed and
//! when the ritual completes. Playback is fire-and-forget: an error is logged
//! by the caller and otherwise ignored.

use serde::{Deserialize, Serialize};

use crate::error::CueError;

/// Which cue is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Short woodblock knock between sections.
    Transition,
    /// Long gong at the end of a ritual.
    Completion,
}

/// Plays the two session cues.
pub trait CuePlayer {
    fn play_transition_cue(&self) -> Result<(), CueError>;

    fn play_completion_cue(&self) -> Result<(), CueError>;

    fn play(&self, cue: Cue) -> Result<(), CueError> {
        match cue {
            Cue::Transition => self.play_transition_cue(),
            Cue::Completion => self.play_completion_cue(),
        }
    }
}

impl<T: CuePlayer + ?Sized> CuePlayer for &T {
    fn play_transition_cue(&self) -> Result<(), CueError> {
        (**self).play_transition_cue()
    }

    fn play_completion_cue(&self) -> Result<(), CueError> {
        (**self).play_completion_cue()
    }
}

impl<T: CuePlayer + ?Sized> CuePlayer for Box<T> {
    fn play_transition_cue(&self) -> Result<(), CueError> {
        (**self).play_transition_cue()
    }

    fn play_completion_cue(&self) -> Result<(), CueError> {
        (**self).play_completion_cue()
    }
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play_transition_cue(&self) -> Result<(), CueError> {
        Ok(())
    }

    fn play_completion_cue(&self) -> Result<(), CueError> {
        Ok(())
    }
}

/// Applies the user's sound toggles in front of another player.
#[derive(Debug, Clone)]
pub struct GatedCuePlayer<P> {
    inner: P,
    transition: bool,
    completion: bool,
}

impl<P: CuePlayer> GatedCuePlayer<P> {
    pub fn new(inner: P, transition: bool, completion: bool) -> Self {
        Self {
            inner,
            transition,
            completion,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: CuePlayer> CuePlayer for GatedCuePlayer<P> {
    fn play_transition_cue(&self) -> Result<(), CueError> {
        if self.transition {
            self.inner.play_transition_cue()
        } else {
            Ok(())
        }
    }

    fn play_completion_cue(&self) -> Result<(), CueError> {
        if self.completion {
            self.inner.play_completion_cue()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Cue>>);

    impl CuePlayer for Recorder {
        fn play_transition_cue(&self) -> Result<(), CueError> {
            self.0.borrow_mut().push(Cue::Transition);
            Ok(())
        }

        fn play_completion_cue(&self) -> Result<(), CueError> {
            self.0.borrow_mut().push(Cue::Completion);
            Ok(())
        }
    }

    #[test]
    fn play_dispatches_by_kind() {
        let rec = Recorder::default();
        rec.play(Cue::Completion).unwrap();
        rec.play(Cue::Transition).unwrap();
        assert_eq!(*rec.0.borrow(), vec![Cue::Completion, Cue::Transition]);
    }

    #[test]
    fn gate_drops_disabled_cues() {
        let gated = GatedCuePlayer::new(Recorder::default(), false, true);
        gated.play_transition_cue().unwrap();
        gated.play_completion_cue().unwrap();
        assert_eq!(*gated.inner().0.borrow(), vec![Cue::Completion]);
    }

    #[test]
    fn references_are_players() {
        let rec = Recorder::default();
        let by_ref: &dyn CuePlayer = &rec;
        by_ref.play_transition_cue().unwrap();
        (&rec).play_completion_cue().unwrap();
        assert_eq!(rec.0.borrow().len(), 2);
    }
}
