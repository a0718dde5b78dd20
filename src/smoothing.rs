use std::collections::{HashMap, VecDeque};

use crate::{error::ConfigError, types::GestureKind};

/// Majority vote over the last few per-frame labels, `None` meaning no hand was seen.
#[derive(Clone, Debug)]
pub struct GestureSmoother {
    window: usize,
    history: VecDeque<Option<GestureKind>>,
}

impl GestureSmoother {
    pub fn new(window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::EmptySmoothingWindow);
        }
        Ok(Self {
            window,
            history: VecDeque::with_capacity(window),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record one frame's label and return the smoothed label.
    pub fn push(&mut self, kind: Option<GestureKind>) -> Option<GestureKind> {
        if self.history.len() == self.window {
            self.history.pop_front();
        }
        self.history.push_back(kind);
        self.current()
    }

    /// Most frequent label in the window; ties go to whichever was seen most recently.
    pub fn current(&self) -> Option<GestureKind> {
        let mut votes: HashMap<Option<GestureKind>, (usize, usize)> = HashMap::new();
        for (age, kind) in self.history.iter().enumerate() {
            let entry = votes.entry(*kind).or_insert((0, age));
            entry.0 += 1;
            entry.1 = age;
        }

        votes
            .into_iter()
            .max_by_key(|&(_, (count, last_seen))| (count, last_seen))
            .and_then(|(kind, _)| kind)
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
