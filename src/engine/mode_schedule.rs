use crate::config::ModeEntry;
use crate::types::GhostMode;

/// Ordered pursue/patrol timeline. The index only moves forward until
/// [`ModeSchedule::reset`]; an expired last entry stays active.
#[derive(Clone, Debug)]
pub struct ModeSchedule {
    entries: Vec<ModeEntry>,
    index: usize,
    elapsed: f32,
}

impl ModeSchedule {
    pub fn new(entries: Vec<ModeEntry>) -> Self {
        Self {
            entries,
            index: 0,
            elapsed: 0.0,
        }
    }

    pub fn current_mode(&self) -> GhostMode {
        self.entries
            .get(self.index)
            .map(|entry| entry.mode)
            .unwrap_or(GhostMode::Pursue)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Seconds spent in the active entry.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn entries(&self) -> &[ModeEntry] {
        &self.entries
    }

    /// Returns the new mode when the active entry changed during this call.
    /// Several short entries may be crossed at once.
    pub fn advance(&mut self, dt: f32) -> Option<GhostMode> {
        if dt <= 0.0 || !dt.is_finite() {
            return None;
        }
        self.elapsed += dt;
        let start = self.index;
        while self.index + 1 < self.entries.len() {
            let Some(seconds) = self.entries[self.index].seconds else {
                break;
            };
            if self.elapsed < seconds {
                break;
            }
            self.elapsed -= seconds;
            self.index += 1;
        }
        (self.index != start).then_some(self.current_mode())
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed = 0.0;
    }
}
