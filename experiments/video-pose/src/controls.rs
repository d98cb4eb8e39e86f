use minifb::Key;

/// Threshold change per key press, in percent.
pub const THRESHOLD_STEP: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reset,
    WiderWindow,
    NarrowerWindow,
    RaiseThreshold,
    LowerThreshold,
}

impl Action {
    pub fn from_key(key: Key) -> Option<Action> {
        match key {
            Key::R => Some(Action::Reset),
            Key::Up => Some(Action::WiderWindow),
            Key::Down => Some(Action::NarrowerWindow),
            Key::Right => Some(Action::RaiseThreshold),
            Key::Left => Some(Action::LowerThreshold),
            _ => None,
        }
    }
}

/// Live smoothing window and confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuning {
    pub window: usize,
    pub threshold_percent: u32,
}

impl Tuning {
    pub fn new(window: usize, threshold: f32) -> Self {
        Self {
            window,
            threshold_percent: (threshold * 100.0).round().clamp(0.0, 100.0) as u32,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold_percent as f32 / 100.0
    }

    /// Returns false when the action leaves the tuning unchanged.
    pub fn apply(&mut self, action: Action) -> bool {
        let before = *self;
        match action {
            Action::Reset => return false,
            Action::WiderWindow => self.window += 1,
            Action::NarrowerWindow => self.window = self.window.saturating_sub(1),
            Action::RaiseThreshold => {
                self.threshold_percent = (self.threshold_percent + THRESHOLD_STEP).min(100)
            }
            Action::LowerThreshold => {
                self.threshold_percent = self.threshold_percent.saturating_sub(THRESHOLD_STEP)
            }
        }
        *self != before
    }
}
