//! Scene mode and the toggle controller.
//!
//! [`Mode`] is the single discrete state every group reads each frame.
//! [`ModeSwitch`] stores it in an atomic so a UI handler can flip it from
//! outside the frame callback without the frame ever observing a torn value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Which configuration the particles are heading towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Scattered sphere cloud.
    #[default]
    Chaos,
    /// Assembled tree.
    Formed,
}

impl Mode {
    /// The other mode.
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Mode::Chaos => Mode::Formed,
            Mode::Formed => Mode::Chaos,
        }
    }

    /// True when the tree is (or is becoming) assembled.
    #[inline]
    pub fn is_formed(self) -> bool {
        self == Mode::Formed
    }

    /// Value a blend factor converges to in this mode.
    #[inline]
    pub fn blend_target(self) -> f32 {
        match self {
            Mode::Chaos => 0.0,
            Mode::Formed => 1.0,
        }
    }

    /// Label for the action the next toggle performs.
    pub fn action_label(self) -> &'static str {
        match self {
            Mode::Chaos => "ASSEMBLE GRANDEUR",
            Mode::Formed => "RELEASE CHAOS",
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Mode::Chaos => 0,
            Mode::Formed => 1,
        }
    }

    fn from_bits(bits: u8) -> Self {
        if bits & 1 == 1 {
            Mode::Formed
        } else {
            Mode::Chaos
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Chaos => write!(f, "CHAOS"),
            Mode::Formed => write!(f, "FORMED"),
        }
    }
}

/// Shared, lock-free holder of the current [`Mode`].
///
/// Clones share the same state, so a UI layer can keep a handle and call
/// [`toggle`](Self::toggle) while the scene reads [`current`](Self::current)
/// once at the start of each frame.
#[derive(Debug, Clone, Default)]
pub struct ModeSwitch {
    state: Arc<AtomicU8>,
}

impl ModeSwitch {
    /// New switch starting in [`Mode::Chaos`].
    pub fn new() -> Self {
        Self::default()
    }

    /// New switch starting in `mode`.
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(mode.to_bits())),
        }
    }

    /// The mode as of this call.
    #[inline]
    pub fn current(&self) -> Mode {
        Mode::from_bits(self.state.load(Ordering::Acquire))
    }

    /// Flip between CHAOS and FORMED, returning the new mode.
    ///
    /// No debouncing and no intermediate state. Particle positions and
    /// blend values are left alone; the engines re-target on their next update.
    pub fn toggle(&self) -> Mode {
        let previous = Mode::from_bits(self.state.fetch_xor(1, Ordering::AcqRel));
        let mode = previous.toggled();
        tracing::debug!(from = %previous, to = %mode, "mode toggled");
        mode
    }

    /// Force a specific mode.
    pub fn set(&self, mode: Mode) {
        self.state.store(mode.to_bits(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_in_chaos() {
        assert_eq!(ModeSwitch::new().current(), Mode::Chaos);
        assert_eq!(Mode::default(), Mode::Chaos);
    }

    #[test]
    fn test_toggle_twice_is_identity() {
        let switch = ModeSwitch::new();
        assert_eq!(switch.toggle(), Mode::Formed);
        assert_eq!(switch.current(), Mode::Formed);
        assert_eq!(switch.toggle(), Mode::Chaos);
        assert_eq!(switch.current(), Mode::Chaos);
    }

    #[test]
    fn test_clones_share_state() {
        let switch = ModeSwitch::with_mode(Mode::Formed);
        let ui_handle = switch.clone();
        ui_handle.toggle();
        assert_eq!(switch.current(), Mode::Chaos);
        switch.set(Mode::Formed);
        assert_eq!(ui_handle.current(), Mode::Formed);
    }

    #[test]
    fn test_toggle_from_other_threads() {
        let switch = ModeSwitch::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = switch.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        s.toggle();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // 100 flips in total
        assert_eq!(switch.current(), Mode::Chaos);
    }

    #[test]
    fn test_blend_targets_and_labels() {
        assert_eq!(Mode::Chaos.blend_target(), 0.0);
        assert_eq!(Mode::Formed.blend_target(), 1.0);
        assert_eq!(Mode::Chaos.action_label(), "ASSEMBLE GRANDEUR");
        assert_eq!(Mode::Formed.to_string(), "FORMED");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Mode::Formed).unwrap(), "\"FORMED\"");
        let m: Mode = serde_json::from_str("\"CHAOS\"").unwrap();
        assert_eq!(m, Mode::Chaos);
    }
}
