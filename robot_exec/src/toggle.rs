//! # Toggle state tracker
//!
//! Converts the raw state of momentary buttons into latched on/off flags. A flag flips on each
//! press (released to pressed edge) of its button, and can be cleared by the control modules, for
//! instance when a preset has been reached.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The latched state of a single toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToggleState {
    pub id: ToggleId,
    pub is_on: bool,

    /// Raw button state seen on the previous update.
    #[serde(skip)]
    prev_pressed: bool,
}

/// Tracks every toggle on the robot.
///
/// Toggles are stored ordered by their ID so that iteration, and therefore edge processing, is
/// always in ascending ID order.
#[derive(Debug, Clone, Default)]
pub struct ToggleTracker {
    toggles: BTreeMap<ToggleId, ToggleState>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Identifies a toggle.
///
/// All lift presets order before all arm presets, then by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ToggleId {
    LiftPreset(usize),
    ArmPreset(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ToggleState {
    fn new(id: ToggleId) -> Self {
        Self {
            id,
            is_on: false,
            prev_pressed: false,
        }
    }
}

impl ToggleTracker {
    /// Create a tracker with all the given toggles off.
    pub fn new<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ToggleId>,
    {
        Self {
            toggles: ids.into_iter().map(|id| (id, ToggleState::new(id))).collect(),
        }
    }

    /// Feed the current raw button state of a toggle.
    ///
    /// Returns true if the toggle flipped. Unknown toggles are added on first update.
    pub fn update(&mut self, id: ToggleId, pressed: bool) -> bool {
        let state = self
            .toggles
            .entry(id)
            .or_insert_with(|| ToggleState::new(id));

        let rising = pressed && !state.prev_pressed;
        state.prev_pressed = pressed;

        if rising {
            state.is_on = !state.is_on;
            debug!("{:?} toggled {}", id, if state.is_on { "on" } else { "off" });
        }

        rising
    }

    /// Feed the raw state of several toggles at once.
    ///
    /// The edges are processed in ascending ID order regardless of the order they are given in.
    pub fn update_all<I>(&mut self, raw: I)
    where
        I: IntoIterator<Item = (ToggleId, bool)>,
    {
        let mut raw: Vec<_> = raw.into_iter().collect();
        raw.sort_by_key(|(id, _)| *id);

        for (id, pressed) in raw {
            self.update(id, pressed);
        }
    }

    /// Returns true if the toggle is latched on. Unknown toggles are off.
    pub fn is_on(&self, id: ToggleId) -> bool {
        self.toggles.get(&id).map(|t| t.is_on).unwrap_or(false)
    }

    /// Clear a toggle.
    ///
    /// The stored raw state is kept, so a button which is still held does not turn the toggle
    /// straight back on.
    pub fn reset(&mut self, id: ToggleId) {
        if let Some(state) = self.toggles.get_mut(&id) {
            if state.is_on {
                debug!("{:?} reset", id);
            }
            state.is_on = false;
        }
    }

    /// Indexes of all lift presets which are on, in ascending order.
    pub fn lift_presets_on(&self) -> Vec<usize> {
        self.toggles
            .values()
            .filter_map(|t| match t.id {
                ToggleId::LiftPreset(i) if t.is_on => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Copies of every toggle state, in ascending ID order.
    pub fn states(&self) -> Vec<ToggleState> {
        self.toggles.values().copied().collect()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const P1: ToggleId = ToggleId::LiftPreset(0);
    const P2: ToggleId = ToggleId::LiftPreset(1);

    #[test]
    fn test_rising_edge_flips() {
        let mut tracker = ToggleTracker::new(vec![P1]);

        assert!(!tracker.is_on(P1));

        // Press and hold, only the first update flips
        assert!(tracker.update(P1, true));
        assert!(!tracker.update(P1, true));
        assert!(tracker.is_on(P1));

        // Release changes nothing
        assert!(!tracker.update(P1, false));
        assert!(tracker.is_on(P1));

        // Second press turns it off
        assert!(tracker.update(P1, true));
        assert!(!tracker.is_on(P1));
    }

    #[test]
    fn test_reset_while_held() {
        let mut tracker = ToggleTracker::new(vec![P1]);

        tracker.update(P1, true);
        tracker.reset(P1);
        assert!(!tracker.is_on(P1));

        // Still held, no new edge
        tracker.update(P1, true);
        assert!(!tracker.is_on(P1));

        tracker.update(P1, false);
        tracker.update(P1, true);
        assert!(tracker.is_on(P1));
    }

    #[test]
    fn test_toggles_independent() {
        let mut tracker = ToggleTracker::new(vec![P1, P2, ToggleId::ArmPreset(0)]);

        tracker.update_all(vec![(P2, true), (P1, false), (ToggleId::ArmPreset(0), true)]);

        assert!(!tracker.is_on(P1));
        assert!(tracker.is_on(P2));
        assert!(tracker.is_on(ToggleId::ArmPreset(0)));
        assert_eq!(tracker.lift_presets_on(), vec![1]);

        tracker.update_all(vec![(P1, true), (P2, true)]);
        assert_eq!(tracker.lift_presets_on(), vec![0, 1]);
    }

    #[test]
    fn test_ordering() {
        assert!(ToggleId::LiftPreset(5) < ToggleId::ArmPreset(0));
        assert!(ToggleId::LiftPreset(0) < ToggleId::LiftPreset(1));

        let tracker = ToggleTracker::new(vec![ToggleId::ArmPreset(0), P2, P1]);
        let ids: Vec<_> = tracker.states().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![P1, P2, ToggleId::ArmPreset(0)]);
    }
}
