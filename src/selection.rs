use serde::{Deserialize, Serialize};

use crate::gesture::{Direction, GestureState};
use crate::words::{DisplayedTriple, Slot};

/// How a held gesture is kept from selecting the same word on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceMode {
    /// Suppress while the candidate word equals the last selected word.
    /// A neutral pose does not re-arm, and the same word shown in another
    /// slot is suppressed too.
    Word,
    /// Suppress while the same slot presents the same word. A neutral pose
    /// re-arms.
    #[default]
    Gesture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub slot: Slot,
    pub word: String,
}

/// Slot a gesture points at. Tilts win over a bow.
pub fn candidate_slot(gesture: &GestureState) -> Option<Slot> {
    match gesture.direction {
        Direction::LeftTilt => Some(Slot::Right),
        Direction::RightTilt => Some(Slot::Left),
        Direction::Center if gesture.head_bowed => Some(Slot::Middle),
        Direction::Center => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selector {
    mode: DebounceMode,
    last_selected: Option<Selection>,
}

impl Selector {
    pub fn new(mode: DebounceMode) -> Self {
        Self {
            mode,
            last_selected: None,
        }
    }

    pub fn mode(&self) -> DebounceMode {
        self.mode
    }

    pub fn last_selected_word(&self) -> Option<&str> {
        self.last_selected.as_ref().map(|s| s.word.as_str())
    }

    /// Evaluate one frame. Returns the newly selected word, if any.
    pub fn step(&mut self, gesture: &GestureState, triple: &DisplayedTriple) -> Option<Selection> {
        let Some(slot) = candidate_slot(gesture) else {
            if self.mode == DebounceMode::Gesture {
                self.last_selected = None;
            }
            return None;
        };

        let word = triple.get(slot);
        if word.is_empty() {
            return None;
        }

        let repeated = match (&self.last_selected, self.mode) {
            (Some(last), DebounceMode::Word) => last.word == word,
            (Some(last), DebounceMode::Gesture) => last.slot == slot && last.word == word,
            (None, _) => false,
        };
        if repeated {
            return None;
        }

        let selection = Selection {
            slot,
            word: word.to_string(),
        };
        self.last_selected = Some(selection.clone());
        Some(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(direction: Direction, head_bowed: bool) -> GestureState {
        GestureState {
            direction,
            head_bowed,
            face_present: true,
            ..GestureState::default()
        }
    }

    fn yes_no_stop() -> DisplayedTriple {
        DisplayedTriple::new(["Yes", "No", "Stop"])
    }

    #[test]
    fn gestures_map_to_slots() {
        assert_eq!(candidate_slot(&gesture(Direction::LeftTilt, false)), Some(Slot::Right));
        assert_eq!(candidate_slot(&gesture(Direction::RightTilt, false)), Some(Slot::Left));
        assert_eq!(candidate_slot(&gesture(Direction::Center, true)), Some(Slot::Middle));
        assert_eq!(candidate_slot(&gesture(Direction::Center, false)), None);
        assert_eq!(candidate_slot(&gesture(Direction::LeftTilt, true)), Some(Slot::Right));
    }

    #[test]
    fn left_tilt_selects_last_word() {
        for mode in [DebounceMode::Word, DebounceMode::Gesture] {
            let mut selector = Selector::new(mode);
            let picked = selector.step(&gesture(Direction::LeftTilt, false), &yes_no_stop());
            assert_eq!(
                picked,
                Some(Selection {
                    slot: Slot::Right,
                    word: "Stop".into()
                })
            );
            assert_eq!(selector.last_selected_word(), Some("Stop"));
        }
    }

    #[test]
    fn held_gesture_selects_once() {
        for mode in [DebounceMode::Word, DebounceMode::Gesture] {
            let mut selector = Selector::new(mode);
            let held = gesture(Direction::RightTilt, false);
            let picks = (0..10)
                .filter_map(|_| selector.step(&held, &yes_no_stop()))
                .count();
            assert_eq!(picks, 1);
        }
    }

    #[test]
    fn changing_gesture_reenables_selection() {
        for mode in [DebounceMode::Word, DebounceMode::Gesture] {
            let mut selector = Selector::new(mode);
            let triple = yes_no_stop();
            assert!(selector.step(&gesture(Direction::LeftTilt, false), &triple).is_some());
            assert!(selector.step(&gesture(Direction::LeftTilt, false), &triple).is_none());
            let next = selector.step(&gesture(Direction::Center, true), &triple);
            assert_eq!(next.map(|s| s.word), Some("No".to_string()));
        }
    }

    #[test]
    fn changed_word_under_held_gesture_selects() {
        for mode in [DebounceMode::Word, DebounceMode::Gesture] {
            let mut selector = Selector::new(mode);
            let held = gesture(Direction::LeftTilt, false);
            assert!(selector.step(&held, &yes_no_stop()).is_some());
            let rotated = DisplayedTriple::new(["Go", "Help", "Water"]);
            let next = selector.step(&held, &rotated);
            assert_eq!(next.map(|s| s.word), Some("Water".to_string()));
        }
    }

    #[test]
    fn word_mode_does_not_rearm_on_neutral() {
        let mut selector = Selector::new(DebounceMode::Word);
        let tilt = gesture(Direction::LeftTilt, false);
        assert!(selector.step(&tilt, &yes_no_stop()).is_some());
        assert!(selector.step(&gesture(Direction::Center, false), &yes_no_stop()).is_none());
        assert!(selector.step(&tilt, &yes_no_stop()).is_none());
    }

    #[test]
    fn gesture_mode_rearms_on_neutral() {
        let mut selector = Selector::new(DebounceMode::Gesture);
        let tilt = gesture(Direction::LeftTilt, false);
        assert!(selector.step(&tilt, &yes_no_stop()).is_some());
        assert!(selector.step(&gesture(Direction::Center, false), &yes_no_stop()).is_none());
        assert_eq!(selector.last_selected_word(), None);
        assert!(selector.step(&tilt, &yes_no_stop()).is_some());
    }

    #[test]
    fn same_word_in_new_slot() {
        let moved = DisplayedTriple::new(["Stop", "Go", "Help"]);

        let mut by_word = Selector::new(DebounceMode::Word);
        assert!(by_word.step(&gesture(Direction::LeftTilt, false), &yes_no_stop()).is_some());
        assert!(by_word.step(&gesture(Direction::RightTilt, false), &moved).is_none());

        let mut by_gesture = Selector::new(DebounceMode::Gesture);
        assert!(by_gesture.step(&gesture(Direction::LeftTilt, false), &yes_no_stop()).is_some());
        let picked = by_gesture.step(&gesture(Direction::RightTilt, false), &moved);
        assert_eq!(picked.map(|s| s.slot), Some(Slot::Left));
    }

    #[test]
    fn blank_triple_selects_nothing() {
        let mut selector = Selector::new(DebounceMode::Gesture);
        let blank = DisplayedTriple::default();
        assert!(selector.step(&gesture(Direction::LeftTilt, false), &blank).is_none());
    }
}
