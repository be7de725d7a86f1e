use serde::{Deserialize, Serialize};

use crate::controller::session::ScanOutcome;

/// Lifecycle of the scan controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    #[default]
    Idle,
    Positioning,
    Sweeping,
    Completed,
    Aborted,
}

impl ScanState {
    pub fn is_active(self) -> bool {
        matches!(self, ScanState::Positioning | ScanState::Sweeping)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ScanState::Completed | ScanState::Aborted)
    }

    pub fn can_transition_to(self, next: ScanState) -> bool {
        use ScanState::*;
        matches!(
            (self, next),
            (Idle, Positioning)
                | (Positioning, Sweeping)
                | (Positioning, Aborted)
                | (Sweeping, Completed)
                | (Sweeping, Aborted)
                | (Completed, Idle)
                | (Aborted, Idle)
        )
    }
}

/// Snapshot of the controller readable while a scan runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStatus {
    pub state: ScanState,
    pub azimuth: Option<f64>,
    pub elevation: Option<f64>,
    pub steps_completed: usize,
    pub total_steps: usize,
    pub last_frequency_hz: Option<f64>,
    pub last_outcome: Option<ScanOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_documented_transitions_are_allowed() {
        assert!(ScanState::Idle.can_transition_to(ScanState::Positioning));
        assert!(ScanState::Positioning.can_transition_to(ScanState::Aborted));
        assert!(ScanState::Aborted.can_transition_to(ScanState::Idle));
        assert!(!ScanState::Idle.can_transition_to(ScanState::Sweeping));
        assert!(!ScanState::Positioning.can_transition_to(ScanState::Completed));
        assert!(!ScanState::Completed.can_transition_to(ScanState::Sweeping));
    }

    #[test]
    fn state_serializes_in_snake_case() {
        let json = serde_json::to_string(&ScanState::Sweeping).unwrap();
        assert_eq!(json, "\"sweeping\"");
        assert!(ScanState::Sweeping.is_active());
        assert!(ScanState::Aborted.is_terminal());
    }
}
