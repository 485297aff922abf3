//! Actions flowing through the history controller and the time travel labels.

use rewind_core::{Snapshot, Value};

/// Label of a request to step one entry back in history (undo).
pub const TIME_TRAVEL_BACKWARD: &str = "TIME_TRAVEL_BACKWARD";
/// Label of a request to step one entry forward in history (redo).
pub const TIME_TRAVEL_FORWARD: &str = "TIME_TRAVEL_FORWARD";
/// Label of a request to drop all history and the diff baseline.
pub const TIME_TRAVEL_RESET: &str = "TIME_TRAVEL_RESET";

/// An action dispatched to the host's state container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Action label, used for ignore and grouping decisions.
    pub kind: String,
    /// Host-defined payload, passed through untouched.
    pub payload: Option<Value>,
    /// Watched slices reconstructed by a successful navigation. The host
    /// folds these into its state under the same keys. A slice holding
    /// `Value::Undefined` is one the navigation removes.
    pub adjusted_reality: Option<Snapshot>,
}

impl Action {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
            adjusted_reality: None,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            payload: Some(payload.into()),
            ..Self::new(kind)
        }
    }

    pub fn backward() -> Self {
        Self::new(TIME_TRAVEL_BACKWARD)
    }

    pub fn forward() -> Self {
        Self::new(TIME_TRAVEL_FORWARD)
    }

    pub fn reset() -> Self {
        Self::new(TIME_TRAVEL_RESET)
    }

    /// Classifies the action by its label.
    pub fn request(&self) -> Request {
        match self.kind.as_str() {
            TIME_TRAVEL_BACKWARD => Request::Travel(Direction::Backward),
            TIME_TRAVEL_FORWARD => Request::Travel(Direction::Forward),
            TIME_TRAVEL_RESET => Request::Reset,
            _ => Request::Change,
        }
    }
}

/// What the controller should do with an incoming action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Travel(Direction),
    Reset,
    /// Any other action: a potential state change to record.
    Change,
}

/// Direction of travel through history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards older entries (undo).
    Backward,
    /// Towards newer entries (redo).
    #[default]
    Forward,
}

impl Direction {
    /// Index offset for one step: older entries sit at higher indices.
    pub fn step(self) -> isize {
        match self {
            Direction::Backward => 1,
            Direction::Forward => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_classification() {
        assert_eq!(
            Action::backward().request(),
            Request::Travel(Direction::Backward)
        );
        assert_eq!(
            Action::forward().request(),
            Request::Travel(Direction::Forward)
        );
        assert_eq!(Action::reset().request(), Request::Reset);
        assert_eq!(Action::new("INCREMENT").request(), Request::Change);
    }

    #[test]
    fn test_step_signs() {
        assert_eq!(Direction::Backward.step(), 1);
        assert_eq!(Direction::Forward.step(), -1);
        assert_eq!(Direction::default(), Direction::Forward);
    }

    #[test]
    fn test_with_payload() {
        let action = Action::with_payload("SET", 5);
        assert_eq!(action.kind, "SET");
        assert_eq!(action.payload, Some(Value::from(5)));
        assert!(action.adjusted_reality.is_none());
    }
}
