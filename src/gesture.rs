use std::str::FromStr;

use crate::error::InputError;

pub const SWIPE_THRESHOLD_X: f64 = 150.0;
pub const SWIPE_THRESHOLD_UP: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOffset {
    pub x: f64,
    pub y: f64,
}

impl DragOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Approve,
    Escalate,
    Expand,
    None,
}

/// Resolves a released drag. Horizontal swipes win over the upward one.
pub fn classify(offset: DragOffset) -> Action {
    if offset.x > SWIPE_THRESHOLD_X {
        Action::Approve
    } else if offset.x < -SWIPE_THRESHOLD_X {
        Action::Escalate
    } else if offset.y < -SWIPE_THRESHOLD_UP {
        Action::Expand
    } else {
        Action::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
}

impl KeyCode {
    pub fn action(self) -> Action {
        match self {
            KeyCode::ArrowRight => Action::Approve,
            KeyCode::ArrowLeft => Action::Escalate,
            KeyCode::ArrowUp => Action::Expand,
        }
    }
}

impl FromStr for KeyCode {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ArrowLeft" => Ok(KeyCode::ArrowLeft),
            "ArrowRight" => Ok(KeyCode::ArrowRight),
            "ArrowUp" => Ok(KeyCode::ArrowUp),
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_wins_over_vertical() {
        assert_eq!(classify(DragOffset::new(200.0, -200.0)), Action::Approve);
        assert_eq!(classify(DragOffset::new(-200.0, -200.0)), Action::Escalate);
    }

    #[test]
    fn each_direction_resolves() {
        assert_eq!(classify(DragOffset::new(-160.0, 0.0)), Action::Escalate);
        assert_eq!(classify(DragOffset::new(0.0, -150.0)), Action::Expand);
        assert_eq!(classify(DragOffset::new(50.0, 50.0)), Action::None);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(classify(DragOffset::new(150.0, 0.0)), Action::None);
        assert_eq!(classify(DragOffset::new(-150.0, 0.0)), Action::None);
        assert_eq!(classify(DragOffset::new(0.0, -100.0)), Action::None);
        assert_eq!(classify(DragOffset::new(0.0, 400.0)), Action::None);
    }

    #[test]
    fn arrow_keys_map_to_actions() {
        assert_eq!("ArrowRight".parse::<KeyCode>().map(KeyCode::action), Ok(Action::Approve));
        assert_eq!("ArrowLeft".parse::<KeyCode>().map(KeyCode::action), Ok(Action::Escalate));
        assert_eq!("ArrowUp".parse::<KeyCode>().map(KeyCode::action), Ok(Action::Expand));
        assert_eq!(
            "ArrowDown".parse::<KeyCode>(),
            Err(InputError::UnknownCommand("ArrowDown".to_string()))
        );
    }
}
