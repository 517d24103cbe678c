//! Turn instructions as classified by the search and rewritten by guidance

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maneuver type of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnType {
    /// Never valid in a finished route
    Invalid,
    /// Continuation without a maneuver; never starts a step
    #[default]
    NoTurn,
    NewName,
    Continue,
    Turn,
    Merge,
    OnRamp,
    OffRamp,
    Fork,
    EndOfRoad,
    Notification,
    EnterRoundabout,
    EnterAndExitRoundabout,
    EnterRoundaboutAtExit,
    ExitRoundabout,
    EnterRotary,
    EnterAndExitRotary,
    EnterRotaryAtExit,
    ExitRotary,
    StayOnRoundabout,
    UseLane,
    /// Classified but deliberately not announced
    Suppressed,
}

impl TurnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnType::Invalid => "invalid",
            TurnType::NoTurn => "no turn",
            TurnType::NewName => "new name",
            TurnType::Continue => "continue",
            TurnType::Turn => "turn",
            TurnType::Merge => "merge",
            TurnType::OnRamp => "on ramp",
            TurnType::OffRamp => "off ramp",
            TurnType::Fork => "fork",
            TurnType::EndOfRoad => "end of road",
            TurnType::Notification => "notification",
            TurnType::EnterRoundabout
            | TurnType::EnterAndExitRoundabout
            | TurnType::EnterRoundaboutAtExit => "roundabout",
            TurnType::ExitRoundabout => "exit roundabout",
            TurnType::EnterRotary | TurnType::EnterAndExitRotary | TurnType::EnterRotaryAtExit => {
                "rotary"
            }
            TurnType::ExitRotary => "exit rotary",
            TurnType::StayOnRoundabout => "roundabout turn",
            TurnType::UseLane => "use lane",
            TurnType::Suppressed => "suppressed",
        }
    }

    pub fn enters_roundabout(&self) -> bool {
        matches!(
            self,
            TurnType::EnterRoundabout
                | TurnType::EnterAndExitRoundabout
                | TurnType::EnterRoundaboutAtExit
                | TurnType::EnterRotary
                | TurnType::EnterAndExitRotary
                | TurnType::EnterRotaryAtExit
        )
    }

    /// Entering and leaving at the very next exit
    pub fn enters_and_exits_roundabout(&self) -> bool {
        matches!(
            self,
            TurnType::EnterAndExitRoundabout | TurnType::EnterAndExitRotary
        )
    }

    /// Entry point is itself an exit, which counts towards the exit number
    pub fn enters_roundabout_at_exit(&self) -> bool {
        matches!(
            self,
            TurnType::EnterRoundaboutAtExit | TurnType::EnterRotaryAtExit
        )
    }

    pub fn leaves_roundabout(&self) -> bool {
        matches!(self, TurnType::ExitRoundabout | TurnType::ExitRotary)
    }

    pub fn is_roundabout(&self) -> bool {
        self.enters_roundabout()
            || self.leaves_roundabout()
            || *self == TurnType::StayOnRoundabout
    }

    /// Steps of this type produce no announcement
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            TurnType::NoTurn | TurnType::Suppressed | TurnType::StayOnRoundabout
        )
    }

    /// Only the road name changes, the driver keeps going
    pub fn is_name_change(&self) -> bool {
        matches!(self, TurnType::NewName | TurnType::Notification)
    }
}

impl fmt::Display for TurnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a maneuver relative to the approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionModifier {
    UTurn,
    SharpRight,
    Right,
    SlightRight,
    #[default]
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
}

impl DirectionModifier {
    /// Classify a turn angle (180 = straight, below 180 = right, see
    /// [`crate::geo::turn_angle`])
    pub fn from_angle(angle: f64) -> Self {
        if angle > 0.0 && angle < 60.0 {
            DirectionModifier::SharpRight
        } else if (60.0..140.0).contains(&angle) {
            DirectionModifier::Right
        } else if (140.0..160.0).contains(&angle) {
            DirectionModifier::SlightRight
        } else if (160.0..=200.0).contains(&angle) {
            DirectionModifier::Straight
        } else if angle > 200.0 && angle <= 220.0 {
            DirectionModifier::SlightLeft
        } else if angle > 220.0 && angle <= 300.0 {
            DirectionModifier::Left
        } else if angle > 300.0 && angle < 360.0 {
            DirectionModifier::SharpLeft
        } else {
            DirectionModifier::UTurn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionModifier::UTurn => "uturn",
            DirectionModifier::SharpRight => "sharp right",
            DirectionModifier::Right => "right",
            DirectionModifier::SlightRight => "slight right",
            DirectionModifier::Straight => "straight",
            DirectionModifier::SlightLeft => "slight left",
            DirectionModifier::Left => "left",
            DirectionModifier::SharpLeft => "sharp left",
        }
    }

    pub fn is_right(&self) -> bool {
        matches!(
            self,
            DirectionModifier::SharpRight | DirectionModifier::Right | DirectionModifier::SlightRight
        )
    }

    pub fn is_left(&self) -> bool {
        matches!(
            self,
            DirectionModifier::SharpLeft | DirectionModifier::Left | DirectionModifier::SlightLeft
        )
    }

    pub fn is_straight(&self) -> bool {
        matches!(
            self,
            DirectionModifier::Straight
                | DirectionModifier::SlightLeft
                | DirectionModifier::SlightRight
        )
    }
}

impl fmt::Display for DirectionModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type plus direction, as classified at one junction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnInstruction {
    #[serde(rename = "type")]
    pub turn_type: TurnType,
    #[serde(default)]
    pub direction_modifier: DirectionModifier,
}

impl TurnInstruction {
    pub const fn new(turn_type: TurnType, direction_modifier: DirectionModifier) -> Self {
        Self {
            turn_type,
            direction_modifier,
        }
    }

    pub const fn no_turn() -> Self {
        Self::new(TurnType::NoTurn, DirectionModifier::Straight)
    }
}

impl fmt::Display for TurnInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.turn_type, self.direction_modifier)
    }
}

/// Role of a step with respect to the leg's waypoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointType {
    #[default]
    None,
    Depart,
    Arrive,
}

/// Travel mode of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    #[default]
    Driving,
    Cycling,
    Walking,
    Ferry,
}

/// Lanes usable for a turn, counted from the right-most lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneTuple {
    pub lanes_in_turn: u8,
    pub first_lane_from_right: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_classification_boundaries() {
        assert_eq!(DirectionModifier::from_angle(0.0), DirectionModifier::UTurn);
        assert_eq!(DirectionModifier::from_angle(30.0), DirectionModifier::SharpRight);
        assert_eq!(DirectionModifier::from_angle(90.0), DirectionModifier::Right);
        assert_eq!(DirectionModifier::from_angle(150.0), DirectionModifier::SlightRight);
        assert_eq!(DirectionModifier::from_angle(180.0), DirectionModifier::Straight);
        assert_eq!(DirectionModifier::from_angle(210.0), DirectionModifier::SlightLeft);
        assert_eq!(DirectionModifier::from_angle(270.0), DirectionModifier::Left);
        assert_eq!(DirectionModifier::from_angle(330.0), DirectionModifier::SharpLeft);
    }

    #[test]
    fn test_instruction_display() {
        let instruction = TurnInstruction::new(TurnType::Turn, DirectionModifier::SharpRight);
        assert_eq!(instruction.to_string(), "turn sharp right");
        let instruction = TurnInstruction::new(TurnType::EndOfRoad, DirectionModifier::Left);
        assert_eq!(instruction.to_string(), "end of road left");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let instruction: TurnInstruction =
            serde_json::from_str(r#"{"type":"turn","direction_modifier":"sharp_right"}"#).unwrap();
        assert_eq!(instruction.turn_type, TurnType::Turn);
        assert_eq!(instruction.direction_modifier, DirectionModifier::SharpRight);

        let json = serde_json::to_string(&TurnType::EnterRoundaboutAtExit).unwrap();
        assert_eq!(json, "\"enter_roundabout_at_exit\"");
    }

    #[test]
    fn test_roundabout_predicates() {
        assert!(TurnType::EnterRotary.enters_roundabout());
        assert!(TurnType::EnterAndExitRoundabout.enters_and_exits_roundabout());
        assert!(TurnType::EnterRoundaboutAtExit.enters_roundabout_at_exit());
        assert!(TurnType::ExitRotary.leaves_roundabout());
        assert!(TurnType::StayOnRoundabout.is_roundabout());
        assert!(!TurnType::Turn.is_roundabout());
    }

    #[test]
    fn test_silent_types() {
        assert!(TurnType::Suppressed.is_silent());
        assert!(TurnType::NoTurn.is_silent());
        assert!(!TurnType::NewName.is_silent());
        assert!(!TurnType::Turn.is_silent());
    }
}
