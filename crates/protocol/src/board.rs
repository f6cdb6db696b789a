//! Board coordinates
//!
//! The backend addresses intersections with 1-based coordinates on a 19x19
//! board. Values are validated when constructed so an out-of-range move can
//! never be serialized.

use serde::{Deserialize, Serialize};

/// Number of lines on each side of the board.
pub const BOARD_SIZE: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("coordinate {value} is outside the board (1..={max})", max = BOARD_SIZE)]
pub struct CoordinateError {
    pub value: u8,
}

/// A single 1-based board coordinate in `1..=19`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Coordinate(u8);

impl Coordinate {
    pub fn new(value: u8) -> Result<Self, CoordinateError> {
        if (1..=BOARD_SIZE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CoordinateError { value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Coordinate {
    type Error = CoordinateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Coordinate> for u8 {
    fn from(c: Coordinate) -> Self {
        c.0
    }
}

/// An intersection on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardPoint {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl BoardPoint {
    pub fn new(x: u8, y: u8) -> Result<Self, CoordinateError> {
        Ok(Self {
            x: Coordinate::new(x)?,
            y: Coordinate::new(y)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_are_valid() {
        assert!(BoardPoint::new(1, 1).is_ok());
        assert!(BoardPoint::new(19, 19).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert_eq!(Coordinate::new(0), Err(CoordinateError { value: 0 }));
        assert_eq!(
            BoardPoint::new(4, 20).unwrap_err(),
            CoordinateError { value: 20 }
        );
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Coordinate>("7").is_ok());
        assert!(serde_json::from_str::<Coordinate>("42").is_err());
    }

    #[test]
    fn test_error_message() {
        let err = Coordinate::new(25).unwrap_err();
        assert_eq!(err.to_string(), "coordinate 25 is outside the board (1..=19)");
    }
}
