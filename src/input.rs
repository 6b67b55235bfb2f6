//! Translate raw key names and swipe gestures into directions.

use crate::engine::Direction;

/// Swipes shorter than this (in pixels, along the dominant axis) are ignored.
pub const SWIPE_THRESHOLD: f64 = 20.0;

/// Arrow keys and WASD, matching DOM `KeyboardEvent.key` names.
pub fn direction_for_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        "ArrowUp" | "w" | "W" => Some(Direction::Up),
        "ArrowDown" | "s" | "S" => Some(Direction::Down),
        _ => None,
    }
}

/// Classify a swipe from its start-to-end delta. Screen y grows downwards.
pub fn swipe_direction(dx: f64, dy: f64) -> Option<Direction> {
    let (abs_x, abs_y) = (dx.abs(), dy.abs());
    if abs_x.max(abs_y) < SWIPE_THRESHOLD {
        return None;
    }
    if abs_x > abs_y {
        Some(if dx > 0.0 { Direction::Right } else { Direction::Left })
    } else {
        Some(if dy > 0.0 { Direction::Down } else { Direction::Up })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        assert_eq!(direction_for_key("ArrowLeft"), Some(Direction::Left));
        assert_eq!(direction_for_key("W"), Some(Direction::Up));
        assert_eq!(direction_for_key("s"), Some(Direction::Down));
        assert_eq!(direction_for_key("d"), Some(Direction::Right));
        assert_eq!(direction_for_key("Enter"), None);
    }

    #[test]
    fn swipes() {
        assert_eq!(swipe_direction(5.0, -10.0), None);
        assert_eq!(swipe_direction(40.0, 10.0), Some(Direction::Right));
        assert_eq!(swipe_direction(-40.0, 39.0), Some(Direction::Left));
        assert_eq!(swipe_direction(3.0, 25.0), Some(Direction::Down));
        assert_eq!(swipe_direction(-30.0, -30.0), Some(Direction::Up));
    }
}
