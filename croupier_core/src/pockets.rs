use croupier_shared::Color;
use serde::{Deserialize, Serialize};

/// Numbers 0 through 36 on a single-zero wheel.
pub const POCKET_COUNT: u8 = 37;

/// Red numbers on a roulette wheel.
pub const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pocket(u8);

impl Pocket {
    pub const ZERO: Pocket = Pocket(0);

    pub fn from_index(i: u8) -> Option<Self> {
        (i < POCKET_COUNT).then_some(Pocket(i))
    }

    pub fn to_index(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn color(self) -> Color {
        if self.0 == 0 {
            Color::Green
        } else if RED_NUMBERS.contains(&self.0) {
            Color::Red
        } else {
            Color::Black
        }
    }

    /// Every pocket in wheel-table order, zero first.
    pub fn all() -> impl Iterator<Item = Pocket> {
        (0..POCKET_COUNT).map(Pocket)
    }
}

/// Color of a raw result, `None` when it is off the wheel.
pub fn color_of(n: u8) -> Option<Color> {
    Pocket::from_index(n).map(Pocket::color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pocket_has_exactly_one_color() {
        let mut reds = 0;
        let mut blacks = 0;
        for pocket in Pocket::all() {
            match pocket.color() {
                Color::Green => assert!(pocket.is_zero()),
                Color::Red => {
                    assert!(RED_NUMBERS.contains(&pocket.to_index()));
                    reds += 1;
                }
                Color::Black => {
                    assert!(!pocket.is_zero());
                    assert!(!RED_NUMBERS.contains(&pocket.to_index()));
                    blacks += 1;
                }
            }
        }
        assert_eq!(reds, 18);
        assert_eq!(blacks, 18);
    }

    #[test]
    fn color_is_not_parity() {
        // 10 and 11 are both black, 18 and 19 both red
        assert_eq!(color_of(10), Some(Color::Black));
        assert_eq!(color_of(11), Some(Color::Black));
        assert_eq!(color_of(18), Some(Color::Red));
        assert_eq!(color_of(19), Some(Color::Red));
        assert_eq!(color_of(37), None);
    }
}
