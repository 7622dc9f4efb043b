//! Dice formulas such as `2d6+1`.
//!
//! Dice are described, never rolled.

use core::fmt;

/// A dice formula: `count`d`sides` plus `modifier`, times `multiplier`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dice {
    pub count: i32,
    pub sides: i32,
    pub modifier: i32,
    pub multiplier: i32,
}

impl Dice {
    /// Six-sided dice with a flat modifier.
    pub const fn d6(count: i32, modifier: i32) -> Self {
        Self {
            count,
            sides: 6,
            modifier,
            multiplier: 1,
        }
    }

    /// Returns a copy with `delta` added to the modifier.
    #[must_use]
    pub const fn with_modifier_delta(self, delta: i32) -> Self {
        Self {
            modifier: self.modifier + delta,
            ..self
        }
    }

    /// Lowest and highest possible totals.
    pub const fn range(self) -> (i32, i32) {
        let low = (self.count + self.modifier) * self.multiplier;
        let high = (self.count * self.sides + self.modifier) * self.multiplier;
        (low, high)
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::d6(1, 0)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.count)?;
        if self.sides != 6 {
            write!(f, "{}", self.sides)?;
        }
        if self.modifier != 0 {
            write!(f, "{:+}", self.modifier)?;
        }
        if self.multiplier != 1 {
            write!(f, "x{}", self.multiplier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_defaults() {
        assert_eq!(Dice::d6(1, 0).to_string(), "1d");
        assert_eq!(Dice::d6(2, -1).to_string(), "2d-1");
        let big = Dice {
            count: 3,
            sides: 10,
            modifier: 2,
            multiplier: 2,
        };
        assert_eq!(big.to_string(), "3d10+2x2");
    }

    #[test]
    fn modifier_delta_keeps_count() {
        let dice = Dice::d6(1, 2).with_modifier_delta(-2);
        assert_eq!(dice, Dice::d6(1, 0));
        assert_eq!(dice.range(), (1, 6));
    }
}
