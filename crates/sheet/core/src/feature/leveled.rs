use crate::fixed::Fixed;

/// An amount that may scale with the level of whatever grants it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LeveledAmount {
    pub amount: Fixed,
    pub per_level: bool,
    /// Scale by whole levels only, so a trait at 1.5 levels counts as 1.
    pub use_truncated_level: bool,
    /// Set by the collector each pass; never persisted.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub level: Fixed,
}

impl LeveledAmount {
    pub const fn flat(amount: Fixed) -> Self {
        Self {
            amount,
            per_level: false,
            use_truncated_level: false,
            level: Fixed::ZERO,
        }
    }

    pub const fn per_level(amount: Fixed) -> Self {
        Self {
            amount,
            per_level: true,
            use_truncated_level: false,
            level: Fixed::ZERO,
        }
    }

    #[must_use]
    pub const fn truncated(self) -> Self {
        Self {
            use_truncated_level: true,
            ..self
        }
    }

    #[must_use]
    pub const fn at_level(self, level: Fixed) -> Self {
        Self { level, ..self }
    }

    /// The amount after leveling. Negative levels contribute nothing.
    pub fn adjusted_amount(&self) -> Fixed {
        if !self.per_level {
            return self.amount;
        }
        let level = if self.use_truncated_level { self.level.trunc() } else { self.level };
        if level.is_negative() {
            Fixed::ZERO
        } else {
            self.amount * level
        }
    }

    /// Tooltip form such as `+2`, `+1 per level` or `+1 per whole level`.
    pub fn format(&self, what: &str) -> String {
        let amount = self.amount.to_signed_string();
        if self.per_level && self.use_truncated_level {
            format!("{amount} per whole {what}")
        } else if self.per_level {
            format!("{amount} per {what}")
        } else {
            amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_level_scales_with_level() {
        let amount = LeveledAmount::per_level(Fixed::from(2)).at_level(Fixed::from(3));
        assert_eq!(amount.adjusted_amount(), Fixed::from(6));
        assert_eq!(amount.format("level"), "+2 per level");
    }

    #[test]
    fn truncated_level_drops_fractions() {
        let half = Fixed::from_f64(1.5);
        let amount = LeveledAmount::per_level(Fixed::from(2)).at_level(half);
        assert_eq!(amount.adjusted_amount(), Fixed::from(3));
        let whole = amount.truncated();
        assert_eq!(whole.adjusted_amount(), Fixed::from(2));
        assert_eq!(whole.format("level"), "+2 per whole level");
    }

    #[test]
    fn negative_level_contributes_nothing() {
        let amount = LeveledAmount::per_level(Fixed::from(2)).at_level(Fixed::from(-1));
        assert_eq!(amount.adjusted_amount(), Fixed::ZERO);
    }

    #[test]
    fn flat_amount_ignores_level() {
        let amount = LeveledAmount::flat(Fixed::from(-3)).at_level(Fixed::from(5));
        assert_eq!(amount.adjusted_amount(), Fixed::from(-3));
        assert_eq!(amount.format("level"), "-3");
    }
}
