//! Criteria used by bonuses and prerequisites to pick their targets.
//!
//! String comparisons ignore case. List matching is asymmetric: positive
//! operators need one element to match, negative operators need every element
//! to match, and an empty list is tested as a single empty string.

use crate::fixed::Fixed;
use crate::measure::Weight;

/// Comparison applied by a [`StringCriteria`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StringCompare {
    #[default]
    Any,
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    StartsWith,
    DoesNotStartWith,
    EndsWith,
    DoesNotEndWith,
}

impl StringCompare {
    /// True for the negated operators, which must hold for every list element.
    pub const fn is_exclusive(self) -> bool {
        matches!(
            self,
            Self::IsNot | Self::DoesNotContain | Self::DoesNotStartWith | Self::DoesNotEndWith
        )
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::Any => "is anything",
            Self::Is => "is",
            Self::IsNot => "is not",
            Self::Contains => "contains",
            Self::DoesNotContain => "does not contain",
            Self::StartsWith => "starts with",
            Self::DoesNotStartWith => "does not start with",
            Self::EndsWith => "ends with",
            Self::DoesNotEndWith => "does not end with",
        }
    }
}

/// Matches text against a qualifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StringCriteria {
    pub compare: StringCompare,
    pub qualifier: String,
}

impl StringCriteria {
    pub fn new(compare: StringCompare, qualifier: impl Into<String>) -> Self {
        Self {
            compare,
            qualifier: qualifier.into(),
        }
    }

    /// Matches anything.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is(qualifier: impl Into<String>) -> Self {
        Self::new(StringCompare::Is, qualifier)
    }

    pub fn matches(&self, value: &str) -> bool {
        if self.compare == StringCompare::Any {
            return true;
        }
        let value = value.to_lowercase();
        let qualifier = self.qualifier.to_lowercase();
        match self.compare {
            StringCompare::Any => true,
            StringCompare::Is => value == qualifier,
            StringCompare::IsNot => value != qualifier,
            StringCompare::Contains => value.contains(&qualifier),
            StringCompare::DoesNotContain => !value.contains(&qualifier),
            StringCompare::StartsWith => value.starts_with(&qualifier),
            StringCompare::DoesNotStartWith => !value.starts_with(&qualifier),
            StringCompare::EndsWith => value.ends_with(&qualifier),
            StringCompare::DoesNotEndWith => !value.ends_with(&qualifier),
        }
    }

    /// Matches a set of values such as tags or colleges.
    pub fn matches_list<S: AsRef<str>>(&self, values: &[S]) -> bool {
        if values.is_empty() {
            return self.matches("");
        }
        if self.compare.is_exclusive() {
            values.iter().all(|value| self.matches(value.as_ref()))
        } else {
            values.iter().any(|value| self.matches(value.as_ref()))
        }
    }

    /// Describes the test for explanatory text, e.g. `is "Broadsword"`.
    pub fn describe(&self) -> String {
        if self.compare == StringCompare::Any {
            return self.compare.phrase().to_owned();
        }
        format!("{} \"{}\"", self.compare.phrase(), self.qualifier)
    }
}

/// Comparison applied by numeric and weight criteria.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NumericCompare {
    #[default]
    Any,
    Equals,
    NotEquals,
    AtLeast,
    AtMost,
}

impl NumericCompare {
    fn test<T: PartialOrd>(self, value: &T, qualifier: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Equals => value == qualifier,
            Self::NotEquals => value != qualifier,
            Self::AtLeast => value >= qualifier,
            Self::AtMost => value <= qualifier,
        }
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::Any => "anything",
            Self::Equals => "exactly",
            Self::NotEquals => "not",
            Self::AtLeast => "at least",
            Self::AtMost => "at most",
        }
    }
}

/// Matches a number against a qualifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NumericCriteria {
    pub compare: NumericCompare,
    pub qualifier: Fixed,
}

impl NumericCriteria {
    pub fn new(compare: NumericCompare, qualifier: impl Into<Fixed>) -> Self {
        Self {
            compare,
            qualifier: qualifier.into(),
        }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn at_least(qualifier: impl Into<Fixed>) -> Self {
        Self::new(NumericCompare::AtLeast, qualifier)
    }

    pub fn matches(&self, value: Fixed) -> bool {
        self.compare.test(&value, &self.qualifier)
    }

    pub fn describe(&self) -> String {
        if self.compare == NumericCompare::Any {
            return self.compare.phrase().to_owned();
        }
        format!("{} {}", self.compare.phrase(), self.qualifier)
    }
}

/// Matches a weight against a qualifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeightCriteria {
    pub compare: NumericCompare,
    pub qualifier: Weight,
}

impl WeightCriteria {
    pub fn new(compare: NumericCompare, qualifier: Weight) -> Self {
        Self { compare, qualifier }
    }

    pub fn matches(&self, value: Weight) -> bool {
        self.compare.test(&value, &self.qualifier)
    }

    pub fn describe(&self) -> String {
        if self.compare == NumericCompare::Any {
            return self.compare.phrase().to_owned();
        }
        format!("{} {}", self.compare.phrase(), self.qualifier)
    }
}
