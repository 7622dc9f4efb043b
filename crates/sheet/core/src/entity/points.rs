//! Point totals by category.

use super::Entity;
use crate::fixed::Fixed;
use crate::node;
use crate::traits::{ContainerKind, Trait};

/// Character points spent, split the way the sheet reports them.
/// Disadvantages and quirks are negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PointsBreakdown {
    pub attributes: Fixed,
    pub ancestry: Fixed,
    pub advantages: Fixed,
    pub disadvantages: Fixed,
    pub quirks: Fixed,
    pub skills: Fixed,
    pub spells: Fixed,
}

impl PointsBreakdown {
    pub fn total(&self) -> Fixed {
        self.attributes
            + self.ancestry
            + self.advantages
            + self.disadvantages
            + self.quirks
            + self.skills
            + self.spells
    }

    fn add_trait(&mut self, item: &Trait) {
        if item.disabled {
            return;
        }
        if item.container {
            match item.container_kind {
                ContainerKind::Group => {
                    for child in &item.children {
                        self.add_trait(child);
                    }
                    return;
                }
                ContainerKind::Ancestry => {
                    self.ancestry += item.adjusted_points();
                    return;
                }
                ContainerKind::MetaTrait | ContainerKind::AlternativeAbilities => {}
            }
        }
        let points = item.adjusted_points();
        if points == -Fixed::ONE {
            self.quirks += points;
        } else if points.is_positive() {
            self.advantages += points;
        } else if points.is_negative() {
            self.disadvantages += points;
        }
    }
}

impl Entity {
    pub fn points_breakdown(&self) -> PointsBreakdown {
        let mut breakdown = PointsBreakdown {
            attributes: self
                .attributes
                .iter()
                .filter_map(|attribute| self.attribute_point_cost(&attribute.attr_id))
                .sum(),
            skills: node::leaves(&self.skills).map(|skill| skill.points).sum(),
            spells: node::leaves(&self.spells).map(|spell| spell.points).sum(),
            ..PointsBreakdown::default()
        };
        for item in &self.traits {
            breakdown.add_trait(item);
        }
        breakdown
    }

    pub fn spent_points(&self) -> Fixed {
        self.points_breakdown().total()
    }

    pub fn unspent_points(&self) -> Fixed {
        self.total_points - self.spent_points()
    }
}
