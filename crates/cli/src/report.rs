//! Plain-text rendering of a resolved sheet.
use std::fmt;

use sheet_core::node;
use sheet_core::{AttributeType, Encumbrance, Entity, Fixed, SkillLevel};

use crate::config::CliConfig;

pub fn render(entity: &Entity, config: &CliConfig) -> String {
    SheetReport {
        entity,
        show_tooltips: config.show_tooltips,
    }
    .to_string()
}

struct SheetReport<'a> {
    entity: &'a Entity,
    show_tooltips: bool,
}

impl SheetReport<'_> {
    fn attributes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity;
        for def in entity.settings.attributes.list() {
            if def.is_separator() {
                writeln!(f, "-- {} --", def.name)?;
                continue;
            }
            let (Some(current), Some(maximum)) = (
                entity.attribute_current(&def.id),
                entity.attribute_maximum(&def.id),
            ) else {
                continue;
            };
            let cost = entity.attribute_point_cost(&def.id).unwrap_or_default();
            if def.attr_type == AttributeType::Pool {
                let state = entity
                    .current_threshold(&def.id)
                    .map(|t| t.state.as_str())
                    .unwrap_or("");
                writeln!(f, "{:<16} {current}/{maximum} [{cost}] {state}", def.name)?;
            } else {
                writeln!(f, "{:<16} {current} [{cost}]", def.name)?;
            }
        }
        Ok(())
    }

    fn physical(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity;
        let current = entity.encumbrance_level(false);
        writeln!(
            f,
            "Basic Lift {}  Thrust {}  Swing {}",
            entity.basic_lift(),
            entity.thrust(),
            entity.swing()
        )?;
        for level in Encumbrance::ALL {
            let marker = if level == current { '*' } else { ' ' };
            writeln!(
                f,
                "{marker} {:<12} max {:<10} move {:>2}  dodge {:>2}",
                level.to_string(),
                entity.maximum_carry(level).to_string(),
                entity.move_at(level),
                entity.dodge_at(level)
            )?;
        }
        Ok(())
    }

    fn level(&self, f: &mut fmt::Formatter<'_>, name: &str, points: Fixed, level: &SkillLevel) -> fmt::Result {
        match level.level {
            Some(value) => writeln!(f, "{name:<32} {value:>3} ({:+}) [{points}]", level.relative_level.as_i32())?,
            None => writeln!(f, "{name:<32}   - [{points}]")?,
        }
        if self.show_tooltips && !level.tooltip.is_empty() {
            for line in level.tooltip.lines().filter(|line| !line.is_empty()) {
                writeln!(f, "    {line}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for SheetReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = self.entity;
        let points = entity.points_breakdown();
        writeln!(f, "{}", entity.profile.name)?;
        writeln!(
            f,
            "Points {} spent, {} unspent (attributes {}, advantages {}, disadvantages {}, quirks {}, skills {}, spells {})",
            points.total(),
            entity.unspent_points(),
            points.attributes,
            points.advantages,
            points.disadvantages,
            points.quirks,
            points.skills,
            points.spells
        )?;

        writeln!(f, "\nAttributes")?;
        self.attributes(f)?;

        writeln!(f, "\nLifting and Movement")?;
        self.physical(f)?;

        if !entity.skills.is_empty() {
            writeln!(f, "\nSkills")?;
            for skill in node::leaves(&entity.skills) {
                self.level(f, &skill.display_name(), skill.points, &skill.level)?;
            }
        }
        if !entity.spells.is_empty() {
            writeln!(f, "\nSpells")?;
            for spell in node::leaves(&entity.spells) {
                self.level(f, &spell.display_name(), spell.points, &spell.level)?;
            }
        }

        let reactions = entity.reactions();
        if !reactions.is_empty() {
            writeln!(f, "\nReactions")?;
            for reaction in reactions {
                writeln!(f, "{:+} {}", reaction.total().as_i32(), reaction.situation)?;
            }
        }

        let unmet: Vec<(String, &str)> = node::walk(&entity.traits)
            .map(|t| (t.name.clone(), t.unsatisfied_reason.as_str()))
            .chain(node::walk(&entity.skills).map(|s| (s.display_name(), s.unsatisfied_reason.as_str())))
            .chain(node::walk(&entity.spells).map(|s| (s.display_name(), s.unsatisfied_reason.as_str())))
            .filter(|(_, reason)| !reason.is_empty())
            .collect();
        if !unmet.is_empty() {
            writeln!(f, "\nUnmet Prerequisites")?;
            for (name, reason) in unmet {
                writeln!(f, "{name}: {}", reason.replace('\n', "\n  "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_core::{AttributeDifficulty, EntityData, SheetSettings, Skill, Trait};

    #[test]
    fn report_lists_resolved_values() {
        let mut data = EntityData::default();
        data.profile.name = "Ilsa".into();
        data.traits.push(Trait::new("Fit", 5));
        data.skills.push(Skill::new("Climbing", AttributeDifficulty::default(), 2));
        let entity = Entity::new(data, SheetSettings::default());

        let text = render(&entity, &CliConfig::default());
        assert!(text.starts_with("Ilsa\n"));
        assert!(text.contains("Points 7 spent"));
        assert!(text.contains("Basic Lift 20 lb"));
        assert!(text.contains("Climbing"));
        assert!(!text.contains("Unmet Prerequisites"));
    }
}
