//! Scene presets - named rule bundles for common scene archetypes

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Predicate, RuleType, ValidationRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    BattleScene,
    RomanceScene,
    Dialogue,
    Exposition,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::BattleScene,
        Preset::RomanceScene,
        Preset::Dialogue,
        Preset::Exposition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::BattleScene => "battle-scene",
            Preset::RomanceScene => "romance-scene",
            Preset::Dialogue => "dialogue",
            Preset::Exposition => "exposition",
        }
    }

    /// Rules this preset contributes in place of the generic plot rule
    pub fn rules(&self) -> Vec<ValidationRule> {
        match self {
            Preset::BattleScene => vec![ValidationRule::new(
                RuleType::PlotAdvancement,
                Predicate::contains_any([
                    "戦い", "戦闘", "攻撃", "剣", "斬", "battle", "attack", "sword", "fight",
                ]),
            )
            .with_message("Battle scene should describe combat")],
            Preset::RomanceScene => vec![ValidationRule::new(
                RuleType::PlotAdvancement,
                Predicate::contains_any(["想い", "好き", "胸", "頬", "love", "heart", "blush"]),
            )
            .with_message("Romance scene should show emotional development")],
            Preset::Dialogue => vec![ValidationRule::new(
                RuleType::PlotAdvancement,
                Predicate::contains_any(["「", "」", "\"", "“"]),
            )
            .with_message("Dialogue scene should contain spoken lines")],
            Preset::Exposition => vec![ValidationRule::new(
                RuleType::PlotAdvancement,
                Predicate::contains_any(["かつて", "歴史", "伝説", "昔", "history", "legend", "long ago"]),
            )
            .with_message("Exposition scene should convey background information")],
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown preset: {0} (expected one of battle-scene, romance-scene, dialogue, exposition)")]
pub struct UnknownPresetError(pub String);

impl FromStr for Preset {
    type Err = UnknownPresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s.trim())
            .ok_or_else(|| UnknownPresetError(s.to_string()))
    }
}

/// Replace the generic plot-advancement rule with the preset's own rules
pub fn splice_preset_rules(rules: Vec<ValidationRule>, preset: Preset) -> Vec<ValidationRule> {
    let mut spliced: Vec<ValidationRule> = rules
        .into_iter()
        .filter(|rule| rule.rule_type != RuleType::PlotAdvancement)
        .collect();
    spliced.extend(preset.rules());
    spliced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!("battle-scene".parse::<Preset>().unwrap(), Preset::BattleScene);
        assert_eq!("exposition".parse::<Preset>().unwrap(), Preset::Exposition);
        assert!("heist".parse::<Preset>().is_err());
    }

    #[test]
    fn test_battle_preset_replaces_plot_rule() {
        let rules = vec![
            ValidationRule::new(RuleType::CharacterPresence, Predicate::contains_any(["勇者"])),
            ValidationRule::new(RuleType::PlotAdvancement, Predicate::placeholder("plot")),
            ValidationRule::new(RuleType::Custom, Predicate::placeholder("custom")),
        ];

        let spliced = splice_preset_rules(rules, Preset::BattleScene);

        let plot_rules: Vec<_> = spliced
            .iter()
            .filter(|rule| rule.rule_type == RuleType::PlotAdvancement)
            .collect();
        assert_eq!(plot_rules.len(), 1);
        assert!(plot_rules[0].validate.evaluate("勇者は剣を抜いた"));
        assert!(!plot_rules[0].validate.evaluate("静かな朝だった"));
        assert!(spliced.iter().any(|rule| rule.rule_type == RuleType::Custom));
        assert!(spliced.iter().any(|rule| rule.rule_type == RuleType::CharacterPresence));
    }
}
