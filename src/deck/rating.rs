use std::collections::HashMap;

use regex::Regex;

use crate::classify;
use crate::config::DeckConfig;
use crate::models::card::{Card, ColorSet};

const TRIBE_SIZE: usize = 4;
const TRIBE_BONUS: f64 = 8.0;
const FIXING_DENSITY: usize = 3;
const FIXING_BONUS: f64 = 5.0;

/// Inputs to the holistic 0..=100 deck rating.
pub struct RatingInput<'a> {
    /// Non-land cards with their normalized quality (0..=100).
    pub spells: &'a [(&'a Card, f64)],
    pub nonbasic_lands: &'a [&'a Card],
    pub land_count: usize,
    pub splash: ColorSet,
    /// Sources per splash color, basics and non-basics.
    pub splash_sources: usize,
    pub filler_count: usize,
    pub extra_basics: usize,
    pub cheap_artifact_cmc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingBreakdown {
    pub power: f64,
    pub velocity: f64,
    pub synergy: f64,
    pub deficit: f64,
    pub total: f64,
}

pub fn rate_deck(input: &RatingInput, config: &DeckConfig) -> RatingBreakdown {
    let power = if input.spells.is_empty() {
        0.0
    } else {
        input.spells.iter().map(|(_, q)| q).sum::<f64>() / input.spells.len() as f64
    };

    let avg_cmc = super::mana_base::average_cmc(input.spells.iter().map(|(card, _)| *card));
    let supported_cmc = 3.0 * input.land_count as f64 / config.base_lands.max(1) as f64;
    let mut velocity = (avg_cmc - supported_cmc).max(0.0) * config.velocity_penalty;
    if !input.splash.is_empty() {
        let shortfall = (config.splash_floor as usize).saturating_sub(input.splash_sources);
        velocity += shortfall as f64 * config.splash_source_penalty;
    }

    let synergy = synergy(input, config);
    let deficit = input.filler_count as f64 * config.filler_penalty
        + input.extra_basics as f64 * config.extra_basic_penalty;

    let total = (power + synergy - velocity - deficit).clamp(0.0, 100.0);
    RatingBreakdown {
        power,
        velocity,
        synergy,
        deficit,
        total: (total * 10.0).round() / 10.0,
    }
}

fn synergy(input: &RatingInput, config: &DeckConfig) -> f64 {
    let mut bonus = 0.0;

    let mut tribes: HashMap<&str, usize> = HashMap::new();
    for (card, _) in input.spells.iter().filter(|(card, _)| card.is_creature()) {
        for subtype in &card.type_line.subtypes {
            *tribes.entry(subtype.as_str()).or_default() += 1;
        }
    }
    let has_payoff = tribes
        .iter()
        .filter(|(_, count)| **count >= TRIBE_SIZE)
        .any(|(tribe, _)| input.spells.iter().any(|(card, _)| names_tribe(card, tribe)));
    if has_payoff {
        bonus += TRIBE_BONUS;
    }

    let fixing = input
        .spells
        .iter()
        .map(|(card, _)| *card)
        .chain(input.nonbasic_lands.iter().copied())
        .filter(|card| classify::is_fixing_source(card, input.cheap_artifact_cmc))
        .count();
    if fixing >= FIXING_DENSITY {
        bonus += FIXING_BONUS;
    }

    bonus.min(config.synergy_cap)
}

/// Whole-word mention of `tribe` (or its plural) in rules text, ignoring
/// the card's references to itself by name.
fn names_tribe(card: &Card, tribe: &str) -> bool {
    let mut words = vec![format!("{}s?", regex::escape(tribe))];
    if let Some(stem) = tribe.strip_suffix('f') {
        words.push(format!("{}ves", regex::escape(stem)));
    }
    let Ok(pattern) = Regex::new(&format!(r"(?i)\b({})\b", words.join("|"))) else {
        return false;
    };
    let text = card.text.replace(card.name.as_str(), "");
    pattern.is_match(&text)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures::card;

    fn input<'a>(spells: &'a [(&'a Card, f64)], lands: &'a [&'a Card]) -> RatingInput<'a> {
        RatingInput {
            spells,
            nonbasic_lands: lands,
            land_count: 17,
            splash: ColorSet::empty(),
            splash_sources: 0,
            filler_count: 0,
            extra_basics: 0,
            cheap_artifact_cmc: 2.0,
        }
    }

    #[test]
    fn test_power_is_average_quality() {
        let config = DeckConfig::default();
        let a = card(1, "Bear", "Creature — Bear", "{1}{G}", 2.0, "");
        let b = card(2, "Elk", "Creature — Elk", "{2}{G}", 3.0, "");
        let spells = [(&a, 80.0), (&b, 40.0)];
        let rating = rate_deck(&input(&spells, &[]), &config);
        assert_eq!(rating.power, 60.0);
        assert_eq!(rating.velocity, 0.0);
        assert_eq!(rating.total, 60.0);
    }

    #[test]
    fn test_expensive_curve_is_penalised() {
        let config = DeckConfig::default();
        let giant = card(1, "Giant", "Creature — Giant", "{5}{G}", 6.0, "");
        let spells = [(&giant, 70.0)];
        let mut rated = input(&spells, &[]);
        rated.land_count = 15;
        let rating = rate_deck(&rated, &config);
        // 6.0 - 3 * 15 / 17
        assert!((rating.velocity - (6.0 - 45.0 / 17.0) * 10.0).abs() < 1e-9);
        assert_eq!(rating.total, 36.5);
    }

    #[test]
    fn test_tribal_payoff_and_deficit() {
        let config = DeckConfig::default();
        let elves = (1..=4)
            .map(|i| card(i, "Elf", "Creature — Elf Warrior", "{G}", 1.0, ""))
            .collect::<Vec<_>>();
        let lord = card(5, "Elf Lord", "Creature — Elf", "{1}{G}", 2.0, "Other Elf creatures you control get +1/+1.");
        let mut spells = elves.iter().map(|c| (c, 50.0)).collect::<Vec<_>>();
        spells.push((&lord, 50.0));

        let mut rated = input(&spells, &[]);
        let rating = rate_deck(&rated, &config);
        assert_eq!(rating.synergy, TRIBE_BONUS);

        rated.filler_count = 2;
        rated.extra_basics = 1;
        let short = rate_deck(&rated, &config);
        assert_eq!(short.deficit, 2.0 * 3.0 + 4.0);
        assert!(short.total < rating.total);
    }

    #[test]
    fn test_tribe_must_be_named_as_a_word() {
        let config = DeckConfig::default();
        let elves = (1..=4)
            .map(|i| card(i, "Elf", "Creature — Elf Warrior", "{G}", 1.0, ""))
            .collect::<Vec<_>>();
        let ooze = card(
            5,
            "Caustic Ooze",
            "Creature — Ooze",
            "{2}{G}",
            3.0,
            "At the beginning of your upkeep, Caustic Ooze deals 1 damage to itself.",
        );
        let mut spells = elves.iter().map(|c| (c, 50.0)).collect::<Vec<_>>();
        spells.push((&ooze, 50.0));
        assert_eq!(rate_deck(&input(&spells, &[]), &config).synergy, 0.0);

        let scout = card(6, "Elf Scout", "Creature — Elf Scout", "{1}{G}", 2.0, "Elf Scout gets +1/+1 while attacking.");
        spells.push((&scout, 50.0));
        assert_eq!(rate_deck(&input(&spells, &[]), &config).synergy, 0.0);
    }

    #[test]
    fn test_plural_tribe_is_a_payoff() {
        let elves = (1..=4)
            .map(|i| card(i, "Elf", "Creature — Elf Warrior", "{G}", 1.0, ""))
            .collect::<Vec<_>>();
        let anthem = card(5, "Call the Clans", "Sorcery", "{2}{G}", 3.0, "Elves you control get +2/+0 until end of turn.");
        assert!(names_tribe(&anthem, "Elf"));
        assert!(!names_tribe(&elves[0], "Elf"));

        let mut spells = elves.iter().map(|c| (c, 50.0)).collect::<Vec<_>>();
        spells.push((&anthem, 50.0));
        assert_eq!(rate_deck(&input(&spells, &[]), &DeckConfig::default()).synergy, TRIBE_BONUS);
    }

    #[test]
    fn test_splash_without_sources() {
        let config = DeckConfig::default();
        let bear = card(1, "Bear", "Creature — Bear", "{1}{G}", 2.0, "");
        let spells = [(&bear, 60.0)];
        let mut rated = input(&spells, &[]);
        rated.splash = "B".parse().unwrap();
        rated.splash_sources = 1;
        let rating = rate_deck(&rated, &config);
        assert_eq!(rating.velocity, 2.0 * config.splash_source_penalty);
    }
}
