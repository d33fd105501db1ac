//! Tagged classification of cards by their immutable attributes.
//!
//! Dataset tags take precedence; otherwise the oracle text is matched against
//! a small set of phrasings.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::card::{Card, CardType, Color, ColorMap, ColorSet};

lazy_static! {
    static ref REMOVAL: Regex = Regex::new(concat!(
        r"(destroy|exile) target (creature|permanent|nonland permanent|artifact or creature|creature or planeswalker|attacking|tapped)",
        r"|deals? (\d+|x) damage to (any target|target creature|target attacking|each creature)",
        r"|target creature( an opponent controls)? gets -\d+/-\d+",
        r"|fights? (target|another|up to one)",
        r"|counter target spell",
        r"|destroy all creatures",
        r"|enchanted creature can't attack or block",
    ))
    .unwrap();
    static ref COMBAT_TRICK: Regex = Regex::new(
        r"target creature( you control)? gets \+\d+/\+\d+|gains? (indestructible|hexproof|first strike|double strike) until end of turn"
    )
    .unwrap();
    static ref CARD_DRAW: Regex =
        Regex::new(r"\bdraws? (a|two|three|x) cards?\b|\bscry \d|\bsurveil \d|\binvestigate\b").unwrap();
    static ref EVASION: Regex =
        Regex::new(r"\b(flying|menace|trample|skulk|can't be blocked)\b").unwrap();
    static ref MANA_SINK: Regex = Regex::new(
        r"(?m)^(\{[0-9xwubrg/]+\})+[^:\n]*:|\bkicker\b|\bmonstrosity\b|\bembalm\b|\bchannel\b"
    )
    .unwrap();
    static ref ANY_COLOR: Regex = Regex::new(concat!(
        r"mana of any (one )?color",
        r"|search your library for (a|up to two) basic land",
        r"|create (a|two|three) treasure",
        r"|basic landcycling",
    ))
    .unwrap();
    static ref ADD_CLAUSE: Regex = Regex::new(r"add ([^.]*)").unwrap();
    static ref COLOR_SYMBOL: Regex = Regex::new(r"\{([wubrg])\}").unwrap();
}

fn lower_text(card: &Card) -> String {
    card.text.to_lowercase()
}

/// Landcyclers play like one-drops.
pub fn functional_cmc(card: &Card) -> f64 {
    if lower_text(card).contains("landcycling") {
        1.0
    } else {
        card.cmc
    }
}

pub fn is_removal(card: &Card) -> bool {
    card.has_tag("removal") || REMOVAL.is_match(&lower_text(card))
}

pub fn is_combat_trick(card: &Card) -> bool {
    if card.has_tag("combat_trick") {
        return true;
    }
    card.has_type(CardType::Instant) && COMBAT_TRICK.is_match(&lower_text(card))
}

pub fn is_card_draw(card: &Card) -> bool {
    card.has_tag("card_draw") || CARD_DRAW.is_match(&lower_text(card))
}

pub fn has_evasion(card: &Card) -> bool {
    card.has_tag("evasion") || (card.is_creature() && EVASION.is_match(&lower_text(card)))
}

pub fn is_mana_sink(card: &Card) -> bool {
    if card.has_tag("mana_sink") {
        return true;
    }
    let text = lower_text(card);
    // "{T}: Add ..." style mana abilities are not sinks
    MANA_SINK
        .find_iter(&text)
        .any(|m| !m.as_str().trim_end_matches(':').ends_with("{t}") && !is_mana_ability(&text, m.end()))
}

fn is_mana_ability(text: &str, colon_end: usize) -> bool {
    text[colon_end..].trim_start().starts_with("add ")
}

pub fn is_early_play(card: &Card) -> bool {
    !card.is_land() && functional_cmc(card) <= 2.0 && (card.is_creature() || is_removal(card))
}

pub fn is_top_end(card: &Card) -> bool {
    !card.is_land() && functional_cmc(card) >= 5.0 && !is_mana_sink(card)
}

/// What kind of extra mana a fixing source provides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fixing {
    None,
    AnyColor,
    Colors(ColorSet),
    /// Counts as a source without naming colors (e.g. colorless utility land).
    Generic,
}

/// Colors named in "add {X}" clauses.
pub fn produced_colors(card: &Card) -> ColorSet {
    let text = lower_text(card);
    ADD_CLAUSE
        .captures_iter(&text)
        .flat_map(|clause| {
            COLOR_SYMBOL
                .captures_iter(clause.get(1).map_or("", |m| m.as_str()))
                .filter_map(|symbol| symbol[1].chars().next().and_then(Color::from_symbol))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn produces_any_color(card: &Card) -> bool {
    ANY_COLOR.is_match(&lower_text(card))
}

pub fn fixing_of(card: &Card, cheap_artifact_cmc: f64) -> Fixing {
    if card.is_basic_land() {
        return Fixing::None;
    }
    if produces_any_color(card) {
        return Fixing::AnyColor;
    }

    let produced = produced_colors(card);
    if card.is_land() {
        let colors = if card.colors.is_multicolor() {
            card.colors
        } else {
            produced
        };
        return if colors.is_empty() {
            Fixing::Generic
        } else {
            Fixing::Colors(colors)
        };
    }
    if card.has_type(CardType::Artifact) && card.cmc <= cheap_artifact_cmc {
        return if produced.is_empty() {
            Fixing::Generic
        } else {
            Fixing::Colors(produced)
        };
    }
    if card.has_tag("fixing") {
        return Fixing::AnyColor;
    }
    if produced.is_multicolor() {
        return Fixing::Colors(produced);
    }
    Fixing::None
}

/// Non-basic lands, cheap artifacts and multi-color producers.
pub fn is_fixing_source(card: &Card, cheap_artifact_cmc: f64) -> bool {
    fixing_of(card, cheap_artifact_cmc) != Fixing::None
}

/// Fixing sources in a pool, per color and in total.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixingMap {
    pub per_color: ColorMap<u32>,
    pub any_color: u32,
    pub total: u32,
}

impl FixingMap {
    pub fn from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>, cheap_artifact_cmc: f64) -> Self {
        let mut map = FixingMap::default();
        for card in cards {
            match fixing_of(card, cheap_artifact_cmc) {
                Fixing::None => continue,
                Fixing::AnyColor => map.any_color += 1,
                Fixing::Colors(colors) => {
                    for color in colors.iter() {
                        map.per_color[color] += 1;
                    }
                }
                Fixing::Generic => {}
            }
            map.total += 1;
        }
        map
    }

    pub fn for_color(&self, color: Color) -> u32 {
        self.per_color[color] + self.any_color
    }

    /// Sources available for the weakest of the given colors.
    pub fn weakest(&self, colors: &ColorSet) -> u32 {
        colors.iter().map(|c| self.for_color(c)).min().unwrap_or(0)
    }
}
