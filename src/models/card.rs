use std::fmt::{self, Display, Formatter};
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString};

/// Opaque card identifier, stable for the lifetime of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CardId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(CardId)
    }
}

/// The five mana colors, declared in canonical WUBRG order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    StrumDisplay,
)]
pub enum Color {
    #[strum(serialize = "W")]
    White,
    #[strum(serialize = "U")]
    Blue,
    #[strum(serialize = "B")]
    Black,
    #[strum(serialize = "R")]
    Red,
    #[strum(serialize = "G")]
    Green,
}

impl Color {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    pub fn from_symbol(c: char) -> Option<Color> {
        match c.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    pub fn basic_land_name(self) -> &'static str {
        match self {
            Color::White => "Plains",
            Color::Blue => "Island",
            Color::Black => "Swamp",
            Color::Red => "Mountain",
            Color::Green => "Forest",
        }
    }
}

/// A de-duplicated set of colors. Iteration is always WUBRG order no matter
/// how the set was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ColorSet(u8);

impl ColorSet {
    pub fn empty() -> Self {
        ColorSet(0)
    }

    pub fn all() -> Self {
        Color::iter().collect()
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= 1 << color.index();
    }

    pub fn contains(&self, color: Color) -> bool {
        self.0 & (1 << color.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_multicolor(&self) -> bool {
        self.len() > 1
    }

    pub fn is_subset(&self, other: &ColorSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn intersects(&self, other: &ColorSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(&self, other: &ColorSet) -> ColorSet {
        ColorSet(self.0 | other.0)
    }

    pub fn difference(&self, other: &ColorSet) -> ColorSet {
        ColorSet(self.0 & !other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Color> + '_ {
        Color::iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut set = ColorSet::empty();
        for color in iter {
            set.insert(color);
        }
        set
    }
}

impl Display for ColorSet {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for color in self.iter() {
            write!(f, "{}", color.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for ColorSet {
    type Err = String;

    /// Accepts "WU", "UW", "w u", "{W}{U}" ... and unknown symbols are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .filter(|c| c.is_alphabetic())
            .map(|c| Color::from_symbol(c).ok_or(format!("unknown color symbol '{}'", c)))
            .collect()
    }
}

impl Serialize for ColorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ColorSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<String>),
            Joined(String),
        }

        let joined = match Raw::deserialize(deserializer)? {
            Raw::List(items) => items.concat(),
            Raw::Joined(s) => s,
        };
        joined.parse().map_err(serde::de::Error::custom)
    }
}

/// Fixed-size per-color table indexed by [`Color`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColorMap<T>(pub [T; 5]);

impl<T: Copy> ColorMap<T> {
    pub fn filled(value: T) -> Self {
        ColorMap([value; 5])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Color, T)> + '_ {
        Color::iter().map(move |c| (c, self.0[c.index()]))
    }
}

impl<T> Index<Color> for ColorMap<T> {
    type Output = T;

    fn index(&self, color: Color) -> &T {
        &self.0[color.index()]
    }
}

impl<T> IndexMut<Color> for ColorMap<T> {
    fn index_mut(&mut self, color: Color) -> &mut T {
        &mut self.0[color.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum CardType {
    Creature,
    Instant,
    Sorcery,
    Enchantment,
    Artifact,
    Land,
    Planeswalker,
    Battle,
    Kindred,
}

/// Parsed type line, e.g. "Legendary Creature — Elf Warrior".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeLine {
    pub types: Vec<CardType>,
    pub basic: bool,
    pub legendary: bool,
    pub subtypes: Vec<String>,
}

impl TypeLine {
    pub fn parse(s: &str) -> TypeLine {
        let (main, sub) = match s.split_once('—').or_else(|| s.split_once(" - ")) {
            Some((main, sub)) => (main, sub),
            None => (s, ""),
        };

        let mut type_line = TypeLine::default();
        for token in main.split_whitespace() {
            match token {
                "Basic" => type_line.basic = true,
                "Legendary" => type_line.legendary = true,
                _ => {
                    if let Ok(card_type) = CardType::from_str(token) {
                        if !type_line.types.contains(&card_type) {
                            type_line.types.push(card_type);
                        }
                    }
                }
            }
        }
        type_line.subtypes = sub.split_whitespace().map(|s| s.to_string()).collect();

        type_line
    }

    pub fn from_types(types: &[String]) -> TypeLine {
        TypeLine::parse(&types.join(" "))
    }
}

impl<'de> Deserialize<'de> for TypeLine {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(TypeLine::parse(&s))
    }
}

lazy_static! {
    static ref MANA_SYMBOL: Regex = Regex::new(r"\{([^}]+)\}").unwrap();
}

/// Raw mana cost with derived pip counts. Hybrid symbols count a pip for each
/// color they name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManaCost {
    pub raw: String,
    pub pips: ColorMap<u8>,
    pub generic: u8,
}

impl ManaCost {
    pub fn parse(raw: &str) -> ManaCost {
        let mut pips = ColorMap::filled(0u8);
        let mut generic = 0u8;

        for capture in MANA_SYMBOL.captures_iter(raw) {
            let symbol = &capture[1];
            if let Ok(n) = symbol.parse::<u8>() {
                generic = generic.saturating_add(n);
                continue;
            }
            let colors: ColorSet = symbol.chars().filter_map(Color::from_symbol).collect();
            for color in colors.iter() {
                pips[color] = pips[color].saturating_add(1);
            }
        }

        ManaCost {
            raw: raw.to_string(),
            pips,
            generic,
        }
    }

    pub fn colors(&self) -> ColorSet {
        self.pips.iter().filter(|(_, n)| *n > 0).map(|(c, _)| c).collect()
    }

    pub fn total_pips(&self) -> u32 {
        self.pips.0.iter().map(|n| *n as u32).sum()
    }

    pub fn pips_in(&self, colors: &ColorSet) -> u32 {
        colors.iter().map(|c| self.pips[c] as u32).sum()
    }
}

impl<'de> Deserialize<'de> for ManaCost {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(ManaCost::parse(&s))
    }
}

/// Immutable descriptive attributes of a card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub colors: ColorSet,
    pub cmc: f64,
    pub type_line: TypeLine,
    pub mana_cost: ManaCost,
    pub text: String,
    pub tags: Vec<String>,
}

impl Card {
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.type_line.types.contains(&card_type)
    }

    pub fn is_land(&self) -> bool {
        self.has_type(CardType::Land)
    }

    pub fn is_basic_land(&self) -> bool {
        self.is_land() && self.type_line.basic
    }

    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Colored symbols in the cost for colors outside `colors`.
    pub fn pips_outside(&self, colors: &ColorSet) -> u32 {
        self.mana_cost.pips_in(&self.colors.difference(colors))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_color_set_is_canonical() {
        let a: ColorSet = "GW".parse().unwrap();
        let b: ColorSet = "wgw".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "WG");
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![Color::White, Color::Green]);
        assert!("WX".parse::<ColorSet>().is_err());
    }

    #[test]
    fn test_color_set_from_json_list() {
        let set: ColorSet = serde_json::from_str(r#"["R", "W", "R"]"#).unwrap();
        assert_eq!(set.to_string(), "WR");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_color_set_relations() {
        let wr: ColorSet = "WR".parse().unwrap();
        let w: ColorSet = "W".parse().unwrap();
        let ug: ColorSet = "UG".parse().unwrap();
        assert!(w.is_subset(&wr));
        assert!(!wr.is_subset(&w));
        assert!(!ug.intersects(&wr));
        assert_eq!(wr.difference(&w).to_string(), "R");
        assert_eq!(wr.union(&ug).to_string(), "WURG");
    }

    #[test]
    fn test_mana_cost_pips() {
        let cost = ManaCost::parse("{2}{W}{W}{U/B}");
        assert_eq!(cost.generic, 2);
        assert_eq!(cost.pips[Color::White], 2);
        assert_eq!(cost.pips[Color::Blue], 1);
        assert_eq!(cost.pips[Color::Black], 1);
        assert_eq!(cost.total_pips(), 4);
        assert_eq!(cost.colors().to_string(), "WUB");
        assert_eq!(ManaCost::parse("").total_pips(), 0);
        assert_eq!(ManaCost::parse("{X}{R}").pips[Color::Red], 1);
    }

    #[test]
    fn test_type_line_parse() {
        let type_line = TypeLine::parse("Legendary Creature — Elf Warrior");
        assert_eq!(type_line.types, vec![CardType::Creature]);
        assert!(type_line.legendary);
        assert_eq!(type_line.subtypes, vec!["Elf", "Warrior"]);

        let basic = TypeLine::parse("Basic Land - Forest");
        assert!(basic.basic);
        assert_eq!(basic.types, vec![CardType::Land]);

        let artifact_creature = TypeLine::from_types(&["Artifact".into(), "Creature".into()]);
        assert_eq!(
            artifact_creature.types,
            vec![CardType::Artifact, CardType::Creature]
        );
    }
}
