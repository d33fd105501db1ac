//! In-memory catalogs and statistics for unit tests.

use crate::advisor::SetContext;
use crate::catalog::CardCatalog;
use crate::config::AdvisorConfig;
use crate::models::card::{Card, CardId, ManaCost, TypeLine};
use crate::models::card_rating::{Archetype, RawRating};
use crate::stats::StatsTable;

const SAMPLE: u32 = 1000;

/// A card whose colors come from its mana cost.
pub fn card(id: u32, name: &str, type_line: &str, cost: &str, cmc: f64, text: &str) -> Card {
    let mana_cost = ManaCost::parse(cost);
    Card {
        id: CardId(id),
        name: name.to_string(),
        colors: mana_cost.colors(),
        cmc,
        type_line: TypeLine::parse(type_line),
        mana_cost,
        text: text.to_string(),
        tags: Vec::new(),
    }
}

#[derive(Default)]
pub struct FixtureSet {
    cards: Vec<Card>,
    ratings: Vec<(CardId, Archetype, RawRating)>,
    config: AdvisorConfig,
}

impl FixtureSet {
    pub fn new() -> Self {
        FixtureSet::default()
    }

    pub fn card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    /// Adds a creature with a global win rate. `colors` only names the card.
    pub fn creature(self, id: u32, colors: &str, cost: &str, cmc: f64, gihwr: f64) -> Self {
        self.unrated_creature(id, colors, cost, cmc).rating(id, gihwr)
    }

    pub fn unrated_creature(self, id: u32, colors: &str, cost: &str, cmc: f64) -> Self {
        let name = format!("{} Creature {}", colors, id);
        self.card(card(id, &name, "Creature — Soldier", cost, cmc, ""))
    }

    pub fn rating(mut self, id: u32, gihwr: f64) -> Self {
        self.ratings.push((
            CardId(id),
            Archetype::AllDecks,
            RawRating {
                gihwr,
                gih: SAMPLE,
                ..Default::default()
            },
        ));
        self
    }

    pub fn pair_rating(mut self, id: u32, pair: &str, gihwr: f64) -> Self {
        let archetype = pair.parse::<Archetype>().unwrap();
        self.ratings.push((
            CardId(id),
            archetype,
            RawRating {
                gihwr,
                gih: SAMPLE,
                ..Default::default()
            },
        ));
        self
    }

    pub fn alsa(mut self, id: u32, alsa: f64) -> Self {
        self.global_mut(id).alsa = alsa;
        self
    }

    pub fn iwd(mut self, id: u32, iwd: f64) -> Self {
        self.global_mut(id).iwd = iwd;
        self
    }

    pub fn config(mut self, config: AdvisorConfig) -> Self {
        self.config = config;
        self
    }

    fn global_mut(&mut self, id: u32) -> &mut RawRating {
        let position = self
            .ratings
            .iter()
            .position(|(card, archetype, _)| *card == CardId(id) && *archetype == Archetype::AllDecks)
            .expect("rating must be added before its extra fields");
        &mut self.ratings[position].2
    }

    pub fn build(self) -> Fixture {
        let catalog = CardCatalog::from_cards(self.cards.clone());
        let stats = stats_table(&self.ratings, self.config.stats.min_sample_size);
        Fixture {
            catalog,
            stats,
            cards: self.cards,
            ratings: self.ratings,
            config: self.config,
        }
    }
}

fn stats_table(ratings: &[(CardId, Archetype, RawRating)], min_sample_size: u32) -> StatsTable {
    let mut stats = StatsTable::new(min_sample_size);
    for (card, archetype, rating) in ratings {
        stats.insert(*card, *archetype, rating.clone());
    }
    stats
}

pub struct Fixture {
    pub catalog: CardCatalog,
    pub stats: StatsTable,
    pub cards: Vec<Card>,
    ratings: Vec<(CardId, Archetype, RawRating)>,
    config: AdvisorConfig,
}

impl Fixture {
    pub fn context(&self) -> SetContext {
        SetContext::new(
            "TST",
            CardCatalog::from_cards(self.cards.clone()),
            Box::new(stats_table(&self.ratings, self.config.stats.min_sample_size)),
            self.config.clone(),
        )
    }
}
