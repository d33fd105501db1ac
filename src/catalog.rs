use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use indicium::simple::{Indexable, SearchIndex};
use serde::Deserialize;

use crate::error::{AdvisorError, Res};
use crate::models::card::*;
use crate::models::card_rating::{Archetype, RawRating};
use crate::stats::StatsTable;

#[derive(Debug, Default, Deserialize)]
pub struct DatasetMeta {
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCard {
    name: String,
    #[serde(default)]
    colors: ColorSet,
    #[serde(default)]
    cmc: f64,
    #[serde(default)]
    type_line: Option<TypeLine>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    mana_cost: ManaCost,
    #[serde(default)]
    text: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    deck_colors: BTreeMap<String, RawRating>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    meta: DatasetMeta,
    card_ratings: BTreeMap<String, RawCard>,
}

impl Indexable for Card {
    fn strings(&self) -> Vec<String> {
        vec![self.name.clone()]
    }
}

/// Read-only lookup from card identifier to card attributes.
pub struct CardCatalog {
    cards: HashMap<CardId, Card>,
    by_name: HashMap<String, CardId>,
    index: SearchIndex<CardId>,
}

impl Default for CardCatalog {
    fn default() -> Self {
        CardCatalog {
            cards: HashMap::new(),
            by_name: HashMap::new(),
            index: SearchIndex::default(),
        }
    }
}

impl CardCatalog {
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        cards.into_iter().fold(CardCatalog::default(), |mut acc, card| {
            acc.insert(card);
            acc
        })
    }

    fn insert(&mut self, card: Card) {
        self.index.insert(&card.id, &card);
        self.by_name.insert(card.name.to_lowercase(), card.id);
        self.cards.insert(card.id, card);
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CardId> + '_ {
        self.cards.keys().copied()
    }

    /// Exact name match first, then the closest search hit.
    pub fn find_by_name(&self, name: &str) -> Option<&Card> {
        let needle = name.trim().to_lowercase();
        if let Some(id) = self.by_name.get(&needle) {
            return self.get(*id);
        }

        self.index
            .search(&needle)
            .into_iter()
            .filter_map(|id| self.get(*id))
            .max_by(|a, b| {
                let score_a = strsim::jaro_winkler(&needle, &a.name.to_lowercase());
                let score_b = strsim::jaro_winkler(&needle, &b.name.to_lowercase());
                score_a.total_cmp(&score_b).then_with(|| b.name.cmp(&a.name))
            })
    }

    pub fn name_of(&self, id: CardId) -> String {
        self.get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }
}

/// Catalog and statistics parsed from one dataset file.
pub struct Dataset {
    pub meta: DatasetMeta,
    pub catalog: CardCatalog,
    pub stats: StatsTable,
}

pub fn load_dataset(path: &Path, min_sample_size: u32) -> Res<Dataset> {
    let contents = std::fs::read_to_string(path)?;
    let dataset = parse_dataset(&contents, min_sample_size)?;
    log::info!(
        "Loaded {} cards for set '{}' from {}",
        dataset.catalog.len(),
        dataset.meta.set_code,
        path.display()
    );
    Ok(dataset)
}

pub fn parse_dataset(contents: &str, min_sample_size: u32) -> Res<Dataset> {
    let raw: RawDataset = serde_json::from_str(contents)?;

    let mut cards = Vec::with_capacity(raw.card_ratings.len());
    let mut stats = StatsTable::new(min_sample_size);

    for (key, raw_card) in raw.card_ratings {
        let id: CardId = key
            .parse()
            .map_err(|_| AdvisorError::Dataset(format!("card id '{}' is not numeric", key)))?;

        for (archetype_key, rating) in raw_card.deck_colors.iter() {
            match archetype_key.parse::<Archetype>() {
                Ok(archetype) => stats.insert(id, archetype, rating.clone()),
                Err(err) => log::debug!("Skipping archetype '{}' of {}: {}", archetype_key, id, err),
            }
        }

        cards.push(build_card(id, raw_card));
    }

    Ok(Dataset {
        meta: raw.meta,
        catalog: CardCatalog::from_cards(cards),
        stats,
    })
}

fn build_card(id: CardId, raw: RawCard) -> Card {
    let type_line = raw
        .type_line
        .unwrap_or_else(|| TypeLine::from_types(&raw.types));

    // colorless identity with colored pips (e.g. hybrid artifacts) takes the cost's colors
    let colors = if raw.colors.is_empty() {
        raw.mana_cost.colors()
    } else {
        raw.colors
    };

    Card {
        id,
        name: raw.name,
        colors,
        cmc: if raw.cmc.is_finite() { raw.cmc.max(0.0) } else { 0.0 },
        type_line,
        mana_cost: raw.mana_cost,
        text: raw.text,
        tags: raw.tags,
    }
}
