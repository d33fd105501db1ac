//! Event log to draft state.
//!
//! State is rebuilt as a fold over the event sequence and published as a
//! whole. Readers hold `Arc` snapshots and never observe a half-applied event.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::advisor::{lane, SetContext};
use crate::models::card::{CardId, Color};
use crate::models::draft_data::{DraftEvent, DraftPick, Indexing, PACKS_PER_DRAFT, PICKS_PER_PACK};
use crate::models::draft_state::{Discrepancy, DraftState, MissingCards, PackRecord};
use crate::signals;

pub struct DraftStateReconstructor {
    ctx: Arc<SetContext>,
    current: RwLock<Arc<DraftState>>,
    writer: Mutex<()>,
}

impl DraftStateReconstructor {
    pub fn new(ctx: Arc<SetContext>) -> Self {
        DraftStateReconstructor {
            ctx,
            current: RwLock::new(Arc::new(DraftState::default())),
            writer: Mutex::new(()),
        }
    }

    pub fn context(&self) -> &SetContext {
        &self.ctx
    }

    /// The latest committed state.
    pub fn snapshot(&self) -> Arc<DraftState> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies one event on top of the committed state.
    pub fn apply(&self, event: &DraftEvent) -> Arc<DraftState> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = DraftState::clone(&self.snapshot());
        apply_event(&self.ctx, &mut next, event);
        self.publish(next)
    }

    /// Replaces the state with a fresh replay of `events`.
    pub fn rebuild(&self, events: &[DraftEvent]) -> Arc<DraftState> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let next = replay(&self.ctx, events);
        log::info!(
            "Rebuilt draft state from {} events: {} picks at {}",
            events.len(),
            next.picks_made(),
            next.position()
        );
        self.publish(next)
    }

    fn publish(&self, state: DraftState) -> Arc<DraftState> {
        let state = Arc::new(state);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = state.clone();
        state
    }
}

/// Folds `events` into a brand-new state.
pub fn replay<'a>(ctx: &SetContext, events: impl IntoIterator<Item = &'a DraftEvent>) -> DraftState {
    events
        .into_iter()
        .fold(DraftState::default(), |mut state, event| {
            apply_event(ctx, &mut state, event);
            state
        })
}

pub fn apply_event(ctx: &SetContext, state: &mut DraftState, event: &DraftEvent) {
    match event {
        DraftEvent::EventStart { set_code, seats } => start_event(ctx, state, set_code, *seats),
        DraftEvent::PackObserved {
            pack,
            pick,
            cards,
            indexing,
        } => {
            if let Some(at) = position(*pack, *pick, *indexing) {
                observe_pack(state, at, cards);
            }
        }
        DraftEvent::PickMade {
            pack,
            pick,
            card,
            indexing,
        } => {
            if let Some(at) = position(*pack, *pick, *indexing) {
                make_pick(ctx, state, at, *card);
            }
        }
        DraftEvent::Unrecognized => log::debug!("Ignoring unrecognized event"),
    }
}

fn position(pack: u8, pick: u8, indexing: Indexing) -> Option<DraftPick> {
    let at = DraftPick::normalize(pack, pick, indexing);
    if at.is_none() {
        log::debug!(
            "Ignoring event at pack {} pick {} ({:?})",
            pack,
            pick,
            indexing
        );
    }
    at
}

fn start_event(ctx: &SetContext, state: &mut DraftState, set_code: &str, seats: u8) {
    if !ctx.set_code.is_empty() && !ctx.set_code.eq_ignore_ascii_case(set_code) {
        log::warn!(
            "Event set '{}' does not match the loaded dataset '{}'",
            set_code,
            ctx.set_code
        );
    }
    *state = DraftState {
        set_code: Some(set_code.to_string()),
        seats: if seats == 0 { ctx.config.draft.seats } else { seats },
        ..Default::default()
    };
}

fn is_stale(state: &DraftState, at: DraftPick) -> bool {
    state.last_pick.map_or(false, |last| at <= last)
}

fn observe_pack(state: &mut DraftState, at: DraftPick, cards: &[CardId]) {
    if is_stale(state, at) || state.last_pack.map_or(false, |last| at < last) {
        log::debug!("Ignoring stale pack at {}", at);
        return;
    }

    // repeated ids are separate copies of the same card
    let pack = cards.to_vec();

    record_missing(state, at, &pack);

    state.pack_number = at.pack;
    state.pick_number = at.pick;
    match state.history.last_mut() {
        Some(record) if record.at == at => record.cards = pack.clone(),
        _ => state.history.push(PackRecord {
            at,
            cards: pack.clone(),
            picked: None,
        }),
    }
    state.pack = pack;
    state.last_pack = Some(at);
}

/// Cards present one lap earlier that other drafters took since.
fn record_missing(state: &mut DraftState, at: DraftPick, pack: &[CardId]) {
    let Some(lap_pick) = at.pick.checked_sub(state.seats).filter(|p| *p > 0) else {
        return;
    };
    let lap = DraftPick::new(at.pack, lap_pick);
    let Some(previous) = state.history.iter().find(|r| r.at == lap) else {
        return;
    };

    let mut cards = previous.cards.clone();
    if let Some(picked) = previous.picked {
        take_one(&mut cards, picked);
    }
    for id in pack {
        take_one(&mut cards, *id);
    }

    state.missing.retain(|m| m.at != at);
    if !cards.is_empty() {
        state.missing.push(MissingCards { at, cards });
    }
}

/// Removes a single copy of `card`; `false` when there was none.
fn take_one(cards: &mut Vec<CardId>, card: CardId) -> bool {
    match cards.iter().position(|id| *id == card) {
        Some(idx) => {
            cards.remove(idx);
            true
        }
        None => false,
    }
}

fn make_pick(ctx: &SetContext, state: &mut DraftState, at: DraftPick, card: CardId) {
    if is_stale(state, at) {
        log::debug!("Ignoring stale pick of {} at {}", card, at);
        return;
    }

    let mut passed = if state.last_pack == Some(at) {
        std::mem::take(&mut state.pack)
    } else {
        Vec::new()
    };
    if !take_one(&mut passed, card) {
        log::warn!(
            "Pick {} at {} was not in the observed pack, trusting the pick",
            card,
            at
        );
        state
            .discrepancies
            .push(Discrepancy::PickNotInPack { at, card });
    }

    if signals::is_signal_pack(at.pack, &ctx.config.draft) {
        let contribution = signals::pack_signals(ctx, &passed, at.pick);
        for (color, value) in contribution.iter() {
            state.signals[color] += value;
        }
    }

    state.pool.push(card);
    if let Some(record) = state.history.iter_mut().rev().find(|r| r.at == at) {
        record.picked = Some(card);
    }
    finish_pick(state, at);

    let weights = lane::commitment_weights(ctx, &state.pool, &state.signals);
    state.established = lane::established_colors(ctx, &weights);
    log::debug!(
        "Picked {} at {}, established colors '{}' ({})",
        card,
        at,
        state.established,
        signal_summary(state)
    );
}

fn finish_pick(state: &mut DraftState, at: DraftPick) {
    state.pack.clear();
    let next = if at.pick < PICKS_PER_PACK {
        DraftPick::new(at.pack, at.pick + 1)
    } else if at.pack < PACKS_PER_DRAFT {
        DraftPick::new(at.pack + 1, 1)
    } else {
        at
    };
    state.pack_number = next.pack;
    state.pick_number = next.pick;
    state.last_pick = Some(at);
}

fn signal_summary(state: &DraftState) -> String {
    state
        .signals
        .iter()
        .map(|(color, value): (Color, f64)| format!("{}:{:.1}", color.symbol(), value))
        .collect::<Vec<_>>()
        .join(" ")
}
