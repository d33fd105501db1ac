//! Pick recommendations, lane signals and deck suggestions for limited drafts.
//!
//! A [`reconstructor::DraftStateReconstructor`] folds typed draft events into
//! a [`models::draft_state::DraftState`]. The [`advisor`] scores the current
//! pack against that state, [`signals`] reads open lanes from late cards and
//! [`deck`] turns the finished pool into playable 40 card decks.

pub mod advisor;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod deck;
pub mod error;
pub mod models;
pub mod reconstructor;
pub mod signals;
pub mod stats;

#[cfg(test)]
mod fixtures;
