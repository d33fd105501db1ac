pub mod card;
pub mod card_rating;
pub mod deck;
pub mod draft_data;
pub mod draft_state;
pub mod recommendation;
