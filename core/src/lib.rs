pub mod card;
pub mod grid;
pub mod hydrate;
pub mod profile;

pub use card::{
    clamp_size, size_bounds, Card, CardContent, CardDraft, CardId, CardStyle, CardType, Position,
    Size,
};
pub use grid::{
    auto_assign_positions, collection_has_overlap, find_next_available_position,
    resolve_swap_positions, GRID_COLS,
};
pub use hydrate::{prepare_hydrated_cards, starter_cards, MAX_INLINE_MEDIA_BYTES};
pub use profile::{Profile, ProfilePatch, PROFILE_BIO_MAX, PROFILE_TAG_MAX};
