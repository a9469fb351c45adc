use std::collections::HashSet;

use crate::card::{Card, CardId, Position, Size};

pub const GRID_COLS: i32 = 8;

/// Rows scanned before the free-position search gives up.
pub const ROW_SCAN_LIMIT: i32 = 100;

pub type CellSet = HashSet<(i32, i32)>;

pub fn cells_of(position: Position, size: Size) -> impl Iterator<Item = (i32, i32)> {
    (position.y..position.y + size.height)
        .flat_map(move |y| (position.x..position.x + size.width).map(move |x| (x, y)))
}

/// Cells covered by every card except the excluded ids.
pub fn occupied_cells(cards: &[Card], exclude: &[&CardId]) -> CellSet {
    let mut cells = CellSet::new();
    for card in cards {
        if exclude.iter().any(|id| **id == card.id) {
            continue;
        }
        cells.extend(cells_of(card.position, card.size));
    }
    cells
}

pub fn fits_at(occupied: &CellSet, position: Position, size: Size) -> bool {
    if position.x < 0 || position.y < 0 || position.x + size.width > GRID_COLS {
        return false;
    }
    cells_of(position, size).all(|cell| !occupied.contains(&cell))
}

/// Row-major, leftmost-first search for a free slot. Falls back to the
/// origin past the scan limit rather than growing the board forever.
pub fn find_free_position(occupied: &CellSet, size: Size) -> Position {
    for y in 0..ROW_SCAN_LIMIT {
        for x in 0..=(GRID_COLS - size.width).max(0) {
            let candidate = Position::new(x, y);
            if fits_at(occupied, candidate, size) {
                return candidate;
            }
        }
    }
    // Only reachable for degenerate sizes wider than the grid.
    Position::new(0, 0)
}

pub fn find_next_available_position(cards: &[Card], size: Size) -> Position {
    find_free_position(&occupied_cells(cards, &[]), size)
}

pub fn collection_has_overlap(cards: &[Card]) -> bool {
    let mut cells = CellSet::new();
    for card in cards {
        for cell in cells_of(card.position, card.size) {
            if !cells.insert(cell) {
                return true;
            }
        }
    }
    false
}

/// Re-place every card sequentially when the incoming collection has
/// overlapping cards. Well-formed input comes back untouched, so running
/// this twice is the same as running it once.
pub fn auto_assign_positions(cards: Vec<Card>) -> Vec<Card> {
    if cards.is_empty() || !collection_has_overlap(&cards) {
        return cards;
    }
    let mut placed: Vec<Card> = Vec::with_capacity(cards.len());
    let mut occupied = CellSet::new();
    for mut card in cards {
        let position = find_free_position(&occupied, card.size);
        occupied.extend(cells_of(position, card.size));
        card.position = position;
        placed.push(card);
    }
    placed
}

pub fn clamp_x(x: i32, width: i32) -> i32 {
    x.min(GRID_COLS - width).max(0)
}

/// Resolve the two positions a drag-swap settles into. The active card is
/// placed first, preferring the over card's slot clamped into the row; the
/// over card then resolves against the board with the active card already
/// in place. Returns `None` when either id is missing or they are equal.
pub fn resolve_swap_positions(
    cards: &[Card],
    active_id: &CardId,
    over_id: &CardId,
) -> Option<(Position, Position)> {
    if active_id == over_id {
        return None;
    }
    let active = cards.iter().find(|c| c.id == *active_id)?;
    let over = cards.iter().find(|c| c.id == *over_id)?;

    let mut occupied = occupied_cells(cards, &[active_id, over_id]);

    let preferred = Position::new(clamp_x(over.position.x, active.size.width), over.position.y);
    let active_pos = if fits_at(&occupied, preferred, active.size) {
        preferred
    } else {
        find_free_position(&occupied, active.size)
    };
    occupied.extend(cells_of(active_pos, active.size));

    let preferred = Position::new(clamp_x(active.position.x, over.size.width), active.position.y);
    let over_pos = if fits_at(&occupied, preferred, over.size) {
        preferred
    } else {
        find_free_position(&occupied, over.size)
    };

    Some((active_pos, over_pos))
}
