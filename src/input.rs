use std::rc::Rc;

use bentogurido_core::card::{
    Card, CardContent, CardDraft, CardId, CardType, MediaContent, MediaKind, Position, Size,
};

use crate::store::CardStore;

/// Pointer travel below this stays a click, not a drag.
pub const CLICK_SLOP_PX: f32 = 4.0;

/// Footprint for media cards created from a file drop.
pub const MEDIA_DROP_SIZE: Size = Size {
    width: 2,
    height: 2,
};

/// Pixel geometry of the rendered grid: uniform square cells separated by a
/// fixed gap, anchored at the grid's top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct GridMetrics {
    pub cell_px: f32,
    pub gap_px: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl GridMetrics {
    /// Distance from one cell's left edge to the next.
    pub fn pitch(&self) -> f32 {
        self.cell_px + self.gap_px
    }

    /// The cell containing a viewport point.
    pub fn cell_at(&self, px: f32, py: f32) -> Position {
        let pitch = self.pitch();
        Position::new(
            ((px - self.origin_x) / pitch).floor() as i32,
            ((py - self.origin_y) / pitch).floor() as i32,
        )
    }

    /// Pixel deltas rounded to whole-cell deltas, for resize gestures.
    pub fn cell_delta(&self, dx: f32, dy: f32) -> (i32, i32) {
        let pitch = self.pitch();
        ((dx / pitch).round() as i32, (dy / pitch).round() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Card,
    File,
}

struct ActiveDrag {
    card_id: CardId,
    start: (f32, f32),
    /// Captured once at drag start; the overlay never resizes mid-drag.
    overlay_size: Size,
    moved: bool,
}

#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub name: String,
    pub mime: String,
    pub data_url: String,
}

/// Drives card drags, resizes, and external file drops against the store.
/// Moves mutate nothing; all state changes happen at gesture end.
pub struct DragController {
    metrics: GridMetrics,
    active: Option<ActiveDrag>,
    file_depth: i32,
}

impl DragController {
    pub fn new(metrics: GridMetrics) -> Self {
        Self {
            metrics,
            active: None,
            file_depth: 0,
        }
    }

    pub fn set_metrics(&mut self, metrics: GridMetrics) {
        self.metrics = metrics;
    }

    pub fn drag_source(&self) -> Option<DragSource> {
        if self.active.is_some() {
            Some(DragSource::Card)
        } else if self.file_depth > 0 {
            Some(DragSource::File)
        } else {
            None
        }
    }

    pub fn overlay_size(&self) -> Option<Size> {
        self.active.as_ref().map(|d| d.overlay_size)
    }

    pub fn begin_card_drag(&mut self, store: &Rc<CardStore>, id: &CardId, px: f32, py: f32) {
        if self.file_depth > 0 {
            return;
        }
        let Some(card) = store.card(id) else {
            return;
        };
        self.active = Some(ActiveDrag {
            card_id: id.clone(),
            start: (px, py),
            overlay_size: card.size,
            moved: false,
        });
        store.set_dragging(true);
    }

    pub fn drag_moved(&mut self, px: f32, py: f32) {
        if let Some(drag) = &mut self.active {
            let dx = px - drag.start.0;
            let dy = py - drag.start.1;
            if dx * dx + dy * dy > CLICK_SLOP_PX * CLICK_SLOP_PX {
                drag.moved = true;
            }
        }
    }

    /// Settle the gesture: a click selects, a drag over another card swaps,
    /// a drag over empty space does nothing.
    pub fn end_card_drag(&mut self, store: &Rc<CardStore>, px: f32, py: f32) {
        let Some(drag) = self.active.take() else {
            return;
        };
        store.set_dragging(false);

        if !drag.moved {
            store.select_card(Some(drag.card_id));
            return;
        }

        let cell = self.metrics.cell_at(px, py);
        let over_id = store
            .cards()
            .into_iter()
            .find(|c| c.id != drag.card_id && card_contains_cell(c, cell))
            .map(|c| c.id);
        if let Some(over_id) = over_id {
            store.reorder_cards(&drag.card_id, &over_id);
        }
    }

    pub fn cancel_drag(&mut self, store: &Rc<CardStore>) {
        if self.active.take().is_some() {
            store.set_dragging(false);
        }
    }

    /// Enter/leave events nest across child elements, so track depth rather
    /// than a flag. Returns whether a file drop is now pending.
    pub fn file_drag_entered(&mut self) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.file_depth += 1;
        true
    }

    pub fn file_drag_left(&mut self) {
        self.file_depth = (self.file_depth - 1).max(0);
    }

    /// Create media cards for the recognized files. Non-media files and
    /// drops during a card drag are ignored.
    pub fn drop_files(&mut self, store: &Rc<CardStore>, files: Vec<DroppedFile>) -> Vec<CardId> {
        self.file_depth = 0;
        if self.active.is_some() {
            return Vec::new();
        }
        files
            .into_iter()
            .filter_map(|file| {
                let kind = media_kind_for(&file.mime)?;
                let content = CardContent::Media(MediaContent {
                    kind,
                    url: file.data_url,
                    alt: Some(file.name),
                    overlay_text: None,
                    object_position: None,
                    object_scale: None,
                });
                Some(store.add_card(CardDraft::new(CardType::Media, MEDIA_DROP_SIZE, content)))
            })
            .collect()
    }

    /// Finish a resize gesture: pixel travel since the grab, rounded to
    /// cells and applied relative to the size at grab time.
    pub fn end_resize(&self, store: &Rc<CardStore>, id: &CardId, start_size: Size, dx: f32, dy: f32) {
        let (dw, dh) = self.metrics.cell_delta(dx, dy);
        let target = Size::new(start_size.width + dw, start_size.height + dh);
        if target != start_size {
            store.update_card_size(id, target);
        }
    }
}

fn card_contains_cell(card: &Card, cell: Position) -> bool {
    cell.x >= card.position.x
        && cell.x < card.position.x + card.size.width
        && cell.y >= card.position.y
        && cell.y < card.position.y + card.size.height
}

fn media_kind_for(mime: &str) -> Option<MediaKind> {
    if mime.starts_with("video/") {
        Some(MediaKind::Video)
    } else if mime == "image/gif" {
        Some(MediaKind::Gif)
    } else if mime.starts_with("image/") {
        Some(MediaKind::Image)
    } else {
        None
    }
}
