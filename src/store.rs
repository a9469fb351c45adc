use std::cell::RefCell;
use std::rc::Rc;

use bentogurido_core::card::{
    clamp_size, Card, CardContent, CardDraft, CardId, CardStyle, Position, Size,
};
use bentogurido_core::grid::{
    clamp_x, collection_has_overlap, fits_at, find_free_position, find_next_available_position,
    occupied_cells, resolve_swap_positions,
};
use bentogurido_core::hydrate::prepare_hydrated_cards;
use bentogurido_core::profile::{Profile, ProfilePatch};

use crate::debounce::{default_spawner, Spawner, TimerSource};
use crate::gateway::CardGateway;
use crate::sync::{StoreHooks, SyncEngine, DEBOUNCE_EDIT_MS, DEBOUNCE_POSITION_MS};

pub type StoreSubscriber = Rc<dyn Fn()>;

/// Removes the subscriber when dropped.
pub struct StoreSubscription {
    subscriber: StoreSubscriber,
    subscribers: Rc<RefCell<Vec<StoreSubscriber>>>,
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.subscribers
            .borrow_mut()
            .retain(|s| !Rc::ptr_eq(s, &self.subscriber));
    }
}

/// What subscribers read. Rebuilt after every mutation.
#[derive(Clone, Default)]
pub struct StoreSnapshot {
    pub cards: Vec<Card>,
    pub profile: Profile,
    pub selected_card_id: Option<CardId>,
    pub is_editing: bool,
    pub is_dragging: bool,
    pub show_edit_panel: bool,
    pub is_saving: bool,
    pub is_hydrated: bool,
    pub last_saved_ms: Option<f64>,
}

#[derive(Default)]
struct StoreState {
    cards: Vec<Card>,
    profile: Profile,
    selected_card_id: Option<CardId>,
    is_editing: bool,
    is_dragging: bool,
    show_edit_panel: bool,
    is_saving: bool,
    is_hydrated: bool,
    last_saved_ms: Option<f64>,
    next_provisional: u64,
}

/// Two snapshots swapped back and forth so refreshing reuses the old
/// snapshot's allocations instead of rebuilding from scratch.
struct SnapshotBuffer {
    front: StoreSnapshot,
    back: StoreSnapshot,
}

impl SnapshotBuffer {
    fn new() -> Self {
        Self {
            front: StoreSnapshot::default(),
            back: StoreSnapshot::default(),
        }
    }

    fn refresh_from_state(&mut self, state: &StoreState) {
        self.back.cards.clone_from(&state.cards);
        self.back.profile.clone_from(&state.profile);
        self.back.selected_card_id.clone_from(&state.selected_card_id);
        self.back.is_editing = state.is_editing;
        self.back.is_dragging = state.is_dragging;
        self.back.show_edit_panel = state.show_edit_panel;
        self.back.is_saving = state.is_saving;
        self.back.is_hydrated = state.is_hydrated;
        self.back.last_saved_ms = state.last_saved_ms;
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

/// The authoritative client-side state container: card collection, profile,
/// and transient UI state, with every mutation applied synchronously and
/// persistence pushed through the sync engine afterwards.
pub struct CardStore {
    state: RefCell<StoreState>,
    snapshots: RefCell<SnapshotBuffer>,
    subscribers: Rc<RefCell<Vec<StoreSubscriber>>>,
    sync: SyncEngine,
}

impl CardStore {
    #[cfg(target_arch = "wasm32")]
    pub fn new(gateway: Rc<dyn CardGateway>) -> Rc<Self> {
        Self::with_runtime(
            gateway,
            Rc::new(crate::debounce::gloo_timers::GlooTimers),
            default_spawner(),
        )
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(gateway: Rc<dyn CardGateway>) -> Rc<Self> {
        Self::with_runtime(
            gateway,
            Rc::new(crate::debounce::ManualTimers::new()),
            default_spawner(),
        )
    }

    pub fn with_runtime(
        gateway: Rc<dyn CardGateway>,
        timers: Rc<dyn TimerSource>,
        spawner: Spawner,
    ) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(StoreState {
                next_provisional: 1,
                ..StoreState::default()
            }),
            snapshots: RefCell::new(SnapshotBuffer::new()),
            subscribers: Rc::new(RefCell::new(Vec::new())),
            sync: SyncEngine::new(gateway, timers, spawner),
        })
    }

    pub fn set_hooks(&self, hooks: StoreHooks) {
        self.sync.set_hooks(hooks);
    }

    pub(crate) fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    pub fn subscribe(&self, subscriber: StoreSubscriber) -> StoreSubscription {
        self.subscribers.borrow_mut().push(Rc::clone(&subscriber));
        StoreSubscription {
            subscriber,
            subscribers: Rc::clone(&self.subscribers),
        }
    }

    fn notify(&self) {
        self.snapshots
            .borrow_mut()
            .refresh_from_state(&self.state.borrow());
        let subscribers: Vec<StoreSubscriber> = self.subscribers.borrow().clone();
        for subscriber in subscribers {
            subscriber();
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshots.borrow().front.clone()
    }

    /// Run a mutation against the state, then refresh the snapshot and fan
    /// out to subscribers. The state borrow never outlives the closure.
    fn mutate<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = {
            let mut state = self.state.borrow_mut();
            f(&mut state)
        };
        self.notify();
        result
    }

    pub fn card(&self, id: &CardId) -> Option<Card> {
        self.state
            .borrow()
            .cards
            .iter()
            .find(|c| c.id == *id)
            .cloned()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.state.borrow().cards.clone()
    }

    pub fn profile(&self) -> Profile {
        self.state.borrow().profile.clone()
    }

    pub fn card_count(&self) -> usize {
        self.state.borrow().cards.len()
    }

    /// Replace the collection with a sanitized remote payload.
    pub fn hydrate(&self, cards: Vec<Card>, profile: Profile) {
        let cards = prepare_hydrated_cards(cards);
        debug_assert!(!collection_has_overlap(&cards));
        self.mutate(|state| {
            state.cards = cards;
            state.profile = profile;
            state.selected_card_id = None;
            state.show_edit_panel = false;
            state.is_hydrated = true;
        });
    }

    /// Apply the draft locally under a provisional id and kick off the
    /// remote create. Returns the provisional id.
    pub fn add_card(self: &Rc<Self>, draft: CardDraft) -> CardId {
        let id = self.mutate(|state| {
            let id = CardId::Provisional(state.next_provisional);
            state.next_provisional += 1;
            let size = clamp_size(draft.kind, draft.size);
            let position = find_next_available_position(&state.cards, size);
            state.cards.push(Card {
                id: id.clone(),
                kind: draft.kind,
                position,
                size,
                content: draft.content,
                style: draft.style,
                z_index: draft.z_index,
            });
            debug_assert!(!collection_has_overlap(&state.cards));
            id
        });
        self.sync.push_create(self, id.clone());
        id
    }

    pub fn remove_card(self: &Rc<Self>, id: &CardId) {
        let removed = self.mutate(|state| {
            let index = state.cards.iter().position(|c| c.id == *id)?;
            let card = state.cards.remove(index);
            if state.selected_card_id.as_ref() == Some(id) {
                state.selected_card_id = None;
                state.show_edit_panel = false;
            }
            Some((card, index))
        });
        if let Some((card, index)) = removed {
            self.sync.push_delete(self, card, index);
        }
    }

    /// Raw position write. Overlap is allowed here; this is the live-drag
    /// path and the settled state is produced by the gesture's end.
    pub fn update_card_position(self: &Rc<Self>, id: &CardId, position: Position) {
        let found = self.mutate(|state| {
            let card = state.cards.iter_mut().find(|c| c.id == *id)?;
            card.position = position;
            Some(())
        });
        if found.is_some() {
            self.sync
                .schedule_card_save(self, id.clone(), DEBOUNCE_POSITION_MS);
        }
    }

    /// Resize in place when the clamped footprint fits, otherwise relocate
    /// to the first free slot.
    pub fn update_card_size(self: &Rc<Self>, id: &CardId, size: Size) {
        let changed = self.mutate(|state| {
            let index = state.cards.iter().position(|c| c.id == *id)?;
            let kind = state.cards[index].kind;
            let size = clamp_size(kind, size);
            let occupied = occupied_cells(&state.cards, &[id]);
            let current = state.cards[index].position;
            let anchored = Position::new(clamp_x(current.x, size.width), current.y);
            let position = if fits_at(&occupied, anchored, size) {
                anchored
            } else {
                find_free_position(&occupied, size)
            };
            let card = &mut state.cards[index];
            card.size = size;
            card.position = position;
            debug_assert!(!collection_has_overlap(&state.cards));
            Some(())
        });
        if changed.is_some() {
            self.sync
                .schedule_card_save(self, id.clone(), DEBOUNCE_POSITION_MS);
        }
    }

    /// Content replacement keeps the card's kind fixed; a payload of another
    /// kind is ignored.
    pub fn update_card_content(self: &Rc<Self>, id: &CardId, content: CardContent) {
        let changed = self.mutate(|state| {
            let card = state.cards.iter_mut().find(|c| c.id == *id)?;
            if content.kind() != card.kind {
                return None;
            }
            card.content = content;
            Some(())
        });
        if changed.is_some() {
            self.sync
                .schedule_card_save(self, id.clone(), DEBOUNCE_EDIT_MS);
        }
    }

    pub fn update_card_style(self: &Rc<Self>, id: &CardId, patch: CardStyle) {
        let changed = self.mutate(|state| {
            let card = state.cards.iter_mut().find(|c| c.id == *id)?;
            match &mut card.style {
                Some(style) => style.merge(patch),
                None => card.style = Some(patch),
            }
            Some(())
        });
        if changed.is_some() {
            self.sync
                .schedule_card_save(self, id.clone(), DEBOUNCE_EDIT_MS);
        }
    }

    /// Clone a card next to the original when the neighboring slot is free,
    /// else wherever the search lands. The copy is a fresh create.
    pub fn duplicate_card(self: &Rc<Self>, id: &CardId) -> Option<CardId> {
        let new_id = self.mutate(|state| {
            let source = state.cards.iter().find(|c| c.id == *id)?.clone();
            let id = CardId::Provisional(state.next_provisional);
            state.next_provisional += 1;
            let occupied = occupied_cells(&state.cards, &[]);
            let beside = Position::new(
                clamp_x(source.position.x + 1, source.size.width),
                source.position.y,
            );
            let position = if fits_at(&occupied, beside, source.size) {
                beside
            } else {
                find_free_position(&occupied, source.size)
            };
            state.cards.push(Card {
                id: id.clone(),
                position,
                ..source
            });
            debug_assert!(!collection_has_overlap(&state.cards));
            Some(id)
        })?;
        self.sync.push_create(self, new_id.clone());
        Some(new_id)
    }

    /// Settle a drag-swap: both cards move to their resolved positions in
    /// one mutation, then persist through one batch call.
    pub fn reorder_cards(self: &Rc<Self>, active_id: &CardId, over_id: &CardId) {
        if active_id == over_id {
            return;
        }
        let resolved = self.mutate(|state| {
            let (active_pos, over_pos) =
                resolve_swap_positions(&state.cards, active_id, over_id)?;
            for card in &mut state.cards {
                if card.id == *active_id {
                    card.position = active_pos;
                } else if card.id == *over_id {
                    card.position = over_pos;
                }
            }
            debug_assert!(!collection_has_overlap(&state.cards));
            Some(())
        });
        if resolved.is_some() {
            self.sync
                .schedule_swap_save(self, active_id.clone(), over_id.clone());
        }
    }

    pub fn select_card(&self, id: Option<CardId>) {
        self.mutate(|state| {
            state.show_edit_panel = id.is_some();
            state.selected_card_id = id;
        });
    }

    pub fn update_profile(self: &Rc<Self>, patch: ProfilePatch) {
        self.mutate(|state| state.profile.apply(patch));
        self.sync.schedule_profile_save(self);
    }

    pub fn set_editing(&self, editing: bool) {
        self.mutate(|state| {
            state.is_editing = editing;
            if !editing {
                state.selected_card_id = None;
                state.show_edit_panel = false;
            }
        });
    }

    pub fn toggle_editing(&self) {
        let editing = self.state.borrow().is_editing;
        self.set_editing(!editing);
    }

    pub fn set_dragging(&self, dragging: bool) {
        self.mutate(|state| state.is_dragging = dragging);
    }

    /// Drop all state, including anything still pending a debounced save.
    pub fn reset(&self) {
        self.sync.cancel_pending();
        self.mutate(|state| {
            *state = StoreState {
                next_provisional: state.next_provisional,
                ..StoreState::default()
            };
        });
    }

    /// Swap the provisional id for the durable one. The card may have been
    /// deleted locally while the create was in flight; then the durable id
    /// is dropped and the orphan surfaces on the next load.
    pub(crate) fn confirm_create(&self, provisional: &CardId, durable: String) {
        let confirmed = self.mutate(|state| {
            let card = state.cards.iter_mut().find(|c| c.id == *provisional)?;
            let durable = CardId::Durable(durable);
            if state.selected_card_id.as_ref() == Some(provisional) {
                state.selected_card_id = Some(durable.clone());
            }
            card.id = durable;
            Some(())
        });
        if confirmed.is_none() {
            log_orphaned_create(provisional);
        }
    }

    pub(crate) fn rollback_create(&self, provisional: &CardId) {
        self.mutate(|state| {
            state.cards.retain(|c| c.id != *provisional);
            if state.selected_card_id.as_ref() == Some(provisional) {
                state.selected_card_id = None;
                state.show_edit_panel = false;
            }
        });
    }

    /// Reinsert a card whose remote delete failed, back at its old index.
    pub(crate) fn restore_card(&self, card: Card, index: usize) {
        self.mutate(|state| {
            let index = index.min(state.cards.len());
            state.cards.insert(index, card);
        });
    }

    pub(crate) fn set_saving(&self, saving: bool) {
        let unchanged = self.state.borrow().is_saving == saving;
        if unchanged {
            return;
        }
        self.mutate(|state| state.is_saving = saving);
    }

    pub(crate) fn mark_saved(&self) {
        self.mutate(|state| {
            state.is_saving = false;
            state.last_saved_ms = Some(now_ms());
        });
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn log_orphaned_create(provisional: &CardId) {
    gloo::console::warn!(format!(
        "create for {provisional} confirmed after local delete; durable id dropped"
    ));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_orphaned_create(_provisional: &CardId) {}
