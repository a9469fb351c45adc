use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bentogurido_core::card::{Card, CardId, CardType};

use crate::debounce::{DebounceScheduler, Spawner, TimerSource};
use crate::gateway::{CardCreate, CardGateway, CardPatch, GatewayError, ReorderEntry};
use crate::store::CardStore;

pub const DEBOUNCE_POSITION_MS: u32 = 500;
pub const DEBOUNCE_EDIT_MS: u32 = 1_000;

/// Sync outcomes the UI should surface. Silent failures (update, reorder)
/// never reach here.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreNotice {
    CreateFailed { kind: CardType, error: GatewayError },
    DeleteFailed { id: String, error: GatewayError },
}

impl StoreNotice {
    pub fn message(&self) -> String {
        match self {
            StoreNotice::CreateFailed { kind, error } => match error {
                GatewayError::Validation(reason) => {
                    format!("could not add {kind} card: {reason}")
                }
                GatewayError::Transport(_) => format!("could not add {kind} card"),
            },
            StoreNotice::DeleteFailed { error, .. } => match error {
                GatewayError::Validation(reason) => {
                    format!("could not delete card: {reason}")
                }
                GatewayError::Transport(_) => "could not delete card".to_string(),
            },
        }
    }
}

pub struct StoreHooks {
    pub on_notice: Rc<dyn Fn(StoreNotice)>,
}

impl StoreHooks {
    pub fn empty() -> Self {
        Self {
            on_notice: Rc::new(|_| {}),
        }
    }
}

/// Pushes store mutations to the remote card store. Creates and deletes are
/// optimistic with rollback; everything else is debounced and fire-and-forget.
pub struct SyncEngine {
    gateway: Rc<dyn CardGateway>,
    scheduler: DebounceScheduler,
    spawner: Spawner,
    hooks: RefCell<StoreHooks>,
    in_flight: Cell<usize>,
}

impl SyncEngine {
    pub fn new(gateway: Rc<dyn CardGateway>, timers: Rc<dyn TimerSource>, spawner: Spawner) -> Self {
        Self {
            gateway,
            scheduler: DebounceScheduler::new(timers),
            spawner,
            hooks: RefCell::new(StoreHooks::empty()),
            in_flight: Cell::new(0),
        }
    }

    pub fn set_hooks(&self, hooks: StoreHooks) {
        *self.hooks.borrow_mut() = hooks;
    }

    fn notify(&self, notice: StoreNotice) {
        let on_notice = Rc::clone(&self.hooks.borrow().on_notice);
        on_notice(notice);
    }

    fn op_started(&self, store: &CardStore) {
        self.in_flight.set(self.in_flight.get() + 1);
        store.set_saving(true);
    }

    /// Only successful completions stamp the last-saved time; a failed
    /// operation just clears the saving flag once nothing is in flight.
    fn op_finished(&self, store: &CardStore, succeeded: bool) {
        let remaining = self.in_flight.get().saturating_sub(1);
        self.in_flight.set(remaining);
        if remaining > 0 {
            return;
        }
        if succeeded {
            store.mark_saved();
        } else {
            store.set_saving(false);
        }
    }

    /// Remote create for a card already applied locally under a provisional
    /// id. Success swaps in the durable id; failure rolls the card back out.
    pub fn push_create(&self, store: &Rc<CardStore>, provisional: CardId) {
        let Some(card) = store.card(&provisional) else {
            return;
        };
        let sort_order = store.card_count() as i32 - 1;
        let body = CardCreate::from_card(&card, sort_order);
        let kind = card.kind;

        self.op_started(store);
        let future = self.gateway.create_card(body);
        let store = Rc::clone(store);
        (self.spawner)(Box::pin(async move {
            let succeeded = match future.await {
                Ok(durable) => {
                    store.confirm_create(&provisional, durable);
                    true
                }
                Err(error) => {
                    store.rollback_create(&provisional);
                    store
                        .sync()
                        .notify(StoreNotice::CreateFailed { kind, error });
                    false
                }
            };
            store.sync().op_finished(&store, succeeded);
        }));
    }

    /// Remote delete for a card already removed locally. Provisional cards
    /// never reached the remote store, so there is nothing to delete there.
    pub fn push_delete(&self, store: &Rc<CardStore>, removed: Card, index: usize) {
        let Some(durable) = removed.id.as_durable().map(String::from) else {
            return;
        };

        self.op_started(store);
        let future = self.gateway.delete_card(durable.clone());
        let store = Rc::clone(store);
        (self.spawner)(Box::pin(async move {
            let succeeded = match future.await {
                Ok(()) => true,
                Err(error) => {
                    log_sync_failure("delete", &error);
                    store.restore_card(removed, index);
                    store
                        .sync()
                        .notify(StoreNotice::DeleteFailed { id: durable, error });
                    false
                }
            };
            store.sync().op_finished(&store, succeeded);
        }));
    }

    /// Debounced full-card save. The card is read back from the store when
    /// the timer fires, so the flush always carries the latest state.
    pub fn schedule_card_save(&self, store: &Rc<CardStore>, id: CardId, delay_ms: u32) {
        let store = Rc::clone(store);
        self.scheduler.debounce(
            delay_ms,
            Box::new(move || {
                let Some(card) = store.card(&id) else {
                    return;
                };
                let Some(durable) = card.id.as_durable().map(String::from) else {
                    return;
                };
                let patch = CardPatch::full(&card);
                let sync = store.sync();
                sync.op_started(&store);
                let future = sync.gateway.update_card(durable, patch);
                let inner = Rc::clone(&store);
                (sync.spawner)(Box::pin(async move {
                    let succeeded = match future.await {
                        Ok(()) => true,
                        Err(error) => {
                            log_sync_failure("update", &error);
                            false
                        }
                    };
                    inner.sync().op_finished(&inner, succeeded);
                }));
            }),
        );
    }

    /// Debounced persistence of a settled swap: both cards in one batch.
    pub fn schedule_swap_save(&self, store: &Rc<CardStore>, active_id: CardId, over_id: CardId) {
        let store = Rc::clone(store);
        self.scheduler.debounce(
            DEBOUNCE_POSITION_MS,
            Box::new(move || {
                let entries: Vec<ReorderEntry> = [&active_id, &over_id]
                    .into_iter()
                    .filter_map(|id| store.card(id))
                    .filter_map(|card| {
                        card.id.as_durable().map(|durable| ReorderEntry {
                            id: durable.to_string(),
                            position_x: card.position.x,
                            position_y: card.position.y,
                        })
                    })
                    .collect();
                if entries.is_empty() {
                    return;
                }
                let sync = store.sync();
                sync.op_started(&store);
                let future = sync.gateway.reorder_batch(entries);
                let inner = Rc::clone(&store);
                (sync.spawner)(Box::pin(async move {
                    let succeeded = match future.await {
                        Ok(()) => true,
                        Err(error) => {
                            log_sync_failure("reorder", &error);
                            false
                        }
                    };
                    inner.sync().op_finished(&inner, succeeded);
                }));
            }),
        );
    }

    pub fn schedule_profile_save(&self, store: &Rc<CardStore>) {
        let store = Rc::clone(store);
        self.scheduler.debounce(
            DEBOUNCE_EDIT_MS,
            Box::new(move || {
                let profile = store.profile();
                let patch = bentogurido_core::profile::ProfilePatch {
                    avatar: Some(profile.avatar),
                    name: Some(profile.name),
                    title: Some(profile.title),
                    tags: Some(profile.tags),
                    bio: Some(profile.bio),
                };
                let sync = store.sync();
                sync.op_started(&store);
                let future = sync.gateway.update_profile(patch);
                let inner = Rc::clone(&store);
                (sync.spawner)(Box::pin(async move {
                    let succeeded = match future.await {
                        Ok(()) => true,
                        Err(error) => {
                            log_sync_failure("profile", &error);
                            false
                        }
                    };
                    inner.sync().op_finished(&inner, succeeded);
                }));
            }),
        );
    }

    pub fn cancel_pending(&self) {
        self.scheduler.cancel();
    }
}

#[cfg(target_arch = "wasm32")]
fn log_sync_failure(op: &str, error: &GatewayError) {
    gloo::console::warn!(format!("sync {op} failed: {error}"));
}

#[cfg(not(target_arch = "wasm32"))]
fn log_sync_failure(_op: &str, _error: &GatewayError) {}
