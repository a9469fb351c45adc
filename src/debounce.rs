use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;

/// Single-threaded task spawner. The store and sync engine never block on
/// remote work themselves; everything async goes through this.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

#[cfg(target_arch = "wasm32")]
pub fn default_spawner() -> Spawner {
    Rc::new(|fut| wasm_bindgen_futures::spawn_local(fut))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn default_spawner() -> Spawner {
    Rc::new(|fut| futures::executor::block_on(fut))
}

/// Dropping the handle cancels the timer.
pub trait TimerHandle {}

pub trait TimerSource {
    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Box<dyn TimerHandle>;
}

/// One pending save slot with reset-and-reschedule semantics: arming the
/// scheduler drops whatever was pending, so a burst of edits collapses into
/// the single flush armed last.
pub struct DebounceScheduler {
    source: Rc<dyn TimerSource>,
    pending: RefCell<Option<Box<dyn TimerHandle>>>,
}

impl DebounceScheduler {
    pub fn new(source: Rc<dyn TimerSource>) -> Self {
        Self {
            source,
            pending: RefCell::new(None),
        }
    }

    pub fn debounce(&self, delay_ms: u32, flush: Box<dyn FnOnce()>) {
        let handle = self.source.start(delay_ms, flush);
        *self.pending.borrow_mut() = Some(handle);
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}

#[cfg(target_arch = "wasm32")]
pub mod gloo_timers {
    use gloo::timers::callback::Timeout;

    use super::{TimerHandle, TimerSource};

    pub struct GlooTimers;

    struct GlooTimerHandle {
        timeout: Option<Timeout>,
    }

    impl TimerHandle for GlooTimerHandle {}

    impl Drop for GlooTimerHandle {
        fn drop(&mut self) {
            if let Some(timeout) = self.timeout.take() {
                timeout.cancel();
            }
        }
    }

    impl TimerSource for GlooTimers {
        fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
            let timeout = Timeout::new(delay_ms, callback);
            Box::new(GlooTimerHandle {
                timeout: Some(timeout),
            })
        }
    }
}

/// Deterministic timer source for tests and headless runs: timers queue up
/// and fire only when the caller says so.
#[derive(Clone, Default)]
pub struct ManualTimers {
    inner: Rc<RefCell<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    queue: Vec<ManualEntry>,
}

struct ManualEntry {
    id: u64,
    delay_ms: u32,
    callback: Option<Box<dyn FnOnce()>>,
}

struct ManualHandle {
    id: u64,
    inner: Rc<RefCell<ManualState>>,
}

impl TimerHandle for ManualHandle {}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.inner.borrow_mut().queue.retain(|e| e.id != self.id);
    }
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    pub fn pending_delay_ms(&self) -> Option<u32> {
        self.inner.borrow().queue.first().map(|e| e.delay_ms)
    }

    /// Fire the oldest pending timer. The callback runs outside the borrow
    /// so it may arm new timers.
    pub fn fire_next(&self) -> bool {
        let callback = {
            let mut state = self.inner.borrow_mut();
            if state.queue.is_empty() {
                return false;
            }
            state.queue.remove(0).callback.take()
        };
        if let Some(callback) = callback {
            callback();
        }
        true
    }

    pub fn fire_all(&self) {
        while self.fire_next() {}
    }
}

impl TimerSource for ManualTimers {
    fn start(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Box<dyn TimerHandle> {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.queue.push(ManualEntry {
            id,
            delay_ms,
            callback: Some(callback),
        });
        Box::new(ManualHandle {
            id,
            inner: Rc::clone(&self.inner),
        })
    }
}
