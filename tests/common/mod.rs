#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use bentogurido::debounce::ManualTimers;
use bentogurido::gateway::{CardCreate, CardGateway, CardPatch, GatewayError, ReorderEntry};
use bentogurido::store::CardStore;
use bentogurido_core::card::{
    CardContent, CardDraft, CardType, MediaContent, MediaKind, Size, SocialContent, TextContent,
};
use bentogurido_core::profile::ProfilePatch;

#[derive(Debug, Clone)]
pub enum GatewayCall {
    Create(CardCreate),
    Update { id: String, patch: CardPatch },
    Delete { id: String },
    Reorder(Vec<ReorderEntry>),
    Profile(ProfilePatch),
}

/// Records every call and answers from scripted result queues; unscripted
/// calls succeed, creates with generated durable ids.
#[derive(Default)]
pub struct RecordingGateway {
    pub calls: RefCell<Vec<GatewayCall>>,
    create_results: RefCell<VecDeque<Result<String, GatewayError>>>,
    update_results: RefCell<VecDeque<Result<(), GatewayError>>>,
    delete_results: RefCell<VecDeque<Result<(), GatewayError>>>,
    next_id: Cell<u64>,
}

impl RecordingGateway {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fail_next_create(&self, error: GatewayError) {
        self.create_results.borrow_mut().push_back(Err(error));
    }

    pub fn fail_next_delete(&self, error: GatewayError) {
        self.delete_results.borrow_mut().push_back(Err(error));
    }

    pub fn fail_next_update(&self, error: GatewayError) {
        self.update_results.borrow_mut().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl CardGateway for RecordingGateway {
    fn create_card(
        &self,
        body: CardCreate,
    ) -> LocalBoxFuture<'static, Result<String, GatewayError>> {
        self.calls.borrow_mut().push(GatewayCall::Create(body));
        let result = self.create_results.borrow_mut().pop_front().unwrap_or_else(|| {
            let n = self.next_id.get() + 1;
            self.next_id.set(n);
            Ok(format!("card-{n}"))
        });
        async move { result }.boxed_local()
    }

    fn update_card(
        &self,
        id: String,
        patch: CardPatch,
    ) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
        self.calls.borrow_mut().push(GatewayCall::Update { id, patch });
        let result = self
            .update_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(()));
        async move { result }.boxed_local()
    }

    fn delete_card(&self, id: String) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
        self.calls.borrow_mut().push(GatewayCall::Delete { id });
        let result = self
            .delete_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(()));
        async move { result }.boxed_local()
    }

    fn reorder_batch(
        &self,
        entries: Vec<ReorderEntry>,
    ) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
        self.calls.borrow_mut().push(GatewayCall::Reorder(entries));
        async move { Ok(()) }.boxed_local()
    }

    fn update_profile(
        &self,
        patch: ProfilePatch,
    ) -> LocalBoxFuture<'static, Result<(), GatewayError>> {
        self.calls.borrow_mut().push(GatewayCall::Profile(patch));
        async move { Ok(()) }.boxed_local()
    }
}

/// Spawner that parks futures until `run` drains them, so tests control
/// exactly when remote results land.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<Vec<LocalBoxFuture<'static, ()>>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawner(&self) -> bentogurido::debounce::Spawner {
        let inner = Rc::clone(&self.inner);
        Rc::new(move |fut| inner.borrow_mut().push(fut))
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn run(&self) {
        loop {
            let next = {
                let mut queue = self.inner.borrow_mut();
                if queue.is_empty() {
                    break;
                }
                queue.remove(0)
            };
            futures::executor::block_on(next);
        }
    }
}

pub struct Harness {
    pub store: Rc<CardStore>,
    pub gateway: Rc<RecordingGateway>,
    pub timers: ManualTimers,
    pub tasks: TaskQueue,
}

pub fn harness() -> Harness {
    let gateway = RecordingGateway::new();
    let timers = ManualTimers::new();
    let tasks = TaskQueue::new();
    let store = CardStore::with_runtime(
        Rc::clone(&gateway) as Rc<dyn CardGateway>,
        Rc::new(timers.clone()),
        tasks.spawner(),
    );
    Harness {
        store,
        gateway,
        timers,
        tasks,
    }
}

pub fn text_draft() -> CardDraft {
    CardDraft::new(
        CardType::Text,
        Size::new(2, 1),
        CardContent::Text(TextContent {
            title: None,
            body: "hello".to_string(),
            markdown: None,
        }),
    )
}

pub fn social_draft() -> CardDraft {
    CardDraft::new(
        CardType::Social,
        Size::new(1, 1),
        CardContent::Social(SocialContent {
            platform: "twitter".to_string(),
            username: "@someone".to_string(),
            url: "https://twitter.com/someone".to_string(),
            followers: None,
            icon: "twitter".to_string(),
        }),
    )
}

pub fn media_draft() -> CardDraft {
    CardDraft::new(
        CardType::Media,
        Size::new(2, 2),
        CardContent::Media(MediaContent {
            kind: MediaKind::Image,
            url: "https://example.com/a.png".to_string(),
            alt: None,
            overlay_text: None,
            object_position: None,
            object_scale: None,
        }),
    )
}
