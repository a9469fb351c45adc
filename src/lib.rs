pub mod debounce;
pub mod gateway;
pub mod input;
pub mod store;
pub mod sync;

pub use gateway::{CardCreate, CardGateway, CardPatch, GatewayError, ReorderEntry};
pub use input::{DragController, DragSource, DroppedFile, GridMetrics};
pub use store::{CardStore, StoreSnapshot, StoreSubscription};
pub use sync::{StoreHooks, StoreNotice};
