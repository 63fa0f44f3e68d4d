pub mod repository;
pub mod service;
pub mod store;
pub mod ui;

pub use repository::{ProfileRepository, ReservationRepository};
pub use service::{ListenerHandle, UserManager};
pub use store::{
    DocumentStore, InsertOutcome, KeyValueStore, MemoryDocumentStore, MemoryKeyValueStore,
};
pub use ui::{ConsoleInterface, UiEvent, UserInterface};
