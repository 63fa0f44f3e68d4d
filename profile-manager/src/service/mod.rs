pub mod guest;
pub mod listeners;
pub mod user_manager;

pub use listeners::{ListenerHandle, ListenerRegistry, UserChangedCallback};
pub use user_manager::UserManager;
