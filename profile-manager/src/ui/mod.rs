pub mod console;

pub use console::ConsoleInterface;

use shared::{ActiveUser, PersonalId, UserSummary};

#[derive(Debug, Clone)]
pub enum UiEvent {
    SelectionChanged(PersonalId),
    AddRequested,
    RenameRequested,
    DeleteRequested,
}

/// Optional rendering surface. The manager works fully headless; when an
/// interface is bound it is re-rendered after every mutation and used for
/// blocking prompts and confirmations.
pub trait UserInterface: Send {
    fn render(&mut self, users: &[UserSummary], current: Option<&ActiveUser>);

    /// Text input; `None` or an empty string means the user cancelled.
    fn prompt(&mut self, message: &str) -> Option<String>;

    fn confirm(&mut self, message: &str) -> bool;

    fn alert(&mut self, message: &str);
}
