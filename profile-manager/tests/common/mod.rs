use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use profile_manager::{
    MemoryDocumentStore, MemoryKeyValueStore, UserInterface, UserManager,
};
use shared::{ActiveUser, ProfileConfig, UserSummary};

pub struct TestContext {
    pub store: Arc<MemoryDocumentStore>,
    pub kv: Arc<MemoryKeyValueStore>,
    pub manager: UserManager,
}

pub fn build_manager() -> TestContext {
    build_manager_with_ui(None)
}

pub fn build_manager_with_ui(ui: Option<Box<dyn UserInterface>>) -> TestContext {
    let store = Arc::new(MemoryDocumentStore::new());
    let kv = Arc::new(MemoryKeyValueStore::new());
    let manager = UserManager::new(store.clone(), kv.clone(), ui, ProfileConfig::default());
    TestContext { store, kv, manager }
}

pub fn manager_over(
    store: Arc<MemoryDocumentStore>,
    kv: Arc<MemoryKeyValueStore>,
) -> UserManager {
    UserManager::new(store, kv, None, ProfileConfig::default())
}

/// Shared handles into a `ScriptedUi`, kept by the test after the interface
/// itself moves into the manager.
#[derive(Clone, Default)]
pub struct UiScript {
    pub prompt_answers: Arc<Mutex<VecDeque<Option<String>>>>,
    pub confirm_answers: Arc<Mutex<VecDeque<bool>>>,
    pub alerts: Arc<Mutex<Vec<String>>>,
    pub render_count: Arc<Mutex<usize>>,
}

impl UiScript {
    pub fn queue_prompt(&self, answer: Option<&str>) {
        self.prompt_answers
            .lock()
            .unwrap()
            .push_back(answer.map(str::to_string));
    }

    pub fn queue_confirm(&self, answer: bool) {
        self.confirm_answers.lock().unwrap().push_back(answer);
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn renders(&self) -> usize {
        *self.render_count.lock().unwrap()
    }
}

pub struct ScriptedUi {
    script: UiScript,
}

impl ScriptedUi {
    pub fn new(script: UiScript) -> Self {
        Self { script }
    }
}

impl UserInterface for ScriptedUi {
    fn render(&mut self, _users: &[UserSummary], _current: Option<&ActiveUser>) {
        *self.script.render_count.lock().unwrap() += 1;
    }

    fn prompt(&mut self, _message: &str) -> Option<String> {
        self.script
            .prompt_answers
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
    }

    fn confirm(&mut self, _message: &str) -> bool {
        self.script
            .confirm_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        self.script.alerts.lock().unwrap().push(message.to_string());
    }
}
