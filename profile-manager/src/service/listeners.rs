use std::panic::{catch_unwind, AssertUnwindSafe};

use shared::ActiveUser;

pub type UserChangedCallback = Box<dyn Fn(Option<&ActiveUser>) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(u64);

/// Ordered set of user-changed callbacks. A panicking callback is logged and
/// skipped; delivery to the remaining callbacks continues.
pub struct ListenerRegistry {
    next_id: u64,
    entries: Vec<(u64, UserChangedCallback)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, callback: UserChangedCallback) -> ListenerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        ListenerHandle(id)
    }

    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != handle.0);
        self.entries.len() < before
    }

    pub fn notify(&self, current: Option<&ActiveUser>) {
        for (id, callback) in &self.entries {
            let delivery = catch_unwind(AssertUnwindSafe(|| callback(current)));
            if delivery.is_err() {
                tracing::error!(listener_id = *id, "User-changed listener panicked");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PersonalId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn active(name: &str) -> ActiveUser {
        ActiveUser {
            personal_id: PersonalId::generate(),
            user_name: name.to_string(),
        }
    }

    #[test]
    fn test_callbacks_run_in_registration_order() {
        let mut registry = ListenerRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            registry.subscribe(Box::new(move |_| order.lock().unwrap().push(tag)));
        }

        registry.notify(Some(&active("たろう")));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut registry = ListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let handle = registry.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(None);
        assert!(registry.unsubscribe(handle));
        registry.notify(None);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!registry.unsubscribe(handle), "Second removal is a no-op");
    }

    #[test]
    fn test_panicking_callback_does_not_block_later_ones() {
        let mut registry = ListenerRegistry::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        registry.subscribe(Box::new(|_| panic!("listener failure")));
        let counter = delivered.clone();
        registry.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(Some(&active("たろう")));
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }
}
