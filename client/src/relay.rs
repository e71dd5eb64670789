use std::cell::{Cell, RefCell};
use std::rc::Rc;

use nrftw_map_shared::AppState;

type PageListener = Rc<dyn Fn(&AppState)>;

/// Hands store notifications to page listeners once the store is no longer
/// borrowed, so a listener may call straight back into the map core.
///
/// Delivery is not reentrant: a flush requested from inside a listener only
/// queues, and the running flush delivers in order. Every listener's last
/// snapshot is therefore the store's current state.
#[derive(Default)]
pub struct ListenerRelay {
    pending: RefCell<Vec<AppState>>,
    listeners: RefCell<Vec<(u32, PageListener)>>,
    next_id: Cell<u32>,
    delivering: Cell<bool>,
}

impl ListenerRelay {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Called from inside the store's notification pass.
    pub fn enqueue(&self, state: &AppState) {
        self.pending.borrow_mut().push(state.clone());
    }

    pub fn add(&self, listener: impl Fn(&AppState) + 'static) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn remove(&self, id: u32) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Deliver every queued snapshot, oldest first, to the listeners
    /// registered at delivery time.
    pub fn flush(&self) {
        if self.delivering.replace(true) {
            return;
        }
        loop {
            let batch = std::mem::take(&mut *self.pending.borrow_mut());
            if batch.is_empty() {
                break;
            }
            for state in &batch {
                let listeners: Vec<PageListener> = self
                    .listeners
                    .borrow()
                    .iter()
                    .map(|(_, listener)| Rc::clone(listener))
                    .collect();
                for listener in listeners {
                    listener(state);
                }
            }
        }
        self.delivering.set(false);
    }
}
