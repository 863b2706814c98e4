//! Name-keyed listener registry used by the peripheral controllers to deliver
//! events to application code.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

pub type ListenerId = usize;

type Callback<P> = Rc<RefCell<dyn FnMut(&P)>>;

struct Listener<P> {
    id: ListenerId,
    name: String,
    callback: Callback<P>,
}

/// Listeners for events carrying a `P` payload.
///
/// Listeners run in registration order. A listener may add or remove listeners
/// on the same emitter while it runs; changes apply from the next `emit`.
pub struct Emitter<P> {
    listeners: RefCell<Vec<Listener<P>>>,
    next_id: Cell<ListenerId>,
}

impl<P> Default for Emitter<P> {
    fn default() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<P> Emitter<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&P) + 'static,
    {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let callback: Callback<P> = Rc::new(RefCell::new(listener));
        self.listeners.borrow_mut().push(Listener {
            id,
            name: String::from(name),
            callback,
        });
        id
    }

    /// Removes one listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.name == name)
            .count()
    }

    pub fn remove_all_listeners(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Calls every listener registered for `name` and returns how many ran.
    pub fn emit(&self, name: &str, payload: &P) -> usize {
        let matching: Vec<Callback<P>> = self
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.name == name)
            .map(|l| Rc::clone(&l.callback))
            .collect();
        for callback in &matching {
            let mut callback = callback.borrow_mut();
            (*callback)(payload);
        }
        matching.len()
    }
}
