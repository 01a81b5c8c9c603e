//! Invalidatable handles to containers the engines do not own.
//!
//! A [`Capability`] is what a [`Level`](crate::level::Level) hands out for a
//! block position: a shared, cloneable reference to the container living
//! there. When the block is removed or the structure changes, the owner of
//! the container calls [`Capability::invalidate`]. From then on the handle
//! refuses access, and every registered holder receives the handle's
//! position in its [`InvalidationInbox`]. Holders drain their inbox at the
//! start of each operation and drop the handles it names.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::SlotMap;

use crate::id::{BlockPos, ListenerId};

// ---------------------------------------------------------------------------
// InvalidationInbox
// ---------------------------------------------------------------------------

/// Receives positions of handles that were invalidated.
#[derive(Debug, Default)]
pub struct InvalidationInbox {
    queue: Rc<RefCell<Vec<BlockPos>>>,
}

impl InvalidationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending message, oldest first.
    pub fn take(&self) -> Vec<BlockPos> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    fn sender(&self) -> Weak<RefCell<Vec<BlockPos>>> {
        Rc::downgrade(&self.queue)
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Shared {
    valid: Cell<bool>,
    listeners: RefCell<SlotMap<ListenerId, Weak<RefCell<Vec<BlockPos>>>>>,
}

/// A weak, invalidatable handle to a container at a block position.
pub struct Capability<T: ?Sized> {
    pos: BlockPos,
    value: Rc<RefCell<T>>,
    shared: Rc<Shared>,
}

impl<T: ?Sized> Capability<T> {
    pub fn new(pos: BlockPos, value: Rc<RefCell<T>>) -> Self {
        let shared = Shared::default();
        shared.valid.set(true);
        Self {
            pos,
            value,
            shared: Rc::new(shared),
        }
    }

    /// The position this handle was resolved for.
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn is_valid(&self) -> bool {
        self.shared.valid.get()
    }

    /// Whether `self` and `other` are clones of the same handle.
    pub fn same_handle(&self, other: &Capability<T>) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    /// Read the container. `None` once invalidated.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if !self.is_valid() {
            return None;
        }
        let value = self.value.try_borrow().ok()?;
        Some(f(&value))
    }

    /// Mutate the container. `None` once invalidated.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        if !self.is_valid() {
            return None;
        }
        let mut value = self.value.try_borrow_mut().ok()?;
        Some(f(&mut value))
    }

    /// Register `inbox` to hear about this handle's invalidation.
    ///
    /// Listening on an already invalid handle delivers immediately.
    pub fn add_listener(&self, inbox: &InvalidationInbox) -> ListenerId {
        if !self.is_valid() {
            inbox.queue.borrow_mut().push(self.pos);
        }
        self.shared.listeners.borrow_mut().insert(inbox.sender())
    }

    /// Deregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.borrow_mut().remove(id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.borrow().len()
    }

    /// Mark the handle dead and notify every listener once.
    pub fn invalidate(&self) {
        if !self.shared.valid.replace(false) {
            return;
        }
        let listeners = std::mem::take(&mut *self.shared.listeners.borrow_mut());
        for (_, sender) in listeners {
            if let Some(queue) = sender.upgrade() {
                queue.borrow_mut().push(self.pos);
            }
        }
    }
}

impl<T: ?Sized> Clone for Capability<T> {
    fn clone(&self) -> Self {
        Self {
            pos: self.pos,
            value: Rc::clone(&self.value),
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("pos", &self.pos)
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}
