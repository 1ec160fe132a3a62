//! Listener registry and re-entrant dispatch
//!
//! Handlers receive the context that owns them (`&mut C`) so they can call
//! back into it while being dispatched. To make that possible the registry
//! never holds a borrow across a handler call: each handler is moved out of
//! its slot, invoked, and moved back only if its slot still exists.

use smallvec::SmallVec;

/// Handle returned by [`Listeners::connect`], used to disconnect later
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Event handler function type
pub type Handler<C, E> = Box<dyn FnMut(&mut C, &E)>;

struct Slot<C, E> {
    id: ListenerId,
    /// `None` while the handler is being dispatched
    handler: Option<Handler<C, E>>,
}

/// Ordered set of handlers for one event source
pub struct Listeners<C, E> {
    slots: SmallVec<[Slot<C, E>; 2]>,
    next_id: u64,
}

impl<C, E> Listeners<C, E> {
    pub fn new() -> Self {
        Self {
            slots: SmallVec::new(),
            next_id: 0,
        }
    }

    /// Register a handler; handlers are called in connection order
    pub fn connect<F>(&mut self, handler: F) -> ListenerId
    where
        F: FnMut(&mut C, &E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            id,
            handler: Some(Box::new(handler)),
        });
        id
    }

    /// Remove a handler. Returns false if it was not connected.
    ///
    /// Safe to call from inside a dispatch, including from the handler itself.
    pub fn disconnect(&mut self, id: ListenerId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        self.slots.len() != before
    }

    pub fn is_connected(&self, id: ListenerId) -> bool {
        self.slots.iter().any(|slot| slot.id == id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    fn ids(&self) -> SmallVec<[ListenerId; 4]> {
        self.slots.iter().map(|slot| slot.id).collect()
    }

    fn take(&mut self, id: ListenerId) -> Option<Handler<C, E>> {
        self.slots
            .iter_mut()
            .find(|slot| slot.id == id)
            .and_then(|slot| slot.handler.take())
    }

    fn put_back(&mut self, id: ListenerId, handler: Handler<C, E>) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == id) {
            if slot.handler.is_none() {
                slot.handler = Some(handler);
            }
        }
    }
}

impl<C, E> Default for Listeners<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> std::fmt::Debug for Listeners<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.slots.len())
            .finish()
    }
}

/// Dispatch `event` to the listeners that `locate` finds inside `ctx`.
///
/// The handler set is snapshotted first: handlers connected during the
/// dispatch are not called for this event, handlers disconnected during the
/// dispatch are skipped. If `locate` stops finding the listeners (the owner
/// was removed by a handler) dispatch ends early.
pub fn dispatch<C, E, F>(ctx: &mut C, event: &E, locate: F)
where
    F: Fn(&mut C) -> Option<&mut Listeners<C, E>>,
{
    let ids = match locate(ctx) {
        Some(listeners) => listeners.ids(),
        None => return,
    };

    for id in ids {
        let Some(listeners) = locate(ctx) else {
            return;
        };
        // Already running further up the stack, or disconnected meanwhile
        let Some(mut handler) = listeners.take(id) else {
            continue;
        };

        handler(ctx, event);

        if let Some(listeners) = locate(ctx) {
            listeners.put_back(id, handler);
        }
    }
}
