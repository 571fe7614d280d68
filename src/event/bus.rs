use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use super::Unsubscribe;

/// Marker for values that can travel over the [`EventBus`].
///
/// The event type itself is the channel key, so every event type has at most
/// one handler at a time.
pub trait BusEvent: Any {}

type Handler = Rc<dyn Fn(&dyn Any)>;

struct Entry {
    id: u64,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    channels: HashMap<TypeId, Entry>,
    next_id: u64,
}

/// Session-wide publish/subscribe registry with one handler per channel.
///
/// Cloning the bus yields another handle onto the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("channels", &format!("<{} channels>", self.len()))
            .finish()
    }
}

impl EventBus {
    /// Creates a new, empty event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `handler` on the channel of `E`, replacing any existing handler.
    ///
    /// The returned callback removes the handler again, unless it has been
    /// replaced in the meantime.
    pub fn on<E: BusEvent>(&self, handler: impl Fn(&E) + 'static) -> Unsubscribe {
        let id = self.insert::<E>(handler, false);
        let inner = Rc::downgrade(&self.inner);

        Box::new(move || remove_entry(&inner, TypeId::of::<E>(), id))
    }

    /// Installs a handler that is removed right before its first delivery.
    pub fn once<E: BusEvent>(&self, handler: impl Fn(&E) + 'static) {
        self.insert::<E>(handler, true);
    }

    /// Delivers `event` to the handler of its channel.
    ///
    /// Returns `false` if nobody listens, which is not an error.
    pub fn emit<E: BusEvent>(&self, event: E) -> bool {
        let key = TypeId::of::<E>();
        let handler = {
            let mut inner = self.inner.borrow_mut();
            let Some(entry) = inner.channels.get(&key) else {
                log::trace!("no handler for {}", std::any::type_name::<E>());
                return false;
            };
            let handler = entry.handler.clone();
            if entry.once {
                inner.channels.remove(&key);
            }
            handler
        };

        // The registry is released here so the handler may subscribe or emit again.
        handler(&event);
        true
    }

    /// Returns true if the channel of `E` has a handler
    pub fn exists<E: BusEvent>(&self) -> bool {
        self.inner.borrow().channels.contains_key(&TypeId::of::<E>())
    }

    /// Removes the handler of `E`, returning whether there was one
    pub fn off<E: BusEvent>(&self) -> bool {
        self.inner
            .borrow_mut()
            .channels
            .remove(&TypeId::of::<E>())
            .is_some()
    }

    /// Removes every handler on every channel
    pub fn off_all(&self) {
        self.inner.borrow_mut().channels.clear();
    }

    /// Number of occupied channels
    pub fn len(&self) -> usize {
        self.inner.borrow().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert<E: BusEvent>(&self, handler: impl Fn(&E) + 'static, once: bool) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;

        let handler: Handler = Rc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                handler(event);
            }
        });

        let previous = inner
            .channels
            .insert(TypeId::of::<E>(), Entry { id, once, handler });
        if previous.is_some() {
            log::warn!(
                "event {} already has a handler, it will be replaced",
                std::any::type_name::<E>()
            );
        }
        id
    }
}

fn remove_entry(inner: &Weak<RefCell<BusInner>>, key: TypeId, id: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = inner.borrow_mut();
    if inner.channels.get(&key).is_some_and(|entry| entry.id == id) {
        inner.channels.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Ping(u32);
    impl BusEvent for Ping {}

    struct Pong;
    impl BusEvent for Pong {}

    #[test]
    fn test_emit_without_handler_is_not_delivered() {
        let bus = EventBus::new();
        assert!(!bus.emit(Ping(1)));
        assert!(bus.is_empty());
    }

    #[test]
    fn test_second_handler_replaces_first() {
        let bus = EventBus::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let f = first.clone();
        let unsubscribe_first = bus.on(move |p: &Ping| f.set(p.0));
        let s = second.clone();
        bus.on(move |p: &Ping| s.set(p.0));

        assert!(bus.emit(Ping(7)));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 7);

        // A stale unsubscribe must not remove the replacement.
        unsubscribe_first();
        assert!(bus.exists::<Ping>());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_once_and_off() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        bus.once(move |_: &Pong| h.set(h.get() + 1));
        assert!(bus.emit(Pong));
        assert!(!bus.emit(Pong));
        assert_eq!(hits.get(), 1);

        bus.on(|_: &Ping| {});
        bus.on(|_: &Pong| {});
        assert_eq!(bus.len(), 2);
        assert!(bus.off::<Ping>());
        assert!(!bus.off::<Ping>());
        bus.off_all();
        assert_eq!(bus.len(), 0);
    }

    #[test]
    fn test_handler_can_emit_reentrantly() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        let inner_bus = bus.clone();
        bus.on(move |_: &Ping| {
            inner_bus.emit(Pong);
        });
        let h = hits.clone();
        bus.on(move |_: &Pong| h.set(h.get() + 1));

        assert!(bus.emit(Ping(0)));
        assert_eq!(hits.get(), 1);
    }
}
