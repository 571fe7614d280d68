//! Context menu registry shared by every tool of a board.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::event::{ContextmenuEvent, EventBus};
use crate::scene::{Channel, ListenerId, NodeId, Surface, SurfaceEvent};

/// Decides whether a menu entry is offered for a node
pub type MenuPredicate = Rc<dyn Fn(&Surface, NodeId) -> bool>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuKind {
    Item { label: String },
    Divider,
}

/// A menu entry as handed to the presentation, without its predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Command key invoked when the entry is picked
    pub key: String,
    pub kind: MenuKind,
}

impl MenuEntry {
    pub fn item(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: MenuKind::Item {
                label: label.into(),
            },
        }
    }

    pub fn divider(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: MenuKind::Divider,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            MenuKind::Item { label } => Some(label),
            MenuKind::Divider => None,
        }
    }
}

#[derive(Clone)]
pub struct MenuDescriptor {
    pub entry: MenuEntry,
    pub visible: MenuPredicate,
}

impl MenuDescriptor {
    pub fn new(entry: MenuEntry, visible: impl Fn(&Surface, NodeId) -> bool + 'static) -> Self {
        Self {
            entry,
            visible: Rc::new(visible),
        }
    }
}

impl std::fmt::Debug for MenuDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuDescriptor")
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct MenuState {
    menus: Vec<MenuDescriptor>,
    surface: Weak<Surface>,
    subscription: Option<ListenerId>,
}

/// Collects menu entries and publishes the visible ones on right click.
///
/// Cloning yields another handle onto the same registry. Only one context
/// menu subscription is alive at a time.
#[derive(Clone)]
pub struct ContextmenuService {
    state: Rc<RefCell<MenuState>>,
    enabled: Rc<Cell<bool>>,
    bus: EventBus,
}

impl std::fmt::Debug for ContextmenuService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextmenuService")
            .field("menus", &self.keys())
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

impl ContextmenuService {
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: Rc::new(RefCell::new(MenuState::default())),
            enabled: Rc::new(Cell::new(true)),
            bus,
        }
    }

    /// Subscribes to the surface's context menu trigger, replacing any previous subscription
    pub fn activate_menus(&self, surface: &Rc<Surface>) {
        self.release_subscription();

        let state = Rc::downgrade(&self.state);
        let enabled = self.enabled.clone();
        let bus = self.bus.clone();
        let weak_surface = Rc::downgrade(surface);

        let id = surface.on(Channel::ContextMenu, None, move |event| {
            let SurfaceEvent::Pointer(input) = event else {
                return;
            };
            if !enabled.get() {
                return;
            }
            let (Some(state), Some(surface)) = (state.upgrade(), weak_surface.upgrade()) else {
                return;
            };

            // Predicates may read the scene, so evaluate them on a snapshot.
            let menus = state.borrow().menus.clone();
            let entries: Vec<MenuEntry> = menus
                .into_iter()
                .filter(|menu| (menu.visible)(&surface, input.target))
                .map(|menu| menu.entry)
                .collect();

            if !entries.is_empty() {
                bus.emit(ContextmenuEvent {
                    position: input.page,
                    target: input.target,
                    entries,
                });
            }
        });

        let mut state = self.state.borrow_mut();
        state.surface = Rc::downgrade(surface);
        state.subscription = Some(id);
    }

    /// Adds a menu unless its key is already registered
    pub fn register_menu(&self, menu: MenuDescriptor) -> &Self {
        let mut state = self.state.borrow_mut();
        if state.menus.iter().any(|m| m.entry.key == menu.entry.key) {
            log::debug!("menu {} already registered", menu.entry.key);
            return self;
        }
        state.menus.push(menu);
        self
    }

    pub fn unregister_menu(&self, key: &str) -> &Self {
        self.state
            .borrow_mut()
            .menus
            .retain(|menu| menu.entry.key != key);
        self
    }

    /// Suspends or resumes publication without touching registrations
    pub fn toggle(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn clean_menu(&self) -> &Self {
        self.state.borrow_mut().menus.clear();
        self
    }

    /// Registered keys in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.state
            .borrow()
            .menus
            .iter()
            .map(|menu| menu.entry.key.clone())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state
            .borrow()
            .menus
            .iter()
            .any(|menu| menu.entry.key == key)
    }

    /// Visible entries for `target`, as a right click on it would publish them
    pub fn visible_entries(&self, surface: &Surface, target: NodeId) -> Vec<MenuEntry> {
        let menus = self.state.borrow().menus.clone();
        menus
            .into_iter()
            .filter(|menu| (menu.visible)(surface, target))
            .map(|menu| menu.entry)
            .collect()
    }

    fn release_subscription(&self) {
        let mut state = self.state.borrow_mut();
        if let (Some(id), Some(surface)) = (state.subscription.take(), state.surface.upgrade()) {
            surface.off_listener(id);
        }
    }
}
