use std::cell::RefCell;
use std::rc::{Rc, Weak};

use egui::Key;

use crate::event::{CacheDirection, CacheItem, CleanCache, EventBus, Unsubscribe, UpdateCache};
use crate::scene::{Channel, Surface, SurfaceEvent};

const HISTORY_NAMESPACE: &str = "history";

/// Bounded undo/redo history of shapes entering and leaving the drawing
pub struct HistoryCache {
    /// Items that can be undone, oldest first
    undo_stack: Vec<CacheItem>,
    /// Items that can be redone, oldest first
    redo_stack: Vec<CacheItem>,
    limit: usize,
    surface: Weak<Surface>,
}

impl std::fmt::Debug for HistoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryCache")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl HistoryCache {
    /// Creates an empty history bounded to `limit` entries per stack
    pub fn new(surface: &Rc<Surface>, limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
            surface: Rc::downgrade(surface),
        }
    }

    /// Records a change; a fresh change invalidates everything that could be redone
    pub fn push(&mut self, item: CacheItem) {
        let redo = std::mem::take(&mut self.redo_stack);
        self.forget(redo);

        self.undo_stack.push(item);
        let overflow = trim(&mut self.undo_stack, self.limit);
        self.forget(overflow);
    }

    /// Reverts the latest change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        while let Some(item) = self.undo_stack.pop() {
            if let Some(inverse) = self.revert(item) {
                self.redo_stack.push(inverse);
                let overflow = trim(&mut self.redo_stack, self.limit);
                self.forget(overflow);
                return true;
            }
        }
        false
    }

    /// Re-applies the latest undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        while let Some(item) = self.redo_stack.pop() {
            if let Some(inverse) = self.revert(item) {
                self.undo_stack.push(inverse);
                let overflow = trim(&mut self.undo_stack, self.limit);
                self.forget(overflow);
                return true;
            }
        }
        false
    }

    /// Empties both stacks
    pub fn clear(&mut self) {
        let undo = std::mem::take(&mut self.undo_stack);
        let redo = std::mem::take(&mut self.redo_stack);
        self.forget(undo);
        self.forget(redo);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Undoes `item` on the scene and returns the change that undoes it again.
    ///
    /// Items whose node no longer exists are dropped.
    fn revert(&self, item: CacheItem) -> Option<CacheItem> {
        let surface = self.surface.upgrade()?;
        let mut scene = surface.scene_mut();
        if !scene.contains(item.node) {
            log::debug!("history entry for {} is stale", item.node);
            return None;
        }

        match item.direction {
            CacheDirection::In => {
                scene.remove(item.node);
                Some(CacheItem::removed(item.node))
            }
            CacheDirection::Out => scene
                .add_child(surface.root_id(), item.node)
                .then(|| CacheItem::added(item.node)),
        }
    }

    /// Destroys the nodes of dropped entries that are no longer in the drawing
    fn forget(&self, items: Vec<CacheItem>) {
        let Some(surface) = self.surface.upgrade() else {
            return;
        };
        let mut scene = surface.scene_mut();
        for item in items {
            if scene.contains(item.node) && scene.parent(item.node).is_none() {
                scene.destroy(item.node);
            }
        }
    }

    /// Wires a shared history to the bus and to Ctrl+Z / Ctrl+Y on `surface`.
    ///
    /// Draw-completion has to be forwarded by the caller, see
    /// [`crate::factory::ToolFactory::draw_listener`].
    pub fn connect(
        cache: &Rc<RefCell<Self>>,
        bus: &EventBus,
        surface: &Rc<Surface>,
    ) -> Vec<Unsubscribe> {
        let mut unsubscribe = Vec::new();

        let history = Rc::downgrade(cache);
        unsubscribe.push(bus.on(move |UpdateCache(item): &UpdateCache| {
            if let Some(history) = history.upgrade() {
                history.borrow_mut().push(*item);
            }
        }));

        let history = Rc::downgrade(cache);
        unsubscribe.push(bus.on(move |_: &CleanCache| {
            if let Some(history) = history.upgrade() {
                history.borrow_mut().clear();
            }
        }));

        let history = Rc::downgrade(cache);
        let listener = surface.on(Channel::KeyUp, Some(HISTORY_NAMESPACE), move |event| {
            let SurfaceEvent::Key(input) = event else {
                return;
            };
            if !(input.modifiers.ctrl || input.modifiers.command) {
                return;
            }
            let Some(history) = history.upgrade() else {
                return;
            };
            match input.key {
                Key::Z => {
                    history.borrow_mut().undo();
                }
                Key::Y => {
                    history.borrow_mut().redo();
                }
                _ => {}
            }
        });
        let weak = Rc::downgrade(surface);
        unsubscribe.push(Box::new(move || {
            if let Some(surface) = weak.upgrade() {
                surface.off_listener(listener);
            }
        }));

        unsubscribe
    }
}

/// Drops the oldest entries beyond `limit` and returns them
fn trim(stack: &mut Vec<CacheItem>, limit: usize) -> Vec<CacheItem> {
    let excess = stack.len().saturating_sub(limit);
    stack.drain(..excess).collect()
}
