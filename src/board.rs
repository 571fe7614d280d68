//! One drawing session: the bus, the surface, the tools and the history.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::command::HistoryCache;
use crate::config::BoardConfig;
use crate::event::{CacheItem, EventBus, Unsubscribe};
use crate::factory::ToolFactory;
use crate::scene::Surface;
use crate::tools::{OptionsPatch, ToolKind, ToolOptions};

pub struct Board {
    factory: ToolFactory,
    surface: Rc<Surface>,
    history: Rc<RefCell<HistoryCache>>,
    subscriptions: Vec<Unsubscribe>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("factory", &self.factory)
            .field("history", &self.history.borrow())
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Creates a board with a fresh bus and every tool attached to a new surface
    pub fn new(config: BoardConfig) -> Self {
        Self::with_bus(EventBus::new(), config)
    }

    pub fn with_bus(bus: EventBus, config: BoardConfig) -> Self {
        let surface = Surface::new(config.canvas_size);
        let history = Rc::new(RefCell::new(HistoryCache::new(
            &surface,
            config.history_limit,
        )));
        let subscriptions = HistoryCache::connect(&history, &bus, &surface);

        let mut factory = ToolFactory::new(bus, config);
        factory.set_root(surface.clone());

        let recorded = Rc::downgrade(&history);
        factory.draw_listener(move |node| {
            if let Some(history) = recorded.upgrade() {
                history.borrow_mut().push(CacheItem::added(node));
            }
        });

        log::debug!("board created with {} tools", factory.kinds().len());
        Self {
            factory,
            surface,
            history,
            subscriptions,
        }
    }

    pub fn factory(&self) -> &ToolFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut ToolFactory {
        &mut self.factory
    }

    pub fn surface(&self) -> &Rc<Surface> {
        &self.surface
    }

    pub fn bus(&self) -> &EventBus {
        self.factory.bus()
    }

    pub fn history(&self) -> &Rc<RefCell<HistoryCache>> {
        &self.history
    }

    pub fn undo(&self) -> bool {
        self.history.borrow_mut().undo()
    }

    pub fn redo(&self) -> bool {
        self.history.borrow_mut().redo()
    }

    /// Current options of every tool, keyed by kind
    pub fn tool_options(&self) -> BTreeMap<ToolKind, ToolOptions> {
        self.factory
            .items()
            .map(|item| (item.tool.kind(), item.tool.options()))
            .collect()
    }

    /// Merges previously saved options back into the tools
    pub fn restore_options(&mut self, saved: BTreeMap<ToolKind, ToolOptions>) {
        for (kind, options) in saved {
            match self.factory.tool_mut(kind) {
                Some(tool) => {
                    tool.set_options(OptionsPatch::from(options));
                }
                None => log::warn!("dropping saved options of unknown tool {}", kind.name()),
            }
        }
    }

    /// Tears down the tools, the surface listeners and the history subscriptions
    pub fn destroy(&mut self) {
        self.factory.destroy();
        for unsubscribe in self.subscriptions.drain(..) {
            unsubscribe();
        }
        self.history.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Key, Modifiers, Pos2};

    use crate::scene::Channel;

    #[test]
    fn test_completed_shape_is_undoable() {
        let mut board = Board::new(BoardConfig::default());
        board.factory_mut().active(ToolKind::Rect);
        let surface = board.surface().clone();
        surface.fire_pointer(Channel::Click, Pos2::new(10.0, 10.0), egui::PointerButton::Primary);
        surface.fire_pointer(Channel::PointerMove, Pos2::new(50.0, 50.0), egui::PointerButton::Primary);
        surface.fire_pointer(Channel::Click, Pos2::new(50.0, 50.0), egui::PointerButton::Primary);

        assert_eq!(board.history().borrow().undo_len(), 1);
        let root = surface.root_id();
        assert_eq!(surface.scene().children(root).len(), 1);

        surface.fire_key(Channel::KeyUp, Key::Z, Modifiers::CTRL);
        assert!(surface.scene().children(root).is_empty());
        assert!(board.redo());
        assert_eq!(surface.scene().children(root).len(), 1);
    }

    #[test]
    fn test_restore_options() {
        let mut board = Board::new(BoardConfig::default());
        let mut saved = board.tool_options();
        if let Some(options) = saved.get_mut(&ToolKind::Line) {
            options.node_config.stroke_width = 9.0;
        }
        board.restore_options(saved);

        let line = board.factory().tool(ToolKind::Line).unwrap();
        assert_eq!(line.options().node_config.stroke_width, 9.0);
    }
}
