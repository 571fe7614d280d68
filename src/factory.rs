//! Registry of every tool on the board and the one currently in use.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use egui::{Color32, Key, Vec2};

use crate::config::BoardConfig;
use crate::contextmenu::ContextmenuService;
use crate::event::{EventBus, Unsubscribe};
use crate::scene::{Channel, NodeId, Surface, SurfaceEvent};
use crate::tools::{DrawTool, ToolKind, new_tool};

const FACTORY_NAMESPACE: &str = "factory";

/// Options panel shown for a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolbar {
    /// Color and stroke width
    Base,
    /// Color, font size and padding
    Text,
    /// Color, brush width and brush type
    Brush,
}

/// A registered tool with its toolbar presentation
#[derive(Debug)]
pub struct ShapeItem {
    pub tool: DrawTool,
    pub icon: &'static str,
    pub tip: &'static str,
    pub toolbar: Option<Toolbar>,
}

type ChangeHandler = Rc<dyn Fn(Option<ToolKind>)>;

#[derive(Default)]
struct ChangeListeners {
    next_id: u64,
    handlers: Vec<(u64, ChangeHandler)>,
}

/// Rounds to two decimals so repeated zoom steps land on exact values
fn round_scale(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Owns the tools, the drawing surface and the active tool.
pub struct ToolFactory {
    shape_tools: BTreeMap<ToolKind, ShapeItem>,
    utility_tools: BTreeMap<ToolKind, ShapeItem>,
    root: Option<Rc<Surface>>,
    active: Option<ToolKind>,
    change_listeners: Rc<RefCell<ChangeListeners>>,
    disposers: Vec<Unsubscribe>,
    bus: EventBus,
    menus: ContextmenuService,
    config: Rc<BoardConfig>,
}

impl std::fmt::Debug for ToolFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolFactory")
            .field("active", &self.active)
            .field("tools", &self.kinds())
            .field("has_root", &self.root.is_some())
            .finish()
    }
}

impl ToolFactory {
    /// Creates a factory with every built-in tool registered
    pub fn new(bus: EventBus, config: BoardConfig) -> Self {
        let menus = ContextmenuService::new(bus.clone());
        let mut factory = Self {
            shape_tools: BTreeMap::new(),
            utility_tools: BTreeMap::new(),
            root: None,
            active: None,
            change_listeners: Rc::default(),
            disposers: Vec::new(),
            bus,
            menus,
            config: Rc::new(config),
        };

        factory.register_tool(ToolKind::Move, "✋", "Move");
        factory.register_shape(ToolKind::Rect, "▭", "Rectangle", Toolbar::Base);
        factory.register_shape(ToolKind::Circle, "◯", "Circle", Toolbar::Base);
        factory.register_shape(ToolKind::Line, "╱", "Line", Toolbar::Base);
        factory.register_shape(ToolKind::Ellipse, "⬭", "Ellipse", Toolbar::Base);
        factory.register_shape(ToolKind::Text, "T", "Text", Toolbar::Text);
        factory.register_shape(ToolKind::Brush, "✏", "Brush", Toolbar::Brush);
        factory
    }

    fn build(&self, kind: ToolKind) -> DrawTool {
        DrawTool::new(
            new_tool(kind),
            self.bus.clone(),
            self.menus.clone(),
            self.config.clone(),
        )
    }

    pub fn register_shape(
        &mut self,
        kind: ToolKind,
        icon: &'static str,
        tip: &'static str,
        toolbar: Toolbar,
    ) {
        let tool = self.build(kind);
        self.shape_tools.insert(
            kind,
            ShapeItem {
                tool,
                icon,
                tip,
                toolbar: Some(toolbar),
            },
        );
    }

    pub fn register_tool(&mut self, kind: ToolKind, icon: &'static str, tip: &'static str) {
        let tool = self.build(kind);
        self.utility_tools.insert(
            kind,
            ShapeItem {
                tool,
                icon,
                tip,
                toolbar: None,
            },
        );
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn menus(&self) -> &ContextmenuService {
        &self.menus
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn root(&self) -> Option<&Rc<Surface>> {
        self.root.as_ref()
    }

    /// Utility tools first, then the shapes
    pub fn items(&self) -> impl Iterator<Item = &ShapeItem> {
        self.utility_tools.values().chain(self.shape_tools.values())
    }

    fn items_mut(&mut self) -> impl Iterator<Item = &mut ShapeItem> {
        self.utility_tools
            .values_mut()
            .chain(self.shape_tools.values_mut())
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        self.items().map(|item| item.tool.kind()).collect()
    }

    pub fn item(&self, kind: ToolKind) -> Option<&ShapeItem> {
        self.shape_tools
            .get(&kind)
            .or_else(|| self.utility_tools.get(&kind))
    }

    pub fn tool(&self, kind: ToolKind) -> Option<&DrawTool> {
        self.item(kind).map(|item| &item.tool)
    }

    pub fn tool_mut(&mut self, kind: ToolKind) -> Option<&mut DrawTool> {
        match self.shape_tools.get_mut(&kind) {
            Some(item) => Some(&mut item.tool),
            None => self.utility_tools.get_mut(&kind).map(|item| &mut item.tool),
        }
    }

    /// Attaches every tool to `root` and installs zoom handling.
    ///
    /// Call once per surface; destroy the factory to change surfaces.
    pub fn set_root(&mut self, root: Rc<Surface>) -> &mut Self {
        for item in self.items_mut() {
            item.tool.set_group(&root);
        }
        self.install_zoom(&root);
        self.root = Some(root);
        self
    }

    fn install_zoom(&mut self, root: &Rc<Surface>) {
        let weak = Rc::downgrade(root);
        let (step, min) = (self.config.zoom_step, self.config.min_scale);
        root.on(Channel::Wheel, Some(FACTORY_NAMESPACE), move |event| {
            let (SurfaceEvent::Wheel(wheel), Some(surface)) = (event, weak.upgrade()) else {
                return;
            };
            // Scrolling up zooms in.
            let offset = if wheel.delta_y < 0.0 { -step } else { step };
            let scale = surface.root_scale();
            surface.set_root_scale(Vec2::new(
                round_scale((scale.x - offset).max(min)),
                round_scale((scale.y - offset).max(min)),
            ));
        });

        let weak = Rc::downgrade(root);
        let listener = root.on(Channel::KeyUp, Some(FACTORY_NAMESPACE), move |event| {
            let (SurfaceEvent::Key(input), Some(surface)) = (event, weak.upgrade()) else {
                return;
            };
            if input.key == Key::Num0 && (input.modifiers.ctrl || input.modifiers.command) {
                surface.set_root_scale(Vec2::splat(1.0));
            }
        });

        let weak = Rc::downgrade(root);
        self.disposers.push(Box::new(move || {
            if let Some(surface) = weak.upgrade() {
                surface.off_listener(listener);
            }
        }));
    }

    /// Subscribes `handler` to the draw-completion stream of every tool
    pub fn draw_listener(&mut self, handler: impl Fn(NodeId) + 'static) {
        let handler = Rc::new(handler);
        let mut unsubscribe = Vec::new();
        for item in self.items() {
            let handler = handler.clone();
            unsubscribe.push(item.tool.draw_listener(move |node| handler(node)));
        }
        self.disposers.extend(unsubscribe);
    }

    pub fn current_kind(&self) -> Option<ToolKind> {
        self.active
    }

    pub fn current_tool(&self) -> Option<&DrawTool> {
        self.active.and_then(|kind| self.tool(kind))
    }

    pub fn current_tool_mut(&mut self) -> Option<&mut DrawTool> {
        let kind = self.active?;
        self.tool_mut(kind)
    }

    /// Subscribes to tool switches
    pub fn on_change_shape(&self, handler: impl Fn(Option<ToolKind>) + 'static) -> Unsubscribe {
        let id = {
            let mut listeners = self.change_listeners.borrow_mut();
            listeners.next_id += 1;
            let id = listeners.next_id;
            listeners.handlers.push((id, Rc::new(handler)));
            id
        };

        let listeners = Rc::downgrade(&self.change_listeners);
        Box::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .borrow_mut()
                    .handlers
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    fn notify_change(&self) {
        let handlers: Vec<ChangeHandler> = self
            .change_listeners
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(self.active);
        }
    }

    /// Makes `kind` the only active tool
    pub fn active(&mut self, kind: ToolKind) -> &mut Self {
        if self.active == Some(kind) {
            return self;
        }
        if self.tool(kind).is_none() {
            log::warn!("no tool registered for {}", kind.name());
            return self;
        }

        if let Some(current) = self.current_tool_mut() {
            current.deactivate();
        }
        self.active = Some(kind);
        if let Some(next) = self.current_tool_mut() {
            next.activate();
        }
        log::info!("switched to {} tool", kind.name());
        self.notify_change();
        self
    }

    /// Deactivates the current tool, leaving none active
    pub fn release(&mut self) -> &mut Self {
        if let Some(current) = self.current_tool_mut() {
            current.deactivate();
        }
        if self.active.take().is_some() {
            self.notify_change();
        }
        self
    }

    /// Fires the command `key` on the surface with `node` as its argument
    pub fn emit(&self, key: &str, node: NodeId) -> bool {
        match &self.root {
            Some(root) => root.fire(&Channel::command(key), SurfaceEvent::Command(node)),
            None => false,
        }
    }

    /// Broadcasts a picked color to the active tool
    pub fn change_color(&self, color: Color32) -> bool {
        match &self.root {
            Some(root) => root.fire(&Channel::ChangeColor, SurfaceEvent::Color(color)),
            None => false,
        }
    }

    /// Tears the board down. The factory needs a new root before further use.
    pub fn destroy(&mut self) {
        if let Some(current) = self.current_tool_mut() {
            current.deactivate();
        }
        self.active = None;

        for dispose in self.disposers.drain(..) {
            dispose();
        }
        self.change_listeners.borrow_mut().handlers.clear();
        for item in self.items_mut() {
            item.tool.destroy();
        }

        if let Some(root) = self.root.take() {
            root.off_all();
            let root_id = root.root_id();
            root.scene_mut().destroy(root_id);
        }
        log::debug!("tool factory destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_round_scale() {
        assert_eq!(round_scale(1.0 + 0.05 * 5.0), 1.25);
        assert_eq!(round_scale(1.0 - 0.05 * 3.0), 0.85);
    }

    #[test]
    fn test_every_kind_is_registered() {
        let factory = ToolFactory::new(EventBus::new(), BoardConfig::default());
        for kind in ToolKind::ALL {
            assert!(factory.tool(kind).is_some(), "{kind:?} missing");
        }
        assert!(factory.item(ToolKind::Move).unwrap().toolbar.is_none());
        assert_eq!(
            factory.item(ToolKind::Brush).unwrap().toolbar,
            Some(Toolbar::Brush)
        );
    }

    #[test]
    fn test_change_listener_sees_new_kind() {
        let mut factory = ToolFactory::new(EventBus::new(), BoardConfig::default());
        factory.set_root(Surface::new(Vec2::splat(100.0)));

        let seen = Rc::new(Cell::new(None));
        let s = seen.clone();
        let unsubscribe = factory.on_change_shape(move |kind| s.set(kind));

        factory.active(ToolKind::Line);
        assert_eq!(seen.get(), Some(ToolKind::Line));

        unsubscribe();
        factory.active(ToolKind::Rect);
        assert_eq!(seen.get(), Some(ToolKind::Line));
    }
}
