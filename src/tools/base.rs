use std::cell::{Cell, Ref, RefCell};
use std::rc::{Rc, Weak};

use egui::Pos2;

use super::options::{OptionsPatch, ToolOptions};
use super::{Gesture, ToolKind, ToolType};
use crate::command::{CommandService, register_common_commands, register_common_menus};
use crate::config::BoardConfig;
use crate::contextmenu::ContextmenuService;
use crate::event::{EventBus, Unsubscribe};
use crate::scene::{
    Channel, KeyInput, ListenerId, NodeConfig, NodeId, PointerInput, Surface, SurfaceEvent,
};

pub type DrawHandler = Rc<dyn Fn(NodeId)>;

#[derive(Default)]
struct DrawListenerList {
    next_id: u64,
    handlers: Vec<(u64, DrawHandler)>,
}

/// Draw-completion subscribers of a tool
#[derive(Clone, Default)]
pub struct DrawListeners {
    inner: Rc<RefCell<DrawListenerList>>,
}

impl DrawListeners {
    pub fn add(&self, handler: impl Fn(NodeId) + 'static) -> Unsubscribe {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.handlers.push((id, Rc::new(handler)));
            id
        };

        let inner = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.borrow_mut().handlers.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Invokes every subscriber once, in subscription order
    pub fn notify(&self, node: NodeId) {
        let handlers: Vec<DrawHandler> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(node);
        }
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Disposer = Box<dyn FnOnce()>;

/// Everything a gesture needs to talk to the board.
///
/// Cheap to clone; gesture closures keep their own copy. The surface is held
/// weakly so listeners never keep it alive.
#[derive(Clone)]
pub struct ToolContext {
    kind: ToolKind,
    surface: Weak<Surface>,
    options: Rc<RefCell<ToolOptions>>,
    listeners: DrawListeners,
    disposers: Rc<RefCell<Vec<Disposer>>>,
    active: Rc<Cell<bool>>,
    bus: EventBus,
    config: Rc<BoardConfig>,
}

impl ToolContext {
    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn surface(&self) -> Option<Rc<Surface>> {
        self.surface.upgrade()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn options(&self) -> Ref<'_, ToolOptions> {
        self.options.borrow()
    }

    /// Snapshot of the node config new shapes are created with
    pub fn node_config(&self) -> NodeConfig {
        self.options.borrow().node_config.clone()
    }

    /// Subscribes a gesture listener under this tool's namespace
    pub fn on(
        &self,
        channel: Channel,
        handler: impl Fn(&SurfaceEvent) + 'static,
    ) -> Option<ListenerId> {
        let surface = self.surface()?;
        Some(surface.on(channel, Some(self.kind.namespace()), handler))
    }

    /// Drops every listener registered through [`ToolContext::on`]
    pub fn unbind_gestures(&self) {
        if let Some(surface) = self.surface() {
            surface.off_namespace(self.kind.namespace());
        }
    }

    /// Runs `disposer` on the next deactivation
    pub fn on_dispose(&self, disposer: impl FnOnce() + 'static) {
        self.disposers.borrow_mut().push(Box::new(disposer));
    }

    /// Destroys the nodes of a gesture still in `pending` on the next
    /// deactivation, without announcing them
    pub fn discard_on_dispose<T: 'static>(
        &self,
        pending: Rc<Cell<Option<T>>>,
        nodes: impl FnOnce(T) -> Vec<NodeId> + 'static,
    ) {
        let surface = self.surface.clone();
        let kind = self.kind;
        self.on_dispose(move || {
            let (Some(unfinished), Some(surface)) = (pending.take(), surface.upgrade()) else {
                return;
            };
            log::debug!("{} discarded an unfinished shape", kind.name());
            let mut scene = surface.scene_mut();
            for node in nodes(unfinished) {
                scene.destroy(node);
            }
        });
    }

    /// Announces a finished shape to every draw listener
    pub fn notify(&self, node: NodeId) {
        log::debug!("{} finished node {node}", self.kind.name());
        self.listeners.notify(node);
    }

    /// Pointer position in drawing-root coordinates
    pub fn relative_position(&self, page: Pos2, compensate_for_pan: bool) -> Pos2 {
        match self.surface() {
            Some(surface) => surface.relative_position(page, compensate_for_pan),
            None => crate::geometry::relative_position(page, Pos2::ZERO, None, false),
        }
    }
}

/// Pointer payload of a primary-button event
pub(crate) fn primary(event: &SurfaceEvent) -> Option<&PointerInput> {
    match event {
        SurfaceEvent::Pointer(input) if input.button == egui::PointerButton::Primary => Some(input),
        _ => None,
    }
}

pub(crate) fn pointer(event: &SurfaceEvent) -> Option<&PointerInput> {
    match event {
        SurfaceEvent::Pointer(input) => Some(input),
        _ => None,
    }
}

pub(crate) fn key(event: &SurfaceEvent) -> Option<&KeyInput> {
    match event {
        SurfaceEvent::Key(input) => Some(input),
        _ => None,
    }
}

pub(crate) fn is_key(event: &SurfaceEvent, expected: egui::Key) -> bool {
    key(event).is_some_and(|input| input.key == expected)
}

/// Lifecycle shared by every tool: options, activation, draw-completion
/// notification and command/menu registration around a [`Gesture`].
pub struct DrawTool {
    gesture: ToolType,
    ctx: ToolContext,
    commands: CommandService,
    menus: ContextmenuService,
}

impl std::fmt::Debug for DrawTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawTool")
            .field("kind", &self.ctx.kind)
            .field("active", &self.is_active())
            .field("options", &*self.ctx.options())
            .finish_non_exhaustive()
    }
}

impl DrawTool {
    pub fn new(
        gesture: ToolType,
        bus: EventBus,
        menus: ContextmenuService,
        config: Rc<BoardConfig>,
    ) -> Self {
        let ctx = ToolContext {
            kind: gesture.kind(),
            surface: Weak::new(),
            options: Rc::new(RefCell::new(gesture.default_options())),
            listeners: DrawListeners::default(),
            disposers: Rc::default(),
            active: Rc::new(Cell::new(false)),
            bus,
            config,
        };

        Self {
            gesture,
            ctx,
            commands: CommandService::new(),
            menus,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.ctx.kind
    }

    pub fn gesture(&self) -> &ToolType {
        &self.gesture
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    pub fn commands(&self) -> &CommandService {
        &self.commands
    }

    pub fn is_active(&self) -> bool {
        self.ctx.is_active()
    }

    /// Attaches the tool to a drawing surface and registers its commands and menus
    pub fn set_group(&mut self, surface: &Rc<Surface>) -> &mut Self {
        self.ctx.surface = Rc::downgrade(surface);
        self.commands.activate_commands(surface);
        self.menus.activate_menus(surface);

        self.gesture.register_menus(&self.ctx, &self.menus);
        self.gesture.register_commands(&self.ctx, &mut self.commands);

        register_common_menus(&self.menus);
        register_common_commands(&self.ctx, &mut self.commands);
        self
    }

    pub fn activate(&mut self) -> &mut Self {
        if self.ctx.is_active() {
            log::debug!("{} is already active", self.kind().name());
            return self;
        }
        self.ctx.active.set(true);

        if let Some(surface) = self.ctx.surface() {
            let options = Rc::downgrade(&self.ctx.options);
            let listener = surface.on(Channel::ChangeColor, None, move |event| {
                if let (SurfaceEvent::Color(color), Some(options)) = (event, options.upgrade()) {
                    options.borrow_mut().apply_color(*color);
                }
            });

            let weak = Rc::downgrade(&surface);
            self.ctx.on_dispose(move || {
                if let Some(surface) = weak.upgrade() {
                    surface.off_listener(listener);
                }
            });
        }

        self.gesture.mount(&self.ctx);
        log::debug!("{} activated", self.kind().name());
        self
    }

    pub fn deactivate(&mut self) -> &mut Self {
        if !self.ctx.is_active() {
            return self;
        }
        self.ctx.active.set(false);
        self.gesture.unmount(&self.ctx);

        let disposers = std::mem::take(&mut *self.ctx.disposers.borrow_mut());
        for dispose in disposers {
            dispose();
        }
        log::debug!("{} deactivated", self.kind().name());
        self
    }

    /// Tears the tool down for good
    pub fn destroy(&mut self) {
        self.deactivate();
        self.ctx.listeners.clear();
        self.commands.clean_commands();
        self.menus.clean_menu();
        self.gesture.destroy(&self.ctx);
    }

    /// Copy of the current options
    pub fn options(&self) -> ToolOptions {
        self.ctx.options().clone()
    }

    /// Deep-merges `patch` into the current options
    pub fn set_options(&mut self, patch: OptionsPatch) -> &mut Self {
        self.ctx.options.borrow_mut().merge(patch);
        self
    }

    pub fn draw_listener(&self, handler: impl Fn(NodeId) + 'static) -> Unsubscribe {
        self.ctx.listeners.add(handler)
    }

    pub fn draw_listener_count(&self) -> usize {
        self.ctx.listeners.len()
    }

    /// Teardown callbacks queued for the next deactivation
    pub fn pending_disposers(&self) -> usize {
        self.ctx.disposers.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{RectTool, new_tool};
    use egui::{Color32, Vec2};

    fn tool(kind: ToolKind) -> (DrawTool, Rc<Surface>) {
        let bus = EventBus::new();
        let mut tool = DrawTool::new(
            new_tool(kind),
            bus.clone(),
            ContextmenuService::new(bus),
            Rc::new(BoardConfig::default()),
        );
        let surface = Surface::new(Vec2::splat(500.0));
        tool.set_group(&surface);
        (tool, surface)
    }

    #[test]
    fn test_options_snapshot_is_detached() {
        let (tool, _surface) = tool(ToolKind::Rect);
        let mut snapshot = tool.options();
        snapshot.node_config.stroke = Some(Color32::RED);
        assert_eq!(tool.options().node_config.stroke, Some(Color32::BLACK));
    }

    #[test]
    fn test_recolor_only_while_active() {
        let (mut tool, surface) = tool(ToolKind::Rect);

        surface.fire(&Channel::ChangeColor, SurfaceEvent::Color(Color32::RED));
        assert_eq!(tool.options().node_config.stroke, Some(Color32::BLACK));

        tool.activate();
        surface.fire(&Channel::ChangeColor, SurfaceEvent::Color(Color32::RED));
        assert_eq!(tool.options().node_config.stroke, Some(Color32::RED));

        tool.deactivate();
        assert_eq!(surface.listener_count(&Channel::ChangeColor), 0);
    }

    #[test]
    fn test_teardowns_do_not_accumulate() {
        let (mut tool, _surface) = tool(ToolKind::Rect);
        tool.activate();
        let queued = tool.pending_disposers();
        assert!(queued > 0);
        tool.deactivate();

        for _ in 0..3 {
            tool.activate();
            assert_eq!(tool.pending_disposers(), queued);
            tool.deactivate();
            assert_eq!(tool.pending_disposers(), 0);
        }
    }

    #[test]
    fn test_unfinished_nodes_are_destroyed_on_deactivate() {
        let (mut tool, surface) = tool(ToolKind::Rect);
        tool.activate();
        let pending: Rc<Cell<Option<NodeId>>> = Rc::default();
        tool.context().discard_on_dispose(pending.clone(), |node| vec![node]);

        let node = surface
            .add_to_root(crate::scene::Node::new(crate::scene::NodeKind::Group))
            .unwrap();
        pending.set(Some(node));

        let notified = Rc::new(Cell::new(false));
        let n = notified.clone();
        let _unsubscribe = tool.draw_listener(move |_| n.set(true));

        tool.deactivate();
        assert!(!surface.scene().contains(node));
        assert!(pending.get().is_none());
        assert!(!notified.get());
    }

    #[test]
    fn test_unsubscribed_listener_is_not_notified() {
        let (tool, _surface) = tool(ToolKind::Rect);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let unsubscribe = tool.draw_listener(move |_| h.set(h.get() + 1));

        tool.context().notify(NodeId::new());
        unsubscribe();
        tool.context().notify(NodeId::new());
        assert_eq!(hits.get(), 1);
        assert!(matches!(tool.gesture(), ToolType::Rect(RectTool)));
    }
}
