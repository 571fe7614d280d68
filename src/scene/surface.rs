use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use egui::{Color32, CursorIcon, Key, Modifiers, PointerButton, Pos2, Vec2};

use super::{Node, NodeId, NodeKind, Scene};
use crate::geometry::{Viewport, relative_position};

/// Name of the layer hosting the drawing root
pub const LAYER_ID: &str = "main-layer";
/// Name of the drawing root group
pub const ROOT_GROUP_ID: &str = "main-group";

/// Event channels a surface dispatches on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    PointerDown,
    PointerMove,
    PointerUp,
    Click,
    KeyDown,
    KeyUp,
    Wheel,
    ContextMenu,
    /// Broadcast of a newly picked color
    ChangeColor,
    /// A named command, see [`crate::command`]
    Command(String),
}

impl Channel {
    pub fn command(key: impl Into<String>) -> Self {
        Self::Command(key.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Pointer position in page space
    pub page: Pos2,
    pub button: PointerButton,
    /// Node under the pointer; the stage when nothing else was hit
    pub target: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub page: Pos2,
    pub delta_y: f32,
}

/// Payload delivered to surface listeners
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Pointer(PointerInput),
    Key(KeyInput),
    Wheel(WheelInput),
    Color(Color32),
    /// Argument of a command, usually the node it applies to
    Command(NodeId),
}

pub type SurfaceHandler = Rc<dyn Fn(&SurfaceEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    namespace: Option<String>,
    handler: SurfaceHandler,
}

/// The stage: owns the scene, its structural nodes and the listener registry.
///
/// Listeners are stored per channel and may carry a namespace so a tool can
/// drop all of its bindings at once.
pub struct Surface {
    scene: RefCell<Scene>,
    listeners: RefCell<HashMap<Channel, Vec<Listener>>>,
    next_listener: Cell<u64>,
    size: Cell<Vec2>,
    container_origin: Cell<Pos2>,
    cursor: Cell<CursorIcon>,
    stage: NodeId,
    layer: NodeId,
    root: NodeId,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("size", &self.size.get())
            .field("nodes", &self.scene.borrow().len())
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

impl Surface {
    /// Creates a stage of the given size with a layer and an empty drawing root
    pub fn new(size: Vec2) -> Rc<Self> {
        let mut scene = Scene::new();
        let stage = scene.insert(Node::new(NodeKind::Stage));
        let layer = scene.insert_child(stage, Node::new(NodeKind::Layer).with_name(LAYER_ID));
        let root = scene.insert_child(layer, Node::new(NodeKind::Group).with_name(ROOT_GROUP_ID));

        Rc::new(Self {
            scene: RefCell::new(scene),
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
            size: Cell::new(size),
            container_origin: Cell::new(Pos2::ZERO),
            cursor: Cell::new(CursorIcon::Default),
            stage,
            layer,
            root,
        })
    }

    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }

    pub fn scene_mut(&self) -> RefMut<'_, Scene> {
        self.scene.borrow_mut()
    }

    pub fn stage_id(&self) -> NodeId {
        self.stage
    }

    pub fn layer_id(&self) -> NodeId {
        self.layer
    }

    /// The drawing root group
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// True for the stage, its layer and the drawing root, which are never edit targets
    pub fn is_structural(&self, id: NodeId) -> bool {
        id == self.stage || id == self.layer || id == self.root
    }

    /// Whether the drawing root still exists
    pub fn has_root(&self) -> bool {
        self.scene.borrow().contains(self.root)
    }

    pub fn size(&self) -> Vec2 {
        self.size.get()
    }

    pub fn set_size(&self, size: Vec2) {
        self.size.set(size);
    }

    /// Page-space position of the canvas' top-left corner
    pub fn container_origin(&self) -> Pos2 {
        self.container_origin.get()
    }

    pub fn set_container_origin(&self, origin: Pos2) {
        self.container_origin.set(origin);
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor.get()
    }

    pub fn set_cursor(&self, cursor: CursorIcon) {
        self.cursor.set(cursor);
    }

    pub fn root_position(&self) -> Pos2 {
        self.scene
            .borrow()
            .get(self.root)
            .map_or(Pos2::ZERO, |node| node.position)
    }

    pub fn set_root_position(&self, position: Pos2) {
        if let Some(node) = self.scene.borrow_mut().get_mut(self.root) {
            node.position = position;
        }
    }

    pub fn root_scale(&self) -> Vec2 {
        self.scene
            .borrow()
            .get(self.root)
            .map_or(Vec2::splat(1.0), |node| node.scale)
    }

    pub fn set_root_scale(&self, scale: Vec2) {
        if let Some(node) = self.scene.borrow_mut().get_mut(self.root) {
            node.scale = scale;
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            size: self.size(),
            scale: self.root_scale(),
            pan: self.root_position().to_vec2(),
        }
    }

    /// Pointer position in drawing-root coordinates
    pub fn relative_position(&self, page: Pos2, compensate_for_pan: bool) -> Pos2 {
        relative_position(
            page,
            self.container_origin(),
            Some(&self.viewport()),
            compensate_for_pan,
        )
    }

    /// Inserts `node` under the drawing root; `None` once the root is gone
    pub fn add_to_root(&self, node: Node) -> Option<NodeId> {
        let mut scene = self.scene.borrow_mut();
        if !scene.contains(self.root) {
            return None;
        }
        Some(scene.insert_child(self.root, node))
    }

    /// Topmost shape under a page-space position, or the stage if nothing was hit
    pub fn target_at(&self, page: Pos2) -> NodeId {
        let point = crate::geometry::stage_position(page, self.container_origin());
        self.scene
            .borrow()
            .hit_test(self.stage, point)
            .unwrap_or(self.stage)
    }

    /// Subscribes `handler` to `channel`
    pub fn on(
        &self,
        channel: Channel,
        namespace: Option<&str>,
        handler: impl Fn(&SurfaceEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener.get() + 1);
        self.next_listener.set(id.0);

        self.listeners
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(Listener {
                id,
                namespace: namespace.map(str::to_owned),
                handler: Rc::new(handler),
            });
        id
    }

    /// Removes every listener of `channel`
    pub fn off(&self, channel: &Channel) {
        self.listeners.borrow_mut().remove(channel);
    }

    /// Removes the listeners of `channel` registered under `namespace`
    pub fn off_namespaced(&self, channel: &Channel, namespace: &str) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(list) = listeners.get_mut(channel) {
            list.retain(|l| l.namespace.as_deref() != Some(namespace));
            if list.is_empty() {
                listeners.remove(channel);
            }
        }
    }

    /// Removes the listeners registered under `namespace` on every channel
    pub fn off_namespace(&self, namespace: &str) {
        self.listeners.borrow_mut().retain(|_, list| {
            list.retain(|l| l.namespace.as_deref() != Some(namespace));
            !list.is_empty()
        });
    }

    /// Removes a single listener, returning whether it was still registered
    pub fn off_listener(&self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.borrow_mut().retain(|_, list| {
            let before = list.len();
            list.retain(|l| l.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Removes every listener on every channel
    pub fn off_all(&self) {
        self.listeners.borrow_mut().clear();
    }

    pub fn listener_count(&self, channel: &Channel) -> usize {
        self.listeners.borrow().get(channel).map_or(0, Vec::len)
    }

    /// Number of listeners registered under `namespace` across all channels
    pub fn namespace_count(&self, namespace: &str) -> usize {
        self.listeners
            .borrow()
            .values()
            .flatten()
            .filter(|l| l.namespace.as_deref() == Some(namespace))
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().values().map(Vec::len).sum()
    }

    /// Delivers `event` to every listener of `channel` in registration order.
    ///
    /// Handlers run after the registry is released, so they may subscribe or
    /// unsubscribe freely. Returns whether anybody was listening.
    pub fn fire(&self, channel: &Channel, event: SurfaceEvent) -> bool {
        let handlers: Vec<SurfaceHandler> = match self.listeners.borrow().get(channel) {
            Some(list) => list.iter().map(|l| l.handler.clone()).collect(),
            None => return false,
        };

        for handler in &handlers {
            handler(&event);
        }
        !handlers.is_empty()
    }

    /// Fires a pointer event at `page`, resolving the target by hit testing
    pub fn fire_pointer(&self, channel: Channel, page: Pos2, button: PointerButton) -> bool {
        let target = self.target_at(page);
        self.fire(
            &channel,
            SurfaceEvent::Pointer(PointerInput {
                page,
                button,
                target,
            }),
        )
    }

    pub fn fire_key(&self, channel: Channel, key: Key, modifiers: Modifiers) -> bool {
        self.fire(&channel, SurfaceEvent::Key(KeyInput { key, modifiers }))
    }

    pub fn fire_wheel(&self, page: Pos2, delta_y: f32) -> bool {
        self.fire(
            &Channel::Wheel,
            SurfaceEvent::Wheel(WheelInput { page, delta_y }),
        )
    }
}
