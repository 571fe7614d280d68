use serde::{Deserialize, Serialize};

use crate::command::CommandService;
use crate::contextmenu::ContextmenuService;

mod base;
mod options;

pub use base::{DrawHandler, DrawListeners, DrawTool, ToolContext};
pub use options::{BrushType, ColorKey, NodeConfigPatch, OptionsPatch, ToolOptions};

// Tool implementations
mod brush;
mod circle;
mod ellipse;
mod line;
mod move_tool;
mod rect;
mod text;

pub use brush::BrushTool;
pub use circle::CircleTool;
pub use ellipse::EllipseTool;
pub use line::LineTool;
pub use move_tool::{MoveCommand, MoveTool};
pub use rect::RectTool;
pub use text::{TEXT_BORDER_NAME, TEXT_CONTENT_NAME, TEXT_GROUP_NAME, TextTool};

/// Identity tag of every tool on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToolKind {
    Rect,
    Circle,
    Ellipse,
    Line,
    Brush,
    Text,
    Move,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Rect,
        ToolKind::Circle,
        ToolKind::Ellipse,
        ToolKind::Line,
        ToolKind::Brush,
        ToolKind::Text,
        ToolKind::Move,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Line => "line",
            Self::Brush => "brush",
            Self::Text => "text",
            Self::Move => "move",
        }
    }

    /// Listener namespace of the tool's gesture bindings
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Rect => "drawRect",
            Self::Circle => "drawCircle",
            Self::Ellipse => "drawEllipse",
            Self::Line => "drawLine",
            Self::Brush => "drawBrush",
            Self::Text => "drawText",
            Self::Move => "moveShape",
        }
    }

    /// True for tools that produce shapes
    pub fn is_shape(&self) -> bool {
        !matches!(self, Self::Move)
    }
}

/// A gesture recognizer plugged into a [`DrawTool`].
///
/// `mount` binds surface listeners through the context, `unmount` drops them.
/// Tools contributing commands or menus override the matching hooks.
pub trait Gesture {
    fn kind(&self) -> ToolKind;

    /// Options a fresh tool starts with
    fn default_options(&self) -> ToolOptions;

    /// Binds the gesture listeners; called on every activation
    fn mount(&mut self, ctx: &ToolContext);

    /// Unbinds the gesture listeners; called on every deactivation
    fn unmount(&mut self, ctx: &ToolContext) {
        ctx.unbind_gestures();
    }

    fn register_commands(&self, _ctx: &ToolContext, _commands: &mut CommandService) {}

    fn register_menus(&self, _ctx: &ToolContext, _menus: &ContextmenuService) {}

    /// Releases anything the gesture installed outside of its mount cycle
    fn destroy(&mut self, _ctx: &ToolContext) {}
}

/// Enum representing all available tools
/// This allows us to avoid using Box<dyn Gesture> and keeps dispatch closed
#[derive(Debug, Clone)]
pub enum ToolType {
    Rect(RectTool),
    Circle(CircleTool),
    Ellipse(EllipseTool),
    Line(LineTool),
    Brush(BrushTool),
    Text(TextTool),
    Move(MoveTool),
}

impl Gesture for ToolType {
    fn kind(&self) -> ToolKind {
        match self {
            Self::Rect(tool) => tool.kind(),
            Self::Circle(tool) => tool.kind(),
            Self::Ellipse(tool) => tool.kind(),
            Self::Line(tool) => tool.kind(),
            Self::Brush(tool) => tool.kind(),
            Self::Text(tool) => tool.kind(),
            Self::Move(tool) => tool.kind(),
        }
    }

    fn default_options(&self) -> ToolOptions {
        match self {
            Self::Rect(tool) => tool.default_options(),
            Self::Circle(tool) => tool.default_options(),
            Self::Ellipse(tool) => tool.default_options(),
            Self::Line(tool) => tool.default_options(),
            Self::Brush(tool) => tool.default_options(),
            Self::Text(tool) => tool.default_options(),
            Self::Move(tool) => tool.default_options(),
        }
    }

    fn mount(&mut self, ctx: &ToolContext) {
        match self {
            Self::Rect(tool) => tool.mount(ctx),
            Self::Circle(tool) => tool.mount(ctx),
            Self::Ellipse(tool) => tool.mount(ctx),
            Self::Line(tool) => tool.mount(ctx),
            Self::Brush(tool) => tool.mount(ctx),
            Self::Text(tool) => tool.mount(ctx),
            Self::Move(tool) => tool.mount(ctx),
        }
    }

    fn unmount(&mut self, ctx: &ToolContext) {
        match self {
            Self::Rect(tool) => tool.unmount(ctx),
            Self::Circle(tool) => tool.unmount(ctx),
            Self::Ellipse(tool) => tool.unmount(ctx),
            Self::Line(tool) => tool.unmount(ctx),
            Self::Brush(tool) => tool.unmount(ctx),
            Self::Text(tool) => tool.unmount(ctx),
            Self::Move(tool) => tool.unmount(ctx),
        }
    }

    fn register_commands(&self, ctx: &ToolContext, commands: &mut CommandService) {
        if let Self::Move(tool) = self {
            tool.register_commands(ctx, commands);
        }
    }

    fn register_menus(&self, ctx: &ToolContext, menus: &ContextmenuService) {
        if let Self::Move(tool) = self {
            tool.register_menus(ctx, menus);
        }
    }

    fn destroy(&mut self, ctx: &ToolContext) {
        if let Self::Text(tool) = self {
            tool.destroy(ctx);
        }
    }
}

/// Creates a fresh tool of the given kind
pub fn new_tool(kind: ToolKind) -> ToolType {
    match kind {
        ToolKind::Rect => ToolType::Rect(RectTool),
        ToolKind::Circle => ToolType::Circle(CircleTool),
        ToolKind::Ellipse => ToolType::Ellipse(EllipseTool),
        ToolKind::Line => ToolType::Line(LineTool),
        ToolKind::Brush => ToolType::Brush(BrushTool),
        ToolKind::Text => ToolType::Text(TextTool::default()),
        ToolKind::Move => ToolType::Move(MoveTool::default()),
    }
}
