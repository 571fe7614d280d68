use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Visual configuration shared by every drawable node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub stroke: Option<Color32>,
    pub fill: Option<Color32>,
    pub stroke_width: f32,
    /// Width used for hit testing thin strokes, falls back to `stroke_width`
    pub hit_stroke_width: Option<f32>,
    /// Dash pattern as `[dash, gap]` pairs; empty for a solid stroke
    pub dash: Vec<f32>,
    pub font_family: Option<String>,
    pub font_style: Option<String>,
    pub font_size: Option<f32>,
    pub padding: Option<f32>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            stroke: None,
            fill: None,
            stroke_width: 1.0,
            hit_stroke_width: None,
            dash: Vec::new(),
            font_family: None,
            font_style: None,
            font_size: None,
            padding: None,
        }
    }
}

/// Geometry of a node. Positions stored in the kind are local to the node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Stage,
    Layer,
    Group,
    /// Size may be negative when drawn towards the top-left
    Rect { size: Vec2 },
    Circle { radius: f32 },
    /// `rotation` is in degrees
    Ellipse { radius: Vec2, rotation: f32 },
    Line {
        points: Vec<Pos2>,
        cap: LineCap,
        join: LineJoin,
        tension: f32,
    },
    Text { text: String, size: Vec2 },
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Stage => "Stage",
            Self::Layer => "Layer",
            Self::Group => "Group",
            Self::Rect { .. } => "Rect",
            Self::Circle { .. } => "Circle",
            Self::Ellipse { .. } => "Ellipse",
            Self::Line { .. } => "Line",
            Self::Text { .. } => "Text",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Stage | Self::Layer | Self::Group)
    }

    pub fn line(points: Vec<Pos2>) -> Self {
        Self::Line {
            points,
            cap: LineCap::default(),
            join: LineJoin::default(),
            tension: 0.0,
        }
    }
}

/// A single element of the scene graph
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub position: Pos2,
    pub scale: Vec2,
    pub config: NodeConfig,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: None,
            kind,
            position: Pos2::ZERO,
            scale: Vec2::splat(1.0),
            config: NodeConfig::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_position(mut self, position: Pos2) -> Self {
        self.position = position;
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Line points, if this node is a line
    pub fn points(&self) -> Option<&[Pos2]> {
        match &self.kind {
            NodeKind::Line { points, .. } => Some(points),
            _ => None,
        }
    }

    /// Box size for rects and text, if any
    pub fn size(&self) -> Option<Vec2> {
        match &self.kind {
            NodeKind::Rect { size } | NodeKind::Text { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn set_size(&mut self, new_size: Vec2) {
        if let NodeKind::Rect { size } | NodeKind::Text { size, .. } = &mut self.kind {
            *size = new_size;
        }
    }

    pub fn radius(&self) -> Option<f32> {
        match &self.kind {
            NodeKind::Circle { radius } => Some(*radius),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}
