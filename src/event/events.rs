use std::rc::Rc;

use egui::{Color32, Pos2, Vec2};

use super::BusEvent;
use crate::contextmenu::MenuEntry;
use crate::scene::NodeId;

/// Visible context menu entries for a right click on `target`
#[derive(Debug, Clone, PartialEq)]
pub struct ContextmenuEvent {
    /// Page-space position of the trigger
    pub position: Pos2,
    pub target: NodeId,
    pub entries: Vec<MenuEntry>,
}

/// Font hints forwarded to the text input overlay
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub font_style: String,
    pub padding: f32,
    pub fill: Color32,
}

/// Opens the text input overlay over a freshly sized text box
#[derive(Debug, Clone, PartialEq)]
pub struct ShowTextEditor {
    pub node_id: NodeId,
    /// Top-left corner in drawing-root coordinates
    pub position: Pos2,
    pub size: Vec2,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HideTextEditor;

/// Sent by the overlay when the user confirms the text
#[derive(Debug, Clone, PartialEq)]
pub struct SaveText {
    pub node_id: NodeId,
    pub value: String,
}

/// Sent by the overlay when the user abandons editing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CancelText {
    pub node_id: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

/// Asks the user to confirm a destructive action.
///
/// Nothing happens unless the dialog calls `on_confirm`.
#[derive(Clone)]
pub struct ShowDialog {
    pub severity: Severity,
    pub title: String,
    pub body: String,
    pub on_confirm: Rc<dyn Fn()>,
}

impl std::fmt::Debug for ShowDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShowDialog")
            .field("severity", &self.severity)
            .field("title", &self.title)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDirection {
    /// The node entered the drawing
    In,
    /// The node left the drawing
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheItem {
    pub direction: CacheDirection,
    pub node: NodeId,
}

impl CacheItem {
    pub fn added(node: NodeId) -> Self {
        Self {
            direction: CacheDirection::In,
            node,
        }
    }

    pub fn removed(node: NodeId) -> Self {
        Self {
            direction: CacheDirection::Out,
            node,
        }
    }
}

/// Records an add or remove in the undo history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateCache(pub CacheItem);

/// Drops the whole undo history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanCache;

impl BusEvent for ContextmenuEvent {}
impl BusEvent for ShowTextEditor {}
impl BusEvent for HideTextEditor {}
impl BusEvent for SaveText {}
impl BusEvent for CancelText {}
impl BusEvent for ShowDialog {}
impl BusEvent for UpdateCache {}
impl BusEvent for CleanCache {}
