use std::cell::RefCell;
use std::rc::Rc;

use crate::event::{
    ContextmenuEvent, EventBus, HideTextEditor, ShowDialog, ShowTextEditor, Unsubscribe,
};

mod central_panel;
mod context_menu;
mod dialog;
mod text_editor;
mod tools_panel;

pub use central_panel::central_panel;
pub use context_menu::context_menu;
pub use dialog::dialog;
pub use text_editor::text_editor;
pub use tools_panel::tools_panel;

/// The text input overlay while it is open
#[derive(Debug, Clone)]
pub struct TextEditorState {
    pub request: ShowTextEditor,
    pub value: String,
    /// Focus is grabbed on the first frame only
    pub focused: bool,
}

/// Floating UI opened by bus events and drawn over the canvas
#[derive(Debug, Default)]
pub struct Overlays {
    pub text_editor: Option<TextEditorState>,
    pub context_menu: Option<ContextmenuEvent>,
    pub dialog: Option<ShowDialog>,
}

impl Overlays {
    /// Subscribes the overlays to the bus events that open and close them
    pub fn connect(overlays: &Rc<RefCell<Self>>, bus: &EventBus) -> Vec<Unsubscribe> {
        let mut unsubscribe = Vec::new();

        let o = Rc::downgrade(overlays);
        unsubscribe.push(bus.on(move |request: &ShowTextEditor| {
            if let Some(overlays) = o.upgrade() {
                overlays.borrow_mut().text_editor = Some(TextEditorState {
                    request: request.clone(),
                    value: String::new(),
                    focused: false,
                });
            }
        }));

        let o = Rc::downgrade(overlays);
        unsubscribe.push(bus.on(move |_: &HideTextEditor| {
            if let Some(overlays) = o.upgrade() {
                overlays.borrow_mut().text_editor = None;
            }
        }));

        let o = Rc::downgrade(overlays);
        unsubscribe.push(bus.on(move |menu: &ContextmenuEvent| {
            if let Some(overlays) = o.upgrade() {
                overlays.borrow_mut().context_menu = Some(menu.clone());
            }
        }));

        let o = Rc::downgrade(overlays);
        unsubscribe.push(bus.on(move |request: &ShowDialog| {
            if let Some(overlays) = o.upgrade() {
                overlays.borrow_mut().dialog = Some(request.clone());
            }
        }));

        unsubscribe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TextStyle;
    use crate::scene::NodeId;
    use egui::{Color32, Pos2, Vec2};

    #[test]
    fn test_editor_opens_and_closes() {
        let bus = EventBus::new();
        let overlays = Rc::new(RefCell::new(Overlays::default()));
        let _subscriptions = Overlays::connect(&overlays, &bus);

        assert!(bus.emit(ShowTextEditor {
            node_id: NodeId::new(),
            position: Pos2::ZERO,
            size: Vec2::splat(10.0),
            style: TextStyle {
                font_family: "monospace".into(),
                font_size: 12.0,
                font_style: "normal".into(),
                padding: 0.0,
                fill: Color32::BLACK,
            },
        }));
        assert!(overlays.borrow().text_editor.is_some());

        assert!(bus.emit(HideTextEditor));
        assert!(overlays.borrow().text_editor.is_none());
    }

    #[test]
    fn test_unsubscribe_releases_channels() {
        let bus = EventBus::new();
        let overlays = Rc::new(RefCell::new(Overlays::default()));
        for unsubscribe in Overlays::connect(&overlays, &bus) {
            unsubscribe();
        }
        assert!(bus.is_empty());
    }
}
