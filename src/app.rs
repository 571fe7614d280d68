use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use egui::{Event, PointerButton, Rect};

use crate::board::Board;
use crate::config::BoardConfig;
use crate::event::Unsubscribe;
use crate::panels::{Overlays, central_panel, context_menu, dialog, text_editor, tools_panel};
use crate::renderer::Renderer;
use crate::scene::Channel;
use crate::tools::{ToolKind, ToolOptions};

/// What survives a restart: tool options, never the drawing itself.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    pub tool_options: BTreeMap<ToolKind, ToolOptions>,
    pub active_tool: Option<ToolKind>,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    button: PointerButton,
}

pub struct PaintApp {
    board: Board,
    renderer: Renderer,
    overlays: Rc<RefCell<Overlays>>,
    subscriptions: Vec<Unsubscribe>,
    /// Screen rectangle of the canvas in the last frame
    canvas_rect: Rect,
    /// Button held down since a press on the canvas
    press: Option<Press>,
}

impl std::fmt::Debug for PaintApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintApp")
            .field("board", &self.board)
            .field("canvas_rect", &self.canvas_rect)
            .finish_non_exhaustive()
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: BoardConfig) -> Self {
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<Settings>(storage, eframe::APP_KEY))
            .unwrap_or_default();
        Self::with_settings(config, settings)
    }

    /// Builds the app from restored settings, without any eframe context
    pub fn with_settings(config: BoardConfig, settings: Settings) -> Self {
        let mut board = Board::new(config);
        board.restore_options(settings.tool_options);
        board
            .factory_mut()
            .active(settings.active_tool.unwrap_or(ToolKind::Rect));

        let overlays = Rc::new(RefCell::new(Overlays::default()));
        let subscriptions = Overlays::connect(&overlays, board.bus());

        Self {
            board,
            renderer: Renderer::new(),
            overlays,
            subscriptions,
            canvas_rect: Rect::NOTHING,
            press: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn overlays(&self) -> &Rc<RefCell<Overlays>> {
        &self.overlays
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    pub fn settings(&self) -> Settings {
        Settings {
            tool_options: self.board.tool_options(),
            active_tool: self.board.factory().current_kind(),
        }
    }

    pub fn select_tool(&mut self, kind: ToolKind) {
        self.overlays.borrow_mut().context_menu = None;
        self.board.factory_mut().active(kind);
    }

    /// Translates this frame's egui input into surface events.
    ///
    /// Args:
    ///     ctx (Context): The egui context holding the frame's input
    ///     canvas (Rect): Screen rectangle of the canvas
    ///     hovered (bool): Whether the canvas is the topmost widget under the pointer
    pub fn handle_input(&mut self, ctx: &egui::Context, canvas: Rect, hovered: bool) {
        let surface = self.board.surface().clone();
        if self.canvas_rect != canvas {
            surface.set_container_origin(canvas.min);
            surface.set_size(canvas.size());
            self.canvas_rect = canvas;
        }

        let keyboard_free = !ctx.wants_keyboard_input();
        let (events, hover_pos) = ctx.input(|i| (i.events.clone(), i.pointer.hover_pos()));

        for event in events {
            match event {
                Event::PointerMoved(pos) => {
                    if hovered || self.press.is_some() {
                        let button = self.press.map_or(PointerButton::Primary, |p| p.button);
                        surface.fire_pointer(Channel::PointerMove, pos, button);
                    }
                }
                Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    ..
                } => {
                    if !hovered || !canvas.contains(pos) {
                        continue;
                    }
                    self.overlays.borrow_mut().context_menu = None;
                    self.press = Some(Press { button });
                    surface.fire_pointer(Channel::PointerDown, pos, button);
                }
                Event::PointerButton {
                    pos,
                    button,
                    pressed: false,
                    ..
                } => {
                    // Releases only count for presses that started on the canvas.
                    if self.press.take().is_none() {
                        continue;
                    }
                    surface.fire_pointer(Channel::PointerUp, pos, button);
                    surface.fire_pointer(Channel::Click, pos, button);
                    if button == PointerButton::Secondary {
                        surface.fire_pointer(Channel::ContextMenu, pos, button);
                    }
                }
                Event::MouseWheel { delta, .. } => {
                    let Some(pos) = hover_pos.filter(|_| hovered) else {
                        continue;
                    };
                    if delta.y != 0.0 {
                        // egui reports scrolling up as positive
                        surface.fire_wheel(pos, -delta.y);
                    }
                }
                Event::Key {
                    key,
                    pressed,
                    modifiers,
                    ..
                } if keyboard_free => {
                    let channel = if pressed {
                        Channel::KeyDown
                    } else {
                        Channel::KeyUp
                    };
                    surface.fire_key(channel, key, modifiers);
                }
                _ => {}
            }
        }
    }
}

impl Drop for PaintApp {
    fn drop(&mut self) {
        for unsubscribe in self.subscriptions.drain(..) {
            unsubscribe();
        }
        self.board.destroy();
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        tools_panel(self, ctx);
        central_panel(self, ctx);
        text_editor(self, ctx);
        context_menu(self, ctx);
        dialog(self, ctx);
    }
}
