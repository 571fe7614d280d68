use std::cell::Cell;
use std::rc::Rc;

use egui::{CursorIcon, Pos2};

use super::base::{pointer, primary};
use super::{Gesture, ToolContext, ToolKind, ToolOptions};
use crate::command::CommandService;
use crate::contextmenu::{ContextmenuService, MenuDescriptor, MenuEntry};
use crate::scene::Channel;

/// Commands contributed by the move tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCommand {
    ResetPosition,
}

impl MoveCommand {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ResetPosition => "move-common:reset-position",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start: Pos2,
    start_root: Pos2,
}

/// Pans the drawing root by dragging anywhere on the surface
#[derive(Debug, Clone, Default)]
pub struct MoveTool {
    /// Root position when the tool was first mounted
    initial: Rc<Cell<Option<Pos2>>>,
}

impl MoveTool {
    pub fn initial_position(&self) -> Option<Pos2> {
        self.initial.get()
    }
}

impl Gesture for MoveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Move
    }

    fn default_options(&self) -> ToolOptions {
        ToolOptions::default()
    }

    fn mount(&mut self, ctx: &ToolContext) {
        let Some(surface) = ctx.surface() else {
            return;
        };
        let drag: Rc<Cell<Option<Drag>>> = Rc::default();

        // Positions ignore the pan so the root's own translation is not fed back.
        let (c, state) = (ctx.clone(), drag.clone());
        ctx.on(Channel::PointerDown, move |event| {
            let (Some(input), Some(surface)) = (primary(event), c.surface()) else {
                return;
            };
            state.set(Some(Drag {
                start: surface.relative_position(input.page, false),
                start_root: surface.root_position(),
            }));
        });

        let (c, state) = (ctx.clone(), drag.clone());
        ctx.on(Channel::PointerMove, move |event| {
            let (Some(drag), Some(input)) = (state.get(), pointer(event)) else {
                return;
            };
            let Some(surface) = c.surface() else {
                return;
            };
            let offset = surface.relative_position(input.page, false) - drag.start;
            surface.set_root_position(drag.start_root + offset);
        });

        let state = drag;
        ctx.on(Channel::PointerUp, move |event| {
            if primary(event).is_some() {
                state.set(None);
            }
        });

        if self.initial.get().is_none() {
            self.initial.set(Some(surface.root_position()));
        }

        let previous = surface.cursor();
        surface.set_cursor(CursorIcon::Grab);
        let weak = Rc::downgrade(&surface);
        ctx.on_dispose(move || {
            if let Some(surface) = weak.upgrade() {
                surface.set_cursor(previous);
            }
        });
    }

    fn register_menus(&self, ctx: &ToolContext, menus: &ContextmenuService) {
        let (c, initial) = (ctx.clone(), self.initial.clone());
        menus.register_menu(MenuDescriptor::new(
            MenuEntry::item(MoveCommand::ResetPosition.key(), "Reset position"),
            move |surface, _| c.is_active() && Some(surface.root_position()) != initial.get(),
        ));
    }

    fn register_commands(&self, ctx: &ToolContext, commands: &mut CommandService) {
        let (c, initial) = (ctx.clone(), self.initial.clone());
        commands.register_command(MoveCommand::ResetPosition.key(), move |_| {
            if let (Some(initial), Some(surface)) = (initial.get(), c.surface()) {
                surface.set_root_position(initial);
            }
        });
    }
}
