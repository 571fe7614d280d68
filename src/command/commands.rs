use std::rc::Rc;

use egui::Vec2;

use super::CommandService;
use crate::contextmenu::{ContextmenuService, MenuDescriptor, MenuEntry};
use crate::event::{CacheItem, CleanCache, Severity, ShowDialog, UpdateCache};
use crate::scene::{NodeId, Surface};
use crate::tools::ToolContext;

/// Commands available whichever tool is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonCommand {
    Delete,
    Divider,
    Clean,
    ResetZoom,
}

impl CommonCommand {
    /// Order of the entries in the context menu
    pub const MENU_ORDER: [CommonCommand; 4] = [
        CommonCommand::Delete,
        CommonCommand::Divider,
        CommonCommand::ResetZoom,
        CommonCommand::Clean,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Delete => "common:delete",
            Self::Divider => "common:divider",
            Self::Clean => "common:clean",
            Self::ResetZoom => "common:reset-zoom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Divider => "",
            Self::Clean => "Clear board",
            Self::ResetZoom => "Reset zoom",
        }
    }

    fn entry(&self) -> MenuEntry {
        match self {
            Self::Divider => MenuEntry::divider(self.key()),
            _ => MenuEntry::item(self.key(), self.label()),
        }
    }
}

/// The child of the drawing root that contains `node`.
///
/// `None` for the structural nodes and for anything outside the drawing.
pub fn drawing_child(surface: &Surface, node: NodeId) -> Option<NodeId> {
    let root = surface.root_id();
    let scene = surface.scene();
    let mut current = node;
    loop {
        let parent = scene.parent(current)?;
        if parent == root {
            return Some(current);
        }
        current = parent;
    }
}

fn is_zoomed(surface: &Surface) -> bool {
    surface.root_scale() != Vec2::splat(1.0)
}

pub fn register_common_menus(menus: &ContextmenuService) {
    for command in CommonCommand::MENU_ORDER {
        let descriptor = match command {
            CommonCommand::Delete | CommonCommand::Divider => {
                MenuDescriptor::new(command.entry(), |surface, node| {
                    drawing_child(surface, node).is_some()
                })
            }
            CommonCommand::ResetZoom => {
                MenuDescriptor::new(command.entry(), |surface, _| is_zoomed(surface))
            }
            CommonCommand::Clean => MenuDescriptor::new(command.entry(), |_, _| true),
        };
        menus.register_menu(descriptor);
    }
}

pub fn register_common_commands(ctx: &ToolContext, commands: &mut CommandService) {
    let c = ctx.clone();
    commands.register_command(CommonCommand::Delete.key(), move |node| {
        let Some(surface) = c.surface() else {
            return;
        };
        let Some(target) = drawing_child(&surface, node) else {
            log::warn!("refusing to delete {node}, it is not part of the drawing");
            return;
        };
        surface.scene_mut().remove(target);
        c.bus().emit(UpdateCache(CacheItem::removed(target)));
    });

    let c = ctx.clone();
    commands.register_command(CommonCommand::Clean.key(), move |_| {
        let Some(surface) = c.surface() else {
            return;
        };
        let weak = Rc::downgrade(&surface);
        let bus = c.bus().clone();
        let delivered = c.bus().emit(ShowDialog {
            severity: Severity::Warning,
            title: "Clear the board".into(),
            body: "Every shape on the board will be removed. This cannot be undone.".into(),
            on_confirm: Rc::new(move || {
                let Some(surface) = weak.upgrade() else {
                    return;
                };
                let root = surface.root_id();
                surface.scene_mut().destroy_children(root);
                bus.emit(CleanCache);
                log::info!("board cleared");
            }),
        });
        if !delivered {
            log::warn!("no dialog to confirm clearing the board");
        }
    });

    let c = ctx.clone();
    commands.register_command(CommonCommand::ResetZoom.key(), move |_| {
        if let Some(surface) = c.surface() {
            surface.set_root_scale(Vec2::splat(1.0));
        }
    });
}
