mod commands;
mod history;

use std::rc::{Rc, Weak};

use crate::scene::{Channel, ListenerId, NodeId, Surface, SurfaceEvent};

pub use commands::{CommonCommand, register_common_commands, register_common_menus};
pub use history::HistoryCache;

/// Handler invoked with the node a command applies to
pub type CommandHandler = Rc<dyn Fn(NodeId)>;

/// Whether the service has a surface to bind commands on yet
enum Attachment {
    /// Registrations wait here until a surface shows up
    Unattached {
        pending: Vec<(String, CommandHandler)>,
    },
    Attached(Weak<Surface>),
}

struct BoundCommand {
    key: String,
    listener: ListenerId,
}

/// Maps command keys to handlers bound on a surface's command channels.
///
/// Registrations made before [`CommandService::activate_commands`] are queued
/// and bound on attachment. Registering a key twice keeps the first handler.
pub struct CommandService {
    attachment: Attachment,
    commands: Vec<BoundCommand>,
}

impl Default for CommandService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandService")
            .field("attached", &self.is_attached())
            .field("commands", &self.keys())
            .finish()
    }
}

impl CommandService {
    pub fn new() -> Self {
        Self {
            attachment: Attachment::Unattached {
                pending: Vec::new(),
            },
            commands: Vec::new(),
        }
    }

    /// Attaches the service to `surface` and binds every queued registration
    pub fn activate_commands(&mut self, surface: &Rc<Surface>) -> &mut Self {
        let previous = std::mem::replace(
            &mut self.attachment,
            Attachment::Attached(Rc::downgrade(surface)),
        );
        if let Attachment::Unattached { pending } = previous {
            for (key, handler) in pending {
                self.bind(surface, key, handler);
            }
        }
        self
    }

    /// Registers `handler` under `key`, binding it now or once a surface is attached
    pub fn register_command(&mut self, key: &str, handler: impl Fn(NodeId) + 'static) -> &mut Self {
        if self.contains(key) {
            log::debug!("command {key} already registered");
            return self;
        }

        let handler: CommandHandler = Rc::new(handler);
        if let Attachment::Unattached { pending } = &mut self.attachment {
            pending.push((key.to_owned(), handler));
            return self;
        }

        match self.surface() {
            Some(surface) => self.bind(&surface, key.to_owned(), handler),
            None => log::warn!("surface is gone, command {key} not bound"),
        }
        self
    }

    pub fn unregister_command(&mut self, key: &str) -> &mut Self {
        if let Attachment::Unattached { pending } = &mut self.attachment {
            pending.retain(|(pending_key, _)| pending_key != key);
        }

        let surface = self.surface();
        self.commands.retain(|command| {
            if command.key != key {
                return true;
            }
            if let Some(surface) = &surface {
                surface.off_listener(command.listener);
            }
            false
        });
        self
    }

    /// Unbinds every command this service registered and forgets them
    pub fn clean_commands(&mut self) -> &mut Self {
        let surface = self.surface();
        for command in self.commands.drain(..) {
            if let Some(surface) = &surface {
                surface.off_listener(command.listener);
            }
        }
        if let Attachment::Unattached { pending } = &mut self.attachment {
            pending.clear();
        }
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        let pending = match &self.attachment {
            Attachment::Unattached { pending } => pending.iter().any(|(k, _)| k == key),
            Attachment::Attached(_) => false,
        };
        pending || self.commands.iter().any(|command| command.key == key)
    }

    /// Bound and pending keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.commands.iter().map(|c| c.key.clone()).collect();
        if let Attachment::Unattached { pending } = &self.attachment {
            keys.extend(pending.iter().map(|(key, _)| key.clone()));
        }
        keys
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.attachment, Attachment::Attached(_))
    }

    /// Number of registrations still waiting for a surface
    pub fn pending_len(&self) -> usize {
        match &self.attachment {
            Attachment::Unattached { pending } => pending.len(),
            Attachment::Attached(_) => 0,
        }
    }

    fn surface(&self) -> Option<Rc<Surface>> {
        match &self.attachment {
            Attachment::Attached(surface) => surface.upgrade(),
            Attachment::Unattached { .. } => None,
        }
    }

    fn bind(&mut self, surface: &Surface, key: String, handler: CommandHandler) {
        let channel = Channel::Command(key.clone());
        // A command channel carries exactly one handler.
        surface.off(&channel);
        let listener = surface.on(channel, None, move |event| {
            if let SurfaceEvent::Command(node) = event {
                handler(*node);
            }
        });
        self.commands.push(BoundCommand { key, listener });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(NodeId) + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move |_| h.set(h.get() + 1))
    }

    #[test]
    fn test_registration_is_deferred_until_attached() {
        let surface = Surface::new(Vec2::splat(100.0));
        let mut commands = CommandService::new();
        let (hits, handler) = counter();

        commands.register_command("demo", handler);
        assert_eq!(commands.pending_len(), 1);
        assert!(!surface.fire(&Channel::command("demo"), SurfaceEvent::Command(NodeId::new())));

        commands.activate_commands(&surface);
        assert_eq!(commands.pending_len(), 0);
        assert!(surface.fire(&Channel::command("demo"), SurfaceEvent::Command(NodeId::new())));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_second_registration_is_skipped() {
        let surface = Surface::new(Vec2::splat(100.0));
        let mut commands = CommandService::new();
        commands.activate_commands(&surface);

        let (first, handler) = counter();
        commands.register_command("demo", handler);
        let (second, handler) = counter();
        commands.register_command("demo", handler);

        surface.fire(&Channel::command("demo"), SurfaceEvent::Command(NodeId::new()));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
        assert_eq!(surface.listener_count(&Channel::command("demo")), 1);
    }

    #[test]
    fn test_clean_and_unregister_unbind() {
        let surface = Surface::new(Vec2::splat(100.0));
        let mut commands = CommandService::new();
        commands.activate_commands(&surface);
        commands.register_command("a", |_| {});
        commands.register_command("b", |_| {});

        commands.unregister_command("a");
        assert_eq!(surface.listener_count(&Channel::command("a")), 0);
        assert_eq!(surface.listener_count(&Channel::command("b")), 1);

        commands.clean_commands();
        assert!(commands.keys().is_empty());
        assert_eq!(surface.total_listeners(), 0);
    }
}
