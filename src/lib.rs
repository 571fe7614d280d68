#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod board;
pub mod command;
pub mod config;
pub mod contextmenu;
pub mod error;
pub mod event;
pub mod factory;
pub mod geometry;
pub mod panels;
pub mod renderer;
pub mod scene;
pub mod tools;

pub use app::{PaintApp, Settings};
pub use board::Board;
pub use command::{CommandService, HistoryCache};
pub use config::BoardConfig;
pub use contextmenu::{ContextmenuService, MenuDescriptor, MenuEntry};
pub use error::{ConfigError, ConfigResult};
pub use event::EventBus;
pub use factory::{ShapeItem, ToolFactory, Toolbar};
pub use renderer::Renderer;
pub use scene::{Channel, Node, NodeId, NodeKind, Scene, Surface, SurfaceEvent};
pub use tools::{DrawTool, ToolKind, ToolOptions};
