#![allow(dead_code)]

use std::rc::Rc;

use egui::{Key, Modifiers, PointerButton, Pos2, Vec2};
use paint_board::scene::{Channel, NodeId, Surface};
use paint_board::{Board, BoardConfig, ToolKind};

pub fn board() -> Board {
    Board::new(BoardConfig::default())
}

/// A board with `kind` already active
pub fn board_with(kind: ToolKind) -> Board {
    let mut board = board();
    board.factory_mut().active(kind);
    board
}

pub fn surface(board: &Board) -> Rc<Surface> {
    board.surface().clone()
}

pub fn click(surface: &Surface, x: f32, y: f32) {
    surface.fire_pointer(Channel::Click, Pos2::new(x, y), PointerButton::Primary);
}

pub fn right_click(surface: &Surface, x: f32, y: f32) {
    surface.fire_pointer(Channel::Click, Pos2::new(x, y), PointerButton::Secondary);
}

pub fn move_to(surface: &Surface, x: f32, y: f32) {
    surface.fire_pointer(Channel::PointerMove, Pos2::new(x, y), PointerButton::Primary);
}

pub fn down(surface: &Surface, x: f32, y: f32) {
    surface.fire_pointer(Channel::PointerDown, Pos2::new(x, y), PointerButton::Primary);
}

pub fn middle_down(surface: &Surface, x: f32, y: f32) {
    surface.fire_pointer(Channel::PointerDown, Pos2::new(x, y), PointerButton::Middle);
}

pub fn up(surface: &Surface, x: f32, y: f32) {
    surface.fire_pointer(Channel::PointerUp, Pos2::new(x, y), PointerButton::Primary);
}

pub fn key_down(surface: &Surface, key: Key) {
    surface.fire_key(Channel::KeyDown, key, Modifiers::NONE);
}

pub fn ctrl_key_up(surface: &Surface, key: Key) {
    surface.fire_key(Channel::KeyUp, key, Modifiers::CTRL);
}

pub fn wheel_up(surface: &Surface) {
    surface.fire_wheel(Pos2::new(10.0, 10.0), -100.0);
}

pub fn wheel_down(surface: &Surface) {
    surface.fire_wheel(Pos2::new(10.0, 10.0), 100.0);
}

/// Drawing-root children of the given kind, e.g. "Rect"
pub fn shapes(surface: &Surface, kind_name: &str) -> Vec<NodeId> {
    let scene = surface.scene();
    scene
        .children(surface.root_id())
        .iter()
        .copied()
        .filter(|id| {
            scene
                .get(*id)
                .is_some_and(|node| node.kind.kind_name() == kind_name)
        })
        .collect()
}

/// Number of nodes directly under the drawing root
pub fn drawing_len(surface: &Surface) -> usize {
    surface.scene().children(surface.root_id()).len()
}

pub fn assert_vec_eq(actual: Vec2, expected: Vec2) {
    assert!(
        (actual - expected).length() < 1e-3,
        "expected {expected:?}, got {actual:?}"
    );
}

pub fn assert_pos_eq(actual: Pos2, expected: Pos2) {
    assert_vec_eq(actual.to_vec2(), expected.to_vec2());
}
