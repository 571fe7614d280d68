mod common;

use common::*;
use egui::{Color32, Key, Pos2, Vec2};
use paint_board::ToolKind;
use paint_board::command::CommonCommand;
use paint_board::event::ShowDialog;
use paint_board::scene::NodeKind;

#[test]
fn test_rect_draw() {
    let board = board_with(ToolKind::Rect);
    let surface = surface(&board);

    click(&surface, 400.0, 400.0);
    move_to(&surface, 1400.0, 1400.0);
    click(&surface, 1400.0, 1400.0);

    let rects = shapes(&surface, "Rect");
    assert_eq!(rects.len(), 1);
    let scene = surface.scene();
    let rect = scene.get(rects[0]).unwrap();
    assert_eq!(rect.position, Pos2::new(400.0, 400.0));
    assert_eq!(rect.size(), Some(Vec2::new(1000.0, 1000.0)));
}

#[test]
fn test_rect_towards_top_left_has_negative_size() {
    let board = board_with(ToolKind::Rect);
    let surface = surface(&board);

    click(&surface, 300.0, 500.0);
    move_to(&surface, 100.0, 200.0);
    click(&surface, 100.0, 200.0);

    let rects = shapes(&surface, "Rect");
    let scene = surface.scene();
    let rect = scene.get(rects[0]).unwrap();
    assert_eq!(rect.position, Pos2::new(300.0, 500.0));
    assert_eq!(rect.size(), Some(Vec2::new(-200.0, -300.0)));
}

#[test]
fn test_escape_cancels_circle() {
    let board = board_with(ToolKind::Circle);
    let surface = surface(&board);

    click(&surface, 400.0, 400.0);
    let circles = shapes(&surface, "Circle");
    assert_eq!(circles.len(), 2, "shape and anchor marker");
    {
        let scene = surface.scene();
        for id in circles {
            assert_eq!(scene.get(id).unwrap().position, Pos2::new(400.0, 400.0));
        }
    }

    key_down(&surface, Key::Escape);
    assert!(shapes(&surface, "Circle").is_empty());
    assert_eq!(board.history().borrow().undo_len(), 0);
}

#[test]
fn test_circle_geometry() {
    let board = board_with(ToolKind::Circle);
    let surface = surface(&board);

    click(&surface, 100.0, 100.0);
    move_to(&surface, 160.0, 180.0);
    click(&surface, 160.0, 180.0);

    let circles = shapes(&surface, "Circle");
    assert_eq!(circles.len(), 1, "anchor marker is gone after commit");
    let scene = surface.scene();
    let circle = scene.get(circles[0]).unwrap();
    assert_pos_eq(circle.position, Pos2::new(130.0, 140.0));
    let expected = (30.0f32.powi(2) + 40.0f32.powi(2)).sqrt();
    assert!((circle.radius().unwrap() - expected).abs() < 1e-3);
}

#[test]
fn test_ellipse_geometry() {
    let board = board_with(ToolKind::Ellipse);
    let surface = surface(&board);

    click(&surface, 100.0, 100.0);
    move_to(&surface, 200.0, 200.0);
    click(&surface, 200.0, 200.0);

    let ellipses = shapes(&surface, "Ellipse");
    assert_eq!(ellipses.len(), 1);
    assert!(shapes(&surface, "Circle").is_empty());
    let scene = surface.scene();
    let ellipse = scene.get(ellipses[0]).unwrap();
    assert_pos_eq(ellipse.position, Pos2::new(150.0, 150.0));
    let NodeKind::Ellipse { radius, rotation } = ellipse.kind else {
        panic!("not an ellipse");
    };
    let r = Vec2::splat(50.0).length();
    assert_vec_eq(radius, Vec2::new(r, r / 2.0));
    assert!((rotation - 45.0).abs() < 1e-3);
}

#[test]
fn test_line_multi_vertex() {
    let board = board_with(ToolKind::Line);
    let surface = surface(&board);

    click(&surface, 100.0, 100.0);
    click(&surface, 300.0, 300.0);
    move_to(&surface, 1000.0, 1000.0);
    click(&surface, 1000.0, 1000.0);
    key_down(&surface, Key::Escape);

    let lines = shapes(&surface, "Line");
    assert_eq!(lines.len(), 1);
    let scene = surface.scene();
    assert_eq!(
        scene.get(lines[0]).unwrap().points().unwrap(),
        &[
            Pos2::new(100.0, 100.0),
            Pos2::new(300.0, 300.0),
            Pos2::new(1000.0, 1000.0)
        ]
    );
    drop(scene);
    assert_eq!(board.history().borrow().undo_len(), 1);
}

#[test]
fn test_line_with_single_vertex_is_discarded() {
    let board = board_with(ToolKind::Line);
    let surface = surface(&board);

    click(&surface, 100.0, 100.0);
    move_to(&surface, 200.0, 200.0);
    right_click(&surface, 200.0, 200.0);

    assert!(shapes(&surface, "Line").is_empty());
    assert_eq!(board.history().borrow().undo_len(), 0);
}

#[test]
fn test_undo_is_bounded_and_clear_all_empties_board() {
    let board = board_with(ToolKind::Rect);
    let surface = surface(&board);
    for i in 0..25 {
        let at = 10.0 + i as f32 * 20.0;
        click(&surface, at, at);
        move_to(&surface, at + 10.0, at + 10.0);
        click(&surface, at + 10.0, at + 10.0);
    }
    assert_eq!(shapes(&surface, "Rect").len(), 25);

    for _ in 0..25 {
        ctrl_key_up(&surface, Key::Z);
    }
    assert_eq!(shapes(&surface, "Rect").len(), 5);

    for _ in 0..3 {
        ctrl_key_up(&surface, Key::Y);
    }
    assert_eq!(shapes(&surface, "Rect").len(), 8);

    // Stand-in for the confirmation dialog: accept right away.
    board
        .bus()
        .on(|request: &ShowDialog| (request.on_confirm)());
    board
        .factory()
        .emit(CommonCommand::Clean.key(), surface.root_id());
    assert!(shapes(&surface, "Rect").is_empty());

    ctrl_key_up(&surface, Key::Z);
    assert!(shapes(&surface, "Rect").is_empty());
    assert!(!board.history().borrow().can_redo());
}

#[test]
fn test_clear_all_needs_confirmation() {
    let board = board_with(ToolKind::Rect);
    let surface = surface(&board);
    click(&surface, 10.0, 10.0);
    click(&surface, 20.0, 20.0);

    board
        .factory()
        .emit(CommonCommand::Clean.key(), surface.root_id());
    assert_eq!(shapes(&surface, "Rect").len(), 1);
}

#[test]
fn test_zoom() {
    let board = board();
    let surface = surface(&board);

    for _ in 0..5 {
        wheel_up(&surface);
    }
    assert_eq!(surface.root_scale(), Vec2::splat(1.25));

    ctrl_key_up(&surface, Key::Num0);
    assert_eq!(surface.root_scale(), Vec2::splat(1.0));

    for _ in 0..3 {
        wheel_down(&surface);
    }
    assert_eq!(surface.root_scale(), Vec2::splat(0.85));

    for _ in 0..100 {
        wheel_down(&surface);
    }
    assert_eq!(surface.root_scale(), Vec2::splat(0.2));
}

#[test]
fn test_brush_stroke() {
    let board = board_with(ToolKind::Brush);
    let surface = surface(&board);

    down(&surface, 10.0, 10.0);
    move_to(&surface, 10.0, 10.0);
    move_to(&surface, 20.0, 25.0);
    move_to(&surface, 20.0, 25.0);
    move_to(&surface, 30.0, 40.0);
    up(&surface, 30.0, 40.0);

    let lines = shapes(&surface, "Line");
    assert_eq!(lines.len(), 1);
    let scene = surface.scene();
    let line = scene.get(lines[0]).unwrap();
    assert_eq!(
        line.points().unwrap(),
        &[
            Pos2::new(10.0, 10.0),
            Pos2::new(20.0, 25.0),
            Pos2::new(30.0, 40.0)
        ]
    );
    assert_eq!(line.config.stroke_width, 4.0);
    assert_eq!(line.config.hit_stroke_width, Some(12.0));
}

#[test]
fn test_brush_dot_is_doubled() {
    let board = board_with(ToolKind::Brush);
    let surface = surface(&board);

    down(&surface, 50.0, 50.0);
    up(&surface, 50.0, 50.0);

    let lines = shapes(&surface, "Line");
    let scene = surface.scene();
    assert_eq!(
        scene.get(lines[0]).unwrap().points().unwrap(),
        &[Pos2::new(50.0, 50.0), Pos2::new(50.0, 50.0)]
    );
}

#[test]
fn test_shapes_follow_pan_and_zoom() {
    let board = board_with(ToolKind::Rect);
    let surface = surface(&board);
    surface.set_root_position(Pos2::new(100.0, 50.0));

    click(&surface, 300.0, 250.0);
    move_to(&surface, 400.0, 300.0);
    click(&surface, 400.0, 300.0);

    let rects = shapes(&surface, "Rect");
    let scene = surface.scene();
    let rect = scene.get(rects[0]).unwrap();
    assert_eq!(rect.position, Pos2::new(200.0, 200.0));
    assert_eq!(rect.size(), Some(Vec2::new(100.0, 50.0)));
}

#[test]
fn test_escape_cancels_rect_ellipse_and_brush() {
    for kind in [ToolKind::Rect, ToolKind::Ellipse] {
        let board = board_with(kind);
        let surface = surface(&board);
        click(&surface, 100.0, 100.0);
        move_to(&surface, 200.0, 150.0);
        key_down(&surface, Key::Escape);
        assert_eq!(drawing_len(&surface), 0, "{kind:?}");

        // The next click only starts a new shape
        click(&surface, 200.0, 200.0);
        assert_eq!(board.history().borrow().undo_len(), 0, "{kind:?}");
    }

    let board = board_with(ToolKind::Brush);
    let surface = surface(&board);
    down(&surface, 10.0, 10.0);
    move_to(&surface, 40.0, 40.0);
    key_down(&surface, Key::Escape);
    up(&surface, 40.0, 40.0);
    assert_eq!(drawing_len(&surface), 0);
    assert_eq!(board.history().borrow().undo_len(), 0);
}

#[test]
fn test_other_buttons_do_not_start_shapes() {
    for kind in [ToolKind::Rect, ToolKind::Circle, ToolKind::Ellipse, ToolKind::Text] {
        let board = board_with(kind);
        let surface = surface(&board);
        right_click(&surface, 100.0, 100.0);
        move_to(&surface, 200.0, 200.0);
        assert_eq!(drawing_len(&surface), 0, "{kind:?}");
    }

    let board = board_with(ToolKind::Brush);
    let surface = surface(&board);
    middle_down(&surface, 10.0, 10.0);
    move_to(&surface, 40.0, 40.0);
    up(&surface, 40.0, 40.0);
    assert_eq!(drawing_len(&surface), 0);
    assert_eq!(board.history().borrow().undo_len(), 0);
}

#[test]
fn test_enter_finishes_line() {
    let board = board_with(ToolKind::Line);
    let surface = surface(&board);

    click(&surface, 10.0, 10.0);
    click(&surface, 50.0, 20.0);
    move_to(&surface, 90.0, 90.0);
    key_down(&surface, Key::Enter);

    let lines = shapes(&surface, "Line");
    assert_eq!(lines.len(), 1);
    assert_eq!(
        surface.scene().get(lines[0]).unwrap().points().unwrap(),
        &[Pos2::new(10.0, 10.0), Pos2::new(50.0, 20.0)]
    );
    assert_eq!(board.history().borrow().undo_len(), 1);

    // Finished: moving no longer edits it
    move_to(&surface, 300.0, 300.0);
    assert_eq!(
        surface.scene().get(lines[0]).unwrap().points().unwrap().len(),
        2
    );
}

#[test]
fn test_escape_after_commit_keeps_the_shape() {
    let board = board_with(ToolKind::Rect);
    let surface = surface(&board);
    click(&surface, 10.0, 10.0);
    move_to(&surface, 60.0, 60.0);
    click(&surface, 60.0, 60.0);
    key_down(&surface, Key::Escape);

    let rects = shapes(&surface, "Rect");
    assert_eq!(rects.len(), 1);
    assert_eq!(board.history().borrow().undo_len(), 1);

    // Escape then click: a fresh gesture anchored at the new point
    click(&surface, 100.0, 100.0);
    key_down(&surface, Key::Escape);
    click(&surface, 200.0, 300.0);
    move_to(&surface, 250.0, 320.0);
    click(&surface, 250.0, 320.0);

    let rects = shapes(&surface, "Rect");
    assert_eq!(rects.len(), 2);
    let scene = surface.scene();
    let second = scene.get(rects[1]).unwrap();
    assert_eq!(second.position, Pos2::new(200.0, 300.0));
    assert_eq!(second.size(), Some(Vec2::new(50.0, 20.0)));
    drop(scene);
    assert_eq!(board.history().borrow().undo_len(), 2);
}

#[test]
fn test_anchor_marker_uses_stroke_color() {
    for kind in [ToolKind::Circle, ToolKind::Ellipse] {
        let board = board_with(kind);
        let surface = surface(&board);
        board.factory().change_color(Color32::RED);
        click(&surface, 100.0, 100.0);

        let scene = surface.scene();
        let marker = shapes(&surface, "Circle")
            .into_iter()
            .filter_map(|id| scene.get(id))
            .find(|node| node.config.stroke_width == 0.0)
            .unwrap();
        assert_eq!(marker.config.fill, Some(Color32::RED), "{kind:?}");
    }
}
