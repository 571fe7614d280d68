use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

use crate::geometry::normalized_rect;
use crate::scene::{Node, NodeId, NodeKind, Scene, Surface};

/// Number of segments used to approximate an ellipse outline
const ELLIPSE_SEGMENTS: usize = 64;

/// Maps node-local coordinates to screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    offset: Vec2,
    scale: Vec2,
}

impl Transform {
    fn apply(&self, point: Pos2) -> Pos2 {
        Pos2::new(
            self.offset.x + point.x * self.scale.x,
            self.offset.y + point.y * self.scale.y,
        )
    }

    /// Transform of a child placed at `position` with `scale` inside this one
    fn then(&self, position: Pos2, scale: Vec2) -> Self {
        Self {
            offset: self.apply(position).to_vec2(),
            scale: self.scale * scale,
        }
    }

    fn length(&self, value: f32) -> f32 {
        value * self.scale.x.abs().max(self.scale.y.abs())
    }
}

/// Paints a [`Surface`] with an egui painter
#[derive(Debug)]
pub struct Renderer {
    background: Color32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            background: Color32::WHITE,
        }
    }

    /// Renders the whole scene of `surface` into `canvas`
    ///
    /// Args:
    ///     painter (Painter): The painter to draw with, clipped to the canvas
    ///     surface (Surface): The stage to render
    ///     canvas (Rect): Screen rectangle the stage occupies
    pub fn render(&self, painter: &Painter, surface: &Surface, canvas: Rect) {
        painter.rect_filled(canvas, 0.0, self.background);

        let scene = surface.scene();
        let base = Transform {
            offset: canvas.min.to_vec2(),
            scale: Vec2::splat(1.0),
        };
        self.paint_children(painter, &scene, surface.stage_id(), base);
    }

    fn paint_children(&self, painter: &Painter, scene: &Scene, parent: NodeId, transform: Transform) {
        for child in scene.children(parent) {
            let Some(node) = scene.get(*child) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if node.kind.is_container() {
                let inner = transform.then(node.position, node.scale);
                self.paint_children(painter, scene, *child, inner);
            } else {
                self.paint_node(painter, node, transform);
            }
        }
    }

    fn paint_node(&self, painter: &Painter, node: &Node, transform: Transform) {
        let config = &node.config;
        let stroke = match config.stroke {
            Some(color) if config.stroke_width > 0.0 => {
                Stroke::new(transform.length(config.stroke_width), color)
            }
            _ => Stroke::NONE,
        };
        let fill = config.fill.unwrap_or(Color32::TRANSPARENT);
        let local = transform.then(node.position, node.scale);

        match &node.kind {
            NodeKind::Stage | NodeKind::Layer | NodeKind::Group => {}
            NodeKind::Rect { size } => {
                let bounds = normalized_rect(Pos2::ZERO, *size);
                let rect = Rect::from_two_pos(local.apply(bounds.min), local.apply(bounds.max));
                if fill != Color32::TRANSPARENT {
                    painter.rect_filled(rect, 0.0, fill);
                }
                if config.dash.len() >= 2 {
                    let outline = [
                        rect.left_top(),
                        rect.right_top(),
                        rect.right_bottom(),
                        rect.left_bottom(),
                        rect.left_top(),
                    ];
                    painter.extend(Shape::dashed_line(
                        &outline,
                        stroke,
                        config.dash[0],
                        config.dash[1],
                    ));
                } else {
                    painter.rect_stroke(rect, 0.0, stroke);
                }
            }
            NodeKind::Circle { radius } => {
                let center = local.apply(Pos2::ZERO);
                let radius = local.length(*radius);
                painter.circle(center, radius, fill, stroke);
            }
            NodeKind::Ellipse { radius, rotation } => {
                let (sin, cos) = rotation.to_radians().sin_cos();
                let points: Vec<Pos2> = (0..ELLIPSE_SEGMENTS)
                    .map(|i| {
                        let t = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
                        let (x, y) = (radius.x * t.cos(), radius.y * t.sin());
                        local.apply(Pos2::new(x * cos - y * sin, x * sin + y * cos))
                    })
                    .collect();
                if fill != Color32::TRANSPARENT {
                    painter.add(Shape::convex_polygon(points, fill, stroke));
                } else {
                    painter.add(Shape::closed_line(points, stroke));
                }
            }
            NodeKind::Line { points, .. } => {
                let points: Vec<Pos2> = points.iter().map(|p| local.apply(*p)).collect();
                match points.as_slice() {
                    [] => {}
                    [a, b] if a == b => {
                        painter.circle_filled(*a, stroke.width / 2.0, stroke.color);
                    }
                    _ => {
                        painter.add(Shape::line(points, stroke));
                    }
                }
            }
            NodeKind::Text { text, size } => {
                let bounds = normalized_rect(Pos2::ZERO, *size);
                let rect = Rect::from_two_pos(local.apply(bounds.min), local.apply(bounds.max));
                let padding = local.length(config.padding.unwrap_or(0.0));
                let font_size = local.length(config.font_size.unwrap_or(12.0));
                let font = match config.font_family.as_deref() {
                    Some("monospace") => FontId::monospace(font_size),
                    _ => FontId::proportional(font_size),
                };
                let color = config.fill.or(config.stroke).unwrap_or(Color32::BLACK);

                let galley = painter.layout(
                    text.clone(),
                    font,
                    color,
                    (rect.width() - padding * 2.0).max(1.0),
                );
                let clipped = painter.with_clip_rect(rect.intersect(painter.clip_rect()));
                clipped.galley(rect.min + Vec2::splat(padding), galley, color);
            }
        }
    }

    /// Draws the tool options preview swatch used by the toolbar
    pub fn swatch(&self, painter: &Painter, rect: Rect, color: Color32, width: f32) {
        painter.rect_filled(rect, 2.0, self.background);
        painter.line_segment(
            [rect.left_center(), rect.right_center()],
            Stroke::new(width.min(rect.height()), color),
        );
        painter.text(
            rect.right_bottom(),
            Align2::RIGHT_BOTTOM,
            format!("{width:.0}"),
            FontId::monospace(9.0),
            Color32::GRAY,
        );
    }
}

/// Screen position of a drawing-root point, as shown by [`Renderer::render`]
pub fn root_to_screen(surface: &Surface, canvas: Rect, point: Pos2) -> Pos2 {
    let scale = surface.root_scale();
    let pan = surface.root_position();
    canvas.min + pan.to_vec2() + Vec2::new(point.x * scale.x, point.y * scale.y)
}
