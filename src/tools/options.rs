use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::scene::NodeConfig;

/// Which node color a picked color is written into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorKey {
    Stroke,
    Fill,
}

/// Stroke cap style of the brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushType {
    #[default]
    Round,
    Square,
}

/// Options of a drawing tool, applied to every node it creates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    pub node_config: NodeConfig,
    /// Config keys receiving a recolor broadcast
    pub color_keys: Vec<ColorKey>,
    pub brush_width: f32,
    pub brush_type: BrushType,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            node_config: NodeConfig {
                stroke: Some(Color32::BLACK),
                ..Default::default()
            },
            color_keys: vec![ColorKey::Stroke],
            brush_width: 4.0,
            brush_type: BrushType::Round,
        }
    }
}

impl ToolOptions {
    /// Black outline of the given width
    pub fn stroked(width: f32) -> Self {
        let mut options = Self::default();
        options.node_config.stroke_width = width;
        options
    }

    /// Deep-merges `patch` into the options; absent fields are left untouched
    pub fn merge(&mut self, patch: OptionsPatch) {
        if let Some(config) = patch.node_config {
            config.apply(&mut self.node_config);
        }
        if let Some(keys) = patch.color_keys {
            self.color_keys = keys;
        }
        if let Some(width) = patch.brush_width {
            self.brush_width = width;
        }
        if let Some(brush_type) = patch.brush_type {
            self.brush_type = brush_type;
        }
    }

    /// Writes `color` into every bound color key
    pub fn apply_color(&mut self, color: Color32) {
        for key in &self.color_keys {
            match key {
                ColorKey::Stroke => self.node_config.stroke = Some(color),
                ColorKey::Fill => self.node_config.fill = Some(color),
            }
        }
    }

    /// The color shown in the picker: the first bound key that is set
    pub fn primary_color(&self) -> Option<Color32> {
        self.color_keys.iter().find_map(|key| match key {
            ColorKey::Stroke => self.node_config.stroke,
            ColorKey::Fill => self.node_config.fill,
        })
    }
}

/// Partial [`NodeConfig`] update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfigPatch {
    pub stroke: Option<Color32>,
    pub fill: Option<Color32>,
    pub stroke_width: Option<f32>,
    pub hit_stroke_width: Option<f32>,
    pub dash: Option<Vec<f32>>,
    pub font_family: Option<String>,
    pub font_style: Option<String>,
    pub font_size: Option<f32>,
    pub padding: Option<f32>,
}

impl NodeConfigPatch {
    fn apply(self, config: &mut NodeConfig) {
        if self.stroke.is_some() {
            config.stroke = self.stroke;
        }
        if self.fill.is_some() {
            config.fill = self.fill;
        }
        if let Some(width) = self.stroke_width {
            config.stroke_width = width;
        }
        if self.hit_stroke_width.is_some() {
            config.hit_stroke_width = self.hit_stroke_width;
        }
        if let Some(dash) = self.dash {
            config.dash = dash;
        }
        if self.font_family.is_some() {
            config.font_family = self.font_family;
        }
        if self.font_style.is_some() {
            config.font_style = self.font_style;
        }
        if self.font_size.is_some() {
            config.font_size = self.font_size;
        }
        if self.padding.is_some() {
            config.padding = self.padding;
        }
    }
}

impl From<NodeConfig> for NodeConfigPatch {
    fn from(config: NodeConfig) -> Self {
        Self {
            stroke: config.stroke,
            fill: config.fill,
            stroke_width: Some(config.stroke_width),
            hit_stroke_width: config.hit_stroke_width,
            dash: Some(config.dash),
            font_family: config.font_family,
            font_style: config.font_style,
            font_size: config.font_size,
            padding: config.padding,
        }
    }
}

/// Partial [`ToolOptions`] update, merged field by field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    pub node_config: Option<NodeConfigPatch>,
    pub color_keys: Option<Vec<ColorKey>>,
    pub brush_width: Option<f32>,
    pub brush_type: Option<BrushType>,
}

impl OptionsPatch {
    pub fn stroke(color: Color32) -> Self {
        Self {
            node_config: Some(NodeConfigPatch {
                stroke: Some(color),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn stroke_width(width: f32) -> Self {
        Self {
            node_config: Some(NodeConfigPatch {
                stroke_width: Some(width),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl From<ToolOptions> for OptionsPatch {
    fn from(options: ToolOptions) -> Self {
        Self {
            node_config: Some(options.node_config.into()),
            color_keys: Some(options.color_keys),
            brush_width: Some(options.brush_width),
            brush_type: Some(options.brush_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_untouched_fields() {
        let mut options = ToolOptions::stroked(2.0);
        options.node_config.hit_stroke_width = Some(10.0);

        options.merge(OptionsPatch::stroke(Color32::RED));

        assert_eq!(options.node_config.stroke, Some(Color32::RED));
        assert_eq!(options.node_config.stroke_width, 2.0);
        assert_eq!(options.node_config.hit_stroke_width, Some(10.0));
        assert_eq!(options.color_keys, vec![ColorKey::Stroke]);
    }

    #[test]
    fn test_apply_color_to_every_key() {
        let mut options = ToolOptions {
            color_keys: vec![ColorKey::Stroke, ColorKey::Fill],
            ..Default::default()
        };
        options.apply_color(Color32::BLUE);

        assert_eq!(options.node_config.stroke, Some(Color32::BLUE));
        assert_eq!(options.node_config.fill, Some(Color32::BLUE));
    }

    #[test]
    fn test_full_patch_restores_options() {
        let mut saved = ToolOptions::stroked(6.0);
        saved.brush_type = BrushType::Square;
        saved.node_config.dash = vec![4.0, 2.0];

        let mut options = ToolOptions::default();
        options.merge(saved.clone().into());
        assert_eq!(options, saved);
    }

    #[test]
    fn test_patch_from_json() {
        let patch: OptionsPatch = serde_json::from_str(r#"{"brush_width": 12.0}"#).unwrap();
        let mut options = ToolOptions::default();
        options.merge(patch);
        assert_eq!(options.brush_width, 12.0);
        assert_eq!(options.node_config.stroke, Some(Color32::BLACK));
    }
}
