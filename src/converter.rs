// src/converter.rs

pub mod footprint;
pub mod library_merge;
pub mod symbol;
pub mod templates;

pub use footprint::{FootprintOptions, FootprintResult};
pub use symbol::SymbolOptions;

use crate::easyeda_models::PadShape;
use crate::kicad_models::FpShape;
use serde::{Deserialize, Serialize};

/// Options for converting one component into both library items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub symbol: SymbolOptions,
    pub footprint: FootprintOptions,
}

/// Makes a name safe for use as a KiCad symbol/footprint identifier.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "Unnamed".to_string()
    } else {
        cleaned
    }
}

/// Maps EasyEDA layer IDs to KiCad layer names.
pub fn map_layer(layer_id: i32) -> &'static str {
    match layer_id {
        1 => "F.Cu",
        2 => "B.Cu",
        3 => "F.SilkS",
        4 => "B.SilkS",
        5 => "F.Paste",
        6 => "B.Paste",
        7 => "F.Mask",
        8 => "B.Mask",
        10 => "Edge.Cuts",
        12 => "Cmts.User",
        13 => "F.Fab",
        14 => "B.Fab",
        15 => "Dwgs.User",
        _ => "F.Fab",
    }
}

/// Copper/paste/mask layer set of a pad.
pub fn map_pad_layers(layer_id: i32, is_smd: bool) -> Vec<String> {
    let layers: &[&str] = match (layer_id, is_smd) {
        (_, false) | (11, _) => &["*.Cu", "*.Mask"],
        (2, true) => &["B.Cu", "B.Paste", "B.Mask"],
        _ => &["F.Cu", "F.Paste", "F.Mask"],
    };
    layers.iter().map(|l| l.to_string()).collect()
}

/// Maps EasyEDA pad shapes to KiCad pad shapes.
pub fn map_pad_shape(shape: PadShape) -> FpShape {
    match shape {
        PadShape::Ellipse => FpShape::Circle,
        PadShape::Rect => FpShape::Rect,
        PadShape::Oval => FpShape::Oval,
        PadShape::Polygon => FpShape::Custom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("NE555 (DIP-8)"), "NE555__DIP-8_");
        assert_eq!(sanitize_name("  "), "Unnamed");
        assert_eq!(sanitize_name("LM1117-3.3"), "LM1117-3.3");
    }

    #[test]
    fn test_pad_layers() {
        assert_eq!(map_pad_layers(1, true), vec!["F.Cu", "F.Paste", "F.Mask"]);
        assert_eq!(map_pad_layers(2, true), vec!["B.Cu", "B.Paste", "B.Mask"]);
        assert_eq!(map_pad_layers(11, true), vec!["*.Cu", "*.Mask"]);
        assert_eq!(map_pad_layers(1, false), vec!["*.Cu", "*.Mask"]);
    }
}
