//! Acceptance oracle: extracts comparable geometry from a reference SVG and
//! from generated KiCad text, then diffs the two.
//!
//! All canonical records are in millimeters and origin-centered.

pub mod compare;
pub mod kicad_extract;
pub mod sexpr;
pub mod svg_extract;

pub use compare::{compare_footprints, compare_symbols, validate_footprint, validate_symbol};
pub use kicad_extract::{extract_from_kicad_footprint, extract_from_kicad_symbol};
pub use svg_extract::{extract_from_svg_footprint, extract_from_svg_symbol};

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest box holding every point; `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn translated(&self, by: DVec2) -> Self {
        Self {
            min_x: self.min_x + by.x,
            min_y: self.min_y + by.y,
            max_x: self.max_x + by.x,
            max_y: self.max_y + by.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PadInfo {
    pub number: String,
    /// Lowercase KiCad/SVG shape name: rect, circle, oval, polygon, custom, ...
    pub shape: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub has_hole: bool,
    pub hole_radius: f64,
    /// EasyEDA layer id: 1 top, 2 bottom, 11 all copper layers.
    pub layer_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinInfo {
    pub number: String,
    pub name: String,
    /// Connection point, Y up.
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViaInfo {
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    pub hole_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleInfo {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintData {
    pub pads: Vec<PadInfo>,
    pub vias: Vec<ViaInfo>,
    pub holes: Vec<HoleInfo>,
    pub bounds: Bounds,
}

impl FootprintData {
    pub fn compute_bounds(&mut self) {
        let corners = self.pads.iter().flat_map(|p| {
            let half = DVec2::new(p.width, p.height) / 2.0;
            let c = DVec2::new(p.x, p.y);
            [c - half, c + half]
        });
        self.bounds = Bounds::from_points(corners).unwrap_or_default();
    }

    /// Moves everything so the pad bounding box is centered on the origin.
    pub(crate) fn center_on_pads(&mut self) {
        self.compute_bounds();
        let shift = -self.bounds.center();
        for pad in &mut self.pads {
            pad.x += shift.x;
            pad.y += shift.y;
        }
        for via in &mut self.vias {
            via.x += shift.x;
            via.y += shift.y;
        }
        for hole in &mut self.holes {
            hole.x += shift.x;
            hole.y += shift.y;
        }
        self.bounds = self.bounds.translated(shift);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolData {
    pub pins: Vec<PinInfo>,
    pub bounds: Bounds,
}

impl SymbolData {
    pub fn compute_bounds(&mut self) {
        self.bounds =
            Bounds::from_points(self.pins.iter().map(|p| DVec2::new(p.x, p.y))).unwrap_or_default();
    }

    /// Moves the pins so their bounding box is centered on the origin.
    pub fn centered(&self) -> SymbolData {
        let shift = -self.bounds.center();
        let mut out = self.clone();
        for pin in &mut out.pins {
            pin.x += shift.x;
            pin.y += shift.y;
        }
        out.bounds = self.bounds.translated(shift);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One difference between reference and generated geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    pub severity: Severity,
    /// `pad`, `pin`, `via` or `hole`.
    pub item: String,
    pub number: String,
    /// `position`, `size`, `shape`, `hole`, `name`, `length`, `missing` or `extra`.
    pub field: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FootprintComparisonResult {
    pub passed: bool,
    pub pad_count_match: bool,
    pub reference_pad_count: usize,
    pub generated_pad_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub diffs: Vec<Diff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolComparisonResult {
    pub passed: bool,
    pub pin_count_match: bool,
    pub reference_pin_count: usize,
    pub generated_pin_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub diffs: Vec<Diff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Maximum center distance, in mm, before a position error.
    pub position_tolerance: f64,
    /// Maximum per-axis size difference, in mm.
    pub size_tolerance: f64,
    /// Report size mismatches as errors instead of warnings.
    pub size_as_error: bool,
    /// Report generated items with no reference counterpart.
    pub report_extra: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            position_tolerance: 0.05,
            size_tolerance: 0.05,
            size_as_error: false,
            report_extra: true,
        }
    }
}
