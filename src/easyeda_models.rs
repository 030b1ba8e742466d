// Typed records for EasyEDA component data.
//
// Every coordinate here is still in EasyEDA's native 10-mil units with the
// Y axis pointing down; conversion happens in `units`.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The unit of conversion: one component as fetched from the API.
#[derive(Debug, Clone, Default)]
pub struct ComponentData {
    pub info: ComponentInfo,
    pub symbol: EeSymbol,
    pub footprint: EeFootprint,
    pub model_3d: Option<Ee3dModel>,
}

#[derive(Debug, Clone, Default)]
pub struct ComponentInfo {
    pub name: String,
    pub prefix: String,
    pub package: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub mfr_part: Option<String>,
    pub lcsc_id: Option<String>,
    pub datasheet: Option<String>,
    pub stock: Option<u64>,
    pub price: Option<f64>,
    pub process: Option<String>,
    pub min_order_qty: Option<u64>,
    pub part_class: Option<String>,
    /// Extra attributes, kept sorted so emitted properties are stable.
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Ee3dModel {
    pub name: String,
    pub uuid: String,
    pub origin: DVec2,
    pub z: f64,
    pub rotation: DVec3,
}

// --- Symbol ---

/// KiCad's twelve electrical pin kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectricalType {
    Input,
    Output,
    Bidirectional,
    TriState,
    Passive,
    Free,
    #[default]
    Unspecified,
    PowerIn,
    PowerOut,
    OpenCollector,
    OpenEmitter,
    NoConnect,
}

impl ElectricalType {
    pub fn from_easyeda(code: &str) -> Self {
        match code.trim() {
            "1" => ElectricalType::Input,
            "2" => ElectricalType::Output,
            "3" => ElectricalType::Bidirectional,
            "4" => ElectricalType::PowerIn,
            _ => ElectricalType::Unspecified,
        }
    }

    pub fn as_kicad(&self) -> &'static str {
        match self {
            ElectricalType::Input => "input",
            ElectricalType::Output => "output",
            ElectricalType::Bidirectional => "bidirectional",
            ElectricalType::TriState => "tri_state",
            ElectricalType::Passive => "passive",
            ElectricalType::Free => "free",
            ElectricalType::Unspecified => "unspecified",
            ElectricalType::PowerIn => "power_in",
            ElectricalType::PowerOut => "power_out",
            ElectricalType::OpenCollector => "open_collector",
            ElectricalType::OpenEmitter => "open_emitter",
            ElectricalType::NoConnect => "no_connect",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EeSymbolPin {
    pub number: String,
    pub name: String,
    pub electrical_type: ElectricalType,
    /// Wire-connection end of the pin.
    pub position: DVec2,
    pub rotation: f64,
    pub pin_length: f64,
    /// Inversion bubble.
    pub has_dot: bool,
    pub has_clock: bool,
}

impl EeSymbolPin {
    /// True when the name is missing or only repeats the number.
    pub fn has_descriptive_name(&self) -> bool {
        let name = self.name.trim();
        !(name.is_empty() || name == "~" || name == self.number)
    }
}

#[derive(Debug, Clone)]
pub struct EeSymbolRectangle {
    pub position: DVec2,
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct EeSymbolCircle {
    pub center: DVec2,
    pub radius: f64,
    pub stroke_width: f64,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct EeSymbolEllipse {
    pub center: DVec2,
    pub rx: f64,
    pub ry: f64,
    pub stroke_width: f64,
    pub filled: bool,
}

/// Arc or free-form path, still as raw SVG path data.
#[derive(Debug, Clone)]
pub struct EeSymbolPath {
    pub path: String,
    pub stroke_width: f64,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct EeSymbolPolyline {
    pub points: Vec<DVec2>,
    pub stroke_width: f64,
    pub filled: bool,
}

#[derive(Debug, Clone)]
pub struct EeSymbolText {
    pub mark: String,
    pub position: DVec2,
    pub rotation: f64,
    pub font_size: f64,
    pub text_type: String,
    pub text: String,
    pub visible: bool,
}

impl EeSymbolText {
    pub fn is_pin_part(&self) -> bool {
        self.text_type.eq_ignore_ascii_case("pinpart")
    }
}

/// One parsed symbol shape line.
#[derive(Debug, Clone)]
pub enum SymbolShape {
    Pin(EeSymbolPin),
    Rectangle(EeSymbolRectangle),
    Circle(EeSymbolCircle),
    Ellipse(EeSymbolEllipse),
    Arc(EeSymbolPath),
    Polyline(EeSymbolPolyline),
    Polygon(EeSymbolPolyline),
    Path(EeSymbolPath),
    Text(EeSymbolText),
}

#[derive(Debug, Clone, Default)]
pub struct EeSymbol {
    /// Symbol origin (the `head` x/y of the EasyEDA document).
    pub origin: DVec2,
    pub pins: Vec<EeSymbolPin>,
    pub rectangles: Vec<EeSymbolRectangle>,
    pub circles: Vec<EeSymbolCircle>,
    pub ellipses: Vec<EeSymbolEllipse>,
    pub arcs: Vec<EeSymbolPath>,
    pub polylines: Vec<EeSymbolPolyline>,
    pub polygons: Vec<EeSymbolPolyline>,
    pub paths: Vec<EeSymbolPath>,
    pub texts: Vec<EeSymbolText>,
}

impl EeSymbol {
    pub fn from_shapes(origin: DVec2, shapes: impl IntoIterator<Item = SymbolShape>) -> Self {
        let mut symbol = EeSymbol {
            origin,
            ..Default::default()
        };
        for shape in shapes {
            symbol.push(shape);
        }
        symbol
    }

    pub fn push(&mut self, shape: SymbolShape) {
        match shape {
            SymbolShape::Pin(p) => self.pins.push(p),
            SymbolShape::Rectangle(r) => self.rectangles.push(r),
            SymbolShape::Circle(c) => self.circles.push(c),
            SymbolShape::Ellipse(e) => self.ellipses.push(e),
            SymbolShape::Arc(a) => self.arcs.push(a),
            SymbolShape::Polyline(p) => self.polylines.push(p),
            SymbolShape::Polygon(p) => self.polygons.push(p),
            SymbolShape::Path(p) => self.paths.push(p),
            SymbolShape::Text(t) => self.texts.push(t),
        }
    }

    /// True when there is body graphics worth preserving.
    pub fn has_graphics(&self) -> bool {
        !(self.rectangles.is_empty()
            && self.circles.is_empty()
            && self.ellipses.is_empty()
            && self.arcs.is_empty()
            && self.polylines.is_empty()
            && self.polygons.is_empty()
            && self.paths.is_empty())
    }

    /// Applies pin fixes in place, returning how many pins were touched.
    pub fn apply_pin_corrections(&mut self, corrections: &[PinCorrection]) -> usize {
        let mut touched = 0;
        for correction in corrections {
            for pin in self.pins.iter_mut().filter(|p| p.number == correction.number) {
                if let Some(name) = &correction.name {
                    pin.name = name.clone();
                }
                if let Some(kind) = correction.electrical_type {
                    pin.electrical_type = kind;
                }
                touched += 1;
            }
        }
        touched
    }
}

/// A user-supplied fix for one pin, keyed by pin number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinCorrection {
    pub number: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub electrical_type: Option<ElectricalType>,
}

// --- Footprint ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadShape {
    Ellipse,
    Rect,
    Oval,
    Polygon,
}

impl PadShape {
    pub fn from_easyeda(shape: &str) -> Self {
        match shape.trim().to_ascii_uppercase().as_str() {
            "ELLIPSE" => PadShape::Ellipse,
            "OVAL" => PadShape::Oval,
            "POLYGON" => PadShape::Polygon,
            _ => PadShape::Rect,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EeFootprintPad {
    pub shape: PadShape,
    pub center: DVec2,
    pub width: f64,
    pub height: f64,
    pub layer_id: i32,
    /// Not unique: shield and ground pads often share a number.
    pub number: String,
    pub hole_radius: f64,
    /// Absolute polygon outline for `POLYGON` pads.
    pub points: Vec<DVec2>,
    pub rotation: f64,
    pub hole_length: f64,
    pub is_plated: bool,
}

impl EeFootprintPad {
    pub fn is_smd(&self) -> bool {
        self.hole_radius <= 0.0 && !self.is_inferred_through_hole()
    }

    /// Polygon pads whose hole radius is unreliable but are marked plated.
    pub fn is_inferred_through_hole(&self) -> bool {
        self.shape == PadShape::Polygon && self.is_plated && self.hole_radius <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct EeFootprintTrack {
    pub stroke_width: f64,
    pub layer_id: i32,
    pub points: Vec<DVec2>,
}

#[derive(Debug, Clone)]
pub struct EeFootprintHole {
    pub center: DVec2,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct EeFootprintVia {
    pub center: DVec2,
    pub diameter: f64,
    pub hole_radius: f64,
}

#[derive(Debug, Clone)]
pub struct EeFootprintCircle {
    pub center: DVec2,
    pub radius: f64,
    pub stroke_width: f64,
    pub layer_id: i32,
}

#[derive(Debug, Clone)]
pub struct EeFootprintArc {
    pub stroke_width: f64,
    pub layer_id: i32,
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct EeFootprintRect {
    pub position: DVec2,
    pub width: f64,
    pub height: f64,
    pub stroke_width: f64,
    pub layer_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn from_easyeda(code: &str) -> Self {
        match code.trim() {
            "L" | "start" => TextAlign::Left,
            "R" | "end" => TextAlign::Right,
            _ => TextAlign::Center,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EeFootprintText {
    /// "N" for the reference designator, "P" for the package/value, else user text.
    pub text_type: String,
    pub position: DVec2,
    pub stroke_width: f64,
    pub rotation: f64,
    pub mirrored: bool,
    pub layer_id: i32,
    pub font_size: f64,
    pub text: String,
    pub visible: bool,
    pub align: TextAlign,
}

impl EeFootprintText {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.text_type.as_str(), "N" | "P")
    }
}

#[derive(Debug, Clone)]
pub struct EeFootprintSolidRegion {
    pub layer_id: i32,
    pub path: String,
    pub region_type: String,
}

/// One parsed footprint shape line.
#[derive(Debug, Clone)]
pub enum FootprintShape {
    Pad(EeFootprintPad),
    Track(EeFootprintTrack),
    Hole(EeFootprintHole),
    Via(EeFootprintVia),
    Circle(EeFootprintCircle),
    Arc(EeFootprintArc),
    Rect(EeFootprintRect),
    Text(EeFootprintText),
    SolidRegion(EeFootprintSolidRegion),
    Model(Ee3dModel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FootprintType {
    Smd,
    ThroughHole,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprintInfo {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct EeFootprint {
    pub info: EeFootprintInfo,
    /// Document origin (the `head` x/y), used when there are no pads.
    pub origin: DVec2,
    pub pads: Vec<EeFootprintPad>,
    pub tracks: Vec<EeFootprintTrack>,
    pub holes: Vec<EeFootprintHole>,
    pub vias: Vec<EeFootprintVia>,
    pub circles: Vec<EeFootprintCircle>,
    pub arcs: Vec<EeFootprintArc>,
    pub rects: Vec<EeFootprintRect>,
    pub texts: Vec<EeFootprintText>,
    pub solid_regions: Vec<EeFootprintSolidRegion>,
    pub model_3d: Option<Ee3dModel>,
}

impl EeFootprint {
    pub fn from_shapes(
        info: EeFootprintInfo,
        origin: DVec2,
        shapes: impl IntoIterator<Item = FootprintShape>,
    ) -> Self {
        let mut footprint = EeFootprint {
            info,
            origin,
            ..Default::default()
        };
        for shape in shapes {
            footprint.push(shape);
        }
        footprint
    }

    pub fn push(&mut self, shape: FootprintShape) {
        match shape {
            FootprintShape::Pad(p) => self.pads.push(p),
            FootprintShape::Track(t) => self.tracks.push(t),
            FootprintShape::Hole(h) => self.holes.push(h),
            FootprintShape::Via(v) => self.vias.push(v),
            FootprintShape::Circle(c) => self.circles.push(c),
            FootprintShape::Arc(a) => self.arcs.push(a),
            FootprintShape::Rect(r) => self.rects.push(r),
            FootprintShape::Text(t) => self.texts.push(t),
            FootprintShape::SolidRegion(s) => self.solid_regions.push(s),
            FootprintShape::Model(m) => self.model_3d = Some(m),
        }
    }

    /// Through-hole if any pad has a hole or is a plated polygon pad.
    pub fn footprint_type(&self) -> FootprintType {
        if self.pads.iter().any(|p| !p.is_smd()) {
            FootprintType::ThroughHole
        } else {
            FootprintType::Smd
        }
    }

    /// Center of the bounding box spanned by all pads, extents included.
    pub fn pad_bounds_center(&self) -> Option<DVec2> {
        let mut pads = self.pads.iter();
        let first = pads.next()?;
        let half = DVec2::new(first.width, first.height) / 2.0;
        let (mut min, mut max) = (first.center - half, first.center + half);
        for pad in pads {
            let half = DVec2::new(pad.width, pad.height) / 2.0;
            min = min.min(pad.center - half);
            max = max.max(pad.center + half);
        }
        Some((min + max) / 2.0)
    }
}
