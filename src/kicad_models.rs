// src/kicad_models.rs

use crate::easyeda_models::{ElectricalType, FootprintType, TextAlign};
use crate::units::{FOOTPRINT_PRECISION, SYMBOL_PRECISION, format_number};
use glam::{DVec2, DVec3};
use std::fmt;

pub const KICAD_FORMAT_VERSION: u32 = 20241209;
pub const GENERATOR: &str = "jlc-kicad";
pub const GENERATOR_VERSION: &str = "9.0";

/// Writes `s` as a KiCad string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn s(v: f64) -> String {
    format_number(v, SYMBOL_PRECISION)
}

fn f(v: f64) -> String {
    format_number(v, FOOTPRINT_PRECISION)
}

fn sxy(p: DVec2) -> String {
    format!("{} {}", s(p.x), s(p.y))
}

fn fxy(p: DVec2) -> String {
    format!("{} {}", f(p.x), f(p.y))
}

// --- Symbol Structs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiFill {
    None,
    Background,
    Outline,
}

impl KiFill {
    fn as_str(&self) -> &'static str {
        match self {
            KiFill::None => "none",
            KiFill::Background => "background",
            KiFill::Outline => "outline",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KiSymbolGraphic {
    Rectangle {
        start: DVec2,
        end: DVec2,
        stroke_width: f64,
        fill: KiFill,
    },
    Circle {
        center: DVec2,
        radius: f64,
        stroke_width: f64,
        fill: KiFill,
    },
    Arc {
        start: DVec2,
        mid: DVec2,
        end: DVec2,
        stroke_width: f64,
    },
    Polyline {
        points: Vec<DVec2>,
        stroke_width: f64,
        fill: KiFill,
    },
}

impl KiSymbolGraphic {
    /// Every point that bounds the graphic.
    pub fn extent_points(&self) -> Vec<DVec2> {
        match self {
            KiSymbolGraphic::Rectangle { start, end, .. } => vec![*start, *end],
            KiSymbolGraphic::Circle { center, radius, .. } => vec![
                *center - DVec2::splat(*radius),
                *center + DVec2::splat(*radius),
            ],
            KiSymbolGraphic::Arc { start, mid, end, .. } => vec![*start, *mid, *end],
            KiSymbolGraphic::Polyline { points, .. } => points.clone(),
        }
    }
}

fn stroke(width: f64) -> String {
    format!("(stroke (width {}) (type default))", s(width))
}

impl fmt::Display for KiSymbolGraphic {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KiSymbolGraphic::Rectangle {
                start,
                end,
                stroke_width,
                fill,
            } => write!(
                out,
                "(rectangle (start {}) (end {}) {} (fill (type {})))",
                sxy(*start),
                sxy(*end),
                stroke(*stroke_width),
                fill.as_str()
            ),
            KiSymbolGraphic::Circle {
                center,
                radius,
                stroke_width,
                fill,
            } => write!(
                out,
                "(circle (center {}) (radius {}) {} (fill (type {})))",
                sxy(*center),
                s(*radius),
                stroke(*stroke_width),
                fill.as_str()
            ),
            KiSymbolGraphic::Arc {
                start,
                mid,
                end,
                stroke_width,
            } => write!(
                out,
                "(arc (start {}) (mid {}) (end {}) {} (fill (type none)))",
                sxy(*start),
                sxy(*mid),
                sxy(*end),
                stroke(*stroke_width)
            ),
            KiSymbolGraphic::Polyline {
                points,
                stroke_width,
                fill,
            } => {
                write!(out, "(polyline (pts")?;
                for p in points {
                    write!(out, " (xy {})", sxy(*p))?;
                }
                write!(out, ") {} (fill (type {})))", stroke(*stroke_width), fill.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiPinStyle {
    Line,
    Inverted,
    Clock,
    InvertedClock,
}

impl KiPinStyle {
    pub fn from_flags(has_dot: bool, has_clock: bool) -> Self {
        match (has_dot, has_clock) {
            (true, true) => KiPinStyle::InvertedClock,
            (true, false) => KiPinStyle::Inverted,
            (false, true) => KiPinStyle::Clock,
            (false, false) => KiPinStyle::Line,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            KiPinStyle::Line => "line",
            KiPinStyle::Inverted => "inverted",
            KiPinStyle::Clock => "clock",
            KiPinStyle::InvertedClock => "inverted_clock",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiSymbolPin {
    pub name: String,
    pub number: String,
    pub electrical_type: ElectricalType,
    pub style: KiPinStyle,
    pub position: DVec2,
    pub rotation: f64,
    pub length: f64,
}

/// KiCad shows `~` for an empty name; a leading `~` marks an overbar.
fn pin_name_text(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == "~" {
        "~".to_string()
    } else if let Some(rest) = name.strip_prefix('~') {
        if rest.starts_with('{') {
            name.to_string()
        } else {
            format!("~{{{}}}", rest)
        }
    } else {
        name.to_string()
    }
}

impl fmt::Display for KiSymbolPin {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "(pin {} {} (at {} {}) (length {}) (name {} (effects (font (size 1.27 1.27)))) (number {} (effects (font (size 1.27 1.27)))))",
            self.electrical_type.as_kicad(),
            self.style.as_str(),
            sxy(self.position),
            s(self.rotation),
            s(self.length),
            quote(&pin_name_text(&self.name)),
            quote(&self.number)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiProperty {
    pub key: String,
    pub value: String,
    pub position: DVec2,
    pub rotation: f64,
    pub hidden: bool,
}

impl KiProperty {
    pub fn visible(key: &str, value: &str, position: DVec2, rotation: f64) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            position,
            rotation,
            hidden: false,
        }
    }

    pub fn hidden(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            position: DVec2::ZERO,
            rotation: 0.0,
            hidden: true,
        }
    }
}

impl fmt::Display for KiProperty {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "(property {} {} (at {} {}) (effects (font (size 1.27 1.27))",
            quote(&self.key),
            quote(&self.value),
            sxy(self.position),
            s(self.rotation)
        )?;
        if self.hidden {
            write!(out, " (hide yes)")?;
        }
        write!(out, "))")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiSymbol {
    pub name: String,
    pub properties: Vec<KiProperty>,
    pub hide_pin_numbers: bool,
    pub hide_pin_names: bool,
    pub pin_name_offset: f64,
    pub graphics: Vec<KiSymbolGraphic>,
    pub pins: Vec<KiSymbolPin>,
}

impl KiSymbol {
    /// The symbol block as it appears inside a `kicad_symbol_lib`.
    pub fn to_kicad_lib_entry(&self) -> String {
        self.to_string()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }
}

impl fmt::Display for KiSymbol {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "\t(symbol {}", quote(&self.name))?;
        if self.hide_pin_numbers {
            writeln!(out, "\t\t(pin_numbers (hide yes))")?;
        }
        write!(out, "\t\t(pin_names (offset {})", s(self.pin_name_offset))?;
        if self.hide_pin_names {
            write!(out, " (hide yes)")?;
        }
        writeln!(out, ")")?;
        writeln!(out, "\t\t(exclude_from_sim no)")?;
        writeln!(out, "\t\t(in_bom yes)")?;
        writeln!(out, "\t\t(on_board yes)")?;
        for property in &self.properties {
            writeln!(out, "\t\t{}", property)?;
        }

        // Body graphics live in unit 0 (shared by all units), pins in unit 1.
        writeln!(out, "\t\t(symbol {}", quote(&format!("{}_0_1", self.name)))?;
        for graphic in &self.graphics {
            writeln!(out, "\t\t\t{}", graphic)?;
        }
        writeln!(out, "\t\t)")?;
        writeln!(out, "\t\t(symbol {}", quote(&format!("{}_1_1", self.name)))?;
        for pin in &self.pins {
            writeln!(out, "\t\t\t{}", pin)?;
        }
        writeln!(out, "\t\t)")?;
        writeln!(out, "\t\t(embedded_fonts no)")?;
        write!(out, "\t)")
    }
}

/// A complete `.kicad_sym` document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KiSymbolLib {
    pub symbols: Vec<KiSymbol>,
}

pub fn symbol_lib_header() -> String {
    format!(
        "(kicad_symbol_lib\n\t(version {})\n\t(generator {})\n\t(generator_version {})\n",
        KICAD_FORMAT_VERSION,
        quote(GENERATOR),
        quote(GENERATOR_VERSION)
    )
}

impl fmt::Display for KiSymbolLib {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(out, "{}", symbol_lib_header())?;
        for symbol in &self.symbols {
            writeln!(out, "{}", symbol)?;
        }
        writeln!(out, ")")
    }
}

// --- 3D Model Structs ---

/// Placement of a 3D model referenced from a footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Ki3dModel {
    pub path: String,
    pub offset: DVec3,
    pub scale: DVec3,
    pub rotate: DVec3,
}

// --- Footprint Structs ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadType {
    Smd,
    ThroughHole,
    NpThroughHole,
}

impl PadType {
    fn as_str(&self) -> &'static str {
        match self {
            PadType::Smd => "smd",
            PadType::ThroughHole => "thru_hole",
            PadType::NpThroughHole => "np_thru_hole",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpShape {
    Circle,
    Rect,
    Oval,
    Custom,
}

impl FpShape {
    fn as_str(&self) -> &'static str {
        match self {
            FpShape::Circle => "circle",
            FpShape::Rect => "rect",
            FpShape::Oval => "oval",
            FpShape::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drill {
    Round(f64),
    Oval(f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpPad {
    pub number: String,
    pub pad_type: PadType,
    pub shape: FpShape,
    pub pos: DVec2,
    pub rotation: f64,
    pub size: DVec2,
    pub layers: Vec<String>,
    pub drill: Option<Drill>,
    /// Outline polygons of a custom pad, relative to `pos`.
    pub primitives: Vec<Vec<DVec2>>,
}

fn layer_list(layers: &[String]) -> String {
    layers.iter().map(|l| quote(l)).collect::<Vec<_>>().join(" ")
}

impl fmt::Display for FpPad {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "(pad {} {} {} (at {}",
            quote(&self.number),
            self.pad_type.as_str(),
            self.shape.as_str(),
            fxy(self.pos)
        )?;
        if self.rotation != 0.0 {
            write!(out, " {}", f(self.rotation))?;
        }
        write!(out, ") (size {})", fxy(self.size))?;
        match self.drill {
            Some(Drill::Round(d)) => write!(out, " (drill {})", f(d))?,
            Some(Drill::Oval(w, h)) => write!(out, " (drill oval {} {})", f(w), f(h))?,
            None => {}
        }
        write!(out, " (layers {})", layer_list(&self.layers))?;
        if self.shape == FpShape::Custom {
            write!(out, " (options (clearance outline) (anchor circle)) (primitives")?;
            for poly in &self.primitives {
                write!(out, " (gr_poly (pts")?;
                for p in poly {
                    write!(out, " (xy {})", fxy(*p))?;
                }
                write!(out, ") (width 0) (fill yes))")?;
            }
            write!(out, ")")?;
        }
        write!(out, ")")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FpGraphic {
    Line {
        start: DVec2,
        end: DVec2,
        width: f64,
        layer: String,
    },
    Circle {
        center: DVec2,
        end: DVec2,
        width: f64,
        layer: String,
    },
    Arc {
        start: DVec2,
        mid: DVec2,
        end: DVec2,
        width: f64,
        layer: String,
    },
    Rect {
        start: DVec2,
        end: DVec2,
        width: f64,
        layer: String,
    },
    Poly {
        points: Vec<DVec2>,
        width: f64,
        layer: String,
        filled: bool,
    },
}

impl FpGraphic {
    pub fn extent_points(&self) -> Vec<DVec2> {
        match self {
            FpGraphic::Line { start, end, .. } | FpGraphic::Rect { start, end, .. } => {
                vec![*start, *end]
            }
            FpGraphic::Circle { center, end, .. } => {
                let r = center.distance(*end);
                vec![*center - DVec2::splat(r), *center + DVec2::splat(r)]
            }
            FpGraphic::Arc { start, mid, end, .. } => vec![*start, *mid, *end],
            FpGraphic::Poly { points, .. } => points.clone(),
        }
    }

    pub fn layer(&self) -> &str {
        match self {
            FpGraphic::Line { layer, .. }
            | FpGraphic::Circle { layer, .. }
            | FpGraphic::Arc { layer, .. }
            | FpGraphic::Rect { layer, .. }
            | FpGraphic::Poly { layer, .. } => layer,
        }
    }
}

fn fp_stroke(width: f64) -> String {
    format!("(stroke (width {}) (type solid))", f(width))
}

impl fmt::Display for FpGraphic {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FpGraphic::Line {
                start,
                end,
                width,
                layer,
            } => write!(
                out,
                "(fp_line (start {}) (end {}) {} (layer {}))",
                fxy(*start),
                fxy(*end),
                fp_stroke(*width),
                quote(layer)
            ),
            FpGraphic::Circle {
                center,
                end,
                width,
                layer,
            } => write!(
                out,
                "(fp_circle (center {}) (end {}) {} (fill no) (layer {}))",
                fxy(*center),
                fxy(*end),
                fp_stroke(*width),
                quote(layer)
            ),
            FpGraphic::Arc {
                start,
                mid,
                end,
                width,
                layer,
            } => write!(
                out,
                "(fp_arc (start {}) (mid {}) (end {}) {} (layer {}))",
                fxy(*start),
                fxy(*mid),
                fxy(*end),
                fp_stroke(*width),
                quote(layer)
            ),
            FpGraphic::Rect {
                start,
                end,
                width,
                layer,
            } => write!(
                out,
                "(fp_rect (start {}) (end {}) {} (fill no) (layer {}))",
                fxy(*start),
                fxy(*end),
                fp_stroke(*width),
                quote(layer)
            ),
            FpGraphic::Poly {
                points,
                width,
                layer,
                filled,
            } => {
                write!(out, "(fp_poly (pts")?;
                for p in points {
                    write!(out, " (xy {})", fxy(*p))?;
                }
                write!(
                    out,
                    ") {} (fill {}) (layer {}))",
                    fp_stroke(*width),
                    if *filled { "yes" } else { "no" },
                    quote(layer)
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpText {
    pub text: String,
    pub pos: DVec2,
    pub rotation: f64,
    pub layer: String,
    pub size: f64,
    pub thickness: f64,
    pub align: TextAlign,
    pub mirrored: bool,
}

impl fmt::Display for FpText {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "(fp_text user {} (at {} {}) (layer {}) (effects (font (size {} {}) (thickness {}))",
            quote(&self.text),
            fxy(self.pos),
            f(self.rotation),
            quote(&self.layer),
            f(self.size),
            f(self.size),
            f(self.thickness)
        )?;
        let justify = match self.align {
            TextAlign::Left => Some("left"),
            TextAlign::Right => Some("right"),
            TextAlign::Center => None,
        };
        match (justify, self.mirrored) {
            (Some(j), true) => write!(out, " (justify {} mirror)", j)?,
            (Some(j), false) => write!(out, " (justify {})", j)?,
            (None, true) => write!(out, " (justify mirror)")?,
            (None, false) => {}
        }
        write!(out, "))")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FpProperty {
    pub key: String,
    pub value: String,
    pub pos: DVec2,
    pub layer: String,
    pub hidden: bool,
}

impl fmt::Display for FpProperty {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            out,
            "(property {} {} (at {} 0) (layer {})",
            quote(&self.key),
            quote(&self.value),
            fxy(self.pos),
            quote(&self.layer)
        )?;
        if self.hidden {
            write!(out, " (hide yes)")?;
        }
        write!(out, " (effects (font (size 1 1) (thickness 0.15))))")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KiFootprint {
    pub name: String,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub footprint_type: FootprintType,
    pub properties: Vec<FpProperty>,
    pub graphics: Vec<FpGraphic>,
    pub texts: Vec<FpText>,
    pub pads: Vec<FpPad>,
    pub model_3d: Option<Ki3dModel>,
}

impl KiFootprint {
    /// Generates the full S-expression string for a .kicad_mod file.
    pub fn to_kicad_mod_entry(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KiFootprint {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "(footprint {}", quote(&self.name))?;
        writeln!(out, "\t(version {})", KICAD_FORMAT_VERSION)?;
        writeln!(out, "\t(generator {})", quote(GENERATOR))?;
        writeln!(out, "\t(generator_version {})", quote(GENERATOR_VERSION))?;
        writeln!(out, "\t(layer \"F.Cu\")")?;
        if let Some(descr) = &self.description {
            writeln!(out, "\t(descr {})", quote(descr))?;
        }
        if let Some(tags) = &self.tags {
            writeln!(out, "\t(tags {})", quote(tags))?;
        }
        for property in &self.properties {
            writeln!(out, "\t{}", property)?;
        }
        match self.footprint_type {
            FootprintType::Smd => writeln!(out, "\t(attr smd)")?,
            FootprintType::ThroughHole => writeln!(out, "\t(attr through_hole)")?,
        }
        for graphic in &self.graphics {
            writeln!(out, "\t{}", graphic)?;
        }
        for text in &self.texts {
            writeln!(out, "\t{}", text)?;
        }
        for pad in &self.pads {
            writeln!(out, "\t{}", pad)?;
        }
        if let Some(model) = &self.model_3d {
            writeln!(
                out,
                "\t(model {} (offset (xyz {} {} {})) (scale (xyz {} {} {})) (rotate (xyz {} {} {})))",
                quote(&model.path),
                f(model.offset.x),
                f(model.offset.y),
                f(model.offset.z),
                f(model.scale.x),
                f(model.scale.y),
                f(model.scale.z),
                f(model.rotate.x),
                f(model.rotate.y),
                f(model.rotate.z)
            )?;
        }
        writeln!(out, "\t(embedded_fonts no)")?;
        writeln!(out, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_pin_name_overbar() {
        assert_eq!(pin_name_text("~RESET"), "~{RESET}");
        assert_eq!(pin_name_text("~{RESET}"), "~{RESET}");
        assert_eq!(pin_name_text(""), "~");
        assert_eq!(pin_name_text("VCC"), "VCC");
    }

    #[test]
    fn test_pad_drill_before_layers() {
        let pad = FpPad {
            number: "1".to_string(),
            pad_type: PadType::ThroughHole,
            shape: FpShape::Circle,
            pos: DVec2::new(1.27, 0.0),
            rotation: 0.0,
            size: DVec2::new(1.7, 1.7),
            layers: vec!["*.Cu".to_string(), "*.Mask".to_string()],
            drill: Some(Drill::Round(1.0)),
            primitives: vec![],
        };
        assert_eq!(
            pad.to_string(),
            r#"(pad "1" thru_hole circle (at 1.27 0) (size 1.7 1.7) (drill 1) (layers "*.Cu" "*.Mask"))"#
        );
    }
}
