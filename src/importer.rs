// src/importer.rs

use crate::easyeda_models::*;
use crate::error::{Error, Result};
use crate::svg_path::{PathCommand, parse_path};
use glam::{DVec2, DVec3};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

fn parse_raw_line(line: &str) -> Vec<&str> {
    line.split('~').collect()
}

/// Numeric field or 0 when it is missing, empty or not a finite number.
fn num(fields: &[&str], idx: usize) -> f64 {
    fields
        .get(idx)
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn int(fields: &[&str], idx: usize) -> i32 {
    num(fields, idx) as i32
}

fn text<'a>(fields: &[&'a str], idx: usize) -> &'a str {
    fields.get(idx).copied().unwrap_or("")
}

fn flag(fields: &[&str], idx: usize) -> bool {
    matches!(
        text(fields, idx).trim().to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "show"
    )
}

fn is_filled(fill: &str) -> bool {
    !matches!(
        fill.trim().to_ascii_lowercase().as_str(),
        "" | "none" | "transparent"
    )
}

/// Space/comma separated coordinate pairs.
fn parse_points(raw: &str) -> Vec<DVec2> {
    let coords: Vec<f64> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();
    coords
        .chunks_exact(2)
        .map(|pair| DVec2::new(pair[0], pair[1]))
        .collect()
}

// --- Symbol shapes ---

/// Parses one symbol shape line; unknown or malformed lines yield `None`.
pub fn parse_symbol_shape(line: &str) -> Option<SymbolShape> {
    let designator = line.split('~').next()?;
    match designator {
        "P" => parse_symbol_pin(line).map(SymbolShape::Pin),
        "R" => parse_symbol_rectangle(line).map(SymbolShape::Rectangle),
        "C" => parse_symbol_circle(line).map(SymbolShape::Circle),
        "E" => parse_symbol_ellipse(line).map(SymbolShape::Ellipse),
        "A" => parse_symbol_path(line, 4, 6).map(SymbolShape::Arc),
        "PL" => parse_symbol_polyline(line).map(SymbolShape::Polyline),
        "PG" => parse_symbol_polyline(line).map(SymbolShape::Polygon),
        "PT" => parse_symbol_path(line, 3, 5).map(SymbolShape::Path),
        "T" => parse_symbol_text(line).map(SymbolShape::Text),
        _ => None,
    }
}

/// Pins are split by `^^` into settings, dot, length path, name label,
/// number label, inversion bubble and clock segments.
fn parse_symbol_pin(line: &str) -> Option<EeSymbolPin> {
    let segments: Vec<&str> = line.split("^^").collect();
    let settings = parse_raw_line(segments.first()?);
    if settings.len() < 7 {
        return None;
    }

    let pin_length = segments
        .get(2)
        .map(|seg| pin_length_from_path(text(&parse_raw_line(seg), 0)))
        .unwrap_or(0.0);
    let name = segments
        .get(3)
        .map(|seg| text(&parse_raw_line(seg), 4).trim().to_string())
        .unwrap_or_default();
    let number = segments
        .get(4)
        .map(|seg| text(&parse_raw_line(seg), 4).trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| text(&settings, 3).trim().to_string());
    let has_dot = segments
        .get(5)
        .map(|seg| flag(&parse_raw_line(seg), 0))
        .unwrap_or(false);
    let has_clock = segments
        .get(6)
        .map(|seg| flag(&parse_raw_line(seg), 0))
        .unwrap_or(false);

    Some(EeSymbolPin {
        number,
        name,
        electrical_type: ElectricalType::from_easyeda(text(&settings, 2)),
        position: DVec2::new(num(&settings, 4), num(&settings, 5)),
        rotation: num(&settings, 6),
        pin_length,
        has_dot,
        has_clock,
    })
}

/// Distance from the first to the last point of the pin's line path.
fn pin_length_from_path(path: &str) -> f64 {
    let commands = parse_path(path);
    let start = match commands.first() {
        Some(PathCommand::MoveTo(p)) => *p,
        _ => return 0.0,
    };
    commands
        .iter()
        .rev()
        .find_map(|c| c.end_point())
        .map(|end| start.distance(end))
        .unwrap_or(0.0)
}

fn parse_symbol_rectangle(line: &str) -> Option<EeSymbolRectangle> {
    let fields = parse_raw_line(line);
    if fields.len() < 7 {
        return None;
    }
    Some(EeSymbolRectangle {
        position: DVec2::new(num(&fields, 1), num(&fields, 2)),
        width: num(&fields, 5),
        height: num(&fields, 6),
        stroke_width: num(&fields, 8),
        filled: is_filled(text(&fields, 10)),
    })
}

fn parse_symbol_circle(line: &str) -> Option<EeSymbolCircle> {
    let fields = parse_raw_line(line);
    if fields.len() < 4 {
        return None;
    }
    Some(EeSymbolCircle {
        center: DVec2::new(num(&fields, 1), num(&fields, 2)),
        radius: num(&fields, 3),
        stroke_width: num(&fields, 5),
        filled: is_filled(text(&fields, 7)),
    })
}

fn parse_symbol_ellipse(line: &str) -> Option<EeSymbolEllipse> {
    let fields = parse_raw_line(line);
    if fields.len() < 5 {
        return None;
    }
    Some(EeSymbolEllipse {
        center: DVec2::new(num(&fields, 1), num(&fields, 2)),
        rx: num(&fields, 3),
        ry: num(&fields, 4),
        stroke_width: num(&fields, 6),
        filled: is_filled(text(&fields, 8)),
    })
}

fn parse_symbol_path(line: &str, stroke_idx: usize, fill_idx: usize) -> Option<EeSymbolPath> {
    let fields = parse_raw_line(line);
    let path = text(&fields, 1).trim();
    if path.is_empty() {
        return None;
    }
    Some(EeSymbolPath {
        path: path.to_string(),
        stroke_width: num(&fields, stroke_idx),
        filled: is_filled(text(&fields, fill_idx)),
    })
}

fn parse_symbol_polyline(line: &str) -> Option<EeSymbolPolyline> {
    let fields = parse_raw_line(line);
    let points = parse_points(text(&fields, 1));
    if points.len() < 2 {
        return None;
    }
    Some(EeSymbolPolyline {
        points,
        stroke_width: num(&fields, 3),
        filled: is_filled(text(&fields, 5)),
    })
}

fn parse_symbol_text(line: &str) -> Option<EeSymbolText> {
    let fields = parse_raw_line(line);
    if fields.len() < 13 {
        return None;
    }
    Some(EeSymbolText {
        mark: text(&fields, 1).to_string(),
        position: DVec2::new(num(&fields, 2), num(&fields, 3)),
        rotation: num(&fields, 4),
        font_size: num(&fields, 7),
        text_type: text(&fields, 11).to_string(),
        text: text(&fields, 12).to_string(),
        visible: fields.len() <= 13 || text(&fields, 13) != "0",
    })
}

static PIN_PART_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[A-Za-z]+(\d+)\s*/\s*(\S.*?)\s*$").expect("pin part label pattern")
});

/// Back-fills pin names from `pinpart` labels such as `J3/SDA`.
///
/// Only pins without a descriptive name are touched. Labels whose number
/// matches no pin are ignored.
pub fn associate_pin_names_from_texts(symbol: &mut EeSymbol) -> usize {
    let mut filled = 0;
    for label in symbol.texts.iter().filter(|t| t.is_pin_part()) {
        let Some(caps) = PIN_PART_LABEL.captures(&label.text) else {
            continue;
        };
        let number = &caps[1];
        let function = &caps[2];
        for pin in symbol
            .pins
            .iter_mut()
            .filter(|p| p.number == number && !p.has_descriptive_name())
        {
            pin.name = function.to_string();
            filled += 1;
        }
    }
    filled
}

pub fn parse_symbol_shapes<S: AsRef<str>>(origin: DVec2, lines: &[S]) -> EeSymbol {
    let mut symbol = EeSymbol::from_shapes(
        origin,
        lines.iter().filter_map(|l| parse_symbol_shape(l.as_ref())),
    );
    let filled = associate_pin_names_from_texts(&mut symbol);
    log::debug!(
        "Parsed symbol: {} pins, {} names from labels, graphics={}",
        symbol.pins.len(),
        filled,
        symbol.has_graphics()
    );
    symbol
}

// --- Footprint shapes ---

/// Parses one footprint shape line; unknown or malformed lines yield `None`.
pub fn parse_footprint_shape(line: &str) -> Option<FootprintShape> {
    let designator = line.split('~').next()?;
    match designator {
        "PAD" => parse_pad(line).map(FootprintShape::Pad),
        "TRACK" => parse_track(line).map(FootprintShape::Track),
        "HOLE" => parse_hole(line).map(FootprintShape::Hole),
        "VIA" => parse_via(line).map(FootprintShape::Via),
        "CIRCLE" => parse_circle(line).map(FootprintShape::Circle),
        "ARC" => parse_arc(line).map(FootprintShape::Arc),
        "RECT" => parse_rect(line).map(FootprintShape::Rect),
        "TEXT" => parse_text(line).map(FootprintShape::Text),
        "SOLIDREGION" => parse_solid_region(line).map(FootprintShape::SolidRegion),
        "SVGNODE" => parse_svg_node(line).map(FootprintShape::Model),
        _ => None,
    }
}

// PAD format from EasyEDA:
// [0]PAD [1]shape [2]x [3]y [4]width [5]height [6]layer [7]net [8]number
// [9]hole_radius [10]points [11]rotation [12]id [13]hole_length [14]hole_point
// [15]is_plated [16]is_locked
fn parse_pad(line: &str) -> Option<EeFootprintPad> {
    let fields = parse_raw_line(line);
    if fields.len() < 10 {
        return None;
    }

    let mut hole_length = num(&fields, 13);
    // Very old records carry the length in field 12 where newer ones keep the
    // id; an id never parses as a positive number.
    if hole_length == 0.0 && num(&fields, 12) > 0.0 {
        hole_length = num(&fields, 12);
    }

    Some(EeFootprintPad {
        shape: PadShape::from_easyeda(text(&fields, 1)),
        center: DVec2::new(num(&fields, 2), num(&fields, 3)),
        width: num(&fields, 4),
        height: num(&fields, 5),
        layer_id: int(&fields, 6),
        number: text(&fields, 8).trim().to_string(),
        hole_radius: num(&fields, 9).max(0.0),
        points: parse_points(text(&fields, 10)),
        rotation: num(&fields, 11),
        hole_length: hole_length.max(0.0),
        is_plated: flag(&fields, 15),
    })
}

fn parse_track(line: &str) -> Option<EeFootprintTrack> {
    let fields = parse_raw_line(line);
    let points = parse_points(text(&fields, 4));
    if points.len() < 2 {
        return None;
    }
    Some(EeFootprintTrack {
        stroke_width: num(&fields, 1),
        layer_id: int(&fields, 2),
        points,
    })
}

fn parse_hole(line: &str) -> Option<EeFootprintHole> {
    let fields = parse_raw_line(line);
    let radius = num(&fields, 3);
    if fields.len() < 4 || radius <= 0.0 {
        return None;
    }
    Some(EeFootprintHole {
        center: DVec2::new(num(&fields, 1), num(&fields, 2)),
        radius,
    })
}

fn parse_via(line: &str) -> Option<EeFootprintVia> {
    let fields = parse_raw_line(line);
    if fields.len() < 6 {
        return None;
    }
    Some(EeFootprintVia {
        center: DVec2::new(num(&fields, 1), num(&fields, 2)),
        diameter: num(&fields, 3),
        hole_radius: num(&fields, 5),
    })
}

fn parse_circle(line: &str) -> Option<EeFootprintCircle> {
    let fields = parse_raw_line(line);
    if fields.len() < 6 {
        return None;
    }
    Some(EeFootprintCircle {
        center: DVec2::new(num(&fields, 1), num(&fields, 2)),
        radius: num(&fields, 3),
        stroke_width: num(&fields, 4),
        layer_id: int(&fields, 5),
    })
}

fn parse_arc(line: &str) -> Option<EeFootprintArc> {
    let fields = parse_raw_line(line);
    let path = text(&fields, 4).trim();
    if path.is_empty() {
        return None;
    }
    Some(EeFootprintArc {
        stroke_width: num(&fields, 1),
        layer_id: int(&fields, 2),
        path: path.to_string(),
    })
}

fn parse_rect(line: &str) -> Option<EeFootprintRect> {
    let fields = parse_raw_line(line);
    if fields.len() < 8 {
        return None;
    }
    Some(EeFootprintRect {
        position: DVec2::new(num(&fields, 1), num(&fields, 2)),
        width: num(&fields, 3),
        height: num(&fields, 4),
        stroke_width: num(&fields, 5),
        layer_id: int(&fields, 7),
    })
}

// [0]TEXT [1]type [2]x [3]y [4]stroke_width [5]rotation [6]mirror [7]layer
// [8]net [9]font_size [10]text [11]text_path [12]is_displayed [13]id
// [14]is_locked [15]align
fn parse_text(line: &str) -> Option<EeFootprintText> {
    let fields = parse_raw_line(line);
    if fields.len() < 11 {
        return None;
    }
    Some(EeFootprintText {
        text_type: text(&fields, 1).to_string(),
        position: DVec2::new(num(&fields, 2), num(&fields, 3)),
        stroke_width: num(&fields, 4),
        rotation: num(&fields, 5),
        mirrored: flag(&fields, 6),
        layer_id: int(&fields, 7),
        font_size: num(&fields, 9),
        text: text(&fields, 10).to_string(),
        visible: fields.len() <= 12 || !matches!(text(&fields, 12), "none" | "0"),
        align: TextAlign::from_easyeda(text(&fields, 15)),
    })
}

fn parse_solid_region(line: &str) -> Option<EeFootprintSolidRegion> {
    let fields = parse_raw_line(line);
    let path = text(&fields, 3).trim();
    if path.is_empty() {
        return None;
    }
    Some(EeFootprintSolidRegion {
        layer_id: int(&fields, 1),
        path: path.to_string(),
        region_type: text(&fields, 4).to_string(),
    })
}

// Helper structs for deserializing the nested JSON inside the SVGNODE string.
#[derive(Deserialize, Debug)]
struct SvgNode {
    attrs: SvgNodeAttrs,
}

#[derive(Deserialize, Debug)]
struct SvgNodeAttrs {
    uuid: String,
    title: String,
    #[serde(default)]
    c_origin: Option<String>,
    #[serde(default)]
    z: Option<String>,
    #[serde(default)]
    c_rotation: Option<String>,
}

fn split_floats(raw: &str) -> Vec<f64> {
    raw.split(',')
        .map(|s| s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0))
        .collect()
}

/// The line looks like `SVGNODE~{json}`; only the 3D model attributes matter.
fn parse_svg_node(line: &str) -> Option<Ee3dModel> {
    let (_, json_part) = line.split_once('~')?;
    let node: SvgNode = match serde_json::from_str(json_part) {
        Ok(node) => node,
        Err(e) => {
            log::debug!("Ignoring unreadable SVGNODE: {}", e);
            return None;
        }
    };
    let attrs = node.attrs;
    let origin = split_floats(attrs.c_origin.as_deref().unwrap_or("0,0"));
    let rotation = split_floats(attrs.c_rotation.as_deref().unwrap_or("0,0,0"));
    let at = |v: &[f64], i: usize| v.get(i).copied().unwrap_or(0.0);
    Some(Ee3dModel {
        name: attrs.title,
        uuid: attrs.uuid,
        origin: DVec2::new(at(&origin, 0), at(&origin, 1)),
        z: attrs
            .z
            .and_then(|z| z.trim().parse::<f64>().ok())
            .filter(|z| z.is_finite())
            .unwrap_or(0.0),
        rotation: DVec3::new(at(&rotation, 0), at(&rotation, 1), at(&rotation, 2)),
    })
}

pub fn parse_footprint_shapes<S: AsRef<str>>(
    info: EeFootprintInfo,
    origin: DVec2,
    lines: &[S],
) -> EeFootprint {
    let footprint = EeFootprint::from_shapes(
        info,
        origin,
        lines.iter().filter_map(|l| parse_footprint_shape(l.as_ref())),
    );
    log::debug!(
        "Parsed footprint '{}': {} pads, {} tracks, {} vias, {} holes",
        footprint.info.name,
        footprint.pads.len(),
        footprint.tracks.len(),
        footprint.vias.len(),
        footprint.holes.len()
    );
    footprint
}

// --- API JSON ---

/// `head.x` and friends arrive as either strings or numbers.
fn value_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        // Price ladders come as [[qty, price], ...]; the first tier is the unit price.
        Value::Array(tiers) => tiers.first().and_then(|tier| match tier {
            Value::Array(pair) => pair.get(1).and_then(value_price),
            other => value_price(other),
        }),
        _ => None,
    }
}

/// `dataStr` is either an object or a JSON document inside a string.
fn data_str(value: &Value) -> Result<Value> {
    match value {
        Value::String(s) => Ok(serde_json::from_str(s)?),
        Value::Null => Err(Error::MissingData("dataStr is missing".to_string())),
        other => Ok(other.clone()),
    }
}

fn shape_lines(data_str: &Value, what: &str) -> Result<Vec<String>> {
    let shapes = data_str["shape"]
        .as_array()
        .ok_or_else(|| Error::MissingData(format!("{} shape data is missing", what)))?;
    Ok(shapes
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}

fn head_origin(data_str: &Value) -> DVec2 {
    DVec2::new(
        value_f64(&data_str["head"]["x"]),
        value_f64(&data_str["head"]["y"]),
    )
}

const CONSUMED_PARAMS: &[&str] = &[
    "pre",
    "name",
    "package",
    "Manufacturer",
    "Manufacturer Part",
    "Supplier Part",
    "Supplier",
    "JLCPCB Part Class",
    "Datasheet",
    "Contributor",
    "link",
    "nameAlias",
];

fn extra_attributes(c_para: &Value) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    if let Some(map) = c_para.as_object() {
        for (key, value) in map {
            let lower = key.to_ascii_lowercase();
            if CONSUMED_PARAMS.contains(&key.as_str())
                || lower.starts_with("bom_")
                || lower.starts_with("spice")
            {
                continue;
            }
            if let Some(v) = value_string(value) {
                attributes.insert(key.clone(), v);
            }
        }
    }
    attributes
}

/// Builds a [`ComponentData`] from the `result` object of the EasyEDA
/// components API.
pub fn import_component_data(data: &Value) -> Result<ComponentData> {
    let symbol_data = data_str(&data["dataStr"])?;
    let c_para = &symbol_data["head"]["c_para"];
    let package_detail = &data["packageDetail"];
    let footprint_data = data_str(&package_detail["dataStr"])?;

    let footprint_name = value_string(&package_detail["title"])
        .or_else(|| value_string(&footprint_data["head"]["c_para"]["package"]))
        .unwrap_or_else(|| "UnknownFootprint".to_string());

    let info = ComponentInfo {
        name: value_string(&c_para["name"])
            .or_else(|| value_string(&data["title"]))
            .unwrap_or_else(|| "Unknown".to_string()),
        prefix: value_string(&c_para["pre"])
            .map(|p| p.trim_end_matches('?').to_string())
            .unwrap_or_else(|| "U".to_string()),
        package: value_string(&c_para["package"]).or_else(|| Some(footprint_name.clone())),
        category: value_string(&data["category"]).or_else(|| value_string(&c_para["Category"])),
        description: value_string(&data["description"]),
        manufacturer: value_string(&c_para["Manufacturer"]),
        mfr_part: value_string(&c_para["Manufacturer Part"]),
        lcsc_id: value_string(&data["lcsc"]["number"])
            .or_else(|| value_string(&c_para["Supplier Part"])),
        datasheet: value_string(&data["datasheet"]).or_else(|| value_string(&c_para["Datasheet"])),
        stock: value_u64(&data["lcsc"]["stock"]),
        price: value_price(&data["lcsc"]["price"]),
        process: value_string(&data["process"]),
        min_order_qty: value_u64(&data["lcsc"]["min"]),
        part_class: value_string(&c_para["JLCPCB Part Class"]),
        attributes: extra_attributes(c_para),
    };

    let symbol = parse_symbol_shapes(head_origin(&symbol_data), &shape_lines(&symbol_data, "Symbol")?);
    let footprint = parse_footprint_shapes(
        EeFootprintInfo {
            name: footprint_name,
        },
        head_origin(&footprint_data),
        &shape_lines(&footprint_data, "Footprint")?,
    );
    let model_3d = footprint.model_3d.clone();

    Ok(ComponentData {
        info,
        symbol,
        footprint,
        model_3d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_numeric_fields() {
        let fields = parse_raw_line("X~1.5~abc~~NaN");
        assert_eq!(num(&fields, 1), 1.5);
        assert_eq!(num(&fields, 2), 0.0);
        assert_eq!(num(&fields, 3), 0.0);
        assert_eq!(num(&fields, 4), 0.0);
        assert_eq!(num(&fields, 99), 0.0);
    }

    #[test]
    fn test_pin_segments() {
        let line = "P~show~1~1~340~300~180~gge7~0^^340~300^^M 340 300 h 10~#880000^^1~353.7~304~0~VCC~start~~~#0000FF^^1~348.5~299~0~7~end~~~#0000FF^^1~347~300^^0~M 350 303 L 353 300 L 350 297";
        let Some(SymbolShape::Pin(pin)) = parse_symbol_shape(line) else {
            panic!("expected pin");
        };
        assert_eq!(pin.number, "7");
        assert_eq!(pin.name, "VCC");
        assert_eq!(pin.electrical_type, ElectricalType::Input);
        assert_eq!(pin.position, DVec2::new(340.0, 300.0));
        assert_eq!(pin.rotation, 180.0);
        assert!((pin.pin_length - 10.0).abs() < 1e-9);
        assert!(pin.has_dot);
        assert!(!pin.has_clock);
    }

    #[test]
    fn test_unknown_and_malformed_lines_are_dropped() {
        assert!(parse_symbol_shape("ZZ~1~2").is_none());
        assert!(parse_symbol_shape("R~1").is_none());
        assert!(parse_footprint_shape("PAD~RECT~1").is_none());
        assert!(parse_footprint_shape("").is_none());
        assert!(parse_footprint_shape("SVGNODE~{not json").is_none());
    }

    #[test]
    fn test_slot_length_fallback_ignores_ids() {
        let Some(FootprintShape::Pad(pad)) =
            parse_footprint_shape("PAD~OVAL~0~0~10~20~11~~1~2~~0~gge12~8~~Y~0")
        else {
            panic!("expected pad");
        };
        assert_eq!(pad.hole_length, 8.0);
        assert!(pad.is_plated);
        assert!(!pad.is_smd());
    }

    #[test]
    fn test_svg_node_model() {
        let line = r#"SVGNODE~{"gId":"g1","nodeName":"g","nodeType":1,"layerid":"19","attrs":{"c_width":"10","c_height":"10","c_rotation":"0,0,90","z":"2","id":"g1","c_origin":"4000,3000","uuid":"abc123","title":"SOT-23-3_L2.9","layerid":"19"},"childNodes":[]}"#;
        let Some(FootprintShape::Model(model)) = parse_footprint_shape(line) else {
            panic!("expected model");
        };
        assert_eq!(model.uuid, "abc123");
        assert_eq!(model.origin, DVec2::new(4000.0, 3000.0));
        assert_eq!(model.rotation.z, 90.0);
        assert_eq!(model.z, 2.0);
    }
}
