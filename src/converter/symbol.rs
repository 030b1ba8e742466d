// src/converter/symbol.rs

use super::sanitize_name;
use super::templates::{SymbolTemplate, template_for};
use crate::category::{LibraryCategory, get_library_category};
use crate::easyeda_models::*;
use crate::kicad_models::*;
use crate::svg_arc::endpoint_to_center;
use crate::svg_path::{PathCommand, parse_path};
use crate::units::{flip_y_for_symbol, pin_rotation_to_kicad, to_millimeters};
use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};

/// Pin pitch of the DIP-style fallback layout.
const DIP_PIN_SPACING: f64 = 2.54;
/// Full body width of the DIP-style fallback layout.
const DIP_BODY_WIDTH: f64 = 12.7;
const DIP_PIN_LENGTH: f64 = 2.54;
const LABEL_GAP: f64 = 1.27;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolOptions {
    /// Overrides the symbol name; defaults to the sanitized component name.
    pub symbol_name: Option<String>,
    /// `Library:Footprint` reference written into the Footprint property.
    pub footprint_ref: Option<String>,
    pub include_datasheet: bool,
    pub include_manufacturer: bool,
}

impl Default for SymbolOptions {
    fn default() -> Self {
        Self {
            symbol_name: None,
            footprint_ref: None,
            include_datasheet: true,
            include_manufacturer: true,
        }
    }
}

/// Name the symbol will carry inside its library.
pub fn symbol_name(component: &ComponentData, options: &SymbolOptions) -> String {
    sanitize_name(options.symbol_name.as_deref().unwrap_or(&component.info.name))
}

/// Converts a component into a complete `.kicad_sym` library holding one symbol.
pub fn convert(component: &ComponentData, options: &SymbolOptions) -> String {
    KiSymbolLib {
        symbols: vec![to_ki_symbol(component, options)],
    }
    .to_string()
}

/// Converts a component into a single symbol block for merging into a library.
pub fn convert_to_symbol_entry(component: &ComponentData, options: &SymbolOptions) -> String {
    to_ki_symbol(component, options).to_string()
}

struct Layout {
    graphics: Vec<KiSymbolGraphic>,
    pins: Vec<KiSymbolPin>,
    reference_position: DVec2,
    value_position: DVec2,
    hide_pin_numbers: bool,
    hide_pin_names: bool,
    pin_name_offset: f64,
}

pub fn to_ki_symbol(component: &ComponentData, options: &SymbolOptions) -> KiSymbol {
    let info = &component.info;
    let category = library_category(info);
    let name = symbol_name(component, options);

    let layout = match template_for(category, &info.prefix) {
        Some(template) if component.symbol.pins.len() == 2 => {
            debug!("{}: template layout ({:?})", name, template.kind);
            template_layout(&template, &component.symbol)
        }
        Some(template) => {
            debug!(
                "{}: {:?} template needs 2 pins, DIP fallback for {}",
                name,
                template.kind,
                component.symbol.pins.len()
            );
            dip_layout(&component.symbol)
        }
        _ if component.symbol.has_graphics() => {
            debug!("{}: shape-preserving layout", name);
            shape_layout(&component.symbol)
        }
        _ => {
            debug!("{}: DIP fallback layout for {} pins", name, component.symbol.pins.len());
            dip_layout(&component.symbol)
        }
    };

    let reference = if info.prefix.trim().is_empty() {
        category.default_reference().to_string()
    } else {
        info.prefix.trim().to_string()
    };

    let mut properties = vec![
        KiProperty::visible("Reference", &reference, layout.reference_position, 0.0),
        KiProperty::visible("Value", &info.name, layout.value_position, 0.0),
    ];
    properties.extend(hidden_properties(info, category, options));

    KiSymbol {
        name,
        properties,
        hide_pin_numbers: layout.hide_pin_numbers,
        hide_pin_names: layout.hide_pin_names,
        pin_name_offset: layout.pin_name_offset,
        graphics: layout.graphics,
        pins: layout.pins,
    }
}

pub(crate) fn library_category(info: &ComponentInfo) -> LibraryCategory {
    get_library_category(
        Some(info.prefix.as_str()),
        info.category.as_deref(),
        info.description.as_deref(),
    )
}

fn pin_sort_key(pin: &EeSymbolPin) -> (u64, String) {
    let number = pin.number.trim();
    (number.parse().unwrap_or(u64::MAX), number.to_string())
}

fn sorted_pins(symbol: &EeSymbol) -> Vec<&EeSymbolPin> {
    let mut pins: Vec<&EeSymbolPin> = symbol.pins.iter().collect();
    pins.sort_by_key(|p| pin_sort_key(p));
    pins
}

fn template_layout(template: &SymbolTemplate, symbol: &EeSymbol) -> Layout {
    let half = template.half_spacing();
    let placements = [(half, 270.0), (-half, 90.0)];
    let pins = sorted_pins(symbol)
        .into_iter()
        .zip(placements)
        .map(|(pin, (y, rotation))| KiSymbolPin {
            name: pin.name.clone(),
            number: pin.number.clone(),
            electrical_type: ElectricalType::Passive,
            style: KiPinStyle::Line,
            position: DVec2::new(0.0, y),
            rotation,
            length: template.pin_length,
        })
        .collect();

    Layout {
        graphics: template.graphics(),
        pins,
        reference_position: template.reference_position,
        value_position: template.value_position,
        hide_pin_numbers: true,
        hide_pin_names: true,
        pin_name_offset: 0.0,
    }
}

fn fill_of(filled: bool) -> KiFill {
    if filled { KiFill::Background } else { KiFill::None }
}

fn shape_layout(symbol: &EeSymbol) -> Layout {
    let origin = symbol.origin;
    let conv = |p: DVec2| flip_y_for_symbol(p, origin);
    let mut graphics = Vec::new();

    for rect in &symbol.rectangles {
        graphics.push(KiSymbolGraphic::Rectangle {
            start: conv(rect.position),
            end: conv(rect.position + DVec2::new(rect.width, rect.height)),
            stroke_width: to_millimeters(rect.stroke_width),
            fill: fill_of(rect.filled),
        });
    }
    for circle in &symbol.circles {
        graphics.push(KiSymbolGraphic::Circle {
            center: conv(circle.center),
            radius: to_millimeters(circle.radius),
            stroke_width: to_millimeters(circle.stroke_width),
            fill: fill_of(circle.filled),
        });
    }
    // KiCad symbols have no ellipse primitive.
    for ellipse in &symbol.ellipses {
        graphics.push(KiSymbolGraphic::Circle {
            center: conv(ellipse.center),
            radius: to_millimeters((ellipse.rx + ellipse.ry) / 2.0),
            stroke_width: to_millimeters(ellipse.stroke_width),
            fill: fill_of(ellipse.filled),
        });
    }
    for polyline in &symbol.polylines {
        if polyline.points.len() < 2 {
            continue;
        }
        graphics.push(KiSymbolGraphic::Polyline {
            points: polyline.points.iter().map(|p| conv(*p)).collect(),
            stroke_width: to_millimeters(polyline.stroke_width),
            fill: fill_of(polyline.filled),
        });
    }
    for polygon in &symbol.polygons {
        if polygon.points.len() < 2 {
            continue;
        }
        let mut points: Vec<DVec2> = polygon.points.iter().map(|p| conv(*p)).collect();
        if points.first() != points.last() {
            points.push(points[0]);
        }
        graphics.push(KiSymbolGraphic::Polyline {
            points,
            stroke_width: to_millimeters(polygon.stroke_width),
            fill: fill_of(polygon.filled),
        });
    }
    for path in symbol.arcs.iter().chain(&symbol.paths) {
        graphics.extend(path_graphics(path, &conv));
    }

    let pins: Vec<KiSymbolPin> = symbol
        .pins
        .iter()
        .map(|pin| KiSymbolPin {
            name: pin.name.clone(),
            number: pin.number.clone(),
            electrical_type: pin.electrical_type,
            style: KiPinStyle::from_flags(pin.has_dot, pin.has_clock),
            position: conv(pin.position),
            rotation: pin_rotation_to_kicad(pin.rotation),
            length: to_millimeters(pin.pin_length),
        })
        .collect();

    let (min, max) = bounds(&graphics, &pins);
    let center_x = (min.x + max.x) / 2.0;
    Layout {
        reference_position: DVec2::new(center_x, max.y + LABEL_GAP),
        value_position: DVec2::new(center_x, min.y - LABEL_GAP),
        hide_pin_numbers: false,
        hide_pin_names: !symbol.pins.iter().any(|p| p.has_descriptive_name()),
        pin_name_offset: 0.508,
        graphics,
        pins,
    }
}

/// Splits an SVG path into KiCad arcs (for elliptical arc segments) and
/// polylines (for everything else, curves reduced to their end points).
fn path_graphics(path: &EeSymbolPath, conv: &impl Fn(DVec2) -> DVec2) -> Vec<KiSymbolGraphic> {
    let stroke_width = to_millimeters(path.stroke_width);
    let mut out = Vec::new();
    let mut run: Vec<DVec2> = Vec::new();
    let mut subpath_start: Option<DVec2> = None;

    let flush = |run: &mut Vec<DVec2>, out: &mut Vec<KiSymbolGraphic>| {
        if run.len() >= 2 {
            out.push(KiSymbolGraphic::Polyline {
                points: run.iter().map(|p| conv(*p)).collect(),
                stroke_width,
                fill: fill_of(path.filled),
            });
        }
        let last = run.last().copied();
        run.clear();
        run.extend(last);
    };

    for command in parse_path(&path.path) {
        match command {
            PathCommand::MoveTo(p) => {
                flush(&mut run, &mut out);
                run.clear();
                run.push(p);
                subpath_start = Some(p);
            }
            PathCommand::LineTo(end)
            | PathCommand::CubicTo { end, .. }
            | PathCommand::QuadTo { end, .. } => run.push(end),
            PathCommand::ArcTo {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                end,
            } => {
                let Some(&start) = run.last() else {
                    continue;
                };
                match endpoint_to_center(start, rx, ry, x_axis_rotation, large_arc, sweep, end) {
                    Some(arc) => {
                        flush(&mut run, &mut out);
                        out.push(KiSymbolGraphic::Arc {
                            start: conv(start),
                            mid: conv(arc.mid_point()),
                            end: conv(end),
                            stroke_width,
                        });
                        run.clear();
                        run.push(end);
                    }
                    None => run.push(end),
                }
            }
            PathCommand::Close => {
                if let Some(start) = subpath_start {
                    run.push(start);
                }
                flush(&mut run, &mut out);
            }
        }
    }
    flush(&mut run, &mut out);
    out
}

fn dip_layout(symbol: &EeSymbol) -> Layout {
    let pins = sorted_pins(symbol);
    let left_count = pins.len().div_ceil(2);
    let rows = left_count.max(1);
    let half_width = DIP_BODY_WIDTH / 2.0;
    let top = (rows - 1) as f64 * DIP_PIN_SPACING / 2.0;
    let body_top = top + DIP_PIN_SPACING;

    let ki_pins = pins
        .iter()
        .enumerate()
        .map(|(i, pin)| {
            let (position, rotation) = if i < left_count {
                (
                    DVec2::new(
                        -(half_width + DIP_PIN_LENGTH),
                        top - i as f64 * DIP_PIN_SPACING,
                    ),
                    0.0,
                )
            } else {
                let j = i - left_count;
                (
                    DVec2::new(
                        half_width + DIP_PIN_LENGTH,
                        -top + j as f64 * DIP_PIN_SPACING,
                    ),
                    180.0,
                )
            };
            KiSymbolPin {
                name: pin.name.clone(),
                number: pin.number.clone(),
                electrical_type: pin.electrical_type,
                style: KiPinStyle::from_flags(pin.has_dot, pin.has_clock),
                position,
                rotation,
                length: DIP_PIN_LENGTH,
            }
        })
        .collect();

    Layout {
        graphics: vec![KiSymbolGraphic::Rectangle {
            start: DVec2::new(-half_width, body_top),
            end: DVec2::new(half_width, -body_top),
            stroke_width: 0.254,
            fill: KiFill::Background,
        }],
        pins: ki_pins,
        reference_position: DVec2::new(0.0, body_top + LABEL_GAP),
        value_position: DVec2::new(0.0, -body_top - LABEL_GAP),
        hide_pin_numbers: false,
        hide_pin_names: false,
        pin_name_offset: 1.016,
    }
}

fn bounds(graphics: &[KiSymbolGraphic], pins: &[KiSymbolPin]) -> (DVec2, DVec2) {
    let points = graphics
        .iter()
        .flat_map(|g| g.extent_points())
        .chain(pins.iter().map(|p| p.position));
    let mut min = DVec2::splat(f64::INFINITY);
    let mut max = DVec2::splat(f64::NEG_INFINITY);
    for p in points {
        min = min.min(p);
        max = max.max(p);
    }
    if min.x > max.x {
        (DVec2::ZERO, DVec2::ZERO)
    } else {
        (min, max)
    }
}

fn lcsc_product_url(lcsc_id: &str) -> String {
    format!("https://www.lcsc.com/product-detail/{}.html", lcsc_id)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn hidden_properties(
    info: &ComponentInfo,
    category: LibraryCategory,
    options: &SymbolOptions,
) -> Vec<KiProperty> {
    let lcsc_id = non_empty(info.lcsc_id.as_deref());
    let mut fields: Vec<(String, String)> = Vec::new();
    let mut push = |key: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            fields.push((key.to_string(), value));
        }
    };

    push("Footprint", options.footprint_ref.clone());
    if options.include_datasheet {
        let datasheet = non_empty(info.datasheet.as_deref())
            .map(String::from)
            .or_else(|| lcsc_id.map(lcsc_product_url));
        push("Datasheet", datasheet);
    }
    push("Description", info.description.clone());
    push("LCSC", lcsc_id.map(String::from));
    if options.include_manufacturer {
        push("Manufacturer", info.manufacturer.clone());
    }
    push("Category", Some(category.name().to_string()));
    push("ki_keywords", lcsc_id.map(String::from));
    push("Stock", info.stock.map(|s| s.to_string()));
    push("Price", info.price.map(|p| p.to_string()));
    push("Process", info.process.clone());
    push("MinOrderQty", info.min_order_qty.map(|q| q.to_string()));
    push("Class", info.part_class.clone());
    push("Part", info.mfr_part.clone());

    let mut properties: Vec<KiProperty> = fields
        .iter()
        .map(|(k, v)| KiProperty::hidden(k, v))
        .collect();
    for (key, value) in &info.attributes {
        let taken = key == "Reference"
            || key == "Value"
            || properties.iter().any(|p| &p.key == key);
        if !taken && !value.trim().is_empty() {
            properties.push(KiProperty::hidden(key, value));
        }
    }
    properties
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(number: &str, x: f64, y: f64, rotation: f64) -> EeSymbolPin {
        EeSymbolPin {
            number: number.to_string(),
            name: format!("P{}", number),
            electrical_type: ElectricalType::Input,
            position: DVec2::new(x, y),
            rotation,
            pin_length: 10.0,
            has_dot: false,
            has_clock: false,
        }
    }

    fn component(prefix: &str, symbol: EeSymbol) -> ComponentData {
        ComponentData {
            info: ComponentInfo {
                name: "Part".to_string(),
                prefix: prefix.to_string(),
                lcsc_id: Some("C1234".to_string()),
                ..Default::default()
            },
            symbol,
            ..Default::default()
        }
    }

    #[test]
    fn test_dip_fallback_wraps_pins() {
        let symbol = EeSymbol {
            pins: (1..=4).rev().map(|n| pin(&n.to_string(), 0.0, 0.0, 0.0)).collect(),
            ..Default::default()
        };
        let ki = to_ki_symbol(&component("U", symbol), &SymbolOptions::default());
        let by_number = |n: &str| ki.pins.iter().find(|p| p.number == n).unwrap();
        // 1, 2 down the left side; 3, 4 up the right side.
        assert!(by_number("1").position.x < 0.0 && by_number("2").position.x < 0.0);
        assert!(by_number("1").position.y > by_number("2").position.y);
        assert!(by_number("3").position.x > 0.0);
        assert!(by_number("3").position.y < by_number("4").position.y);
        assert_eq!(by_number("3").rotation, 180.0);
        assert_eq!(by_number("1").position.x, -(6.35 + 2.54));
    }

    #[test]
    fn test_three_pin_led_skips_its_graphics() {
        let symbol = EeSymbol {
            origin: DVec2::new(400.0, 300.0),
            pins: vec![
                pin("1", 380.0, 290.0, 180.0),
                pin("2", 380.0, 310.0, 180.0),
                pin("3", 420.0, 300.0, 0.0),
            ],
            rectangles: vec![EeSymbolRectangle {
                position: DVec2::new(390.0, 290.0),
                width: 20.0,
                height: 20.0,
                stroke_width: 1.0,
                filled: false,
            }],
            ..Default::default()
        };
        let c = component("LED", symbol);
        let ki = to_ki_symbol(&c, &SymbolOptions::default());
        assert_eq!(ki.pins.len(), 3);
        assert!(ki.pins.iter().all(|p| p.position.x.abs() == 6.35 + 2.54));
        let text = ki.to_string();
        assert!(text.contains("(rectangle (start -6.35 "));
        assert!(!text.contains("(start -2.54 2.54) (end 2.54 -2.54)"));

        // With exactly two pins the same part still gets the template.
        let mut two = c.clone();
        two.symbol.pins.pop();
        let ki = to_ki_symbol(&two, &SymbolOptions::default());
        assert!(ki.pins.iter().all(|p| p.position.x == 0.0));
    }

    #[test]
    fn test_shape_layout_flips_y_and_rotates_pins() {
        let symbol = EeSymbol {
            origin: DVec2::new(400.0, 300.0),
            pins: vec![pin("1", 380.0, 290.0, 180.0)],
            rectangles: vec![EeSymbolRectangle {
                position: DVec2::new(390.0, 280.0),
                width: 20.0,
                height: 40.0,
                stroke_width: 1.0,
                filled: true,
            }],
            ..Default::default()
        };
        let ki = to_ki_symbol(&component("U", symbol), &SymbolOptions::default());
        let p = &ki.pins[0];
        assert!((p.position.x + 5.08).abs() < 1e-9);
        assert!((p.position.y - 2.54).abs() < 1e-9);
        assert_eq!(p.rotation, 0.0);
        let text = ki.to_string();
        assert!(text.contains("(symbol \"Part_0_1\""));
        assert!(text.contains("(rectangle (start -2.54 5.08) (end 2.54 -5.08)"));
    }

    #[test]
    fn test_properties_are_never_empty() {
        let mut c = component("U", EeSymbol::default());
        c.info.manufacturer = Some("  ".to_string());
        c.info.attributes.insert("Voltage".to_string(), "5V".to_string());
        c.info.attributes.insert("Empty".to_string(), String::new());
        let text = convert_to_symbol_entry(&c, &SymbolOptions::default());
        assert!(!text.contains("\"Manufacturer\""));
        assert!(!text.contains("\"Empty\""));
        assert!(text.contains("(property \"Voltage\" \"5V\""));
        assert!(text.contains("https://www.lcsc.com/product-detail/C1234.html"));
        assert!(text.contains("(property \"ki_keywords\" \"C1234\""));
    }

    #[test]
    fn test_arc_path_becomes_three_point_arc() {
        let path = EeSymbolPath {
            path: "M 390 300 A 10 10 0 0 1 410 300".to_string(),
            stroke_width: 1.0,
            filled: false,
        };
        let origin = DVec2::new(400.0, 300.0);
        let graphics = path_graphics(&path, &|p| flip_y_for_symbol(p, origin));
        assert_eq!(graphics.len(), 1);
        let KiSymbolGraphic::Arc { start, mid, end, .. } = graphics[0] else {
            panic!("expected arc");
        };
        assert!((start.x + 2.54).abs() < 1e-9);
        assert!((end.x - 2.54).abs() < 1e-9);
        assert!(mid.x.abs() < 1e-9);
        assert!((mid.y.abs() - 2.54).abs() < 1e-9);
    }
}
