//! Reads reference geometry out of a rendered component SVG.
//!
//! Pads, vias, holes and pins are `<g>` groups tagged with `c_partid`; their
//! shape is whatever SVG primitive they nest. Hole children carry
//! `c_etype="pad_hole"` or `c_etype="via_hole"`. Pin and pad numbers come from
//! a `number` attribute on the group, or from a `<text c_etype="pinnum">`
//! child (`pinname` for the pin name).

use super::{Bounds, FootprintData, HoleInfo, PadInfo, PinInfo, SymbolData, ViaInfo};
use crate::svg_path::{PathCommand, flatten_path, parse_path};
use crate::units::{normalize_degrees, to_millimeters};
use glam::DVec2;
use roxmltree::{Document, Node};

/// One drawable primitive, in raw SVG units.
#[derive(Debug, Clone, PartialEq)]
enum SvgShape {
    Circle { center: DVec2, r: f64 },
    Ellipse { center: DVec2, rx: f64, ry: f64 },
    Rect { bounds: Bounds },
    Polygon { points: Vec<DVec2> },
    Path { points: Vec<DVec2>, has_arcs: bool },
}

impl SvgShape {
    fn from_node(node: Node) -> Option<Self> {
        match node.tag_name().name() {
            "circle" => Some(SvgShape::Circle {
                center: DVec2::new(attr(node, "cx")?, attr(node, "cy")?),
                r: attr(node, "r")?,
            }),
            "ellipse" => Some(SvgShape::Ellipse {
                center: DVec2::new(attr(node, "cx")?, attr(node, "cy")?),
                rx: attr(node, "rx")?,
                ry: attr(node, "ry")?,
            }),
            "rect" => {
                let min = DVec2::new(attr(node, "x").unwrap_or(0.0), attr(node, "y").unwrap_or(0.0));
                let size = DVec2::new(attr(node, "width")?, attr(node, "height")?);
                Bounds::from_points([min, min + size]).map(|bounds| SvgShape::Rect { bounds })
            }
            "polygon" | "polyline" => {
                let points = parse_points(node.attribute("points")?);
                (!points.is_empty()).then_some(SvgShape::Polygon { points })
            }
            "path" => {
                let commands = parse_path(node.attribute("d")?);
                let has_arcs = commands
                    .iter()
                    .any(|c| matches!(c, PathCommand::ArcTo { .. }));
                let points: Vec<DVec2> = flatten_path(&commands, Some(4)).concat();
                (!points.is_empty()).then_some(SvgShape::Path { points, has_arcs })
            }
            _ => None,
        }
    }

    fn bounds(&self) -> Option<Bounds> {
        match self {
            SvgShape::Circle { center, r } => {
                Bounds::from_points([*center - DVec2::splat(*r), *center + DVec2::splat(*r)])
            }
            SvgShape::Ellipse { center, rx, ry } => {
                let half = DVec2::new(*rx, *ry);
                Bounds::from_points([*center - half, *center + half])
            }
            SvgShape::Rect { bounds } => Some(*bounds),
            SvgShape::Polygon { points } | SvgShape::Path { points, .. } => {
                Bounds::from_points(points.iter().copied())
            }
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            SvgShape::Circle { .. } => "circle",
            SvgShape::Ellipse { rx, ry, .. } if (rx - ry).abs() < 1e-6 => "circle",
            SvgShape::Ellipse { .. } => "oval",
            SvgShape::Rect { .. } => "rect",
            SvgShape::Polygon { .. } => "polygon",
            SvgShape::Path { has_arcs: true, .. } => "oval",
            SvgShape::Path { .. } => "polygon",
        }
    }

    /// Radius of a drill drawn as this shape; the narrower axis for slots.
    fn hole_radius(&self) -> Option<f64> {
        match self {
            SvgShape::Circle { r, .. } => Some(*r),
            other => other.bounds().map(|b| b.width().min(b.height()) / 2.0),
        }
    }
}

fn attr(node: Node, name: &str) -> Option<f64> {
    node.attribute(name)?.trim().parse().ok()
}

fn parse_points(text: &str) -> Vec<DVec2> {
    let numbers: Vec<f64> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    numbers
        .chunks_exact(2)
        .map(|pair| DVec2::new(pair[0], pair[1]))
        .collect()
}

fn etype<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.attribute("c_etype")
}

/// Primitive children of a group, split into body shapes and the tagged hole.
fn group_shapes(group: Node, hole_tag: &str) -> (Vec<SvgShape>, Option<SvgShape>) {
    let mut body = Vec::new();
    let mut hole = None;
    for child in group.descendants().skip(1).filter(Node::is_element) {
        let Some(shape) = SvgShape::from_node(child) else {
            continue;
        };
        if etype(child) == Some(hole_tag) {
            if hole.is_none() {
                hole = Some(shape);
            }
        } else {
            body.push(shape);
        }
    }
    (body, hole)
}

fn child_text(group: Node, tag: &str) -> Option<String> {
    group
        .descendants()
        .filter(|n| n.has_tag_name("text") && etype(*n) == Some(tag))
        .find_map(|n| {
            let text: String = n
                .descendants()
                .filter(Node::is_text)
                .filter_map(|t| t.text())
                .collect();
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
}

fn group_number(group: Node) -> String {
    group
        .attribute("number")
        .map(str::to_string)
        .or_else(|| child_text(group, "pinnum"))
        .unwrap_or_default()
}

fn tagged_groups<'a, 'input>(
    doc: &'a Document<'input>,
    part: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    doc.descendants()
        .filter(move |n| n.is_element() && n.attribute("c_partid") == Some(part))
}

fn mm(point: DVec2) -> DVec2 {
    DVec2::new(to_millimeters(point.x), to_millimeters(point.y))
}

fn extract_pad(group: Node) -> Option<PadInfo> {
    let (body, hole) = group_shapes(group, "pad_hole");
    let shape = body.first()?;
    let bounds = shape.bounds()?;
    let center = mm(bounds.center());
    let shape_name = group
        .attribute("c_shape")
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| shape.shape_name().to_string());
    let hole_radius = hole
        .as_ref()
        .and_then(SvgShape::hole_radius)
        .map(to_millimeters);

    Some(PadInfo {
        number: group_number(group),
        shape: shape_name,
        x: center.x,
        y: center.y,
        width: to_millimeters(bounds.width()),
        height: to_millimeters(bounds.height()),
        rotation: attr(group, "rotation").unwrap_or(0.0),
        has_hole: hole_radius.is_some(),
        hole_radius: hole_radius.unwrap_or(0.0),
        layer_id: attr(group, "layerid")
            .map(|l| l as i32)
            .unwrap_or(if hole_radius.is_some() { 11 } else { 1 }),
    })
}

fn extract_via(group: Node) -> Option<ViaInfo> {
    let (body, hole) = group_shapes(group, "via_hole");
    let bounds = body.first()?.bounds()?;
    let center = mm(bounds.center());
    Some(ViaInfo {
        x: center.x,
        y: center.y,
        diameter: to_millimeters(bounds.width().max(bounds.height())),
        hole_radius: hole
            .as_ref()
            .and_then(SvgShape::hole_radius)
            .map(to_millimeters)
            .unwrap_or(0.0),
    })
}

fn extract_hole(group: Node) -> Option<HoleInfo> {
    let (body, hole) = group_shapes(group, "pad_hole");
    let shape = hole.or_else(|| body.into_iter().next())?;
    let center = mm(shape.bounds()?.center());
    Some(HoleInfo {
        x: center.x,
        y: center.y,
        radius: to_millimeters(shape.hole_radius()?),
    })
}

/// Canonical footprint records from a reference SVG, centered on the pad bounding box.
pub fn extract_from_svg_footprint(svg: &str) -> Result<FootprintData, roxmltree::Error> {
    let doc = Document::parse(svg)?;
    let mut data = FootprintData {
        pads: tagged_groups(&doc, "part_pad").filter_map(extract_pad).collect(),
        vias: tagged_groups(&doc, "part_via").filter_map(extract_via).collect(),
        holes: tagged_groups(&doc, "part_hole").filter_map(extract_hole).collect(),
        ..Default::default()
    };
    data.center_on_pads();
    Ok(data)
}

fn extract_pin(group: Node) -> Option<PinInfo> {
    let path = group
        .descendants()
        .filter(|n| n.has_tag_name("path"))
        .find_map(|n| n.attribute("d"))?;
    let points: Vec<DVec2> = flatten_path(&parse_path(path), None).concat();
    let flip = |p: DVec2| mm(DVec2::new(p.x, -p.y));
    let start = flip(*points.first()?);
    let end = flip(*points.last()?);
    let along = end - start;
    let rotation = if along.length() > 0.0 {
        normalize_degrees(along.y.atan2(along.x).to_degrees().round())
    } else {
        0.0
    };

    Some(PinInfo {
        number: group_number(group),
        name: group
            .attribute("name")
            .map(str::to_string)
            .or_else(|| child_text(group, "pinname"))
            .unwrap_or_default(),
        x: start.x,
        y: start.y,
        rotation,
        length: along.length(),
    })
}

/// Canonical pin records from a reference symbol SVG, Y pointing up.
pub fn extract_from_svg_symbol(svg: &str) -> Result<SymbolData, roxmltree::Error> {
    let doc = Document::parse(svg)?;
    let mut data = SymbolData {
        pins: tagged_groups(&doc, "part_pin").filter_map(extract_pin).collect(),
        ..Default::default()
    };
    data.compute_bounds();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTPRINT_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
        <g c_partid="part_pad" number="1" layerid="1">
            <polygon points="390 295 400 295 400 305 390 305"/>
        </g>
        <g c_partid="part_pad" number="2">
            <circle cx="420" cy="300" r="5"/>
            <circle c_etype="pad_hole" cx="420" cy="300" r="2"/>
        </g>
        <g c_partid="part_via">
            <circle cx="405" cy="320" r="2"/>
            <circle c_etype="via_hole" cx="405" cy="320" r="1"/>
        </g>
        <g c_partid="part_hole"><circle cx="405" cy="280" r="3"/></g>
    </svg>"#;

    #[test]
    fn test_footprint_groups_are_centered() {
        let data = extract_from_svg_footprint(FOOTPRINT_SVG).unwrap();
        assert_eq!(data.pads.len(), 2);
        assert_eq!(data.vias.len(), 1);
        assert_eq!(data.holes.len(), 1);

        // Pad bbox spans x 390..425, y 295..305, centered at (407.5, 300).
        let pad1 = &data.pads[0];
        assert_eq!(pad1.number, "1");
        assert_eq!(pad1.shape, "polygon");
        assert!((pad1.x - (395.0 - 407.5) * 0.254).abs() < 1e-9);
        assert!(pad1.y.abs() < 1e-9);
        assert!((pad1.width - 2.54).abs() < 1e-9);
        assert!(!pad1.has_hole);

        let pad2 = &data.pads[1];
        assert!(pad2.has_hole);
        assert!((pad2.hole_radius - 0.508).abs() < 1e-9);
        assert_eq!(pad2.layer_id, 11);

        assert!((data.vias[0].diameter - 1.016).abs() < 1e-9);
        assert!((data.holes[0].radius - 0.762).abs() < 1e-9);
        // Y is kept as drawn: the hole sits above the pads.
        assert!(data.holes[0].y < 0.0);
        assert!((data.bounds.center()).length() < 1e-9);
    }

    #[test]
    fn test_symbol_pins_flip_y() {
        let svg = r#"<svg>
            <g c_partid="part_pin">
                <path d="M 400 300 h -10"/>
                <text c_etype="pinname">VCC</text>
                <text c_etype="pinnum">1</text>
            </g>
        </svg>"#;
        let data = extract_from_svg_symbol(svg).unwrap();
        let pin = &data.pins[0];
        assert_eq!(pin.number, "1");
        assert_eq!(pin.name, "VCC");
        assert!((pin.x - 101.6).abs() < 1e-9);
        assert!((pin.y + 76.2).abs() < 1e-9);
        assert!((pin.length - 2.54).abs() < 1e-9);
        assert_eq!(pin.rotation, 180.0);
    }

    #[test]
    fn test_malformed_svg_is_an_error() {
        assert!(extract_from_svg_footprint("<svg><g></svg>").is_err());
    }
}
