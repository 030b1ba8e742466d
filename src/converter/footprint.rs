// src/converter/footprint.rs

use super::{map_layer, map_pad_layers, map_pad_shape, sanitize_name};
use crate::easyeda_models::*;
use crate::footprint_mapper::{
    FootprintMapping, map_to_kicad_footprint, map_to_kicad_footprint_extended,
};
use crate::kicad_models::*;
use crate::svg_arc::endpoint_to_center;
use crate::svg_path::{PathCommand, flatten_path, parse_path};
use crate::units::{angle_to_kicad, flip_none_for_footprint, normalize_degrees, to_millimeters};
use glam::{DVec2, DVec3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const COURTYARD_MARGIN: f64 = 0.25;
const LABEL_OFFSET: f64 = 1.75;
/// Fraction of a plated polygon pad's smaller dimension used as its drill.
const POLYGON_DRILL_RATIO: f64 = 0.6;
const REGION_ARC_SEGMENTS_PER_QUARTER: u32 = 4;
/// EasyEDA-internal helper layers that never reach the board.
const HELPER_LAYERS: [i32; 3] = [99, 100, 101];
const CUSTOM_PAD_ANCHOR: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintOptions {
    /// Overrides the footprint name; defaults to the EasyEDA package name.
    pub footprint_name: Option<String>,
    pub include_3d_model: bool,
    /// Directory written in front of the model file name.
    pub model_path_prefix: String,
    /// Also accept diode/LED chips and named package families as built-ins.
    pub extended_mapping: bool,
}

impl Default for FootprintOptions {
    fn default() -> Self {
        Self {
            footprint_name: None,
            include_3d_model: true,
            model_path_prefix: "${KIPRJMOD}/JLC-MCP.3dshapes".to_string(),
            extended_mapping: false,
        }
    }
}

/// Outcome of the built-in-versus-generated footprint policy.
#[derive(Debug, Clone, PartialEq)]
pub enum FootprintResult {
    /// Use a footprint from KiCad's own libraries.
    Reference { mapping: FootprintMapping },
    /// Write `content` as `<name>.kicad_mod`.
    Generated { name: String, content: String },
}

impl FootprintResult {
    /// `Library:Footprint` as written into the symbol.
    pub fn footprint_ref(&self, generated_library: &str) -> String {
        match self {
            FootprintResult::Reference { mapping } => mapping.reference(),
            FootprintResult::Generated { name, .. } => format!("{}:{}", generated_library, name),
        }
    }
}

pub fn footprint_name(component: &ComponentData, options: &FootprintOptions) -> String {
    let fallback = if component.footprint.info.name.trim().is_empty() {
        component.info.package.as_deref().unwrap_or(&component.info.name)
    } else {
        &component.footprint.info.name
    };
    sanitize_name(options.footprint_name.as_deref().unwrap_or(fallback))
}

/// Always generates a footprint from the EasyEDA shapes.
pub fn convert(component: &ComponentData, options: &FootprintOptions) -> String {
    to_ki_footprint(component, options).to_string()
}

/// Uses a built-in footprint when the mapper allows it and the pad count
/// agrees, otherwise generates one. The strict mapper is used unless
/// `extended_mapping` is set.
pub fn get_footprint(component: &ComponentData, options: &FootprintOptions) -> FootprintResult {
    let package = component
        .info
        .package
        .as_deref()
        .unwrap_or(&component.footprint.info.name);
    let mapper = if options.extended_mapping {
        map_to_kicad_footprint_extended
    } else {
        map_to_kicad_footprint
    };
    if let Some(mapping) = mapper(package, &component.info.prefix) {
        let expected = mapping.expected_pad_count();
        let actual = component.footprint.pads.len();
        if expected == actual {
            debug!("Using built-in footprint {}", mapping.reference());
            return FootprintResult::Reference { mapping };
        }
        warn!(
            "Built-in footprint {} expects {} pads but {} has {}, generating instead",
            mapping.reference(),
            expected,
            component.info.name,
            actual
        );
    }
    FootprintResult::Generated {
        name: footprint_name(component, options),
        content: convert(component, options),
    }
}

struct Bounds {
    min: DVec2,
    max: DVec2,
}

impl Bounds {
    fn new() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    fn add(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    fn add_box(&mut self, center: DVec2, size: DVec2) {
        self.add(center - size / 2.0);
        self.add(center + size / 2.0);
    }

    fn finish(self) -> (DVec2, DVec2) {
        if self.min.x > self.max.x {
            (DVec2::splat(-0.5), DVec2::splat(0.5))
        } else {
            (self.min, self.max)
        }
    }
}

fn polygon_extent(points: &[DVec2]) -> DVec2 {
    let mut bounds = Bounds::new();
    for p in points {
        bounds.add(*p);
    }
    let (min, max) = bounds.finish();
    max - min
}

/// Slot drill aligned with the longer pad axis.
fn slot_drill(pad: &EeFootprintPad) -> Drill {
    let diameter = to_millimeters(pad.hole_radius * 2.0);
    let length = to_millimeters(pad.hole_length);
    let longest = diameter.max(length);
    let vertical = to_millimeters(pad.height) - longest > to_millimeters(pad.width) - longest;
    if vertical {
        Drill::Oval(diameter, length)
    } else {
        Drill::Oval(length, diameter)
    }
}

fn convert_pad(pad: &EeFootprintPad, conv: &impl Fn(DVec2) -> DVec2) -> FpPad {
    let pos = conv(pad.center);
    let smd = pad.is_smd();
    let polygon = pad.shape == PadShape::Polygon && pad.points.len() >= 3;

    // Polygon outline relative to the pad center, rotation not applied.
    let outline: Vec<DVec2> = if polygon {
        pad.points.iter().map(|p| conv(*p) - pos).collect()
    } else {
        Vec::new()
    };

    let drill = if smd {
        None
    } else if pad.hole_radius > 0.0 && pad.hole_length > 0.0 {
        Some(slot_drill(pad))
    } else if pad.hole_radius > 0.0 {
        Some(Drill::Round(to_millimeters(pad.hole_radius * 2.0)))
    } else {
        let extent = if polygon {
            polygon_extent(&outline)
        } else {
            DVec2::new(to_millimeters(pad.width), to_millimeters(pad.height))
        };
        Some(Drill::Round(extent.min_element() * POLYGON_DRILL_RATIO))
    };

    let (shape, size, rotation, primitives) = if polygon {
        (
            FpShape::Custom,
            DVec2::splat(CUSTOM_PAD_ANCHOR),
            0.0,
            vec![outline],
        )
    } else {
        let shape = match map_pad_shape(pad.shape) {
            FpShape::Custom => FpShape::Rect,
            other => other,
        };
        (
            shape,
            DVec2::new(to_millimeters(pad.width), to_millimeters(pad.height))
                .max(DVec2::splat(0.01)),
            angle_to_kicad(pad.rotation),
            Vec::new(),
        )
    };

    FpPad {
        number: pad.number.clone(),
        pad_type: if smd { PadType::Smd } else { PadType::ThroughHole },
        shape,
        pos,
        rotation,
        size,
        layers: map_pad_layers(pad.layer_id, smd),
        drill,
        primitives,
    }
}

fn through_hole_layers() -> Vec<String> {
    vec!["*.Cu".to_string(), "*.Mask".to_string()]
}

fn convert_hole(hole: &EeFootprintHole, conv: &impl Fn(DVec2) -> DVec2) -> FpPad {
    let diameter = to_millimeters(hole.radius * 2.0);
    FpPad {
        number: String::new(),
        pad_type: PadType::NpThroughHole,
        shape: FpShape::Circle,
        pos: conv(hole.center),
        rotation: 0.0,
        size: DVec2::splat(diameter),
        layers: through_hole_layers(),
        drill: Some(Drill::Round(diameter)),
        primitives: Vec::new(),
    }
}

fn convert_via(via: &EeFootprintVia, conv: &impl Fn(DVec2) -> DVec2) -> FpPad {
    FpPad {
        number: String::new(),
        pad_type: PadType::ThroughHole,
        shape: FpShape::Circle,
        pos: conv(via.center),
        rotation: 0.0,
        size: DVec2::splat(to_millimeters(via.diameter)),
        layers: through_hole_layers(),
        drill: Some(Drill::Round(to_millimeters(via.hole_radius * 2.0))),
        primitives: Vec::new(),
    }
}

fn stroke_mm(width: f64) -> f64 {
    to_millimeters(width).max(0.01)
}

fn convert_arc(arc: &EeFootprintArc, conv: &impl Fn(DVec2) -> DVec2) -> Vec<FpGraphic> {
    let layer = map_layer(arc.layer_id).to_string();
    let width = stroke_mm(arc.stroke_width);
    let mut graphics = Vec::new();
    let mut current: Option<DVec2> = None;

    for command in parse_path(&arc.path) {
        match command {
            PathCommand::ArcTo {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                end,
            } => {
                let Some(start) = current else {
                    continue;
                };
                match endpoint_to_center(start, rx, ry, x_axis_rotation, large_arc, sweep, end) {
                    Some(params) => graphics.push(FpGraphic::Arc {
                        start: conv(start),
                        mid: conv(params.mid_point()),
                        end: conv(end),
                        width,
                        layer: layer.clone(),
                    }),
                    None => graphics.push(FpGraphic::Line {
                        start: conv(start),
                        end: conv(end),
                        width,
                        layer: layer.clone(),
                    }),
                }
                current = Some(end);
            }
            PathCommand::Close => {}
            other => current = other.end_point(),
        }
    }
    if graphics.is_empty() {
        warn!("Dropping arc without a usable arc segment: {}", arc.path);
    }
    graphics
}

fn convert_solid_region(
    region: &EeFootprintSolidRegion,
    conv: &impl Fn(DVec2) -> DVec2,
) -> Vec<FpGraphic> {
    let layer = map_layer(region.layer_id);
    flatten_path(
        &parse_path(&region.path),
        Some(REGION_ARC_SEGMENTS_PER_QUARTER),
    )
    .into_iter()
    .filter(|points| points.len() >= 3)
    .map(|points| FpGraphic::Poly {
        points: points.into_iter().map(conv).collect(),
        width: 0.0,
        layer: layer.to_string(),
        filled: true,
    })
    .collect()
}

fn convert_text(text: &EeFootprintText, conv: &impl Fn(DVec2) -> DVec2) -> FpText {
    let size = to_millimeters(text.font_size);
    FpText {
        text: text.text.clone(),
        pos: conv(text.position),
        rotation: angle_to_kicad(text.rotation),
        layer: map_layer(text.layer_id).to_string(),
        size: if size > 0.0 { size } else { 1.0 },
        thickness: if text.stroke_width > 0.0 {
            to_millimeters(text.stroke_width)
        } else {
            0.15
        },
        align: text.align,
        mirrored: text.mirrored,
    }
}

fn model_reference(
    model: &Ee3dModel,
    origin: DVec2,
    options: &FootprintOptions,
) -> Ki3dModel {
    let offset = flip_none_for_footprint(model.origin, origin);
    Ki3dModel {
        path: format!(
            "{}/{}.step",
            options.model_path_prefix.trim_end_matches('/'),
            sanitize_name(&model.name)
        ),
        // KiCad's model Y axis points up.
        offset: DVec3::new(offset.x, -offset.y, to_millimeters(model.z)),
        scale: DVec3::ONE,
        rotate: DVec3::new(
            normalize_degrees(-model.rotation.x),
            normalize_degrees(-model.rotation.y),
            normalize_degrees(-model.rotation.z),
        ),
    }
}

pub fn to_ki_footprint(component: &ComponentData, options: &FootprintOptions) -> KiFootprint {
    let footprint = &component.footprint;
    let origin = footprint.pad_bounds_center().unwrap_or(footprint.origin);
    let conv = |p: DVec2| flip_none_for_footprint(p, origin);
    debug!(
        "Footprint origin ({}, {}) with {} pads",
        origin.x,
        origin.y,
        footprint.pads.len()
    );

    let mut pads: Vec<FpPad> = footprint.pads.iter().map(|p| convert_pad(p, &conv)).collect();
    pads.extend(footprint.holes.iter().map(|h| convert_hole(h, &conv)));
    pads.extend(footprint.vias.iter().map(|v| convert_via(v, &conv)));

    let mut graphics = Vec::new();
    for track in &footprint.tracks {
        let layer = map_layer(track.layer_id);
        for segment in track.points.windows(2) {
            graphics.push(FpGraphic::Line {
                start: conv(segment[0]),
                end: conv(segment[1]),
                width: stroke_mm(track.stroke_width),
                layer: layer.to_string(),
            });
        }
    }
    for circle in &footprint.circles {
        let center = conv(circle.center);
        graphics.push(FpGraphic::Circle {
            center,
            end: center + DVec2::new(to_millimeters(circle.radius), 0.0),
            width: stroke_mm(circle.stroke_width),
            layer: map_layer(circle.layer_id).to_string(),
        });
    }
    for arc in &footprint.arcs {
        graphics.extend(convert_arc(arc, &conv));
    }
    for rect in &footprint.rects {
        graphics.push(FpGraphic::Rect {
            start: conv(rect.position),
            end: conv(rect.position + DVec2::new(rect.width, rect.height)),
            width: stroke_mm(rect.stroke_width),
            layer: map_layer(rect.layer_id).to_string(),
        });
    }
    for region in &footprint.solid_regions {
        if HELPER_LAYERS.contains(&region.layer_id) {
            continue;
        }
        graphics.extend(convert_solid_region(region, &conv));
    }

    let texts: Vec<FpText> = footprint
        .texts
        .iter()
        .filter(|t| t.visible && !t.is_placeholder() && !t.text.trim().is_empty())
        .map(|t| convert_text(t, &conv))
        .collect();

    let mut bounds = Bounds::new();
    for pad in &pads {
        if pad.shape == FpShape::Custom {
            for p in pad.primitives.iter().flatten() {
                bounds.add(pad.pos + *p);
            }
        } else {
            bounds.add_box(pad.pos, pad.size);
        }
    }
    for p in graphics.iter().flat_map(|g| g.extent_points()) {
        bounds.add(p);
    }
    let (min, max) = bounds.finish();

    graphics.push(FpGraphic::Rect {
        start: min - DVec2::splat(COURTYARD_MARGIN),
        end: max + DVec2::splat(COURTYARD_MARGIN),
        width: 0.05,
        layer: "F.CrtYd".to_string(),
    });

    let name = footprint_name(component, options);
    let mut properties = vec![
        FpProperty {
            key: "Reference".to_string(),
            value: "REF**".to_string(),
            pos: DVec2::new(0.0, min.y - LABEL_OFFSET),
            layer: "F.SilkS".to_string(),
            hidden: false,
        },
        FpProperty {
            key: "Value".to_string(),
            value: name.clone(),
            pos: DVec2::new(0.0, max.y + LABEL_OFFSET),
            layer: "F.Fab".to_string(),
            hidden: false,
        },
    ];
    if let Some(description) = component.info.description.as_deref().filter(|d| !d.trim().is_empty()) {
        properties.push(FpProperty {
            key: "Description".to_string(),
            value: description.to_string(),
            pos: DVec2::ZERO,
            layer: "F.Fab".to_string(),
            hidden: true,
        });
    }

    let model = component.model_3d.as_ref().or(footprint.model_3d.as_ref());
    let model_3d = model
        .filter(|_| options.include_3d_model)
        .map(|m| model_reference(m, origin, options));

    KiFootprint {
        name,
        description: component.info.description.clone(),
        tags: component.info.lcsc_id.clone(),
        footprint_type: footprint.footprint_type(),
        properties,
        graphics,
        texts,
        pads,
        model_3d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(number: &str, x: f64, y: f64, w: f64, h: f64) -> EeFootprintPad {
        EeFootprintPad {
            shape: PadShape::Rect,
            center: DVec2::new(x, y),
            width: w,
            height: h,
            layer_id: 1,
            number: number.to_string(),
            hole_radius: 0.0,
            points: Vec::new(),
            rotation: 0.0,
            hole_length: 0.0,
            is_plated: false,
        }
    }

    fn component(prefix: &str, package: &str, pads: Vec<EeFootprintPad>) -> ComponentData {
        ComponentData {
            info: ComponentInfo {
                name: "Part".to_string(),
                prefix: prefix.to_string(),
                package: Some(package.to_string()),
                ..Default::default()
            },
            footprint: EeFootprint {
                info: EeFootprintInfo {
                    name: package.to_string(),
                },
                pads,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_origin_is_pad_bounds_center() {
        // Pads of different widths: a plain centroid would be off-center.
        let c = component(
            "U",
            "X",
            vec![pad("1", 100.0, 100.0, 10.0, 10.0), pad("2", 120.0, 100.0, 30.0, 10.0)],
        );
        let fp = to_ki_footprint(&c, &FootprintOptions::default());
        // Bounds 95..135 → center 115.
        assert!((fp.pads[0].pos.x + 15.0 * 0.254).abs() < 1e-9);
        assert!((fp.pads[1].pos.x - 5.0 * 0.254).abs() < 1e-9);
    }

    #[test]
    fn test_pad_count_gate() {
        let two = component("R", "0603", vec![pad("1", 0.0, 0.0, 4.0, 4.0), pad("2", 6.0, 0.0, 4.0, 4.0)]);
        assert!(matches!(
            get_footprint(&two, &FootprintOptions::default()),
            FootprintResult::Reference { .. }
        ));
        let mut three = two.clone();
        three.footprint.pads.push(pad("3", 12.0, 0.0, 4.0, 4.0));
        assert!(matches!(
            get_footprint(&three, &FootprintOptions::default()),
            FootprintResult::Generated { .. }
        ));
    }

    #[test]
    fn test_extended_mapping_is_opt_in() {
        let pads = vec![
            pad("1", 0.0, 0.0, 4.0, 4.0),
            pad("2", 10.0, 0.0, 4.0, 4.0),
            pad("3", 5.0, 8.0, 4.0, 4.0),
        ];
        let sot = component("Q", "SOT-23", pads);
        assert!(matches!(
            get_footprint(&sot, &FootprintOptions::default()),
            FootprintResult::Generated { .. }
        ));
        let extended = FootprintOptions {
            extended_mapping: true,
            ..Default::default()
        };
        match get_footprint(&sot, &extended) {
            FootprintResult::Reference { mapping } => {
                assert_eq!(mapping.reference(), "Package_TO_SOT_SMD:SOT-23")
            }
            other => panic!("expected a built-in footprint, got {:?}", other),
        }

        // The pad-count gate still applies.
        let mut two = sot.clone();
        two.footprint.pads.pop();
        assert!(matches!(
            get_footprint(&two, &extended),
            FootprintResult::Generated { .. }
        ));
    }

    #[test]
    fn test_plated_polygon_pad_gets_inferred_drill() {
        let mut p = pad("1", 10.0, 10.0, 0.0, 0.0);
        p.shape = PadShape::Polygon;
        p.is_plated = true;
        p.points = vec![
            DVec2::new(0.0, 5.0),
            DVec2::new(20.0, 5.0),
            DVec2::new(20.0, 15.0),
            DVec2::new(0.0, 15.0),
        ];
        let fp = to_ki_footprint(&component("U", "X", vec![p]), &FootprintOptions::default());
        let ki = &fp.pads[0];
        assert_eq!(ki.shape, FpShape::Custom);
        assert_eq!(ki.pad_type, PadType::ThroughHole);
        let Some(Drill::Round(d)) = ki.drill else {
            panic!("expected round drill");
        };
        assert!((d - 10.0 * 0.254 * 0.6).abs() < 1e-9);
        assert_eq!(fp.footprint_type, FootprintType::ThroughHole);
    }

    #[test]
    fn test_slot_follows_long_axis() {
        let mut p = pad("1", 0.0, 0.0, 10.0, 30.0);
        p.shape = PadShape::Oval;
        p.hole_radius = 2.0;
        p.hole_length = 20.0;
        assert_eq!(slot_drill(&p), Drill::Oval(4.0 * 0.254, 20.0 * 0.254));
    }

    #[test]
    fn test_helper_layer_regions_are_dropped() {
        let mut c = component("U", "X", vec![pad("1", 0.0, 0.0, 4.0, 4.0)]);
        for layer_id in [99, 3] {
            c.footprint.solid_regions.push(EeFootprintSolidRegion {
                layer_id,
                path: "M 0 0 L 10 0 L 10 10 Z".to_string(),
                region_type: "solid".to_string(),
            });
        }
        let fp = to_ki_footprint(&c, &FootprintOptions::default());
        let polys: Vec<_> = fp
            .graphics
            .iter()
            .filter(|g| matches!(g, FpGraphic::Poly { .. }))
            .collect();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].layer(), "F.SilkS");
    }

    #[test]
    fn test_track_is_split_into_segments() {
        let mut c = component("U", "X", vec![pad("1", 0.0, 0.0, 4.0, 4.0)]);
        c.footprint.tracks.push(EeFootprintTrack {
            stroke_width: 1.0,
            layer_id: 3,
            points: vec![DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(10.0, 10.0)],
        });
        let text = convert(&c, &FootprintOptions::default());
        assert_eq!(text.matches("(fp_line").count(), 2);
        assert!(text.contains("(attr smd)"));
        assert!(text.contains("(layer \"F.CrtYd\")"));
    }
}
