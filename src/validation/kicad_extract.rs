use super::sexpr::{self, ParseError, SExp};
use super::{Bounds, FootprintData, HoleInfo, PadInfo, PinInfo, SymbolData, ViaInfo};
use glam::DVec2;

fn xy(list: &SExp) -> DVec2 {
    DVec2::new(
        list.number(1).unwrap_or_default(),
        list.number(2).unwrap_or_default(),
    )
}

/// Drill radius from `(drill d)` or `(drill oval w h)`; the smaller axis for slots.
fn drill_radius(pad: &SExp) -> Option<f64> {
    let drill = pad.child("drill")?;
    if drill.atom(1) == Some("oval") {
        let w = drill.number(2)?;
        let h = drill.number(3).unwrap_or(w);
        Some(w.min(h) / 2.0)
    } else {
        drill.number(1).map(|d| d / 2.0)
    }
}

fn layer_id(pad: &SExp) -> i32 {
    let layers: Vec<&str> = pad
        .child("layers")
        .and_then(SExp::as_list)
        .map(|items| items.iter().skip(1).filter_map(SExp::as_atom).collect())
        .unwrap_or_default();
    if layers.contains(&"*.Cu") {
        11
    } else if layers.contains(&"B.Cu") {
        2
    } else {
        1
    }
}

/// Size of a custom pad, taken from its primitive polygons.
fn primitive_bounds(pad: &SExp) -> Option<Bounds> {
    let mut polys = Vec::new();
    pad.child("primitives")?.descendants("xy", &mut polys);
    Bounds::from_points(polys.into_iter().map(xy))
}

/// Canonical pad/via/hole records from a generated `.kicad_mod` text.
///
/// KiCad output is already origin-centered, so positions are taken as written.
pub fn extract_from_kicad_footprint(text: &str) -> Result<FootprintData, ParseError> {
    let root = sexpr::parse(text)?;
    let mut data = FootprintData::default();

    for pad in root.children("pad") {
        let number = pad.atom(1).unwrap_or_default().to_string();
        let pad_type = pad.atom(2).unwrap_or_default();
        let shape = pad.atom(3).unwrap_or_default().to_string();
        let at = pad.child("at");
        let pos = at.map(xy).unwrap_or_default();
        let rotation = at.and_then(|a| a.number(3)).unwrap_or_default();
        let size = pad.child("size").map(xy).unwrap_or_default();
        let hole_radius = drill_radius(pad).unwrap_or_default();

        match (number.is_empty(), pad_type) {
            (true, "np_thru_hole") => data.holes.push(HoleInfo {
                x: pos.x,
                y: pos.y,
                radius: hole_radius,
            }),
            (true, "thru_hole") => data.vias.push(ViaInfo {
                x: pos.x,
                y: pos.y,
                diameter: size.x,
                hole_radius,
            }),
            _ => {
                let (width, height) = if shape == "custom" {
                    primitive_bounds(pad)
                        .map(|b| (b.width(), b.height()))
                        .unwrap_or((size.x, size.y))
                } else {
                    (size.x, size.y)
                };
                let has_hole = matches!(pad_type, "thru_hole" | "np_thru_hole");
                data.pads.push(PadInfo {
                    number,
                    shape,
                    x: pos.x,
                    y: pos.y,
                    width,
                    height,
                    rotation,
                    has_hole,
                    hole_radius: if has_hole { hole_radius } else { 0.0 },
                    layer_id: layer_id(pad),
                });
            }
        }
    }

    data.compute_bounds();
    Ok(data)
}

/// Canonical pin records from a generated symbol entry or whole library.
pub fn extract_from_kicad_symbol(text: &str) -> Result<SymbolData, ParseError> {
    let root = sexpr::parse(text)?;
    let mut pins = Vec::new();
    root.descendants("pin", &mut pins);

    let mut data = SymbolData {
        pins: pins
            .into_iter()
            .map(|pin| {
                let at = pin.child("at");
                let pos = at.map(xy).unwrap_or_default();
                PinInfo {
                    number: pin
                        .child("number")
                        .and_then(|n| n.atom(1))
                        .unwrap_or_default()
                        .to_string(),
                    name: pin
                        .child("name")
                        .and_then(|n| n.atom(1))
                        .unwrap_or_default()
                        .to_string(),
                    x: pos.x,
                    y: pos.y,
                    rotation: at.and_then(|a| a.number(3)).unwrap_or_default(),
                    length: pin
                        .child("length")
                        .and_then(|l| l.number(1))
                        .unwrap_or_default(),
                }
            })
            .collect(),
        ..Default::default()
    };
    data.compute_bounds();
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTPRINT: &str = r#"(footprint "Test"
        (layer "F.Cu")
        (pad "1" smd rect (at -1 0) (size 1 0.6) (layers "F.Cu" "F.Paste" "F.Mask"))
        (pad "2" thru_hole circle (at 1 0) (size 1.8 1.8) (drill 1.0) (layers "*.Cu" "*.Mask"))
        (pad "" thru_hole circle (at 0 2) (size 0.6 0.6) (drill 0.3) (layers "*.Cu"))
        (pad "" np_thru_hole circle (at 0 -2) (size 1.2 1.2) (drill 1.2) (layers "*.Cu" "*.Mask"))
    )"#;

    #[test]
    fn test_footprint_pads_vias_holes() {
        let data = extract_from_kicad_footprint(FOOTPRINT).unwrap();
        assert_eq!(data.pads.len(), 2);
        assert_eq!(data.vias.len(), 1);
        assert_eq!(data.holes.len(), 1);

        let smd = &data.pads[0];
        assert!(!smd.has_hole);
        assert_eq!(smd.layer_id, 1);
        assert_eq!(smd.hole_radius, 0.0);

        let tht = &data.pads[1];
        assert!(tht.has_hole);
        assert!((tht.hole_radius - 0.5).abs() < 1e-9);
        assert_eq!(tht.layer_id, 11);
        assert_eq!(tht.shape, "circle");

        assert!((data.vias[0].hole_radius - 0.15).abs() < 1e-9);
        assert!((data.holes[0].radius - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_custom_pad_size_from_primitives() {
        let text = r#"(footprint "X" (pad "1" smd custom (at 0 0) (size 0.01 0.01) (layers "F.Cu")
            (options (clearance outline) (anchor circle))
            (primitives (gr_poly (pts (xy -1 -0.5) (xy 1 -0.5) (xy 1 0.5) (xy -1 0.5)) (width 0) (fill yes)))))"#;
        let data = extract_from_kicad_footprint(text).unwrap();
        assert!((data.pads[0].width - 2.0).abs() < 1e-9);
        assert!((data.pads[0].height - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symbol_pins() {
        let text = r#"(kicad_symbol_lib (symbol "R" (symbol "R_1_1"
            (pin passive line (at 0 3.81 270) (length 1.27) (name "~" (effects (font (size 1.27 1.27)))) (number "1" (effects (font (size 1.27 1.27)))))
            (pin passive line (at 0 -3.81 90) (length 1.27) (name "~" (effects (font (size 1.27 1.27)))) (number "2" (effects (font (size 1.27 1.27))))))))"#;
        let data = extract_from_kicad_symbol(text).unwrap();
        assert_eq!(data.pins.len(), 2);
        assert_eq!(data.pins[0].number, "1");
        assert_eq!(data.pins[0].rotation, 270.0);
        assert_eq!(data.pins[1].y, -3.81);
        assert!((data.bounds.height() - 7.62).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_text_is_an_error() {
        assert!(extract_from_kicad_footprint("(footprint \"X\"").is_err());
    }
}
