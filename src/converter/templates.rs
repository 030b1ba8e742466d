//! Fixed symbol bodies for two-terminal passives and diodes.

use crate::category::LibraryCategory;
use crate::kicad_models::{KiFill, KiSymbolGraphic};
use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    Led,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolTemplate {
    pub kind: TemplateKind,
    /// Distance between the two pin connection points.
    pub pin_spacing: f64,
    pub pin_length: f64,
    pub reference_position: DVec2,
    pub value_position: DVec2,
}

const BODY_STROKE: f64 = 0.254;

impl SymbolTemplate {
    fn new(kind: TemplateKind) -> Self {
        let label_x = match kind {
            TemplateKind::Capacitor => 3.048,
            TemplateKind::Diode | TemplateKind::Led => 3.556,
            _ => 2.54,
        };
        Self {
            kind,
            pin_spacing: 7.62,
            pin_length: 1.27,
            reference_position: DVec2::new(label_x, 1.27),
            value_position: DVec2::new(label_x, -1.27),
        }
    }

    pub fn half_spacing(&self) -> f64 {
        self.pin_spacing / 2.0
    }

    /// Body graphics, drawn between the two pin tips at `±(half_spacing - pin_length)`.
    pub fn graphics(&self) -> Vec<KiSymbolGraphic> {
        let reach = self.half_spacing() - self.pin_length;
        match self.kind {
            TemplateKind::Resistor => vec![KiSymbolGraphic::Rectangle {
                start: DVec2::new(-1.016, reach),
                end: DVec2::new(1.016, -reach),
                stroke_width: BODY_STROKE,
                fill: KiFill::None,
            }],
            TemplateKind::Capacitor => {
                let plate = 0.762;
                vec![
                    line(DVec2::new(-2.032, plate), DVec2::new(2.032, plate), 0.508),
                    line(DVec2::new(-2.032, -plate), DVec2::new(2.032, -plate), 0.508),
                    line(DVec2::new(0.0, reach), DVec2::new(0.0, plate), 0.0),
                    line(DVec2::new(0.0, -reach), DVec2::new(0.0, -plate), 0.0),
                ]
            }
            TemplateKind::Inductor => {
                let turns = 4;
                let step = 2.0 * reach / turns as f64;
                (0..turns)
                    .map(|i| {
                        let top = reach - step * i as f64;
                        KiSymbolGraphic::Arc {
                            start: DVec2::new(0.0, top),
                            mid: DVec2::new(step / 2.0, top - step / 2.0),
                            end: DVec2::new(0.0, top - step),
                            stroke_width: BODY_STROKE,
                        }
                    })
                    .collect()
            }
            TemplateKind::Diode => diode_body(reach),
            TemplateKind::Led => {
                let mut body = diode_body(reach);
                for offset in [0.0, 1.016] {
                    body.push(KiSymbolGraphic::Polyline {
                        points: vec![
                            DVec2::new(1.524, -0.508 + offset),
                            DVec2::new(2.54, 0.508 + offset),
                            DVec2::new(2.032, 0.508 + offset),
                            DVec2::new(2.54, 0.508 + offset),
                            DVec2::new(2.54, offset),
                        ],
                        stroke_width: 0.0,
                        fill: KiFill::None,
                    });
                }
                body
            }
        }
    }
}

fn line(start: DVec2, end: DVec2, stroke_width: f64) -> KiSymbolGraphic {
    KiSymbolGraphic::Polyline {
        points: vec![start, end],
        stroke_width,
        fill: KiFill::None,
    }
}

// Pin 1 (top) is the cathode: the bar sits on top and the triangle points up.
fn diode_body(reach: f64) -> Vec<KiSymbolGraphic> {
    vec![
        line(DVec2::new(-1.27, 1.27), DVec2::new(1.27, 1.27), BODY_STROKE),
        KiSymbolGraphic::Polyline {
            points: vec![
                DVec2::new(-1.27, -1.27),
                DVec2::new(1.27, -1.27),
                DVec2::new(0.0, 1.27),
                DVec2::new(-1.27, -1.27),
            ],
            stroke_width: BODY_STROKE,
            fill: KiFill::None,
        },
        line(DVec2::new(0.0, reach), DVec2::new(0.0, -reach), 0.0),
    ]
}

fn is_led_prefix(prefix: &str) -> bool {
    let letters: String = prefix
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    letters.eq_ignore_ascii_case("LED")
}

/// The fixed template for a component, if its category has one.
pub fn template_for(category: LibraryCategory, prefix: &str) -> Option<SymbolTemplate> {
    if is_led_prefix(prefix) {
        return Some(SymbolTemplate::new(TemplateKind::Led));
    }
    let kind = match category {
        LibraryCategory::Resistors => TemplateKind::Resistor,
        LibraryCategory::Capacitors => TemplateKind::Capacitor,
        LibraryCategory::Inductors => TemplateKind::Inductor,
        LibraryCategory::Diodes => TemplateKind::Diode,
        _ => return None,
    };
    Some(SymbolTemplate::new(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_lookup() {
        let r = template_for(LibraryCategory::Resistors, "R").unwrap();
        assert_eq!(r.kind, TemplateKind::Resistor);
        assert_eq!(r.half_spacing(), 3.81);
        assert_eq!(
            template_for(LibraryCategory::Diodes, "LED").map(|t| t.kind),
            Some(TemplateKind::Led)
        );
        assert!(template_for(LibraryCategory::Ics, "U").is_none());
    }

    #[test]
    fn test_inductor_arcs_span_the_body() {
        let l = template_for(LibraryCategory::Inductors, "L").unwrap();
        let graphics = l.graphics();
        assert_eq!(graphics.len(), 4);
        let KiSymbolGraphic::Arc { start, .. } = graphics[0] else {
            panic!("expected arc");
        };
        assert!((start.y - 2.54).abs() < 1e-9);
        let KiSymbolGraphic::Arc { end, .. } = graphics[3] else {
            panic!("expected arc");
        };
        assert!((end.y + 2.54).abs() < 1e-9);
    }
}
