#![allow(dead_code)]

use glam::DVec2;
use jlc_kicad::easyeda_models::{ComponentData, ComponentInfo, EeFootprintInfo};
use jlc_kicad::importer::{parse_footprint_shapes, parse_symbol_shapes};

/// A pin line as EasyEDA stores it; the line path runs `dx` units from the pin.
pub fn pin_line(number: &str, name: &str, x: f64, y: f64, rotation: f64, dx: f64) -> String {
    format!(
        "P~show~0~{n}~{x}~{y}~{rot}~gge{n}~0^^{x}~{y}^^M {x} {y} h {dx}~#880000^^1~{x}~{y}~0~{name}~start~~~#0000FF^^1~{x}~{y}~0~{n}~end~~~#0000FF^^0~{x}~{y}^^0~M 0 0",
        n = number,
        x = x,
        y = y,
        rot = rotation,
        dx = dx,
        name = name,
    )
}

/// A rectangular SMD pad line centered at `(x, y)`.
pub fn pad_line(number: &str, x: f64, y: f64, w: f64, h: f64) -> String {
    format!("PAD~RECT~{}~{}~{}~{}~1~~{}~0~~0~gge{}~0~~0~0", x, y, w, h, number, number)
}

fn component(
    info: ComponentInfo,
    footprint_name: &str,
    symbol_lines: &[String],
    footprint_lines: &[String],
) -> ComponentData {
    ComponentData {
        info,
        symbol: parse_symbol_shapes(DVec2::new(400.0, 300.0), symbol_lines),
        footprint: parse_footprint_shapes(
            EeFootprintInfo {
                name: footprint_name.to_string(),
            },
            DVec2::new(4000.0, 3000.0),
            footprint_lines,
        ),
        model_3d: None,
    }
}

/// Two-pin 0603 resistor; the strict mapper has a built-in footprint for it.
pub fn resistor() -> ComponentData {
    component(
        ComponentInfo {
            name: "10k".to_string(),
            prefix: "R".to_string(),
            package: Some("0603".to_string()),
            lcsc_id: Some("C25804".to_string()),
            ..Default::default()
        },
        "R0603",
        &[
            pin_line("1", "1", 390.0, 300.0, 180.0, 10.0),
            pin_line("2", "2", 410.0, 300.0, 0.0, -10.0),
        ],
        &[
            pad_line("1", 3997.0, 3000.0, 3.5, 3.5),
            pad_line("2", 4003.0, 3000.0, 3.5, 3.5),
        ],
    )
}

/// Symbol body with two named pins; the footprint is always generated.
pub fn chip() -> ComponentData {
    component(
        ComponentInfo {
            name: "TestChip".to_string(),
            prefix: "U".to_string(),
            package: Some("TEST-2".to_string()),
            lcsc_id: Some("C999".to_string()),
            description: Some("Test interface chip".to_string()),
            ..Default::default()
        },
        "TEST-2",
        &[
            "R~390~290~~~20~20~#880000~1~0~none~gge1~0".to_string(),
            pin_line("1", "IN", 380.0, 295.0, 180.0, 10.0),
            pin_line("2", "OUT", 420.0, 295.0, 0.0, -10.0),
        ],
        &[
            pad_line("1", 4000.0, 3000.0, 10.0, 5.0),
            pad_line("2", 4020.0, 3000.0, 10.0, 5.0),
        ],
    )
}

/// Reference SVG matching [`chip`]'s pads.
pub const CHIP_FOOTPRINT_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
    <g c_partid="part_pad" number="1" layerid="1">
        <polygon points="3995 2997.5 4005 2997.5 4005 3002.5 3995 3002.5"/>
    </g>
    <g c_partid="part_pad" number="2" layerid="1">
        <polygon points="4015 2997.5 4025 2997.5 4025 3002.5 4015 3002.5"/>
    </g>
</svg>"#;

/// Reference SVG matching [`chip`]'s pins.
pub const CHIP_SYMBOL_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
    <rect x="390" y="290" width="20" height="20"/>
    <g c_partid="part_pin" number="1" name="IN"><path d="M 380 295 h 10"/></g>
    <g c_partid="part_pin" number="2" name="OUT"><path d="M 420 295 h -10"/></g>
</svg>"#;
