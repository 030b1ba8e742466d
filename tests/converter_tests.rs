mod common;

use glam::DVec2;
use jlc_kicad::category::{LibraryCategory, get_library_category, get_library_filename};
use jlc_kicad::converter::footprint::{convert as convert_footprint, get_footprint};
use jlc_kicad::converter::symbol::convert_to_symbol_entry;
use jlc_kicad::converter::{FootprintOptions, FootprintResult, SymbolOptions};
use jlc_kicad::easyeda_models::{FootprintShape, PadShape};
use jlc_kicad::footprint_mapper::{map_to_kicad_footprint, map_to_kicad_footprint_extended};
use jlc_kicad::importer::parse_footprint_shape;
use jlc_kicad::svg_arc::endpoint_to_center;
use jlc_kicad::validation::{extract_from_kicad_footprint, extract_from_kicad_symbol};

#[test]
fn test_resistor_prefix_routes_to_resistors() {
    assert_eq!(
        get_library_category(Some("R"), None, None),
        LibraryCategory::Resistors
    );
    assert_eq!(
        get_library_filename(LibraryCategory::Resistors),
        "JLC-MCP-Resistors.kicad_sym"
    );
    // Table prefixes ignore category and description text.
    assert_eq!(
        get_library_category(Some("R"), Some("Microcontrollers"), Some("ARM MCU")),
        LibraryCategory::Resistors
    );
}

#[test]
fn test_strict_mapper_allow_list() {
    let mapping = map_to_kicad_footprint("0603", "R").unwrap();
    assert_eq!(mapping.library, "Resistor_SMD");
    assert_eq!(mapping.footprint, "R_0603_1608Metric");
    assert!(map_to_kicad_footprint("SOT-23", "Q").is_none());
    assert!(map_to_kicad_footprint("0805", "D").is_none());
    assert!(map_to_kicad_footprint("0805", "U").is_none());
    // The extended variant knows more families.
    assert!(map_to_kicad_footprint_extended("SOT-23", "Q").is_some());
}

#[test]
fn test_smd_pad_line() {
    let Some(FootprintShape::Pad(pad)) =
        parse_footprint_shape("PAD~RECT~0~0~10~5~1~~1~0~~0~id~0~~0~0")
    else {
        panic!("expected a pad");
    };
    assert_eq!(pad.center, DVec2::ZERO);
    assert_eq!(pad.number, "1");
    assert_eq!(pad.shape, PadShape::Rect);
    assert!(pad.is_smd());
}

#[test]
fn test_arc_endpoints_round_trip() {
    let cases = [
        (DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), 5.0, false, true),
        (DVec2::new(1.0, 2.0), DVec2::new(4.0, 6.0), 4.0, true, false),
        (DVec2::new(-3.0, 0.5), DVec2::new(2.0, -1.5), 10.0, false, false),
    ];
    for (p1, p2, r, large, sweep) in cases {
        let arc = endpoint_to_center(p1, r, r, 0.0, large, sweep, p2).unwrap();
        assert!(arc.start_point().distance(p1) < 1e-6, "start of {:?}", arc);
        assert!(arc.end_point().distance(p2) < 1e-6, "end of {:?}", arc);
    }
    assert!(endpoint_to_center(DVec2::ZERO, 0.0, 0.0, 0.0, false, true, DVec2::X).is_none());
}

#[test]
fn test_two_pin_resistor_uses_template() {
    let component = common::resistor();
    let entry = convert_to_symbol_entry(&component, &SymbolOptions::default());
    let symbol = extract_from_kicad_symbol(&entry).unwrap();

    assert_eq!(symbol.pins.len(), 2);
    let pin1 = &symbol.pins[0];
    assert_eq!(pin1.number, "1");
    assert_eq!((pin1.x, pin1.y, pin1.rotation), (0.0, 3.81, 270.0));
    let pin2 = &symbol.pins[1];
    assert_eq!(pin2.number, "2");
    assert_eq!((pin2.x, pin2.y, pin2.rotation), (0.0, -3.81, 90.0));
    assert!(entry.contains("(symbol \"10k_1_1\""));
}

#[test]
fn test_symbol_properties() {
    let component = common::chip();
    let options = SymbolOptions {
        footprint_ref: Some("JLC-MCP:TEST-2".to_string()),
        ..Default::default()
    };
    let entry = convert_to_symbol_entry(&component, &options);
    assert!(entry.contains(r#"(property "Reference" "U""#));
    assert!(entry.contains(r#"(property "Value" "TestChip""#));
    assert!(entry.contains(r#"(property "Footprint" "JLC-MCP:TEST-2""#));
    assert!(entry.contains(r#"(property "LCSC" "C999""#));
    assert!(entry.contains("https://www.lcsc.com/product-detail/C999.html"));
    // Properties without a value are left out.
    assert!(!entry.contains(r#"(property "Manufacturer" """#));
}

#[test]
fn test_builtin_footprint_for_matching_pad_count() {
    let component = common::resistor();
    match get_footprint(&component, &FootprintOptions::default()) {
        FootprintResult::Reference { mapping } => {
            assert_eq!(mapping.reference(), "Resistor_SMD:R_0603_1608Metric")
        }
        other => panic!("expected a built-in footprint, got {:?}", other),
    }

    let mut three_pads = common::resistor();
    let extra = three_pads.footprint.pads[0].clone();
    three_pads.footprint.pads.push(extra);
    assert!(matches!(
        get_footprint(&three_pads, &FootprintOptions::default()),
        FootprintResult::Generated { .. }
    ));
}

#[test]
fn test_generated_footprint_is_centered_on_pads() {
    let component = common::chip();
    let text = convert_footprint(&component, &FootprintOptions::default());
    assert!(text.starts_with("(footprint \"TEST-2\""));
    assert!(text.contains("(attr smd)"));
    assert!(text.contains("F.CrtYd"));

    let data = extract_from_kicad_footprint(&text).unwrap();
    assert_eq!(data.pads.len(), 2);
    assert!((data.pads[0].x + 2.54).abs() < 1e-9);
    assert!((data.pads[1].x - 2.54).abs() < 1e-9);
    assert!(data.pads.iter().all(|p| p.y.abs() < 1e-9));
    assert!((data.pads[0].width - 2.54).abs() < 1e-9);
    assert!((data.pads[0].height - 1.27).abs() < 1e-9);
}
