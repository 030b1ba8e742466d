//! Unit and coordinate-system conversions between EasyEDA and KiCad.
//!
//! EasyEDA stores geometry in 10-mil units with the Y axis pointing down.
//! Footprints keep that orientation in KiCad; symbols flip Y because KiCad's
//! symbol editor has Y pointing up. Every conversion in the crate goes through
//! the functions here so the two conventions cannot drift apart.

use glam::DVec2;

/// One EasyEDA unit (10 mil) in millimeters.
pub const EE_TO_MM: f64 = 0.254;

/// Decimal places kept in `.kicad_sym` output.
pub const SYMBOL_PRECISION: usize = 3;

/// Decimal places kept in `.kicad_mod` output.
pub const FOOTPRINT_PRECISION: usize = 4;

pub fn to_millimeters(value: f64) -> f64 {
    value * EE_TO_MM
}

/// Converts an EasyEDA symbol coordinate into KiCad symbol space.
pub fn flip_y_for_symbol(point: DVec2, origin: DVec2) -> DVec2 {
    DVec2::new(
        to_millimeters(point.x - origin.x),
        -to_millimeters(point.y - origin.y),
    )
}

/// Converts an EasyEDA footprint coordinate into KiCad footprint space.
pub fn flip_none_for_footprint(point: DVec2, origin: DVec2) -> DVec2 {
    DVec2::new(
        to_millimeters(point.x - origin.x),
        to_millimeters(point.y - origin.y),
    )
}

pub fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Formats a number with at most `precision` decimals and no trailing zeros.
///
/// Non-finite values are written as `0` and negative zero never appears, so
/// the output is byte-stable across platforms.
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut s = format!("{:.*}", precision, value);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Normalizes an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// EasyEDA pin rotation to KiCad pin rotation.
///
/// EasyEDA encodes the direction the pin extends away from the body, KiCad the
/// direction it points toward the body, hence the fixed 180 degree flip.
pub fn pin_rotation_to_kicad(easyeda_rotation: f64) -> f64 {
    normalize_degrees(easyeda_rotation + 180.0)
}

/// EasyEDA pad/text rotation to KiCad footprint rotation.
pub fn angle_to_kicad(rotation: f64) -> f64 {
    let r = normalize_degrees(rotation);
    if r > 180.0 { -(360.0 - r) } else { r }
}
