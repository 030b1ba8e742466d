//! Decides when a component may use a footprint from KiCad's built-in
//! libraries instead of a generated one.
//!
//! The strict mapper only accepts two-pad unpolarized passives (R, C, L in
//! standard chip sizes). Built-in pad numbering does not always agree with
//! EasyEDA's, and on polarized or multi-pin parts that silently swaps pins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintMapping {
    pub library: String,
    pub footprint: String,
}

impl FootprintMapping {
    fn new(library: &str, footprint: impl Into<String>) -> Self {
        Self {
            library: library.to_string(),
            footprint: footprint.into(),
        }
    }

    /// `Library:Footprint` as written into a symbol's Footprint property.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.library, self.footprint)
    }

    /// Number of pads the built-in footprint has.
    pub fn expected_pad_count(&self) -> usize {
        let fp = self.footprint.as_str();
        if fp.starts_with("SOT-223") {
            return 4;
        }
        if fp.starts_with("SOT-23-") {
            return fp[7..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse()
                .unwrap_or(3);
        }
        if fp.starts_with("SOT-23") || fp.starts_with("SOT-89") {
            return 3;
        }
        if let Some(rest) = fp
            .strip_prefix("SOIC-")
            .or_else(|| fp.strip_prefix("TSSOP-"))
        {
            return rest
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
                .parse()
                .unwrap_or(2);
        }
        2
    }
}

/// Imperial chip size code and its metric counterpart.
const CHIP_SIZES: &[(&str, &str)] = &[
    ("0201", "0603"),
    ("0402", "1005"),
    ("0603", "1608"),
    ("0805", "2012"),
    ("1206", "3216"),
    ("1210", "3225"),
    ("1812", "4532"),
    ("2010", "5025"),
    ("2512", "6332"),
];

static CHIP_SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])(0201|0402|0603|0805|1206|1210|1812|2010|2512)(?:[^0-9]|$)")
        .expect("chip size pattern")
});

fn chip_size(package: &str) -> Option<(&'static str, &'static str)> {
    let caps = CHIP_SIZE_PATTERN.captures(package)?;
    let code = caps.get(1)?.as_str();
    CHIP_SIZES.iter().find(|(imp, _)| *imp == code).copied()
}

fn normalize_prefix(prefix: &str) -> String {
    prefix
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn chip_mapping(library: &str, kind: &str, package: &str) -> Option<FootprintMapping> {
    let (imperial, metric) = chip_size(package)?;
    Some(FootprintMapping::new(
        library,
        format!("{}_{}_{}Metric", kind, imperial, metric),
    ))
}

/// Strict built-in mapping: only R, C and L chip passives.
pub fn map_to_kicad_footprint(package: &str, prefix: &str) -> Option<FootprintMapping> {
    match normalize_prefix(prefix).as_str() {
        "R" => chip_mapping("Resistor_SMD", "R", package),
        "C" => chip_mapping("Capacitor_SMD", "C", package),
        "L" => chip_mapping("Inductor_SMD", "L", package),
        _ => None,
    }
}

const NAMED_PACKAGES: &[(&str, &str, &str)] = &[
    ("SOIC-8", "Package_SO", "SOIC-8_3.9x4.9mm_P1.27mm"),
    ("SOIC-14", "Package_SO", "SOIC-14_3.9x8.7mm_P1.27mm"),
    ("SOIC-16", "Package_SO", "SOIC-16_3.9x9.9mm_P1.27mm"),
    ("TSSOP-8", "Package_SO", "TSSOP-8_4.4x3mm_P0.65mm"),
    ("TSSOP-14", "Package_SO", "TSSOP-14_4.4x5mm_P0.65mm"),
    ("TSSOP-16", "Package_SO", "TSSOP-16_4.4x5mm_P0.65mm"),
    ("TSSOP-20", "Package_SO", "TSSOP-20_4.4x6.5mm_P0.65mm"),
    ("SOT-223", "Package_TO_SOT_SMD", "SOT-223-3_TabPin2"),
    ("SOT-23-5", "Package_TO_SOT_SMD", "SOT-23-5"),
    ("SOT-23-6", "Package_TO_SOT_SMD", "SOT-23-6"),
    ("SOT-23-3", "Package_TO_SOT_SMD", "SOT-23"),
    ("SOT-23", "Package_TO_SOT_SMD", "SOT-23"),
    ("SOT-89", "Package_TO_SOT_SMD", "SOT-89-3"),
    ("SOD-123", "Diode_SMD", "D_SOD-123"),
    ("SOD-323", "Diode_SMD", "D_SOD-323"),
    ("SOD-523", "Diode_SMD", "D_SOD-523"),
    ("SMA", "Diode_SMD", "D_SMA"),
    ("SMB", "Diode_SMD", "D_SMB"),
    ("SMC", "Diode_SMD", "D_SMC"),
    ("MINIMELF", "Diode_SMD", "D_MiniMELF"),
    ("MELF", "Diode_SMD", "D_MELF"),
];

/// Canonical package key: uppercase, separators unified to `-`, common
/// vendor suffixes like `(DO-214AC)` or `_L2.9-W1.3` dropped.
fn package_key(package: &str) -> String {
    let upper = package.trim().to_ascii_uppercase().replace(['_', ' '], "-");
    let head = upper.split('(').next().unwrap_or("").trim_end_matches('-');
    head.split("-L")
        .next()
        .unwrap_or(head)
        .trim_end_matches('-')
        .to_string()
}

/// Richer mapping that also covers diode/LED chips and named IC/discrete
/// package families. Selected with `FootprintOptions::extended_mapping`.
pub fn map_to_kicad_footprint_extended(package: &str, prefix: &str) -> Option<FootprintMapping> {
    if let Some(mapping) = map_to_kicad_footprint(package, prefix) {
        return Some(mapping);
    }
    let prefix = normalize_prefix(prefix);
    if chip_size(package).is_some() {
        return match prefix.as_str() {
            "LED" => chip_mapping("LED_SMD", "LED", package),
            "D" => chip_mapping("Diode_SMD", "D", package),
            _ => None,
        };
    }
    let key = package_key(package);
    NAMED_PACKAGES
        .iter()
        .find(|(name, _, _)| key == *name)
        .map(|(_, library, footprint)| FootprintMapping::new(library, *footprint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_size_inside_package_names() {
        assert_eq!(chip_size("R0603"), Some(("0603", "1608")));
        assert_eq!(chip_size("C0805_L2.0-W1.25"), Some(("0805", "2012")));
        assert_eq!(chip_size("SOT-23"), None);
        assert_eq!(chip_size("10603"), None);
    }

    #[test]
    fn test_package_key() {
        assert_eq!(package_key("SOT-23-3_L2.9-W1.3-P1.90"), "SOT-23-3");
        assert_eq!(package_key("SMA(DO-214AC)"), "SMA");
        assert_eq!(package_key("soic_8"), "SOIC-8");
    }

    #[test]
    fn test_expected_pad_counts() {
        let m = |fp: &str| FootprintMapping::new("X", fp).expected_pad_count();
        assert_eq!(m("R_0603_1608Metric"), 2);
        assert_eq!(m("SOT-23"), 3);
        assert_eq!(m("SOT-23-6"), 6);
        assert_eq!(m("SOT-223-3_TabPin2"), 4);
        assert_eq!(m("SOIC-8_3.9x4.9mm_P1.27mm"), 8);
    }
}
