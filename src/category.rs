//! Routes components into per-category symbol libraries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every generated library file.
pub const LIBRARY_PREFIX: &str = "JLC-MCP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LibraryCategory {
    Resistors,
    Capacitors,
    Inductors,
    Diodes,
    Transistors,
    Crystals,
    Connectors,
    Mcus,
    Memory,
    Power,
    Sensors,
    Interface,
    Optocouplers,
    Ics,
    Misc,
}

impl LibraryCategory {
    pub const ALL: [LibraryCategory; 15] = [
        LibraryCategory::Resistors,
        LibraryCategory::Capacitors,
        LibraryCategory::Inductors,
        LibraryCategory::Diodes,
        LibraryCategory::Transistors,
        LibraryCategory::Crystals,
        LibraryCategory::Connectors,
        LibraryCategory::Mcus,
        LibraryCategory::Memory,
        LibraryCategory::Power,
        LibraryCategory::Sensors,
        LibraryCategory::Interface,
        LibraryCategory::Optocouplers,
        LibraryCategory::Ics,
        LibraryCategory::Misc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LibraryCategory::Resistors => "Resistors",
            LibraryCategory::Capacitors => "Capacitors",
            LibraryCategory::Inductors => "Inductors",
            LibraryCategory::Diodes => "Diodes",
            LibraryCategory::Transistors => "Transistors",
            LibraryCategory::Crystals => "Crystals",
            LibraryCategory::Connectors => "Connectors",
            LibraryCategory::Mcus => "MCUs",
            LibraryCategory::Memory => "Memory",
            LibraryCategory::Power => "Power",
            LibraryCategory::Sensors => "Sensors",
            LibraryCategory::Interface => "Interface",
            LibraryCategory::Optocouplers => "Optocouplers",
            LibraryCategory::Ics => "ICs",
            LibraryCategory::Misc => "Misc",
        }
    }

    /// Reference designator used when the component carries no prefix.
    pub fn default_reference(&self) -> &'static str {
        match self {
            LibraryCategory::Resistors => "R",
            LibraryCategory::Capacitors => "C",
            LibraryCategory::Inductors => "L",
            LibraryCategory::Diodes => "D",
            LibraryCategory::Transistors => "Q",
            LibraryCategory::Crystals => "Y",
            LibraryCategory::Connectors => "J",
            _ => "U",
        }
    }
}

impl fmt::Display for LibraryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const PREFIX_TABLE: &[(&str, LibraryCategory)] = &[
    ("FB", LibraryCategory::Inductors),
    ("RJ", LibraryCategory::Connectors),
    // "LED" would otherwise fall through to "L"
    ("LE", LibraryCategory::Diodes),
    ("R", LibraryCategory::Resistors),
    ("C", LibraryCategory::Capacitors),
    ("L", LibraryCategory::Inductors),
    ("D", LibraryCategory::Diodes),
    ("Q", LibraryCategory::Transistors),
    ("Y", LibraryCategory::Crystals),
    ("X", LibraryCategory::Crystals),
    ("J", LibraryCategory::Connectors),
    ("P", LibraryCategory::Connectors),
    ("K", LibraryCategory::Misc),
    ("F", LibraryCategory::Misc),
];

// Most specific first; the first rule with any hit wins.
const KEYWORD_RULES: &[(LibraryCategory, &[&str])] = &[
    (
        LibraryCategory::Mcus,
        &[
            "microcontroller",
            "mcu",
            "stm32",
            "esp32",
            "esp8266",
            "atmega",
            "attiny",
            "rp2040",
            "arm cortex",
            "risc v",
        ],
    ),
    (
        LibraryCategory::Memory,
        &["memory", "eeprom", "flash", "sram", "dram", "fram", "nand", "nor"],
    ),
    (
        LibraryCategory::Power,
        &[
            "power management",
            "voltage regulator",
            "regulator",
            "ldo",
            "dc dc",
            "buck",
            "boost converter",
            "pmic",
            "battery management",
            "charger",
            "voltage reference",
        ],
    ),
    (
        LibraryCategory::Sensors,
        &[
            "sensor",
            "accelerometer",
            "gyroscope",
            "magnetometer",
            "hall effect",
            "humidity",
            "thermocouple",
            "imu",
        ],
    ),
    (
        LibraryCategory::Interface,
        &[
            "interface",
            "transceiver",
            "uart",
            "rs485",
            "rs232",
            "i2c",
            "ethernet",
            "phy",
            "level shifter",
            "level translator",
            "usb to",
        ],
    ),
    (
        LibraryCategory::Optocouplers,
        &["optocoupler", "photocoupler", "opto isolator", "optoisolator"],
    ),
    (
        LibraryCategory::Crystals,
        &["crystal", "oscillator", "resonator", "xtal"],
    ),
    (
        LibraryCategory::Connectors,
        &[
            "connector",
            "header",
            "socket",
            "terminal block",
            "receptacle",
            "usb type c",
            "jack",
        ],
    ),
    (
        LibraryCategory::Transistors,
        &["transistor", "mosfet", "bjt", "igbt", "jfet", "npn", "pnp"],
    ),
    (
        LibraryCategory::Diodes,
        &["diode", "led", "rectifier", "zener", "schottky", "tvs", "esd"],
    ),
    (
        LibraryCategory::Inductors,
        &["inductor", "ferrite", "choke"],
    ),
    (
        LibraryCategory::Capacitors,
        &["capacitor", "mlcc", "electrolytic", "tantalum", "supercap"],
    ),
    (
        LibraryCategory::Resistors,
        &["resistor", "thermistor", "varistor", "potentiometer", "rheostat"],
    ),
    (
        LibraryCategory::Ics,
        &[
            "integrated circuit",
            "amplifier",
            "op amp",
            "comparator",
            "driver",
            "logic",
            "timer",
            "adc",
            "dac",
            "controller",
            "ic",
        ],
    ),
];

/// Lowercases, turns separators into spaces, strips punctuation and
/// collapses runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() {
                Some(c)
            } else if c.is_whitespace() || matches!(c, '-' | '_' | '/' | ',' | ';' | '|' | '(' | ')' | '.' | ':' | '+' | '&') {
                Some(' ')
            } else {
                None
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Short keywords only count as whole words, longer ones as substrings.
fn keyword_matches(normalized: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.len() <= 3 {
        words.contains(&keyword)
    } else {
        normalized.contains(keyword)
    }
}

fn prefix_category(prefix: &str) -> Option<LibraryCategory> {
    let letters: String = prefix
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    if letters.is_empty() {
        return None;
    }
    let lookup = |key: &str| {
        PREFIX_TABLE
            .iter()
            .find(|(p, _)| *p == key)
            .map(|(_, c)| *c)
    };
    if letters.len() >= 2 {
        if let Some(category) = lookup(&letters[..2]) {
            return Some(category);
        }
    }
    lookup(&letters[..1])
}

/// Picks the library category for a component.
///
/// The prefix table wins; otherwise category and description text is scanned
/// against the ordered keyword rules; everything else is `Misc`.
pub fn get_library_category(
    prefix: Option<&str>,
    category: Option<&str>,
    description: Option<&str>,
) -> LibraryCategory {
    if let Some(hit) = prefix.and_then(prefix_category) {
        return hit;
    }

    let combined = format!(
        "{} {}",
        category.unwrap_or_default(),
        description.unwrap_or_default()
    );
    let normalized = normalize_text(&combined);
    if normalized.is_empty() {
        return LibraryCategory::Misc;
    }
    let words: Vec<&str> = normalized.split(' ').collect();

    KEYWORD_RULES
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| keyword_matches(&normalized, &words, k))
        })
        .map(|(category, _)| *category)
        .unwrap_or(LibraryCategory::Misc)
}

/// File name of the symbol library holding a category.
pub fn get_library_filename(category: LibraryCategory) -> String {
    format!("{}-{}.kicad_sym", LIBRARY_PREFIX, category.name())
}

/// Nickname of the symbol library, as used in `lib:symbol` references.
pub fn get_library_nickname(category: LibraryCategory) -> String {
    format!("{}-{}", LIBRARY_PREFIX, category.name())
}

/// Nickname of the shared footprint library.
pub fn get_footprint_library_name() -> &'static str {
    LIBRARY_PREFIX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_text("  DC-DC  Converters/Buck "), "dc dc converters buck");
        assert_eq!(normalize_text("Op-Amp's (Low-Noise)"), "op amps low noise");
    }

    #[test]
    fn test_two_letter_prefix_wins() {
        assert_eq!(get_library_category(Some("FB"), None, None), LibraryCategory::Inductors);
        assert_eq!(get_library_category(Some("LED"), None, None), LibraryCategory::Diodes);
        assert_eq!(get_library_category(Some("L"), None, None), LibraryCategory::Inductors);
        assert_eq!(
            get_library_category(Some("R"), Some("Microcontroller"), Some("MCU")),
            LibraryCategory::Resistors
        );
    }

    #[test]
    fn test_keyword_order_breaks_ties() {
        assert_eq!(
            get_library_category(
                None,
                Some("Light Emitting Diodes (LED)"),
                Some("LED indicator with right angle housing")
            ),
            LibraryCategory::Diodes
        );
        // A prefix outside the table still goes through the keyword rules.
        assert_eq!(
            get_library_category(Some("U"), Some("LED"), Some("Red LED driver IC")),
            LibraryCategory::Diodes
        );
        assert_eq!(
            get_library_category(
                None,
                Some("Microcontroller Units (MCUs/MPUs/SOCs)"),
                Some("ARM Cortex-M0+ MCU IC 48MHz")
            ),
            LibraryCategory::Mcus
        );
        assert_eq!(
            get_library_category(None, None, Some("LDO regulator IC")),
            LibraryCategory::Power
        );
        assert_eq!(
            get_library_category(None, None, Some("Quad 2-input AND gate IC")),
            LibraryCategory::Ics
        );
    }

    #[test]
    fn test_short_keywords_are_whole_words() {
        // "ic" must not hit inside "electric"; "led" must not hit inside "controlled".
        assert_eq!(
            get_library_category(Some("U"), Some("electric"), None),
            LibraryCategory::Misc
        );
        assert_eq!(
            get_library_category(None, None, Some("voltage controlled oscillator")),
            LibraryCategory::Crystals
        );
    }
}
