use super::kicad_extract::{extract_from_kicad_footprint, extract_from_kicad_symbol};
use super::svg_extract::{extract_from_svg_footprint, extract_from_svg_symbol};
use super::{
    CompareOptions, Diff, FootprintComparisonResult, FootprintData, PadInfo, PinInfo, Severity,
    SymbolComparisonResult, SymbolData,
};
use glam::DVec2;
use log::debug;

/// Pairs reference items with generated ones.
///
/// Numbered items only match the same number, nearest first; unnumbered
/// items match the nearest unnumbered generated item.
struct Matching {
    pairs: Vec<(usize, usize)>,
    missing: Vec<usize>,
    extra: Vec<usize>,
}

fn match_items<T>(
    reference: &[T],
    generated: &[T],
    number: impl Fn(&T) -> &str,
    position: impl Fn(&T) -> DVec2,
) -> Matching {
    let mut used = vec![false; generated.len()];
    let mut pairs = Vec::new();
    let mut missing = Vec::new();

    for (i, item) in reference.iter().enumerate() {
        let wanted = number(item);
        let here = position(item);
        let best = generated
            .iter()
            .enumerate()
            .filter(|(j, candidate)| !used[*j] && number(candidate) == wanted)
            .min_by(|(_, a), (_, b)| {
                here.distance(position(a))
                    .total_cmp(&here.distance(position(b)))
            })
            .map(|(j, _)| j);
        match best {
            Some(j) => {
                used[j] = true;
                pairs.push((i, j));
            }
            None => missing.push(i),
        }
    }

    let extra = used
        .iter()
        .enumerate()
        .filter(|(_, taken)| !**taken)
        .map(|(j, _)| j)
        .collect();
    Matching {
        pairs,
        missing,
        extra,
    }
}

fn fmt_point(p: DVec2) -> String {
    format!("({:.3}, {:.3})", p.x, p.y)
}

fn fmt_size(w: f64, h: f64) -> String {
    format!("{:.3} x {:.3}", w, h)
}

/// Rect-like and round shapes compare as two families.
fn shape_family(shape: &str) -> u8 {
    match shape {
        "polygon" | "rect" | "roundrect" | "custom" | "trapezoid" => 0,
        "circle" | "oval" | "ellipse" => 1,
        _ => 2,
    }
}

/// `~`, `~{X}` and plain names compare on their visible text.
fn normalize_pin_name(name: &str) -> String {
    let name = name.trim();
    if name == "~" {
        return String::new();
    }
    name.replace("~{", "").replace('}', "").replace('~', "")
}

struct DiffLog<'a> {
    options: &'a CompareOptions,
    diffs: Vec<Diff>,
}

impl<'a> DiffLog<'a> {
    fn new(options: &'a CompareOptions) -> Self {
        Self {
            options,
            diffs: Vec::new(),
        }
    }

    fn push(
        &mut self,
        severity: Severity,
        item: &str,
        number: &str,
        field: &str,
        expected: String,
        actual: String,
    ) {
        self.diffs.push(Diff {
            severity,
            item: item.to_string(),
            number: number.to_string(),
            field: field.to_string(),
            expected,
            actual,
        });
    }

    fn position(&mut self, item: &str, number: &str, expected: DVec2, actual: DVec2) {
        if expected.distance(actual) > self.options.position_tolerance {
            self.push(
                Severity::Error,
                item,
                number,
                "position",
                fmt_point(expected),
                fmt_point(actual),
            );
        }
    }

    fn size_severity(&self) -> Severity {
        if self.options.size_as_error {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    fn missing(&mut self, item: &str, number: &str, at: DVec2) {
        self.push(
            Severity::Error,
            item,
            number,
            "missing",
            fmt_point(at),
            String::new(),
        );
    }

    fn extra(&mut self, item: &str, number: &str, at: DVec2) {
        if self.options.report_extra {
            self.push(
                Severity::Warning,
                item,
                number,
                "extra",
                String::new(),
                fmt_point(at),
            );
        }
    }

    fn counts(&self) -> (usize, usize) {
        let errors = self
            .diffs
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        (errors, self.diffs.len() - errors)
    }
}

fn compare_pad(log: &mut DiffLog, reference: &PadInfo, generated: &PadInfo) {
    let number = reference.number.as_str();
    log.position(
        "pad",
        number,
        DVec2::new(reference.x, reference.y),
        DVec2::new(generated.x, generated.y),
    );

    let tol = log.options.size_tolerance;
    let close = |a: f64, b: f64| (a - b).abs() <= tol;
    let straight = close(reference.width, generated.width) && close(reference.height, generated.height);
    let swapped = close(reference.width, generated.height) && close(reference.height, generated.width);
    if !straight && !swapped {
        let severity = log.size_severity();
        log.push(
            severity,
            "pad",
            number,
            "size",
            fmt_size(reference.width, reference.height),
            fmt_size(generated.width, generated.height),
        );
    }

    if shape_family(&reference.shape) != shape_family(&generated.shape) {
        log.push(
            Severity::Warning,
            "pad",
            number,
            "shape",
            reference.shape.clone(),
            generated.shape.clone(),
        );
    }

    if reference.has_hole != generated.has_hole {
        log.push(
            Severity::Error,
            "pad",
            number,
            "hole",
            reference.has_hole.to_string(),
            generated.has_hole.to_string(),
        );
    } else if reference.has_hole && !close(reference.hole_radius, generated.hole_radius) {
        let severity = log.size_severity();
        log.push(
            severity,
            "pad",
            number,
            "holeSize",
            format!("{:.3}", reference.hole_radius),
            format!("{:.3}", generated.hole_radius),
        );
    }
}

/// Diffs reference footprint geometry against generated geometry.
pub fn compare_footprints(
    reference: &FootprintData,
    generated: &FootprintData,
    options: &CompareOptions,
) -> FootprintComparisonResult {
    let mut log = DiffLog::new(options);

    let pads = match_items(
        &reference.pads,
        &generated.pads,
        |p| p.number.as_str(),
        |p| DVec2::new(p.x, p.y),
    );
    for &(i, j) in &pads.pairs {
        compare_pad(&mut log, &reference.pads[i], &generated.pads[j]);
    }
    for &i in &pads.missing {
        let pad = &reference.pads[i];
        log.missing("pad", &pad.number, DVec2::new(pad.x, pad.y));
    }
    for &j in &pads.extra {
        let pad = &generated.pads[j];
        log.extra("pad", &pad.number, DVec2::new(pad.x, pad.y));
    }

    let vias = match_items(&reference.vias, &generated.vias, |_| "", |v| DVec2::new(v.x, v.y));
    for &(i, j) in &vias.pairs {
        let (r, g) = (&reference.vias[i], &generated.vias[j]);
        log.position("via", "", DVec2::new(r.x, r.y), DVec2::new(g.x, g.y));
        if (r.diameter - g.diameter).abs() > options.size_tolerance {
            let severity = log.size_severity();
            log.push(
                severity,
                "via",
                "",
                "size",
                format!("{:.3}", r.diameter),
                format!("{:.3}", g.diameter),
            );
        }
    }
    for &i in &vias.missing {
        let via = &reference.vias[i];
        log.missing("via", "", DVec2::new(via.x, via.y));
    }
    for &j in &vias.extra {
        let via = &generated.vias[j];
        log.extra("via", "", DVec2::new(via.x, via.y));
    }

    let holes = match_items(&reference.holes, &generated.holes, |_| "", |h| DVec2::new(h.x, h.y));
    for &(i, j) in &holes.pairs {
        let (r, g) = (&reference.holes[i], &generated.holes[j]);
        log.position("hole", "", DVec2::new(r.x, r.y), DVec2::new(g.x, g.y));
        if (r.radius - g.radius).abs() > options.size_tolerance {
            let severity = log.size_severity();
            log.push(
                severity,
                "hole",
                "",
                "size",
                format!("{:.3}", r.radius),
                format!("{:.3}", g.radius),
            );
        }
    }
    for &i in &holes.missing {
        let hole = &reference.holes[i];
        log.missing("hole", "", DVec2::new(hole.x, hole.y));
    }
    for &j in &holes.extra {
        let hole = &generated.holes[j];
        log.extra("hole", "", DVec2::new(hole.x, hole.y));
    }

    let (error_count, warning_count) = log.counts();
    let pad_count_match = reference.pads.len() == generated.pads.len();
    debug!(
        "footprint comparison: {} pads vs {}, {} errors, {} warnings",
        reference.pads.len(),
        generated.pads.len(),
        error_count,
        warning_count
    );

    FootprintComparisonResult {
        passed: error_count == 0 && pad_count_match,
        pad_count_match,
        reference_pad_count: reference.pads.len(),
        generated_pad_count: generated.pads.len(),
        error_count,
        warning_count,
        diffs: log.diffs,
        error: None,
    }
}

fn compare_pin(log: &mut DiffLog, reference: &PinInfo, generated: &PinInfo) {
    let number = reference.number.as_str();
    log.position(
        "pin",
        number,
        DVec2::new(reference.x, reference.y),
        DVec2::new(generated.x, generated.y),
    );

    let (expected, actual) = (
        normalize_pin_name(&reference.name),
        normalize_pin_name(&generated.name),
    );
    if !expected.eq_ignore_ascii_case(&actual) {
        log.push(Severity::Warning, "pin", number, "name", expected, actual);
    }

    if (reference.length - generated.length).abs() > log.options.size_tolerance {
        log.push(
            Severity::Warning,
            "pin",
            number,
            "length",
            format!("{:.3}", reference.length),
            format!("{:.3}", generated.length),
        );
    }
}

/// Diffs reference symbol pins against generated pins.
///
/// Both sides are first centered on their own pin bounding box, so a symbol
/// drawn around a different origin still compares equal.
pub fn compare_symbols(
    reference: &SymbolData,
    generated: &SymbolData,
    options: &CompareOptions,
) -> SymbolComparisonResult {
    let reference = reference.centered();
    let generated = generated.centered();
    let mut log = DiffLog::new(options);

    let pins = match_items(
        &reference.pins,
        &generated.pins,
        |p| p.number.as_str(),
        |p| DVec2::new(p.x, p.y),
    );
    for &(i, j) in &pins.pairs {
        compare_pin(&mut log, &reference.pins[i], &generated.pins[j]);
    }
    for &i in &pins.missing {
        let pin = &reference.pins[i];
        log.missing("pin", &pin.number, DVec2::new(pin.x, pin.y));
    }
    for &j in &pins.extra {
        let pin = &generated.pins[j];
        log.extra("pin", &pin.number, DVec2::new(pin.x, pin.y));
    }

    let (error_count, warning_count) = log.counts();
    let pin_count_match = reference.pins.len() == generated.pins.len();

    SymbolComparisonResult {
        passed: error_count == 0 && pin_count_match,
        pin_count_match,
        reference_pin_count: reference.pins.len(),
        generated_pin_count: generated.pins.len(),
        error_count,
        warning_count,
        diffs: log.diffs,
        error: None,
    }
}

/// Extracts both sides and compares them; extraction failures become a failed result.
pub fn validate_footprint(
    reference_svg: &str,
    generated_kicad: &str,
    options: &CompareOptions,
) -> FootprintComparisonResult {
    let failed = |error: String| FootprintComparisonResult {
        error: Some(error),
        ..Default::default()
    };
    let reference = match extract_from_svg_footprint(reference_svg) {
        Ok(data) => data,
        Err(e) => return failed(format!("reference SVG: {}", e)),
    };
    let generated = match extract_from_kicad_footprint(generated_kicad) {
        Ok(data) => data,
        Err(e) => return failed(format!("generated footprint: {}", e)),
    };
    compare_footprints(&reference, &generated, options)
}

pub fn validate_symbol(
    reference_svg: &str,
    generated_kicad: &str,
    options: &CompareOptions,
) -> SymbolComparisonResult {
    let failed = |error: String| SymbolComparisonResult {
        error: Some(error),
        ..Default::default()
    };
    let reference = match extract_from_svg_symbol(reference_svg) {
        Ok(data) => data,
        Err(e) => return failed(format!("reference SVG: {}", e)),
    };
    let generated = match extract_from_kicad_symbol(generated_kicad) {
        Ok(data) => data,
        Err(e) => return failed(format!("generated symbol: {}", e)),
    };
    compare_symbols(&reference, &generated, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(number: &str, x: f64, y: f64, w: f64, h: f64) -> PadInfo {
        PadInfo {
            number: number.to_string(),
            shape: "rect".to_string(),
            x,
            y,
            width: w,
            height: h,
            rotation: 0.0,
            has_hole: false,
            hole_radius: 0.0,
            layer_id: 1,
        }
    }

    fn footprint(pads: Vec<PadInfo>) -> FootprintData {
        let mut data = FootprintData {
            pads,
            ..Default::default()
        };
        data.compute_bounds();
        data
    }

    #[test]
    fn test_identical_footprints_pass() {
        let data = footprint(vec![pad("1", -1.0, 0.0, 1.0, 0.6), pad("2", 1.0, 0.0, 1.0, 0.6)]);
        let result = compare_footprints(&data, &data, &CompareOptions::default());
        assert!(result.passed);
        assert!(result.pad_count_match);
        assert!(result.diffs.is_empty());
    }

    #[test]
    fn test_swapped_size_is_accepted() {
        let reference = footprint(vec![pad("1", 0.0, 0.0, 1.0, 0.6)]);
        let generated = footprint(vec![pad("1", 0.0, 0.0, 0.6, 1.0)]);
        let result = compare_footprints(&reference, &generated, &CompareOptions::default());
        assert!(result.passed);
        assert_eq!(result.warning_count, 0);
    }

    #[test]
    fn test_size_mismatch_severity_follows_options() {
        let reference = footprint(vec![pad("1", 0.0, 0.0, 1.0, 0.6)]);
        let generated = footprint(vec![pad("1", 0.0, 0.0, 1.5, 0.6)]);

        let lenient = compare_footprints(&reference, &generated, &CompareOptions::default());
        assert!(lenient.passed);
        assert_eq!(lenient.warning_count, 1);
        assert_eq!(lenient.diffs[0].field, "size");

        let strict = CompareOptions {
            size_as_error: true,
            ..Default::default()
        };
        assert!(!compare_footprints(&reference, &generated, &strict).passed);
    }

    #[test]
    fn test_numbered_pads_match_by_number_not_proximity() {
        let reference = footprint(vec![pad("1", -1.0, 0.0, 1.0, 1.0), pad("2", 1.0, 0.0, 1.0, 1.0)]);
        let generated = footprint(vec![pad("2", -1.0, 0.0, 1.0, 1.0), pad("1", 1.0, 0.0, 1.0, 1.0)]);
        let result = compare_footprints(&reference, &generated, &CompareOptions::default());
        assert!(!result.passed);
        assert_eq!(result.error_count, 2);
        assert!(result.diffs.iter().all(|d| d.field == "position"));
    }

    #[test]
    fn test_shape_family_mismatch_is_a_warning() {
        let reference = footprint(vec![pad("1", 0.0, 0.0, 1.0, 1.0)]);
        let mut round = pad("1", 0.0, 0.0, 1.0, 1.0);
        round.shape = "circle".to_string();
        let generated = footprint(vec![round]);
        let result = compare_footprints(&reference, &generated, &CompareOptions::default());
        assert!(result.passed);
        assert_eq!(result.diffs[0].field, "shape");

        let mut poly = pad("1", 0.0, 0.0, 1.0, 1.0);
        poly.shape = "polygon".to_string();
        let result = compare_footprints(&reference, &footprint(vec![poly]), &CompareOptions::default());
        assert!(result.diffs.is_empty());
    }

    #[test]
    fn test_extra_pads_can_be_silenced() {
        let reference = footprint(vec![pad("1", 0.0, 0.0, 1.0, 1.0)]);
        let generated = footprint(vec![pad("1", 0.0, 0.0, 1.0, 1.0), pad("2", 2.0, 0.0, 1.0, 1.0)]);
        let result = compare_footprints(&reference, &generated, &CompareOptions::default());
        assert!(!result.passed);
        assert!(!result.pad_count_match);
        assert_eq!(result.diffs[0].field, "extra");
        assert_eq!(result.diffs[0].severity, Severity::Warning);

        let quiet = CompareOptions {
            report_extra: false,
            ..Default::default()
        };
        assert!(compare_footprints(&reference, &generated, &quiet).diffs.is_empty());
    }

    #[test]
    fn test_pin_names_compare_on_visible_text() {
        assert_eq!(normalize_pin_name("~"), "");
        assert_eq!(normalize_pin_name("~{RESET}"), "RESET");
        assert_eq!(normalize_pin_name("~RESET"), "RESET");
    }

    #[test]
    fn test_validate_reports_parse_failure() {
        let result = validate_footprint("<svg>", "(footprint)", &CompareOptions::default());
        assert!(!result.passed);
        assert!(result.error.unwrap().starts_with("reference SVG"));

        let result = validate_symbol("<svg/>", "(kicad_symbol_lib", &CompareOptions::default());
        assert!(!result.passed);
        assert!(result.error.unwrap().starts_with("generated symbol"));
    }
}
