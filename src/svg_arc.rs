//! SVG elliptical-arc parameterization.
//!
//! Converts the endpoint form used in SVG path data into center form
//! (SVG 1.1, appendix F.6.5) so arcs can be emitted as KiCad three-point
//! arcs or flattened into polygon outlines.

use glam::DVec2;
use std::f64::consts::{PI, TAU};

/// Center-form description of an elliptical arc. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: DVec2,
    pub rx: f64,
    pub ry: f64,
    /// X-axis rotation of the ellipse.
    pub phi: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    /// Signed sweep in `(-2π, 2π)`; positive when the sweep flag is set.
    pub delta_angle: f64,
}

impl ArcParams {
    /// Point on the ellipse at parametric angle `angle`.
    pub fn point_at(&self, angle: f64) -> DVec2 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_a, cos_a) = angle.sin_cos();
        DVec2::new(
            self.center.x + self.rx * cos_a * cos_phi - self.ry * sin_a * sin_phi,
            self.center.y + self.rx * cos_a * sin_phi + self.ry * sin_a * cos_phi,
        )
    }

    pub fn start_point(&self) -> DVec2 {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> DVec2 {
        self.point_at(self.end_angle)
    }

    /// Point halfway along the sweep, the middle point of a KiCad arc.
    pub fn mid_point(&self) -> DVec2 {
        self.point_at(self.start_angle + self.delta_angle / 2.0)
    }
}

fn vector_angle(u: DVec2, v: DVec2) -> f64 {
    let cross = u.x * v.y - u.y * v.x;
    let dot = u.x * v.x + u.y * v.y;
    cross.atan2(dot)
}

/// Converts SVG endpoint arc parameters into center form.
///
/// Returns `None` for a degenerate arc (a zero radius or coincident end
/// points); callers treat that as a straight line.
pub fn endpoint_to_center(
    p1: DVec2,
    rx: f64,
    ry: f64,
    phi_degrees: f64,
    large_arc: bool,
    sweep: bool,
    p2: DVec2,
) -> Option<ArcParams> {
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx < f64::EPSILON || ry < f64::EPSILON || !rx.is_finite() || !ry.is_finite() {
        return None;
    }
    if p1.distance(p2) < 1e-12 {
        return None;
    }

    let phi = phi_degrees.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let half = (p1 - p2) / 2.0;
    let x1p = cos_phi * half.x + sin_phi * half.y;
    let y1p = -sin_phi * half.x + cos_phi * half.y;

    // Scale radii up when they cannot span the chord.
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
    let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
    if den.abs() < f64::EPSILON {
        return None;
    }
    let mut coef = (num / den).max(0.0).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let mid = (p1 + p2) / 2.0;
    let center = DVec2::new(
        cos_phi * cxp - sin_phi * cyp + mid.x,
        sin_phi * cxp + cos_phi * cyp + mid.y,
    );

    let u = DVec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v = DVec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
    let start_angle = vector_angle(DVec2::X, u);
    let mut delta_angle = vector_angle(u, v) % TAU;
    if !sweep && delta_angle > 0.0 {
        delta_angle -= TAU;
    } else if sweep && delta_angle < 0.0 {
        delta_angle += TAU;
    }

    Some(ArcParams {
        center,
        rx,
        ry,
        phi,
        start_angle,
        end_angle: start_angle + delta_angle,
        delta_angle,
    })
}

/// Samples an arc into a polyline that includes both end points.
///
/// The segment count grows with the swept angle, `segments_per_quarter`
/// segments per 90 degrees and never fewer than two.
pub fn interpolate_arc(params: &ArcParams, segments_per_quarter: u32) -> Vec<DVec2> {
    let degrees = params.delta_angle.abs() * 180.0 / PI;
    let segments = ((degrees / 90.0) * segments_per_quarter as f64).ceil().max(2.0) as usize;
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            params.point_at(params.start_angle + params.delta_angle * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec2, b: DVec2) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_half_circle_sweep_sign() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(10.0, 0.0);
        let cw = endpoint_to_center(a, 5.0, 5.0, 0.0, false, true, b).unwrap();
        assert!(close(cw.center, DVec2::new(5.0, 0.0)));
        assert!(cw.delta_angle > 0.0);
        let ccw = endpoint_to_center(a, 5.0, 5.0, 0.0, false, false, b).unwrap();
        assert!(ccw.delta_angle < 0.0);
        assert!((cw.delta_angle.abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_radius_correction() {
        let arc = endpoint_to_center(
            DVec2::new(0.0, 0.0),
            1.0,
            1.0,
            0.0,
            false,
            true,
            DVec2::new(10.0, 0.0),
        )
        .unwrap();
        assert!((arc.rx - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate() {
        let p = DVec2::new(1.0, 1.0);
        assert!(endpoint_to_center(p, 0.0, 5.0, 0.0, false, true, DVec2::ZERO).is_none());
        assert!(endpoint_to_center(p, 5.0, 5.0, 0.0, false, true, p).is_none());
    }

    #[test]
    fn test_round_trip_rotated_ellipse() {
        let p1 = DVec2::new(3.0, -2.0);
        let p2 = DVec2::new(-1.5, 4.0);
        for &(large, sweep) in &[(false, false), (false, true), (true, false), (true, true)] {
            let arc = endpoint_to_center(p1, 6.0, 3.5, 30.0, large, sweep, p2).unwrap();
            assert!(close(arc.start_point(), p1));
            assert!(close(arc.end_point(), p2));
            assert!(arc.delta_angle.abs() < TAU);
            assert_eq!(arc.delta_angle > 0.0, sweep);
        }
    }

    #[test]
    fn test_interpolation_segment_count() {
        let arc = endpoint_to_center(
            DVec2::new(0.0, 0.0),
            5.0,
            5.0,
            0.0,
            false,
            true,
            DVec2::new(10.0, 0.0),
        )
        .unwrap();
        // 180 degrees at 4 per quarter is 8 segments, 9 points.
        assert_eq!(interpolate_arc(&arc, 4).len(), 9);
        // Floor of two segments.
        let small = endpoint_to_center(
            DVec2::new(0.0, 0.0),
            100.0,
            100.0,
            0.0,
            false,
            true,
            DVec2::new(1.0, 0.0),
        )
        .unwrap();
        assert_eq!(interpolate_arc(&small, 1).len(), 3);
    }
}
