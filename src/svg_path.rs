//! Minimal SVG path-data reader.
//!
//! EasyEDA stores arcs, symbol paths and solid-region outlines as raw SVG
//! path strings. The reader resolves relative commands and shorthand forms
//! into absolute segments; a malformed tail ends parsing but keeps whatever
//! was read before it.

use crate::svg_arc::{endpoint_to_center, interpolate_arc};
use glam::DVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    CubicTo {
        ctrl1: DVec2,
        ctrl2: DVec2,
        end: DVec2,
    },
    QuadTo {
        ctrl: DVec2,
        end: DVec2,
    },
    ArcTo {
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: DVec2,
    },
    Close,
}

impl PathCommand {
    pub fn end_point(&self) -> Option<DVec2> {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
            PathCommand::CubicTo { end, .. }
            | PathCommand::QuadTo { end, .. }
            | PathCommand::ArcTo { end, .. } => Some(end),
            PathCommand::Close => None,
        }
    }
}

struct PathReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PathReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            if c.is_ascii_whitespace() || c == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn is_eof(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    fn peek_command(&mut self) -> Option<u8> {
        self.skip_separators();
        let c = *self.bytes.get(self.pos)?;
        if c.is_ascii_alphabetic() && c != b'e' && c != b'E' {
            Some(c)
        } else {
            None
        }
    }

    fn read_number(&mut self) -> Option<f64> {
        self.skip_separators();
        let start = self.pos;
        let mut seen_dot = false;
        let mut seen_exp = false;
        if matches!(self.bytes.get(self.pos), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while let Some(&c) = self.bytes.get(self.pos) {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    self.pos += 1;
                }
                b'e' | b'E' if !seen_exp => {
                    seen_exp = true;
                    self.pos += 1;
                    if matches!(self.bytes.get(self.pos), Some(b'+') | Some(b'-')) {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).ok()?;
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                self.pos = start;
                None
            }
        }
    }

    /// Arc flags may be packed without separators (`a1 1 0 011 1`).
    fn read_flag(&mut self) -> Option<bool> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Some(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Some(true)
            }
            _ => None,
        }
    }

    fn read_point(&mut self) -> Option<DVec2> {
        let x = self.read_number()?;
        let y = self.read_number()?;
        Some(DVec2::new(x, y))
    }
}

/// Parses SVG path data into absolute commands.
pub fn parse_path(d: &str) -> Vec<PathCommand> {
    let mut reader = PathReader::new(d);
    let mut commands = Vec::new();
    let mut current = DVec2::ZERO;
    let mut subpath_start = DVec2::ZERO;
    let mut last_cubic_ctrl: Option<DVec2> = None;
    let mut last_quad_ctrl: Option<DVec2> = None;
    let mut command: Option<u8> = None;

    while !reader.is_eof() {
        if let Some(c) = reader.peek_command() {
            reader.pos += 1;
            command = Some(c);
        }
        let Some(cmd) = command else {
            break;
        };
        let relative = cmd.is_ascii_lowercase();
        let base = if relative { current } else { DVec2::ZERO };

        let parsed = match cmd.to_ascii_uppercase() {
            b'M' => reader.read_point().map(|p| {
                current = base + p;
                subpath_start = current;
                // Implicit repeats of a moveto are linetos.
                command = Some(if relative { b'l' } else { b'L' });
                PathCommand::MoveTo(current)
            }),
            b'L' => reader.read_point().map(|p| {
                current = base + p;
                PathCommand::LineTo(current)
            }),
            b'H' => reader.read_number().map(|x| {
                current.x = if relative { current.x + x } else { x };
                PathCommand::LineTo(current)
            }),
            b'V' => reader.read_number().map(|y| {
                current.y = if relative { current.y + y } else { y };
                PathCommand::LineTo(current)
            }),
            b'C' => (|| {
                let c1 = base + reader.read_point()?;
                let c2 = base + reader.read_point()?;
                let end = base + reader.read_point()?;
                Some((c1, c2, end))
            })()
            .map(|(ctrl1, ctrl2, end)| {
                current = end;
                last_cubic_ctrl = Some(ctrl2);
                PathCommand::CubicTo { ctrl1, ctrl2, end }
            }),
            b'S' => (|| {
                let c2 = base + reader.read_point()?;
                let end = base + reader.read_point()?;
                Some((c2, end))
            })()
            .map(|(ctrl2, end)| {
                let ctrl1 = last_cubic_ctrl.map_or(current, |c| current * 2.0 - c);
                current = end;
                last_cubic_ctrl = Some(ctrl2);
                PathCommand::CubicTo { ctrl1, ctrl2, end }
            }),
            b'Q' => (|| {
                let c = base + reader.read_point()?;
                let end = base + reader.read_point()?;
                Some((c, end))
            })()
            .map(|(ctrl, end)| {
                current = end;
                last_quad_ctrl = Some(ctrl);
                PathCommand::QuadTo { ctrl, end }
            }),
            b'T' => reader.read_point().map(|p| {
                let ctrl = last_quad_ctrl.map_or(current, |c| current * 2.0 - c);
                let end = base + p;
                current = end;
                last_quad_ctrl = Some(ctrl);
                PathCommand::QuadTo { ctrl, end }
            }),
            b'A' => (|| {
                let rx = reader.read_number()?;
                let ry = reader.read_number()?;
                let x_axis_rotation = reader.read_number()?;
                let large_arc = reader.read_flag()?;
                let sweep = reader.read_flag()?;
                let end = base + reader.read_point()?;
                Some(PathCommand::ArcTo {
                    rx,
                    ry,
                    x_axis_rotation,
                    large_arc,
                    sweep,
                    end,
                })
            })()
            .inspect(|c| {
                if let Some(end) = c.end_point() {
                    current = end;
                }
            }),
            b'Z' => {
                current = subpath_start;
                // Z takes no arguments; clear it so stray numbers end parsing.
                command = None;
                Some(PathCommand::Close)
            }
            _ => None,
        };

        let Some(parsed) = parsed else {
            break;
        };
        if !matches!(parsed, PathCommand::CubicTo { .. }) {
            last_cubic_ctrl = None;
        }
        if !matches!(parsed, PathCommand::QuadTo { .. }) {
            last_quad_ctrl = None;
        }
        commands.push(parsed);
    }

    commands
}

/// Reduces a path to polylines, one per subpath.
///
/// Bezier curves contribute only their end points. Elliptical arcs are
/// sampled with [`interpolate_arc`] when `arc_segments_per_quarter` is set,
/// otherwise they also contribute only their end points.
pub fn flatten_path(
    commands: &[PathCommand],
    arc_segments_per_quarter: Option<u32>,
) -> Vec<Vec<DVec2>> {
    let mut subpaths: Vec<Vec<DVec2>> = Vec::new();
    let mut current: Vec<DVec2> = Vec::new();

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                if current.len() > 1 {
                    subpaths.push(std::mem::take(&mut current));
                }
                current.clear();
                current.push(p);
            }
            PathCommand::LineTo(end)
            | PathCommand::CubicTo { end, .. }
            | PathCommand::QuadTo { end, .. } => current.push(end),
            PathCommand::ArcTo {
                rx,
                ry,
                x_axis_rotation,
                large_arc,
                sweep,
                end,
            } => {
                let start = current.last().copied().unwrap_or(end);
                let sampled = arc_segments_per_quarter.and_then(|segments| {
                    endpoint_to_center(start, rx, ry, x_axis_rotation, large_arc, sweep, end)
                        .map(|arc| interpolate_arc(&arc, segments))
                });
                match sampled {
                    Some(points) => current.extend(points.into_iter().skip(1)),
                    None => current.push(end),
                }
            }
            PathCommand::Close => {
                if let Some(&first) = current.first() {
                    if current.last() != Some(&first) {
                        current.push(first);
                    }
                }
                if current.len() > 1 {
                    subpaths.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
    }
    if current.len() > 1 {
        subpaths.push(current);
    }
    subpaths
}
