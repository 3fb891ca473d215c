//! Converting glyph outlines to kurbo paths

use kurbo::{Affine, BezPath, Point, Vec2};
use sfnt_types::GlyphId;

use crate::read::ReadError;

use super::{Anchor, Component, CompositeGlyphFlags, Glyf, Glyph, SimpleGlyph};

/// Composite glyphs nested deeper than this are rejected.
const COMPOSITE_RECURSION_LIMIT: usize = 32;

/// Errors that can occur when converting a glyph to a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutlineError {
    Read(ReadError),
    /// Components were nested too deeply, or a glyph refers to itself.
    RecursionLimitExceeded(GlyphId),
    /// A point anchor named a point that does not exist.
    InvalidAnchorPoint { glyph: GlyphId, point: u16 },
}

impl std::fmt::Display for OutlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlineError::Read(err) => write!(f, "{err}"),
            OutlineError::RecursionLimitExceeded(gid) => {
                write!(f, "Recursion limit exceeded while loading glyph {gid}")
            }
            OutlineError::InvalidAnchorPoint { glyph, point } => {
                write!(f, "Glyph {glyph} has no point {point} for anchoring")
            }
        }
    }
}

impl std::error::Error for OutlineError {}

impl From<ReadError> for OutlineError {
    fn from(src: ReadError) -> OutlineError {
        OutlineError::Read(src)
    }
}

type PointContour = Vec<(Point, bool)>;

impl SimpleGlyph {
    /// Convert this glyph's contours to a path of lines and quadratic curves.
    ///
    /// Consecutive off-curve points have an implied on-curve point at their
    /// midpoint.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for contour in simple_contours(self) {
            append_contour(&mut path, &contour);
        }
        path
    }
}

impl Glyf {
    /// The outline of this glyph, with components resolved.
    ///
    /// Glyphs with no data have an empty outline.
    pub fn outline(&mut self, gid: GlyphId) -> Result<BezPath, OutlineError> {
        let mut path = BezPath::new();
        for contour in self.contours_for(gid, 0)? {
            append_contour(&mut path, &contour);
        }
        Ok(path)
    }

    fn contours_for(
        &mut self,
        gid: GlyphId,
        depth: usize,
    ) -> Result<Vec<PointContour>, OutlineError> {
        if depth > COMPOSITE_RECURSION_LIMIT {
            return Err(OutlineError::RecursionLimitExceeded(gid));
        }
        match self.get_glyph(gid)?.cloned() {
            None | Some(Glyph::Empty(_)) => Ok(Vec::new()),
            Some(Glyph::Simple(simple)) => Ok(simple_contours(&simple)),
            Some(Glyph::Composite(composite)) => {
                let mut contours = Vec::new();
                for component in composite.components() {
                    let mut child = self.contours_for(component.glyph, depth + 1)?;
                    place_component(component, gid, &contours, &mut child)?;
                    contours.extend(child);
                }
                Ok(contours)
            }
        }
    }
}

fn simple_contours(glyph: &SimpleGlyph) -> Vec<PointContour> {
    glyph
        .contours()
        .iter()
        .map(|contour| {
            contour
                .iter()
                .map(|p| (Point::new(p.x as f64, p.y as f64), p.on_curve))
                .collect()
        })
        .collect()
}

fn transform_affine(component: &Component) -> Affine {
    let t = component.transform;
    Affine::new([
        t.xx.to_f32() as f64,
        t.yx.to_f32() as f64,
        t.xy.to_f32() as f64,
        t.yy.to_f32() as f64,
        0.0,
        0.0,
    ])
}

/// Apply the component's transform to `child`, then move it into place.
fn place_component(
    component: &Component,
    parent: GlyphId,
    placed: &[PointContour],
    child: &mut [PointContour],
) -> Result<(), OutlineError> {
    let affine = transform_affine(component);
    child
        .iter_mut()
        .flatten()
        .for_each(|(point, _)| *point = affine * *point);

    let offset = match component.anchor {
        Anchor::Offset { x, y } => {
            let offset = Vec2::new(x as f64, y as f64);
            let scaled = component
                .flags
                .contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET)
                && !component
                    .flags
                    .contains(CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET);
            if scaled {
                (affine * offset.to_point()).to_vec2()
            } else {
                offset
            }
        }
        Anchor::Point { base, component: point } => {
            let base_pt = nth_point(placed, base).ok_or(OutlineError::InvalidAnchorPoint {
                glyph: parent,
                point: base,
            })?;
            let child_pt = nth_point(child, point).ok_or(OutlineError::InvalidAnchorPoint {
                glyph: component.glyph,
                point,
            })?;
            base_pt - child_pt
        }
    };
    child
        .iter_mut()
        .flatten()
        .for_each(|(point, _)| *point += offset);
    Ok(())
}

fn nth_point(contours: &[PointContour], idx: u16) -> Option<Point> {
    contours
        .iter()
        .flatten()
        .nth(idx as usize)
        .map(|(point, _)| *point)
}

fn append_contour(path: &mut BezPath, contour: &[(Point, bool)]) {
    let n = contour.len();
    if n == 0 {
        return;
    }
    // start on the first on-curve point, or at an implied one if there are none
    let (start, first_idx, count) = match contour.iter().position(|(_, on)| *on) {
        Some(i) => (contour[i].0, i + 1, n - 1),
        None => (contour[n - 1].0.midpoint(contour[0].0), 0, n),
    };
    path.move_to(start);
    let mut pending_off: Option<Point> = None;
    for j in 0..count {
        let (point, on_curve) = contour[(first_idx + j) % n];
        match (on_curve, pending_off.take()) {
            (true, Some(control)) => path.quad_to(control, point),
            (true, None) => path.line_to(point),
            (false, Some(control)) => {
                path.quad_to(control, control.midpoint(point));
                pending_off = Some(point);
            }
            (false, None) => pending_off = Some(point),
        }
    }
    if let Some(control) = pending_off {
        path.quad_to(control, start);
    }
    path.close_path();
}
