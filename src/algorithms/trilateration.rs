//! Closed-form three-sphere trilateration
//!
//! Builds an orthonormal basis on the three reference points and intersects the range
//! spheres in it. Three ranges leave a mirror ambiguity across the reference plane;
//! the non-negative root is always taken, so a target on the other side comes out
//! reflected. A fourth range would be needed to tell the two apart.

use crate::algorithms::vector::{cross, distance, dot, normalize, Vec3};
use crate::core::constants::COLLINEARITY_EPSILON;

/// Failure modes of a single fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrilaterationError {
    /// Reference points are collinear or coincident; `j` is the in-plane offset of p2
    Degenerate { j: f64 },
}

/// Reference frame spanned by three points, with `p0` at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrilaterationBasis {
    pub origin: Vec3,
    pub ex: Vec3,
    pub ey: Vec3,
    pub ez: Vec3,
    /// |p1 - p0|
    pub d: f64,
    /// Projection of p2 - p0 on `ex`
    pub i: f64,
    /// Projection of p2 - p0 on `ey`
    pub j: f64,
}

impl TrilaterationBasis {
    pub fn new(p0: &Vec3, p1: &Vec3, p2: &Vec3) -> Result<Self, TrilaterationError> {
        let ex = normalize(&(p1 - p0));
        let i = dot(&ex, &(p2 - p0));
        let ey = normalize(&(p2 - p0 - ex * i));
        let ez = cross(&ex, &ey);

        let d = distance(p0, p1);
        let j = dot(&ey, &(p2 - p0));

        // Coincident p0 and p1 leave `ex` undefined and `d` zero
        if d < COLLINEARITY_EPSILON || j.abs() < COLLINEARITY_EPSILON {
            return Err(TrilaterationError::Degenerate { j });
        }

        Ok(Self {
            origin: *p0,
            ex,
            ey,
            ez,
            d,
            i,
            j,
        })
    }

    /// Intersection of the three range spheres, upper root
    pub fn solve(&self, ranges: [f64; 3]) -> Vec3 {
        let [r0, r1, r2] = ranges;
        let (d, i, j) = (self.d, self.i, self.j);

        let x = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
        let y = (r0 * r0 - r2 * r2 + i * i + j * j - 2.0 * i * x) / (2.0 * j);
        let z = (r0 * r0 - x * x - y * y).max(0.0).sqrt();

        self.origin + self.ex * x + self.ey * y + self.ez * z
    }
}

/// Position at ranges `ranges` from the points `references`
pub fn trilaterate(references: [&Vec3; 3], ranges: [f64; 3]) -> Result<Vec3, TrilaterationError> {
    let [p0, p1, p2] = references;
    Ok(TrilaterationBasis::new(p0, p1, p2)?.solve(ranges))
}
