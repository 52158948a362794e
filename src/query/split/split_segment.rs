use crate::math::{Point, Real, UnitVector};

/// Smallest blend factor an intersection point may take along an edge.
///
/// Intersections landing closer than this to an endpoint are nudged inward so
/// that subdividing the edge never produces a zero-length segment.
pub const MIN_BLEND_FACTOR: Real = 1.0e-4;

/// Largest blend factor an intersection point may take along an edge.
pub const MAX_BLEND_FACTOR: Real = 1.0 - 1.0e-4;

/// Computes the intersection between the segment `[a, b]` and the plane with
/// normal `local_axis` located at the signed distance `bias` from the origin.
///
/// Returns the intersection point and its blend factor along `ab`, or `None`
/// if the segment is parallel to the plane or doesn't reach it.
pub fn segment_plane_intersection(
    a: &Point<Real>,
    b: &Point<Real>,
    local_axis: &UnitVector<Real>,
    bias: Real,
) -> Option<(Point<Real>, Real)> {
    let dir = b - a;
    let dist_a = bias - local_axis.dot(&a.coords);
    let denom = local_axis.dot(&dir);

    // A zero-length or plane-parallel segment has no usable intersection.
    if relative_eq!(denom, 0.0) {
        return None;
    }

    let bcoord = dist_a / denom;
    if bcoord < 0.0 || bcoord > 1.0 {
        return None;
    }

    let bcoord = bcoord.clamp(MIN_BLEND_FACTOR, MAX_BLEND_FACTOR);
    Some((a + dir * bcoord, bcoord))
}
