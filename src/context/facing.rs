use crate::geom::polygon::Polygon;

/// Whether two polygons can see each other.
///
/// The vector from the centroid of `b` to the centroid of `a` must point
/// against the normal of `a` and along the normal of `b`. This is necessary
/// for visibility but not sufficient.
pub fn are_facing(a: &Polygon, b: &Polygon) -> bool {
    let v = a.centroid() - b.centroid();
    v.dot(&a.normal()) < 0. && v.dot(&b.normal()) > 0.
}
