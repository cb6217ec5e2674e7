//! Primitive joint geometry
//!
//! Pure functions over image-plane points. Nothing here looks at visibility;
//! the gated measures in `measures.rs` decide that before calling in.

use nalgebra::Vector2;

/// Vectors shorter than this are treated as zero length
const MIN_MAGNITUDE: f32 = 1e-6;

/// Angle at `vertex` between the rays toward `a` and `c`, in degrees (0-180)
///
/// Uses the difference of the two ray headings (`atan2`), so the result is
/// reflected into the half turn: 200° becomes 160°.
pub fn angle_at(a: Vector2<f32>, vertex: Vector2<f32>, c: Vector2<f32>) -> f32 {
    let to_a = a - vertex;
    let to_c = c - vertex;
    let radians = to_c.y.atan2(to_c.x) - to_a.y.atan2(to_a.x);
    fold_half_turn(radians.to_degrees().abs())
}

/// Fold an unsigned angle in [0, 360) into [0, 180]
pub fn fold_half_turn(degrees: f32) -> f32 {
    degrees.min(360.0 - degrees)
}

/// Angle of the segment `p1 -> p2` away from true vertical, in degrees
///
/// Image y grows downward, so straight up from `p1` reads 0°.
pub fn vertical_angle(p1: Vector2<f32>, p2: Vector2<f32>) -> f32 {
    let d = p2 - p1;
    d.x.atan2(-d.y).to_degrees().abs()
}

/// Euclidean distance
pub fn distance(p1: Vector2<f32>, p2: Vector2<f32>) -> f32 {
    (p2 - p1).norm()
}

/// Angle between `reference -> p1` and `reference -> p2` using the dot product
///
/// Cosine is clamped before `acos` so rounding can't leave its domain.
/// Returns 0 when either vector has no length.
pub fn angle_deg(p1: Vector2<f32>, reference: Vector2<f32>, p2: Vector2<f32>) -> f32 {
    let v1 = p1 - reference;
    let v2 = p2 - reference;
    let mag1 = v1.norm();
    let mag2 = v2.norm();

    if mag1 < MIN_MAGNITUDE || mag2 < MIN_MAGNITUDE {
        return 0.0;
    }

    let cos_angle = (v1.dot(&v2) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Vector2<f32> {
        Vector2::new(x, y)
    }

    #[test]
    fn test_straight_limb() {
        let angle = angle_at(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((angle - 180.0).abs() < 0.01);
    }

    #[test]
    fn test_bent_limb() {
        let angle = angle_at(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5));
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_reflex_angle_is_folded() {
        // Rays at 170° and -170°: raw difference is 340°
        let a = p(-1.0, 0.1763);
        let c = p(-1.0, -0.1763);
        let angle = angle_at(a, p(0.0, 0.0), c);
        assert!((angle - 20.0).abs() < 0.1);
    }

    #[test]
    fn test_vertical_angle() {
        assert!(vertical_angle(p(0.5, 0.6), p(0.5, 0.3)).abs() < 0.01);
        assert!((vertical_angle(p(0.5, 0.6), p(0.6, 0.5)) - 45.0).abs() < 0.01);
        assert!((vertical_angle(p(0.5, 0.6), p(0.4, 0.5)) - 45.0).abs() < 0.01);
    }

    #[test]
    fn test_distance() {
        assert!((distance(p(0.0, 0.0), p(0.3, 0.4)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_angle_deg_matches_angle_at() {
        let (a, v, c) = (p(0.2, 0.1), p(0.4, 0.5), p(0.7, 0.6));
        assert!((angle_deg(a, v, c) - angle_at(a, v, c)).abs() < 0.01);
    }

    #[test]
    fn test_angle_deg_degenerate() {
        assert_eq!(angle_deg(p(0.5, 0.5), p(0.5, 0.5), p(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_angle_deg_collinear_does_not_nan() {
        let angle = angle_deg(p(0.1, 0.1), p(0.2, 0.2), p(0.3, 0.3));
        assert!(!angle.is_nan());
        assert!((angle - 180.0).abs() < 0.1);
    }
}
