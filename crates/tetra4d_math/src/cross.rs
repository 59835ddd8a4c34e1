//! 4D cross product and point queries

use crate::Vec4;

#[inline]
fn cross3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn dot3(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Drop one axis of a Vec4, keeping the other three in order.
#[inline]
fn drop_axis(v: Vec4, axis: usize) -> [f32; 3] {
    match axis {
        0 => [v.y, v.z, v.w],
        1 => [v.x, v.z, v.w],
        2 => [v.x, v.y, v.w],
        _ => [v.x, v.y, v.z],
    }
}

/// 4D cross product: the unique vector orthogonal to `v1`, `v2` and `v3`
/// (the Hodge dual of their wedge product).
///
/// Component `i` is the signed triple product of the three inputs projected
/// by dropping axis `i`, with alternating signs `+,-,+,-`. Linearly dependent
/// inputs yield the zero vector; callers decide how to handle that.
pub fn cross4(v1: Vec4, v2: Vec4, v3: Vec4) -> Vec4 {
    let mut r = Vec4::ZERO;
    let mut sign = 1.0;
    for axis in 0..4 {
        let a = drop_axis(v1, axis);
        let b = drop_axis(v2, axis);
        let c = drop_axis(v3, axis);
        *r.component_mut(axis) = sign * dot3(c, cross3(a, b));
        sign = -sign;
    }
    r
}

/// Index of the point in `points` nearest to `v` (squared Euclidean distance,
/// ties broken by first occurrence). Returns `None` for an empty slice.
pub fn nearest_point(v: Vec4, points: &[Vec4]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = v.distance_squared(*p);
        match best {
            Some((_, bd)) if bd <= d => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_cross4_of_basis_vectors() {
        // signs alternate +,-,+,-: x ^ y ^ z is dual to -w, y ^ z ^ w to +x
        let r = cross4(Vec4::X, Vec4::Y, Vec4::Z);
        assert!((r + Vec4::W).length() < EPSILON);
        let r = cross4(Vec4::Y, Vec4::Z, Vec4::W);
        assert!((r - Vec4::X).length() < EPSILON);
    }

    #[test]
    fn test_cross4_orthogonality() {
        let v1 = Vec4::new(1.0, 2.0, -1.0, 0.5);
        let v2 = Vec4::new(0.0, 1.0, 3.0, -2.0);
        let v3 = Vec4::new(2.0, -1.0, 0.0, 1.0);
        let r = cross4(v1, v2, v3);
        assert!(r.length() > EPSILON, "inputs are independent, result must not vanish");
        assert!(r.dot(v1).abs() < 1e-3);
        assert!(r.dot(v2).abs() < 1e-3);
        assert!(r.dot(v3).abs() < 1e-3);
    }

    #[test]
    fn test_cross4_degenerate_inputs() {
        // linearly dependent triple: v3 = v1 + v2
        let v1 = Vec4::new(1.0, 0.0, 2.0, 0.0);
        let v2 = Vec4::new(0.0, 1.0, 0.0, 3.0);
        let r = cross4(v1, v2, v1 + v2);
        assert!(r.length() < EPSILON);
        // parallel vectors
        let r = cross4(v1, v1 * 2.0, v2);
        assert!(r.length() < EPSILON);
    }

    #[test]
    fn test_cross4_antisymmetry() {
        let v1 = Vec4::new(1.0, 2.0, 3.0, 4.0);
        let v2 = Vec4::new(-1.0, 0.5, 2.0, 1.0);
        let v3 = Vec4::new(0.0, 1.0, -1.0, 2.0);
        let a = cross4(v1, v2, v3);
        let b = cross4(v2, v1, v3);
        assert!((a + b).length() < 1e-3);
    }

    #[test]
    fn test_nearest_point() {
        let points = [
            Vec4::new(10.0, 0.0, 0.0, 0.0),
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 2.0),
        ];
        assert_eq!(nearest_point(Vec4::ZERO, &points), Some(1));
        assert_eq!(nearest_point(Vec4::new(0.0, 0.0, 0.0, 3.0), &points), Some(2));
    }

    #[test]
    fn test_nearest_point_ties_and_empty() {
        // equidistant points: first occurrence wins
        let points = [Vec4::X, -Vec4::X];
        assert_eq!(nearest_point(Vec4::ZERO, &points), Some(0));
        assert_eq!(nearest_point(Vec4::ZERO, &[]), None);
    }
}
