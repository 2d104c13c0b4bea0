//! Assertion utilities for testing.
//!
//! This module provides helper functions for making assertions in tests,
//! particularly for floating-point comparisons and binned polygons.

use geo::{Area, BooleanOps, Polygon};

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that a result is within expected bounds (inclusive).
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        actual >= min && actual <= max,
        "Value not in range: actual = {}, min = {}, max = {}",
        actual,
        min,
        max
    );
}

/// Assert that no two polygons share any area.
///
/// # Panics
///
/// Panics on the first pair whose intersection has an area above `epsilon`.
pub fn assert_no_overlap(polygons: &[Polygon<f64>], epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, a) in polygons.iter().enumerate() {
        for (j, b) in polygons.iter().enumerate().skip(i + 1) {
            let shared = a.intersection(b).unsigned_area();
            assert!(
                shared <= epsilon,
                "Polygons {} and {} overlap by an area of {}",
                i,
                j,
                shared
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Rect};

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range(5.0, 0.0, 10.0);
        assert_in_range(0.0, 0.0, 10.0);
        assert_in_range(10.0, 0.0, 10.0);
    }

    #[test]
    fn test_touching_squares_do_not_overlap() {
        let a = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).to_polygon();
        let b = Rect::new(coord! { x: 1.0, y: 0.0 }, coord! { x: 2.0, y: 1.0 }).to_polygon();
        assert_no_overlap(&[a, b], None);
    }
}
