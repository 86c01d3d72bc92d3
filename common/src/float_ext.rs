pub trait FloatExt: Sized {
    fn approximately_eq(self, other: Self) -> bool;

    /// Absolute-tolerance comparison.
    fn approx_eq_tol(self, other: Self, tolerance: Self) -> bool;

    /// Returns `fallback` for NaN and infinities.
    fn finite_or(self, fallback: Self) -> Self;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON as f32
    }

    fn approx_eq_tol(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance
    }

    fn finite_or(self, fallback: Self) -> Self {
        if self.is_finite() {
            self
        } else {
            fallback
        }
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON
    }

    fn approx_eq_tol(self, other: Self, tolerance: Self) -> bool {
        (self - other).abs() <= tolerance
    }

    fn finite_or(self, fallback: Self) -> Self {
        if self.is_finite() {
            self
        } else {
            fallback
        }
    }
}
