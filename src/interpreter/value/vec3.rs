use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Rem, Sub},
};

use crate::interpreter::value::core::format_float;

/// A three component vector of `f64`.
///
/// Vec3 is the highest ranked number-like type: every arithmetic operator
/// applies componentwise, and scalars widen into it by splatting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// First component.
    pub x: f64,
    /// Second component.
    pub y: f64,
    /// Third component.
    pub z: f64,
}

impl Vec3 {
    /// Creates a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a vector with all three components set to `v`.
    ///
    /// # Example
    /// ```
    /// use sable::interpreter::value::vec3::Vec3;
    ///
    /// assert_eq!(Vec3::splat(2.0), Vec3::new(2.0, 2.0, 2.0));
    /// ```
    #[must_use]
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y)).sqrt()
    }

    /// Returns the component at `index` (0, 1 or 2).
    #[must_use]
    pub const fn component(self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.x),
            1 => Some(self.y),
            2 => Some(self.z),
            _ => None,
        }
    }

    /// Returns a copy with the component at `index` replaced.
    #[must_use]
    pub const fn with_component(mut self, index: usize, value: f64) -> Option<Self> {
        match index {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => return None,
        }
        Some(self)
    }

    /// Maps a member name (`x`, `y`, `z`) to a component index.
    #[must_use]
    pub fn component_index(name: &str) -> Option<usize> {
        match name {
            "x" => Some(0),
            "y" => Some(1),
            "z" => Some(2),
            _ => None,
        }
    }

    /// Returns `true` if every component is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

macro_rules! componentwise {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Vec3 {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self::new(self.x $op rhs.x, self.y $op rhs.y, self.z $op rhs.z)
            }
        }
    };
}

componentwise!(Add, add, +);
componentwise!(Sub, sub, -);
componentwise!(Mul, mul, *);
componentwise!(Div, div, /);
componentwise!(Rem, rem, %);

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "({}, {}, {})",
               format_float(self.x),
               format_float(self.y),
               format_float(self.z))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn arithmetic_is_componentwise() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::splat(3.0));
        assert_eq!(a * Vec3::splat(2.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));
    }

    #[test]
    fn components_by_name_and_index() {
        let v = Vec3::new(1.0, 2.0, 3.0);

        assert_eq!(Vec3::component_index("y").and_then(|i| v.component(i)), Some(2.0));
        assert_eq!(v.with_component(2, 9.0), Some(Vec3::new(1.0, 2.0, 9.0)));
        assert_eq!(v.component(3), None);
        assert_eq!(v.to_string(), "(1.0, 2.0, 3.0)");
    }
}
