use serde::{Deserialize, Serialize};

/// An integer block position in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// World X coordinate.
    pub x: i32,
    /// World Y coordinate (altitude).
    pub y: i32,
    /// World Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Create a block position.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// This position shifted by the given deltas.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Squared Euclidean distance to another position, in blocks.
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }
}

/// A 3-D vector of `f64` components.
///
/// Used for player velocity, wind direction, and wind force. Wind direction
/// vectors are kept unit-length through [`Vec3::normalized`] and
/// [`Vec3::rotated_y`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Unit vector pointing along positive X. Fallback direction when a
    /// degenerate vector must be normalized.
    pub const UNIT_X: Self = Self {
        x: 1.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a vector from components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Dot product with another vector.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// This vector scaled by a factor.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Component-wise sum with another vector.
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// This vector with its Y component zeroed.
    pub fn horizontal(self) -> Self {
        Self::new(self.x, 0.0, self.z)
    }

    /// Unit vector in the same direction.
    ///
    /// A zero or non-finite vector cannot be normalized by division; it maps
    /// to [`Vec3::UNIT_X`] instead, so callers never observe a NaN direction.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if !len.is_finite() || len < 1e-9 {
            return Self::UNIT_X;
        }
        self.scaled(1.0 / len)
    }

    /// This vector rotated around the Y axis by `radians`.
    ///
    /// Rotation preserves length, so rotating a unit vector yields a unit
    /// vector.
    pub fn rotated_y(self, radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(
            self.x * cos - self.z * sin,
            self.y,
            self.x * sin + self.z * cos,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn block_pos_offset_and_distance() {
        let a = BlockPos::new(0, 64, 0);
        let b = a.offset(3, 0, 4);
        assert_eq!(b, BlockPos::new(3, 64, 4));
        assert!((a.distance_sq(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn normalized_zero_vector_falls_back_to_unit_x() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::UNIT_X);
    }

    #[test]
    fn normalized_nan_vector_falls_back_to_unit_x() {
        let v = Vec3::new(f64::NAN, 0.0, 0.0);
        assert_eq!(v.normalized(), Vec3::UNIT_X);
    }

    #[test]
    fn rotation_preserves_length() {
        let v = Vec3::new(0.6, 0.0, 0.8);
        let r = v.rotated_y(1.234);
        assert!((r.length() - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn normalized_is_always_unit_length(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            z in -1e6f64..1e6,
        ) {
            let n = Vec3::new(x, y, z).normalized();
            prop_assert!((n.length() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn rotated_unit_stays_unit(
            x in -100.0f64..100.0,
            z in -100.0f64..100.0,
            angle in -10.0f64..10.0,
        ) {
            let n = Vec3::new(x, 0.0, z).normalized().rotated_y(angle);
            prop_assert!((n.length() - 1.0).abs() < 1e-9);
        }
    }
}
