use std::ops::{Add, Mul, Sub};

#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, other: f32) -> Vec2 {
        Vec2 {
            x: self.x * other,
            y: self.y * other,
        }
    }
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn len(self) -> f32 {
        ((self.x * self.x) + (self.y * self.y)).sqrt()
    }

    pub fn dist(self, other: Vec2) -> f32 {
        (self - other).len()
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn norm(self) -> Vec2 {
        let len = self.len();
        if len == 0.0 {
            Vec2::default()
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    pub fn rotate(self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2 {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn clamp(self, lt: Vec2, rb: Vec2) -> Vec2 {
        let x = self.x.clamp(lt.x, rb.x);
        let y = self.y.clamp(lt.y, rb.y);
        Vec2 { x, y }
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x.min(other.x),
            y: self.y.min(other.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rotate_quarter_turn() {
        let v = Vec2::new(1., 0.).rotate(PI / 2.);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.).abs() < 1e-5);
    }

    #[test]
    fn norm_of_zero_is_zero() {
        assert_eq!(Vec2::default().norm(), Vec2::default());
    }

    #[test]
    fn norm_has_unit_length() {
        let v = Vec2::new(3., -4.).norm();
        assert!((v.len() - 1.).abs() < 1e-5);
    }
}
