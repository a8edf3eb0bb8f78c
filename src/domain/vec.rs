/// 2D vector in level units (or pixels, once scaled).

use std::ops::{Add, Mul};

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn plus(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }

    pub fn times(self, factor: f64) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        self.plus(rhs)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        self.times(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_and_times_return_new_vectors() {
        let a = Vec2::new(1.0, 2.0);
        let b = a.plus(Vec2::new(0.5, -1.0)).times(4.0);
        assert_eq!(b, Vec2::new(6.0, 4.0));
        assert_eq!(a, Vec2::new(1.0, 2.0)); // untouched
    }

    #[test]
    fn operators_match_methods() {
        let a = Vec2::new(3.0, 1.5);
        assert_eq!((a + Vec2::new(1.0, 1.0)) * 2.0, a.plus(Vec2::new(1.0, 1.0)).times(2.0));
    }
}
