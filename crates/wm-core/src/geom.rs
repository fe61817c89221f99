use core::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2d {
    pub x: f64,
    pub y: f64,
}

impl Vec2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn normalize(self) -> Self {
        let n = self.norm();
        if n == 0.0 { Self::default() } else { self * (1.0 / n) }
    }

    /// Rotates by +90 degrees: `(x, y) -> (-y, x)`.
    pub fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

impl From<[f64; 2]> for Point2d {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Vec2d {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl Add<Vec2d> for Point2d {
    type Output = Point2d;

    fn add(self, rhs: Vec2d) -> Self::Output {
        Point2d {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub<Vec2d> for Point2d {
    type Output = Point2d;

    fn sub(self, rhs: Vec2d) -> Self::Output {
        Point2d {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Sub<Point2d> for Point2d {
    type Output = Vec2d;

    fn sub(self, rhs: Point2d) -> Self::Output {
        Vec2d {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Vec2d {
    type Output = Vec2d;

    fn mul(self, rhs: f64) -> Self::Output {
        Vec2d {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl Mul<Vec2d> for f64 {
    type Output = Vec2d;

    fn mul(self, rhs: Vec2d) -> Self::Output {
        rhs * self
    }
}

/// Open or closed sequence of vertices; closure is implied by the consumer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline2d {
    pub points: Vec<Point2d>,
}
