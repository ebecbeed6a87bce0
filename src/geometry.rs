use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, Div, Mul, Sub};

use num::Num;

pub type Point2f = Point2<f32>;
pub type Point2i = Point2<i32>;
pub type Vector2f = Vector2<f32>;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point2<T>
where
    T: Num + Copy,
{
    pub fn new(x: T, y: T) -> Point2<T> {
        Point2 { x, y }
    }
}

impl Point2<f32> {
    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vector2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Vector2<T>
where
    T: Num + Copy,
{
    pub fn new(x: T, y: T) -> Vector2<T> {
        Vector2 { x, y }
    }
}

// Point2 + Vector2 -> Point2
impl<T> Add<Vector2<T>> for Point2<T>
where
    T: Add<Output = T> + Copy,
{
    type Output = Point2<T>;

    fn add(self, rhs: Vector2<T>) -> Point2<T> {
        Point2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

// Point2 - Point2 -> Vector2
impl<T> Sub<Point2<T>> for Point2<T>
where
    T: Sub<Output = T> + Copy,
{
    type Output = Vector2<T>;

    fn sub(self, rhs: Point2<T>) -> Vector2<T> {
        Vector2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

// Vector2 * scalar -> Vector2
impl<T> Mul<T> for Vector2<T>
where
    T: Mul<Output = T> + Copy,
{
    type Output = Vector2<T>;

    fn mul(self, rhs: T) -> Vector2<T> {
        Vector2 {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

// Vector2 / scalar -> Vector2
impl<T> Div<T> for Vector2<T>
where
    T: Div<Output = T> + Copy,
{
    type Output = Vector2<T>;

    fn div(self, rhs: T) -> Vector2<T> {
        Vector2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}

impl<T: Display> Display for Point2<T> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl<T: Display> Display for Vector2<T> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
