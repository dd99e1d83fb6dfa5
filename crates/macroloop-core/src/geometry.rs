//! Screen points and the bounding box that scopes checkpoints
//!
//! A box persists as a single line: `"<x0>x<y0> <x1>x<y1>"`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Coordinates may be negative on multi-monitor setups, so split on the
        // separator rather than scanning for digits.
        let (x, y) = s
            .split_once('x')
            .ok_or_else(|| Error::invalid_region(format!("expected <x>x<y>, got {:?}", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| Error::invalid_region(format!("bad coordinate {:?} in {:?}", v, s)))
        };
        Ok(Self::new(parse(x)?, parse(y)?))
    }
}

/// Rectangle defined by two clicked corners: top-left, then bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl BoundingBox {
    pub fn new(top_left: Point, bottom_right: Point) -> Self {
        Self { top_left, bottom_right }
    }

    pub fn width(&self) -> i32 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> i32 {
        self.bottom_right.y - self.top_left.y
    }

    /// A box must enclose at least one pixel to be captured.
    pub fn validate(&self) -> Result<()> {
        if self.width() <= 0 || self.height() <= 0 {
            return Err(Error::invalid_region(format!(
                "region {} is empty: click the top-left corner first, then the bottom-right",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.top_left, self.bottom_right)
    }
}

impl FromStr for BoundingBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut corners = s.split_whitespace();
        let (Some(a), Some(b), None) = (corners.next(), corners.next(), corners.next()) else {
            return Err(Error::invalid_region(format!(
                "expected two corners \"<x0>x<y0> <x1>x<y1>\", got {:?}",
                s
            )));
        };
        Ok(Self::new(a.parse()?, b.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_text_round_trip() {
        let b = BoundingBox::new(Point::new(10, 20), Point::new(300, 400));
        assert_eq!(b.to_string(), "10x20 300x400");
        assert_eq!("10x20 300x400".parse::<BoundingBox>().unwrap(), b);
    }

    #[test]
    fn negative_coordinates() {
        let b: BoundingBox = "-1920x-5 -100x600\n".parse().unwrap();
        assert_eq!(b.top_left, Point::new(-1920, -5));
        assert_eq!(b.width(), 1820);
        assert!(b.validate().is_ok());
    }

    #[test]
    fn rejects_malformed() {
        assert!("10x20".parse::<BoundingBox>().is_err());
        assert!("10x20 30".parse::<BoundingBox>().is_err());
        assert!("ax1 2x3".parse::<BoundingBox>().is_err());
        assert!("1x1 2x2 3x3".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn empty_region_is_invalid() {
        let b = BoundingBox::new(Point::new(50, 50), Point::new(10, 80));
        assert!(b.validate().is_err());
    }
}
