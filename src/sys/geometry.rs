use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Midpoint using integer division, matching how monitors are looked up
    /// for an attachment rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.x.saturating_add(self.width / 2), self.y.saturating_add(self.height / 2))
    }

    pub fn contains(&self, point: Point) -> bool {
        let (px, py) = (i64::from(point.x), i64::from(point.y));
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        x <= px && px < x + i64::from(self.width) && y <= py && py < y + i64::from(self.height)
    }

    /// Squared distance from `point` to the closest point of the rectangle.
    pub fn distance_squared(&self, point: Point) -> i64 {
        fn gap(p: i64, start: i64, len: i64) -> i64 {
            if p < start {
                start - p
            } else if p >= start + len {
                p - (start + len - 1)
            } else {
                0
            }
        }
        let dx = gap(i64::from(point.x), i64::from(self.x), i64::from(self.width));
        let dy = gap(i64::from(point.y), i64::from(self.y), i64::from(self.height));
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{},{}", self.x, self.y) }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} comma separated integers, got {input:?}")]
    WrongArity { expected: usize, input: String },
    #[error("expected WIDTHxHEIGHT, got {0:?}")]
    BadSize(String),
    #[error("invalid integer {0:?}")]
    BadInteger(String),
}

fn parse_ints<const N: usize>(input: &str, sep: char) -> Result<[i32; N], ParseError> {
    let parts: Vec<&str> = input.split(sep).map(str::trim).collect();
    if parts.len() != N {
        return Err(ParseError::WrongArity { expected: N, input: input.to_string() });
    }
    let mut out = [0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse().map_err(|_| ParseError::BadInteger(part.to_string()))?;
    }
    Ok(out)
}

impl FromStr for Point {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y] = parse_ints(s, ',')?;
        Ok(Point::new(x, y))
    }
}

impl FromStr for Size {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [width, height] =
            parse_ints(&s.to_ascii_lowercase(), 'x').map_err(|_| ParseError::BadSize(s.to_string()))?;
        Ok(Size::new(width, height))
    }
}

impl FromStr for Rect {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x, y, width, height] = parse_ints(s, ',')?;
        Ok(Rect::new(x, y, width, height))
    }
}
