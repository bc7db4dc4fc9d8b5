pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod shell;
pub mod spatial;
pub mod trilateration;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

pub use catalog::{Catalog, StarRef};
pub use config::{CatalogConfig, GraphBuild};
pub use error::{Error, Result};
pub use trilateration::{trilaterate, Sample};

pub type StarSet = BTreeSet<Star>;
pub type StarList = Vec<Star>;

/// Position in 3D space (e.g. light-years).
///
/// Equality, ordering and hashing all follow the IEEE-754 total order per
/// axis, compared lexicographically on x, then y, then z.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Coordinate { x, y, z }
    }

    pub fn distance_squared(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &Coordinate) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn axis(&self, axis: usize) -> f64 {
        match axis % 3 {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn dot(&self, other: &Coordinate) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a zero or
    /// non-finite vector.
    pub fn normalized(&self) -> Option<Coordinate> {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Some(*self * (1.0 / n))
        } else {
            None
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Coordinate {
    type Output = Coordinate;

    fn mul(self, rhs: f64) -> Coordinate {
        Coordinate::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f64; 3]> for Coordinate {
    fn from(v: [f64; 3]) -> Self {
        Coordinate::new(v[0], v[1], v[2])
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Coordinate {}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
            .then_with(|| self.z.total_cmp(&other.z))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
        self.z.to_bits().hash(state);
    }
}

/// A named point in the catalog.
///
/// Identity is `(name, coordinate)`: two stars that differ only in their
/// properties compare equal and hash alike.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Star {
    pub name: String,
    pub coordinate: Coordinate,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Star {
    pub fn new(name: impl Into<String>, coordinate: impl Into<Coordinate>) -> Self {
        Star {
            name: name.into(),
            coordinate: coordinate.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn distance(&self, other: &Star) -> f64 {
        self.coordinate.distance(&other.coordinate)
    }

    pub fn distance_to_point(&self, p: &Coordinate) -> f64 {
        self.coordinate.distance(p)
    }
}

impl PartialEq for Star {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.coordinate == other.coordinate
    }
}

impl Eq for Star {}

impl Ord for Star {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.coordinate.cmp(&other.coordinate))
    }
}

impl PartialOrd for Star {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Star {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.coordinate.hash(state);
    }
}

/// Directed link between two stars. Equality and ordering compare
/// `(source, target)` as an ordered pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Jump {
    pub source: Star,
    pub target: Star,
}

impl Jump {
    pub fn new(source: Star, target: Star) -> Self {
        Jump { source, target }
    }

    pub fn weight(&self) -> f64 {
        self.source.distance(&self.target)
    }

    pub fn reversed(&self) -> Jump {
        Jump::new(self.target.clone(), self.source.clone())
    }
}
