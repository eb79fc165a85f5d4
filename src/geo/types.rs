//! Core geographic and world-space types
//!
//! World coordinates are kept in `f64` until a mesh is recentred on its tile,
//! only then are they narrowed to `f32` for the renderer.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// A point or direction in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance_to(self, other: Vector3) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length input
    pub fn normalize(self) -> Vector3 {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            Vector3::ZERO
        }
    }

    pub fn lerp(self, other: Vector3, t: f64) -> Vector3 {
        self + (other - self) * t
    }

    /// Angle in radians between two vectors
    pub fn angle_to(self, other: Vector3) -> f64 {
        let denom = (self.dot(self) * other.dot(other)).sqrt();
        if denom == 0.0 {
            return PI / 2.0;
        }
        (self.dot(other) / denom).clamp(-1.0, 1.0).acos()
    }

    pub fn to_f32_array(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Geographic position in degrees, altitude in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GeoCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, altitude: 0.0 }
    }

    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self { latitude, longitude, altitude }
    }

    pub fn latitude_radians(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn longitude_radians(&self) -> f64 {
        self.longitude.to_radians()
    }
}

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self { south, west, north, east }
    }

    pub fn center(&self) -> GeoCoordinates {
        GeoCoordinates::new(
            (self.south + self.north) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }

    pub fn latitude_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn longitude_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn south_west(&self) -> GeoCoordinates {
        GeoCoordinates::new(self.south, self.west)
    }

    pub fn south_east(&self) -> GeoCoordinates {
        GeoCoordinates::new(self.south, self.east)
    }

    pub fn north_west(&self) -> GeoCoordinates {
        GeoCoordinates::new(self.north, self.west)
    }

    pub fn north_east(&self) -> GeoCoordinates {
        GeoCoordinates::new(self.north, self.east)
    }

    pub fn contains(&self, point: &GeoCoordinates) -> bool {
        point.latitude >= self.south
            && point.latitude <= self.north
            && point.longitude >= self.west
            && point.longitude <= self.east
    }
}

/// Quadtree tile address (web mercator, row 0 at the north edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKey {
    pub row: u32,
    pub column: u32,
    pub level: u32,
}

impl TileKey {
    pub fn new(row: u32, column: u32, level: u32) -> Self {
        Self { row, column, level }
    }

    /// Number of rows (and columns) at this key's level
    pub fn tiles_per_axis(&self) -> u32 {
        1u32 << self.level
    }

    /// Interleaved column/row bits prefixed with a level marker bit
    pub fn morton_code(&self) -> u64 {
        let mut code = 1u64;
        for bit in (0..self.level).rev() {
            let c = ((self.column >> bit) & 1) as u64;
            let r = ((self.row >> bit) & 1) as u64;
            code = (code << 2) | (r << 1) | c;
        }
        code
    }

    pub fn parent(&self) -> Option<TileKey> {
        if self.level == 0 {
            return None;
        }
        Some(TileKey::new(self.row >> 1, self.column >> 1, self.level - 1))
    }

    /// Geographic extent of the tile
    pub fn geo_box(&self) -> GeoBox {
        let n = self.tiles_per_axis() as f64;
        let west = self.column as f64 / n * 360.0 - 180.0;
        let east = (self.column as f64 + 1.0) / n * 360.0 - 180.0;
        let north = tile_row_to_latitude(self.row as f64, n);
        let south = tile_row_to_latitude(self.row as f64 + 1.0, n);
        GeoBox::new(south, west, north, east)
    }
}

fn tile_row_to_latitude(row: f64, n: f64) -> f64 {
    (PI * (1.0 - 2.0 * row / n)).sinh().atan().to_degrees()
}
