//! Map projections consumed by the geometry pipeline
//!
//! Only the two projections the pipeline distinguishes are modelled: the
//! planar mercator projection used for tiling and flat maps, and the
//! earth-centered sphere used for globe rendering.

use super::types::{GeoCoordinates, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Earth radius at the equator in meters
pub const EQUATORIAL_RADIUS: f64 = 6_378_137.0;

/// Earth circumference at the equator in meters
pub const EQUATORIAL_CIRCUMFERENCE: f64 = 2.0 * PI * EQUATORIAL_RADIUS;

/// Latitude where the mercator square ends
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionType {
    Planar,
    Spherical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    /// Planar mercator, world units in meters at the equator
    Mercator,
    /// Earth-centered cartesian coordinates on a sphere
    Sphere,
}

impl Projection {
    pub fn projection_type(&self) -> ProjectionType {
        match self {
            Projection::Mercator => ProjectionType::Planar,
            Projection::Sphere => ProjectionType::Spherical,
        }
    }

    pub fn project_point(&self, geo: GeoCoordinates) -> Vector3 {
        match self {
            Projection::Mercator => {
                let latitude = geo
                    .latitude
                    .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
                    .to_radians();
                let x = (geo.longitude_radians() + PI) / (2.0 * PI) * EQUATORIAL_CIRCUMFERENCE;
                let y = ((PI / 4.0 + latitude / 2.0).tan().ln() + PI) / (2.0 * PI)
                    * EQUATORIAL_CIRCUMFERENCE;
                Vector3::new(x, y, geo.altitude)
            }
            Projection::Sphere => {
                let radius = EQUATORIAL_RADIUS + geo.altitude;
                let lat = geo.latitude_radians();
                let lon = geo.longitude_radians();
                Vector3::new(
                    radius * lat.cos() * lon.cos(),
                    radius * lat.cos() * lon.sin(),
                    radius * lat.sin(),
                )
            }
        }
    }

    pub fn unproject_point(&self, world: Vector3) -> GeoCoordinates {
        match self {
            Projection::Mercator => {
                let longitude = world.x / EQUATORIAL_CIRCUMFERENCE * 2.0 * PI - PI;
                let mercator_y = world.y / EQUATORIAL_CIRCUMFERENCE * 2.0 * PI - PI;
                let latitude = 2.0 * mercator_y.exp().atan() - PI / 2.0;
                GeoCoordinates::with_altitude(
                    latitude.to_degrees(),
                    longitude.to_degrees(),
                    world.z,
                )
            }
            Projection::Sphere => {
                let radius = world.length();
                if radius == 0.0 {
                    return GeoCoordinates::with_altitude(0.0, 0.0, -EQUATORIAL_RADIUS);
                }
                let latitude = (world.z / radius).clamp(-1.0, 1.0).asin();
                let longitude = world.y.atan2(world.x);
                GeoCoordinates::with_altitude(
                    latitude.to_degrees(),
                    longitude.to_degrees(),
                    radius - EQUATORIAL_RADIUS,
                )
            }
        }
    }

    /// Converts a point expressed in `source` world space into this projection
    pub fn reproject_point(&self, source: &Projection, world: Vector3) -> Vector3 {
        if self == source {
            return world;
        }
        self.project_point(source.unproject_point(world))
    }

    /// Width of one world copy along x, used to place wrapped tile copies.
    /// The globe has no wrapped copies.
    pub fn world_extent_x(&self) -> f64 {
        match self {
            Projection::Mercator => EQUATORIAL_CIRCUMFERENCE,
            Projection::Sphere => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mercator_round_trip() {
        let geo = GeoCoordinates::with_altitude(52.52, 13.405, 12.0);
        let world = Projection::Mercator.project_point(geo);
        let back = Projection::Mercator.unproject_point(world);
        assert_relative_eq!(back.latitude, geo.latitude, epsilon = 1e-9);
        assert_relative_eq!(back.longitude, geo.longitude, epsilon = 1e-9);
        assert_relative_eq!(back.altitude, 12.0);
    }

    #[test]
    fn test_sphere_surface_radius() {
        let world = Projection::Sphere.project_point(GeoCoordinates::new(-33.9, 151.2));
        assert_relative_eq!(world.length(), EQUATORIAL_RADIUS, epsilon = 1e-6);
    }

    #[test]
    fn test_reproject_mercator_to_sphere() {
        let geo = GeoCoordinates::new(10.0, 20.0);
        let mercator = Projection::Mercator.project_point(geo);
        let sphere = Projection::Sphere.reproject_point(&Projection::Mercator, mercator);
        let expected = Projection::Sphere.project_point(geo);
        assert_relative_eq!(sphere.distance_to(expected), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mercator_origin_is_world_corner() {
        let world = Projection::Mercator.project_point(GeoCoordinates::new(0.0, -180.0));
        assert_relative_eq!(world.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(world.y, EQUATORIAL_CIRCUMFERENCE / 2.0, epsilon = 1e-6);
    }
}
