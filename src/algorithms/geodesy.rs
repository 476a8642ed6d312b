//! WGS84 geodesy for placing UWB nodes in a shared local frame
//!
//! This module converts between wire coordinates (latitude, longitude, altitude) and
//! the Cartesian frame the solver works in. The chain is:
//! - wire latitude (treated as geocentric) to geodetic latitude, two-pass approximation
//! - geodetic to ECEF (km)
//! - ECEF difference projected onto the reference point's East-North-Up basis
//! - ENU rotated into the local frame, whose north is configurable
//!
//! The local frame is `x`/`z` horizontal and `y` up. With the default north `(0, -1)`
//! north lies along `-z` and east along `-x`.
//!
//! The inverse path reflects latitudes past a pole and wraps longitude once by 360°.
//! That is a simplification and does not handle the polar singularity in general.

use nalgebra::{Matrix2, Vector2};

use crate::algorithms::vector::Vec3;
use crate::core::constants::{
    ECEF_MAX_ITERATIONS, LATITUDE_CONVERGENCE_DEG, POLE_EPSILON_KM, WGS84_FLATTENING,
    WGS84_SEMI_MAJOR_AXIS_KM,
};
use crate::core::types::LatLonAlt;

/// Earth ellipsoid parameters, lengths in km
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis
    pub a: f64,
    /// Semi-minor axis
    pub b: f64,
    /// Flattening
    pub f: f64,
    /// First eccentricity
    pub ecc: f64,
    /// First eccentricity squared
    pub esq: f64,
}

impl Ellipsoid {
    pub fn wgs84() -> Self {
        let a = WGS84_SEMI_MAJOR_AXIS_KM;
        let b = a * (1.0 - WGS84_FLATTENING);
        Self::from_axes(a, b)
    }

    pub fn from_axes(a: f64, b: f64) -> Self {
        let esq = 1.0 - (b * b) / (a * a);
        Self {
            a,
            b,
            f: 1.0 - b / a,
            ecc: esq.sqrt(),
            esq,
        }
    }
}

/// Radii of curvature at a geodetic latitude (km)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radii {
    /// Distance from the earth's centre to the surface point
    pub geocentric: f64,
    /// Prime vertical radius of curvature (N)
    pub normal: f64,
    /// Meridional radius of curvature (M)
    pub meridional: f64,
}

/// Point on or above the ellipsoid: degrees, degrees, kilometres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticPoint {
    pub lat: f64,
    pub lon: f64,
    pub alt_km: f64,
}

impl GeodeticPoint {
    pub fn new(lat: f64, lon: f64, alt_km: f64) -> Self {
        Self { lat, lon, alt_km }
    }
}

impl From<LatLonAlt> for GeodeticPoint {
    fn from(lla: LatLonAlt) -> Self {
        Self::new(lla.lat, lla.lon, lla.alt / 1000.0)
    }
}

/// East, north and up unit vectors expressed in ECEF
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnuBasis {
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl EnuBasis {
    /// Components of an ECEF vector along east, north, up
    pub fn project(&self, ecef: &Vec3) -> Vec3 {
        Vec3::new(self.east.dot(ecef), self.north.dot(ecef), self.up.dot(ecef))
    }

    /// ECEF vector with the given east, north, up components
    pub fn compose(&self, enu: &Vec3) -> Vec3 {
        self.east * enu.x + self.north * enu.y + self.up * enu.z
    }
}

/// Horizontal rotation between ENU and the local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRotation {
    /// Rotates from "north along +x" to the configured north
    anticlockwise: Matrix2<f64>,
    /// Inverse of `anticlockwise`
    clockwise: Matrix2<f64>,
}

impl FrameRotation {
    /// `north` is the local-frame north as an `(x, z)` unit vector
    pub fn from_north(north: Vector2<f64>) -> Self {
        let cos_theta = north.x;
        let sin_theta = north.y;
        let anticlockwise = Matrix2::new(cos_theta, -sin_theta, sin_theta, cos_theta);
        Self {
            anticlockwise,
            clockwise: anticlockwise.transpose(),
        }
    }

    pub fn enu_to_local(&self, enu: &Vec3) -> Vec3 {
        // North along +x, up along +y, east along -z
        let horizontal = self.anticlockwise * Vector2::new(enu.y, -enu.x);
        Vec3::new(horizontal.x, enu.z, horizontal.y)
    }

    pub fn local_to_enu(&self, local: &Vec3) -> Vec3 {
        let horizontal = self.clockwise * Vector2::new(local.x, local.z);
        Vec3::new(-horizontal.y, horizontal.x, local.y)
    }
}

/// Default local-frame north, `(x, z) = (0, -1)`
pub fn default_north() -> Vector2<f64> {
    Vector2::new(0.0, -1.0)
}

/// Reflect latitude back into [-90, 90] and wrap longitude once by 360°
pub fn normalize_lat_lon(lat: f64, lon: f64) -> (f64, f64) {
    let mut lat = lat;
    let mut lon = lon;
    if lat > 90.0 {
        lat = 180.0 - lat;
    }
    if lat < -90.0 {
        lat = -180.0 - lat;
    }
    if lon > 180.0 {
        lon -= 360.0;
    }
    if lon < -180.0 {
        lon += 360.0;
    }
    (lat, lon)
}

/// Length of one degree of latitude (m), closed-form series
pub fn metres_per_degree_latitude(lat: f64) -> f64 {
    let phi = lat.to_radians();
    111_132.92 - 559.82 * (2.0 * phi).cos() + 1.175 * (4.0 * phi).cos() - 0.0023 * (6.0 * phi).cos()
}

/// Length of one degree of longitude (m), closed-form series
pub fn metres_per_degree_longitude(lat: f64) -> f64 {
    let phi = lat.to_radians();
    111_412.84 * phi.cos() - 93.5 * (3.0 * phi).cos() + 0.118 * (5.0 * phi).cos()
}

/// Geodesy engine: ellipsoid constants and the cached local-frame rotation.
///
/// Built once at startup and shared by reference with every cycle.
#[derive(Debug, Clone)]
pub struct GeodesyEngine {
    ellipsoid: Ellipsoid,
    frame: FrameRotation,
}

impl Default for GeodesyEngine {
    fn default() -> Self {
        Self::new(default_north())
    }
}

impl GeodesyEngine {
    /// Engine for a local frame whose north is `north` in `(x, z)`.
    /// The vector is normalised; a zero vector falls back to the default north.
    pub fn new(north: Vector2<f64>) -> Self {
        let norm = north.norm();
        let north = if norm > 0.0 && norm.is_finite() {
            north / norm
        } else {
            default_north()
        };
        Self {
            ellipsoid: Ellipsoid::wgs84(),
            frame: FrameRotation::from_north(north),
        }
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn frame(&self) -> &FrameRotation {
        &self.frame
    }

    /// Radii of curvature at geodetic latitude `lat` (degrees)
    pub fn radius_of_curvature(&self, lat: f64) -> Radii {
        let Ellipsoid { a, esq, .. } = self.ellipsoid;
        let (slat, clat) = lat.to_radians().sin_cos();

        let dsq = 1.0 - esq * slat * slat;
        let d = dsq.sqrt();

        let rn = a / d;
        let rm = rn * (1.0 - esq) / dsq;

        let rho = rn * clat;
        let z = (1.0 - esq) * rn * slat;

        Radii {
            geocentric: (rho * rho + z * z).sqrt(),
            normal: rn,
            meridional: rm,
        }
    }

    fn latitude_ratio(&self, rn: f64, alt_km: f64) -> f64 {
        1.0 - self.ellipsoid.esq * rn / (rn + alt_km)
    }

    /// Geocentric to geodetic latitude (degrees).
    ///
    /// Two fixed passes: the first takes the geocentric latitude as geodetic to get the
    /// normal radius, the second repeats with the first estimate.
    pub fn geocentric_to_geodetic_latitude(&self, lat_gc: f64, alt_km: f64) -> f64 {
        let tan_gc = lat_gc.to_radians().tan();

        let rn = self.radius_of_curvature(lat_gc).normal;
        let lat_gd = (tan_gc / self.latitude_ratio(rn, alt_km)).atan().to_degrees();

        let rn = self.radius_of_curvature(lat_gd).normal;
        (tan_gc / self.latitude_ratio(rn, alt_km)).atan().to_degrees()
    }

    /// Geodetic to geocentric latitude (degrees)
    pub fn geodetic_to_geocentric_latitude(&self, lat_gd: f64, alt_km: f64) -> f64 {
        let rn = self.radius_of_curvature(lat_gd).normal;
        (lat_gd.to_radians().tan() * self.latitude_ratio(rn, alt_km))
            .atan()
            .to_degrees()
    }

    /// Geodetic latitude/longitude (degrees) and altitude (km) to ECEF (km)
    pub fn geodetic_to_ecef(&self, lat: f64, lon: f64, alt_km: f64) -> Vec3 {
        let (slat, clat) = lat.to_radians().sin_cos();
        let (slon, clon) = lon.to_radians().sin_cos();
        let rn = self.radius_of_curvature(lat).normal;
        let esq = self.ellipsoid.esq;

        Vec3::new(
            (rn + alt_km) * clat * clon,
            (rn + alt_km) * clat * slon,
            ((1.0 - esq) * rn + alt_km) * slat,
        )
    }

    /// ECEF (km) to geodetic latitude, longitude in [0, 360) and altitude (km)
    pub fn ecef_to_geodetic(&self, xyz: &Vec3) -> GeodeticPoint {
        let (x, y, z) = (xyz.x, xyz.y, xyz.z);
        let esq = self.ellipsoid.esq;

        let mut lon = if x.abs() + y.abs() < POLE_EPSILON_KM {
            0.0
        } else {
            y.atan2(x).to_degrees()
        };
        if lon < 0.0 {
            lon += 360.0;
        }

        let rp = xyz.norm();
        let p = (x * x + y * y).sqrt();

        if p < POLE_EPSILON_KM {
            let lat = if z < 0.0 { -90.0 } else { 90.0 };
            let alt_km = rp - self.radius_of_curvature(lat).geocentric;
            return GeodeticPoint::new(lat, lon, alt_km);
        }

        // Seed with the geocentric latitude, then iterate on the geodetic one
        let lat_gc = (z / rp).asin().to_degrees();
        let mut alt_km = rp - self.radius_of_curvature(lat_gc).geocentric;
        let mut lat = self.geocentric_to_geodetic_latitude(lat_gc, alt_km);
        let mut rn = self.radius_of_curvature(lat).normal;

        for _ in 0..ECEF_MAX_ITERATIONS {
            let slat = lat.to_radians().sin();
            let next = ((z + rn * esq * slat) / p).atan().to_degrees();

            let dlat = next - lat;
            lat = next;
            rn = self.radius_of_curvature(lat).normal;
            alt_km = p / lat.to_radians().cos() - rn;

            if dlat.abs() < LATITUDE_CONVERGENCE_DEG {
                break;
            }
        }

        GeodeticPoint::new(lat, lon, alt_km)
    }

    /// East, north, up unit vectors at geodetic latitude/longitude (degrees)
    pub fn enu_unit_vectors(&self, lat: f64, lon: f64) -> EnuBasis {
        let (slat, clat) = lat.to_radians().sin_cos();
        let (slon, clon) = lon.to_radians().sin_cos();

        EnuBasis {
            east: Vec3::new(-slon, clon, 0.0),
            north: Vec3::new(-clon * slat, -slon * slat, clat),
            up: Vec3::new(clon * clat, slon * clat, slat),
        }
    }

    /// ECEF of a wire point, whose latitude is geocentric
    fn wire_point_to_ecef(&self, point: &GeodeticPoint) -> Vec3 {
        let lat_gd = self.geocentric_to_geodetic_latitude(point.lat, point.alt_km);
        self.geodetic_to_ecef(lat_gd, point.lon, point.alt_km)
    }

    fn wire_point_basis(&self, point: &GeodeticPoint) -> EnuBasis {
        let lat_gd = self.geocentric_to_geodetic_latitude(point.lat, point.alt_km);
        self.enu_unit_vectors(lat_gd, point.lon)
    }

    /// Local-frame position (m) of `target`, given `reference` sits at `reference_local`
    pub fn to_local_position(
        &self,
        reference: &GeodeticPoint,
        target: &GeodeticPoint,
        reference_local: &Vec3,
    ) -> Vec3 {
        let ecef_ref = self.wire_point_to_ecef(reference);
        let ecef_target = self.wire_point_to_ecef(target);
        let basis = self.wire_point_basis(reference);

        let enu_m = basis.project(&(ecef_target - ecef_ref)) * 1000.0;
        reference_local + self.frame.enu_to_local(&enu_m)
    }

    /// Geodetic estimate for a local-frame position, using a reference whose local
    /// position is known. Altitude in the result is in metres.
    pub fn estimate_geodetic(
        &self,
        reference: &GeodeticPoint,
        reference_local: &Vec3,
        target_local: &Vec3,
    ) -> LatLonAlt {
        let enu_km = self.frame.local_to_enu(&(target_local - reference_local)) / 1000.0;

        let ecef_ref = self.wire_point_to_ecef(reference);
        let basis = self.wire_point_basis(reference);
        let ecef_target = ecef_ref + basis.compose(&enu_km);

        let geodetic = self.ecef_to_geodetic(&ecef_target);
        let lat_gc = self.geodetic_to_geocentric_latitude(geodetic.lat, geodetic.alt_km);

        let (lat, lon) = normalize_lat_lon(lat_gc, geodetic.lon);
        LatLonAlt::new(lat, lon, geodetic.alt_km * 1000.0)
    }

    /// Flat-earth estimate from the metres-per-degree series. Cheaper than
    /// [`estimate_geodetic`](Self::estimate_geodetic) and only valid for short offsets.
    pub fn estimate_geodetic_linear(
        &self,
        reference: &GeodeticPoint,
        reference_local: &Vec3,
        target_local: &Vec3,
    ) -> LatLonAlt {
        let enu = self.frame.local_to_enu(&(target_local - reference_local));

        let lat = reference.lat + enu.y / metres_per_degree_latitude(reference.lat);
        let lon = reference.lon + enu.x / metres_per_degree_longitude(reference.lat);

        let (lat, lon) = normalize_lat_lon(lat, lon);
        LatLonAlt::new(lat, lon, reference.alt_km * 1000.0 + enu.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn manchester() -> GeodeticPoint {
        GeodeticPoint::new(53.485, -2.192, 0.0)
    }

    #[test]
    fn test_wgs84_constants() {
        let e = Ellipsoid::wgs84();
        assert_relative_eq!(e.a, 6378.137);
        assert_relative_eq!(e.b, 6356.752314245, epsilon = 1e-6);
        assert_relative_eq!(e.f, 1.0 / 298.257223563, epsilon = 1e-15);
        assert_relative_eq!(e.esq, 0.00669437999014, epsilon = 1e-12);
        assert_relative_eq!(e.ecc * e.ecc, e.esq, epsilon = 1e-15);
    }

    #[test]
    fn test_radius_of_curvature_equator_and_pole() {
        let engine = GeodesyEngine::default();
        let e = *engine.ellipsoid();

        let equator = engine.radius_of_curvature(0.0);
        assert_relative_eq!(equator.normal, e.a, epsilon = 1e-9);
        assert_relative_eq!(equator.geocentric, e.a, epsilon = 1e-9);
        assert_relative_eq!(equator.meridional, e.a * (1.0 - e.esq), epsilon = 1e-9);

        let pole = engine.radius_of_curvature(90.0);
        assert_relative_eq!(pole.geocentric, e.b, epsilon = 1e-9);
        assert_relative_eq!(pole.normal, pole.meridional, epsilon = 1e-9);
    }

    #[test]
    fn test_latitude_conversions() {
        let engine = GeodesyEngine::default();

        // Geodetic latitude exceeds geocentric by about 0.19° at 45°
        let gc = engine.geodetic_to_geocentric_latitude(45.0, 0.0);
        assert_abs_diff_eq!(45.0 - gc, 0.1924, epsilon = 1e-3);

        for &lat in &[-80.0, -45.0, -1.0, 0.0, 10.0, 53.485, 89.0] {
            for &alt in &[0.0, 2.5, 10.0] {
                let gd = engine.geocentric_to_geodetic_latitude(lat, alt);
                let back = engine.geodetic_to_geocentric_latitude(gd, alt);
                assert_abs_diff_eq!(back, lat, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_geodetic_to_ecef_reference_points() {
        let engine = GeodesyEngine::default();
        let e = *engine.ellipsoid();

        let origin = engine.geodetic_to_ecef(0.0, 0.0, 0.0);
        assert_abs_diff_eq!(origin, Vec3::new(e.a, 0.0, 0.0), epsilon = 1e-9);

        let east = engine.geodetic_to_ecef(0.0, 90.0, 1.0);
        assert_abs_diff_eq!(east, Vec3::new(0.0, e.a + 1.0, 0.0), epsilon = 1e-9);

        let north_pole = engine.geodetic_to_ecef(90.0, 0.0, 0.0);
        assert_abs_diff_eq!(north_pole.z, e.b, epsilon = 1e-9);
    }

    #[test]
    fn test_ecef_to_geodetic_inverts_forward() {
        let engine = GeodesyEngine::default();

        for &(lat, lon, alt) in &[
            (53.485, -2.192, 0.0),
            (-33.86, 151.21, 0.05),
            (0.0, 179.9, 4.0),
            (71.2, -156.8, 1.2),
        ] {
            let xyz = engine.geodetic_to_ecef(lat, lon, alt);
            let back = engine.ecef_to_geodetic(&xyz);
            assert_abs_diff_eq!(back.lat, lat, epsilon = 1e-9);
            let expected_lon = if lon < 0.0 { lon + 360.0 } else { lon };
            assert_abs_diff_eq!(back.lon, expected_lon, epsilon = 1e-9);
            assert_abs_diff_eq!(back.alt_km, alt, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_ecef_to_geodetic_pole_special_case() {
        let engine = GeodesyEngine::default();
        let b = engine.ellipsoid().b;

        let north = engine.ecef_to_geodetic(&Vec3::new(0.0, 0.0, b + 2.0));
        assert_eq!(north.lat, 90.0);
        assert_eq!(north.lon, 0.0);
        assert_abs_diff_eq!(north.alt_km, 2.0, epsilon = 1e-9);

        let south = engine.ecef_to_geodetic(&Vec3::new(0.0, 0.0, -b));
        assert_eq!(south.lat, -90.0);
        assert_abs_diff_eq!(south.alt_km, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_enu_basis_is_orthonormal() {
        let engine = GeodesyEngine::default();
        let basis = engine.enu_unit_vectors(53.485, -2.192);

        assert_relative_eq!(basis.east.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.north.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.up.norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(basis.east.dot(&basis.north), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(basis.north.dot(&basis.up), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(basis.east.cross(&basis.north), basis.up, epsilon = 1e-12);
    }

    #[test]
    fn test_default_frame_orientation() {
        let frame = FrameRotation::from_north(default_north());

        assert_abs_diff_eq!(frame.enu_to_local(&Vec3::new(0.0, 1.0, 0.0)), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(frame.enu_to_local(&Vec3::new(1.0, 0.0, 0.0)), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(frame.enu_to_local(&Vec3::new(0.0, 0.0, 1.0)), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        let v = Vec3::new(3.0, -4.0, 12.0);
        assert_abs_diff_eq!(frame.local_to_enu(&frame.enu_to_local(&v)), v, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_north_frame() {
        // North along +x
        let engine = GeodesyEngine::new(Vector2::new(2.0, 0.0));
        let north = engine.frame().enu_to_local(&Vec3::new(0.0, 5.0, 0.0));
        assert_abs_diff_eq!(north, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_to_local_position_small_offsets() {
        let engine = GeodesyEngine::default();
        let reference = manchester();
        let origin = Vec3::zeros();

        let same = engine.to_local_position(&reference, &reference, &origin);
        assert_abs_diff_eq!(same, Vec3::zeros(), epsilon = 1e-9);

        // ~111 m north shows up along -z
        let north = GeodeticPoint::new(reference.lat + 0.001, reference.lon, 0.0);
        let local = engine.to_local_position(&reference, &north, &origin);
        assert!(local.z < -100.0 && local.z > -120.0);
        assert_abs_diff_eq!(local.x, 0.0, epsilon = 0.01);

        // Offsets from a non-zero reference position are additive
        let shifted = engine.to_local_position(&reference, &north, &Vec3::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(shifted - local, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-9);
    }

    #[test]
    fn test_geodesy_round_trip() {
        let engine = GeodesyEngine::default();
        let reference_local = Vec3::new(10.0, -5.0, 7.0);

        let mut lat = -89.0;
        while lat <= 89.0 {
            for &lon in &[-179.5, -2.192, 0.5, 45.0, 179.5] {
                for &alt_m in &[0.0, 1250.0, 5000.0] {
                    let reference = GeodeticPoint::new(lat, lon, alt_m / 1000.0);
                    let target = GeodeticPoint::new(lat + 0.0004, lon - 0.0003, (alt_m + 12.0) / 1000.0);

                    let local = engine.to_local_position(&reference, &target, &reference_local);
                    let back = engine.estimate_geodetic(&reference, &reference_local, &local);

                    assert_abs_diff_eq!(back.lat, target.lat, epsilon = 1e-6);
                    assert_abs_diff_eq!(back.lon, target.lon, epsilon = 1e-6);
                    assert_abs_diff_eq!(back.alt, target.alt_km * 1000.0, epsilon = 1.0);
                }
            }
            lat += 8.9;
        }
    }

    #[test]
    fn test_estimate_geodetic_zero_offset() {
        let engine = GeodesyEngine::default();
        let reference = manchester();
        let p = Vec3::new(4.0, 0.0, -9.0);

        let estimate = engine.estimate_geodetic(&reference, &p, &p);
        assert_abs_diff_eq!(estimate.lat, reference.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.lon, reference.lon, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.alt, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_estimate_geodetic_output_ranges_near_pole() {
        let engine = GeodesyEngine::default();
        let reference = GeodeticPoint::new(89.9995, 10.0, 0.0);

        // 200 m north of a point 55 m from the pole
        let local = Vec3::new(0.0, 0.0, -200.0);
        let estimate = engine.estimate_geodetic(&reference, &Vec3::zeros(), &local);

        assert!(estimate.lat <= 90.0 && estimate.lat >= -90.0);
        assert!(estimate.lon <= 180.0 && estimate.lon >= -180.0);
        assert!(estimate.alt.is_finite());
    }

    #[test]
    fn test_normalize_lat_lon() {
        assert_eq!(normalize_lat_lon(91.0, 0.0), (89.0, 0.0));
        assert_eq!(normalize_lat_lon(-92.0, 0.0), (-88.0, 0.0));
        assert_eq!(normalize_lat_lon(10.0, 190.0), (10.0, -170.0));
        assert_eq!(normalize_lat_lon(10.0, -190.0), (10.0, 170.0));
        assert_eq!(normalize_lat_lon(10.0, 180.0), (10.0, 180.0));
    }

    #[test]
    fn test_metres_per_degree() {
        let lat_len = metres_per_degree_latitude(53.485);
        let lon_len = metres_per_degree_longitude(53.485);
        assert!(lat_len > 110_000.0 && lat_len < 112_000.0);
        assert!(lon_len > 65_000.0 && lon_len < 70_000.0);
        assert!(lon_len < lat_len);

        let equator = metres_per_degree_longitude(0.0);
        assert_abs_diff_eq!(equator, 111_319.458, epsilon = 0.01);
        assert_abs_diff_eq!(metres_per_degree_latitude(0.0), 110_574.2727, epsilon = 0.01);
    }

    #[test]
    fn test_linear_estimate_agrees_for_short_offsets() {
        let engine = GeodesyEngine::default();
        let reference = manchester();
        let target = Vec3::new(-40.0, 3.0, -75.0);

        let exact = engine.estimate_geodetic(&reference, &Vec3::zeros(), &target);
        let linear = engine.estimate_geodetic_linear(&reference, &Vec3::zeros(), &target);

        // Within a few centimetres at ~85 m
        assert_abs_diff_eq!(linear.lat, exact.lat, epsilon = 1e-5);
        assert_abs_diff_eq!(linear.lon, exact.lon, epsilon = 1e-5);
        assert_abs_diff_eq!(linear.alt, 3.0, epsilon = 1e-9);
    }
}
