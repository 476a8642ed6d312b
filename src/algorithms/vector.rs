//! Minimal 3D vector helpers used by the geometry code

use nalgebra::Vector3;

pub type Vec3 = Vector3<f64>;

/// Unit vector in the direction of `v`. A zero vector is returned unchanged.
pub fn normalize(v: &Vec3) -> Vec3 {
    let length = v.norm();
    if length > 0.0 {
        v / length
    } else {
        *v
    }
}

pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    a.cross(b)
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a.dot(b)
}

pub fn distance(a: &Vec3, b: &Vec3) -> f64 {
    (a - b).norm()
}
