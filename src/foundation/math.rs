//! Small numeric helpers shared by the effects.

/// 64-bit FNV parameters.
pub(crate) const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
pub(crate) const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// Linear interpolation, `a + (b - a) * t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Per-channel [`lerp`] over a 4-channel pixel.
pub fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
        lerp(a[3], b[3], t),
    ]
}

/// `x * x`.
pub fn square(x: f64) -> f64 {
    x * x
}

/// Degrees to radians.
pub fn to_radian(degree: f64) -> f64 {
    degree * (std::f64::consts::PI / 180.0)
}

/// Radians to degrees.
pub fn to_degree(radian: f64) -> f64 {
    radian * (180.0 / std::f64::consts::PI)
}

/// Reverses all 64 bits: the Van der Corput radical inverse numerator.
pub fn bit_reverse(x: u64) -> u64 {
    x.reverse_bits()
}

/// A point or direction in 3-D space.
pub type Vec3 = [f64; 3];

/// Dot product of two 3-vectors.
pub fn dot3(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Point reached from `origin` after travelling `t` along `dir`.
pub fn meet(origin: Vec3, dir: Vec3, t: f64) -> Vec3 {
    [
        origin[0] + dir[0] * t,
        origin[1] + dir[1] * t,
        origin[2] + dir[2] * t,
    ]
}

/// Reflect incident `i` about the unit normal `n` (GLSL `reflect`).
pub fn reflect(i: Vec3, n: Vec3) -> Vec3 {
    let d = -2.0 * dot3(n, i);
    [i[0] + n[0] * d, i[1] + n[1] * d, i[2] + n[2] * d]
}

/// Refract unit incident `i` through unit normal `n` with index ratio `eta` (GLSL `refract`).
///
/// Total internal reflection yields the zero vector.
pub fn refract(i: Vec3, n: Vec3, eta: f64) -> Vec3 {
    let c = dot3(n, i);
    let k = 1.0 - eta * eta * (1.0 - c * c);
    if k < 0.0 {
        return [0.0; 3];
    }
    let s = eta * c + k.sqrt();
    [
        i[0] * eta - n[0] * s,
        i[1] * eta - n[1] * s,
        i[2] * eta - n[2] * s,
    ]
}

/// Floor-modulo wrap of `i` into `0..n`.
pub(crate) fn wrap_index(i: i64, n: usize) -> usize {
    debug_assert!(n > 0, "wrap_index needs a non-empty axis");
    i.rem_euclid(n as i64) as usize
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
