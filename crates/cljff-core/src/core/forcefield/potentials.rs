/// Coulomb's constant in kcal·Å/(mol·e²).
pub const COULOMB_CONSTANT: f64 = 332.063713;

#[inline]
pub fn coulomb(inv_dist: f64, q1: f64, q2: f64, dielectric: f64) -> f64 {
    COULOMB_CONSTANT * q1 * q2 * inv_dist / dielectric
}

#[inline]
pub fn lennard_jones_12_6(inv_dist: f64, sigma: f64, epsilon: f64) -> f64 {
    let sr = sigma * inv_dist;
    let sr6 = sr.powi(6);
    4.0 * epsilon * (sr6 * sr6 - sr6)
}
