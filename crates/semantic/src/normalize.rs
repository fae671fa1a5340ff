//! Unit-length scaling for embedding vectors.
//!
//! Sums are accumulated in `f64` so long vectors of small components keep
//! their precision.

/// Euclidean length of `v`.
pub fn l2_norm(v: &[f32]) -> f32 {
    squared_sum(v).sqrt() as f32
}

/// Scales `v` to unit length in place and reports whether it did.
///
/// Zero vectors and vectors containing NaN or infinity are left as they
/// are; downstream cosine scoring treats them as "no similarity".
pub fn l2_normalize_in_place(v: &mut [f32]) -> bool {
    let sum = squared_sum(v);
    if !(sum.is_finite() && sum > 0.0) {
        return false;
    }
    let scale = sum.sqrt().recip();
    v.iter_mut().for_each(|x| *x = (f64::from(*x) * scale) as f32);
    true
}

fn squared_sum(v: &[f32]) -> f64 {
    v.iter().map(|&x| f64::from(x) * f64::from(x)).sum()
}
