/// Euclidean distance between two vectors, using f64 intermediate precision.
///
/// Returns `f64::INFINITY` on dimension mismatch.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Similarity score in `(0, 1]`: `1 / (1 + euclidean_distance)`.
///
/// Identical vectors score exactly 1.0. The score is symmetric and never
/// increases with distance. Mismatched dimensions score 0.0.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let d = euclidean_distance(a, b);
    if d.is_infinite() {
        return 0.0;
    }
    (1.0 / (1.0 + d)) as f32
}

/// Element-wise mean of equally sized vectors.
///
/// Accumulates in f64 so the mean of identical vectors is the vector itself.
/// Returns a zero vector of length `dim` when `vectors` is empty.
pub fn mean(vectors: &[Vec<f32>], dim: usize) -> Vec<f32> {
    let mut acc = vec![0.0f64; dim];
    for v in vectors {
        for (slot, &x) in acc.iter_mut().zip(v.iter()) {
            *slot += x as f64;
        }
    }
    if vectors.is_empty() {
        return vec![0.0; dim];
    }
    let n = vectors.len() as f64;
    acc.into_iter().map(|s| (s / n) as f32).collect()
}
