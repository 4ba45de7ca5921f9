//! Uniform sampling without replacement.
//!
//! Selection runs a Fisher-Yates shuffle over the index range, drawing swap
//! positions from a cryptographically strong generator, and keeps the first
//! `k` positions of the permutation.

use rand::{rngs::OsRng, CryptoRng, Rng};

/// Returns a uniformly random permutation of `0..n`.
pub fn shuffled_indices<R>(n: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + CryptoRng,
{
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }
    indices
}

/// Picks `min(k, n)` distinct indices from `0..n`, every subset of that size equally likely.
pub fn sample_indices<R>(n: usize, k: usize, rng: &mut R) -> Vec<usize>
where
    R: Rng + CryptoRng,
{
    let mut indices = shuffled_indices(n, rng);
    indices.truncate(k.min(n));
    indices
}

pub fn sample_with<T, R>(population: &[T], k: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + CryptoRng,
{
    sample_indices(population.len(), k, rng)
        .into_iter()
        .map(|index| population[index].clone())
        .collect()
}

/// Samples from `population` using the operating system's random source.
pub fn sample<T: Clone>(population: &[T], k: usize) -> Vec<T> {
    sample_with(population, k, &mut OsRng)
}
