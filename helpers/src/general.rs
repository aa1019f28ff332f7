use rand::Rng;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, i.e. equal values
/// keep their original relative order. NaN values are ordered by `f64::total_cmp`.
pub fn argsort(x: &[f64], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices.sort_by(|&a, &b| x[a].total_cmp(&x[b])),
        SortOrder::Descending => indices.sort_by(|&a, &b| x[b].total_cmp(&x[a])),
    }
    indices
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing. Values outside of xp are clamped to the first/last value of fp.
/// Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert_eq!(xp.len(), fp.len(), "Number of items in xp and fp must be equal!");

    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..n {
        if x <= xp[i] {
            if xp[i] - xp[i - 1] <= 0.0 {
                return fp[i];
            }
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[n - 1]
}

/// draw_uniform returns a value in [low, high) using a single `f64` draw from the generator.
pub fn draw_uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    low + rng.gen::<f64>() * (high - low)
}

/// draw_chance returns true with probability p (p is clamped to [0, 1]).
pub fn draw_chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    match p.partial_cmp(&0.0) {
        Some(Ordering::Greater) => rng.gen::<f64>() < p.min(1.0),
        _ => false,
    }
}

/// draw_index returns an index in [0, len) using a single `f64` draw (len must be > 0).
pub fn draw_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    ((rng.gen::<f64>() * len as f64) as usize).min(len.saturating_sub(1))
}
