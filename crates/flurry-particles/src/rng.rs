//! Seedable random source for particle placement and jitter

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SimRng {
    inner: StdRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Returns a float in [min, max); `min` when the range is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }

    /// Returns a float in [-1, 1]
    pub fn signed_unit(&mut self) -> f32 {
        self.inner.random_range(-1.0..=1.0)
    }

    /// Returns a float in [-width/2, width/2)
    pub fn centered(&mut self, width: f32) -> f32 {
        let half = width * 0.5;
        self.range(-half, half)
    }

    /// Uniform pick from a slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.inner.random_range(0..items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = SimRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
            let u = rng.signed_unit();
            assert!((-1.0..=1.0).contains(&u));
            let c = rng.centered(0.3);
            assert!((-0.15..0.15).contains(&c));
        }
    }

    #[test]
    fn empty_range_returns_min() {
        let mut rng = SimRng::new(1);
        assert_eq!(rng.range(3.0, 3.0), 3.0);
        assert_eq!(rng.centered(0.0), 0.0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimRng::new(99);
        let mut b = SimRng::new(99);
        for _ in 0..16 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }

    #[test]
    fn pick_covers_items() {
        let mut rng = SimRng::new(5);
        let items = ["a", "b", "c"];
        let mut seen = [false; 3];
        for _ in 0..200 {
            let picked = *rng.pick(&items).unwrap();
            let idx = items.iter().position(|i| *i == picked).unwrap();
            seen[idx] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert!(rng.pick::<u8>(&[]).is_none());
    }
}
