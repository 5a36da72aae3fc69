// Explicit weighted category tables, so "active is 3x as likely" is a number you can read
// and test instead of a duplicated list entry.

use anyhow::{Context, Result};
use rand::Rng;
use rand_distr::{Distribution, WeightedAliasIndex};
use std::fmt;

pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    index: WeightedAliasIndex<u32>,
}

impl<T: Copy + fmt::Debug> WeightedTable<T> {
    pub fn new(entries: &[(T, u32)]) -> Result<Self> {
        anyhow::ensure!(!entries.is_empty(), "Weighted table needs at least one entry");

        let weights: Vec<u32> = entries.iter().map(|(_, w)| *w).collect();
        let index = WeightedAliasIndex::new(weights)
            .with_context(|| format!("Invalid weights for {:?}", entries))?;

        Ok(Self {
            entries: entries.to_vec(),
            index,
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        self.entries[self.index.sample(rng)].0
    }

    pub fn total_weight(&self) -> u32 {
        self.entries.iter().map(|(_, w)| *w).sum()
    }

    /// Probability of `value`, 0.0 when it is not in the table.
    pub fn probability(&self, value: T) -> f64
    where
        T: PartialEq,
    {
        let weight: u32 = self
            .entries
            .iter()
            .filter(|(v, _)| *v == value)
            .map(|(_, w)| *w)
            .sum();
        weight as f64 / self.total_weight() as f64
    }
}

impl<T: fmt::Debug> fmt::Debug for WeightedTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedTable")
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rejects_all_zero_weights() {
        assert!(WeightedTable::new(&[("a", 0), ("b", 0)]).is_err());
        assert!(WeightedTable::<&str>::new(&[]).is_err());
    }

    #[test]
    fn zero_weight_is_never_sampled() {
        let table = WeightedTable::new(&[("never", 0), ("always", 5)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert_eq!(table.sample(&mut rng), "always");
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let table = WeightedTable::new(&[('a', 3), ('b', 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let hits = (0..20_000).filter(|_| table.sample(&mut rng) == 'a').count();
        let ratio = hits as f64 / 20_000.0;
        assert!((ratio - 0.75).abs() < 0.02, "ratio was {}", ratio);
        assert!((table.probability('a') - 0.75).abs() < f64::EPSILON);
    }
}
