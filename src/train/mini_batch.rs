use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

/// A randomly drawn, size-bounded group of examples borrowed from a
/// training set. Lives for one training call.
#[derive(Debug, Clone)]
pub struct MiniBatch<'a, T> {
    examples: Vec<&'a T>,
}

impl<'a, T> MiniBatch<'a, T> {
    /// Shuffles `examples` (Fisher–Yates, on a copy of the references) and
    /// chops the result into consecutive batches of `size`; the last batch may
    /// be smaller. Yields `ceil(n / size)` batches, none when `examples` is
    /// empty.
    pub fn shuffle_and_chop<R>(size: usize, examples: &'a [T], rng: &mut R) -> Result<Vec<MiniBatch<'a, T>>>
    where
        R: Rng + ?Sized,
    {
        if size == 0 {
            return Err(Error::InvalidConstruction("mini-batch size must be at least 1".to_string()));
        }

        let mut shuffled: Vec<&'a T> = examples.iter().collect();
        shuffled.shuffle(rng);

        Ok(shuffled
            .chunks(size)
            .map(|chunk| MiniBatch {
                examples: chunk.to_vec(),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&'a T> {
        self.examples.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.examples.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sizes_are_bounded_and_sum_to_total() {
        let items: Vec<u32> = (0..10).collect();
        let mut rng = StdRng::seed_from_u64(1);
        let batches = MiniBatch::shuffle_and_chop(3, &items, &mut rng).unwrap();
        let sizes: Vec<usize> = batches.iter().map(MiniBatch::len).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn oversized_batch_holds_everything() {
        let items: Vec<u32> = (0..5).collect();
        let mut rng = StdRng::seed_from_u64(2);
        let batches = MiniBatch::shuffle_and_chop(usize::MAX, &items, &mut rng).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 5);
    }

    #[test]
    fn zero_size_is_rejected() {
        let items = [1, 2, 3];
        let mut rng = StdRng::seed_from_u64(3);
        assert!(MiniBatch::shuffle_and_chop(0, &items, &mut rng).is_err());
    }

    #[test]
    fn empty_set_has_no_batches() {
        let items: [u8; 0] = [];
        let mut rng = StdRng::seed_from_u64(4);
        assert!(MiniBatch::shuffle_and_chop(4, &items, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn source_order_is_untouched() {
        let items: Vec<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let _ = MiniBatch::shuffle_and_chop(7, &items, &mut rng).unwrap();
        assert_eq!(items, (0..20).collect::<Vec<_>>());
    }
}
