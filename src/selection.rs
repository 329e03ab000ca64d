//! Injectable selection strategies for verbs, templates and lesson phrases.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks one option out of `len`. Implementations must return an index below `len`.
pub trait Chooser {
    fn pick(&mut self, len: usize) -> usize;

    fn choose<'a, T>(&mut self, options: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if options.is_empty() {
            return None;
        }
        let idx = self.pick(options.len()).min(options.len() - 1);
        options.get(idx)
    }
}

/// Pseudo-random choices reproducible from a seed.
#[derive(Debug, Clone)]
pub struct SeededChooser {
    rng: StdRng,
}

impl SeededChooser {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Chooser for SeededChooser {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}

/// Replays a fixed index sequence, cycling when exhausted. Indices are taken modulo `len`.
#[derive(Debug, Clone)]
pub struct SequenceChooser {
    sequence: Vec<usize>,
    cursor: usize,
}

impl SequenceChooser {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            cursor: 0,
        }
    }
}

impl Chooser for SequenceChooser {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 || self.sequence.is_empty() {
            return 0;
        }
        let value = self.sequence[self.cursor % self.sequence.len()];
        self.cursor += 1;
        value % len
    }
}

/// Always the first option.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChooser;

impl Chooser for FirstChooser {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}
