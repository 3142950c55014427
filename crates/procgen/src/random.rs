//! Injected randomness. Every generator takes a `RandomSource` so a seeded `StdRng` gives
//! reproducible cities and tests can script individual draws.

use rand::Rng;

/// Uniform draws in `[0, 1)`, plus the handful of derived helpers the generators need.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;

    /// Uniform in `[min, max)`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform pick from a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.index(items.len())]
    }
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_f32(&mut self) -> f32 {
        self.gen::<f32>()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RandomSource;

    /// Always returns the same value.
    pub struct Constant(pub f32);

    impl RandomSource for Constant {
        fn next_f32(&mut self) -> f32 {
            self.0
        }
    }

    /// Replays a fixed script, then repeats its last value.
    pub struct Scripted {
        values: Vec<f32>,
        cursor: usize,
    }

    impl Scripted {
        pub fn new(values: &[f32]) -> Self {
            Self {
                values: values.to_vec(),
                cursor: 0,
            }
        }

        pub fn consumed(&self) -> usize {
            self.cursor
        }
    }

    impl RandomSource for Scripted {
        fn next_f32(&mut self) -> f32 {
            let value = self.values[self.cursor.min(self.values.len() - 1)];
            self.cursor += 1;
            value
        }
    }
}
