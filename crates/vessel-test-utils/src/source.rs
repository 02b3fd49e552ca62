//! Seeded value and operation generation.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// One mutation of a sequence container, with indices already valid for the
/// length the sequence has when the operation is applied.
///
/// [`Op::Swap`] exchanges the sequence with a second, scratch sequence that
/// the caller keeps alongside it and that starts out empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Push(u64),
    Pop,
    Insert(usize, u64),
    InsertN(usize, usize, u64),
    Remove(usize),
    Erase(usize, usize),
    Resize(usize, u64),
    Truncate(usize),
    Clear,
    Swap,
}

impl Op {
    /// Apply the operation to a `Vec`, the reference model, with `scratch`
    /// as the model of the scratch sequence.
    pub fn apply_to_vec(&self, model: &mut Vec<u64>, scratch: &mut Vec<u64>) {
        match *self {
            Op::Push(v) => model.push(v),
            Op::Pop => {
                model.pop();
            }
            Op::Insert(i, v) => model.insert(i, v),
            Op::InsertN(i, n, v) => {
                model.splice(i..i, std::iter::repeat_n(v, n));
            }
            Op::Remove(i) => {
                model.remove(i);
            }
            Op::Erase(start, end) => {
                model.drain(start..end);
            }
            Op::Resize(n, v) => model.resize(n, v),
            Op::Truncate(n) => model.truncate(n),
            Op::Clear => model.clear(),
            Op::Swap => std::mem::swap(model, scratch),
        }
    }

    /// Length of a sequence of length `len` after the operation, given the
    /// scratch length `scratch`.
    fn len_after(&self, len: usize, scratch: usize) -> usize {
        match *self {
            Op::Push(_) | Op::Insert(..) => len + 1,
            Op::Pop => len.saturating_sub(1),
            Op::InsertN(_, n, _) => len + n,
            Op::Remove(_) => len - 1,
            Op::Erase(start, end) => len - (end - start),
            Op::Resize(n, _) => n,
            Op::Truncate(n) => len.min(n),
            Op::Clear => 0,
            Op::Swap => scratch,
        }
    }
}

/// Deterministic source of test values.
///
/// Identical seeds produce identical sequences on every platform.
pub struct ValueSource {
    rng: ChaCha8Rng,
}

impl ValueSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn value(&mut self) -> u64 {
        self.rng.random()
    }

    /// Uniform in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }

    pub fn values(&mut self, n: usize) -> Vec<u64> {
        (0..n).map(|_| self.value()).collect()
    }

    /// A script of `count` operations whose indices stay valid when applied
    /// in order to an initially empty sequence. Lengths stay below `max_len`.
    pub fn ops(&mut self, count: usize, max_len: usize) -> Vec<Op> {
        let max_len = max_len.max(1);
        let mut len = 0;
        let mut scratch = 0;
        let mut script = Vec::with_capacity(count);
        for _ in 0..count {
            let op = self.op(len, max_len);
            let next = op.len_after(len, scratch);
            if op == Op::Swap {
                scratch = len;
            }
            len = next;
            script.push(op);
        }
        script
    }

    fn op(&mut self, len: usize, max_len: usize) -> Op {
        let room = (max_len - 1).saturating_sub(len);
        loop {
            let op = match self.below(11) {
                0..=2 if room > 0 => Op::Push(self.value()),
                3 => Op::Pop,
                4 if room > 0 => Op::Insert(self.below(len + 1), self.value()),
                5 if room > 0 => {
                    let n = self.below(room.min(8) + 1);
                    Op::InsertN(self.below(len + 1), n, self.value())
                }
                6 if len > 0 => Op::Remove(self.below(len)),
                7 => {
                    let start = self.below(len + 1);
                    let end = start + self.below(len - start + 1);
                    Op::Erase(start, end)
                }
                8 => Op::Resize(self.below(max_len), self.value()),
                9 if self.below(4) == 0 => Op::Clear,
                9 => Op::Truncate(self.below(len + 1)),
                10 if self.below(3) == 0 => Op::Swap,
                _ => continue,
            };
            return op;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_values() {
        let mut a = ValueSource::seeded(7);
        let mut b = ValueSource::seeded(7);
        assert_eq!(a.values(32), b.values(32));
        assert_eq!(a.ops(64, 20), b.ops(64, 20));
    }

    #[test]
    fn scripts_apply_cleanly_to_vec() {
        let mut source = ValueSource::seeded(99);
        let mut model = Vec::new();
        let mut scratch = Vec::new();
        for op in source.ops(2_000, 50) {
            op.apply_to_vec(&mut model, &mut scratch);
            assert!(model.len() < 50, "{op:?} grew past the bound");
            assert!(scratch.len() < 50, "{op:?} grew the scratch past the bound");
        }
    }

    #[test]
    fn scripts_include_swaps() {
        let script = ValueSource::seeded(5).ops(500, 30);
        assert!(script.contains(&Op::Swap));
    }
}
