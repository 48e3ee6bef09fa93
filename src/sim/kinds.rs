/// Source of piece kinds for spawning.
///
/// The session never calls a global random function; it pulls from an
/// injected `KindSource`, so games can be seeded or scripted.

use rand::Rng;

use crate::domain::shape::Kind;

pub trait KindSource {
    fn next_kind(&mut self) -> Kind;
}

/// Uniform, independent choice per spawn (no bag).
pub struct RandomKinds<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomKinds<R> {
    pub fn new(rng: R) -> Self {
        RandomKinds { rng }
    }
}

impl<R: Rng> KindSource for RandomKinds<R> {
    fn next_kind(&mut self) -> Kind {
        Kind::ALL[self.rng.random_range(0..Kind::ALL.len())]
    }
}

/// Fixed kinds, replayed in a loop.
#[derive(Clone, Debug)]
pub struct KindSequence {
    kinds: Vec<Kind>,
    pos: usize,
}

impl KindSequence {
    /// An empty list falls back to the full catalog order.
    pub fn new(kinds: Vec<Kind>) -> Self {
        let kinds = if kinds.is_empty() { Kind::ALL.to_vec() } else { kinds };
        KindSequence { kinds, pos: 0 }
    }
}

impl KindSource for KindSequence {
    fn next_kind(&mut self) -> Kind {
        let k = self.kinds[self.pos % self.kinds.len()];
        self.pos = (self.pos + 1) % self.kinds.len();
        k
    }
}
