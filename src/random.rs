use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// supplies the bytes for RND; injectable so programs can be replayed
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

/// rand-backed source; seeded for repeatable runs, from entropy otherwise
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        SeededRandom { rng }
    }
}

impl RandomSource for SeededRandom {
    fn next_byte(&mut self) -> u8 {
        self.rng.gen()
    }
}

/// hands out a fixed sequence, cycling when it runs out; for tests
pub struct ScriptedRandom {
    bytes: VecDeque<u8>,
}

impl ScriptedRandom {
    pub fn new(bytes: &[u8]) -> Self {
        ScriptedRandom {
            bytes: bytes.iter().copied().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_byte(&mut self) -> u8 {
        match self.bytes.pop_front() {
            Some(b) => {
                self.bytes.push_back(b);
                b
            }
            None => 0,
        }
    }
}
