//! One-time passcode generation

use rand::{rngs::OsRng, Rng};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Produces fixed-length decimal OTPs
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, digits: usize) -> String;
}

/// Draws each digit independently and uniformly from the OS RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, digits: usize) -> String {
        let mut rng = OsRng;
        (0..digits)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

/// Replays scripted codes in order, then repeats the last one
///
/// Lets tests force token collisions and predict issued tokens.
#[derive(Debug, Default)]
pub struct SequenceCodeGenerator {
    codes: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
}

impl SequenceCodeGenerator {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
        }
    }

    /// Queue more codes behind the remaining ones
    pub fn push(&self, code: impl Into<String>) {
        self.codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(code.into());
    }
}

impl CodeGenerator for SequenceCodeGenerator {
    fn generate(&self, digits: usize) -> String {
        let next = self
            .codes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match next {
            Some(code) => {
                *last = Some(code.clone());
                code
            }
            None => last.clone().unwrap_or_else(|| "0".repeat(digits)),
        }
    }
}
