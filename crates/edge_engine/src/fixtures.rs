//! Deterministic demo signals.
//!
//! Seeds a small generator from the question text so the same question
//! always produces the same signals. Never used on the live scoring path;
//! only compiled for tests or with the `fixtures` feature.

use chrono::{DateTime, Utc};
use common::{SignalSource, SourceSignal};

/// FNV-1a over the question bytes.
fn seed_for(question: &str) -> u64 {
    question.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// splitmix64 stream yielding floats in [0, 1).
struct SeededStream {
    state: u64,
}

impl SeededStream {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Plausible signals for all three sources, in evaluation order.
///
/// Sentiment lands in [-0.6, 0.6], confidence in [0.3, 0.7] and velocity
/// in [0.8, 2.0].
pub fn demo_signals(question: &str, now: DateTime<Utc>) -> [SourceSignal; 3] {
    let mut stream = SeededStream::new(seed_for(question));

    SignalSource::ALL.map(|source| {
        let sentiment = (stream.next_unit() * 2.0 - 1.0) * 0.6;
        let confidence = 0.3 + stream.next_unit() * 0.4;
        let velocity = 0.8 + stream.next_unit() * 1.2;
        let sample_size = 5 + (stream.next_unit() * 15.0) as usize;

        SourceSignal {
            source,
            sentiment,
            confidence,
            velocity,
            sample_size,
            keywords: Vec::new(),
            summary: format!("Demo {} signal", source.display_name()),
            observed_at: now,
        }
    })
}
