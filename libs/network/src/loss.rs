//! Loss injection
//!
//! Both ends pass every outbound (server) or inbound (client) datagram
//! through a [`LossGate`]. When it fires the datagram is treated as lost:
//! the server skips the send, the client discards the reply and retries.
//! A fixed seed makes a run's drop pattern reproducible.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct LossGate {
    probability: f64,
    rng: Mutex<StdRng>,
}

impl LossGate {
    /// Gate dropping with `probability`, clamped to `[0, 1]`
    pub fn new(probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self {
            probability,
            rng: Mutex::new(rng),
        }
    }

    /// Gate that never drops
    pub fn disabled() -> Self {
        Self::new(0.0, Some(0))
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Roll once; `true` means the datagram is lost
    pub fn should_drop(&self) -> bool {
        if self.probability <= 0.0 {
            return false;
        }
        self.rng.lock().gen::<f64>() < self.probability
    }
}

impl std::fmt::Debug for LossGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LossGate")
            .field("probability", &self.probability)
            .finish()
    }
}
