use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};
use uuid::{Builder, Uuid};

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a random (version 4) submission identifier.
///
/// Bytes come from the operating system's randomness source. If that source
/// is unavailable, a clock-seeded `StdRng` is used instead; the version and
/// variant bits are set the same way in both cases.
pub fn generate() -> Uuid {
    let mut bytes = [0u8; 16];
    if let Err(e) = OsRng.try_fill_bytes(&mut bytes) {
        tracing::warn!("OS randomness unavailable, using seeded fallback: {e}");
        fallback_bytes(&mut bytes);
    }
    Builder::from_random_bytes(bytes).into_uuid()
}

fn fallback_bytes(bytes: &mut [u8; 16]) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut rng = StdRng::seed_from_u64(nanos ^ counter.rotate_left(32));
    rng.fill_bytes(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_bytes_still_produce_v4_layout() {
        let mut bytes = [0u8; 16];
        fallback_bytes(&mut bytes);
        let id = Builder::from_random_bytes(bytes).into_uuid();

        assert_eq!(id.get_version_num(), 4);
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert!(matches!(text.as_bytes()[19], b'8' | b'9' | b'a' | b'b'));
    }
}
