use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::OsRng, Rng};

pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Builds a record id from the current time plus random bits, both in
/// base36. Collisions are astronomically unlikely and not checked; the write
/// path is last-writer-wins either way.
pub(crate) fn generate_id() -> String {
    let entropy: u64 = OsRng.gen();
    format!("{}{}", base36(epoch_millis()), base36(entropy))
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    // u64::MAX needs 13 base36 digits.
    let mut buf = [0u8; 13];
    let mut i = buf.len();
    while n > 0 {
        i -= 1;
        buf[i] = DIGITS[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8_lossy(&buf[i..]).into_owned()
}
