use chrono::{Datelike, Utc};
use rand::Rng;

const TRACKING_PREFIX: &str = "SG";
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const INSURANCE_RATE_PERCENT: f64 = 2.0;

/// Human-readable code: `{prefix}-{year}-{6-digit random}`.
///
/// Collision-resistant, not collision-free; the store's claim index turns a
/// duplicate into a conflict at insert time.
pub fn generate_code(prefix: &str) -> String {
    let year = Utc::now().year();
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{prefix}-{year}-{random:06}")
}

/// Public tracking number: `SG` + uppercased base-36 millisecond timestamp
/// + 6 random base-36 chars.
pub fn generate_tracking_number() -> String {
    let mut rng = rand::thread_rng();
    let timestamp = Utc::now().timestamp_millis().max(0) as u64;
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{TRACKING_PREFIX}{}{suffix}", to_base36(timestamp))
}

/// Insurance fee: 2% of the declared value, rounded to the nearest currency
/// unit.
pub fn insurance_fee(package_value: f64) -> f64 {
    (package_value * INSURANCE_RATE_PERCENT / 100.0).round()
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut out = String::new();
    while n > 0 {
        out.insert(0, BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}
