use rand::rngs::OsRng;
use rand::Rng;

pub const GUEST_PREFIX: &str = "ゲスト";
pub const GUEST_SUFFIX_LEN: usize = 5;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Candidate guest name: prefix plus 5 base-36 characters drawn from the OS
/// cryptographic RNG.
pub fn generate_guest_name() -> String {
    let mut rng = OsRng;
    let suffix: String = (0..GUEST_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}{}", GUEST_PREFIX, suffix)
}

pub fn is_guest_name(name: &str) -> bool {
    name.strip_prefix(GUEST_PREFIX).is_some_and(|suffix| {
        suffix.len() == GUEST_SUFFIX_LEN && suffix.bytes().all(|b| BASE36.contains(&b))
    })
}
