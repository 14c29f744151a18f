use rand::Rng;
use uuid::Uuid;

pub const DEVICE_ID_DIGITS: usize = 10;

pub fn random_token() -> String {
    Uuid::new_v4().to_string().replace('-', "")
}

/// Random ten-digit string used as a stand-in phone number for anonymous
/// voting. Never starts with zero.
pub fn random_device_id() -> String {
    let mut rng = rand::rng();
    let mut id = String::with_capacity(DEVICE_ID_DIGITS);
    id.push(char::from(b'1' + rng.random_range(0..9u8)));
    for _ in 1..DEVICE_ID_DIGITS {
        id.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_32_hex_chars_and_unique() {
        let a = random_token();
        let b = random_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn device_id_looks_like_a_phone_number() {
        for _ in 0..50 {
            let id = random_device_id();
            assert_eq!(id.len(), DEVICE_ID_DIGITS);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
            assert!(!id.starts_with('0'));
        }
    }
}
