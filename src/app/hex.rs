//! Fixed-width ASCII hex used by AT command arguments and replies.

use heapless::Vec;

use super::ports::ArgumentSource;

/// Hex digits in an 8-bit field.
pub const U8_DIGITS: usize = 2;
/// Hex digits in a 16-bit field.
pub const U16_DIGITS: usize = 4;
/// Hex digits in a 32-bit field.
pub const U32_DIGITS: usize = 8;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Value of one hex digit, either case.
pub fn digit_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Consume up to `max_digits` bytes from `source` and fold them into a value.
///
/// Parsing stops at the first non-hex byte (which is consumed and dropped)
/// or when the source runs dry.  Returns `None` when no digit was read,
/// which callers treat as a failed set.
pub fn parse<S: ArgumentSource + ?Sized>(source: &mut S, max_digits: usize) -> Option<u32> {
    let mut value: u32 = 0;
    let mut digits = 0;
    for _ in 0..max_digits {
        let Some(byte) = source.next_byte() else {
            break;
        };
        match digit_value(byte) {
            Some(d) => {
                value = (value << 4) | u32::from(d);
                digits += 1;
            }
            None => break,
        }
    }
    (digits > 0).then_some(value)
}

/// Render `value` as `digits` uppercase hex characters, most significant first.
pub fn encode(value: u32, digits: usize) -> Vec<u8, U32_DIGITS> {
    let digits = digits.min(U32_DIGITS);
    let mut out = Vec::new();
    for i in (0..digits).rev() {
        let nibble = (value >> (i * 4)) & 0xF;
        // Capacity is U32_DIGITS and digits is clamped to it.
        let _ = out.push(HEX_UPPER[nibble as usize]);
    }
    out
}
