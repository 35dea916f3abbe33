//! Two's-complement and bit-field helpers for 16-bit words and 12-bit addresses.
//!
//! Storage everywhere in the core is a fixed-width integer. These helpers sit
//! at the boundaries where bit-position semantics matter: address
//! decomposition, microinstruction field extraction and the MSB-first bit
//! vectors used by front ends.

/// Width in bits of a datapath word.
pub const WORD_BITS: usize = 16;
/// Width in bits of a memory address.
pub const ADDRESS_BITS: usize = 12;
/// Mask selecting the address bits of a word.
pub const ADDRESS_MASK: u16 = 0x0FFF;
/// Sign bit of a datapath word.
pub const WORD_SIGN_BIT: u16 = 0x8000;

/// Converts an MSB-first bit vector to a signed integer (two's complement).
///
/// `bits[0]` is the sign bit. An empty slice converts to `0`. Vectors wider
/// than 32 bits keep only their low 32 bits.
#[must_use]
pub fn bits_to_int(bits: &[bool]) -> i32 {
    let Some((&sign, _)) = bits.split_first() else {
        return 0;
    };
    let magnitude = bits
        .iter()
        .fold(0_i64, |acc, &bit| (acc << 1) | i64::from(bit));
    let value = if sign {
        magnitude - (1_i64 << bits.len().min(63))
    } else {
        magnitude
    };
    #[allow(clippy::cast_possible_truncation)]
    let truncated = value as i32;
    truncated
}

/// Converts a signed integer to an `N`-bit MSB-first vector (two's complement).
///
/// Values outside the representable range wrap, exactly as the hardware
/// register would.
#[must_use]
pub fn int_to_bits<const N: usize>(value: i32) -> [bool; N] {
    let mut bits = [false; N];
    for (position, bit) in bits.iter_mut().rev().enumerate() {
        *bit = position < 32 && (value >> position) & 1 == 1;
    }
    bits
}

/// Reinterprets a datapath word as a signed integer.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn word_to_int(word: u16) -> i16 {
    word as i16
}

/// Truncates a signed integer to a datapath word, wrapping modulo 2^16.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn int_to_word(value: i32) -> u16 {
    value as u16
}

/// Interprets the low 12 bits of `address` as a signed 12-bit integer.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub const fn address_to_int(address: u16) -> i16 {
    (((address & ADDRESS_MASK) << 4) as i16) >> 4
}

/// Truncates a signed integer to a 12-bit address, wrapping modulo 2^12.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn int_to_address(value: i32) -> u16 {
    (value as u16) & ADDRESS_MASK
}

/// Expands a word into its 16-bit MSB-first vector.
#[must_use]
pub fn word_to_bits(word: u16) -> [bool; WORD_BITS] {
    int_to_bits::<WORD_BITS>(i32::from(word))
}

/// Packs a 16-bit MSB-first vector into a word.
#[must_use]
pub fn bits_to_word(bits: &[bool; WORD_BITS]) -> u16 {
    int_to_word(bits_to_int(bits))
}

/// Returns `true` when two bit vectors hold the same bits.
#[must_use]
pub fn bits_equal(left: &[bool], right: &[bool]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| l == r)
}

/// Copies `src` into the leading positions of `dest`, returning how many bits moved.
pub fn copy_bits(dest: &mut [bool], src: &[bool]) -> usize {
    let count = dest.len().min(src.len());
    dest[..count].copy_from_slice(&src[..count]);
    count
}

/// Extracts the `width`-bit field that starts at bit `shift` (bit 0 = LSB).
#[must_use]
pub const fn extract_field(raw: u32, shift: u32, width: u32) -> u32 {
    (raw >> shift) & field_mask(width)
}

/// Returns `raw` with the `width`-bit field at `shift` replaced by `value`.
///
/// Bits of `value` above `width` are discarded.
#[must_use]
pub const fn insert_field(raw: u32, shift: u32, width: u32, value: u32) -> u32 {
    let mask = field_mask(width) << shift;
    (raw & !mask) | ((value << shift) & mask)
}

const fn field_mask(width: u32) -> u32 {
    if width >= 32 {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// Renders the low `width` bits of `value` MSB-first as `0`/`1` characters.
#[must_use]
pub fn format_bits(value: u32, width: usize) -> String {
    (0..width)
        .rev()
        .map(|position| {
            if position < 32 && (value >> position) & 1 == 1 {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(10, "0000000000001010")]
    #[case(-1, "1111111111111111")]
    #[case(-32768, "1000000000000000")]
    #[case(32767, "0111111111111111")]
    fn word_vectors_are_msb_first(#[case] value: i32, #[case] expected: &str) {
        let bits = int_to_bits::<WORD_BITS>(value);
        let rendered: String = bits.iter().map(|&b| if b { '1' } else { '0' }).collect();
        assert_eq!(rendered, expected);
        assert_eq!(bits_to_int(&bits), value);
    }

    #[test]
    fn empty_vector_converts_to_zero() {
        assert_eq!(bits_to_int(&[]), 0);
    }

    #[test]
    fn out_of_range_values_wrap_like_a_register() {
        assert_eq!(bits_to_int(&int_to_bits::<WORD_BITS>(65_535)), -1);
        assert_eq!(int_to_word(65_536 + 7), 7);
        assert_eq!(int_to_address(4096 + 3), 3);
        assert_eq!(int_to_address(-1), 0x0FFF);
    }

    #[test]
    fn twelve_bit_sign_is_bit_eleven() {
        assert_eq!(address_to_int(0x0800), -2048);
        assert_eq!(address_to_int(0x07FF), 2047);
        assert_eq!(address_to_int(0xF005), 5);
    }

    #[test]
    fn field_helpers_follow_lsb_numbering() {
        assert_eq!(extract_field(0x8000_0000, 31, 1), 1);
        assert_eq!(extract_field(0x0003_0000, 16, 4), 3);
        assert_eq!(insert_field(0, 8, 4, 0x1F), 0x0000_0F00);
        assert_eq!(insert_field(u32::MAX, 0, 8, 0), 0xFFFF_FF00);
        assert_eq!(extract_field(0xDEAD_BEEF, 0, 32), 0xDEAD_BEEF);
    }

    #[test]
    fn copy_and_compare_helpers() {
        let src = word_to_bits(0xA5A5);
        let mut dest = [false; WORD_BITS];
        assert_eq!(copy_bits(&mut dest, &src), WORD_BITS);
        assert!(bits_equal(&dest, &src));
        assert!(!bits_equal(&dest[..8], &src));
        assert_eq!(bits_to_word(&dest), 0xA5A5);
    }

    #[test]
    fn format_bits_pads_to_width() {
        assert_eq!(format_bits(5, 8), "00000101");
        assert_eq!(format_bits(0xFF, 4), "1111");
    }

    proptest! {
        #[test]
        fn word_conversion_roundtrips(value in i16::MIN..=i16::MAX) {
            let bits = int_to_bits::<WORD_BITS>(i32::from(value));
            prop_assert_eq!(bits_to_int(&bits), i32::from(value));
            prop_assert_eq!(word_to_int(int_to_word(i32::from(value))), value);
        }

        #[test]
        fn address_conversion_roundtrips(value in -2048_i32..=2047) {
            let bits = int_to_bits::<ADDRESS_BITS>(value);
            prop_assert_eq!(bits_to_int(&bits), value);
            prop_assert_eq!(i32::from(address_to_int(int_to_address(value))), value);
        }

        #[test]
        fn unsigned_words_roundtrip_through_vectors(word in any::<u16>()) {
            prop_assert_eq!(bits_to_word(&word_to_bits(word)), word);
        }
    }
}
