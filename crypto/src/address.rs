//! Account encoding and decoding.
//!
//! Format: prefix + base32(4 zero bits ‖ public_key, 52 chars)
//! + base32(reverse(Blake2b-40(public_key)), 8 chars).
//!
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).

use lattice_types::{Account, PublicKey};

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// 4 pad bits + 256 key bits = 52 characters.
const PUBKEY_CHARS: usize = 52;
const PUBKEY_PAD_BITS: u32 = 4;
/// 40 checksum bits = 8 characters.
const CHECKSUM_CHARS: usize = 8;

/// Encode bytes as base32, preceded by `pad_bits` zero bits.
fn encode_base32(bytes: &[u8], pad_bits: u32) -> String {
    let num_chars = (bytes.len() * 8 + pad_bits as usize).div_ceil(5);
    let mut result = String::with_capacity(num_chars);

    let mut buffer: u64 = 0;
    let mut bits = pad_bits;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let idx = ((buffer >> bits) & 0x1F) as usize;
            result.push(BASE32_ALPHABET[idx] as char);
        }
        buffer &= (1u64 << bits) - 1;
    }
    if bits > 0 {
        let idx = ((buffer << (5 - bits)) & 0x1F) as usize;
        result.push(BASE32_ALPHABET[idx] as char);
    }

    result
}

/// Decode base32 into exactly `N` bytes. The leading `pad_bits` must be zero and
/// no bits may be left over.
fn decode_base32_fixed<const N: usize>(s: &str, pad_bits: u32) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits: u32 = 0;
    let mut pad_left = pad_bits;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        let val = *BASE32_DECODE.get(c as usize)?;
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits += 5;

        if pad_left > 0 {
            let take = pad_left.min(bits);
            if buffer >> (bits - take) != 0 {
                return None;
            }
            bits -= take;
            buffer &= (1u64 << bits) - 1;
            pad_left -= take;
        }

        while bits >= 8 {
            bits -= 8;
            if pos >= N {
                return None;
            }
            result[pos] = (buffer >> bits) as u8;
            pos += 1;
            buffer &= (1u64 << bits) - 1;
        }
    }

    if pos != N || bits != 0 {
        return None;
    }
    Some(result)
}

fn checksum(public_key: &[u8; 32]) -> [u8; 5] {
    let mut check = crate::blake2b_40(public_key);
    check.reverse();
    check
}

/// Encode a public key as a `nano_` account.
pub fn encode_account(public_key: &PublicKey) -> Account {
    let key_encoded = encode_base32(public_key.as_bytes(), PUBKEY_PAD_BITS);
    let check_encoded = encode_base32(&checksum(public_key.as_bytes()), 0);
    Account::new(format!("{}{}{}", Account::PREFIX, key_encoded, check_encoded))
}

/// Extract the public key from an account string.
///
/// Returns `None` if the prefix, length, alphabet or checksum is wrong.
pub fn decode_account(account: &str) -> Option<PublicKey> {
    let encoded = account
        .strip_prefix(Account::PREFIX)
        .or_else(|| account.strip_prefix(Account::LEGACY_PREFIX))?;
    if encoded.len() != PUBKEY_CHARS + CHECKSUM_CHARS {
        return None;
    }

    let (key_encoded, check_encoded) = encoded.split_at(PUBKEY_CHARS);
    let key: [u8; 32] = decode_base32_fixed(key_encoded, PUBKEY_PAD_BITS)?;
    let check: [u8; 5] = decode_base32_fixed(check_encoded, 0)?;

    if check != checksum(&key) {
        return None;
    }
    Some(PublicKey(key))
}

/// Whether an account string is well-formed and its checksum is correct.
pub fn validate_account(account: &str) -> bool {
    decode_account(account).is_some()
}

/// Interpret a 32-byte block `link` as the account it points at.
pub fn account_from_link(link: &[u8; 32]) -> Account {
    encode_account(&PublicKey(*link))
}
