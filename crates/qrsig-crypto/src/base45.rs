//! Base45 (RFC 9285), the densest alphabet for QR alphanumeric mode.
//!
//! Every 2 bytes become 3 characters, a trailing single byte becomes 2.

use crate::error::CryptoError;

const ALPHABET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

fn symbol_value(c: u8) -> Option<u32> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u32)
}

/// Base45 encode bytes.
pub fn base45_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(2) * 3);
    for chunk in data.chunks(2) {
        match *chunk {
            [a, b] => {
                let n = u32::from(a) * 256 + u32::from(b);
                out.push(ALPHABET[(n % 45) as usize] as char);
                out.push(ALPHABET[((n / 45) % 45) as usize] as char);
                out.push(ALPHABET[(n / 2025) as usize] as char);
            }
            [a] => {
                let n = u32::from(a);
                out.push(ALPHABET[(n % 45) as usize] as char);
                out.push(ALPHABET[(n / 45) as usize] as char);
            }
            _ => {}
        }
    }
    out
}

/// Base45 decode a string to bytes.
pub fn base45_decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    let input = s.as_bytes();
    if input.len() % 3 == 1 {
        return Err(CryptoError::Base45Decode(format!(
            "invalid length {}",
            input.len()
        )));
    }

    let mut out = Vec::with_capacity(input.len() / 3 * 2 + 1);
    for chunk in input.chunks(3) {
        let mut n = 0u32;
        let mut weight = 1u32;
        for &c in chunk {
            let v = symbol_value(c).ok_or_else(|| {
                CryptoError::Base45Decode(format!("invalid character {:?}", c as char))
            })?;
            n += v * weight;
            weight *= 45;
        }
        if chunk.len() == 3 {
            if n > 0xffff {
                return Err(CryptoError::Base45Decode(format!(
                    "triplet value {} out of range",
                    n
                )));
            }
            out.extend_from_slice(&(n as u16).to_be_bytes());
        } else {
            if n > 0xff {
                return Err(CryptoError::Base45Decode(format!(
                    "trailing pair value {} out of range",
                    n
                )));
            }
            out.push(n as u8);
        }
    }
    Ok(out)
}
