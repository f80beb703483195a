//! Variable-length integer encoding for record frame lengths.
//!
//! Frame headers are prefixed with their length encoded as a Protocol
//! Buffers style varint: values are stored in 7-bit chunks with the most
//! significant bit indicating continuation.

/// Append a u64 value to `buf` as a variable-length integer.
pub fn encode(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a variable-length integer from the front of `data`.
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends mid-varint or the value overflows 64 bits.
pub fn decode(data: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in data.iter().enumerate() {
        if shift >= 64 {
            return None;
        }

        value |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Some((value, i + 1));
        }

        shift += 7;
    }

    None
}
