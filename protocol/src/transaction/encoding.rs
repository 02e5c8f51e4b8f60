//! # Canonical MessagePack
//!
//! Algorand hashes and signs transactions in a canonical msgpack form:
//!
//! - maps have their keys sorted bytewise,
//! - fields holding a zero value (0, false, empty string/bytes, all-zero
//!   address, empty map or array) are omitted entirely,
//! - every integer, string, binary and container uses the smallest header
//!   that fits.
//!
//! A general-purpose serializer gets at least one of these wrong, and a
//! single byte of difference means a different transaction id and a
//! signature the node refuses. So, like the rest of the signing path, this
//! is written out by hand.

use crate::identity::Address;

// ---------------------------------------------------------------------------
// Primitive writers
// ---------------------------------------------------------------------------

pub(crate) fn write_uint(buf: &mut Vec<u8>, value: u64) {
    match value {
        0..=0x7f => buf.push(value as u8),
        0x80..=0xff => {
            buf.push(0xcc);
            buf.push(value as u8);
        }
        0x100..=0xffff => {
            buf.push(0xcd);
            buf.extend_from_slice(&(value as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            buf.push(0xce);
            buf.extend_from_slice(&(value as u32).to_be_bytes());
        }
        _ => {
            buf.push(0xcf);
            buf.extend_from_slice(&value.to_be_bytes());
        }
    }
}

pub(crate) fn write_bool(buf: &mut Vec<u8>, value: bool) {
    buf.push(if value { 0xc3 } else { 0xc2 });
}

pub(crate) fn write_str(buf: &mut Vec<u8>, value: &str) {
    let len = value.len();
    if len < 32 {
        buf.push(0xa0 | len as u8);
    } else if len <= 0xff {
        buf.push(0xd9);
        buf.push(len as u8);
    } else if len <= 0xffff {
        buf.push(0xda);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        buf.push(0xdb);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    }
    buf.extend_from_slice(value.as_bytes());
}

pub(crate) fn write_bin(buf: &mut Vec<u8>, value: &[u8]) {
    let len = value.len();
    if len <= 0xff {
        buf.push(0xc4);
        buf.push(len as u8);
    } else if len <= 0xffff {
        buf.push(0xc5);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        buf.push(0xc6);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    }
    buf.extend_from_slice(value);
}

pub(crate) fn write_array_header(buf: &mut Vec<u8>, len: usize) {
    if len < 16 {
        buf.push(0x90 | len as u8);
    } else if len <= 0xffff {
        buf.push(0xdc);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        buf.push(0xdd);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    }
}

pub(crate) fn write_map_header(buf: &mut Vec<u8>, len: usize) {
    if len < 16 {
        buf.push(0x80 | len as u8);
    } else if len <= 0xffff {
        buf.push(0xde);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        buf.push(0xdf);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    }
}

// ---------------------------------------------------------------------------
// CanonicalMap
// ---------------------------------------------------------------------------

/// A msgpack map under construction.
///
/// Every setter silently drops zero values, and [`CanonicalMap::finish`]
/// sorts the keys, so callers can add fields in whatever order reads best.
#[derive(Debug, Default)]
pub(crate) struct CanonicalMap {
    entries: Vec<(&'static str, Vec<u8>)>,
}

impl CanonicalMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: &'static str, value: Vec<u8>) -> &mut Self {
        self.entries.push((key, value));
        self
    }

    pub fn uint(&mut self, key: &'static str, value: u64) -> &mut Self {
        if value == 0 {
            return self;
        }
        let mut buf = Vec::with_capacity(9);
        write_uint(&mut buf, value);
        self.insert(key, buf)
    }

    pub fn boolean(&mut self, key: &'static str, value: bool) -> &mut Self {
        if !value {
            return self;
        }
        let mut buf = Vec::with_capacity(1);
        write_bool(&mut buf, value);
        self.insert(key, buf)
    }

    pub fn string(&mut self, key: &'static str, value: &str) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        let mut buf = Vec::with_capacity(value.len() + 2);
        write_str(&mut buf, value);
        self.insert(key, buf)
    }

    pub fn bytes(&mut self, key: &'static str, value: &[u8]) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        let mut buf = Vec::with_capacity(value.len() + 3);
        write_bin(&mut buf, value);
        self.insert(key, buf)
    }

    /// Fixed-size hashes (genesis hash, group id, lease). All-zero means unset.
    pub fn digest(&mut self, key: &'static str, value: &[u8; 32]) -> &mut Self {
        if value.iter().all(|b| *b == 0) {
            return self;
        }
        self.bytes(key, value)
    }

    pub fn address(&mut self, key: &'static str, value: &Address) -> &mut Self {
        if value.is_zero() {
            return self;
        }
        self.bytes(key, value.public_key())
    }

    pub fn bytes_array(&mut self, key: &'static str, values: &[Vec<u8>]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let mut buf = Vec::new();
        write_array_header(&mut buf, values.len());
        for value in values {
            write_bin(&mut buf, value);
        }
        self.insert(key, buf)
    }

    pub fn address_array(&mut self, key: &'static str, values: &[Address]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let mut buf = Vec::with_capacity(values.len() * 34 + 3);
        write_array_header(&mut buf, values.len());
        for value in values {
            write_bin(&mut buf, value.public_key());
        }
        self.insert(key, buf)
    }

    pub fn uint_array(&mut self, key: &'static str, values: &[u64]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let mut buf = Vec::new();
        write_array_header(&mut buf, values.len());
        for value in values {
            write_uint(&mut buf, *value);
        }
        self.insert(key, buf)
    }

    pub fn map(&mut self, key: &'static str, value: CanonicalMap) -> &mut Self {
        if value.is_empty() {
            return self;
        }
        self.insert(key, value.finish())
    }

    /// An already-encoded value, embedded as is.
    pub fn raw(&mut self, key: &'static str, encoded: Vec<u8>) -> &mut Self {
        self.insert(key, encoded)
    }

    /// Sort and serialize.
    pub fn finish(mut self) -> Vec<u8> {
        self.entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        let size: usize = self
            .entries
            .iter()
            .map(|(k, v)| k.len() + v.len() + 1)
            .sum();
        let mut buf = Vec::with_capacity(size + 3);
        write_map_header(&mut buf, self.entries.len());
        for (key, value) in &self.entries {
            write_str(&mut buf, key);
            buf.extend_from_slice(value);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_uint(&mut buf, value);
        buf
    }

    #[test]
    fn integers_use_smallest_width() {
        assert_eq!(uint(0), vec![0x00]);
        assert_eq!(uint(127), vec![0x7f]);
        assert_eq!(uint(128), vec![0xcc, 0x80]);
        assert_eq!(uint(1000), vec![0xcd, 0x03, 0xe8]);
        assert_eq!(uint(100_000), vec![0xce, 0x00, 0x01, 0x86, 0xa0]);
        assert_eq!(uint(1 << 32), vec![0xcf, 0, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn strings_and_binaries() {
        let mut buf = Vec::new();
        write_str(&mut buf, "pay");
        assert_eq!(buf, vec![0xa3, b'p', b'a', b'y']);

        let long = "x".repeat(40);
        let mut buf = Vec::new();
        write_str(&mut buf, &long);
        assert_eq!(&buf[..2], &[0xd9, 40]);

        let mut buf = Vec::new();
        write_bin(&mut buf, &[1, 2]);
        assert_eq!(buf, vec![0xc4, 2, 1, 2]);

        let mut buf = Vec::new();
        write_bin(&mut buf, &[0u8; 300]);
        assert_eq!(&buf[..3], &[0xc5, 0x01, 0x2c]);
    }

    #[test]
    fn container_headers() {
        let mut buf = Vec::new();
        write_array_header(&mut buf, 3);
        write_array_header(&mut buf, 16);
        write_map_header(&mut buf, 2);
        write_map_header(&mut buf, 20);
        assert_eq!(buf, vec![0x93, 0xdc, 0, 16, 0x82, 0xde, 0, 20]);
    }

    #[test]
    fn map_sorts_keys() {
        let mut map = CanonicalMap::new();
        map.uint("fee", 1000).string("type", "pay").uint("amt", 5);
        let bytes = map.finish();
        let mut expected = vec![0x83];
        expected.extend_from_slice(&[0xa3, b'a', b'm', b't', 0x05]);
        expected.extend_from_slice(&[0xa3, b'f', b'e', b'e', 0xcd, 0x03, 0xe8]);
        expected.extend_from_slice(&[0xa4, b't', b'y', b'p', b'e', 0xa3, b'p', b'a', b'y']);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn map_omits_zero_values() {
        let mut inner = CanonicalMap::new();
        inner.uint("nui", 0);
        let mut map = CanonicalMap::new();
        map.uint("a", 0)
            .boolean("b", false)
            .string("c", "")
            .bytes("d", &[])
            .address("e", &Address::ZERO)
            .digest("f", &[0u8; 32])
            .uint_array("g", &[])
            .map("h", inner);
        assert_eq!(map.finish(), vec![0x80]);
    }

    #[test]
    fn arrays_keep_zero_elements() {
        let mut map = CanonicalMap::new();
        map.uint_array("apfa", &[0, 7]);
        assert_eq!(
            map.finish(),
            vec![0x81, 0xa4, b'a', b'p', b'f', b'a', 0x92, 0x00, 0x07]
        );
    }
}
