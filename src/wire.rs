//! Wire prefix codec
//!
//! Every coded message starts with a fixed 5-byte prefix:
//!
//! ```text
//! byte 0       : 0x00        magic
//! bytes 1-4    : schema id, signed 32-bit, big-endian
//! bytes 5..    : payload body (written by the caller)
//! ```

use std::fmt;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{CoderError, Result};

/// Leading byte of every prefix
pub const MAGIC_BYTE: u8 = 0x00;

/// Length of the prefix in bytes
pub const PREFIX_LEN: usize = 5;

/// Registry-assigned schema identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(pub i32);

impl SchemaId {
    /// Get the raw integer value
    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SchemaId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<SchemaId> for i32 {
    fn from(id: SchemaId) -> Self {
        id.0
    }
}

/// Encode a schema id into its 5-byte prefix
pub fn encode_prefix(id: SchemaId) -> [u8; PREFIX_LEN] {
    let mut prefix = [MAGIC_BYTE; PREFIX_LEN];
    prefix[1..].copy_from_slice(&id.0.to_be_bytes());
    prefix
}

/// Write the prefix for `id` in a single call
pub fn write_prefix<W: Write + ?Sized>(writer: &mut W, id: SchemaId) -> Result<()> {
    writer.write_all(&encode_prefix(id))?;
    Ok(())
}

/// Read a prefix from the front of a stream
///
/// Consumes exactly [`PREFIX_LEN`] bytes on success. After a failure the
/// stream position is unspecified and the stream should be discarded.
pub fn decode_prefix<R: Read + ?Sized>(reader: &mut R) -> Result<SchemaId> {
    let mut magic = [0u8; 1];
    reader.read_exact(&mut magic)?;
    if magic[0] != MAGIC_BYTE {
        return Err(CoderError::MalformedPrefix { found: magic[0] });
    }

    let mut id = [0u8; 4];
    reader.read_exact(&mut id)?;
    Ok(SchemaId(i32::from_be_bytes(id)))
}

/// Split an in-memory message into its schema id and payload body
pub fn split_prefix(data: &[u8]) -> Result<(SchemaId, &[u8])> {
    if data.len() < PREFIX_LEN {
        return Err(CoderError::Truncated { len: data.len() });
    }
    if data[0] != MAGIC_BYTE {
        return Err(CoderError::MalformedPrefix { found: data[0] });
    }

    let id = i32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    Ok((SchemaId(id), &data[PREFIX_LEN..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_known_id() {
        assert_eq!(encode_prefix(SchemaId(42)), [0x00, 0x00, 0x00, 0x00, 0x2A]);
        assert_eq!(encode_prefix(SchemaId(-1)), [0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_boundary_ids() {
        for id in [i32::MIN, -1, 0, 1, 42, 0x0102_0304, i32::MAX] {
            let mut cursor = Cursor::new(encode_prefix(SchemaId(id)));
            assert_eq!(decode_prefix(&mut cursor).unwrap(), SchemaId(id));
        }
    }

    #[test]
    fn test_decode_consumes_exactly_prefix() {
        let mut cursor = Cursor::new(vec![0x00, 0x00, 0x00, 0x01, 0x00, 0xAB, 0xCD]);
        let id = decode_prefix(&mut cursor).unwrap();
        assert_eq!(id, SchemaId(256));
        assert_eq!(cursor.position(), PREFIX_LEN as u64);
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        for first in [0x01u8, 0x7F, 0xFF] {
            let mut cursor = Cursor::new(vec![first, 0x00, 0x00, 0x00, 0x05, 0x10]);
            match decode_prefix(&mut cursor) {
                Err(CoderError::MalformedPrefix { found }) => assert_eq!(found, first),
                other => panic!("Expected MalformedPrefix, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_short_stream() {
        let mut cursor = Cursor::new(vec![0x00, 0x00, 0x01]);
        match decode_prefix(&mut cursor) {
            Err(CoderError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_split_prefix() {
        let data = [0x00, 0x00, 0x00, 0x00, 0x2A, 0x02, 0x04];
        let (id, body) = split_prefix(&data).unwrap();
        assert_eq!(id, SchemaId(42));
        assert_eq!(body, &[0x02, 0x04]);

        assert!(matches!(split_prefix(&data[..3]), Err(CoderError::Truncated { len: 3 })));
        assert!(matches!(
            split_prefix(&[0x01, 0, 0, 0, 5]),
            Err(CoderError::MalformedPrefix { found: 0x01 })
        ));
    }

    #[test]
    fn test_write_prefix_appends() {
        let mut out = vec![0xEE];
        write_prefix(&mut out, SchemaId(7)).unwrap();
        assert_eq!(out, vec![0xEE, 0x00, 0x00, 0x00, 0x00, 0x07]);
    }
}
