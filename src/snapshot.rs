//! Persisted snapshot format.
//!
//! A snapshot is the complete durable image of one collection: name, metric,
//! dimension, and every document in insertion order. The container is
//! versioned and checksummed:
//!
//! ```text
//! magic "SGTA" | format_version u32 | name | metric u8 | dimension u64
//! | document_count u64 | records... | crc32 u32
//! ```
//!
//! All integers are little-endian. Strings are length-prefixed UTF-8. A
//! dimension of zero means the collection has not seen its first add yet.
//! The trailing CRC32 covers every preceding byte; a mismatch fails the load
//! with `CorruptSnapshot` instead of handing back silently misread state.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::document::{Document, Metadata};
use crate::error::{Result, SagittaError};
use crate::vector::DistanceMetric;
use crate::vector::codec;

/// File name of a collection's snapshot within its storage.
pub const SNAPSHOT_FILE: &str = "collection.sgta";

/// Current snapshot format version.
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: &[u8; 4] = b"SGTA";

/// The decoded content of a persisted snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Collection name.
    pub name: String,
    /// Distance metric the collection ranks by.
    pub metric: DistanceMetric,
    /// Fixed dimension, or `None` before the first add.
    pub dimension: Option<usize>,
    /// Documents in insertion order.
    pub documents: Vec<Document>,
}

/// Encode a snapshot into its binary container.
pub fn encode(snapshot: &Snapshot) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_all(MAGIC)?;
    buffer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    write_string(&mut buffer, &snapshot.name)?;
    buffer.write_u8(snapshot.metric.tag())?;
    buffer.write_u64::<LittleEndian>(snapshot.dimension.unwrap_or(0) as u64)?;
    buffer.write_u64::<LittleEndian>(snapshot.documents.len() as u64)?;

    for document in &snapshot.documents {
        write_string(&mut buffer, &document.id)?;
        write_string(&mut buffer, &document.text)?;
        codec::write_vector(&mut buffer, &document.vector)?;
        write_metadata(&mut buffer, &document.metadata)?;
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&buffer);
    buffer.write_u32::<LittleEndian>(hasher.finalize())?;

    Ok(buffer)
}

/// Decode a snapshot from its binary container.
///
/// Fails with [`SagittaError::UnsupportedVersion`] on a format version
/// mismatch and [`SagittaError::CorruptSnapshot`] on checksum or structural
/// damage.
pub fn decode(bytes: &[u8]) -> Result<Snapshot> {
    decode_inner(bytes).map_err(|e| match e {
        SagittaError::Io(io) => {
            SagittaError::corrupt_snapshot(format!("truncated snapshot: {io}"))
        }
        other => other,
    })
}

fn decode_inner(bytes: &[u8]) -> Result<Snapshot> {
    // Magic and version come first so an incompatible container is reported
    // as such even when its checksum layout differs.
    if bytes.len() < MAGIC.len() + 4 {
        return Err(SagittaError::corrupt_snapshot("snapshot too short"));
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(SagittaError::corrupt_snapshot("bad magic bytes"));
    }
    let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
    if version != FORMAT_VERSION {
        return Err(SagittaError::UnsupportedVersion(version));
    }

    if bytes.len() < 12 {
        return Err(SagittaError::corrupt_snapshot("snapshot too short"));
    }
    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 4);
    let stored_checksum = u32::from_le_bytes(checksum_bytes.try_into().unwrap());
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    if hasher.finalize() != stored_checksum {
        return Err(SagittaError::corrupt_snapshot("checksum mismatch"));
    }

    let mut cursor = Cursor::new(&payload[8..]);

    let name = read_string(&mut cursor)?;
    let metric = DistanceMetric::from_tag(cursor.read_u8()?)?;
    let dimension = match cursor.read_u64::<LittleEndian>()? as usize {
        0 => None,
        d => Some(d),
    };
    let count = cursor.read_u64::<LittleEndian>()? as usize;

    if dimension.is_none() && count > 0 {
        return Err(SagittaError::corrupt_snapshot(
            "snapshot has documents but no dimension",
        ));
    }

    let mut documents = Vec::with_capacity(count);
    for _ in 0..count {
        let id = read_string(&mut cursor)?;
        let text = read_string(&mut cursor)?;
        let vector = codec::read_vector(&mut cursor, dimension)?;
        let metadata = read_metadata(&mut cursor)?;
        documents.push(Document {
            id,
            text,
            vector,
            metadata,
        });
    }

    if cursor.position() != (payload.len() - 8) as u64 {
        return Err(SagittaError::corrupt_snapshot(
            "trailing bytes after last document record",
        ));
    }

    Ok(Snapshot {
        name,
        metric,
        dimension,
        documents,
    })
}

/// Write a UTF-8 string prefixed by its length as u32 little-endian.
fn write_string<W: Write>(output: &mut W, value: &str) -> Result<()> {
    let bytes = value.as_bytes();
    output.write_u32::<LittleEndian>(bytes.len() as u32)?;
    output.write_all(bytes)?;
    Ok(())
}

/// Read a length-prefixed UTF-8 string written with [`write_string`].
fn read_string<R: Read>(input: &mut R) -> Result<String> {
    let len = input.read_u32::<LittleEndian>()? as usize;
    let mut buffer = vec![0u8; len];
    input.read_exact(&mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| SagittaError::corrupt_snapshot(format!("invalid UTF-8 in snapshot: {e}")))
}

// Metadata is stored as a length-prefixed JSON object. The untagged
// MetadataValue representation needs a self-describing format, and JSON keeps
// the records inspectable with standard tools.
fn write_metadata<W: Write>(output: &mut W, metadata: &Metadata) -> Result<()> {
    let bytes = serde_json::to_vec(metadata)
        .map_err(|e| SagittaError::serialization(format!("failed to encode metadata: {e}")))?;
    output.write_u32::<LittleEndian>(bytes.len() as u32)?;
    output.write_all(&bytes)?;
    Ok(())
}

fn read_metadata<R: Read>(input: &mut R) -> Result<Metadata> {
    let len = input.read_u32::<LittleEndian>()? as usize;
    let mut buffer = vec![0u8; len];
    input.read_exact(&mut buffer)?;
    serde_json::from_slice(&buffer)
        .map_err(|e| SagittaError::corrupt_snapshot(format!("failed to decode metadata: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MetadataValue;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            name: "notes".to_string(),
            metric: DistanceMetric::Cosine,
            dimension: Some(2),
            documents: vec![
                Document {
                    id: "a".to_string(),
                    text: "first".to_string(),
                    vector: vec![1.0, 0.0],
                    metadata: [("source".to_string(), MetadataValue::Str("tweet".into()))]
                        .into_iter()
                        .collect(),
                },
                Document {
                    id: "b".to_string(),
                    text: "second".to_string(),
                    vector: vec![0.0, 1.0],
                    metadata: Metadata::new(),
                },
            ],
        }
    }

    #[test]
    fn test_round_trip() {
        let snapshot = sample_snapshot();
        let bytes = encode(&snapshot).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_empty_collection_round_trip() {
        let snapshot = Snapshot {
            name: "empty".to_string(),
            metric: DistanceMetric::Euclidean,
            dimension: None,
            documents: Vec::new(),
        };
        let decoded = decode(&encode(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_checksum_mismatch_is_corrupt() {
        let mut bytes = encode(&sample_snapshot()).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;

        assert!(matches!(
            decode(&bytes),
            Err(SagittaError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_version_mismatch_is_unsupported() {
        let mut bytes = encode(&sample_snapshot()).unwrap();
        // Bump the format version in place; the checksum no longer matters
        // because the version is checked first.
        bytes[4..8].copy_from_slice(&99u32.to_le_bytes());

        assert!(matches!(
            decode(&bytes),
            Err(SagittaError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut bytes = encode(&sample_snapshot()).unwrap();
        bytes[0] = b'X';

        assert!(matches!(
            decode(&bytes),
            Err(SagittaError::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_truncated_snapshot_is_corrupt() {
        let bytes = encode(&sample_snapshot()).unwrap();

        assert!(matches!(
            decode(&bytes[..10]),
            Err(SagittaError::CorruptSnapshot(_))
        ));
    }
}
