//! Record stream framing.
//!
//! Parses the flat frame sequence into raw records and writes frames back
//! out. Each parsed record retains its original frame bytes so the writer
//! can re-emit untouched records verbatim.

use bytes::Bytes;
use prost::Message;

use crate::container::records::RecordInfo;
use crate::container::varint;
use crate::container::{Error, Result};

/// A single framed record, with the original bytes retained.
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Decoded frame header
    pub info: RecordInfo,
    /// Record payload (protobuf-encoded, zero-copy slice of the input)
    pub payload: Bytes,
    /// The complete original frame: length varint, header, and payload
    pub frame: Bytes,
}

/// Parse a complete record stream into raw records.
///
/// O(n) over the input; payload and frame buffers are zero-copy slices of
/// the input allocation.
pub fn parse_stream(data: Bytes) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let frame_start = pos;

        let (header_len, varint_len) = varint::decode(&data[pos..]).ok_or_else(|| {
            Error::InvalidStream(format!("truncated frame length at offset {pos}"))
        })?;
        pos += varint_len;

        // Checked arithmetic: corrupt streams can carry lengths near
        // u64::MAX, which must surface as a format error, not overflow
        let header_end = usize::try_from(header_len)
            .ok()
            .and_then(|len| pos.checked_add(len))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::InvalidStream(format!(
                    "frame header at offset {frame_start} overruns input"
                ))
            })?;

        let info = RecordInfo::decode(&data[pos..header_end])?;
        pos = header_end;

        let payload_end = usize::try_from(info.length)
            .ok()
            .and_then(|len| pos.checked_add(len))
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::InvalidStream(format!(
                    "record '{}' payload overruns input",
                    info.identifier
                ))
            })?;

        let payload = data.slice(pos..payload_end);
        pos = payload_end;

        records.push(RawRecord {
            info,
            payload,
            frame: data.slice(frame_start..pos),
        });
    }

    Ok(records)
}

/// Write a single frame: length varint, header, payload.
///
/// The header's `length` field is rewritten to match `payload`, so callers
/// re-encoding a mutated record do not need to fix it up themselves.
pub fn write_frame(info: &RecordInfo, payload: &[u8], out: &mut Vec<u8>) {
    let info = RecordInfo {
        identifier: info.identifier.clone(),
        kind: info.kind,
        length: payload.len() as u64,
    };

    let header = info.encode_to_vec();
    varint::encode(header.len() as u64, out);
    out.extend_from_slice(&header);
    out.extend_from_slice(payload);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::records::RecordKind;

    fn frame(identifier: &str, kind: RecordKind, payload: &[u8]) -> Vec<u8> {
        let info = RecordInfo {
            identifier: identifier.to_string(),
            kind: kind.into(),
            length: 0,
        };
        let mut out = Vec::new();
        write_frame(&info, payload, &mut out);
        out
    }

    #[test]
    fn test_stream_round_trip() {
        let mut data = Vec::new();
        data.extend(frame("root", RecordKind::Presentation, b"\x0a\x04root"));
        data.extend(frame("c-1", RecordKind::Cue, b""));

        let records = parse_stream(Bytes::from(data.clone())).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].info.identifier, "root");
        assert_eq!(
            RecordKind::from(records[0].info.kind),
            RecordKind::Presentation
        );
        assert_eq!(records[0].payload.as_ref(), b"\x0a\x04root");
        assert_eq!(records[1].payload.len(), 0);

        // Concatenated original frames reproduce the stream exactly
        let rebuilt: Vec<u8> = records
            .iter()
            .flat_map(|r| r.frame.iter().copied())
            .collect();
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut data = frame("x", RecordKind::Cue, b"abcdef");
        data.truncate(data.len() - 2);
        assert!(matches!(
            parse_stream(Bytes::from(data)),
            Err(Error::InvalidStream(_))
        ));
    }

    #[test]
    fn test_huge_header_length_rejected() {
        let mut data = Vec::new();
        varint::encode(u64::MAX, &mut data);
        assert!(matches!(
            parse_stream(Bytes::from(data)),
            Err(Error::InvalidStream(_))
        ));
    }

    #[test]
    fn test_huge_payload_length_rejected() {
        let info = RecordInfo {
            identifier: "x".to_string(),
            kind: RecordKind::Cue.into(),
            length: u64::MAX,
        };
        let header = info.encode_to_vec();
        let mut data = Vec::new();
        varint::encode(header.len() as u64, &mut data);
        data.extend_from_slice(&header);
        assert!(matches!(
            parse_stream(Bytes::from(data)),
            Err(Error::InvalidStream(_))
        ));
    }

    #[test]
    fn test_garbage_header_rejected() {
        // Valid varint length, but header bytes are not a RecordInfo message
        let data = vec![0x02, 0xFF, 0xFF];
        assert!(parse_stream(Bytes::from(data)).is_err());
    }
}
