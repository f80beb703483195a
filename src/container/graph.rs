//! In-memory presentation graph.
//!
//! [`PresentationFile`] decodes the record stream into typed records, builds
//! identifier lookup maps once per load, and tracks which records have been
//! mutated. Saving re-emits untouched records from their original frame
//! bytes, so data the editor never inspected cannot be corrupted by a
//! round trip.

use std::collections::HashMap;

use bytes::Bytes;
use prost::Message;
use tracing::warn;

use crate::container::records::{
    ArrangementRecord, CueGroupRecord, CueRecord, PresentationRecord, RecordKind,
};
use crate::container::stream::{self, RawRecord};
use crate::container::{Error, Result};

/// A decoded record, or an opaque placeholder for unknown kinds.
#[derive(Debug, Clone)]
pub enum Record {
    Presentation(PresentationRecord),
    Arrangement(ArrangementRecord),
    CueGroup(CueGroupRecord),
    Cue(CueRecord),
    /// Unknown record kind; only the raw frame is kept and written back.
    Opaque,
}

#[derive(Debug)]
struct StoredRecord {
    raw: RawRecord,
    record: Record,
    dirty: bool,
}

/// A loaded presentation container.
#[derive(Debug)]
pub struct PresentationFile {
    records: Vec<StoredRecord>,
    /// Index of the root record in `records`
    root: usize,
    /// Identifier → index into `records`, built once per load
    index: HashMap<String, usize>,
}

impl PresentationFile {
    /// Decode a record stream into the typed graph.
    ///
    /// Fails if the stream framing is invalid, a known-kind record payload
    /// does not decode, or the stream does not contain exactly one
    /// presentation root record.
    pub fn load(data: impl Into<Bytes>) -> Result<Self> {
        let raw_records = stream::parse_stream(data.into())?;

        let mut records = Vec::with_capacity(raw_records.len());
        let mut index = HashMap::with_capacity(raw_records.len());
        let mut root = None;

        for raw in raw_records {
            let record = match RecordKind::from(raw.info.kind) {
                RecordKind::Presentation => {
                    let decoded = PresentationRecord::decode(raw.payload.as_ref())?;
                    if root.replace(records.len()).is_some() {
                        return Err(Error::DuplicateRoot);
                    }
                    Record::Presentation(decoded)
                },
                RecordKind::Arrangement => {
                    Record::Arrangement(ArrangementRecord::decode(raw.payload.as_ref())?)
                },
                RecordKind::CueGroup => {
                    Record::CueGroup(CueGroupRecord::decode(raw.payload.as_ref())?)
                },
                RecordKind::Cue => Record::Cue(CueRecord::decode(raw.payload.as_ref())?),
                RecordKind::Unknown(kind) => {
                    warn!(kind, identifier = %raw.info.identifier, "preserving unknown record kind");
                    Record::Opaque
                },
            };

            if index
                .insert(raw.info.identifier.clone(), records.len())
                .is_some()
            {
                warn!(identifier = %raw.info.identifier, "duplicate record identifier, later record wins");
            }

            records.push(StoredRecord {
                raw,
                record,
                dirty: false,
            });
        }

        let root = root.ok_or(Error::MissingRoot)?;
        Ok(Self {
            records,
            root,
            index,
        })
    }

    /// Re-encode the graph to bytes.
    ///
    /// Untouched records are copied from their original frames bit-for-bit;
    /// mutated records are re-encoded and re-framed.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        for stored in &self.records {
            if !stored.dirty {
                out.extend_from_slice(&stored.raw.frame);
                continue;
            }

            let payload = match &stored.record {
                Record::Presentation(r) => r.encode_to_vec(),
                Record::Arrangement(r) => r.encode_to_vec(),
                Record::CueGroup(r) => r.encode_to_vec(),
                Record::Cue(r) => r.encode_to_vec(),
                Record::Opaque => {
                    return Err(Error::InvalidStream(format!(
                        "opaque record '{}' marked dirty",
                        stored.raw.info.identifier
                    )));
                },
            };
            stream::write_frame(&stored.raw.info, &payload, &mut out);
        }

        Ok(out)
    }

    /// The presentation root record.
    pub fn root(&self) -> &PresentationRecord {
        match &self.records[self.root].record {
            Record::Presentation(r) => r,
            // load() guarantees the root index points at a presentation
            _ => unreachable!("root index does not point at a presentation record"),
        }
    }

    /// The first resolvable arrangement, if any.
    ///
    /// Prefers the root's arrangement identifier list; when that list is
    /// empty, falls back to the first arrangement record in stream order.
    pub fn arrangement(&self) -> Option<&ArrangementRecord> {
        for id in &self.root().arrangement_ids {
            match self.resolve(id) {
                Some(Record::Arrangement(r)) => return Some(r),
                _ => {
                    warn!(identifier = %id, "arrangement reference does not resolve");
                },
            }
        }

        self.records.iter().find_map(|stored| match &stored.record {
            Record::Arrangement(r) => Some(r),
            _ => None,
        })
    }

    /// Resolve an identifier to its record.
    pub fn resolve(&self, identifier: &str) -> Option<&Record> {
        self.index
            .get(identifier)
            .map(|&idx| &self.records[idx].record)
    }

    /// Resolve an identifier to a cue group.
    pub fn cue_group(&self, identifier: &str) -> Option<&CueGroupRecord> {
        match self.resolve(identifier) {
            Some(Record::CueGroup(r)) => Some(r),
            _ => None,
        }
    }

    /// Resolve an identifier to a cue.
    pub fn cue(&self, identifier: &str) -> Option<&CueRecord> {
        match self.resolve(identifier) {
            Some(Record::Cue(r)) => Some(r),
            _ => None,
        }
    }

    /// Resolve an identifier to a cue for mutation, marking the record
    /// dirty so save() re-encodes it.
    pub fn cue_mut(&mut self, identifier: &str) -> Option<&mut CueRecord> {
        let &idx = self.index.get(identifier)?;
        let stored = &mut self.records[idx];
        match &mut stored.record {
            Record::Cue(r) => {
                stored.dirty = true;
                Some(r)
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::records::{
        ActionRecord, Element, ElementFlags, RecordInfo, Slide, SlideAction, action_record,
    };

    fn push_frame(out: &mut Vec<u8>, identifier: &str, kind: RecordKind, payload: &[u8]) {
        let info = RecordInfo {
            identifier: identifier.to_string(),
            kind: kind.into(),
            length: 0,
        };
        stream::write_frame(&info, payload, out);
    }

    fn text_cue(uuid: &str, name: &str, rtf_data: &[u8]) -> CueRecord {
        CueRecord {
            uuid: uuid.to_string(),
            name: name.to_string(),
            actions: vec![ActionRecord {
                uuid: format!("{uuid}-a0"),
                kind: Some(action_record::Kind::Slide(SlideAction {
                    slide: Some(Slide {
                        elements: vec![Element {
                            flags: ElementFlags::TEXT.bits(),
                            name: String::new(),
                            rtf_data: rtf_data.to_vec(),
                        }],
                    }),
                })),
            }],
        }
    }

    /// Build a minimal two-cue container with one arrangement.
    fn sample_stream() -> Vec<u8> {
        let root = PresentationRecord {
            uuid: "p-0".to_string(),
            name: "Sample".to_string(),
            arrangement_ids: vec!["arr-0".to_string()],
            cue_group_ids: vec!["g-0".to_string()],
            cue_ids: vec!["c-0".to_string(), "c-1".to_string()],
        };
        let arrangement = ArrangementRecord {
            uuid: "arr-0".to_string(),
            name: "Default".to_string(),
            group_ids: vec!["g-0".to_string()],
        };
        let group = CueGroupRecord {
            uuid: "g-0".to_string(),
            name: "Verse 1".to_string(),
            cue_ids: vec!["c-0".to_string(), "c-1".to_string()],
        };

        let mut out = Vec::new();
        push_frame(
            &mut out,
            "p-0",
            RecordKind::Presentation,
            &root.encode_to_vec(),
        );
        push_frame(
            &mut out,
            "arr-0",
            RecordKind::Arrangement,
            &arrangement.encode_to_vec(),
        );
        push_frame(&mut out, "g-0", RecordKind::CueGroup, &group.encode_to_vec());
        push_frame(
            &mut out,
            "c-0",
            RecordKind::Cue,
            &text_cue("c-0", "Slide 1", b"Amazing grace").encode_to_vec(),
        );
        push_frame(
            &mut out,
            "c-1",
            RecordKind::Cue,
            &text_cue("c-1", "Slide 2", b"how sweet the sound").encode_to_vec(),
        );
        // An unknown record kind that must survive the round trip
        push_frame(&mut out, "x-0", RecordKind::Unknown(42), b"\x01\x02\x03");
        out
    }

    #[test]
    fn test_load_resolves_graph() {
        let file = PresentationFile::load(sample_stream()).unwrap();
        assert_eq!(file.root().name, "Sample");
        assert_eq!(file.arrangement().unwrap().group_ids, vec!["g-0"]);
        assert_eq!(file.cue_group("g-0").unwrap().cue_ids.len(), 2);
        assert_eq!(file.cue("c-1").unwrap().name, "Slide 2");
        assert!(file.cue("nope").is_none());
        assert!(file.cue_group("c-0").is_none(), "kind mismatch must not resolve");
    }

    #[test]
    fn test_untouched_save_is_byte_identical() {
        let data = sample_stream();
        let file = PresentationFile::load(data.clone()).unwrap();
        assert_eq!(file.save().unwrap(), data);
    }

    #[test]
    fn test_mutated_cue_is_reencoded_others_preserved() {
        let data = sample_stream();
        let mut file = PresentationFile::load(data.clone()).unwrap();

        {
            let cue = file.cue_mut("c-0").unwrap();
            cue.name = "Renamed".to_string();
        }
        let saved = file.save().unwrap();
        assert_ne!(saved, data);

        let reloaded = PresentationFile::load(saved).unwrap();
        assert_eq!(reloaded.cue("c-0").unwrap().name, "Renamed");
        // Everything else unchanged
        assert_eq!(reloaded.cue("c-1").unwrap().name, "Slide 2");
        assert_eq!(reloaded.root().name, "Sample");
    }

    #[test]
    fn test_missing_root_rejected() {
        let mut out = Vec::new();
        push_frame(
            &mut out,
            "c-0",
            RecordKind::Cue,
            &text_cue("c-0", "Slide", b"").encode_to_vec(),
        );
        assert!(matches!(
            PresentationFile::load(out),
            Err(Error::MissingRoot)
        ));
    }

    #[test]
    fn test_duplicate_root_rejected() {
        let root = PresentationRecord::default();
        let mut out = Vec::new();
        push_frame(
            &mut out,
            "p-0",
            RecordKind::Presentation,
            &root.encode_to_vec(),
        );
        push_frame(
            &mut out,
            "p-1",
            RecordKind::Presentation,
            &root.encode_to_vec(),
        );
        assert!(matches!(
            PresentationFile::load(out),
            Err(Error::DuplicateRoot)
        ));
    }

    #[test]
    fn test_dangling_arrangement_reference_falls_back() {
        let root = PresentationRecord {
            uuid: "p-0".to_string(),
            arrangement_ids: vec!["gone".to_string()],
            ..Default::default()
        };
        let arrangement = ArrangementRecord {
            uuid: "arr-9".to_string(),
            ..Default::default()
        };
        let mut out = Vec::new();
        push_frame(
            &mut out,
            "p-0",
            RecordKind::Presentation,
            &root.encode_to_vec(),
        );
        push_frame(
            &mut out,
            "arr-9",
            RecordKind::Arrangement,
            &arrangement.encode_to_vec(),
        );

        let file = PresentationFile::load(out).unwrap();
        assert_eq!(file.arrangement().unwrap().uuid, "arr-9");
    }
}
