//! Typed record messages for the container graph.
//!
//! The wire layout of every message is owned by prost; this module only
//! declares the schema. The engine targets a single schema version and
//! fails explicitly on streams that do not match it.

use bitflags::bitflags;

/// Record kinds carried in frame headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Presentation,
    Arrangement,
    CueGroup,
    Cue,
    /// A kind this schema version does not know; preserved verbatim.
    Unknown(u32),
}

impl From<u32> for RecordKind {
    fn from(value: u32) -> Self {
        match value {
            1 => RecordKind::Presentation,
            2 => RecordKind::Arrangement,
            3 => RecordKind::CueGroup,
            4 => RecordKind::Cue,
            other => RecordKind::Unknown(other),
        }
    }
}

impl From<RecordKind> for u32 {
    fn from(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Presentation => 1,
            RecordKind::Arrangement => 2,
            RecordKind::CueGroup => 3,
            RecordKind::Cue => 4,
            RecordKind::Unknown(other) => other,
        }
    }
}

/// Frame header preceding every record payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RecordInfo {
    /// Unique identifier for this record across the document
    #[prost(string, tag = "1")]
    pub identifier: String,
    /// Record kind (see [`RecordKind`])
    #[prost(uint32, tag = "2")]
    pub kind: u32,
    /// Length of the record payload in bytes
    #[prost(uint64, tag = "3")]
    pub length: u64,
}

/// Root record: owns the ordered identifier lists for the whole graph.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PresentationRecord {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub name: String,
    /// Arrangement identifiers; at most the first resolvable one is consulted
    #[prost(string, repeated, tag = "3")]
    pub arrangement_ids: Vec<String>,
    /// Cue group identifiers in declaration order
    #[prost(string, repeated, tag = "4")]
    pub cue_group_ids: Vec<String>,
    /// Cue identifiers in declaration order
    #[prost(string, repeated, tag = "5")]
    pub cue_ids: Vec<String>,
}

/// An ordered sequence of cue group references defining presentation order.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ArrangementRecord {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, repeated, tag = "3")]
    pub group_ids: Vec<String>,
}

/// A named group containing an ordered sequence of cue references.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CueGroupRecord {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, repeated, tag = "3")]
    pub cue_ids: Vec<String>,
}

/// A cue holding an ordered sequence of actions. The name is used only for
/// diagnostics.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CueRecord {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, repeated, tag = "3")]
    pub actions: Vec<ActionRecord>,
}

/// Tagged union over action payloads. Only the slide variant is ever
/// inspected; the others round-trip through unmodified.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActionRecord {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(oneof = "action_record::Kind", tags = "10, 11, 12")]
    pub kind: Option<action_record::Kind>,
}

pub mod action_record {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Kind {
        /// A slide-bearing action
        #[prost(message, tag = "10")]
        Slide(super::SlideAction),
        /// Media playback action
        #[prost(message, tag = "11")]
        Media(super::MediaAction),
        /// Layer clear action
        #[prost(message, tag = "12")]
        Clear(super::ClearAction),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SlideAction {
    #[prost(message, optional, tag = "1")]
    pub slide: Option<Slide>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MediaAction {
    #[prost(string, tag = "1")]
    pub path: String,
    #[prost(bool, tag = "2")]
    pub looping: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClearAction {
    #[prost(uint32, tag = "1")]
    pub layer: u32,
}

/// An ordered sequence of elements.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Slide {
    #[prost(message, repeated, tag = "1")]
    pub elements: Vec<Element>,
}

/// A slide element carrying capability flags and, for text elements, a
/// rich-text byte payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Element {
    #[prost(uint32, tag = "1")]
    pub flags: u32,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(bytes = "vec", tag = "3")]
    pub rtf_data: Vec<u8>,
}

bitflags! {
    /// Capability tags on a slide element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ElementFlags: u32 {
        const TEXT = 1;
        const MEDIA = 1 << 1;
        const SHAPE = 1 << 2;
        const GROUP = 1 << 3;
    }
}

/// Element capability as an exhaustiveness-checkable enum.
///
/// Text wins over the other capabilities when several flags are set, since
/// the text bit is what gates payload ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Media,
    Shape,
    Group,
    Other,
}

impl Element {
    /// Capability flags, with unknown bits dropped.
    #[inline]
    pub fn flags(&self) -> ElementFlags {
        ElementFlags::from_bits_truncate(self.flags)
    }

    /// Classify this element by its capability flags.
    pub fn kind(&self) -> ElementKind {
        let flags = self.flags();
        if flags.contains(ElementFlags::TEXT) {
            ElementKind::Text
        } else if flags.contains(ElementFlags::MEDIA) {
            ElementKind::Media
        } else if flags.contains(ElementFlags::SHAPE) {
            ElementKind::Shape
        } else if flags.contains(ElementFlags::GROUP) {
            ElementKind::Group
        } else {
            ElementKind::Other
        }
    }

    /// Whether this element carries a text payload worth decoding.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind() == ElementKind::Text && !self.rtf_data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_record_kind_round_trip() {
        for kind in [
            RecordKind::Presentation,
            RecordKind::Arrangement,
            RecordKind::CueGroup,
            RecordKind::Cue,
            RecordKind::Unknown(99),
        ] {
            assert_eq!(RecordKind::from(u32::from(kind)), kind);
        }
    }

    #[test]
    fn test_element_classification() {
        let text = Element {
            flags: ElementFlags::TEXT.bits(),
            name: "lyrics".to_string(),
            rtf_data: b"x".to_vec(),
        };
        assert_eq!(text.kind(), ElementKind::Text);
        assert!(text.is_text());

        // Text bit set but no payload: not a usable text element
        let empty = Element {
            flags: ElementFlags::TEXT.bits(),
            ..Default::default()
        };
        assert!(!empty.is_text());

        let shape = Element {
            flags: ElementFlags::SHAPE.bits(),
            rtf_data: b"x".to_vec(),
            ..Default::default()
        };
        assert_eq!(shape.kind(), ElementKind::Shape);
        assert!(!shape.is_text());
    }

    #[test]
    fn test_action_oneof_encoding() {
        let action = ActionRecord {
            uuid: "a1".to_string(),
            kind: Some(action_record::Kind::Slide(SlideAction {
                slide: Some(Slide {
                    elements: vec![Element {
                        flags: ElementFlags::TEXT.bits(),
                        name: String::new(),
                        rtf_data: b"payload".to_vec(),
                    }],
                }),
            })),
        };

        let bytes = action.encode_to_vec();
        let decoded = ActionRecord::decode(&bytes[..]).unwrap();
        assert_eq!(decoded, action);
    }
}
