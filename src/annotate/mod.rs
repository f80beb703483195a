//! Slide traversal and chord annotation.
//!
//! Walks the presentation graph in arrangement order, extracts slide text
//! through the rich-text codec, matches slides to caller-supplied ChordPro
//! text by content-based ordinal, and rewrites slide payloads.
//!
//! Only slides whose extracted text is non-empty after trimming consume an
//! ordinal; slides without text keep their structural position but are
//! never addressable by the chord map and are preserved byte-for-byte.
//!
//! Unresolved references and per-slide failures never abort a run: they
//! are logged and accumulated as [`Warning`]s on the report.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chord::{self, Transposer};
use crate::common::{Error, Result};
use crate::container::records::action_record::Kind;
use crate::container::{CueRecord, Element, PresentationFile};
use crate::rtf;

/// Mapping from stringified non-negative slide ordinal to ChordPro text.
///
/// Ordinal `N` addresses the N-th text-bearing slide (0-based) in
/// arrangement-resolved traversal order. Absent or empty entries leave the
/// slide unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChordMap(HashMap<String, String>);

impl ChordMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of the form `{"0": "[C]Amazing...", ...}`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, ordinal: usize, chordpro: impl Into<String>) {
        self.0.insert(ordinal.to_string(), chordpro.into());
    }

    /// ChordPro text for an ordinal. Empty entries count as absent.
    pub fn get(&self, ordinal: usize) -> Option<&str> {
        self.0
            .get(&ordinal.to_string())
            .map(String::as_str)
            .filter(|text| !text.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Non-fatal condition accumulated during a traversal run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An arrangement entry did not resolve to a cue group
    UnresolvedGroup { identifier: String },
    /// A cue group entry did not resolve to a cue
    UnresolvedCue { identifier: String },
    /// Rewriting one slide failed; the slide was left unmodified
    AnnotationFailed {
        ordinal: usize,
        cue: String,
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedGroup { identifier } => {
                write!(f, "unresolved cue group '{identifier}', skipped")
            },
            Warning::UnresolvedCue { identifier } => {
                write!(f, "unresolved cue '{identifier}', placeholder slide recorded")
            },
            Warning::AnnotationFailed { ordinal, cue, reason } => {
                write!(f, "annotation of slide {ordinal} (cue '{cue}') failed: {reason}")
            },
        }
    }
}

/// Outcome of an annotation or transposition run.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotationReport {
    /// Slides whose payload was rewritten
    pub slides_annotated: usize,
    /// Slides that consumed an ordinal (non-empty text after trimming)
    pub slides_with_text: usize,
    /// Accumulated non-fatal conditions
    pub warnings: Vec<Warning>,
}

/// Text extracted for one slide position.
#[derive(Debug, Clone, Serialize)]
pub struct SlideText {
    /// Content-based ordinal; `None` for slides without text
    pub ordinal: Option<usize>,
    pub text: String,
    /// Diagnostic name of the owning cue
    pub cue: String,
}

/// Annotate slides with chords from `chords`, in arrangement order.
///
/// Requires at least one arrangement. Returns the report; the mutated file
/// is saved separately by the caller.
pub fn annotate(file: &mut PresentationFile, chords: &ChordMap) -> Result<AnnotationReport> {
    run_edit(file, |ordinal, cue_name, element, warnings| {
        let chordpro = chords.get(ordinal)?;
        match rtf::embed_chords(&element.rtf_data, chordpro) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(ordinal, cue = %cue_name, %err, "slide annotation failed, leaving slide unmodified");
                warnings.push(Warning::AnnotationFailed {
                    ordinal,
                    cue: cue_name.to_string(),
                    reason: err.to_string(),
                });
                None
            },
        }
    })
}

/// Transpose every chord already embedded in the presentation's slides.
///
/// The spelling preference follows the detected key of the whole song,
/// transposed by the same interval.
pub fn transpose_slides(file: &mut PresentationFile, steps: i32) -> Result<AnnotationReport> {
    let combined: String = slide_texts(file)
        .0
        .iter()
        .map(|slide| slide.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let transposer = match chord::detect_key(&combined) {
        Some(key) => Transposer::with_key(Transposer::new().transpose_chord(&key, steps)),
        None => Transposer::new(),
    };

    run_edit(file, |ordinal, cue_name, element, warnings| {
        let rich = rtf::decode_payload(&element.rtf_data)?;
        if chord::bracket_spans(&rich.text).is_empty() {
            return None;
        }
        let transposed = transposer.transpose_text(&rich.text, steps);
        match rtf::embed_chords(&element.rtf_data, &transposed) {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!(ordinal, cue = %cue_name, %err, "slide transposition failed, leaving slide unmodified");
                warnings.push(Warning::AnnotationFailed {
                    ordinal,
                    cue: cue_name.to_string(),
                    reason: err.to_string(),
                });
                None
            },
        }
    })
}

/// Annotate the first text-bearing slide of one specific cue.
///
/// Unlike the traversal flows, asking for a cue that has no text element is
/// an error here, because the caller named the target explicitly.
pub fn annotate_cue(
    file: &mut PresentationFile,
    cue_id: &str,
    chordpro: &str,
) -> Result<()> {
    let cue = file
        .cue(cue_id)
        .ok_or_else(|| Error::Format(format!("cue '{cue_id}' not found")))?;
    let cue_name = cue.name.clone();

    let Some((action_idx, element_idx, payload)) = first_text_payload(cue) else {
        return Err(Error::MissingTextElement(cue_name));
    };

    let rewritten = rtf::embed_chords(&payload, chordpro)?;
    apply_edit(file, cue_id, action_idx, element_idx, rewritten);
    Ok(())
}

/// Extract slide texts in traversal order.
///
/// Uses the arrangement when present; otherwise falls back to raw cue
/// declaration order, so read-only analysis works on arrangement-less
/// files. Unresolved cues yield empty placeholder entries to preserve
/// positional expectations of consumers relying on total slide count.
pub fn slide_texts(file: &PresentationFile) -> (Vec<SlideText>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let cue_ids = match file.arrangement() {
        Some(_) => arranged_cue_ids(file, &mut warnings),
        None => file.root().cue_ids.clone(),
    };

    let mut slides = Vec::new();
    let mut ordinal = 0usize;

    for cue_id in cue_ids {
        let Some(cue) = file.cue(&cue_id) else {
            warn!(identifier = %cue_id, "unresolved cue, recording placeholder slide");
            warnings.push(Warning::UnresolvedCue {
                identifier: cue_id.clone(),
            });
            slides.push(SlideText {
                ordinal: None,
                text: String::new(),
                cue: cue_id,
            });
            continue;
        };

        for action in &cue.actions {
            let Some(Kind::Slide(slide_action)) = &action.kind else {
                continue;
            };
            let Some(slide) = &slide_action.slide else {
                continue;
            };

            let text = slide
                .elements
                .iter()
                .find(|element| element.is_text())
                .and_then(|element| rtf::decode_payload(&element.rtf_data))
                .map(|rich| rich.text.trim().to_string())
                .unwrap_or_default();

            let slide_ordinal = if text.is_empty() {
                None
            } else {
                let n = ordinal;
                ordinal += 1;
                Some(n)
            };

            slides.push(SlideText {
                ordinal: slide_ordinal,
                text,
                cue: cue.name.clone(),
            });
        }
    }

    (slides, warnings)
}

/// Resolve the arrangement's group references into a flat cue id list,
/// skipping unresolved groups with a warning.
fn arranged_cue_ids(file: &PresentationFile, warnings: &mut Vec<Warning>) -> Vec<String> {
    let mut cue_ids = Vec::new();

    let group_ids = match file.arrangement() {
        Some(arrangement) => arrangement.group_ids.clone(),
        None => return cue_ids,
    };

    for group_id in group_ids {
        match file.cue_group(&group_id) {
            Some(group) => cue_ids.extend(group.cue_ids.iter().cloned()),
            None => {
                warn!(identifier = %group_id, "unresolved cue group, skipping");
                warnings.push(Warning::UnresolvedGroup {
                    identifier: group_id,
                });
            },
        }
    }

    cue_ids
}

/// Shared edit traversal: walk text slides in arrangement order, let `edit`
/// decide per slide whether to produce a replacement payload.
///
/// `edit` receives the slide's ordinal, owning cue name, and text element;
/// returning `None` leaves the slide untouched.
fn run_edit<F>(file: &mut PresentationFile, mut edit: F) -> Result<AnnotationReport>
where
    F: FnMut(usize, &str, &Element, &mut Vec<Warning>) -> Option<Vec<u8>>,
{
    if file.arrangement().is_none() {
        return Err(Error::MissingArrangement);
    }

    let mut warnings = Vec::new();
    let cue_ids = arranged_cue_ids(file, &mut warnings);

    let mut ordinal = 0usize;
    let mut annotated = 0usize;

    for cue_id in cue_ids {
        let Some(cue) = file.cue(&cue_id) else {
            warn!(identifier = %cue_id, "unresolved cue, skipping");
            warnings.push(Warning::UnresolvedCue {
                identifier: cue_id.clone(),
            });
            continue;
        };
        let cue_name = cue.name.clone();

        // Read pass first; mutations are applied per cue afterwards so
        // untouched cues never get marked dirty.
        let mut edits: Vec<(usize, usize, Vec<u8>)> = Vec::new();
        for (action_idx, action) in cue.actions.iter().enumerate() {
            let Some(Kind::Slide(slide_action)) = &action.kind else {
                continue;
            };
            let Some(slide) = &slide_action.slide else {
                continue;
            };
            let Some((element_idx, element)) = slide
                .elements
                .iter()
                .enumerate()
                .find(|(_, element)| element.is_text())
            else {
                continue;
            };
            let Some(rich) = rtf::decode_payload(&element.rtf_data) else {
                continue;
            };
            if rich.text.trim().is_empty() {
                continue;
            }

            let n = ordinal;
            ordinal += 1;

            if let Some(payload) = edit(n, &cue_name, element, &mut warnings) {
                edits.push((action_idx, element_idx, payload));
            }
        }

        annotated += edits.len();
        for (action_idx, element_idx, payload) in edits {
            apply_edit(file, &cue_id, action_idx, element_idx, payload);
        }
    }

    Ok(AnnotationReport {
        slides_annotated: annotated,
        slides_with_text: ordinal,
        warnings,
    })
}

/// Write a replacement payload into a cue's element, marking the cue dirty.
fn apply_edit(
    file: &mut PresentationFile,
    cue_id: &str,
    action_idx: usize,
    element_idx: usize,
    payload: Vec<u8>,
) {
    let Some(cue) = file.cue_mut(cue_id) else {
        return;
    };
    if let Some(Kind::Slide(slide_action)) = cue
        .actions
        .get_mut(action_idx)
        .and_then(|action| action.kind.as_mut())
        && let Some(slide) = slide_action.slide.as_mut()
        && let Some(element) = slide.elements.get_mut(element_idx)
    {
        element.rtf_data = payload;
    }
}

/// Locate the first text-bearing element of a cue's first slide action.
fn first_text_payload(cue: &CueRecord) -> Option<(usize, usize, Vec<u8>)> {
    for (action_idx, action) in cue.actions.iter().enumerate() {
        let Some(Kind::Slide(slide_action)) = &action.kind else {
            continue;
        };
        let Some(slide) = &slide_action.slide else {
            continue;
        };
        if let Some((element_idx, element)) = slide
            .elements
            .iter()
            .enumerate()
            .find(|(_, element)| element.is_text())
        {
            return Some((action_idx, element_idx, element.rtf_data.clone()));
        }
    }
    None
}
