//! Coarse async entry points over whole files.
//!
//! Each operation here is a single unit: read the file, do all parsing and
//! rewriting on a blocking worker, then write the full output buffer in one
//! step. There is no incremental or streaming I/O; presentation files are
//! small enough that whole-buffer handling keeps failure modes simple.
//!
//! Inputs that do not parse as a presentation container but are valid UTF-8
//! are treated as plain ChordPro text, so the same entry points work on
//! bare text files without touching the container machinery.

use std::path::Path;

use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::annotate::{self, AnnotationReport, ChordMap};
use crate::chord::{self, ProgressionAnalysis, Transposer};
use crate::common::{Error, Result};
use crate::container::PresentationFile;

/// A loaded document: either a full presentation container or bare
/// ChordPro text.
#[derive(Debug)]
pub enum Document {
    Container(Box<PresentationFile>),
    ChordPro(String),
}

impl Document {
    /// Serialize back to file bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Document::Container(file) => Ok(file.save()?),
            Document::ChordPro(text) => Ok(text.clone().into_bytes()),
        }
    }
}

/// Classify raw file bytes as container or plain ChordPro.
fn classify(data: Bytes) -> Result<Document> {
    match PresentationFile::load(data.clone()) {
        Ok(file) => Ok(Document::Container(Box::new(file))),
        Err(err) => match std::str::from_utf8(&data) {
            Ok(text) => {
                debug!(%err, "input is not a container, treating as plain ChordPro");
                Ok(Document::ChordPro(text.to_string()))
            },
            Err(_) => Err(err.into()),
        },
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| Error::Io(std::io::Error::other(err)))?
}

/// Load a file and classify it.
pub async fn load(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = fs::read(path).await?;
    run_blocking(move || classify(bytes.into())).await
}

/// Write a document back to disk in one step.
pub async fn save(path: impl AsRef<Path>, document: &Document) -> Result<()> {
    let data = document.to_bytes()?;
    fs::write(path, data).await?;
    Ok(())
}

/// Annotate a file's slides with chords and write the result to `output`.
///
/// For plain ChordPro inputs the whole text counts as a single slide at
/// ordinal 0, written through directly when the map provides an entry.
pub async fn annotate_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    chords: &ChordMap,
) -> Result<AnnotationReport> {
    let bytes = fs::read(input).await?;
    let chords = chords.clone();

    let (data, report) = run_blocking(move || match classify(bytes.into())? {
        Document::Container(mut file) => {
            let report = annotate::annotate(&mut file, &chords)?;
            Ok((file.save()?, report))
        },
        Document::ChordPro(text) => {
            let (data, annotated) = match chords.get(0) {
                Some(chordpro) => (chordpro.as_bytes().to_vec(), 1),
                None => (text.into_bytes(), 0),
            };
            Ok((
                data,
                AnnotationReport {
                    slides_annotated: annotated,
                    slides_with_text: 1,
                    warnings: Vec::new(),
                },
            ))
        },
    })
    .await?;

    fs::write(output, &data).await?;
    Ok(report)
}

/// Transpose every chord in a file by `steps` semitones and write the
/// result to `output`.
pub async fn transpose_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    steps: i32,
) -> Result<AnnotationReport> {
    let bytes = fs::read(input).await?;

    let (data, report) = run_blocking(move || match classify(bytes.into())? {
        Document::Container(mut file) => {
            let report = annotate::transpose_slides(&mut file, steps)?;
            Ok((file.save()?, report))
        },
        Document::ChordPro(text) => {
            let transposer = match chord::detect_key(&text) {
                Some(key) => {
                    Transposer::with_key(Transposer::new().transpose_chord(&key, steps))
                },
                None => Transposer::new(),
            };
            let transposed = transposer.transpose_text(&text, steps);
            let changed = transposed != text;
            Ok((
                transposed.into_bytes(),
                AnnotationReport {
                    slides_annotated: usize::from(changed),
                    slides_with_text: 1,
                    warnings: Vec::new(),
                },
            ))
        },
    })
    .await?;

    fs::write(output, &data).await?;
    Ok(report)
}

/// Analyze the chord progression of a file without modifying it.
///
/// Container inputs contribute all their slide texts in traversal order;
/// files without an arrangement fall back to cue declaration order.
pub async fn analyze_file(path: impl AsRef<Path>) -> Result<ProgressionAnalysis> {
    let bytes = fs::read(path).await?;

    run_blocking(move || {
        let text = match classify(bytes.into())? {
            Document::Container(file) => annotate::slide_texts(&file)
                .0
                .into_iter()
                .map(|slide| slide.text)
                .collect::<Vec<_>>()
                .join("\n"),
            Document::ChordPro(text) => text,
        };
        Ok(chord::analyze_progression(&text))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    use crate::container::records::{
        ActionRecord, ArrangementRecord, CueGroupRecord, CueRecord, Element, ElementFlags,
        PresentationRecord, RecordInfo, Slide, SlideAction, action_record,
    };
    use crate::container::{RecordKind, stream};
    use crate::rtf;

    fn push_frame(out: &mut Vec<u8>, identifier: &str, kind: RecordKind, payload: &[u8]) {
        let info = RecordInfo {
            identifier: identifier.to_string(),
            kind: kind.into(),
            length: 0,
        };
        stream::write_frame(&info, payload, out);
    }

    fn one_slide_container(text: &[u8]) -> Vec<u8> {
        let root = PresentationRecord {
            uuid: "p-0".to_string(),
            name: "Song".to_string(),
            arrangement_ids: vec!["arr-0".to_string()],
            cue_group_ids: vec!["g-0".to_string()],
            cue_ids: vec!["c-0".to_string()],
        };
        let arrangement = ArrangementRecord {
            uuid: "arr-0".to_string(),
            group_ids: vec!["g-0".to_string()],
            ..Default::default()
        };
        let group = CueGroupRecord {
            uuid: "g-0".to_string(),
            cue_ids: vec!["c-0".to_string()],
            ..Default::default()
        };
        let cue = CueRecord {
            uuid: "c-0".to_string(),
            name: "Slide 1".to_string(),
            actions: vec![ActionRecord {
                uuid: "c-0-a0".to_string(),
                kind: Some(action_record::Kind::Slide(SlideAction {
                    slide: Some(Slide {
                        elements: vec![Element {
                            flags: ElementFlags::TEXT.bits(),
                            name: String::new(),
                            rtf_data: text.to_vec(),
                        }],
                    }),
                })),
            }],
        };

        let mut out = Vec::new();
        push_frame(&mut out, "p-0", RecordKind::Presentation, &root.encode_to_vec());
        push_frame(&mut out, "arr-0", RecordKind::Arrangement, &arrangement.encode_to_vec());
        push_frame(&mut out, "g-0", RecordKind::CueGroup, &group.encode_to_vec());
        push_frame(&mut out, "c-0", RecordKind::Cue, &cue.encode_to_vec());
        out
    }

    #[tokio::test]
    async fn test_load_classifies_container_and_text() {
        let dir = tempfile::tempdir().unwrap();

        let container_path = dir.path().join("song.bin");
        tokio::fs::write(&container_path, one_slide_container(b"Amazing grace"))
            .await
            .unwrap();
        assert!(matches!(
            load(&container_path).await.unwrap(),
            Document::Container(_)
        ));

        let text_path = dir.path().join("song.cho");
        tokio::fs::write(&text_path, "[C]Amazing grace").await.unwrap();
        assert!(matches!(
            load(&text_path).await.unwrap(),
            Document::ChordPro(text) if text == "[C]Amazing grace"
        ));
    }

    #[tokio::test]
    async fn test_load_rejects_binary_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        tokio::fs::write(&path, [0xFFu8, 0x00, 0x80, 0xFE]).await.unwrap();
        assert!(load(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_annotate_file_container() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bin");
        let output = dir.path().join("out.bin");
        tokio::fs::write(&input, one_slide_container(b"Amazing grace"))
            .await
            .unwrap();

        let mut chords = ChordMap::new();
        chords.insert(0, "[C]Amazing grace");

        let report = annotate_file(&input, &output, &chords).await.unwrap();
        assert_eq!(report.slides_annotated, 1);

        match load(&output).await.unwrap() {
            Document::Container(file) => {
                let cue = file.cue("c-0").unwrap();
                let payload = match &cue.actions[0].kind {
                    Some(action_record::Kind::Slide(action)) => {
                        &action.slide.as_ref().unwrap().elements[0].rtf_data
                    },
                    _ => panic!("missing slide action"),
                };
                let decoded = rtf::decode_payload(payload).unwrap();
                assert_eq!(decoded.text, "[C]Amazing grace");
            },
            Document::ChordPro(_) => panic!("expected container output"),
        }
    }

    #[tokio::test]
    async fn test_annotate_file_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.cho");
        let output = dir.path().join("out.cho");
        tokio::fs::write(&input, "Amazing grace").await.unwrap();

        let mut chords = ChordMap::new();
        chords.insert(0, "[C]Amazing grace");

        let report = annotate_file(&input, &output, &chords).await.unwrap();
        assert_eq!(report.slides_annotated, 1);
        assert_eq!(
            tokio::fs::read_to_string(&output).await.unwrap(),
            "[C]Amazing grace"
        );

        // Without a matching entry the text passes through unchanged
        let report = annotate_file(&input, &output, &ChordMap::new()).await.unwrap();
        assert_eq!(report.slides_annotated, 0);
        assert_eq!(
            tokio::fs::read_to_string(&output).await.unwrap(),
            "Amazing grace"
        );
    }

    #[tokio::test]
    async fn test_transpose_file_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.cho");
        let output = dir.path().join("out.cho");
        tokio::fs::write(&input, "[C]Amazing [F]grace").await.unwrap();

        let report = transpose_file(&input, &output, 2).await.unwrap();
        assert_eq!(report.slides_annotated, 1);
        assert_eq!(
            tokio::fs::read_to_string(&output).await.unwrap(),
            "[D]Amazing [G]grace"
        );
    }

    #[tokio::test]
    async fn test_analyze_file() {
        let dir = tempfile::tempdir().unwrap();

        let text_path = dir.path().join("song.cho");
        tokio::fs::write(&text_path, "[C]a [F]b [G]c [C]d").await.unwrap();
        let analysis = analyze_file(&text_path).await.unwrap();
        assert_eq!(analysis.total_chords, 4);
        assert_eq!(analysis.suggested_key, Some("C".to_string()));

        let container_path = dir.path().join("song.bin");
        tokio::fs::write(&container_path, one_slide_container(b"[G]how [G]sweet"))
            .await
            .unwrap();
        let analysis = analyze_file(&container_path).await.unwrap();
        assert_eq!(analysis.total_chords, 2);
        assert_eq!(analysis.suggested_key, Some("G".to_string()));
    }
}
