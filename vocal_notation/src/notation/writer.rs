// Note segments -> notation document -> text.
//
// Writing happens in two steps. `NotationWriter::build_document` quantizes
// segment times to scaled beats, clamps overlaps, places line breaks, and
// fills the header; `render` turns any document into text. Both are pure,
// so a failed write never leaves a half-written file behind. Only
// `write_notation_file` touches the disk, via a temp file and a rename.
//
// Beat numbers: with gap = first segment start (truncated to whole ms),
//   start_beat = round((start - gap) * multiplier * real_bpm / 60)
//   duration   = round((end - start) * multiplier * real_bpm / 60)
// The header BPM is real_bpm / 4 * multiplier, so every beat maps back to
// the same absolute time (see `Header::beat_to_seconds`).

use super::document::{LineBreak, NotationDocument, NoteKind, NoteLine};
use super::header::{
    DEFAULT_COMMENT, DEFAULT_CREATOR, Header, extract_year, format_separated,
    language_display_name,
};
use super::version::{FormatVersion, emits_karaoke_duplicate, header_fields};
use crate::config::NotationConfig;
use crate::error::{NotationError, Result};
use crate::segment::NoteSegment;
use crate::tempo::BeatScale;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;

/// Song-level metadata supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SongMetadata {
    /// File stem shared by the audio, video, and notation files.
    pub basename: String,
    pub artist: String,
    pub title: String,
    /// Free-form release date; reduced to a four-digit year.
    pub year: Option<String>,
    /// ISO code or display name.
    pub language: Option<String>,
    pub genre: Option<String>,
    pub tags: Option<String>,
    pub cover: Option<String>,
    pub cover_url: Option<String>,
    pub video_url: Option<String>,
    pub creator: Option<String>,
    pub comment: Option<String>,
}

impl SongMetadata {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        let artist = artist.into();
        let title = title.into();
        SongMetadata {
            basename: format!("{artist} - {title}"),
            artist,
            title,
            ..SongMetadata::default()
        }
    }

    fn header(&self, version: FormatVersion, bpm: f64, gap_ms: f64) -> Header {
        let base = &self.basename;
        Header {
            version,
            artist: self.artist.clone(),
            title: self.title.clone(),
            year: self.year.as_deref().map(extract_year),
            language: self.language.as_deref().map(language_display_name),
            genre: self.genre.as_deref().map(format_separated),
            cover: self.cover.clone(),
            cover_url: self.cover_url.clone(),
            mp3: Some(format!("{base}.mp3")),
            audio: Some(format!("{base}.mp3")),
            vocals: Some(format!("{base} [Vocals].mp3")),
            instrumental: Some(format!("{base} [Instrumental].mp3")),
            tags: self.tags.as_deref().map(format_separated),
            video: Some(format!("{base}.mp4")),
            video_url: self.video_url.clone(),
            bpm,
            gap_ms,
            creator: Some(
                self.creator
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CREATOR.to_string()),
            ),
            comment: Some(
                self.comment
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COMMENT.to_string()),
            ),
        }
    }
}

/// A rendered document and, for legacy versions, its karaoke twin.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenNotation {
    pub document: NotationDocument,
    pub text: String,
    pub karaoke: Option<KaraokeNotation>,
}

/// Same notes, pointing at the instrumental track under a `[Karaoke]` title.
#[derive(Debug, Clone, PartialEq)]
pub struct KaraokeNotation {
    pub file_stem: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotationWriter {
    ceiling_bpm: f64,
    min_gaps_for_threshold: usize,
    format_version: FormatVersion,
    create_karaoke: bool,
}

impl Default for NotationWriter {
    fn default() -> Self {
        NotationWriter::new(&NotationConfig::default())
    }
}

impl NotationWriter {
    pub fn new(config: &NotationConfig) -> Self {
        NotationWriter {
            ceiling_bpm: config.tempo.ceiling_bpm,
            min_gaps_for_threshold: config.line_breaks.min_gaps_for_threshold,
            format_version: config.output.format_version,
            create_karaoke: config.output.create_karaoke,
        }
    }

    pub fn build_document(
        &self,
        segments: &[NoteSegment],
        real_bpm: f64,
        metadata: &SongMetadata,
    ) -> Result<NotationDocument> {
        let first = segments.first().ok_or(NotationError::EmptyDocument)?;
        let scale = BeatScale::new(real_bpm, self.ceiling_bpm)?;
        let gap_ms = (first.start * 1000.0).trunc();
        let gap = gap_ms / 1000.0;
        let header = metadata.header(self.format_version, scale.written_bpm(), gap_ms);

        let mut lines: Vec<NoteLine> = Vec::with_capacity(segments.len());
        for segment in segments {
            let mut start_beat = scale.beats(segment.start - gap);
            let duration = scale.beats(segment.end - segment.start);
            if let Some(prev) = lines.last()
                && start_beat < prev.end_beat()
            {
                tracing::warn!(
                    lyric = %segment.lyric,
                    start_beat,
                    previous_end = prev.end_beat(),
                    "note overlaps its predecessor, start clamped"
                );
                start_beat = prev.end_beat();
            }
            lines.push(NoteLine::timed(
                &header,
                NoteKind::Normal,
                start_beat,
                duration,
                segment.note.notation_pitch(),
                segment.lyric.clone(),
            ));
        }

        let gaps: Vec<f64> = segments.windows(2).map(|w| w[1].start - w[0].end).collect();
        let threshold = silence_split_threshold(&gaps, self.min_gaps_for_threshold);
        let mut line_breaks = Vec::new();
        for (i, pair) in segments.windows(2).enumerate() {
            if !pair[0].is_word_end || pair[1].start - pair[0].end <= threshold {
                continue;
            }
            let show_at_beat = scale.beats(pair[0].end - gap).max(lines[i].end_beat());
            line_breaks.push(LineBreak {
                after_line_index: i,
                show_at_beat,
            });
        }

        tracing::debug!(
            lines = lines.len(),
            line_breaks = line_breaks.len(),
            multiplier = scale.multiplier(),
            bpm = header.bpm,
            gap_ms,
            "built notation document"
        );
        Ok(NotationDocument {
            header,
            lines,
            line_breaks,
        })
    }

    /// Build and render the document, plus the karaoke twin when the format
    /// version still uses one.
    pub fn write(
        &self,
        segments: &[NoteSegment],
        real_bpm: f64,
        metadata: &SongMetadata,
    ) -> Result<WrittenNotation> {
        let document = self.build_document(segments, real_bpm, metadata)?;
        let text = render(&document);

        let karaoke = (self.create_karaoke && emits_karaoke_duplicate(self.format_version)).then(|| {
            let file_stem = format!("{} [Karaoke]", metadata.basename);
            let mut twin = document.clone();
            twin.header.title = file_stem.clone();
            twin.header.mp3 = Some(format!("{file_stem}.mp3"));
            KaraokeNotation {
                text: render(&twin),
                file_stem,
            }
        });

        Ok(WrittenNotation {
            document,
            text,
            karaoke,
        })
    }
}

/// Gap length above which a word end starts a new phrase: the mean of all
/// gaps except the single largest. With fewer than `min_gaps` gaps every
/// positive gap qualifies.
pub fn silence_split_threshold(gaps: &[f64], min_gaps: usize) -> f64 {
    if gaps.len() < min_gaps.max(2) {
        return 0.0;
    }
    let mut sorted = gaps.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.pop();
    sorted.iter().sum::<f64>() / sorted.len() as f64
}

/// Text form of a document.
pub fn render(doc: &NotationDocument) -> String {
    let mut out = String::new();
    for field in header_fields(doc.header.version) {
        if let Some(value) = doc.header.value(field) {
            let _ = writeln!(out, "#{}:{}", field.key(), value);
        }
    }
    let mut breaks = doc.line_breaks.iter().peekable();
    for (i, line) in doc.lines.iter().enumerate() {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            line.kind.tag(),
            line.start_beat,
            line.duration_beats,
            line.pitch,
            line.lyric
        );
        while let Some(b) = breaks.next_if(|b| b.after_line_index == i) {
            let _ = writeln!(out, "- {}", b.show_at_beat);
        }
    }
    out.push_str("E\n");
    out
}

/// Write `text` to `path` atomically: a uniquely named temp file in the
/// target's directory is persisted over the target, so readers see either
/// the old file or the whole new one, and concurrent writers never share a
/// temp file.
pub fn write_notation_file(path: &Path, text: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| NotationError::io("creating notation temp file", e))?;
    tmp.write_all(text.as_bytes())
        .map_err(|e| NotationError::io("writing notation temp file", e))?;
    tmp.persist(path)
        .map_err(|e| NotationError::io("persisting notation file", e.error))?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote notation file");
    Ok(())
}
