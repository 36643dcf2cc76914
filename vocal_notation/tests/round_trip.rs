// End-to-end tests: segments -> text -> document -> score.
//
// These go through the public API only, the way an orchestrating service
// would: build segments, write, parse the text back, score it.

use vocal_notation::notation::{NotationWriter, SongMetadata, parse, render};
use vocal_notation::scoring::ScoreCalculator;
use vocal_notation::segment::{NoteSegment, SegmentBuilder};
use vocal_notation::{NotationConfig, Note, PitchCurve, PitchSample, SpanKind};

/// Small deterministic generator so the fixtures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn random_segments(seed: u64, count: usize) -> Vec<NoteSegment> {
    let mut rng = Lcg(seed);
    let mut t = 0.3 + rng.next_f64();
    (0..count)
        .map(|i| {
            // Some starts land before the previous end to exercise clamping.
            let start = (t - 0.05 * rng.next_f64()).max(0.0);
            let end = start + 0.05 + rng.next_f64() * 0.8;
            t = end + rng.next_f64() * 0.6;
            NoteSegment {
                note: Note::from_midi(45 + (rng.next_f64() * 24.0) as i32),
                start,
                end,
                lyric: format!("w{i} "),
                kind: SpanKind::Word,
                is_word_end: true,
            }
        })
        .collect()
}

fn flat_curve(until: f64, midi: i32) -> PitchCurve {
    let n = (until * 100.0) as usize;
    PitchCurve::new(
        (0..=n)
            .map(|k| PitchSample::new(k as f64 * 0.01, Note::from_midi(midi).frequency(), 0.95))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_parse_of_written_text_reproduces_lines() {
    for bpm in [72.0, 98.5, 120.0, 151.0] {
        let segments = random_segments(bpm as u64, 40);
        let metadata = SongMetadata::new("Round", "Trip");
        let written = NotationWriter::default()
            .write(&segments, bpm, &metadata)
            .unwrap();
        let parsed = parse(&written.text).unwrap();

        assert_eq!(parsed.lines.len(), segments.len(), "bpm {bpm}");
        for (line, segment) in parsed.lines.iter().zip(&segments) {
            assert_eq!(line.pitch, segment.note.notation_pitch());
            assert_eq!(line.lyric, segment.lyric);
        }
        for (a, b) in parsed.lines.iter().zip(&written.document.lines) {
            assert!((a.start_beat - b.start_beat).abs() <= 1);
            assert!((a.duration_beats - b.duration_beats).abs() <= 1);
        }
        assert_eq!(parsed.line_breaks, written.document.line_breaks);
        assert_eq!(render(&parsed), written.text, "render(parse(text)) == text");
    }
}

#[test]
fn test_written_beats_never_overlap() {
    for seed in 1..20u64 {
        let segments = random_segments(seed, 60);
        let doc = NotationWriter::default()
            .build_document(&segments, 110.0, &SongMetadata::new("A", "B"))
            .unwrap();
        for pair in doc.lines.windows(2) {
            assert!(
                pair[1].start_beat >= pair[0].end_beat(),
                "seed {seed}: {} starts before {} ends",
                pair[1].lyric,
                pair[0].lyric
            );
        }
        for b in &doc.line_breaks {
            let line = &doc.lines[b.after_line_index];
            assert!(b.show_at_beat >= line.end_beat(), "seed {seed}: break inside a note");
        }
    }
}

#[test]
fn test_score_survives_write_and_parse() {
    let config = NotationConfig::default();
    let curve = flat_curve(60.0, 57);
    let segments: Vec<NoteSegment> = random_segments(7, 30)
        .into_iter()
        .map(|s| NoteSegment {
            note: Note::from_midi(57),
            ..s
        })
        .collect();
    let written = NotationWriter::new(&config)
        .write(&segments, 120.0, &SongMetadata::new("A", "B"))
        .unwrap();

    let calculator = ScoreCalculator::new(&config.scoring, SegmentBuilder::new(&config.segment));
    let direct = calculator.score(&written.document, &curve).unwrap();
    let reparsed = calculator.score(&parse(&written.text).unwrap(), &curve).unwrap();
    assert_eq!(direct, reparsed);
    assert_eq!(direct.accurate.total, 10_000, "flat curve on the written note is perfect");
}
