// Document -> fixed-step pitch timeline.
//
// Each step of `step_ms` holds the notation pitch sung at that instant,
// `NO_PITCH` when nothing is sung, or `FREESTYLE` for freestyle lines (only
// when those are included). Line edges are rounded up to step boundaries; a
// line whose start lands on the previous line's end is pushed one step later
// so adjacent notes never share a step. Lines shorter than one step after
// rounding leave no trace.

use crate::config::EvaluationConfig;
use vocal_notation::{NotationDocument, NoteKind};

pub const NO_PITCH: i32 = -1000;
pub const FREESTYLE: i32 = -1001;

fn round_up_to_step(ms: i64, step: i64) -> i64 {
    (ms + step - 1).div_euclid(step) * step
}

// Absorbs float noise such as 0.29 * 1000 = 289.99999999999997.
fn to_millis(seconds: f64) -> i64 {
    (seconds * 1000.0 + 1e-6).floor() as i64
}

pub fn map_to_datapoints(doc: &NotationDocument, config: &EvaluationConfig) -> Vec<i32> {
    let step = config.step_ms;
    let mut data = Vec::new();
    let mut previous_step = -step;
    let mut skipped = 0usize;

    for line in &doc.lines {
        let freestyle = line.kind == NoteKind::Freestyle;
        if freestyle && !config.include_freestyle {
            continue;
        }

        let mut start = round_up_to_step(to_millis(line.start_time), step);
        let end = round_up_to_step(to_millis(line.end_time), step);
        if start == previous_step {
            start += step;
        }
        let duration = end - start;
        if duration < step {
            skipped += 1;
            continue;
        }

        let gap_steps = ((start - previous_step - step) / step).max(0) as usize;
        data.resize(data.len() + gap_steps, NO_PITCH);
        let value = if freestyle { FREESTYLE } else { line.pitch };
        data.resize(data.len() + (duration / step) as usize, value);

        previous_step = end;
    }

    tracing::debug!(
        lines = doc.lines.len(),
        steps = data.len(),
        skipped,
        step_ms = step,
        "mapped document to datapoints"
    );
    data
}
