//! Interactive classification session.
//!
//! Reads one message at a time from the input. A message ends at a line
//! containing only `.` or at end of input; `:quit` ends the session. Each
//! message is classified and rendered before the next one is read.

use std::io::{self, BufRead, Write};

use spamgate_core::{DecisionModel, Label, Outcome, Pipeline, Vectorizer};
use tracing::warn;

use crate::display;

const END_OF_MESSAGE: &str = ".";
const QUIT: &str = ":quit";

/// Tally of one session.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub spam: usize,
    pub ham: usize,
    pub empty: usize,
    pub errors: usize,
}

pub fn run<V, M>(
    pipeline: &Pipeline<V, M>,
    mut input: impl BufRead,
    out: &mut impl Write,
    json: bool,
) -> io::Result<SessionStats>
where
    V: Vectorizer,
    M: DecisionModel<V::Features>,
{
    let mut stats = SessionStats::default();
    let mut message = String::new();
    let mut pending = false;
    let mut raw = Vec::new();

    prompt(out, json)?;
    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        // Invalid UTF-8 is replaced rather than ending the session.
        let line = String::from_utf8_lossy(&raw);
        let trimmed = line.trim_end_matches(['\n', '\r']);

        if trimmed.trim() == QUIT {
            pending = false;
            break;
        }
        if trimmed == END_OF_MESSAGE {
            classify_one(pipeline, &message, out, json, &mut stats)?;
            message.clear();
            pending = false;
            prompt(out, json)?;
            continue;
        }

        message.push_str(trimmed);
        message.push('\n');
        pending = true;
    }

    if pending {
        classify_one(pipeline, &message, out, json, &mut stats)?;
    }
    Ok(stats)
}

fn classify_one<V, M>(
    pipeline: &Pipeline<V, M>,
    message: &str,
    out: &mut impl Write,
    json: bool,
    stats: &mut SessionStats,
) -> io::Result<()>
where
    V: Vectorizer,
    M: DecisionModel<V::Features>,
{
    match pipeline.classify(message) {
        Ok(outcome) => {
            match &outcome {
                Outcome::Empty => stats.empty += 1,
                Outcome::Classified(v) if v.label == Label::Spam => stats.spam += 1,
                Outcome::Classified(_) => stats.ham += 1,
            }
            display::write_outcome(out, &outcome, json)?;
        }
        Err(e) => {
            warn!(error = %e, "classification failed");
            stats.errors += 1;
            display::write_classify_error(out, &e)?;
        }
    }
    out.flush()
}

fn prompt(out: &mut impl Write, json: bool) -> io::Result<()> {
    if !json {
        writeln!(
            out,
            "\nPaste the email content below, then a line with '{END_OF_MESSAGE}' to classify ('{QUIT}' to exit):"
        )?;
    }
    out.flush()
}
