use std::io::{BufRead, Lines};

use tracing::warn;

use crate::domain::FastaRecord;
use crate::error::JoinError;
use crate::report::SkippedLines;

const HEADER_MARKER: char = '>';

#[derive(Debug)]
enum State {
    AwaitingHeader,
    AccumulatingBody(FastaRecord),
    Done,
}

/// Streams [`FastaRecord`]s, concatenating multi-line bodies.
///
/// Sequence lines that appear before any header (or after a header without an
/// identifier) are skipped and counted. Headers followed by no sequence lines
/// still produce a record with an empty sequence.
pub struct FastaReader<R> {
    lines: Lines<R>,
    source: String,
    line_no: usize,
    state: State,
    skipped: SkippedLines,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R, source: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
            line_no: 0,
            state: State::AwaitingHeader,
            skipped: SkippedLines::default(),
        }
    }

    pub fn skipped(&self) -> &SkippedLines {
        &self.skipped
    }

    pub fn into_skipped(self) -> SkippedLines {
        self.skipped
    }

    fn skip(&mut self, reason: &str) {
        let err = JoinError::MalformedFastaLine {
            line: self.line_no,
            reason: reason.to_string(),
        };
        warn!(source = %self.source, "{err}");
        self.skipped.record(self.line_no);
    }

    fn open(&mut self, header: &str) -> Option<FastaRecord> {
        let previous = match std::mem::replace(&mut self.state, State::AwaitingHeader) {
            State::AccumulatingBody(record) => Some(record),
            State::AwaitingHeader | State::Done => None,
        };
        match parse_header(header) {
            Some((id, description)) => {
                self.state = State::AccumulatingBody(FastaRecord {
                    id,
                    description,
                    line: self.line_no,
                    sequence: String::new(),
                });
            }
            None => self.skip("header without identifier"),
        }
        previous
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord, JoinError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if matches!(self.state, State::Done) {
                return None;
            }
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.state = State::Done;
                    return Some(Err(JoinError::io(self.source.as_str(), err)));
                }
                None => {
                    return match std::mem::replace(&mut self.state, State::Done) {
                        State::AccumulatingBody(record) => Some(Ok(record)),
                        State::AwaitingHeader | State::Done => None,
                    };
                }
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(header) = trimmed.strip_prefix(HEADER_MARKER) {
                if let Some(record) = self.open(header) {
                    return Some(Ok(record));
                }
                continue;
            }
            if let State::AccumulatingBody(record) = &mut self.state {
                record
                    .sequence
                    .extend(trimmed.chars().filter(|ch| !ch.is_whitespace()));
            } else {
                self.skip("sequence line before any header");
            }
        }
    }
}

pub fn parse_header(header: &str) -> Option<(String, Option<String>)> {
    let header = header.trim();
    let mut parts = header.splitn(2, char::is_whitespace);
    let id = parts.next().filter(|id| !id.is_empty())?;
    let description = parts
        .next()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    Some((id.to_string(), description))
}
