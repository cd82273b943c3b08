//! Append-only call journal: accepted calls only, in acceptance order.
//!
//! Export format: JSON lines, one `CallEnvelope` per line.
//!
//! Rules:
//!   - Strict append only: no mutation, no deletion, no reordering
//!   - Sequence strictly increasing from 1, no gaps (validated on append)
//!   - Days never decrease

use std::io::{self, BufRead, Write};

use sha2::{Digest, Sha256};
use thiserror::Error;

use vesting_ledger::calls::CallEnvelope;
use vesting_ledger::domain::Day;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("sequence violation: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },
    #[error("day regression at sequence {sequence}: {day} is before {previous}")]
    DayRegression { sequence: u64, day: Day, previous: Day },
    #[error("malformed journal line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallJournal {
    entries: Vec<CallEnvelope>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, envelope: CallEnvelope) -> Result<(), JournalError> {
        let expected = self.next_sequence();
        if envelope.sequence != expected {
            return Err(JournalError::SequenceViolation {
                expected,
                got: envelope.sequence,
            });
        }
        if let Some(previous) = self.last_day() {
            if envelope.day < previous {
                return Err(JournalError::DayRegression {
                    sequence: envelope.sequence,
                    day: envelope.day,
                    previous,
                });
            }
        }
        self.entries.push(envelope);
        Ok(())
    }

    pub fn entries(&self) -> &[CallEnvelope] {
        &self.entries
    }

    /// Entries strictly after `sequence`.
    pub fn since(&self, sequence: u64) -> &[CallEnvelope] {
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(self.entries.len());
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_sequence(&self) -> u64 {
        self.entries.last().map(|e| e.sequence).unwrap_or(0)
    }

    pub fn next_sequence(&self) -> u64 {
        self.last_sequence() + 1
    }

    pub fn last_day(&self) -> Option<Day> {
        self.entries.last().map(|e| e.day)
    }

    // -----------------------------------------------------------------------
    // JSON lines
    // -----------------------------------------------------------------------

    pub fn write_jsonl<W: Write>(&self, mut writer: W) -> Result<(), JournalError> {
        for entry in &self.entries {
            serde_json::to_writer(&mut writer, entry).map_err(io::Error::from)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Rebuilds a journal, re-validating order. Blank lines are skipped.
    pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Self, JournalError> {
        let mut journal = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let envelope: CallEnvelope = serde_json::from_str(&line)
                .map_err(|source| JournalError::Malformed {
                    line: idx + 1,
                    source,
                })?;
            journal.append(envelope)?;
        }
        Ok(journal)
    }

    pub fn to_jsonl_string(&self) -> Result<String, JournalError> {
        let mut buf = Vec::new();
        self.write_jsonl(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    pub fn from_jsonl_str(text: &str) -> Result<Self, JournalError> {
        Self::read_jsonl(text.as_bytes())
    }

    /// SHA-256 hex of the JSON-lines export.
    pub fn digest(&self) -> Result<String, JournalError> {
        let text = self.to_jsonl_string()?;
        let digest = Sha256::digest(text.as_bytes());
        Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }
}
