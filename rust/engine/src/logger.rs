use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::deck::VerificationBundle;
use crate::game::{GamePhase, HandResult};
use crate::hand::HandCategory;
use crate::player::{LastAction, UserId};

/// Something that happened at the table, in the order it happened.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    /// New hand dealt; the commitment is public from this point on
    HandStarted {
        hand_id: String,
        dealer_seat: usize,
        commitment: String,
        players: Vec<UserId>,
    },
    BlindPosted {
        user_id: UserId,
        amount: u32,
        big: bool,
    },
    PlayerActed {
        user_id: UserId,
        action: LastAction,
    },
    /// The turn clock ran out and the player was folded
    TimedOut { user_id: UserId },
    CommunityDealt { cards: Vec<Card> },
    HandRevealed {
        user_id: UserId,
        hole_cards: Vec<Card>,
        category: HandCategory,
        description: String,
    },
    PotAwarded {
        user_id: UserId,
        amount: u32,
        pot_index: usize,
    },
    DeckRevealed { bundle: VerificationBundle },
}

/// Records a single event together with where in the hand it occurred.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub hand_number: u32,
    pub phase: GamePhase,
    /// RFC3339 timestamp
    pub ts: String,
    #[serde(flatten)]
    pub event: LogEvent,
}

/// Append-only action log for replay and audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, hand_number: u32, phase: GamePhase, event: LogEvent) {
        self.entries.push(LogEntry {
            hand_number,
            phase,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn for_hand(&self, hand_number: u32) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.hand_number == hand_number)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Complete audit record of a finished hand.
/// Serialized to JSONL for hand history storage and replay.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Identifier (format: TABLE-YYYYMMDD-NNNNNN)
    pub hand_id: String,
    pub table_id: String,
    pub hand_number: u32,
    /// Commitment published before dealing
    pub commitment: String,
    /// Everything logged for this hand
    pub entries: Vec<LogEntry>,
    /// Community cards (0, 3, 4 or 5)
    pub board: Vec<Card>,
    pub result: Option<HandResult>,
    /// Timestamp when the record was written (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
}

pub fn format_hand_id(table_id: &str, yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{}-{:06}", table_id, yyyymmdd, seq)
}

pub fn today_yyyymmdd() -> String {
    Utc::now().format("%Y%m%d").to_string()
}

/// Appends hand records to a JSONL file.
pub struct HandLogger {
    writer: Option<BufWriter<File>>,
}

impl HandLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
        })
    }

    /// Logger that serializes records but writes nowhere.
    pub fn sink() -> Self {
        Self { writer: None }
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
