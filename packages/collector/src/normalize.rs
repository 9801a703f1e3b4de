//! Canonical records built from extractor output.
//!
//! Extractors keep values as printed. The types here carry parsed numbers,
//! dates and enums, ready to be stored. Business fields that do not parse
//! become `None`; structural fields (period, elapsed time) that do not parse
//! are extraction errors.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::collector::Page;
use crate::error::{CollectorError, Result};
use crate::pages::EventLog;
use crate::types::{EventRecord, GameReportRecord, OnIcePlayer, RosterEntry, ScheduleRecord};

/// Date of birth formats seen on roster pages.
const DOB_FORMATS: [&str; 3] = ["%b %d, %Y", "%m/%d/%Y", "%Y-%m-%d"];

/// Height as printed on rosters, e.g. `6' 2"`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEIGHT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([0-9]+)'\s*([0-9]+)"?$"#).expect("valid regex"));

/// A scheduled game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub season: String,
    pub date: NaiveDate,
    /// `None` while the start time is to be determined.
    pub start: Option<DateTime<Utc>>,
    pub home: String,
    pub road: String,
    /// `PRE`, `REG` or `POST`.
    pub game_type: &'static str,
    pub report_id: Option<String>,
}

impl From<&ScheduleRecord> for GameRecord {
    fn from(game: &ScheduleRecord) -> Self {
        Self {
            season: game.season.as_str().to_string(),
            date: game.date,
            start: game.start,
            home: game.home.clone(),
            road: game.road.clone(),
            game_type: game.game_type.code(),
            report_id: None,
        }
    }
}

impl From<&GameReportRecord> for GameRecord {
    fn from(report: &GameReportRecord) -> Self {
        Self {
            report_id: Some(report.report_id.clone()),
            ..Self::from(&report.game)
        }
    }
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRecord {
    pub number: Option<u32>,
    pub name: String,
    pub url: String,
    pub height_inches: Option<u32>,
    pub weight_lbs: Option<u32>,
    pub dob: Option<NaiveDate>,
    pub hometown: String,
}

impl From<&RosterEntry> for PlayerRecord {
    fn from(entry: &RosterEntry) -> Self {
        Self {
            number: entry.number.trim().parse().ok(),
            name: entry.name.clone(),
            url: entry.url.clone(),
            height_inches: parse_height(&entry.height),
            weight_lbs: entry.weight.trim().parse().ok(),
            dob: parse_dob(&entry.dob),
            hometown: entry.hometown.clone(),
        }
    }
}

/// Height in inches.
///
/// # Examples
/// ```
/// use nhlstats_collector::normalize::parse_height;
///
/// assert_eq!(parse_height(r#"6' 2""#), Some(74));
/// assert_eq!(parse_height("tall"), None);
/// ```
#[must_use]
pub fn parse_height(text: &str) -> Option<u32> {
    let captures = HEIGHT_PATTERN.captures(text.trim())?;
    let feet: u32 = captures[1].parse().ok()?;
    let inches: u32 = captures[2].parse().ok()?;
    feet.checked_mul(12)?.checked_add(inches)
}

/// Date of birth in any of the roster formats.
#[must_use]
pub fn parse_dob(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DOB_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Kind of a play-by-play event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PeriodStart,
    PeriodEnd,
    GameEnd,
    Goal,
    Shot,
    Miss,
    Block,
    Hit,
    Faceoff,
    Giveaway,
    Takeaway,
    Penalty,
    Stoppage,
    Other(String),
}

impl EventKind {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "PSTR" => Self::PeriodStart,
            "PEND" => Self::PeriodEnd,
            "GEND" => Self::GameEnd,
            "GOAL" => Self::Goal,
            "SHOT" => Self::Shot,
            "MISS" => Self::Miss,
            "BLOCK" => Self::Block,
            "HIT" => Self::Hit,
            "FAC" => Self::Faceoff,
            "GIVE" => Self::Giveaway,
            "TAKE" => Self::Takeaway,
            "PENL" => Self::Penalty,
            "STOP" => Self::Stoppage,
            other => Self::Other(other.to_string()),
        }
    }

    /// Report code of this kind.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::PeriodStart => "PSTR",
            Self::PeriodEnd => "PEND",
            Self::GameEnd => "GEND",
            Self::Goal => "GOAL",
            Self::Shot => "SHOT",
            Self::Miss => "MISS",
            Self::Block => "BLOCK",
            Self::Hit => "HIT",
            Self::Faceoff => "FAC",
            Self::Giveaway => "GIVE",
            Self::Takeaway => "TAKE",
            Self::Penalty => "PENL",
            Self::Stoppage => "STOP",
            Self::Other(code) => code,
        }
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// Playing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goalie,
    Other(String),
}

impl Position {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "C" => Self::Center,
            "L" => Self::LeftWing,
            "R" => Self::RightWing,
            "D" => Self::Defense,
            "G" => Self::Goalie,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Center => "C",
            Self::LeftWing => "L",
            Self::RightWing => "R",
            Self::Defense => "D",
            Self::Goalie => "G",
            Self::Other(code) => code,
        }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// A player on ice during an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skater {
    pub number: Option<u32>,
    pub position: Position,
}

impl From<&OnIcePlayer> for Skater {
    fn from(player: &OnIcePlayer) -> Self {
        Self {
            number: player.number.trim().parse().ok(),
            position: Position::from_code(player.position.trim()),
        }
    }
}

/// A play-by-play event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEntry {
    pub period: u8,
    /// Seconds elapsed in the period.
    pub elapsed_secs: u32,
    pub kind: EventKind,
    pub description: String,
    pub away: Vec<Skater>,
    pub home: Vec<Skater>,
}

impl TryFrom<&EventRecord> for EventEntry {
    type Error = CollectorError;

    fn try_from(event: &EventRecord) -> Result<Self> {
        let period = event.period.trim().parse().map_err(|_| {
            CollectorError::extraction(
                EventLog::NAME,
                format!("unreadable period '{}'", event.period),
            )
        })?;

        Ok(Self {
            period,
            elapsed_secs: parse_elapsed(&event.elapsed)?,
            kind: EventKind::from_code(event.event.trim()),
            description: event.description.clone(),
            away: event.away.iter().map(Skater::from).collect(),
            home: event.home.iter().map(Skater::from).collect(),
        })
    }
}

/// Seconds in an `M:SS` period clock reading.
pub fn parse_elapsed(text: &str) -> Result<u32> {
    let invalid = || {
        CollectorError::extraction(EventLog::NAME, format!("unreadable elapsed time '{text}'"))
    };

    let (minutes, seconds) = text.trim().split_once(':').ok_or_else(invalid)?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
    if seconds >= 60 {
        return Err(invalid());
    }
    minutes
        .checked_mul(60)
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Normalize every event of a game, stopping at the first malformed one.
pub fn normalize_events(events: &[EventRecord]) -> Result<Vec<EventEntry>> {
    events.iter().map(EventEntry::try_from).collect()
}
