//! Core data types produced by the collector.
//!
//! Records mirror what the source pages print. Canonical, persistence-facing
//! shapes live in [`crate::normalize`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{validate_game_type, validate_season};
use crate::error::{CollectorError, Result};

/// A validated season code, e.g. `20132014`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Season(String);

impl Season {
    /// Validate and wrap a season code.
    ///
    /// # Examples
    /// ```
    /// use nhlstats_collector::types::Season;
    ///
    /// let season = Season::parse("20132014").unwrap();
    /// assert_eq!(season.header(), "2013-2014");
    /// assert!(Season::parse("2013").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<Self> {
        validate_season(code)?;
        Ok(Self(code.to_string()))
    }

    /// The raw 8 digit code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First year of the season, as printed in the code.
    #[must_use]
    pub fn first_year(&self) -> &str {
        &self.0[..4]
    }

    /// Second year of the season, as printed in the code.
    #[must_use]
    pub fn second_year(&self) -> &str {
        &self.0[4..]
    }

    /// Header form shown on standings pages, e.g. `2013-2014`.
    #[must_use]
    pub fn header(&self) -> String {
        format!("{}-{}", self.first_year(), self.second_year())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of game within a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    Preseason,
    Regular,
    Postseason,
}

impl GameType {
    /// All game types, in source order.
    pub const ALL: [GameType; 3] = [Self::Preseason, Self::Regular, Self::Postseason];

    /// Numeric index used by the schedule URL (1-based).
    #[must_use]
    pub fn index(&self) -> u8 {
        match self {
            Self::Preseason => 1,
            Self::Regular => 2,
            Self::Postseason => 3,
        }
    }

    /// Canonical short code used in normalized records.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Preseason => "PRE",
            Self::Regular => "REG",
            Self::Postseason => "POST",
        }
    }

    /// Name accepted by [`validate_game_type`].
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preseason => "Preseason",
            Self::Regular => "Regular",
            Self::Postseason => "Postseason",
        }
    }
}

impl FromStr for GameType {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        validate_game_type(s)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRecord {
    /// Season the game belongs to.
    pub season: Season,

    /// Calendar date of the game, as printed (local to the source).
    pub date: NaiveDate,

    /// Start instant, or `None` while the time is still to be announced.
    pub start: Option<DateTime<Utc>>,

    /// Home team label.
    pub home: String,

    /// Road (visiting) team label.
    pub road: String,

    /// Kind of game.
    pub game_type: GameType,
}

/// Which game center page a report link pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Recap,
    Preview,
}

/// A scheduled game together with its report id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameReportRecord {
    #[serde(flatten)]
    pub game: ScheduleRecord,

    /// Numeric report id, e.g. `021014`.
    pub report_id: String,

    /// Link kind the id was taken from.
    pub report_kind: ReportKind,
}

/// One row of a team roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub number: String,
    pub name: String,
    /// Absolute URL of the player's profile.
    pub url: String,
    pub height: String,
    pub weight: String,
    pub dob: String,
    pub hometown: String,
}

/// A player on the ice during an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnIcePlayer {
    /// Jersey number.
    pub number: String,
    /// Position letter, e.g. `C` or `D`.
    pub position: String,
}

impl OnIcePlayer {
    #[must_use]
    pub fn new(number: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            position: position.into(),
        }
    }
}

/// One row of the HTML play-by-play report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub period: String,
    /// Elapsed time in the period, e.g. `12:34`.
    pub elapsed: String,
    /// Event code, e.g. `GOAL`.
    pub event: String,
    pub description: String,
    pub away: Vec<OnIcePlayer>,
    pub home: Vec<OnIcePlayer>,
}

/// A team linked from the league team index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamLink {
    pub name: String,
    pub url: String,
}

/// Conference → division → teams, in document order within each division.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Standings(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl Standings {
    /// Attribute a team to a conference and division.
    pub fn insert(
        &mut self,
        conference: impl Into<String>,
        division: impl Into<String>,
        team: impl Into<String>,
    ) {
        self.0
            .entry(conference.into())
            .or_default()
            .entry(division.into())
            .or_default()
            .push(team.into());
    }

    /// Conference names.
    pub fn conferences(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Divisions of a conference.
    #[must_use]
    pub fn divisions(&self, conference: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.0.get(conference)
    }

    /// Teams of a division.
    #[must_use]
    pub fn teams(&self, conference: &str, division: &str) -> Option<&[String]> {
        self.0
            .get(conference)
            .and_then(|divisions| divisions.get(division))
            .map(Vec::as_slice)
    }

    /// Total number of attributed teams.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.0
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A play from the JSON play-by-play feed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Play {
    #[serde(rename = "desc")]
    pub description: String,
    #[serde(rename = "xcoord", default)]
    pub x: Option<i32>,
    #[serde(rename = "ycoord", default)]
    pub y: Option<i32>,
    #[serde(default)]
    pub period: Option<u8>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "playername", default)]
    pub player_name: Option<String>,
    #[serde(rename = "teamid", default)]
    pub team_id: Option<u32>,
}

/// Plays with rink coordinates for one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventLocations {
    pub home: String,
    pub away: String,
    pub plays: Vec<Play>,
}
