//! JSON play-by-play feed with rink coordinates.

use serde_json::Value;

use crate::collector::Page;
use crate::config::{event_locations_url, validate_report_id};
use crate::document::{ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::types::{EventLocations, Play, Season};

/// Location feed of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayLocations {
    season: Season,
    report_id: String,
}

impl PlayLocations {
    pub fn new(season: &str, report_id: &str) -> Result<Self> {
        let season = Season::parse(season)?;
        validate_report_id(report_id)?;
        Ok(Self {
            season,
            report_id: report_id.to_string(),
        })
    }
}

impl Page for PlayLocations {
    type Output = EventLocations;
    const NAME: &'static str = "event locations";
    const KIND: ContentKind = ContentKind::Json;

    fn url(&self) -> String {
        event_locations_url(self.season.as_str(), &self.report_id)
    }

    fn verify(&self, document: &Document) -> Result<()> {
        let value = document.json()?;
        if value.get("data").is_some() {
            Ok(())
        } else {
            Err(CollectorError::unexpected(
                Self::NAME,
                "top-level data section",
                "no data section",
            ))
        }
    }

    fn extract(&self, document: &Document) -> Result<EventLocations> {
        let game = document
            .json()?
            .pointer("/data/game")
            .ok_or_else(|| missing("data.game"))?;

        let plays = game
            .pointer("/plays/play")
            .ok_or_else(|| missing("data.game.plays.play"))?;
        let plays: Vec<Play> = serde_json::from_value(plays.clone()).map_err(|e| {
            CollectorError::extraction(Self::NAME, format!("malformed play list: {e}"))
        })?;

        Ok(EventLocations {
            home: team_name(game, "hometeamname")?,
            away: team_name(game, "awayteamname")?,
            plays,
        })
    }
}

fn team_name(game: &Value, field: &str) -> Result<String> {
    game.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(&format!("data.game.{field}")))
}

fn missing(path: &str) -> CollectorError {
    CollectorError::extraction(PlayLocations::NAME, format!("missing {path}"))
}
