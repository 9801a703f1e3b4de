//! Season schedule.
//!
//! The schedule lists exhibition games against non-league teams (Olympic
//! teams, for instance) next to league games. Those rows are skipped.

use chrono::{NaiveDate, NaiveTime};
use scraper::{ElementRef, Html};

use crate::collector::{eastern_to_utc, Page};
use crate::config::{schedule_url, validate_game_type};
use crate::document::{ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::html::{
    child_elements, find_child, has_class, leading_text, row_cells, selector, text_content, NBSP,
};
use crate::types::{GameType, ScheduleRecord, Season};

/// Date format of the date cell, e.g. `Sun Mar 16, 2014`.
const DATE_FORMAT: &str = "%a %b %d, %Y";

/// Time format of the time cell once the zone suffix is removed, e.g. `3:00 PM`.
const TIME_FORMAT: &str = "%I:%M %p";

/// Marker in the time cell for games without an announced start time.
const TIME_TBD: &str = "TBD";

selector!(SCHEDULE_ROWS, r#"table[class="data schedTbl"] > tbody > tr"#);

/// Schedule page for one season and game type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    season: Season,
    game_type: GameType,
}

impl Schedule {
    /// Schedule for a season code and game type name (`Preseason`, `Regular`
    /// or `Postseason`).
    pub fn new(season: &str, game_type: &str) -> Result<Self> {
        let season = Season::parse(season)?;
        let game_type = validate_game_type(game_type)?;
        Ok(Self::with_game_type(season, game_type))
    }

    /// Schedule for an already validated season and game type.
    #[must_use]
    pub fn with_game_type(season: Season, game_type: GameType) -> Self {
        Self { season, game_type }
    }

    #[must_use]
    pub fn season(&self) -> &Season {
        &self.season
    }

    #[must_use]
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    /// Schedule rows of the page, in document order.
    pub(crate) fn rows<'a>(&self, html: &'a Html) -> impl Iterator<Item = ElementRef<'a>> {
        html.select(&SCHEDULE_ROWS)
    }

    /// Parse one schedule row.
    ///
    /// Returns `None` for header rows and games involving a non-league team.
    pub(crate) fn parse_row(&self, row: ElementRef<'_>) -> Result<Option<ScheduleRecord>> {
        let teams = team_labels(row);
        if teams.len() != 2 {
            return Ok(None);
        }
        if teams.iter().any(|team| team.contains(NBSP)) {
            tracing::debug!(
                road = %teams[0],
                home = %teams[1],
                "Skipping game with a non-league team"
            );
            return Ok(None);
        }

        let date_text = cell_div_text(row, "date", "skedStartDateSite")
            .ok_or_else(|| self.row_error("game row without a date", &teams))?;
        let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|e| {
            CollectorError::extraction(Self::NAME, format!("unreadable date '{date_text}': {e}"))
        })?;

        let start = match self.start_time(row, &teams)? {
            Some(time) => Some(eastern_to_utc(date.and_time(time))?),
            None => None,
        };

        let [road, home] = <[String; 2]>::try_from(teams)
            .map_err(|_| CollectorError::extraction(Self::NAME, "expected two teams"))?;
        Ok(Some(ScheduleRecord {
            season: self.season.clone(),
            date,
            start,
            home: home.trim().to_string(),
            road: road.trim().to_string(),
            game_type: self.game_type,
        }))
    }

    /// Local start time, or `None` when it is still to be announced.
    fn start_time(&self, row: ElementRef<'_>, teams: &[String]) -> Result<Option<NaiveTime>> {
        let time_cell = row_cells(row)
            .find(|cell| has_class(*cell, "time"))
            .ok_or_else(|| self.row_error("game row without a time cell", teams))?;
        if text_content(time_cell).contains(TIME_TBD) {
            return Ok(None);
        }

        let time_text = cell_div_text(row, "time", "skedStartTimeEST")
            .ok_or_else(|| self.row_error("game row without a start time", teams))?;
        let time_text = time_text.replace("ET", "");
        let time_text = time_text.trim();
        NaiveTime::parse_from_str(time_text, TIME_FORMAT)
            .map(Some)
            .map_err(|e| {
                CollectorError::extraction(
                    Self::NAME,
                    format!("unreadable start time '{time_text}': {e}"),
                )
            })
    }

    fn row_error(&self, message: &str, teams: &[String]) -> CollectorError {
        CollectorError::extraction(Self::NAME, format!("{message} ({})", teams.join(" at ")))
    }
}

impl Page for Schedule {
    type Output = Vec<ScheduleRecord>;
    const NAME: &'static str = "schedule";
    const KIND: ContentKind = ContentKind::Markup;

    fn url(&self) -> String {
        schedule_url(self.season.as_str(), self.game_type)
    }

    fn verify(&self, document: &Document) -> Result<()> {
        verify_schedule_table(Self::NAME, document.markup()?)
    }

    fn extract(&self, document: &Document) -> Result<Vec<ScheduleRecord>> {
        let html = document.markup()?;
        let mut games = Vec::new();
        for row in self.rows(html) {
            if let Some(game) = self.parse_row(row)? {
                games.push(game);
            }
        }
        Ok(games)
    }
}

/// A schedule page must list at least one game. Pages for unknown seasons
/// keep the table but only carry a placeholder row.
pub(crate) fn verify_schedule_table(page: &'static str, html: &Html) -> Result<()> {
    let mut rows = html.select(&SCHEDULE_ROWS).peekable();
    if rows.peek().is_none() {
        return Err(CollectorError::unexpected(page, "schedule table rows", "no schedule table"));
    }
    if rows.any(|row| team_labels(row).len() == 2) {
        Ok(())
    } else {
        Err(CollectorError::unexpected(
            page,
            "schedule rows with two teams",
            "no scheduled games",
        ))
    }
}

/// Team labels of a row, untrimmed, in road-then-home order.
fn team_labels(row: ElementRef<'_>) -> Vec<String> {
    row_cells(row)
        .filter(|cell| has_class(*cell, "team"))
        .flat_map(child_elements)
        .filter(|div| has_class(*div, "teamName"))
        .filter_map(|div| match find_child(div, "a") {
            Some(link) => leading_text(link),
            None => leading_text(div),
        })
        .filter(|label| !label.trim().is_empty())
        .collect()
}

/// Trimmed text of `td.<cell_class> > div.<div_class>`.
fn cell_div_text(row: ElementRef<'_>, cell_class: &str, div_class: &str) -> Option<String> {
    row_cells(row)
        .filter(|cell| has_class(*cell, cell_class))
        .flat_map(child_elements)
        .find(|div| has_class(*div, div_class))
        .and_then(leading_text)
        .map(|text| text.trim().to_string())
}
