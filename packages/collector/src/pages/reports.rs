//! Game report ids, read from the game center links of the schedule.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

use crate::collector::Page;
use crate::document::{ContentKind, Document};
use crate::error::Result;
use crate::html::{find_children, has_class, row_cells};
use crate::pages::schedule::{verify_schedule_table, Schedule};
use crate::types::{GameReportRecord, ReportKind};

/// Game center link. Group 1 is the link kind, group 2 the report id that
/// follows the four digit season year.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static GAME_LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://www\.nhl\.com/gamecenter/en/(recap|preview)\?id=[0-9]{4}([0-9]+)")
        .expect("valid regex")
});

/// Schedule games that have a report id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReports {
    schedule: Schedule,
}

impl GameReports {
    /// Report ids for a season code and game type name.
    pub fn new(season: &str, game_type: &str) -> Result<Self> {
        Ok(Self::from_schedule(Schedule::new(season, game_type)?))
    }

    #[must_use]
    pub fn from_schedule(schedule: Schedule) -> Self {
        Self { schedule }
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

impl Page for GameReports {
    type Output = Vec<GameReportRecord>;
    const NAME: &'static str = "game reports";
    const KIND: ContentKind = ContentKind::Markup;

    fn url(&self) -> String {
        self.schedule.url()
    }

    fn verify(&self, document: &Document) -> Result<()> {
        verify_schedule_table(Self::NAME, document.markup()?)
    }

    fn extract(&self, document: &Document) -> Result<Vec<GameReportRecord>> {
        let html = document.markup()?;
        let mut reports = Vec::new();

        for row in self.schedule.rows(html) {
            let Some(game) = self.schedule.parse_row(row)? else {
                continue;
            };
            match report_link(row) {
                Some((report_kind, report_id)) => reports.push(GameReportRecord {
                    game,
                    report_id,
                    report_kind,
                }),
                None => {
                    tracing::debug!(
                        date = %game.date,
                        home = %game.home,
                        road = %game.road,
                        "No report link yet"
                    );
                }
            }
        }

        Ok(reports)
    }
}

/// Kind and report id of the first game center link in a row.
fn report_link(row: ElementRef<'_>) -> Option<(ReportKind, String)> {
    row_cells(row)
        .filter(|cell| has_class(*cell, "skedLinks"))
        .flat_map(|cell| find_children(cell, "a"))
        .filter_map(|link| link.value().attr("href"))
        .find_map(parse_report_link)
}

/// Parse a game center link into its kind and report id.
///
/// # Examples
/// ```
/// use nhlstats_collector::pages::reports::parse_report_link;
/// use nhlstats_collector::types::ReportKind;
///
/// assert_eq!(
///     parse_report_link("http://www.nhl.com/gamecenter/en/recap?id=2013021014"),
///     Some((ReportKind::Recap, "021014".to_string()))
/// );
/// assert_eq!(parse_report_link("http://www.nhl.com/ice/tickets.htm"), None);
/// ```
#[must_use]
pub fn parse_report_link(href: &str) -> Option<(ReportKind, String)> {
    let captures = GAME_LINK_PATTERN.captures(href)?;
    let kind = match captures.get(1)?.as_str() {
        "recap" => ReportKind::Recap,
        _ => ReportKind::Preview,
    };
    Some((kind, captures.get(2)?.as_str().to_string()))
}
