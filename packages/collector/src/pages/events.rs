//! HTML play-by-play report: every event of a game with the players on ice.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::collector::Page;
use crate::config::{events_url, validate_report_id};
use crate::document::{ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::html::{
    find_child, leading_text, row_cells, selector, table_rows, text_content, NBSP,
};
use crate::types::{EventRecord, OnIcePlayer, Season};

/// Event code closing a game.
pub const GAME_END: &str = "GEND";

/// Cells per event row: number, period, strength, time, event, description,
/// away on ice, home on ice.
const EVENT_CELLS: usize = 8;

selector!(EVENT_ROWS, r#"tr[class="evenColor"]"#);
selector!(ROWS, "tr");

/// `Game End- Local time: 5:42 EDT`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static GAME_END_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Game End-\s*Local time:\s*([0-9]{1,2}):([0-9]{2})\s*([A-Z]{3})\b")
        .expect("valid regex")
});

/// Play-by-play report of one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    season: Season,
    report_id: String,
}

impl EventLog {
    /// Report for a season code and report id (e.g. `20132014`, `021014`).
    pub fn new(season: &str, report_id: &str) -> Result<Self> {
        let season = Season::parse(season)?;
        validate_report_id(report_id)?;
        Ok(Self {
            season,
            report_id: report_id.to_string(),
        })
    }

    #[must_use]
    pub fn report_id(&self) -> &str {
        &self.report_id
    }
}

impl Page for EventLog {
    type Output = Vec<EventRecord>;
    const NAME: &'static str = "events";
    const KIND: ContentKind = ContentKind::Markup;

    fn url(&self) -> String {
        events_url(self.season.as_str(), &self.report_id)
    }

    fn verify(&self, document: &Document) -> Result<()> {
        let html = document.markup()?;
        if html.select(&ROWS).any(is_event_header) {
            Ok(())
        } else {
            Err(CollectorError::unexpected(
                Self::NAME,
                "header row with Event, Description and two On Ice columns",
                "no play-by-play header",
            ))
        }
    }

    fn extract(&self, document: &Document) -> Result<Vec<EventRecord>> {
        parse_events(document.markup()?)
    }
}

/// Parse every event row of a play-by-play report, in document order.
pub fn parse_events(html: &Html) -> Result<Vec<EventRecord>> {
    html.select(&EVENT_ROWS).map(parse_event).collect()
}

fn parse_event(row: ElementRef<'_>) -> Result<EventRecord> {
    let cells: Vec<ElementRef<'_>> = row_cells(row).collect();
    if cells.len() < EVENT_CELLS {
        return Err(CollectorError::extraction(
            EventLog::NAME,
            format!("event row with {} cells, expected {EVENT_CELLS}", cells.len()),
        ));
    }
    let text = |index: usize| {
        leading_text(cells[index])
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    };

    Ok(EventRecord {
        period: text(1),
        elapsed: text(3),
        event: text(4),
        description: text(5),
        away: on_ice(cells[6])?,
        home: on_ice(cells[7])?,
    })
}

/// Players listed in an on-ice cell. Padding cells hold only a non-breaking
/// space and are dropped.
fn on_ice(cell: ElementRef<'_>) -> Result<Vec<OnIcePlayer>> {
    let Some(table) = find_child(cell, "table") else {
        return Ok(Vec::new());
    };

    table_rows(table)
        .flat_map(row_cells)
        .filter(|player| !text_content(*player).contains(NBSP))
        .map(on_ice_player)
        .collect()
}

/// A player cell holds a small table: jersey number, then position.
fn on_ice_player(cell: ElementRef<'_>) -> Result<OnIcePlayer> {
    let values: Vec<String> = find_child(cell, "table")
        .into_iter()
        .flat_map(table_rows)
        .flat_map(row_cells)
        .map(|value| text_content(value).trim().to_string())
        .collect();

    match values.as_slice() {
        [number, position, ..] => Ok(OnIcePlayer::new(number.as_str(), position.as_str())),
        _ => Err(CollectorError::extraction(
            EventLog::NAME,
            format!("on-ice player cell without number and position: {values:?}"),
        )),
    }
}

fn is_event_header(row: ElementRef<'_>) -> bool {
    let labels: Vec<String> = row_cells(row)
        .map(|cell| text_content(cell).trim().to_string())
        .collect();
    let on_ice = labels.iter().filter(|label| label.ends_with("On Ice")).count();
    labels.iter().any(|label| label == "Event")
        && labels.iter().any(|label| label == "Description")
        && on_ice == 2
}

/// Instant a game ended, read from its `GEND` event.
pub fn game_end_of(events: &[EventRecord], start: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let event = events
        .iter()
        .rev()
        .find(|event| event.event == GAME_END)
        .ok_or_else(|| CollectorError::extraction(EventLog::NAME, "no game end event"))?;
    game_end(&event.description, start)
}

/// Parse the wall-clock end time of a game from its end event description.
///
/// The report prints a 12-hour time without AM/PM in the arena's zone. The
/// end is taken as the first reading at or after the game's start.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use nhlstats_collector::pages::events::game_end;
///
/// let start = Utc.with_ymd_and_hms(2014, 3, 16, 19, 0, 0).unwrap();
/// let end = game_end("Game End- Local time: 5:42 EDT", start).unwrap();
/// assert_eq!(end, Utc.with_ymd_and_hms(2014, 3, 16, 21, 42, 0).unwrap());
///
/// assert!(game_end("Game End", start).is_err());
/// ```
pub fn game_end(description: &str, start: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let invalid = |reason: &str| {
        CollectorError::extraction(EventLog::NAME, format!("{reason} in '{description}'"))
    };

    let captures = GAME_END_PATTERN
        .captures(description)
        .ok_or_else(|| invalid("no game end time"))?;
    let hour: u32 = captures[1].parse().map_err(|_| invalid("unreadable hour"))?;
    let minute: u32 = captures[2].parse().map_err(|_| invalid("unreadable minute"))?;
    let zone = zone_offset(&captures[3]).ok_or_else(|| invalid("unknown timezone"))?;
    if !(1..=12).contains(&hour) {
        return Err(invalid("hour out of range"));
    }

    let local_start_date = start.with_timezone(&zone).date_naive();
    let mut candidates = Vec::with_capacity(4);
    for day in 0..2 {
        for clock_hour in [hour % 12, hour % 12 + 12] {
            let time = NaiveTime::from_hms_opt(clock_hour, minute, 0)
                .ok_or_else(|| invalid("minute out of range"))?;
            let local = (local_start_date + Duration::days(day)).and_time(time);
            if let Some(instant) = zone.from_local_datetime(&local).single() {
                candidates.push(instant.with_timezone(&Utc));
            }
        }
    }

    candidates
        .into_iter()
        .filter(|instant| *instant >= start)
        .min()
        .ok_or_else(|| invalid("end time before game start"))
}

/// UTC offset of a North American zone abbreviation.
fn zone_offset(abbreviation: &str) -> Option<FixedOffset> {
    let hours = match abbreviation {
        "EST" | "CDT" => -5,
        "EDT" => -4,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::load;

    const HEADER: &str = r#"<tr><td class="heading">#</td><td class="heading">Per</td><td class="heading">Str</td><td class="heading">Time:<br>Elapsed<br>Game</td><td class="heading">Event</td><td class="heading">Description</td><td class="heading">TOR On Ice</td><td class="heading">WSH On Ice</td></tr>"#;

    fn player(number: &str, position: &str) -> String {
        format!(
            r#"<td><table><tr><td>{number}</td></tr><tr><td>{position}</td></tr></table></td><td>&nbsp;</td>"#
        )
    }

    fn on_ice_cell(players: &[(&str, &str)]) -> String {
        let cells: String = players.iter().map(|(n, p)| player(n, p)).collect();
        if cells.is_empty() {
            "<td>&nbsp;</td>".to_string()
        } else {
            format!("<td><table><tr>{cells}</tr></table></td>")
        }
    }

    fn event(
        period: &str,
        time: &str,
        code: &str,
        description: &str,
        away: &[(&str, &str)],
        home: &[(&str, &str)],
    ) -> String {
        format!(
            r#"<tr class="evenColor"><td>1</td><td>{period}</td><td>EV</td><td>{time}<br>20:00</td><td>{code}</td><td>{description}</td>{}{}</tr>"#,
            on_ice_cell(away),
            on_ice_cell(home)
        )
    }

    fn report(rows: &[String]) -> String {
        format!(
            "<html><body><table>{HEADER}{}</table></body></html>",
            rows.join("")
        )
    }

    fn document(html: &str) -> Document {
        load(html.as_bytes(), ContentKind::Markup).unwrap()
    }

    #[test]
    fn test_extract_events() {
        let html = report(&[
            event("1", "0:00", "PSTR", "Period Start- Local time: 3:08 EDT", &[], &[]),
            event(
                "1",
                "4:21",
                "GOAL",
                "WSH #8 OVECHKIN(35), Wrist, Off. Zone",
                &[("41", "L"), ("15", "D")],
                &[("92", "C"), ("8", "L"), ("41", "G")],
            ),
            event("3", "20:00", "GEND", "Game End- Local time: 5:42 EDT", &[], &[]),
        ]);
        let log = EventLog::new("20132014", "021014").unwrap();
        let document = document(&html);
        log.verify(&document).unwrap();
        let events = log.extract(&document).unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].event, "PSTR");
        assert_eq!(events[0].elapsed, "0:00");
        assert_eq!(events[0].description, "Period Start- Local time: 3:08 EDT");
        assert!(events[0].away.is_empty());

        assert_eq!(
            events[1].away,
            vec![OnIcePlayer::new("41", "L"), OnIcePlayer::new("15", "D")]
        );
        assert_eq!(events[1].home.len(), 3);
        assert!(events[1].home.contains(&OnIcePlayer::new("41", "G")));

        assert_eq!(events[2].period, "3");
        assert_eq!(events[2].elapsed, "20:00");
        assert_eq!(events[2].event, GAME_END);
    }

    #[test]
    fn test_verify_requires_header() {
        let log = EventLog::new("20132014", "021014").unwrap();
        let page = "<html><body><table><tr><td>x</td></tr></table></body></html>";
        let err = log.verify(&document(page)).unwrap_err();
        assert!(matches!(err, CollectorError::UnexpectedPageContents { page: "events", .. }));
    }

    #[test]
    fn test_short_event_row_is_hard_error() {
        let html = report(&[r#"<tr class="evenColor"><td>1</td><td>1</td></tr>"#.to_string()]);
        let err = parse_events(document(&html).markup().unwrap()).unwrap_err();
        assert!(matches!(err, CollectorError::Extraction { .. }));
    }

    #[test]
    fn test_game_end_afternoon_game() {
        let start = Utc.with_ymd_and_hms(2014, 3, 16, 19, 0, 0).unwrap();
        let end = game_end("Game End- Local time: 5:42 EDT", start).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2014, 3, 16, 21, 42, 0).unwrap());
    }

    #[test]
    fn test_game_end_past_midnight() {
        // 10:00 PM PST start, ends 12:41 AM the next day.
        let start = Utc.with_ymd_and_hms(2014, 1, 16, 6, 0, 0).unwrap();
        let end = game_end("Game End- Local time: 12:41 PST", start).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2014, 1, 16, 8, 41, 0).unwrap());
    }

    #[test]
    fn test_game_end_without_time_is_error() {
        let start = Utc.with_ymd_and_hms(2014, 3, 16, 19, 0, 0).unwrap();
        for description in [
            "Game End",
            "Game End- Local time: late EDT",
            "Game End- Local time: 5:42 XYZ",
        ] {
            let err = game_end(description, start).unwrap_err();
            assert!(matches!(err, CollectorError::Extraction { .. }), "{description}");
        }
    }

    #[test]
    fn test_game_end_from_events() {
        let html = report(&[
            event("1", "0:00", "PSTR", "Period Start- Local time: 7:08 EST", &[], &[]),
            event("3", "20:00", "GEND", "Game End- Local time: 9:35 EST", &[], &[]),
        ]);
        let events = parse_events(document(&html).markup().unwrap()).unwrap();
        let start = Utc.with_ymd_and_hms(2014, 1, 10, 0, 0, 0).unwrap();
        assert_eq!(
            game_end_of(&events, start).unwrap(),
            Utc.with_ymd_and_hms(2014, 1, 10, 2, 35, 0).unwrap()
        );
        assert!(game_end_of(&events[..1], start).is_err());
    }

    #[test]
    fn test_url() {
        let log = EventLog::new("20132014", "021014").unwrap();
        assert_eq!(log.url(), "http://www.nhl.com/scores/htmlreports/20132014/PL021014.HTM");
        assert!(EventLog::new("20132014", "02-1014").is_err());
    }
}
