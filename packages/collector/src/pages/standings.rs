//! Division standings: which conference and division each team plays in.

use scraper::{ElementRef, Html};

use crate::collector::Page;
use crate::config::standings_url;
use crate::document::{ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::html::{
    ancestor, find_child, preceding_sibling, row_cells, selector, tag_name, text_content,
};
use crate::types::{Season, Standings};

/// Class prefix of the conference marker; the rest of the class is the name.
const CONFERENCE_PREFIX: &str = "conferenceHeader";

// Current teams are the second link in their cell (the first wraps the logo).
// Defunct teams have no team page and are plain spans.
selector!(
    TEAM_NAMES,
    r#"td[style="text-align:left;"] > a:nth-of-type(2), span.team"#
);
selector!(SEASON_HEADER, r#"div[class="sectionHeader"] > h3"#);

/// Standings page for one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonStandings {
    season: Season,
}

impl SeasonStandings {
    /// Standings for a season code, e.g. `20132014`.
    pub fn new(season: &str) -> Result<Self> {
        Ok(Self {
            season: Season::parse(season)?,
        })
    }

    #[must_use]
    pub fn season(&self) -> &Season {
        &self.season
    }
}

impl Page for SeasonStandings {
    type Output = Standings;
    const NAME: &'static str = "standings";
    const KIND: ContentKind = ContentKind::Markup;

    fn url(&self) -> String {
        standings_url(self.season.as_str())
    }

    fn verify(&self, document: &Document) -> Result<()> {
        let html = document.markup()?;
        let expected = self.season.header();
        let found = html
            .select(&SEASON_HEADER)
            .next()
            .map(|h3| text_content(h3).trim().to_string());

        match found {
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(CollectorError::unexpected(
                Self::NAME,
                format!("{expected} season"),
                format!("{found} season"),
            )),
            None => Err(CollectorError::unexpected(
                Self::NAME,
                format!("{expected} season"),
                "no season header",
            )),
        }
    }

    fn extract(&self, document: &Document) -> Result<Standings> {
        parse_standings(document.markup()?)
    }
}

/// Group every team on the page under its conference and division.
pub fn parse_standings(html: &Html) -> Result<Standings> {
    let mut standings = Standings::default();

    for node in html.select(&TEAM_NAMES) {
        let team = text_content(node).trim().to_string();
        if team.is_empty() {
            continue;
        }
        let division = division_of(node).ok_or_else(|| {
            CollectorError::extraction(
                SeasonStandings::NAME,
                format!("no division header above team '{team}'"),
            )
        })?;
        let conference = conference_of(node).ok_or_else(|| {
            CollectorError::extraction(
                SeasonStandings::NAME,
                format!("no conference marker above team '{team}'"),
            )
        })?;
        standings.insert(conference, division, team);
    }

    Ok(standings)
}

/// Division heading of the row group a team sits in.
fn division_of(team: ElementRef<'_>) -> Option<String> {
    let body = ancestor(team, "tbody")?;
    let head = preceding_sibling(body, |e| tag_name(e) == "thead")?;
    let header_row = find_child(head, "tr")?;
    row_cells(header_row)
        .find(|cell| cell.value().attr("abbr") == Some("DIV"))
        .map(|cell| text_content(cell).trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Conference marker closest above the team's table.
fn conference_of(team: ElementRef<'_>) -> Option<String> {
    let table = ancestor(team, "table")?;
    let marker = preceding_sibling(table, |e| {
        tag_name(e) == "div"
            && e.value()
                .attr("class")
                .is_some_and(|class| class.starts_with(CONFERENCE_PREFIX))
    })?;
    let class = marker.value().attr("class")?;
    let name = class.replacen(CONFERENCE_PREFIX, "", 1).trim().to_string();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::load;

    const PAGE: &str = r#"<html><body>
<div class="sectionHeader"><h3> 2013-2014 </h3></div>
<div class="conferenceHeaderEastern">Eastern Conference</div>
<table class="data standings">
  <thead><tr><th>#</th><th abbr="DIV">Atlantic</th><th abbr="GP">GP</th></tr></thead>
  <tbody>
    <tr><td>1</td><td style="text-align:left;"><a href="/ice/bos"><img src="b.png"></a><a href="/ice/bos">Boston</a></td><td>82</td></tr>
    <tr><td>2</td><td style="text-align:left;"><a href="/ice/tbl"><img src="t.png"></a><a href="/ice/tbl">Tampa Bay</a></td><td>82</td></tr>
  </tbody>
  <thead><tr><th>#</th><th abbr="DIV">Metropolitan</th><th abbr="GP">GP</th></tr></thead>
  <tbody>
    <tr><td>1</td><td style="text-align:left;"><a href="/ice/pit"><img src="p.png"></a><a href="/ice/pit">Pittsburgh</a></td><td>82</td></tr>
  </tbody>
</table>
<div class="conferenceHeaderWestern">Western Conference</div>
<table class="data standings">
  <thead><tr><th>#</th><th abbr="DIV">Pacific</th><th abbr="GP">GP</th></tr></thead>
  <tbody>
    <tr><td>1</td><td style="text-align:left;"><a href="/ice/ana"><img src="a.png"></a><a href="/ice/ana">Anaheim</a></td><td>82</td></tr>
    <tr><td>2</td><td style="text-align:left;"><span class="team">Phoenix</span></td><td>82</td></tr>
  </tbody>
</table>
</body></html>"#;

    fn document(page: &str) -> Document {
        load(page.as_bytes(), ContentKind::Markup).unwrap()
    }

    #[test]
    fn test_verify_matching_season() {
        let standings = SeasonStandings::new("20132014").unwrap();
        assert!(standings.verify(&document(PAGE)).is_ok());
    }

    #[test]
    fn test_verify_other_season() {
        let standings = SeasonStandings::new("30003001").unwrap();
        let err = standings.verify(&document(PAGE)).unwrap_err();
        match err {
            CollectorError::UnexpectedPageContents { expected, found, .. } => {
                assert_eq!(expected, "3000-3001 season");
                assert_eq!(found, "2013-2014 season");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_missing_header() {
        let standings = SeasonStandings::new("20132014").unwrap();
        let err = standings
            .verify(&document("<html><body><p>Maintenance</p></body></html>"))
            .unwrap_err();
        assert!(err.to_string().contains("no season header"));
    }

    #[test]
    fn test_extract_groups_teams() {
        let standings = SeasonStandings::new("20132014").unwrap();
        let result = standings.extract(&document(PAGE)).unwrap();

        assert_eq!(result.conferences().collect::<Vec<_>>(), ["Eastern", "Western"]);
        assert_eq!(result.teams("Eastern", "Atlantic").unwrap(), ["Boston", "Tampa Bay"]);
        assert_eq!(result.teams("Eastern", "Metropolitan").unwrap(), ["Pittsburgh"]);
        assert_eq!(result.teams("Western", "Pacific").unwrap(), ["Anaheim", "Phoenix"]);
        assert_eq!(result.team_count(), 5);
    }

    #[test]
    fn test_extract_latin1_team_name() {
        let page = PAGE
            .replace("<html>", r#"<html><head><meta charset="iso-8859-1"></head>"#)
            .replace("Tampa Bay", "Montr\u{e9}al");
        let bytes: Vec<u8> = page.chars().map(|c| u8::try_from(u32::from(c)).unwrap()).collect();

        let standings = SeasonStandings::new("20132014").unwrap();
        let document = load(&bytes, ContentKind::Markup).unwrap();
        let result = standings.extract(&document).unwrap();
        assert_eq!(result.teams("Eastern", "Atlantic").unwrap(), ["Boston", "Montr\u{e9}al"]);
    }

    #[test]
    fn test_extract_team_without_division_fails() {
        let page = r#"<html><body><div class="conferenceHeaderEastern"></div>
<table><tbody><tr><td style="text-align:left;"><a></a><a>Boston</a></td></tr></tbody></table>
</body></html>"#;
        let standings = SeasonStandings::new("20132014").unwrap();
        let err = standings.extract(&document(page)).unwrap_err();
        assert!(matches!(err, CollectorError::Extraction { page: "standings", .. }));
    }

    #[test]
    fn test_invalid_season_rejected() {
        assert!(matches!(
            SeasonStandings::new("2013"),
            Err(CollectorError::InvalidSeason(_))
        ));
    }
}
