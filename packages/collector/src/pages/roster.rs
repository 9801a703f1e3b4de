//! Team roster.

use scraper::ElementRef;

use crate::collector::Page;
use crate::config::{roster_url, team_site_url, validate_team_code};
use crate::document::{ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::html::{
    find_child, has_class, leading_text, row_cells, selector, table_rows, text_content,
};
use crate::types::RosterEntry;

/// Number of header rows: one each for forwards, defensemen and goalies.
const HEADER_ROWS: usize = 3;

selector!(ROSTER_TABLE, r#"table[class="data"]"#);

/// Roster page of one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    team: String,
}

impl Roster {
    /// Roster of a team, identified by its nhl.com sub-domain (e.g. `ducks`).
    pub fn new(team: &str) -> Result<Self> {
        validate_team_code(team)?;
        Ok(Self {
            team: team.to_string(),
        })
    }

    #[must_use]
    pub fn team(&self) -> &str {
        &self.team
    }

    fn parse_row(&self, row: ElementRef<'_>) -> Result<RosterEntry> {
        let cells: Vec<ElementRef<'_>> = row_cells(row).collect();
        let cell_text = |index: usize, field: &str| -> Result<String> {
            cells
                .get(index)
                .map(|cell| text_content(*cell).trim().to_string())
                .ok_or_else(|| self.missing(field))
        };

        let number = cells
            .iter()
            .find_map(|cell| find_child(*cell, "span").filter(|span| has_class(*span, "sweaterNo")))
            .map(|span| text_content(span).trim().to_string())
            .ok_or_else(|| self.missing("sweater number"))?;
        let link = cells
            .iter()
            .find_map(|cell| find_child(*cell, "nobr").and_then(|nobr| find_child(nobr, "a")))
            .ok_or_else(|| self.missing("player link"))?;
        let name = leading_text(link)
            .map(|name| name.trim().to_string())
            .ok_or_else(|| self.missing("player name"))?;
        let href = link
            .value()
            .attr("href")
            .ok_or_else(|| self.missing("player profile"))?;

        Ok(RosterEntry {
            number,
            name,
            url: format!("{}{href}", team_site_url(&self.team)),
            height: cell_text(2, "height")?,
            weight: cell_text(3, "weight")?,
            dob: cell_text(4, "date of birth")?,
            hometown: cell_text(6, "hometown")?,
        })
    }

    fn missing(&self, field: &str) -> CollectorError {
        CollectorError::extraction(
            Self::NAME,
            format!("roster row of {} without {field}", self.team),
        )
    }
}

impl Page for Roster {
    type Output = Vec<RosterEntry>;
    const NAME: &'static str = "roster";
    const KIND: ContentKind = ContentKind::Markup;

    fn url(&self) -> String {
        roster_url(&self.team)
    }

    fn verify(&self, document: &Document) -> Result<()> {
        let html = document.markup()?;
        let labels: Vec<String> = html
            .select(&ROSTER_TABLE)
            .flat_map(table_rows)
            .filter(|row| is_header(*row))
            .filter_map(|row| row_cells(row).nth(1))
            .filter_map(|cell| find_child(cell, "a"))
            .map(|link| text_content(link).trim().to_string())
            .collect();

        let name_first = labels.first().is_some_and(|label| label.contains("Name"));
        if labels.len() == HEADER_ROWS && name_first {
            Ok(())
        } else {
            Err(CollectorError::unexpected(
                Self::NAME,
                format!("{HEADER_ROWS} header rows labelled Name"),
                format!("header labels {labels:?}"),
            ))
        }
    }

    fn extract(&self, document: &Document) -> Result<Vec<RosterEntry>> {
        let html = document.markup()?;
        html.select(&ROSTER_TABLE)
            .flat_map(table_rows)
            .filter(|row| is_player_row(*row))
            .map(|row| self.parse_row(row))
            .collect()
    }
}

fn is_header(row: ElementRef<'_>) -> bool {
    row.value().attr("class") == Some("hdr")
}

/// Player rows carry a striping class; header rows are classed `hdr` and
/// spacer rows carry no class.
fn is_player_row(row: ElementRef<'_>) -> bool {
    row.value().attr("class").is_some_and(|class| class != "hdr")
}
