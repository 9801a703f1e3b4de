//! League team index. The schedule mixes in exhibition opponents, so the
//! list of league teams comes from the site menu instead.

use scraper::ElementRef;

use crate::collector::Page;
use crate::config::teams_url;
use crate::document::{ContentKind, Document};
use crate::error::{CollectorError, Result};
use crate::html::selector;
use crate::types::TeamLink;

selector!(TEAM_MENU_LINKS, "div#teamMenu a");

/// The team index page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teams;

impl Page for Teams {
    type Output = Vec<TeamLink>;
    const NAME: &'static str = "teams";
    const KIND: ContentKind = ContentKind::Markup;

    fn url(&self) -> String {
        teams_url()
    }

    fn verify(&self, document: &Document) -> Result<()> {
        let links = document.markup()?.select(&TEAM_MENU_LINKS).count();
        if links > 1 {
            Ok(())
        } else {
            Err(CollectorError::unexpected(
                Self::NAME,
                "team menu with team links",
                format!("{links} menu links"),
            ))
        }
    }

    fn extract(&self, document: &Document) -> Result<Vec<TeamLink>> {
        document
            .markup()?
            .select(&TEAM_MENU_LINKS)
            // The first link is the league logo.
            .skip(1)
            .map(team_link)
            .collect()
    }
}

fn team_link(link: ElementRef<'_>) -> Result<TeamLink> {
    let attr = |name: &str| {
        link.value().attr(name).map(str::to_string).ok_or_else(|| {
            CollectorError::extraction(Teams::NAME, format!("team menu link without {name}"))
        })
    };
    Ok(TeamLink {
        name: attr("title")?,
        url: attr("href")?,
    })
}
