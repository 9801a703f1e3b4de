//! Configuration, URL templates and input validation for the collector.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{CollectorError, Result};
use crate::types::GameType;

/// Base URL for league pages on nhl.com.
pub const NHL_BASE_URL: &str = "http://www.nhl.com";

/// Base URL for the live game data feed.
pub const LIVE_BASE_URL: &str = "http://live.nhl.com";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// User agent string identifying this collector.
pub const USER_AGENT: &str = concat!("nhlstats-collector/", env!("CARGO_PKG_VERSION"));

/// Season pattern: two concatenated four digit years.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SEASON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{8}$").expect("valid regex"));

/// Team code pattern: the team's nhl.com sub-domain.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TEAM_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+$").expect("valid regex"));

/// Report id pattern.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REPORT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid regex"));

/// Settings consumed by the cache store and HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Directory holding one file per cached URL.
    pub cache_dir: PathBuf,

    /// When true, a cached copy is served no matter how old it is.
    /// When false, every resolve fetches and overwrites the cached copy.
    pub use_cache: bool,

    /// Timeout applied to each HTTP request.
    pub timeout_secs: u64,

    /// User agent sent with each HTTP request.
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            use_cache: true,
            timeout_secs: HTTP_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl CollectorConfig {
    /// Create a configuration using the given cache directory.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..Self::default()
        }
    }

    /// Set whether cached copies are served without re-fetching.
    #[must_use]
    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// Validate a season code.
///
/// # Arguments
/// * `season` - Eight digit season code, e.g. `20132014`
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(CollectorError::InvalidSeason)` if invalid
///
/// # Examples
/// ```
/// use nhlstats_collector::config::validate_season;
///
/// assert!(validate_season("20132014").is_ok());
/// assert!(validate_season("2013-2014").is_err());
/// ```
pub fn validate_season(season: &str) -> Result<()> {
    if SEASON_PATTERN.is_match(season) {
        Ok(())
    } else {
        Err(CollectorError::InvalidSeason(season.to_string()))
    }
}

/// Validate a game type name and return the matching [`GameType`].
///
/// # Arguments
/// * `game_type` - One of `Preseason`, `Regular`, `Postseason`
///
/// # Returns
/// * `Ok(GameType)` if valid
/// * `Err(CollectorError::InvalidGameType)` for any other name
///
/// # Examples
/// ```
/// use nhlstats_collector::config::validate_game_type;
/// use nhlstats_collector::types::GameType;
///
/// assert_eq!(validate_game_type("Postseason").unwrap(), GameType::Postseason);
/// assert!(validate_game_type("Playoffs").is_err());
/// ```
pub fn validate_game_type(game_type: &str) -> Result<GameType> {
    match game_type {
        "Preseason" => Ok(GameType::Preseason),
        "Regular" => Ok(GameType::Regular),
        "Postseason" => Ok(GameType::Postseason),
        _ => Err(CollectorError::InvalidGameType(game_type.to_string())),
    }
}

/// Validate a team code (the team's nhl.com sub-domain, e.g. `capitals`).
///
/// # Returns
/// * `Ok(())` if the code is lowercase ASCII letters
/// * `Err(CollectorError::InvalidTeamCode)` otherwise
pub fn validate_team_code(team: &str) -> Result<()> {
    if TEAM_CODE_PATTERN.is_match(team) {
        Ok(())
    } else {
        Err(CollectorError::InvalidTeamCode(team.to_string()))
    }
}

/// Validate a game report id.
///
/// # Returns
/// * `Ok(())` if the id is one or more ASCII digits
/// * `Err(CollectorError::InvalidReportId)` otherwise
pub fn validate_report_id(report_id: &str) -> Result<()> {
    if REPORT_ID_PATTERN.is_match(report_id) {
        Ok(())
    } else {
        Err(CollectorError::InvalidReportId(report_id.to_string()))
    }
}

/// Build the division standings URL for a season.
///
/// # Arguments
/// * `season` - Season code (should be validated with `validate_season` first)
///
/// # Panics
/// Debug builds panic if season doesn't match the expected format.
pub fn standings_url(season: &str) -> String {
    debug_assert!(
        SEASON_PATTERN.is_match(season),
        "season should be validated before calling standings_url"
    );
    format!("{NHL_BASE_URL}/ice/standings.htm?season={season}&type=DIV")
}

/// Build the schedule URL for a season and game type.
///
/// # Arguments
/// * `season` - Season code (should be validated with `validate_season` first)
/// * `game_type` - Game type, sent as its numeric index
///
/// # Panics
/// Debug builds panic if season doesn't match the expected format.
pub fn schedule_url(season: &str, game_type: GameType) -> String {
    debug_assert!(
        SEASON_PATTERN.is_match(season),
        "season should be validated before calling schedule_url"
    );
    format!(
        "{NHL_BASE_URL}/ice/schedulebyseason.htm?season={season}&gameType={}&team=&network=&venue=",
        game_type.index()
    )
}

/// Build the team index URL.
pub fn teams_url() -> String {
    format!("{NHL_BASE_URL}/ice/teams.htm")
}

/// Build the site root of a team, used to absolutize roster links.
pub fn team_site_url(team: &str) -> String {
    debug_assert!(
        TEAM_CODE_PATTERN.is_match(team),
        "team should be validated before calling team_site_url"
    );
    format!("http://{team}.nhl.com")
}

/// Build the roster URL for a team.
pub fn roster_url(team: &str) -> String {
    format!("{}/club/roster.htm", team_site_url(team))
}

/// Build the HTML play-by-play report URL.
///
/// # Arguments
/// * `season` - Season code (should be validated with `validate_season` first)
/// * `report_id` - Report id (should be validated with `validate_report_id` first)
///
/// # Panics
/// Debug builds panic if inputs don't match expected formats.
pub fn events_url(season: &str, report_id: &str) -> String {
    debug_assert!(
        SEASON_PATTERN.is_match(season) && REPORT_ID_PATTERN.is_match(report_id),
        "season and report id should be validated before calling events_url"
    );
    format!("{NHL_BASE_URL}/scores/htmlreports/{season}/PL{report_id}.HTM")
}

/// Build the JSON play-by-play URL. The game id is the season's first year
/// followed by the report id.
pub fn event_locations_url(season: &str, report_id: &str) -> String {
    debug_assert!(
        SEASON_PATTERN.is_match(season) && REPORT_ID_PATTERN.is_match(report_id),
        "season and report id should be validated before calling event_locations_url"
    );
    let first_year = &season[..4];
    format!("{LIVE_BASE_URL}/GameData/{season}/{first_year}{report_id}/PlayByPlay.json")
}
