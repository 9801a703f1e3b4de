//! Page families.
//!
//! Each family implements [`Page`](crate::collector::Page): it knows the URL
//! of its document, checks that the document still has the layout the
//! extractor relies on, and turns it into records.
//!
//! - [`standings`]: conference and division of every team
//! - [`schedule`]: games of a season and game type
//! - [`reports`]: schedule games with their report id
//! - [`teams`]: league team index
//! - [`roster`]: players of one team
//! - [`events`]: HTML play-by-play with players on ice
//! - [`locations`]: JSON play-by-play with rink coordinates

pub mod events;
pub mod locations;
pub mod reports;
pub mod roster;
pub mod schedule;
pub mod standings;
pub mod teams;

pub use events::EventLog;
pub use locations::PlayLocations;
pub use reports::GameReports;
pub use roster::Roster;
pub use schedule::Schedule;
pub use standings::SeasonStandings;
pub use teams::Teams;
