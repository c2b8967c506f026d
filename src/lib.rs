pub mod analysis;
pub mod config;
pub mod display;
pub mod error;
pub mod names;
pub mod snapshot;

pub use analysis::champion::Champion;
pub use analysis::matchup::{ChampionId, ChampionKey, Role};
pub use analysis::roster::{Roster, ValidityFilter};
pub use error::AppError;
pub use snapshot::Snapshot;
