//! Database access layer: the connection handle, the one-shot query path,
//! and the manual prepared-statement surface.

mod database;
mod params;
mod rows;
mod statement;

pub use database::{Database, ReportMode};
pub use params::{convert_params, convert_single_param};
pub use rows::{sqlite_to_json, QueryOutcome, ResultSet, Row};
pub use statement::Statement;
