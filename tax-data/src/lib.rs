//! File formats for the tax engine: bracket schedules (CSV), policy
//! override files (TOML) and taxpayer input rows (CSV).

pub mod bracket_loader;
pub mod policy_file;
pub mod taxpayer_loader;

pub use bracket_loader::{BracketLoaderError, BracketRecord, BracketScheduleLoader};
pub use policy_file::PolicyFileError;
pub use taxpayer_loader::TaxpayerLoadError;
