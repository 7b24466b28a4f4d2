pub mod archiver;
pub mod cli;
pub mod error;
pub mod export;
pub mod files;
pub mod formatter;
pub mod models;
pub mod settings;
pub mod slack;
pub mod status;
pub mod switches;

pub use archiver::run;
pub use cli::Cli;
pub use error::{AppError, Result};
pub use settings::Settings;
pub use status::Status;
pub use switches::DateFormat;
