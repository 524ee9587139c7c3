pub mod cli;
pub mod settings;

pub use cli::CliConfig;
pub use settings::Settings;
