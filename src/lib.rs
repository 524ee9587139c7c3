pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{CliConfig, Settings};
pub use core::{FallbackOrchestrator, OrchestratorState};
pub use domain::model::{
    BirthData, ChartResponse, ChartResult, NormalizedLocation, StrategyAttempt, StrategyOutcome,
};
pub use domain::ports::{ChartStrategy, Extractor};
pub use utils::error::{ChartError, Result};
