pub mod captcha;
pub mod extract;
pub mod lookup;
pub mod normalize;
pub mod orchestrator;
pub mod strategies;

pub use crate::domain::model::{
    BirthData, ChartResponse, ChartResult, NormalizedLocation, StrategyAttempt, StrategyOutcome,
};
pub use crate::domain::ports::{ChartStrategy, Extractor};
pub use crate::utils::error::Result;
pub use orchestrator::{FallbackOrchestrator, OrchestratorState};
