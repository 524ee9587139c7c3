use crate::domain::model::{BirthData, ChartResult, StrategyOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One self-contained way of obtaining chart data from the external system.
///
/// Contract: `submit` never panics and never propagates an error; every
/// failure mode surfaces as `StrategyOutcome::Failure`. Each call is
/// independently retryable — no mutable state leaks between calls. `close`
/// releases any held resource (browser session, client pool) and must be
/// safe to call on every exit path, success or failure.
#[async_trait]
pub trait ChartStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn submit(&self, birth: &BirthData) -> StrategyOutcome;

    async fn close(&self) {}
}

/// Turns one strategy's raw payload into the canonical `ChartResult`.
///
/// Implementations are stateless: extracting the same payload twice yields
/// structurally equal results. A payload recognized as a hard failure page
/// returns `ChartError::Extraction`, never a silently empty result.
pub trait Extractor: Send + Sync {
    fn extract(&self, raw: &str) -> Result<ChartResult>;
}
