use crate::domain::model::{BirthData, ChartResult, StrategyAttempt, StrategyOutcome};
use crate::domain::ports::ChartStrategy;
use crate::utils::error::{ChartError, Result};

/// Progress of one orchestrator run. Transitions are linear:
/// `Trying(i)` advances to `Trying(i + 1)` on a non-usable outcome,
/// to `Succeeded` on a usable result, and to `ExhaustedFailed` after
/// the last strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    NotStarted,
    Trying(usize),
    Succeeded,
    ExhaustedFailed,
}

/// Sequential fallback coordinator: tries strategies in a fixed priority
/// order, short-circuiting on the first usable `ChartResult`. Strategies
/// are never run concurrently — each one performs a real submission to a
/// rate-sensitive external service, and overlapping submissions must not
/// happen.
pub struct FallbackOrchestrator {
    strategies: Vec<Box<dyn ChartStrategy>>,
    state: OrchestratorState,
}

impl FallbackOrchestrator {
    pub fn new(strategies: Vec<Box<dyn ChartStrategy>>) -> Self {
        Self {
            strategies,
            state: OrchestratorState::NotStarted,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Run the chain for one birth-data request. On total failure, every
    /// strategy's reason is aggregated into one composite error so the
    /// caller can diagnose which layer broke.
    pub async fn run(&mut self, birth: &BirthData) -> Result<ChartResult> {
        let mut attempts: Vec<StrategyAttempt> = Vec::with_capacity(self.strategies.len());

        for (index, strategy) in self.strategies.iter().enumerate() {
            self.state = OrchestratorState::Trying(index);
            tracing::info!(
                "Trying strategy {}/{}: {}",
                index + 1,
                self.strategies.len(),
                strategy.name()
            );

            let outcome = strategy.submit(birth).await;
            strategy.close().await;

            match outcome {
                StrategyOutcome::Success(result) if result.is_usable() => {
                    tracing::info!("Strategy '{}' produced a usable chart", strategy.name());
                    self.state = OrchestratorState::Succeeded;
                    return Ok(result);
                }
                StrategyOutcome::Success(_) => {
                    tracing::warn!(
                        "Strategy '{}' returned an empty chart, trying next",
                        strategy.name()
                    );
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name().to_string(),
                        reason: ChartError::EmptyResult.to_string(),
                    });
                }
                StrategyOutcome::Failure(reason) => {
                    tracing::warn!("Strategy '{}' failed: {}", strategy.name(), reason);
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name().to_string(),
                        reason,
                    });
                }
            }
        }

        self.state = OrchestratorState::ExhaustedFailed;
        Err(ChartError::AllStrategiesExhausted { attempts })
    }
}
