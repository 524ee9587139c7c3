pub mod browser;
pub mod direct_api;
pub mod form_client;

pub use browser::BrowserStrategy;
pub use direct_api::DirectApiStrategy;
pub use form_client::{FormClientStrategy, TransportProfile};

use crate::config::Settings;
use crate::domain::ports::ChartStrategy;
use crate::utils::error::{ChartError, Result};

/// Default priority order: cheapest and most reliable first.
pub const DEFAULT_ORDER: &[&str] = &["direct-api", "browser", "form-standard", "form-hardened"];

/// Build the strategy chain in the configured priority order. Each
/// request gets its own chain instance so no mutable state is shared
/// across concurrent requests.
pub fn build_chain(settings: &Settings) -> Result<Vec<Box<dyn ChartStrategy>>> {
    let order: Vec<String> = settings
        .strategy_order
        .clone()
        .unwrap_or_else(|| DEFAULT_ORDER.iter().map(|s| s.to_string()).collect());

    let mut chain: Vec<Box<dyn ChartStrategy>> = Vec::with_capacity(order.len());
    for name in &order {
        let strategy: Box<dyn ChartStrategy> = match name.as_str() {
            "direct-api" => Box::new(DirectApiStrategy::new(settings)?),
            "browser" => Box::new(BrowserStrategy::new(settings)?),
            "form-standard" => {
                Box::new(FormClientStrategy::new(settings, TransportProfile::Standard)?)
            }
            "form-hardened" => {
                Box::new(FormClientStrategy::new(settings, TransportProfile::Hardened)?)
            }
            other => {
                return Err(ChartError::Config {
                    message: format!("unknown strategy '{}' in strategy_order", other),
                })
            }
        };
        chain.push(strategy);
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_has_four_strategies_in_priority_order() {
        let settings = Settings::default();
        let chain = build_chain(&settings).unwrap();
        let names: Vec<&str> = chain.iter().map(|s| s.name()).collect();
        assert_eq!(names, DEFAULT_ORDER);
    }

    #[test]
    fn configured_order_is_respected() {
        let mut settings = Settings::default();
        settings.strategy_order = Some(vec![
            "form-standard".to_string(),
            "direct-api".to_string(),
        ]);
        let chain = build_chain(&settings).unwrap();
        let names: Vec<&str> = chain.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["form-standard", "direct-api"]);
    }

    #[test]
    fn unknown_strategy_name_is_rejected() {
        let mut settings = Settings::default();
        settings.strategy_order = Some(vec!["carrier-pigeon".to_string()]);
        assert!(build_chain(&settings).is_err());
    }
}
