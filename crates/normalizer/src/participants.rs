use configuration::PresentationSettings;

/// Decides which backtest agents are trading participants worth surfacing.
///
/// Matching is on the lower-cased agent id: it must start with an include prefix and with
/// no exclude prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingParticipantFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl TradingParticipantFilter {
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let lower = |s: &str| s.trim().to_lowercase();
        Self {
            include: include.into_iter().map(|p| lower(p.as_ref())).collect(),
            exclude: exclude.into_iter().map(|p| lower(p.as_ref())).collect(),
        }
    }

    pub fn from_settings(settings: &PresentationSettings) -> Self {
        Self::new(&settings.trading_agent_prefixes, &settings.excluded_agent_prefixes)
    }

    pub fn is_trading_participant(&self, agent_id: &str) -> bool {
        let id = agent_id.to_lowercase();
        self.include.iter().any(|p| id.starts_with(p.as_str()))
            && !self.exclude.iter().any(|p| id.starts_with(p.as_str()))
    }
}

impl Default for TradingParticipantFilter {
    fn default() -> Self {
        Self::from_settings(&PresentationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_conventions_keep_traders_and_drop_infrastructure() {
        let filter = TradingParticipantFilter::default();
        for kept in ["trader_1", "LLM_Agent_7", "momentum-fast", "mean_reversion_2", "arbitrage_x", "agent_42"] {
            assert!(filter.is_trading_participant(kept), "{kept} should be kept");
        }
        for dropped in ["market_maker_1", "oracle", "liquidity_provider", "noise_1", "MARKET_MAKER_trader"] {
            assert!(!filter.is_trading_participant(dropped), "{dropped} should be dropped");
        }
    }

    #[test]
    fn exclusions_beat_inclusions() {
        let filter = TradingParticipantFilter::new(["agent"], ["agent_mm"]);
        assert!(filter.is_trading_participant("Agent_1"));
        assert!(!filter.is_trading_participant("agent_mm_3"));
    }
}
