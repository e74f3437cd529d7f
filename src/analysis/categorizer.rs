/// Wallet profiling and trader category assignment

use serde::Serialize;

use crate::config::CategorizerSettings;
use crate::core::{TraderCategory, ValuedTransaction};

/// Per-wallet aggregate built fresh each analysis run
#[derive(Debug, Clone, Serialize)]
pub struct WalletProfile {
    pub wallet: String,
    pub trade_count: usize,
    pub total_volume: f64,
    /// Mean of consecutive sorted-timestamp gaps, zero under two trades
    pub mean_gap_secs: f64,
    pub rapid_count: usize,
    pub rapid_fraction: f64,
    pub flash_loan_count: usize,
    pub high_slippage_fraction: f64,
    /// Share of trades above the large-trade floor
    pub large_trade_fraction: f64,
    pub transactions: Vec<ValuedTransaction>,
}

pub struct TraderCategorizer {
    settings: CategorizerSettings,
}

impl TraderCategorizer {
    pub fn new(settings: CategorizerSettings) -> Self {
        Self { settings }
    }

    pub fn build_profile(&self, wallet: &str, mut transactions: Vec<ValuedTransaction>) -> WalletProfile {
        transactions.sort_by_key(|tx| tx.timestamp);

        let trade_count = transactions.len();
        let total_volume: f64 = transactions.iter().map(|tx| tx.amount).sum();

        let mean_gap_secs = if trade_count < 2 {
            0.0
        } else {
            let gap_sum: i64 = transactions
                .windows(2)
                .map(|pair| pair[1].timestamp - pair[0].timestamp)
                .sum();
            gap_sum as f64 / (trade_count - 1) as f64
        };

        let rapid_count = transactions.iter().filter(|tx| tx.is_rapid).count();
        let flash_loan_count = transactions.iter().filter(|tx| tx.has_flash_loan).count();
        let high_slippage_count = transactions.iter().filter(|tx| tx.has_high_slippage).count();
        let large_trade_count = transactions
            .iter()
            .filter(|tx| tx.amount > self.settings.whale_large_trade)
            .count();

        let fraction = |count: usize| {
            if trade_count == 0 {
                0.0
            } else {
                count as f64 / trade_count as f64
            }
        };

        WalletProfile {
            wallet: wallet.to_string(),
            trade_count,
            total_volume,
            mean_gap_secs,
            rapid_count,
            rapid_fraction: fraction(rapid_count),
            flash_loan_count,
            high_slippage_fraction: fraction(high_slippage_count),
            large_trade_fraction: fraction(large_trade_count),
            transactions,
        }
    }

    /// Assign exactly one category, first matching rule wins. The priority
    /// order is a contract: a wallet meeting both the sniper and whale
    /// criteria is a sniper.
    pub fn categorize(&self, profile: &WalletProfile) -> TraderCategory {
        let s = &self.settings;

        if profile.trade_count > s.market_maker_min_trades
            && profile.mean_gap_secs < s.market_maker_max_gap_secs
        {
            if profile.rapid_fraction > s.market_maker_rapid_fraction {
                return TraderCategory::MarketMakingBot;
            }
            return TraderCategory::LargeMarketMaker;
        }

        if profile.rapid_count >= 1
            && profile.flash_loan_count >= 1
            && profile.high_slippage_fraction > s.sniper_slippage_fraction
        {
            return TraderCategory::SniperBot;
        }

        if profile.total_volume > s.whale_min_volume
            && profile.large_trade_fraction > s.whale_large_trade_fraction
        {
            return TraderCategory::Whale;
        }

        TraderCategory::Retail
    }
}
