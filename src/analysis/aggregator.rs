/// Rolls per-transaction and per-wallet results into the analysis report

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::info;

use crate::cache::TransactionCache;
use crate::client::TransactionSource;
use crate::config::AnalyzerConfig;
use crate::core::{TraderCategory, Transaction, ValuedTransaction};

use super::categorizer::TraderCategorizer;
use super::classifier::{
    ActivityVolumes, ClassifierState, PatternCounters, PricePoint, VolumeClassifier,
    VolumeDistribution,
};
use super::fetcher::TransactionFetcher;

/// Price movement over the analysis window, from swap-implied prices
#[derive(Debug, Clone, Serialize)]
pub struct PriceMetrics {
    pub start_price: f64,
    pub end_price: f64,
    pub change_pct: f64,
    /// Sample standard deviation of observed prices
    pub volatility: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Share-of-volume impact figures
#[derive(Debug, Clone, Serialize)]
pub struct MarketImpact {
    pub avg_trade_size: f64,
    pub large_tx_share_pct: f64,
    pub bot_volume_pct: f64,
    pub flash_loan_volume_pct: f64,
}

/// Compact view of one of the newest transactions
#[derive(Debug, Clone, Serialize)]
pub struct RecentTransaction {
    pub tx_type: String,
    pub description: String,
    pub amount: f64,
    pub timestamp: i64,
    pub wallet: String,
    pub success: bool,
}

/// Sole output contract of an analysis run
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub token: String,
    pub window_minutes: u64,
    pub transaction_count: usize,
    pub active_wallets: usize,
    /// Transactions per second over the window
    pub trading_velocity: f64,
    pub total_volume: f64,
    pub distribution: VolumeDistribution,
    pub patterns: PatternCounters,
    pub activity: ActivityVolumes,
    pub wallet_categories: HashMap<String, TraderCategory>,
    /// Top wallets by transaction count
    pub suspicious_wallets: Vec<(String, usize)>,
    pub price_metrics: Option<PriceMetrics>,
    pub market_impact: MarketImpact,
    pub recent_transactions: Vec<RecentTransaction>,
    /// Per-transaction list for downstream consumers
    pub transactions: Vec<ValuedTransaction>,
}

impl AnalysisReport {
    /// Wallet counts per category, in priority order
    pub fn category_counts(&self) -> [(TraderCategory, usize); 5] {
        TraderCategory::ALL.map(|category| {
            let wallets = self
                .wallet_categories
                .values()
                .filter(|c| **c == category)
                .count();
            (category, wallets)
        })
    }
}

pub struct TokenAnalyzer<S, C> {
    fetcher: TransactionFetcher<S, C>,
    config: AnalyzerConfig,
}

impl<S: TransactionSource, C: TransactionCache> TokenAnalyzer<S, C> {
    pub fn new(source: S, cache: C, config: AnalyzerConfig) -> Self {
        Self {
            fetcher: TransactionFetcher::new(source, cache, config.fetch.clone()),
            config,
        }
    }

    /// Analyze recent activity for a token. `None` means no transactions
    /// inside the window; an empty market, not a failure.
    pub async fn analyze(&self, mint: &str, minutes: u64) -> Option<AnalysisReport> {
        let transactions = self.fetcher.fetch_window(mint, minutes).await;
        if transactions.is_empty() {
            info!("📭 No transactions for {} in the last {} minutes", mint, minutes);
            return None;
        }

        info!(
            "📊 Analyzing {} transactions for {} over {} minutes",
            transactions.len(),
            mint,
            minutes
        );

        let classifier = VolumeClassifier::new(
            mint,
            self.config.buckets.clone(),
            self.config.patterns.clone(),
        );
        let categorizer = TraderCategorizer::new(self.config.categorizer.clone());

        let mut state = ClassifierState::default();
        let mut valued = Vec::with_capacity(transactions.len());
        let mut wallet_transactions: HashMap<String, Vec<ValuedTransaction>> = HashMap::new();
        let mut active_wallets: HashSet<String> = HashSet::new();
        let mut recent = Vec::with_capacity(transactions.len());

        for tx in &transactions {
            let v = classifier.classify(tx, &mut state);
            active_wallets.insert(v.wallet.clone());
            wallet_transactions
                .entry(v.wallet.clone())
                .or_default()
                .push(v.clone());
            recent.push(Self::recent_view(tx, &v));
            valued.push(v);
        }

        classifier.finalize(&mut state, &wallet_transactions);

        let wallet_categories: HashMap<String, TraderCategory> = wallet_transactions
            .into_iter()
            .map(|(wallet, txs)| {
                let profile = categorizer.build_profile(&wallet, txs);
                let category = categorizer.categorize(&profile);
                (wallet, category)
            })
            .collect();

        let mut wallet_counts: HashMap<&str, usize> = HashMap::new();
        for v in &valued {
            *wallet_counts.entry(v.wallet.as_str()).or_default() += 1;
        }
        let mut suspicious: Vec<(String, usize)> = wallet_counts
            .into_iter()
            .map(|(w, n)| (w.to_string(), n))
            .collect();
        suspicious.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        suspicious.truncate(5);

        recent.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
        recent.truncate(5);

        let transaction_count = valued.len();
        let total_volume = state.total_volume;
        let market_impact = MarketImpact {
            avg_trade_size: total_volume / transaction_count as f64,
            large_tx_share_pct: 100.0
                * valued
                    .iter()
                    .filter(|v| v.amount > self.config.patterns.large_transfer_floor)
                    .count() as f64
                / transaction_count as f64,
            bot_volume_pct: share_pct(state.activity.bot_trades, total_volume),
            flash_loan_volume_pct: share_pct(state.activity.flash_loans, total_volume),
        };

        Some(AnalysisReport {
            token: mint.to_string(),
            window_minutes: minutes,
            transaction_count,
            active_wallets: active_wallets.len(),
            trading_velocity: transaction_count as f64 / (minutes * 60) as f64,
            total_volume,
            distribution: state.distribution,
            patterns: state.patterns,
            activity: state.activity,
            wallet_categories,
            suspicious_wallets: suspicious,
            price_metrics: price_metrics(state.price_points),
            market_impact,
            recent_transactions: recent,
            transactions: valued,
        })
    }

    fn recent_view(tx: &Transaction, valued: &ValuedTransaction) -> RecentTransaction {
        RecentTransaction {
            tx_type: tx.tx_type.to_lowercase(),
            description: tx.description.clone(),
            amount: valued.amount,
            timestamp: tx.timestamp,
            wallet: tx.fee_payer.clone(),
            success: tx.succeeded(),
        }
    }
}

fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

fn price_metrics(mut points: Vec<PricePoint>) -> Option<PriceMetrics> {
    if points.is_empty() {
        return None;
    }
    points.sort_by_key(|p| p.timestamp);

    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    let start_price = prices[0];
    let end_price = prices[prices.len() - 1];
    let change_pct = if start_price > 0.0 {
        (end_price - start_price) / start_price * 100.0
    } else {
        0.0
    };

    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(PriceMetrics {
        start_price,
        end_price,
        change_pct,
        volatility: sample_stdev(&prices),
        min_price,
        max_price,
    })
}

fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
