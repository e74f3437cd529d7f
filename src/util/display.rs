/// Terminal rendering for analysis reports

use chrono::{DateTime, Utc};
use colored::Colorize;

use crate::analysis::AnalysisReport;
use crate::core::{TokenMetadata, VolumeBucket};

pub fn print_analysis_report(report: &AnalysisReport, metadata: Option<&TokenMetadata>) {
    println!("\n{} {}", "🔎", "TOKEN ACTIVITY REPORT".bold());
    println!("{}", "=".repeat(70));

    match metadata.and_then(|m| m.symbol.as_deref()) {
        Some(symbol) => println!("   Token: {} ({})", symbol.bold(), report.token),
        None => println!("   Token: {}", report.token.bold()),
    }
    if let Some(metadata) = metadata {
        println!("   Decimals: {}", metadata.decimals);
    }
    println!("   Window: last {} minutes", report.window_minutes);

    println!("\n{}", "📊 ACTIVITY:".bold());
    println!("   Transactions: {}", report.transaction_count);
    println!("   Active wallets: {}", report.active_wallets);
    println!("   Velocity: {:.4} tx/s", report.trading_velocity);
    println!("   Total volume: {:.4}", report.total_volume);
    println!("   Avg trade size: {:.4}", report.market_impact.avg_trade_size);

    println!("\n{}", "📦 VOLUME DISTRIBUTION:".bold());
    for bucket in VolumeBucket::ALL {
        let totals = report.distribution.get(bucket);
        if totals.count > 0 {
            let share = totals.count as f64 / report.transaction_count as f64 * 100.0;
            println!(
                "   {:<11} {:>6} txs ({:>5.1}%)  volume {:.4}",
                bucket.label(),
                totals.count,
                share,
                totals.amount
            );
        }
    }

    println!("\n{}", "🧭 TRADER CATEGORIES:".bold());
    for (category, wallets) in report.category_counts() {
        if wallets > 0 {
            println!("   {:<18} {} wallets", category.label(), wallets);
        }
    }

    let p = &report.patterns;
    if p.flash_loans + p.high_slippage + p.sandwich_attacks + p.wash_trades + p.bot_trades > 0 {
        println!("\n{}", "🚩 PATTERNS:".bold());
        print_pattern("rapid swaps", p.rapid_swaps);
        print_pattern("bot trades", p.bot_trades);
        print_pattern("flash loans", p.flash_loans);
        print_pattern("high slippage", p.high_slippage);
        print_pattern("sandwich shapes", p.sandwich_attacks);
        print_pattern("wash-trade shapes", p.wash_trades);
        print_pattern("arbitrage shapes", p.arbitrage);
    }

    if let Some(metrics) = &report.price_metrics {
        println!("\n{}", "💹 IMPLIED PRICE:".bold());
        println!("   Start: {:.8}   End: {:.8}", metrics.start_price, metrics.end_price);
        let change = format!("{:+.2}%", metrics.change_pct);
        let change = if metrics.change_pct >= 0.0 {
            change.green()
        } else {
            change.red()
        };
        println!("   Change: {}   Volatility: {:.8}", change, metrics.volatility);
        println!("   Range: {:.8} to {:.8}", metrics.min_price, metrics.max_price);
    }

    if !report.suspicious_wallets.is_empty() {
        println!("\n{}", "👀 MOST ACTIVE WALLETS:".bold());
        for (wallet, count) in &report.suspicious_wallets {
            let category = report
                .wallet_categories
                .get(wallet)
                .map(|c| c.label())
                .unwrap_or("retail");
            println!("   {} - {} txs ({})", wallet, count, category);
        }
    }

    if !report.recent_transactions.is_empty() {
        println!("\n{}", "🕘 RECENT:".bold());
        for tx in &report.recent_transactions {
            let when = DateTime::<Utc>::from_timestamp(tx.timestamp, 0)
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| tx.timestamp.to_string());
            let status = if tx.success { "✓".green() } else { "✗".red() };
            println!("   {} {} {:<9} {:.4} by {}", status, when, tx.tx_type, tx.amount, tx.wallet);
        }
    }

    println!("{}", "=".repeat(70));
}

fn print_pattern(label: &str, count: u64) {
    if count > 0 {
        println!("   {:<18} {}", label, count);
    }
}

pub fn print_no_data(mint: &str, minutes: u64) {
    println!(
        "\n{} No transactions found for {} in the last {} minutes",
        "📭",
        mint.bold(),
        minutes
    );
}
