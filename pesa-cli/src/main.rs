use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use pesa_budget::{
    PlanPolicy, SpendClass, average_monthly_income, compute_drafts, group_minor_categories,
    impact_analysis, months_to_target,
};
use pesa_core::{Budget, BudgetPeriod, PrimaryGoal, Transaction};
use pesa_enrich::{
    CategoryExample, EnrichmentCache, EventBus, HttpEnricher, JsonFileStore, Orchestrator,
    RemoteEnricher, ResolutionSource,
};

mod config;
mod importer;
mod state;

#[derive(Parser, Debug)]
#[command(name = "pesa", version, about = "Statement import, enrichment and budget planning")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a bank or mobile-money CSV statement
    Import {
        /// Path to the CSV export
        file: PathBuf,

        /// Account label for the imported rows
        #[arg(long, default_value = "main")]
        account: String,
    },

    /// Resolve merchants and categories for uncategorized transactions
    Enrich,

    /// Compute draft budgets and the plan's impact
    Plan {
        /// Merge non-savings categories below this share of total spend
        /// into "Other Minor Expenses" (e.g. 0.05)
        #[arg(long)]
        group_minor: Option<f64>,

        /// Persist the drafts as monthly budgets
        #[arg(long)]
        accept: bool,
    },

    /// Spot-check cached categories against the remote service
    Verify {
        /// Maximum cache entries to check
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show loyalty-points balances seen in imported statements
    Loyalty,

    /// Show or update the planning profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Set the primary goal (save-more, invest, pay-debt, control-spending,
    /// travel, buy-asset) and an optional savings target
    SetGoal {
        goal: String,

        #[arg(long)]
        target: Option<f64>,
    },

    Show,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.pesa/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Import { file, account } => {
            let summary = importer::import_file(&file, &account)?;
            println!("Imported {} transactions into account {account}", summary.imported);
            if summary.transfers > 0 {
                println!("Marked {} own-account transfers", summary.transfers);
            }
            if let Some(points) = summary.points_balance {
                println!("Loyalty balance seen on statement: {points}");
            }
            println!("Next: pesa enrich");
        }

        Command::Enrich => run_enrich().await?,

        Command::Plan {
            group_minor,
            accept,
        } => run_plan(group_minor, accept)?,

        Command::Verify { limit } => run_verify(limit).await?,

        Command::Loyalty => {
            let balances = state::read_loyalty()?;
            if balances.is_empty() {
                println!("No loyalty balances recorded yet");
            }
            for (account, points) in &balances {
                println!("{account}: {points} points");
            }
        }

        Command::Profile { command } => match command {
            ProfileCommand::SetGoal { goal, target } => {
                let primary_goal = parse_goal(&goal)?;
                let mut profile = state::read_profile()?;
                profile.primary_goal = primary_goal;
                if target.is_some() {
                    profile.target_amount = target;
                }
                state::write_profile(&profile)?;
                println!("Profile updated");
            }
            ProfileCommand::Show => {
                let profile = state::read_profile()?;
                println!("Primary goal: {:?}", profile.primary_goal);
                match profile.target_amount {
                    Some(t) => println!("Savings target: {t:.2}"),
                    None => println!("Savings target: none"),
                }
            }
        },

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}

fn parse_goal(s: &str) -> Result<PrimaryGoal> {
    Ok(match s {
        "save-more" => PrimaryGoal::SaveMore,
        "invest" => PrimaryGoal::Invest,
        "pay-debt" => PrimaryGoal::PayDebt,
        "control-spending" => PrimaryGoal::ControlSpending,
        "travel" => PrimaryGoal::Travel,
        "buy-asset" => PrimaryGoal::BuyAsset,
        _ => bail!(
            "unknown goal '{s}' (expected save-more, invest, pay-debt, control-spending, travel or buy-asset)"
        ),
    })
}

/// Already-categorized transactions become examples that bias the remote
/// model toward the user's own labels, one per category.
fn learned_examples(txns: &[Transaction]) -> Vec<CategoryExample> {
    let mut seen = std::collections::HashSet::new();
    let mut examples = Vec::new();
    for t in txns {
        if t.category.is_empty() || t.merchant.is_empty() {
            continue;
        }
        if seen.insert(t.category.clone()) {
            examples.push(CategoryExample {
                description: t.description.clone(),
                merchant: t.merchant.clone(),
                category: t.category.clone(),
            });
        }
        if examples.len() >= 10 {
            break;
        }
    }
    examples
}

async fn run_enrich() -> Result<()> {
    let cfg = config::load_config()?;
    let enricher = HttpEnricher::new(cfg.enricher_config()?, cfg.retry_policy())?;

    let home = state::ensure_pesa_home()?;
    let mut cache = EnrichmentCache::new(JsonFileStore::new(&home));
    cache.load()?;

    let mut events = EventBus::new();
    events.subscribe(|e| println!("  learned {} -> {} ({})", e.cache_key, e.merchant, e.category));

    let mut txns = state::read_transactions()?;
    let examples = learned_examples(&txns);
    let pending_slots: Vec<usize> = txns
        .iter()
        .enumerate()
        .filter(|(_, t)| t.category.is_empty())
        .map(|(i, _)| i)
        .collect();

    if pending_slots.is_empty() {
        println!("Nothing to enrich");
        return Ok(());
    }

    let pending: Vec<Transaction> = pending_slots.iter().map(|&i| txns[i].clone()).collect();
    let mut orch = Orchestrator::new(&mut cache, &enricher, &mut events);
    let resolved = orch.enrich_all(&pending, &examples).await;

    let mut local = 0;
    let mut remote = 0;
    let mut degraded = 0;
    for (&slot, r) in pending_slots.iter().zip(&resolved) {
        match r.source {
            ResolutionSource::RuleTable | ResolutionSource::Cache => local += 1,
            ResolutionSource::Remote => remote += 1,
            ResolutionSource::Fallback => degraded += 1,
        }
        txns[slot].merchant = r.txn.merchant.clone();
        txns[slot].category = r.txn.category.clone();
    }
    state::write_transactions(&txns)?;

    println!(
        "Enriched {} transactions ({local} locally, {remote} via remote, {degraded} degraded)",
        resolved.len()
    );
    if degraded > 0 {
        println!("Degraded items kept category \"Other\"; re-run pesa enrich to retry");
    }
    Ok(())
}

fn run_plan(group_minor: Option<f64>, accept: bool) -> Result<()> {
    let txns = state::read_transactions()?;
    if txns.is_empty() {
        bail!("no transactions; run pesa import first");
    }
    let budgets = state::read_budgets()?;
    let profile = state::read_profile()?;
    let policy = PlanPolicy::default();

    let mut drafts = compute_drafts(&txns, &budgets, &profile, &policy);
    if let Some(share) = group_minor {
        drafts = group_minor_categories(drafts, share);
    }

    println!("# Draft budgets ({:?})\n", profile.primary_goal);
    for d in &drafts {
        let marker = if d.class == SpendClass::Savings { " [savings]" } else { "" };
        println!(
            "{:<24} avg {:>10.2}  limit {:>10.2}  {:<10} {:>10}  vol {:.2}{marker}",
            d.category,
            d.average,
            d.limit,
            format!("[{:?}]", d.strategy).to_lowercase(),
            d.frequency.label(),
            d.volatility,
        );
    }

    let income = average_monthly_income(&txns);
    let report = impact_analysis(&drafts, income, &policy);
    println!("\nNew total budget: {:.2}", report.new_total_budget);
    println!("Planned net savings: {:.2}", report.planned_net_savings);
    println!("Freed-up cash: {:.2}", report.freed_up_cash);

    for cut in &report.risky_cuts {
        println!(
            "Risky cut: {} at {:.2} ({})",
            cut.category,
            cut.limit,
            match cut.reason {
                pesa_budget::RiskReason::BelowHistoricalMin => "below cheapest observed month",
                pesa_budget::RiskReason::DeepCutOnRecurring => "deep cut on a recurring bill",
            }
        );
    }

    match months_to_target(profile.target_amount, report.planned_net_savings) {
        Some(months) => println!("Months to savings target: {months}"),
        None => {
            if profile.target_amount.is_some() {
                println!("Savings target unreachable at the planned rate");
            }
        }
    }

    if accept {
        let accepted: Vec<Budget> = drafts
            .iter()
            .enumerate()
            .map(|(i, d)| {
                Budget::new(
                    format!("budget-{i:03}"),
                    &d.category,
                    d.limit,
                    BudgetPeriod::Monthly,
                    d.strategy,
                )
            })
            .collect();
        state::write_budgets(&accepted)?;
        println!("\nAccepted {} budgets", accepted.len());
    }
    Ok(())
}

async fn run_verify(limit: usize) -> Result<()> {
    let cfg = config::load_config()?;
    let enricher = HttpEnricher::new(cfg.enricher_config()?, cfg.retry_policy())?;

    let home = state::ensure_pesa_home()?;
    let mut cache = EnrichmentCache::new(JsonFileStore::new(&home));
    cache.load()?;

    if cache.is_empty() {
        println!("Enrichment cache is empty");
        return Ok(());
    }

    let mut checked = 0;
    let mut mismatches = 0;
    let entries: Vec<(String, String)> = cache
        .entries()
        .take(limit)
        .map(|(k, v)| (k.clone(), v.category.clone()))
        .collect();

    for (key, category) in entries {
        match enricher.validate_category(&key, &category).await {
            Ok(true) => {}
            Ok(false) => {
                mismatches += 1;
                println!("Mismatch: {key} is cached as {category}");
            }
            Err(e) => {
                tracing::warn!("validation unavailable for {key}: {e:#}");
                continue;
            }
        }
        checked += 1;
    }

    println!("Checked {checked} cached entries, {mismatches} possible mismatches");
    if mismatches > 0 {
        println!("Cached mappings never expire; edit the category on the transaction to correct");
    }
    Ok(())
}
