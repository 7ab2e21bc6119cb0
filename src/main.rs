//! Retirement Auto-Save CLI
//!
//! Command-line interface for round-ups, validation, and returns projection
//! over an expense CSV (`timestamp,amount`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use retirement_autosave::{
    periods::RuleSet,
    returns::{FundKind, InvestorProfile, ReturnsEngine},
    transactions::{build_transactions, load_expenses, validate_transactions, TransactionTotals},
    ReturnsConfig,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "autosave", version, about = "Round-up retirement savings calculator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFund {
    Nps,
    Index,
}

impl From<CliFund> for FundKind {
    fn from(value: CliFund) -> Self {
        match value {
            CliFund::Nps => FundKind::Nps,
            CliFund::Index => FundKind::Index,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Round up every expense and print transactions with totals
    Parse { expenses: PathBuf },

    /// Build transactions and split them into valid / invalid / duplicate
    Validate { expenses: PathBuf },

    /// Project savings per k window into a fund
    Returns {
        expenses: PathBuf,
        #[arg(long)]
        age: i32,
        /// Annual wage
        #[arg(long)]
        wage: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO)]
        inflation: Decimal,
        #[arg(long, value_enum, default_value_t = CliFund::Nps)]
        fund: CliFund,
        /// JSON file with optional q, p, and k arrays
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn load_rules(path: &Path) -> Result<RuleSet> {
    let file = File::open(path).with_context(|| format!("opening rules file {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("parsing rules file {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { expenses } => {
            let expenses = load_expenses(&expenses).context("loading expenses")?;
            let transactions = build_transactions(&expenses)?;
            let totals = TransactionTotals::of(&transactions);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "transactions": transactions,
                    "totals": totals,
                }))?
            );
        }
        Command::Validate { expenses } => {
            let expenses = load_expenses(&expenses).context("loading expenses")?;
            let transactions = build_transactions(&expenses)?;
            let report = validate_transactions(&transactions);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Returns {
            expenses,
            age,
            wage,
            inflation,
            fund,
            rules,
        } => {
            let expenses = load_expenses(&expenses).context("loading expenses")?;
            let transactions = build_transactions(&expenses)?;
            let rules = match rules {
                Some(path) => load_rules(&path)?,
                None => RuleSet::default(),
            };

            let engine = ReturnsEngine::new(ReturnsConfig::from_env()?);
            let investor = InvestorProfile::new(age, wage, inflation);
            let report = engine.savings_by_windows(&investor, fund.into(), &rules, &transactions)?;
            println!("{}", serde_json::to_string_pretty(&report.rounded())?);
        }
    }

    Ok(())
}
