use std::{collections::HashMap, error::Error, fs, path::Path, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine::{
    Currency, Debt, GroupingMode, MemberId, Money, RateTable, Trip, convert_amount,
    get_conversion_rate,
};
use serde::de::DeserializeOwned;

mod settings;

type AppResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Parser, Debug)]
#[command(name = "tripsplit")]
#[command(about = "Balances and settling transactions for shared trip expenses")]
struct Cli {
    /// Settings file (TOML, extension optional). Defaults to `settings`.
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print per-currency net balances as JSON.
    Balances(TripArgs),
    /// Print the settling transactions.
    Settle(SettleArgs),
    /// Convert an amount between currencies.
    Convert(ConvertArgs),
    /// List the currencies a rate provider must quote for a trip.
    RatesNeeded(RatesNeededArgs),
}

#[derive(Args, Debug)]
struct TripArgs {
    /// Trip snapshot (JSON).
    #[arg(long)]
    trip: PathBuf,
}

#[derive(Args, Debug)]
struct SettleArgs {
    #[command(flatten)]
    trip: TripArgs,
    /// Exchange-rate table (JSON `{target, rates}`).
    #[arg(long)]
    rates: Option<PathBuf>,
    /// Collapse all balances into this currency (overrides the trip setting).
    #[arg(long)]
    currency: Option<Currency>,
    /// Grouping resolution (overrides `ledger.grouping`).
    #[arg(long, value_enum)]
    grouping: Option<Grouping>,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Amount in major units of `from` (e.g. `12.50`).
    #[arg(long, allow_hyphen_values = true)]
    amount: String,
    #[arg(long)]
    from: Currency,
    #[arg(long)]
    to: Currency,
    /// Exchange-rate table (JSON `{target, rates}`).
    #[arg(long)]
    rates: PathBuf,
}

#[derive(Args, Debug)]
struct RatesNeededArgs {
    #[command(flatten)]
    trip: TripArgs,
    /// Pivot currency of the rate table to request.
    #[arg(long)]
    target: Currency,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Grouping {
    SingleLevel,
    Transitive,
}

impl From<Grouping> for GroupingMode {
    fn from(value: Grouping) -> Self {
        match value {
            Grouping::SingleLevel => GroupingMode::SingleLevel,
            Grouping::Transitive => GroupingMode::Transitive,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(cli.settings.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tripsplit={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Balances(args) => {
            let trip: Trip = read_json(&args.trip)?;
            println!("{}", serde_json::to_string_pretty(&trip.net_balances())?);
        }
        Command::Settle(args) => {
            let mut trip: Trip = read_json(&args.trip.trip)?;
            let rates = args
                .rates
                .as_deref()
                .map(read_json::<RateTable>)
                .transpose()?;
            if args.currency.is_some() {
                trip.settlement_currency = args.currency;
            }
            let grouping = args
                .grouping
                .map(GroupingMode::from)
                .unwrap_or(settings.ledger.grouping);

            let debts = trip.settle(rates.as_ref(), grouping)?;
            tracing::info!("{} settling transactions", debts.len());
            match args.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&debts)?),
                Format::Text => print_debts(&trip, &debts),
            }
        }
        Command::Convert(args) => {
            let rates: RateTable = read_json(&args.rates)?;
            let amount = Money::parse_major(&args.amount, &args.from)?;
            let rate = get_conversion_rate(&args.from, &args.to, &rates).ok_or_else(|| {
                format!(
                    "no rate from {} to {} in a table pivoting on {}",
                    args.from, args.to, rates.target
                )
            })?;
            let converted = convert_amount(amount, &args.from, &args.to, rate);
            println!(
                "{} = {}",
                amount.format_minor(&args.from),
                converted.format_minor(&args.to)
            );
        }
        Command::RatesNeeded(args) => {
            let trip: Trip = read_json(&args.trip.trip)?;
            for currency in trip.currencies_needing_rates(&args.target) {
                println!("{currency}");
            }
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let value = serde_json::from_str(&raw)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
    Ok(value)
}

fn print_debts(trip: &Trip, debts: &[Debt]) {
    if debts.is_empty() {
        println!("All settled.");
        return;
    }
    let names: HashMap<&MemberId, &str> = trip
        .members
        .iter()
        .map(|m| (&m.id, m.name.as_str()))
        .collect();
    let name = |id: &MemberId| -> String {
        names
            .get(id)
            .map_or_else(|| id.to_string(), |n| (*n).to_string())
    };
    for debt in debts {
        println!(
            "{} pays {} {}",
            name(&debt.from),
            name(&debt.to),
            debt.amount.format_minor(&debt.currency)
        );
    }
}
