use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use lead_desk::error::AppError;
use lead_desk::workflows::leads::{LeadIntent, LeadProfile, LeadScoringEngine};
use lead_desk::workflows::quotes::{QuotePricingEngine, ServiceSpec};
use std::collections::BTreeSet;

#[derive(Parser, Debug)]
#[command(
    name = "Lead Desk",
    about = "Score leads, price panel work, and book crews from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a lead and print the breakdown as JSON
    Score(ScoreArgs),
    /// Price a job and print the bands as JSON
    Quote(QuoteArgs),
    /// Walk through scoring, pricing, and a contested booking against in-memory crews
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IntentArg {
    Book,
    Estimate,
    Contact,
}

impl From<IntentArg> for LeadIntent {
    fn from(value: IntentArg) -> Self {
        match value {
            IntentArg::Book => LeadIntent::Book,
            IntentArg::Estimate => LeadIntent::Estimate,
            IntentArg::Contact => LeadIntent::Contact,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Five-digit service zip
    #[arg(long)]
    zip: Option<String>,
    #[arg(long, value_enum, default_value = "estimate")]
    intent: IntentArg,
    /// Free-text service category, e.g. "panel upgrade"
    #[arg(long, default_value = "")]
    service: String,
    /// Budget range as entered on the form, e.g. "$3k-5k"
    #[arg(long, default_value = "")]
    budget: String,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Service size: 100, 150, or 200
    #[arg(long)]
    amps: u16,
    /// Feeder run from meter to panel in feet
    #[arg(long, default_value_t = 0)]
    run_length_feet: u32,
    #[arg(long, default_value_t = 0)]
    panel_spaces: u32,
    /// Add-on id, repeatable (e.g. --add-on ev_ready --add-on surge_protection)
    #[arg(long = "add-on")]
    add_ons: Vec<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Quote(args) => run_quote(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let profile = LeadProfile {
        zip: args.zip,
        intent: args.intent.into(),
        service_category: args.service,
        budget_range: args.budget,
        notes: args.notes,
    };
    let result = LeadScoringEngine::standard().score(&profile);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let spec = ServiceSpec {
        amps: args.amps,
        run_length_feet: args.run_length_feet,
        panel_spaces_needed: args.panel_spaces,
        add_ons: args.add_ons.into_iter().collect::<BTreeSet<_>>(),
    };
    let quote = QuotePricingEngine::standard().quote(&spec)?;
    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}
