use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use wayfarer_agents::{Orchestrator, Settings};
use wayfarer_observability::{init_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "wayfarer")]
#[command(about = "Wayfarer travel assistant CLI")]
struct Cli {
    /// Ignore configured API keys and answer from the built-in estimators.
    #[arg(long)]
    offline: bool,

    /// Fixed seed for reproducible estimates.
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat,
    Ask {
        text: String,
        #[arg(long)]
        json: bool,
    },
    Budget {
        total: f64,
    },
    Fare {
        from: String,
        to: String,
        date: String,
    },
    Hotel {
        city: String,
        #[arg(long, default_value_t = 1)]
        nights: i64,
    },
    Weather {
        city: String,
        #[arg(long, default_value = "")]
        month: String,
    },
    Visa {
        nationality: String,
        destination: String,
        #[arg(long, default_value_t = 30)]
        stay_days: u32,
        #[arg(long, default_value = "tourism")]
        purpose: String,
    },
    Quote {
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfarer_cli");
    let cli = Cli::parse();

    let orchestrator = build_orchestrator(cli.offline, cli.seed).await?;

    match cli.command {
        Command::Chat => run_chat(&orchestrator).await?,
        Command::Ask { text, json } => {
            let outcome = orchestrator.handle(&text).await?;
            if json {
                print_json(&outcome)?;
            } else {
                println!("{}", outcome.reply);
            }
        }
        Command::Budget { total } => print_json(&orchestrator.budget(total))?,
        Command::Fare { from, to, date } => {
            print_json(&orchestrator.fare(&from, &to, &date).await?)?
        }
        Command::Hotel { city, nights } => {
            print_json(&orchestrator.hotel_price(&city, nights).await?)?
        }
        Command::Weather { city, month } => {
            print_json(&orchestrator.weather_summary(&city, &month).await?)?
        }
        Command::Visa {
            nationality,
            destination,
            stay_days,
            purpose,
        } => {
            let requirement = orchestrator
                .visa(&nationality, &destination, stay_days, &purpose)
                .await?;
            print_json(&requirement)?;
        }
        Command::Quote { text } => print_json(&orchestrator.quote_trip(&text).await?)?,
    }

    Ok(())
}

async fn run_chat(orchestrator: &Orchestrator) -> Result<()> {
    println!("Wayfarer chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        match orchestrator.handle(message).await {
            Ok(outcome) => println!("\n{}\n", outcome.reply),
            Err(err) => eprintln!("\nerror: {err}\n"),
        }
    }

    Ok(())
}

async fn build_orchestrator(offline: bool, seed: Option<u64>) -> Result<Orchestrator> {
    let mut settings = if offline {
        Settings::offline()
    } else {
        Settings::from_env()
    };
    if let Some(seed) = seed {
        settings = settings.with_seed(seed);
    }

    Orchestrator::from_settings(&settings, AppMetrics::shared())
        .await
        .context("failed building orchestrator")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
