use std::process::ExitCode;

use delivery_quote::{
    domain::{
        condition_surcharges, validate_coordinates, PriceModifier, Quote, QuoteOptions,
        UnknownOption,
    },
    infra::QuoteService,
    util::{
        settings::{save_settings, Settings},
        version::{current_version, version_label, APP_NAME},
    },
};
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: delivery-quote <pickup> <delivery> [options]
       delivery-quote validate <coordinates>
       delivery-quote init-config
       delivery-quote --version

options:
  --urgency <whenever|soon|urgent|emergency>
  --insurance <none|basic|premium|low|medium|high|priceless>
  --service <delivery|shopping|rescue>
  --time <day|dusk|night>          shown, not priced
  --weather <clear|rain|thunderstorm>  shown, not priced
  --json                           print the quote as JSON";

#[derive(Debug, PartialEq)]
enum Command {
    Quote {
        pickup: String,
        delivery: String,
        options: QuoteOptions,
        json: bool,
    },
    Validate(String),
    InitConfig,
    Version,
    Help,
}

#[derive(Debug, Error, PartialEq)]
enum CliError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown flag {0}")]
    UnknownFlag(String),
    #[error(transparent)]
    Option(#[from] UnknownOption),
    #[error("expected a pickup and a delivery location")]
    Usage,
}

fn parse_args(args: &[String]) -> Result<Command, CliError> {
    match args.first().map(String::as_str) {
        None | Some("-h") | Some("--help") => return Ok(Command::Help),
        Some("-V") | Some("--version") => return Ok(Command::Version),
        Some("init-config") => return Ok(Command::InitConfig),
        Some("validate") => {
            let text = args.get(1).ok_or(CliError::Usage)?;
            return Ok(Command::Validate(text.clone()));
        }
        _ => {}
    }

    let mut positional = Vec::new();
    let mut options = QuoteOptions::default();
    let mut json = false;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| CliError::MissingValue(flag.to_string()))
        };
        match arg.as_str() {
            "--json" => json = true,
            "--urgency" => options.urgency = value(arg.as_str())?.parse()?,
            "--insurance" => options.insurance = value(arg.as_str())?,
            "--service" => options.service_type = value(arg.as_str())?.parse()?,
            "--time" => options.time_of_day = Some(value(arg.as_str())?.parse()?),
            "--weather" => options.weather = Some(value(arg.as_str())?.parse()?),
            flag if flag.starts_with("--") => return Err(CliError::UnknownFlag(flag.to_string())),
            _ => positional.push(arg.clone()),
        }
    }

    match <[String; 2]>::try_from(positional) {
        Ok([pickup, delivery]) => Ok(Command::Quote {
            pickup,
            delivery,
            options,
            json,
        }),
        Err(_) => Err(CliError::Usage),
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_line(modifier: &PriceModifier) -> String {
    format!(
        "  {:<20} {:>+6}  {}",
        modifier.name, modifier.cost, modifier.reason
    )
}

fn render_quote(quote: &Quote, options: &QuoteOptions) -> String {
    let breakdown = &quote.breakdown;
    let mut lines = vec![
        format!(
            "Route: {} blocks ({}), {}, about {} min",
            quote.distance,
            quote.difficulty.label(),
            quote.danger_level.label(),
            quote.estimated_time
        ),
        format!("  {:<20} {:>6}", "Base price", breakdown.base_price),
        format!("  {:<20} {:>6}", "Distance", breakdown.distance_cost),
    ];
    lines.extend(breakdown.modifiers.iter().map(format_line));
    lines.push(format!("  {:<20} {:>6}", "Total", quote.price));
    if breakdown.is_floored() {
        lines.push("  (minimum charge applied)".to_string());
    }

    for note in &quote.special_notes {
        lines.push(format!("Note: {note}"));
    }

    let conditions = condition_surcharges(options.time_of_day, options.weather);
    if !conditions.is_empty() {
        lines.push("Conditions (not included in the total):".to_string());
        lines.extend(conditions.iter().map(format_line));
    }

    lines.join("\n")
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::resolve();
    init_tracing(&settings);
    debug!(?settings, "Loaded settings");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match command {
        Command::Help => {
            println!("{USAGE}");
            ExitCode::SUCCESS
        }
        Command::Version => {
            match current_version() {
                Ok(version) => println!("{APP_NAME} {version}"),
                Err(err) => println!("{APP_NAME} {} ({err})", version_label()),
            }
            ExitCode::SUCCESS
        }
        Command::InitConfig => match save_settings(&settings) {
            Ok(path) => {
                println!("Wrote {}", path.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("Failed to write settings: {err}");
                ExitCode::FAILURE
            }
        },
        Command::Validate(text) => match validate_coordinates(&text) {
            Ok(coords) => {
                println!("Valid: {coords}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                println!("Invalid: {err}");
                ExitCode::FAILURE
            }
        },
        Command::Quote {
            pickup,
            delivery,
            options,
            json,
        } => {
            let service = QuoteService::new().with_ttl(settings.cache_ttl());
            let quote = match service.get_quote(&pickup, &delivery, &options).await {
                Ok(quote) => quote,
                Err(err) => {
                    eprintln!("{err}");
                    return ExitCode::FAILURE;
                }
            };

            if json {
                match serde_json::to_string_pretty(&quote) {
                    Ok(body) => println!("{body}"),
                    Err(err) => {
                        error!("Failed to encode quote: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("{}", render_quote(&quote, &options));
            }
            ExitCode::SUCCESS
        }
    }
}
