use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{
    CustomType, CustomUserError, InquireError, Password, PasswordDisplayMode, Text,
    validator::Validation,
};
use std::{
    io::{self, Write},
    sync::Arc,
};

use skyglass_core::{
    Config, Coordinates, RequestState, WeatherShell,
    clock::{ClockTicker, TICK},
    geolocation::geolocator_for,
    provider_from_config,
    render::render,
};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const QUIT: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyglass", version, about = "Current weather, themed for the time of day")]
pub struct Cli {
    /// Log and print request diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Keep the card on screen and tick the clock every second until Ctrl-C.
    #[arg(long)]
    pub live: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key and an optional home location.
    Configure,

    /// Show weather for the current position (flags, else configured home).
    Show {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Show weather for a city by name.
    Search {
        /// City name, e.g. "Lisbon" or "Portland,US".
        city: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Interactive session: locate, then search cities until `:q`.
    App,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let verbose = self.verbose;

        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, display } => {
                let explicit = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let shell = build_shell(explicit)?;
                shell.start().await;
                present(&shell.state(), verbose, display.live).await
            }
            Command::Search { city, display } => {
                let shell = build_shell(None)?;
                shell.search(&city).await;
                present(&shell.state(), verbose, display.live).await
            }
            Command::App => interactive(build_shell(None)?, verbose).await,
        }
    }
}

fn build_shell(explicit: Option<Coordinates>) -> anyhow::Result<WeatherShell> {
    let config = Config::load()?;
    let provider = provider_from_config(&config)?;
    let geolocator = geolocator_for(explicit, &config);

    tracing::debug!(
        "Using {} at {} (api key {}), geolocator {:?}",
        if explicit.is_some() { "explicit coordinates" } else { "configured location" },
        config.base_url(),
        if config.has_api_key() { "set" } else { "missing" },
        geolocator,
    );

    Ok(WeatherShell::new(provider, Arc::from(geolocator)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one for free at https://openweathermap.org/api")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key);

    let latitude = CustomType::<f64>::new("Home latitude (optional):")
        .with_error_message("Please enter a number between -90 and 90")
        .with_validator(validate_latitude)
        .prompt_skippable()
        .context("Failed to read latitude")?;

    let home = match latitude {
        Some(latitude) => CustomType::<f64>::new("Home longitude:")
            .with_error_message("Please enter a number between -180 and 180")
            .with_validator(validate_longitude)
            .prompt()
            .context("Failed to read longitude")
            .map(|longitude| Some(Coordinates::new(latitude, longitude)))?,
        None => None,
    };

    config.set_home(home);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

fn validate_latitude(value: &f64) -> Result<Validation, CustomUserError> {
    Ok(if (-90.0..=90.0).contains(value) {
        Validation::Valid
    } else {
        Validation::Invalid("Latitude must be between -90 and 90".into())
    })
}

fn validate_longitude(value: &f64) -> Result<Validation, CustomUserError> {
    Ok(if (-180.0..=180.0).contains(value) {
        Validation::Valid
    } else {
        Validation::Invalid("Longitude must be between -180 and 180".into())
    })
}

/// Print the card once, or keep re-rendering it with a live clock.
async fn present(state: &RequestState, verbose: bool, live: bool) -> anyhow::Result<()> {
    if verbose {
        report_diagnostic(state);
    }

    if !live || state.snapshot().is_none() {
        print!("{}", render(state, &Local::now().naive_local()));
        return Ok(());
    }

    let state = state.clone();
    let ticker = ClockTicker::start(TICK, move |now| {
        let mut stdout = io::stdout().lock();
        let frame = format!(
            "{CLEAR_SCREEN}{}\n(Ctrl-C to exit)\n",
            render(&state, &now.naive_local())
        );
        if let Err(e) = stdout.write_all(frame.as_bytes()).and_then(|()| stdout.flush()) {
            tracing::debug!("Failed to redraw clock: {}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    ticker.stop();

    Ok(())
}

async fn interactive(shell: WeatherShell, verbose: bool) -> anyhow::Result<()> {
    shell.start().await;

    loop {
        let state = shell.state();
        present(&state, verbose, false).await?;

        let input = Text::new("Search for a city:")
            .with_help_message("Enter to retry your location, :q to quit")
            .prompt();

        let input = match input {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read search input"),
        };

        let action = Action::parse(&input);
        tracing::debug!("Interactive action: {:?}", action);

        let outcome = match action {
            Action::Quit => break,
            Action::Retry => shell.retry().await,
            Action::Search(city) => shell.search(&city).await,
        };
        tracing::debug!("Action finished: {:?}", outcome);
    }

    Ok(())
}

/// One line of input in the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Quit,
    Retry,
    Search(String),
}

impl Action {
    fn parse(input: &str) -> Self {
        match input.trim() {
            QUIT => Action::Quit,
            "" => Action::Retry,
            city => Action::Search(city.to_string()),
        }
    }
}

fn report_diagnostic(state: &RequestState) {
    if let Some(err) = state.error() {
        match (err.failure_kind(), err.diagnostic()) {
            (Some(kind), Some(detail)) => eprintln!("[{kind:?}] {detail}"),
            (None, Some(detail)) => eprintln!("{detail}"),
            _ => {}
        }
    }
}
