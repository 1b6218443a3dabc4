use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use yuki_gateway::commands::ResponseKey;
use yuki_gateway::llm::{FallbackResponder, OllamaBackend};
use yuki_gateway::{Config, Router};

/// Yuki - wake-word gated voice command dispatcher
#[derive(Parser)]
#[command(name = "yuki", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/yuki/config.toml)
    #[arg(short, long, env = "YUKI_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Process a single utterance and print the reply
    Say {
        /// Utterance, including the wake word (e.g. "ยูกิ กี่โมงแล้ว")
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Manage the application table
    App {
        #[command(subcommand)]
        action: AppCommand,
    },
    /// Show which conversation backend is reachable
    Status,
    /// Download the configured Ollama model
    Pull,
    /// Interactive first-run setup
    Setup,
}

#[derive(Subcommand)]
enum AppCommand {
    /// Add or replace an application
    Add {
        /// Name used in commands (e.g. "spotify")
        name: String,
        /// Executable or bundle path
        path: PathBuf,
    },
    /// Remove an application
    Remove { name: String },
    /// List configured applications
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,yuki_gateway=info",
        1 => "info,yuki_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    let load = || Config::load(config_path);

    match cli.command {
        Some(Command::Setup) => yuki_gateway::setup::run_setup(config_path),
        Some(Command::Say { text }) => {
            let mut router = Router::new(&load()?);
            let reply = router.process(&text.join(" ")).await;
            println!("{}", reply.text);
            Ok(())
        }
        Some(Command::App { action }) => app_command(&load()?, action),
        Some(Command::Status) => status(&load()?).await,
        Some(Command::Pull) => {
            let backend = OllamaBackend::from_config(&load()?.llm);
            backend.pull_model().await?;
            println!("Pulled {}", backend.model());
            Ok(())
        }
        None => interactive(&load()?).await,
    }
}

/// Read utterances from stdin, one per line, until shutdown or EOF
async fn interactive(config: &Config) -> anyhow::Result<()> {
    let mut router = Router::new(config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    tracing::info!(
        wake_word = %config.assistant.wake_word,
        "yuki ready, type an utterance per line"
    );

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        };

        let text = match line {
            Ok(Some(text)) => text,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input");
                println!("ยูกิ: {}", router.responses().get(ResponseKey::Error));
                continue;
            }
        };

        let reply = router.process(&text).await;
        if !reply.text.is_empty() {
            println!("ยูกิ: {}", reply.text);
        }
        if reply.is_shutdown() {
            break;
        }
    }

    Ok(())
}

fn app_command(config: &Config, action: AppCommand) -> anyhow::Result<()> {
    let Some(config_path) = config.config_path.clone() else {
        anyhow::bail!("no config file location available to store applications");
    };

    let mut apps = yuki_gateway::commands::AppHandler::new(
        config.applications.clone(),
        Some(config_path.clone()),
    );

    match action {
        AppCommand::Add { name, path } => {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "path does not exist on this machine");
            }
            apps.add_application(&name, &path)?;
            println!("Added {name} -> {}", path.display());
        }
        AppCommand::Remove { name } => {
            if apps.remove_application(&name)? {
                println!("Removed {name}");
            } else {
                println!("{name} is not configured");
            }
        }
        AppCommand::List => {
            let names = apps.list_applications();
            if names.is_empty() {
                println!("No applications configured in {}", config_path.display());
            }
            for name in names {
                let path = apps
                    .application_path(name)
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("{name}\t{path}");
            }
        }
    }

    Ok(())
}

async fn status(config: &Config) -> anyhow::Result<()> {
    let status = FallbackResponder::from_config(config).status().await;

    if status.backends.is_empty() {
        println!("LLM disabled");
    }
    for backend in &status.backends {
        let state = if backend.available { "available" } else { "unavailable" };
        println!("{:<8} {state}", backend.name);
    }
    println!("active: {}", status.active().unwrap_or("canned replies"));

    Ok(())
}
