use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for meadow")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt check, clippy and tests
    Check,
    /// Run all tests
    Test,
    /// Launch the desktop app, forwarding remaining arguments
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Headless smoke run: a seeded in-memory session over 20 simulated seconds
    Smoke,
    /// Delete a session data directory
    CleanData {
        #[arg(long, default_value = "./meadow_data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt check", &["fmt", "--all", "--", "--check"])?;
            cargo(
                "clippy",
                &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            )?;
            cargo("tests", &["test", "--workspace"])?;
        }
        Commands::Test => cargo("tests", &["test", "--workspace"])?,
        Commands::Run { args } => {
            let mut full = vec!["run", "-p", "meadow-desktop", "--"];
            full.extend(args.iter().map(String::as_str));
            cargo("meadow-desktop", &full)?;
        }
        Commands::Smoke => cargo(
            "smoke simulation",
            &[
                "run", "-p", "meadow-cli", "--", "simulate", "--memory", "--seed", "7",
                "--keys", "wd", "--frames", "1250",
            ],
        )?,
        Commands::CleanData { data_dir } => {
            if data_dir.exists() {
                std::fs::remove_dir_all(&data_dir)?;
                println!("==> Removed {}", data_dir.display());
            } else {
                println!("==> Nothing to remove at {}", data_dir.display());
            }
        }
    }

    Ok(())
}

fn cargo(what: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("{what} failed");
    }
    Ok(())
}
