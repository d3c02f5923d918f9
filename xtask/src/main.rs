use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for tableau")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy, tests, and the headless smoke run
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates, denying warnings
    Clippy,
    /// Run all tests
    Test,
    /// Render a few frames of the demo scene without a window
    Smoke {
        #[arg(short, long, default_value = "5")]
        frames: u32,
    },
}

/// One cargo invocation with a human-readable name.
struct Step {
    name: &'static str,
    args: Vec<String>,
}

impl Step {
    fn new(name: &'static str, args: &[&str]) -> Self {
        Self {
            name,
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn run(&self) -> Result<()> {
        println!("==> {} (cargo {})", self.name, self.args.join(" "));
        let status = Command::new("cargo").args(&self.args).status()?;
        if !status.success() {
            anyhow::bail!("{} failed", self.name);
        }
        Ok(())
    }
}

fn fmt() -> Step {
    Step::new("format check", &["fmt", "--all", "--", "--check"])
}

fn clippy() -> Step {
    Step::new(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn test() -> Step {
    Step::new("tests", &["test", "--workspace"])
}

fn smoke(frames: u32) -> Step {
    let frames = frames.to_string();
    Step::new(
        "headless smoke run",
        &["run", "-p", "tableau-cli", "--", "run", "--frames", &frames],
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps = match cli.command {
        Commands::Check => vec![fmt(), clippy(), test(), smoke(3)],
        Commands::Fmt => vec![fmt()],
        Commands::Clippy => vec![clippy()],
        Commands::Test => vec![test()],
        Commands::Smoke { frames } => vec![smoke(frames)],
    };
    for step in &steps {
        step.run()?;
    }

    Ok(())
}
