use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "iam-onboard")]
#[command(about = "Validate, render and exercise the IAM onboarding stack")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that every reference in the manifest resolves
    Validate {
        #[arg(short, long, default_value = "deploy/stack.toml")]
        stack: PathBuf,
    },
    /// Render the manifest as a CloudFormation template
    Render {
        #[arg(short, long, default_value = "deploy/stack.toml")]
        stack: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the declared stack outputs
    Outputs {
        #[arg(short, long, default_value = "deploy/stack.toml")]
        stack: PathBuf,
    },
    /// Run the notifier locally against in-memory stores seeded from the manifest
    Simulate {
        #[arg(short, long, default_value = "deploy/stack.toml")]
        stack: PathBuf,
        #[arg(short, long)]
        event: PathBuf,
        #[arg(long, env = "OTP_PASSWORD")]
        password: String,
    },
}

impl Command {
    pub fn stack_path(&self) -> &PathBuf {
        match self {
            Command::Validate { stack }
            | Command::Render { stack, .. }
            | Command::Outputs { stack }
            | Command::Simulate { stack, .. } => stack,
        }
    }
}
