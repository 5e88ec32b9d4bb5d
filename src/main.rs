use clap::{Parser, Subcommand};

mod cmd;

/// Indian income tax calculator
#[derive(Parser, Debug)]
#[command(name = "itax", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the tax liability for a declaration
    Compute(cmd::compute::ComputeCommand),
    /// Compare the old and new regimes
    Compare(cmd::compare::CompareCommand),
    /// Show the loss set-off ledger and losses carried forward
    Setoff(cmd::setoff::SetOffCommand),
    /// Print the JSON schema of the declaration or configuration
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compute(command) => command.exec(),
        Command::Compare(command) => command.exec(),
        Command::Setoff(command) => command.exec(),
        Command::Schema(command) => command.exec(),
    }
}
