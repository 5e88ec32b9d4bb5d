pub mod compare;
pub mod compute;
pub mod schema;
pub mod setoff;

use clap::Args;
use itax::tax::{read_declaration_json, Declaration, YearConfiguration};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Arguments shared by every command that runs a computation
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Declaration file (JSON). Reads from stdin with "-".
    #[arg(short, long, default_value = "-")]
    pub declaration: PathBuf,

    /// Year configuration file (JSON); its years replace the built-in tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl InputArgs {
    pub fn load(&self) -> anyhow::Result<(Declaration, YearConfiguration)> {
        let declaration = read_declaration(&self.declaration)?;
        let configuration = read_configuration(self.config.as_deref())?;
        Ok((declaration, configuration))
    }
}

/// Read a declaration (JSON) from a file, or stdin with "-"
pub fn read_declaration(path: &Path) -> anyhow::Result<Declaration> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        read_declaration_json(BufReader::new(file))
    }
}

fn read_from_stdin() -> anyhow::Result<Declaration> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a declaration file or pipe one to stdin.");
    }

    read_declaration_json(io::Cursor::new(buffer))
}

/// Built-in tables, overridden year by year from `path`
pub fn read_configuration(path: Option<&Path>) -> anyhow::Result<YearConfiguration> {
    let mut configuration = YearConfiguration::builtin();
    if let Some(path) = path {
        let file = File::open(path)?;
        let overrides = YearConfiguration::from_json_reader(BufReader::new(file))?;
        for year in overrides.years() {
            log::info!("Using configuration for {} from {}", year, path.display());
        }
        configuration.merge(overrides);
    }
    Ok(configuration)
}

pub fn format_inr(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-₹{:.2}", amount.abs())
    } else {
        format!("₹{:.2}", amount)
    }
}

pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
