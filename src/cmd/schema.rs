//! Schema command - print expected input formats

use clap::Args;
use itax::tax::{Declaration, YearConfiguration};
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which input to describe
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the declaration
    JsonSchema,
    /// JSON Schema for the year configuration file
    ConfigSchema,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = match self.format {
            SchemaFormat::JsonSchema => schema_for!(Declaration),
            SchemaFormat::ConfigSchema => schema_for!(YearConfiguration),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
