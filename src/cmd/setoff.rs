//! Set-off command - ledger of losses absorbed and the remainder carried forward

use crate::cmd::compute::print_table;
use crate::cmd::{format_inr, InputArgs};
use clap::Args;
use itax::tax::compute::ComputationResult;
use itax::tax::{compute, SetOffEntry};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct SetOffCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output the ledger as CSV
    #[arg(long)]
    csv: bool,
}

impl SetOffCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (declaration, configuration) = self.input.load()?;
        let result = compute(&declaration, &configuration)?;

        if self.csv {
            write_csv(&result.set_off, std::io::stdout())
        } else {
            print_set_off(&result);
            Ok(())
        }
    }
}

#[derive(Debug, Serialize)]
struct LedgerRecord {
    source: String,
    against: String,
    amount: String,
}

impl From<&SetOffEntry> for LedgerRecord {
    fn from(entry: &SetOffEntry) -> Self {
        LedgerRecord {
            source: entry.source.to_string(),
            against: entry.against.to_string(),
            amount: entry.amount.to_string(),
        }
    }
}

fn write_csv<W: Write>(ledger: &[SetOffEntry], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in ledger {
        wtr.serialize(LedgerRecord::from(entry))?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Tabled)]
struct LedgerRow {
    #[tabled(rename = "Loss")]
    source: String,
    #[tabled(rename = "Set Off Against")]
    against: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Clone, Tabled)]
struct CarriedRow {
    #[tabled(rename = "Loss")]
    loss: String,
    #[tabled(rename = "Carried Forward")]
    amount: String,
}

fn print_set_off(result: &ComputationResult) {
    println!();
    println!("LOSS SET-OFF (AY {})", result.assessment_year);
    println!();

    if result.set_off.is_empty() {
        println!("  (no losses set off)");
    } else {
        let rows: Vec<LedgerRow> = result
            .set_off
            .iter()
            .map(|entry| LedgerRow {
                source: entry.source.to_string(),
                against: entry.against.to_string(),
                amount: format_inr(entry.amount),
            })
            .collect();
        print_table(rows);
    }

    let carried = &result.losses_carried_forward;
    let rows: Vec<CarriedRow> = [
        ("House Property", carried.house_property),
        ("Business (Non-Speculative)", carried.business_non_speculative),
        ("Business (Speculative)", carried.business_speculative),
        ("Short-Term Capital Loss", carried.stcl),
        ("Long-Term Capital Loss", carried.ltcl),
        ("Race Horses", carried.race_horses),
        ("Unabsorbed Depreciation", carried.unabsorbed_depreciation),
    ]
    .into_iter()
    .filter(|(_, amount)| *amount > Decimal::ZERO)
    .map(|(loss, amount)| CarriedRow {
        loss: loss.to_string(),
        amount: format_inr(amount),
    })
    .collect();

    println!();
    if rows.is_empty() {
        println!("No losses carried forward");
    } else {
        print_table(rows);
    }
}
