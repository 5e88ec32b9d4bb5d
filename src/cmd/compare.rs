//! Compare command - old regime against new regime

use crate::cmd::compute::{print_table, print_warnings};
use crate::cmd::{format_inr, InputArgs};
use clap::Args;
use itax::tax::{compare_regimes, ComputationResult, RegimeComparison};
use rust_decimal::Decimal;
use tabled::Tabled;

#[derive(Args, Debug)]
pub struct CompareCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (declaration, configuration) = self.input.load()?;
        let comparison = compare_regimes(&declaration, &configuration)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        } else {
            print_comparison(&comparison);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Old Regime")]
    old: String,
    #[tabled(rename = "New Regime")]
    new: String,
}

fn comparison_rows(old: &ComputationResult, new: &ComputationResult) -> Vec<ComparisonRow> {
    let lines: [(&str, fn(&ComputationResult) -> Decimal); 8] = [
        ("Net Taxable Income", |r| r.net_taxable_income),
        ("Tax before Surcharge", |r| r.tax_liability),
        ("Surcharge", |r| r.surcharge),
        ("Rebate u/s 87A", |r| r.rebate_87a),
        ("Cess", |r| r.cess),
        ("Total Tax Payable", |r| r.total_tax_payable),
        ("Interest", |r| r.interest.total),
        ("Net Payable", |r| r.net_payable),
    ];
    lines
        .iter()
        .map(|(item, amount)| ComparisonRow {
            item: item.to_string(),
            old: format_inr(amount(old)),
            new: format_inr(amount(new)),
        })
        .collect()
}

fn print_comparison(comparison: &RegimeComparison) {
    println!();
    println!("REGIME COMPARISON (AY {})", comparison.old.assessment_year);
    println!();

    print_table(comparison_rows(&comparison.old, &comparison.new));
    println!();

    match comparison.recommended {
        Some(regime) => println!(
            "Recommended: {} regime (saves {})",
            regime,
            format_inr(comparison.savings)
        ),
        None => println!("Both regimes result in the same net payable"),
    }
    print_warnings(&comparison.new.warnings);
}
