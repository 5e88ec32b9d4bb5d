//! Compute command - tax liability for one declaration

use crate::cmd::{format_inr, format_rate, InputArgs};
use clap::Args;
use itax::tax::credit::ForeignItemResult;
use itax::tax::{compute, ComputationResult, Warning};
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ComputeCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output the full computation as JSON instead of a summary table
    #[arg(long)]
    json: bool,
}

impl ComputeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let (declaration, configuration) = self.input.load()?;
        let result = compute(&declaration, &configuration)?;
        log::info!("Fingerprint: {}", result.fingerprint()?);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Tabled)]
struct AmountRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Debug, Clone, Tabled)]
struct ForeignRow {
    #[tabled(rename = "Item")]
    id: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Taxable")]
    taxable: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Indian Tax")]
    indian_tax: String,
    #[tabled(rename = "Credit")]
    credit: String,
}

impl From<&ForeignItemResult> for ForeignRow {
    fn from(item: &ForeignItemResult) -> Self {
        ForeignRow {
            id: item.id.clone(),
            country: item.country.clone(),
            taxable: format_inr(item.taxable_amount),
            rate: format_rate(item.applicable_rate.round_dp(4)),
            indian_tax: format_inr(item.indian_tax),
            credit: format_inr(item.total_ftc),
        }
    }
}

fn row(item: &str, amount: Decimal) -> AmountRow {
    AmountRow {
        item: item.to_string(),
        amount: format_inr(amount),
    }
}

fn summary_rows(result: &ComputationResult) -> Vec<AmountRow> {
    let mut rows = vec![
        row("Gross Total Income", result.gross_total_income),
        row("Disallowed Deductions", result.disallowed_deductions),
        row("Net Taxable Income", result.net_taxable_income),
        row("Tax on Normal Income", result.tax.on_normal_income),
        row("Tax on Special Income", result.tax.on_special_income()),
        row("Tax before Surcharge", result.tax_liability),
        row("Surcharge", result.surcharge),
    ];
    if result.marginal_relief > Decimal::ZERO {
        rows.push(row("Marginal Relief", result.marginal_relief));
    }
    rows.extend([
        row("Rebate u/s 87A", result.rebate_87a),
        row("Health & Education Cess", result.cess),
        row("Foreign Tax Credit", result.relief),
        row("Total Tax Payable", result.total_tax_payable),
        row("Interest u/s 234A", result.interest.u_s_234a),
        row("Interest u/s 234B", result.interest.u_s_234b),
        row("Interest u/s 234C", result.interest.u_s_234c),
        row("TDS", result.tds),
        row("Advance Tax", result.advance_tax),
        row("Net Payable", result.net_payable),
    ]);
    rows
}

pub(crate) fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

fn print_result(result: &ComputationResult) {
    println!();
    println!(
        "TAX COMPUTATION (AY {}, {:?}, {} regime)",
        result.assessment_year, result.entity, result.regime
    );
    println!();
    print_table(summary_rows(result));

    let itemized = &result.income.international.itemized;
    if !itemized.is_empty() {
        println!();
        println!("FOREIGN TAX CREDIT");
        println!();
        print_table(itemized.iter().map(ForeignRow::from).collect::<Vec<_>>());
    }

    if let Some(trust) = &result.trust {
        println!();
        println!(
            "  Taxed at the maximum marginal rate of {}",
            format_rate(trust.applicable_rate)
        );
        for flag in &trust.violation_flags {
            println!("  {}", flag);
        }
    }
    print_warnings(&result.warnings);
}

pub(crate) fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("WARNINGS");
    for warning in warnings {
        match warning {
            Warning::InvalidDate { field, value } => {
                println!("  Invalid date for {}: '{}' (ignored)", field, value)
            }
            Warning::NewRegimeUnavailable => {
                println!("  New regime is not available for this year")
            }
        }
    }
}
