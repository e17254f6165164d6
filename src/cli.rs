use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::api::{self, AppState};
use crate::config::{self, ConfigError};
use crate::core::{
    CalculatorModel, CalculatorSession, CapacityCalculator, CapacityInputs, FinancingInputs,
    MetricsDisplay,
};

#[derive(Parser, Debug)]
#[command(
    name = "profit_calc",
    about = "Equipment profit and supplier early-pay financing calculators"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculators over HTTP
    Serve(ServeArgs),
    /// Evaluate the equipment capacity calculator once
    Capacity(CapacityArgs),
    /// Evaluate the PayLater financing calculator once
    Financing(FinancingArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,
    #[arg(long, help = "JSON file with the financing rate schedule and alternatives")]
    pub rates: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CapacityArgs {
    #[arg(long, default_value_t = 1)]
    pub unit_count: u32,
    #[arg(long, default_value_t = 12)]
    pub hours_per_day: u32,
    #[arg(long, default_value_t = 60)]
    pub utilization_percent: u32,
    #[arg(long, default_value_t = 160.0, help = "Price charged per unit hour")]
    pub unit_price: f64,
    #[arg(long, default_value_t = 340)]
    pub operating_days_per_year: u32,
    #[arg(long, default_value_t = 0.0)]
    pub other_annual_costs: f64,
}

impl From<&CapacityArgs> for CapacityInputs {
    fn from(args: &CapacityArgs) -> Self {
        CapacityInputs {
            unit_count: args.unit_count,
            hours_per_day: args.hours_per_day,
            utilization_percent: args.utilization_percent,
            unit_price: args.unit_price,
            operating_days_per_year: args.operating_days_per_year,
            other_annual_costs: args.other_annual_costs,
        }
    }
}

#[derive(Args, Debug)]
pub struct FinancingArgs {
    #[arg(long, default_value_t = 2_000_000.0)]
    pub monthly_revenue: f64,
    #[arg(long, default_value_t = 1_000_000.0)]
    pub supplier_spend: f64,
    #[arg(long, default_value_t = 1.0, help = "Early-pay discount in percent")]
    pub early_pay_discount_percent: f64,
    #[arg(long, default_value_t = 10)]
    pub discount_window_days: u32,
    #[arg(long, default_value_t = 30)]
    pub standard_terms_days: u32,
    #[arg(long, default_value_t = 60)]
    pub repay_day: u32,
    #[arg(long, help = "JSON file with the financing rate schedule and alternatives")]
    pub rates: Option<PathBuf>,
}

impl From<&FinancingArgs> for FinancingInputs {
    fn from(args: &FinancingArgs) -> Self {
        FinancingInputs {
            monthly_revenue: args.monthly_revenue,
            supplier_spend: args.supplier_spend,
            early_pay_discount_percent: args.early_pay_discount_percent,
            discount_window_days: args.discount_window_days,
            standard_terms_days: args.standard_terms_days,
            repay_day: args.repay_day,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => {
            let state = AppState {
                capacity: CapacityCalculator::default(),
                financing: config::load_financing_model(args.rates.as_deref())?,
            };
            api::run_http_server(SocketAddr::new(args.bind, args.port), state).await?;
        }
        Command::Capacity(args) => {
            let model = CapacityCalculator::default();
            println!("{}", render_report(&model, CapacityInputs::from(&args))?);
        }
        Command::Financing(args) => {
            let model = config::load_financing_model(args.rates.as_deref())?;
            println!("{}", render_report(&model, FinancingInputs::from(&args))?);
        }
    }
    Ok(())
}

/// Pretty JSON report for one evaluation. Inputs are clamped first.
pub fn render_report<M>(model: &M, inputs: M::Inputs) -> Result<String, serde_json::Error>
where
    M: CalculatorModel,
    M::Metrics: MetricsDisplay,
{
    let report = CalculatorSession::with_inputs(model, inputs).report();
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FinancingCalculator;
    use serde_json::Value;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn capacity_defaults_match_calculator_defaults() {
        let Command::Capacity(args) = parse(&["profit_calc", "capacity"]).command else {
            panic!("expected capacity command");
        };
        assert_eq!(CapacityInputs::from(&args), CapacityInputs::default());
    }

    #[test]
    fn financing_defaults_match_calculator_defaults() {
        let Command::Financing(args) = parse(&["profit_calc", "financing"]).command else {
            panic!("expected financing command");
        };
        assert_eq!(FinancingInputs::from(&args), FinancingInputs::default());
        assert!(args.rates.is_none());
    }

    #[test]
    fn serve_accepts_bind_port_and_rates() {
        let Command::Serve(args) = parse(&[
            "profit_calc",
            "serve",
            "--port",
            "9000",
            "--bind",
            "127.0.0.1",
            "--rates",
            "rates.json",
        ])
        .command
        else {
            panic!("expected serve command");
        };
        assert_eq!(args.port, 9000);
        assert_eq!(args.bind, IpAddr::from([127, 0, 0, 1]));
        assert_eq!(args.rates, Some(PathBuf::from("rates.json")));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["profit_calc", "mortgage"]).is_err());
    }

    #[test]
    fn rejects_negative_unit_count() {
        assert!(Cli::try_parse_from(["profit_calc", "capacity", "--unit-count", "-1"]).is_err());
    }

    #[test]
    fn capacity_report_is_pretty_json() {
        let Command::Capacity(args) =
            parse(&["profit_calc", "capacity", "--unit-count", "3"]).command
        else {
            panic!("expected capacity command");
        };
        let model = CapacityCalculator::default();
        let json = render_report(&model, CapacityInputs::from(&args)).expect("report");
        assert!(json.contains('\n'));
        let value: Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["metrics"]["monthlyFee"], 16_500.0);
        assert_eq!(value["display"]["monthlyFee"], "16,500");
    }

    #[test]
    fn financing_report_clamps_inputs() {
        let Command::Financing(args) = parse(&[
            "profit_calc",
            "financing",
            "--monthly-revenue",
            "500000",
            "--repay-day",
            "5",
        ])
        .command
        else {
            panic!("expected financing command");
        };
        let model = FinancingCalculator::default();
        let json = render_report(&model, FinancingInputs::from(&args)).expect("report");
        let value: Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["inputs"]["supplierSpend"], 500_000.0);
        assert_eq!(value["inputs"]["repayDay"], 10);
    }
}
