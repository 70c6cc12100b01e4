//! debt-portfolio CLI
//!
//! Load a contract document, apply a selection and print the dashboard.
//!
//! # Usage
//!
//! ```bash
//! # Full dashboard for dados.json
//! debt-portfolio report
//!
//! # Only Ana's contracts from 2022, as JSON
//! debt-portfolio report --input dados.json --partner Ana --year 2022 --format json
//!
//! # Values available for each filter
//! debt-portfolio dimensions --input dados.json
//!
//! # Generate a random portfolio for testing
//! debt-portfolio generate --contracts 200 --output dados.json
//! ```

use debt_portfolio::core::cache::RepositoryCache;
use debt_portfolio::core::currency::CurrencyFormatter;
use debt_portfolio::core::party::{LenderId, PartnerId};
use debt_portfolio::core::repository::ContractRepository;
use debt_portfolio::filter::selection::FilterSelection;
use debt_portfolio::report::DashboardReport;
use debt_portfolio::simulation::portfolio::{generate_random_portfolio, PortfolioConfig};
use std::fs;
use std::process;
use std::sync::Arc;

const DEFAULT_INPUT: &str = "dados.json";

fn print_usage() {
    eprintln!(
        r#"debt-portfolio — filter and consolidate a portfolio of debt contracts

USAGE:
    debt-portfolio <COMMAND> [OPTIONS]

COMMANDS:
    report      Print the dashboard for a selection
    dimensions  List the values available for each filter
    generate    Generate a random contract document (for testing)
    help        Show this message

OPTIONS (report, dimensions):
    --input <FILE>      Path to the JSON contract document (default: dados.json)

OPTIONS (report):
    --partner <NAME>    Select a partner (repeatable; default: all)
    --lender <NAME>     Select a lender (repeatable; default: all)
    --type <NAME>       Select a contract type (repeatable; default: all)
    --year <YEAR>       Select a contract year (repeatable; default: all)
    --locale <NAME>     Monetary locale (default: $LC_MONETARY, then $LANG)
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --contracts <N>     Number of contracts (default: 50)
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=debug for diagnostic output.

EXAMPLES:
    debt-portfolio report --input dados.json
    debt-portfolio report --partner Ana --partner Bruno --year 2022
    debt-portfolio dimensions --input dados.json
    debt-portfolio generate --contracts 200 --output dados.json"#
    );
}

/// Options of the `report` command.
#[derive(Debug, Default)]
struct ReportConfig {
    input: Option<String>,
    partners: Vec<String>,
    lenders: Vec<String>,
    contract_types: Vec<String>,
    years: Vec<i32>,
    locale: Option<String>,
    format: Option<String>,
}

impl ReportConfig {
    fn input(&self) -> &str {
        self.input.as_deref().unwrap_or(DEFAULT_INPUT)
    }

    /// Named dimensions replace "all selected"; the others keep it.
    fn selection(&self, repo: &ContractRepository) -> FilterSelection {
        let mut selection = FilterSelection::all(repo);
        if !self.partners.is_empty() {
            selection = selection.with_partners(self.partners.iter().map(PartnerId::new));
        }
        if !self.lenders.is_empty() {
            selection = selection.with_lenders(self.lenders.iter().map(LenderId::new));
        }
        if !self.contract_types.is_empty() {
            selection = selection.with_contract_types(self.contract_types.iter().cloned());
        }
        if !self.years.is_empty() {
            selection = selection.with_years(self.years.iter().copied());
        }
        selection.restrict_to(repo)
    }

    fn locale_name(&self) -> Option<String> {
        self.locale
            .clone()
            .or_else(|| std::env::var("LC_MONETARY").ok())
            .or_else(|| std::env::var("LANG").ok())
            .filter(|s| !s.is_empty())
    }
}

fn next_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, what);
        process::exit(1);
    })
}

fn parse_report_args(args: &[String]) -> ReportConfig {
    let mut config = ReportConfig::default();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        match flag {
            "--input" => config.input = Some(next_value(args, i, flag, "a file path")),
            "--partner" => config.partners.push(next_value(args, i, flag, "a name")),
            "--lender" => config.lenders.push(next_value(args, i, flag, "a name")),
            "--type" => config.contract_types.push(next_value(args, i, flag, "a name")),
            "--year" => {
                let raw = next_value(args, i, flag, "a year");
                let year = raw.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid year '{}'", raw);
                    process::exit(1);
                });
                config.years.push(year);
            }
            "--locale" => config.locale = Some(next_value(args, i, flag, "a locale name")),
            "--format" => config.format = Some(next_value(args, i, flag, "'text' or 'json'")),
            _ => {
                eprintln!("Unknown option: {}", flag);
                process::exit(1);
            }
        }
        i += 1;
    }
    config
}

/// Load through the cache and report skipped contracts on stderr. A load
/// failure ends the process with a non-zero status.
fn load_repository(cache: &RepositoryCache, path: &str) -> Arc<ContractRepository> {
    let repo = cache.load(path).unwrap_or_else(|e| {
        eprintln!("Não foi possível carregar os dados dos contratos: {}", e);
        process::exit(1);
    });
    for skipped in repo.skipped() {
        eprintln!("Contrato ignorado: {}", skipped.reason);
    }
    repo
}

fn cmd_report(args: &[String]) {
    let config = parse_report_args(args);
    let cache = RepositoryCache::new();
    let repo = load_repository(&cache, config.input());

    let formatter = match config.locale_name() {
        Some(name) => CurrencyFormatter::for_locale_name(&name),
        None => CurrencyFormatter::fallback(),
    };

    let selection = config.selection(&repo);
    let report = DashboardReport::build(&repo, &selection, &formatter);

    match config.format.as_deref().unwrap_or("text") {
        "json" => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(1);
            }
        },
        "text" => print!("{}", report),
        other => {
            eprintln!("Unknown format '{}': expected 'text' or 'json'", other);
            process::exit(1);
        }
    }
}

fn cmd_dimensions(args: &[String]) {
    let mut input = DEFAULT_INPUT.to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input = next_value(args, i, "--input", "a file path");
            }
            other => {
                eprintln!("Unknown option: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let cache = RepositoryCache::new();
    let repo = load_repository(&cache, &input);

    println!("Cliente: {}", repo.client_name());
    println!("Sócios:");
    for p in repo.partners() {
        println!("  {}", p);
    }
    if repo.has_lender_dimension() {
        println!("Bancos:");
        for l in repo.lenders() {
            println!("  {}", l);
        }
    }
    println!("Contratos:");
    for t in repo.contract_types() {
        println!("  {}", t);
    }
    if repo.has_year_dimension() {
        println!("Anos:");
        for y in repo.years() {
            println!("  {}", y);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = PortfolioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--contracts" => {
                i += 1;
                config.contract_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| {
                        eprintln!("--contracts requires a number");
                        process::exit(1);
                    });
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output", "a file path"));
            }
            other => {
                eprintln!("Unknown option: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let document = generate_random_portfolio(&config);
    let json = serde_json::to_string_pretty(&document).unwrap_or_else(|e| {
        eprintln!("Error serializing portfolio: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!("Generated {} contracts → {}", config.contract_count, path);
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "report" => cmd_report(rest),
        "dimensions" => cmd_dimensions(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
