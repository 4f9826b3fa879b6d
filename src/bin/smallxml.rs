//! Command-line front end for smallxml.
//!
//! Provides three reports over a single XML file: an indented echo of the
//! document, node statistics, and a customer purchase summary.

use std::fmt::Write as _;
use std::fs;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smallxml::parser::{self, ParseOptions};
use smallxml::serial::{render_with_options, RenderOptions};
use smallxml::stats::DocumentStats;
use smallxml::{Document, NodeFilter, NodeId};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// smallxml -- parse XML files and report on their contents.
#[derive(Parser, Debug)]
#[command(name = "smallxml", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Indentation used for each nesting level when echoing.
    #[arg(long, global = true, value_name = "STR", default_value = "  ")]
    indent: String,

    /// Drop whitespace-only text inside elements.
    #[arg(long, global = true)]
    no_blanks: bool,

    /// Maximum element nesting depth.
    #[arg(long, global = true, value_name = "N")]
    max_depth: Option<u32>,

    /// Log parser activity to stderr.
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a file and print it with consistent indentation.
    Echo {
        /// XML file to process.
        file: String,
    },

    /// Print node statistics for the prolog and the element tree.
    Stats {
        /// XML file to process.
        file: String,

        /// List each unique tag path with its attribute sequences.
        #[arg(long)]
        paths: bool,
    },

    /// Summarize customer purchases, one row per customer.
    Customers {
        /// XML file to process.
        file: String,
    },
}

// ---------------------------------------------------------------------------
// Exit codes
// ---------------------------------------------------------------------------

const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_REPORT_ERROR: u8 = 2;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file = match &cli.command {
        Command::Echo { file } | Command::Stats { file, .. } | Command::Customers { file } => file,
    };

    let doc = match load(&cli, file) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(EXIT_PARSE_ERROR);
        }
    };

    let output = match &cli.command {
        Command::Echo { .. } => {
            let options = RenderOptions::default().indent_str(&cli.indent);
            Ok(render_with_options(&doc, &options))
        }
        Command::Stats { paths, .. } => {
            Ok(DocumentStats::collect(&doc).with_paths(*paths).to_string())
        }
        Command::Customers { .. } => customer_report(&doc),
    };

    match output {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{file}: {e:#}");
            ExitCode::from(EXIT_REPORT_ERROR)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "smallxml=debug" } else { "smallxml=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Reads and parses a file with the options given on the command line.
fn load(cli: &Cli, file: &str) -> Result<Document> {
    let bytes = fs::read(file).with_context(|| format!("{file}: failed to read"))?;
    let text = smallxml::encoding::decode_to_utf8(&bytes)
        .with_context(|| format!("{file}: failed to decode"))?;

    let mut options = ParseOptions::default().no_blanks(cli.no_blanks);
    if let Some(max) = cli.max_depth {
        options = options.max_depth(max);
    }
    let doc = parser::parse_str_with_options(&text, &options)
        .with_context(|| format!("{file}: failed to parse"))?;

    log::debug!("loaded {file}: {} nodes", doc.node_count());
    Ok(doc)
}

// ---------------------------------------------------------------------------
// Customer summary
// ---------------------------------------------------------------------------

/// One customer's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CustomerRow {
    state: String,
    /// Total purchases in cents.
    purchases: i64,
    name: String,
    most_recent_date: String,
}

/// Builds the customer rows: one per tag child of the root element, with
/// the `price` of each tag grandchild summed and the latest `date` kept.
/// Rows are sorted by state, then purchases, then name.
fn customer_rows(doc: &Document) -> Result<Vec<CustomerRow>> {
    let mut rows = Vec::new();
    for customer in doc.children_filtered(doc.root_node(), NodeFilter::Tag) {
        let first = required_attribute(doc, customer, "firstname")?;
        let last = required_attribute(doc, customer, "lastname")?;
        let mut row = CustomerRow {
            state: required_attribute(doc, customer, "state")?.to_string(),
            purchases: 0,
            name: format!("{first} {last}"),
            most_recent_date: String::new(),
        };

        for purchase in doc.children_filtered(customer, NodeFilter::Tag) {
            let date = required_attribute(doc, purchase, "date")?;
            let price = required_attribute(doc, purchase, "price")?;
            let cents = price_to_cents(price).with_context(|| {
                format!("{}: invalid price '{price}'", doc.path(purchase))
            })?;
            row.purchases = row
                .purchases
                .checked_add(cents)
                .ok_or_else(|| anyhow!("{}: purchase total out of range", doc.path(customer)))?;
            if date > row.most_recent_date.as_str() {
                row.most_recent_date = date.to_string();
            }
        }
        rows.push(row);
    }

    rows.sort_by(|a, b| {
        a.state
            .cmp(&b.state)
            .then(a.purchases.cmp(&b.purchases))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(rows)
}

fn required_attribute<'a>(doc: &'a Document, id: NodeId, name: &str) -> Result<&'a str> {
    doc.attribute(id, name)
        .ok_or_else(|| anyhow!("{}: missing attribute '{name}'", doc.path(id)))
}

/// Parses a decimal price such as `"12.5"` into cents.
#[allow(clippy::cast_possible_truncation)]
fn price_to_cents(price: &str) -> Result<i64> {
    let value: f64 = price.trim().parse()?;
    if !value.is_finite() || value.abs() > 1e15 {
        bail!("price out of range");
    }
    Ok((value * 100.0).round() as i64)
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn customer_report(doc: &Document) -> Result<String> {
    let rows = customer_rows(doc)?;
    let mut out = format!(
        "{:<5}{:>10} {:<20}Most Recent Date\n",
        "State", "Purchases", "Customer"
    );
    for row in &rows {
        let _ = writeln!(
            out,
            "{:<5}{:>10} {:<20}{}",
            row.state,
            format_cents(row.purchases),
            row.name,
            row.most_recent_date
        );
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CUSTOMERS: &str = r#"<customers>
  <customer state="NY" firstname="Ann" lastname="Lee">
    <purchase date="20020110" price="10.50"/>
    <purchase date="20020301" price="4.25"/>
  </customer>
  <customer state="CA" firstname="Bob" lastname="Ray">
    <purchase date="20011224" price="99.99"/>
  </customer>
  <customer state="NY" firstname="Cy" lastname="Dow">
    <purchase date="20020115" price="1"/>
  </customer>
</customers>"#;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["smallxml", "stats", "a.xml", "--paths", "--no-blanks"])
            .unwrap();
        assert!(cli.no_blanks);
        assert!(matches!(cli.command, Command::Stats { paths: true, .. }));

        let cli = Cli::try_parse_from(["smallxml", "--indent", "\t", "echo", "a.xml"]).unwrap();
        assert_eq!(cli.indent, "\t");
    }

    #[test]
    fn test_customer_rows_sorted_and_summed() {
        let doc = smallxml::parse(CUSTOMERS).unwrap();
        let rows = customer_rows(&doc).unwrap();
        let summary: Vec<(&str, i64, &str, &str)> = rows
            .iter()
            .map(|r| {
                (
                    r.state.as_str(),
                    r.purchases,
                    r.name.as_str(),
                    r.most_recent_date.as_str(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("CA", 9999, "Bob Ray", "20011224"),
                ("NY", 100, "Cy Dow", "20020115"),
                ("NY", 1475, "Ann Lee", "20020301"),
            ]
        );
    }

    #[test]
    fn test_customer_report_layout() {
        let doc = smallxml::parse(CUSTOMERS).unwrap();
        let report = customer_report(&doc).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "State Purchases Customer            Most Recent Date");
        assert_eq!(lines[1], "CA        99.99 Bob Ray             20011224");
        assert_eq!(lines[2], "NY         1.00 Cy Dow              20020115");
        assert_eq!(lines[3], "NY        14.75 Ann Lee             20020301");
    }

    #[test]
    fn test_purchase_total_overflow_is_an_error() {
        let mut xml = String::from(r#"<c><customer state="NY" firstname="A" lastname="B">"#);
        for _ in 0..100 {
            xml.push_str(r#"<purchase date="20020101" price="1000000000000000"/>"#);
        }
        xml.push_str("</customer></c>");
        let doc = smallxml::parse(&xml).unwrap();
        let err = customer_rows(&doc).unwrap_err();
        assert_eq!(err.to_string(), "c/customer: purchase total out of range");
    }

    #[test]
    fn test_missing_attribute_names_element() {
        let doc = smallxml::parse(r#"<c><customer state="NY" firstname="A"/></c>"#).unwrap();
        let err = customer_rows(&doc).unwrap_err();
        assert_eq!(err.to_string(), "c/customer: missing attribute 'lastname'");
    }

    #[test]
    fn test_price_to_cents() {
        assert_eq!(price_to_cents("12.5").unwrap(), 1250);
        assert_eq!(price_to_cents("0.1").unwrap(), 10);
        assert!(price_to_cents("cheap").is_err());
        assert!(price_to_cents("inf").is_err());
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(-75), "-0.75");
    }
}
