//! Book depth binary - reads an order book snapshot and prints aggregated depth.

use std::{fs, io::Read, path::PathBuf};

use clap::Parser;
use clober_core::{
    format::{format_abbreviated_number_string, format_tiny_number, format_with_commas},
    market::{self, CloberTicks, DecimalPlaces, DepthLevel, Market},
    num::AsDecimal,
    types::OrderSide,
};
use fastnum::D256;

#[derive(Parser, Debug)]
#[command(name = "book_depth")]
#[command(about = "Print aggregated depth of an order book snapshot")]
struct Args {
    /// Market snapshot as JSON (`-` reads standard input)
    #[arg(short, long, default_value = "-")]
    market: PathBuf,

    /// Decimal places of the depth rows, negative to group by tens
    /// (defaults to the finest offered)
    #[arg(short, long, allow_negative_numbers = true)]
    decimals: Option<i32>,

    /// Number of rows to display per side (0 = all)
    #[arg(long, default_value = "10")]
    depth: usize,
}

fn read_market(path: &PathBuf) -> Result<Market, Box<dyn std::error::Error>> {
    let raw = if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}

fn resolve_decimals(
    requested: Option<i32>,
    candidates: &[DecimalPlaces],
) -> Result<i32, Box<dyn std::error::Error>> {
    match (requested, candidates.first()) {
        (Some(decimals), _) => Ok(decimals),
        (None, Some(finest)) => Ok(finest.value),
        (None, None) => Err("market has no priced levels, pass --decimals".into()),
    }
}

fn print_side(title: &str, rows: &[DepthLevel], depth: usize, reverse: bool) {
    let count = if depth == 0 { rows.len() } else { depth.min(rows.len()) };

    println!("{:^64}", title);
    println!("{:-^64}", "");
    println!("{:>20} │ {:<20} │ {:<18}", "Price", "Size", "Cumulative");
    println!("{:-^64}", "");

    let mut cumulative = D256::ZERO;
    let lines: Vec<_> = rows
        .iter()
        .take(count)
        .map(|row| {
            cumulative = cumulative + row.size.as_decimal();
            format!(
                "{:>20} │ {:<20} │ {:<18}",
                format_with_commas(&row.price),
                format_tiny_number(&row.size),
                format_abbreviated_number_string(cumulative),
            )
        })
        .collect();

    // Asks are printed with the best level closest to the spread.
    if reverse {
        lines.iter().rev().for_each(|l| println!("{l}"));
    } else {
        lines.iter().for_each(|l| println!("{l}"));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let market = read_market(&args.market)?;
    let book = CloberTicks::for_market(&market);

    let candidates = market
        .min_price()
        .map(market::decimal_place_candidates)
        .unwrap_or_default();
    let decimals = resolve_decimals(args.decimals, &candidates)?;

    println!(
        "\n{:=^64}",
        format!(" {}/{} ", market.base.symbol, market.quote.symbol)
    );
    println!(
        "Resolutions: {}",
        candidates
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Showing:     {decimals} decimals\n");

    let asks = market::parse_depth(&market, OrderSide::Ask, decimals, &book)?;
    let bids = market::parse_depth(&market, OrderSide::Bid, decimals, &book)?;

    print_side("ASKS", &asks, args.depth, true);
    match (bids.first(), asks.first()) {
        (Some(bid), Some(ask)) => {
            let spread = ask.price.as_decimal() - bid.price.as_decimal();
            println!(
                "{:=^64}",
                format!(
                    " SPREAD: {} | Best Bid: {} | Best Ask: {} ",
                    format_tiny_number(spread),
                    format_with_commas(&bid.price),
                    format_with_commas(&ask.price)
                )
            );
        }
        _ => println!("{:=^64}", " NO SPREAD (empty side) "),
    }
    print_side("BIDS", &bids, args.depth, false);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_decimals() {
        let candidates = market::decimal_place_candidates(100000.0);
        assert_eq!(resolve_decimals(None, &candidates).unwrap(), 1);
        assert_eq!(resolve_decimals(Some(-2), &candidates).unwrap(), -2);
        assert_eq!(resolve_decimals(Some(3), &[]).unwrap(), 3);
        assert!(resolve_decimals(None, &[]).is_err());
    }

    #[test]
    fn test_args_accept_negative_decimals() {
        let args = Args::parse_from(["book_depth", "--decimals", "-1"]);
        assert_eq!(args.decimals, Some(-1));
    }
}
