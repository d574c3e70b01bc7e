mod cli;

use std::io::{self, Write};
use std::time::Duration;

use clap::Parser;

use quote_cli::config::FetchConfig;
use quote_cli::fetch::QuoteFetcher;
use quote_cli::records::{presets, Candle, KlineInterval, SeriesRequest};
use quote_cli::Result;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = FetchConfig::from_env()?;
    let fetcher = QuoteFetcher::new(config)?;
    if let Some(millis) = cli.interval_ms {
        fetcher.set_request_interval(Duration::from_millis(millis));
    }

    match cli.command {
        Commands::Ticks { codes } => show_ticks(&fetcher, codes).await?,
        Commands::Series {
            code,
            interval,
            count,
        } => show_series(&fetcher, &code, &interval, count).await?,
        Commands::Batch {
            codes,
            interval,
            count,
        } => show_batch(&fetcher, codes, &interval, count).await?,
        Commands::Info { codes } => show_info(&fetcher, codes).await?,
        Commands::Interactive => run_interactive(&fetcher).await?,
    }

    Ok(())
}

async fn show_ticks(fetcher: &QuoteFetcher, codes: Vec<String>) -> Result<()> {
    let codes = if codes.is_empty() {
        presets::main_index_codes()
    } else {
        codes
    };

    let report = fetcher.live_ticks(&codes).await?;
    for tick in &report.ticks {
        println!(
            "{:<12} price {:>12.4}  volume {:>14.2}  at {}",
            tick.code,
            tick.price,
            tick.volume,
            tick.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
    if !report.invalid_codes.is_empty() {
        println!("invalid codes: {}", report.invalid_codes.join(", "));
    }
    Ok(())
}

async fn show_series(fetcher: &QuoteFetcher, code: &str, interval: &str, count: u32) -> Result<()> {
    let interval = KlineInterval::parse(interval)?;
    let candles = fetcher.series(code, interval, count).await?;
    print_candles(code, &candles);
    Ok(())
}

async fn show_batch(
    fetcher: &QuoteFetcher,
    codes: Vec<String>,
    interval: &str,
    count: u32,
) -> Result<()> {
    let interval = KlineInterval::parse(interval)?;
    let codes = if codes.is_empty() {
        presets::main_stock_codes()
    } else {
        codes
    };
    let requests: Vec<SeriesRequest> = codes
        .iter()
        .map(|code| SeriesRequest {
            code: code.clone(),
            interval,
            count,
        })
        .collect();

    let results = fetcher.batch_series(&requests).await;
    for (request, candles) in requests.iter().zip(&results) {
        match candles.last() {
            Some(latest) => println!(
                "{:<12} {} bars, last close {:>12.4} at {}",
                request.code,
                candles.len(),
                latest.close,
                latest.timestamp.format("%Y-%m-%d")
            ),
            None => println!("{:<12} no data", request.code),
        }
    }
    Ok(())
}

async fn show_info(fetcher: &QuoteFetcher, codes: Vec<String>) -> Result<()> {
    let codes = if codes.is_empty() {
        presets::main_stock_codes()
    } else {
        codes
    };

    let report = fetcher.static_info(&codes).await?;
    for info in &report.records {
        println!(
            "{:<12} {:<24} exchange {:<6} type {}",
            info.code, info.name, info.exchange, info.kind
        );
    }
    if !report.invalid_codes.is_empty() {
        println!("invalid codes: {}", report.invalid_codes.join(", "));
    }
    Ok(())
}

fn print_candles(code: &str, candles: &[Candle]) {
    if candles.is_empty() {
        println!("{code}: no data");
        return;
    }
    for candle in candles {
        println!(
            "{}  open {:>10.4}  high {:>10.4}  low {:>10.4}  close {:>10.4}  volume {:>14.2}",
            candle.timestamp.format("%Y-%m-%d %H:%M"),
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume
        );
    }
}

async fn run_interactive(fetcher: &QuoteFetcher) -> Result<()> {
    cli::show_banner();

    loop {
        print!("Waiting for command: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim();
        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let result = match parts[0] {
            "exit" => {
                println!("Exiting...");
                break;
            }
            "ticks" => {
                let codes: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();
                show_ticks(fetcher, codes).await
            }
            "series" => {
                if parts.len() < 2 {
                    println!("Usage: series <code> [interval] [count]");
                    continue;
                }
                let interval = parts.get(2).copied().unwrap_or("day");
                let count = parts
                    .get(3)
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(30);
                show_series(fetcher, parts[1], interval, count).await
            }
            "info" => {
                let codes: Vec<String> = parts[1..].iter().map(|s| s.to_string()).collect();
                show_info(fetcher, codes).await
            }
            "interval" => {
                match parts.get(1).and_then(|raw| raw.parse::<u64>().ok()) {
                    Some(millis) => {
                        fetcher.set_request_interval(Duration::from_millis(millis));
                        println!("Request interval set to {millis}ms");
                    }
                    None => println!("Usage: interval <milliseconds>"),
                }
                continue;
            }
            _ => {
                println!("Unknown command. Available commands: ticks, series, info, interval, exit");
                continue;
            }
        };

        if let Err(err) = result {
            println!("Command failed: {err}");
        }
    }

    Ok(())
}
