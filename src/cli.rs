use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "quote-cli")]
#[command(about = "Fetch market quotes through a throttled, strictly serialized dispatch queue")]
#[command(version)]
pub struct Cli {
    /// Minimum milliseconds between outbound requests (defaults to the
    /// free-tier spacing of 11000).
    #[arg(short, long)]
    pub interval_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Latest trade ticks for the given codes (defaults to the major indices)
    Ticks {
        /// Codes to query, e.g. 600519.SH AAPL.US BTCUSDT
        codes: Vec<String>,
    },

    /// Recent bars for a single code
    Series {
        code: String,

        /// Bar granularity: 1m, 5m, 15m, 30m, 1h or day
        #[arg(short, long, default_value = "day")]
        interval: String,

        #[arg(short, long, default_value_t = 30)]
        count: u32,
    },

    /// Sequential series for several codes, tolerating per-code failures
    Batch {
        /// Codes to query (defaults to the preset stock list)
        codes: Vec<String>,

        #[arg(short, long, default_value = "day")]
        interval: String,

        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },

    /// Listing metadata for stock codes (defaults to the preset stock list)
    Info { codes: Vec<String> },

    /// Start interactive mode
    Interactive,
}

pub fn show_banner() {
    println!("# ------------------------------------------------------------------------ #");
    println!("# Quote Fetcher");
    println!("# All requests share one throttled queue; expect a pause between calls.");
    println!("#");
    println!("# Executing date: {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
    println!("#");
    println!("# --------------------------- COMMAND LIST ------------------------------- #");
    println!("#");
    println!("#   ticks [codes...]:               Latest trade ticks");
    println!("#   series <code> [interval] [n]:   Recent bars for one code");
    println!("#   info [codes...]:                Listing metadata (stock codes only)");
    println!("#   interval <ms>:                  Retarget the request spacing");
    println!("#   exit:                           Exit the program");
    println!("#");
    println!("# ------------------------------------------------------------------------ #");
    println!();
}
