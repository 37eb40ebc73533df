use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

mod extract;
mod reviews;

#[derive(Debug, Parser)]
#[command(name = "tokoharvest")]
#[command(about = "Tokopedia product and review harvesting pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a product list from captured discovery responses
    Extract {
        /// Capture files holding raw discovery response bodies
        #[arg(long, required = true, num_args = 1..)]
        captures: Vec<PathBuf>,

        /// Where to write the extracted product list
        #[arg(long, default_value = "products.json")]
        out: PathBuf,
    },
    /// Fetch customer reviews for every product in a product list
    Reviews {
        /// Product list produced by `extract`
        #[arg(long)]
        products: PathBuf,

        /// Where to write the product list with reviews attached
        #[arg(long, default_value = "products_with_reviews.json")]
        out: PathBuf,

        /// Also write a per-product failure report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Preview the run without sending any requests
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Extract { captures, out }) => extract::run(&captures, &out),
        Some(Commands::Reviews {
            products,
            out,
            report,
            dry_run,
        }) => reviews::run(&products, &out, report.as_deref(), dry_run).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
