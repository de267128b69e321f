use anyhow::Result;
use clap::Parser;
use sortbench::cli;
use tracing_subscriber::EnvFilter;

fn init_logging(args: &cli::Cli) {
    let default = if args.silent {
        "error"
    } else if args.verbose {
        "sortbench=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(&args);
    let is_silent = args.silent;

    match cli::run(args).await {
        Ok(()) => {
            // The stdin command reader may still be blocked on a read; exit explicitly.
            std::process::exit(0);
        }
        Err(e) => {
            if is_silent {
                println!("{}", e);
                std::process::exit(1);
            } else {
                Err(e)
            }
        }
    }
}
