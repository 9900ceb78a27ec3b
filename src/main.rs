use clap::Parser;

use terraform_provider_zendesk::logging::init_logging_with_default;
use terraform_provider_zendesk::{serve, ZendeskProvider};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "terraform-provider-zendesk", version = VERSION)]
struct Cli {
    /// Lower the default log level for debugging. Equivalent to
    /// RUST_LOG=debug.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging_with_default(if cli.debug { "debug" } else { "info" });

    if let Err(err) = serve(ZendeskProvider::new(VERSION)).await {
        tracing::error!(error = %err, "provider server failed");
        std::process::exit(1);
    }
}
