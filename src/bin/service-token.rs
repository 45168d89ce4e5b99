use anyhow::Context;
use careerdesk::config;
use careerdesk::net::service_token::ServiceTokenSigner;
use clap::Parser;

// cargo run --bin service-token -- --secret s3cret --timestamp 1700000000

#[derive(Debug, Parser)]
#[command(name = "service-token", version, about = "Print a value for the X-Service-Token header")]
struct Args {
    /// Shared secret (if omitted, use CAREERDESK_SERVICE_SECRET)
    #[arg(long)]
    secret: Option<String>,

    /// Unix timestamp to sign (if omitted, now)
    #[arg(long)]
    timestamp: Option<i64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let secret = match args.secret {
        Some(secret) => secret,
        None => config::Config::from_env()?
            .service_secret
            .context("no --secret given and CAREERDESK_SERVICE_SECRET is not set")?,
    };

    let signer = ServiceTokenSigner::new(secret);
    let token = match args.timestamp {
        Some(ts) => signer.token_at(ts),
        None => signer.token(),
    };

    println!("{token}");
    Ok(())
}
