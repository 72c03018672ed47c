//! Cryptopay CLI
//!
//! Command-line interface for the Cryptopay API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use cryptopay_client::CryptopayClient;
use cryptopay_repo::security::{SignatureVerifier, SignedHeaders};
use cryptopay_types::{CreatePaymentRequest, PaymentId};

#[derive(Parser)]
#[command(name = "cryptopay")]
#[command(author, version, about = "Cryptopay API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Cryptopay API
    #[arg(long, env = "CRYPTOPAY_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Merchant id sent with every request
    #[arg(long, env = "MERCHANT_ID", default_value = "merchant")]
    merchant_id: String,

    /// Secret used to sign API requests
    #[arg(long, env = "MERCHANT_API_SECRET", default_value = "")]
    api_secret: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment operations
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Show a jurisdiction's regulatory profile
    Jurisdiction {
        /// ISO country code (BN, KH, ID, LA, MY, SG, TH, VN)
        code: String,
        /// Classify this asset instead of printing the profile
        #[arg(long)]
        asset: Option<String>,
    },
    /// Build a jurisdiction's regulatory reports
    Reports {
        /// ISO country code
        code: String,
        /// Period start, RFC 3339
        #[arg(long)]
        from: DateTime<Utc>,
        /// Period end (exclusive), RFC 3339
        #[arg(long)]
        to: DateTime<Utc>,
    },
    /// Show the current exchange rate
    Rate {
        #[arg(long)]
        fiat: String,
        #[arg(long)]
        crypto: String,
    },
    /// Start a local listener that verifies signed payment events
    Listen {
        /// Port to listen on
        #[arg(long, default_value = "4000")]
        port: u16,
        /// Secret the server signs events with
        #[arg(long, env = "WEBHOOK_SECRET")]
        secret: String,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Create a payment
    Create {
        #[arg(long)]
        amount: Decimal,
        /// Fiat currency of the jurisdiction
        #[arg(long)]
        currency: String,
        #[arg(long)]
        crypto: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        order_id: Option<String>,
        #[arg(long)]
        purpose: Option<String>,
    },
    /// Get payment details
    Get {
        /// Payment ID (UUID)
        id: String,
    },
    /// Cancel a pending payment
    Cancel {
        /// Payment ID (UUID)
        id: String,
    },
}

fn parse_payment_id(s: &str) -> Result<PaymentId> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("Invalid payment ID: {}", s))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let client =
        CryptopayClient::new(&cli.api_url).with_credentials(&cli.merchant_id, &cli.api_secret);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Payment { action } => match action {
            PaymentCommands::Create {
                amount,
                currency,
                crypto,
                country,
                name,
                email,
                order_id,
                purpose,
            } => {
                let mut req = CreatePaymentRequest::new(amount, currency, crypto, country);
                req.customer_name = name;
                req.customer_email = email;
                req.order_id = order_id;
                req.purpose = purpose;
                print_json(&client.create_payment(&req).await?)?;
            }
            PaymentCommands::Get { id } => {
                print_json(&client.get_payment(parse_payment_id(&id)?).await?)?;
            }
            PaymentCommands::Cancel { id } => {
                print_json(&client.cancel_payment(parse_payment_id(&id)?).await?)?;
            }
        },

        Commands::Jurisdiction { code, asset } => match asset {
            Some(asset) => print_json(&client.classify_asset(&code, &asset).await?)?,
            None => print_json(&client.jurisdiction(&code).await?)?,
        },

        Commands::Reports { code, from, to } => {
            print_json(&client.reports(&code, from, to).await?)?;
        }

        Commands::Rate { fiat, crypto } => {
            print_json(&client.exchange_rate(&fiat, &crypto).await?)?;
        }

        Commands::Listen { port, secret } => {
            let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
            println!("Listening for payment events on http://{}/webhook", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, listener_router(&secret)).await?;
        }
    }

    Ok(())
}

fn listener_router(secret: &str) -> Router {
    let verifier = SignatureVerifier::new(
        secret,
        Duration::from_secs(300),
        Duration::from_secs(600),
    );
    Router::new()
        .route("/webhook", post(handle_webhook))
        .with_state(Arc::new(verifier))
}

async fn handle_webhook(
    State(verifier): State<Arc<SignatureVerifier>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let verified = SignedHeaders::from_lookup(|name| {
        headers.get(name).and_then(|v| v.to_str().ok())
    })
    .and_then(|signed| verifier.verify(&signed, &body));

    match verified {
        Ok(()) => {
            println!("✓ verified event");
            match serde_json::from_slice::<serde_json::Value>(&body) {
                Ok(event) => println!("{:#}", event),
                Err(_) => println!("{}", String::from_utf8_lossy(&body)),
            }
            println!("----------------------------------------");
            StatusCode::OK
        }
        Err(e) => {
            println!("✗ rejected event: {}", e);
            StatusCode::UNAUTHORIZED
        }
    }
}
