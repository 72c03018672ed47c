//! Demo of a full payment flow against an in-process server.
//!
//! Run with: cargo run -p cryptopay-app --example payment_flow

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tempfile::tempdir;
use tokio::net::TcpListener;

use cryptopay_client::CryptopayClient;
use cryptopay_compliance::{ComplianceRegistry, JurisdictionSettings};
use cryptopay_hex::inbound::{HttpServer, ServerSettings};
use cryptopay_hex::{PaymentService, ServicePorts, ServiceSettings};
use cryptopay_repo::{SimulatedLedger, TracingNotifier, build_archive};
use cryptopay_types::{CreatePaymentRequest, PaymentStatus};
use rate_oracle::{CachedRateOracle, StaticRateTable};

const MERCHANT_ID: &str = "demo-merchant";
const API_SECRET: &str = "demo-api-secret";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Use a temp file-backed SQLite archive
    let tmp = tempdir()?;
    let db_url = format!("sqlite://{}?mode=rwc", tmp.path().join("payments.db").display());
    println!("🚀 Starting server, archive: {db_url}");

    let service = PaymentService::new(
        ServicePorts {
            registry: Arc::new(ComplianceRegistry::standard(&JurisdictionSettings::default())),
            // Every address confirms two seconds after it is issued
            ledger: Arc::new(SimulatedLedger::new().with_auto_confirm(Duration::from_secs(2))),
            rates: Arc::new(CachedRateOracle::new(
                StaticRateTable::new().with_fluctuation(dec!(0.5)),
                Duration::from_secs(60),
            )),
            archive: build_archive(Some(&db_url)).await?,
            notifier: Arc::new(TracingNotifier),
        },
        ServiceSettings {
            poll_interval: Duration::from_millis(500),
            webhook_secret: "demo-webhook-secret".into(),
            data_encryption_key: "demo-data-key".into(),
            ..ServiceSettings::default()
        },
    );
    let server = HttpServer::new(
        Arc::new(service),
        ServerSettings {
            merchant_id: Some(MERCHANT_ID.into()),
            api_secret: API_SECRET.into(),
            ..ServerSettings::default()
        },
    );

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let router = server.router();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {e}");
        }
    });

    let base_url = format!("http://{addr}");
    let client = CryptopayClient::new(&base_url).with_credentials(MERCHANT_ID, API_SECRET);
    println!("✅ Server health: {}", client.health().await?);

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: compliance review
    // ─────────────────────────────────────────────────────────────────────────

    let sg = client.jurisdiction("SG").await?;
    println!(
        "📋 {}: KYC from {} {}, travel rule from {:?}",
        sg.country_name, sg.kyc_threshold, sg.currency_code, sg.travel_rule_threshold
    );

    let rejected = client
        .create_payment(&CreatePaymentRequest::new(dec!(1200), "SGD", "BTC", "SG"))
        .await;
    if let Err(e) = rejected {
        println!("✅ Rejected without KYC: {e}");
    }

    let mut th = CreatePaymentRequest::new(dec!(500), "THB", "BTC", "TH");
    th.purpose = Some("payment".into());
    if let Err(e) = client.create_payment(&th).await {
        println!("✅ Rejected in Thailand: {e}");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: payment lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    let req = CreatePaymentRequest::new(dec!(2000), "SGD", "USDT", "SG")
        .with_customer("Alice Tan", "alice@example.com");
    let created = client.create_payment(&req).await?;
    println!(
        "✅ Created payment {}: send {} USDT to {}",
        created.payment_id, created.crypto_amount, created.address
    );

    let to_cancel = client
        .create_payment(&CreatePaymentRequest::new(dec!(50), "SGD", "BTC", "SG"))
        .await?;
    let cancelled = client.cancel_payment(to_cancel.payment_id).await?;
    println!("✅ Cancelled payment {}: {}", cancelled.id, cancelled.status);

    for _ in 0..20 {
        let payment = client.get_payment(created.payment_id).await?;
        if payment.status == PaymentStatus::Completed {
            println!("✅ Payment {} completed", payment.id);
            break;
        }
        println!("   waiting for confirmation ({})", payment.status);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    let now = chrono::Utc::now();
    let reports = client
        .reports("SG", now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
        .await?;
    for report in &reports.reports {
        println!(
            "📄 {} ({}): {} payments, {} completed, volume {} SGD",
            report.report_type,
            report.regulator,
            report.payment_count,
            report.completed_count,
            report.completed_volume
        );
    }

    let rate = client.exchange_rate("SGD", "BTC").await?;
    println!("📈 1 SGD = {} BTC", rate.rate);

    println!("\n🎉 Demo completed successfully!");
    Ok(())
}
