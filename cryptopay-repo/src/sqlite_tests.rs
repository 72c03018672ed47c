//! SQLite archive integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use cryptopay_types::{
        CountryCode, Payment, PaymentArchive, PaymentId, PaymentStatus, ReportPeriod,
    };
    use rust_decimal_macros::dec;

    use crate::SqliteArchive;

    async fn setup_archive(dir: &tempfile::TempDir) -> SqliteArchive {
        let path = dir.path().join("archive.db");
        SqliteArchive::new(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap()
    }

    fn completed_payment() -> Payment {
        let mut p = Payment::new(
            dec!(1200.50),
            "SGD",
            "BTC",
            CountryCode::new("SG"),
            dec!(96.04),
            Duration::minutes(60),
        )
        .with_order_id(Some("order-42".into()));
        p.assign("bc1qexample", dec!(0.02280950), dec!(0.000019)).unwrap();
        p.transition_to(PaymentStatus::Completed).unwrap();
        p
    }

    #[tokio::test]
    async fn test_save_and_get_payment() {
        let dir = tempfile::tempdir().unwrap();
        let archive = setup_archive(&dir).await;
        let payment = completed_payment();

        archive.save(&payment).await.unwrap();
        let fetched = archive.get(payment.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, payment.id);
        assert_eq!(fetched.status, PaymentStatus::Completed);
        assert_eq!(fetched.amount, dec!(1200.50));
        assert_eq!(fetched.crypto_amount, dec!(0.02280950));
        assert_eq!(fetched.order_id.as_deref(), Some("order-42"));
        assert_eq!(fetched.country_code.as_str(), "SG");
        assert_eq!(fetched.expires_at, payment.expires_at);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = setup_archive(&dir).await;
        let mut payment = completed_payment();

        archive.save(&payment).await.unwrap();
        payment.travel_rule = Some("sealed".into());
        archive.save(&payment).await.unwrap();

        let fetched = archive.get(payment.id).await.unwrap().unwrap();
        assert_eq!(fetched.travel_rule.as_deref(), Some("sealed"));
    }

    #[tokio::test]
    async fn test_get_missing_payment() {
        let dir = tempfile::tempdir().unwrap();
        let archive = setup_archive(&dir).await;

        assert!(archive.get(PaymentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_processed_events() {
        let dir = tempfile::tempdir().unwrap();
        let archive = setup_archive(&dir).await;

        assert!(!archive.is_event_processed("evt_1").await.unwrap());
        archive.mark_event_processed("evt_1").await.unwrap();
        archive.mark_event_processed("evt_1").await.unwrap();
        assert!(archive.is_event_processed("evt_1").await.unwrap());
        assert!(!archive.is_event_processed("evt_2").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_between() {
        let dir = tempfile::tempdir().unwrap();
        let archive = setup_archive(&dir).await;

        let recent = completed_payment();
        let mut old = completed_payment();
        old.created_at -= Duration::days(2);
        let mut other_country = completed_payment();
        other_country.country_code = CountryCode::new("MY");
        for p in [&recent, &old, &other_country] {
            archive.save(p).await.unwrap();
        }

        let now = Utc::now();
        let period = ReportPeriod::new(now - Duration::hours(1), now + Duration::hours(1)).unwrap();
        let listed = archive
            .list_between(&CountryCode::new("SG"), period)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, recent.id);

        let wide = ReportPeriod::new(now - Duration::days(3), now + Duration::hours(1)).unwrap();
        let listed = archive
            .list_between(&CountryCode::new("SG"), wide)
            .await
            .unwrap();
        assert_eq!(
            listed.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![old.id, recent.id]
        );
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let archive = SqliteArchive::new("sqlite::memory:").await.unwrap();
        archive.mark_event_processed("evt").await.unwrap();
        assert!(archive.is_event_processed("evt").await.unwrap());
    }
}
