use anyhow::Result;
use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use omikuji::adapters::{FixedClock, FixedRandom};
use omikuji::domain::ports::ResultStore;
use omikuji::{build_service, Category, ErrorKind, FileStore, OmikujiConfig, OmikujiService, ReportZone};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tempfile::TempDir;

fn utc_zone() -> ReportZone {
    ReportZone::Fixed(FixedOffset::east_opt(0).unwrap())
}

/// 抽籤、歷史、統計整條流程都走檔案儲存
#[tokio::test]
async fn test_draw_history_and_stats_through_file_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(temp_dir.path(), "results"));
    let service = OmikujiService::new(Arc::clone(&store)).with_zone(utc_zone());

    let mut drawn = Vec::new();
    for _ in 0..12 {
        drawn.push(service.draw().await?);
    }
    assert!(drawn.iter().all(|r| Category::ALL.contains(&r.outcome)));

    let ids: HashSet<&str> = drawn.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids.len(), drawn.len());

    let history = service.history(None).await;
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].id, drawn.last().unwrap().id);
    assert!(history.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let today = Utc::now().date_naive();
    let report = service
        .statistics_for_days(today - Duration::days(1), today + Duration::days(1))
        .await?;
    assert_eq!(report.result.total, 12);
    assert_eq!(report.legend.iter().map(|l| l.count).sum::<u64>(), 12);

    let spanned: f64 = report.segments.iter().map(|s| s.span()).sum();
    assert!((spanned - 100.0).abs() < 1e-9);
    Ok(())
}

#[tokio::test]
async fn test_statistics_window_boundaries() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(FileStore::new(temp_dir.path(), "results"));

    let start = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 2, 2, 23, 59, 59).unwrap() + Duration::milliseconds(999);
    let one_ms = Duration::milliseconds(1);

    store.append(Category::Daikichi, start).await?;
    store.append(Category::Shokichi, end).await?;
    store.append(Category::Kyo, start - one_ms).await?;
    store.append(Category::Kyo, end + one_ms).await?;

    let service = OmikujiService::new(store).with_zone(utc_zone());
    let report = service.statistics(Some("2025-02-01"), Some("2025-02-02")).await?;

    assert_eq!(report.range.start(), start);
    assert_eq!(report.range.end(), end);
    assert_eq!(report.result.count(Category::Daikichi), 1);
    assert_eq!(report.result.count(Category::Shokichi), 1);
    assert_eq!(report.result.count(Category::Kyo), 0);
    assert_eq!(report.result.total, 2);
    Ok(())
}

#[tokio::test]
async fn test_statistics_rejects_bad_input() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let service = OmikujiService::new(Arc::new(FileStore::new(temp_dir.path(), "results")));

    let reversed = service
        .statistics(Some("2025-03-02"), Some("2025-03-01"))
        .await
        .unwrap_err();
    assert_eq!(reversed.kind(), ErrorKind::InvalidRange);

    let garbage = service.statistics(Some("03/01/2025"), None).await.unwrap_err();
    assert_eq!(garbage.kind(), ErrorKind::InvalidRange);

    // 沒有任何查詢時不應產生檔案
    assert!(!temp_dir.path().join("results.jsonl").exists());
    Ok(())
}

#[tokio::test]
async fn test_empty_period_yields_sentinel_segment() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let service = OmikujiService::new(Arc::new(FileStore::new(temp_dir.path(), "results")))
        .with_zone(utc_zone());

    let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let report = service.statistics_for_days(day, day).await?;

    assert_eq!(report.result.total, 0);
    assert_eq!(report.segments.len(), 1);
    assert!(report.segments[0].is_empty_sentinel());
    assert!(report.legend.iter().all(|l| l.percent == 0));
    Ok(())
}

#[tokio::test]
async fn test_service_built_from_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let data_dir = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let config = OmikujiConfig::from_toml_str(&format!(
        r#"
[store]
backend = "file"
path = "{}"
collection = "draws"

[history]
default_limit = 2

[stats]
utc_offset = "+09:00"
"#,
        data_dir
    ))?;

    let now = Utc.with_ymd_and_hms(2025, 7, 7, 3, 0, 0).unwrap();
    let service = build_service(&config)?
        .with_clock(Arc::new(FixedClock(now)))
        .with_random(Arc::new(FixedRandom(0)));

    for _ in 0..3 {
        assert_eq!(service.draw().await?.outcome, Category::Daikichi);
    }
    assert!(temp_dir.path().join("draws.jsonl").exists());
    assert_eq!(service.history(None).await.len(), 2);
    assert_eq!(
        service.history(NonZeroUsize::new(10)).await.len(),
        3
    );

    let (start, end) = service.default_window();
    assert_eq!(end, NaiveDate::from_ymd_opt(2025, 7, 7).unwrap());
    assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());

    let report = service.statistics(None, None).await?;
    assert_eq!(report.result.count(Category::Daikichi), 3);
    assert_eq!(report.legend[0].percent, 100);
    Ok(())
}

#[tokio::test]
async fn test_missing_store_path_is_a_configuration_error() {
    let config = OmikujiConfig::default();
    let err = build_service(&config).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
