// tests/ingest_pipeline.rs
use anyhow::Result;
use async_trait::async_trait;
use signal_radar::ingest::types::{RawItem, SourceProvider};

struct MockProvider;

#[async_trait]
impl SourceProvider for MockProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        Ok(vec![
            RawItem::new(
                "<b>Hello&nbsp;world</b> &ldquo;ok&rdquo;",
                "Forum",
                "2024-01-16T10:00:00Z",
                "EN",
                None,
            ),
            RawItem::new("<p> </p>", "Forum", "2024-01-16T10:00:00Z", "EN", None),
        ])
    }
    fn name(&self) -> &'static str {
        "MockProvider"
    }
}

#[tokio::test]
async fn smoke_ingest_normalizes_and_drops_empty() {
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(MockProvider)];
    let report = signal_radar::ingest::run_once(&providers, &[]).await;
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.filtered, 1);
    assert!(report.rejected.is_empty());
    assert!(report.failed_providers.is_empty());
    assert_eq!(report.items[0].text, r#"Hello world "ok""#);
}
