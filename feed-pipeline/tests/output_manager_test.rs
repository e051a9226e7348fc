mod common;

use common::{deliveries, init_tracing, new_manager, DeliveryLog, RecordingPlugin};
use feed_pipeline::{Article, PipelineError, PluginRegistry, Result, StageKind, StageRequest};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn registry_with(plugins: Vec<RecordingPlugin>) -> Result<Arc<PluginRegistry>> {
    let registry = Arc::new(PluginRegistry::new());
    for plugin in plugins {
        registry.register_output_plugin(Arc::new(plugin)).await?;
    }
    Ok(registry)
}

#[tokio::test]
async fn test_output_crud() -> Result<()> {
    init_tracing();
    let manager = new_manager(&Arc::new(PluginRegistry::new()));

    let provider = manager
        .add(StageRequest::new("stdout").with_tags("test").with_prop("format", "text"))
        .await?;
    let def = provider.def();
    assert_eq!(def.id, 1);
    assert_eq!(def.name, "stdout");
    assert!(!def.enabled);
    assert_eq!(def.prop_str("format"), Some("text"));

    let updated = manager
        .update(1, StageRequest::new("http").enabled(true).with_prop("format", "json"))
        .await?;
    assert_eq!(updated.def().name, "stdout");
    assert_eq!(updated.def().prop_str("format"), Some("json"));
    assert!(updated.def().enabled);
    assert_eq!(manager.list_defs().await.len(), 1);

    manager.remove(1).await?;
    let err = manager.get(1).await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound { kind: StageKind::Output, id: 1 }));
    assert_eq!(err.to_string(), "output not found: 1");
    assert!(manager.remove(1).await.unwrap_err().is_not_found());
    Ok(())
}

#[tokio::test]
async fn test_unknown_output_is_rejected() -> Result<()> {
    let manager = new_manager(&Arc::new(PluginRegistry::new()));
    let err = manager.add(StageRequest::new("carrier-pigeon")).await.unwrap_err();
    assert_eq!(err.to_string(), "unsupported output: carrier-pigeon");
    assert!(manager.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_http_output_requires_valid_url() -> Result<()> {
    let manager = new_manager(&Arc::new(PluginRegistry::new()));

    let missing = manager.add(StageRequest::new("http")).await.unwrap_err();
    assert!(matches!(missing, PipelineError::Construction { kind: StageKind::Output, .. }));
    assert!(missing.to_string().contains("missing url"));

    let invalid = manager
        .add(StageRequest::new("http").with_prop("url", "ftp://example.com"))
        .await;
    assert!(invalid.is_err());
    assert!(manager.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_partial_failure_isolation() -> Result<()> {
    init_tracing();
    let log = DeliveryLog::default();
    let registry = registry_with(vec![
        RecordingPlugin { name: "down", fail: true, log: log.clone() },
        RecordingPlugin { name: "up", fail: false, log: log.clone() },
    ])
    .await?;
    let manager = new_manager(&registry);
    manager.add(StageRequest::new("down").enabled(true)).await?;
    manager.add(StageRequest::new("up").enabled(true)).await?;

    let report = manager.dispatch(&Article::new("story", "")).await;

    assert_eq!(report.delivered, vec![2]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].id, 1);
    assert_eq!(report.failures[0].name, "down");
    assert!(report.failures[0].error.to_string().contains("down is down"));
    assert_eq!(
        deliveries(&log),
        vec![
            ("down".to_string(), "story".to_string()),
            ("up".to_string(), "story".to_string()),
        ]
    );
    assert!(matches!(
        report.into_result(),
        Err(PipelineError::DispatchFailed { failed: 1, total: 2 })
    ));
    Ok(())
}

#[tokio::test]
async fn test_dispatch_scoping() -> Result<()> {
    let log = DeliveryLog::default();
    let registry = registry_with(vec![
        RecordingPlugin { name: "news", fail: false, log: log.clone() },
        RecordingPlugin { name: "sports", fail: false, log: log.clone() },
        RecordingPlugin { name: "all", fail: false, log: log.clone() },
        RecordingPlugin { name: "off", fail: false, log: log.clone() },
    ])
    .await?;
    let manager = new_manager(&registry);
    manager.add(StageRequest::new("news").enabled(true).with_tags("news")).await?;
    manager.add(StageRequest::new("sports").enabled(true).with_tags("sports")).await?;
    manager.add(StageRequest::new("all").enabled(true)).await?;
    manager.add(StageRequest::new("off").with_tags("news")).await?;

    let report = manager.dispatch(&Article::new("story", "").with_tags(["news"])).await;

    assert!(report.is_success());
    assert_eq!(report.delivered, vec![1, 3]);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.into_result()?, vec![1, 3]);

    let names: Vec<String> = deliveries(&log).into_iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["news", "all"]);
    Ok(())
}

#[tokio::test]
async fn test_available_outputs() -> Result<()> {
    let registry = registry_with(vec![RecordingPlugin {
        name: "archive",
        fail: false,
        log: DeliveryLog::default(),
    }])
    .await?;
    let manager = new_manager(&registry);

    let names: Vec<String> =
        manager.available_outputs().await.into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["stdout", "http", "archive"]);
    Ok(())
}

#[tokio::test]
async fn test_http_output_posts_article() -> Result<()> {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({"title": "story"})))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = new_manager(&Arc::new(PluginRegistry::new()));
    for route in ["hook", "broken"] {
        let url = format!("{}/{}", server.uri(), route);
        manager
            .add(StageRequest::new("http").enabled(true).with_prop("url", url))
            .await?;
    }

    let report = manager.dispatch(&Article::new("story", "https://example.com/story")).await;

    assert_eq!(report.delivered, vec![1]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.to_string().contains("500"));

    let defs = manager.list_defs().await;
    assert_eq!(defs[0].prop_u64("nbSuccess"), Some(1));
    assert_eq!(defs[1].prop_u64("nbError"), Some(1));
    Ok(())
}
