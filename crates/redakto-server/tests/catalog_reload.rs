use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use redakto_config::{AppConfig, Placeholders};
use redakto_models::{ModelRegistry, RegistrySettings};
use redakto_server::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

const FIRST: &str = r#"
entity_set_models:
  - entity_set_id: grascco
    corpus_name: GraSCCo
    supported_models:
      - model_id: patterns
        model_name: Pattern tagger
        model_type: NER
        model_loading_strategy: builtin
        model_impl: PatternTagger
"#;

const SECOND: &str = r#"
entity_set_models:
  - entity_set_id: grascco
    corpus_name: GraSCCo
    supported_models:
      - model_id: patterns
        model_name: Pattern tagger
        model_type: NER
        model_loading_strategy: builtin
        model_impl: PatternTagger
  - entity_set_id: custom
    corpus_name: Custom rules
    supported_models:
      - model_id: mrn
        model_name: MRN rules
        model_type: NER
        model_loading_strategy: local_disk_storage
        model_impl: PatternTagger
        model_directory_name: [mrn]
    supported_models_root_dir: ["{CONFIG_DIR}"]
"#;

async fn call(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn detect(entity_set_id: &str, model_id: &str, text: &str) -> Request<Body> {
    let body = json!({
        "entity_set_id": entity_set_id,
        "model_id": model_id,
        "fine_grained": true,
        "input_texts": [text],
    });
    Request::builder()
        .method("POST")
        .uri("/api/predict/detect_entities")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_reload_picks_up_new_entity_sets() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("entity_set_models.yml");
    std::fs::write(&catalog, FIRST).unwrap();
    std::fs::create_dir_all(dir.path().join("mrn")).unwrap();
    std::fs::write(
        dir.path().join("mrn").join("patterns.yml"),
        "patterns:\n  - label: MRN\n    pattern: 'MRN-[0-9]{4,}'\n",
    )
    .unwrap();

    let placeholders = Placeholders::new().with_path("CONFIG_DIR", dir.path());
    let registry =
        ModelRegistry::from_file(&catalog, placeholders, RegistrySettings::default()).unwrap();
    let state = AppState::new(AppConfig::default(), redakto_engine::shared(registry));
    let app = router(state.clone());

    let ids = Request::builder()
        .uri("/api/app_info/get_entity_set_ids")
        .body(Body::empty())
        .unwrap();
    let (_, body) = call(&app, ids).await;
    assert_eq!(body, json!(["grascco"]));

    let (status, body) = call(&app, detect("custom", "mrn", "Fall MRN-4711")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "EntitySetNotFoundError");

    std::fs::write(&catalog, SECOND).unwrap();
    state.prediction.reload().await.unwrap();

    let (status, body) = call(&app, detect("custom", "mrn", "Fall MRN-4711 aufgenommen")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"][0][0]["Token"], "MRN-4711");
    assert_eq!(body["output"][0][0]["Start"], 5);
}

#[tokio::test]
async fn test_missing_pattern_file_is_model_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("entity_set_models.yml");
    std::fs::write(&catalog, SECOND).unwrap();

    let placeholders = Placeholders::new().with_path("CONFIG_DIR", dir.path());
    let registry =
        ModelRegistry::from_file(&catalog, placeholders, RegistrySettings::default()).unwrap();
    let app = router(AppState::new(AppConfig::default(), redakto_engine::shared(registry)));

    let (status, body) = call(&app, detect("custom", "mrn", "Fall MRN-4711")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "ModelLoadError");
    assert_eq!(body["path"], "/api/predict/detect_entities");
}
