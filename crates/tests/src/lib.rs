//! # Integration Tests
//!
//! Cross-crate tests wiring real components together:
//! - field preservation through parse, persist, and query
//! - garbage isolation on the serial path
//! - broadcast ordering and persist-before-publish
//! - sensor alias resolution
//! - the HTTP surface end to end

#[cfg(test)]
mod field_preservation {
    use contracts::ReadingStore;
    use storage::SqliteStore;

    /// Any subset of fields set on the wire stays exactly that subset
    /// through parse, persist, and query; unset stays unset.
    #[tokio::test]
    async fn test_partial_reading_round_trips_unset_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("p1.db")).unwrap();

        let reading = serial_link::parse_line(
            br#"{"pressao02_hx710b": 101.3, "vibracao_vib_z": 0.5, "chave_fim_de_curso": 1}"#,
        )
        .unwrap();
        store.insert(reading).await.unwrap();

        let rows = store.query_recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        let got = &rows[0].reading;
        assert_eq!(got.pressure, Some(101.3));
        assert_eq!(got.vibration_z, Some(0.5));
        assert_eq!(got.limit_switch, Some(true));
        assert_eq!(got.temperature, None);
        assert_eq!(got.vibration_x, None);
        assert_eq!(got.vibration_y, None);
        assert_eq!(got.speed, None);

        // The API surface serializes unset as null, never as zero.
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["pressao02_hx710b"], 101.3);
        assert!(json["temperatura_ds18b20"].is_null());
        assert!(json["velocidade_m_s"].is_null());
    }

    #[tokio::test]
    async fn test_all_unset_reading_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("p1b.db")).unwrap();

        let reading = serial_link::parse_line(b"{}").unwrap();
        let persisted = store.insert(reading).await.unwrap();

        assert!(persisted.reading.is_empty());
        let rows = store.query_recent(1).await.unwrap();
        assert!(rows[0].reading.is_empty());
    }
}

#[cfg(test)]
mod garbage_isolation {
    use std::sync::Arc;

    use contracts::ReadingStore;
    use ingestion::{run_ingest_loop, IngestionPipeline};
    use serial_link::{LineFramer, LineRejection};
    use storage::SqliteStore;

    /// A malformed line immediately followed by a valid one yields exactly
    /// one reading; the malformed line never reaches the pipeline.
    #[test]
    fn test_malformed_line_produces_no_reading() {
        let mut framer = LineFramer::new(1024);
        let lines = framer.feed(b"not-json-at-all\n{\"temperatura_ds18b20\": 23.5}\n");
        assert_eq!(lines.len(), 2);

        let parsed: Vec<_> = lines
            .iter()
            .filter_map(|line| serial_link::parse_line(line).ok())
            .collect();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].temperature, Some(23.5));
    }

    #[test]
    fn test_rejection_classes() {
        assert_eq!(serial_link::parse_line(b"   "), Err(LineRejection::Empty));
        assert_eq!(
            serial_link::parse_line(b"boot banner v2.1"),
            Err(LineRejection::NotObject)
        );
        assert!(matches!(
            serial_link::parse_line(b"{\"velocidade_m_s\": "),
            Err(LineRejection::MalformedSyntax(_))
        ));
    }

    /// Same property through the full serial path: garbage is dropped at
    /// the parser, the loop keeps running, and the next valid line lands
    /// in the store.
    #[tokio::test]
    async fn test_ingest_loop_processes_lines_after_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("p2.db")).unwrap();
        let hub = Arc::new(broadcast::BroadcastHub::new(8));
        let pipeline = Arc::new(IngestionPipeline::new(store.clone(), hub));

        let (tx, rx) = async_channel::bounded(8);
        let drain = tokio::spawn(run_ingest_loop(rx, pipeline));

        let session_lines: [&[u8]; 3] = [
            b"not-json-at-all",
            b"{\"velocidade_m_s\": 2.0}",
            b"{\"velocidade_m_s\": 3.0}",
        ];
        for line in session_lines {
            if let Ok(reading) = serial_link::parse_line(line) {
                tx.send(reading).await.unwrap();
            }
        }
        drop(tx);
        drain.await.unwrap();

        assert_eq!(store.count_all().await.unwrap(), 2);
        let rows = store.query_recent(10).await.unwrap();
        assert_eq!(rows[0].reading.speed, Some(3.0));
        assert_eq!(rows[1].reading.speed, Some(2.0));
    }
}

#[cfg(test)]
mod broadcast_ordering {
    use std::sync::Arc;

    use broadcast::BroadcastHub;
    use contracts::{
        ContractError, PersistedReading, Reading, ReadingStore, SensorField, SensorRow,
    };
    use ingestion::{IngestError, IngestionPipeline};
    use storage::SqliteStore;

    /// A store that refuses every insert.
    struct FailingStore;

    impl ReadingStore for FailingStore {
        async fn insert(&self, _reading: Reading) -> Result<PersistedReading, ContractError> {
            Err(ContractError::store("insert", "injected failure"))
        }

        async fn count_all(&self) -> Result<i64, ContractError> {
            Ok(0)
        }

        async fn count_since(&self, _window_secs: i64) -> Result<i64, ContractError> {
            Ok(0)
        }

        async fn query_recent(&self, _limit: u32) -> Result<Vec<PersistedReading>, ContractError> {
            Ok(Vec::new())
        }

        async fn query_sensor_column(
            &self,
            _field: SensorField,
            _limit: u32,
            _offset: u32,
        ) -> Result<Vec<SensorRow>, ContractError> {
            Ok(Vec::new())
        }
    }

    /// One observer sees N ingested readings in persist order.
    #[tokio::test]
    async fn test_observer_receives_in_ingest_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("p3.db")).unwrap();
        let hub = Arc::new(BroadcastHub::new(64));
        let pipeline = IngestionPipeline::new(store, Arc::clone(&hub));
        let mut observer = hub.subscribe();

        let mut ids = Vec::new();
        for i in 0..20 {
            let persisted = pipeline
                .ingest(Reading {
                    speed: Some(i as f64),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(persisted.id);
        }

        for (i, expected_id) in ids.iter().enumerate() {
            let delivered = observer.recv().await.unwrap();
            assert_eq!(delivered.id, *expected_id);
            assert_eq!(delivered.reading.speed, Some(i as f64));
        }
    }

    /// Persistence failure means no observer sees the reading.
    #[tokio::test]
    async fn test_no_broadcast_without_persist() {
        let hub = Arc::new(BroadcastHub::new(8));
        let pipeline = IngestionPipeline::new(FailingStore, Arc::clone(&hub));
        let mut observer = hub.subscribe();

        let result = pipeline
            .ingest(Reading {
                temperature: Some(23.5),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(IngestError::Store(_))));
        assert!(observer.try_recv().is_none());
        assert_eq!(hub.metrics().delivered_count(), 0);
    }
}

#[cfg(test)]
mod sensor_aliases {
    use contracts::{ContractError, Reading, ReadingStore};
    use storage::{QueryLimits, QueryService, SqliteStore};

    async fn seeded_service(db: &str) -> (tempfile::TempDir, QueryService<SqliteStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join(db)).unwrap();
        for i in 0..5 {
            store
                .insert(Reading {
                    vibration_x: Some(i as f64 / 10.0),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        (dir, QueryService::new(store, QueryLimits::default()))
    }

    /// Alias and canonical key return identical result sets for identical
    /// pagination arguments.
    #[tokio::test]
    async fn test_alias_matches_canonical_key() {
        let (_dir, service) = seeded_service("p5.db").await;

        let by_alias = service.by_sensor("vx", Some(2), Some(1)).await.unwrap();
        let by_canonical = service
            .by_sensor("vibracao_vib_x", Some(2), Some(1))
            .await
            .unwrap();

        assert_eq!(by_alias, by_canonical);
        assert_eq!(by_alias.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_key_is_client_error() {
        let (_dir, service) = seeded_service("p5b.db").await;

        let err = service
            .by_sensor("bogus", Some(50), Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidSensorKey { .. }));
        assert!(err.is_client_error());
    }
}

#[cfg(test)]
mod http_api {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use broadcast::BroadcastHub;
    use contracts::{Reading, ReadingStore};
    use ingestion::IngestionPipeline;
    use server::{build_router, AppState};
    use storage::{QueryLimits, QueryService, SqliteStore};

    fn build_stack(
        db: &str,
    ) -> (
        tempfile::TempDir,
        SqliteStore,
        Arc<BroadcastHub>,
        axum::Router,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join(db)).unwrap();
        let hub = Arc::new(BroadcastHub::new(16));
        let state = AppState {
            pipeline: Arc::new(IngestionPipeline::new(store.clone(), Arc::clone(&hub))),
            query: Arc::new(QueryService::new(store.clone(), QueryLimits::default())),
            hub: Arc::clone(&hub),
        };
        let router = build_router(state);
        (dir, store, hub, router)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    /// HTTP push ingestion answers 201 with the persisted reading, and a
    /// subscribed observer receives the same payload.
    #[tokio::test]
    async fn test_push_ingest_created_and_broadcast() {
        let (_dir, _store, hub, router) = build_stack("e2e1.db");
        let mut observer = hub.subscribe();

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/readings/ingest")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"temperatura_ds18b20": 23.5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert!(json["id"].is_i64());
        assert!(json["timestamp"].is_string());
        assert_eq!(json["temperatura_ds18b20"], 23.5);
        for unset in [
            "pressao02_hx710b",
            "chave_fim_de_curso",
            "vibracao_vib_x",
            "vibracao_vib_y",
            "vibracao_vib_z",
            "velocidade_m_s",
        ] {
            assert!(json[unset].is_null(), "{unset} should be null");
        }

        let delivered = observer.recv().await.unwrap();
        assert_eq!(delivered.id, json["id"].as_i64().unwrap());
        assert_eq!(delivered.reading.temperature, Some(23.5));
    }

    /// With 100 readings all persisted moments ago, total is 100 and the
    /// trailing-window rate is 100/60.
    #[tokio::test]
    async fn test_metrics_totals_and_rate() {
        let (_dir, store, _hub, router) = build_stack("e2e2.db");
        for _ in 0..100 {
            store.insert(Reading::default()).await.unwrap();
        }

        let response = router.oneshot(get("/api/sensores/metrics")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total"], 100);
        let rps = json["rps"].as_f64().unwrap();
        assert!((rps - 100.0 / 60.0).abs() < 1e-9);
    }

    /// Recent with limit 2 after ingesting R1, R2, R3 returns [R3, R2].
    #[tokio::test]
    async fn test_recent_limit_two_returns_newest_pair() {
        let (_dir, store, _hub, router) = build_stack("e2e3.db");
        for i in 1..=3 {
            store
                .insert(Reading {
                    speed: Some(i as f64),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let response = router
            .oneshot(get("/api/sensores/recentes?limit=2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["velocidade_m_s"], 3.0);
        assert_eq!(rows[1]["velocidade_m_s"], 2.0);
    }

    /// An unresolvable sensor key is the caller's mistake: 400 with the
    /// structured error body.
    #[tokio::test]
    async fn test_unknown_sensor_key_maps_to_400() {
        let (_dir, _store, _hub, router) = build_stack("e2e5.db");

        let response = router.oneshot(get("/api/readings/bogus")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json["erro"].as_str().unwrap().contains("bogus"));
    }

    /// Alias and canonical key answer the same series over HTTP.
    #[tokio::test]
    async fn test_series_alias_equivalence_over_http() {
        let (_dir, store, _hub, router) = build_stack("e2e6.db");
        for i in 0..3 {
            store
                .insert(Reading {
                    vibration_y: Some(i as f64),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let by_alias = body_json(
            router
                .clone()
                .oneshot(get("/api/readings/vy?limit=2"))
                .await
                .unwrap(),
        )
        .await;
        let by_canonical = body_json(
            router
                .oneshot(get("/api/readings/vibracao_vib_y?limit=2"))
                .await
                .unwrap(),
        )
        .await;

        assert_eq!(by_alias, by_canonical);
        assert_eq!(by_alias.as_array().unwrap().len(), 2);
    }
}

#[cfg(test)]
mod configuration {
    use config_loader::{ConfigFormat, ConfigLoader};

    /// The service boots from an empty document with the stock wiring.
    #[test]
    fn test_empty_config_uses_stock_defaults() {
        let config = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert_eq!(config.server.default_query_limit, 50);
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        let result = ConfigLoader::load_from_str(
            r#"
[server]
bind = "not-an-address"
"#,
            ConfigFormat::Toml,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("bind"));
    }
}
