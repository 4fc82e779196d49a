// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory against the SQLite vector index.

use std::sync::Arc;

use mnemo_config::MemoryConfig;
use mnemo_core::{Namespace, VectorIndex};
use mnemo_memory::{
    EmbeddingGateway, LongTermMemoryManager, MemoryType, RetrieveOptions, SqliteVectorIndex,
    StoreRequest,
};
use mnemo_test_utils::{HashEmbedder, temp_database};

struct Fixture {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<HashEmbedder>,
    _dir: tempfile::TempDir,
}

impl Fixture {
    async fn new() -> Self {
        let (db, dir) = temp_database().await.unwrap();
        Self {
            index: Arc::new(SqliteVectorIndex::new(db)),
            embedder: Arc::new(HashEmbedder::new(256)),
            _dir: dir,
        }
    }

    fn manager(&self, namespace: &str, config: &MemoryConfig) -> LongTermMemoryManager {
        LongTermMemoryManager::new(
            Namespace::new(namespace),
            EmbeddingGateway::new(self.embedder.clone(), config),
            self.index.clone(),
            config,
        )
    }
}

#[tokio::test]
async fn store_then_get_by_id_roundtrips() {
    let fx = Fixture::new().await;
    let manager = fx.manager("user_u1_global", &MemoryConfig::default());

    let id = manager
        .store(
            StoreRequest::new("User is allergic to peanuts")
                .memory_type(MemoryType::Fact)
                .importance(0.9)
                .tags(["health", "allergy"])
                .context("dinner planning"),
        )
        .await
        .unwrap();

    let result = manager.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(result.id, id);
    assert_eq!(result.memory.content, "User is allergic to peanuts");
    assert_eq!(result.memory.memory_type, MemoryType::Fact);
    assert_eq!(result.memory.importance(), 0.9);
    assert_eq!(result.memory.tags(), ["health", "allergy"]);
    assert_eq!(result.memory.context.as_deref(), Some("dinner planning"));
    assert_eq!(result.memory.access_count, 1);
    assert!(result.similarity.is_none());

    assert!(manager.get_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn comma_bearing_tags_come_back_split() {
    let fx = Fixture::new().await;
    let manager = fx.manager("ns", &MemoryConfig::default());

    let id = manager
        .store(StoreRequest::new("tagged").tags(["a,b", "b", " c "]))
        .await
        .unwrap();

    let result = manager.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(result.memory.tags(), ["a", "b", "c"]);
}

#[tokio::test]
async fn importance_is_clamped_on_store() {
    let fx = Fixture::new().await;
    let manager = fx.manager("ns", &MemoryConfig::default());

    let low = manager.store(StoreRequest::new("low").importance(-0.3)).await.unwrap();
    let high = manager.store(StoreRequest::new("high").importance(1.7)).await.unwrap();

    let low = manager.get_by_id(&low).await.unwrap().unwrap();
    let high = manager.get_by_id(&high).await.unwrap().unwrap();
    assert_eq!(low.memory.importance(), 0.0);
    assert_eq!(high.memory.importance(), 1.0);
}

#[tokio::test]
async fn retrieval_ranks_by_similarity() {
    let fx = Fixture::new().await;
    let manager = fx.manager("ns", &MemoryConfig::default());
    manager.store(StoreRequest::new("pizza pasta")).await.unwrap();
    manager.store(StoreRequest::new("sushi ramen")).await.unwrap();

    let results = manager.retrieve("pizza", RetrieveOptions::default()).await;
    assert!(!results.is_empty());
    assert_eq!(results[0].memory.content, "pizza pasta");
    let similarities: Vec<f32> = results.iter().filter_map(|r| r.similarity).collect();
    assert!(similarities.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn fallback_returns_nearest_when_nothing_clears_threshold() {
    let fx = Fixture::new().await;
    let config = MemoryConfig {
        similarity_threshold: 0.99,
        ..MemoryConfig::default()
    };
    let manager = fx.manager("ns", &config);
    manager.store(StoreRequest::new("alpha beta")).await.unwrap();

    let results = manager.retrieve("gamma", RetrieveOptions::default()).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].memory.content, "alpha beta");
    assert!(results[0].similarity.unwrap() < 0.99);
}

#[tokio::test]
async fn filters_apply_after_search() {
    let fx = Fixture::new().await;
    let manager = fx.manager("ns", &MemoryConfig::default());
    manager
        .store(
            StoreRequest::new("tea in the morning")
                .memory_type(MemoryType::Preference)
                .importance(0.8),
        )
        .await
        .unwrap();
    manager
        .store(
            StoreRequest::new("tea grows in Assam")
                .memory_type(MemoryType::Fact)
                .importance(0.3),
        )
        .await
        .unwrap();

    let prefs = manager
        .retrieve(
            "tea",
            RetrieveOptions {
                memory_type: Some(MemoryType::Preference),
                ..RetrieveOptions::default()
            },
        )
        .await;
    assert_eq!(prefs.len(), 1);
    assert_eq!(prefs[0].memory.memory_type, MemoryType::Preference);

    let important = manager
        .retrieve(
            "tea",
            RetrieveOptions {
                min_importance: Some(0.5),
                ..RetrieveOptions::default()
            },
        )
        .await;
    assert!(important.iter().all(|r| r.memory.importance() >= 0.5));
    assert_eq!(important.len(), 1);

    let capped = manager
        .retrieve(
            "tea",
            RetrieveOptions {
                max_results: Some(1),
                ..RetrieveOptions::default()
            },
        )
        .await;
    assert_eq!(capped.len(), 1);
}

#[tokio::test]
async fn access_stats_are_not_written_back() {
    let fx = Fixture::new().await;
    let manager = fx.manager("ns", &MemoryConfig::default());
    manager.store(StoreRequest::new("favourite colour is green")).await.unwrap();

    let first = manager.retrieve("colour", RetrieveOptions::default()).await;
    let second = manager.retrieve("colour", RetrieveOptions::default()).await;
    assert_eq!(first[0].memory.access_count, 1);
    assert_eq!(second[0].memory.access_count, 1);
    assert!(first[0].memory.last_accessed >= first[0].memory.created_at);
}

#[tokio::test]
async fn namespaces_do_not_leak() {
    let fx = Fixture::new().await;
    let config = MemoryConfig::default();
    let alice = fx.manager("user_alice_global", &config);
    let bob = fx.manager("user_bob_global", &config);

    let id = alice.store(StoreRequest::new("alice secret plan")).await.unwrap();

    assert!(bob.retrieve("alice secret plan", RetrieveOptions::default()).await.is_empty());
    assert!(bob.get_by_id(&id).await.unwrap().is_none());
    assert!(!bob.delete(&id).await.unwrap());
    assert_eq!(bob.stats().await.unwrap().total_memories, 0);
    assert_eq!(alice.stats().await.unwrap().total_memories, 1);
}

#[tokio::test]
async fn convenience_stores_set_type_source_and_tags() {
    let fx = Fixture::new().await;
    let manager = fx.manager("ns", &MemoryConfig::default());

    let summary = manager
        .store_conversation_summary("talked about travel", "weekend chat", 0.7)
        .await
        .unwrap();
    let pref = manager
        .store_user_preference("prefers window seats", Some("flight booking"))
        .await
        .unwrap();
    let fact = manager
        .store_fact("Paris is the capital of France", None, 0.6)
        .await
        .unwrap();

    let summary = manager.get_by_id(&summary).await.unwrap().unwrap().memory;
    assert_eq!(summary.memory_type, MemoryType::Experience);
    assert_eq!(summary.source.as_deref(), Some("conversation_summary"));
    assert_eq!(summary.tags(), ["conversation", "summary"]);
    assert_eq!(summary.context.as_deref(), Some("weekend chat"));

    let pref = manager.get_by_id(&pref).await.unwrap().unwrap().memory;
    assert_eq!(pref.memory_type, MemoryType::Preference);
    assert_eq!(pref.importance(), 0.8);
    assert_eq!(pref.source.as_deref(), Some("user_preference"));
    assert_eq!(pref.tags(), ["preference", "user"]);

    let fact = manager.get_by_id(&fact).await.unwrap().unwrap().memory;
    assert_eq!(fact.memory_type, MemoryType::Fact);
    assert_eq!(fact.source.as_deref(), Some("factual_information"));
    assert_eq!(fact.tags(), ["fact", "information"]);
    assert!(fact.context.is_none());
}

#[tokio::test]
async fn get_by_type_delete_clear_and_stats() {
    let fx = Fixture::new().await;
    let manager = fx.manager("user_x_session_y", &MemoryConfig::default());

    let a = manager.store_fact("fact: water boils at 100C", None, 0.6).await.unwrap();
    manager.store_fact("fact: ice melts at 0C", None, 0.6).await.unwrap();
    manager
        .store_user_preference("likes jazz", None)
        .await
        .unwrap();

    let facts = manager.get_by_type(MemoryType::Fact, 10).await;
    assert_eq!(facts.len(), 2);
    assert!(facts.iter().all(|r| r.memory.memory_type == MemoryType::Fact));

    assert!(manager.delete(&a).await.unwrap());
    assert!(!manager.delete(&a).await.unwrap());

    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.total_memories, 2);
    assert_eq!(stats.collection_name, "user_x_session_y");
    assert_eq!(stats.max_memories_per_query, 5);
    assert!((stats.similarity_threshold - 0.2).abs() < f32::EPSILON);

    manager.clear_all().await.unwrap();
    assert_eq!(manager.stats().await.unwrap().total_memories, 0);
    assert!(manager.retrieve("water", RetrieveOptions::default()).await.is_empty());
}
