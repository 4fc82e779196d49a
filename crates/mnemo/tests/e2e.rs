// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A user's chat from login to session end, sharing one database between the
//! session registry and the vector index the way `mnemo chat` wires them.

use std::sync::Arc;

use mnemo_agent::create_memory_workflow;
use mnemo_config::MnemoConfig;
use mnemo_core::VectorIndex;
use mnemo_memory::SqliteVectorIndex;
use mnemo_storage::{JsonMap, SessionRegistry};
use mnemo_test_utils::{HashEmbedder, MockProvider, temp_database};

#[tokio::test]
async fn chat_lifecycle_on_one_database() {
    let (db, _dir) = temp_database().await.unwrap();
    let config = MnemoConfig::default();
    let registry = SessionRegistry::open(
        db.clone(),
        &config.session,
        &config.memory.default_collection,
    )
    .await
    .unwrap();
    let index: Arc<dyn VectorIndex> = Arc::new(SqliteVectorIndex::new(db.clone()));
    let provider = Arc::new(MockProvider::with_responses(vec![
        "Nice to meet you, Grace!".into(),
        "You are a nurse.".into(),
    ]));
    let embedder = Arc::new(HashEmbedder::new(256));

    let user_id = registry.create_user("grace", JsonMap::new()).await.unwrap();
    let session_id = registry.create_session(&user_id, JsonMap::new()).await.unwrap();
    let mut workflow = create_memory_workflow(
        &config,
        provider.clone(),
        embedder.clone(),
        index.clone(),
        Some(user_id.as_str()),
        Some(session_id.as_str()),
    )
    .unwrap();

    registry.update_session_activity(&session_id).await.unwrap();
    let first = workflow.run("My name is Grace and I work as a nurse").await;
    assert_eq!(first.response, "Nice to meet you, Grace!");
    assert!(!first.stored_memory_ids.is_empty());

    workflow.agent_mut().clear_short_term();
    registry.update_session_activity(&session_id).await.unwrap();
    let second = workflow.run("What do I work as?").await;
    assert_eq!(second.response, "You are a nurse.");
    assert!(
        second
            .relevant_memories
            .iter()
            .any(|m| m.memory.content.contains("nurse"))
    );

    let namespace = registry
        .namespace_for(&user_id, Some(session_id.as_str()))
        .unwrap();
    assert_eq!(
        workflow.memory_stats().await.unwrap().long_term.collection_name,
        namespace.as_str()
    );
    assert_eq!(
        index.count(&namespace).await.unwrap(),
        first.stored_memory_ids.len() + second.stored_memory_ids.len()
    );

    let stats = registry.stats().await.unwrap();
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.active_sessions, 1);

    assert!(registry.end_session(&session_id).await.unwrap());
    assert!(registry.get_session(&session_id).await.unwrap().is_none());
    let user = registry.get_user(&user_id).await.unwrap().unwrap();
    assert_eq!(user.total_sessions, 1);

    drop(workflow);
    drop(registry);
    drop(index);
    db.close().await.unwrap();
}

#[tokio::test]
async fn returning_user_gets_a_fresh_session_namespace() {
    let (db, _dir) = temp_database().await.unwrap();
    let config = MnemoConfig::default();
    let registry = SessionRegistry::open(db.clone(), &config.session, "memory_collection")
        .await
        .unwrap();
    let index: Arc<dyn VectorIndex> = Arc::new(SqliteVectorIndex::new(db));
    let provider = Arc::new(MockProvider::new());
    let embedder = Arc::new(HashEmbedder::new(256));

    let user_id = registry.create_user("henry", JsonMap::new()).await.unwrap();
    let first_session = registry.create_session(&user_id, JsonMap::new()).await.unwrap();
    let mut first = create_memory_workflow(
        &config,
        provider.clone(),
        embedder.clone(),
        index.clone(),
        Some(user_id.as_str()),
        Some(first_session.as_str()),
    )
    .unwrap();
    first.run("I love jazz records").await;
    registry.end_session(&first_session).await.unwrap();

    let found = registry.find_user_by_username("henry").await.unwrap().unwrap();
    assert_eq!(found.user_id, user_id);
    let second_session = registry.create_session(&user_id, JsonMap::new()).await.unwrap();
    assert_ne!(first_session, second_session);

    let mut second = create_memory_workflow(
        &config,
        provider,
        embedder,
        index,
        Some(user_id.as_str()),
        Some(second_session.as_str()),
    )
    .unwrap();
    let result = second.run("What music do I love?").await;
    assert!(result.relevant_memories.is_empty());
}
