// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::{FakeAction, FakeReaction};
use yare::parameterized;

fn action(id: &str, service: &str) -> Arc<dyn ActionDefinition> {
    Arc::new(FakeAction::new(id, service))
}

fn reaction(id: &str, service: &str) -> Arc<dyn ReactionDefinition> {
    Arc::new(FakeReaction::new(id, service))
}

fn ids<T: ?Sized + Registered>(defs: &[Arc<T>]) -> Vec<String> {
    defs.iter().map(|d| d.registered_info().id.clone()).collect()
}

#[test]
fn register_and_find() {
    let mut registry = ActionRegistry::new();
    registry.register(action("svc:one", "svc")).unwrap();

    let found = registry.find("svc:one").unwrap();
    assert_eq!(found.info().service_id, "svc");
    assert!(registry.find("svc:missing").is_none());
}

#[test]
fn duplicate_id_is_rejected() {
    let mut registry = ActionRegistry::new();
    registry.register(action("svc:one", "svc")).unwrap();

    let err = registry.register(action("svc:one", "other")).unwrap_err();
    assert_eq!(
        err,
        CatalogError::DuplicateId {
            id: "svc:one".into()
        }
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.find("svc:one").unwrap().info().service_id, "svc");
}

#[test]
fn register_many_keeps_definitions_before_duplicate() {
    let mut registry = ReactionRegistry::new();
    let result = registry.register_many(vec![
        reaction("svc:a", "svc"),
        reaction("svc:b", "svc"),
        reaction("svc:a", "svc"),
        reaction("svc:c", "svc"),
    ]);

    assert!(matches!(result, Err(CatalogError::DuplicateId { ref id }) if id == "svc:a"));
    assert_eq!(ids(&registry.list_all()), vec!["svc:a", "svc:b"]);
}

#[test]
fn list_all_preserves_registration_order() {
    let mut registry = ActionRegistry::new();
    registry
        .register_many(vec![
            action("z:last", "z"),
            action("a:first", "a"),
            action("m:middle", "m"),
        ])
        .unwrap();
    assert_eq!(ids(&registry.list_all()), vec!["z:last", "a:first", "m:middle"]);
}

#[parameterized(
    exact_service = { "spotify", &["spotify:one", "spotify:two"] },
    longer_service_name = { "spotify-beta", &["spotify-beta:one"] },
    prefix_is_not_a_match = { "spot", &[] },
    unknown_service = { "github", &[] },
)]
fn list_by_service_matches_exactly(service: &str, expected: &[&str]) {
    let mut registry = ActionRegistry::new();
    registry
        .register_many(vec![
            action("spotify:one", "spotify"),
            action("spotify-beta:one", "spotify-beta"),
            action("spotify:two", "spotify"),
        ])
        .unwrap();

    assert_eq!(ids(&registry.list_by_service(service)), expected);
}

#[test]
fn catalog_registries_are_independent() {
    let mut catalog = Catalog::new();
    catalog.actions.register(action("svc:x", "svc")).unwrap();
    catalog.reactions.register(reaction("svc:x", "svc")).unwrap();

    assert!(catalog.action("svc:x").is_some());
    assert!(catalog.reaction("svc:x").is_some());
    assert!(catalog.reaction("svc:y").is_none());
}

#[test]
fn empty_registry() {
    let registry = ReactionRegistry::default();
    assert!(registry.is_empty());
    assert!(registry.list_all().is_empty());
}
