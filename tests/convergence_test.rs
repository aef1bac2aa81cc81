//! End-to-end convergence of a parent and its pod through the conductor.

mod common;

use common::{client_for, pod_for, restart_policy_defaulter, web, Pod, Web};
use maestro::adapters::{InMemoryObjectStore, StoreOperation};
use maestro::application::{fetch_state, Conductor};
use maestro::domain::context::{Context, DynamicBinding, StaticBinding};
use maestro::domain::models::{
    merge_conditions, Condition, ConditionStatus, ObjectKey, ObjectRef, Outcome, Resource,
};
use maestro::services::reconciler::{invert, is_not_marked_for_deletion};
use maestro::services::SimpleReconciler;
use std::sync::{Arc, Mutex};

fn pod_key(parent: &Web) -> ObjectKey {
    ObjectKey::new(parent.namespace(), format!("{}-pod", parent.name()))
}

fn pod_conductor(store: &Arc<InMemoryObjectStore>) -> Conductor<Web> {
    let mut conductor = Conductor::builder()
        .with_client(client_for(store))
        .build()
        .unwrap();
    conductor.register(
        SimpleReconciler::from_compute_fn(|_: &Context, p: &Web| Ok(pod_for(p)))
            .build()
            .unwrap(),
    );
    conductor
}

#[tokio::test]
async fn creates_child_with_owner_link_on_first_pass() {
    let store = Arc::new(InMemoryObjectStore::new());
    let conductor = pod_conductor(&store);
    let parent = web("web", 3);

    let outcome = conductor.conduct(&Context::background(), &parent).await.unwrap();

    assert!(outcome.requeue);
    let pod: Pod = store
        .find(&ObjectRef::of::<Pod>(&pod_key(&parent)))
        .await
        .expect("child should exist");
    assert_eq!(pod.metadata.name, "web-pod");
    assert_eq!(pod.metadata.labels["app"], "web");
    let owner = pod.metadata.controller().expect("owner link");
    assert_eq!(owner.kind, "Web");
    assert_eq!(owner.name, "web");
}

#[tokio::test]
async fn rerun_against_identical_child_is_idle_without_updates() {
    let store = Arc::new(InMemoryObjectStore::new());
    let conductor = pod_conductor(&store);
    let parent = web("web", 3);
    let ctx = Context::background();
    conductor.conduct(&ctx, &parent).await.unwrap();
    store.clear_calls();

    let outcome = conductor.conduct(&ctx, &parent).await.unwrap();

    assert_eq!(outcome, Outcome::idle());
    assert_eq!(store.count(StoreOperation::Update), 0);
    assert_eq!(store.count(StoreOperation::DryRunUpdate), 0);
}

#[tokio::test]
async fn deletes_child_when_parent_is_marked_for_deletion() {
    let store = Arc::new(InMemoryObjectStore::new());
    let computed = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&computed);
    let mut conductor = Conductor::builder()
        .with_client(client_for(&store))
        .build()
        .unwrap();
    conductor.register(
        SimpleReconciler::from_compute_fn(move |_: &Context, p: &Web| {
            *counter.lock().unwrap() += 1;
            Ok(pod_for(p))
        })
        .with_should_delete(invert(is_not_marked_for_deletion::<Web>))
        .with_child_key(pod_key)
        .build()
        .unwrap(),
    );
    let mut parent = web("web", 1);
    store.seed(&pod_for(&parent)).await.unwrap();
    parent.metadata.deletion_timestamp = Some(chrono::Utc::now());

    let outcome = conductor.conduct(&Context::background(), &parent).await.unwrap();

    assert!(outcome.requeue);
    assert!(store.is_empty().await);
    assert_eq!(*computed.lock().unwrap(), 0);
    assert_eq!(store.count(StoreOperation::Update), 0);
}

#[tokio::test]
async fn store_defaults_do_not_cause_update_loops() {
    let store = Arc::new(
        InMemoryObjectStore::new().with_defaulter("Pod", restart_policy_defaulter),
    );
    let conductor = pod_conductor(&store);
    let parent = web("web", 1);
    let ctx = Context::background();

    assert!(conductor.conduct(&ctx, &parent).await.unwrap().requeue);
    for _ in 0..3 {
        assert_eq!(conductor.conduct(&ctx, &parent).await.unwrap(), Outcome::idle());
    }

    assert_eq!(store.count(StoreOperation::Update), 0);
    assert_eq!(store.count(StoreOperation::DryRunUpdate), 6);
}

#[tokio::test]
async fn status_handler_merges_conditions_onto_parent() {
    let store = Arc::new(InMemoryObjectStore::new());
    let recorded: Arc<Mutex<Vec<Condition>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&recorded);
    let mut conductor = Conductor::builder()
        .with_client(client_for(&store))
        .with_status_fn(move |_: &Web, conditions: &[Condition]| {
            merge_conditions(&mut sink.lock().unwrap(), conditions);
            Ok(())
        })
        .build()
        .unwrap();
    conductor.register(
        SimpleReconciler::from_compute_fn(|_: &Context, p: &Web| Ok(pod_for(p)))
            .with_name("Workload")
            .build()
            .unwrap(),
    );
    let parent = web("web", 1);
    let ctx = Context::background();

    conductor.conduct(&ctx, &parent).await.unwrap();
    assert!(recorded.lock().unwrap().is_empty());

    conductor.conduct(&ctx, &parent).await.unwrap();
    conductor.conduct(&ctx, &parent).await.unwrap();

    let conditions = recorded.lock().unwrap().clone();
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].condition_type, "WorkloadReconciled");
    assert_eq!(conditions[0].status, ConditionStatus::True);
    assert_eq!(conditions[0].reason, "Reconciled");
}

#[derive(Debug)]
struct ImageOverride(String);

static IMAGE_OVERRIDE: StaticBinding<ImageOverride> = StaticBinding::new();

#[tokio::test]
async fn compute_reads_values_bound_in_context() {
    let store = Arc::new(InMemoryObjectStore::new());
    let mut conductor = Conductor::builder()
        .with_client(client_for(&store))
        .build()
        .unwrap();
    conductor.register(
        SimpleReconciler::from_compute_fn(|ctx: &Context, p: &Web| {
            let mut pod = pod_for(p);
            if let Ok(image) = IMAGE_OVERRIDE.from_context(ctx) {
                pod.spec.image.clone_from(&image.0);
            }
            // The run state is visible to compute functions.
            anyhow::ensure!(fetch_state(ctx).is_ok(), "run state not bound");
            Ok(pod)
        })
        .build()
        .unwrap(),
    );
    let parent = web("web", 1);
    let ctx = IMAGE_OVERRIDE
        .bind(&Context::background(), Arc::new(ImageOverride("caddy:2".into())))
        .unwrap();

    conductor.conduct(&ctx, &parent).await.unwrap();

    let pod: Pod = store
        .find(&ObjectRef::of::<Pod>(&pod_key(&parent)))
        .await
        .unwrap();
    assert_eq!(pod.spec.image, "caddy:2");
}

#[test]
fn dynamic_bindings_keep_per_key_slots() {
    let tenant = |name: &'static str| DynamicBinding::<String>::with_key(format!("tenant/{name}"));
    let ctx = tenant("a")
        .bind(&Context::background(), Arc::new("alpha".to_string()))
        .unwrap();
    let ctx = tenant("b").bind(&ctx, Arc::new("beta".to_string())).unwrap();

    assert_eq!(*tenant("a").from_context(&ctx).unwrap(), "alpha");
    assert_eq!(*tenant("b").from_context(&ctx).unwrap(), "beta");
    assert!(tenant("a").bind(&ctx, Arc::new("again".to_string())).is_err());
}
