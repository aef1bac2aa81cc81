//! Implementation of the `maestro demo` command.
//!
//! Seeds a `Website` parent into an in-memory store and conducts two
//! reconcilers against it (a settings `ConfigMap`, then a `Pod`) until a
//! pass comes back idle. The store defaults `spec.imagePullPolicy` on pods,
//! so the final pass exercises the dry-run comparison.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::{InMemoryObjectStore, Scheme, StoreOperation};
use crate::application::Conductor;
use crate::cli::output::{output, CommandOutput};
use crate::domain::context::Context;
use crate::domain::models::{
    merge_conditions, Condition, ObjectKey, ObjectMeta, ReconcilerDefaults, Resource,
};
use crate::domain::ports::{Client, ObjectStore, StatusConditionHandler};
use crate::services::SimpleReconciler;

const MAX_PASSES: usize = 10;

#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Replica count written into the parent spec
    #[arg(short, long, default_value = "3")]
    pub replicas: u32,

    /// Container image for the pod
    #[arg(long, default_value = "nginx:1.27")]
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebsiteSpec {
    pub replicas: u32,
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebsiteStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Website {
    pub metadata: ObjectMeta,
    pub spec: WebsiteSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WebsiteStatus>,
}

impl Resource for Website {
    const API_VERSION: &'static str = "example.io/v1";
    const KIND: &'static str = "Website";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigMap {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

impl Resource for ConfigMap {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "ConfigMap";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pod {
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
}

impl Resource for Pod {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "Pod";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// Merges a run's conditions into the parent status and writes it back.
struct WebsiteStatusWriter;

#[async_trait]
impl StatusConditionHandler<Website> for WebsiteStatusWriter {
    async fn handle(
        &self,
        ctx: &Context,
        client: &Client,
        parent: &Website,
        conditions: &[Condition],
    ) -> anyhow::Result<()> {
        let mut latest: Website = client.get(ctx, &parent.key()).await?;
        let status = latest.status.get_or_insert_with(WebsiteStatus::default);
        if !merge_conditions(&mut status.conditions, conditions) {
            debug!(parent = %parent.key(), "status conditions unchanged");
            return Ok(());
        }
        client.update(ctx, &mut latest, false).await?;
        Ok(())
    }
}

fn settings_for(site: &Website) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta::named(site.namespace(), format!("{}-settings", site.name())),
        data: BTreeMap::from([("replicas".to_string(), site.spec.replicas.to_string())]),
    }
}

fn pod_for(site: &Website) -> Pod {
    let mut metadata = ObjectMeta::named(site.namespace(), format!("{}-pod", site.name()));
    metadata.labels.insert("app".to_string(), site.name().to_string());
    Pod {
        metadata,
        spec: PodSpec {
            image: site.spec.image.clone(),
            image_pull_policy: None,
        },
    }
}

fn default_pull_policy(value: &mut Value) {
    if let Some(spec) = value.get_mut("spec").and_then(Value::as_object_mut) {
        spec.entry("imagePullPolicy").or_insert(json!("IfNotPresent"));
    }
}

#[derive(Debug, Serialize)]
pub struct PassReport {
    pub pass: usize,
    pub requeue: bool,
}

#[derive(Debug, Serialize)]
pub struct DemoOutput {
    pub parent: String,
    pub converged: bool,
    pub passes: Vec<PassReport>,
    pub conditions: Vec<Condition>,
    pub store_calls: BTreeMap<String, usize>,
}

impl CommandOutput for DemoOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} {} after {} pass(es)",
            self.parent,
            if self.converged { "converged" } else { "did not converge" },
            self.passes.len()
        )];
        lines.push("\nConditions:".to_string());
        for condition in &self.conditions {
            lines.push(format!(
                "  - {} = {} ({})",
                condition.condition_type, condition.status, condition.reason
            ));
        }
        lines.push("\nStore calls:".to_string());
        for (operation, count) in &self.store_calls {
            lines.push(format!("  - {operation}: {count}"));
        }
        lines.join("\n")
    }
}

/// Conduct the sample reconcilers until idle or out of passes.
pub async fn run_demo(args: &DemoArgs, defaults: &ReconcilerDefaults) -> Result<DemoOutput> {
    let store = Arc::new(InMemoryObjectStore::new().with_defaulter("Pod", default_pull_policy));
    let scheme = Scheme::new()
        .with::<Website>()
        .with::<ConfigMap>()
        .with::<Pod>();
    let objects: Arc<dyn ObjectStore> = Arc::clone(&store) as Arc<dyn ObjectStore>;
    let client = Client::new(objects, Arc::new(scheme));

    let seeded = store
        .seed(&Website {
            metadata: ObjectMeta::named("default", "web"),
            spec: WebsiteSpec {
                replicas: args.replicas,
                image: args.image.clone(),
            },
            status: None,
        })
        .await
        .context("Failed to seed parent")?;
    let key: ObjectKey = seeded.key();

    let settings = SimpleReconciler::from_compute_fn(|_: &Context, site: &Website| {
        Ok(settings_for(site))
    })
    .with_name("Settings")
    .with_defaults(defaults)?
    .build()?;
    let pod = SimpleReconciler::from_compute_fn(|_: &Context, site: &Website| Ok(pod_for(site)))
        .with_defaults(defaults)?
        .build()?;

    let mut conductor = Conductor::builder()
        .with_client(client.clone())
        .with_status_handler(WebsiteStatusWriter)
        .build()?;
    conductor.register(settings).register(pod);

    let ctx = Context::background();
    let mut passes = Vec::new();
    let mut converged = false;
    for pass in 1..=MAX_PASSES {
        let parent: Website = client.get(&ctx, &key).await?;
        let outcome = conductor.conduct(&ctx, &parent).await?;
        info!(pass, requeue = outcome.requeue, "demo pass finished");
        passes.push(PassReport {
            pass,
            requeue: outcome.needs_requeue(),
        });
        if !outcome.needs_requeue() {
            converged = true;
            break;
        }
    }

    let parent: Website = client.get(&ctx, &key).await?;
    let store_calls = [
        StoreOperation::Get,
        StoreOperation::Create,
        StoreOperation::Update,
        StoreOperation::DryRunUpdate,
        StoreOperation::Delete,
    ]
    .into_iter()
    .map(|op| (format!("{op:?}"), store.count(op)))
    .collect();

    Ok(DemoOutput {
        parent: key.to_string(),
        converged,
        passes,
        conditions: parent.status.map(|s| s.conditions).unwrap_or_default(),
        store_calls,
    })
}

pub async fn execute(args: DemoArgs, defaults: &ReconcilerDefaults, json_mode: bool) -> Result<()> {
    let report = run_demo(&args, defaults).await?;
    output(&report, json_mode);
    Ok(())
}
