//! Shared fixtures for integration tests.
#![allow(dead_code)]

use maestro::adapters::{InMemoryObjectStore, Scheme};
use maestro::domain::models::{ObjectMeta, Resource};
use maestro::domain::ports::{Client, ObjectStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSpec {
    pub replicas: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Web {
    pub metadata: ObjectMeta,
    pub spec: WebSpec,
}

impl Resource for Web {
    const API_VERSION: &'static str = "apps.example.io/v1";
    const KIND: &'static str = "Web";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub metadata: ObjectMeta,
    pub spec: ContainerSpec,
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

pub fn web(name: &str, replicas: u32) -> Web {
    let mut metadata = ObjectMeta::named("default", name);
    metadata.uid = Some(Uuid::new_v4());
    Web {
        metadata,
        spec: WebSpec { replicas },
    }
}

pub fn pod_for(parent: &Web) -> Pod {
    let mut metadata = ObjectMeta::named(parent.namespace(), format!("{}-pod", parent.name()));
    metadata.labels = BTreeMap::from([("app".to_string(), parent.name().to_string())]);
    Pod {
        metadata,
        spec: ContainerSpec {
            image: "nginx".to_string(),
            restart_policy: None,
        },
    }
}

pub fn restart_policy_defaulter(value: &mut Value) {
    if let Some(spec) = value.get_mut("spec").and_then(Value::as_object_mut) {
        spec.entry("restartPolicy").or_insert(json!("Always"));
    }
}

pub fn client_for(store: &Arc<InMemoryObjectStore>) -> Client {
    let objects: Arc<dyn ObjectStore> = Arc::clone(store) as Arc<dyn ObjectStore>;
    Client::new(objects, Arc::new(Scheme::new().with::<Web>().with::<Pod>()))
}
