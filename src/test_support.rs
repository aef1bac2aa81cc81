//! Shared fixtures for unit tests.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::adapters::{InMemoryObjectStore, Scheme};
use crate::domain::models::{Condition, ObjectMeta, Resource};
use crate::domain::ports::{Client, ObjectStore};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebAppSpec {
    pub replicas: u32,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebAppStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Parent fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebApp {
    pub metadata: ObjectMeta,
    pub spec: WebAppSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WebAppStatus>,
}

impl Resource for WebApp {
    const API_VERSION: &'static str = "example.io/v1";
    const KIND: &'static str = "WebApp";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodStatus {
    pub phase: String,
}

/// Child fixture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PodStatus>,
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

pub fn web_app(name: &str, replicas: u32) -> WebApp {
    let mut metadata = ObjectMeta::named("default", name);
    metadata.uid = Some(Uuid::new_v4());
    WebApp {
        metadata,
        spec: WebAppSpec {
            replicas,
            image: "nginx:1.27".to_string(),
        },
        status: None,
    }
}

/// The pod a web app should own.
pub fn pod_for(parent: &WebApp) -> Pod {
    let mut metadata = ObjectMeta::named(parent.namespace(), format!("{}-pod", parent.name()));
    metadata.labels = BTreeMap::from([
        ("app".to_string(), parent.name().to_string()),
        ("replicas".to_string(), parent.spec.replicas.to_string()),
    ]);
    Pod {
        metadata,
        spec: PodSpec {
            image: parent.spec.image.clone(),
            image_pull_policy: None,
        },
        status: None,
    }
}

/// Defaulter filling in `spec.imagePullPolicy` the way a real API server would.
pub fn pull_policy_defaulter(value: &mut Value) {
    if let Some(spec) = value.get_mut("spec").and_then(Value::as_object_mut) {
        spec.entry("imagePullPolicy").or_insert(json!("IfNotPresent"));
    }
}

pub fn scheme() -> Scheme {
    Scheme::new().with::<WebApp>().with::<Pod>()
}

pub fn client_for(store: &Arc<InMemoryObjectStore>) -> Client {
    let store: Arc<dyn ObjectStore> = Arc::clone(store) as Arc<dyn ObjectStore>;
    Client::new(store, Arc::new(scheme()))
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture WARN and above on the current thread until the guard drops.
pub fn capture_warnings() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}
