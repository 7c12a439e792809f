//! Asset manifest returned by the project assets endpoint
//!
//! Example `output` payload:
//! ```json
//! {
//!   "workflows": ["fl9ab13f7e0aabe9bc714b5b", "fl6fd2d8f7d9630a78d80d8a"],
//!   "flows": ["StellantisSubscriber", "OrchestrationFlow"],
//!   "listener": [
//!     {
//!       "providerName": "WmSAP",
//!       "adapterID": "com.wm.adapter.sap.SAPAdapter",
//!       "listenerListData": [
//!         { "listenerData": { "listenerName": "routingListener", "state": "enabled" } }
//!       ]
//!     }
//!   ],
//!   "messaging": ["ListenMessageForPurchaseOrderProcess"]
//! }
//! ```
//!
//! Records keep the server's JSON as-is so that what is written to disk is
//! exactly what the tenant returned; typed accessors read into it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Every asset in a project, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub workflows: Vec<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub flows: Vec<AssetRecord>,

    #[serde(default, rename = "listener", deserialize_with = "null_as_empty")]
    pub listeners: Vec<ListenerRecord>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub messaging: Vec<AssetRecord>,

    /// Categories this tool does not export
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl AssetManifest {
    /// Total number of records across the exported categories
    pub fn count(&self) -> usize {
        self.workflows.len() + self.flows.len() + self.listeners.len() + self.messaging.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Names of categories present in the response but not exported
    pub fn unknown_categories(&self) -> Vec<&str> {
        self.other.keys().map(|k| k.as_str()).collect()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A flow or messaging entry: usually a bare name, sometimes an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetRecord {
    Name(String),
    Detail(Map<String, Value>),
    Other(Value),
}

impl AssetRecord {
    /// Best-effort display name
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Detail(map) => ["name", "displayName", "id"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            Self::Other(_) => None,
        }
    }
}

impl From<&str> for AssetRecord {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// An adapter provider and the listeners it hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerRecord(pub Value);

impl ListenerRecord {
    /// e.g. `WmSAP`
    pub fn provider_name(&self) -> Option<&str> {
        self.0.get("providerName").and_then(Value::as_str)
    }

    /// e.g. `com.wm.adapter.sap.SAPAdapter`
    pub fn adapter_id(&self) -> Option<&str> {
        self.0.get("adapterID").and_then(Value::as_str)
    }

    /// Listener states nested under `listenerListData[].listenerData`
    pub fn listeners(&self) -> Vec<ListenerState<'_>> {
        self.0
            .get("listenerListData")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.get("listenerData"))
                    .map(ListenerState)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Read-only view of one `listenerData` object.
#[derive(Debug, Clone, Copy)]
pub struct ListenerState<'a>(&'a Value);

impl<'a> ListenerState<'a> {
    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.str_field("listenerName")
    }

    pub fn status(&self) -> Option<&'a str> {
        self.str_field("status")
    }

    pub fn runtime_state(&self) -> Option<&'a str> {
        self.str_field("listenerRuntimeState")
    }

    pub fn last_error(&self) -> Option<&'a str> {
        self.str_field("lastError")
    }
}
