//! Artifact classification
//!
//! Every file in an integration project defines exactly one artifact. The
//! root element's tag tells us what kind it is, and the kind decides which
//! project directory it lives in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OverviewError;

/// Kind of a configuration artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactKind {
    Api,
    Sequence,
    Endpoint,
    Template,
    MessageStore,
    MessageProcessor,
    ProxyService,
    InboundEndpoint,
    Connector,
    Datasource,
    Task,
    LocalEntry,
    Unknown,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 13] = [
        ArtifactKind::Api,
        ArtifactKind::Sequence,
        ArtifactKind::Endpoint,
        ArtifactKind::Template,
        ArtifactKind::MessageStore,
        ArtifactKind::MessageProcessor,
        ArtifactKind::ProxyService,
        ArtifactKind::InboundEndpoint,
        ArtifactKind::Connector,
        ArtifactKind::Datasource,
        ArtifactKind::Task,
        ArtifactKind::LocalEntry,
        ArtifactKind::Unknown,
    ];

    /// Conventional project directory for file-backed kinds
    pub fn dir_name(&self) -> Option<&'static str> {
        match self {
            ArtifactKind::Api => Some("api"),
            ArtifactKind::Sequence => Some("sequences"),
            ArtifactKind::Endpoint => Some("endpoints"),
            ArtifactKind::Template => Some("templates"),
            ArtifactKind::MessageStore => Some("message-stores"),
            ArtifactKind::MessageProcessor => Some("message-processors"),
            ArtifactKind::ProxyService => Some("proxy-services"),
            ArtifactKind::InboundEndpoint => Some("inbound-endpoints"),
            ArtifactKind::Datasource => Some("data-sources"),
            ArtifactKind::Task => Some("tasks"),
            ArtifactKind::LocalEntry => Some("local-entries"),
            ArtifactKind::Connector | ArtifactKind::Unknown => None,
        }
    }

    /// Classify an artifact by the local name of its root element
    pub fn from_root_tag(tag: &str) -> Self {
        let local = tag.rsplit(':').next().unwrap_or(tag);
        match local {
            "api" => ArtifactKind::Api,
            "sequence" => ArtifactKind::Sequence,
            "endpoint" => ArtifactKind::Endpoint,
            "template" => ArtifactKind::Template,
            "messageStore" => ArtifactKind::MessageStore,
            "messageProcessor" => ArtifactKind::MessageProcessor,
            "proxy" => ArtifactKind::ProxyService,
            "inboundEndpoint" => ArtifactKind::InboundEndpoint,
            "task" => ArtifactKind::Task,
            "localEntry" => ArtifactKind::LocalEntry,
            "dataSource" | "datasource" => ArtifactKind::Datasource,
            "connector" => ArtifactKind::Connector,
            _ => ArtifactKind::Unknown,
        }
    }

    /// Entrypoint type for kinds that receive external traffic
    pub fn entrypoint_type(&self) -> Option<EntrypointType> {
        match self {
            ArtifactKind::Api => Some(EntrypointType::Service),
            ArtifactKind::Task => Some(EntrypointType::ScheduledTask),
            ArtifactKind::InboundEndpoint => Some(EntrypointType::Trigger),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Api => "API",
            ArtifactKind::Sequence => "SEQUENCE",
            ArtifactKind::Endpoint => "ENDPOINT",
            ArtifactKind::Template => "TEMPLATE",
            ArtifactKind::MessageStore => "MESSAGE_STORE",
            ArtifactKind::MessageProcessor => "MESSAGE_PROCESSOR",
            ArtifactKind::ProxyService => "PROXY_SERVICE",
            ArtifactKind::InboundEndpoint => "INBOUND_ENDPOINT",
            ArtifactKind::Connector => "CONNECTOR",
            ArtifactKind::Datasource => "DATASOURCE",
            ArtifactKind::Task => "TASK",
            ArtifactKind::LocalEntry => "LOCAL_ENTRY",
            ArtifactKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = OverviewError;

    /// Accepts the serialized name (`MESSAGE_STORE`), the directory name
    /// (`message-stores`) or a loose lowercase form (`message_store`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| {
                kind.as_str() == normalized
                    || kind
                        .dir_name()
                        .map(|dir| dir.eq_ignore_ascii_case(s.trim()))
                        .unwrap_or(false)
            })
            .ok_or_else(|| OverviewError::UnknownKind(s.to_string()))
    }
}

/// How an entrypoint receives traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntrypointType {
    Service,
    ScheduledTask,
    Trigger,
}
