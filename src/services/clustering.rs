//! Senlin `services` (microversion 1.7)

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, id_string, nullable_string, reason};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct ClusteringService {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    pub binary: String,
    pub host: String,
    pub state: String,
    pub status: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub topic: String,
    #[serde(
        default,
        alias = "disable_reason",
        deserialize_with = "nullable_string"
    )]
    pub disabled_reason: String,
    #[serde(default)]
    pub updated_at: AnyTime,
}

impl ServiceRecord for ClusteringService {
    const LISTING: Listing = Listing {
        service_types: &["clustering"],
        api_version: Some("v1"),
        path: "services",
        collection: "services",
        pagination: Pagination::Single,
        microversion: Some(("OpenStack-API-Version", "clustering 1.7")),
    };

    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Binary",
        "Host",
        "State",
        "Status",
        "Updated At",
        "Disable Reason",
    ];

    fn sort_key(&self) -> (&str, &str) {
        (&self.binary, &self.host)
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.binary.clone(),
            self.host.clone(),
            self.state.clone(),
            self.status.clone(),
            self.updated_at.to_string(),
            self.disabled_reason.clone(),
        ]
    }

    fn condition(&self) -> Condition<'_> {
        Condition {
            admin: Admin::from_status(&self.status, reason(&self.disabled_reason)),
            alive: self.state == "up",
        }
    }
}
