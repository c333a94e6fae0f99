//! Cinder `os-services`

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, nullable_string, reason};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeService {
    pub binary: String,
    pub host: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub zone: String,
    pub status: String,
    pub state: String,
    #[serde(default)]
    pub updated_at: AnyTime,
    #[serde(default, deserialize_with = "nullable_string")]
    pub disabled_reason: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub cluster: String,
    #[serde(default)]
    pub frozen: bool,
}

impl ServiceRecord for VolumeService {
    const LISTING: Listing = Listing {
        service_types: &["block-storage", "volumev3"],
        api_version: None,
        path: "os-services",
        collection: "services",
        pagination: Pagination::Single,
        microversion: None,
    };

    const HEADERS: &'static [&'static str] = &[
        "Binary",
        "Host",
        "Zone",
        "Status",
        "State",
        "Updated At",
        "Disabled Reason",
    ];

    fn sort_key(&self) -> (&str, &str) {
        (&self.binary, &self.host)
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.binary.clone(),
            self.host.clone(),
            self.zone.clone(),
            self.status.clone(),
            self.state.clone(),
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
