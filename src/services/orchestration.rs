//! Heat engine `services`

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, nullable_string};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct OrchestrationService {
    pub id: String,
    pub binary: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub engine_id: String,
    pub host: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub hostname: String,
    pub status: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub topic: String,
    #[serde(default)]
    pub report_interval: i64,
    #[serde(default)]
    pub created_at: AnyTime,
    #[serde(default)]
    pub updated_at: AnyTime,
    #[serde(default)]
    pub deleted_at: AnyTime,
}

impl ServiceRecord for OrchestrationService {
    const LISTING: Listing = Listing {
        service_types: &["orchestration"],
        api_version: None,
        path: "services",
        collection: "services",
        pagination: Pagination::Single,
        microversion: None,
    };

    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Binary",
        "Host",
        "Status",
        "Report Interval",
        "Updated At",
    ];

    fn sort_key(&self) -> (&str, &str) {
        (&self.binary, &self.host)
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.binary.clone(),
            self.host.clone(),
            self.status.clone(),
            self.report_interval.to_string(),
            self.updated_at.to_string(),
        ]
    }

    // Heat engines are never disabled, `status` is liveness only.
    fn condition(&self) -> Condition<'_> {
        Condition {
            admin: Admin::NotTracked,
            alive: self.status == "up",
        }
    }
}
