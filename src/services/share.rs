//! Manila `services` (microversion 2.7 and later)

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, id_string, nullable_string};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct ShareService {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    pub binary: String,
    pub host: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub zone: String,
    pub status: String,
    pub state: String,
    #[serde(default)]
    pub updated_at: AnyTime,
}

impl ServiceRecord for ShareService {
    const LISTING: Listing = Listing {
        service_types: &["sharev2", "shared-file-system"],
        api_version: None,
        path: "services",
        collection: "services",
        pagination: Pagination::Single,
        microversion: Some(("X-OpenStack-Manila-API-Version", "2.7")),
    };

    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Binary",
        "Host",
        "Zone",
        "Status",
        "State",
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
            self.zone.clone(),
            self.status.clone(),
            self.state.clone(),
            self.updated_at.to_string(),
        ]
    }

    // Manila at 2.7 reports no disabled reason.
    fn condition(&self) -> Condition<'_> {
        Condition {
            admin: Admin::from_status(&self.status, None),
            alive: self.state == "up",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::ReasonMatcher;
    use serde_json::json;

    #[test]
    fn test_disabled_share_never_matches_reason() {
        let service: ShareService = serde_json::from_value(json!({
            "id": 2,
            "binary": "manila-share",
            "host": "manila2@generic1",
            "zone": "nova",
            "status": "disabled",
            "state": "down",
            "updated_at": "2015-09-07T13:14:27.000000"
        }))
        .unwrap();

        let reasons = ReasonMatcher::compile(&[".*"]).unwrap();
        assert_eq!(service.condition().assess(&reasons), None);
        assert_eq!(service.id, "2");
    }
}
