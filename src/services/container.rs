//! Zun `services`

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, id_string, nullable_string, reason};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerService {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    pub binary: String,
    pub host: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub availability_zone: String,
    pub state: String,
    #[serde(default)]
    pub report_count: i64,
    pub disabled: bool,
    #[serde(
        default,
        alias = "disable_reason",
        deserialize_with = "nullable_string"
    )]
    pub disabled_reason: String,
    #[serde(default)]
    pub forced_down: bool,
    #[serde(default)]
    pub last_seen_up: AnyTime,
    #[serde(default)]
    pub created_at: AnyTime,
    #[serde(default)]
    pub updated_at: AnyTime,
}

impl ServiceRecord for ContainerService {
    const LISTING: Listing = Listing {
        service_types: &["container"],
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
        "Availability Zone",
        "Disabled",
        "State",
        "Updated At",
        "Heartbeat",
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
            self.availability_zone.clone(),
            self.disabled.to_string(),
            self.state.clone(),
            self.updated_at.to_string(),
            self.last_seen_up.to_string(),
            self.disabled_reason.clone(),
        ]
    }

    fn condition(&self) -> Condition<'_> {
        let admin = if self.disabled {
            Admin::Disabled {
                reason: reason(&self.disabled_reason),
            }
        } else {
            Admin::Enabled
        };

        Condition {
            admin,
            alive: self.state == "up",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Cause, ReasonMatcher};
    use serde_json::json;

    #[test]
    fn test_disable_reason_alias() {
        let service: ContainerService = serde_json::from_value(json!({
            "id": 1,
            "binary": "zun-compute",
            "host": "cmp1",
            "availability_zone": "nova",
            "state": "down",
            "report_count": 12,
            "disabled": true,
            "disable_reason": "hardware fault",
            "forced_down": false,
            "last_seen_up": "2018-01-10 09:31:12",
            "created_at": "2018-01-03 07:50:20+00:00",
            "updated_at": "2018-01-10 09:31:12+00:00"
        }))
        .unwrap();

        let reasons = ReasonMatcher::compile(&["fault"]).unwrap();
        assert_eq!(
            service.condition().assess(&reasons),
            Some(Cause::DisabledReason("hardware fault".to_string()))
        );
        assert_eq!(service.row()[7], "2018-01-10 09:31:12+00:00");
    }

    #[test]
    fn test_enabled_down_is_critical() {
        let service: ContainerService = serde_json::from_value(json!({
            "id": 2,
            "binary": "zun-compute",
            "host": "cmp2",
            "state": "down",
            "disabled": false,
            "disabled_reason": null
        }))
        .unwrap();

        assert_eq!(
            service.condition().assess(&ReasonMatcher::default()),
            Some(Cause::Down)
        );
    }
}
