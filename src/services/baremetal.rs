//! Ironic `conductors` (microversion 1.49)

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, nullable_string};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct Conductor {
    pub hostname: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub conductor_group: String,
    #[serde(default)]
    pub drivers: Vec<String>,
    pub alive: bool,
    #[serde(default)]
    pub created_at: AnyTime,
    #[serde(default)]
    pub updated_at: AnyTime,
}

impl ServiceRecord for Conductor {
    const LISTING: Listing = Listing {
        service_types: &["baremetal"],
        api_version: Some("v1"),
        path: "conductors?detail=True",
        collection: "conductors",
        pagination: Pagination::NextField,
        microversion: Some(("X-OpenStack-Ironic-API-Version", "1.49")),
    };

    const HEADERS: &'static [&'static str] =
        &["Host", "Conductor Group", "Drivers", "Alive", "Updated At"];

    fn sort_key(&self) -> (&str, &str) {
        ("", &self.hostname)
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.hostname.clone(),
            self.conductor_group.clone(),
            self.drivers.join(" "),
            self.alive.to_string(),
            self.updated_at.to_string(),
        ]
    }

    fn condition(&self) -> Condition<'_> {
        Condition {
            admin: Admin::NotTracked,
            alive: self.alive,
        }
    }

    fn label(&self) -> String {
        self.hostname.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_conductor() {
        let conductor: Conductor = serde_json::from_value(json!({
            "links": [],
            "created_at": "2018-08-07T08:39:21+00:00",
            "hostname": "compute1.localdomain",
            "conductor_group": "",
            "updated_at": "2018-11-30T07:07:23+00:00",
            "alive": true,
            "drivers": ["ipmi", "fake-hardware"]
        }))
        .unwrap();

        assert_eq!(conductor.label(), "compute1.localdomain");
        assert_eq!(conductor.row()[2], "ipmi fake-hardware");
        assert_eq!(conductor.condition().admin, Admin::NotTracked);
    }
}
