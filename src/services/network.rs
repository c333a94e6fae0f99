//! Neutron `agents`
//!
//! Agents have an administrative `admin_state_up` flag and a heartbeat
//! derived `alive` flag instead of enabled/disabled plus up/down.

use serde::Deserialize;

use super::{Listing, Pagination, ServiceRecord, nullable_string};
use crate::health::{Admin, Condition};
use crate::timestamp::AnyTime;

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkAgent {
    pub id: String,
    pub agent_type: String,
    pub host: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub availability_zone: String,
    pub alive: bool,
    pub admin_state_up: bool,
    #[serde(default, deserialize_with = "nullable_string")]
    pub binary: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub topic: String,
    #[serde(default)]
    pub created_at: AnyTime,
    #[serde(default)]
    pub started_at: AnyTime,
    #[serde(default)]
    pub heartbeat_timestamp: AnyTime,
}

impl ServiceRecord for NetworkAgent {
    const LISTING: Listing = Listing {
        service_types: &["network"],
        api_version: Some("v2.0"),
        path: "agents",
        collection: "agents",
        pagination: Pagination::Links("agents_links"),
        microversion: None,
    };

    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Agent Type",
        "Host",
        "Availability Zone",
        "Alive",
        "State",
        "Binary",
        "Heartbeat",
    ];

    fn sort_key(&self) -> (&str, &str) {
        (&self.agent_type, &self.host)
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.agent_type.clone(),
            self.host.clone(),
            self.availability_zone.clone(),
            self.alive.to_string(),
            self.admin_state_up.to_string(),
            self.binary.clone(),
            self.heartbeat_timestamp.to_string(),
        ]
    }

    fn condition(&self) -> Condition<'_> {
        let admin = if self.admin_state_up {
            Admin::Enabled
        } else {
            Admin::Disabled { reason: None }
        };

        Condition {
            admin,
            alive: self.alive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{Cause, ReasonMatcher};
    use serde_json::json;

    fn agent(alive: bool, admin_state_up: bool, heartbeat: &str) -> NetworkAgent {
        serde_json::from_value(json!({
            "id": "04c62b91-b799-48b7-9cd5-2982db6df9c6",
            "agent_type": "Open vSwitch agent",
            "host": "net1",
            "availability_zone": null,
            "alive": alive,
            "admin_state_up": admin_state_up,
            "binary": "neutron-openvswitch-agent",
            "topic": "N/A",
            "created_at": "2023-03-16 18:35:47",
            "started_at": "2023-03-16 18:35:47.845000",
            "heartbeat_timestamp": heartbeat
        }))
        .unwrap()
    }

    #[test]
    fn test_mixed_timestamp_encodings() {
        // Zed on el9 reports heartbeats with an explicit offset
        let zed = agent(true, true, "2023-03-16 18:35:47.845000+00:00");
        let older = agent(true, true, "2023-03-16 18:35:47.845000");
        assert_eq!(zed.heartbeat_timestamp, older.heartbeat_timestamp);
        assert!(!zed.created_at.is_absent());
        assert!(!zed.started_at.is_absent());
    }

    #[test]
    fn test_admin_up_not_alive_is_critical() {
        let reasons = ReasonMatcher::default();
        assert_eq!(
            agent(false, true, "").condition().assess(&reasons),
            Some(Cause::Down)
        );
        assert_eq!(agent(false, false, "").condition().assess(&reasons), None);
        assert_eq!(agent(true, true, "").condition().assess(&reasons), None);
    }

    #[test]
    fn test_sorted_by_agent_type() {
        let agent = agent(true, true, "");
        assert_eq!(agent.sort_key(), ("Open vSwitch agent", "net1"));
        assert_eq!(agent.row()[4], "true");
    }
}
