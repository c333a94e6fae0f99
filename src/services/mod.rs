//! Per-family service listings
//!
//! Each OpenStack project exposes its own flavour of "list my services"
//! endpoint. A family module declares where that endpoint lives, what a
//! listed record looks like and how it maps onto the shared health
//! predicate in [`crate::health`].

pub mod baremetal;
pub mod clustering;
pub mod compute;
pub mod container;
pub mod network;
pub mod orchestration;
pub mod share;
pub mod volume;

use std::fmt;

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::health::Condition;

/// The service families this check knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceFamily {
    /// Nova compute services
    Compute,
    /// Cinder volume services
    Volume,
    /// Manila share services
    #[value(name = "sharev2")]
    Share,
    /// Neutron agents
    Network,
    /// Heat engines
    Orchestration,
    /// Zun services
    Container,
    /// Senlin services
    Clustering,
    /// Ironic conductors
    Baremetal,
}

impl ServiceFamily {
    pub fn name(self) -> &'static str {
        match self {
            ServiceFamily::Compute => "compute",
            ServiceFamily::Volume => "volume",
            ServiceFamily::Share => "sharev2",
            ServiceFamily::Network => "network",
            ServiceFamily::Orchestration => "orchestration",
            ServiceFamily::Container => "container",
            ServiceFamily::Clustering => "clustering",
            ServiceFamily::Baremetal => "baremetal",
        }
    }
}

impl fmt::Display for ServiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a listing continues past its first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// The whole collection arrives in one response
    Single,
    /// `{"<key>": [{"rel": "next", "href": ...}]}` next to the collection
    Links(&'static str),
    /// A top-level `next` URL
    NextField,
}

impl Pagination {
    /// Absolute URL of the following page, if the body announces one.
    pub fn next_url(&self, body: &Value) -> Option<String> {
        match self {
            Pagination::Single => None,
            Pagination::Links(key) => body
                .get(key)?
                .as_array()?
                .iter()
                .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))?
                .get("href")?
                .as_str()
                .map(String::from),
            Pagination::NextField => body
                .get("next")?
                .as_str()
                .filter(|next| !next.is_empty())
                .map(String::from),
        }
    }
}

/// Where and how a family's records are listed.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    /// Catalog service types to look for, in preference order
    pub service_types: &'static [&'static str],
    /// Version segment appended when the catalog endpoint lacks it
    pub api_version: Option<&'static str>,
    /// Resource path relative to the versioned endpoint
    pub path: &'static str,
    /// JSON key holding the record array
    pub collection: &'static str,
    pub pagination: Pagination,
    /// Microversion header name and value
    pub microversion: Option<(&'static str, &'static str)>,
}

impl Listing {
    /// URL of the first page under a catalog endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        let base = endpoint.trim_end_matches('/');
        match self.api_version {
            Some(version) if !base.ends_with(&format!("/{}", version)) => {
                format!("{}/{}/{}", base, version, self.path)
            }
            _ => format!("{}/{}", base, self.path),
        }
    }
}

/// A decoded record from one family's listing.
pub trait ServiceRecord: DeserializeOwned {
    const LISTING: Listing;

    /// Table columns, in display order
    const HEADERS: &'static [&'static str];

    /// Display order key, usually `(binary, host)`.
    fn sort_key(&self) -> (&str, &str);

    /// Cells matching [`Self::HEADERS`].
    fn row(&self) -> Vec<String>;

    fn condition(&self) -> Condition<'_>;

    /// Short identifier used in diagnostics.
    fn label(&self) -> String {
        let (binary, host) = self.sort_key();
        format!("{}@{}", binary, host)
    }
}

/// Accept numeric and string identifiers alike.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number identifier, got {}",
            other
        ))),
    }
}

/// Treat `null` like an absent string.
pub(crate) fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Empty strings count as no reason at all.
pub(crate) fn reason(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_links_pagination() {
        let body = json!({
            "agents": [],
            "agents_links": [
                {
                    "rel": "previous",
                    "href": "https://neutron/v2.0/agents?marker=a&page_reverse=True"
                },
                {"rel": "next", "href": "https://neutron/v2.0/agents?marker=b"}
            ]
        });
        assert_eq!(
            Pagination::Links("agents_links").next_url(&body).as_deref(),
            Some("https://neutron/v2.0/agents?marker=b")
        );
        assert_eq!(Pagination::Links("agents_links").next_url(&json!({})), None);
        assert_eq!(Pagination::Single.next_url(&body), None);
    }

    #[test]
    fn test_next_field_pagination() {
        let body = json!({"conductors": [], "next": "https://ironic/v1/conductors?marker=c1"});
        assert_eq!(
            Pagination::NextField.next_url(&body).as_deref(),
            Some("https://ironic/v1/conductors?marker=c1")
        );
        assert_eq!(Pagination::NextField.next_url(&json!({"next": ""})), None);
    }

    #[test]
    fn test_listing_url() {
        let listing = network::NetworkAgent::LISTING;
        assert_eq!(
            listing.url("https://neutron:9696/"),
            "https://neutron:9696/v2.0/agents"
        );
        assert_eq!(
            listing.url("https://neutron:9696/v2.0"),
            "https://neutron:9696/v2.0/agents"
        );
        assert_eq!(
            compute::ComputeService::LISTING.url("https://nova:8774/v2.1/"),
            "https://nova:8774/v2.1/os-services"
        );
        assert_eq!(
            baremetal::Conductor::LISTING.url("https://ironic:6385"),
            "https://ironic:6385/v1/conductors?detail=True"
        );
    }

    #[test]
    fn test_id_string() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "id_string")]
            id: String,
        }

        let row: Row = serde_json::from_value(json!({"id": 7})).unwrap();
        assert_eq!(row.id, "7");
        let row: Row = serde_json::from_value(json!({"id": "4f1c"})).unwrap();
        assert_eq!(row.id, "4f1c");
        let row: Row = serde_json::from_value(json!({})).unwrap();
        assert_eq!(row.id, "");
        assert!(serde_json::from_value::<Row>(json!({"id": [1]})).is_err());
    }

    #[test]
    fn test_family_names() {
        assert_eq!(ServiceFamily::Share.to_string(), "sharev2");
        assert_eq!(
            ServiceFamily::from_str("sharev2", false).unwrap(),
            ServiceFamily::Share
        );
        assert!(ServiceFamily::from_str("identity", false).is_err());
    }
}
