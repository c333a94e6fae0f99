//! Keystone v3 authentication and service catalog lookup

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::clouds::{AuthOptions, Cloud};
use crate::errors::{CheckError, Result};

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub interface: String,
    pub region_id: Option<String>,
    pub region: Option<String>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: TokenBody,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

/// An issued token and the catalog that came with it.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub catalog: Vec<CatalogEntry>,
    pub interface: String,
    pub region: Option<String>,
}

impl Session {
    /// First endpoint matching one of `service_types`, the session interface
    /// and, when configured, the region.
    pub fn endpoint_for(&self, service_types: &[&str]) -> Result<String> {
        let found = service_types.iter().find_map(|service_type| {
            self.catalog
                .iter()
                .filter(|entry| entry.service_type == *service_type)
                .flat_map(|entry| entry.endpoints.iter())
                .find(|endpoint| {
                    endpoint.interface == self.interface
                        && self.region.as_deref().is_none_or(|region| {
                            endpoint.region_id.as_deref() == Some(region)
                                || endpoint.region.as_deref() == Some(region)
                        })
                })
        });

        match found {
            Some(endpoint) => {
                debug!("Resolved {:?} to {}", service_types, endpoint.url);
                Ok(endpoint.url.clone())
            }
            None => Err(CheckError::Endpoint {
                service_types: service_types.iter().map(|s| s.to_string()).collect(),
                interface: self.interface.clone(),
                region: self.region.clone(),
            }),
        }
    }
}

/// `POST /v3/auth/tokens` target for a configured `auth_url`.
pub fn tokens_url(auth_url: &str) -> String {
    let base = auth_url.trim_end_matches('/');
    if base.ends_with("/v3") {
        format!("{}/auth/tokens", base)
    } else {
        format!("{}/v3/auth/tokens", base)
    }
}

fn domain(id: &Option<String>, name: &Option<String>) -> Option<Value> {
    match (id, name) {
        (Some(id), _) => Some(json!({ "id": id })),
        (None, Some(name)) => Some(json!({ "name": name })),
        (None, None) => None,
    }
}

fn user(auth: &AuthOptions) -> Result<Value> {
    if let Some(user_id) = &auth.user_id {
        return Ok(json!({ "id": user_id }));
    }

    let name = auth
        .username
        .as_ref()
        .ok_or_else(|| CheckError::Auth("either username or user_id is required".to_string()))?;
    let domain = domain(&auth.user_domain_id, &auth.user_domain_name)
        .or_else(|| domain(&auth.domain_id, &auth.domain_name))
        .ok_or_else(|| CheckError::Auth(format!("no domain given for user {}", name)))?;

    Ok(json!({ "name": name, "domain": domain }))
}

fn scope(auth: &AuthOptions) -> Option<Value> {
    if let Some(project_id) = &auth.project_id {
        return Some(json!({ "project": { "id": project_id } }));
    }

    if let Some(project_name) = &auth.project_name {
        let domain = domain(&auth.project_domain_id, &auth.project_domain_name)
            .or_else(|| domain(&auth.domain_id, &auth.domain_name))
            .unwrap_or_else(|| json!({ "id": "default" }));
        return Some(json!({ "project": { "name": project_name, "domain": domain } }));
    }

    domain(&auth.domain_id, &auth.domain_name).map(|domain| json!({ "domain": domain }))
}

/// Build the token request body for the cloud's auth method.
pub fn auth_request(cloud: &Cloud) -> Result<Value> {
    let auth = &cloud.auth;

    if cloud.is_application_credential() {
        let secret = auth.application_credential_secret.as_ref().ok_or_else(|| {
            CheckError::Auth("application_credential_secret is required".to_string())
        })?;
        let credential = match (
            &auth.application_credential_id,
            &auth.application_credential_name,
        ) {
            (Some(id), _) => json!({ "id": id, "secret": secret }),
            (None, Some(name)) => json!({ "name": name, "user": user(auth)?, "secret": secret }),
            (None, None) => {
                return Err(CheckError::Auth(
                    "application_credential_id or application_credential_name is required"
                        .to_string(),
                ));
            }
        };

        return Ok(json!({
            "auth": {
                "identity": {
                    "methods": ["application_credential"],
                    "application_credential": credential,
                }
            }
        }));
    }

    let password = auth
        .password
        .as_ref()
        .ok_or_else(|| CheckError::Auth("password is required".to_string()))?;
    let mut password_user = user(auth)?;
    password_user["password"] = json!(password);

    let mut body = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": { "user": password_user },
            }
        }
    });
    if let Some(scope) = scope(auth) {
        body["auth"]["scope"] = scope;
    }

    Ok(body)
}

/// Request a token. The check never re-authenticates, so the token is used
/// for the lifetime of the invocation only.
pub async fn authenticate(http: &Client, cloud: &Cloud) -> Result<Session> {
    let auth_url = cloud
        .auth
        .auth_url
        .as_deref()
        .ok_or_else(|| CheckError::Auth("auth_url is required".to_string()))?;
    let url = tokens_url(auth_url);
    let body = auth_request(cloud)?;

    debug!("POST {}", url);
    let response = http.post(&url).json(&body).send().await?;
    let status = response.status();
    debug!("POST {} -> {}", url, status);

    if !status.is_success() {
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = match status {
            StatusCode::UNAUTHORIZED => format!("invalid credentials: {}", error_body),
            StatusCode::FORBIDDEN => format!("access denied: {}", error_body),
            StatusCode::NOT_FOUND => format!("identity endpoint {} not found", url),
            _ => format!("unexpected response {}: {}", status, error_body),
        };
        return Err(CheckError::Auth(message));
    }

    let token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
        .ok_or_else(|| CheckError::Auth(format!("response lacks {}", SUBJECT_TOKEN_HEADER)))?;

    let body: TokenResponse = response.json().await?;
    if body.token.catalog.is_empty() {
        return Err(CheckError::Auth(
            "token has an empty service catalog, is it scoped?".to_string(),
        ));
    }

    info!(
        "Authenticated against {} ({} catalog entries)",
        auth_url,
        body.token.catalog.len()
    );

    Ok(Session {
        token,
        catalog: body.token.catalog,
        interface: cloud.interface(),
        region: cloud.region_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_cloud() -> Cloud {
        Cloud {
            auth: AuthOptions {
                auth_url: Some("https://keystone:5000".to_string()),
                username: Some("monitor".to_string()),
                password: Some("pw".to_string()),
                project_name: Some("admin".to_string()),
                user_domain_name: Some("Default".to_string()),
                project_domain_id: Some("default".to_string()),
                ..AuthOptions::default()
            },
            ..Cloud::default()
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        serde_json::from_value(json!([
            {
                "type": "compute",
                "name": "nova",
                "endpoints": [
                    {
                        "interface": "internal", "region_id": "RegionOne", "region": "RegionOne",
                        "url": "http://nova-int:8774/v2.1"
                    },
                    {
                        "interface": "public", "region_id": "RegionTwo", "region": "RegionTwo",
                        "url": "https://nova.two:8774/v2.1"
                    },
                    {
                        "interface": "public", "region_id": "RegionOne", "region": "RegionOne",
                        "url": "https://nova.one:8774/v2.1"
                    }
                ]
            },
            {
                "type": "volumev3",
                "name": "cinderv3",
                "endpoints": [
                    {
                        "interface": "public", "region_id": "RegionOne",
                        "url": "https://cinder:8776/v3/p1"
                    }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_tokens_url() {
        assert_eq!(
            tokens_url("https://keystone:5000"),
            "https://keystone:5000/v3/auth/tokens"
        );
        assert_eq!(
            tokens_url("https://keystone:5000/v3/"),
            "https://keystone:5000/v3/auth/tokens"
        );
    }

    #[test]
    fn test_password_request() {
        let body = auth_request(&password_cloud()).unwrap();
        assert_eq!(body["auth"]["identity"]["methods"], json!(["password"]));
        assert_eq!(
            body["auth"]["identity"]["password"]["user"],
            json!({"name": "monitor", "domain": {"name": "Default"}, "password": "pw"})
        );
        assert_eq!(
            body["auth"]["scope"],
            json!({"project": {"name": "admin", "domain": {"id": "default"}}})
        );
    }

    #[test]
    fn test_application_credential_request() {
        let cloud = Cloud {
            auth_type: Some("v3applicationcredential".to_string()),
            auth: AuthOptions {
                application_credential_id: Some("abc".to_string()),
                application_credential_secret: Some("s".to_string()),
                ..AuthOptions::default()
            },
            ..Cloud::default()
        };
        let body = auth_request(&cloud).unwrap();
        assert_eq!(
            body["auth"]["identity"]["application_credential"],
            json!({"id": "abc", "secret": "s"})
        );
        assert!(body["auth"].get("scope").is_none());
    }

    #[test]
    fn test_missing_password() {
        let mut cloud = password_cloud();
        cloud.auth.password = None;
        assert!(matches!(auth_request(&cloud), Err(CheckError::Auth(_))));
    }

    #[test]
    fn test_endpoint_resolution() {
        let session = Session {
            token: "t".to_string(),
            catalog: catalog(),
            interface: "public".to_string(),
            region: Some("RegionOne".to_string()),
        };
        assert_eq!(
            session.endpoint_for(&["compute"]).unwrap(),
            "https://nova.one:8774/v2.1"
        );
        assert_eq!(
            session.endpoint_for(&["block-storage", "volumev3"]).unwrap(),
            "https://cinder:8776/v3/p1"
        );
        assert!(matches!(
            session.endpoint_for(&["baremetal"]),
            Err(CheckError::Endpoint { .. })
        ));

        let internal = Session {
            interface: "internal".to_string(),
            region: None,
            ..session
        };
        assert_eq!(
            internal.endpoint_for(&["compute"]).unwrap(),
            "http://nova-int:8774/v2.1"
        );
    }
}
