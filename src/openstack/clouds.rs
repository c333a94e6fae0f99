//! clouds.yaml loading
//!
//! Mirrors the lookup other OpenStack clients perform: an explicit file
//! first, then the working directory, the user config directory and
//! `/etc/openstack`. A `secure.yaml` found in the same places fills in
//! fields (typically passwords) missing from the main entry.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::{CheckError, Result};

const CLOUDS_FILE: &str = "clouds.yaml";
const SECURE_FILE: &str = "secure.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
struct CloudsFile {
    #[serde(default)]
    clouds: HashMap<String, Cloud>,
}

/// One entry under `clouds:`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cloud {
    #[serde(default)]
    pub auth: AuthOptions,
    pub auth_type: Option<String>,
    #[serde(alias = "region")]
    pub region_name: Option<String>,
    #[serde(alias = "endpoint_type")]
    pub interface: Option<String>,
    pub verify: Option<bool>,
    pub cacert: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthOptions {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "tenant_name")]
    pub project_name: Option<String>,
    #[serde(alias = "tenant_id")]
    pub project_id: Option<String>,
    pub user_domain_name: Option<String>,
    pub user_domain_id: Option<String>,
    pub project_domain_name: Option<String>,
    pub project_domain_id: Option<String>,
    pub domain_name: Option<String>,
    pub domain_id: Option<String>,
    pub application_credential_id: Option<String>,
    pub application_credential_name: Option<String>,
    pub application_credential_secret: Option<String>,
}

macro_rules! overlay {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if $target.$field.is_none() {
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

impl Cloud {
    /// Fill fields this entry leaves unset from `other`.
    fn overlay(&mut self, other: &Cloud) {
        overlay!(self, other, auth_type, region_name, interface, verify, cacert);
        overlay!(
            self.auth,
            other.auth,
            auth_url,
            username,
            user_id,
            password,
            project_name,
            project_id,
            user_domain_name,
            user_domain_id,
            project_domain_name,
            project_domain_id,
            domain_name,
            domain_id,
            application_credential_id,
            application_credential_name,
            application_credential_secret,
        );
    }

    /// Endpoint interface, normalised from `publicURL` style values.
    pub fn interface(&self) -> String {
        let interface = self.interface.as_deref().unwrap_or("public");
        interface
            .strip_suffix("URL")
            .unwrap_or(interface)
            .to_lowercase()
    }

    pub fn is_application_credential(&self) -> bool {
        matches!(
            self.auth_type.as_deref(),
            Some("v3applicationcredential") | Some("applicationcredential")
        ) || self.auth.application_credential_secret.is_some()
    }
}

/// Candidate paths for a config file name, most specific first.
fn search_paths(file_name: &str) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(file_name)];
    if let Ok(home) = env::var("HOME") {
        paths.push(Path::new(&home).join(".config/openstack").join(file_name));
    }
    paths.push(Path::new("/etc/openstack").join(file_name));
    paths
}

fn read_clouds(path: &Path) -> Result<CloudsFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| CheckError::io(path, e))?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Load the named cloud.
///
/// `explicit` comes from `--os-config-file` / `OS_CLIENT_CONFIG_FILE` and,
/// when given, is the only clouds.yaml considered.
pub fn load_cloud(name: &str, explicit: Option<&Path>) -> Result<Cloud> {
    let clouds_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => search_paths(CLOUDS_FILE)
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| CheckError::CloudsFile("no clouds.yaml found".to_string()))?,
    };

    debug!("Loading cloud {} from {}", name, clouds_path.display());

    let mut cloud = read_clouds(&clouds_path)?
        .clouds
        .remove(name)
        .ok_or_else(|| {
            CheckError::CloudsFile(format!(
                "cloud {} not found in {}",
                name,
                clouds_path.display()
            ))
        })?;

    let secure_dir = clouds_path.parent().unwrap_or_else(|| Path::new("."));
    let secure_candidates =
        std::iter::once(secure_dir.join(SECURE_FILE)).chain(search_paths(SECURE_FILE));
    for secure_path in secure_candidates {
        if !secure_path.is_file() {
            continue;
        }
        if let Some(secure) = read_clouds(&secure_path)?.clouds.get(name) {
            debug!("Merging secrets from {}", secure_path.display());
            cloud.overlay(secure);
        }
        break;
    }

    Ok(cloud)
}
