use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::{api::TenantApi, error::Error};

///
/// A tenant as reported by the administration API. Attributes we don't use are ignored.
///
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    alias: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    email_domains: Vec<String>,
    country_code: Option<String>,
}

impl Tenant {
    pub fn new(alias: &str, display_name: &str, host: &str) -> Self {
        Self {
            alias: alias.into(),
            display_name: display_name.into(),
            host: host.into(),
            email_domains: vec!(),
            country_code: None,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn email_domains(&self) -> &[String] {
        &self.email_domains
    }

    pub fn country_code(&self) -> Option<&str> {
        self.country_code.as_deref()
    }
}

///
/// Optional attributes given to a new tenant.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

///
/// The fields to change on an existing tenant. Only the populated fields are sent.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl TenantUpdate {
    ///
    /// Build an update for the existing tenant. The host is only included when it changes as the
    /// API rejects a host which is already in use - including by the tenant itself.
    ///
    pub fn for_existing(existing: &Tenant, display_name: &str, host: &str, options: CreateOptions) -> Self {
        Self {
            display_name: Some(display_name.into()),
            host: match existing.host().eq_ignore_ascii_case(host) {
                true  => None,
                false => Some(host.into()),
            },
            email_domain: options.email_domain,
            country_code: options.country_code,
        }
    }
}

///
/// A point-in-time snapshot of every tenant, keyed by alias. Fetched once at the start of a run and
/// never refreshed.
///
#[derive(Debug, Default)]
pub struct TenantDirectory {
    tenants: HashMap<String, Tenant>,
}

impl TenantDirectory {
    ///
    /// Issue the single 'list all tenants' call.
    ///
    pub fn fetch(api: &dyn TenantApi) -> Result<Self, Error> {
        let tenants = api.list_tenants()?;
        log::info!("Fetched {} existing tenants", tenants.len());
        Ok(Self { tenants })
    }

    pub fn from_tenants<I: IntoIterator<Item = Tenant>>(tenants: I) -> Self {
        Self {
            tenants: tenants.into_iter().map(|tenant| (tenant.alias.clone(), tenant)).collect(),
        }
    }

    pub fn get(&self, alias: &str) -> Option<&Tenant> {
        self.tenants.get(alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.tenants.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
