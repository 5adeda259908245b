use serde::Serialize;
use std::collections::BTreeMap;

///
/// Configuration key paths used by the workflows.
///
pub mod keys {
    pub const DEFAULT_LANGUAGE: &str = "oae-principals/user/defaultLanguage";
    pub const TIMEZONE: &str = "oae-tenants/timezone/timezone";
    pub const TERMS_ENABLED: &str = "oae-principals/termsAndConditions/enabled";
    pub const TERMS_TEXT: &str = "oae-principals/termsAndConditions/text/default";

    pub const LOCAL_ENABLED: &str = "oae-authentication/local/enabled";
    pub const LOCAL_ACCOUNT_CREATION: &str = "oae-authentication/local/allowAccountCreation";
    pub const SHIBBOLETH_ENABLED: &str = "oae-authentication/shibboleth/enabled";
    pub const SHIBBOLETH_IDP: &str = "oae-authentication/shibboleth/idpEntityID";
    pub const GOOGLE_ENABLED: &str = "oae-authentication/google/enabled";

    pub const LOGO_LARGE: &str = "oae-ui/skin/variables/institutional-logo-url";
    pub const LOGO_SMALL: &str = "oae-ui/skin/variables/institutional-logo-small-url";
    pub const BRANDING_IMAGE: &str = "oae-ui/skin/variables/branding-image-url";
    pub const BRANDING_GRADIENT_1: &str = "oae-ui/skin/variables/branding-gradient1-color";
    pub const BRANDING_GRADIENT_2: &str = "oae-ui/skin/variables/branding-gradient2-color";

    /// Landing page blocks live under this prefix, e.g. oae-tenants/block_2/text/default.
    pub const LANDING_PAGE_PREFIX: &str = "oae-tenants";
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Text(String),
}

impl ConfigValue {
    ///
    /// The value as it's posted to the config endpoint.
    ///
    pub fn to_form_value(&self) -> String {
        match self {
            ConfigValue::Bool(value) => value.to_string(),
            ConfigValue::Text(value) => value.clone(),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Text(value.into())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Text(value)
    }
}

impl From<&serde_json::Value> for ConfigValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(value)   => ConfigValue::Bool(*value),
            serde_json::Value::String(value) => ConfigValue::Text(value.clone()),
            other                            => ConfigValue::Text(other.to_string()),
        }
    }
}

///
/// A set of configuration key paths and their new values, applied to one tenant in a single call.
///
/// Keys are kept sorted so the payload (and the logs) are stable between runs.
///
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigUpdate {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<K: Into<String>, V: Into<ConfigValue>>(&mut self, key: K, value: V) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    ///
    /// Key/value pairs ready to be form encoded.
    ///
    pub fn form_pairs(&self) -> Vec<(&str, String)> {
        self.entries.iter()
            .map(|(key, value)| (key.as_str(), value.to_form_value()))
            .collect()
    }
}
