use serde_json::{Map, Value};
use std::{fs, path::Path};
use tenancy::{
    api::TenantApi,
    config::{keys, ConfigUpdate},
    error::Error,
    record::{Field, Record},
    tenant::TenantDirectory,
    ToCanonicalString};
use crate::summary::{Outcome, SkipReason};

const DEFINITE: &str = "_DEFINITE_";
const DISPLAY_NAME: &str = "_DISPLAYNAME_";

const HEADLINE_TEXT: &str = "# \\*Unity for _DEFINITE__DISPLAYNAME_\r\n\r\nThe cloud where universities work together";
const DISCLAIMER_TEXT: &str = "Note that \\*Unity is not an official campus service provided by _DEFINITE__DISPLAYNAME_. Find out more about \\*Unity at [http://www.unity.ac](http://www.unity.ac).\r\n\r\nNot at _DEFINITE__DISPLAYNAME_? [Find your university here](http://www.unity.ac).";
const VIDEO_PLACEHOLDER: &str = "/assets/landingpage/video.png";

const BRANDING_IMAGE: &str = "'/assets/landingpage/branding.png'";
const BRANDING_GRADIENT: &str = "rgba(255, 255, 255, 0.34)";

///
/// A landing page template: an object of blocks, each block an object of named fields. A field
/// called `text` holds localised text with the fallback under `default`.
///
#[derive(Clone, Debug)]
pub struct LandingPage {
    blocks: Map<String, Value>,
}

impl LandingPage {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .map_err(|source| Error::TemplateFileNotFound { path: path.to_canonical_string(), source })?;

        let value: Value = serde_json::from_str(&contents)
            .map_err(|source| Error::InvalidTemplate { path: path.to_canonical_string(), source })?;

        Self::from_value(value)
            .ok_or_else(|| Error::TemplateNotBlocks { path: path.to_canonical_string() })
    }

    ///
    /// None unless the value is an object whose members are all objects.
    ///
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(blocks) if blocks.values().all(Value::is_object) => Some(Self { blocks }),
            _ => None,
        }
    }

    ///
    /// A copy of the template with the organisation's name written into the headline and the
    /// disclaimer.
    ///
    pub fn populate(&self, organisation: &str, definite: Option<&str>) -> Map<String, Value> {
        let definite = match definite {
            Some(definite) => format!("{} ", definite),
            None => String::new(),
        };
        let substitute = |text: &str| text.replace(DEFINITE, &definite).replace(DISPLAY_NAME, organisation);

        let mut blocks = self.blocks.clone();
        set_field(&mut blocks, "block_2", &["text", "default"], Value::String(substitute(HEADLINE_TEXT)));
        set_field(&mut blocks, "block_3", &["videoPlaceholder"], Value::String(VIDEO_PLACEHOLDER.into()));
        set_field(&mut blocks, "block_6", &["text", "default"], Value::String(substitute(DISCLAIMER_TEXT)));
        blocks
    }

    ///
    /// The full configuration update for one tenant: every populated block field plus the landing
    /// page skin.
    ///
    pub fn config(&self, organisation: &str, definite: Option<&str>) -> ConfigUpdate {
        let mut update = flatten(&self.populate(organisation, definite));

        update.set(keys::BRANDING_IMAGE, BRANDING_IMAGE)
            .set(keys::BRANDING_GRADIENT_1, BRANDING_GRADIENT)
            .set(keys::BRANDING_GRADIENT_2, BRANDING_GRADIENT);

        update
    }
}

///
/// Set blocks[block][path..] creating any missing objects on the way.
///
fn set_field(blocks: &mut Map<String, Value>, block: &str, path: &[&str], value: Value) {
    let mut current = blocks.entry(block).or_insert_with(|| Value::Object(Map::new()));

    for name in path {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(*name).or_insert(Value::Null),
            _ => return,
        };
    }

    *current = value;
}

///
/// Turn the blocks into configuration key paths, oae-tenants/<block>/<field>, or
/// oae-tenants/<block>/text/default for localised text.
///
pub fn flatten(blocks: &Map<String, Value>) -> ConfigUpdate {
    let mut update = ConfigUpdate::new();

    for (block_id, block) in blocks {
        let fields = match block.as_object() {
            Some(fields) => fields,
            None => continue,
        };

        for (name, value) in fields {
            match value.get("default").filter(|default| name == "text" && is_truthy(default)) {
                Some(default) => update.set(format!("{}/{}/{}/default", keys::LANDING_PAGE_PREFIX, block_id, name), default),
                None => update.set(format!("{}/{}/{}", keys::LANDING_PAGE_PREFIX, block_id, name), value),
            };
        }
    }

    update
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null         => false,
        Value::Bool(value)  => *value,
        Value::Number(num)  => num.as_f64().map(|num| num != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        _                   => true,
    }
}

///
/// Applies the populated landing page to every known tenant in the sheet.
///
pub struct LandingPages<'a> {
    api: &'a dyn TenantApi,
    directory: &'a TenantDirectory,
    page: &'a LandingPage,
}

impl<'a> LandingPages<'a> {
    pub fn new(api: &'a dyn TenantApi, directory: &'a TenantDirectory, page: &'a LandingPage) -> Self {
        Self { api, directory, page }
    }

    pub fn process(&self, record: &Record) -> Outcome {
        let alias = match record.get(Field::Alias) {
            Some(alias) => alias,
            None => return Outcome::Skipped(SkipReason::MissingField(Field::Alias)),
        };

        if !self.directory.contains(alias) {
            return Outcome::Skipped(SkipReason::NoSuchTenant)
        }

        let organisation = match record.get(Field::Organisation) {
            Some(organisation) => organisation,
            None => return Outcome::Skipped(SkipReason::MissingField(Field::Organisation)),
        };

        log::info!("Setting landing page for {}", alias);

        let update = self.page.config(organisation, record.get(Field::Definite));
        match self.api.update_config(alias, &update) {
            Ok(()) => Outcome::Configured,
            Err(err) => Outcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use assert_json_diff::assert_json_eq;

    fn template() -> LandingPage {
        LandingPage::from_value(json!({
            "block_1": { "type": "search", "xs": "12", "minHeight": 290, "text": { "default": "" } },
            "block_2": { "type": "text", "horizontalAlign": "center", "text": { "default": "placeholder" } },
            "block_3": { "type": "video", "videoUrl": "https://www.youtube.com/watch?v=cfiM87Y0pWw" },
            "block_6": { "type": "text", "isLocal": false }
        })).unwrap()
    }

    #[test]
    fn test_rejects_non_block_templates() {
        assert!(LandingPage::from_value(json!([1, 2])).is_none());
        assert!(LandingPage::from_value(json!({ "block_1": "text" })).is_none());
    }

    #[test]
    fn test_populate_with_definite_article() {
        let blocks = template().populate("University of Acme", Some("the"));

        assert_eq!(blocks["block_2"]["text"]["default"],
            "# \\*Unity for the University of Acme\r\n\r\nThe cloud where universities work together");
        assert_eq!(blocks["block_3"]["videoPlaceholder"], "/assets/landingpage/video.png");
        assert!(blocks["block_6"]["text"]["default"].as_str().unwrap()
            .starts_with("Note that \\*Unity is not an official campus service provided by the University of Acme."));
    }

    #[test]
    fn test_populate_without_definite_article() {
        let blocks = template().populate("Acme", None);

        assert_eq!(blocks["block_2"]["text"]["default"],
            "# \\*Unity for Acme\r\n\r\nThe cloud where universities work together");
    }

    #[test]
    fn test_flatten_to_config_keys() {
        let blocks = template().populate("Acme", None);
        let update = template().config("Acme", None);

        assert_json_eq!(serde_json::to_value(&update).unwrap(), json!({
            "oae-tenants/block_1/type": "search",
            "oae-tenants/block_1/xs": "12",
            "oae-tenants/block_1/minHeight": "290",
            "oae-tenants/block_1/text": "{\"default\":\"\"}",
            "oae-tenants/block_2/type": "text",
            "oae-tenants/block_2/horizontalAlign": "center",
            "oae-tenants/block_2/text/default": blocks["block_2"]["text"]["default"],
            "oae-tenants/block_3/type": "video",
            "oae-tenants/block_3/videoUrl": "https://www.youtube.com/watch?v=cfiM87Y0pWw",
            "oae-tenants/block_3/videoPlaceholder": "/assets/landingpage/video.png",
            "oae-tenants/block_6/type": "text",
            "oae-tenants/block_6/isLocal": false,
            "oae-tenants/block_6/text/default": blocks["block_6"]["text"]["default"],
            "oae-ui/skin/variables/branding-image-url": "'/assets/landingpage/branding.png'",
            "oae-ui/skin/variables/branding-gradient1-color": "rgba(255, 255, 255, 0.34)",
            "oae-ui/skin/variables/branding-gradient2-color": "rgba(255, 255, 255, 0.34)"
        }));
    }
}
