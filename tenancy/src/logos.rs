use std::{fs, path::{Component, Path}};
use crate::{config::{keys, ConfigUpdate}, error::Error, ToCanonicalString};

/// The folder holding the platform-wide fallback images.
pub const DEFAULT_ALIAS: &str = "default";

///
/// What to do when a tenant has no small or large logo of its own.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogoPolicy {
    /// Only set keys for images which exist.
    PresentOnly,
    /// Point missing small/large logos at the default images. Branding never falls back.
    DefaultFallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Logo {
    Small,
    Large,
    Branding,
}

impl Logo {
    pub fn filename(&self) -> &'static str {
        match self {
            Logo::Small    => "small.png",
            Logo::Large    => "large.png",
            Logo::Branding => "branding.png",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Logo::Small    => keys::LOGO_SMALL,
            Logo::Large    => keys::LOGO_LARGE,
            Logo::Branding => keys::BRANDING_IMAGE,
        }
    }

    fn falls_back(&self) -> bool {
        !matches!(self, Logo::Branding)
    }
}

///
/// The public URL of a tenant's image. The skin variables need the URL wrapped in single quotes.
///
pub fn asset_url(alias: &str, logo: Logo) -> String {
    format!("'/assets/{}/{}'", alias, logo.filename())
}

///
/// Check <base>/<alias>/ for the conventional image files and map them onto skin configuration.
///
/// An empty update means there is nothing to set for this tenant.
///
/// Aliases which aren't a single plain folder name, eg. `../other`, resolve to nothing.
///
pub fn resolve_logos(base: &Path, alias: &str, policy: LogoPolicy) -> ConfigUpdate {
    let mut update = ConfigUpdate::new();

    if !is_folder_name(alias) {
        log::warn!("Not looking for logos of {}, it is not a plain folder name", alias);
        return update
    }

    for logo in [Logo::Large, Logo::Small, Logo::Branding] {
        let path = base.join(alias).join(logo.filename());

        if path.is_file() {
            log::debug!("Found {}", path.to_canonical_string());
            update.set(logo.key(), asset_url(alias, logo));

        } else if policy == LogoPolicy::DefaultFallback && logo.falls_back() {
            update.set(logo.key(), asset_url(DEFAULT_ALIAS, logo));
        }
    }

    update
}

///
/// True if the alias names exactly one entry directly inside a folder.
///
fn is_folder_name(alias: &str) -> bool {
    let mut components = Path::new(alias).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(name)), None) if name == alias)
}

///
/// The tenant folders in the logos directory, sorted by name. The default folder is not a tenant
/// and is left out.
///
pub fn logo_aliases(base: &Path) -> Result<Vec<String>, Error> {
    if !base.is_dir() {
        return Err(Error::LogosDirMissing { path: base.to_canonical_string() })
    }

    let entries = base.read_dir()
        .map_err(|source| Error::CannotReadDir { path: base.to_canonical_string(), source })?;

    let mut aliases = vec!();
    for entry in entries {
        let entry = entry.map_err(|source| Error::CannotReadDir { path: base.to_canonical_string(), source })?;

        let alias = entry.file_name().to_string_lossy().to_string();
        if alias == DEFAULT_ALIAS || !entry.path().is_dir() {
            continue
        }
        aliases.push(alias);
    }

    aliases.sort();
    Ok(aliases)
}
