use std::path::Path;
use tenancy::{
    api::TenantApi,
    config::{keys, ConfigUpdate},
    error::Error,
    logos::{resolve_logos, LogoPolicy},
    record::{Field, Record},
    tenant::{CreateOptions, TenantDirectory, TenantUpdate}};
use crate::summary::{Action, Outcome, SkipReason};

///
/// What to do with a record whose alias is already a tenant.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExistingPolicy {
    Skip,
    Update,
}

///
/// Creates (or updates) a tenant per record, then applies its configuration and any logos found in
/// the logos directory.
///
pub struct Provisioner<'a> {
    api: &'a dyn TenantApi,
    directory: &'a TenantDirectory,
    existing: ExistingPolicy,
    logos: &'a Path,
}

impl<'a> Provisioner<'a> {
    pub fn new(api: &'a dyn TenantApi, directory: &'a TenantDirectory, existing: ExistingPolicy, logos: &'a Path) -> Self {
        Self { api, directory, existing, logos }
    }

    pub fn process(&self, record: &Record) -> Outcome {
        self.try_process(record).unwrap_or_else(Outcome::Failed)
    }

    fn try_process(&self, record: &Record) -> Result<Outcome, Error> {
        let (organisation, alias, hostname) = match required_fields(record) {
            Ok(fields) => fields,
            Err(field) => return Ok(Outcome::Skipped(SkipReason::MissingField(field))),
        };

        let options = CreateOptions {
            email_domain: record.get(Field::Email).map(String::from),
            country_code: record.get(Field::Country).map(String::from),
        };

        let action = match self.directory.get(alias) {
            None => {
                log::info!("Creating {} ({})", alias, hostname);
                self.api.create_tenant(alias, organisation, hostname, &options)?;
                Action::Created
            },
            Some(_existing) if self.existing == ExistingPolicy::Skip => {
                return Ok(Outcome::Skipped(SkipReason::AlreadyExists))
            },
            Some(existing) => {
                log::info!("Updating {} ({})", alias, hostname);
                let update = TenantUpdate::for_existing(existing, organisation, hostname, options);
                if update.host.is_none() {
                    log::debug!("  Host of {} is unchanged", alias);
                }
                self.api.update_tenant(alias, &update)?;
                Action::Updated
            },
        };

        let config = tenant_config(record);
        let configured = !config.is_empty();
        if configured {
            log::debug!("  Setting {} configuration values on {}", config.len(), alias);
            self.api.update_config(alias, &config)?;
        }

        let logos = resolve_logos(self.logos, alias, LogoPolicy::PresentOnly);
        let has_logos = !logos.is_empty();
        if has_logos {
            log::debug!("  Setting logos on {}", alias);
            self.api.update_config(alias, &logos)?;
        }

        Ok(Outcome::Provisioned { action, configured, logos: has_logos })
    }
}

///
/// The organisation, alias and hostname of the record or the first of them which is missing.
///
pub fn required_fields(record: &Record) -> Result<(&str, &str, &str), Field> {
    let organisation = record.get(Field::Organisation).ok_or(Field::Organisation)?;
    let alias = record.get(Field::Alias).ok_or(Field::Alias)?;
    let hostname = record.get(Field::Hostname).ok_or(Field::Hostname)?;
    Ok((organisation, alias, hostname))
}

///
/// The configuration carried by a record. Only populated fields produce keys. A record with an
/// identity provider is switched to federated sign-in, with local account creation turned off.
///
pub fn tenant_config(record: &Record) -> ConfigUpdate {
    let mut update = ConfigUpdate::new();

    if let Some(language) = record.get(Field::Language) {
        update.set(keys::DEFAULT_LANGUAGE, language);
    }

    if let Some(timezone) = record.get(Field::Timezone) {
        update.set(keys::TIMEZONE, timezone);
    }

    if let Some(terms) = record.get(Field::TermsAndConditions) {
        update.set(keys::TERMS_ENABLED, true)
            .set(keys::TERMS_TEXT, terms);
    }

    if let Some(idp) = record.get(Field::Idp) {
        update.set(keys::LOCAL_ACCOUNT_CREATION, false)
            .set(keys::SHIBBOLETH_ENABLED, true)
            .set(keys::SHIBBOLETH_IDP, idp);
    }

    update
}
