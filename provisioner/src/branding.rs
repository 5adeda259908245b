use std::path::Path;
use tenancy::{api::TenantApi, logos::{resolve_logos, LogoPolicy}, tenant::TenantDirectory};
use crate::summary::{Outcome, SkipReason};

///
/// Points each tenant folder in the logos directory at its images. Tenants without their own small
/// or large logo get the default ones.
///
pub struct Branding<'a> {
    api: &'a dyn TenantApi,
    directory: &'a TenantDirectory,
    logos: &'a Path,
}

impl<'a> Branding<'a> {
    pub fn new(api: &'a dyn TenantApi, directory: &'a TenantDirectory, logos: &'a Path) -> Self {
        Self { api, directory, logos }
    }

    pub fn process(&self, alias: &String) -> Outcome {
        if !self.directory.contains(alias) {
            return Outcome::Skipped(SkipReason::NoSuchTenant)
        }

        log::info!("Setting logos for {}", alias);

        let update = resolve_logos(self.logos, alias, LogoPolicy::DefaultFallback);
        match self.api.update_config(alias, &update) {
            Ok(()) => Outcome::Configured,
            Err(err) => Outcome::Failed(err),
        }
    }
}
