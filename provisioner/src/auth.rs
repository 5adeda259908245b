use tenancy::{api::TenantApi, config::{keys, ConfigUpdate}, tenant::TenantDirectory};
use crate::summary::{Outcome, SkipReason};

///
/// Turn Google sign-in off and put local accounts, including self-registration, back on.
///
pub fn revert_auth_config() -> ConfigUpdate {
    let mut update = ConfigUpdate::new();
    update.set(keys::GOOGLE_ENABLED, false)
        .set(keys::LOCAL_ENABLED, true)
        .set(keys::LOCAL_ACCOUNT_CREATION, true);
    update
}

pub struct AuthReversion<'a> {
    api: &'a dyn TenantApi,
    directory: &'a TenantDirectory,
    update: ConfigUpdate,
}

impl<'a> AuthReversion<'a> {
    pub fn new(api: &'a dyn TenantApi, directory: &'a TenantDirectory) -> Self {
        Self { api, directory, update: revert_auth_config() }
    }

    pub fn process(&self, alias: &String) -> Outcome {
        if !self.directory.contains(alias) {
            return Outcome::Skipped(SkipReason::NoSuchTenant)
        }

        log::info!("Reverting authentication for {}", alias);

        match self.api.update_config(alias, &self.update) {
            Ok(()) => Outcome::Configured,
            Err(err) => Outcome::Failed(err),
        }
    }
}
