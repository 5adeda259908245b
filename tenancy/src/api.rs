use std::collections::HashMap;
use reqwest::{blocking::{Client, RequestBuilder, Response}, Url};
use crate::{config::ConfigUpdate, error::Error, tenant::{CreateOptions, Tenant, TenantUpdate}};

///
/// The slice of the tenant administration API the workflows drive.
///
/// One instance is shared by every worker thread.
///
pub trait TenantApi: Send + Sync {
    /// Every tenant on the system keyed by alias.
    fn list_tenants(&self) -> Result<HashMap<String, Tenant>, Error>;

    fn create_tenant(&self, alias: &str, display_name: &str, host: &str, options: &CreateOptions) -> Result<Tenant, Error>;

    fn update_tenant(&self, alias: &str, update: &TenantUpdate) -> Result<(), Error>;

    fn update_config(&self, alias: &str, update: &ConfigUpdate) -> Result<(), Error>;
}

#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).finish_non_exhaustive()
    }
}

///
/// A global administrator session against the REST API. The session cookie obtained at login is
/// kept by the client's cookie store and sent with every subsequent call.
///
#[derive(Debug)]
pub struct RestClient {
    base_url: Url,
    client: Client,
}

impl RestClient {
    ///
    /// Build the client and log in. Certificate checks are skipped unless strict_ssl is set, admin
    /// hosts often run with self-signed certificates.
    ///
    pub fn connect(base_url: &str, credentials: &Credentials, strict_ssl: bool) -> Result<Self, Error> {
        let url = Url::parse(base_url)
            .map_err(|err| Error::InvalidUrl { url: base_url.into(), reason: err.to_string() })?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl { url: base_url.into(), reason: "expected an http(s) URL".into() })
        }

        let client = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!strict_ssl)
            .build()
            .map_err(|source| Error::CannotBuildClient { url: base_url.into(), source })?;

        let rest = Self { base_url: url, client };
        rest.login(credentials)?;
        Ok(rest)
    }

    fn login(&self, credentials: &Credentials) -> Result<(), Error> {
        log::debug!("Logging in to {} as {}", self.base_url, credentials.username());

        let form = [("username", credentials.username.as_str()), ("password", credentials.password.as_str())];
        send("Logging in", self.client.post(self.endpoint(&["api", "auth", "login"])).form(&form))?;
        Ok(())
    }

    ///
    /// Append the path segments to the base URL. Segments are percent-encoded.
    ///
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl TenantApi for RestClient {
    fn list_tenants(&self) -> Result<HashMap<String, Tenant>, Error> {
        let operation = "Listing tenants";
        send(operation, self.client.get(self.endpoint(&["api", "tenants"])))?
            .json()
            .map_err(|source| Error::RemoteDecode { operation: operation.into(), source })
    }

    fn create_tenant(&self, alias: &str, display_name: &str, host: &str, options: &CreateOptions) -> Result<Tenant, Error> {
        let operation = format!("Creating tenant {}", alias);

        let mut form = vec!(("alias", alias), ("displayName", display_name), ("host", host));
        if let Some(email_domain) = &options.email_domain {
            form.push(("emailDomain", email_domain.as_str()));
        }
        if let Some(country_code) = &options.country_code {
            form.push(("countryCode", country_code.as_str()));
        }

        send(&operation, self.client.post(self.endpoint(&["api", "tenant", "create"])).form(&form))?
            .json()
            .map_err(|source| Error::RemoteDecode { operation, source })
    }

    fn update_tenant(&self, alias: &str, update: &TenantUpdate) -> Result<(), Error> {
        send(&format!("Updating tenant {}", alias), self.client.post(self.endpoint(&["api", "tenant", alias])).form(update))?;
        Ok(())
    }

    fn update_config(&self, alias: &str, update: &ConfigUpdate) -> Result<(), Error> {
        send(&format!("Updating configuration of {}", alias), self.client.post(self.endpoint(&["api", "config", alias])).form(&update.form_pairs()))?;
        Ok(())
    }
}

///
/// Send the request. Anything other than a 2xx response is an error carrying the status and the
/// response body.
///
fn send(operation: &str, request: RequestBuilder) -> Result<Response, Error> {
    let response = request.send()
        .map_err(|source| Error::RemoteTransport { operation: operation.into(), source })?;

    let status = response.status();
    if status.is_success() {
        log::trace!("{} - {}", operation, status);
        return Ok(response)
    }

    let body = response.text().unwrap_or_default();
    Err(Error::RemoteStatus { operation: operation.into(), status: status.as_u16(), body })
}
