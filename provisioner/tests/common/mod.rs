use fs_extra::dir::remove;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::{collections::{HashMap, HashSet}, path::{Path, PathBuf}, sync::Arc};
use tenancy::{
    api::TenantApi,
    config::ConfigUpdate,
    error::Error,
    tenant::{CreateOptions, Tenant, TenantUpdate}};

pub const FIXED_RUN_ID: &str = "74251904-63d9-11ec-a665-00155dd15f9e";

pub const TENANTS_HEADER: &str = "idp,organisation,alias,hostname,country,timezone,language,email,termsAndConditions,definite\n";

///
/// Set-up logging and a fixed run id.
///
/// Creates an empty scratch folder for the test under the cargo target temp dir, deleting anything a
/// previous run left there.
///
pub fn init_test(folder: &str) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();

    std::env::set_var("PROVISION_FIXED_RUN_ID", FIXED_RUN_ID);

    let base_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(folder);

    remove(&base_dir)
        .expect(&format!("Cannot remove base_dir {}", base_dir.to_string_lossy()));

    std::fs::create_dir_all(&base_dir)
        .expect("Cannot create the base_dir");

    base_dir
}

///
/// Write a file into the folder, creating the folder if required.
///
pub fn write_file(parent: &Path, filename: &str, contents: &str) -> PathBuf {
    std::fs::create_dir_all(parent).unwrap();
    let file = parent.join(filename);
    std::fs::write(&file, contents).unwrap();
    file
}

///
/// Create <base_dir>/logos/<alias>/<image> for each image given.
///
pub fn write_logos(base_dir: &Path, alias: &str, images: &[&str]) -> PathBuf {
    let logos = base_dir.join("logos");
    for image in images {
        write_file(&logos.join(alias), image, "png");
    }
    std::fs::create_dir_all(&logos).unwrap();
    logos
}

///
/// A remote call as the fake API received it.
///
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    List,
    Create { alias: String, payload: Value },
    Update { alias: String, payload: Value },
    Config { alias: String, payload: Value },
}

impl Call {
    pub fn alias(&self) -> Option<&str> {
        match self {
            Call::List => None,
            Call::Create { alias, .. } | Call::Update { alias, .. } | Call::Config { alias, .. } => Some(alias),
        }
    }
}

#[derive(Default)]
struct State {
    tenants: HashMap<String, Tenant>,
    calls: Vec<Call>,
    failing: HashSet<String>,
    fail_listing: bool,
}

///
/// An in-memory tenant server which records every call made to it. Clones share the same state so
/// a test can keep one to inspect while the run owns another.
///
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenants(tenants: Vec<Tenant>) -> Self {
        let api = Self::new();
        api.state.lock().tenants = tenants.into_iter().map(|tenant| (tenant.alias().to_string(), tenant)).collect();
        api
    }

    /// Every call involving this alias will be rejected with a 500.
    pub fn fail_for(self, alias: &str) -> Self {
        self.state.lock().failing.insert(alias.into());
        self
    }

    pub fn fail_listing(self) -> Self {
        self.state.lock().fail_listing = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| matches!(call, Call::Create { .. })).collect()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| matches!(call, Call::Update { .. })).collect()
    }

    pub fn configs(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| matches!(call, Call::Config { .. })).collect()
    }

    pub fn tenant(&self, alias: &str) -> Option<Tenant> {
        self.state.lock().tenants.get(alias).cloned()
    }

    fn check(&self, state: &State, operation: &str, alias: &str) -> Result<(), Error> {
        match state.failing.contains(alias) {
            true  => Err(Error::RemoteStatus { operation: format!("{} {}", operation, alias), status: 500, body: "Internal Server Error".into() }),
            false => Ok(()),
        }
    }
}

impl TenantApi for FakeApi {
    fn list_tenants(&self) -> Result<HashMap<String, Tenant>, Error> {
        let mut state = self.state.lock();
        state.calls.push(Call::List);

        if state.fail_listing {
            return Err(Error::RemoteStatus { operation: "Listing tenants".into(), status: 401, body: "Unauthorized".into() })
        }

        Ok(state.tenants.clone())
    }

    fn create_tenant(&self, alias: &str, display_name: &str, host: &str, options: &CreateOptions) -> Result<Tenant, Error> {
        let mut state = self.state.lock();

        let mut payload = json!({ "alias": alias, "displayName": display_name, "host": host });
        if let (Some(payload), Value::Object(options)) = (payload.as_object_mut(), serde_json::to_value(options).unwrap()) {
            payload.extend(options);
        }
        state.calls.push(Call::Create { alias: alias.into(), payload });

        self.check(&state, "Creating tenant", alias)?;

        if state.tenants.contains_key(alias) {
            return Err(Error::RemoteStatus { operation: format!("Creating tenant {}", alias), status: 400, body: "A tenant with the alias already exists".into() })
        }

        let tenant = Tenant::new(alias, display_name, host);
        state.tenants.insert(alias.into(), tenant.clone());
        Ok(tenant)
    }

    fn update_tenant(&self, alias: &str, update: &TenantUpdate) -> Result<(), Error> {
        let mut state = self.state.lock();
        state.calls.push(Call::Update { alias: alias.into(), payload: serde_json::to_value(update).unwrap() });

        self.check(&state, "Updating tenant", alias)?;

        let existing = match state.tenants.get(alias) {
            Some(existing) => existing.clone(),
            None => return Err(Error::RemoteStatus { operation: format!("Updating tenant {}", alias), status: 404, body: "Not Found".into() }),
        };

        let tenant = Tenant::new(
            alias,
            update.display_name.as_deref().unwrap_or(existing.display_name()),
            update.host.as_deref().unwrap_or(existing.host()));
        state.tenants.insert(alias.into(), tenant);
        Ok(())
    }

    fn update_config(&self, alias: &str, update: &ConfigUpdate) -> Result<(), Error> {
        let mut state = self.state.lock();
        state.calls.push(Call::Config { alias: alias.into(), payload: serde_json::to_value(update).unwrap() });

        self.check(&state, "Updating config of", alias)
    }
}
