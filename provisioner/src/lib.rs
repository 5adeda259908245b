mod auth;
mod branding;
mod landing;
mod provision;
pub mod error;
pub mod pool;
pub mod summary;

pub use auth::revert_auth_config;
pub use landing::{flatten, LandingPage};
pub use pool::FailurePolicy;
pub use provision::{required_fields, tenant_config, ExistingPolicy};

use uuid::Uuid;
use std::{path::{Path, PathBuf}, str::FromStr, time::Instant};
use auth::AuthReversion;
use branding::Branding;
use error::ProvisionError;
use landing::LandingPages;
use pool::WorkerPool;
use provision::Provisioner;
use summary::Summary;
use tenancy::{
    api::TenantApi,
    error::Error,
    logos::logo_aliases,
    record::{load_aliases, load_records, Record, Schema, TENANTS},
    tenant::TenantDirectory};

///
/// The batch jobs this crate can run.
///
#[derive(Debug)]
pub enum Workflow {
    /// Create a tenant per CSV row, optionally updating those which already exist.
    Provision { file: PathBuf, schema: &'static Schema, logos: PathBuf, existing: ExistingPolicy },

    /// Set logo URLs for every tenant folder in the logos directory.
    Logos { logos: PathBuf },

    /// Configure the landing page of every known tenant in the CSV.
    LandingPages { file: PathBuf, template: PathBuf },

    /// Switch a list of tenants from Google sign-in back to local accounts.
    RevertAuth { file: PathBuf },
}

impl Workflow {
    pub fn name(&self) -> &'static str {
        match self {
            Workflow::Provision { existing: ExistingPolicy::Skip, .. }   => "create",
            Workflow::Provision { existing: ExistingPolicy::Update, .. } => "upsert",
            Workflow::Logos { .. }        => "logos",
            Workflow::LandingPages { .. } => "landing-pages",
            Workflow::RevertAuth { .. }   => "revert-auth",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { concurrency: 1, failure_policy: FailurePolicy::FailFast }
    }
}

///
/// Created for each run. Used to pass the top-level run 'things' around.
///
pub struct Context {
    started: Instant, // When the run started.
    run_id: Uuid,     // Each run is given a unique id.
    workflow: Workflow,
    options: RunOptions,
}

impl Context {
    pub fn new(workflow: Workflow, options: RunOptions) -> Self {
        let run_id = match std::env::var("PROVISION_FIXED_RUN_ID") {
            Ok(run_id) => Uuid::from_str(&run_id).unwrap_or_else(|_| {
                log::warn!("Ignoring PROVISION_FIXED_RUN_ID {}, it is not a uuid", run_id);
                Uuid::new_v4()
            }),
            Err(_) => Uuid::new_v4(),
        };

        Self { started: Instant::now(), run_id, workflow, options }
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn run_id(&self) -> &Uuid {
        &self.run_id
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }
}

///
/// Read the workflow's input, connect to the API, take the tenant snapshot, then process every
/// record on the worker pool.
///
/// Input and connection problems are returned as errors before any record is touched, and input is
/// read in full before the API is contacted. Record failures are reported in the summary.
///
pub fn run_workflow<A, C>(workflow: Workflow, options: RunOptions, connect: C) -> Result<Summary, ProvisionError>
where
    A: TenantApi + 'static,
    C: FnOnce() -> Result<A, Error>,
{
    let ctx = Context::new(workflow, options);
    let pool = WorkerPool::new(ctx.options().concurrency, ctx.options().failure_policy)?;

    log::info!("Starting {} run:", ctx.workflow().name());
    log::info!("       Run ID: {}", ctx.run_id());
    log::info!("  Concurrency: {}", pool.workers());

    let mut summary = match ctx.workflow() {
        Workflow::Provision { file, schema, logos, existing } => {
            log::info!("         File: {} ({} layout)", file.to_string_lossy(), schema.name());
            let records = read_records(file, *schema)?;

            let (api, directory) = snapshot(connect)?;
            let provisioner = Provisioner::new(&api, &directory, *existing, logos);
            pool.run(records, |record| provisioner.process(record))?
        },

        Workflow::Logos { logos } => {
            log::info!("        Logos: {}", logos.to_string_lossy());
            let aliases = logo_aliases(logos)?;

            let (api, directory) = snapshot(connect)?;
            let branding = Branding::new(&api, &directory, logos);
            pool.run(aliases, |alias| branding.process(alias))?
        },

        Workflow::LandingPages { file, template } => {
            log::info!("         File: {}", file.to_string_lossy());
            log::info!("     Template: {}", template.to_string_lossy());
            let page = LandingPage::load(template)?;
            let records = read_records(file, &TENANTS)?;

            let (api, directory) = snapshot(connect)?;
            let landing_pages = LandingPages::new(&api, &directory, &page);
            pool.run(records, |record| landing_pages.process(record))?
        },

        Workflow::RevertAuth { file } => {
            log::info!("         File: {}", file.to_string_lossy());
            let aliases = load_aliases(file)?;

            let (api, directory) = snapshot(connect)?;
            let reversion = AuthReversion::new(&api, &directory);
            pool.run(aliases, |alias| reversion.process(alias))?
        },
    };

    summary.finish(ctx.started().elapsed());
    summary.log();

    Ok(summary)
}

///
/// Read every record up-front so a malformed file stops the run before any remote call.
///
fn read_records(file: &Path, schema: &'static Schema) -> Result<Vec<Record>, Error> {
    load_records(file, schema)?.collect()
}

fn snapshot<A, C>(connect: C) -> Result<(A, TenantDirectory), Error>
where
    A: TenantApi + 'static,
    C: FnOnce() -> Result<A, Error>,
{
    let api = connect()?;
    let directory = TenantDirectory::fetch(&api)?;
    Ok((api, directory))
}
