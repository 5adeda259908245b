use anyhow::Result;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use provisioner::{error::ProvisionError, ExistingPolicy, FailurePolicy, RunOptions, Workflow};
use tenancy::{api::{Credentials, RestClient}, record::{Schema, TENANTS}};

pub fn main() -> Result<()> {

    // Connection settings may come from a .env file so it must be loaded before the args are parsed.
    dotenv::dotenv().ok();

    let options = app().get_matches();

    let _ = env_logger::try_init();

    log::info!("{}", BANNER);

    let (name, matches) = match options.subcommand() {
        (name, Some(matches)) => (name, matches),
        _ => return Ok(()), // clap has already printed the usage.
    };

    let workflow = workflow(name, matches);
    let run_options = run_options(matches)?;

    let url = value(matches, "url");
    let admin = value(matches, "admin");
    let password = match matches.value_of("password").map(String::from).or_else(|| std::env::var(PASSWORD_ENV).ok()) {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {}: ", admin))
            .map_err(|source| ProvisionError::PasswordPrompt { source })?,
    };
    let strict_ssl = matches.is_present("strict-ssl");

    log::info!("Connecting to {} as {}", url, admin);

    let summary = provisioner::run_workflow(workflow, run_options, || {
        RestClient::connect(url, &Credentials::new(admin, &password), strict_ssl)
    })?;

    summary.ensure_success()?;

    Ok(())
}

fn app() -> App<'static, 'static> {
    App::new("provisioner")
        .version("1.0")
        .about("Batch tenant provisioning against the OAE admin REST API")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(SubCommand::with_name("create")
            .about("Create a tenant for each row of the CSV, skipping those which already exist")
            .args(&connection_args(true))
            .args(&provision_args()))
        .subcommand(SubCommand::with_name("upsert")
            .about("Create a tenant for each row of the CSV, updating those which already exist")
            .args(&connection_args(true))
            .args(&provision_args()))
        .subcommand(SubCommand::with_name("logos")
            .about("Point every tenant folder in the logos directory at its images")
            .args(&connection_args(true))
            .arg(logos_arg()))
        .subcommand(SubCommand::with_name("landing-pages")
            .about("Configure the landing page of each tenant in the CSV")
            .args(&connection_args(true))
            .arg(file_arg())
            .arg(Arg::with_name("template")
                .help("The landing page template")
                .short("t")
                .long("template")
                .takes_value(true)
                .default_value("./landingpage.json")))
        .subcommand(SubCommand::with_name("revert-auth")
            .about("Switch the tenants listed in the CSV back to local accounts (the password is prompted for unless OAE_ADMIN_PASSWORD is set)")
            .args(&connection_args(false))
            .arg(file_arg()))
}

///
/// The workflow a subcommand runs.
///
fn workflow(name: &str, matches: &ArgMatches) -> Workflow {
    match name {
        "create" | "upsert" => Workflow::Provision {
            file: value(matches, "file").into(),
            schema: Schema::named(value(matches, "schema")).unwrap_or(&TENANTS),
            logos: value(matches, "logos").into(),
            existing: if name == "create" { ExistingPolicy::Skip } else { ExistingPolicy::Update },
        },
        "logos" => Workflow::Logos { logos: value(matches, "logos").into() },
        "landing-pages" => Workflow::LandingPages {
            file: value(matches, "file").into(),
            template: value(matches, "template").into(),
        },
        _ => Workflow::RevertAuth { file: value(matches, "file").into() },
    }
}

fn run_options(matches: &ArgMatches) -> std::result::Result<RunOptions, ProvisionError> {
    Ok(RunOptions {
        concurrency: value(matches, "concurrency").parse().map_err(|_| ProvisionError::InvalidConcurrency)?,
        failure_policy: match matches.is_present("keep-going") {
            true  => FailurePolicy::KeepGoing,
            false => FailurePolicy::FailFast,
        },
    })
}

///
/// The value of an argument clap has already made mandatory or defaulted.
///
fn value<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

///
/// Where and how to connect, plus the run options shared by every workflow.
///
fn connection_args(with_password: bool) -> Vec<Arg<'static, 'static>> {
    let mut args = vec!(
        Arg::with_name("url")
            .help("Base URL of the global admin server, eg. https://admin.oae.example.com")
            .short("u")
            .long("url")
            .env("OAE_ADMIN_URL")
            .takes_value(true)
            .required(true),
        Arg::with_name("admin")
            .help("Global administrator username")
            .short("a")
            .long("admin")
            .env("OAE_ADMIN_USER")
            .takes_value(true)
            .required(true),
        Arg::with_name("concurrency")
            .help("How many records to process at the same time")
            .short("c")
            .long("concurrency")
            .takes_value(true)
            .default_value("1")
            .validator(positive_integer),
        Arg::with_name("keep-going")
            .help("Carry on with the remaining records after one fails")
            .long("keep-going"),
        Arg::with_name("strict-ssl")
            .help("Verify the server's TLS certificate")
            .long("strict-ssl"));

    if with_password {
        args.push(Arg::with_name("password")
            .help("Global administrator password")
            .short("p")
            .long("password")
            .env(PASSWORD_ENV)
            .hide_env_values(true)
            .takes_value(true)
            .required(true));
    }

    args
}

fn provision_args() -> Vec<Arg<'static, 'static>> {
    vec!(
        file_arg(),
        logos_arg(),
        Arg::with_name("schema")
            .help("The column layout of the CSV file")
            .short("s")
            .long("schema")
            .takes_value(true)
            .possible_values(&["tenants", "registry"])
            .default_value("tenants"))
}

fn file_arg() -> Arg<'static, 'static> {
    Arg::with_name("file")
        .help("The CSV file of tenants")
        .short("f")
        .long("file")
        .takes_value(true)
        .required(true)
}

fn logos_arg() -> Arg<'static, 'static> {
    Arg::with_name("logos")
        .help("Directory with a folder of images per tenant alias")
        .short("l")
        .long("logos")
        .takes_value(true)
        .default_value("./logos")
}

fn positive_integer(value: String) -> std::result::Result<(), String> {
    match value.parse::<usize>() {
        Ok(count) if count > 0 => Ok(()),
        _ => Err(format!("{} is not a positive integer", value)),
    }
}

const PASSWORD_ENV: &str = "OAE_ADMIN_PASSWORD";

const BANNER: &str = r#"
                        _     _
 _ __  _ __ _____   __ (_)___(_) ___  _ __   ___ _ __
| '_ \| '__/ _ \ \ / / | / __| |/ _ \| '_ \ / _ \ '__|
| |_) | | | (_) \ V /  | \__ \ | (_) | | | |  __/ |
| .__/|_|  \___/ \_/   |_|___/_|\___/|_| |_|\___|_|
|_|
 OAE: Tenant Provisioner
"#;
