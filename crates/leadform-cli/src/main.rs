//! Lead form command line entry point
//!
//! Submits leads to RealNex and renders the embeddable form snippet.

mod presentation;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use leadform_core::{LeadFormConfig, LeadInput, LeadWorkflow, SnippetBuilder, SnippetRequest, SnippetType};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging with INFO as default if RUST_LOG not set
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let matches = cli().get_matches();

    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("submit", sub)) => {
            let succeeded = submit(&config, sub).await?;
            if !succeeded {
                std::process::exit(1);
            }
        }
        Some(("snippet", sub)) => snippet(&config, sub)?,
        Some(("check-config", _)) => check_config(&config),
        _ => unreachable!("clap requires a subcommand"),
    }

    Ok(())
}

fn cli() -> Command {
    Command::new("leadform")
        .version(env!("CARGO_PKG_VERSION"))
        .about("RealNex lead form processor")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .env("LEADFORM_CONFIG")
                .default_value("leadform.json")
                .global(true)
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("RealNex API token, overrides the configured one")
                .global(true)
        )
        .subcommand(
            Command::new("submit")
                .about("Submit a lead to RealNex")
                .arg(Arg::new("lead").long("lead").value_name("FILE").help("Lead fields as JSON"))
                .arg(Arg::new("first_name").long("first-name").value_name("NAME"))
                .arg(Arg::new("last_name").long("last-name").value_name("NAME"))
                .arg(Arg::new("email").long("email").value_name("EMAIL"))
                .arg(Arg::new("phone").long("phone").value_name("PHONE"))
                .arg(Arg::new("company").long("company").value_name("NAME"))
                .arg(Arg::new("address").long("address").value_name("ADDRESS"))
                .arg(Arg::new("comments").long("comments").value_name("TEXT"))
                .arg(
                    Arg::new("recaptcha-response")
                        .long("recaptcha-response")
                        .value_name("TOKEN")
                        .help("g-recaptcha-response value posted by the form")
                )
                .arg(
                    Arg::new("redirect-url")
                        .long("redirect-url")
                        .value_name("URL")
                        .help("Page to send the visitor back to; prints only the query string when omitted")
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the full outcome as JSON")
                        .action(clap::ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("snippet")
                .about("Render the iframe snippet for the hosted form")
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TYPE")
                        .help("contact_us or listings_contact_us")
                        .default_value("contact_us")
                )
                .arg(Arg::new("company-id").long("company-id").value_name("ID"))
        )
        .subcommand(Command::new("check-config").about("Validate the configuration file"))
}

fn arg(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

/// Configuration file with the per-invocation `--token` taking precedence
fn load_config(matches: &ArgMatches) -> Result<LeadFormConfig> {
    let config_path = arg(matches, "config").unwrap_or_default();
    let token = arg(matches, "token");

    let config = LeadFormConfig::from_file_with_token(&config_path, token.as_deref())
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

/// Lead from `--lead FILE`, with individual flags taking precedence
fn read_lead(matches: &ArgMatches) -> Result<LeadInput> {
    let mut lead = match arg(matches, "lead") {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read lead file {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse lead file {}", path))?
        }
        None => LeadInput::default(),
    };

    let fields: [(&str, &mut String); 7] = [
        ("first_name", &mut lead.first_name),
        ("last_name", &mut lead.last_name),
        ("email", &mut lead.email),
        ("phone", &mut lead.phone),
        ("company", &mut lead.company),
        ("address", &mut lead.address),
        ("comments", &mut lead.comments),
    ];
    for (name, slot) in fields {
        if let Some(value) = arg(matches, name) {
            *slot = value;
        }
    }

    Ok(lead)
}

async fn submit(config: &LeadFormConfig, matches: &ArgMatches) -> Result<bool> {
    let lead = read_lead(matches)?;
    let workflow = LeadWorkflow::from_config(config).context("Failed to build submission workflow")?;

    let spam_response = arg(matches, "recaptcha-response");
    let outcome = workflow.submit(&lead, spam_response.as_deref()).await;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        match arg(matches, "redirect-url") {
            Some(base) => println!("{}", presentation::redirect_location(&base, &outcome)?),
            None => println!("{}", presentation::status_query(&outcome)),
        }
        eprintln!("{}", presentation::user_message(&outcome, &config.success_message));
    }

    Ok(outcome.is_success())
}

fn snippet(config: &LeadFormConfig, matches: &ArgMatches) -> Result<()> {
    let snippet_type: SnippetType = arg(matches, "type")
        .unwrap_or_default()
        .parse()
        .context("Invalid snippet type")?;

    let request = SnippetRequest {
        // The global --token override has already been applied to the config
        token: None,
        company_id: arg(matches, "company-id"),
        snippet_type,
    };

    let html = SnippetBuilder::from_config(config)
        .render_iframe(&request)
        .context("Failed to render snippet")?;
    println!("{}", html);
    Ok(())
}

fn check_config(config: &LeadFormConfig) {
    println!("RealNex endpoint: {}", config.realnex.base_url);
    println!("API token: {}", if config.realnex.api_token.is_empty() { "missing" } else { "configured" });
    println!("Spam check: {}", if config.spam_check_enabled() { "enabled" } else { "disabled" });
    println!("HTTP timeout: {}s", config.http.timeout_secs);
    let required: Vec<&str> = config.fields.enforced_fields().map(|f| f.label()).collect();
    println!("Required fields: {}", required.join(", "));
}
