use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use node_red_flow::{
    analyze::analyze,
    catalog::{BuiltinCatalog, NodeCatalog},
    config::{DeploymentType, ToolConfig},
    json_output::{ToolOutput, pretty},
    pattern::{PatternKind, PatternParams, TransformStage, build_pattern},
    template::{TemplateOptions, generate_from_template, list_templates, search_templates},
    tool::{ToolAction, ToolExecutor, ToolParams},
    validate::validate,
};
use serde_json::{Value, json};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "node-red-flow",
    version,
    about = "Build, validate and deploy Node-RED flows"
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConnectionArgs {
    /// JSON (or TOML with the `toml` feature) file with connection settings.
    #[arg(long, global = true, env = "NODE_RED_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, global = true, env = "NODE_RED_BASE_URL")]
    base_url: Option<String>,
    /// Admin API path prefix, e.g. /admin.
    #[arg(long = "admin-root", global = true, env = "NODE_RED_ADMIN_ROOT")]
    admin_root: Option<String>,
    /// Bearer token for adminAuth.
    #[arg(long, global = true, env = "NODE_RED_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Refuse every write operation.
    #[arg(long, global = true, env = "NODE_RED_READ_ONLY")]
    read_only: bool,
    #[arg(long, global = true, env = "NODE_RED_DEPLOYMENT_TYPE")]
    deployment_type: Option<DeploymentType>,
}

impl ConnectionArgs {
    fn resolve(&self) -> Result<ToolConfig> {
        let mut config = match &self.config {
            Some(path) => ToolConfig::load_from_file(path)?,
            None => ToolConfig::default(),
        };
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.as_str());
        }
        if let Some(root) = &self.admin_root {
            config.admin_api_root = root.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if self.read_only {
            config.read_only = true;
        }
        if let Some(deployment_type) = self.deployment_type {
            config.deployment_type = deployment_type;
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a flow unit for structural problems.
    Validate(InputArgs),
    /// Summarize a flow unit.
    Analyze(InputArgs),
    /// Build a flow from a named pattern.
    Pattern(PatternArgs),
    /// List or apply built-in templates.
    #[command(subcommand)]
    Template(TemplateCommand),
    /// Look up core node types.
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Read or deploy flows on a running instance.
    #[command(subcommand)]
    Flows(FlowsCommand),
    /// List or install node modules on a running instance.
    #[command(subcommand)]
    Nodes(NodesCommand),
    /// Run one tool call given as a JSON parameter object.
    Tool(ToolArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Flow JSON file; reads stdin when omitted or `-`.
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PatternArgs {
    /// simple, http-api, switch, error-handler, transform or parallel.
    kind: PatternKind,
    #[arg(long)]
    label: Option<String>,
    /// Endpoint path for http-api.
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    method: Option<String>,
    /// Function body for the handler node.
    #[arg(long = "handler")]
    handler_func: Option<String>,
    /// Inject repeat interval in seconds.
    #[arg(long)]
    repeat: Option<String>,
    /// Message property the switch routes on.
    #[arg(long)]
    property: Option<String>,
    /// Switch condition value; repeat for several.
    #[arg(long = "condition")]
    conditions: Vec<String>,
    /// Transform stage as NAME=FUNC; repeat for several.
    #[arg(long = "transform", value_parser = parse_transform)]
    transforms: Vec<TransformStage>,
}

fn parse_transform(raw: &str) -> std::result::Result<TransformStage, String> {
    let (name, func) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FUNC, got '{raw}'"))?;
    Ok(TransformStage::new(name.trim(), func))
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        query: Option<String>,
    },
    Apply {
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long = "url")]
        base_url: Option<String>,
        #[arg(long)]
        mqtt_topic: Option<String>,
        #[arg(long)]
        interval: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    Search {
        query: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    Info {
        node_type: String,
    },
}

#[derive(Subcommand, Debug)]
enum FlowsCommand {
    Get,
    Deploy {
        /// Flow JSON file; reads stdin when omitted or `-`.
        file: Option<PathBuf>,
        /// Revision the flows were read at.
        #[arg(long)]
        rev: Option<String>,
        #[arg(long = "type")]
        deployment_type: Option<DeploymentType>,
    },
    State,
}

#[derive(Subcommand, Debug)]
enum NodesCommand {
    List,
    Install { module: String },
}

#[derive(Args, Debug)]
struct ToolArgs {
    /// Parameter object; reads stdin when omitted.
    #[arg(long)]
    params: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate(args) => handle_validate(args),
        Commands::Analyze(args) => handle_analyze(args),
        Commands::Pattern(args) => handle_pattern(args),
        Commands::Template(cmd) => handle_template(cmd),
        Commands::Catalog(cmd) => handle_catalog(cmd),
        Commands::Flows(cmd) => {
            let params = match cmd {
                FlowsCommand::Get => ToolParams::new(ToolAction::FlowsGet),
                FlowsCommand::Deploy {
                    file,
                    rev,
                    deployment_type,
                } => {
                    let flows = match read_json(file.as_deref())? {
                        Value::Array(items) => items,
                        _ => anyhow::bail!("flow unit must be a JSON array"),
                    };
                    let mut params = ToolParams::new(ToolAction::FlowsDeploy);
                    params.flows = Some(flows);
                    params.rev = rev;
                    params.deployment_type = deployment_type;
                    params
                }
                FlowsCommand::State => ToolParams::new(ToolAction::FlowsStateGet),
            };
            run_tool(&cli.connection, params)
        }
        Commands::Nodes(cmd) => {
            let params = match cmd {
                NodesCommand::List => ToolParams::new(ToolAction::NodesList),
                NodesCommand::Install { module } => {
                    let mut params = ToolParams::new(ToolAction::NodesInstall);
                    params.module = Some(module);
                    params
                }
            };
            run_tool(&cli.connection, params)
        }
        Commands::Tool(args) => {
            let raw = match args.params {
                Some(raw) => raw,
                None => read_stdin()?,
            };
            let value: Value =
                serde_json::from_str(&raw).context("tool parameters must be a JSON object")?;
            let params = ToolParams::from_value(value)?;
            run_tool(&cli.connection, params)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn handle_validate(args: InputArgs) -> Result<()> {
    let unit = read_json(args.file.as_deref())?;
    let report = validate(&unit);
    print_json(&report)?;
    if report.valid {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} validation error(s)",
            report.errors.len()
        ))
    }
}

fn handle_analyze(args: InputArgs) -> Result<()> {
    let unit = read_json(args.file.as_deref())?;
    let items = unit
        .as_array()
        .context("flow unit must be a JSON array")?;
    print_json(&analyze(items))
}

fn handle_pattern(args: PatternArgs) -> Result<()> {
    let params = PatternParams {
        label: args.label,
        handler_func: args.handler_func,
        repeat: args.repeat,
        payload_type: None,
        url: args.url,
        method: args.method,
        property: args.property,
        conditions: (!args.conditions.is_empty()).then_some(args.conditions),
        transforms: args.transforms,
    };
    let pattern = build_pattern(args.kind, &params)?;
    print_json(&pattern.to_unit()?)
}

fn handle_template(cmd: TemplateCommand) -> Result<()> {
    match cmd {
        TemplateCommand::List { category, query } => {
            let templates = match query {
                Some(query) => search_templates(&query),
                None => list_templates(category.as_deref()),
            };
            print_json(&templates)
        }
        TemplateCommand::Apply {
            id,
            label,
            base_url,
            mqtt_topic,
            interval,
        } => {
            let generated = generate_from_template(
                &id,
                &TemplateOptions {
                    label,
                    base_url,
                    mqtt_topic,
                    interval,
                },
            )?;
            print_json(&generated.to_unit()?)
        }
    }
}

fn handle_catalog(cmd: CatalogCommand) -> Result<()> {
    let catalog = BuiltinCatalog;
    match cmd {
        CatalogCommand::Search { query, category } => {
            let results = match (query, category) {
                (Some(query), _) => catalog.search(&query),
                (None, Some(category)) => catalog.by_category(&category),
                (None, None) => {
                    return print_json(&json!({ "categories": catalog.categories() }));
                }
            };
            print_json(&results)
        }
        CatalogCommand::Info { node_type } => {
            let info = catalog
                .resolve(&node_type)
                .with_context(|| format!("node type '{node_type}' not found in catalog"))?;
            print_json(&info)
        }
    }
}

fn run_tool(connection: &ConnectionArgs, params: ToolParams) -> Result<()> {
    let config = connection.resolve()?;
    let executor = ToolExecutor::from_config(config)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let output: ToolOutput = runtime.block_on(executor.execute(params));
    println!("{}", output.text);
    if output.is_error() {
        anyhow::bail!("tool action failed");
    }
    Ok(())
}

fn read_json(path: Option<&Path>) -> Result<Value> {
    let (text, label) = match path {
        Some(path) if path != Path::new("-") => (
            fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            path.display().to_string(),
        ),
        _ => (read_stdin()?, "<stdin>".to_string()),
    };
    serde_json::from_str(&text).with_context(|| format!("{label} is not valid JSON"))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let value = serde_json::to_value(value).context("failed to serialize output")?;
    println!("{}", pretty(&value));
    Ok(())
}
