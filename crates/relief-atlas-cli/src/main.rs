// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand, ValueEnum};
use relief_atlas_core::{ExitCode, ENV_RELIEF_ATLAS_LOG_JSON};
use relief_atlas_directory::GeoDirectory;
use relief_atlas_feed::{
    CountyProvider, FeedOptions, HttpCountyProvider, PageRetry, SnapshotFileProvider,
    DEFAULT_PAGE_SIZE,
};
use relief_atlas_ingest::{run_build, BuildOptions, ConflictPolicy, PipelineOptions};
use relief_atlas_model::{OrganizationId, OrganizationRecord, ScopePredicate, StateCode};
use relief_atlas_scope::{organization_visible, resolve_scope, ScopeError, ScopeMap};
use serde_json::json;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "relief-atlas")]
#[command(about = "Relief Atlas operations CLI: geographic hierarchy builds and scope checks")]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build {
        #[arg(long, conflicts_with = "snapshot")]
        base_url: Option<String>,
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        output_root: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u64,
        #[arg(long, default_value_t = 4)]
        max_attempts: u32,
        #[arg(long, value_enum, default_value_t = ConflictPolicyCli::Fail)]
        conflict_policy: ConflictPolicyCli,
    },
    Validate {
        #[arg(long)]
        root: PathBuf,
    },
    Lookup {
        #[arg(long)]
        root: PathBuf,
        #[command(subcommand)]
        command: LookupCommand,
    },
    Scope {
        #[arg(long)]
        scope_config: Option<PathBuf>,
        #[command(subcommand)]
        command: ScopeCommand,
    },
}

#[derive(Subcommand)]
enum LookupCommand {
    RegionsInState { state: String },
    ChaptersInState { state: String },
    CountiesOf { chapter: String },
    Divisions,
    State { state: String },
}

#[derive(Subcommand)]
enum ScopeCommand {
    Resolve {
        #[arg(long)]
        selection: String,
    },
    Check {
        #[arg(long)]
        selection: String,
        #[arg(long)]
        state: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConflictPolicyCli {
    Fail,
    Reject,
}

impl From<ConflictPolicyCli> for ConflictPolicy {
    fn from(value: ConflictPolicyCli) -> Self {
        match value {
            ConflictPolicyCli::Fail => Self::Fail,
            ConflictPolicyCli::Reject => Self::RejectRecord,
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool(ENV_RELIEF_ATLAS_LOG_JSON, false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn main() -> ProcessExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            eprintln!("{err}");
            ProcessExitCode::from(ExitCode::Internal as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Build {
            base_url,
            snapshot,
            output_root,
            page_size,
            max_attempts,
            conflict_policy,
        } => run_build_command(
            base_url,
            snapshot,
            output_root,
            page_size,
            max_attempts,
            conflict_policy,
            cli.json,
        ),
        Commands::Validate { root } => run_validate(&root, cli.json),
        Commands::Lookup { root, command } => run_lookup(&root, command, cli.json),
        Commands::Scope {
            scope_config,
            command,
        } => run_scope(scope_config.as_deref(), command, cli.json),
    }
}

fn run_build_command(
    base_url: Option<String>,
    snapshot: Option<PathBuf>,
    output_root: PathBuf,
    page_size: u64,
    max_attempts: u32,
    conflict_policy: ConflictPolicyCli,
    json: bool,
) -> Result<(), String> {
    let provider: Box<dyn CountyProvider> = match (base_url, snapshot) {
        (Some(url), None) => Box::new(HttpCountyProvider::new(url).map_err(|e| e.to_string())?),
        (None, Some(path)) => {
            Box::new(SnapshotFileProvider::open(&path).map_err(|e| e.to_string())?)
        }
        _ => return Err("exactly one of --base-url or --snapshot is required".to_string()),
    };
    let options = PipelineOptions {
        output_root: output_root.clone(),
        feed: FeedOptions {
            page_size,
            retry: PageRetry {
                attempts_per_page: max_attempts,
                ..PageRetry::default()
            },
        },
        build: BuildOptions {
            conflict_policy: conflict_policy.into(),
        },
    };
    let result = run_build(provider.as_ref(), &options).map_err(|e| e.to_string())?;
    if json {
        println!(
            "{}",
            json!({
                "root": output_root,
                "stats": result.manifest.stats,
                "source_total": result.manifest.source_total,
                "rejected": result.report.rejected,
            })
        );
    } else {
        let stats = &result.manifest.stats;
        println!("published {}", output_root.display());
        println!(
            "counties={} divisions={} regions={} chapters={} states={} rejected={}",
            stats.county_total,
            stats.division_count,
            stats.region_count,
            stats.chapter_count,
            stats.state_count,
            stats.rejected_count
        );
        for rejected in &result.report.rejected {
            println!(
                "rejected geo_id={} ({}, {}): {}",
                rejected.geo_id, rejected.county, rejected.state, rejected.reason
            );
        }
    }
    Ok(())
}

fn run_validate(root: &std::path::Path, json: bool) -> Result<(), String> {
    let directory = GeoDirectory::load(root).map_err(|e| e.to_string())?;
    let hierarchy = directory.hierarchy();
    if json {
        println!(
            "{}",
            json!({
                "root": root,
                "valid": true,
                "county_total": hierarchy.county_total,
                "chapters": hierarchy.chapters.len(),
            })
        );
    } else {
        println!(
            "artifact at {} is valid: {} counties across {} chapters",
            root.display(),
            hierarchy.county_total,
            hierarchy.chapters.len()
        );
    }
    Ok(())
}

fn parse_state(input: &str) -> Result<StateCode, String> {
    StateCode::parse(input).map_err(|e| e.to_string())
}

fn print_names(names: &[&str], json: bool) {
    if json {
        println!("{}", json!(names));
    } else {
        for name in names {
            println!("{name}");
        }
    }
}

fn run_lookup(root: &std::path::Path, command: LookupCommand, json: bool) -> Result<(), String> {
    let directory = GeoDirectory::load(root).map_err(|e| e.to_string())?;
    match command {
        LookupCommand::RegionsInState { state } => {
            let state = parse_state(&state)?;
            let names: Vec<_> = directory.regions_in_state(&state).into_iter().collect();
            print_names(&names, json);
        }
        LookupCommand::ChaptersInState { state } => {
            let state = parse_state(&state)?;
            let names: Vec<_> = directory.chapters_in_state(&state).into_iter().collect();
            print_names(&names, json);
        }
        LookupCommand::CountiesOf { chapter } => {
            let found = directory
                .chapter_lookup(&chapter)
                .ok_or_else(|| format!("unknown chapter `{chapter}`"))?;
            if json {
                println!(
                    "{}",
                    json!({
                        "chapter": found.name,
                        "region": found.region,
                        "division": found.division,
                        "counties": found.counties,
                    })
                );
            } else {
                for county in &found.counties {
                    println!("{county}");
                }
            }
        }
        LookupCommand::Divisions => {
            let divisions = directory.all_divisions();
            if json {
                let rows: Vec<_> = divisions
                    .iter()
                    .map(|d| {
                        json!({
                            "name": d.name,
                            "code": d.code,
                            "regions": d.region_count,
                            "states": d.state_count,
                            "counties": d.county_count,
                        })
                    })
                    .collect();
                println!("{}", json!(rows));
            } else {
                for d in &divisions {
                    println!(
                        "{} regions={} states={} counties={}",
                        d.name, d.region_count, d.state_count, d.county_count
                    );
                }
            }
        }
        LookupCommand::State { state } => {
            let state = parse_state(&state)?;
            let aggregate = directory
                .state_summary(&state)
                .ok_or_else(|| format!("no counties recorded for state `{state}`"))?;
            if json {
                println!("{}", serde_json::to_string(aggregate).map_err(|e| e.to_string())?);
            } else {
                println!(
                    "{} ({}): {} counties, chapters: {}",
                    aggregate.state,
                    aggregate.display_name,
                    aggregate.county_count,
                    aggregate
                        .chapters
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }
    Ok(())
}

fn load_scope_map(config: Option<&std::path::Path>) -> Result<ScopeMap, String> {
    match config {
        Some(path) => ScopeMap::from_config_file(path).map_err(|e| e.to_string()),
        None => Ok(ScopeMap::builtin_defaults()),
    }
}

fn resolve_selection(map: &ScopeMap, selection: &str) -> Result<ScopePredicate, String> {
    resolve_scope(map, selection).map_err(|err| match err {
        ScopeError::UnknownSelection(_) => {
            let known: Vec<_> = map.selections().collect();
            format!("{err}; available selections: {}", known.join(", "))
        }
        other => other.to_string(),
    })
}

fn run_scope(
    config: Option<&std::path::Path>,
    command: ScopeCommand,
    json: bool,
) -> Result<(), String> {
    let map = load_scope_map(config)?;
    match command {
        ScopeCommand::Resolve { selection } => {
            let predicate = resolve_selection(&map, &selection)?;
            match &predicate {
                ScopePredicate::Unrestricted => {
                    if json {
                        println!("{}", json!({"selection": selection, "unrestricted": true}));
                    } else {
                        println!("unrestricted");
                    }
                }
                ScopePredicate::RestrictedToStates(states) => {
                    let codes: Vec<_> = states.iter().map(ToString::to_string).collect();
                    if json {
                        println!(
                            "{}",
                            json!({"selection": selection, "unrestricted": false, "states": codes})
                        );
                    } else {
                        println!("restricted to {}", codes.join(", "));
                    }
                }
            }
        }
        ScopeCommand::Check { selection, state } => {
            let predicate = resolve_selection(&map, &selection)?;
            let state = parse_state(&state)?;
            let organization = OrganizationRecord {
                id: OrganizationId::parse("scope-check").map_err(|e| e.to_string())?,
                name: "scope-check".to_string(),
                state: Some(state.clone()),
                region: None,
            };
            let visible = organization_visible(&predicate, &organization);
            if json {
                println!(
                    "{}",
                    json!({"selection": selection, "state": state.as_str(), "visible": visible})
                );
            } else {
                println!("{}", if visible { "visible" } else { "hidden" });
            }
        }
    }
    Ok(())
}
