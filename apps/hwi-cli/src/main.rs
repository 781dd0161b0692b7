use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use hw_interfaces as hwi;
use hw_interfaces::{
    AddOutcome, FolderIdentity, GlobalConfig, HardwareInterfaces, InterfaceDeclaration, Notifier,
    ObjectId, ObjectStore, PluginModules, ProvisioningResolver, Setup, ValueKey, WriteOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hwi",
    version,
    about = "Hardware interface registration host",
    disable_help_subcommand = true
)]
struct Cli {
    /// Verbose registration tracing
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    debug: bool,

    /// Enable developer mode for every object touched
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    developer: bool,

    /// YAML file with `debug` / `developer` defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding one folder per object
    #[arg(long, default_value = "objects", global = true)]
    base_dir: PathBuf,

    /// Object store JSON file
    #[arg(long, default_value = "objects.json", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register IO points from declaration files and drop stale ones
    Register {
        /// Declaration file or directory of .yaml files
        #[arg(long)]
        decl: PathBuf,
        /// Only add points; keep records that are no longer declared
        #[arg(long, action = ArgAction::SetTrue)]
        no_clear: bool,
    },
    /// Write one value to a registered point
    Write {
        #[arg(long)]
        object: String,
        #[arg(long)]
        io: String,
        /// Value as JSON (e.g. 0.5, true, "\"on\"")
        #[arg(long)]
        value: String,
        #[arg(long, default_value = "f")]
        mode: String,
    },
    /// Print the object store, or a single object's record
    Show {
        #[arg(long)]
        object: Option<String>,
    },
    /// Turn developer mode on for all objects
    Developer,
    /// Register, then feed random values from one task per interface
    Simulate {
        #[arg(long)]
        decl: PathBuf,
        #[arg(long, default_value_t = 10u32)]
        ticks: u32,
        #[arg(long, default_value_t = 200u64)]
        period_ms: u64,
    },
    /// Register, then print Prometheus metrics
    Metrics {
        #[arg(long)]
        decl: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    setup_tracing(config.debug);

    match &cli.command {
        Commands::Register { decl, no_clear } => register(&cli, config, decl, *no_clear),
        Commands::Write {
            object,
            io,
            value,
            mode,
        } => write(&cli, config, object, io, value, mode),
        Commands::Show { object } => show(&cli, object.as_deref()),
        Commands::Developer => developer(&cli, config),
        Commands::Simulate {
            decl,
            ticks,
            period_ms,
        } => simulate(&cli, config, decl, *ticks, *period_ms),
        Commands::Metrics { decl } => metrics(&cli, config, decl),
    }
}

fn setup_tracing(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn resolve_config(cli: &Cli) -> Result<GlobalConfig> {
    let mut cfg = match &cli.config {
        Some(p) => hwi::load_config_file(p)?,
        None => GlobalConfig::default(),
    };
    cfg.debug |= cli.debug;
    cfg.developer |= cli.developer;
    Ok(cfg)
}

/// Writes one line per notification, rendered through the record's plugin.
struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(
        &mut self,
        object_id: &ObjectId,
        value_key: &ValueKey,
        store: &ObjectStore,
        plugins: &PluginModules,
    ) {
        let Some(rec) = store.value(value_key) else {
            warn!(key = %value_key, "notified for missing value");
            return;
        };
        let ts = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let line = serde_json::json!({
            "ts": ts,
            "object": object_id.as_str(),
            "key": value_key.to_string(),
            "mode": rec.mode,
            "value": plugins.render(rec),
        });
        println!("{line}");
    }
}

fn load_store(path: &Path) -> Result<ObjectStore> {
    if path.exists() {
        hwi::load_store_file(path)
    } else {
        Ok(ObjectStore::new())
    }
}

fn open_api(cli: &Cli, config: GlobalConfig) -> Result<HardwareInterfaces> {
    std::fs::create_dir_all(&cli.base_dir)?;
    let store = load_store(&cli.store)?.into_shared();
    let ids = FolderIdentity::new(&cli.base_dir);
    // New object folders get an empty record in the store before add_io looks for it.
    let resolver = ProvisioningResolver::new(ids.clone(), store.clone());
    let setup = Setup::new(store, resolver, ids, LogNotifier)
        .config(config)
        .base_dir(&cli.base_dir);
    Ok(HardwareInterfaces::setup(setup)?)
}

fn save(cli: &Cli, api: &HardwareInterfaces) -> Result<()> {
    hwi::save_store_file(&cli.store, &api.snapshot()?)
}

fn register_all(
    api: &mut HardwareInterfaces,
    decls: &[InterfaceDeclaration],
    no_clear: bool,
) -> Result<()> {
    for decl in decls {
        if no_clear {
            let mut unresolved = 0usize;
            for obj in &decl.objects {
                for p in &obj.points {
                    let out = api.add_io(&obj.name, &p.name, &p.plugin, &decl.interface)?;
                    if matches!(out, AddOutcome::Unresolved | AddOutcome::NoObject) {
                        unresolved += 1;
                    }
                }
            }
            info!(interface = %decl.interface, points = decl.point_count(), unresolved, "registered");
        } else {
            let report = decl.apply(api)?;
            info!(
                interface = %decl.interface,
                points = decl.point_count(),
                removed = report.removed.len(),
                "registration pass done"
            );
            for key in &report.removed {
                println!("removed\t{key}");
            }
        }
    }
    Ok(())
}

fn register(cli: &Cli, config: GlobalConfig, decl: &Path, no_clear: bool) -> Result<()> {
    let decls = hwi::load_declarations(decl)?;
    let mut api = open_api(cli, config)?;
    register_all(&mut api, &decls, no_clear)?;
    save(cli, &api)?;
    let interfaces: Vec<&str> = api.registry().interface_types().collect();
    println!(
        "ok: {} interfaces [{}], store at {}",
        interfaces.len(),
        interfaces.join(", "),
        cli.store.display()
    );
    Ok(())
}

fn write(
    cli: &Cli,
    config: GlobalConfig,
    object: &str,
    io: &str,
    value: &str,
    mode: &str,
) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(value)
        .map_err(|e| anyhow::anyhow!("--value must be JSON: {e}"))?;
    let mut api = open_api(cli, config)?;
    match api.write_io_to_server(object, io, value, mode)? {
        WriteOutcome::Written(key) => {
            save(cli, &api)?;
            info!(%key, "value written");
        }
        WriteOutcome::Unresolved => println!("skipped: object '{object}' has no identity"),
        WriteOutcome::Unregistered => println!("skipped: '{io}' is not registered on '{object}'"),
    }
    Ok(())
}

fn show(cli: &Cli, object: Option<&str>) -> Result<()> {
    let store = load_store(&cli.store)?;
    let Some(name) = object else {
        println!("{}", store.to_json_pretty()?);
        return Ok(());
    };
    let Some(id) = store.find_by_name(name) else {
        anyhow::bail!("no object named '{name}' in {}", cli.store.display());
    };
    let rec = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("object '{name}' vanished from store"))?;
    println!("{id}\t{}", serde_json::to_string_pretty(rec)?);
    Ok(())
}

fn developer(cli: &Cli, config: GlobalConfig) -> Result<()> {
    let mut api = open_api(cli, config)?;
    api.developer_on()?;
    save(cli, &api)?;
    println!("developer mode on");
    Ok(())
}

fn metrics(cli: &Cli, config: GlobalConfig, decl: &Path) -> Result<()> {
    let decls = hwi::load_declarations(decl)?;
    let mut api = open_api(cli, config)?;
    register_all(&mut api, &decls, false)?;
    save(cli, &api)?;
    print!("{}", api.metrics().encode_text());
    Ok(())
}

fn simulate(cli: &Cli, config: GlobalConfig, decl: &Path, ticks: u32, period_ms: u64) -> Result<()> {
    let decls = hwi::load_declarations(decl)?;
    let mut api = open_api(cli, config)?;
    register_all(&mut api, &decls, false)?;

    // One lock around the whole API serializes every interface's calls.
    let api = Arc::new(Mutex::new(api));
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(async {
        let mut tasks = Vec::new();
        for decl in decls {
            let api = api.clone();
            tasks.push(tokio::spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_millis(period_ms));
                for _ in 0..ticks {
                    interval.tick().await;
                    let mut api = api
                        .lock()
                        .map_err(|_| anyhow::anyhow!("api lock poisoned"))?;
                    for obj in &decl.objects {
                        for p in &obj.points {
                            let v: f64 = rand::random();
                            api.write_io_to_server(&obj.name, &p.name, v, "f")?;
                        }
                    }
                }
                anyhow::Ok(())
            }));
        }
        for t in tasks {
            t.await??;
        }
        anyhow::Ok(())
    })?;

    let api = api
        .lock()
        .map_err(|_| anyhow::anyhow!("api lock poisoned"))?;
    save(cli, &api)?;
    let written = api.metrics().io.values_written.get();
    println!("simulated {ticks} ticks, {written} values written");
    Ok(())
}
