use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use estate_import::{create_all, ImportConfig, ImportPipeline};
use estate_model::MemoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Answer-set XML export")
}

fn read_markup(args: &ArgMatches) -> anyhow::Result<String> {
    let path = args
        .get_one::<PathBuf>("file")
        .context("missing answer file argument")?;
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("estate-import")
        .version(estate_import::VERSION)
        .about("Import answer-file exports into estate plans")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("fields")
                .about("Dump the typed field table as JSON")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("preview")
                .about("Parse, extract, and match; print the preview")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("import")
                .about("Parse and commit into an in-memory store, creating every person")
                .arg(file_arg()),
        );

    let matches = cli.get_matches();
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ImportConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ImportConfig::default(),
    };

    let store = Arc::new(MemoryStore::new());
    let pipeline = ImportPipeline::new(Arc::clone(&store), config);

    match matches.subcommand() {
        Some(("fields", args)) => {
            let table = pipeline.fields(&read_markup(args)?)?;
            print_json(&table.to_json())?;
        }
        Some(("preview", args)) => {
            let parsed = pipeline.parse(&read_markup(args)?).await?;
            print_json(&parsed)?;
        }
        Some(("import", args)) => {
            let markup = read_markup(args)?;
            let parsed = pipeline.parse(&markup).await?;
            let (_, extraction) = pipeline.extract(&markup)?;
            let result = pipeline.commit(&parsed.session_id, &create_all(&extraction)).await?;
            print_json(&result)?;

            let counts = store.counts();
            eprintln!(
                "people: {}  clients: {}  relationships: {}  trusts: {}  wills: {}  documents: {}  roles: {}",
                counts.people,
                counts.clients,
                counts.relationships,
                counts.trusts,
                counts.wills,
                counts.documents,
                counts.roles
            );
        }
        _ => {}
    }
    Ok(())
}
