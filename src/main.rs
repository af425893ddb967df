use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use f2p_catalog::browse;
use f2p_catalog::catalog::{FilterSelection, load_catalog};
use f2p_catalog::cli::{Cli, Commands, OutputFormat};
use f2p_catalog::error::AppError;
use f2p_catalog::models::{DataSource, Game};
use f2p_catalog::output::{print_error, print_json};
use f2p_catalog::retriever::FetchChain;
use f2p_catalog::surface::{HtmlSurface, RecordingSurface, TerminalSurface};

#[derive(Debug, Serialize)]
struct ListData<'a> {
    selection: SelectionData<'a>,
    categories: &'a [String],
    items: Vec<&'a Game>,
}

#[derive(Debug, Serialize)]
struct SelectionData<'a> {
    platform: &'a str,
    category: &'a str,
}

#[derive(Debug, Serialize)]
struct GenresData<'a> {
    items: &'a [String],
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.resolved_format();

    let result = run(cli, format).await;
    if let Err(err) = result {
        print_error(format, err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, format: OutputFormat) -> Result<(), AppError> {
    let chain = FetchChain::standard(&cli.source.config())?;

    match cli.command {
        Commands::List(args) => handle_list(format, &chain, args.selection()).await,
        Commands::Genres => handle_genres(format, &chain).await,
        Commands::Browse(args) => handle_browse(format, &chain, args.selection()).await,
    }
}

async fn handle_list(
    format: OutputFormat,
    chain: &FetchChain,
    selection: FilterSelection,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Human => {
            let stdout = std::io::stdout();
            let mut surface = TerminalSurface::new(stdout.lock());
            load_catalog(chain, &mut surface, selection).await?;
        }
        OutputFormat::Html => {
            let mut surface = HtmlSurface::default();
            let (controller, _) = load_catalog(chain, &mut surface, selection).await?;
            print!("{}", surface.document(controller.selection()));
        }
        OutputFormat::Json => {
            let mut surface = RecordingSurface::default();
            let (controller, source) = load_catalog(chain, &mut surface, selection).await?;
            let current = controller.selection();
            let data = ListData {
                selection: SelectionData {
                    platform: &current.platform,
                    category: &current.category,
                },
                categories: controller.categories(),
                items: controller.view(),
            };
            print_json(data, source);
        }
    }
    Ok(())
}

async fn handle_genres(format: OutputFormat, chain: &FetchChain) -> Result<(), AppError> {
    let mut surface = RecordingSurface::default();
    let (controller, source) = load_catalog(chain, &mut surface, FilterSelection::default()).await?;

    match format {
        OutputFormat::Json => print_json(
            GenresData {
                items: controller.categories(),
            },
            source,
        ),
        OutputFormat::Human | OutputFormat::Html => {
            println!("categories ({})", controller.categories().len());
            for genre in controller.categories() {
                println!("{genre}");
            }
        }
    }
    Ok(())
}

async fn handle_browse(
    format: OutputFormat,
    chain: &FetchChain,
    selection: FilterSelection,
) -> Result<(), AppError> {
    if format != OutputFormat::Human {
        return Err(AppError::InvalidArgument(
            "browse only supports human output".to_string(),
        ));
    }

    let mut surface = TerminalSurface::new(std::io::stdout());
    let (mut controller, source) = load_catalog(chain, &mut surface, selection).await?;
    if source == DataSource::StaticSample {
        eprintln!("note: live catalog unreachable, showing sample data");
    }
    eprintln!("{}", browse::HELP);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    browse::run(&mut controller, &mut surface, stdin).await
}
