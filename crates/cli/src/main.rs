use clap::{Parser, Subcommand, ValueEnum};
use clinic_print_core::{
    config::default_organization_from_env_values,
    constants::{DEFAULT_API_BASE_URL, DEFAULT_DOWNLOAD_DIR, DEFAULT_SPOOL_DIR},
    export_to_csv, export_to_pdf,
    filename::pdf_filename,
    print_document, ActionState, DirectoryDownloads, DocumentAssembler, DownloadSink,
    FilenameStyle, HttpContextSource, NoticeLevel, Orientation, PageFormat, PageLayout, PdfOptions,
    PrintAction, PrintConfig, PrintRequest, PrintResult, PrintableDocument, Renderer,
    SpoolPrintHost, StaticContextSource, TargetRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clinic-print")]
#[command(about = "Print and export clinic documents")]
struct Cli {
    /// Clinic API base URL
    #[arg(long, env = "CLINIC_PRINT_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,
    /// Bearer token for the clinic API
    #[arg(long, env = "CLINIC_PRINT_API_TOKEN")]
    token: Option<String>,
    /// Do not contact the clinic API; use the default letterhead
    #[arg(long)]
    offline: bool,
    #[arg(long, env = "CLINIC_PRINT_PAGE_FORMAT", default_value = "a4", value_parser = parse_page_format)]
    page_format: PageFormat,
    #[arg(long, env = "CLINIC_PRINT_ORIENTATION", default_value = "portrait", value_parser = parse_orientation)]
    orientation: Orientation,
    #[arg(long, env = "CLINIC_PRINT_SPOOL_DIR", default_value = DEFAULT_SPOOL_DIR)]
    spool_dir: PathBuf,
    #[arg(long, env = "CLINIC_PRINT_DOWNLOAD_DIR", default_value = DEFAULT_DOWNLOAD_DIR)]
    download_dir: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to HTML on stdout
    Render {
        /// JSON file with `{kind, payload, patient}`
        input: PathBuf,
    },
    /// Send a document to the print spool
    Print {
        /// JSON file with `{kind, payload, patient}`
        input: PathBuf,
    },
    /// Export a document as PDF into the download directory
    Pdf {
        /// JSON file with `{kind, payload, patient}`
        input: PathBuf,
        /// File name to use instead of the generated one
        #[arg(long)]
        filename: Option<String>,
        #[arg(long, value_enum, default_value_t = NameStyle::PatientName)]
        name_style: NameStyle,
    },
    /// Export a JSON array of flat records as CSV into the download directory
    Csv {
        /// JSON file with an array of objects
        input: PathBuf,
        /// File name, `.csv` is appended when missing
        filename: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum NameStyle {
    PatientName,
    RecordId,
}

impl From<NameStyle> for FilenameStyle {
    fn from(style: NameStyle) -> Self {
        match style {
            NameStyle::PatientName => FilenameStyle::PatientName,
            NameStyle::RecordId => FilenameStyle::RecordId,
        }
    }
}

fn parse_page_format(value: &str) -> PrintResult<PageFormat> {
    value.parse()
}

fn parse_orientation(value: &str) -> PrintResult<Orientation> {
    value.parse()
}

impl Cli {
    fn config(&self) -> PrintResult<PrintConfig> {
        let var = |name: &str| std::env::var(name).ok();
        PrintConfig::new(
            self.api_url.as_str(),
            default_organization_from_env_values(
                var("CLINIC_PRINT_DEFAULT_ORG_NAME"),
                var("CLINIC_PRINT_DEFAULT_ORG_ADDRESS"),
                var("CLINIC_PRINT_DEFAULT_ORG_PHONE"),
                var("CLINIC_PRINT_DEFAULT_ORG_EMAIL"),
            ),
            PageLayout::new(self.page_format, self.orientation),
            self.spool_dir.clone(),
            self.download_dir.clone(),
        )
    }

    async fn assemble(
        &self,
        cfg: Arc<PrintConfig>,
        request: PrintRequest,
    ) -> PrintResult<PrintableDocument> {
        let assembler = DocumentAssembler::new(cfg.clone());
        let assembler = if self.offline {
            assembler.resolve(&StaticContextSource::default()).await?
        } else {
            let mut source = HttpContextSource::from_config(&cfg);
            if let Some(token) = self.token.as_deref() {
                source = source.with_bearer_token(token);
            }
            assembler.resolve(&source).await?
        };
        assembler.assemble(request)
    }
}

fn read_request(path: &PathBuf) -> anyhow::Result<PrintRequest> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_print_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command.as_ref() else {
        println!("Use 'clinic-print --help' for commands");
        return Ok(());
    };

    let cfg = Arc::new(cli.config()?);
    let state = ActionState::new();

    let outcome = match command {
        Commands::Render { input } => {
            let request = read_request(input)?;
            state
                .run_async(PrintAction::Print, async {
                    let document = cli.assemble(cfg.clone(), request).await?;
                    Ok(Renderer::new(cfg.page_layout()).render(&document))
                })
                .await
                .map(|html| println!("{html}"))
        }
        Commands::Print { input } => {
            let request = read_request(input)?;
            state
                .run_async(PrintAction::Print, async {
                    let document = cli.assemble(cfg.clone(), request).await?;
                    let host = SpoolPrintHost::new(cfg.spool_dir());
                    print_document(&host, &Renderer::new(cfg.page_layout()), &document)
                })
                .await
                .map(|job| match job.location {
                    Some(path) => println!("Print job {} spooled to {}", job.id, path.display()),
                    None => println!("Print job {} sent", job.id),
                })
        }
        Commands::Pdf {
            input,
            filename,
            name_style,
        } => {
            let request = read_request(input)?;
            state
                .run_async(PrintAction::ExportPdf, async {
                    let document = cli.assemble(cfg.clone(), request).await?;
                    let filename = filename
                        .clone()
                        .unwrap_or_else(|| pdf_filename(&document, (*name_style).into()));
                    let options = PdfOptions::new(filename)
                        .with_organization(document.organization().name.clone())
                        .with_layout(cfg.page_layout());

                    let targets = TargetRegistry::new();
                    let target_id = document.record_id().to_string();
                    targets.register_document(target_id.as_str(), &document);
                    let export = export_to_pdf(&targets, &target_id, &options)?;
                    DirectoryDownloads::new(cfg.download_dir()).deliver(&export)
                })
                .await
                .map(|path| println!("Saved {}", path.display()))
        }
        Commands::Csv { input, filename } => {
            let text = std::fs::read_to_string(input)?;
            let records: Vec<serde_json::Value> = serde_json::from_str(&text)?;
            state
                .run(PrintAction::ExportCsv, || {
                    let export = export_to_csv(&records, filename)?;
                    DirectoryDownloads::new(cfg.download_dir()).deliver(&export)
                })
                .map(|path| println!("Saved {}", path.display()))
        }
    };

    if let Err(notice) = outcome {
        eprintln!("{}", notice.message);
        if notice.level == NoticeLevel::Error {
            std::process::exit(1);
        }
    }

    Ok(())
}
