use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, io};

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use spex_catalog::select::document::Document;
use spex_catalog::{extract, Brand, Harvester, ModelStub, UpdateOutcome};
use spex_crawler::{Fetch, HttpFetcher, OnError, Pacing};
use tokio::runtime;

mod config;

use config::HarvestConfig;

/// Incremental phone catalog harvester
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "update")]
    Update(UpdateArgs),
    #[command(name = "brands")]
    Brands(BrandsArgs),
    #[command(name = "extract")]
    Extract(ExtractArgs),
    #[command(hide = true)]
    Completion,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Optional yaml configuration file
    #[arg(env = "SPEX_CONFIG", long)]
    pub config: Option<PathBuf>,
    /// Override crawler's user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override the catalog's base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

impl TryFrom<&ConfigArgs> for HarvestConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ConfigArgs) -> Result<Self, Self::Error> {
        let mut conf = HarvestConfig::load(args.config.as_deref())?;
        if let Some(user_agent) = &args.user_agent {
            conf.crawler.user_agent = user_agent.to_string();
        }
        if let Some(base_url) = &args.base_url {
            conf.catalog.base_url = base_url.parse()?;
        }
        Ok(conf)
    }
}

/// Add new models of every brand (or a single one) to the output directory
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("pacing").multiple(false))]
pub struct UpdateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// Only update this brand, as named on the brand index
    #[arg(long, short)]
    pub brand: Option<String>,
    /// Override the directory holding one record file per brand
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,
    /// Override the delay in seconds awaited before each model page
    #[arg(long, group = "pacing")]
    pub delay: Option<f32>,
    /// Override pacing with a maximum number of model pages per second
    #[arg(long, group = "pacing")]
    pub per_second: Option<usize>,
    /// Fetch model pages without any pacing
    #[arg(long, group = "pacing")]
    pub no_pacing: bool,
    /// Fetch again models whose previous attempt failed
    #[arg(long)]
    pub retry_failed: bool,
    /// Override handling of listing pages that cannot be read
    #[arg(value_enum, long)]
    pub on_page_error: Option<OnError>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&UpdateArgs> for HarvestConfig {
    type Error = anyhow::Error;

    fn try_from(args: &UpdateArgs) -> Result<Self, Self::Error> {
        let mut conf: HarvestConfig = (&args.config).try_into()?;
        if let Some(output_dir) = &args.output_dir {
            conf.catalog.output_dir = output_dir.clone();
        }
        if let Some(delay) = args.delay {
            if Duration::try_from_secs_f32(delay).is_err() {
                anyhow::bail!("--delay must be a finite, non-negative number of seconds");
            }
            conf.crawler.pacing = Some(Pacing::Delay(delay));
        }
        if let Some(per_second) = args.per_second {
            let per_second = per_second
                .try_into()
                .map_err(|_| anyhow::anyhow!("--per-second must be at least 1"))?;
            conf.crawler.pacing = Some(Pacing::PerSecond(per_second));
        }
        if args.no_pacing {
            conf.crawler.pacing = None;
        }
        if args.retry_failed {
            conf.catalog.retry_failed = true;
        }
        if let Some(on_page_error) = args.on_page_error {
            conf.crawler.on_page_error = on_page_error;
        }
        Ok(conf)
    }
}

pub fn update(args: UpdateArgs) -> anyhow::Result<()> {
    let conf: HarvestConfig = (&args).try_into()?;
    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    rt.block_on(async move {
        let harvester = Harvester::from_config(&conf.crawler, conf.catalog)?;
        let runs = harvester.run(args.brand.as_deref()).await?;

        for run in runs {
            let name = &run.brand.display_name;
            match run.result {
                Ok(UpdateOutcome::UpToDate { persisted }) => {
                    println!("{name}: up to date ({persisted} models)")
                }
                Ok(UpdateOutcome::Updated(report)) => println!(
                    "{name}: {} new models ({} failed, {} skipped, {} listing errors)",
                    report.new_count,
                    report.failed_count,
                    report.skipped_count,
                    report.errors.len()
                ),
                Err(e) => println!("{name}: failed: {e}"),
            }
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Print the brand index
#[derive(Debug, clap::Args)]
pub struct BrandsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn brands(args: BrandsArgs) -> anyhow::Result<()> {
    let mut conf: HarvestConfig = (&args.config).try_into()?;
    conf.crawler.pacing = None;
    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
    rt.block_on(async move {
        let harvester = Harvester::from_config(&conf.crawler, conf.catalog)?;
        for brand in harvester.brands().await? {
            println!(
                "{}\t{}\t{}",
                brand.display_name, brand.advertised_model_count, brand.listing_url
            );
        }
        Ok::<_, anyhow::Error>(())
    })
}

/// Extract a single model page and print its record as json
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("page").required(true))]
pub struct ExtractArgs {
    /// A local html page to extract
    #[arg(group = "page", long)]
    pub file: Option<PathBuf>,
    /// A distant html page to extract
    #[arg(group = "page", long)]
    pub url: Option<String>,
    /// Custom user agent to download the page
    #[arg(long, conflicts_with = "file")]
    pub ua: Option<String>,
    /// Brand the model belongs to
    #[arg(long, default_value = "")]
    pub brand: String,
    /// Model name, defaults to the page location
    #[arg(long)]
    pub name: Option<String>,
}

pub fn extract_page(args: ExtractArgs) -> anyhow::Result<()> {
    let (page, location) = if let Some(url) = args.url {
        let mut conf = spex_crawler::CrawlerConfig::default();
        if let Some(ua) = args.ua {
            conf.user_agent = ua;
        }
        let fetcher = HttpFetcher::new(&conf)?;
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let page = rt.block_on(fetcher.fetch(&url))?;
        (page, url)
    } else if let Some(path) = args.file {
        let page = fs_err::read_to_string(&path)?;
        (page, path.display().to_string())
    } else {
        anyhow::bail!("Missing `url` or `file`");
    };

    let brand = Brand {
        listing_url: String::new(),
        display_name: args.brand,
        advertised_model_count: 0,
    };
    let stub = ModelStub {
        display_name: args.name.unwrap_or_else(|| stem(&location)),
        detail_url: location,
        discovered_at: chrono::Utc::now(),
    };
    let record = extract(&Document::from(page.as_str()), &brand, &stub)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn stem(location: &str) -> String {
    let last = location.rsplit('/').next().unwrap_or(location);
    Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| last.to_string())
}

fn init_logs(filter: &str) {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", filter);
    }
    env_logger::init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Update(args) => {
            if !args.quiet {
                init_logs("spex_catalog=info,spex_crawler=warn");
            }
            update(args)
        }
        SubCommand::Brands(args) => {
            init_logs("spex_catalog=warn,spex_crawler=warn");
            brands(args)
        }
        SubCommand::Extract(args) => {
            init_logs("spex_catalog=warn");
            extract_page(args)
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "spex", &mut io::stdout());
            Ok(())
        }
    }
}
