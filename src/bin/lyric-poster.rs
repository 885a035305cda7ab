use clap::{Parser, ValueEnum};
use lyric_poster::cache::DEFAULT_CACHE_DIR;
use lyric_poster::{
    generate, Aggregator, AggregatorOptions, DeezerDiscography, DiskCache, FitterConfig,
    GroupingStrategy, LookupCache, MemoryCache, PageSize, PosterOptions, RenderingOracle,
    TypesetRenderer, WeasyprintRenderer, DEFAULT_SONG_LIMIT,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyric-poster")]
#[command(about = "Print an artist's complete lyrics on a single poster page", long_about = None)]
struct Cli {
    /// Artist whose discography goes on the poster
    #[arg(short, long)]
    artist: String,

    /// Deezer ARL token (can also be set via DEEZER_ARL env var)
    #[arg(long, env = "DEEZER_ARL")]
    arl: String,

    /// Faded background image
    #[arg(long)]
    background_url: Option<String>,

    /// Signature image in the lower right corner
    #[arg(long)]
    signature_url: Option<String>,

    /// Layout engine used to measure and render the poster
    #[arg(short, long, value_enum, default_value_t = Renderer::Typeset)]
    renderer: Renderer,

    /// How songs are grouped into albums
    #[arg(short, long, value_enum, default_value_t = Grouping::Albums)]
    grouping: Grouping,

    /// Smallest font size tried, in points
    #[arg(long, default_value_t = 1.0)]
    min_size: f64,

    /// Largest font size tried, in points
    #[arg(long, default_value_t = 20.0)]
    max_size: f64,

    /// Font size search precision, in points
    #[arg(long, default_value_t = 0.01)]
    precision: f64,

    /// Page width in millimetres
    #[arg(long, default_value_t = 1000.0)]
    page_width_mm: f64,

    /// Page height in millimetres
    #[arg(long, default_value_t = 1380.0)]
    page_height_mm: f64,

    /// Directory for cached lookups
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Keep lookups in memory only
    #[arg(long)]
    no_cache: bool,

    /// Output directory for the poster
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of top songs listed when grouping by songs
    #[arg(long, default_value_t = DEFAULT_SONG_LIMIT)]
    song_limit: u32,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Renderer {
    Typeset,
    Weasyprint,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Grouping {
    Albums,
    Songs,
}

impl From<Grouping> for GroupingStrategy {
    fn from(g: Grouping) -> Self {
        match g {
            Grouping::Albums => GroupingStrategy::AlbumEntities,
            Grouping::Songs => GroupingStrategy::SongAlbumName,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Validate settings before touching the network
    let page = PageSize::new(cli.page_width_mm, cli.page_height_mm)?;
    let fitter = FitterConfig::new(page, cli.min_size, cli.max_size, cli.precision)?;

    let mut source = DeezerDiscography::new(&cli.arl).await?;
    source.set_song_limit(cli.song_limit);

    let cache: Arc<dyn LookupCache> = if cli.no_cache {
        Arc::new(MemoryCache::new())
    } else {
        Arc::new(DiskCache::open(&cli.cache_dir)?)
    };

    let aggregator = Aggregator::new(source, cache).with_options(AggregatorOptions {
        grouping: cli.grouping.into(),
        ..Default::default()
    });

    let oracle: Arc<dyn RenderingOracle> = match cli.renderer {
        Renderer::Typeset => Arc::new(TypesetRenderer::default()),
        Renderer::Weasyprint => Arc::new(WeasyprintRenderer::default()),
    };

    let options = PosterOptions {
        fitter,
        background_url: cli.background_url,
        signature_url: cli.signature_url,
        output_dir: cli.output_dir,
    };

    println!("Building poster for '{}'...", cli.artist);
    let outcome = generate(&aggregator, oracle, &cli.artist, &options).await?;

    println!("✅ Poster saved: {}", outcome.path.display());
    println!(
        "   {} albums, {} songs at {}pt ({} measurements)",
        outcome.albums, outcome.songs, outcome.font_size, outcome.iterations
    );

    Ok(())
}
