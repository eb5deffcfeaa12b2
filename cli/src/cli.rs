use std::path::PathBuf;

/// District quiz grader (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "districtquiz", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON city table to use instead of the built-in one
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub cities: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List configured cities
    Cities,

    /// Grade drawn shapes (GeoJSON files) against a city's proposed district
    Grade(GradeArgs),

    /// Grade a copy of the district dropped at a point
    Drop(DropArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, clap::ValueEnum)]
pub enum Strategy { Overlap, Distance }

#[derive(clap::Args, Debug)]
pub struct ReferenceArgs {
    /// Directory that reference paths in the city table are relative to, defaults to "."
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Fetch reference files below this URL instead of reading from disk
    #[arg(long, conflicts_with = "data_dir")]
    pub base_url: Option<String>,

    /// Print the grade as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct GradeArgs {
    /// City key, e.g. austin
    pub city: String,

    /// User shapes as GeoJSON files
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub shapes: Vec<PathBuf>,

    /// Grading strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Overlap)]
    pub strategy: Strategy,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}

#[derive(clap::Args, Debug)]
pub struct DropArgs {
    /// City key, e.g. austin
    pub city: String,

    /// Drop latitude
    #[arg(allow_hyphen_values = true)]
    pub lat: f64,

    /// Drop longitude
    #[arg(allow_hyphen_values = true)]
    pub lng: f64,

    /// Grading strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Distance)]
    pub strategy: Strategy,

    #[command(flatten)]
    pub reference: ReferenceArgs,
}
