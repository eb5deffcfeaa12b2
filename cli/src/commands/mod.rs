pub mod cities;
pub mod grade;

use anyhow::{Context, Result};
use districtquiz::{CachedSource, CityTable, DiskSource, Grade, HttpSource, ReferenceSource, Scorer};

use crate::cli::{Cli, ReferenceArgs, Strategy};

/// City table from `--cities`, or the built-in one.
pub(crate) fn load_table(cli: &Cli) -> Result<CityTable> {
    match &cli.cities {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read city table {}", path.display()))?;
            CityTable::from_json(&bytes)
        }
        None => Ok(CityTable::builtin()),
    }
}

/// Reference source selected by the command line.
pub(crate) fn reference_source(args: &ReferenceArgs) -> Box<dyn ReferenceSource> {
    match &args.base_url {
        Some(url) => Box::new(CachedSource::new(HttpSource::new(url.clone()))),
        None => Box::new(DiskSource::new(args.data_dir.clone().unwrap_or(".".into()))),
    }
}

pub(crate) fn scorer(strategy: Strategy) -> Scorer {
    match strategy {
        Strategy::Overlap => Scorer::bounds_overlap(),
        Strategy::Distance => Scorer::centroid_distance(),
    }
}

pub(crate) fn print_grade(grade: &Grade, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(grade).context("Failed to serialize grade")?);
        return Ok(());
    }

    println!("[{}] {}", grade.result.tier, grade.result.message);
    if grade.total > 1 {
        println!("{}", grade.summary());
    }
    if let Some(commentary) = &grade.commentary {
        println!();
        println!("{commentary}");
    }
    Ok(())
}
