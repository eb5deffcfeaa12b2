use anyhow::{Context, Result};
use districtquiz::{QuizRegistry, UserShape};

use super::{load_table, print_grade, reference_source, scorer};
use crate::cli::{Cli, DropArgs, GradeArgs};

pub fn run(cli: &Cli, args: &GradeArgs) -> Result<()> {
    let source = reference_source(&args.reference);
    let mut registry = QuizRegistry::new(load_table(cli)?, scorer(args.strategy));
    let session = registry.open_loaded(&args.city, source.as_ref())?;

    if let Some(err) = session.load_error() {
        eprintln!("[grade] warning: {err}; grading against a fallback square");
    }

    for path in &args.shapes {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read shape {}", path.display()))?;
        let shape = UserShape::from_geojson(&bytes)
            .with_context(|| format!("Invalid shape {}", path.display()))?;
        let id = session.submit_shape(shape)?;
        tracing::info!(shape = id.0, path = %path.display(), "submitted");
    }

    print_grade(session.check()?, args.reference.json)
}

pub fn run_drop(cli: &Cli, args: &DropArgs) -> Result<()> {
    let source = reference_source(&args.reference);
    let mut registry = QuizRegistry::new(load_table(cli)?, scorer(args.strategy));
    let session = registry.open_loaded(&args.city, source.as_ref())?;

    if let Some(err) = session.load_error() {
        eprintln!("[drop] warning: {err}; grading against a fallback square");
    }

    session.drop_shape(args.lat, args.lng)?;
    print_grade(session.check()?, args.reference.json)
}
