// run.rs — Apply a ferry.toml pipeline to a checkout.

use std::fs;
use std::path::Path;

use anyhow::Context;
use ferry_transform::{reverse_all, PipelineConfig, Sequence, Transformation};
use ferry_work::{Author, Changes, LogConsole, TransformWork};

/// Author used when neither `--author` nor the change history provides one.
const DEFAULT_AUTHOR: &str = "Ferry <ferry@localhost>";

pub struct RunArgs<'a> {
    pub checkout: &'a Path,
    pub config: &'a Path,
    pub message_file: Option<&'a Path>,
    pub author: Option<&'a str>,
    pub changes: Option<&'a Path>,
    pub reverse: bool,
}

pub fn execute(args: &RunArgs<'_>) -> anyhow::Result<()> {
    if !args.checkout.is_dir() {
        anyhow::bail!("checkout {} is not a directory", args.checkout.display());
    }

    let config = PipelineConfig::load(args.config)?;
    let mut steps = config.build()?;
    if args.reverse {
        steps = reverse_all(&steps)?;
    }

    let message = match args.message_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read message file {}", path.display()))?,
        None => String::new(),
    };

    let changes = match args.changes {
        Some(path) => Changes::load(path)
            .with_context(|| format!("cannot load changes file {}", path.display()))?,
        None => Changes::default(),
    };

    let author = match args.author {
        Some(value) => Author::parse(value)?,
        None => match changes.current().last() {
            Some(change) => change.author.clone(),
            None => Author::parse(DEFAULT_AUTHOR)?,
        },
    };

    tracing::info!(
        checkout = %args.checkout.display(),
        steps = steps.len(),
        reverse = args.reverse,
        "running pipeline"
    );

    let mut work = TransformWork::new(args.checkout, message, author).with_changes(changes);
    let pipeline = Transformation::Sequence(Sequence::new(steps));
    pipeline.transform(&mut work, &LogConsole)?;

    println!("Author: {}", work.author());
    println!();
    print!("{}", work.message());
    Ok(())
}
