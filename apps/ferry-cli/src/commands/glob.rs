// glob.rs — List checkout files matching a glob.

use std::path::Path;

use ferry_work::{Author, Glob, TransformWork};

pub fn execute(checkout: &Path, patterns: &[String], exclude: &[String]) -> anyhow::Result<()> {
    if !checkout.is_dir() {
        anyhow::bail!("checkout {} is not a directory", checkout.display());
    }
    let glob = Glob::new(patterns, exclude)?;
    // Listing doesn't touch the message or author.
    let work = TransformWork::new(checkout, "", Author::new("ferry", ""));
    for path in work.run(&glob)? {
        println!("{}", path);
    }
    Ok(())
}
