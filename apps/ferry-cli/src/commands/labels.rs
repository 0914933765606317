// labels.rs — Print the label footer of a change message.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use ferry_work::labels;

pub fn execute(file: Option<&Path>) -> anyhow::Result<()> {
    let message = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let found = labels::parse_labels(&message);
    if found.is_empty() {
        println!("No labels.");
        return Ok(());
    }
    for (key, value) in found {
        println!("{}={}", key, value);
    }
    Ok(())
}
