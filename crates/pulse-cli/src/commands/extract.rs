//! `pulse extract` - pull content out of a deck.

use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use pulse_infrastructure::DeckExtractor;

pub fn run(deck: &Path, as_json: bool) -> Result<()> {
    let bytes = std::fs::read(deck)?;
    DeckExtractor::validate_magic(&bytes)?;

    let content = DeckExtractor::extract(deck)?;
    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&Value::Object(content.to_content_map()))?
        );
    } else {
        println!("{}", content.summary(&deck.display().to_string()));
    }
    Ok(())
}
