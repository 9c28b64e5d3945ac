use crosscope_core::parser::parse_ebuild;
use std::path::Path;

pub fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(file)?;
    let parsed = parse_ebuild(&text)?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
