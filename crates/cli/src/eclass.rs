use crosscope_core::resolver;
use std::path::PathBuf;

pub fn run(name: &str, checkout: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let checkout = match checkout {
        Some(checkout) => checkout,
        None => {
            let cwd = std::env::current_dir()?;
            resolver::find_checkout_root(&cwd)
                .ok_or("not inside a ChromeOS checkout; pass --checkout")?
        }
    };

    match resolver::resolve_eclass(&checkout, name) {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => Err(format!("{name}.eclass not found under {}", checkout.display()).into()),
    }
}
