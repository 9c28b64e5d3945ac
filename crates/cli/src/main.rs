fn main() {
    if let Err(err) = crosscope_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
