fn main() {
    let args = std::env::args();
    // Initialize logging as early as possible; fallback to stderr on failure.
    let _ = pullbox::logging::init_logging(pullbox::logging::LogFormat::Human);

    if let Err(err) = pullbox::run(args) {
        eprintln!("pullbox error: {err}");
        let code = match err.downcast_ref::<pullbox::Error>() {
            Some(pullbox::Error::Usage(_)) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
