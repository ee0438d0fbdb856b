fn main() {
    if let Err(e) = medibot_lib::run() {
        tracing::error!(error = %e, "Medibot failed");
        eprintln!("medibot: {e}");
        std::process::exit(1);
    }
}
