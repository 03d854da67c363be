use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up logging; RUST_LOG controls verbosity
    env_logger::init();

    // File dialogs run as tasks on this runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    network_diagram::run_app(path)?;
    Ok(())
}
