/// jdx-inspect: print the header of a JDX file, and optionally its label histogram.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    use jdx::LoaderConfig;

    let config = LoaderConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let mut path = None;
    let mut show_items = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--items" => show_items = true,
            _ if path.is_none() => path = Some(arg),
            _ => {
                eprintln!("Unexpected argument: {}", arg);
                return ExitCode::from(2);
            }
        }
    }
    let Some(path) = path else {
        eprintln!("Usage: jdx-inspect <file.jdx> [--items]");
        return ExitCode::from(2);
    };

    match inspect(&path, &config, show_items) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {} ({:?} error)", path, e, e.kind());
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn inspect(path: &str, config: &jdx::LoaderConfig, show_items: bool) -> jdx::Result<()> {
    println!("jdx {}", jdx::version_string());

    if !show_items {
        let header = jdx::read_header_with(path, config)?;
        print_header(&header);
        return Ok(());
    }

    let dataset = jdx::read_dataset_with(path, config)?;
    print_header(dataset.header());
    println!("Labels:");
    for (label, count) in dataset.label_counts() {
        println!("  {:>6}: {}", label, count);
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn print_header(header: &jdx::Header) {
    match serde_json::to_string_pretty(header) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize header: {}", e),
    }
}

// The inspector reads from the local filesystem; there is nothing to run on wasm.
#[cfg(target_arch = "wasm32")]
fn main() {}
