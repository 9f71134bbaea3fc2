use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use std::path::Path;
use std::fs;
use std::sync::Mutex;

/// Filter for this crate's events; dependencies stay at `warn` unless `RUST_LOG` says otherwise
pub fn env_filter(verbose: bool) -> Result<EnvFilter> {
    let level = if verbose { "reelcount=debug" } else { "reelcount=info" };

    Ok(EnvFilter::from_default_env()
        .add_directive(level.parse()?)
        .add_directive("warn".parse()?))
}

/// Initialize the logging system
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_target(false);

    if let Some(log_file) = log_file {
        if let Some(parent) = log_file.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = fs::File::create(log_file)?;
        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(Mutex::new(file));

        tracing_subscriber::registry()
            .with(env_filter(verbose)?)
            .with(fmt_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter(verbose)?)
            .with(fmt_layer)
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_levels() {
        assert!(env_filter(false).unwrap().to_string().contains("reelcount=info"));
        assert!(env_filter(true).unwrap().to_string().contains("reelcount=debug"));
    }
}
