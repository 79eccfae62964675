//! Tracing / logging initialisation.

use nttwatch_core::LogConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter directive string, e.g. `"info,nttwatch_watcher=debug"`.
fn directives(config: &LogConfig) -> String {
    let mut directives = config.level.clone();
    let mut components: Vec<_> = config.components.iter().collect();
    components.sort();
    for (component, level) in components {
        directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
    }
    directives
}

/// Initialise tracing once at startup. `RUST_LOG` overrides the config.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives(config)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // logs go to stderr so command output on stdout stays machine-readable
    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_directives() {
        let mut config = LogConfig::default();
        config.components.insert("nttwatch-watcher".into(), "debug".into());
        config.components.insert("nttwatch-storage".into(), "warn".into());
        assert_eq!(
            directives(&config),
            "info,nttwatch_storage=warn,nttwatch_watcher=debug"
        );
    }
}
