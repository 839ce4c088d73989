use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "barcode_scanner=info";

static INIT: Once = Once::new();

/// Install the global tracing subscriber
///
/// `filter` takes `RUST_LOG` style directives, without it `RUST_LOG` is read
/// and `barcode_scanner=info` is the fallback. Only the first call has an effect.
pub fn init(filter: Option<&str>) {
    INIT.call_once(|| {
        let filter = match filter {
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        };

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .try_init();

        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed by the host");
        }
    });
}

#[uniffi::export]
fn init_logging(filter: Option<String>) {
    init(filter.as_deref())
}
