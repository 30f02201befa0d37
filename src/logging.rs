use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "walkform=info,pose_viewer=info";

/// `RUST_LOG` があればそれを、無ければ info レベルで出力する
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
