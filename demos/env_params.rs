use std::sync::Arc;
use std::time::Duration;

use layerset::{EnvLayer, Layer, ParamSet, TableLayer};

fn main() -> Result<(), layerset::ConfigError> {
    let mut params = ParamSet::new();
    let name = params.string("app.name", "demo");
    let debug = params.bool("app.debug", false);
    let port = params.int("db.port", 5432);
    let timeout = params.duration("db.timeout", Duration::from_secs(5));
    let url = params.url("db.url", "postgres://localhost/demo");

    // defaults -> environment, e.g. DEMO_DB_PORT=6543 DEMO_APP_DEBUG=true
    let layers: Vec<Arc<dyn Layer>> = vec![
        Arc::new(TableLayer::from_toml("[app]\nname = \"layerset demo\"")?),
        Arc::new(EnvLayer::new("DEMO", "_", ".")),
    ];
    params.load(&layers)?;

    println!("App: {} (debug={})", name.get(), debug.get());
    println!(
        "Database: {} port={} (set={}) timeout={:?}",
        url.get().map(String::from).unwrap_or_default(),
        port.get(),
        port.is_set(),
        timeout.get()
    );

    Ok(())
}
