//! The full tree in a window.
//!
//! Run with: `cargo run --example grand_tree [scene.json]`
//!
//! Space or Enter toggles between chaos and the assembled tree. Set
//! `RUST_LOG=treemorph=debug` to see mode transitions.

use treemorph::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(%path, "loading scene config");
            SceneConfig::load(path)?
        }
        None => SceneConfig::default(),
    };

    Viewer::new(config).with_title("Grand Tree").run()?;
    Ok(())
}
