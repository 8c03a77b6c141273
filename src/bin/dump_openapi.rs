use std::fs;
use std::path::PathBuf;

/// Writes the OpenAPI document to the given path (default `openapi.json`).
fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let port = rural_registry::config::port_from_env()?;
    let doc = rural_registry::docs::build_openapi(port)?;
    fs::write(&path, serde_json::to_string_pretty(&doc)?)?;
    println!("wrote {}", path.display());
    Ok(())
}
