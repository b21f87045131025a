use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::Path;

use super::Config;

const HEADER: &str = "\
# pidgeon configuration
#
# scoring.weights are relative shares of the composite score; they are
# normalized, so 40/30/20/10 and 4/3/2/1 rank identically.
# Inside each category the weights balance the inputs of that category.
# filters are hard bounds; a listing without the value fails the bound.
";

/// Write the default configuration to `path`.
///
/// Refuses to replace an existing file unless `force` is set. The write is
/// atomic, so an interrupted run never leaves a truncated config behind.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let yaml = serde_saphyr::to_string(&Config::default())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(HEADER.as_bytes())
        .and_then(|_| file.write_all(yaml.as_bytes()))
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::env;

    #[test]
    fn test_written_default_loads_back() {
        let dir = env::temp_dir().join("pidgeon_test_init");
        let path = dir.join("config.yaml");
        let _ = std::fs::remove_file(&path);

        write_default_config(&path, false).unwrap();
        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config, Config::default());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_refuses_overwrite_without_force() {
        let dir = env::temp_dir().join("pidgeon_test_init_force");
        let path = dir.join("config.yaml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "filters: {}\n").unwrap();

        assert!(write_default_config(&path, false).is_err());
        write_default_config(&path, true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# pidgeon configuration"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
