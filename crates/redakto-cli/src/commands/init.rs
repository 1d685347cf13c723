use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use redakto_config::CONFIG_FILE_NAME;

const DEFAULT_CONFIG: &str = include_str!("../../assets/redakto.toml");
const SAMPLE_CATALOG: &str = include_str!("../../assets/entity_set_models.yml");
const SAMPLE_PATTERNS: &str = include_str!("../../assets/patterns.yml");

pub const CATALOG_FILE_NAME: &str = "entity_set_models.yml";

/// Files written by `init`, relative to the target directory.
fn files() -> [(PathBuf, &'static str); 3] {
    [
        (PathBuf::from(CONFIG_FILE_NAME), DEFAULT_CONFIG),
        (PathBuf::from(CATALOG_FILE_NAME), SAMPLE_CATALOG),
        (
            ["models", "codealltag", "patterns", "v1", "patterns.yml"]
                .iter()
                .collect(),
            SAMPLE_PATTERNS,
        ),
    ]
}

pub fn handle(config_path: &Path, dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| {
        config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let written = write_files(&target, force)?;

    if written == 0 {
        println!("Nothing to do, files already exist in {} (use --force)", target.display());
    } else {
        println!("✓ Initialized {}", target.display());
        println!("  Run 'redakto --config {} serve' to start the API", target.join(CONFIG_FILE_NAME).display());
    }
    Ok(())
}

fn write_files(target: &Path, force: bool) -> Result<usize> {
    let mut written = 0;
    for (relative, content) in files() {
        let path = target.join(&relative);
        if path.exists() && !force {
            println!("  Skipped {} (exists)", path.display());
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  Wrote {}", path.display());
        written += 1;
    }
    Ok(written)
}
