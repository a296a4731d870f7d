//! Filesystem infrastructure: implements `TemplateWriter`.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::TemplateWriter;

/// Production filesystem implementation of `TemplateWriter`.
///
/// Without an explicit target the document goes to a persisted temp file
/// named `jitp-template-*.json` so a calling shell can pick the path up.
pub struct LocalFs;

impl TemplateWriter for LocalFs {
    fn write_template(&self, contents: &str, target: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = target {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            std::fs::write(path, contents)
                .with_context(|| format!("writing {}", path.display()))?;
            return Ok(path.to_path_buf());
        }

        let mut file = tempfile::Builder::new()
            .prefix("jitp-template-")
            .suffix(".json")
            .tempfile()
            .context("creating temporary template file")?;
        file.write_all(contents.as_bytes())
            .context("writing temporary template file")?;
        let (_, path) = file.keep().context("persisting temporary template file")?;
        Ok(path)
    }
}
