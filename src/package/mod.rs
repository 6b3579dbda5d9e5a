//! Demo scripts written next to the built binaries

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::artifact;
use crate::error::PipelineError;


pub const DEMO_SH: &str = r#"#!/bin/bash
echo "=== Service Demo ==="
./service-1 add 10 20
./service-1 mul 6 7
./service-2 reverse "hello world"
./service-2 wordcount "one two three"
echo "===================="
"#;

pub const DEMO_BAT: &str = r#"@echo off
echo === Service Demo ===
service-1.exe add 10 20
service-1.exe mul 6 7
service-2.exe reverse "hello world"
service-2.exe wordcount "one two three"
echo ====================
pause
"#;

/// A script written into the artifact directory
#[derive(Debug, Clone, Copy)]
pub struct DemoScript {
    pub file_name: &'static str,
    pub contents: &'static str,
    pub mode: u32,
}

pub const SCRIPTS: [DemoScript; 2] = [
    DemoScript {
        file_name: artifact::DEMO_SH,
        contents: DEMO_SH,
        mode: 0o755,
    },
    DemoScript {
        file_name: artifact::DEMO_BAT,
        contents: DEMO_BAT,
        mode: 0o644,
    },
];

/// Write both demo scripts into `artifact_dir`, replacing any existing copies
pub fn write_demo_scripts(artifact_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(artifact_dir)
        .map_err(|e| PipelineError::fs("create", artifact_dir, e))?;

    let mut written = Vec::with_capacity(SCRIPTS.len());
    for script in &SCRIPTS {
        let path = artifact_dir.join(script.file_name);
        std::fs::write(&path, script.contents).map_err(|e| PipelineError::fs("write", &path, e))?;
        set_mode(&path, script.mode)?;
        written.push(path);
    }

    info!("Demo scripts created in {}", artifact_dir.display());
    Ok(written)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| PipelineError::fs("set permissions on", path, e))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
