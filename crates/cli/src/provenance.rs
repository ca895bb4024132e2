use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where the sidecar was requested from.
#[derive(Debug, Serialize)]
pub struct Callsite {
    pub file: &'static str,
    pub line: u32,
}

/// Contents of `<artifact>.provenance.json`.
#[derive(Debug, Serialize)]
pub struct Sidecar {
    pub code_rev: String,
    pub version: &'static str,
    pub callsite: Callsite,
    pub stage: String,
    pub params: Value,
    pub outputs: Vec<String>,
}

impl Sidecar {
    /// Sidecar for `stage`, stamped with the current revision and the caller's location.
    #[track_caller]
    pub fn new(stage: &str, params: Value) -> Self {
        let callsite = Location::caller();
        Self {
            code_rev: current_git_rev(),
            version: polyquery::VERSION,
            callsite: Callsite {
                file: callsite.file(),
                line: callsite.line(),
            },
            stage: stage.to_string(),
            params,
            outputs: Vec::new(),
        }
    }

    pub fn output(mut self, path: &Path) -> Self {
        self.outputs.push(path.to_string_lossy().into_owned());
        self
    }

    /// Write next to `artifact` and return the sidecar path.
    pub fn write_next_to(&self, artifact: &Path) -> Result<PathBuf> {
        let path = provenance_path(artifact);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating provenance dir {}", parent.display()))?;
            }
        }
        fs::write(&path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit id from the build env, the runtime env, or `git rev-parse`; `unknown` otherwise.
pub fn current_git_rev() -> String {
    let from_build = option_env!("GIT_COMMIT").map(str::to_string);
    let from_env = std::env::var("GIT_COMMIT").ok();
    from_build
        .into_iter()
        .chain(from_env)
        .find(|rev| !rev.is_empty())
        .or_else(|| {
            let output = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            if !output.status.success() {
                return None;
            }
            String::from_utf8(output.stdout)
                .ok()
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_rewrites_extension() {
        let base = Path::new("/tmp/output/candidates.adql");
        assert_eq!(
            provenance_path(base),
            Path::new("/tmp/output/candidates.provenance.json")
        );
    }

    #[test]
    fn sidecar_records_stage_and_outputs() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("query.adql");
        fs::write(&artifact, "SELECT 1").unwrap();
        let store = dir.path().join("polygons.json");
        let path = Sidecar::new("select", json!({"input": "pm.csv"}))
            .output(&artifact)
            .output(&store)
            .write_next_to(&artifact)
            .unwrap();
        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["stage"], "select");
        assert_eq!(parsed["params"]["input"], "pm.csv");
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["outputs"].as_array().unwrap().len(), 2);
        assert!(parsed["callsite"]["line"].as_u64().unwrap() > 0);
    }
}
