//! File-backed host
//!
//! Plan and state are plain JSON files. The plan is read-only; state is
//! rewritten on every change and deleted when the resource goes away.

use anyhow::{Context, Result};
use lifecycle::{Diagnostics, Host};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct FileHost {
    plan: Option<Value>,
    state: Option<Value>,
    state_path: PathBuf,
}

fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

impl FileHost {
    /// Open a host over `state_path`, optionally with a plan file
    ///
    /// A missing state file means "no state yet".
    pub fn open(plan_path: Option<&Path>, state_path: &Path) -> Result<Self> {
        let plan = plan_path.map(read_json).transpose()?;
        let state = if state_path.exists() {
            Some(read_json(state_path)?)
        } else {
            None
        };

        Ok(Self {
            plan,
            state,
            state_path: state_path.to_path_buf(),
        })
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    fn write(&self, value: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let result = serde_json::to_string_pretty(value)
            .map_err(anyhow::Error::from)
            .and_then(|content| {
                if let Some(parent) = self.state_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&self.state_path, content + "\n")?;
                Ok(())
            });

        if let Err(e) = result {
            diags.add_error(
                "Error writing state",
                format!("Could not write {}: {e}", self.state_path.display()),
            );
        }
        diags
    }
}

impl Host for FileHost {
    fn plan(&self) -> Option<&Value> {
        self.plan.as_ref()
    }

    fn state(&self) -> Option<&Value> {
        self.state.as_ref()
    }

    fn set_state(&mut self, value: Value) -> Diagnostics {
        let diags = self.write(&value);
        self.state = Some(value);
        diags
    }

    fn remove_state(&mut self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        self.state = None;
        if self.state_path.exists()
            && let Err(e) = fs::remove_file(&self.state_path)
        {
            diags.add_error(
                "Error removing state",
                format!("Could not remove {}: {e}", self.state_path.display()),
            );
        }
        diags
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Diagnostics {
        let mut state = self
            .state
            .take()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let diags = match state.as_object_mut() {
            Some(obj) => {
                obj.insert(name.to_string(), value);
                self.write(&state)
            }
            None => {
                let mut diags = Diagnostics::new();
                diags.add_error(
                    "Invalid state",
                    format!("{} does not hold a JSON object", self.state_path.display()),
                );
                diags
            }
        };
        self.state = Some(state);
        diags
    }
}
