use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;

use crate::assets::decode::open_image;
use crate::foundation::error::{MemeError, MemeResult};
use crate::template::model::{OutputKind, Template};

/// A loaded template together with its pre-authored per-frame foreground assets.
#[derive(Clone, Debug)]
pub struct TemplateEntry {
    template: Arc<Template>,
    frames: Arc<Vec<RgbaImage>>,
}

impl TemplateEntry {
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Foreground asset per base frame, in numeric order. May be empty.
    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    /// Base animation length: the resource set size, or the declared frame span when the
    /// template ships no resources.
    pub fn base_frame_count(&self) -> usize {
        if self.frames.is_empty() {
            self.template.declared_frame_count()
        } else {
            self.frames.len()
        }
    }
}

/// Constructed-once, read-only registry of templates keyed by id.
///
/// All IO happens while building the registry; generation never touches the filesystem.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    entries: BTreeMap<String, TemplateEntry>,
    unconfigured: BTreeSet<String>,
    unresourced: BTreeSet<String>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<root>/<id>.json` document and its `<root>/<id>/` frame directory.
    #[tracing::instrument]
    pub fn load_dir(root: &Path) -> MemeResult<Self> {
        let mut configs = BTreeMap::<String, PathBuf>::new();
        let mut resource_dirs = BTreeMap::<String, PathBuf>::new();

        let rd = std::fs::read_dir(root)
            .with_context(|| format!("read template directory '{}'", root.display()))?;
        for entry in rd.flatten() {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if path.is_dir() {
                resource_dirs.insert(stem.to_string(), path.clone());
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
            {
                configs.insert(stem.to_string(), path.clone());
            }
        }

        let mut out = Self::new();
        for (id, config_path) in &configs {
            let mut template = Template::from_path(config_path)?;
            if template.id != *id {
                tracing::warn!(
                    file_id = %id,
                    declared_id = %template.id,
                    "template id differs from file name; using file name"
                );
                template.id = id.clone();
            }
            let frames = match resource_dirs.get(id) {
                Some(dir) => load_frame_assets(dir)?,
                None if template.output_kind == OutputKind::Animated => {
                    tracing::warn!(id = %id, "animated template has no frame directory");
                    out.unresourced.insert(id.clone());
                    continue;
                }
                None => Vec::new(),
            };
            out.insert(template, frames)?;
        }
        for id in resource_dirs.keys() {
            if !configs.contains_key(id) {
                out.unconfigured.insert(id.clone());
            }
        }

        tracing::info!(
            templates = out.entries.len(),
            unconfigured = out.unconfigured.len(),
            unresourced = out.unresourced.len(),
            "loaded template registry"
        );
        Ok(out)
    }

    /// Register an in-memory template with its frame assets.
    pub fn insert(&mut self, template: Template, frames: Vec<RgbaImage>) -> MemeResult<()> {
        template.validate()?;
        let entry = TemplateEntry {
            template: Arc::new(template),
            frames: Arc::new(frames),
        };
        let base = entry.base_frame_count();
        if let Some(seq) = &entry.template.custom_sequence
            && let Some(bad) = seq.iter().find(|&&i| i >= base)
        {
            return Err(MemeError::validation(format!(
                "template '{}' custom_sequence references base frame {bad}, but only {base} exist",
                entry.template.id
            )));
        }
        let id = entry.template.id.clone();
        self.unconfigured.remove(&id);
        self.unresourced.remove(&id);
        self.entries.insert(id, entry);
        Ok(())
    }

    /// Resolve a template id.
    ///
    /// Animated templates loaded from disk without a frame directory resolve to
    /// [`MemeError::ResourceNotFound`].
    pub fn lookup(&self, id: &str) -> MemeResult<&TemplateEntry> {
        if let Some(entry) = self.entries.get(id) {
            return Ok(entry);
        }
        if self.unconfigured.contains(id) {
            return Err(MemeError::ConfigNotFound(id.to_string()));
        }
        Err(MemeError::ResourceNotFound(id.to_string()))
    }

    /// Registered template ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load numerically named frame images (`0.png`, `1.png`, ...) in numeric order.
pub fn load_frame_assets(dir: &Path) -> MemeResult<Vec<RgbaImage>> {
    let rd = std::fs::read_dir(dir)
        .with_context(|| format!("read frame directory '{}'", dir.display()))?;

    let mut numbered = Vec::<(usize, PathBuf)>::new();
    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(n) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<usize>().ok())
        else {
            tracing::debug!(path = %path.display(), "skipping non-numeric frame asset");
            continue;
        };
        numbered.push((n, path));
    }
    numbered.sort_by_key(|(n, _)| *n);

    numbered.iter().map(|(_, path)| open_image(path)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/template/registry.rs"]
mod tests;
