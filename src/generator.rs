use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::fonts::{FontBook, ParleyShaper};
use crate::bind::{RawInput, bind};
use crate::compose::compositor::{ComposeOpts, compose};
use crate::encode::{OutputFormat, encode};
use crate::foundation::error::{MemeError, MemeResult};
use crate::template::model::OutputKind;
use crate::template::registry::TemplateRegistry;
use crate::text::layout::TextLayoutOpts;
use crate::text::shaper::TextShaper;

/// Tunables for a [`Generator`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorOpts {
    /// Hard cap on auto-fit font size steps.
    pub fit_iteration_cap: usize,
    /// Gap between lines of multi-line text, in pixels.
    pub line_spacing_px: f32,
}

impl Default for GeneratorOpts {
    fn default() -> Self {
        let text = TextLayoutOpts::default();
        Self {
            fit_iteration_cap: text.fit_iteration_cap,
            line_spacing_px: text.line_spacing_px,
        }
    }
}

impl GeneratorOpts {
    fn compose_opts(&self) -> ComposeOpts {
        ComposeOpts {
            text: TextLayoutOpts {
                fit_iteration_cap: self.fit_iteration_cap,
                line_spacing_px: self.line_spacing_px,
            },
        }
    }
}

/// An encoded generation result held in memory.
#[derive(Clone, Debug)]
pub struct Generated {
    pub kind: OutputFormat,
    pub bytes: Vec<u8>,
    pub frame_count: usize,
    pub width: u32,
    pub height: u32,
}

impl Generated {
    /// Write the encoded bytes to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> MemeResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory '{}'", parent.display()))?;
        }
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write output to '{}'", path.display()))?;
        Ok(())
    }
}

/// Result descriptor: `code` is `1` on success, otherwise [`MemeError::code`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GenerateReport {
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateReport {
    pub fn from_result(result: &MemeResult<Generated>, path: Option<&Path>) -> Self {
        match result {
            Ok(g) => Self {
                code: 1,
                path: path.map(Path::to_path_buf),
                format: Some(g.kind),
                frames: Some(g.frame_count),
                error: None,
            },
            Err(e) => Self {
                code: e.code(),
                path: None,
                format: None,
                frames: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Generation facade over a template registry and font book.
///
/// Shared state is read-only; every call builds its own inputs, layers and shaper.
#[derive(Clone, Debug)]
pub struct Generator {
    registry: Arc<TemplateRegistry>,
    fonts: Arc<FontBook>,
    opts: GeneratorOpts,
}

impl Generator {
    pub fn new(registry: TemplateRegistry, fonts: FontBook, opts: GeneratorOpts) -> Self {
        Self {
            registry: Arc::new(registry),
            fonts: Arc::new(fonts),
            opts,
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Generate with a fresh [`ParleyShaper`] over the font book.
    #[tracing::instrument(skip(self, inputs), fields(inputs = inputs.len()))]
    pub fn generate(&self, id: &str, inputs: &[RawInput]) -> MemeResult<Generated> {
        let mut shaper = ParleyShaper::new(Arc::clone(&self.fonts));
        self.generate_with(id, inputs, &mut shaper)
    }

    /// Generate with a caller-provided text shaper.
    pub fn generate_with(
        &self,
        id: &str,
        inputs: &[RawInput],
        shaper: &mut dyn TextShaper,
    ) -> MemeResult<Generated> {
        let entry = self.registry.lookup(id)?;
        let template = entry.template();
        if let OutputKind::Unsupported(kind) = &template.output_kind {
            return Err(MemeError::UnknownGenerateKind(kind.clone()));
        }
        let bound = bind(template, inputs)?;

        let frames = compose(entry, &bound, shaper, &self.opts.compose_opts())?;
        let frame_count = frames.len();
        let (kind, bytes) = encode(&frames, template)?;
        // Still output keeps only the first composited frame.
        let frame_count = match kind {
            OutputFormat::Png => frame_count.min(1),
            OutputFormat::Gif => frame_count,
        };

        tracing::info!(
            template = %id,
            format = kind.extension(),
            frames = frame_count,
            bytes = bytes.len(),
            "generated output"
        );
        Ok(Generated {
            kind,
            bytes,
            frame_count,
            width: template.output_size.width,
            height: template.output_size.height,
        })
    }
}

impl From<MemeError> for GenerateReport {
    fn from(e: MemeError) -> Self {
        Self::from_result(&Err(e), None)
    }
}

#[cfg(test)]
#[path = "../tests/unit/generator.rs"]
mod tests;
