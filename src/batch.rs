use crate::config::Config;
use crate::layout::compute_layout;
use crate::model::EntityDescription;
use crate::render::{RenderError, render_svg};
use crate::validate::{ValidationError, Violation, collect_violations};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Svg,
    #[cfg(feature = "png")]
    Png,
}

impl ArtifactFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::Svg => "svg",
            #[cfg(feature = "png")]
            ArtifactFormat::Png => "png",
        }
    }
}

/// Per-entity failure. One entity failing never aborts the batch.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Aggregate outcome of one batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Artifact stems of entities that were written successfully.
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, DiagramError)>,
    /// Non-fatal layout warnings: (entity name, warning text).
    pub warnings: Vec<(String, String)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deterministic artifact stem: lower-cased entity name with every run of
/// non-alphanumeric characters collapsed to one `_`.
pub fn artifact_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("entity");
    }
    slug
}

/// Runs validate -> layout -> render -> write for every entity, isolating
/// failures so the remaining entities still produce artifacts.
pub fn run_batch(
    entities: &[EntityDescription],
    out_dir: &Path,
    config: &Config,
    format: ArtifactFormat,
) -> BatchReport {
    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for entity in entities {
        *name_counts.entry(entity.name.as_str()).or_default() += 1;
    }

    let mut report = BatchReport::default();
    for entity in entities {
        let mut violations = collect_violations(entity);
        if name_counts.get(entity.name.as_str()).copied().unwrap_or(0) > 1 {
            violations.push(Violation::DuplicateEntityName(entity.name.clone()));
        }
        if !violations.is_empty() {
            report.failed.push((
                entity.name.clone(),
                ValidationError {
                    entity: entity.name.clone(),
                    violations,
                }
                .into(),
            ));
            continue;
        }

        match generate(entity, out_dir, config, format, &mut report) {
            Ok(slug) => report.succeeded.push(slug),
            Err(err) => report.failed.push((entity.name.clone(), err)),
        }
    }
    report
}

fn generate(
    entity: &EntityDescription,
    out_dir: &Path,
    config: &Config,
    format: ArtifactFormat,
    report: &mut BatchReport,
) -> Result<String, DiagramError> {
    let geometry = compute_layout(entity, &config.theme, &config.layout);
    for warning in &geometry.warnings {
        report
            .warnings
            .push((entity.name.clone(), warning.to_string()));
    }

    let svg = render_svg(&geometry, &config.theme)?;
    let bytes = match format {
        ArtifactFormat::Svg => svg.into_bytes(),
        #[cfg(feature = "png")]
        ArtifactFormat::Png => crate::render::rasterize_png(&svg, &config.theme)?,
    };

    let slug = artifact_slug(&entity.name);
    let path = out_dir.join(format!("{slug}.{}", format.extension()));
    write_atomic(&path, &bytes).map_err(|source| DiagramError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(slug)
}

// Write to a temp sibling then rename, so a failed entity never leaves a
// partial artifact under its final name.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    if let Err(err) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}
