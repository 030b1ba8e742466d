// src/lib.rs

pub mod api;
pub mod category;
pub mod config;
pub mod converter;
pub mod easyeda_models;
pub mod error;
pub mod file_writer;
pub mod footprint_mapper;
pub mod importer;
pub mod kicad_models;
pub mod svg_arc;
pub mod svg_path;
pub mod units;
pub mod validation;

use crate::api::{EasyedaApi, normalize_lcsc_id};
use crate::category::{LibraryCategory, get_footprint_library_name};
use crate::config::{Config, MAX_BATCH};
use crate::converter::footprint::get_footprint;
use crate::converter::symbol::{convert_to_symbol_entry, library_category, symbol_name};
use crate::converter::{ConvertOptions, FootprintResult, sanitize_name};
use crate::easyeda_models::{ComponentData, PinCorrection};
use crate::error::{Error, Result};
use crate::file_writer::{KicadLibrary, SymbolWrite};
use crate::validation::{CompareOptions, FootprintComparisonResult, validate_footprint};
use log::{debug, error, info, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

/// Failures kept in a [`BatchSummary`]; the rest are only counted.
pub const MAX_REPORTED_FAILURES: usize = 5;

/// What one install wrote.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub symbol_name: String,
    pub category: LibraryCategory,
    pub symbol: SymbolWrite,
    /// `Library:Footprint` written into the symbol.
    pub footprint_ref: String,
    /// Set when a footprint was generated rather than referenced.
    pub footprint_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub lcsc_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchSummary {
    fn record_failure(&mut self, lcsc_id: &str, err: &Error) {
        error!("{}: {}", lcsc_id, err);
        self.failed += 1;
        if self.failures.len() < MAX_REPORTED_FAILURES {
            self.failures.push(BatchFailure {
                lcsc_id: lcsc_id.to_string(),
                error: err.to_string(),
            });
        }
    }
}

/// Converts one fetched component and writes it into the library.
///
/// The symbol is merged into its category library, replacing an older copy.
/// The footprint is written only when no built-in KiCad footprint fits.
pub fn install_component(
    lib: &KicadLibrary,
    component: &ComponentData,
    options: &ConvertOptions,
) -> Result<InstallOutcome> {
    lib.setup_directories()?;

    let footprint = get_footprint(component, &options.footprint);
    let footprint_ref = options
        .symbol
        .footprint_ref
        .clone()
        .unwrap_or_else(|| footprint.footprint_ref(get_footprint_library_name()));

    let mut symbol_options = options.symbol.clone();
    symbol_options.footprint_ref = Some(footprint_ref.clone());
    let category = library_category(&component.info);
    let name = symbol_name(component, &symbol_options);
    let entry = convert_to_symbol_entry(component, &symbol_options);
    let symbol = lib.install_symbol(category, &name, &entry)?;

    let footprint_path = match &footprint {
        FootprintResult::Generated { name, content } => Some(lib.write_footprint(name, content)?),
        FootprintResult::Reference { .. } => None,
    };

    info!(
        "Installed {} ({}) with footprint {}",
        name, category, footprint_ref
    );
    Ok(InstallOutcome {
        symbol_name: name,
        category,
        symbol,
        footprint_ref,
        footprint_path,
        model_path: None,
    })
}

/// Checks a generated footprint written by an install against the reference
/// SVG. Returns `None` when the install used a built-in footprint.
pub fn validate_installed_footprint(
    outcome: &InstallOutcome,
    reference_svg: &str,
    options: &CompareOptions,
) -> Result<Option<FootprintComparisonResult>> {
    let Some(path) = &outcome.footprint_path else {
        debug!("{} uses {}, nothing to validate", outcome.symbol_name, outcome.footprint_ref);
        return Ok(None);
    };
    let generated = fs::read_to_string(path)?;
    let result = validate_footprint(reference_svg, &generated, options);
    if result.passed {
        info!("{}: footprint matches the reference", outcome.symbol_name);
    } else {
        warn!(
            "{}: footprint differs from the reference ({} errors, {} warnings)",
            outcome.symbol_name, result.error_count, result.warning_count
        );
    }
    Ok(Some(result))
}

/// Fetches the STEP model for a generated footprint; failures only warn.
async fn download_model(
    api: &EasyedaApi,
    lib: &KicadLibrary,
    component: &ComponentData,
    outcome: &mut InstallOutcome,
) {
    if outcome.footprint_path.is_none() {
        return;
    }
    let Some(model) = component
        .model_3d
        .as_ref()
        .or(component.footprint.model_3d.as_ref())
    else {
        debug!("No 3D model for {}", component.info.name);
        return;
    };
    let written = match api.get_step_3d_model(&model.uuid).await {
        Ok(step) => lib.write_3d_model(&sanitize_name(&model.name), &step),
        Err(e) => Err(e),
    };
    match written {
        Ok(path) => outcome.model_path = Some(path),
        Err(e) => warn!("3D model {} not saved: {}", model.name, e),
    }
}

/// Fetches one component and installs it into `config.output_dir`.
pub async fn import_component(lcsc_id: &str, config: &Config) -> Result<InstallOutcome> {
    let api = EasyedaApi::new()?;
    let lib = KicadLibrary::new(&config.output_dir);
    info!("Fetching data for LCSC ID: {}", lcsc_id);
    let component = api.get_component_data(lcsc_id).await?;

    let mut outcome = install_component(&lib, &component, &config.convert)?;
    if config.download_3d_models && config.convert.footprint.include_3d_model {
        download_model(&api, &lib, &component, &mut outcome).await;
    }
    Ok(outcome)
}

/// Drops invalid and repeated ids and caps the batch at [`MAX_BATCH`].
fn batch_ids<S: AsRef<str>>(lcsc_ids: &[S], summary: &mut BatchSummary) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut accepted = Vec::new();
    for raw in lcsc_ids {
        let id = match normalize_lcsc_id(raw.as_ref()) {
            Ok(id) => id,
            Err(e) => {
                warn!("Skipping {}", e);
                summary.skipped += 1;
                continue;
            }
        };
        if !seen.insert(id.clone()) {
            debug!("Skipping duplicate {}", id);
            summary.skipped += 1;
        } else if accepted.len() >= MAX_BATCH {
            warn!("Batch limit of {} reached, skipping {}", MAX_BATCH, id);
            summary.skipped += 1;
        } else {
            accepted.push(id);
        }
    }
    accepted
}

/// Fetches up to [`MAX_BATCH`] components concurrently, then writes them one
/// by one so library files are never edited in parallel.
pub async fn install_batch<S: AsRef<str>>(lcsc_ids: &[S], config: &Config) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let ids = batch_ids(lcsc_ids, &mut summary);
    if ids.is_empty() {
        return Ok(summary);
    }

    let api = EasyedaApi::new()?;
    let lib = KicadLibrary::new(&config.output_dir);
    let semaphore = Arc::new(Semaphore::new(config.parallel.clamp(1, MAX_BATCH)));
    let mut join_set = JoinSet::new();
    let mut labels = HashMap::new();
    let total = ids.len();

    for (index, lcsc_id) in ids.into_iter().enumerate() {
        let sem = semaphore.clone();
        let api = api.clone();
        let label = lcsc_id.clone();
        let handle = join_set.spawn(async move {
            let _permit = sem.acquire().await.ok();
            info!("[{}/{}] Fetching {}", index + 1, total, lcsc_id);
            let fetched = api.get_component_data(&lcsc_id).await;
            (index, lcsc_id, fetched)
        });
        labels.insert(handle.id(), label);
    }

    let mut fetched = join_labeled(join_set, &labels, &mut summary).await;
    fetched.sort_by_key(|(index, _, _)| *index);

    for (_, lcsc_id, component) in fetched {
        let installed = component.and_then(|component| {
            install_component(&lib, &component, &config.convert).map(|outcome| (component, outcome))
        });
        match installed {
            Ok((component, mut outcome)) => {
                if config.download_3d_models && config.convert.footprint.include_3d_model {
                    download_model(&api, &lib, &component, &mut outcome).await;
                }
                summary.success += 1;
            }
            Err(e) => summary.record_failure(&lcsc_id, &e),
        }
    }

    info!(
        "Batch done: {} installed, {} failed, {} skipped",
        summary.success, summary.failed, summary.skipped
    );
    Ok(summary)
}

/// Waits for every task; a task that panicked is recorded under its label.
async fn join_labeled<T: 'static>(
    mut join_set: JoinSet<T>,
    labels: &HashMap<task::Id, String>,
    summary: &mut BatchSummary,
) -> Vec<T> {
    let mut done = Vec::with_capacity(labels.len());
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(item) => done.push(item),
            Err(e) => {
                let label = labels
                    .get(&e.id())
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                summary.record_failure(&label, &Error::from(e));
            }
        }
    }
    done
}

/// Re-converts already fetched components, reporting `(done, total, name)` after each.
pub fn regenerate(
    components: &[ComponentData],
    lib: &KicadLibrary,
    options: &ConvertOptions,
    mut progress: impl FnMut(usize, usize, &str),
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let total = components.len();
    for (index, component) in components.iter().enumerate() {
        let label = component
            .info
            .lcsc_id
            .clone()
            .unwrap_or_else(|| component.info.name.clone());
        match install_component(lib, component, options) {
            Ok(_) => summary.success += 1,
            Err(e) => summary.record_failure(&label, &e),
        }
        progress(index + 1, total, &label);
    }
    summary
}

/// Applies pin corrections and re-installs the symbol in place.
///
/// Returns how many pins were changed along with the install outcome.
pub fn fix_pins(
    lib: &KicadLibrary,
    component: &mut ComponentData,
    corrections: &[PinCorrection],
    options: &ConvertOptions,
) -> Result<(usize, InstallOutcome)> {
    let touched = component.symbol.apply_pin_corrections(corrections);
    if touched == 0 {
        warn!("No pins of {} matched the corrections", component.info.name);
    }
    let outcome = install_component(lib, component, options)?;
    Ok((touched, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicked_fetch_is_reported_by_id() {
        let mut join_set = JoinSet::new();
        let mut labels = HashMap::new();
        let ok = join_set.spawn(async { 1 });
        labels.insert(ok.id(), "C1".to_string());
        let bad = join_set.spawn(async {
            if true {
                panic!("decoder blew up");
            }
            2
        });
        labels.insert(bad.id(), "C2".to_string());

        let mut summary = BatchSummary::default();
        let done = join_labeled(join_set, &labels, &mut summary).await;
        assert_eq!(done, vec![1]);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].lcsc_id, "C2");
        assert!(summary.failures[0].error.contains("task"));
    }
}
