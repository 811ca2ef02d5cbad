//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use stackdep_core::{
    Capability, CapabilityIndex, DisabledComponentLedger, Inconsistency, MetadataSource,
    PassOutcome, ReconcileReport, Reconciler, ReconcilerOptions, Snapshot, StackCatalog,
    StackDefinition, StackDepError,
    primitives::MAX_SNAPSHOT_SIZE,
    snapshot_from_json, snapshot_to_json, stack_definition_from_json,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: usize) -> Result<(), StackDepError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| StackDepError::IoError(format!("Cannot read file metadata: {}", e)))?;

    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > max_size {
        return Err(StackDepError::PayloadTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Resolve symlinks and `..`, and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, StackDepError> {
    let canonical = path.canonicalize().map_err(|e| {
        StackDepError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(StackDepError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Require an existing parent directory for an output file.
fn validate_output_path(path: &Path) -> Result<PathBuf, StackDepError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        StackDepError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(StackDepError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| StackDepError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn read_input(path: &Path) -> Result<Vec<u8>, StackDepError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_SNAPSHOT_SIZE)?;
    std::fs::read(&validated)
        .map_err(|e| StackDepError::IoError(format!("Read '{}': {}", path.display(), e)))
}

// =============================================================================
// LOADING & SAVING
// =============================================================================

/// Read and decode a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, StackDepError> {
    tracing::debug!("Loading snapshot from {:?}", path);
    snapshot_from_json(&read_input(path)?)
}

/// Read and decode a stack definition file.
pub fn load_stack_definition(path: &Path) -> Result<StackDefinition, StackDepError> {
    tracing::debug!("Loading stack definition from {:?}", path);
    stack_definition_from_json(&read_input(path)?)
}

/// Encode and write a snapshot file.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), StackDepError> {
    let validated = validate_output_path(path)?;
    let bytes = snapshot_to_json(snapshot)?;
    std::fs::write(&validated, bytes)
        .map_err(|e| StackDepError::IoError(format!("Write '{}': {}", path.display(), e)))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), StackDepError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StackDepError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

fn join_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Summarize a snapshot.
pub fn cmd_status(
    snapshot_path: &Path,
    options: ReconcilerOptions,
    json_mode: bool,
) -> Result<(), StackDepError> {
    let reconciler = load_snapshot(snapshot_path)?.into_reconciler(options);
    let registries = reconciler.registries();
    let generation = reconciler.generation();
    let stack_version = reconciler
        .stack_version()
        .map(ToString::to_string)
        .unwrap_or_else(|| "(unset)".to_string());
    let category_count = registries.service_configs.categories().count();
    let files = registries.properties.files(generation);

    if json_mode {
        print_json(&serde_json::json!({
            "snapshot": snapshot_path.to_string_lossy(),
            "stack_version": stack_version,
            "generation": generation,
            "components": reconciler.metadata().components().len(),
            "services": registries.service_configs.len(),
            "categories": category_count,
            "global_properties": files.global_properties.len(),
            "site_properties": files.site_properties.len(),
            "review_components": registries.review_configs.component_count(),
            "disabled_components": reconciler.ledger().component_count(),
        }))?;
        return Ok(());
    }

    println!("Snapshot Status");
    println!("===============");
    println!("Snapshot:      {:?}", snapshot_path);
    println!("Stack:         {}", stack_version);
    println!("Generation:    {} ({})", generation, generation.require_prefix());
    println!();
    println!("Components:    {}", reconciler.metadata().components().len());
    println!("Services:      {}", registries.service_configs.len());
    println!("Categories:    {}", category_count);
    println!("Global Props:  {}", files.global_properties.len());
    println!("Site Props:    {}", files.site_properties.len());
    println!("Review Items:  {}", registries.review_configs.component_count());
    println!("Disabled:      {}", reconciler.ledger().component_count());

    Ok(())
}

// =============================================================================
// CAPABILITIES COMMAND
// =============================================================================

/// List components by capability.
pub fn cmd_capabilities(
    snapshot_path: &Path,
    capability: Option<&str>,
    json_mode: bool,
) -> Result<(), StackDepError> {
    let snapshot = load_snapshot(snapshot_path)?;
    let catalog = StackCatalog::from_components(snapshot.components);
    let index = CapabilityIndex::from_source(&catalog);

    match capability {
        Some(raw) => {
            let cap: Capability = raw.parse()?;
            let names = index.names(cap);
            if json_mode {
                print_json(&serde_json::json!({ cap.index_name(): names }))?;
            } else {
                println!("{}: {}", cap, join_or_dash(names));
            }
        }
        None => {
            if json_mode {
                print_json(&index)?;
            } else {
                println!("{:<24}{}", "all_components", join_or_dash(&index.all_components));
                for cap in Capability::ALL {
                    println!("{:<24}{}", cap.index_name(), join_or_dash(index.names(cap)));
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// RECONCILE COMMAND
// =============================================================================

/// Reconcile the snapshot, then apply each stack definition in order.
///
/// Returns one report per pass: the initial pass first.
pub fn cmd_reconcile(
    snapshot_path: &Path,
    stacks: &[PathBuf],
    output: Option<&Path>,
    options: ReconcilerOptions,
    json_mode: bool,
) -> Result<Vec<ReconcileReport>, StackDepError> {
    // Decode every input before touching any state
    let definitions = stacks
        .iter()
        .map(|path| load_stack_definition(path).map(|def| (path.clone(), def)))
        .collect::<Result<Vec<_>, _>>()?;
    let mut reconciler = load_snapshot(snapshot_path)?.into_reconciler(options);

    let mut passes: Vec<(String, ReconcileReport)> = Vec::with_capacity(definitions.len() + 1);
    passes.push(("initial".to_string(), reconciler.reconcile()));
    for (path, definition) in definitions {
        let report = reconciler.apply_stack(definition)?;
        passes.push((path.display().to_string(), report));
    }

    if let Some(out) = output {
        save_snapshot(&Snapshot::from_reconciler(&reconciler), out)?;
        tracing::info!("Snapshot written to {:?}", out);
    }

    if json_mode {
        let passes_json: Vec<_> = passes
            .iter()
            .map(|(source, report)| serde_json::json!({ "source": source, "report": report }))
            .collect();
        print_json(&serde_json::json!({
            "passes": passes_json,
            "ledger": reconciler.ledger(),
        }))?;
    } else {
        print_passes(&passes);
        print_ledger(reconciler.ledger());
    }

    Ok(passes.into_iter().map(|(_, report)| report).collect())
}

fn print_passes(passes: &[(String, ReconcileReport)]) {
    println!("Reconciliation");
    println!("==============");
    for (number, (source, report)) in passes.iter().enumerate() {
        let outcome = match report.outcome {
            PassOutcome::Applied => "applied".to_string(),
            PassOutcome::Skipped(reason) => format!("skipped ({:?})", reason),
        };
        println!();
        println!(
            "Pass {} [{}] generation={} {}",
            number + 1,
            source,
            report.generation,
            outcome
        );
        println!("  Disabled: {}", join_or_dash(&report.disabled));
        println!("  Enabled:  {}", join_or_dash(&report.enabled));
        println!("  Ledger:   {} entries", report.ledger_size);
    }
}

fn print_ledger(ledger: &DisabledComponentLedger) {
    println!();
    if ledger.is_empty() {
        println!("No disabled components");
        return;
    }

    println!("Disabled Components");
    println!("-------------------");
    for entry in ledger.entries() {
        let category = entry
            .config_category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        println!(
            "  {} ({}) category={} properties={} review={} from={}",
            entry.component_name,
            entry.service_name,
            category,
            entry.properties.len(),
            if entry.review_config.is_some() { "yes" } else { "no" },
            entry.captured_from
        );
    }
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Reconcile once, then check the result for referential problems.
///
/// Fails with `StackDepError::Inconsistent` when anything is found.
pub fn cmd_check(
    snapshot_path: &Path,
    options: ReconcilerOptions,
    json_mode: bool,
) -> Result<(), StackDepError> {
    let findings = check_snapshot(load_snapshot(snapshot_path)?, options);

    if json_mode {
        print_json(&serde_json::json!({ "findings": findings }))?;
    } else if findings.is_empty() {
        println!("No consistency problems found");
    } else {
        for finding in &findings {
            println!("  {}", finding);
        }
    }

    if findings.is_empty() {
        Ok(())
    } else {
        Err(StackDepError::Inconsistent {
            count: findings.len(),
        })
    }
}

/// Findings for a snapshot after one reconciliation pass.
pub fn check_snapshot(snapshot: Snapshot, options: ReconcilerOptions) -> Vec<Inconsistency> {
    let mut reconciler: Reconciler<StackCatalog> = snapshot.into_reconciler(options);
    reconciler.reconcile();
    reconciler.check()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn print_json_reports_serialization_failure() {
        // JSON object keys must be strings
        let mut unencodable = BTreeMap::new();
        unencodable.insert((1u8, 2u8), "value");

        let result = print_json(&unencodable);
        assert!(matches!(result, Err(StackDepError::SerializationError(_))));
    }

    #[test]
    fn print_json_accepts_plain_values() {
        assert!(print_json(&serde_json::json!({ "findings": [] })).is_ok());
    }
}
