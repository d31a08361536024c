//! Import commands

use std::path::Path;

use anyhow::{Context as _, Result};
use connecta_forms::BatchImporter;

use super::Context;
use crate::output;

pub async fn handle(context: &Context, file: &Path, batch_size: Option<usize>) -> Result<()> {
    let batch_size = batch_size.unwrap_or(context.config.forms.import_batch_size);
    let importer = BatchImporter::new(context.store()?, batch_size);
    let report = importer
        .import_file(file)
        .await
        .with_context(|| format!("Import of {} failed", file.display()))?;

    context.format.print(&report);
    if report.batches_failed == 0 {
        output::success(&format!("{} records created from {} rows", report.created, report.rows));
    }
    Ok(())
}
