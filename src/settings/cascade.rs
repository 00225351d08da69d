//! Top-down re-validation of dependent units
//!
//! A child's cache directory lives inside its parent's, so a parent that
//! moves to a new directory drags every child along even when the child's
//! own options are untouched. Re-validation always runs parent first, then
//! children in declaration order.

use crate::error::{BenchError, BenchResult};
use crate::settings::unit::Unit;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rebase each child onto the parent's current cache directory and update it.
///
/// Returns one `changed` flag per child, in order.
pub async fn revalidate_children(
    parent: &dyn Unit,
    children: &mut [&mut dyn Unit],
) -> BenchResult<Vec<bool>> {
    let parent_dir = parent.cache_directory().ok_or_else(|| {
        BenchError::Internal(format!(
            "{} must be updated before its children",
            parent.name()
        ))
    })?;

    let mut changes = Vec::with_capacity(children.len());
    for child in children.iter_mut() {
        changes.push(rebase_and_update(&mut **child, parent_dir).await?);
    }
    Ok(changes)
}

/// Re-validate a parent-to-child chain, root first.
///
/// Every unit is updated each cycle; a parent shift is detected from the
/// changed path alone.
pub async fn revalidate(chain: &mut [&mut dyn Unit]) -> BenchResult<Vec<bool>> {
    revalidate_observed(chain, &mut |_, _| {}).await
}

/// Like [`revalidate`], calling `observe(name, changed)` after each unit
pub async fn revalidate_observed(
    chain: &mut [&mut dyn Unit],
    observe: &mut (dyn FnMut(&'static str, bool) + Send),
) -> BenchResult<Vec<bool>> {
    let mut changes = Vec::with_capacity(chain.len());

    let Some((root, rest)) = chain.split_first_mut() else {
        return Ok(changes);
    };
    let changed = root.update().await?;
    observe(root.name(), changed);
    changes.push(changed);

    let mut parent_dir = directory_of(&**root)?;
    for child in rest.iter_mut() {
        let changed = rebase_and_update(&mut **child, &parent_dir).await?;
        observe(child.name(), changed);
        changes.push(changed);
        parent_dir = directory_of(&**child)?;
    }

    Ok(changes)
}

fn directory_of(unit: &dyn Unit) -> BenchResult<PathBuf> {
    unit.cache_directory()
        .map(Path::to_path_buf)
        .ok_or_else(|| BenchError::Internal(format!("{} has no cache directory", unit.name())))
}

async fn rebase_and_update(child: &mut dyn Unit, parent_dir: &Path) -> BenchResult<bool> {
    if child.rebase(parent_dir) {
        debug!("{} invalidated by parent directory change", child.name());
    }
    child.update().await
}
