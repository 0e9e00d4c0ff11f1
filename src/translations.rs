//! UI translation bundles
//!
//! Every row of `Page_Translations` becomes one
//! `translations/<BrowserMatch>/translations.json`: the static entries keyed
//! by `Req`, followed by the dynamic entries keyed by `Category` + `Field`.

use crate::db::Database;
use crate::error::Result;
use crate::types::{DynamicTranslationRow, StaticTranslationRow};
use crate::utils::{to_pretty_json, write_atomic_async};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A written translation bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationBundle {
    /// Translation name, e.g. "English"
    pub name: String,
    /// Browser language tag, the bundle directory name
    pub browser_match: String,
    /// Whether the translation is offered on the site
    pub active: bool,
    /// Number of keys in the bundle
    pub entries: usize,
    /// Written file
    pub path: PathBuf,
}

/// Merge static and dynamic entries into one ordered map
///
/// Static entries come first in the given order; a dynamic key equal to an
/// earlier key replaces its value in place.
pub fn build_bundle(
    statics: &[StaticTranslationRow],
    dynamics: &[DynamicTranslationRow],
) -> Map<String, Value> {
    let mut bundle = Map::new();
    for row in statics {
        bundle.insert(row.req.clone(), Value::String(row.trans.clone()));
    }
    for row in dynamics {
        bundle.insert(row.key(), Value::String(row.trans.clone()));
    }
    bundle
}

/// Write one bundle per translation below `translations_dir`
pub async fn write_translations(
    db: &Database,
    translations_dir: &Path,
) -> Result<Vec<TranslationBundle>> {
    let mut written = Vec::new();

    for translation in db.translations().await? {
        let statics = db.static_translations(translation.translation_id).await?;
        let dynamics = db.dynamic_translations(translation.translation_id).await?;
        let bundle = build_bundle(&statics, &dynamics);

        let path = translations_dir
            .join(&translation.browser_match)
            .join("translations.json");
        write_atomic_async(&path, to_pretty_json(&bundle)?).await?;

        debug!(
            name = %translation.translation_name,
            active = translation.active,
            statics = statics.len(),
            dynamics = dynamics.len(),
            ?path,
            "wrote translation bundle"
        );

        written.push(TranslationBundle {
            name: translation.translation_name,
            browser_match: translation.browser_match,
            active: translation.active,
            entries: bundle.len(),
            path,
        });
    }

    info!(bundles = written.len(), "wrote translation bundles");
    Ok(written)
}
