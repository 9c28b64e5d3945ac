//! Document links: `inherit` names jump to the eclass file, and the last
//! `CROS_WORKON_LOCALNAME` assignment jumps to the source directories it
//! names.

use crosscope_core::parser::parse_ebuild;
use crosscope_core::resolver;
use std::path::Path;
use tower_lsp::lsp_types::{DocumentLink, Url};

use crate::util;

pub fn document_links(content: &str, ebuild_path: &Path, checkout: &Path) -> Vec<DocumentLink> {
    let parsed = match parse_ebuild(content) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::trace!(%err, "skipping links on unparsable document");
            return Vec::new();
        }
    };

    let mut links = Vec::new();

    for inherit in &parsed.inherits {
        let Some(target) = resolver::resolve_eclass(checkout, &inherit.name) else {
            continue;
        };
        if let Ok(uri) = Url::from_file_path(&target) {
            links.push(DocumentLink {
                range: util::to_lsp_range(content, inherit.range),
                target: Some(uri),
                tooltip: Some(target.display().to_string()),
                data: None,
            });
        }
    }

    // Only the last assignment matters: it is the one Portage observes.
    if let Some(assignment) = parsed.last_assignment("CROS_WORKON_LOCALNAME") {
        let category = resolver::ebuild_category(ebuild_path).unwrap_or("chromeos-base");
        for value in assignment.value.strings() {
            let dir = resolver::localname_source_dir(checkout, category, &value.value);
            if !dir.is_dir() {
                continue;
            }
            if let Ok(uri) = Url::from_file_path(&dir) {
                links.push(DocumentLink {
                    range: util::to_lsp_range(content, value.range),
                    target: Some(uri),
                    tooltip: Some(dir.display().to_string()),
                    data: None,
                });
            }
        }
    }

    links
}
