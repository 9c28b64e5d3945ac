//! Filesystem lookups around a ChromeOS checkout: eclass resolution,
//! checkout-root discovery, and cros-workon source-directory mapping.
//! Everything here re-stats on each call; these run on interactive hover
//! and link requests, not in hot loops.

use std::path::{Path, PathBuf};

/// Overlays that may provide eclasses, in search order.
const ECLASS_OVERLAY_DIRS: &[&str] = &[
    "src/third_party/chromiumos-overlay/eclass",
    "src/third_party/portage-stable/eclass",
    "src/third_party/eclass-overlay/eclass",
];

/// First overlay containing `<name>.eclass`, or `None`.
pub fn resolve_eclass(checkout_root: &Path, name: &str) -> Option<PathBuf> {
    for dir in ECLASS_OVERLAY_DIRS {
        let candidate = checkout_root.join(dir).join(format!("{name}.eclass"));
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    tracing::debug!(name, "eclass not found in any overlay");
    None
}

/// Nearest ancestor of `start` containing a `.repo` directory, i.e. the
/// root of a repo-managed ChromeOS checkout.
pub fn find_checkout_root(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_dir() { start } else { start.parent()? };
    loop {
        if dir.join(".repo").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// Whether the checkout has an entered SDK chroot.
pub fn chroot_exists(checkout_root: &Path) -> bool {
    checkout_root.join("chroot").is_dir()
}

/// Category of an ebuild, taken from its path:
/// `<overlay>/<category>/<package>/<package>-<version>.ebuild`.
pub fn ebuild_category(ebuild_path: &Path) -> Option<&str> {
    ebuild_path.parent()?.parent()?.file_name()?.to_str()
}

/// Source directory a `CROS_WORKON_LOCALNAME` value points at. Localnames
/// are relative to `src/` for chromeos-base packages and to
/// `src/third_party/` for everything else.
pub fn localname_source_dir(checkout_root: &Path, category: &str, localname: &str) -> PathBuf {
    let base = if category == "chromeos-base" {
        checkout_root.join("src")
    } else {
        checkout_root.join("src/third_party")
    };
    base.join(localname)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn eclass_overlay_order() {
        let root = tempfile::tempdir().unwrap();
        let primary = root.path().join("src/third_party/chromiumos-overlay/eclass");
        let fallback = root.path().join("src/third_party/portage-stable/eclass");
        fs::create_dir_all(&primary).unwrap();
        fs::create_dir_all(&fallback).unwrap();
        fs::write(primary.join("cros-workon.eclass"), "").unwrap();
        fs::write(fallback.join("cros-workon.eclass"), "").unwrap();
        fs::write(fallback.join("toolchain-funcs.eclass"), "").unwrap();

        assert_eq!(
            resolve_eclass(root.path(), "cros-workon"),
            Some(primary.join("cros-workon.eclass"))
        );
        assert_eq!(
            resolve_eclass(root.path(), "toolchain-funcs"),
            Some(fallback.join("toolchain-funcs.eclass"))
        );
        assert_eq!(resolve_eclass(root.path(), "missing"), None);
    }

    #[test]
    fn checkout_root_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let checkout = root.path().join("chromiumos");
        let nested = checkout.join("src/third_party/chromiumos-overlay/chromeos-base/shill");
        fs::create_dir_all(checkout.join(".repo")).unwrap();
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_checkout_root(&nested), Some(checkout.clone()));
        assert_eq!(
            find_checkout_root(&nested.join("shill-9999.ebuild")),
            Some(checkout)
        );
        assert_eq!(find_checkout_root(root.path()), None);
    }

    #[test]
    fn category_from_ebuild_path() {
        let path = Path::new(
            "/cros/src/third_party/chromiumos-overlay/chromeos-base/shill/shill-9999.ebuild",
        );
        assert_eq!(ebuild_category(path), Some("chromeos-base"));
    }

    #[test]
    fn localname_base_depends_on_category() {
        let checkout = Path::new("/cros");
        assert_eq!(
            localname_source_dir(checkout, "chromeos-base", "platform2"),
            PathBuf::from("/cros/src/platform2")
        );
        assert_eq!(
            localname_source_dir(checkout, "dev-util", "hdctools"),
            PathBuf::from("/cros/src/third_party/hdctools")
        );
    }
}
