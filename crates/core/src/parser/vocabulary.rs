//! Static documentation for the ebuild variables and phase functions the
//! hover provider knows about. Lookup only; none of this participates in
//! parsing.

/// One documented name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDoc {
    pub name: &'static str,
    pub doc: &'static str,
}

/// Read-only variables Portage defines for every ebuild.
pub const PREDEFINED_VARIABLES: &[VariableDoc] = &[
    VariableDoc { name: "P", doc: "Package name and version, without the revision: `${PN}-${PV}`." },
    VariableDoc { name: "PN", doc: "Package name, e.g. `shill`." },
    VariableDoc { name: "PV", doc: "Package version, e.g. `0.0.1`." },
    VariableDoc { name: "PR", doc: "Package revision, e.g. `r42`, or `r0` if none is set." },
    VariableDoc { name: "PVR", doc: "Package version and revision: `${PV}-${PR}`." },
    VariableDoc { name: "PF", doc: "Full package name: `${PN}-${PVR}`." },
    VariableDoc { name: "CATEGORY", doc: "Package category, e.g. `chromeos-base`." },
    VariableDoc { name: "A", doc: "All source files (`SRC_URI` basenames) for the package, whitespace separated." },
    VariableDoc { name: "FILESDIR", doc: "Path to the package's `files/` directory, for small support files and patches." },
    VariableDoc { name: "DISTDIR", doc: "Path to the directory with fetched source files." },
    VariableDoc { name: "WORKDIR", doc: "Path to the ebuild's root build directory." },
    VariableDoc { name: "S", doc: "Path to the temporary build directory, `${WORKDIR}/${P}` by default." },
    VariableDoc { name: "T", doc: "Path to a temporary directory that survives across phases." },
    VariableDoc { name: "D", doc: "Path to the temporary install directory populated by `src_install`." },
    VariableDoc { name: "ROOT", doc: "Absolute path to the root directory into which the package is merged." },
    VariableDoc { name: "SYSROOT", doc: "Path to the root of the build-time dependency tree." },
    VariableDoc { name: "EPREFIX", doc: "Offset prefix of the installation, normally empty." },
    VariableDoc { name: "ED", doc: "Shorthand for `${D%/}${EPREFIX}/`." },
    VariableDoc { name: "EROOT", doc: "Shorthand for `${ROOT%/}${EPREFIX}/`." },
];

/// Variables an ebuild itself is expected to define.
pub const EBUILD_DEFINED_VARIABLES: &[VariableDoc] = &[
    VariableDoc { name: "EAPI", doc: "Ebuild API version this ebuild is written against." },
    VariableDoc { name: "DESCRIPTION", doc: "Short, one-line description of the package." },
    VariableDoc { name: "HOMEPAGE", doc: "Upstream homepage URL(s), whitespace separated." },
    VariableDoc { name: "SRC_URI", doc: "Source file URIs to fetch before building." },
    VariableDoc { name: "LICENSE", doc: "License expression covering the package." },
    VariableDoc { name: "SLOT", doc: "Slot this package installs into; `0` when slots are unused." },
    VariableDoc { name: "KEYWORDS", doc: "Architectures the ebuild is known to work on, with stability markers." },
    VariableDoc { name: "IUSE", doc: "USE flags the ebuild honors, with optional `+`/`-` defaults." },
    VariableDoc { name: "REQUIRED_USE", doc: "Constraints between USE flags that must hold for the package to build." },
    VariableDoc { name: "RESTRICT", doc: "Portage features to disable for this package, e.g. `mirror` or `test`." },
    VariableDoc { name: "PROPERTIES", doc: "Properties of the package, e.g. `live` for VCS checkouts." },
    VariableDoc { name: "DEPEND", doc: "Build-time dependencies present in `SYSROOT`." },
    VariableDoc { name: "RDEPEND", doc: "Runtime dependencies present in `ROOT`." },
    VariableDoc { name: "BDEPEND", doc: "Build-host dependencies executed during the build (EAPI 7+)." },
    VariableDoc { name: "PDEPEND", doc: "Dependencies merged after the package itself." },
    VariableDoc { name: "DOCS", doc: "Documentation files installed by the default `src_install`." },
    VariableDoc { name: "PATCHES", doc: "Patch files applied by the default `src_prepare`." },
    VariableDoc {
        name: "CROS_WORKON_LOCALNAME",
        doc: "Source directory (or array of directories) the cros-workon package builds from, \
              relative to `src/` for chromeos-base packages and `src/third_party/` otherwise.",
    },
    VariableDoc {
        name: "CROS_WORKON_PROJECT",
        doc: "Git project name (or array of names) on the manifest server that provides the sources.",
    },
    VariableDoc {
        name: "CROS_WORKON_SUBTREE",
        doc: "Subtrees of the source checkout the package actually consumes, used to scope rebuilds.",
    },
    VariableDoc {
        name: "CROS_WORKON_DESTDIR",
        doc: "Destination directory (or array) under `${S}` each project is copied to.",
    },
    VariableDoc {
        name: "CROS_WORKON_INCREMENTAL_BUILD",
        doc: "When set to 1, keeps build artifacts between emerges for faster incremental builds.",
    },
    VariableDoc {
        name: "CROS_WORKON_MANUAL_UPREV",
        doc: "When set to 1, the package is not uprevved automatically by the annealing builders.",
    },
    VariableDoc {
        name: "CROS_WORKON_OUTOFTREE_BUILD",
        doc: "When set to 1, builds directly from the source checkout instead of copying into `${WORKDIR}`.",
    },
];

/// Phase functions an ebuild may override, in execution order.
pub const PHASE_FUNCTIONS: &[VariableDoc] = &[
    VariableDoc { name: "pkg_pretend", doc: "Runs sanity checks before any sources are fetched." },
    VariableDoc { name: "pkg_nofetch", doc: "Tells the user how to obtain sources that cannot be fetched automatically." },
    VariableDoc { name: "pkg_setup", doc: "Per-package environment setup; runs before the source phases." },
    VariableDoc { name: "src_unpack", doc: "Unpacks (or checks out) the package sources into `${WORKDIR}`." },
    VariableDoc { name: "src_prepare", doc: "Applies patches and other source preparation in `${S}`." },
    VariableDoc { name: "src_configure", doc: "Configures the build, e.g. running `econf` or `gn gen`." },
    VariableDoc { name: "src_compile", doc: "Compiles the package." },
    VariableDoc { name: "src_test", doc: "Runs the package's tests; skipped unless the `test` feature is enabled." },
    VariableDoc { name: "src_install", doc: "Installs the build products into the staging directory `${D}`." },
    VariableDoc { name: "pkg_preinst", doc: "Runs right before the image is merged into the live filesystem." },
    VariableDoc { name: "pkg_postinst", doc: "Runs after the image has been merged." },
    VariableDoc { name: "pkg_prerm", doc: "Runs before the package is unmerged." },
    VariableDoc { name: "pkg_postrm", doc: "Runs after the package has been unmerged." },
    VariableDoc { name: "pkg_config", doc: "Runs any special post-install configuration requested via `emerge --config`." },
    VariableDoc { name: "pkg_info", doc: "Prints package-specific information on `emerge --info`." },
];

/// Documentation for a variable name, checking predefined variables first.
pub fn variable_doc(name: &str) -> Option<&'static VariableDoc> {
    PREDEFINED_VARIABLES
        .iter()
        .chain(EBUILD_DEFINED_VARIABLES)
        .find(|v| v.name == name)
}

pub fn phase_doc(name: &str) -> Option<&'static VariableDoc> {
    PHASE_FUNCTIONS.iter().find(|v| v.name == name)
}
