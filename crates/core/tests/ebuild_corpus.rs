//! End-to-end parse of a realistic cros-workon ebuild, checking that every
//! recorded range slices back to exactly the literal text it consumed.

use crosscope_core::parser::{parse_ebuild, EbuildValue};
use crosscope_core::source::{Position, Range};

const SHILL_EBUILD: &str = r#"# Copyright 2021 The ChromiumOS Authors
# Distributed under the terms of the GNU General Public License v2

EAPI=7

CROS_WORKON_PROJECT="chromiumos/platform2"
CROS_WORKON_LOCALNAME="platform2"
CROS_WORKON_SUBTREE=(
	"common-mk"
	"shill"
	".gn"
)
CROS_WORKON_INCREMENTAL_BUILD=1

inherit cros-workon platform

DESCRIPTION="Shill, the connection manager for ChromiumOS"
HOMEPAGE="https://chromium.googlesource.com/chromiumos/platform2/+/HEAD/shill/"

LICENSE="BSD-Google"
KEYWORDS="~*"
IUSE="fuzzer +vpn"

RDEPEND="
	chromeos-base/patchpanel-client
	net-dns/c-ares
"

src_configure() {
	platform_src_configure
}

src_install() {
	platform_src_install
	dobin "${OUT}/shill"
}
"#;

fn slice(text: &str, range: Range) -> String {
    let mut out = String::new();
    let mut line = 0u32;
    let mut character = 0u32;
    for c in text.chars() {
        if range.contains(Position::new(line, character)) {
            out.push(c);
        }
        if c == '\n' {
            line += 1;
            character = 0;
        } else {
            character += 1;
        }
    }
    out
}

#[test]
fn every_range_slices_back_to_its_literal() {
    let parsed = parse_ebuild(SHILL_EBUILD).unwrap();

    for assignment in &parsed.assignments {
        assert_eq!(
            slice(SHILL_EBUILD, assignment.name_range),
            assignment.name,
            "name range for {}",
            assignment.name
        );
        for s in assignment.value.strings() {
            assert_eq!(
                slice(SHILL_EBUILD, s.range),
                s.value,
                "value range under {}",
                assignment.name
            );
        }
    }

    for inherit in &parsed.inherits {
        assert_eq!(slice(SHILL_EBUILD, inherit.range), inherit.name);
    }
}

#[test]
fn recognizes_the_workon_variables() {
    let parsed = parse_ebuild(SHILL_EBUILD).unwrap();

    let names: Vec<&str> = parsed
        .assignments
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(
        names,
        [
            "EAPI",
            "CROS_WORKON_PROJECT",
            "CROS_WORKON_LOCALNAME",
            "CROS_WORKON_SUBTREE",
            "CROS_WORKON_INCREMENTAL_BUILD",
            "DESCRIPTION",
            "HOMEPAGE",
            "LICENSE",
            "KEYWORDS",
            "IUSE",
            "RDEPEND",
        ]
    );

    let subtree = parsed.last_assignment("CROS_WORKON_SUBTREE").unwrap();
    match &subtree.value {
        EbuildValue::Array { elements, .. } => {
            let values: Vec<&str> = elements.iter().map(|e| e.value.as_str()).collect();
            assert_eq!(values, ["common-mk", "shill", ".gn"]);
        }
        other => panic!("expected array, got {other:?}"),
    }

    let localname = parsed.last_assignment("CROS_WORKON_LOCALNAME").unwrap();
    assert_eq!(localname.value.strings()[0].value, "platform2");

    let inherits: Vec<&str> = parsed.inherits.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(inherits, ["cros-workon", "platform"]);
}

#[test]
fn phase_function_bodies_produce_no_assignments() {
    let parsed = parse_ebuild(SHILL_EBUILD).unwrap();
    assert!(parsed.last_assignment("platform_src_configure").is_none());
    assert!(parsed.last_assignment("dobin").is_none());
}
