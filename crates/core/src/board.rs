//! Canonical identity of a build target: either a named ChromeOS board or
//! the developer's own machine ("host"). Board names are interned so the
//! type is cheap to clone and safe as a map/set key; construction goes
//! through [`BoardOrHost::parse`] or [`BoardOrHost::board`] only.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{CoreError, Result};

/// Literal recognized by [`BoardOrHost::parse`] as the host target.
pub const HOST_LITERAL: &str = "host";

/// SDK board name the host target maps to in Portage tooling.
const HOST_SDK_NAME: &str = "amd64-host";

static BOARD_NAMES: Lazy<DashMap<String, Arc<str>>> = Lazy::new(DashMap::new);

fn intern(name: &str) -> Arc<str> {
    if let Some(existing) = BOARD_NAMES.get(name) {
        return existing.clone();
    }
    let interned: Arc<str> = Arc::from(name);
    BOARD_NAMES.insert(name.to_string(), interned.clone());
    interned
}

/// An interned board name. Has no public constructor; values exist only
/// inside [`BoardOrHost::Board`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardName(Arc<str>);

impl BoardName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardOrHost {
    Host,
    Board(BoardName),
}

impl BoardOrHost {
    /// Two-sided inverse of `Display`: `parse(x).to_string() == x`.
    pub fn parse(s: &str) -> Self {
        if s == HOST_LITERAL {
            BoardOrHost::Host
        } else {
            BoardOrHost::Board(BoardName(intern(s)))
        }
    }

    /// Constructs a board target. Rejects the reserved host literal; that
    /// path is reachable only through internal misuse, never via `parse`.
    pub fn board(name: &str) -> Result<Self> {
        if name == HOST_LITERAL {
            return Err(CoreError::InvalidBoardName(name.to_string()));
        }
        Ok(BoardOrHost::Board(BoardName(intern(name))))
    }

    /// The single dispatch primitive over the two variants. Every derived
    /// accessor below is a one-line `map` call; variant conditionals do
    /// not appear anywhere else.
    pub fn map<'a, T>(&'a self, on_board: impl FnOnce(&'a str) -> T, host: T) -> T {
        match self {
            BoardOrHost::Board(name) => on_board(name.as_str()),
            BoardOrHost::Host => host,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, BoardOrHost::Host)
    }

    /// The Portage-visible board name; the host builds against the SDK.
    pub fn to_board_name(&self) -> &str {
        self.map(|name| name, HOST_SDK_NAME)
    }

    /// Root filesystem holding this target's headers and libraries.
    pub fn sysroot(&self) -> PathBuf {
        self.map(|name| PathBuf::from(format!("/build/{name}")), PathBuf::from("/"))
    }

    /// Board-specific toolchain wrappers are suffixed with the board name
    /// (`emerge-kevin`); host tools are unsuffixed.
    pub fn suffixed_executable(&self, tool: &str) -> String {
        self.map(|name| format!("{tool}-{name}"), tool.to_string())
    }
}

impl fmt::Display for BoardOrHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardOrHost::Host => f.write_str(HOST_LITERAL),
            BoardOrHost::Board(name) => f.write_str(name.as_str()),
        }
    }
}

impl FromStr for BoardOrHost {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(BoardOrHost::parse(s))
    }
}
