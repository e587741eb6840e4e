use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A build context a unit's documentation or symbols were computed for.
///
/// Documentation and the exported-symbol set can differ between platforms,
/// so both are recorded per build context. `All` marks content that is
/// identical across every platform (the common case).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildContext {
    #[display("all")]
    All,
    #[display("linux/amd64")]
    LinuxAmd64,
    #[display("darwin/amd64")]
    DarwinAmd64,
    #[display("windows/amd64")]
    WindowsAmd64,
    #[display("js/wasm")]
    JsWasm,
}

/// Failed to parse a [`BuildContext`] from its string form.
#[derive(Debug, Display, Error, PartialEq, Eq)]
#[display("unrecognized build context: {_0:?}")]
pub struct ParseBuildContextError(#[error(not(source))] pub String);

impl FromStr for BuildContext {
    type Err = ParseBuildContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "linux/amd64" => Ok(Self::LinuxAmd64),
            "darwin/amd64" => Ok(Self::DarwinAmd64),
            "windows/amd64" => Ok(Self::WindowsAmd64),
            "js/wasm" => Ok(Self::JsWasm),
            other => Err(ParseBuildContextError(other.to_string())),
        }
    }
}
