//! Shared helpers used by the binaries of the workspace.

pub mod utils {
    pub mod logging;
}
