pub mod pom;

pub use pom::{parse, parse_with, serialize};

/// Controls which manifest sections count as declared dependencies.
///
/// The default scope is the direct `<dependencies>` list only. Declarations
/// inside `<dependencyManagement>` pin versions without consuming a library,
/// and plugin-internal dependencies belong to the build tool, so both are
/// excluded unless opted in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Also treat `<dependencyManagement>` entries as declarations.
    pub include_management: bool,
}
