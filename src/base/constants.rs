//! Domain constants shared across the compiler.

/// Extension of ArchML source files (without the leading dot).
pub const SOURCE_EXT: &str = "archml";

/// Extension of compiled artifacts inside the build directory.
///
/// Distinct from [`SOURCE_EXT`] so source scans never pick up build output.
pub const ARTIFACT_EXT: &str = "json";

/// Schema version written into every artifact document.
pub const ARTIFACT_FORMAT_VERSION: &str = "1";

/// Import-map key of the workspace root, used for bare imports.
pub const ROOT_IMPORT_KEY: &str = "";

/// Prefix marking a remote-repository import path segment (`@repo`).
pub const REMOTE_PREFIX: char = '@';

/// Separator between segments of a logical import path.
pub const PATH_SEPARATOR: char = '/';

/// Separator between the segments of a qualified entity name.
pub const QUALIFIED_SEPARATOR: &str = "::";

/// File name of the workspace configuration file.
pub const WORKSPACE_CONFIG_FILE: &str = ".archml-workspace.yaml";
