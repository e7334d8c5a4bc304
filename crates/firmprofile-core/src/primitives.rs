//! # Fixed Conventions
//!
//! Hardcoded naming and layout constants for a profile build.
//!
//! These are compiled into the binary and are immutable at runtime. Every
//! derived path and every naming decision in the crate is a function of the
//! values below.
//!
//! ## Conventions
//!
//! 1. **Naming Convention**: `Manufacturer-Name_Model-and-device-description`
//! 2. **Layout Convention**: `<parent>/<base>/<base><suffix>`
//! 3. **Exit Convention**: one status per failure class

// =============================================================================
// NAMING CONVENTION
// =============================================================================

/// The single character separating manufacturer from model in a base name.
///
/// A valid base name contains this character exactly once.
pub const SEPARATOR: char = '_';

/// Literal spaces are never allowed in a base name.
///
/// Spaces are written as dashes; a literal dash is written as `---`.
pub const FORBIDDEN_SPACE: char = ' ';

/// Escape sequence for a literal dash inside a manufacturer or model name.
///
/// Documented to the user only; never decoded.
pub const ESCAPED_DASH: &str = "---";

/// Extension stripped from the firmware file name to obtain the base name.
pub const FIRMWARE_EXTENSION: &str = ".bin";

/// Human-readable filename instructions, one line per rule.
pub const FILENAME_INSTRUCTIONS: [&str; 3] = [
    "Encrypted bin name must be in the pattern of Manufacturer-Name_Model-and-device-description",
    "Use dashes in places of spaces, and if a dash (-) is present, replace it with 3 dashes (---)",
    "There should only be 1 underscore in the filename, separating manufacturer name and model description",
];

// =============================================================================
// LAYOUT CONVENTION
// =============================================================================

/// Suffix of the parsed storage-partition file.
pub const STORAGE_SUFFIX: &str = "_storage.json";

/// Suffix of the decrypted application-partition image.
pub const APP_SUFFIX: &str = "_app_1.00_decrypted.bin";

/// Suffix of the file written by schema resolution when a schema is found.
pub const SCHEMA_ID_SUFFIX: &str = "_schema_id.txt";

// =============================================================================
// EXIT CONVENTION
// =============================================================================

/// Successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Missing required argument, usage error, or schema confirmed missing.
pub const EXIT_USAGE_OR_SCHEMA_MISSING: i32 = 1;

/// Base name violates the naming convention.
pub const EXIT_NAMING_VIOLATION: i32 = 2;

/// A stage signalled failure.
pub const EXIT_STAGE_FAILURE: i32 = 3;

/// Stage configuration could not be loaded.
pub const EXIT_CONFIG_ERROR: i32 = 4;
