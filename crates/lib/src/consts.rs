//! Shared constants.

/// Suffix marking a project as a test executable. Checked before
/// [`LIB_SUFFIX`], which it ends with.
pub const TEST_SUFFIX: &str = "_lib_test";

/// Suffix marking a project as a library.
pub const LIB_SUFFIX: &str = "_lib";

/// Default manifest file name, looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "makegen.toml";

/// Default output file name for the generated makefile.
pub const DEFAULT_OUTPUT: &str = "makefile";

pub const DEFAULT_COMPILER: &str = "g++";
pub const DEFAULT_STD_FLAGS: &str = "--std=c++17 -pthread -fno-rtti";
pub const DEFAULT_WARN_FLAGS: &str = "-Wall -Werror";
