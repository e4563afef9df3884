//! Language plugin contract for ugen
//!
//! A language plugin knows how to tell source files from test files, where the
//! test for a given source file lives, which framework its tests target, and
//! how to write a skeletal test for a piece of source code.

pub mod error;
pub mod paths;
pub mod stub;
pub mod traits;
pub mod types;

pub use error::{LanguageError, LanguageResult};
pub use stub::StubWriter;
pub use traits::{LanguageFactory, LanguageSupport};
pub use types::{
    FileClass, LanguageMetadata, LanguageSettings, SourceFile, Symbol, SymbolKind, TestLayout,
};
