// Dwelling ETL - Core Library
// Exposes all modules for use in the CLI, the trigger server, and tests

pub mod error;
pub mod units;
pub mod element;
pub mod attributes;     // Declarative field rules + row schemas
pub mod schema;         // Shape Layer - Schema Validation
pub mod codes;          // Wall / window code registry
pub mod snippets;       // Component subtrees of the house document
pub mod embedded;       // One parser per component kind
pub mod dwelling;       // Evaluation + Dwelling assembly
pub mod grouper;
pub mod extractor;      // Stage 1
pub mod transform;      // Stage 2
pub mod reader;
pub mod db;
pub mod config;
pub mod pipeline;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use error::{
    ComponentKind, ElementGetValueError, Error, FieldError, InvalidEmbeddedDataTypeError, Result,
};
pub use units::{Area, Bilingual, Distance, Insulation};
pub use element::XmlNode;
pub use attributes::{FieldRule, FieldType, FieldValue, RowSchema, ValidationRule};
pub use schema::{RawRow, SchemaValidator, ValidatedRow};
pub use codes::{build_codes, Codes, WallCode, WindowCode};
pub use snippets::Snippets;
pub use dwelling::{
    assemble, Dwelling, Evaluation, EvaluationType, GroupSizePolicy, ParsedDwellingDataRow, Region,
};
pub use grouper::group_adjacent;
pub use extractor::{extract_row, ExtractStats, Extractor};
pub use transform::{TransformStats, Transformer};
pub use reader::{write_rows, RowReader};
pub use db::{
    archive_count, archive_row, archived_entry, clear_archive, decode_archived, dwelling_count,
    get_dwelling, load_archive, open_database, setup_database, upsert_dwelling, StoreStats,
    UpsertOutcome, ARCHIVE_QUERY,
};
pub use config::PipelineConfig;
pub use pipeline::{extract_into_archive, run, transform_archive, RunSummary, TransformSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
