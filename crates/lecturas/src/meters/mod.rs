//! Meter records, clave catalog and reading-update payloads.

pub mod claves;
pub mod domain;
pub mod state;
pub mod submission;

pub use claves::{
    CatalogError, ClaveCatalog, ClaveOption, DEFAULT_CORRECT_CLAVE_ID, PLACEHOLDER_CLAVE_ID,
};
pub use domain::{
    Clave, ClaveFilter, Fila, Medidor, MeterRow, Nicho, Periodo, ReadingUpdateBt12,
    ReadingUpdateBt43, Sector, SectorReadings,
};
pub use state::MeterState;
pub use submission::{
    ensure_editable, Bt12Form, Bt43Form, PreparedUpdate, Register, SubmissionBuilder,
    SubmissionError,
};
