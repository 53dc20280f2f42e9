use std::io::Read;

use serde::{Deserialize, Serialize};

use super::domain::Clave;

/// Id used when the catalog has no "LEOK - LECTURA CORRECTA" entry.
pub const DEFAULT_CORRECT_CLAVE_ID: &str = "22";
/// Id of the "Seleccione" placeholder heading every option list.
pub const PLACEHOLDER_CLAVE_ID: &str = "0";

const CORRECT_READING_MARKER: &str = "LEOK - LECTURA CORRECTA";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read clave catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse clave catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Option rendered in a clave select box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaveOption {
    pub value: String,
    pub label: String,
    pub id_clave: String,
}

impl ClaveOption {
    fn placeholder() -> Self {
        Self {
            value: PLACEHOLDER_CLAVE_ID.to_string(),
            label: "Seleccione".to_string(),
            id_clave: PLACEHOLDER_CLAVE_ID.to_string(),
        }
    }
}

/// The catalog export is either a bare list or wrapped with a total.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    List(Vec<Clave>),
    Wrapped {
        #[serde(default)]
        claves: Vec<Clave>,
    },
}

/// In-memory clave catalog with the lookups the reading forms need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaveCatalog {
    claves: Vec<Clave>,
}

impl ClaveCatalog {
    pub fn new(claves: Vec<Clave>) -> Self {
        Self { claves }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let payload: CatalogPayload = serde_json::from_reader(reader)?;
        let claves = match payload {
            CatalogPayload::List(claves) => claves,
            CatalogPayload::Wrapped { claves } => claves,
        };
        Ok(Self::new(claves))
    }

    pub fn claves(&self) -> &[Clave] {
        &self.claves
    }

    pub fn is_empty(&self) -> bool {
        self.claves.is_empty()
    }

    /// Options for one clave group, headed by the "Seleccione" placeholder.
    pub fn options_for_group(&self, group: &str) -> Vec<ClaveOption> {
        std::iter::once(ClaveOption::placeholder())
            .chain(
                self.claves
                    .iter()
                    .filter(|clave| clave.group == group)
                    .map(|clave| ClaveOption {
                        value: clave.id.clone(),
                        label: clave.description.clone(),
                        id_clave: clave.id.clone(),
                    }),
            )
            .collect()
    }

    /// Id of the "reading correct" clave.
    pub fn correct_reading_id(&self) -> &str {
        self.claves
            .iter()
            .find(|clave| clave.description.contains(CORRECT_READING_MARKER))
            .map(|clave| clave.id.as_str())
            .unwrap_or(DEFAULT_CORRECT_CLAVE_ID)
    }

    /// Case-insensitive description search.
    pub fn find_by_description(&self, fragment: &str) -> Option<&Clave> {
        let needle = fragment.to_lowercase();
        self.claves
            .iter()
            .find(|clave| clave.description.to_lowercase().contains(&needle))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Clave> {
        self.claves.iter().find(|clave| clave.id == id)
    }
}
