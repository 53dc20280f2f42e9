use serde::{Deserialize, Serialize};

/// Visual state of a meter in the sector listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeterState {
    Sinlec,
    Sincla,
    Clainf,
    Clarel,
    Clacri,
    Leccer,
    Lecimp,
}

impl MeterState {
    pub const ALL: [MeterState; 7] = [
        MeterState::Sinlec,
        MeterState::Sincla,
        MeterState::Clainf,
        MeterState::Clarel,
        MeterState::Clacri,
        MeterState::Leccer,
        MeterState::Lecimp,
    ];

    pub fn code(self) -> &'static str {
        match self {
            MeterState::Sinlec => "SINLEC",
            MeterState::Sincla => "SINCLA",
            MeterState::Clainf => "CLAINF",
            MeterState::Clarel => "CLAREL",
            MeterState::Clacri => "CLACRI",
            MeterState::Leccer => "LECCER",
            MeterState::Lecimp => "LECIMP",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeterState::Sinlec => "Sin lectura",
            MeterState::Sincla => "Sin clave",
            MeterState::Clainf => "Clave informativa",
            MeterState::Clarel => "Clave relevante",
            MeterState::Clacri => "Clave crítica",
            MeterState::Leccer => "Lectura cerrada",
            MeterState::Lecimp => "Lectura facturada",
        }
    }

    /// Display severity, `0` for settled readings up to `4` for critical claves.
    pub fn severity(self) -> u8 {
        match self {
            MeterState::Leccer | MeterState::Lecimp => 0,
            MeterState::Sinlec => 1,
            MeterState::Sincla | MeterState::Clainf => 2,
            MeterState::Clarel => 3,
            MeterState::Clacri => 4,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.code().eq_ignore_ascii_case(code.trim()))
    }

    /// First state code appearing in a listing row's clave markup.
    pub fn from_clave_html(html: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .filter_map(|state| html.find(state.code()).map(|index| (index, state)))
            .min_by_key(|(index, _)| *index)
            .map(|(_, state)| state)
    }

    /// Invoiced or closed readings can no longer be modified.
    pub fn is_locked(self) -> bool {
        matches!(self, MeterState::Leccer | MeterState::Lecimp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_code_from_markup() {
        let html = r#"<span class="badge CLAREL">CLAREL</span><i>SINLEC</i>"#;
        assert_eq!(MeterState::from_clave_html(html), Some(MeterState::Clarel));
        assert_eq!(MeterState::from_clave_html("<span></span>"), None);
    }

    #[test]
    fn invoiced_and_closed_meters_are_locked() {
        let locked: Vec<_> = MeterState::ALL
            .into_iter()
            .filter(|state| state.is_locked())
            .collect();
        assert_eq!(locked, vec![MeterState::Leccer, MeterState::Lecimp]);
    }

    #[test]
    fn codes_round_trip() {
        for state in MeterState::ALL {
            assert_eq!(MeterState::from_code(state.code()), Some(state));
        }
        assert_eq!(MeterState::from_code("lecimp"), Some(MeterState::Lecimp));
        assert_eq!(MeterState::from_code("OTHER"), None);
    }
}
