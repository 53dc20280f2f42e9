use std::sync::Arc;

use crate::meters::{Clave, ClaveCatalog, Medidor};
use crate::readings::{MeterSnapshot, ReadingService};

pub(super) fn snapshot(digit_count: u32, previous_reading: i64) -> MeterSnapshot {
    MeterSnapshot {
        digit_count,
        multiplier: 1.0,
        previous_reading,
        previous_consumption: 0.0,
    }
}

pub(super) fn catalog() -> ClaveCatalog {
    ClaveCatalog::new(vec![
        Clave {
            id: "22".to_string(),
            description: "LEOK - LECTURA CORRECTA".to_string(),
            group: "1".to_string(),
        },
        Clave {
            id: "31".to_string(),
            description: "SIAC - Sin acceso".to_string(),
            group: "1".to_string(),
        },
        Clave {
            id: "52".to_string(),
            description: "REAC - Reactiva estimada".to_string(),
            group: "2".to_string(),
        },
    ])
}

pub(super) fn service() -> Arc<ReadingService> {
    Arc::new(ReadingService::new(Default::default(), catalog()))
}

/// Five-digit BT-1 meter last read at 98000 with a 1250 kWh previous month.
pub(super) fn meter() -> Medidor {
    Medidor {
        reading_id: 9911,
        nicho: "SECTOR 2".to_string(),
        serial_number: "A-7781".to_string(),
        digit_count: 5,
        multiplier: 1.0,
        last_reading: 98_000.0,
        previous_month_consumption: "1250".to_string(),
        last_reactive_reading: 4_500.0,
        reactive_consumption: 300.0,
        ..Default::default()
    }
}
