//! Building backend reading updates from listed meters and entered forms.

use std::io::Cursor;

use lecturas::meters::{
    Bt12Form, Bt43Form, ClaveCatalog, Medidor, MeterState, Register, SectorReadings,
    SubmissionBuilder, SubmissionError,
};
use lecturas::readings::{AnomalyKind, ReadingPipeline};
use serde_json::json;

const CATALOG_EXPORT: &str = r#"{
    "claves": [
        {"IdClave": "22", "DescripcionClave": "LEOK - LECTURA CORRECTA", "IdentificadorDeAgrupacion": "1"},
        {"IdClave": "31", "DescripcionClave": "SIAC - Sin acceso", "IdentificadorDeAgrupacion": "1"},
        {"IdClave": "52", "DescripcionClave": "REAC - Reactiva estimada", "IdentificadorDeAgrupacion": "2"}
    ],
    "total": 3
}"#;

fn catalog() -> ClaveCatalog {
    ClaveCatalog::from_reader(Cursor::new(CATALOG_EXPORT)).expect("catalog export parses")
}

fn bt43_meter() -> Medidor {
    serde_json::from_value(json!({
        "LM_ID": 5120,
        "ME_NSerie": "BT43-009",
        "ME_Digitos": 6,
        "ME_ConstanteMultiplicar": 40,
        "LM_ValorUltimaLectura": 999_950,
        "LM_ConsumoMesAnterior": "2400",
        "LMC_ValorUltimaLectEnergiaReactiva": 12_000,
        "LMC_ConsumoEnergiaReactiva": 800
    }))
    .expect("meter record parses")
}

fn bt43_form() -> Bt43Form {
    Bt43Form {
        lectura_activa: "30".to_string(),
        clave_activa_id: "22".to_string(),
        lectura_reactiva: "12010".to_string(),
        clave_reactiva_id: "52".to_string(),
        dp: "85,25".to_string(),
        dp_fecha: "2025-10-14".to_string(),
        dp_hora: "19:30".to_string(),
        ds: "60".to_string(),
        ds_fecha: "14/10/2025".to_string(),
        ds_hora: "11:00".to_string(),
    }
}

#[test]
fn bt43_update_compensates_rollover_and_reshapes_demand() {
    let pipeline = ReadingPipeline::default();
    let catalog = catalog();
    let builder = SubmissionBuilder::new(&pipeline, &catalog);

    let prepared = builder
        .bt43(&bt43_meter(), Some(MeterState::Sinlec), &bt43_form())
        .expect("form is accepted");
    let update = prepared.update;

    assert_eq!(update.lm_id, 5120);
    assert_eq!(update.lectura_activa, 30);
    // (1_000_030 - 999_950) * 40
    assert_eq!(update.consumo_activa, 3_200.0);
    assert_eq!(update.consumo_reactiva, 400.0);
    assert_eq!(update.dp, 85.25);
    assert_eq!(update.dp_fecha, "14-10-2025");
    assert_eq!(update.ds_fecha, "14-10-2025");
    assert_eq!(update.clave_reactiva_id, "52");
    assert!(prepared.anomalies.is_empty());
}

#[test]
fn bt43_update_carries_advisory_anomalies() {
    let pipeline = ReadingPipeline::default();
    let catalog = catalog();
    let builder = SubmissionBuilder::new(&pipeline, &catalog);

    let mut form = bt43_form();
    form.lectura_reactiva = "12500".to_string();

    let prepared = builder
        .bt43(&bt43_meter(), None, &form)
        .expect("anomalies never block");

    assert_eq!(prepared.update.consumo_reactiva, 20_000.0);
    assert_eq!(prepared.anomalies.len(), 1);
    assert_eq!(prepared.anomalies[0].anomaly_kind, AnomalyKind::Excessive);
}

#[test]
fn bt43_rejects_bad_demand_date_and_unknown_claves() {
    let pipeline = ReadingPipeline::default();
    let catalog = catalog();
    let builder = SubmissionBuilder::new(&pipeline, &catalog);

    let mut bad_date = bt43_form();
    bad_date.dp_fecha = "2025-02-30".to_string();
    assert!(matches!(
        builder.bt43(&bt43_meter(), None, &bad_date),
        Err(SubmissionError::InvalidDate { field: "dpFecha", .. })
    ));

    let mut unknown = bt43_form();
    unknown.clave_reactiva_id = "777".to_string();
    assert_eq!(
        builder.bt43(&bt43_meter(), None, &unknown),
        Err(SubmissionError::UnknownClave("777".to_string()))
    );

    let mut missing = bt43_form();
    missing.clave_reactiva_id = "0".to_string();
    assert_eq!(
        builder.bt43(&bt43_meter(), None, &missing),
        Err(SubmissionError::MissingClave(Register::Reactive))
    );
}

#[test]
fn bt12_update_uses_listing_state_and_reading_form() {
    let listing: SectorReadings = serde_json::from_value(json!({
        "nichos": [{
            "nombre": "NICHO 4",
            "filas": [{
                "numero": 2,
                "medidores": [{ "id": 701, "nSerie": "M-701", "claveHtml": "<b>CLAREL</b>" }]
            }]
        }]
    }))
    .expect("listing parses");
    let (_, row) = listing.find_meter(701).expect("meter listed");
    let state = MeterState::from_clave_html(&row.clave_html);
    assert_eq!(state, Some(MeterState::Clarel));

    let meter = Medidor {
        reading_id: 701,
        digit_count: 4,
        multiplier: 1.0,
        last_reading: 9_870.0,
        previous_month_consumption: "140".to_string(),
        ..Default::default()
    };
    let form = Bt12Form {
        vactual: "0015".to_string(),
        claid: catalog().correct_reading_id().to_string(),
    };

    let pipeline = ReadingPipeline::default();
    let catalog = catalog();
    let prepared = SubmissionBuilder::new(&pipeline, &catalog)
        .bt12(&meter, state, &form)
        .expect("reading accepted");

    assert_eq!(prepared.update.lmid, "701");
    assert_eq!(prepared.update.vactual, "0015");
    assert_eq!(prepared.update.consumo, "145");
    assert_eq!(prepared.update.claid, "22");
}

#[test]
fn bt12_refuses_closed_meters_and_overflowing_readings() {
    let pipeline = ReadingPipeline::default();
    let catalog = catalog();
    let builder = SubmissionBuilder::new(&pipeline, &catalog);
    let meter = Medidor {
        reading_id: 88,
        digit_count: 4,
        multiplier: 1.0,
        last_reading: 1_200.0,
        ..Default::default()
    };
    let form = Bt12Form {
        vactual: "1300".to_string(),
        claid: "22".to_string(),
    };

    assert_eq!(
        builder.bt12(&meter, Some(MeterState::Leccer), &form),
        Err(SubmissionError::Locked(MeterState::Leccer))
    );

    let overflow = Bt12Form {
        vactual: "13000".to_string(),
        ..form
    };
    assert_eq!(
        builder.bt12(&meter, None, &overflow),
        Err(SubmissionError::DigitOverflow {
            register: Register::Active,
            raw: "13000".to_string(),
            max_value: 9_999,
        })
    );
}

#[test]
fn negative_readings_never_reach_the_payload() {
    let pipeline = ReadingPipeline::default();
    let catalog = catalog();
    let builder = SubmissionBuilder::new(&pipeline, &catalog);
    let meter = Medidor {
        reading_id: 9911,
        digit_count: 5,
        multiplier: 1.0,
        last_reading: 98_000.0,
        ..Default::default()
    };

    for raw in ["-200000", "-5"] {
        let form = Bt12Form {
            vactual: raw.to_string(),
            claid: "22".to_string(),
        };
        assert_eq!(
            builder.bt12(&meter, None, &form),
            Err(SubmissionError::NegativeReading {
                register: Register::Active,
                raw: raw.to_string(),
            })
        );
    }

    let mut form = bt43_form();
    form.lectura_reactiva = "-10".to_string();
    assert_eq!(
        builder.bt43(&bt43_meter(), None, &form),
        Err(SubmissionError::NegativeReading {
            register: Register::Reactive,
            raw: "-10".to_string(),
        })
    );
}
