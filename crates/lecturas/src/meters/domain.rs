//! Record shapes exchanged with the billing backend. Field names follow the backend's JSON.

use serde::{Deserialize, Serialize};

use crate::readings::{locale_decimal_to_number, MeterSnapshot};

/// Billing cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Periodo {
    #[serde(rename = "IdPeriodo")]
    pub id: String,
    #[serde(rename = "FechaInicio")]
    pub starts_on: String,
    #[serde(rename = "FechaFin")]
    pub ends_on: String,
    #[serde(rename = "FechaOrden")]
    pub sort_date: String,
    #[serde(rename = "DescripcionPeriodo")]
    pub description: String,
    #[serde(rename = "EstadoPeriodo")]
    pub status: i32,
}

/// Billing route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub sector_id: String,
    pub descripcion: String,
    pub info_adicional: String,
    pub estado: i32,
    pub color: i32,
}

/// Status/reason code attached to a reading.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Clave {
    #[serde(rename = "IdClave")]
    pub id: String,
    #[serde(rename = "DescripcionClave")]
    pub description: String,
    #[serde(rename = "IdentificadorDeAgrupacion")]
    pub group: String,
}

/// Values accepted by the sector listing's `clave` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaveFilter {
    #[serde(rename = "Todos los estados")]
    All,
    #[serde(rename = "Sin Lectura")]
    WithoutReading,
    #[serde(rename = "Lectura Normal")]
    NormalReading,
    #[serde(rename = "Clave Informativa")]
    Informative,
    #[serde(rename = "Clave relevante")]
    Relevant,
    #[serde(rename = "Clave Crítica")]
    Critical,
}

impl ClaveFilter {
    pub fn label(self) -> &'static str {
        match self {
            ClaveFilter::All => "Todos los estados",
            ClaveFilter::WithoutReading => "Sin Lectura",
            ClaveFilter::NormalReading => "Lectura Normal",
            ClaveFilter::Informative => "Clave Informativa",
            ClaveFilter::Relevant => "Clave relevante",
            ClaveFilter::Critical => "Clave Crítica",
        }
    }
}

/// Sector listing: nichos, their rows, and the meters on each row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectorReadings {
    pub nichos: Vec<Nicho>,
}

impl SectorReadings {
    pub fn meter_rows(&self) -> impl Iterator<Item = (&Nicho, &MeterRow)> {
        self.nichos.iter().flat_map(|nicho| {
            nicho
                .filas
                .iter()
                .flat_map(move |fila| fila.medidores.iter().map(move |meter| (nicho, meter)))
        })
    }

    pub fn find_meter(&self, id: i64) -> Option<(&Nicho, &MeterRow)> {
        self.meter_rows().find(|(_, meter)| meter.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Nicho {
    pub nombre: String,
    pub filas: Vec<Fila>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fila {
    pub numero: i32,
    pub medidores: Vec<MeterRow>,
}

/// Summary of a meter inside a sector listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeterRow {
    pub id: i64,
    pub n_serie: String,
    pub clave_html: String,
    pub estado_factura: i32,
    pub estado_clave: i32,
    pub ultima_lectura: f64,
    pub fecha_lectura: String,
    pub consumo: f64,
    pub clave: String,
}

/// Full meter record as listed for a nicho.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Medidor {
    #[serde(rename = "Nro")]
    pub row_number: i64,
    #[serde(rename = "LM_Periodo")]
    pub periodo: String,
    pub sector: String,
    pub nicho: String,
    pub ubicacion: String,
    pub tarifa: String,
    pub local: String,
    #[serde(rename = "SE_ID")]
    pub se_id: i64,
    #[serde(rename = "se_ordenlectura")]
    pub reading_order: i64,
    #[serde(rename = "ME_ID")]
    pub meter_id: i64,
    #[serde(rename = "SE_ID1")]
    pub se_id1: i64,
    #[serde(rename = "ME_NSerie")]
    pub serial_number: String,
    #[serde(rename = "ME_Digitos")]
    pub digit_count: u32,
    #[serde(rename = "ME_ConstanteMultiplicar")]
    pub multiplier: f64,
    #[serde(rename = "LM_ID")]
    pub reading_id: i64,
    #[serde(rename = "LM_FechaLectura")]
    pub read_on: String,
    #[serde(rename = "LM_ValorUltimaLectura")]
    pub last_reading: f64,
    #[serde(rename = "LMC_ValorUltimaLectEnergiaReactiva")]
    pub last_reactive_reading: f64,
    #[serde(rename = "LM_ConsumoMesAnterior")]
    pub previous_month_consumption: String,
    #[serde(rename = "LM_ConsumoAñoAnterior")]
    pub previous_year_consumption: String,
    #[serde(rename = "LMC_EnergiaActiva")]
    pub active_energy: Option<f64>,
    #[serde(rename = "LMC_ConsumoEnergiaActiva")]
    pub active_consumption: Option<f64>,
    #[serde(rename = "LMC_EnergiaReactiva")]
    pub reactive_energy: Option<f64>,
    #[serde(rename = "LMC_DemandaSuministrada")]
    pub supplied_demand: String,
    #[serde(rename = "LMC_FechaDemandaSuminis")]
    pub supplied_demand_date: String,
    #[serde(rename = "LMC_HoraDemandaSuminis")]
    pub supplied_demand_time: String,
    #[serde(rename = "LMC_DemandaPunta")]
    pub peak_demand: String,
    #[serde(rename = "LMC_FechaDemandaPunta")]
    pub peak_demand_date: String,
    #[serde(rename = "LMC_HoraDemandaPunta")]
    pub peak_demand_time: String,
    #[serde(rename = "LMC_ConsumoEnergiaReactiva")]
    pub reactive_consumption: f64,
    #[serde(rename = "LMC_ValorUltimaLectEnergiaActiva")]
    pub last_active_reading_text: String,
    #[serde(rename = "LMC_ValorUltimaLectEnergiaReactiva1")]
    pub last_reactive_reading_text: String,
    #[serde(rename = "LMC_ConsAñoAnteriorEnActiva")]
    pub previous_year_active: String,
    #[serde(rename = "LMC_ConsAñoAnteriorEnReactiva")]
    pub previous_year_reactive: String,
    #[serde(rename = "LMC_PorcentajeMultaMalFactorPotencia")]
    pub power_factor_penalty: String,
    #[serde(rename = "Estado")]
    pub estado: i32,
}

impl Medidor {
    /// Snapshot for the active-energy register (the only register on BT-1/BT-2 meters).
    pub fn snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            digit_count: self.digit_count,
            multiplier: self.multiplier,
            previous_reading: self.last_reading.trunc() as i64,
            previous_consumption: locale_decimal_to_number(&self.previous_month_consumption),
        }
    }

    /// Snapshot for the reactive-energy register of a BT-4.3 meter.
    pub fn reactive_snapshot(&self) -> MeterSnapshot {
        MeterSnapshot {
            digit_count: self.digit_count,
            multiplier: self.multiplier,
            previous_reading: self.last_reactive_reading.trunc() as i64,
            previous_consumption: self.reactive_consumption,
        }
    }
}

/// Reading update for BT-1 and BT-2 meters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingUpdateBt12 {
    pub lmid: String,
    pub vactual: String,
    pub consumo: String,
    pub claid: String,
}

/// Reading update for BT-4.3 meters (active and reactive registers plus demand).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingUpdateBt43 {
    pub lm_id: i64,
    pub lectura_activa: i64,
    pub clave_activa_id: String,
    pub lectura_reactiva: i64,
    pub clave_reactiva_id: String,
    pub consumo_activa: f64,
    pub consumo_reactiva: f64,
    pub dp: f64,
    pub dp_fecha: String,
    pub dp_hora: String,
    pub ds: f64,
    pub ds_fecha: String,
    pub ds_hora: String,
}
