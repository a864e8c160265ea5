//! Reading - canonical in-memory representation of one sensor sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One sensor sample as it arrives from a source.
///
/// Every field is optional: absence means the device did not report that
/// channel in this sample, which is distinct from reporting zero. `None`
/// serializes as `null` and must round-trip as unset.
///
/// JSON keys are the device's wire names and are kept verbatim on every
/// surface (serial line, HTTP bodies, realtime event, query rows).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Pressure sensor (HX710B), raw units
    #[serde(rename = "pressao02_hx710b", default)]
    pub pressure: Option<f64>,

    /// Temperature probe (DS18B20), °C
    #[serde(rename = "temperatura_ds18b20", default)]
    pub temperature: Option<f64>,

    /// Limit switch state
    #[serde(
        rename = "chave_fim_de_curso",
        default,
        deserialize_with = "de_switch"
    )]
    pub limit_switch: Option<bool>,

    /// Vibration, X axis
    #[serde(rename = "vibracao_vib_x", default)]
    pub vibration_x: Option<f64>,

    /// Vibration, Y axis
    #[serde(rename = "vibracao_vib_y", default)]
    pub vibration_y: Option<f64>,

    /// Vibration, Z axis
    #[serde(rename = "vibracao_vib_z", default)]
    pub vibration_z: Option<f64>,

    /// Speed, m/s
    #[serde(rename = "velocidade_m_s", default)]
    pub speed: Option<f64>,
}

impl Reading {
    /// True when no channel reported a value.
    ///
    /// Such a reading is still valid input to the pipeline; garbage
    /// filtering happens at the parser, not here.
    pub fn is_empty(&self) -> bool {
        self.pressure.is_none()
            && self.temperature.is_none()
            && self.limit_switch.is_none()
            && self.vibration_x.is_none()
            && self.vibration_y.is_none()
            && self.vibration_z.is_none()
            && self.speed.is_none()
    }
}

/// A reading after the store assigned its identity.
///
/// Immutable once constructed; query paths rebuild projections of it,
/// never hand out the same instance for mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedReading {
    /// Store-assigned row id
    pub id: i64,

    /// Store-assigned persist time (UTC)
    pub timestamp: DateTime<Utc>,

    /// The sample itself, wire keys flattened alongside id/timestamp
    #[serde(flatten)]
    pub reading: Reading,
}

/// Devices report the limit switch as `0`/`1`, the HTTP push source as a
/// JSON bool. Both decode to `Option<bool>`; anything else is a type error.
fn de_switch<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b)),
        Some(serde_json::Value::Number(n)) => {
            Ok(Some(n.as_f64().is_some_and(|v| v != 0.0)))
        }
        Some(other) => Err(D::Error::custom(format!(
            "chave_fim_de_curso must be a boolean or number, got {other}"
        ))),
    }
}
