//! SensorField - explicit enumeration of the seven reading channels.
//!
//! Replaces string-keyed column access: every query path resolves a caller
//! supplied key through the static alias table below, so an invalid key is
//! rejected before any SQL is built.

use serde::{Deserialize, Serialize};

/// One of the seven persisted reading channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    Pressure,
    Temperature,
    LimitSwitch,
    VibrationX,
    VibrationY,
    VibrationZ,
    Speed,
}

impl SensorField {
    /// All fields, in column order.
    pub const ALL: [SensorField; 7] = [
        SensorField::Pressure,
        SensorField::Temperature,
        SensorField::LimitSwitch,
        SensorField::VibrationX,
        SensorField::VibrationY,
        SensorField::VibrationZ,
        SensorField::Speed,
    ];

    /// Wire name of the field, which is also its storage column name.
    pub fn column(self) -> &'static str {
        match self {
            SensorField::Pressure => "pressao02_hx710b",
            SensorField::Temperature => "temperatura_ds18b20",
            SensorField::LimitSwitch => "chave_fim_de_curso",
            SensorField::VibrationX => "vibracao_vib_x",
            SensorField::VibrationY => "vibracao_vib_y",
            SensorField::VibrationZ => "vibracao_vib_z",
            SensorField::Speed => "velocidade_m_s",
        }
    }

    /// Resolve a short alias or canonical wire name onto exactly one field.
    ///
    /// The alias set is fixed at compile time: `p1`/`p2` → pressure,
    /// `t1` → temperature, `l1` → limit switch, `vx`/`vy`/`vz` → vibration
    /// axes, plus each canonical wire name mapping to itself.
    pub fn resolve(key: &str) -> Option<SensorField> {
        match key {
            "p1" | "p2" | "pressao02_hx710b" => Some(SensorField::Pressure),
            "t1" | "temperatura_ds18b20" => Some(SensorField::Temperature),
            "l1" | "chave_fim_de_curso" => Some(SensorField::LimitSwitch),
            "vx" | "vibracao_vib_x" => Some(SensorField::VibrationX),
            "vy" | "vibracao_vib_y" => Some(SensorField::VibrationY),
            "vz" | "vibracao_vib_z" => Some(SensorField::VibrationZ),
            "velocidade_m_s" => Some(SensorField::Speed),
            _ => None,
        }
    }

    /// True for the one boolean-valued channel.
    pub fn is_switch(self) -> bool {
        matches!(self, SensorField::LimitSwitch)
    }
}
