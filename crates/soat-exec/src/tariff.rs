//! Tariff table and risk factors used to re-estimate a premium.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use soat_core::error::{Error, Result};

use crate::dataset::VehicleRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    AutoParticular,
    Taxi,
    Bus,
    Camion,
    Moto,
}

impl FromStr for VehicleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto_particular" => Ok(Self::AutoParticular),
            "taxi" => Ok(Self::Taxi),
            "bus" => Ok(Self::Bus),
            "camion" | "camión" => Ok(Self::Camion),
            "moto" => Ok(Self::Moto),
            _ => Err(Error::UnknownEntity { kind: "vehicle type", value: s.to_string() }),
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AutoParticular => "auto_particular",
            Self::Taxi => "taxi",
            Self::Bus => "bus",
            Self::Camion => "camion",
            Self::Moto => "moto",
        };
        f.write_str(s)
    }
}

/// Annual base tariff in COP. Motorcycles are priced by displacement.
pub fn base_tariff(vehicle: VehicleType, cilindraje: u32) -> u64 {
    match vehicle {
        VehicleType::AutoParticular => 600_000,
        VehicleType::Taxi => 750_000,
        VehicleType::Bus => 900_000,
        VehicleType::Camion => 1_000_000,
        VehicleType::Moto => match cilindraje {
            0..=99 => 400_000,
            100..=200 => 500_000,
            _ => 600_000,
        },
    }
}

pub fn age_factor(edad: u32) -> f64 {
    match edad {
        0..=24 => 1.20,
        25..=60 => 1.00,
        _ => 1.10,
    }
}

pub fn claims_factor(siniestros_12m: u32) -> f64 {
    match siniestros_12m {
        0 => 1.00,
        1 => 1.10,
        2 => 1.25,
        _ => 1.50,
    }
}

/// Unlisted zones are neutral.
pub fn zone_factor(zona: &str) -> f64 {
    match zona.trim().to_lowercase().as_str() {
        "baja" => 0.95,
        "media" => 1.00,
        "alta" => 1.15,
        _ => 1.00,
    }
}

pub fn history_factor(anios_sin_siniestros: i32) -> f64 {
    match anios_sin_siniestros {
        i32::MIN..=0 => 1.00,
        1 => 0.98,
        2 => 0.96,
        _ => 0.93,
    }
}

const MIN_MULTIPLIER: f64 = 0.7;
const MAX_MULTIPLIER: f64 = 2.5;

/// Every intermediate value of one premium estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumBreakdown {
    pub vehicle_type: VehicleType,
    pub base: u64,
    pub age_factor: f64,
    pub claims_factor: f64,
    pub zone_factor: f64,
    pub history_factor: f64,
    pub gross: f64,
    pub min: f64,
    pub max: f64,
    pub adjusted: f64,
    /// `adjusted` rounded up to the next thousand. Values within 1e-9 thousands
    /// above a multiple of 1 000 count as that multiple.
    pub estimate: u64,
}

/// Round up to the next multiple of 1 000. Float noise just above an exact
/// thousand (792000.0000000001) stays on that thousand.
pub fn round_up_to_thousand(value: f64) -> u64 {
    ((value / 1000.0 - 1e-9).ceil() * 1000.0) as u64
}

pub fn estimate_premium(record: &VehicleRecord) -> Result<PremiumBreakdown> {
    let vehicle_type: VehicleType = record.tipo_vehiculo.parse()?;
    let base = base_tariff(vehicle_type, record.cilindraje);
    let age = age_factor(record.edad_conductor);
    let claims = claims_factor(record.numero_siniestros_12m);
    let zone = zone_factor(&record.zona_riesgo);
    let history = history_factor(record.anios_sin_siniestros);

    let base_f = base as f64;
    let gross = base_f * age * claims * zone * history;
    let min = base_f * MIN_MULTIPLIER;
    let max = base_f * MAX_MULTIPLIER;
    let adjusted = gross.clamp(min, max);
    let estimate = round_up_to_thousand(adjusted);

    Ok(PremiumBreakdown {
        vehicle_type,
        base,
        age_factor: age,
        claims_factor: claims,
        zone_factor: zone,
        history_factor: history,
        gross,
        min,
        max,
        adjusted,
        estimate,
    })
}
