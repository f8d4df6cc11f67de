use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use soat_core::error::Error;

/// One row of the vehicle portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub placa: String,
    pub tipo_vehiculo: String,
    pub cilindraje: u32,
    pub edad_conductor: u32,
    pub numero_siniestros_12m: u32,
    pub zona_riesgo: String,
    pub anios_sin_siniestros: i32,
    pub valor_soat_actual: u64,
}

const COLUMNS: [&str; 8] = [
    "placa",
    "tipo_vehiculo",
    "cilindraje",
    "edad_conductor",
    "numero_siniestros_12m",
    "zona_riesgo",
    "anios_sin_siniestros",
    "valor_soat_actual",
];

#[derive(Debug, Clone)]
pub struct VehicleDataset {
    path: PathBuf,
    records: Vec<VehicleRecord>,
}

impl VehicleDataset {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(format!("dataset {}", path.display())).into());
        }
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_csv(&text, path)
    }

    /// Parse comma-separated text with a header row. Column order is free;
    /// extra columns are ignored.
    pub fn from_csv(text: &str, path: &Path) -> Result<Self> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
        let Some((_, header)) = lines.next() else { bail!("dataset {} is empty", path.display()) };
        let header: Vec<String> = split_row(header).map(|h| h.to_lowercase()).collect();
        let mut positions = [0usize; COLUMNS.len()];
        for (slot, name) in positions.iter_mut().zip(COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h == name)
                .with_context(|| format!("dataset {} is missing column '{}'", path.display(), name))?;
        }

        let mut records = Vec::new();
        for (line_no, line) in lines {
            let cells: Vec<String> = split_row(line).collect();
            let cell = |col: usize| -> Result<&str> {
                cells
                    .get(positions[col])
                    .map(String::as_str)
                    .with_context(|| format!("line {}: missing '{}'", line_no + 1, COLUMNS[col]))
            };
            let number = |col: usize| -> Result<i64> {
                let raw = cell(col)?;
                raw.parse::<f64>()
                    .map(|v| v as i64)
                    .with_context(|| format!("line {}: '{}' is not a number ({raw})", line_no + 1, COLUMNS[col]))
            };
            records.push(VehicleRecord {
                placa: cell(0)?.to_uppercase(),
                tipo_vehiculo: cell(1)?.to_string(),
                cilindraje: u32::try_from(number(2)?).context("cilindraje out of range")?,
                edad_conductor: u32::try_from(number(3)?).context("edad_conductor out of range")?,
                numero_siniestros_12m: u32::try_from(number(4)?).context("numero_siniestros_12m out of range")?,
                zona_riesgo: cell(5)?.to_string(),
                anios_sin_siniestros: i32::try_from(number(6)?).context("anios_sin_siniestros out of range")?,
                valor_soat_actual: u64::try_from(number(7)?).context("valor_soat_actual out of range")?,
            });
        }
        tracing::info!(rows = records.len(), path = %path.display(), "loaded vehicle dataset");
        Ok(Self { path: path.to_path_buf(), records })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn records(&self) -> &[VehicleRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Case-insensitive plate lookup.
    pub fn find(&self, placa: &str) -> Option<&VehicleRecord> {
        let wanted = placa.trim().to_uppercase();
        self.records.iter().find(|r| r.placa == wanted)
    }
}

fn split_row(line: &str) -> impl Iterator<Item = String> + '_ {
    line.split(',').map(|c| c.trim().trim_matches('"').trim().to_string())
}
