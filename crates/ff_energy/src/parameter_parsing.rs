//! Reading, writing and validating parameter files.
//!
//! Parameter files are the JSON serialization of `ParamSet` (energies in
//! kcal/mol). Since `ndarray` stores shapes alongside the data, a file
//! with a wrongly dimensioned table deserializes fine and is only caught
//! by `ParamSet::validate`.

use std::fs;
use std::path::Path;
use log::info;
use thiserror::Error;

use crate::{Base, NucleotideVec, ParamSet, NBASES, LOOP_MAX};

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("table '{table}' has shape {found:?}, expected {expected:?}")]
    Shape {
        table: &'static str,
        found: Vec<usize>,
        expected: Vec<usize>,
    },

    #[error("special hairpin motif '{motif}' is invalid: {reason}")]
    Motif { motif: String, reason: String },

    #[error("temperature {0} °C is below absolute zero")]
    Temperature(f64),
}

fn check_shape(table: &'static str, found: &[usize], expected: &[usize]) -> Result<(), ParamError> {
    if found == expected {
        Ok(())
    } else {
        Err(ParamError::Shape {
            table,
            found: found.to_vec(),
            expected: expected.to_vec(),
        })
    }
}

/// Parse a motif string, requiring it to be `len` uppercase nucleotides.
pub fn parse_motif(motif: &str, len: usize) -> Result<Vec<Base>, ParamError> {
    let seq = NucleotideVec::try_from(motif).map_err(|e| ParamError::Motif {
        motif: motif.to_string(),
        reason: e.to_string(),
    })?;
    if seq.len() != len {
        return Err(ParamError::Motif {
            motif: motif.to_string(),
            reason: format!("expected {len} nucleotides, found {}", seq.len()),
        });
    }
    Ok(seq.bases().to_vec())
}

impl ParamSet {
    pub fn from_json_str(json: &str) -> Result<Self, ParamError> {
        let params: ParamSet = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ParamError> {
        let content = fs::read_to_string(path).map_err(|e| ParamError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let params = Self::from_json_str(&content)?;
        info!("Loaded energy parameters from '{}'.", path.display());
        Ok(params)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<(), ParamError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|e| ParamError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Check all table dimensions and special loop motifs.
    pub fn validate(&self) -> Result<(), ParamError> {
        let n = NBASES;
        let four = [n; 4];
        for (name, table) in [
            ("stack", &self.stack),
            ("coaxial", &self.coaxial),
            ("coaxstack", &self.coaxstack),
            ("tstackcoax", &self.tstackcoax),
            ("tstack", &self.tstack),
            ("tstackm", &self.tstackm),
            ("tstackh", &self.tstackh),
            ("tstacki", &self.tstacki),
            ("tstacki1n", &self.tstacki1n),
            ("tstacki23", &self.tstacki23),
        ] {
            check_shape(name, table.shape(), &four)?;
        }
        check_shape("dangle_3p", self.dangle_3p.shape(), &[n; 3])?;
        check_shape("dangle_5p", self.dangle_5p.shape(), &[n; 3])?;
        check_shape("int11", self.int11.shape(), &[n; 6])?;
        check_shape("int21", self.int21.shape(), &[n; 7])?;
        check_shape("int22", self.int22.shape(), &[n; 8])?;
        for (name, v) in [
            ("hairpin_initiation", &self.hairpin_initiation),
            ("bulge_initiation", &self.bulge_initiation),
            ("internal_initiation", &self.internal_initiation),
        ] {
            check_shape(name, &[v.len()], &[LOOP_MAX + 1])?;
        }
        for (len, list) in [(5, &self.triloops), (6, &self.tetraloops), (8, &self.hexaloops)] {
            for special in list {
                parse_motif(&special.motif, len)?;
            }
        }
        Ok(())
    }
}
