use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::error::ReportError;
use crate::model::{SuiteMapFile, SuiteMapping};

const CROSS_INDICATION: &str = "cross indication";

const BUILTIN_SUITES: &[(&str, &str, &str)] = &[
    ("www.sotyktu.com_US_US", "Sotyktu", "psoriasis"),
    ("www.opdivo.com_US_US", "Opdivo", CROSS_INDICATION),
    ("www.augtyro.com_US_US", "Augtyro", CROSS_INDICATION),
    ("www.opdualag.com_US_US", "Opdualag", CROSS_INDICATION),
    ("www.breyanzi.com_US_US", "Breyanzi", CROSS_INDICATION),
    ("www.reblozyl.com_US_US", "Reblozyl", CROSS_INDICATION),
    ("www.onureg.com_US_US", "Onureg", CROSS_INDICATION),
    ("www.abecma.com_US_US", "Abecma", CROSS_INDICATION),
    ("www.krazati.com_Global_AA", "Krazati", CROSS_INDICATION),
    ("www.sprycel.com_US_US", "Sprycel", CROSS_INDICATION),
    ("www.orencia.com_US_US", "Orencia", CROSS_INDICATION),
    ("www.camzyos.com_US_US", "Camzyos Branded", CROSS_INDICATION),
    ("www.hcmrealtalk.com_US_US", "Camzyos Non-branded", CROSS_INDICATION),
    ("www.coulditbehcm.com_US_US", "Camzyos ME", CROSS_INDICATION),
    ("www.zeposia.com_US_US", "Zeposia", CROSS_INDICATION),
    ("cartautoimmune.com_US_AA", "CarT", CROSS_INDICATION),
    ("www.cobenfy.com_US_US", "Cobenfy", CROSS_INDICATION),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub suite: String,
    pub brand: String,
    pub indication: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRegistry {
    entries: BTreeMap<String, SuiteMapping>,
}

impl SuiteRegistry {
    pub fn builtin() -> Self {
        let entries = BUILTIN_SUITES
            .iter()
            .map(|(suite, brand, indication)| {
                (
                    suite.to_string(),
                    SuiteMapping {
                        suite: suite.to_string(),
                        brand: brand.to_string(),
                        indication: indication.to_string(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn from_mappings(mappings: Vec<SuiteMapping>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for mapping in mappings {
            let suite = mapping.suite.trim().to_string();
            if suite.is_empty() {
                bail!("suite map contains an entry with an empty suite id");
            }
            if entries.contains_key(&suite) {
                bail!("suite map lists {suite} more than once");
            }
            entries.insert(suite, mapping);
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let file: SuiteMapFile = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Self::from_mappings(file.suites)
            .with_context(|| format!("invalid suite map {}", path.display()))
    }

    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn resolve(&self, suite: &str) -> Result<Identity, ReportError> {
        let mapping = self
            .entries
            .get(suite)
            .ok_or_else(|| ReportError::UnmappedSuite {
                suite: suite.to_string(),
            })?;

        Ok(Identity {
            suite: suite.to_string(),
            brand: mapping.brand.clone(),
            indication: mapping.indication.clone(),
        })
    }

    pub fn mappings(&self) -> impl Iterator<Item = &SuiteMapping> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
