//! SRS-2 norm tables: raw score to T-score and percentile.
//!
//! Five CSV tables, one per norm group, each with a `raw_score` column plus
//! `total_t`, `total_percentile`, `<subscale>_t` and `<subscale>_percentile`
//! columns. Tables are read once at startup.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::Path;

use psyscale_core::models::Gender;
use serde::{Deserialize, Serialize};

use crate::error::InstrumentError;

/// Who filled in an SRS-2 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    SelfReport,
    HeteroReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormGroup {
    Preschool,
    SchoolFemale,
    SchoolMale,
    AdultSelfReport,
    AdultHeteroReport,
}

impl NormGroup {
    pub const ALL: [NormGroup; 5] = [
        NormGroup::Preschool,
        NormGroup::SchoolFemale,
        NormGroup::SchoolMale,
        NormGroup::AdultSelfReport,
        NormGroup::AdultHeteroReport,
    ];

    /// Under 7 uses the preschool table, 7 to 17 the school table for the
    /// patient's gender, 18 and over the adult table for the report kind.
    pub fn select(gender: Gender, age: i16, kind: ReportKind) -> Self {
        if age < 7 {
            NormGroup::Preschool
        } else if age < 18 {
            match gender {
                Gender::Female => NormGroup::SchoolFemale,
                Gender::Male => NormGroup::SchoolMale,
            }
        } else {
            match kind {
                ReportKind::SelfReport => NormGroup::AdultSelfReport,
                ReportKind::HeteroReport => NormGroup::AdultHeteroReport,
            }
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            NormGroup::Preschool => "srs2_lookup_preschool_t_percentile.csv",
            NormGroup::SchoolFemale => "srs2_lookup_school_female_t_percentile.csv",
            NormGroup::SchoolMale => "srs2_lookup_school_male_t_percentile.csv",
            NormGroup::AdultSelfReport => "srs2_lookup_adult_t_percentile_auto.csv",
            NormGroup::AdultHeteroReport => "srs2_lookup_adult_t_percentile_hetero.csv",
        }
    }
}

/// Demographic key for a lookup.
#[derive(Debug, Clone, Copy)]
pub struct Demographics {
    pub gender: Gender,
    pub age: i16,
    pub kind: ReportKind,
}

/// T-score and percentile pair. Either may be absent in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormScore {
    pub t_score: Option<i32>,
    pub percentile: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct NormTable {
    rows: BTreeMap<i32, HashMap<String, i32>>,
}

impl NormTable {
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        Self::read(
            csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .flexible(true)
                .from_reader(reader),
        )
    }

    fn read<R: io::Read>(mut rdr: csv::Reader<R>) -> Result<Self, csv::Error> {
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.replace("social_comunication", "social_communication"))
            .collect();

        let mut rows = BTreeMap::new();
        for record in rdr.records() {
            let record = record?;
            let mut row = HashMap::new();
            for (header, cell) in headers.iter().zip(record.iter()) {
                if header.is_empty() || cell.is_empty() {
                    continue;
                }
                // Non-numeric cells (e.g. "<1") carry no usable score.
                if cell.bytes().all(|b| b.is_ascii_digit())
                    && let Ok(value) = cell.parse::<i32>()
                {
                    row.insert(header.clone(), value);
                }
            }
            if let Some(raw) = row.remove("raw_score") {
                rows.insert(raw, row);
            }
        }

        Ok(Self { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest raw score present, 0 for an empty table.
    pub fn max_raw_score(&self) -> i32 {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    /// Value of `column` for `raw_score`, clamped to the table's range first.
    pub fn get(&self, raw_score: i32, column: &str) -> Option<i32> {
        let raw = raw_score.clamp(0, self.max_raw_score());
        self.rows.get(&raw)?.get(column).copied()
    }

    fn score(&self, raw_score: i32, prefix: &str) -> NormScore {
        NormScore {
            t_score: self.get(raw_score, &format!("{prefix}_t")),
            percentile: self.get(raw_score, &format!("{prefix}_percentile")),
        }
    }
}

fn read_table(dir: &Path, group: NormGroup) -> Result<Option<NormTable>, InstrumentError> {
    let path = dir.join(group.file_name());
    if !path.exists() {
        return Ok(None);
    }
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(&path)
        .and_then(NormTable::read)
        .map(Some)
        .map_err(|source| InstrumentError::NormTable {
            file: group.file_name().to_string(),
            source,
        })
}

#[derive(Debug, Clone, Default)]
pub struct NormTables {
    tables: HashMap<NormGroup, NormTable>,
}

impl NormTables {
    /// No tables loaded: every lookup is absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load all five tables from `dir`. A missing or malformed file is logged
    /// and treated as an empty table, so its lookups are absent.
    pub fn load(dir: &Path) -> Self {
        let mut tables = HashMap::new();
        for group in NormGroup::ALL {
            match read_table(dir, group) {
                Ok(Some(table)) => {
                    tracing::debug!(
                        file = group.file_name(),
                        rows = table.rows.len(),
                        "loaded SRS-2 norm table"
                    );
                    tables.insert(group, table);
                }
                Ok(None) => {
                    tracing::error!(file = group.file_name(), "SRS-2 norm table not found");
                }
                Err(e) => tracing::error!(error = %e, "SRS-2 norm table skipped"),
            }
        }
        Self { tables }
    }

    pub fn with_table(mut self, group: NormGroup, table: NormTable) -> Self {
        self.tables.insert(group, table);
        self
    }

    pub fn table(&self, group: NormGroup) -> Option<&NormTable> {
        self.tables.get(&group)
    }

    pub fn total(&self, demo: Demographics, raw_score: i32) -> NormScore {
        self.lookup(demo, raw_score, "total")
    }

    /// `lookup_name` is the table's column prefix (`social_awareness`,
    /// `repetitive_patterns`, ...).
    pub fn subscale(&self, demo: Demographics, lookup_name: &str, raw_score: i32) -> NormScore {
        self.lookup(demo, raw_score, lookup_name)
    }

    fn lookup(&self, demo: Demographics, raw_score: i32, prefix: &str) -> NormScore {
        let group = NormGroup::select(demo.gender, demo.age, demo.kind);
        self.tables
            .get(&group)
            .map(|t| t.score(raw_score, prefix))
            .unwrap_or_default()
    }
}
