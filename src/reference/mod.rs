//! Reference code sets used to tag claims
//!
//! The [`ReferenceIndex`] is built once per run from the reference tables
//! supplied by the ingestion layer and is then shared read-only by every
//! stage. Diagnosis and CPT codes are held in hash sets; revenue and DRG codes
//! are numeric and held as sorted, merged ranges searched in O(log n).

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::models::claim::parse_numeric_code;
use crate::models::nicu::AcuityLevel;

/// Default CPT codes for manageable professional services
pub const DEFAULT_MANAGEABLE_CPTS: [&str; 7] =
    ["99231", "99232", "99233", "99462", "99478", "99479", "99480"];

/// Default CPT codes for neonatal critical care
pub const DEFAULT_CRITICAL_CARE_CPTS: [&str; 4] = ["99468", "99469", "99471", "99472"];

/// Normalise an ICD or CPT code for lookup
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().replace('.', "").to_uppercase()
}

/// Set of alphanumeric codes (ICD-10, CPT)
#[derive(Debug, Clone, Default)]
pub struct CodeSet {
    codes: FxHashSet<String>,
}

impl CodeSet {
    /// Build a set from raw codes
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| normalize_code(c.as_ref()))
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Check membership of a raw code
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        !self.codes.is_empty() && self.codes.contains(&normalize_code(code))
    }

    /// Check whether any of the given codes is a member
    #[must_use]
    pub fn contains_any<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        codes.iter().any(|c| self.contains(c.as_ref()))
    }

    /// Number of distinct codes
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Sorted, non-overlapping inclusive ranges of numeric codes
#[derive(Debug, Clone, Default)]
pub struct CodeRanges {
    ranges: Vec<(u32, u32)>,
}

impl CodeRanges {
    /// Build from inclusive ranges, merging overlaps
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut sorted: Vec<(u32, u32)> = ranges
            .into_iter()
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .collect();
        sorted.sort_unstable();

        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(sorted.len());
        for (start, end) in sorted {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }
        Self { ranges: merged }
    }

    /// Build from individual code strings; non-numeric codes are ignored
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_ranges(
            codes
                .into_iter()
                .filter_map(|c| parse_numeric_code(c.as_ref()))
                .map(|c| (c, c)),
        )
    }

    /// Check membership of a numeric code
    #[must_use]
    pub fn contains(&self, code: u32) -> bool {
        let idx = self.ranges.partition_point(|&(_, end)| end < code);
        self.ranges
            .get(idx)
            .is_some_and(|&(start, end)| start <= code && code <= end)
    }

    /// Whether no ranges are defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The merged ranges
    #[must_use]
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }
}

/// Mapping of a revenue code range to a NICU acuity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueBand {
    /// First revenue code in the band (inclusive)
    pub start: u32,
    /// Last revenue code in the band (inclusive)
    pub end: u32,
    /// Acuity level of the band
    pub level: AcuityLevel,
}

impl RevenueBand {
    /// Create a band
    #[must_use]
    pub const fn new(start: u32, end: u32, level: AcuityLevel) -> Self {
        Self { start, end, level }
    }
}

/// Standard nursery revenue code bands (017X)
#[must_use]
pub fn default_revenue_bands() -> Vec<RevenueBand> {
    vec![
        RevenueBand::new(170, 171, AcuityLevel::Level1),
        RevenueBand::new(179, 179, AcuityLevel::Level1),
        RevenueBand::new(172, 172, AcuityLevel::Level2),
        RevenueBand::new(173, 173, AcuityLevel::Level3),
        RevenueBand::new(174, 174, AcuityLevel::Level4),
    ]
}

/// Identifies a reference collection in warnings and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ReferenceSet {
    NewbornIcd,
    NewbornRevenue,
    NicuRevenue,
    NicuMsDrg,
    NicuAprDrg,
    SingletonIcd,
    TwinIcd,
    MultipleIcd,
    BirthweightIcd,
    GestationalAgeIcd,
    ManageableCpt,
    CriticalCareCpt,
    NicuRevenueBands,
}

impl ReferenceSet {
    /// Name of the reference table
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::NewbornIcd => "REF_NEWBORN_ICD",
            Self::NewbornRevenue => "REF_NEWBORN_REVCODE",
            Self::NicuRevenue => "REF_NICU_REVCODE",
            Self::NicuMsDrg => "REF_NICU_MSDRG",
            Self::NicuAprDrg => "REF_NICU_APRDRG",
            Self::SingletonIcd => "REF_SINGLETON_ICD",
            Self::TwinIcd => "REF_TWIN_ICD",
            Self::MultipleIcd => "REF_MULTIPLE_ICD",
            Self::BirthweightIcd => "REF_BIRTHWEIGHT_ICD",
            Self::GestationalAgeIcd => "REF_GEST_AGE_ICD",
            Self::ManageableCpt => "MANAGEABLE_CPT",
            Self::CriticalCareCpt => "CRITICAL_CARE_CPT",
            Self::NicuRevenueBands => "NICU_REVENUE_BANDS",
        }
    }
}

impl fmt::Display for ReferenceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

/// Immutable lookup structures for one pipeline run
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    pub(crate) newborn_icd: CodeSet,
    pub(crate) newborn_revenue: CodeRanges,
    pub(crate) nicu_revenue: CodeRanges,
    pub(crate) nicu_msdrg: CodeRanges,
    pub(crate) nicu_aprdrg: CodeRanges,
    pub(crate) singleton_icd: CodeSet,
    pub(crate) twin_icd: CodeSet,
    pub(crate) multiple_icd: CodeSet,
    pub(crate) birthweight_icd: FxHashMap<String, String>,
    pub(crate) gestational_age_icd: FxHashMap<String, String>,
    pub(crate) manageable_cpt: CodeSet,
    pub(crate) critical_care_cpt: CodeSet,
    pub(crate) nicu_revenue_bands: Vec<RevenueBand>,
}

impl ReferenceIndex {
    /// Start building an index
    #[must_use]
    pub fn builder() -> ReferenceIndexBuilder {
        ReferenceIndexBuilder::new()
    }

    /// Compile reference tables into an index
    #[must_use]
    pub fn from_tables(tables: &ReferenceTables) -> Self {
        let mut builder = Self::builder()
            .newborn_icd(&tables.newborn_icd)
            .newborn_revenue_codes(&tables.newborn_revenue_codes)
            .nicu_revenue_ranges(tables.nicu_revenue_ranges.iter().map(|r| (r.start, r.end)))
            .nicu_msdrg_ranges(tables.nicu_msdrg_ranges.iter().map(|r| (r.start, r.end)))
            .nicu_aprdrg_ranges(tables.nicu_aprdrg_ranges.iter().map(|r| (r.start, r.end)))
            .singleton_icd(&tables.singleton_icd)
            .twin_icd(&tables.twin_icd)
            .multiple_icd(&tables.multiple_icd)
            .birthweight_icd(
                tables
                    .birthweight_icd
                    .iter()
                    .map(|c| (c.code.as_str(), c.category.as_str())),
            )
            .gestational_age_icd(
                tables
                    .gestational_age_icd
                    .iter()
                    .map(|c| (c.code.as_str(), c.category.as_str())),
            );

        if let Some(codes) = &tables.manageable_cpt {
            builder = builder.manageable_cpt(codes);
        }
        if let Some(codes) = &tables.critical_care_cpt {
            builder = builder.critical_care_cpt(codes);
        }
        if let Some(bands) = &tables.nicu_revenue_bands {
            builder = builder.nicu_revenue_bands(bands.clone());
        }
        builder.build()
    }

    /// Load reference tables from a JSON file and compile them
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let tables: ReferenceTables = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(Self::from_tables(&tables))
    }

    /// Reference sets that are empty and will therefore never match
    #[must_use]
    pub fn missing_references(&self) -> Vec<ReferenceSet> {
        let checks = [
            (ReferenceSet::NewbornIcd, self.newborn_icd.is_empty()),
            (ReferenceSet::NewbornRevenue, self.newborn_revenue.is_empty()),
            (ReferenceSet::NicuRevenue, self.nicu_revenue.is_empty()),
            (ReferenceSet::NicuMsDrg, self.nicu_msdrg.is_empty()),
            (ReferenceSet::NicuAprDrg, self.nicu_aprdrg.is_empty()),
            (ReferenceSet::SingletonIcd, self.singleton_icd.is_empty()),
            (ReferenceSet::TwinIcd, self.twin_icd.is_empty()),
            (ReferenceSet::MultipleIcd, self.multiple_icd.is_empty()),
            (ReferenceSet::BirthweightIcd, self.birthweight_icd.is_empty()),
            (ReferenceSet::GestationalAgeIcd, self.gestational_age_icd.is_empty()),
            (ReferenceSet::ManageableCpt, self.manageable_cpt.is_empty()),
            (ReferenceSet::CriticalCareCpt, self.critical_care_cpt.is_empty()),
            (ReferenceSet::NicuRevenueBands, self.nicu_revenue_bands.is_empty()),
        ];
        checks
            .into_iter()
            .filter_map(|(set, empty)| empty.then_some(set))
            .collect()
    }

    /// Whether any diagnosis code is a newborn ICD code
    #[must_use]
    pub fn is_newborn_icd<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.newborn_icd.contains_any(codes)
    }

    /// Whether a revenue code is a newborn revenue code
    #[must_use]
    pub fn is_newborn_revenue(&self, revenue: u32) -> bool {
        self.newborn_revenue.contains(revenue)
    }

    /// Whether a revenue code is in the NICU revenue range
    #[must_use]
    pub fn is_nicu_revenue(&self, revenue: u32) -> bool {
        self.nicu_revenue.contains(revenue)
    }

    /// Whether a DRG base is in the NICU MS-DRG range
    #[must_use]
    pub fn is_nicu_msdrg(&self, drg: u32) -> bool {
        self.nicu_msdrg.contains(drg)
    }

    /// Whether a DRG base is in the NICU APR-DRG range
    #[must_use]
    pub fn is_nicu_aprdrg(&self, drg: u32) -> bool {
        self.nicu_aprdrg.contains(drg)
    }

    /// Whether a DRG base is in either NICU DRG range
    #[must_use]
    pub fn is_nicu_drg(&self, drg: u32) -> bool {
        self.is_nicu_msdrg(drg) || self.is_nicu_aprdrg(drg)
    }

    /// Whether any diagnosis code marks a singleton birth
    #[must_use]
    pub fn is_singleton_icd<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.singleton_icd.contains_any(codes)
    }

    /// Whether any diagnosis code marks a twin birth
    #[must_use]
    pub fn is_twin_icd<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.twin_icd.contains_any(codes)
    }

    /// Whether any diagnosis code marks a higher-order multiple birth
    #[must_use]
    pub fn is_multiple_icd<S: AsRef<str>>(&self, codes: &[S]) -> bool {
        self.multiple_icd.contains_any(codes)
    }

    /// Whether a CPT code is a manageable professional service
    #[must_use]
    pub fn is_manageable_cpt(&self, cpt: &str) -> bool {
        self.manageable_cpt.contains(cpt)
    }

    /// Whether a CPT code is neonatal critical care
    #[must_use]
    pub fn is_critical_care_cpt(&self, cpt: &str) -> bool {
        self.critical_care_cpt.contains(cpt)
    }

    /// Birth-weight category of a diagnosis code
    #[must_use]
    pub fn birthweight_category(&self, code: &str) -> Option<&str> {
        self.birthweight_icd.get(&normalize_code(code)).map(String::as_str)
    }

    /// Gestational-age category of a diagnosis code
    #[must_use]
    pub fn gestational_age_category(&self, code: &str) -> Option<&str> {
        self.gestational_age_icd
            .get(&normalize_code(code))
            .map(String::as_str)
    }

    /// Acuity level of a NICU revenue code
    ///
    /// When bands overlap, the highest level containing the code wins.
    #[must_use]
    pub fn acuity_for_revenue(&self, revenue: u32) -> Option<AcuityLevel> {
        self.nicu_revenue_bands
            .iter()
            .filter(|band| band.start <= revenue && revenue <= band.end)
            .map(|band| band.level)
            .max()
    }
}

/// Builder for [`ReferenceIndex`]
#[derive(Debug, Clone)]
pub struct ReferenceIndexBuilder {
    index: ReferenceIndex,
}

impl Default for ReferenceIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceIndexBuilder {
    /// Create a builder with empty code sets and default CPT sets and bands
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: ReferenceIndex {
                newborn_icd: CodeSet::default(),
                newborn_revenue: CodeRanges::default(),
                nicu_revenue: CodeRanges::default(),
                nicu_msdrg: CodeRanges::default(),
                nicu_aprdrg: CodeRanges::default(),
                singleton_icd: CodeSet::default(),
                twin_icd: CodeSet::default(),
                multiple_icd: CodeSet::default(),
                birthweight_icd: FxHashMap::default(),
                gestational_age_icd: FxHashMap::default(),
                manageable_cpt: CodeSet::from_codes(DEFAULT_MANAGEABLE_CPTS),
                critical_care_cpt: CodeSet::from_codes(DEFAULT_CRITICAL_CARE_CPTS),
                nicu_revenue_bands: default_revenue_bands(),
            },
        }
    }

    /// Set the newborn ICD codes
    #[must_use]
    pub fn newborn_icd<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, codes: I) -> Self {
        self.index.newborn_icd = CodeSet::from_codes(codes);
        self
    }

    /// Set the newborn revenue codes
    #[must_use]
    pub fn newborn_revenue_codes<I: IntoIterator<Item = S>, S: AsRef<str>>(
        mut self,
        codes: I,
    ) -> Self {
        self.index.newborn_revenue = CodeRanges::from_codes(codes);
        self
    }

    /// Set the NICU revenue code ranges
    #[must_use]
    pub fn nicu_revenue_ranges<I: IntoIterator<Item = (u32, u32)>>(mut self, ranges: I) -> Self {
        self.index.nicu_revenue = CodeRanges::from_ranges(ranges);
        self
    }

    /// Set the NICU MS-DRG ranges
    #[must_use]
    pub fn nicu_msdrg_ranges<I: IntoIterator<Item = (u32, u32)>>(mut self, ranges: I) -> Self {
        self.index.nicu_msdrg = CodeRanges::from_ranges(ranges);
        self
    }

    /// Set the NICU APR-DRG ranges
    #[must_use]
    pub fn nicu_aprdrg_ranges<I: IntoIterator<Item = (u32, u32)>>(mut self, ranges: I) -> Self {
        self.index.nicu_aprdrg = CodeRanges::from_ranges(ranges);
        self
    }

    /// Set the singleton-birth ICD codes
    #[must_use]
    pub fn singleton_icd<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, codes: I) -> Self {
        self.index.singleton_icd = CodeSet::from_codes(codes);
        self
    }

    /// Set the twin-birth ICD codes
    #[must_use]
    pub fn twin_icd<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, codes: I) -> Self {
        self.index.twin_icd = CodeSet::from_codes(codes);
        self
    }

    /// Set the higher-order multiple-birth ICD codes
    #[must_use]
    pub fn multiple_icd<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, codes: I) -> Self {
        self.index.multiple_icd = CodeSet::from_codes(codes);
        self
    }

    /// Set the birth-weight categories keyed by ICD code
    #[must_use]
    pub fn birthweight_icd<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(
        mut self,
        codes: I,
    ) -> Self {
        self.index.birthweight_icd = categorized(codes);
        self
    }

    /// Set the gestational-age categories keyed by ICD code
    #[must_use]
    pub fn gestational_age_icd<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(
        mut self,
        codes: I,
    ) -> Self {
        self.index.gestational_age_icd = categorized(codes);
        self
    }

    /// Replace the manageable CPT codes
    #[must_use]
    pub fn manageable_cpt<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, codes: I) -> Self {
        self.index.manageable_cpt = CodeSet::from_codes(codes);
        self
    }

    /// Replace the critical-care CPT codes
    #[must_use]
    pub fn critical_care_cpt<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, codes: I) -> Self {
        self.index.critical_care_cpt = CodeSet::from_codes(codes);
        self
    }

    /// Replace the NICU acuity bands
    #[must_use]
    pub fn nicu_revenue_bands(mut self, bands: Vec<RevenueBand>) -> Self {
        self.index.nicu_revenue_bands = bands;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> ReferenceIndex {
        self.index
    }
}

fn categorized<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(
    codes: I,
) -> FxHashMap<String, String> {
    let mut map = FxHashMap::default();
    for (code, category) in codes {
        let code = normalize_code(code);
        if code.is_empty() {
            continue;
        }
        // Keep the lowest category label when a code is listed twice
        map.entry(code)
            .and_modify(|existing: &mut String| {
                if category < existing.as_str() {
                    *existing = category.to_string();
                }
            })
            .or_insert_with(|| category.to_string());
    }
    map
}

/// Inclusive numeric range as written in reference files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRangeSpec {
    pub start: u32,
    pub end: u32,
}

/// Code with a category label (birth weight, gestational age)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedCode {
    pub code: String,
    pub category: String,
}

/// Reference collections as supplied by the ingestion layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub newborn_icd: Vec<String>,
    pub newborn_revenue_codes: Vec<String>,
    pub nicu_revenue_ranges: Vec<CodeRangeSpec>,
    pub nicu_msdrg_ranges: Vec<CodeRangeSpec>,
    pub nicu_aprdrg_ranges: Vec<CodeRangeSpec>,
    pub singleton_icd: Vec<String>,
    pub twin_icd: Vec<String>,
    pub multiple_icd: Vec<String>,
    pub birthweight_icd: Vec<CategorizedCode>,
    pub gestational_age_icd: Vec<CategorizedCode>,
    pub manageable_cpt: Option<Vec<String>>,
    pub critical_care_cpt: Option<Vec<String>>,
    pub nicu_revenue_bands: Option<Vec<RevenueBand>>,
}
