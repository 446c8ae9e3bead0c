//! Normalized medication registry entries.

use serde::{Deserialize, Serialize};

/// Maximum length (in characters) of a canonical substance name.
pub const MAX_DCI_CHARS: usize = 300;

/// One reimbursable medication, keyed by `(country_code, payer, dci)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub country_code: String,
    pub payer: String,
    pub code: Option<String>,
    pub atc: Option<String>,
    /// International nonproprietary name; never empty.
    pub dci: String,
    pub brand: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub reimbursable: bool,
}

impl MedicationRecord {
    /// A covered substance known only by name.
    pub fn reimbursable(
        country_code: impl Into<String>,
        payer: impl Into<String>,
        dci: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            payer: payer.into(),
            code: None,
            atc: None,
            dci: dci.into(),
            brand: None,
            form: None,
            strength: None,
            reimbursable: true,
        }
    }

    /// Case-insensitive natural key used for deduplication.
    pub fn natural_key(&self) -> (String, String, String) {
        (
            self.country_code.clone(),
            self.payer.clone(),
            self.dci.to_lowercase(),
        )
    }
}
