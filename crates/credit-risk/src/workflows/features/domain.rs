use serde::{Deserialize, Serialize};

/// Column names shared by the raw application table and the engineered table.
pub mod columns {
    pub const SK_ID_CURR: &str = "SK_ID_CURR";
    pub const TARGET: &str = "TARGET";
    pub const NAME_CONTRACT_TYPE: &str = "NAME_CONTRACT_TYPE";

    pub const DAYS_BIRTH: &str = "DAYS_BIRTH";
    pub const DAYS_EMPLOYED: &str = "DAYS_EMPLOYED";
    pub const AMT_CREDIT: &str = "AMT_CREDIT";
    pub const AMT_INCOME_TOTAL: &str = "AMT_INCOME_TOTAL";
    pub const AMT_ANNUITY: &str = "AMT_ANNUITY";
    pub const CNT_FAM_MEMBERS: &str = "CNT_FAM_MEMBERS";

    pub const CREDIT_INCOME_RATIO: &str = "CREDIT_INCOME_RATIO";
    pub const ANNUITY_INCOME_RATIO: &str = "ANNUITY_INCOME_RATIO";
    pub const CREDIT_TERM: &str = "CREDIT_TERM";
    pub const AGE_YEARS: &str = "AGE_YEARS";

    pub const INCOME_PER_PERSON: &str = "INCOME_PER_PERSON";
    pub const DAYS_EMPLOYED_PERCENT: &str = "DAYS_EMPLOYED_PERCENT";
}

/// Columns every raw application table must carry before assembly.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    columns::DAYS_BIRTH,
    columns::DAYS_EMPLOYED,
    columns::AMT_CREDIT,
    columns::AMT_INCOME_TOTAL,
    columns::AMT_ANNUITY,
    columns::CNT_FAM_MEMBERS,
];

/// Raw `DAYS_EMPLOYED` placeholder meaning "not employed / unknown".
pub const DAYS_EMPLOYED_SENTINEL: f64 = 365_243.0;

pub const DAYS_PER_YEAR: f64 = 365.0;

/// One loan application row. `None` is the missing marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ApplicantRecord {
    #[serde(default)]
    pub sk_id_curr: Option<f64>,
    pub days_birth: Option<f64>,
    pub days_employed: Option<f64>,
    pub amt_credit: Option<f64>,
    pub amt_income_total: Option<f64>,
    pub amt_annuity: Option<f64>,
    pub cnt_fam_members: Option<f64>,
    #[serde(default)]
    pub target: Option<u8>,
    #[serde(default)]
    pub name_contract_type: Option<String>,
}
