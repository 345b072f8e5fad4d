//! Sheet and column names of the input and output workbooks.

/// Input workbook read when no path is given.
pub const DEFAULT_INPUT_FILE: &str = "Technical Test.xls";
/// Output workbook written when no path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "technical_test_output.xlsx";

pub mod sheet {
    pub const DEMOGRAPHICS: &str = "Demographics";
    pub const EXTRA_INFO: &str = "Extra information";
    pub const STUDY_DATA: &str = "Study Data";
    pub const EXCEPTION_LIST: &str = "Exception List";
    pub const PIVOT_TABLE: &str = "Pivot Table";

    /// Every sheet the input workbook must carry, in output order.
    pub const ALL: [&str; 5] = [
        DEMOGRAPHICS,
        EXTRA_INFO,
        STUDY_DATA,
        EXCEPTION_LIST,
        PIVOT_TABLE,
    ];
}

pub mod column {
    // Demographics source columns.
    pub const NRIC: &str = "NRIC";
    pub const GENDER: &str = "Gender";
    pub const AGE: &str = "Age";
    pub const MARITAL_STATUS: &str = "Marital Status";

    // Derived demographic columns.
    pub const NEW_NRIC: &str = "New NRIC";
    pub const GENDER_CODE: &str = "Coding - Gender";
    pub const AGE_GROUP: &str = "Age Group";
    pub const STUDY_NUMBER: &str = "Study Number";

    // Extra information columns.
    pub const ETHNIC_GROUP: &str = "Ethnic Group";
    pub const ADDRESS_1: &str = "Address 1";
    pub const ADDRESS_2: &str = "Address 2";
    pub const CONTACT_NUMBER: &str = "Contact Number";

    // Study data key.
    pub const OLD_NRIC: &str = "Old NRIC";

    // Exception list columns.
    pub const UNIQUE_NRIC: &str = "No. of unique NRIC";
    pub const MISSING_NRIC: &str = "No. of NRIC not found in Extra Information";

    // Pivot table columns.
    pub const PIVOT_LABEL: &str = "label";
    pub const PIVOT_COUNT: &str = "count";
}
