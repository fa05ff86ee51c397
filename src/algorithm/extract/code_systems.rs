//! Code system OIDs recognized by the extraction walker

/// ICD-10 diagnosis codes (mkb10)
pub const MKB10: &str = "1.2.643.5.1.13.13.11.1005";

/// Medical service codes (NMU)
pub const SERVICE: &str = "1.2.643.5.1.13.13.11.1070";

/// Instrumental diagnostics codes
pub const INSTRUMENTAL: &str = "1.2.643.5.1.13.13.11.1471";

/// Diagnosis accuracy codes (code1076)
pub const ACCURACY: &str = "1.2.643.5.1.13.13.11.1076";

/// Diagnosis accuracy codes, successor registry (code1076)
pub const ACCURACY_V2: &str = "1.2.643.5.1.13.13.99.2.795";

/// Diagnosis kind codes (code1077); `1` marks a primary diagnosis
pub const KIND: &str = "1.2.643.5.1.13.13.11.1077";
