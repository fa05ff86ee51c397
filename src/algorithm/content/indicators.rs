//! Expected content-indicator catalog per SEMD document type
//!
//! This is reporting data, not logic: keys, Russian labels and the
//! free-text minimum-length rule are part of the report contract and must
//! stay stable.

/// Minimum length for a free-text indicator to count as filled
pub const INDICATOR_MIN_LENGTH: usize = 5;

/// Sentinel for document types with no defined indicators
pub const NOT_ANALYZED: &str = "Анализ не проводился.";

/// Error text when content extraction failed entirely
pub const VALIDATION_FAILED: &str = "Ошибка валидации при отправке.";

/// One expected content indicator of a document type
#[derive(Debug, Clone, Copy)]
pub struct Indicator {
    /// Extraction key
    pub key: &'static str,
    /// Human-readable report label
    pub label: &'static str,
    /// Free-text indicator: values shorter than
    /// [`INDICATOR_MIN_LENGTH`] count as empty
    pub free_text: bool,
}

const fn coded(key: &'static str, label: &'static str) -> Indicator {
    Indicator {
        key,
        label,
        free_text: false,
    }
}

const fn free_text(key: &'static str, label: &'static str) -> Indicator {
    Indicator {
        key,
        label,
        free_text: true,
    }
}

const TYPE_1: &[Indicator] = &[
    coded("recipient", "МО напр."),
    coded("purpose", "цель напр."),
    coded("service", "услуга напр."),
];

const TYPE_2: &[Indicator] = &[
    free_text("protocol", "протокол"),
    free_text("conclusion", "заключение"),
    free_text("recommendation", "рекомендации"),
];

const TYPE_3: &[Indicator] = &[coded("laboratory_tests", "лаб. иссл.")];

const TYPE_4: &[Indicator] = &[coded("histological_tests", "гист. иссл.")];

const TYPE_6: &[Indicator] = &[
    coded("date", "дата консилиума"),
    coded("number", "номер протокола"),
    coded("purpose", "цель консилиума"),
    coded("form", "форма проведения"),
    coded("conclusion", "решение консилиума"),
    coded("diagnostics", "инстр. иссл."),
    coded("laboratory_tests", "лаб. иссл."),
    coded("treatments", "лечение"),
];

const TYPE_8: &[Indicator] = &[
    coded("date_start", "дата начала госп."),
    coded("urgency", "срочность госп."),
    coded("stateadm", "состояние при поступлении"),
    coded("date_end", "дата окончания госп."),
    coded("statedis", "состояние при выписке"),
    coded("result", "результат госп."),
    coded("consultations", "консультации"),
    coded("diagnostics", "инстр. иссл."),
    coded("laboratory_tests", "лаб. иссл."),
    coded("morphology_tests", "морф. иссл."),
    coded("sum_drug", "медикаментозное лечение"),
    coded("ray_therapy", "лучевая терапия"),
    coded("chemo_therapy", "химиотерапия"),
    coded("hormone_therapy", "гормонотерапия"),
    coded("sur", "операции"),
];

const TYPE_9: &[Indicator] = &[coded("cytological_tests", "цит. иссл.")];

const TYPE_10: &[Indicator] = &[
    coded("sur", "операция"),
    coded("date_start", "дата-время начала операции"),
];

const TYPE_11: &[Indicator] = &[
    coded("late_reason", "причины поздней диагностики"),
    coded("tnm", "TNM"),
    coded("stage", "стадия"),
    coded("side", "сторона поражения"),
    coded("morph_class", "морф. тип"),
    coded("clinical_group", "клин. группа"),
    coded("how_discover", "обст. выявления"),
    coded("topograph", "топография"),
    coded("loc_far_met", "локализация"),
    coded("tumor_number", "номер опухоли"),
    coded("tumor_main", "признак основной опухоли"),
    coded("plural", "вид первично-множественной опухоли"),
    coded("method", "метод подтверждения"),
];

const TYPE_12: &[Indicator] = &[
    coded("date_start", "дата начала лечения"),
    coded("date_end", "дата окончания лечения"),
    coded("order", "порядок обращения"),
    coded("result", "результат"),
    coded("consultations", "консультации"),
    coded("diagnostics", "инстр. иссл."),
    coded("laboratory_tests", "лаб. иссл."),
    coded("morphology_tests", "морф. иссл."),
    coded("sum_drug", "медикаментозное лечение"),
    coded("sur", "операции"),
];

const TYPE_27: &[Indicator] = &[
    coded("recipient", "МО напр."),
    coded("service", "услуга напр."),
];

const TYPE_37: &[Indicator] = &[
    coded("recipient", "МО напр."),
    coded("tnm", "TNM"),
    coded("stage", "стадия"),
    coded("side", "сторона поражения"),
    coded("morph_class", "морф. тип"),
    coded("clinical_group", "клин. группа"),
    coded("how_discover", "обст. выявления"),
    coded("topograph", "топография"),
    coded("loc_far_met", "локализация"),
    coded("tumor_number", "номер опухоли"),
    coded("tumor_main", "признак основной опухоли"),
    coded("plural", "вид первично-множественной опухоли"),
    coded("method", "метод подтверждения"),
];

/// The expected-indicator catalog of a document type; `None` for types
/// with no defined indicators
#[must_use]
pub fn indicators_for(document_type: &str) -> Option<&'static [Indicator]> {
    match document_type {
        "1" => Some(TYPE_1),
        "2" | "20" => Some(TYPE_2),
        "3" => Some(TYPE_3),
        "4" => Some(TYPE_4),
        "5" => Some(TYPE_2),
        "6" => Some(TYPE_6),
        "8" => Some(TYPE_8),
        "9" => Some(TYPE_9),
        "10" => Some(TYPE_10),
        "11" => Some(TYPE_11),
        "12" => Some(TYPE_12),
        "27" => Some(TYPE_27),
        "37" => Some(TYPE_37),
        _ => None,
    }
}
