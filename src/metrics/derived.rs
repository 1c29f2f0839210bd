use serde::{Deserialize, Serialize};

/// Calendar-month labels, pt-BR abbreviations, chart order.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Engagement metrics for one calendar month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub compartilhamentos: f64,
    pub conversas: f64,
    pub visualizacoes: f64,
    pub downloads: f64,
}

/// Display-ready values computed from a `RawSnapshot`.
///
/// Monetary fields are whole currency units (the raw payload carries cents).
/// Recomputed from scratch on every new snapshot; never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub imobiliarias: u64,
    pub corretores: u64,
    pub construtoras: u64,

    pub total_users: u64,
    pub total_subscribers: u64,

    pub properties_sold: f64,
    pub units_available_value: f64,
    pub properties_available_value: f64,
    pub total_property_value: f64,

    pub avg_new_properties_per_month: u64,
    pub avg_monthly_value: f64,

    /// Always exactly 12 entries, January through December.
    pub monthly_series: Vec<MonthlyPoint>,
}
