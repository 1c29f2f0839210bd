use serde::Deserialize;
use std::collections::HashMap;

/// One monthly data point as delivered by the endpoint: a single-entry
/// mapping from an arbitrary numeric key to the metric value for that month.
pub type MonthlyEntry = HashMap<String, f64>;

/// The raw metrics payload returned by the aggregation endpoint.
///
/// Every count and monetary amount arrives as a decimal string; monetary
/// amounts are denominated in cents. Nothing is parsed here — derivation
/// (`metrics::derive_metrics`) owns the numeric contract.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSnapshot {
    pub imobiliarias_total: String,
    pub corretores_total: String,
    pub construtoras_total: String,

    pub imobiliarias_premium: String,
    pub imobiliarias_start: String,
    pub corretores_premium: String,
    pub corretores_start: String,

    pub imoveis_vendidos_ext_value: String,
    pub imoveis_vendidos_value: String,
    pub total_valor_unidades: String,
    pub imoveis_valor: String,

    pub media_imoveis_novos: String,
    pub media_valor_imoveis_novos: String,

    #[serde(default)]
    pub shares_mes: Option<Vec<MonthlyEntry>>,
    #[serde(default)]
    pub talks_mes: Option<Vec<MonthlyEntry>>,
    #[serde(default)]
    pub views_mes: Option<Vec<MonthlyEntry>>,
    #[serde(default)]
    pub downloads_mes: Option<Vec<MonthlyEntry>>,
}
