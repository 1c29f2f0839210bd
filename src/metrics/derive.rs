use crate::error::{Error, Result};
use crate::metrics::derived::{DerivedMetrics, MonthlyPoint, MONTH_LABELS};
use crate::snapshot::{MonthlyEntry, RawSnapshot};

/// Transforms a raw snapshot into display-ready metrics.
///
/// Pure and total: the result depends on nothing but the input, and a single
/// malformed field fails the whole derivation. No partially-populated
/// metrics are ever produced.
pub fn derive_metrics(raw: &RawSnapshot) -> Result<DerivedMetrics> {
    let imobiliarias = parse_count("imobiliarias_total", &raw.imobiliarias_total)?;
    let corretores = parse_count("corretores_total", &raw.corretores_total)?;
    let construtoras = parse_count("construtoras_total", &raw.construtoras_total)?;

    let total_users = checked_sum(
        "corretores_total + imobiliarias_total + construtoras_total",
        [corretores, imobiliarias, construtoras],
    )?;

    let total_subscribers = checked_sum(
        "imobiliarias_premium + imobiliarias_start + corretores_premium + corretores_start",
        [
            parse_count("imobiliarias_premium", &raw.imobiliarias_premium)?,
            parse_count("imobiliarias_start", &raw.imobiliarias_start)?,
            parse_count("corretores_premium", &raw.corretores_premium)?,
            parse_count("corretores_start", &raw.corretores_start)?,
        ],
    )?;

    let vendidos_ext = parse_cents("imoveis_vendidos_ext_value", &raw.imoveis_vendidos_ext_value)?;
    let vendidos = parse_cents("imoveis_vendidos_value", &raw.imoveis_vendidos_value)?;
    let unidades = parse_cents("total_valor_unidades", &raw.total_valor_unidades)?;
    let imoveis = parse_cents("imoveis_valor", &raw.imoveis_valor)?;

    let vendidos_cents = checked_sum(
        "imoveis_vendidos_ext_value + imoveis_vendidos_value",
        [vendidos_ext, vendidos],
    )?;
    let total_cents = checked_sum(
        "total_valor_unidades + imoveis_valor",
        [unidades, imoveis],
    )?;

    let avg_new = parse_count("media_imoveis_novos", &raw.media_imoveis_novos)?;
    let avg_monthly_cents =
        parse_decimal_cents("media_valor_imoveis_novos", &raw.media_valor_imoveis_novos)?;

    Ok(DerivedMetrics {
        imobiliarias,
        corretores,
        construtoras,
        total_users,
        total_subscribers,
        properties_sold: cents_to_units(vendidos_cents),
        units_available_value: cents_to_units(unidades),
        properties_available_value: cents_to_units(imoveis),
        total_property_value: cents_to_units(total_cents),
        avg_new_properties_per_month: avg_new,
        avg_monthly_value: avg_monthly_cents / 100.0,
        monthly_series: assemble_monthly(raw)?,
    })
}

fn cents_to_units(cents: u64) -> f64 {
    cents as f64 / 100.0
}

/// Individually valid fields can still sum past `u64::MAX`; that is a data
/// failure like any other, not a wrap-around.
fn checked_sum<const N: usize>(field: &'static str, values: [u64; N]) -> Result<u64> {
    values
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| Error::parse(field, "sum exceeds u64::MAX"))
}

/// Non-negative decimal-integer string. `u64` parsing rejects signs,
/// whitespace and fractions, which is exactly the data contract.
fn parse_count(field: &'static str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|_| Error::parse(field, value))
}

fn parse_cents(field: &'static str, value: &str) -> Result<u64> {
    parse_count(field, value)
}

/// The one field that may carry a fractional point, still cents-denominated.
fn parse_decimal_cents(field: &'static str, value: &str) -> Result<f64> {
    let parsed = value
        .parse::<f64>()
        .map_err(|_| Error::parse(field, value))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(Error::parse(field, value));
    }
    Ok(parsed)
}

/// Builds the fixed 12-month series.
///
/// Each source series is an ordered sequence of single-entry mappings; the
/// key is arbitrary and ignored. An absent series, a series shorter than the
/// month index, or an empty mapping all contribute 0 for that month. A
/// mapping with more than one key is ambiguous and rejected.
fn assemble_monthly(raw: &RawSnapshot) -> Result<Vec<MonthlyPoint>> {
    MONTH_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            Ok(MonthlyPoint {
                month: (*label).to_string(),
                compartilhamentos: month_value("shares_mes", raw.shares_mes.as_deref(), i)?,
                conversas: month_value("talks_mes", raw.talks_mes.as_deref(), i)?,
                visualizacoes: month_value("views_mes", raw.views_mes.as_deref(), i)?,
                downloads: month_value("downloads_mes", raw.downloads_mes.as_deref(), i)?,
            })
        })
        .collect()
}

fn month_value(
    field: &'static str,
    series: Option<&[MonthlyEntry]>,
    index: usize,
) -> Result<f64> {
    let Some(entry) = series.and_then(|s| s.get(index)) else {
        return Ok(0.0);
    };
    match entry.len() {
        0 => Ok(0.0),
        1 => Ok(*entry.values().next().unwrap_or(&0.0)),
        n => Err(Error::Parse {
            field,
            value: format!("entry {index} has {n} keys, expected at most 1"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_snapshot() -> RawSnapshot {
        RawSnapshot {
            imobiliarias_total: "10".into(),
            corretores_total: "20".into(),
            construtoras_total: "5".into(),
            imobiliarias_premium: "1".into(),
            imobiliarias_start: "2".into(),
            corretores_premium: "3".into(),
            corretores_start: "4".into(),
            imoveis_vendidos_ext_value: "150000".into(),
            imoveis_vendidos_value: "50000".into(),
            total_valor_unidades: "100000".into(),
            imoveis_valor: "200000".into(),
            media_imoveis_novos: "7".into(),
            media_valor_imoveis_novos: "123456.0".into(),
            shares_mes: None,
            talks_mes: None,
            views_mes: None,
            downloads_mes: None,
        }
    }

    fn entry(key: &str, value: f64) -> HashMap<String, f64> {
        HashMap::from([(key.to_string(), value)])
    }

    #[test]
    fn totals_are_sums_of_their_fields() {
        let derived = derive_metrics(&base_snapshot()).unwrap();
        assert_eq!(derived.total_users, 35);
        assert_eq!(derived.total_subscribers, 10);
        assert_eq!(derived.imobiliarias, 10);
        assert_eq!(derived.corretores, 20);
        assert_eq!(derived.construtoras, 5);
    }

    #[test]
    fn totals_hold_at_zero() {
        let mut raw = base_snapshot();
        raw.imobiliarias_total = "0".into();
        raw.corretores_total = "0".into();
        raw.construtoras_total = "0".into();
        assert_eq!(derive_metrics(&raw).unwrap().total_users, 0);
    }

    #[test]
    fn cents_convert_to_whole_currency_units() {
        let derived = derive_metrics(&base_snapshot()).unwrap();
        assert_eq!(derived.properties_sold, 2000.00);
        assert_eq!(derived.units_available_value, 1000.00);
        assert_eq!(derived.properties_available_value, 2000.00);
        assert_eq!(derived.total_property_value, 3000.00);
    }

    #[test]
    fn cents_conversion_round_trips_within_tolerance() {
        let mut raw = base_snapshot();
        raw.total_valor_unidades = "987654321".into();
        let derived = derive_metrics(&raw).unwrap();
        assert!((derived.units_available_value * 100.0 - 987_654_321.0).abs() < 1e-9);
    }

    #[test]
    fn decimal_cents_field_converts() {
        let derived = derive_metrics(&base_snapshot()).unwrap();
        assert!((derived.avg_monthly_value - 1234.56).abs() < 1e-9);
        assert_eq!(derived.avg_new_properties_per_month, 7);
    }

    #[test]
    fn monthly_series_always_has_twelve_entries() {
        let mut raw = base_snapshot();
        // Absent, short, and exact-length series all normalize to 12.
        let derived = derive_metrics(&raw).unwrap();
        assert_eq!(derived.monthly_series.len(), 12);

        raw.talks_mes = Some(vec![entry("0", 1.0); 3]);
        raw.views_mes = Some((0..12).map(|i| entry(&i.to_string(), i as f64)).collect());
        let derived = derive_metrics(&raw).unwrap();
        assert_eq!(derived.monthly_series.len(), 12);
        assert_eq!(derived.monthly_series[2].conversas, 1.0);
        assert_eq!(derived.monthly_series[3].conversas, 0.0);
        assert_eq!(derived.monthly_series[11].visualizacoes, 11.0);
    }

    #[test]
    fn shares_land_on_their_month_and_missing_months_are_zero() {
        let mut raw = base_snapshot();
        raw.shares_mes = Some(vec![entry("0", 5.0), entry("1", 3.0)]);
        let derived = derive_metrics(&raw).unwrap();

        assert_eq!(derived.monthly_series[0].month, "Jan");
        assert_eq!(derived.monthly_series[0].compartilhamentos, 5.0);
        assert_eq!(derived.monthly_series[1].compartilhamentos, 3.0);
        for point in &derived.monthly_series[2..] {
            assert_eq!(point.compartilhamentos, 0.0);
        }
        for point in &derived.monthly_series {
            assert_eq!(point.conversas, 0.0);
            assert_eq!(point.visualizacoes, 0.0);
            assert_eq!(point.downloads, 0.0);
        }
    }

    #[test]
    fn monthly_entry_key_is_ignored() {
        let mut raw = base_snapshot();
        raw.downloads_mes = Some(vec![entry("42", 9.0)]);
        let derived = derive_metrics(&raw).unwrap();
        assert_eq!(derived.monthly_series[0].downloads, 9.0);
    }

    #[test]
    fn empty_monthly_entry_defaults_to_zero() {
        let mut raw = base_snapshot();
        raw.views_mes = Some(vec![HashMap::new(), entry("1", 4.0)]);
        let derived = derive_metrics(&raw).unwrap();
        assert_eq!(derived.monthly_series[0].visualizacoes, 0.0);
        assert_eq!(derived.monthly_series[1].visualizacoes, 4.0);
    }

    #[test]
    fn multi_key_monthly_entry_is_rejected() {
        let mut raw = base_snapshot();
        let mut bad = entry("0", 1.0);
        bad.insert("1".into(), 2.0);
        raw.shares_mes = Some(vec![bad]);

        match derive_metrics(&raw) {
            Err(Error::Parse { field, .. }) => assert_eq!(field, "shares_mes"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_count_fails_naming_the_field() {
        let mut raw = base_snapshot();
        raw.imobiliarias_total = "abc".into();

        match derive_metrics(&raw) {
            Err(Error::Parse { field, value }) => {
                assert_eq!(field, "imobiliarias_total");
                assert_eq!(value, "abc");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn negative_and_fractional_counts_are_rejected() {
        let mut raw = base_snapshot();
        raw.corretores_total = "-1".into();
        assert!(matches!(derive_metrics(&raw), Err(Error::Parse { .. })));

        let mut raw = base_snapshot();
        raw.total_valor_unidades = "12.5".into();
        assert!(matches!(derive_metrics(&raw), Err(Error::Parse { .. })));
    }

    #[test]
    fn overflowing_cents_sum_is_rejected_not_wrapped() {
        // Each field parses on its own; only the sum is out of range.
        let mut raw = base_snapshot();
        raw.imoveis_vendidos_ext_value = u64::MAX.to_string();
        raw.imoveis_vendidos_value = "1".into();

        match derive_metrics(&raw) {
            Err(Error::Parse { field, .. }) => {
                assert_eq!(field, "imoveis_vendidos_ext_value + imoveis_vendidos_value");
            }
            other => panic!("expected parse error, got {other:?}"),
        }

        let mut raw = base_snapshot();
        raw.total_valor_unidades = u64::MAX.to_string();
        raw.imoveis_valor = "1".into();
        match derive_metrics(&raw) {
            Err(Error::Parse { field, .. }) => {
                assert_eq!(field, "total_valor_unidades + imoveis_valor");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_count_sums_are_rejected() {
        let mut raw = base_snapshot();
        raw.corretores_total = u64::MAX.to_string();
        raw.imobiliarias_total = "1".into();
        assert!(matches!(derive_metrics(&raw), Err(Error::Parse { .. })));

        let mut raw = base_snapshot();
        raw.imobiliarias_premium = u64::MAX.to_string();
        raw.corretores_start = "1".into();
        assert!(matches!(derive_metrics(&raw), Err(Error::Parse { .. })));
    }

    #[test]
    fn maximal_single_fields_still_derive() {
        // u64::MAX in one addend with zero partners stays in range.
        let mut raw = base_snapshot();
        raw.imoveis_vendidos_ext_value = u64::MAX.to_string();
        raw.imoveis_vendidos_value = "0".into();
        let derived = derive_metrics(&raw).unwrap();
        assert!((derived.properties_sold * 100.0 - u64::MAX as f64).abs() / (u64::MAX as f64) < 1e-9);
    }

    #[test]
    fn negative_decimal_cents_are_rejected() {
        let mut raw = base_snapshot();
        raw.media_valor_imoveis_novos = "-10.0".into();
        match derive_metrics(&raw) {
            Err(Error::Parse { field, .. }) => assert_eq!(field, "media_valor_imoveis_novos"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
