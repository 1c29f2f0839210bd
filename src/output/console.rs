use super::OutputHandler;
use crate::error::Result;
use crate::format::{format_brl, format_count};
use crate::metrics::DerivedMetrics;
use async_trait::async_trait;
use indicatif::MultiProgress;
use std::sync::Arc;

pub struct ConsoleOutput {
    multi: Option<Arc<MultiProgress>>,
}

impl ConsoleOutput {
    pub fn new(multi: Option<Arc<MultiProgress>>) -> Self {
        Self { multi }
    }

    fn render(metrics: &DerivedMetrics) -> Vec<String> {
        let mut lines = Vec::new();

        lines.push(String::new());
        for (label, value) in [
            ("Imobiliárias", format_count(metrics.imobiliarias)),
            ("Corretores", format_count(metrics.corretores)),
            ("Construtoras", format_count(metrics.construtoras)),
            ("Total de Usuários", format_count(metrics.total_users)),
            ("Assinantes", format_count(metrics.total_subscribers)),
            ("Imóveis Vendidos", format_brl(metrics.properties_sold)),
            ("Unidades Disponíveis", format_brl(metrics.units_available_value)),
            ("Imóveis Disponíveis", format_brl(metrics.properties_available_value)),
            ("Valor Total de Imóveis", format_brl(metrics.total_property_value)),
            (
                "Média de Novos Imóveis/mês",
                format_count(metrics.avg_new_properties_per_month),
            ),
            ("Valor Médio Mensal", format_brl(metrics.avg_monthly_value)),
        ] {
            lines.push(format!("   {:<28} {}", label, value));
        }

        lines.push(String::new());
        lines.push(format!(
            "   {:<4} {:>18} {:>10} {:>14} {:>10}",
            "Mês", "Compartilhamentos", "Conversas", "Visualizações", "Downloads"
        ));
        for point in &metrics.monthly_series {
            lines.push(format!(
                "   {:<4} {:>18} {:>10} {:>14} {:>10}",
                point.month,
                point.compartilhamentos,
                point.conversas,
                point.visualizacoes,
                point.downloads
            ));
        }

        lines
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl OutputHandler for ConsoleOutput {
    async fn write(&mut self, metrics: &DerivedMetrics) -> Result<()> {
        let lines = Self::render(metrics);

        if let Some(multi) = &self.multi {
            for line in lines {
                multi
                    .println(line)
                    .map_err(|e| crate::error::Error::Internal(e.to_string()))?;
            }
        } else {
            for line in lines {
                println!("{}", line);
            }
        }
        Ok(())
    }
}
