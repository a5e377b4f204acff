//! Presentation data derived from an allocation: cost estimate, tips, and
//! bar-chart series.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::allocation::{AllocatedLine, AllocationResult};
use crate::store::ConsumptionRow;

/// Default electricity tariff per kWh.
pub const DEFAULT_RATE_PER_KWH: f64 = 10.90;
/// Default currency symbol for cost estimates.
pub const DEFAULT_CURRENCY: &str = "₹";
/// Default share above which an appliance gets a saving tip.
pub const DEFAULT_HIGH_USAGE_THRESHOLD: f64 = 1500.0;

/// Display settings for usage reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub rate_per_kwh: f64,
    pub currency: String,
    pub high_usage_threshold: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            rate_per_kwh: DEFAULT_RATE_PER_KWH,
            currency: DEFAULT_CURRENCY.to_string(),
            high_usage_threshold: DEFAULT_HIGH_USAGE_THRESHOLD,
        }
    }
}

/// One bar of a horizontal bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
}

impl ChartBar {
    /// Builds one bar per stored row, in row order.
    pub fn from_rows(rows: &[ConsumptionRow]) -> Vec<Self> {
        rows.iter()
            .map(|r| Self {
                label: r.appliance.clone(),
                value: r.share_kwh,
            })
            .collect()
    }
}

/// Everything the dashboard shows after a calculation.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    /// Allocated lines in request order.
    pub lines: Vec<AllocatedLine>,
    /// Metered total the lines were reconciled against.
    pub total_energy: f64,
    /// `total_energy * rate_per_kwh`.
    pub monthly_cost: f64,
    pub currency: String,
    /// Share above which a line is flagged.
    pub high_usage_threshold: f64,
    /// One saving tip per line above the high-usage threshold.
    pub tips: Vec<String>,
}

impl UsageReport {
    pub fn new(result: &AllocationResult, settings: &ReportSettings) -> Self {
        let tips = result
            .lines
            .iter()
            .filter(|l| l.share > settings.high_usage_threshold)
            .map(|l| saving_tip(&l.name))
            .collect();

        Self {
            lines: result.lines.clone(),
            total_energy: result.total_energy,
            monthly_cost: monthly_cost(result.total_energy, settings.rate_per_kwh),
            currency: settings.currency.clone(),
            high_usage_threshold: settings.high_usage_threshold,
            tips,
        }
    }

    /// Bar-chart series keyed by appliance name.
    pub fn chart_series(&self) -> Vec<ChartBar> {
        self.lines
            .iter()
            .map(|l| ChartBar {
                label: l.name.clone(),
                value: l.share,
            })
            .collect()
    }
}

/// Display-only cost estimate for a metered total.
pub fn monthly_cost(total_energy: f64, rate_per_kwh: f64) -> f64 {
    total_energy * rate_per_kwh
}

fn saving_tip(appliance: &str) -> String {
    format!("High usage of {appliance}. Consider reducing usage or using efficient models.")
}

/// Renders a text horizontal bar chart, one row per bar.
///
/// Bars are scaled so the largest value spans `width` cells. Non-positive
/// values draw an empty bar.
pub fn render_bar_chart(bars: &[ChartBar], width: usize) -> String {
    let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for bar in bars {
        let cells = if max > 0.0 && bar.value > 0.0 {
            ((bar.value / max) * width as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<label_width$} │{} {:.2}",
            bar.label,
            "█".repeat(cells),
            bar.value,
        );
    }
    out
}

/// Writes a fixed-width appliance table.
pub fn write_table<'a>(
    f: &mut impl fmt::Write,
    rows: impl IntoIterator<Item = (&'a str, u32, f64)>,
) -> fmt::Result {
    writeln!(f, "{:<20} {:>8} {:>14}", "Appliance", "Quantity", "Energy (kWh)")?;
    for (name, quantity, share) in rows {
        writeln!(f, "{name:<20} {quantity:>8} {share:>14.2}")?;
    }
    Ok(())
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_table(
            f,
            self.lines.iter().map(|l| (l.name.as_str(), l.quantity, l.share)),
        )?;
        writeln!(f)?;
        writeln!(f, "Total EB reading used:   {:.2} kWh", self.total_energy)?;
        write!(
            f,
            "Estimated monthly cost:  {}{:.2}",
            self.currency, self.monthly_cost
        )?;
        if !self.tips.is_empty() {
            writeln!(f)?;
            write!(f, "\nEnergy-saving tips:")?;
            for tip in &self.tips {
                write!(f, "\n  - {tip}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{AllocationRequest, allocate};
    use crate::appliances::ApplianceCatalog;

    fn report(lines: &[(&str, u32)], total: f64) -> UsageReport {
        let catalog = ApplianceCatalog::builtin();
        let result = allocate(&catalog, &AllocationRequest::new(lines.iter().copied(), total));
        UsageReport::new(&result, &ReportSettings::default())
    }

    #[test]
    fn monthly_cost_uses_total_reading() {
        let r = report(&[("Refrigerator", 1), ("Fan", 2)], 100.0);
        assert!((r.monthly_cost - 1090.0).abs() < 1e-9);
        assert_eq!(r.currency, "₹");
    }

    #[test]
    fn tips_only_above_threshold() {
        // weights 2000 and 20 → roughly 2970 and 30 kWh
        let r = report(&[("Air Conditioner", 1), ("Light", 2)], 3000.0);
        assert_eq!(r.tips.len(), 1);
        assert!(r.tips[0].starts_with("High usage of Air Conditioner."));
    }

    #[test]
    fn share_equal_to_threshold_gets_no_tip() {
        let r = report(&[("TV", 1)], 1500.0);
        assert!(r.tips.is_empty());
    }

    #[test]
    fn chart_series_follows_line_order() {
        let r = report(&[("Fan", 1), ("TV", 1)], 35.0);
        let labels: Vec<String> = r.chart_series().into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Fan", "TV"]);
    }

    #[test]
    fn bar_chart_scales_to_width() {
        let bars = vec![
            ChartBar {
                label: "Oven".into(),
                value: 10.0,
            },
            ChartBar {
                label: "TV".into(),
                value: 5.0,
            },
        ];
        let chart = render_bar_chart(&bars, 10);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].matches('█').count(), 10);
        assert_eq!(lines[1].matches('█').count(), 5);
        assert!(lines[1].starts_with("TV   │"));
    }

    #[test]
    fn bar_chart_all_zero() {
        let bars = vec![ChartBar {
            label: "Fan".into(),
            value: 0.0,
        }];
        assert_eq!(render_bar_chart(&bars, 10), "Fan │ 0.00\n");
    }

    #[test]
    fn display_includes_totals_and_tips() {
        let r = report(&[("Heater", 1)], 2000.0);
        let text = r.to_string();
        assert!(text.contains("Heater"));
        assert!(text.contains("Total EB reading used:   2000.00 kWh"));
        assert!(text.contains("₹21800.00"));
        assert!(text.contains("High usage of Heater."));
    }
}
