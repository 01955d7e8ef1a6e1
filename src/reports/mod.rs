//! Report documents and their PDF/CSV encodings.
//!
//! A [`ReportDocument`] is the format-neutral content of an export: title,
//! generation time, summary lines and record tables. The `pdf` and `csv`
//! modules render it.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::config::ReportConfig;
use crate::entities::TransactionModel;
use crate::services::analytics::AnalyticsReport;
use crate::services::inventory::TransactionBoard;

pub mod csv;
pub mod pdf;

/// Output encoding of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(anyhow!("unsupported report format: {}", other)),
        }
    }
}

/// Which export is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    MaterialAnalytics,
    TransactionReport,
}

impl ReportKind {
    /// Base of the exported filename, taken from configuration.
    pub fn file_stem<'a>(&self, config: &'a ReportConfig) -> &'a str {
        match self {
            ReportKind::MaterialAnalytics => &config.name,
            ReportKind::TransactionReport => &config.transaction_name,
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::MaterialAnalytics => write!(f, "material-analytics"),
            ReportKind::TransactionReport => write!(f, "transaction-report"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "material-analytics" => Ok(ReportKind::MaterialAnalytics),
            "transaction-report" => Ok(ReportKind::TransactionReport),
            other => Err(anyhow!("unknown report: {}", other)),
        }
    }
}

/// `<report-name>-<YYYY-MM-DD>.<ext>`
pub fn report_filename(name: &str, generated_at: DateTime<Utc>, format: ReportFormat) -> String {
    format!(
        "{}-{}.{}",
        name,
        generated_at.format("%Y-%m-%d"),
        format.extension()
    )
}

/// A rendered export ready to be written or served.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Header colouring of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTone {
    /// Stock and approved records
    Positive,
    /// Rejections
    Rejection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub heading: String,
    pub tone: TableTone,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(heading: &str, tone: TableTone, columns: &[&str]) -> Self {
        Self {
            heading: heading.to_string(),
            tone,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub label: String,
    pub value: String,
}

impl SummaryLine {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Vec<SummaryLine>,
    pub tables: Vec<ReportTable>,
}

impl ReportDocument {
    pub fn generated_line(&self) -> String {
        format!(
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

pub(crate) fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Formats an amount the way Indonesian invoices do: `Rp 1.250.000,50`.
/// The fraction is only printed when it is not zero.
pub fn format_money(prefix: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();
    let whole = abs.trunc();
    let fraction = ((abs - whole) * Decimal::ONE_HUNDRED).trunc();

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if fraction.is_zero() {
        format!("{}{}{}", sign, prefix, grouped)
    } else {
        format!("{}{}{},{:0>2}", sign, prefix, grouped, fraction.to_string())
    }
}

/// Content of the material analytics export.
pub fn material_analytics_document(report: &AnalyticsReport, currency_prefix: &str) -> ReportDocument {
    let metrics = &report.metrics;
    let records = &report.records;
    let money = |amount: Decimal| format_money(currency_prefix, amount);

    let summary = vec![
        SummaryLine::new("Total Inventory Value", money(metrics.total_value)),
        SummaryLine::new("Total Stock", metrics.total_stock.to_string()),
        SummaryLine::new("Total Rejected", metrics.total_rejected.to_string()),
        SummaryLine::new("Quality Pass Rate", format!("{}%", metrics.pass_rate)),
    ];

    let mut products = ReportTable::new(
        "Products",
        TableTone::Positive,
        &["Date", "Material", "Category", "Color", "Quantity", "Price", "Total Value"],
    );
    products.rows = records
        .products
        .iter()
        .map(|p| {
            vec![
                format_date(p.created_at),
                p.name.clone(),
                p.category.clone(),
                p.color.clone().unwrap_or_else(|| "-".to_string()),
                p.quantity.to_string(),
                money(p.price),
                money(p.value()),
            ]
        })
        .collect();

    let mut rejected = ReportTable::new(
        "Rejected Items",
        TableTone::Rejection,
        &["Date", "Material", "Quantity", "Reason"],
    );
    rejected.rows = records
        .rejected_items
        .iter()
        .map(|r| {
            vec![
                format_date(r.created_at),
                r.product_name.clone(),
                r.quantity.to_string(),
                r.reason.clone(),
            ]
        })
        .collect();

    let mut inspections = ReportTable::new(
        "Quality Inspections",
        TableTone::Positive,
        &["Date", "Material", "Condition", "Fit for Processing"],
    );
    inspections.rows = records
        .food_conditions
        .iter()
        .map(|c| {
            vec![
                format_date(c.inspection_date),
                c.product_name.clone(),
                c.condition.clone(),
                if c.fit_for_processing { "Yes" } else { "No" }.to_string(),
            ]
        })
        .collect();

    ReportDocument {
        title: "Material Analytics Report".to_string(),
        generated_at: report.generated_at,
        summary,
        tables: vec![products, rejected, inspections],
    }
}

fn transaction_rows(rows: &[TransactionModel], currency_prefix: &str) -> Vec<Vec<String>> {
    rows.iter()
        .map(|t| {
            vec![
                format_date(t.transaction_date),
                t.product_name.clone(),
                t.quantity.to_string(),
                format_money(currency_prefix, t.amount),
                t.notes.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect()
}

/// Content of the transaction export: approved and rejected tables.
pub fn transaction_document(
    board: &TransactionBoard,
    generated_at: DateTime<Utc>,
    currency_prefix: &str,
) -> ReportDocument {
    let columns = ["Date", "Material", "Quantity", "Amount", "Notes"];

    let mut approved = ReportTable::new("Approved Transactions", TableTone::Positive, &columns);
    approved.rows = transaction_rows(&board.approved, currency_prefix);

    let mut rejected = ReportTable::new("Rejected Transactions", TableTone::Rejection, &columns);
    rejected.rows = transaction_rows(&board.rejected, currency_prefix);

    ReportDocument {
        title: "Transaction Report".to_string(),
        generated_at,
        summary: vec![
            SummaryLine::new("Approved Transactions", board.approved.len().to_string()),
            SummaryLine::new(
                "Approved Amount",
                format_money(currency_prefix, board.approved_amount()),
            ),
            SummaryLine::new("Rejected Transactions", board.rejected.len().to_string()),
            SummaryLine::new("Pending Transactions", board.pending.len().to_string()),
        ],
        tables: vec![approved, rejected],
    }
}

/// Renders the material analytics export in `format`.
pub fn export_material_analytics(
    report: &AnalyticsReport,
    format: ReportFormat,
    config: &ReportConfig,
) -> Result<ExportedReport, crate::errors::ServiceError> {
    let bytes = match format {
        ReportFormat::Pdf => {
            pdf::render(&material_analytics_document(report, &config.currency_prefix))?
        }
        ReportFormat::Csv => csv::material_analytics_csv(&report.records)?,
    };
    Ok(ExportedReport {
        filename: report_filename(
            ReportKind::MaterialAnalytics.file_stem(config),
            report.generated_at,
            format,
        ),
        content_type: format.content_type(),
        bytes,
    })
}

/// Renders the transaction export in `format`.
pub fn export_transactions(
    board: &TransactionBoard,
    generated_at: DateTime<Utc>,
    format: ReportFormat,
    config: &ReportConfig,
) -> Result<ExportedReport, crate::errors::ServiceError> {
    let bytes = match format {
        ReportFormat::Pdf => pdf::render(&transaction_document(
            board,
            generated_at,
            &config.currency_prefix,
        ))?,
        ReportFormat::Csv => csv::transactions_csv(board)?,
    };
    Ok(ExportedReport {
        filename: report_filename(
            ReportKind::TransactionReport.file_stem(config),
            generated_at,
            format,
        ),
        content_type: format.content_type(),
        bytes,
    })
}
