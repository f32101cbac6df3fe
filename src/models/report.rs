//! Typed schema for the generated due-diligence report.
//!
//! The remote model is instructed to emit this shape, but its output is
//! untrusted: every collection carries `#[serde(default)]` and every
//! status-like field is a closed enum. `pipeline::normalize` rewrites the
//! parsed JSON so that deserializing into these types cannot fail on any
//! response that parsed at all.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a compliance requirement. Out-of-range model output normalizes
/// to `Partial` — the safe middle ground for an unverified claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Compliant,
    #[default]
    Partial,
    #[serde(rename = "non-compliant")]
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::Partial => "partial",
            Self::NonCompliant => "non-compliant",
        }
    }

    pub fn parse_tag(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compliant" => Some(Self::Compliant),
            "partial" => Some(Self::Partial),
            "non-compliant" | "non_compliant" | "noncompliant" => Some(Self::NonCompliant),
            _ => None,
        }
    }
}

/// Traffic-light status for metrics and ratios. Defaults to `Warning`:
/// an unknown status must not read as a clean bill of health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Good,
    #[default]
    Warning,
    Critical,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }

    pub fn parse_tag(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Some(Self::Good),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Severity scale shared by risk factors and compliance findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse_tag(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// A named metric with chart-ready status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialMetric {
    pub name: String,
    /// Numbers when the model behaves; the literal `"N/A"` when it does not.
    pub value: Value,
    pub status: HealthStatus,
    pub description: String,
}

/// A multi-period series for trend charts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendSeries {
    pub name: String,
    pub periods: Vec<String>,
    pub data: Vec<Value>,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutiveSummary {
    pub headline: String,
    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub key_metrics: Vec<FinancialMetric>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialAnalysis {
    pub metrics: Vec<FinancialMetric>,
    pub trends: Vec<TrendSeries>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskFactor {
    pub category: String,
    pub level: RiskLevel,
    pub description: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceItem {
    pub requirement: String,
    pub status: ComplianceStatus,
    pub details: String,
    pub severity: RiskLevel,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatioEntry {
    pub name: String,
    /// Numeric when cleanly parseable, otherwise the literal `"N/A"`.
    pub value: Value,
    pub industry_average: Value,
    pub description: String,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatioAnalysis {
    pub liquidity_ratios: Vec<RatioEntry>,
    pub profitability_ratios: Vec<RatioEntry>,
    pub solvency_ratios: Vec<RatioEntry>,
    pub efficiency_ratios: Vec<RatioEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxComplianceSection {
    pub status: ComplianceStatus,
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaxCompliance {
    pub gst: TaxComplianceSection,
    pub income_tax: TaxComplianceSection,
    pub tds: TaxComplianceSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditFinding {
    pub area: String,
    pub finding: String,
    pub severity: RiskLevel,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditFindings {
    pub findings: Vec<AuditFinding>,
    pub overall_assessment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentAssessment {
    pub document_type: String,
    pub quality: String,
    pub completeness: String,
    pub key_insights: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MissingDocuments {
    pub list: Vec<String>,
    pub impact: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentAnalysis {
    pub available_documents: Vec<DocumentAssessment>,
    pub missing_documents: MissingDocuments,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shareholder {
    pub name: String,
    pub equity_percentage: Value,
    pub share_count: Value,
    pub face_value: Value,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareholdersTable {
    pub overview: String,
    pub shareholders: Vec<Shareholder>,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Director {
    pub name: String,
    pub position: String,
    pub appointment_date: String,
    pub din: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectorsTable {
    pub overview: String,
    pub directors: Vec<Director>,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessAgreement {
    pub agreement_type: String,
    pub parties: String,
    pub effective_date: String,
    pub duration: String,
    pub key_terms: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyBusinessAgreements {
    pub overview: String,
    pub agreements: Vec<BusinessAgreement>,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaveType {
    pub leave_type: String,
    pub days_allowed: Value,
    pub eligibility: String,
    pub carry_forward: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeavePolicy {
    pub overview: String,
    pub policies: Vec<LeaveType>,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalanceSheetItem {
    pub item: String,
    pub amount: Value,
    pub period: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionsAndPrepayments {
    pub overview: String,
    pub items: Vec<BalanceSheetItem>,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeferredTaxAssets {
    pub overview: String,
    pub items: Vec<BalanceSheetItem>,
    pub analysis: String,
    pub recommendations: Vec<String>,
}

/// The full due-diligence report. Produced once per generation request;
/// persistence belongs to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisReport {
    pub company_name: String,
    /// Whether extraction yielded enough signal for a meaningful analysis.
    pub report_calculated: bool,
    pub executive_summary: ExecutiveSummary,
    pub financial_analysis: FinancialAnalysis,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<RiskFactor>,
    pub compliance_items: Vec<ComplianceItem>,
    pub ratio_analysis: RatioAnalysis,
    pub tax_compliance: TaxCompliance,
    pub audit_findings: AuditFindings,
    pub document_analysis: DocumentAnalysis,
    pub shareholders_table: ShareholdersTable,
    pub directors_table: DirectorsTable,
    pub key_business_agreements: KeyBusinessAgreements,
    pub leave_policy: LeavePolicy,
    pub provisions_and_prepayments: ProvisionsAndPrepayments,
    pub deferred_tax_assets: DeferredTaxAssets,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_enums_round_trip() {
        for status in [
            ComplianceStatus::Compliant,
            ComplianceStatus::Partial,
            ComplianceStatus::NonCompliant,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            let back: ComplianceStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(status, back);
            assert_eq!(ComplianceStatus::parse_tag(status.as_str()), Some(status));
        }
    }

    #[test]
    fn non_compliant_serializes_hyphenated() {
        let json = serde_json::to_string(&ComplianceStatus::NonCompliant).unwrap();
        assert_eq!(json, "\"non-compliant\"");
    }

    #[test]
    fn parse_tag_rejects_out_of_range() {
        assert_eq!(ComplianceStatus::parse_tag("unknown"), None);
        assert_eq!(HealthStatus::parse_tag("N/A"), None);
        assert_eq!(RiskLevel::parse_tag(""), None);
    }

    #[test]
    fn risk_level_accepts_moderate_alias() {
        assert_eq!(RiskLevel::parse_tag("Moderate"), Some(RiskLevel::Medium));
    }

    #[test]
    fn report_deserializes_from_empty_object() {
        let report: AnalysisReport = serde_json::from_str("{}").unwrap();
        assert!(!report.report_calculated);
        assert!(report.recommendations.is_empty());
        assert!(report.shareholders_table.shareholders.is_empty());
        assert_eq!(report.tax_compliance.gst.status, ComplianceStatus::Partial);
    }

    #[test]
    fn report_tolerates_partial_sections() {
        let json = r#"{
            "companyName": "Acme Pvt Ltd",
            "reportCalculated": true,
            "complianceItems": [
                {"requirement": "GST filings", "status": "compliant"}
            ],
            "ratioAnalysis": {
                "liquidityRatios": [
                    {"name": "Current Ratio", "value": 1.8, "status": "good"}
                ]
            }
        }"#;
        let report: AnalysisReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.company_name, "Acme Pvt Ltd");
        assert!(report.report_calculated);
        assert_eq!(report.compliance_items.len(), 1);
        assert_eq!(
            report.compliance_items[0].status,
            ComplianceStatus::Compliant
        );
        assert_eq!(report.ratio_analysis.liquidity_ratios[0].value, 1.8);
        assert!(report.ratio_analysis.solvency_ratios.is_empty());
    }
}
