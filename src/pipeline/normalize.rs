//! Schema normalization for parsed model output.
//!
//! Runs in place on the parsed JSON before typed deserialization. Three
//! jobs: force every status-like field into its closed value set (safe
//! default when out of range), backfill missing sections and lists so the
//! typed schema always has something to bind to, and coerce numeric
//! fields that arrived as strings. Idempotent: normalizing an already
//! normalized document changes nothing.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::models::report::{ComplianceStatus, HealthStatus, RiskLevel};

/// Normalizes a parsed report document in place.
pub fn normalize_report(value: &mut Value) {
    if !value.is_object() {
        *value = json!({});
    }

    ensure_bool(value, "reportCalculated");
    ensure_string(value, "companyName");
    ensure_string_list(value, "recommendations");

    normalize_executive_summary(value);
    normalize_financial_analysis(value);
    normalize_risk_factors(value);
    normalize_compliance_items(value);
    normalize_ratio_analysis(value);
    normalize_tax_compliance(value);
    normalize_audit_findings(value);
    normalize_document_analysis(value);

    for section in [
        "shareholdersTable",
        "directorsTable",
        "keyBusinessAgreements",
        "leavePolicy",
        "provisionsAndPrepayments",
        "deferredTaxAssets",
    ] {
        ensure_object(value, section);
        ensure_string_list(&mut value[section], "recommendations");
    }
    ensure_object_list(&mut value["shareholdersTable"], "shareholders");
    ensure_object_list(&mut value["directorsTable"], "directors");
    ensure_object_list(&mut value["keyBusinessAgreements"], "agreements");
    ensure_object_list(&mut value["leavePolicy"], "policies");
    ensure_object_list(&mut value["provisionsAndPrepayments"], "items");
    ensure_object_list(&mut value["deferredTaxAssets"], "items");

    for item in list_mut(&mut value["provisionsAndPrepayments"], "items") {
        coerce_numeric(item, "amount");
    }
    for item in list_mut(&mut value["deferredTaxAssets"], "items") {
        coerce_numeric(item, "amount");
    }
    for holder in list_mut(&mut value["shareholdersTable"], "shareholders") {
        backfill_name(holder);
        coerce_numeric(holder, "equityPercentage");
        coerce_numeric(holder, "shareCount");
        coerce_numeric(holder, "faceValue");
    }
    for director in list_mut(&mut value["directorsTable"], "directors") {
        backfill_name(director);
    }
    for policy in list_mut(&mut value["leavePolicy"], "policies") {
        coerce_numeric(policy, "daysAllowed");
    }

    debug!("report document normalized");
}

fn normalize_executive_summary(value: &mut Value) {
    ensure_object(value, "executiveSummary");
    let summary = &mut value["executiveSummary"];
    ensure_string_list(summary, "keyFindings");
    ensure_string_list(summary, "recommendedActions");
    ensure_object_list(summary, "keyMetrics");
    for metric in list_mut(summary, "keyMetrics") {
        normalize_health(metric, "status");
        coerce_numeric(metric, "value");
    }
}

fn normalize_financial_analysis(value: &mut Value) {
    ensure_object(value, "financialAnalysis");
    let analysis = &mut value["financialAnalysis"];
    ensure_object_list(analysis, "metrics");
    ensure_object_list(analysis, "trends");
    for metric in list_mut(analysis, "metrics") {
        normalize_health(metric, "status");
        coerce_numeric(metric, "value");
    }
    for trend in list_mut(analysis, "trends") {
        ensure_string_list(trend, "periods");
        ensure_list(trend, "data");
    }
}

fn normalize_risk_factors(value: &mut Value) {
    ensure_object_list(value, "riskFactors");
    for factor in list_mut(value, "riskFactors") {
        normalize_risk(factor, "level");
    }
}

fn normalize_compliance_items(value: &mut Value) {
    ensure_object_list(value, "complianceItems");
    for item in list_mut(value, "complianceItems") {
        normalize_compliance(item, "status");
        normalize_risk(item, "severity");
    }
}

fn normalize_ratio_analysis(value: &mut Value) {
    ensure_object(value, "ratioAnalysis");
    let analysis = &mut value["ratioAnalysis"];
    for group in [
        "liquidityRatios",
        "profitabilityRatios",
        "solvencyRatios",
        "efficiencyRatios",
    ] {
        ensure_object_list(analysis, group);
        for ratio in list_mut(analysis, group) {
            normalize_health(ratio, "status");
            coerce_numeric(ratio, "value");
            coerce_numeric(ratio, "industryAverage");
        }
    }
}

fn normalize_tax_compliance(value: &mut Value) {
    ensure_object(value, "taxCompliance");
    let tax = &mut value["taxCompliance"];
    for head in ["gst", "incomeTax", "tds"] {
        ensure_object(tax, head);
        normalize_compliance(&mut tax[head], "status");
    }
}

fn normalize_audit_findings(value: &mut Value) {
    ensure_object(value, "auditFindings");
    let audit = &mut value["auditFindings"];
    ensure_object_list(audit, "findings");
    for finding in list_mut(audit, "findings") {
        normalize_risk(finding, "severity");
    }
}

fn normalize_document_analysis(value: &mut Value) {
    ensure_object(value, "documentAnalysis");
    let analysis = &mut value["documentAnalysis"];
    ensure_object_list(analysis, "availableDocuments");
    for doc in list_mut(analysis, "availableDocuments") {
        ensure_string_list(doc, "keyInsights");
    }
    ensure_object(analysis, "missingDocuments");
    let missing = &mut analysis["missingDocuments"];
    ensure_string_list(missing, "list");
    ensure_string_list(missing, "recommendations");
}

// Status coercion. Out-of-range values are replaced, in-range values pass
// untouched, which is what keeps the whole walk idempotent.

fn normalize_compliance(obj: &mut Value, key: &str) {
    set_status(
        obj,
        key,
        |s| ComplianceStatus::parse_tag(s).map(|v| v.as_str()),
        ComplianceStatus::default().as_str(),
    );
}

fn normalize_health(obj: &mut Value, key: &str) {
    set_status(
        obj,
        key,
        |s| HealthStatus::parse_tag(s).map(|v| v.as_str()),
        HealthStatus::default().as_str(),
    );
}

fn normalize_risk(obj: &mut Value, key: &str) {
    set_status(
        obj,
        key,
        |s| RiskLevel::parse_tag(s).map(|v| v.as_str()),
        RiskLevel::default().as_str(),
    );
}

/// Absent, non-string, and unrecognized values all take the default.
fn set_status(
    obj: &mut Value,
    key: &str,
    parse: fn(&str) -> Option<&'static str>,
    default: &'static str,
) {
    if let Some(map) = obj.as_object_mut() {
        let normalized = map
            .get(key)
            .and_then(Value::as_str)
            .and_then(parse)
            .unwrap_or(default);
        map.insert(key.to_string(), Value::String(normalized.to_string()));
    }
}

// Structural backfill.

fn ensure_object(value: &mut Value, key: &str) {
    let map = force_map(value);
    if !map.get(key).is_some_and(Value::is_object) {
        map.insert(key.to_string(), json!({}));
    }
}

fn ensure_list(value: &mut Value, key: &str) {
    let map = force_map(value);
    if !map.get(key).is_some_and(Value::is_array) {
        map.insert(key.to_string(), json!([]));
    }
}

/// Lists that must hold strings drop any non-string members.
fn ensure_string_list(value: &mut Value, key: &str) {
    ensure_list(value, key);
    if let Some(items) = value[key].as_array_mut() {
        items.retain(Value::is_string);
    }
}

/// Lists that must hold objects drop any non-object members.
fn ensure_object_list(value: &mut Value, key: &str) {
    ensure_list(value, key);
    if let Some(items) = value[key].as_array_mut() {
        items.retain(Value::is_object);
    }
}

fn ensure_bool(value: &mut Value, key: &str) {
    let map = force_map(value);
    if !map.get(key).is_some_and(Value::is_boolean) {
        map.insert(key.to_string(), Value::Bool(false));
    }
}

fn ensure_string(value: &mut Value, key: &str) {
    let map = force_map(value);
    if !map.get(key).is_some_and(Value::is_string) {
        map.insert(key.to_string(), Value::String(String::new()));
    }
}

fn force_map(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = json!({});
    }
    value.as_object_mut().unwrap_or_else(|| unreachable!())
}

fn list_mut<'a>(value: &'a mut Value, key: &str) -> impl Iterator<Item = &'a mut Value> {
    value[key]
        .as_array_mut()
        .map(|v| v.iter_mut())
        .into_iter()
        .flatten()
}

/// A table row without a name renders as an obviously synthetic label
/// rather than a blank cell.
fn backfill_name(obj: &mut Value) {
    if let Some(map) = obj.as_object_mut() {
        let named = map
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        if !named {
            map.insert("name".to_string(), Value::String("Unnamed".to_string()));
        }
    }
}

/// Leaves numbers alone, promotes numeric strings to numbers, and maps
/// everything else to the literal `"N/A"`.
fn coerce_numeric(obj: &mut Value, key: &str) {
    let Some(map) = obj.as_object_mut() else {
        return;
    };
    let normalized = match map.get(key) {
        Some(Value::Number(n)) => Value::Number(n.clone()),
        Some(Value::String(s)) => {
            let cleaned = s.trim().replace(',', "");
            match cleaned.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(n) => Value::Number(n),
                None => Value::String("N/A".to_string()),
            }
        }
        _ => Value::String("N/A".to_string()),
    };
    map.insert(key.to_string(), normalized);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::AnalysisReport;

    #[test]
    fn unknown_status_becomes_partial() {
        let mut value = json!({
            "complianceItems": [
                {"requirement": "GST filings", "status": "unknown"}
            ]
        });
        normalize_report(&mut value);
        assert_eq!(value["complianceItems"][0]["status"], "partial");
    }

    #[test]
    fn valid_statuses_pass_untouched() {
        let mut value = json!({
            "complianceItems": [
                {"requirement": "TDS", "status": "non-compliant", "severity": "high"}
            ],
            "riskFactors": [{"category": "tax", "level": "low"}]
        });
        normalize_report(&mut value);
        assert_eq!(value["complianceItems"][0]["status"], "non-compliant");
        assert_eq!(value["complianceItems"][0]["severity"], "high");
        assert_eq!(value["riskFactors"][0]["level"], "low");
    }

    #[test]
    fn health_defaults_to_warning_and_risk_to_medium() {
        let mut value = json!({
            "financialAnalysis": {"metrics": [{"name": "EBITDA", "status": "excellent"}]},
            "riskFactors": [{"category": "ops", "level": "severe"}]
        });
        normalize_report(&mut value);
        assert_eq!(value["financialAnalysis"]["metrics"][0]["status"], "warning");
        assert_eq!(value["riskFactors"][0]["level"], "medium");
    }

    #[test]
    fn missing_sections_are_backfilled() {
        let mut value = json!({});
        normalize_report(&mut value);
        assert!(value["executiveSummary"].is_object());
        assert!(value["recommendations"].as_array().unwrap().is_empty());
        assert_eq!(value["taxCompliance"]["gst"]["status"], "partial");
        assert!(value["ratioAnalysis"]["liquidityRatios"].is_array());
        assert_eq!(value["reportCalculated"], false);
    }

    #[test]
    fn numeric_strings_are_promoted_and_junk_becomes_na() {
        let mut value = json!({
            "ratioAnalysis": {
                "liquidityRatios": [
                    {"name": "Current Ratio", "value": "1.8", "industryAverage": "not disclosed"}
                ]
            }
        });
        normalize_report(&mut value);
        let ratio = &value["ratioAnalysis"]["liquidityRatios"][0];
        assert_eq!(ratio["value"], 1.8);
        assert_eq!(ratio["industryAverage"], "N/A");
    }

    #[test]
    fn section_recommendations_are_forced_to_arrays() {
        let mut value = json!({
            "shareholdersTable": {"recommendations": "diversify the cap table"},
            "directorsTable": {"recommendations": 7},
            "leavePolicy": {"recommendations": {"text": "add sick leave"}}
        });
        normalize_report(&mut value);
        for section in [
            "shareholdersTable",
            "directorsTable",
            "keyBusinessAgreements",
            "leavePolicy",
            "provisionsAndPrepayments",
            "deferredTaxAssets",
        ] {
            assert!(
                value[section]["recommendations"].is_array(),
                "{section}.recommendations must be an array"
            );
        }
        let report: AnalysisReport = serde_json::from_value(value).unwrap();
        assert!(report.shareholders_table.recommendations.is_empty());
    }

    #[test]
    fn malformed_list_members_are_dropped_before_typed_bind() {
        let mut value = json!({
            "financialAnalysis": {
                "metrics": ["not an object", {"name": "EBITDA", "status": "good"}],
                "trends": [
                    {"name": "Revenue", "periods": ["FY22", 2023], "data": "flat"}
                ]
            },
            "documentAnalysis": {
                "availableDocuments": [
                    42,
                    {"documentType": "balance_sheet", "keyInsights": ["solid", null]}
                ]
            },
            "riskFactors": [["nested"], {"category": "fx", "level": "low"}]
        });
        normalize_report(&mut value);

        let report: AnalysisReport = serde_json::from_value(value).unwrap();
        assert_eq!(report.financial_analysis.metrics.len(), 1);
        assert_eq!(report.financial_analysis.trends[0].periods, vec!["FY22"]);
        assert!(report.financial_analysis.trends[0].data.is_empty());
        let docs = &report.document_analysis.available_documents;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].key_insights, vec!["solid"]);
        assert_eq!(report.risk_factors.len(), 1);
    }

    #[test]
    fn nameless_table_rows_get_a_synthetic_label() {
        let mut value = json!({
            "shareholdersTable": {"shareholders": [{"equityPercentage": 40}]},
            "directorsTable": {"directors": [{"name": "  ", "position": "CTO"}]}
        });
        normalize_report(&mut value);
        assert_eq!(value["shareholdersTable"]["shareholders"][0]["name"], "Unnamed");
        assert_eq!(value["directorsTable"]["directors"][0]["name"], "Unnamed");
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut value = json!({
            "companyName": "Acme",
            "complianceItems": [{"requirement": "GST", "status": "mystery"}],
            "shareholdersTable": {"shareholders": [{"name": "A", "equityPercentage": "40%"}]}
        });
        normalize_report(&mut value);
        let once = value.clone();
        normalize_report(&mut value);
        assert_eq!(value, once);
    }

    #[test]
    fn non_object_roots_are_replaced() {
        let mut value = json!([1, 2, 3]);
        normalize_report(&mut value);
        assert!(value.is_object());
        assert!(value["executiveSummary"].is_object());
    }

    #[test]
    fn normalized_document_binds_to_typed_schema() {
        let mut value = json!({
            "companyName": "Acme Pvt Ltd",
            "reportCalculated": "yes",
            "complianceItems": [{"requirement": "GST", "status": "unknown"}],
            "riskFactors": [{"category": "tax", "level": "moderate"}]
        });
        normalize_report(&mut value);
        let report: AnalysisReport = serde_json::from_value(value).unwrap();
        assert!(!report.report_calculated, "non-bool flag resets to false");
        assert_eq!(
            report.compliance_items[0].status,
            crate::models::report::ComplianceStatus::Partial
        );
        assert_eq!(
            report.risk_factors[0].level,
            crate::models::report::RiskLevel::Medium
        );
    }
}
