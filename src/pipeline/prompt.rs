//! Prompt assembly for the due-diligence analysis call.
//!
//! Pure templating: same corpus and profile in, same prompt out. The JSON
//! skeleton below is the contract the normalizer and the typed report
//! schema are built against; change them together.

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"
You are a financial due-diligence analyst reviewing company documents for an
investment decision. You produce a single structured report.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Base every finding ONLY on the document content provided.
2. Where a document could not be read, note the gap; never invent its contents.
3. Use numbers exactly as they appear in the documents. If a value cannot be
   determined, use the string "N/A".
4. Status fields take ONLY the listed values.
5. Output ONLY the JSON object. No commentary before or after it.
"#;

const REPORT_STRUCTURE: &str = r#"{
  "companyName": "string",
  "reportCalculated": true,
  "executiveSummary": {
    "headline": "string",
    "summary": "string",
    "keyFindings": ["string"],
    "recommendedActions": ["string"],
    "keyMetrics": [
      {"name": "string", "value": "number or N/A", "status": "good | warning | critical", "description": "string"}
    ]
  },
  "financialAnalysis": {
    "metrics": [
      {"name": "string", "value": "number or N/A", "status": "good | warning | critical", "description": "string"}
    ],
    "trends": [
      {"name": "string", "periods": ["string"], "data": ["number or N/A"], "description": "string"}
    ]
  },
  "recommendations": ["string"],
  "riskFactors": [
    {"category": "string", "level": "high | medium | low", "description": "string", "impact": "string"}
  ],
  "complianceItems": [
    {"requirement": "string", "status": "compliant | partial | non-compliant", "details": "string", "severity": "high | medium | low", "recommendation": "string"}
  ],
  "ratioAnalysis": {
    "liquidityRatios": [
      {"name": "string", "value": "number or N/A", "industryAverage": "number or N/A", "description": "string", "status": "good | warning | critical"}
    ],
    "profitabilityRatios": [],
    "solvencyRatios": [],
    "efficiencyRatios": []
  },
  "taxCompliance": {
    "gst": {"status": "compliant | partial | non-compliant", "details": "string"},
    "incomeTax": {"status": "compliant | partial | non-compliant", "details": "string"},
    "tds": {"status": "compliant | partial | non-compliant", "details": "string"}
  },
  "auditFindings": {
    "findings": [
      {"area": "string", "finding": "string", "severity": "high | medium | low", "recommendation": "string"}
    ],
    "overallAssessment": "string"
  },
  "documentAnalysis": {
    "availableDocuments": [
      {"documentType": "string", "quality": "string", "completeness": "string", "keyInsights": ["string"]}
    ],
    "missingDocuments": {
      "list": ["string"],
      "impact": "string",
      "recommendations": ["string"]
    }
  },
  "shareholdersTable": {
    "overview": "string",
    "shareholders": [
      {"name": "string", "equityPercentage": "number or N/A", "shareCount": "number or N/A", "faceValue": "number or N/A", "notes": "string"}
    ],
    "analysis": "string",
    "recommendations": ["string"]
  },
  "directorsTable": {
    "overview": "string",
    "directors": [
      {"name": "string", "position": "string", "appointmentDate": "string", "din": "string", "notes": "string"}
    ],
    "analysis": "string",
    "recommendations": ["string"]
  },
  "keyBusinessAgreements": {
    "overview": "string",
    "agreements": [
      {"agreementType": "string", "parties": "string", "effectiveDate": "string", "duration": "string", "keyTerms": "string"}
    ],
    "analysis": "string",
    "recommendations": ["string"]
  },
  "leavePolicy": {
    "overview": "string",
    "policies": [
      {"leaveType": "string", "daysAllowed": "number or N/A", "eligibility": "string", "carryForward": "string"}
    ],
    "analysis": "string",
    "recommendations": ["string"]
  },
  "provisionsAndPrepayments": {
    "overview": "string",
    "items": [
      {"item": "string", "amount": "number or N/A", "period": "string", "notes": "string"}
    ],
    "analysis": "string",
    "recommendations": ["string"]
  },
  "deferredTaxAssets": {
    "overview": "string",
    "items": [
      {"item": "string", "amount": "number or N/A", "period": "string", "notes": "string"}
    ],
    "analysis": "string",
    "recommendations": ["string"]
  }
}"#;

/// Who the analysis is about. Everything beyond the name is optional
/// framing for the model.
#[derive(Debug, Clone, Default)]
pub struct EntityProfile {
    pub company_name: String,
    pub industry: Option<String>,
    pub stage: Option<String>,
}

impl EntityProfile {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            industry: None,
            stage: None,
        }
    }
}

/// Everything variable about one analysis besides the corpus itself.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub company: EntityProfile,
    /// The other side of the deal, when known (e.g. the investor profile
    /// for a startup under review). Absent blocks are omitted from the
    /// prompt entirely rather than rendered as empty noise.
    pub counterparty: Option<EntityProfile>,
    /// Category tags the caller expected but received no documents for.
    pub missing_document_types: Vec<String>,
}

impl AnalysisContext {
    pub fn new(company: EntityProfile) -> Self {
        Self {
            company,
            counterparty: None,
            missing_document_types: Vec::new(),
        }
    }
}

fn profile_block(heading: &str, profile: &EntityProfile) -> String {
    let mut block = format!("{heading}: {}\n", profile.company_name);
    if let Some(industry) = &profile.industry {
        block.push_str(&format!("Industry: {industry}\n"));
    }
    if let Some(stage) = &profile.stage {
        block.push_str(&format!("Stage: {stage}\n"));
    }
    block
}

/// Builds the full analysis prompt from the aggregated corpus.
pub fn build_analysis_prompt(context: &AnalysisContext, corpus: &str) -> String {
    use crate::models::document::format_category_title;

    let mut context_block = profile_block("Company", &context.company);
    if let Some(counterparty) = &context.counterparty {
        context_block.push_str(&profile_block("Counterparty", counterparty));
    }
    if context.missing_document_types.is_empty() {
        context_block.push_str("All required documents are available.\n");
    } else {
        let titles: Vec<String> = context
            .missing_document_types
            .iter()
            .map(|t| format_category_title(t))
            .collect();
        context_block.push_str(&format!(
            "Expected document categories not provided: {}\n\
             Account for these gaps in documentAnalysis.missingDocuments.\n",
            titles.join(", ")
        ));
    }

    format!(
        r#"{system}
{context_block}
<documents>
{corpus}
</documents>

Produce a complete financial due-diligence report for the company above,
drawn ONLY from the documents provided. Set "reportCalculated" to true if
the documents carry enough financial signal for a meaningful analysis,
false otherwise.

Respond with a single JSON object in exactly this structure:

```json
{structure}
```"#,
        system = ANALYSIS_SYSTEM_PROMPT.trim(),
        context_block = context_block,
        corpus = corpus,
        structure = REPORT_STRUCTURE,
    )
}
