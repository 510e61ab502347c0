//! Stand-in analysis shown when the backend cannot produce a real one.
//!
//! This keeps the dashboard populated during outages at the cost of showing
//! fabricated numbers; results built here are marked with [`PLACEHOLDER_KEY`] and
//! reported to callers as [`crate::dashboard::AnalysisOutcome::Degraded`].

use chrono::{DateTime, Local, Utc};
use equity_core::domain::analysis::AnalysisResult;
use serde_json::{json, Value};

pub const PLACEHOLDER_KEY: &str = "is_placeholder";

pub fn placeholder_analysis(ticker: &str, now: DateTime<Utc>) -> AnalysisResult {
    let analysis_date = now.with_timezone(&Local).format("%-m/%-d/%Y").to_string();

    let body = json!({
        PLACEHOLDER_KEY: true,
        "ticker": ticker.trim().to_uppercase(),
        "analysis_date": analysis_date,
        "executive_summary": {
            "recommendation": "Buy",
            "target_price": "180.00",
            "current_price": "150.00",
            "conviction_level": "High",
            "key_thesis": "Strong competitive moat in cloud infrastructure with accelerating AI adoption driving revenue growth above consensus expectations.",
            "primary_catalysts": [
                "AI infrastructure demand acceleration",
                "Market share gains in enterprise cloud",
                "Margin expansion from operational leverage"
            ],
            "key_risks": [
                "Increased competition from hyperscalers",
                "Economic downturn impact on IT spending",
                "Regulatory scrutiny on AI applications"
            ],
            "time_horizon": "12 months"
        },
        "detailed_analysis": {
            "financial_analysis": "Strong revenue growth trajectory with 28% CAGR over past 5 years. Operating margins expanding from 12% to 18% due to economies of scale in cloud infrastructure. Free cash flow conversion consistently above 85% indicating high-quality earnings. Balance sheet strength with minimal debt and $45B cash position provides strategic flexibility.",
            "competitive_positioning": "Dominant position in enterprise cloud with 65% market share. Strong moat from network effects, switching costs, and ecosystem lock-in. AI capabilities creating new competitive advantages versus traditional IT vendors. Patent portfolio and R&D investment (15% of revenue) maintaining technological leadership.",
            "valuation_analysis": "DCF analysis yields $185 target price assuming 22% revenue growth and 200bp margin expansion. Trading at 25x forward P/E versus peers at 30x despite superior growth profile. Sum-of-parts analysis values cloud segment at $160/share with AI optionality providing additional upside to $200/share.",
            "risk_assessment": "Primary risks include competitive pressure from AWS/Azure, potential economic slowdown impacting enterprise spending, and regulatory challenges around AI deployment. Tail risks include major security breach or key talent departures. Downside scenario suggests $120 floor based on asset value and cash position.",
            "alpha_thesis": "Market underappreciating AI transformation accelerating cloud adoption rates and driving pricing power expansion. Consensus estimates appear conservative on margin expansion potential. Contrarian opportunity as recent volatility created attractive entry point despite strong fundamentals.",
            "contrarian_insights": "While street focuses on competition concerns, data suggests market share stabilization and pricing discipline improving. Recent insider buying and dividend increase signal management confidence. Technical oversold conditions creating tactical opportunity for fundamentally strong name."
        }
    });

    let Value::Object(body) = body else {
        unreachable!("json! object literal always yields an object");
    };
    AnalysisResult::stamp(body, now)
}

pub fn is_placeholder(result: &AnalysisResult) -> bool {
    result
        .body
        .get(PLACEHOLDER_KEY)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
