use crate::dashboard::ViewMode;
use crate::history::History;
use crate::placeholder::is_placeholder;
use chrono::Local;
use equity_core::domain::analysis::{AnalysisResult, Price, Rating};
use std::fmt::Write;

const MISSING: &str = "n/a";

pub fn rating_label(rating: Rating) -> &'static str {
    match rating {
        Rating::StrongBuy => "STRONG BUY",
        Rating::Buy => "BUY",
        Rating::Hold => "HOLD",
        Rating::Sell => "SELL",
        Rating::StrongSell => "STRONG SELL",
        Rating::Unrated => "UNRATED",
    }
}

fn rating_marker(rating: Rating) -> char {
    if rating.is_bullish() {
        '▲'
    } else if rating.is_bearish() {
        '▼'
    } else if rating == Rating::Hold {
        '■'
    } else {
        '?'
    }
}

/// `financial_analysis` -> `Financial Analysis`.
pub fn section_title(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn local_date(result: &AnalysisResult) -> String {
    result
        .created_at
        .with_timezone(&Local)
        .format("%-m/%-d/%Y")
        .to_string()
}

fn price(p: Option<&Price>) -> String {
    p.map(|p| format!("${p}")).unwrap_or_else(|| MISSING.to_string())
}

pub fn render_analysis(result: &AnalysisResult, mode: ViewMode) -> String {
    let report = result.report();
    let summary = report.executive_summary.clone().unwrap_or_default();
    let rating = report.rating();
    let mut out = String::new();

    if is_placeholder(result) {
        let _ = writeln!(
            out,
            "!! PLACEHOLDER DATA: the backend did not return an analysis; figures below are illustrative only !!\n"
        );
    }

    let _ = writeln!(
        out,
        "{}  {} {}  Conviction: {}  ({})",
        report.ticker.as_deref().unwrap_or(MISSING),
        rating_marker(rating),
        summary.recommendation.as_deref().unwrap_or(rating_label(rating)),
        summary.conviction_level.as_deref().unwrap_or(MISSING),
        report
            .analysis_date
            .clone()
            .unwrap_or_else(|| local_date(result)),
    );

    match mode {
        ViewMode::Summary => {
            let _ = writeln!(
                out,
                "Current Price: {}   Target Price: {}   Time Horizon: {}",
                price(summary.current_price.as_ref()),
                price(summary.target_price.as_ref()),
                summary.time_horizon.as_deref().unwrap_or(MISSING),
            );
            let _ = writeln!(out, "\nInvestment Thesis");
            let _ = writeln!(out, "  {}", summary.key_thesis.as_deref().unwrap_or(MISSING));
            write_list(&mut out, "Primary Catalysts", '+', summary.primary_catalysts.as_deref());
            write_list(&mut out, "Key Risks", '-', summary.key_risks.as_deref());
        }
        ViewMode::Detailed => {
            let sections = report.sections();
            if sections.is_empty() {
                let _ = writeln!(out, "\nNo detailed report available.");
            }
            for (key, text) in sections {
                let title = section_title(&key);
                let _ = writeln!(out, "\n{title}\n{}", "-".repeat(title.chars().count()));
                let _ = writeln!(out, "{text}");
            }
        }
    }

    out
}

fn write_list(out: &mut String, heading: &str, bullet: char, items: Option<&[String]>) {
    let _ = writeln!(out, "\n{heading}");
    match items {
        Some(items) if !items.is_empty() => {
            for item in items {
                let _ = writeln!(out, "  {bullet} {item}");
            }
        }
        _ => {
            let _ = writeln!(out, "  {MISSING}");
        }
    }
}

pub fn render_history(history: &History, selected: Option<i64>) -> String {
    if history.is_empty() {
        return "No analyses yet\n".to_string();
    }

    let mut out = String::new();
    for entry in history.iter() {
        let report = entry.report();
        let recommendation = report
            .executive_summary
            .as_ref()
            .and_then(|s| s.recommendation.clone())
            .unwrap_or_default();
        let marker = if selected == Some(entry.id) { '>' } else { ' ' };
        let flag = if is_placeholder(entry) { " (placeholder)" } else { "" };
        let _ = writeln!(
            out,
            "{marker} {:<8} {:<12} {:<10} id={}{flag}",
            report.ticker.as_deref().unwrap_or(MISSING),
            recommendation,
            local_date(entry),
            entry.id,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::placeholder_analysis;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn result(v: Value) -> AnalysisResult {
        let Value::Object(body) = v else {
            panic!("expected object");
        };
        AnalysisResult::stamp(body, Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
    }

    #[test]
    fn section_titles_are_capitalized_words() {
        assert_eq!(section_title("financial_analysis"), "Financial Analysis");
        assert_eq!(section_title("alpha_thesis"), "Alpha Thesis");
        assert_eq!(section_title("summary"), "Summary");
    }

    #[test]
    fn summary_view_shows_key_fields() {
        let r = result(json!({
            "ticker": "NVDA",
            "analysis_date": "10/18/2026",
            "executive_summary": {
                "recommendation": "Buy",
                "conviction_level": "High",
                "current_price": 150,
                "target_price": "180.00",
                "time_horizon": "12 months",
                "key_thesis": "AI demand.",
                "primary_catalysts": ["datacenter"],
                "key_risks": ["export controls"],
            },
        }));
        let text = render_analysis(&r, ViewMode::Summary);
        assert!(text.starts_with("NVDA  ▲ Buy  Conviction: High  (10/18/2026)"));
        assert!(text.contains("Current Price: $150   Target Price: $180.00"));
        assert!(text.contains("  + datacenter"));
        assert!(text.contains("  - export controls"));
        assert!(!text.contains("PLACEHOLDER"));
    }

    #[test]
    fn missing_fields_render_as_not_available() {
        let text = render_analysis(&result(json!({})), ViewMode::Summary);
        assert!(text.contains("n/a  ? UNRATED  Conviction: n/a"));
        assert!(text.contains("Current Price: n/a"));

        let detailed = render_analysis(&result(json!({})), ViewMode::Detailed);
        assert!(detailed.contains("No detailed report available."));
    }

    #[test]
    fn detailed_view_lists_sections() {
        let r = result(json!({
            "detailed_analysis": {"risk_assessment": "Concentration risk."},
        }));
        let text = render_analysis(&r, ViewMode::Detailed);
        assert!(text.contains("Risk Assessment\n---------------\nConcentration risk."));
    }

    #[test]
    fn placeholders_are_flagged() {
        let p = placeholder_analysis("TSLA", Utc::now());
        assert!(render_analysis(&p, ViewMode::Summary).starts_with("!! PLACEHOLDER DATA"));

        let mut history = History::default();
        history.push(p.clone());
        let listing = render_history(&history, Some(p.id));
        assert!(listing.starts_with("> TSLA"));
        assert!(listing.contains("(placeholder)"));
    }

    #[test]
    fn empty_history_message() {
        assert_eq!(render_history(&History::default(), None), "No analyses yet\n");
    }
}
