const RESEARCH_PROMPT_TEMPLATE: &str = include_str!("../assets/research_prompt.txt");

/// The research prompt for `ticker`. The ticker is the only input; it is
/// uppercased before substitution.
pub fn research_prompt(ticker: &str) -> String {
    RESEARCH_PROMPT_TEMPLATE.replace("{ticker}", &ticker.trim().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_uppercased_ticker_everywhere() {
        let prompt = research_prompt("nvda");
        assert!(prompt.contains("analyze NVDA using"));
        assert!(prompt.contains("\"ticker\": \"NVDA\""));
        assert!(!prompt.contains("{ticker}"));
        assert!(!prompt.contains("nvda"));
    }

    #[test]
    fn template_is_fixed_apart_from_ticker() {
        assert_eq!(
            research_prompt("AMD").replace("AMD", "X"),
            research_prompt("tsla").replace("TSLA", "X")
        );
        assert!(research_prompt("AMD").contains("DO NOT OUTPUT ANYTHING OTHER THAN VALID JSON"));
    }
}
