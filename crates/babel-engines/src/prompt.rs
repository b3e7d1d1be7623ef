//! The shared translation prompt.

/// Sampling temperature for translations.
pub const TEMPERATURE: f32 = 0.8;

const JAPANESE_RULE: &str =
    "Never use the polite register (です/ます); write in plain form (だ/である) throughout.";

pub fn is_japanese(target: &str) -> bool {
    matches!(
        target.trim().to_lowercase().as_str(),
        "ja" | "jp" | "japanese"
    )
}

/// Build the single-turn translation prompt for `target`.
pub fn build_prompt(text: &str, target: &str) -> String {
    let mut rules = vec![
        "Keep the tone casual and natural, the way people actually chat online.",
        "Use equivalent slang or internet expressions where they fit.",
        "Never distort the meaning; carry over the original tone precisely.",
        "Output only the translation, with no explanations or notes.",
        "Keep every emoji exactly as it is.",
        "Never translate or reformat numbers, dates, or times.",
    ];
    if is_japanese(target) {
        rules.insert(1, JAPANESE_RULE);
    }

    let mut prompt = String::from(
        "You are a translator fluent in the internet culture of every language.\n[Rules]:\n",
    );
    for (i, rule) in rules.iter().enumerate() {
        prompt.push_str(&format!("{}. {rule}\n", i + 1));
    }
    prompt.push_str(&format!(
        "[Task]: Translate the following text into [{}]\n{text}",
        target.trim().to_uppercase()
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_target_and_text() {
        let p = build_prompt("hello", "zh-CN");
        assert!(p.contains("[ZH-CN]"));
        assert!(p.ends_with("\nhello"));
        assert!(p.contains("emoji"));
        assert!(!p.contains("です"));
    }

    #[test]
    fn test_japanese_rule_for_all_aliases() {
        for target in ["ja", "JP", "japanese"] {
            assert!(build_prompt("hi", target).contains("です/ます"), "{target}");
        }
        assert!(!build_prompt("hi", "ko").contains("です/ます"));
    }

    #[test]
    fn test_rules_are_numbered_contiguously() {
        let p = build_prompt("x", "ja");
        assert!(p.contains("\n7. "));
        assert!(!p.contains("\n8. "));
    }
}
