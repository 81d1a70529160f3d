//! Few-shot prompt template for title generation.
//!
//! The template and the built-in examples are constants, so `build_prompt`
//! is deterministic for identical inputs.

use std::fmt::Write;

use crate::models::title::Example;

/// Maximum number of caller-supplied examples appended after the built-ins.
pub const MAX_CUSTOM_EXAMPLES: usize = 5;

const PREAMBLE: &str =
    "Generate Amazon product titles from descriptions. Follow these examples:";

/// Built-in few-shot examples as (description, title).
pub const BUILTIN_EXAMPLES: [(&str, &str); 5] = [
    (
        "Wireless Bluetooth headphones with active noise cancellation, 30-hour battery life, premium leather ear cushions, compatible with iPhone and Android devices, includes carrying case",
        "Wireless Bluetooth Headphones with Active Noise Cancelling, 30H Battery Life, Premium Leather Cushions - Compatible iPhone Android with Carrying Case",
    ),
    (
        "Stainless steel water bottle, double wall vacuum insulated, keeps drinks cold 24 hours hot 12 hours, leak-proof design, 32 oz capacity, BPA free, available in multiple colors",
        "Stainless Steel Water Bottle 32oz - Double Wall Vacuum Insulated, Keeps Cold 24H Hot 12H, Leak-Proof BPA Free",
    ),
    (
        "Gaming mechanical keyboard with RGB backlighting, blue switches, anti-ghosting technology, aluminum frame, detachable USB-C cable, compatible with PC Mac",
        "Gaming Mechanical Keyboard RGB Backlit Blue Switches - Anti-Ghosting Aluminum Frame, Detachable USB-C Cable PC Mac Compatible",
    ),
    (
        "Yoga mat non-slip surface, eco-friendly TPE material, 6mm thick extra cushioning, lightweight portable design, includes carrying strap, 72 inch length",
        "Yoga Mat Non-Slip 6mm Thick Extra Cushion - Eco-Friendly TPE Material 72\" Lightweight Portable with Carrying Strap",
    ),
    (
        "Smart fitness tracker with heart rate monitor, sleep tracking, waterproof IP68 rating, 7-day battery life, step counter, smartphone notifications",
        "Smart Fitness Tracker Heart Rate Monitor Sleep Tracking - Waterproof IP68, 7-Day Battery, Step Counter Smartphone Notifications",
    ),
];

/// Listing policy. Replace `{old_title}` before sending.
pub const GUIDELINES_TEMPLATE: &str = "\
Guidelines:
- Keep titles under 200 characters, with critical keywords in the first 80 characters.
- Include keywords from the {old_title} that are missing in the description (MUST include within the first 80 characters if missing from the description).
- Avoid brand names like Ledsone.
- Must include the shape and pack details if available.
- Avoid using synonyms (e.g., 'retro' and 'vintage' are synonyms).
- The first 80 characters should provide a clear description of the product; avoid compatibility information.
- Generate Amazon specific title considering above instructions.";

/// Renders the few-shot prompt.
///
/// Caller examples beyond `MAX_CUSTOM_EXAMPLES` are dropped; the kept ones are
/// numbered after the built-ins. An empty description is rendered as-is.
pub fn build_prompt(old_title: Option<&str>, description: &str, examples: &[Example]) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    let builtin = BUILTIN_EXAMPLES.iter().copied();
    let custom = examples
        .iter()
        .take(MAX_CUSTOM_EXAMPLES)
        .map(|e| (e.description.as_str(), e.title.as_str()));

    for (index, (example_description, example_title)) in builtin.chain(custom).enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            prompt,
            "Example {}:\nDescription: {}\nTitle: {}\n\n",
            index + 1,
            example_description,
            example_title
        );
    }

    prompt.push_str(&GUIDELINES_TEMPLATE.replace("{old_title}", old_title.unwrap_or("")));
    prompt.push_str("\n\nNow generate a title for:\nDescription: ");
    prompt.push_str(description);
    prompt.push_str("\nTitle:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(n: usize) -> Vec<Example> {
        (1..=n)
            .map(|i| Example::new(format!("custom description {i}"), format!("Custom Title {i}")))
            .collect()
    }

    fn count_examples(prompt: &str) -> usize {
        prompt.lines().filter(|l| l.starts_with("Example ")).count()
    }

    #[test]
    fn test_prompt_contains_all_builtin_examples_without_custom() {
        let prompt = build_prompt(None, "Ceramic mug 350ml", &[]);
        assert_eq!(count_examples(&prompt), 5);
        for (description, title) in BUILTIN_EXAMPLES {
            assert!(prompt.contains(&format!("Description: {description}")));
            assert!(prompt.contains(&format!("Title: {title}")));
        }
    }

    #[test]
    fn test_custom_examples_numbered_after_builtins() {
        let prompt = build_prompt(None, "Ceramic mug", &custom(2));
        assert_eq!(count_examples(&prompt), 7);
        assert!(prompt.contains("Example 6:\nDescription: custom description 1\nTitle: Custom Title 1"));
        assert!(prompt.contains("Example 7:\nDescription: custom description 2\nTitle: Custom Title 2"));
        assert!(!prompt.contains("Example 8:"));
    }

    #[test]
    fn test_custom_examples_truncated_to_five() {
        let prompt = build_prompt(None, "Ceramic mug", &custom(8));
        assert_eq!(count_examples(&prompt), 10);
        assert!(prompt.contains("Example 10:\nDescription: custom description 5"));
        assert!(!prompt.contains("custom description 6"));
    }

    #[test]
    fn test_section_order() {
        let prompt = build_prompt(Some("Old Mug"), "Ceramic mug", &custom(1));
        let preamble = prompt.find(PREAMBLE).unwrap();
        let last_example = prompt.find("Example 6:").unwrap();
        let guidelines = prompt.find("Guidelines:").unwrap();
        let target = prompt.find("Now generate a title for:").unwrap();
        assert!(preamble < last_example);
        assert!(last_example < guidelines);
        assert!(guidelines < target);
        assert!(prompt.ends_with("Description: Ceramic mug\nTitle:"));
    }

    #[test]
    fn test_old_title_interpolated_into_guidelines() {
        let prompt = build_prompt(Some("LED Bulb E27 Pack of 4"), "Warm white bulb", &[]);
        assert!(prompt.contains("Include keywords from the LED Bulb E27 Pack of 4 that are missing"));
    }

    #[test]
    fn test_missing_old_title_renders_empty() {
        let prompt = build_prompt(None, "Warm white bulb", &[]);
        assert!(prompt.contains("Include keywords from the  that are missing"));
        assert!(!prompt.contains("{old_title}"));
        assert!(!prompt.contains("None"));
    }

    #[test]
    fn test_description_with_placeholder_text_is_literal() {
        let prompt = build_prompt(Some("{description}"), "uses {old_title} literally", &[]);
        assert!(prompt.contains("Include keywords from the {description} that"));
        assert!(prompt.contains("Description: uses {old_title} literally\nTitle:"));
    }

    #[test]
    fn test_empty_description_is_not_rejected() {
        let prompt = build_prompt(None, "", &[]);
        assert!(prompt.ends_with("Description: \nTitle:"));
    }

    #[test]
    fn test_build_prompt_is_deterministic() {
        let examples = custom(3);
        let first = build_prompt(Some("Old"), "Bamboo toothbrush 4 pack", &examples);
        let second = build_prompt(Some("Old"), "Bamboo toothbrush 4 pack", &examples);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_guidelines_cover_listing_policy() {
        let prompt = build_prompt(None, "x", &[]);
        assert!(prompt.contains("under 200 characters"));
        assert!(prompt.contains("first 80 characters"));
        assert!(prompt.contains("Avoid brand names"));
        assert!(prompt.contains("shape and pack details"));
        assert!(prompt.contains("Avoid using synonyms"));
    }
}
