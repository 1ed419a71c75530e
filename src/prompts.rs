pub const SYSTEM: &str = include_str!("../data/prompts/system.txt");
pub const USER_STRUCTURED: &str = include_str!("../data/prompts/user_structured.txt");
pub const USER_FREEFORM: &str = include_str!("../data/prompts/user_freeform.txt");
pub const TEXT_INPUT: &str = include_str!("../data/prompts/text_input.txt");
pub const IMAGE_INPUT: &str = include_str!("../data/prompts/image_input.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution runs in order, so user-supplied text should be the last var.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
