/// Interpret an environment flag such as `SFS_WEBHOOK_SIGNATURE_CHECKS`. The usual truthy
/// and falsy spellings are accepted, ignoring case and surrounding whitespace. Anything
/// else, including an unset variable, yields `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let Some(raw) = value else { return default };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
