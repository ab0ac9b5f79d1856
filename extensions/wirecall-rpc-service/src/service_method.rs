use crate::constants::SERVICE_METHOD_SEPARATOR;

/// Splits `"Type.Method"` into its two parts.
///
/// Returns `None` unless the string contains exactly one separator with a
/// non-empty name on each side.
pub fn split_service_method(service_method: &str) -> Option<(&str, &str)> {
    let mut parts = service_method.split(SERVICE_METHOD_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(service), Some(method), None) if !service.is_empty() && !method.is_empty() => {
            Some((service, method))
        }
        _ => None,
    }
}

pub fn format_service_method(service_name: &str, method_name: &str) -> String {
    format!("{service_name}{SERVICE_METHOD_SEPARATOR}{method_name}")
}

/// Whether `name` may be published: an uppercase first letter followed by
/// letters, digits or underscores.
pub fn is_exported_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_only_two_non_empty_parts() {
        assert_eq!(split_service_method("Echo.Say"), Some(("Echo", "Say")));
        assert_eq!(split_service_method("NoDot"), None);
        assert_eq!(split_service_method(".Say"), None);
        assert_eq!(split_service_method("Echo."), None);
        assert_eq!(split_service_method("A.B.C"), None);
        assert_eq!(split_service_method(""), None);
    }

    #[test]
    fn exported_identifiers() {
        assert!(is_exported_identifier("Echo"));
        assert!(is_exported_identifier("Arith_V2"));
        assert!(is_exported_identifier("Échelle"));
        assert!(!is_exported_identifier("echo"));
        assert!(!is_exported_identifier("_Echo"));
        assert!(!is_exported_identifier("Echo.Say"));
        assert!(!is_exported_identifier("Echo Say"));
        assert!(!is_exported_identifier(""));
    }

    #[test]
    fn formats_with_separator() {
        assert_eq!(format_service_method("Arith", "Add"), "Arith.Add");
    }
}
