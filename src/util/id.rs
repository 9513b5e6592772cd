//! Random identifiers for scene objects, geometries and materials.

/// Generate an RFC 4122 version 4 UUID string (upper-case hex, hyphenated,
/// as three.js writes them).
#[must_use]
pub fn generate_uuid() -> String {
    uuid::Uuid::new_v4().to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_shape() {
        let id = generate_uuid();
        assert_eq!(id.len(), 36);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(parts[2].starts_with('4'));
        assert!(matches!(
            parts[3].chars().next(),
            Some('8' | '9' | 'A' | 'B')
        ));
    }

    #[test]
    fn uuid_is_upper_case() {
        let id = generate_uuid();
        assert_eq!(id, id.to_uppercase());
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn uuids_differ() {
        assert_ne!(generate_uuid(), generate_uuid());
    }
}
