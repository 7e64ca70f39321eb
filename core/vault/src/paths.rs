//! Storage locations for uploaded vault files.

use chrono::{DateTime, Utc};

use kinvault_common::{Error, FamilyId, ObjectPath, Result};

/// Replace every character outside `[A-Za-z0-9._-]` with `-`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Object path for a file uploaded by `family` at `created_at`.
///
/// Layout: `{family_id}/{unix_millis}-{sanitized_name}`.
pub fn file_object_path(
    family: &FamilyId,
    created_at: DateTime<Utc>,
    file_name: &str,
) -> Result<ObjectPath> {
    let name = format!(
        "{}-{}",
        created_at.timestamp_millis(),
        sanitize_file_name(file_name)
    );
    ObjectPath::from_components(vec![family.as_str().to_string(), name]).map_err(|e| {
        Error::Validation(format!(
            "Cannot derive storage path for family {}: {}",
            family, e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize_file_name("tax_return-2023.pdf"), "tax_return-2023.pdf");
    }

    #[test]
    fn test_sanitize_replaces_everything_else() {
        assert_eq!(sanitize_file_name("my passport (scan).jpg"), "my-passport--scan-.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "..-..-etc-passwd");
        assert_eq!(sanitize_file_name("Geburtsurkunde_Jürgen.png"), "Geburtsurkunde_J-rgen.png");
    }

    #[test]
    fn test_file_object_path_layout() {
        let family = FamilyId::new("fam-42").unwrap();
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();

        let path = file_object_path(&family, at, "deed of house.pdf").unwrap();
        assert_eq!(path.to_string_path(), "fam-42/1700000000123-deed-of-house.pdf");
    }

    #[test]
    fn test_traversal_names_stay_inside_family_prefix() {
        let family = FamilyId::new("fam-42").unwrap();
        let at = Utc.timestamp_millis_opt(1).unwrap();

        let path = file_object_path(&family, at, "..").unwrap();
        assert_eq!(path.components(), &["fam-42", "1-.."]);
    }

    #[test]
    fn test_family_with_separator_rejected() {
        let family = FamilyId::new("fam/42").unwrap();
        let result = file_object_path(&family, Utc::now(), "a.txt");
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
