//! Remigrate generator source editing.
//!
//! `rails generate generator remigrate` produces a bare generator class. The
//! remigration flow adds a `remigrate` method to it that re-generates one
//! migration per file in `db/migrate-new`, in timestamp order.

use std::path::Path;

/// Migration base name: file stem without its leading `<digits>_` timestamp.
///
/// `20140101120000_create_users.rb` becomes `create_users`.
pub fn migration_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    strip_timestamp(&stem).to_string()
}

fn strip_timestamp(stem: &str) -> &str {
    let digits = stem.bytes().take_while(u8::is_ascii_digit).count();
    match stem[digits..].strip_prefix('_') {
        Some(rest) if digits > 0 => rest,
        _ => stem,
    }
}

/// The `remigrate` method body for the given migration names.
pub fn remigrate_method<S: AsRef<str>>(names: &[S]) -> String {
    let mut method = String::from("  def remigrate\n");
    for name in names {
        method.push_str(&format!("    generate \"migration\", \"{}\"\n", name.as_ref()));
    }
    method.push_str("  end\n");
    method
}

/// Insert `method` after the generator's `source_root` line.
///
/// Returns `None` when the source has no `source_root` line.
pub fn insert_after_source_root(source: &str, method: &str) -> Option<String> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        offset += line.len();
        if line.trim_start().starts_with("source_root") {
            let mut edited = String::with_capacity(source.len() + method.len() + 1);
            edited.push_str(&source[..offset]);
            if !line.ends_with('\n') {
                edited.push('\n');
            }
            edited.push('\n');
            edited.push_str(method);
            edited.push_str(&source[offset..]);
            return Some(edited);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const GENERATOR: &str = "class RemigrateGenerator < Rails::Generators::NamedBase\n  source_root File.expand_path('templates', __dir__)\nend\n";

    #[test]
    fn strips_only_the_leading_timestamp() {
        assert_eq!(
            migration_name(&PathBuf::from("db/migrate-new/20140101120000_create_users.rb")),
            "create_users"
        );
        assert_eq!(
            migration_name(&PathBuf::from("20140101_add_v2_fields_to_users.rb")),
            "add_v2_fields_to_users"
        );
        assert_eq!(migration_name(&PathBuf::from("create_users.rb")), "create_users");
        assert_eq!(migration_name(&PathBuf::from("2024.rb")), "2024");
    }

    #[test]
    fn method_lists_one_generate_per_migration() {
        let method = remigrate_method(&["create_users", "add_email_to_users"]);
        assert_eq!(
            method,
            "  def remigrate\n    generate \"migration\", \"create_users\"\n    generate \"migration\", \"add_email_to_users\"\n  end\n"
        );
    }

    #[test]
    fn inserts_after_source_root() {
        let method = remigrate_method(&["create_users"]);
        let edited = insert_after_source_root(GENERATOR, &method).unwrap();
        assert_eq!(
            edited,
            "class RemigrateGenerator < Rails::Generators::NamedBase\n  source_root File.expand_path('templates', __dir__)\n\n  def remigrate\n    generate \"migration\", \"create_users\"\n  end\nend\n"
        );
    }

    #[test]
    fn legacy_source_root_form() {
        let source = "class RemigrateGenerator < Rails::Generators::NamedBase\n  source_root File.expand_path('../templates', __FILE__)\nend";
        let edited = insert_after_source_root(source, "  def remigrate\n  end\n").unwrap();
        assert!(edited.contains("__FILE__)\n\n  def remigrate\n  end\nend"));
    }

    #[test]
    fn missing_source_root() {
        assert!(insert_after_source_root("class Foo\nend\n", "x").is_none());
    }
}
