//! v003: per-symbol cognitive complexity recorded at extraction time.

pub const MIGRATION_SQL: &str = r#"
ALTER TABLE symbols ADD COLUMN cognitive_complexity INTEGER NOT NULL DEFAULT 0;
"#;
