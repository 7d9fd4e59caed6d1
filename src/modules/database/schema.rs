use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, Result};

/// Open the blog database, creating the tables on first use.
///
/// Blogs and comments live in the same file so the admin comment listing can
/// join against blogs. Comments reference blogs by id only; removing a blog's
/// comments is the caller's job.
pub fn open(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS blogs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            sub_title TEXT,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            image TEXT NOT NULL,
            is_published INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_blogs_created ON blogs(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            blog_id TEXT NOT NULL,
            name TEXT NOT NULL,
            content TEXT NOT NULL,
            is_approved INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_comments_blog ON comments(blog_id)",
        [],
    )?;

    Ok(conn)
}

/// RFC 3339 with a fixed precision, so string order is time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.db");
        let path = path.to_str().unwrap();

        assert!(open(path).is_ok());
        assert!(open(path).is_ok());
    }

    #[test]
    fn test_timestamps_sort_lexically() {
        let first = now_timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = now_timestamp();
        assert_eq!(first.len(), second.len());
        assert!(first < second);
    }
}
