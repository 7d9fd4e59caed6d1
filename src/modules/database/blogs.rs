use crate::schema;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 博客文章
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub sub_title: Option<String>,
    pub description: String,
    pub category: String,
    pub image: String, // 优化后的图片地址
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// 创建博客所需字段
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub sub_title: Option<String>,
    pub description: String,
    pub category: String,
    pub image: String,
    pub is_published: bool,
}

pub(crate) const BLOG_COLUMNS: &str =
    "id, title, sub_title, description, category, image, is_published, created_at, updated_at";

/// 从第 `offset` 列开始映射一篇博客
pub(crate) fn blog_from_row(row: &Row, offset: usize) -> Result<Blog> {
    Ok(Blog {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        sub_title: row.get(offset + 2)?,
        description: row.get(offset + 3)?,
        category: row.get(offset + 4)?,
        image: row.get(offset + 5)?,
        is_published: row.get(offset + 6)?,
        created_at: row.get(offset + 7)?,
        updated_at: row.get(offset + 8)?,
    })
}

/// 博客数据库管理器
pub struct BlogDB {
    conn: Connection,
}

impl BlogDB {
    pub fn new(db_path: &str) -> Result<Self> {
        Ok(Self {
            conn: schema::open(db_path)?,
        })
    }

    /// 添加新博客
    pub fn add_blog(&self, blog: NewBlog) -> Result<Blog> {
        let id = Uuid::new_v4().to_string();
        let now = schema::now_timestamp();

        self.conn.execute(
            "INSERT INTO blogs (id, title, sub_title, description, category, image, is_published, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                blog.title,
                blog.sub_title,
                blog.description,
                blog.category,
                blog.image,
                blog.is_published,
                now,
                now
            ],
        )?;

        Ok(Blog {
            id,
            title: blog.title,
            sub_title: blog.sub_title,
            description: blog.description,
            category: blog.category,
            image: blog.image,
            is_published: blog.is_published,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub fn get_blog(&self, id: &str) -> Result<Option<Blog>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM blogs WHERE id = ?", BLOG_COLUMNS),
                params![id],
                |row| blog_from_row(row, 0),
            )
            .optional()
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM blogs WHERE id = ?", params![id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// 按创建时间倒序；`published` 非空时按发布状态过滤
    pub fn list_blogs(&self, published: Option<bool>) -> Result<Vec<Blog>> {
        let blogs = match published {
            Some(flag) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM blogs WHERE is_published = ?
                     ORDER BY created_at DESC, rowid DESC",
                    BLOG_COLUMNS
                ))?;
                let rows = stmt.query_map(params![flag], |row| blog_from_row(row, 0))?;
                rows.collect::<Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM blogs ORDER BY created_at DESC, rowid DESC",
                    BLOG_COLUMNS
                ))?;
                let rows = stmt.query_map([], |row| blog_from_row(row, 0))?;
                rows.collect::<Result<Vec<_>>>()?
            }
        };
        Ok(blogs)
    }

    pub fn recent_blogs(&self, limit: usize) -> Result<Vec<Blog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM blogs ORDER BY created_at DESC, rowid DESC LIMIT ?",
            BLOG_COLUMNS
        ))?;
        let blogs = stmt
            .query_map(params![limit as i64], |row| blog_from_row(row, 0))?
            .collect::<Result<Vec<_>>>()?;
        Ok(blogs)
    }

    /// 切换发布状态，返回新状态；文章不存在时返回 `None`
    pub fn toggle_publish(&self, id: &str) -> Result<Option<bool>> {
        let rows = self.conn.execute(
            "UPDATE blogs SET is_published = NOT is_published, updated_at = ? WHERE id = ?",
            params![schema::now_timestamp(), id],
        )?;
        if rows == 0 {
            return Ok(None);
        }

        self.conn
            .query_row(
                "SELECT is_published FROM blogs WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()
    }

    /// 删除博客（不包含评论）
    pub fn delete_blog(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM blogs WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }

    pub fn count_blogs(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM blogs", [], |row| row.get(0))
    }

    pub fn count_drafts(&self) -> Result<i64> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM blogs WHERE is_published = 0",
            [],
            |row| row.get(0),
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_blog(title: &str, is_published: bool) -> NewBlog {
    NewBlog {
        title: title.to_string(),
        sub_title: Some("A subtitle".to_string()),
        description: "<p>Body</p>".to_string(),
        category: "Technology".to_string(),
        image: "https://ik.imagekit.io/demo/tr:q-auto:f-webp:w-1280/blogs/cover.png".to_string(),
        is_published,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, BlogDB) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blogs.db");
        let db = BlogDB::new(path.to_str().unwrap()).unwrap();
        (dir, db)
    }

    #[test]
    fn test_add_and_get_blog() {
        let (_dir, db) = temp_db();

        let created = db.add_blog(sample_blog("Hello", false)).unwrap();
        let fetched = db.get_blog(&created.id).unwrap().unwrap();

        assert_eq!(fetched, created);
        assert!(!fetched.is_published);
        assert!(db.exists(&created.id).unwrap());
    }

    #[test]
    fn test_missing_blog_is_none() {
        let (_dir, db) = temp_db();
        assert!(db.get_blog("does-not-exist").unwrap().is_none());
        assert!(!db.exists("does-not-exist").unwrap());
        assert_eq!(db.toggle_publish("does-not-exist").unwrap(), None);
        assert!(!db.delete_blog("does-not-exist").unwrap());
    }

    #[test]
    fn test_list_filters_and_orders_newest_first() {
        let (_dir, db) = temp_db();

        let first = db.add_blog(sample_blog("First", true)).unwrap();
        let draft = db.add_blog(sample_blog("Draft", false)).unwrap();
        let third = db.add_blog(sample_blog("Third", true)).unwrap();

        let published: Vec<String> = db
            .list_blogs(Some(true))
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(published, vec![third.id.clone(), first.id.clone()]);

        let all = db.list_blogs(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].id, draft.id);

        assert_eq!(db.count_blogs().unwrap(), 3);
        assert_eq!(db.count_drafts().unwrap(), 1);
    }

    #[test]
    fn test_toggle_publish_twice_restores_state() {
        let (_dir, db) = temp_db();
        let blog = db.add_blog(sample_blog("Toggle", false)).unwrap();

        assert_eq!(db.toggle_publish(&blog.id).unwrap(), Some(true));
        assert_eq!(db.toggle_publish(&blog.id).unwrap(), Some(false));
        assert!(!db.get_blog(&blog.id).unwrap().unwrap().is_published);
    }

    #[test]
    fn test_recent_blogs_limit() {
        let (_dir, db) = temp_db();
        for i in 0..7 {
            db.add_blog(sample_blog(&format!("Post {}", i), i % 2 == 0)).unwrap();
        }

        let recent = db.recent_blogs(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].title, "Post 6");
    }

    #[test]
    fn test_wire_field_names() {
        let (_dir, db) = temp_db();
        let blog = db.add_blog(sample_blog("Wire", true)).unwrap();
        let value = serde_json::to_value(&blog).unwrap();

        assert_eq!(value["_id"], blog.id);
        assert_eq!(value["subTitle"], "A subtitle");
        assert_eq!(value["isPublished"], true);
        assert!(value.get("createdAt").is_some());
    }
}
