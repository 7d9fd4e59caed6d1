use crate::blogs::{blog_from_row, Blog, BLOG_COLUMNS};
use crate::schema;
use rusqlite::{params, Connection, Result, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 评论数据结构
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub blog: String, // 所属文章 id
    pub name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: String,
}

/// 评论及其所属文章（管理后台使用）
///
/// 所属文章已被删除时 `blog` 为 `None`
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithBlog {
    #[serde(rename = "_id")]
    pub id: String,
    pub blog: Option<Blog>,
    pub name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: String,
}

/// 创建评论请求
#[derive(Debug, Deserialize, Default)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub blog: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

const COMMENT_COLUMNS: &str = "id, blog_id, name, content, is_approved, created_at";

fn comment_from_row(row: &Row) -> Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        blog: row.get(1)?,
        name: row.get(2)?,
        content: row.get(3)?,
        is_approved: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// 评论数据库管理器
pub struct CommentDB {
    conn: Connection,
}

impl CommentDB {
    pub fn new(db_path: &str) -> Result<Self> {
        Ok(Self {
            conn: schema::open(db_path)?,
        })
    }

    /// 添加新评论（默认未审核）
    pub fn add_comment(&self, request: CreateCommentRequest) -> Result<Comment> {
        let id = Uuid::new_v4().to_string();
        let now = schema::now_timestamp();

        self.conn.execute(
            "INSERT INTO comments (id, blog_id, name, content, is_approved, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
            params![id, request.blog, request.name, request.content, now],
        )?;

        Ok(Comment {
            id,
            blog: request.blog,
            name: request.name,
            content: request.content,
            is_approved: false,
            created_at: now,
        })
    }

    /// 获取某篇文章已审核的评论
    pub fn get_approved_comments(&self, blog_id: &str) -> Result<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM comments WHERE blog_id = ? AND is_approved = 1
             ORDER BY created_at DESC, rowid DESC",
            COMMENT_COLUMNS
        ))?;

        let comments = stmt
            .query_map(params![blog_id], comment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// 获取所有评论，并附带所属文章
    pub fn get_all_comments(&self) -> Result<Vec<CommentWithBlog>> {
        let blog_columns = BLOG_COLUMNS
            .split(", ")
            .map(|column| format!("b.{}", column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT c.id, c.name, c.content, c.is_approved, c.created_at, {}
             FROM comments c LEFT JOIN blogs b ON b.id = c.blog_id
             ORDER BY c.created_at DESC, c.rowid DESC",
            blog_columns
        ))?;

        let comments = stmt
            .query_map([], |row| {
                let blog_id: Option<String> = row.get(5)?;
                let blog = match blog_id {
                    Some(_) => Some(blog_from_row(row, 5)?),
                    None => None,
                };
                Ok(CommentWithBlog {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    content: row.get(2)?,
                    is_approved: row.get(3)?,
                    created_at: row.get(4)?,
                    blog,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    /// 审核通过评论
    pub fn approve_comment(&self, id: &str) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE comments SET is_approved = 1 WHERE id = ?",
            params![id],
        )?;
        Ok(rows > 0)
    }

    /// 删除评论
    pub fn delete_comment(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?", params![id])?;
        Ok(rows > 0)
    }

    /// 删除某篇文章的全部评论，返回删除数量
    pub fn delete_comments_for_blog(&self, blog_id: &str) -> Result<usize> {
        self.conn
            .execute("DELETE FROM comments WHERE blog_id = ?", params![blog_id])
    }

    pub fn count_comments(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blogs::{sample_blog, BlogDB};

    fn temp_dbs() -> (tempfile::TempDir, BlogDB, CommentDB) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.db");
        let path = path.to_str().unwrap();
        (dir, BlogDB::new(path).unwrap(), CommentDB::new(path).unwrap())
    }

    fn request(blog: &str, name: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            blog: blog.to_string(),
            name: name.to_string(),
            content: format!("Nice post from {}", name),
        }
    }

    #[test]
    fn test_new_comment_hidden_until_approved() {
        let (_dir, blogs, comments) = temp_dbs();
        let blog = blogs.add_blog(sample_blog("Post", true)).unwrap();

        let comment = comments.add_comment(request(&blog.id, "ana")).unwrap();
        assert!(!comment.is_approved);
        assert!(comments.get_approved_comments(&blog.id).unwrap().is_empty());

        assert!(comments.approve_comment(&comment.id).unwrap());
        let visible = comments.get_approved_comments(&blog.id).unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].is_approved);
    }

    #[test]
    fn test_approved_listing_scoped_to_blog() {
        let (_dir, blogs, comments) = temp_dbs();
        let a = blogs.add_blog(sample_blog("A", true)).unwrap();
        let b = blogs.add_blog(sample_blog("B", true)).unwrap();

        let on_a = comments.add_comment(request(&a.id, "ana")).unwrap();
        let on_b = comments.add_comment(request(&b.id, "bo")).unwrap();
        comments.approve_comment(&on_a.id).unwrap();
        comments.approve_comment(&on_b.id).unwrap();

        let listed = comments.get_approved_comments(&a.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, on_a.id);
    }

    #[test]
    fn test_all_comments_join_blog() {
        let (_dir, blogs, comments) = temp_dbs();
        let blog = blogs.add_blog(sample_blog("Joined", false)).unwrap();

        comments.add_comment(request(&blog.id, "first")).unwrap();
        comments.add_comment(request(&blog.id, "second")).unwrap();
        comments.add_comment(request("orphan-blog", "third")).unwrap();

        let all = comments.get_all_comments().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "third");
        assert!(all[0].blog.is_none());
        assert_eq!(all[1].blog.as_ref().unwrap().title, "Joined");
        assert_eq!(comments.count_comments().unwrap(), 3);
    }

    #[test]
    fn test_delete_comments_for_blog() {
        let (_dir, blogs, comments) = temp_dbs();
        let doomed = blogs.add_blog(sample_blog("Doomed", true)).unwrap();
        let kept = blogs.add_blog(sample_blog("Kept", true)).unwrap();

        comments.add_comment(request(&doomed.id, "x")).unwrap();
        comments.add_comment(request(&doomed.id, "y")).unwrap();
        comments.add_comment(request(&kept.id, "z")).unwrap();

        assert_eq!(comments.delete_comments_for_blog(&doomed.id).unwrap(), 2);
        assert_eq!(comments.count_comments().unwrap(), 1);
    }

    #[test]
    fn test_moderation_on_missing_comment() {
        let (_dir, _blogs, comments) = temp_dbs();
        assert!(!comments.approve_comment("nope").unwrap());
        assert!(!comments.delete_comment("nope").unwrap());
    }
}
