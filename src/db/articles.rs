//! Article database operations
//!
//! Only the slice the fact-check engine needs: reads for submission, the
//! denormalized-field sync executed inside the terminal transaction, and
//! insert/delete for the trigger-adapter boundary and the cascade path.
//! Full article CRUD lives with the rest of the backend.

use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Article;

/// Save article to database
pub async fn insert_article(pool: &SqlitePool, article: &Article) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO articles (
            id, title, url, content,
            credibility_score, fact_check_verdict, fact_checked_at,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(article.id.to_string())
    .bind(&article.title)
    .bind(&article.url)
    .bind(&article.content)
    .bind(article.credibility_score)
    .bind(&article.fact_check_verdict)
    .bind(article.fact_checked_at)
    .bind(article.created_at)
    .bind(article.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load article by id
pub async fn get_article(pool: &SqlitePool, article_id: Uuid) -> Result<Option<Article>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, url, content,
               credibility_score, fact_check_verdict, fact_checked_at, created_at
        FROM articles
        WHERE id = ?
        "#,
    )
    .bind(article_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let id_str: String = row.get("id");
            Ok(Some(Article {
                id: Uuid::parse_str(&id_str)
                    .map_err(|e| Error::Internal(format!("Bad article id: {}", e)))?,
                title: row.get("title"),
                url: row.get("url"),
                content: row.get("content"),
                credibility_score: row.get("credibility_score"),
                fact_check_verdict: row.get("fact_check_verdict"),
                fact_checked_at: row.get("fact_checked_at"),
                created_at: row.get("created_at"),
            }))
        }
        None => Ok(None),
    }
}

/// Delete article; the fact-check row goes with it via FK cascade
pub async fn delete_article(pool: &SqlitePool, article_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM articles WHERE id = ?")
        .bind(article_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Article {}", article_id)));
    }

    Ok(())
}

/// Write the denormalized credibility fields onto the article.
/// Runs inside the same transaction as the terminal fact-check update so
/// no inconsistent window is visible (see fact_checks::finalize).
pub(crate) async fn sync_credibility(
    tx: &mut Transaction<'_, Sqlite>,
    article_id: Uuid,
    credibility_score: i64,
    verdict: &str,
    fact_checked_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE articles
        SET credibility_score = ?,
            fact_check_verdict = ?,
            fact_checked_at = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(credibility_score)
    .bind(verdict)
    .bind(fact_checked_at)
    .bind(Utc::now())
    .bind(article_id.to_string())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
