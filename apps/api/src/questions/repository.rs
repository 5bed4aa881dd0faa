use chrono::Utc;
use rand::seq::SliceRandom;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::models::question::{NewQuestion, Patch, QuestionPatch, QuestionRow};
use crate::questions::filter::QuestionFilter;

/// Offset/limit window for listing. Rows are returned in ascending `id`
/// (insertion) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

/// All reads and writes against the `questions` table.
///
/// Every call checks out its own connection from the pool and gives it back
/// when the call returns, whatever the outcome.
#[derive(Clone)]
pub struct QuestionRepository {
    pool: SqlitePool,
}

impl QuestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<QuestionRow, StoreError> {
        let mut conn = self.pool.acquire().await?;
        fetch_row(&mut conn, id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn list(
        &self,
        filter: &QuestionFilter,
        page: Page,
    ) -> Result<Vec<QuestionRow>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM questions");
        filter.push_where(&mut qb);
        qb.push(" ORDER BY id ASC LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(page.skip));

        let rows = qb
            .build_query_as::<QuestionRow>()
            .fetch_all(&mut *conn)
            .await?;
        debug!(
            "Listed {} questions (skip={}, limit={})",
            rows.len(),
            page.skip,
            page.limit
        );
        Ok(rows)
    }

    pub async fn create(&self, new: NewQuestion) -> Result<QuestionRow, StoreError> {
        let question = non_empty("question", new.question)?;
        let answer = non_empty("answer", new.answer)?;
        let now = Utc::now();

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions (question, answer, tags, difficulty, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(question)
        .bind(answer)
        .bind(new.tags)
        .bind(new.difficulty)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        info!("Created question {}", row.id);
        Ok(row)
    }

    /// Merges `patch` over the stored row in a single statement, so there is
    /// no read-then-write window; concurrent updates of the same id are
    /// last-writer-wins.
    pub async fn update(&self, id: i64, patch: QuestionPatch) -> Result<QuestionRow, StoreError> {
        let question = required("question", patch.question)?;
        let answer = required("answer", patch.answer)?;
        let (set_tags, tags) = patch.tags.into_assignment();
        let (set_difficulty, difficulty) = patch.difficulty.into_assignment();

        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            UPDATE questions
            SET question   = COALESCE(?, question),
                answer     = COALESCE(?, answer),
                tags       = CASE WHEN ? THEN ? ELSE tags END,
                difficulty = CASE WHEN ? THEN ? ELSE difficulty END,
                updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(question)
        .bind(answer)
        .bind(set_tags)
        .bind(tags)
        .bind(set_difficulty)
        .bind(difficulty)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        info!("Updated question {id}");
        Ok(row)
    }

    /// Returns whether a row was actually removed.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!("Deleted question {id}");
        }
        Ok(removed)
    }

    /// Uniform pick over the ids matching `filter` at call time.
    pub async fn get_random(&self, filter: &QuestionFilter) -> Result<QuestionRow, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM questions");
        filter.push_where(&mut qb);
        let ids: Vec<i64> = qb.build_query_scalar().fetch_all(&mut *conn).await?;

        let id = pick_uniform(&ids).ok_or(StoreError::NoMatch)?;
        debug!("Picked question {id} out of {} candidates", ids.len());

        // The row can vanish between the two reads if it is deleted concurrently.
        fetch_row(&mut conn, id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }
}

async fn fetch_row(conn: &mut SqliteConnection, id: i64) -> Result<Option<QuestionRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionRow>("SELECT * FROM questions WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await
}

fn pick_uniform(ids: &[i64]) -> Option<i64> {
    ids.choose(&mut rand::thread_rng()).copied()
}

fn non_empty(field: &str, value: String) -> Result<String, StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(value)
}

/// `None` keeps the stored value of a NOT NULL column.
fn required(field: &str, patch: Patch<String>) -> Result<Option<String>, StoreError> {
    match patch {
        Patch::Unset => Ok(None),
        Patch::Null => Err(StoreError::Validation(format!("{field} cannot be null"))),
        Patch::Value(value) => non_empty(field, value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::db::memory_pool;

    async fn repo() -> QuestionRepository {
        QuestionRepository::new(memory_pool().await)
    }

    fn new_question(question: &str, tags: Option<&str>, difficulty: Option<&str>) -> NewQuestion {
        NewQuestion {
            question: question.to_string(),
            answer: format!("Answer to {question}"),
            tags: tags.map(String::from),
            difficulty: difficulty.map(String::from),
        }
    }

    async fn seed(repo: &QuestionRepository, count: usize) -> Vec<QuestionRow> {
        let mut rows = Vec::new();
        for i in 0..count {
            rows.push(
                repo.create(new_question(&format!("Question {i}"), None, None))
                    .await
                    .unwrap(),
            );
        }
        rows
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_fields() {
        let repo = repo().await;
        let created = repo
            .create(new_question("What is ownership?", Some("rust"), Some("easy")))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.question, "What is ownership?");
        assert_eq!(fetched.tags.as_deref(), Some("rust"));
        assert_eq!(fetched.difficulty.as_deref(), Some("easy"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_question_or_answer() {
        let repo = repo().await;

        let mut blank_question = new_question("", None, None);
        blank_question.answer = "something".to_string();
        let err = repo.create(blank_question).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let mut blank_answer = new_question("Q", None, None);
        blank_answer.answer = "   ".to_string();
        let err = repo.create(blank_answer).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        assert!(repo.list(&QuestionFilter::default(), Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_id_is_not_found() {
        let repo = repo().await;
        let err = repo.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_update_only_touches_supplied_fields() {
        let repo = repo().await;
        let created = repo
            .create(new_question("Q", Some("java,backend"), Some("easy")))
            .await
            .unwrap();

        let patch = QuestionPatch {
            difficulty: Patch::Value("X".to_string()),
            ..Default::default()
        };
        let updated = repo.update(created.id, patch).await.unwrap();

        assert_eq!(updated.difficulty.as_deref(), Some("X"));
        assert_eq!(updated.question, created.question);
        assert_eq!(updated.answer, created.answer);
        assert_eq!(updated.tags, created.tags);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_null_clears_optional_field() {
        let repo = repo().await;
        let created = repo
            .create(new_question("Q", Some("rust"), Some("hard")))
            .await
            .unwrap();

        let patch = QuestionPatch {
            tags: Patch::Null,
            ..Default::default()
        };
        let updated = repo.update(created.id, patch).await.unwrap();
        assert!(updated.tags.is_none());
        assert_eq!(updated.difficulty.as_deref(), Some("hard"));
    }

    #[tokio::test]
    async fn test_update_rejects_clearing_required_field() {
        let repo = repo().await;
        let created = repo.create(new_question("Q", None, None)).await.unwrap();

        for patch in [
            QuestionPatch {
                question: Patch::Null,
                ..Default::default()
            },
            QuestionPatch {
                answer: Patch::Value(String::new()),
                ..Default::default()
            },
        ] {
            let err = repo.update(created.id, patch).await.unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)));
        }
        assert_eq!(repo.get_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_missing_id_does_not_create() {
        let repo = repo().await;
        let patch = QuestionPatch {
            question: Patch::Value("new".to_string()),
            answer: Patch::Value("new".to_string()),
            ..Default::default()
        };
        let err = repo.update(7, patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
        assert!(repo.list(&QuestionFilter::default(), Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = repo().await;
        let created = repo.create(new_question("Q", None, None)).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(matches!(
            repo.get_by_id(created.id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_pagination_window() {
        let repo = repo().await;
        let rows = seed(&repo, 5).await;
        let all = QuestionFilter::default();

        let first = repo.list(&all, Page { skip: 0, limit: 2 }).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, rows[0].id);
        assert_eq!(first[1].id, rows[1].id);

        let tail = repo.list(&all, Page { skip: 4, limit: 2 }).await.unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].id, rows[4].id);

        assert!(repo.list(&all, Page { skip: 10, limit: 2 }).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_default_page_limit_is_100() {
        let repo = repo().await;
        seed(&repo, 105).await;
        let rows = repo.list(&QuestionFilter::default(), Page::default()).await.unwrap();
        assert_eq!(rows.len(), 100);
    }

    #[tokio::test]
    async fn test_tag_filter_is_case_insensitive_substring_and() {
        let repo = repo().await;
        let java = repo
            .create(new_question("Java Q", Some("java,backend"), None))
            .await
            .unwrap();
        let js = repo
            .create(new_question("JS Q", Some("javascript,frontend"), None))
            .await
            .unwrap();
        repo.create(new_question("Untagged", None, None)).await.unwrap();

        let ids = |rows: Vec<QuestionRow>| rows.into_iter().map(|r| r.id).collect::<Vec<_>>();

        let loose = repo
            .list(&QuestionFilter::new(Some("java"), None), Page::default())
            .await
            .unwrap();
        assert_eq!(ids(loose), vec![java.id, js.id]);

        let both = repo
            .list(&QuestionFilter::new(Some("JAVA, Backend"), None), Page::default())
            .await
            .unwrap();
        assert_eq!(ids(both), vec![java.id]);
    }

    #[tokio::test]
    async fn test_tags_and_difficulty_combine() {
        let repo = repo().await;
        let closure = repo
            .create(NewQuestion {
                question: "What is a closure?".to_string(),
                answer: "A function bundled with its environment".to_string(),
                tags: Some("javascript, closures".to_string()),
                difficulty: Some("medium".to_string()),
            })
            .await
            .unwrap();

        let listed = repo
            .list(&QuestionFilter::new(Some("closures"), None), Page::default())
            .await
            .unwrap();
        assert!(listed.iter().any(|q| q.id == closure.id));

        let hard = repo
            .list(&QuestionFilter::new(Some("closures"), Some("hard")), Page::default())
            .await
            .unwrap();
        assert!(hard.is_empty());

        let medium = repo
            .list(&QuestionFilter::new(None, Some("medium")), Page::default())
            .await
            .unwrap();
        assert_eq!(medium.len(), 1);
    }

    #[tokio::test]
    async fn test_random_single_match_always_returned() {
        let repo = repo().await;
        let target = repo
            .create(new_question("Only", Some("rust"), None))
            .await
            .unwrap();
        repo.create(new_question("Other", Some("go"), None)).await.unwrap();

        let filter = QuestionFilter::new(Some("rust"), None);
        for _ in 0..100 {
            assert_eq!(repo.get_random(&filter).await.unwrap().id, target.id);
        }
    }

    #[tokio::test]
    async fn test_random_without_match_is_no_match() {
        let repo = repo().await;
        seed(&repo, 3).await;
        let filter = QuestionFilter::new(None, Some("impossible"));
        for _ in 0..10 {
            assert!(matches!(
                repo.get_random(&filter).await.unwrap_err(),
                StoreError::NoMatch
            ));
        }
    }

    #[tokio::test]
    async fn test_random_reaches_every_match() {
        let repo = repo().await;
        let rows = seed(&repo, 4).await;
        let expected: HashSet<i64> = rows.iter().map(|r| r.id).collect();

        let mut seen = HashSet::new();
        for _ in 0..400 {
            seen.insert(repo.get_random(&QuestionFilter::default()).await.unwrap().id);
        }
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_non_ascii_tags_match_identical_filter() {
        let repo = repo().await;
        let row = repo
            .create(new_question("Q", Some("Русский,Über"), None))
            .await
            .unwrap();

        for tags in ["Русский", "Über", "Русский, Über"] {
            let hits = repo
                .list(&QuestionFilter::new(Some(tags), None), Page::default())
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "filter {tags:?}");
            assert_eq!(hits[0].id, row.id);
        }
    }

    #[tokio::test]
    async fn test_concurrent_updates_on_file_store_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("questions.db").display());
        let pool = crate::db::create_pool(&url, 8).await.unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        let repo = QuestionRepository::new(pool);

        let rows = seed(&repo, 16).await;
        let mut tasks = tokio::task::JoinSet::new();
        for n in 0..160 {
            let repo = repo.clone();
            let id = rows[n % rows.len()].id;
            tasks.spawn(async move {
                let patch = QuestionPatch {
                    difficulty: Patch::Value(format!("level-{n}")),
                    ..Default::default()
                };
                repo.update(id, patch).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let updated = joined.unwrap().unwrap();
            assert!(updated.difficulty.unwrap().starts_with("level-"));
        }

        for row in &rows {
            let stored = repo.get_by_id(row.id).await.unwrap();
            assert_eq!(stored.question, row.question);
            assert!(stored.difficulty.unwrap().starts_with("level-"));
        }
    }

    #[test]
    fn test_pick_uniform_empty() {
        assert_eq!(pick_uniform(&[]), None);
        assert_eq!(pick_uniform(&[9]), Some(9));
    }
}
