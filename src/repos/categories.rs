use std::collections::{HashMap, HashSet};

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::{info, trace};

use crate::{
    ledger::domain::categories::{Category, NewCategory},
    models,
};

use super::PostgresUnitOfWork;

#[async_trait]
pub trait CategoryStore {
    /// Find the category with exactly the given title.
    async fn find_category_by_title(&mut self, title: &str) -> anyhow::Result<Option<Category>>;

    /// Find every category whose title is one of `titles`. Titles without a
    /// matching category are ignored.
    async fn find_categories_by_titles(&mut self, titles: &[String])
        -> anyhow::Result<Vec<Category>>;

    /// Persist a batch of new categories.
    ///
    /// # Returns
    ///
    /// The persisted categories in the same order as `categories`. If a
    /// category with the same title already exists, that category is returned
    /// in place of a new one.
    async fn persist_categories(
        &mut self,
        categories: Vec<NewCategory>,
    ) -> anyhow::Result<Vec<Category>>;
}

#[async_trait]
impl CategoryStore for PostgresUnitOfWork {
    async fn find_category_by_title(&mut self, title: &str) -> anyhow::Result<Option<Category>> {
        trace!(title, "Querying for category by title.");

        let category = sqlx::query_as::<_, models::ledger::Category>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM category
            WHERE title = $1
            "#,
        )
        .bind(title)
        .fetch_optional(&mut self.0)
        .await?;

        Ok(category.map(Into::into))
    }

    async fn find_categories_by_titles(
        &mut self,
        titles: &[String],
    ) -> anyhow::Result<Vec<Category>> {
        trace!(?titles, "Finding categories matching titles.");

        let categories = sqlx::query_as::<_, models::ledger::Category>(
            r#"
            SELECT id, title, created_at, updated_at
            FROM category
            WHERE title = ANY($1)
            ORDER BY created_at
            "#,
        )
        .bind(titles.to_vec())
        .fetch_all(&mut self.0)
        .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }

    async fn persist_categories(
        &mut self,
        categories: Vec<NewCategory>,
    ) -> anyhow::Result<Vec<Category>> {
        if categories.is_empty() {
            return Ok(vec![]);
        }

        // A single insert can't touch the same row twice, so duplicate titles
        // are only sent once.
        let mut seen_titles = HashSet::new();
        let unique_categories = categories
            .iter()
            .filter(|category| seen_titles.insert(category.title()))
            .collect::<Vec<_>>();

        let mut query_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO category (id, title) ");

        query_builder.push_values(unique_categories, |mut b, category| {
            b.push_bind(category.id())
                .push_bind(category.title().to_owned());
        });

        // The no-op update makes an existing row show up in RETURNING, which
        // turns a concurrent insert of the same title into a lookup.
        query_builder.push(
            r#"
            ON CONFLICT (title) DO UPDATE SET title = EXCLUDED.title
            RETURNING id, title, created_at, updated_at
            "#,
        );

        let persisted = query_builder
            .build_query_as::<models::ledger::Category>()
            .fetch_all(&mut self.0)
            .await?
            .into_iter()
            .map(|model| (model.title.clone(), Category::from(model)))
            .collect::<HashMap<_, _>>();

        info!(count = persisted.len(), "Persisted categories.");

        categories
            .iter()
            .map(|category| {
                persisted.get(category.title()).cloned().with_context(|| {
                    format!(
                        "Category {:?} was not returned after insert.",
                        category.title()
                    )
                })
            })
            .collect()
    }
}
