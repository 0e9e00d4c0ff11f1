//! UI translation tables.

use crate::types::{DynamicTranslationRow, StaticTranslationRow, TranslationRow};
use crate::{Error, Result};

use super::Database;

impl Database {
    /// All translations, ordered by id
    pub async fn translations(&self) -> Result<Vec<TranslationRow>> {
        sqlx::query_as::<_, TranslationRow>(
            r#"
            SELECT TranslationId, TranslationName, BrowserMatch, Active
            FROM Page_Translations
            ORDER BY TranslationId
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Static entries of a translation, ordered by `Req`
    pub async fn static_translations(&self, translation_id: i64) -> Result<Vec<StaticTranslationRow>> {
        sqlx::query_as::<_, StaticTranslationRow>(
            r#"
            SELECT Req, Trans, IsHtml
            FROM Page_StaticTranslation
            WHERE TranslationId = ?
            ORDER BY Req
            "#,
        )
        .bind(translation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Dynamic entries of a translation, ordered by category and field
    pub async fn dynamic_translations(
        &self,
        translation_id: i64,
    ) -> Result<Vec<DynamicTranslationRow>> {
        sqlx::query_as::<_, DynamicTranslationRow>(
            r#"
            SELECT Category, Field, Trans
            FROM Page_DynamicTranslation
            WHERE TranslationId = ?
            ORDER BY Category, Field
            "#,
        )
        .bind(translation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)
    }

    /// Insert a translation
    pub async fn insert_translation(&self, translation: &TranslationRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO Page_Translations (TranslationId, TranslationName, BrowserMatch, Active)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(translation.translation_id)
        .bind(&translation.translation_name)
        .bind(&translation.browser_match)
        .bind(translation.active)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;
        Ok(())
    }

    /// Insert a static entry of a translation
    pub async fn insert_static_translation(
        &self,
        translation_id: i64,
        entry: &StaticTranslationRow,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO Page_StaticTranslation (TranslationId, Req, Trans, IsHtml) VALUES (?, ?, ?, ?)",
        )
        .bind(translation_id)
        .bind(&entry.req)
        .bind(&entry.trans)
        .bind(entry.is_html)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;
        Ok(())
    }

    /// Insert a dynamic entry of a translation
    pub async fn insert_dynamic_translation(
        &self,
        translation_id: i64,
        entry: &DynamicTranslationRow,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO Page_DynamicTranslation (TranslationId, Category, Field, Trans) VALUES (?, ?, ?, ?)",
        )
        .bind(translation_id)
        .bind(&entry.category)
        .bind(&entry.field)
        .bind(&entry.trans)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;
        Ok(())
    }
}
