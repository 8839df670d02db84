//! Wedding Handler
//!
//! Create, edit, archive and read weddings. None of these touch credits;
//! publishing lives in [`super::PublishHandler`].

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    credits_to_deduct, CostBreakdown, OperationContext, PriceTable, Slug, Wedding,
};
use crate::error::AppError;
use crate::store::{Store, StoreError};

use super::{authenticated, CreateWeddingCommand, EstimateResult, UpdateWeddingCommand};

/// Handler for wedding CRUD and estimates
pub struct WeddingHandler {
    store: Arc<dyn Store>,
    prices: Arc<PriceTable>,
}

fn slug_error(err: StoreError) -> AppError {
    match err {
        StoreError::Duplicate("slug") => AppError::SlugTaken,
        other => AppError::Store(other),
    }
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidRequest("Title is required".to_string()));
    }
    Ok(title.to_string())
}

impl WeddingHandler {
    pub fn new(store: Arc<dyn Store>, prices: Arc<PriceTable>) -> Self {
        Self { store, prices }
    }

    /// Create a DRAFT wedding owned by the caller
    pub async fn create(
        &self,
        command: CreateWeddingCommand,
        context: &OperationContext,
    ) -> Result<Wedding, AppError> {
        let admin_id = authenticated(context)?;
        let title = validate_title(&command.title)?;
        let slug = Slug::parse(&command.slug)?;

        if self.store.find_wedding_by_slug(slug.as_str()).await?.is_some() {
            return Err(AppError::SlugTaken);
        }

        let wedding = Wedding::create(admin_id, title, slug);
        self.store
            .insert_wedding(&wedding)
            .await
            .map_err(slug_error)?;

        tracing::info!(wedding_id = %wedding.id, admin_id = %admin_id, slug = %wedding.slug, "Wedding created");
        Ok(wedding)
    }

    /// Own weddings, or every wedding for a super-admin
    pub async fn list(&self, context: &OperationContext) -> Result<Vec<Wedding>, AppError> {
        let admin_id = authenticated(context)?;
        let owner = if context.is_super_admin() {
            None
        } else {
            Some(admin_id)
        };
        Ok(self.store.list_weddings(owner).await?)
    }

    /// Read a wedding the caller may access
    pub async fn get(
        &self,
        wedding_id: Uuid,
        context: &OperationContext,
    ) -> Result<Wedding, AppError> {
        authenticated(context)?;
        let wedding = self.load(wedding_id).await?;
        if !context.can_access(wedding.admin_id) {
            return Err(AppError::Forbidden(
                "Not authorized to access this wedding".to_string(),
            ));
        }
        Ok(wedding)
    }

    /// Apply a partial update. Never changes the published cost.
    pub async fn update(
        &self,
        wedding_id: Uuid,
        command: UpdateWeddingCommand,
        context: &OperationContext,
    ) -> Result<Wedding, AppError> {
        let mut wedding = self.get(wedding_id, context).await?;
        wedding.ensure_editable()?;

        if let Some(title) = command.title {
            wedding.title = validate_title(&title)?;
        }

        if let Some(raw) = command.slug {
            let slug = Slug::parse(&raw)?;
            if slug != wedding.slug {
                if self.store.find_wedding_by_slug(slug.as_str()).await?.is_some() {
                    return Err(AppError::SlugTaken);
                }
                wedding.slug = slug;
            }
        }

        if let Some(design_key) = command.selected_design_key {
            let design_key = design_key.trim().to_string();
            wedding.selected_design_key = (!design_key.is_empty()).then_some(design_key);
        }

        if let Some(features) = command.selected_features {
            wedding.selected_features = features
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }

        if let Some(status) = command.status {
            if status != wedding.status() {
                wedding.set_status(status)?;
            }
        }

        wedding.touch();
        let wedding = self
            .store
            .update_wedding(&wedding)
            .await
            .map_err(slug_error)?;

        tracing::debug!(wedding_id = %wedding.id, version = wedding.version, "Wedding updated");
        Ok(wedding)
    }

    /// Archive a wedding; archiving twice is a no-op
    pub async fn archive(
        &self,
        wedding_id: Uuid,
        context: &OperationContext,
    ) -> Result<Wedding, AppError> {
        let admin_id = authenticated(context)?;
        let mut wedding = self.load(wedding_id).await?;
        if !wedding.is_owned_by(admin_id) {
            return Err(AppError::Forbidden(
                "Only the owner can archive this wedding".to_string(),
            ));
        }

        if !wedding.archive() {
            return Ok(wedding);
        }

        let wedding = self.store.update_wedding(&wedding).await?;
        tracing::info!(wedding_id = %wedding.id, admin_id = %admin_id, "Wedding archived");
        Ok(wedding)
    }

    /// Price the current selection without charging anything
    pub async fn estimate(
        &self,
        wedding_id: Uuid,
        context: &OperationContext,
    ) -> Result<EstimateResult, AppError> {
        let wedding = self.get(wedding_id, context).await?;

        let cost = match wedding.selected_design_key.as_deref() {
            Some(design_key) if !design_key.is_empty() => self
                .prices
                .compute_cost(design_key, &wedding.selected_features),
            _ => CostBreakdown::zero(),
        };
        let credits_to_deduct = credits_to_deduct(&wedding, cost.total_cost);

        Ok(EstimateResult {
            wedding_id: wedding.id,
            cost,
            credits_to_deduct,
        })
    }

    async fn load(&self, wedding_id: Uuid) -> Result<Wedding, AppError> {
        self.store
            .find_wedding(wedding_id)
            .await?
            .ok_or(AppError::WeddingNotFound(wedding_id))
    }
}
