//! Domain service - business logic orchestration

use super::alignment::{is_complete, total_weight, validate_alignment_set};
use super::events::{EventPublisher, PlanningEvent};
use super::object_store::{attachment_key, file_extension, ObjectStore};
use super::record::{Record, RecordOps};
use super::repository::Repositories;
use super::validation::{FieldErrors, Validate, FILE_NAME_MAX};
use crate::config::Config;
use crate::contract::*;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Domain service for planning and investment records
pub struct Service {
    repos: Repositories,
    event_publisher: Arc<dyn EventPublisher>,
    object_store: Arc<dyn ObjectStore>,
    config: Config,
}

impl Service {
    /// Create a new service instance
    pub fn new(
        repos: Repositories,
        event_publisher: Arc<dyn EventPublisher>,
        object_store: Arc<dyn ObjectStore>,
        config: Config,
    ) -> Self {
        Self {
            repos,
            event_publisher,
            object_store,
            config,
        }
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== Record Operations =====

    /// Create a record after validation, reference and uniqueness checks
    pub async fn create<R: RecordOps>(
        &self,
        ctx: &AuthContext,
        input: R::New,
    ) -> Result<R, PlanningError> {
        ctx.require_any(R::WRITE_ROLES)?;
        input.validate()?;
        R::check_new(self, &input).await?;
        if let Some(code) = R::new_code(&input) {
            self.ensure_code_available::<R>(code, None).await?;
        }

        let record = R::repository(&self.repos)
            .create(&input, &ctx.subject)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "create", e))?;

        info!(
            resource = R::RESOURCE,
            id = record.id(),
            actor = %ctx.subject,
            "record created"
        );
        self.publish(PlanningEvent::created(R::RESOURCE, record.id(), &ctx.subject))
            .await;
        Ok(record)
    }

    /// Get a live record
    pub async fn get<R: RecordOps>(&self, ctx: &AuthContext, id: i32) -> Result<R, PlanningError> {
        debug!(resource = R::RESOURCE, id, actor = %ctx.subject, "get record");
        self.find::<R>(id).await
    }

    /// List live records matching `filter`
    pub async fn list<R: RecordOps>(
        &self,
        ctx: &AuthContext,
        filter: R::Filter,
        page: Page,
    ) -> Result<Paged<R>, PlanningError> {
        debug!(resource = R::RESOURCE, actor = %ctx.subject, limit = page.limit, offset = page.offset, "list records");
        R::repository(&self.repos)
            .list(&filter, page)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "list", e))
    }

    /// Apply a partial update to a live record
    pub async fn update<R: RecordOps>(
        &self,
        ctx: &AuthContext,
        id: i32,
        input: R::Update,
    ) -> Result<R, PlanningError> {
        ctx.require_any(R::WRITE_ROLES)?;
        input.validate()?;
        let current = self.find::<R>(id).await?;
        R::check_update(self, &current, &input).await?;
        if let Some(code) = R::update_code(&input) {
            self.ensure_code_available::<R>(code, Some(id)).await?;
        }

        let record = R::repository(&self.repos)
            .update(id, &input, &ctx.subject)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "update", e))?
            .ok_or_else(|| PlanningError::not_found(R::RESOURCE, id))?;

        info!(resource = R::RESOURCE, id, actor = %ctx.subject, "record updated");
        self.publish(PlanningEvent::updated(R::RESOURCE, id, &ctx.subject))
            .await;
        Ok(record)
    }

    /// Soft delete a live record
    ///
    /// Deleting a record that is already soft-deleted reports NotFound, the
    /// same as a record that never existed, and leaves the row untouched.
    pub async fn delete<R: RecordOps>(
        &self,
        ctx: &AuthContext,
        id: i32,
    ) -> Result<(), PlanningError> {
        ctx.require_any(R::WRITE_ROLES)?;

        let deleted = R::repository(&self.repos)
            .soft_delete(id, &ctx.subject)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "delete", e))?;
        if !deleted {
            return Err(PlanningError::not_found(R::RESOURCE, id));
        }

        info!(resource = R::RESOURCE, id, actor = %ctx.subject, "record soft-deleted");
        self.publish(PlanningEvent::deleted(R::RESOURCE, id, &ctx.subject)).await;
        Ok(())
    }

    // ===== Alignment Operations =====

    /// Current alignment generation of a strategic objective with its total
    pub async fn alignment_summary(
        &self,
        ctx: &AuthContext,
        strategic_objective_id: i32,
    ) -> Result<AlignmentSummary, PlanningError> {
        debug!(strategic_objective_id, actor = %ctx.subject, "alignment summary");
        self.find::<StrategicObjective>(strategic_objective_id).await?;
        let alignments = self.alignments_of(strategic_objective_id).await?;
        Ok(summarize(strategic_objective_id, alignments))
    }

    /// Replace the alignment set of a strategic objective
    ///
    /// The whole set is validated before anything is written; on success
    /// the previous generation is soft-deleted and the new one inserted in
    /// one transaction.
    pub async fn replace_alignments(
        &self,
        ctx: &AuthContext,
        strategic_objective_id: i32,
        targets: Vec<AlignmentTarget>,
    ) -> Result<AlignmentSummary, PlanningError> {
        ctx.require_any(<ObjectiveAlignment as RecordOps>::WRITE_ROLES)?;
        self.find::<StrategicObjective>(strategic_objective_id).await?;

        let targets = validate_alignment_set(&targets)?;
        self.ensure_alignment_targets(&targets).await?;

        let replacement = self
            .repos
            .alignment_sets
            .replace_for_objective(strategic_objective_id, &targets, &ctx.subject)
            .await
            .map_err(|e| {
                repository_failure(<ObjectiveAlignment as Record>::RESOURCE, "replace", e)
            })?;

        info!(
            strategic_objective_id,
            superseded = replacement.superseded,
            created = replacement.created.len(),
            actor = %ctx.subject,
            "alignments replaced"
        );
        self.publish(PlanningEvent::alignments_replaced(
            strategic_objective_id,
            replacement.superseded,
            replacement.created.iter().map(|a| a.id).collect(),
            &ctx.subject,
        ))
        .await;

        Ok(summarize(strategic_objective_id, replacement.created))
    }

    /// Live alignments of a strategic objective
    pub async fn alignments_of(
        &self,
        strategic_objective_id: i32,
    ) -> Result<Vec<ObjectiveAlignment>, PlanningError> {
        let filter = ObjectiveAlignmentFilter {
            strategic_objective_id: Some(strategic_objective_id),
            ..Default::default()
        };
        self.repos
            .alignments
            .list(&filter, Page::all())
            .await
            .map(|paged| paged.items)
            .map_err(|e| repository_failure(<ObjectiveAlignment as Record>::RESOURCE, "list", e))
    }

    // ===== Attachment Operations =====

    /// Store attachment content and register it against a project
    ///
    /// The record is created only after the object is stored. If the record
    /// cannot be created the stored object is removed again; a failure to
    /// remove it is logged and otherwise ignored.
    pub async fn upload_attachment(
        &self,
        ctx: &AuthContext,
        project_id: i32,
        file_name: &str,
        content_type: Option<&str>,
        content: Bytes,
    ) -> Result<Attachment, PlanningError> {
        ctx.require_any(<Attachment as RecordOps>::WRITE_ROLES)?;
        self.find::<Project>(project_id).await?;

        let file_name = file_name.trim();
        let extension = self.check_upload(file_name, content.len())?;
        let content_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let storage_key = attachment_key(project_id, &extension, chrono::Utc::now());
        let size_bytes = content.len() as i64;

        self.object_store
            .put(&storage_key, content, content_type)
            .await
            .map_err(|e| {
                error!(storage_key = %storage_key, error = ?e, "failed to store attachment object");
                PlanningError::Internal
            })?;

        let input = NewAttachment {
            project_id,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size_bytes,
            storage_key: storage_key.clone(),
        };

        let attachment = match self.repos.attachments.create(&input, &ctx.subject).await {
            Ok(attachment) => attachment,
            Err(e) => {
                error!(storage_key = %storage_key, error = ?e, "failed to register attachment, removing stored object");
                if let Err(cleanup) = self.object_store.delete(&storage_key).await {
                    warn!(
                        storage_key = %storage_key,
                        error = ?cleanup,
                        "failed to remove orphaned attachment object"
                    );
                }
                return Err(PlanningError::Internal);
            }
        };

        info!(
            attachment_id = attachment.id,
            project_id,
            size_bytes,
            actor = %ctx.subject,
            "attachment uploaded"
        );
        self.publish(PlanningEvent::attachment_uploaded(&attachment, &ctx.subject))
            .await;
        Ok(attachment)
    }

    /// Read the stored content of a live attachment
    pub async fn attachment_content(
        &self,
        ctx: &AuthContext,
        id: i32,
    ) -> Result<AttachmentContent, PlanningError> {
        let attachment = self.get::<Attachment>(ctx, id).await?;
        let content = self
            .object_store
            .get(&attachment.storage_key)
            .await
            .map_err(|e| {
                error!(storage_key = %attachment.storage_key, error = ?e, "failed to read attachment object");
                PlanningError::Internal
            })?;
        Ok(AttachmentContent {
            attachment,
            content,
        })
    }

    // ===== Helper Methods =====

    /// Live record by identifier, NotFound otherwise
    pub async fn find<R: RecordOps>(&self, id: i32) -> Result<R, PlanningError> {
        R::repository(&self.repos)
            .find_by_id(id)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "find", e))?
            .ok_or_else(|| PlanningError::not_found(R::RESOURCE, id))
    }

    /// Live record referenced by input `field`; a missing reference is a
    /// validation error on that field
    pub async fn reference<R: RecordOps>(&self, field: &str, id: i32) -> Result<R, PlanningError> {
        R::repository(&self.repos)
            .find_by_id(id)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "find", e))?
            .ok_or_else(|| {
                PlanningError::invalid(field, format!("{} {} does not exist", R::RESOURCE, id))
            })
    }

    async fn ensure_code_available<R: RecordOps>(
        &self,
        code: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), PlanningError> {
        let taken = R::repository(&self.repos)
            .code_exists(code.trim(), exclude_id)
            .await
            .map_err(|e| repository_failure(R::RESOURCE, "code_exists", e))?;
        if taken {
            return Err(PlanningError::conflict(format!(
                "{} with code '{}' already exists",
                R::RESOURCE,
                code.trim()
            )));
        }
        Ok(())
    }

    /// Every PND objective and ODS goal named by `targets` must exist
    async fn ensure_alignment_targets(
        &self,
        targets: &[AlignmentTarget],
    ) -> Result<(), PlanningError> {
        let mut errors = FieldErrors::new();
        let mut checked_pnd = HashSet::new();
        let mut checked_ods = HashSet::new();

        for (i, target) in targets.iter().enumerate() {
            if checked_pnd.insert(target.pnd_objective_id) {
                let found = self
                    .reference::<PndObjective>(
                        &format!("alignments[{i}].pnd_objective_id"),
                        target.pnd_objective_id,
                    )
                    .await
                    .map(|_| ());
                collect_invalid(&mut errors, found)?;
            }
            if checked_ods.insert(target.ods_goal_id) {
                let found = self
                    .reference::<OdsGoal>(
                        &format!("alignments[{i}].ods_goal_id"),
                        target.ods_goal_id,
                    )
                    .await
                    .map(|_| ());
                collect_invalid(&mut errors, found)?;
            }
        }
        errors.finish()
    }

    /// File name, extension and size rules for uploads; returns the extension
    fn check_upload(&self, file_name: &str, size: usize) -> Result<String, PlanningError> {
        let mut errors = FieldErrors::new();
        errors.text("file_name", file_name, FILE_NAME_MAX);

        let extension = file_extension(file_name);
        match extension.as_deref() {
            Some(ext) if self.config.is_extension_allowed(ext) => {}
            Some(ext) => {
                errors.push(
                    "file_name",
                    format!(
                        "extension '{ext}' is not allowed (allowed: {})",
                        self.config.allowed_extensions.join(", ")
                    ),
                );
            }
            None => {
                errors.push("file_name", "must have a file extension");
            }
        }

        if size == 0 {
            errors.push("content", "must not be empty");
        } else if size > self.config.max_attachment_size {
            errors.push(
                "content",
                format!(
                    "must be at most {} bytes",
                    self.config.max_attachment_size
                ),
            );
        }

        errors.finish()?;
        Ok(extension.unwrap_or_default())
    }

    async fn publish(&self, event: PlanningEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.event_publisher.publish(event).await {
            // Log error but don't fail the operation
            warn!(event_type, error = %e, "failed to publish planning event");
        }
    }
}

fn summarize(strategic_objective_id: i32, alignments: Vec<ObjectiveAlignment>) -> AlignmentSummary {
    let total = total_weight(alignments.iter().map(|a| a.weight));
    AlignmentSummary {
        strategic_objective_id,
        is_complete: is_complete(total),
        total_weight: total,
        alignments,
    }
}

/// Move validation errors into `errors`; anything else is returned as is
fn collect_invalid(
    errors: &mut FieldErrors,
    result: Result<(), PlanningError>,
) -> Result<(), PlanningError> {
    match result {
        Ok(()) => Ok(()),
        Err(PlanningError::Validation { errors: found }) => {
            for e in found {
                errors.push(e.field, e.message);
            }
            Ok(())
        }
        Err(other) => Err(other),
    }
}

fn repository_failure(resource: &str, action: &str, error: anyhow::Error) -> PlanningError {
    error!(resource, action, error = ?error, "repository operation failed");
    PlanningError::Internal
}
