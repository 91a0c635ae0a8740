//! SeaORM repository implementations

use super::entity::{self, alignment};
use super::table::{FilterOf, NewOf, RecordTable, UpdateOf};
use crate::contract::{AlignmentTarget, NewObjectiveAlignment, ObjectiveAlignment, Page, Paged};
use crate::domain::repository::{
    AlignmentReplacement, AlignmentRepository, RecordRepository, Repositories,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, Value,
};
use std::marker::PhantomData;
use std::sync::Arc;

// ===== Record Repository =====

/// Soft-delete aware repository over any [`RecordTable`]
pub struct SeaOrmRecordRepository<E> {
    db: Arc<DatabaseConnection>,
    _table: PhantomData<fn() -> E>,
}

impl<E> SeaOrmRecordRepository<E> {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            _table: PhantomData,
        }
    }
}

/// Stamp the audit columns of a row being inserted
fn stamp_created<E: RecordTable>(active: &mut E::ActiveModel, actor: &str, now: DateTime<Utc>)
where
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    active.set(E::created_by_column(), actor.to_string().into());
    active.set(E::updated_by_column(), Value::String(None));
    active.set(E::created_at_column(), now.into());
    active.set(E::updated_at_column(), now.into());
    active.set(E::deleted_at_column(), Option::<DateTime<Utc>>::None.into());
}

#[async_trait]
impl<E> RecordRepository<E::Record> for SeaOrmRecordRepository<E>
where
    E: RecordTable,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + Sync,
{
    async fn create(&self, input: &NewOf<E>, actor: &str) -> Result<E::Record> {
        let mut active = E::new_active(input);
        stamp_created::<E>(&mut active, actor, Utc::now());

        let model = active.insert(&*self.db).await?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<E::Record>> {
        let result = E::find()
            .filter(E::id_column().eq(id))
            .filter(E::deleted_at_column().is_null())
            .one(&*self.db)
            .await?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, filter: &FilterOf<E>, page: Page) -> Result<Paged<E::Record>> {
        let query = E::apply_filter(
            E::find().filter(E::deleted_at_column().is_null()),
            filter,
        );

        let total = query.clone().count(&*self.db).await?;
        let models = query
            .order_by_asc(E::id_column())
            .limit(page.limit)
            .offset(page.offset)
            .all(&*self.db)
            .await?;

        Ok(Paged {
            items: models.into_iter().map(Into::into).collect(),
            total,
            page,
        })
    }

    async fn update(&self, id: i32, input: &UpdateOf<E>, actor: &str) -> Result<Option<E::Record>> {
        let existing = E::find()
            .filter(E::id_column().eq(id))
            .filter(E::deleted_at_column().is_null())
            .one(&*self.db)
            .await?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        E::apply_update(&mut active, input);
        active.set(E::updated_at_column(), Utc::now().into());
        active.set(E::updated_by_column(), Some(actor.to_string()).into());

        let model = active.update(&*self.db).await?;
        Ok(Some(model.into()))
    }

    async fn soft_delete(&self, id: i32, actor: &str) -> Result<bool> {
        let now = Utc::now();
        let result = E::update_many()
            .col_expr(E::deleted_at_column(), Expr::value(now))
            .col_expr(E::updated_at_column(), Expr::value(now))
            .col_expr(E::updated_by_column(), Expr::value(actor.to_string()))
            .filter(E::id_column().eq(id))
            .filter(E::deleted_at_column().is_null())
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<i32>) -> Result<bool> {
        let Some(code_column) = E::code_column() else {
            return Ok(false);
        };

        let mut query = E::find()
            .filter(code_column.eq(code))
            .filter(E::deleted_at_column().is_null());
        if let Some(id) = exclude_id {
            query = query.filter(E::id_column().ne(id));
        }

        let count = query.count(&*self.db).await?;
        Ok(count > 0)
    }
}

// ===== Alignment Repository =====

pub struct SeaOrmAlignmentRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAlignmentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AlignmentRepository for SeaOrmAlignmentRepository {
    async fn replace_for_objective(
        &self,
        strategic_objective_id: i32,
        targets: &[AlignmentTarget],
        actor: &str,
    ) -> Result<AlignmentReplacement> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        // Serializes concurrent replacements of the same set (no-op on SQLite)
        entity::strategic_objective::Entity::find_by_id(strategic_objective_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        let superseded = alignment::Entity::update_many()
            .col_expr(alignment::Column::DeletedAt, Expr::value(now))
            .col_expr(alignment::Column::UpdatedAt, Expr::value(now))
            .col_expr(alignment::Column::UpdatedBy, Expr::value(actor.to_string()))
            .filter(alignment::Column::StrategicObjectiveId.eq(strategic_objective_id))
            .filter(alignment::Column::DeletedAt.is_null())
            .exec(&txn)
            .await?
            .rows_affected;

        let mut created = Vec::with_capacity(targets.len());
        for target in targets {
            let input = NewObjectiveAlignment {
                strategic_objective_id,
                pnd_objective_id: target.pnd_objective_id,
                ods_goal_id: target.ods_goal_id,
                weight: target.weight,
            };
            let mut active = alignment::Entity::new_active(&input);
            stamp_created::<alignment::Entity>(&mut active, actor, now);

            let model = active.insert(&txn).await?;
            created.push(ObjectiveAlignment::from(model));
        }

        // Dropping the transaction without commit rolls everything back
        txn.commit().await?;

        Ok(AlignmentReplacement {
            superseded,
            created,
        })
    }
}

/// SeaORM-backed repositories for every record type
pub fn sea_orm_repositories(db: Arc<DatabaseConnection>) -> Repositories {
    Repositories {
        plans: Arc::new(SeaOrmRecordRepository::<entity::plan::Entity>::new(db.clone())),
        objectives: Arc::new(SeaOrmRecordRepository::<entity::strategic_objective::Entity>::new(
            db.clone(),
        )),
        pnd_objectives: Arc::new(SeaOrmRecordRepository::<entity::pnd_objective::Entity>::new(
            db.clone(),
        )),
        ods_goals: Arc::new(SeaOrmRecordRepository::<entity::ods_goal::Entity>::new(db.clone())),
        alignments: Arc::new(SeaOrmRecordRepository::<alignment::Entity>::new(db.clone())),
        alignment_sets: Arc::new(SeaOrmAlignmentRepository::new(db.clone())),
        programs: Arc::new(SeaOrmRecordRepository::<entity::program::Entity>::new(db.clone())),
        projects: Arc::new(SeaOrmRecordRepository::<entity::project::Entity>::new(db.clone())),
        activities: Arc::new(SeaOrmRecordRepository::<entity::activity::Entity>::new(db.clone())),
        indicators: Arc::new(SeaOrmRecordRepository::<entity::indicator::Entity>::new(
            db.clone(),
        )),
        goals: Arc::new(SeaOrmRecordRepository::<entity::goal::Entity>::new(db.clone())),
        typologies: Arc::new(SeaOrmRecordRepository::<entity::typology::Entity>::new(db.clone())),
        sectors: Arc::new(SeaOrmRecordRepository::<entity::sector::Entity>::new(db.clone())),
        attachments: Arc::new(SeaOrmRecordRepository::<entity::attachment::Entity>::new(
            db.clone(),
        )),
        observations: Arc::new(SeaOrmRecordRepository::<entity::observation::Entity>::new(db)),
    }
}
