//! SeaORM entities for database tables
//!
//! Every table carries the same audit columns: `created_by`, `updated_by`,
//! `created_at`, `updated_at` and the soft-delete marker `deleted_at`.
//! Enumerations are stored as their wire strings.

/// Institutional plans table entity
pub mod plan {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "institutional_plans")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub code: String,
        pub name: String,
        pub institution: String,
        pub description: Option<String>,
        pub start_date: Date,
        pub end_date: Date,
        /// DRAFT, IN_REVIEW, APPROVED, CLOSED
        pub status: String,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::strategic_objective::Entity")]
        StrategicObjectives,
    }

    impl Related<super::strategic_objective::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::StrategicObjectives.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Strategic objectives table entity
pub mod strategic_objective {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "strategic_objectives")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub plan_id: i32,
        pub code: String,
        pub name: String,
        pub description: Option<String>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Foreign key to institutional_plans
        #[sea_orm(
            belongs_to = "super::plan::Entity",
            from = "Column::PlanId",
            to = "super::plan::Column::Id"
        )]
        Plan,
        #[sea_orm(has_many = "super::alignment::Entity")]
        Alignments,
    }

    impl Related<super::plan::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Plan.def()
        }
    }

    impl Related<super::alignment::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Alignments.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// National development plan objectives table entity
pub mod pnd_objective {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "pnd_objectives")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub code: String,
        pub name: String,
        pub axis: Option<String>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Sustainable development goals table entity
pub mod ods_goal {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "ods_goals")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub code: String,
        pub number: i32,
        pub name: String,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Objective alignments table entity
pub mod alignment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "objective_alignments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub strategic_objective_id: i32,
        pub pnd_objective_id: i32,
        pub ods_goal_id: i32,
        /// Percentage rounded to two decimals
        pub weight: f64,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Foreign key to strategic_objectives
        #[sea_orm(
            belongs_to = "super::strategic_objective::Entity",
            from = "Column::StrategicObjectiveId",
            to = "super::strategic_objective::Column::Id"
        )]
        StrategicObjective,
    }

    impl Related<super::strategic_objective::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::StrategicObjective.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Programs table entity
pub mod program {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "programs")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub strategic_objective_id: i32,
        pub code: String,
        pub name: String,
        pub description: Option<String>,
        pub responsible: Option<String>,
        pub budget: Option<f64>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Investment projects table entity
pub mod project {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "projects")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub program_id: i32,
        pub code: String,
        pub name: String,
        pub description: Option<String>,
        pub typology_id: Option<i32>,
        pub sector_id: Option<i32>,
        pub location: Option<String>,
        pub start_date: Date,
        pub end_date: Date,
        pub budget: f64,
        /// FORMULATION, APPROVED, IN_EXECUTION, SUSPENDED, FINISHED
        pub status: String,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Project activities table entity
pub mod activity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "activities")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub project_id: i32,
        pub name: String,
        pub description: Option<String>,
        pub responsible: Option<String>,
        pub start_date: Date,
        pub end_date: Date,
        pub budget: Option<f64>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Indicators table entity
pub mod indicator {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "indicators")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub strategic_objective_id: i32,
        pub code: String,
        pub name: String,
        pub unit: String,
        /// MONTHLY, QUARTERLY, SEMIANNUAL, ANNUAL
        pub frequency: String,
        pub baseline_value: Option<f64>,
        pub baseline_year: Option<i32>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Indicator goals table entity
pub mod goal {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "goals")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub indicator_id: i32,
        pub year: i32,
        pub target_value: f64,
        pub description: Option<String>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Project typologies table entity
pub mod typology {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "typologies")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub code: String,
        pub name: String,
        pub description: Option<String>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Sector taxonomy table entity
pub mod sector {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "sectors")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub code: String,
        pub name: String,
        /// MACROSECTOR, SECTOR, SUBSECTOR
        pub level: String,
        pub parent_id: Option<i32>,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Attachment metadata table entity
pub mod attachment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "attachments")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub project_id: i32,
        pub file_name: String,
        pub content_type: String,
        pub size_bytes: i64,
        /// Object store key
        pub storage_key: String,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Project observations table entity
pub mod observation {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "project_observations")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub project_id: i32,
        #[sea_orm(column_type = "Text")]
        pub body: String,
        /// OPEN, RESOLVED
        pub status: String,
        pub created_by: String,
        pub updated_by: Option<String>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
        pub deleted_at: Option<DateTimeUtc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
