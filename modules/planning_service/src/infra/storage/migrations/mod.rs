//! Database migrations for the planning service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_catalogs::Migration),
            Box::new(m20250301_000002_create_planning::Migration),
            Box::new(m20250301_000003_create_investment::Migration),
        ]
    }
}

// ===== Shared column helpers =====

/// Audit columns present on every table
#[derive(DeriveIden)]
enum Audit {
    CreatedBy,
    UpdatedBy,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn with_audit(table: &mut TableCreateStatement) -> TableCreateStatement {
    table
        .col(ColumnDef::new(Audit::CreatedBy).string().not_null())
        .col(ColumnDef::new(Audit::UpdatedBy).string())
        .col(
            ColumnDef::new(Audit::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(Audit::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(ColumnDef::new(Audit::DeletedAt).timestamp_with_time_zone())
        .to_owned()
}

fn fk<T, C, R, RC>(
    name: &str,
    table: T,
    column: C,
    ref_table: R,
    ref_column: RC,
) -> ForeignKeyCreateStatement
where
    T: IntoTableRef,
    C: IntoIden,
    R: IntoTableRef,
    RC: IntoIden,
{
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(ref_table, ref_column)
        .on_delete(ForeignKeyAction::Restrict)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

async fn create_index<T, C>(
    manager: &SchemaManager<'_>,
    name: &str,
    table: T,
    column: C,
) -> Result<(), DbErr>
where
    T: IntoTableRef,
    C: IntoIden,
{
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(table)
                .col(column)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

async fn drop_table<T: IntoTableRef>(manager: &SchemaManager<'_>, table: T) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(table).if_exists().to_owned())
        .await
}

// ===== Table identifiers =====

#[derive(DeriveIden)]
enum PndObjectives {
    Table,
    Id,
    Code,
    Name,
    Axis,
}

#[derive(DeriveIden)]
enum OdsGoals {
    Table,
    Id,
    Code,
    Number,
    Name,
}

#[derive(DeriveIden)]
enum Typologies {
    Table,
    Id,
    Code,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Sectors {
    Table,
    Id,
    Code,
    Name,
    Level,
    ParentId,
}

#[derive(DeriveIden)]
enum InstitutionalPlans {
    Table,
    Id,
    Code,
    Name,
    Institution,
    Description,
    StartDate,
    EndDate,
    Status,
}

#[derive(DeriveIden)]
enum StrategicObjectives {
    Table,
    Id,
    PlanId,
    Code,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum ObjectiveAlignments {
    Table,
    Id,
    StrategicObjectiveId,
    PndObjectiveId,
    OdsGoalId,
    Weight,
}

#[derive(DeriveIden)]
enum Indicators {
    Table,
    Id,
    StrategicObjectiveId,
    Code,
    Name,
    Unit,
    Frequency,
    BaselineValue,
    BaselineYear,
}

#[derive(DeriveIden)]
enum Goals {
    Table,
    Id,
    IndicatorId,
    Year,
    TargetValue,
    Description,
}

#[derive(DeriveIden)]
enum Programs {
    Table,
    Id,
    StrategicObjectiveId,
    Code,
    Name,
    Description,
    Responsible,
    Budget,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    ProgramId,
    Code,
    Name,
    Description,
    TypologyId,
    SectorId,
    Location,
    StartDate,
    EndDate,
    Budget,
    Status,
}

#[derive(DeriveIden)]
enum Activities {
    Table,
    Id,
    ProjectId,
    Name,
    Description,
    Responsible,
    StartDate,
    EndDate,
    Budget,
}

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    ProjectId,
    FileName,
    ContentType,
    SizeBytes,
    StorageKey,
}

#[derive(DeriveIden)]
enum ProjectObservations {
    Table,
    Id,
    ProjectId,
    Body,
    Status,
}

/// Reference catalogs: PND objectives, ODS goals, typologies and sectors
mod m20250301_000001_create_catalogs {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_catalogs"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(with_audit(
                    Table::create()
                        .table(PndObjectives::Table)
                        .if_not_exists()
                        .col(id_col(PndObjectives::Id))
                        .col(ColumnDef::new(PndObjectives::Code).string_len(30).not_null())
                        .col(ColumnDef::new(PndObjectives::Name).text().not_null())
                        .col(ColumnDef::new(PndObjectives::Axis).string_len(200)),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(OdsGoals::Table)
                        .if_not_exists()
                        .col(id_col(OdsGoals::Id))
                        .col(ColumnDef::new(OdsGoals::Code).string_len(30).not_null())
                        .col(ColumnDef::new(OdsGoals::Number).integer().not_null())
                        .col(ColumnDef::new(OdsGoals::Name).text().not_null()),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Typologies::Table)
                        .if_not_exists()
                        .col(id_col(Typologies::Id))
                        .col(ColumnDef::new(Typologies::Code).string_len(30).not_null())
                        .col(ColumnDef::new(Typologies::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Typologies::Description).text()),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Sectors::Table)
                        .if_not_exists()
                        .col(id_col(Sectors::Id))
                        .col(ColumnDef::new(Sectors::Code).string_len(30).not_null())
                        .col(ColumnDef::new(Sectors::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Sectors::Level).string_len(20).not_null())
                        .col(ColumnDef::new(Sectors::ParentId).integer())
                        .foreign_key(&mut fk(
                            "fk_sectors_parent",
                            Sectors::Table,
                            Sectors::ParentId,
                            Sectors::Table,
                            Sectors::Id,
                        )),
                ))
                .await?;

            create_index(
                manager,
                "idx_pnd_objectives_code",
                PndObjectives::Table,
                PndObjectives::Code,
            )
            .await?;
            create_index(manager, "idx_ods_goals_code", OdsGoals::Table, OdsGoals::Code).await?;
            create_index(
                manager,
                "idx_typologies_code",
                Typologies::Table,
                Typologies::Code,
            )
            .await?;
            create_index(manager, "idx_sectors_code", Sectors::Table, Sectors::Code).await?;
            create_index(
                manager,
                "idx_sectors_parent_id",
                Sectors::Table,
                Sectors::ParentId,
            )
            .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_table(manager, Sectors::Table).await?;
            drop_table(manager, Typologies::Table).await?;
            drop_table(manager, OdsGoals::Table).await?;
            drop_table(manager, PndObjectives::Table).await
        }
    }
}

/// Plans, strategic objectives, alignments, indicators and goals
mod m20250301_000002_create_planning {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_planning"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(with_audit(
                    Table::create()
                        .table(InstitutionalPlans::Table)
                        .if_not_exists()
                        .col(id_col(InstitutionalPlans::Id))
                        .col(ColumnDef::new(InstitutionalPlans::Code).string_len(30).not_null())
                        .col(ColumnDef::new(InstitutionalPlans::Name).string_len(200).not_null())
                        .col(
                            ColumnDef::new(InstitutionalPlans::Institution)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(InstitutionalPlans::Description).text())
                        .col(ColumnDef::new(InstitutionalPlans::StartDate).date().not_null())
                        .col(ColumnDef::new(InstitutionalPlans::EndDate).date().not_null())
                        .col(ColumnDef::new(InstitutionalPlans::Status).string_len(20).not_null()),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(StrategicObjectives::Table)
                        .if_not_exists()
                        .col(id_col(StrategicObjectives::Id))
                        .col(ColumnDef::new(StrategicObjectives::PlanId).integer().not_null())
                        .col(ColumnDef::new(StrategicObjectives::Code).string_len(30).not_null())
                        .col(ColumnDef::new(StrategicObjectives::Name).string_len(200).not_null())
                        .col(ColumnDef::new(StrategicObjectives::Description).text())
                        .foreign_key(&mut fk(
                            "fk_strategic_objectives_plan",
                            StrategicObjectives::Table,
                            StrategicObjectives::PlanId,
                            InstitutionalPlans::Table,
                            InstitutionalPlans::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(ObjectiveAlignments::Table)
                        .if_not_exists()
                        .col(id_col(ObjectiveAlignments::Id))
                        .col(
                            ColumnDef::new(ObjectiveAlignments::StrategicObjectiveId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ObjectiveAlignments::PndObjectiveId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ObjectiveAlignments::OdsGoalId).integer().not_null())
                        .col(ColumnDef::new(ObjectiveAlignments::Weight).double().not_null())
                        .foreign_key(&mut fk(
                            "fk_alignments_strategic_objective",
                            ObjectiveAlignments::Table,
                            ObjectiveAlignments::StrategicObjectiveId,
                            StrategicObjectives::Table,
                            StrategicObjectives::Id,
                        ))
                        .foreign_key(&mut fk(
                            "fk_alignments_pnd_objective",
                            ObjectiveAlignments::Table,
                            ObjectiveAlignments::PndObjectiveId,
                            PndObjectives::Table,
                            PndObjectives::Id,
                        ))
                        .foreign_key(&mut fk(
                            "fk_alignments_ods_goal",
                            ObjectiveAlignments::Table,
                            ObjectiveAlignments::OdsGoalId,
                            OdsGoals::Table,
                            OdsGoals::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Indicators::Table)
                        .if_not_exists()
                        .col(id_col(Indicators::Id))
                        .col(
                            ColumnDef::new(Indicators::StrategicObjectiveId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Indicators::Code).string_len(30).not_null())
                        .col(ColumnDef::new(Indicators::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Indicators::Unit).string_len(50).not_null())
                        .col(ColumnDef::new(Indicators::Frequency).string_len(20).not_null())
                        .col(ColumnDef::new(Indicators::BaselineValue).double())
                        .col(ColumnDef::new(Indicators::BaselineYear).integer())
                        .foreign_key(&mut fk(
                            "fk_indicators_strategic_objective",
                            Indicators::Table,
                            Indicators::StrategicObjectiveId,
                            StrategicObjectives::Table,
                            StrategicObjectives::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Goals::Table)
                        .if_not_exists()
                        .col(id_col(Goals::Id))
                        .col(ColumnDef::new(Goals::IndicatorId).integer().not_null())
                        .col(ColumnDef::new(Goals::Year).integer().not_null())
                        .col(ColumnDef::new(Goals::TargetValue).double().not_null())
                        .col(ColumnDef::new(Goals::Description).text())
                        .foreign_key(&mut fk(
                            "fk_goals_indicator",
                            Goals::Table,
                            Goals::IndicatorId,
                            Indicators::Table,
                            Indicators::Id,
                        )),
                ))
                .await?;

            create_index(
                manager,
                "idx_institutional_plans_code",
                InstitutionalPlans::Table,
                InstitutionalPlans::Code,
            )
            .await?;
            create_index(
                manager,
                "idx_strategic_objectives_plan_id",
                StrategicObjectives::Table,
                StrategicObjectives::PlanId,
            )
            .await?;
            create_index(
                manager,
                "idx_alignments_strategic_objective_id",
                ObjectiveAlignments::Table,
                ObjectiveAlignments::StrategicObjectiveId,
            )
            .await?;
            create_index(
                manager,
                "idx_indicators_strategic_objective_id",
                Indicators::Table,
                Indicators::StrategicObjectiveId,
            )
            .await?;
            create_index(
                manager,
                "idx_goals_indicator_id",
                Goals::Table,
                Goals::IndicatorId,
            )
            .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_table(manager, Goals::Table).await?;
            drop_table(manager, Indicators::Table).await?;
            drop_table(manager, ObjectiveAlignments::Table).await?;
            drop_table(manager, StrategicObjectives::Table).await?;
            drop_table(manager, InstitutionalPlans::Table).await
        }
    }
}

/// Programs, projects, activities, attachments and observations
mod m20250301_000003_create_investment {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_investment"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Programs::Table)
                        .if_not_exists()
                        .col(id_col(Programs::Id))
                        .col(
                            ColumnDef::new(Programs::StrategicObjectiveId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Programs::Code).string_len(30).not_null())
                        .col(ColumnDef::new(Programs::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Programs::Description).text())
                        .col(ColumnDef::new(Programs::Responsible).string_len(200))
                        .col(ColumnDef::new(Programs::Budget).double())
                        .foreign_key(&mut fk(
                            "fk_programs_strategic_objective",
                            Programs::Table,
                            Programs::StrategicObjectiveId,
                            StrategicObjectives::Table,
                            StrategicObjectives::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(id_col(Projects::Id))
                        .col(ColumnDef::new(Projects::ProgramId).integer().not_null())
                        .col(ColumnDef::new(Projects::Code).string_len(30).not_null())
                        .col(ColumnDef::new(Projects::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Projects::Description).text())
                        .col(ColumnDef::new(Projects::TypologyId).integer())
                        .col(ColumnDef::new(Projects::SectorId).integer())
                        .col(ColumnDef::new(Projects::Location).string_len(200))
                        .col(ColumnDef::new(Projects::StartDate).date().not_null())
                        .col(ColumnDef::new(Projects::EndDate).date().not_null())
                        .col(ColumnDef::new(Projects::Budget).double().not_null())
                        .col(ColumnDef::new(Projects::Status).string_len(20).not_null())
                        .foreign_key(&mut fk(
                            "fk_projects_program",
                            Projects::Table,
                            Projects::ProgramId,
                            Programs::Table,
                            Programs::Id,
                        ))
                        .foreign_key(&mut fk(
                            "fk_projects_typology",
                            Projects::Table,
                            Projects::TypologyId,
                            Typologies::Table,
                            Typologies::Id,
                        ))
                        .foreign_key(&mut fk(
                            "fk_projects_sector",
                            Projects::Table,
                            Projects::SectorId,
                            Sectors::Table,
                            Sectors::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Activities::Table)
                        .if_not_exists()
                        .col(id_col(Activities::Id))
                        .col(ColumnDef::new(Activities::ProjectId).integer().not_null())
                        .col(ColumnDef::new(Activities::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Activities::Description).text())
                        .col(ColumnDef::new(Activities::Responsible).string_len(200))
                        .col(ColumnDef::new(Activities::StartDate).date().not_null())
                        .col(ColumnDef::new(Activities::EndDate).date().not_null())
                        .col(ColumnDef::new(Activities::Budget).double())
                        .foreign_key(&mut fk(
                            "fk_activities_project",
                            Activities::Table,
                            Activities::ProjectId,
                            Projects::Table,
                            Projects::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(Attachments::Table)
                        .if_not_exists()
                        .col(id_col(Attachments::Id))
                        .col(ColumnDef::new(Attachments::ProjectId).integer().not_null())
                        .col(ColumnDef::new(Attachments::FileName).string_len(255).not_null())
                        .col(ColumnDef::new(Attachments::ContentType).string_len(200).not_null())
                        .col(ColumnDef::new(Attachments::SizeBytes).big_integer().not_null())
                        .col(ColumnDef::new(Attachments::StorageKey).string_len(512).not_null())
                        .foreign_key(&mut fk(
                            "fk_attachments_project",
                            Attachments::Table,
                            Attachments::ProjectId,
                            Projects::Table,
                            Projects::Id,
                        )),
                ))
                .await?;

            manager
                .create_table(with_audit(
                    Table::create()
                        .table(ProjectObservations::Table)
                        .if_not_exists()
                        .col(id_col(ProjectObservations::Id))
                        .col(ColumnDef::new(ProjectObservations::ProjectId).integer().not_null())
                        .col(ColumnDef::new(ProjectObservations::Body).text().not_null())
                        .col(ColumnDef::new(ProjectObservations::Status).string_len(20).not_null())
                        .foreign_key(&mut fk(
                            "fk_observations_project",
                            ProjectObservations::Table,
                            ProjectObservations::ProjectId,
                            Projects::Table,
                            Projects::Id,
                        )),
                ))
                .await?;

            create_index(
                manager,
                "idx_programs_strategic_objective_id",
                Programs::Table,
                Programs::StrategicObjectiveId,
            )
            .await?;
            create_index(
                manager,
                "idx_projects_program_id",
                Projects::Table,
                Projects::ProgramId,
            )
            .await?;
            create_index(manager, "idx_projects_code", Projects::Table, Projects::Code).await?;
            create_index(
                manager,
                "idx_activities_project_id",
                Activities::Table,
                Activities::ProjectId,
            )
            .await?;
            create_index(
                manager,
                "idx_attachments_project_id",
                Attachments::Table,
                Attachments::ProjectId,
            )
            .await?;
            create_index(
                manager,
                "idx_observations_project_id",
                ProjectObservations::Table,
                ProjectObservations::ProjectId,
            )
            .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_table(manager, ProjectObservations::Table).await?;
            drop_table(manager, Attachments::Table).await?;
            drop_table(manager, Activities::Table).await?;
            drop_table(manager, Projects::Table).await?;
            drop_table(manager, Programs::Table).await
        }
    }
}
