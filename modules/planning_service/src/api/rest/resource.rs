//! Binding between contract records and their REST representations

use super::dto::*;
use super::mapper::IntoDomain;
use crate::contract::*;
use crate::domain::{Record, RecordOps};
use serde::{de::DeserializeOwned, Serialize};

/// A record served by the generic list/get/update/delete handlers
pub trait RestResource: RecordOps {
    type Dto: Serialize + From<Self> + Send;
    type UpdateRequest: DeserializeOwned + IntoDomain<<Self as Record>::Update> + Send;
    type QueryParams: DeserializeOwned + IntoDomain<<Self as Record>::Filter> + Send;
}

/// A record that can also be created from a JSON body
pub trait RestCreate: RestResource {
    type CreateRequest: DeserializeOwned + IntoDomain<<Self as Record>::New> + Send;
}

macro_rules! rest_resource {
    ($record:ty, $dto:ty, $update:ty, $query:ty) => {
        impl RestResource for $record {
            type Dto = $dto;
            type UpdateRequest = $update;
            type QueryParams = $query;
        }
    };
    ($record:ty, $dto:ty, $create:ty, $update:ty, $query:ty) => {
        rest_resource!($record, $dto, $update, $query);

        impl RestCreate for $record {
            type CreateRequest = $create;
        }
    };
}

rest_resource!(InstitutionalPlan, PlanDto, CreatePlanRequest, UpdatePlanRequest, PlanQuery);
rest_resource!(
    StrategicObjective,
    StrategicObjectiveDto,
    CreateStrategicObjectiveRequest,
    UpdateStrategicObjectiveRequest,
    StrategicObjectiveQuery
);
rest_resource!(
    PndObjective,
    PndObjectiveDto,
    CreatePndObjectiveRequest,
    UpdatePndObjectiveRequest,
    PndObjectiveQuery
);
rest_resource!(OdsGoal, OdsGoalDto, CreateOdsGoalRequest, UpdateOdsGoalRequest, OdsGoalQuery);
rest_resource!(
    ObjectiveAlignment,
    AlignmentDto,
    CreateAlignmentRequest,
    UpdateAlignmentRequest,
    AlignmentQuery
);
rest_resource!(Program, ProgramDto, CreateProgramRequest, UpdateProgramRequest, ProgramQuery);
rest_resource!(Project, ProjectDto, CreateProjectRequest, UpdateProjectRequest, ProjectQuery);
rest_resource!(Activity, ActivityDto, CreateActivityRequest, UpdateActivityRequest, ActivityQuery);
rest_resource!(
    Indicator,
    IndicatorDto,
    CreateIndicatorRequest,
    UpdateIndicatorRequest,
    IndicatorQuery
);
rest_resource!(Goal, GoalDto, CreateGoalRequest, UpdateGoalRequest, GoalQuery);
rest_resource!(
    Typology,
    TypologyDto,
    CreateTypologyRequest,
    UpdateTypologyRequest,
    TypologyQuery
);
rest_resource!(Sector, SectorDto, CreateSectorRequest, UpdateSectorRequest, SectorQuery);
rest_resource!(
    ProjectObservation,
    ObservationDto,
    CreateObservationRequest,
    UpdateObservationRequest,
    ObservationQuery
);

// Attachments are created by upload only
rest_resource!(Attachment, AttachmentDto, UpdateAttachmentRequest, AttachmentQuery);
