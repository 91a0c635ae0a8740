//! Alignment weight rules through the service and the SQLite repositories

mod common;

use common::*;
use planning_service::contract::*;
use planning_service::domain::PlanningEvent;

struct Catalog {
    objective: StrategicObjective,
    pnd: Vec<PndObjective>,
    ods: Vec<OdsGoal>,
}

async fn catalog(env: &TestEnv) -> Catalog {
    let plan = seed_plan(&env.service, "PEI-ALN").await;
    let objective = seed_objective(&env.service, plan.id, "OE-ALN").await;
    let mut pnd = Vec::new();
    let mut ods = Vec::new();
    for i in 1..=3 {
        pnd.push(seed_pnd(&env.service, &format!("PND-{i}")).await);
        ods.push(seed_ods(&env.service, i).await);
    }
    Catalog {
        objective,
        pnd,
        ods,
    }
}

#[tokio::test]
async fn replace_accepts_complete_set_and_supersedes_previous() {
    let env = setup().await;
    let c = catalog(&env).await;
    let so = c.objective.id;

    let first = env
        .service
        .replace_alignments(
            &planner(),
            so,
            vec![target(c.pnd[0].id, c.ods[0].id, 100.0)],
        )
        .await
        .unwrap();
    assert_eq!(first.alignments.len(), 1);
    assert!(first.is_complete);

    let second = env
        .service
        .replace_alignments(
            &planner(),
            so,
            vec![
                target(c.pnd[0].id, c.ods[0].id, 60.0),
                target(c.pnd[1].id, c.ods[1].id, 40.0),
            ],
        )
        .await
        .unwrap();
    assert_eq!(second.alignments.len(), 2);
    assert_eq!(second.total_weight, 100.0);
    assert!(second.is_complete);

    // The first generation is soft-deleted
    let previous_id = first.alignments[0].id;
    let err = env
        .service
        .get::<ObjectiveAlignment>(&auditor(), previous_id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::NotFound { .. }));

    let summary = env.service.alignment_summary(&auditor(), so).await.unwrap();
    let weights: Vec<f64> = summary.alignments.iter().map(|a| a.weight).collect();
    assert_eq!(weights, vec![60.0, 40.0]);

    let replaced: Vec<_> = env
        .events
        .events()
        .into_iter()
        .filter_map(|e| match e {
            PlanningEvent::AlignmentsReplaced(e) => Some(e),
            _ => None,
        })
        .collect();
    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[1].superseded, 1);
    assert_eq!(replaced[1].alignment_ids.len(), 2);
}

#[tokio::test]
async fn replace_rejects_sum_of_99_and_writes_nothing() {
    let env = setup().await;
    let c = catalog(&env).await;
    let so = c.objective.id;

    env.service
        .replace_alignments(
            &planner(),
            so,
            vec![target(c.pnd[2].id, c.ods[2].id, 100.0)],
        )
        .await
        .unwrap();

    let err = env
        .service
        .replace_alignments(
            &planner(),
            so,
            vec![
                target(c.pnd[0].id, c.ods[0].id, 59.0),
                target(c.pnd[1].id, c.ods[1].id, 40.0),
            ],
        )
        .await
        .unwrap_err();
    match &err {
        PlanningError::Validation { errors } => {
            assert_eq!(errors[0].field, "alignments");
            assert!(errors[0].message.contains("99"), "{}", errors[0].message);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    // Previous generation untouched
    let summary = env.service.alignment_summary(&auditor(), so).await.unwrap();
    assert_eq!(summary.alignments.len(), 1);
    assert_eq!(summary.alignments[0].pnd_objective_id, c.pnd[2].id);
}

#[tokio::test]
async fn replace_accepts_total_within_tolerance() {
    let env = setup().await;
    let c = catalog(&env).await;

    let summary = env
        .service
        .replace_alignments(
            &planner(),
            c.objective.id,
            vec![
                target(c.pnd[0].id, c.ods[0].id, 33.33),
                target(c.pnd[1].id, c.ods[1].id, 33.33),
                target(c.pnd[2].id, c.ods[2].id, 33.33),
            ],
        )
        .await
        .unwrap();
    assert_eq!(summary.total_weight, 99.99);
    assert!(summary.is_complete);

    let err = env
        .service
        .replace_alignments(
            &planner(),
            c.objective.id,
            vec![
                target(c.pnd[0].id, c.ods[0].id, 50.02),
                target(c.pnd[1].id, c.ods[1].id, 50.0),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::Validation { .. }));
}

#[tokio::test]
async fn replace_rejects_duplicate_pair_as_conflict() {
    let env = setup().await;
    let c = catalog(&env).await;

    let err = env
        .service
        .replace_alignments(
            &planner(),
            c.objective.id,
            vec![
                target(c.pnd[0].id, c.ods[0].id, 50.0),
                target(c.pnd[0].id, c.ods[0].id, 50.0),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::Conflict { .. }));

    let summary = env
        .service
        .alignment_summary(&auditor(), c.objective.id)
        .await
        .unwrap();
    assert!(summary.alignments.is_empty());
    assert!(!summary.is_complete);
}

#[tokio::test]
async fn replace_checks_objective_and_targets_exist() {
    let env = setup().await;
    let c = catalog(&env).await;

    let err = env
        .service
        .replace_alignments(&planner(), 9999, vec![target(c.pnd[0].id, c.ods[0].id, 100.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::NotFound { .. }));

    let err = env
        .service
        .replace_alignments(
            &planner(),
            c.objective.id,
            vec![
                target(c.pnd[0].id, 777, 50.0),
                target(888, c.ods[1].id, 50.0),
            ],
        )
        .await
        .unwrap_err();
    assert_eq!(
        error_fields(&err),
        vec!["alignments[0].ods_goal_id", "alignments[1].pnd_objective_id"]
    );
}

#[tokio::test]
async fn replace_requires_planning_role() {
    let env = setup().await;
    let c = catalog(&env).await;

    let err = env
        .service
        .replace_alignments(
            &reviewer(),
            c.objective.id,
            vec![target(c.pnd[0].id, c.ods[0].id, 100.0)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::Forbidden { .. }));
}

#[tokio::test]
async fn single_alignment_weight_and_pair_rules() {
    let env = setup().await;
    let c = catalog(&env).await;
    let so = c.objective.id;

    for weight in [0.0, -5.0, 100.01, f64::NAN] {
        let err = env
            .service
            .create::<ObjectiveAlignment>(
                &planner(),
                NewObjectiveAlignment {
                    strategic_objective_id: so,
                    pnd_objective_id: c.pnd[0].id,
                    ods_goal_id: c.ods[0].id,
                    weight,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(error_fields(&err), vec!["weight"], "weight {weight}");
    }

    let first = env
        .service
        .create::<ObjectiveAlignment>(
            &planner(),
            NewObjectiveAlignment {
                strategic_objective_id: so,
                pnd_objective_id: c.pnd[0].id,
                ods_goal_id: c.ods[0].id,
                weight: 70.456,
            },
        )
        .await
        .unwrap();
    assert_eq!(first.weight, 70.46);

    let duplicate = env
        .service
        .create::<ObjectiveAlignment>(
            &planner(),
            NewObjectiveAlignment {
                strategic_objective_id: so,
                pnd_objective_id: c.pnd[0].id,
                ods_goal_id: c.ods[0].id,
                weight: 10.0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(duplicate, PlanningError::Conflict { .. }));

    let second = env
        .service
        .create::<ObjectiveAlignment>(
            &planner(),
            NewObjectiveAlignment {
                strategic_objective_id: so,
                pnd_objective_id: c.pnd[1].id,
                ods_goal_id: c.ods[1].id,
                weight: 29.54,
            },
        )
        .await
        .unwrap();

    // Moving the second onto the first pair collides; keeping its own pair does not
    let err = env
        .service
        .update::<ObjectiveAlignment>(
            &planner(),
            second.id,
            ObjectiveAlignmentUpdate {
                pnd_objective_id: Some(c.pnd[0].id),
                ods_goal_id: Some(c.ods[0].id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlanningError::Conflict { .. }));

    let updated = env
        .service
        .update::<ObjectiveAlignment>(
            &planner(),
            second.id,
            ObjectiveAlignmentUpdate {
                pnd_objective_id: Some(c.pnd[1].id),
                weight: Some(29.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.weight, 29.0);

    let err = env
        .service
        .update::<ObjectiveAlignment>(
            &planner(),
            second.id,
            ObjectiveAlignmentUpdate {
                weight: Some(0.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(error_fields(&err), vec!["weight"]);

    let summary = env.service.alignment_summary(&auditor(), so).await.unwrap();
    assert_eq!(summary.total_weight, 99.46);
    assert!(!summary.is_complete);
}

#[tokio::test]
async fn concurrent_replacements_leave_one_live_set() {
    let env = setup().await;
    let c = catalog(&env).await;
    let so = c.objective.id;
    let ctx = planner();

    let (a, b) = tokio::join!(
        env.service.replace_alignments(
            &ctx,
            so,
            vec![
                target(c.pnd[0].id, c.ods[0].id, 60.0),
                target(c.pnd[1].id, c.ods[1].id, 40.0),
            ],
        ),
        env.service.replace_alignments(
            &ctx,
            so,
            vec![target(c.pnd[2].id, c.ods[2].id, 100.0)],
        ),
    );
    a.unwrap();
    b.unwrap();

    let summary = env.service.alignment_summary(&auditor(), so).await.unwrap();
    assert_eq!(summary.total_weight, 100.0);
    assert!(summary.is_complete);
    assert!(matches!(summary.alignments.len(), 1 | 2));
}
