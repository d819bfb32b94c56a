use gsd_core::db::open_db_in_memory;
use gsd_core::{
    ActionEnergy, ActionSize, FieldPatch, NewNextAction, NewProject, NextActionPatch,
    NextActionRepository, NextActionService, ProjectRepository, RepoError,
    SqliteNextActionRepository, SqliteProjectRepository,
};
use serde_json::json;

#[test]
fn create_and_get_roundtrip_with_metadata() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_next_action(&NewNextAction {
            action: "file expense report".to_string(),
            url: Some("https://expenses.example.org".to_string()),
            size: Some(ActionSize::Small),
            energy: Some(ActionEnergy::Low),
            ..NewNextAction::default()
        })
        .unwrap();

    assert_eq!(created.position, 1.0);
    assert_eq!(created.size, Some(ActionSize::Small));
    assert_eq!(created.energy, Some(ActionEnergy::Low));
    assert_eq!(created.completed_at, None);
    assert!(!created.is_completed());

    let loaded = repo.get_next_action(&created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn absent_nullable_fields_are_omitted_from_serialized_output() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_next_action(&NewNextAction {
            action: "bare minimum".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();

    let json = serde_json::to_string(&created).unwrap();
    for absent in ["project_id", "url", "size", "energy", "completed_at"] {
        assert!(!json.contains(absent), "expected `{absent}` to be omitted: {json}");
    }
}

#[test]
fn action_can_reference_an_existing_project() {
    let mut conn = open_db_in_memory().unwrap();

    let project = {
        let mut projects = SqliteProjectRepository::try_new(&mut conn).unwrap();
        projects
            .create_project(&NewProject {
                name: "home lab".to_string(),
                ..NewProject::default()
            })
            .unwrap()
    };

    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();
    let created = repo
        .create_next_action(&NewNextAction {
            action: "rack the switch".to_string(),
            project_id: Some(project.id.clone()),
            ..NewNextAction::default()
        })
        .unwrap();
    assert_eq!(created.project_id.as_deref(), Some(project.id.as_str()));
}

#[test]
fn dangling_project_reference_is_rejected_by_the_schema() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let err = repo
        .create_next_action(&NewNextAction {
            action: "orphaned".to_string(),
            project_id: Some("no-such-project".to_string()),
            ..NewNextAction::default()
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
}

#[test]
fn completed_at_null_clears_while_omitted_leaves_it() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_next_action(&NewNextAction {
            action: "ship the fix".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();

    let complete =
        NextActionPatch::from_json(json!({"completed_at": "2024-02-02T10:00:00Z"}).as_object().unwrap())
            .unwrap();
    let completed = repo.update_next_action(&created.id, &complete).unwrap();
    assert_eq!(completed.completed_at.as_deref(), Some("2024-02-02T10:00:00Z"));
    assert!(completed.is_completed());

    // A patch that omits completed_at leaves the completion stamp alone.
    let rename =
        NextActionPatch::from_json(json!({"action": "shipped the fix"}).as_object().unwrap())
            .unwrap();
    let renamed = repo.update_next_action(&created.id, &rename).unwrap();
    assert_eq!(renamed.completed_at.as_deref(), Some("2024-02-02T10:00:00Z"));

    // Explicit null clears it.
    let clear =
        NextActionPatch::from_json(json!({"completed_at": null}).as_object().unwrap()).unwrap();
    let cleared = repo.update_next_action(&created.id, &clear).unwrap();
    assert_eq!(cleared.completed_at, None);
    assert!(!cleared.is_completed());
}

#[test]
fn patch_with_only_position_changes_nothing_else() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_next_action(&NewNextAction {
            action: "hold steady".to_string(),
            size: Some(ActionSize::Medium),
            energy: Some(ActionEnergy::High),
            ..NewNextAction::default()
        })
        .unwrap();

    let patch = NextActionPatch::from_json(json!({"position": 5.0}).as_object().unwrap()).unwrap();
    let updated = repo.update_next_action(&created.id, &patch).unwrap();

    assert_eq!(updated.position, 5.0);
    assert_eq!(updated.action, created.action);
    assert_eq!(updated.size, created.size);
    assert_eq!(updated.energy, created.energy);
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn enum_fields_can_be_set_and_cleared_by_patch() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_next_action(&NewNextAction {
            action: "triage".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();

    let set = NextActionPatch::from_json(
        json!({"size": "big", "energy": "high"}).as_object().unwrap(),
    )
    .unwrap();
    let updated = repo.update_next_action(&created.id, &set).unwrap();
    assert_eq!(updated.size, Some(ActionSize::Big));
    assert_eq!(updated.energy, Some(ActionEnergy::High));

    let clear =
        NextActionPatch::from_json(json!({"size": null, "energy": null}).as_object().unwrap())
            .unwrap();
    let cleared = repo.update_next_action(&created.id, &clear).unwrap();
    assert_eq!(cleared.size, None);
    assert_eq!(cleared.energy, None);
}

#[test]
fn empty_patch_fails_and_unknown_id_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let created = repo
        .create_next_action(&NewNextAction {
            action: "unchanged".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();

    let empty_err = repo
        .update_next_action(&created.id, &NextActionPatch::default())
        .unwrap_err();
    assert!(matches!(empty_err, RepoError::NothingToUpdate));

    let missing_err = repo
        .update_next_action("missing", &NextActionPatch {
            position: FieldPatch::Value(9.0),
            ..NextActionPatch::default()
        })
        .unwrap_err();
    assert!(matches!(missing_err, RepoError::NotFound(id) if id == "missing"));

    let delete_err = repo.delete_next_action("missing").unwrap_err();
    assert!(matches!(delete_err, RepoError::NotFound(id) if id == "missing"));
}

#[test]
fn list_orders_ascending_by_position_after_reorder() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();

    let first = repo
        .create_next_action(&NewNextAction {
            action: "first".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();
    let second = repo
        .create_next_action(&NewNextAction {
            action: "second".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();
    let third = repo
        .create_next_action(&NewNextAction {
            action: "third".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();

    // Move the last action between the first two.
    let patch = NextActionPatch {
        position: FieldPatch::Value(1.5),
        ..NextActionPatch::default()
    };
    repo.update_next_action(&third.id, &patch).unwrap();

    let ids: Vec<String> = repo
        .list_next_actions()
        .unwrap()
        .into_iter()
        .map(|action| action.id)
        .collect();
    assert_eq!(ids, vec![first.id, third.id, second.id]);
}

#[test]
fn service_complete_and_reopen_roundtrip() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteNextActionRepository::try_new(&mut conn).unwrap();
    let mut service = NextActionService::new(repo);

    let created = service
        .create_next_action(&NewNextAction {
            action: "water the plants".to_string(),
            ..NewNextAction::default()
        })
        .unwrap();

    let completed = service
        .complete(&created.id, "2024-05-05T08:00:00Z")
        .unwrap();
    assert!(completed.is_completed());

    let reopened = service.reopen(&created.id).unwrap();
    assert!(!reopened.is_completed());
    assert_eq!(reopened.action, "water the plants");
}
