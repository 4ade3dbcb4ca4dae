use tally::{
    guard::ModelAccess, AccessGuard, AccessRegistry, Context, Permission, Principal,
};
use tests::*;

const BUTTON: &str = "test";

fn user() -> Context {
    setup_tracing();
    Context::new(Principal::new("user"))
}

#[test]
fn button_access_sequence() {
    let cx = user();
    let mut registry = AccessRegistry::new();
    let admin = registry.add_group("admin");
    let no_group = registry.add_group("no_group");
    registry.add_member(cx.principal(), admin);

    // No rules on the model
    AccessGuard::new(&registry).check(&cx, BUTTON_MODEL, BUTTON).unwrap();

    // A rule denying read to everyone
    let rule = registry.add_model_access(ModelAccess {
        model: BUTTON_MODEL.to_string(),
        group: None,
        perm_read: false,
        perm_write: false,
    });
    let err = AccessGuard::new(&registry)
        .check(&cx, BUTTON_MODEL, BUTTON)
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(err.denied_model(), Some(BUTTON_MODEL));

    // Read without write
    registry.model_access_mut(rule).unwrap().perm_read = true;
    let err = AccessGuard::new(&registry)
        .check(&cx, BUTTON_MODEL, BUTTON)
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(err.denied_button(), None);

    // A button restricted to a group the user is in
    registry.set_button_groups(BUTTON_MODEL, BUTTON, [admin]);
    AccessGuard::new(&registry).check(&cx, BUTTON_MODEL, BUTTON).unwrap();

    // No rules, button restricted to a group the user is not in
    registry.remove_model_access(rule).unwrap();
    registry.set_button_groups(BUTTON_MODEL, BUTTON, [no_group]);
    let err = AccessGuard::new(&registry)
        .check(&cx, BUTTON_MODEL, BUTTON)
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(err.denied_button(), Some(BUTTON));
}

#[test]
fn decisions_follow_live_state() {
    let cx = user();
    let mut registry = AccessRegistry::new();
    let admin = registry.add_group("admin");
    registry.set_button_groups(BUTTON_MODEL, BUTTON, [admin]);

    assert!(AccessGuard::new(&registry).check(&cx, BUTTON_MODEL, BUTTON).is_err());

    registry.add_member(cx.principal(), admin);
    assert!(AccessGuard::new(&registry).check(&cx, BUTTON_MODEL, BUTTON).is_ok());

    registry.remove_member(cx.principal(), admin);
    assert!(AccessGuard::new(&registry).check(&cx, BUTTON_MODEL, BUTTON).is_err());
}

#[test]
fn group_rule_grants_only_members() {
    let cx = user();
    let mut registry = AccessRegistry::new();
    let admin = registry.add_group("admin");
    registry.add_model_access(ModelAccess {
        model: BUTTON_MODEL.to_string(),
        group: Some(admin),
        perm_read: true,
        perm_write: true,
    });

    let err = AccessGuard::new(&registry)
        .check(&cx, BUTTON_MODEL, BUTTON)
        .unwrap_err();
    assert_eq!(err.denied_model(), Some(BUTTON_MODEL));

    registry.add_member(cx.principal(), admin);
    AccessGuard::new(&registry).check(&cx, BUTTON_MODEL, BUTTON).unwrap();
}

#[test]
fn disabled_checks_allow_everything() {
    let mut registry = AccessRegistry::new();
    let no_group = registry.add_group("no_group");
    registry.add_model_access(ModelAccess {
        model: BUTTON_MODEL.to_string(),
        group: None,
        perm_read: false,
        perm_write: false,
    });
    registry.set_button_groups(BUTTON_MODEL, BUTTON, [no_group]);
    let guard = AccessGuard::new(&registry);

    guard.check(&Context::root(), BUTTON_MODEL, BUTTON).unwrap();
    guard
        .check(&user().with_check_access(false), BUTTON_MODEL, BUTTON)
        .unwrap();
}

#[test]
fn invoke_runs_action_only_when_allowed() {
    let cx = user();
    let mut registry = AccessRegistry::new();
    let mut calls = 0;

    let out = AccessGuard::new(&registry)
        .invoke(&cx, BUTTON_MODEL, BUTTON, || {
            calls += 1;
            Ok("done")
        })
        .unwrap();
    assert_eq!(out, "done");
    assert_eq!(calls, 1);

    registry.add_model_access(ModelAccess {
        model: BUTTON_MODEL.to_string(),
        group: None,
        perm_read: true,
        perm_write: false,
    });
    let err = AccessGuard::new(&registry)
        .invoke(&cx, BUTTON_MODEL, BUTTON, || {
            calls += 1;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert_eq!(calls, 1);
}

#[test]
fn model_permission_check() {
    let cx = user();
    let mut registry = AccessRegistry::new();
    registry.add_model_access(ModelAccess {
        model: BUTTON_MODEL.to_string(),
        group: None,
        perm_read: true,
        perm_write: false,
    });
    let guard = AccessGuard::new(&registry);

    guard.check_model(&cx, BUTTON_MODEL, Permission::Read).unwrap();
    let err = guard
        .check_model(&cx, BUTTON_MODEL, Permission::Write)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "permission denied: write access to `test.modelview.button` is not allowed"
    );
}
