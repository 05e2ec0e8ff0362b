use grants::{load_from_env, Evaluator};
use serial_test::serial;

#[test]
#[serial]
fn role_grants_env_round_trips_into_evaluator() {
    std::env::set_var(
        "ROOST_ROLE_GRANTS",
        r#"{
          "root": [ { "action": "*", "resource": "*" } ],
          "facilities": [
            { "action": "admin/", "resource": "desk" },
            { "action": "admin/", "resource": "desk_reservation" }
          ],
          "student": []
        }"#,
    );

    let cfg = load_from_env();
    let eval = Evaluator::new(cfg);

    let facilities = vec!["facilities".to_string()];
    assert!(eval.check(&facilities, "admin/", "desk"));
    assert!(eval.check(&facilities, "admin/", "desk_reservation"));
    assert!(!eval.check(&facilities, "other/", "desk"));

    let student = vec!["student".to_string()];
    assert!(!eval.check(&student, "admin/", "desk"));

    std::env::remove_var("ROOST_ROLE_GRANTS");
}

#[test]
#[serial]
fn missing_env_yields_deny_all_table() {
    std::env::remove_var("ROOST_ROLE_GRANTS");

    let cfg = load_from_env();
    assert!(cfg.roles.is_empty());
}

#[test]
#[serial]
fn malformed_env_yields_deny_all_table() {
    std::env::set_var("ROOST_ROLE_GRANTS", "{not json");

    let cfg = load_from_env();
    assert!(cfg.roles.is_empty());

    std::env::remove_var("ROOST_ROLE_GRANTS");
}
