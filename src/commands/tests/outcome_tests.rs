use super::*;
use proptest::prelude::*;

fn arb_outcome() -> impl Strategy<Value = Outcome<i64, String>> {
    prop_oneof![
        (any::<i64>(), proptest::option::of("[a-z]{0,8}")).prop_map(|(v, d)| {
            let outcome = Outcome::success(v);
            match d {
                Some(d) => outcome.with_details(d),
                None => outcome,
            }
        }),
        ("[a-z]{1,8}", any::<bool>(), proptest::option::of("[a-z]{0,8}")).prop_map(
            |(v, critical, log)| {
                let outcome = Outcome::failure(v).with_critical(critical);
                match log {
                    Some(log) => outcome.with_log(log),
                    None => outcome,
                }
            }
        ),
        any::<i64>().prop_map(Outcome::running),
    ]
}

proptest! {
    #[test]
    fn exactly_one_variant_is_active(outcome in arb_outcome()) {
        let flags = [outcome.is_success(), outcome.is_failure(), outcome.is_running()];
        prop_assert_eq!(flags.iter().filter(|f| **f).count(), 1);
    }

    #[test]
    fn map_preserves_variant(outcome in arb_outcome()) {
        let mapped = outcome.clone().map(|v| v.wrapping_mul(2));
        prop_assert_eq!(outcome.state_name(), mapped.state_name());
        prop_assert_eq!(outcome.details(), mapped.details());
        prop_assert_eq!(outcome.log(), mapped.log());
        prop_assert_eq!(outcome.is_critical(), mapped.is_critical());
    }

    #[test]
    fn map_failure_preserves_variant(outcome in arb_outcome()) {
        let mapped = outcome.clone().map_failure(|e| e.len());
        prop_assert_eq!(outcome.state_name(), mapped.state_name());
        prop_assert_eq!(outcome.success_or_none(), mapped.success_or_none());
        prop_assert_eq!(outcome.running_or_none(), mapped.running_or_none());
    }

    #[test]
    fn fold_is_total(outcome in arb_outcome()) {
        let label = outcome.clone().fold(|_| "s", |_| "f", |_| "r");
        prop_assert_eq!(&label[..1], &outcome.state_name()[..1]);
    }
}

#[test]
fn test_map_leaves_failure_untouched() {
    let failure: Outcome<i32, String> = Outcome::fault("boom".to_string())
        .with_details("disk")
        .with_log("Erro");
    let mapped = failure.clone().map(|v| v + 1);
    assert_eq!(
        mapped,
        Outcome::Failure {
            value: "boom".to_string(),
            details: Some("disk".to_string()),
            log: Some("Erro".to_string()),
            critical: true,
        }
    );
}

#[test]
fn test_map_applies_to_success_and_running() {
    let success: Outcome<i32, String> = Outcome::success(2).with_log("ok");
    assert_eq!(success.map(|v| v * 10).success_or_none(), Some(&20));

    let running: Outcome<i32, String> = Outcome::running(3);
    assert_eq!(running.map(|v| v * 10).running_or_none(), Some(&30));
}

#[test]
fn test_map_failure_only_touches_failure() {
    let failure: Outcome<i32, String> = Outcome::failure("nope".to_string());
    let mapped = failure.map_failure(|e| e.to_uppercase());
    assert_eq!(mapped.failure_or_none().map(String::as_str), Some("NOPE"));

    let success: Outcome<i32, String> = Outcome::success(1);
    assert_eq!(success.map_failure(|e| e.len()).success_or_none(), Some(&1));
}

#[test]
fn test_fold_settled_rejects_running() {
    let running: Outcome<i32, String> = Outcome::running(1);
    assert_eq!(running.fold_settled(|v| v, |_| 0), Err(UnhandledRunning));

    let success: Outcome<i32, String> = Outcome::success(7);
    assert_eq!(success.fold_settled(|v| v, |_| 0), Ok(7));

    let failure: Outcome<i32, String> = Outcome::failure("x".to_string());
    assert_eq!(failure.fold_settled(|v| v, |e| e.len() as i32), Ok(1));
}

#[test]
fn test_value_returns_payload_for_every_variant() {
    let outcomes: Vec<Outcome<String, String>> = vec![
        Outcome::success("a".to_string()),
        Outcome::failure("b".to_string()),
        Outcome::running("c".to_string()),
    ];
    let values: Vec<&str> = outcomes.iter().map(|o| o.value().as_str()).collect();
    assert_eq!(values, vec!["a", "b", "c"]);
}

#[test]
fn test_default_failure_is_not_critical() {
    let failure: Outcome<(), String> = Outcome::failure("denied".to_string());
    assert!(!failure.is_critical());
    assert!(Outcome::<(), String>::fault("crash".to_string()).is_critical());
}

#[test]
fn test_to_map_per_variant() {
    let success: Outcome<i32, String> = Outcome::success(5).with_log("ok");
    let map = success.to_map().unwrap();
    assert_eq!(map.get("value"), Some(&serde_json::json!(5)));
    assert_eq!(map.get("log"), Some(&serde_json::json!("ok")));
    assert!(!map.contains_key("details"));
    assert!(!map.contains_key("critical"));

    let failure: Outcome<i32, String> = Outcome::fault("bad".to_string()).with_details("why");
    let map = failure.to_map().unwrap();
    assert_eq!(map.get("critical"), Some(&serde_json::json!(true)));
    assert_eq!(map.get("details"), Some(&serde_json::json!("why")));

    let running: Outcome<&str, String> = Outcome::running("step");
    let map = running.to_map().unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn test_display() {
    let success: Outcome<i32, String> = Outcome::success(1);
    assert_eq!(success.to_string(), "Success(1)");
    let running: Outcome<i32, String> = Outcome::running(2);
    assert_eq!(running.to_string(), "Running(2)");
}
