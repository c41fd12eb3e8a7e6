//! Styles and spring presets as they appear in JSON and TOML

use recoil_animation::{AnimationError, PlainStyle, SpringConfig, Style, StyleValue, GENTLE};

#[test]
fn parses_mixed_style_from_json() {
    let style: Style = serde_json::from_str(
        r#"{ "opacity": 1, "x": { "val": 100, "stiffness": 170, "damping": 26 } }"#,
    )
    .unwrap();

    assert_eq!(style.keys().collect::<Vec<_>>(), vec!["opacity", "x"]);
    assert_eq!(style.get("opacity"), Some(&StyleValue::Numeric(1.0)));

    match style.get("x") {
        Some(StyleValue::Spring(spring)) => {
            assert_eq!(spring.target, 100.0);
            assert_eq!(spring.precision, 0.01, "precision defaults when omitted");
        }
        other => panic!("expected a spring, got {other:?}"),
    }
    assert!(style.validate().is_ok());
}

#[test]
fn spring_serializes_with_val_field() {
    let style = Style::new().with("x", recoil_animation::spring_with(5.0, GENTLE));
    let json = serde_json::to_value(&style).unwrap();
    assert_eq!(json["x"]["val"], 5.0);
    assert_eq!(json["x"]["stiffness"], 120.0);
    assert_eq!(json["x"]["damping"], 14.0);
}

#[test]
fn plain_style_is_a_flat_map() {
    let plain: PlainStyle = serde_json::from_str(r#"{ "x": 1.5, "y": -2 }"#).unwrap();
    assert_eq!(plain.get("x"), Some(1.5));
    assert_eq!(plain.get("y"), Some(-2.0));
    assert_eq!(serde_json::to_string(&plain).unwrap(), r#"{"x":1.5,"y":-2.0}"#);
}

#[test]
fn parsed_spring_with_bad_parameters_fails_validation() {
    let style: Style =
        serde_json::from_str(r#"{ "x": { "val": 1, "stiffness": -1, "damping": 26 } }"#).unwrap();
    assert!(matches!(
        style.validate(),
        Err(AnimationError::InvalidSpring { ref property, .. }) if property == "x"
    ));
}

#[test]
fn spring_config_reads_from_toml() {
    #[derive(serde::Deserialize)]
    struct Presets {
        card: SpringConfig,
    }

    let presets: Presets = toml::from_str(
        r#"
        [card]
        stiffness = 300.0
        damping = 30.0
        "#,
    )
    .unwrap();
    assert_eq!(presets.card, SpringConfig::new(300.0, 30.0));
}
