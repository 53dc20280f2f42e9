use crate::readings::anomaly::{
    EXCESSIVE_MESSAGE, INCORRECT_ROLLOVER_MESSAGE, TRUNCATED_DECIMAL_MESSAGE,
};
use crate::readings::{detect_anomaly, AnomalyDetector, AnomalyKind, AnomalyPolicy};

#[test]
fn dense_nines_flag_truncated_decimal_first() {
    let result = detect_anomaly("99999", 0.0, 4, 1.0);
    assert!(result.is_anomalous);
    assert_eq!(result.anomaly_kind, AnomalyKind::TruncatedDecimal);
    assert_eq!(result.message, TRUNCATED_DECIMAL_MESSAGE);
    assert_eq!(
        result.fired,
        vec![
            AnomalyKind::TruncatedDecimal,
            AnomalyKind::IncorrectRollover,
            AnomalyKind::Excessive,
        ]
    );
    assert_eq!(result.anomaly_kind.legacy_code(), "decimal_truncado");
}

#[test]
fn short_text_with_nines_is_not_truncated() {
    let result = detect_anomaly("9999", 5000.0, 5, 1.0);
    assert!(!result.fired.contains(&AnomalyKind::TruncatedDecimal));
    assert!(!result.is_anomalous);
}

#[test]
fn consumption_far_above_history_is_excessive() {
    let result = detect_anomaly("3000", 500.0, 5, 1.0);
    assert!(result.is_anomalous);
    assert_eq!(result.anomaly_kind, AnomalyKind::Excessive);
    assert_eq!(result.message, EXCESSIVE_MESSAGE);
    assert_eq!(result.fired, vec![AnomalyKind::Excessive]);
}

#[test]
fn history_threshold_never_drops_below_floor() {
    assert!(!detect_anomaly("1900", 100.0, 6, 1.0).is_anomalous);
    assert!(!detect_anomaly("2000", 0.0, 6, 1.0).is_anomalous);
    assert!(detect_anomaly("2001", 0.0, 6, 1.0).is_anomalous);
    assert!(!detect_anomaly("2900", 1000.0, 6, 1.0).is_anomalous);
    assert!(detect_anomaly("3100", 1000.0, 6, 1.0).is_anomalous);
}

#[test]
fn consumption_near_register_capacity_is_incorrect_rollover() {
    let result = detect_anomaly("8500", 10_000.0, 4, 1.0);
    assert_eq!(result.anomaly_kind, AnomalyKind::IncorrectRollover);
    assert_eq!(result.message, INCORRECT_ROLLOVER_MESSAGE);
    assert_eq!(result.fired, vec![AnomalyKind::IncorrectRollover]);
}

#[test]
fn multiplier_scales_the_rollover_ceiling() {
    let detector = AnomalyDetector::default();
    assert_eq!(
        detector.detect("300000", 200_000.0, 4, 40.0).anomaly_kind,
        AnomalyKind::None
    );
    assert_eq!(
        detector.detect("330000", 1_000_000.0, 4, 40.0).anomaly_kind,
        AnomalyKind::IncorrectRollover
    );
}

#[test]
fn malformed_text_is_not_judged() {
    for text in ["", "abc", "1,5", "NaN"] {
        let result = detect_anomaly(text, 0.0, 4, 1.0);
        assert!(!result.is_anomalous, "{text:?}");
        assert_eq!(result.anomaly_kind, AnomalyKind::None);
        assert!(result.message.is_empty());
        assert!(result.fired.is_empty());
    }
}

#[test]
fn custom_policy_moves_the_thresholds() {
    let detector = AnomalyDetector::new(AnomalyPolicy {
        floor: 10_000.0,
        ..AnomalyPolicy::default()
    });
    assert!(!detector.detect("3000", 500.0, 6, 1.0).is_anomalous);
    assert_eq!(detector.policy().excessive_threshold(0.0), 10_000.0);
}

#[test]
fn serializes_kinds_in_snake_case() {
    let result = detect_anomaly("3000", 500.0, 5, 1.0);
    let value = serde_json::to_value(&result).expect("serializes");
    assert_eq!(value["anomaly_kind"], "excessive");
    assert_eq!(value["is_anomalous"], true);
}

#[test]
fn rollover_outranks_excessive_when_both_fire() {
    let result = detect_anomaly("85000", 0.0, 4, 1.0);

    assert_eq!(result.anomaly_kind, AnomalyKind::IncorrectRollover);
    assert_eq!(
        result.fired,
        vec![AnomalyKind::IncorrectRollover, AnomalyKind::Excessive]
    );
}
