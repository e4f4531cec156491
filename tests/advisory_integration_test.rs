/// Integration tests for the advisory services
///
/// These tests run the services against trained (lightweight) models:
/// - Crop recommendations: ordering, limits, confidence bounds
/// - Yield forecasts: totals, intervals, suggestions
/// - Disease risk thresholds

mod common;

use agri_advisor::{
    advisory::{AdvisoryServices, YieldConditions},
    ml::{synthetic::reference_yield, MLConfig},
    models::{PredictionInput, RiskLevel},
};
use common::{recommendation_input, trained_models, yield_input};

fn services() -> AdvisoryServices {
    AdvisoryServices::new(trained_models(), &MLConfig::default())
}

#[test]
fn test_recommendation_scenario_is_non_empty() {
    let recommendations = services().recommendations.recommend(&recommendation_input());

    assert!(!recommendations.is_empty());
    assert!(recommendations[0].confidence > 5.0);
}

#[test]
fn test_recommendations_are_bounded_and_sorted() {
    let services = services();
    let inputs = [
        recommendation_input(),
        PredictionInput::new()
            .with("temperature", 22.0)
            .with("humidity", 60.0)
            .with("rainfall", 700.0)
            .with("soil_ph", 6.0),
        PredictionInput::new()
            .with("temperature", 33.0)
            .with("humidity", 85.0)
            .with("rainfall", 1800.0)
            .with("soil_ph", 5.5),
    ];

    for input in &inputs {
        let recommendations = services.recommendations.try_recommend(input).unwrap();
        assert!(recommendations.len() <= 5);
        assert!(recommendations
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
        for r in &recommendations {
            assert!(r.confidence > 5.0 && r.confidence <= 100.0, "{} -> {}", r.crop, r.confidence);
            assert!(!r.reasons.is_empty());
            assert!(!r.best_practices.spacing.is_empty());
            // two decimals
            assert_eq!((r.confidence * 100.0).round() / 100.0, r.confidence);
        }
    }
}

#[test]
fn test_rice_conditions_favor_rice() {
    // hot, humid and wet: the labelling rule always yields Riz here
    let input = PredictionInput::new()
        .with("temperature", 32.0)
        .with("humidity", 85.0)
        .with("rainfall", 1800.0)
        .with("soil_ph", 6.0);

    let recommendations = services().recommendations.try_recommend(&input).unwrap();
    assert_eq!(recommendations[0].crop, "Riz");
}

#[test]
fn test_recommendation_failure_degrades_to_empty() {
    let input = PredictionInput::new()
        .with("temperature", "hot")
        .with("humidity", 75.0)
        .with("rainfall", 1200.0)
        .with("soil_ph", 6.5);

    let services = services();
    assert!(services.recommendations.try_recommend(&input).is_err());
    assert!(services.recommendations.recommend(&input).is_empty());
}

#[test]
fn test_yield_scenario() {
    let forecast = services().yields.forecast(&yield_input());

    assert!(forecast.error.is_none());
    assert!(forecast.yield_per_ha > 0.0);
    assert_eq!(forecast.total_production_kg, forecast.yield_per_ha * 2.5);
    assert!(forecast.confidence_interval.contains(forecast.yield_per_ha));
    assert!(forecast.confidence_interval.lower >= 0.0);
    assert_eq!(forecast.confidence, 0.85);
    // ample fertilizer, irrigated, pH in range
    assert!(forecast
        .recommendations
        .iter()
        .all(|s| s.category != "Fertilisation" && s.category != "Irrigation" && s.category != "pH du sol"));
}

#[test]
fn test_yield_tracks_reference_model() {
    let conditions = YieldConditions::from_input(&yield_input()).unwrap();
    let forecast = services().yields.forecast_conditions(&conditions).unwrap();
    let reference = reference_yield(27.0, 900.0, 6.2, 250.0, true);

    // forest estimate within a generous band around the noise-free formula
    let relative = (forecast.yield_per_ha - reference).abs() / reference;
    assert!(relative < 0.4, "forecast {} vs reference {}", forecast.yield_per_ha, reference);
}

#[test]
fn test_yield_failure_is_zeroed_with_error() {
    let input = yield_input().with("area_hectares", "large");
    let forecast = services().yields.forecast(&input);

    assert_eq!(forecast.yield_per_ha, 0.0);
    assert_eq!(forecast.total_production_kg, 0.0);
    assert!(forecast.error.is_some());
    assert!(forecast.is_degraded());
}

#[test]
fn test_disease_risk_from_artifact_thresholds() {
    let services = services();

    let high = services
        .disease
        .predict(
            &PredictionInput::new()
                .with("crop", "Tomate")
                .with("temperature", 28.0)
                .with("humidity", 85.0)
                .with("rainfall", 150.0),
        )
        .unwrap();
    assert_eq!(high.risk_level, RiskLevel::High);
    assert_eq!(high.risk_score, 0.8);
    assert!(!high.main_threats.is_empty());
    assert!(!high.prevention_measures.is_empty());

    let at_threshold = services.disease.assess("Maïs", 25.0, 75.0);
    assert_eq!(at_threshold.risk_level, RiskLevel::Moderate);

    let boundary = services.disease.assess("Maïs", 25.01, 75.01);
    assert_eq!(boundary.risk_level, RiskLevel::High);
}
