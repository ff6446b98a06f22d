use brevet::grading::{analyze, MasteryTier, PerformanceTier, RawEvaluation};
use brevet::EvaluationCsvImporter;
use std::io::Cursor;

const SIDE_SUBJECT: &str = "Vie scolaire";

fn load(json: &str) -> Vec<RawEvaluation> {
    serde_json::from_str(json).expect("raw evaluations parse")
}

#[test]
fn full_pipeline_from_raw_json() {
    let evaluations = load(
        r#"[
        {
            "subject": "Math",
            "name": "Fractions quiz",
            "date": "2026-03-12",
            "coefficient": 2,
            "acquisitions": [
                {"grade": "A+", "domains": "D1.3, D2"},
                {"grade": "A", "domains": "D1.3"}
            ]
        },
        {
            "subject": "Math",
            "name": "Geometry test",
            "date": "2026-03-20T09:00:00Z",
            "coefficient": 3,
            "acquisitions": [
                {"grade": "C", "domains": "D1.3"},
                {"grade": "C", "domains": "D1.3"}
            ]
        },
        {
            "subject": "Vie scolaire",
            "name": "Engagement",
            "acquisitions": [
                {"grade": "A+"},
                {"grade": "A"}
            ]
        }
    ]"#,
    );

    let analysis = analyze(&evaluations, SIDE_SUBJECT);

    assert_eq!(analysis.evaluations.len(), 3);
    assert_eq!(analysis.evaluations[0].grades, vec!["V+", "V"]);
    assert_eq!(analysis.evaluations[0].average_points, 45.0);
    assert_eq!(analysis.evaluations[1].average_points, 25.0);
    assert_eq!(
        analysis.evaluations[1].date_display,
        "2026-03-20",
        "date-times truncate to their date"
    );

    // Math: (2 x 45 + 3 x 25) / 5 = 33
    let math = analysis
        .subject_averages
        .iter()
        .find(|average| average.subject == "Math")
        .expect("math average present");
    assert!((math.average_points - 33.0).abs() < 1e-9);
    assert!((math.average_out_of_20 - 13.2).abs() < 1e-9);

    // D1.3 sees [50, 40, 25, 25]: mean 35 snaps to 40. D2 sees [50].
    let d13 = analysis
        .domain_scores
        .iter()
        .find(|entry| entry.tag == "D1.3")
        .expect("D1.3 scored");
    assert_eq!(d13.count, 4);
    assert_eq!(d13.tier, MasteryTier::Satisfactory);
    assert_eq!(d13.tier_points, 40);

    // Aggregate: D1.3 -> 40, D2 -> 50; side channel stays out.
    assert_eq!(analysis.socle.total, 90);
    assert_eq!(analysis.socle.tier, PerformanceTier::BelowPass);

    let summary = analysis.side_channel.summary.expect("side channel summary");
    assert_eq!(summary.count, 2);
    assert_eq!(summary.mean_points, 45.0);
    assert_eq!(summary.tier_points, 50);
}

#[test]
fn empty_batch_round_trips_to_zeroed_aggregate() {
    let analysis = analyze(&[], SIDE_SUBJECT);
    assert!(analysis.domain_scores.is_empty());
    assert_eq!(analysis.socle.total, 0);
    assert_eq!(analysis.socle.tier, PerformanceTier::BelowPass);
}

#[test]
fn degenerate_records_degrade_instead_of_failing() {
    let evaluations = load(
        r#"[
        {"acquisitions": []},
        {"subject": "SVT", "date": "sometime in spring", "acquisitions": [{"grade": "?"}]},
        {"subject": "SVT", "coefficient": 0, "acquisitions": [{"grade": "A"}]}
    ]"#,
    );

    let analysis = analyze(&evaluations, SIDE_SUBJECT);
    assert_eq!(analysis.evaluations.len(), 3);
    assert_eq!(analysis.evaluations[0].average_points, 0.0);
    assert_eq!(analysis.evaluations[1].date_display, "sometime in spring");
    // unknown code: scores 0, displays unchanged
    assert_eq!(analysis.evaluations[1].grades, vec!["?"]);

    let svt = analysis
        .subject_averages
        .iter()
        .find(|average| average.subject == "SVT")
        .expect("SVT average present");
    assert_eq!(svt.average_points, 0.0);
}

#[test]
fn nine_domains_still_cap_the_aggregate_at_the_canonical_eight() {
    let json = r#"[{"subject": "Math", "acquisitions": [
        {"grade": "A+", "domains": "D1.1"},
        {"grade": "A+", "domains": "D1.2"},
        {"grade": "A+", "domains": "D1.3"},
        {"grade": "A+", "domains": "D1.4"},
        {"grade": "A+", "domains": "D2"},
        {"grade": "A+", "domains": "D3"},
        {"grade": "A+", "domains": "D4"},
        {"grade": "A+", "domains": "D5"},
        {"grade": "A+", "domains": "Projet"}
    ]}]"#;

    let analysis = analyze(&load(json), SIDE_SUBJECT);
    assert_eq!(analysis.domain_scores.len(), 9);
    assert_eq!(analysis.socle.total, 400);
    assert_eq!(analysis.socle.average_per_domain, 50.0);
    assert_eq!(analysis.socle.tier, PerformanceTier::Outstanding);
}

#[test]
fn csv_export_and_json_input_agree() {
    let csv = "Subject,Evaluation,Date,Coefficient,Grade,Domains\n\
Math,Fractions quiz,2026-03-12,2,A+,\"D1.3, D2\"\n\
Math,Fractions quiz,2026-03-12,2,A,D1.3\n";
    let from_csv = EvaluationCsvImporter::from_reader(Cursor::new(csv)).expect("csv imports");

    let from_json = load(
        r#"[{
        "subject": "Math",
        "name": "Fractions quiz",
        "date": "2026-03-12",
        "coefficient": 2,
        "acquisitions": [
            {"grade": "A+", "domains": "D1.3, D2"},
            {"grade": "A", "domains": "D1.3"}
        ]
    }]"#,
    );

    let csv_analysis = analyze(&from_csv, SIDE_SUBJECT);
    let json_analysis = analyze(&from_json, SIDE_SUBJECT);

    assert_eq!(csv_analysis.socle.total, json_analysis.socle.total);
    assert_eq!(
        csv_analysis.evaluations[0].average_points,
        json_analysis.evaluations[0].average_points
    );
    assert_eq!(
        csv_analysis.domain_scores.len(),
        json_analysis.domain_scores.len()
    );
}
