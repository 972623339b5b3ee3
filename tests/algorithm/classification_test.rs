use nicu_episodes::algorithm::BirthClassifier;
use nicu_episodes::models::{BabyType, BirthMultiplicity, HospitalEpisode, StayType, StudyPeriod};
use nicu_episodes::NicuPipeline;

use crate::utils::{ClaimBuilder, date, day, reference_index, run, test_config};

#[test]
fn test_msdrg_only_episode_is_nicu() {
    let output = run(vec![
        ClaimBuilder::new("C1", "P1", day(0), day(8)).diagnosis("Z38.00").ms_drg("790").build(),
    ]);

    let newborn = &output.newborns[0];
    assert_eq!(newborn.baby_type, BabyType::Nicu);
    assert_eq!(output.nicu_episodes.len(), 1);
    let nicu = &output.nicu_episodes[0];
    assert!(nicu.nicu_by_msdrg);
    assert!(!nicu.nicu_by_revenue);
    assert!(!nicu.nicu_by_aprdrg);
    assert_eq!(nicu.acuity_level, None);
}

#[test]
fn test_nicu_evidence_alone_qualifies_a_newborn() {
    let output = run(vec![ClaimBuilder::new("C1", "P1", day(0), day(9)).revenue("0174").build()]);

    assert_eq!(output.newborns.len(), 1);
    assert_eq!(output.newborns[0].baby_type, BabyType::Nicu);
}

#[test]
fn test_routine_birth_is_normal_single() {
    let output = run(vec![ClaimBuilder::newborn("C1", "P1", day(0), day(1)).build()]);

    let newborn = &output.newborns[0];
    assert_eq!(newborn.baby_type, BabyType::Normal);
    assert_eq!(newborn.multiplicity, BirthMultiplicity::Single);
    assert_eq!(newborn.stay_type, StayType::ShortStay);
    assert_eq!(newborn.study_period, StudyPeriod::Current);
    assert!(output.nicu_episodes.is_empty());
}

#[test]
fn test_multiplicity_from_diagnosis_codes() {
    let output = run(vec![
        ClaimBuilder::new("C1", "TWIN", day(0), day(3)).diagnosis("Z38.30").build(),
        ClaimBuilder::new("C2", "TRIPLET", day(0), day(3)).diagnosis("Z38.61").build(),
        ClaimBuilder::new("C3", "BOTH", day(0), day(3))
            .diagnosis("Z38.31")
            .diagnosis("Z38.62")
            .build(),
    ]);

    let multiplicity = |id: &str| {
        output
            .newborns
            .iter()
            .find(|n| n.individual_id == id)
            .map(|n| n.multiplicity)
    };
    assert_eq!(multiplicity("TWIN"), Some(BirthMultiplicity::Twin));
    assert_eq!(multiplicity("TRIPLET"), Some(BirthMultiplicity::Multiple));
    assert_eq!(multiplicity("BOTH"), Some(BirthMultiplicity::Multiple));
}

#[test]
fn test_custom_rule_overrides_default() {
    let classifier = BirthClassifier::without_rules().with_rule(|episodes: &[HospitalEpisode]| {
        (episodes.len() > 1).then_some(BirthMultiplicity::Twin)
    });
    let output = NicuPipeline::new()
        .with_classifier(classifier)
        .run(
            vec![
                ClaimBuilder::new("C1", "P1", day(0), day(2)).diagnosis("Z38.30").build(),
                ClaimBuilder::new("C2", "P2", day(0), day(2)).diagnosis("Z38.00").build(),
                ClaimBuilder::new("C3", "P2", day(20), day(22)).build(),
            ],
            &reference_index(),
            &test_config(),
        )
        .unwrap();

    assert_eq!(output.newborns[0].multiplicity, BirthMultiplicity::Single);
    assert_eq!(output.newborns[1].multiplicity, BirthMultiplicity::Twin);
}

#[test]
fn test_every_newborn_has_one_category_per_dimension() {
    let claims = (0..40u64)
        .map(|i| {
            let id = format!("P{i:02}");
            let admit = day(i * 3);
            let mut builder = ClaimBuilder::new(&format!("C{i}"), &id, admit, day(i * 3 + i % 7));
            builder = match i % 4 {
                0 => builder.diagnosis("Z38.00"),
                1 => builder.diagnosis("Z38.30").revenue("0173"),
                2 => builder.diagnosis("Z38.61").apr_drg("602"),
                _ => builder.revenue("0170"),
            };
            builder.build()
        })
        .collect();
    let output = run(claims);

    let newborns = &output.newborns;
    assert_eq!(newborns.len(), 40);
    let nicu = newborns.iter().filter(|n| n.baby_type == BabyType::Nicu).count();
    let normal = newborns.iter().filter(|n| n.baby_type == BabyType::Normal).count();
    assert_eq!(nicu + normal, newborns.len());
    assert_eq!(nicu, 20);

    let by_multiplicity = [BirthMultiplicity::Single, BirthMultiplicity::Twin, BirthMultiplicity::Multiple]
        .iter()
        .map(|m| newborns.iter().filter(|n| n.multiplicity == *m).count())
        .sum::<usize>();
    assert_eq!(by_multiplicity, newborns.len());

    let by_period = newborns
        .iter()
        .filter(|n| matches!(n.study_period, StudyPeriod::Previous | StudyPeriod::Current))
        .count();
    assert_eq!(by_period, newborns.len());
}

#[test]
fn test_delivery_before_midpoint_is_previous_period() {
    let output = run(vec![
        ClaimBuilder::newborn("C1", "P1", date(2023, 6, 30), date(2023, 7, 2)).build(),
        ClaimBuilder::newborn("C2", "P2", date(2023, 7, 1), date(2023, 7, 2)).build(),
    ]);

    assert_eq!(output.newborns[0].study_period, StudyPeriod::Previous);
    assert_eq!(output.newborns[1].study_period, StudyPeriod::Current);
}
