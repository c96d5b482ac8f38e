use jiff::civil::date;
use jiff::{Timestamp, ToSpan};
use psyscale_core::models::{
    Answers, Gender, Patient, ResultsHeader, ScaleResponse, ScaleResults, Srs2Interpretation,
    Srs2Level, Srs2Metrics, Srs2Results, Srs2Subscale,
};
use psyscale_instruments::error::InstrumentError;
use psyscale_instruments::get_instrument;
use psyscale_instruments::instruments::srs2::SUBSCALES;
use psyscale_instruments::interpretation::psa::{PsaReport, interpret, recommendations};
use psyscale_instruments::interpretation::srs2::{
    Srs2Report, comparison_rows, find_counterpart, hetero_report_text, hetero_reports,
    impairment_level, introduction, level_plural, self_report_text,
};
use psyscale_instruments::interpretation::text::{capitalize, join_list, titleize};
use psyscale_instruments::interpretation::{InterpretationReport, generate, supports};
use psyscale_instruments::lookup::NormTables;
use psyscale_instruments::scoring::ScoringContext;
use uuid::Uuid;

fn patient(name: &str, gender: Gender) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        gender: Some(gender),
        birthday: date(1995, 5, 20),
        started_at: None,
        email: "paciente@example.com".to_string(),
        cpf: "11122233344".to_string(),
        rg: None,
        phone: None,
        address: None,
        deleted_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

/// SRS-2 results with the given subscale T-scores, in catalog order:
/// awareness, cognition, communication, motivation, restricted, interaction.
fn srs2_results(subscale_t: [Option<i32>; 6], total_t: Option<i32>) -> ScaleResults {
    let subscales = SUBSCALES
        .iter()
        .zip(subscale_t)
        .map(|(def, t)| Srs2Subscale {
            key: def.key.to_string(),
            title: def.title.to_string(),
            raw_score: 10,
            t_score: t,
            percentile: None,
            level: Srs2Level::from_t_score(t),
            description: def.description.to_string(),
            interpretation: String::new(),
            items: def.items.to_vec(),
        })
        .collect();
    let level = Srs2Level::from_t_score(total_t);
    ScaleResults::Srs2(Srs2Results {
        header: ResultsHeader::new("SRS-2", "2.0", Timestamp::UNIX_EPOCH),
        metrics: Srs2Metrics {
            raw_score: 80,
            t_score: total_t,
            percentile: None,
            level,
            level_plural: level.plural().to_string(),
        },
        subscales,
        interpretation: Srs2Interpretation {
            level,
            rules: String::new(),
            description: level.description().to_string(),
            total_range: "65-260".to_string(),
            items_count: 65,
        },
    })
}

fn response(
    code: &str,
    patient_id: Uuid,
    results: ScaleResults,
    completed_at: Timestamp,
    relator: Option<(&str, &str)>,
) -> ScaleResponse {
    ScaleResponse {
        id: Uuid::new_v4(),
        scale_request_id: Uuid::new_v4(),
        patient_id,
        scale_id: Uuid::new_v4(),
        scale_code: code.to_string(),
        answers: Answers::new(),
        total_score: Some(results.total_score()),
        interpretation: Some(results.headline()),
        results,
        relator_name: relator.map(|(n, _)| n.to_string()),
        relator_relationship: relator.map(|(_, r)| r.to_string()),
        completed_at,
        deleted_at: None,
        created_at: completed_at,
        updated_at: completed_at,
    }
}

fn mixed_self_report(patient_id: Uuid) -> ScaleResponse {
    response(
        "SRS2SR",
        patient_id,
        srs2_results(
            [Some(50), Some(60), Some(80), Some(52), Some(70), Some(66)],
            Some(68),
        ),
        Timestamp::UNIX_EPOCH,
        None,
    )
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

#[test]
fn text_helpers() {
    assert_eq!(titleize("joão  DA silva"), "João Da Silva");
    assert_eq!(capitalize("éLIDA"), "Élida");
    assert_eq!(capitalize(""), "");
    assert_eq!(join_list::<&str>(&[]), "");
    assert_eq!(join_list(&["a"]), "a");
    assert_eq!(join_list(&["a", "b"]), "a e b");
    assert_eq!(join_list(&["a", "b", "c"]), "a, b e c");
}

// ---------------------------------------------------------------------------
// SRS-2 domain ordering
// ---------------------------------------------------------------------------

#[test]
fn domains_list_impaired_first() {
    let r = mixed_self_report(Uuid::new_v4());
    let report = Srs2Report::new(&r).unwrap();
    let keys: Vec<String> = report.domains().into_iter().map(|d| d.key).collect();
    assert_eq!(
        keys,
        [
            "social_cognition",
            "social_communication",
            "restricted_interests",
            "social_interaction",
            "social_awareness",
            "social_motivation",
        ]
    );
    assert_eq!(
        report.print_domains(Srs2Level::Moderado),
        "Interesses Restritos e Comportamentos Repetitivos e Interação Social Global"
    );
    assert_eq!(report.print_domains(Srs2Level::Severo), "Comunicação Social");
}

#[test]
fn domain_ladders() {
    let r = mixed_self_report(Uuid::new_v4());
    let report = Srs2Report::new(&r).unwrap();

    assert_eq!(report.worst_domain().unwrap().key, "social_communication");
    assert_eq!(report.lowest_domain().unwrap().key, "social_cognition");
    assert_eq!(report.second_highest_domain().unwrap().key, "restricted_interests");
    assert_eq!(report.second_worst_domain().unwrap().key, "restricted_interests");
}

#[test]
fn ladder_ties_keep_display_order() {
    let r = response(
        "SRS2SR",
        Uuid::new_v4(),
        srs2_results(
            [Some(70), Some(70), Some(50), Some(50), Some(50), Some(50)],
            Some(60),
        ),
        Timestamp::UNIX_EPOCH,
        None,
    );
    let report = Srs2Report::new(&r).unwrap();
    assert_eq!(report.worst_domain().unwrap().key, "social_awareness");
    assert_eq!(report.second_worst_domain().unwrap().key, "social_cognition");
}

#[test]
fn report_rejects_non_srs2_response() {
    let results = ScaleResults::Summed(psyscale_core::models::SummedResults {
        header: ResultsHeader::new("BDI", "1.0", Timestamp::UNIX_EPOCH),
        total: 3,
        interpretation: "Pontuação total: 3".to_string(),
    });
    let r = response("BDI", Uuid::new_v4(), results, Timestamp::UNIX_EPOCH, None);
    assert!(matches!(
        Srs2Report::new(&r),
        Err(InstrumentError::ResultsMismatch(_))
    ));
}

// ---------------------------------------------------------------------------
// SRS-2 narrative
// ---------------------------------------------------------------------------

#[test]
fn impairment_level_falls_back_to_severe() {
    assert_eq!(impairment_level(Some(54)), Srs2Level::Normal);
    assert_eq!(impairment_level(Some(55)), Srs2Level::Leve);
    assert_eq!(impairment_level(Some(74)), Srs2Level::Moderado);
    assert_eq!(impairment_level(Some(90)), Srs2Level::Severo);
    assert_eq!(impairment_level(Some(101)), Srs2Level::Severo);
    assert_eq!(impairment_level(None), Srs2Level::Severo);
    assert_eq!(
        level_plural(Srs2Level::Normal),
        "ausência de prejuízos significativos"
    );
}

#[test]
fn introduction_mentions_total_and_level() {
    let p = patient("joão silva", Gender::Male);
    let r = mixed_self_report(p.id);
    let report = Srs2Report::new(&r).unwrap();
    let text = introduction(&p, &report);
    assert!(text.starts_with("João Silva respondeu à Escala SRS-2"), "{text}");
    assert!(
        text.contains("João obteve como pontuação total nesse instrumento 68 pontos, caracterizando prejuízos moderados"),
        "{text}"
    );
}

#[test]
fn introduction_without_t_score() {
    let p = patient("ana lima", Gender::Female);
    let r = response(
        "SRS2SR",
        p.id,
        srs2_results([None; 6], None),
        Timestamp::UNIX_EPOCH,
        None,
    );
    let report = Srs2Report::new(&r).unwrap();
    let text = introduction(&p, &report);
    assert!(text.contains("N/A pontos, caracterizando prejuízos severos"), "{text}");
}

#[test]
fn self_report_lists_impaired_domains() {
    let p = patient("joão silva", Gender::Male);
    let r = mixed_self_report(p.id);
    let report = Srs2Report::new(&r).unwrap();
    assert_eq!(
        self_report_text(&p, &report),
        "João apresenta dificuldades nos seguintes domínios: Cognição Social, Comunicação Social, \
         Interesses Restritos e Comportamentos Repetitivos e Interação Social Global."
    );

    let clean = response(
        "SRS2SR",
        p.id,
        srs2_results([Some(45); 6], Some(45)),
        Timestamp::UNIX_EPOCH,
        None,
    );
    let report = Srs2Report::new(&clean).unwrap();
    assert_eq!(
        self_report_text(&p, &report),
        "João não apresenta dificuldades significativas nos domínios avaliados."
    );
}

#[test]
fn hetero_report_narrative() {
    let p = patient("joão silva", Gender::Male);
    let r = response(
        "SRS2HR",
        p.id,
        srs2_results(
            [Some(50), Some(50), Some(50), Some(50), Some(70), Some(50)],
            Some(58),
        ),
        Timestamp::UNIX_EPOCH,
        Some(("maria souza", "Mãe")),
    );
    let report = Srs2Report::new(&r).unwrap();
    let text = hetero_report_text(&p, &report);

    assert!(text.starts_with(
        "De acordo com maria souza, que é mãe do paciente, João apresenta prejuízos leves de forma geral"
    ), "{text}");
    assert!(text.contains(
        " Interesses Restritos e Comportamentos Repetitivos foi classificado por Maria em nível moderado, identificando claramente uma área de dificuldade."
    ), "{text}");
    assert!(text.contains(
        " Maria não observou necessidades significativas em relação a Percepção Social, Cognição Social, Comunicação Social, Motivação Social e Interação Social Global."
    ), "{text}");
    assert!(!text.contains("nível severo"));
}

#[test]
fn hetero_report_severe_domains_for_female_patient() {
    let p = patient("ana lima", Gender::Female);
    let r = response(
        "SRS2HR",
        p.id,
        srs2_results(
            [Some(80), Some(85), Some(60), Some(50), Some(50), Some(50)],
            Some(78),
        ),
        Timestamp::UNIX_EPOCH,
        Some(("Pedro", "Pai")),
    );
    let report = Srs2Report::new(&r).unwrap();
    let text = hetero_report_text(&p, &report);
    assert!(text.contains("que é pai da paciente"), "{text}");
    assert!(text.contains(
        " Destacaram-se Percepção Social e Cognição Social como pontos em que a paciente apresenta nível severo de prejuízo"
    ), "{text}");
    assert!(text.contains(" Em sua visão, Ana demonstra algumas dificuldades nos domínios de Comunicação Social."));
}

#[test]
fn hetero_report_without_relator_is_empty() {
    let p = patient("joão silva", Gender::Male);
    let r = response(
        "SRS2HR",
        p.id,
        srs2_results([Some(70); 6], Some(70)),
        Timestamp::UNIX_EPOCH,
        Some(("  ", "Mãe")),
    );
    let report = Srs2Report::new(&r).unwrap();
    assert_eq!(hetero_report_text(&p, &report), "");
}

// ---------------------------------------------------------------------------
// Counterparts and comparison
// ---------------------------------------------------------------------------

#[test]
fn counterpart_is_the_latest_opposite_form() {
    let p = patient("joão silva", Gender::Male);
    let base = Timestamp::UNIX_EPOCH;
    let self_report = mixed_self_report(p.id);
    let older = response(
        "SRS2HR",
        p.id,
        srs2_results([Some(50); 6], Some(50)),
        base + 1.hour(),
        Some(("Maria", "Mãe")),
    );
    let newer = response(
        "SRS2HR",
        p.id,
        srs2_results([Some(60); 6], Some(60)),
        base + 2.hours(),
        Some(("Pedro", "Pai")),
    );
    let other_patient = response(
        "SRS2HR",
        Uuid::new_v4(),
        srs2_results([Some(60); 6], Some(60)),
        base + 3.hours(),
        Some(("Pedro", "Pai")),
    );
    let history = vec![older.clone(), newer.clone(), other_patient, self_report.clone()];

    let found = find_counterpart(&self_report, &history).unwrap();
    assert_eq!(found.id, newer.id);

    let found = find_counterpart(&newer, &history).unwrap();
    assert_eq!(found.id, self_report.id);

    let listed: Vec<Uuid> = hetero_reports(p.id, &history).iter().map(|r| r.id).collect();
    assert_eq!(listed, [newer.id, older.id]);
}

#[test]
fn comparison_rows_subtract_self_from_hetero() {
    let self_r = srs2_results(
        [Some(50), Some(60), Some(80), Some(52), Some(70), Some(66)],
        Some(68),
    );
    let hetero_r = srs2_results(
        [Some(55), Some(60), Some(70), None, Some(75), Some(60)],
        Some(72),
    );
    let rows = comparison_rows(self_r.as_srs2().unwrap(), hetero_r.as_srs2().unwrap());

    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0].label, "Percepção Social");
    assert_eq!(rows[0].difference, Some(5));
    assert_eq!(rows[2].difference, Some(-10));
    assert_eq!(rows[3].difference, None);
    assert_eq!(rows[3].hetero_level, Srs2Level::Invalid);
    assert_eq!(rows[4].label, "Interesses Restritos/Repetitivos");
    assert_eq!(rows[6].key, "total");
    assert_eq!(rows[6].difference, Some(4));
    assert_eq!(rows[6].hetero_level, Srs2Level::Moderado);
}

#[test]
fn generate_srs2_with_counterpart() {
    let p = patient("joão silva", Gender::Male);
    let self_report = mixed_self_report(p.id);
    let hetero = response(
        "SRS2HR",
        p.id,
        srs2_results([Some(60); 6], Some(60)),
        Timestamp::UNIX_EPOCH + 1.hour(),
        Some(("Maria", "Mãe")),
    );
    let history = vec![self_report.clone(), hetero.clone()];

    let report = generate(&self_report, &p, &history).unwrap();
    let InterpretationReport::Srs2 {
        report,
        counterpart,
        hetero_reports,
        interpretation,
        comparison,
    } = report
    else {
        panic!("expected SRS-2 report");
    };
    assert_eq!(report.response_id, self_report.id);
    assert_eq!(counterpart.unwrap().response_id, hetero.id);
    assert_eq!(hetero_reports.len(), 1);
    assert_eq!(comparison.len(), 7);
    assert!(interpretation.hetero_report.starts_with("De acordo com Maria"));

    let json = serde_json::to_value(
        generate(&self_report, &p, &history).unwrap(),
    )
    .unwrap();
    assert_eq!(json["scale_type"], "srs2");
}

#[test]
fn generate_rejects_unsupported_scales() {
    let p = patient("joão silva", Gender::Male);
    let results = ScaleResults::Summed(psyscale_core::models::SummedResults {
        header: ResultsHeader::new("BDI", "1.0", Timestamp::UNIX_EPOCH),
        total: 3,
        interpretation: "Pontuação total: 3".to_string(),
    });
    let r = response("BDI", p.id, results, Timestamp::UNIX_EPOCH, None);
    assert!(!supports("BDI"));
    assert!(supports("PSA"));
    assert!(matches!(
        generate(&r, &p, &[]),
        Err(InstrumentError::UnsupportedScale(code)) if code == "BDI"
    ));
}

// ---------------------------------------------------------------------------
// PSA
// ---------------------------------------------------------------------------

fn psa_response(p: &Patient, answers: &Answers) -> ScaleResponse {
    let norms = NormTables::empty();
    let ctx = ScoringContext {
        patient: Some(p),
        today: date(2024, 6, 1),
        computed_at: Timestamp::UNIX_EPOCH,
        norms: &norms,
    };
    let results = get_instrument("PSA").unwrap().score(answers, &ctx);
    let mut r = response("PSA", p.id, results, Timestamp::UNIX_EPOCH, None);
    r.answers = answers.clone();
    r
}

#[test]
fn psa_high_profile_interpretation() {
    let p = patient("Ana Lima", Gender::Female);
    let mut answers: Answers = (1..=60u16)
        .map(|n| (format!("item_{n}"), "5".to_string()))
        .collect();
    answers.insert("comment_category_f".to_string(), "Barulho me incomoda".to_string());
    let r = psa_response(&p, &answers);
    let report = PsaReport::new(&r).unwrap();
    let out = interpret(&p, &report);

    assert!(out.narrative.starts_with("Ana Lima respondeu ao Perfil Sensorial"));
    assert!(out.narrative.contains("O perfil geral indica: padrão de alta responsividade sensorial."));
    assert!(out.narrative.contains("Ana demonstra alta responsividade sensorial nas seguintes áreas: Processamento Tátil/Olfativo"));
    assert!(out.narrative.contains("Em Processamento Auditivo, Ana relatou: \"Barulho me incomoda\""));
    assert!(!out.narrative.contains("baixa responsividade em"));

    let titles: Vec<&str> = out.recommendations.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Estratégias para Alta Responsividade Sensorial", "Recomendações Gerais"]
    );

    assert_eq!(out.summary.total_score, "300/300");
    assert_eq!(out.summary.completion_percentage, "100.0%");
    assert_eq!(out.summary.categories_analyzed, 6);
    assert_eq!(out.summary.comments_provided, 1);

    let categories = report.categories();
    assert_eq!(categories[5].comment.as_deref(), Some("Barulho me incomoda"));
    assert_eq!(categories[0].comment, None);
}

#[test]
fn psa_typical_profile_mentions_balanced_areas() {
    let p = patient("Ana Lima", Gender::Female);
    let answers: Answers = (1..=60u16)
        .map(|n| (format!("item_{n}"), "3".to_string()))
        .collect();
    let r = psa_response(&p, &answers);
    let report = PsaReport::new(&r).unwrap();

    assert_eq!(report.completion_percentage(), 60.0);
    assert_eq!(report.balanced_categories().len(), 6);
    let out = interpret(&p, &report);
    assert!(out.narrative.contains("Nas áreas de Processamento Tátil/Olfativo, "));
    assert!(out.narrative.contains(", Ana apresenta responsividade dentro dos padrões típicos."));
    assert_eq!(out.recommendations.len(), 1);
    assert_eq!(out.summary.completion_percentage, "60.0%");
}

#[test]
fn psa_recommendation_blocks() {
    let all = recommendations(true, true);
    assert_eq!(all.len(), 3);
    assert_eq!(all[1].title, "Estratégias para Baixa Responsividade Sensorial");
    assert_eq!(all[1].items.len(), 4);
    assert_eq!(recommendations(false, false).len(), 1);
}

#[test]
fn generate_psa_report() {
    let p = patient("Ana Lima", Gender::Female);
    let answers: Answers = (1..=60u16)
        .map(|n| (format!("item_{n}"), "1".to_string()))
        .collect();
    let r = psa_response(&p, &answers);
    let InterpretationReport::Psa { report, interpretation } = generate(&r, &p, &[]).unwrap()
    else {
        panic!("expected PSA report");
    };
    assert_eq!(report.total_score, 60);
    assert_eq!(report.level, "Padrão de baixa responsividade sensorial");
    assert_eq!(report.categories.len(), 6);
    assert!(interpretation.narrative.contains("Por outro lado, apresenta baixa responsividade em"));
}
