use jiff::Timestamp;
use jiff::civil::date;
use psyscale_core::models::{Answers, Gender, Patient, ScaleResponse};
use psyscale_export::docx::generate_docx;
use psyscale_export::render::{ReportFormat, ReportRenderer};
use psyscale_export::styles::DocumentStyles;
use psyscale_instruments::get_instrument;
use psyscale_instruments::interpretation::generate;
use psyscale_instruments::lookup::NormTables;
use psyscale_instruments::scoring::ScoringContext;
use uuid::Uuid;

fn patient(name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        gender: Some(Gender::Female),
        birthday: date(1990, 7, 15),
        started_at: None,
        email: "p@example.com".to_string(),
        cpf: "12345678901".to_string(),
        rg: None,
        phone: None,
        address: None,
        deleted_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

fn scored(p: &Patient, code: &str, items: u16, value: &str) -> ScaleResponse {
    let answers: Answers = (1..=items)
        .map(|n| (format!("item_{n}"), value.to_string()))
        .collect();
    let norms = NormTables::empty();
    let ctx = ScoringContext {
        patient: Some(p),
        today: date(2024, 6, 1),
        computed_at: Timestamp::UNIX_EPOCH,
        norms: &norms,
    };
    let results = get_instrument(code).unwrap().score(&answers, &ctx);
    let completed_at: Timestamp = "2024-05-20T14:00:00Z".parse().unwrap();
    ScaleResponse {
        id: Uuid::new_v4(),
        scale_request_id: Uuid::new_v4(),
        patient_id: p.id,
        scale_id: Uuid::new_v4(),
        scale_code: code.to_string(),
        answers,
        total_score: Some(results.total_score()),
        interpretation: Some(results.headline()),
        results,
        relator_name: None,
        relator_relationship: None,
        completed_at,
        deleted_at: None,
        created_at: completed_at,
        updated_at: completed_at,
    }
}

#[test]
fn srs2_markdown_report() {
    let p = patient("Beatriz Nunes");
    let response = scored(&p, "SRS2SR", 65, "2");
    let report = generate(&response, &p, &[]).unwrap();

    let renderer = ReportRenderer::new().unwrap();
    let md = renderer
        .render(&report, &p, date(2024, 6, 1), ReportFormat::Markdown)
        .unwrap();

    assert!(md.starts_with("# Relatório de Interpretação SRS-2"));
    assert!(md.contains("**Paciente:** Beatriz Nunes"));
    assert!(md.contains("**Idade:** 33 anos"));
    assert!(md.contains("**Formulário:** Autorrelato"));
    assert!(md.contains("**Concluído em:** 20/05/2024"));
    assert!(md.contains("**Emitido em:** 01/06/2024"));
    // No norm tables: scores are absent.
    assert!(md.contains("- Escore T: N/A"));
    assert!(md.contains("- Classificação: Pontuação inválida"));
    assert!(md.contains("| Percepção Social | N/A | N/A | Pontuação inválida |"));
    assert!(md.contains("### Interação Social Global"));
    assert!(md.contains("Beatriz obteve como pontuação total nesse instrumento N/A pontos"));
    assert!(!md.contains("Autorrelato x Heterorrelato"));
}

#[test]
fn psa_html_report_escapes_user_text() {
    let p = patient("Ana <b>Lima</b>");
    let response = scored(&p, "PSA", 60, "5");
    let report = generate(&response, &p, &[]).unwrap();

    let renderer = ReportRenderer::new().unwrap();
    let html = renderer
        .render(&report, &p, date(2024, 6, 1), ReportFormat::Html)
        .unwrap();

    assert!(html.contains("<h1>Relatório de Interpretação PSA</h1>"));
    assert!(html.contains("Ana &lt;b&gt;Lima&lt;&#x2F;b&gt;"));
    assert!(!html.contains("<b>Lima</b>"));
    assert!(html.contains("Pontuação total: 300/300"));
    assert!(html.contains("Estratégias para Alta Responsividade Sensorial"));
}

#[test]
fn psa_markdown_lists_recommendations() {
    let p = patient("Ana Lima");
    let response = scored(&p, "PSA", 60, "1");
    let report = generate(&response, &p, &[]).unwrap();

    let md = ReportRenderer::new()
        .unwrap()
        .render(&report, &p, date(2024, 6, 1), ReportFormat::Markdown)
        .unwrap();
    assert!(md.contains("- Perfil: Padrão de baixa responsividade sensorial"));
    assert!(md.contains("### Estratégias para Baixa Responsividade Sensorial"));
    assert!(md.contains("- Manter um diário sensorial para identificar padrões"));
    assert!(md.contains("| A. Processamento Tátil/Olfativo | 8 |"));
}

#[test]
fn docx_from_rendered_report() {
    let p = patient("Beatriz Nunes");
    let response = scored(&p, "SRS2SR", 65, "3");
    let report = generate(&response, &p, &[]).unwrap();
    let md = ReportRenderer::new()
        .unwrap()
        .render(&report, &p, date(2024, 6, 1), ReportFormat::Markdown)
        .unwrap();

    let bytes = generate_docx(&md, &DocumentStyles::default()).unwrap();
    // DOCX is a zip archive.
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn docx_handles_tables_bold_and_unmatched_markers() {
    let md = "# Título\n\n**Negrito** e normal\n\nsem **fecho\n\n| A | B |\n| --- | --- |\n| 1 | 2 |\n\n- item\n---\nfim";
    let bytes = generate_docx(md, &DocumentStyles::default()).unwrap();
    assert!(bytes.len() > 100);
}
