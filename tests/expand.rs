use spb_dashboard::expand::{self, CATALOG_RULES, expand_rows};
use spb_dashboard::model::{RawRow, SuccessRecord};

const HEADER: [&str; 5] = ["Timestamp", "Mensagem", "Status", "Detalhes", "Catalogo"];

fn row(cells: &[&str]) -> RawRow {
    cells.iter().map(|cell| cell.to_string()).collect()
}

fn sheet(rows: &[&[&str]]) -> Vec<RawRow> {
    let mut all = vec![row(&HEADER)];
    all.extend(rows.iter().map(|cells| row(cells)));
    all
}

#[test]
fn header_only_or_empty_input_yields_nothing() {
    assert!(expand_rows(&[]).is_empty());
    assert!(expand_rows(&[row(&HEADER)]).is_empty());
    // A single successful-looking row is still treated as the header.
    assert!(expand_rows(&[row(&["t1", "STR0012", "sucesso", "ok", ""])]).is_empty());
}

#[test]
fn nupag_catalog_generates_r2_after_primary() {
    let records = expand_rows(&sheet(&[&[
        "t1",
        "STR0012",
        "sucesso",
        "ok",
        "TrocaDeCatalagoNuPag",
    ]]));

    assert_eq!(
        records,
        vec![
            SuccessRecord {
                timestamp: "t1".into(),
                message_code: "STR0012".into(),
                status: "sucesso".into(),
                details: "ok".into(),
                catalog_code: "trocadecatalagonupag".into(),
                generated: false,
            },
            SuccessRecord {
                timestamp: "t1".into(),
                message_code: "STR0012R2".into(),
                status: "sucesso".into(),
                details: "R2 gerado por trocadecatalagonupag".into(),
                catalog_code: "trocadecatalagonupag".into(),
                generated: true,
            },
        ]
    );
}

#[test]
fn nupag_exclusions_produce_no_r2() {
    for code in ["STR0010", "STR0013"] {
        let row: &[&str] = &["t1", code, "sucesso", "ok", "trocadecatalagonupag"];
        let records = expand_rows(&sheet(&[row]));
        assert_eq!(records.len(), 1, "{code} must not be expanded");
        assert!(!records[0].generated);
    }
}

#[test]
fn nufin_and_nuinvest_expand_every_str_code() {
    for catalog in ["trocadecatalagonufin", "TROCADECATALAGONUINVEST"] {
        let records = expand_rows(&sheet(&[
            &["t1", "STR0010", "sucesso", "ok", catalog],
            &["t2", "STR0013", "sucesso", "ok", catalog],
        ]));
        let codes: Vec<&str> = records.iter().map(|r| r.message_code.as_str()).collect();
        assert_eq!(codes, ["STR0010", "STR0010R2", "STR0013", "STR0013R2"]);
    }
}

#[test]
fn non_str_codes_are_never_expanded() {
    let records = expand_rows(&sheet(&[
        &["t1", "LPI0001", "sucesso", "ok", "trocadecatalagonufin"],
        &["t2", "SME0002", "sucesso", "ok", "trocadecatalagonupag"],
        &["t3", "str0012", "sucesso", "ok", "trocadecatalagonuinvest"],
    ]));
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|record| !record.generated));
}

#[test]
fn unknown_or_missing_catalog_produces_no_r2() {
    let records = expand_rows(&sheet(&[
        &["t1", "STR0012", "sucesso", "ok", "outrocatalogo"],
        &["t2", "STR0012", "sucesso", "ok"],
    ]));
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].catalog_code, "");
    assert!(records.iter().all(|record| !record.generated));
}

#[test]
fn failed_and_short_rows_are_skipped() {
    let records = expand_rows(&sheet(&[
        &["t1", "STR0012", "Erro", "falhou", "trocadecatalagonupag"],
        &["t2", "STR0012"],
        &[],
        &["t3", "STR0020", "SUCESSO"],
        &["t4", "STR0021", "Sucesso", "ok", "trocadecatalagonufin"],
    ]));

    let codes: Vec<&str> = records.iter().map(|r| r.message_code.as_str()).collect();
    assert_eq!(codes, ["STR0020", "STR0021", "STR0021R2"]);
    // Status and details are copied verbatim; missing cells become empty.
    assert_eq!(records[0].status, "SUCESSO");
    assert_eq!(records[0].details, "");
    assert_eq!(records[1].status, "Sucesso");
}

#[test]
fn rows_keep_spreadsheet_order() {
    let records = expand_rows(&sheet(&[
        &["2024-01-03", "STR0001", "sucesso", "", "trocadecatalagonufin"],
        &["2024-01-01", "LPI0001", "sucesso", "", ""],
        &["2024-01-02", "STR0002", "sucesso", "", "trocadecatalagonupag"],
    ]));
    let codes: Vec<&str> = records.iter().map(|r| r.message_code.as_str()).collect();
    assert_eq!(codes, ["STR0001", "STR0001R2", "LPI0001", "STR0002", "STR0002R2"]);
}

#[test]
fn expansion_is_deterministic() {
    let rows = sheet(&[
        &["t1", "STR0012", "sucesso", "ok", "trocadecatalagonupag"],
        &["t2", "LPI0001", "sucesso", "ok", ""],
    ]);
    let first = serde_json::to_string(&expand_rows(&rows)).unwrap();
    let second = serde_json::to_string(&expand_rows(&rows)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn generated_flag_is_serialized_only_when_true() {
    let row: &[&str] = &["t1", "STR0012", "sucesso", "ok", "trocadecatalagonupag"];
    let records = expand_rows(&sheet(&[row]));
    let json = serde_json::to_value(&records).unwrap();
    assert!(json[0].get("generated").is_none());
    assert_eq!(json[1]["generated"], serde_json::Value::Bool(true));
}

#[test]
fn every_rule_is_reachable_by_lookup() {
    for rule in CATALOG_RULES {
        assert_eq!(expand::rule_for(rule.catalog), Some(rule));
    }
    assert!(expand::rule_for("").is_none());
}
