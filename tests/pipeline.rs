use std::io::Cursor;
use std::path::PathBuf;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use deposit_ranker::data::filter::FilterSelection;
use deposit_ranker::data::loader::load_file;
use deposit_ranker::data::month::{MonthLabeler, PivotWindow};
use deposit_ranker::data::pivot::build_ranked_pivot;
use deposit_ranker::data::ranking::rank_clients;
use deposit_ranker::export::{export_pivot, SHEET_NAME};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("deposit-ranker-{}-{name}", std::process::id()))
}

const CSV: &str = "\
Client,Compte,Types de Dépôts,Année,Mois,Dépôts,Désignation
A,A-1,Savings,2024,1,1000,X
A,A-1,Savings,2024,2,2000,X
A,A-1,Savings,2025,4,500,X
B,B-1,Savings,2025,4,1500,X
C,C-1,Savings,2025,4,,X
D,D-1,Savings,2025,4,-20,X
E,E-1,Current,2025,4,900,X
";

#[test]
fn csv_end_to_end() {
    let path = temp_path("deposits.csv");
    std::fs::write(&path, CSV).expect("write csv");
    let ds = load_file(&path, None).expect("load");
    std::fs::remove_file(&path).ok();

    // C (empty amount) and D (negative) are dropped.
    assert_eq!(ds.len(), 5);
    assert_eq!(ds.agencies.iter().collect::<Vec<_>>(), vec!["X"]);

    let ranking = rank_clients(
        &ds,
        &FilterSelection {
            deposit_type: "Savings".into(),
            agency: "X".into(),
            year: 2025,
            month: 4,
        },
        25,
    )
    .expect("ranking");
    let ranked: Vec<(&str, usize)> = ranking
        .rows
        .iter()
        .map(|r| (r.client.as_str(), r.rank))
        .collect();
    assert_eq!(ranked, vec![("B", 1), ("A", 2)]);

    let pivot = build_ranked_pivot(
        &ds,
        "X",
        "Savings",
        &PivotWindow::default(),
        &MonthLabeler::default(),
    )
    .expect("pivot");
    assert_eq!(pivot.rows[0].client, "B");
    assert_eq!(pivot.rows[1].client, "A");
    assert!(pivot.rows[0].cells[0].is_none());
    assert!(pivot.rows[1].cells[0].is_some());
}

#[test]
fn xlsx_round_trip_through_export() {
    let path = temp_path("deposits.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Feuil2").unwrap();
    let headers = ["Client", "Compte", "Types de Dépôts", "Année", "Mois", "Dépôts", "Désignation "];
    for (c, h) in headers.iter().enumerate() {
        sheet.write_string(0, c as u16, *h).unwrap();
    }
    let rows = [
        ("A", 2024.0, 1.0, 1000.0),
        ("A", 2024.0, 2.0, 2000.0),
        ("A", 2025.0, 4.0, 500.0),
        ("B", 2025.0, 4.0, 1500.0),
    ];
    for (i, (client, year, month, amount)) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, *client).unwrap();
        sheet.write_number(r, 1, 7001.0 + i as f64).unwrap();
        sheet.write_string(r, 2, "Savings").unwrap();
        sheet.write_number(r, 3, *year).unwrap();
        sheet.write_number(r, 4, *month).unwrap();
        sheet.write_number(r, 5, *amount).unwrap();
        sheet.write_string(r, 6, "X").unwrap();
    }
    workbook.save(&path).unwrap();

    let ds = load_file(&path, Some("Feuil2")).expect("load");
    assert_eq!(ds.len(), 4);
    assert_eq!(ds.records[0].account, "7001");
    assert!(load_file(&path, Some("Missing")).is_err());
    std::fs::remove_file(&path).ok();

    let bytes = export_pivot(&ds, "X", "Savings", &PivotWindow::default(), &MonthLabeler::default())
        .expect("export")
        .expect("non-empty");

    let mut exported: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("open export");
    let range = exported.worksheet_range(SHEET_NAME).expect("sheet");
    let header: Vec<String> = range
        .rows()
        .next()
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(
        header,
        vec![
            "Client",
            "January 2024 - Rank",
            "January 2024 - Amount",
            "February 2024 - Rank",
            "February 2024 - Amount",
            "April 2025 - Rank",
            "April 2025 - Amount",
        ]
    );

    let first: Vec<Data> = range.rows().nth(1).unwrap().to_vec();
    assert_eq!(first[0], Data::String("B".into()));
    assert_eq!(first[1], Data::Empty);
    assert_eq!(first[5], Data::Float(1.0));
    assert_eq!(first[6], Data::Float(1500.0));

    assert!(export_pivot(&ds, "Nowhere", "Savings", &PivotWindow::default(), &MonthLabeler::default())
        .expect("export")
        .is_none());
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_file(&temp_path("absent.xlsx"), None).is_err());
}
