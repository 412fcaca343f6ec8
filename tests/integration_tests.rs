use calamine::{open_workbook_auto_from_rs, Data, Reader};
use payroll_etl::{
    CliConfig, DecimalPolicy, EtlEngine, EtlError, LocalStorage, PayrollPipeline, TimeFormat,
};
use rust_xlsxwriter::{Format, Workbook};
use std::io::Cursor;
use tempfile::TempDir;

const SOURCE_HEADERS: [&str; 14] = [
    "Farm name",
    "Date",
    "Worker ID",
    "Job Name",
    "Job Tags",
    "Block name",
    "Piece Name",
    "Clock-In ",
    "Clock-Out",
    "# Hours",
    "Price $/hr",
    "Price $/piece",
    "# Pieces",
    "Cost per pieces ($)",
];

const OUTPUT_HEADERS: [&str; 14] = [
    "Farm Name",
    "Date",
    "Worker ID",
    "Job Name",
    "Job Tag",
    "Block Name",
    "Piece Name",
    "Rounded Clock-in",
    "Rounded Clock-out",
    "# Hours",
    "Cost per Hour",
    "Price Piece",
    "# of Pieces",
    "Cost per Pieces",
];

const PAYROLL_CSV: &str = "\
Farm name,Date,Worker ID,Job Name,Job Tags,Block name,Piece Name,Clock-In ,Clock-Out,# Hours,Price $/hr,Price $/piece,# Pieces,Cost per pieces ($)
North Ridge,2024-03-05,W-104,Picking,harvest,B7,Bin,08:07,17:08,9.02,16.5,0.75,40,30
North Ridge,03/05/2024,W-105,Picking,harvest,B7,Bin,22:00,02:00,4,16.5,0.75,12,9
North Ridge,2024-03-05,W-106,Pruning,,B2,Vine,06:53,,,16.5,0,0,0
";

fn cli_config(input: &str, output: Option<&str>) -> CliConfig {
    CliConfig {
        input: input.to_string(),
        output: output.map(str::to_string),
        sheet: "9. Payroll".to_string(),
        interval: 15,
        decimals: DecimalPolicy::All,
        time_format: TimeFormat::TwentyFourHour,
        verbose: false,
        monitor: false,
        json: false,
    }
}

fn payroll_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("mm/dd/yyyy");
    let clock_format = Format::new().set_num_format("hh:mm");

    let sheet = workbook.add_worksheet();
    sheet.set_name("9. Payroll").unwrap();
    for (col, header) in SOURCE_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    // 2024-03-05, 21:40 → 06:20
    sheet.write_string(1, 0, "South Flat").unwrap();
    sheet.write_number_with_format(1, 1, 45356.0, &date_format).unwrap();
    sheet.write_string(1, 2, "W-300").unwrap();
    sheet.write_string(1, 3, "Packing").unwrap();
    sheet.write_string(1, 5, "Shed").unwrap();
    sheet.write_string(1, 6, "Tray").unwrap();
    sheet
        .write_number_with_format(1, 7, 1300.0 / 1440.0, &clock_format)
        .unwrap();
    sheet
        .write_number_with_format(1, 8, 380.0 / 1440.0, &clock_format)
        .unwrap();
    sheet.write_number(1, 9, 8.67).unwrap();
    sheet.write_number(1, 10, 18.0).unwrap();
    sheet.write_number(1, 12, 0.0).unwrap();

    workbook.save_to_buffer().unwrap()
}

#[tokio::test]
async fn test_end_to_end_csv_rounding() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("payroll.csv"), PAYROLL_CSV).unwrap();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = PayrollPipeline::new(storage, cli_config("payroll.csv", None));
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let outcome = engine.run().await.unwrap();

    assert_eq!(outcome.output_path, "processed_payroll.csv");
    assert_eq!(outcome.stats.rows, 3);
    assert_eq!(outcome.stats.open_shifts, 1);
    assert_eq!(outcome.stats.overnight_shifts, 1);
    assert_eq!(outcome.stats.missing_hours, 0);
    assert!((outcome.stats.total_hours - 13.25).abs() < 1e-9);

    let written =
        std::fs::read_to_string(temp_dir.path().join("processed_payroll.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], OUTPUT_HEADERS.join(","));
    assert_eq!(
        lines[1],
        "North Ridge,03/05/2024,W-104,Picking,harvest,B7,Bin,08:00:00,17:15:00,9.25,16.5,0.75,40,30"
    );
    assert_eq!(
        lines[2],
        "North Ridge,03/05/2024,W-105,Picking,harvest,B7,Bin,22:00:00,02:00:00,4.0,16.5,0.75,12,9"
    );
    assert_eq!(
        lines[3],
        "North Ridge,03/05/2024,W-106,Pruning,,B2,Vine,07:00:00,,0.0,16.5,0,0,0"
    );
}

#[tokio::test]
async fn test_decimal_places_and_twelve_hour_output() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("payroll.csv"),
        "\
Farm name,Date,Worker ID,Job Name,Job Tags,Block name,Piece Name,Clock-In ,Clock-Out,# Hours,Price $/hr,Price $/piece,# Pieces,Cost per pieces ($)
North Ridge,2024-03-05,W-104,Picking,,B7,Bin,08:00,16:20,,16.5,,,
",
    )
    .unwrap();

    let mut config = cli_config("payroll.csv", Some("out/rounded.csv"));
    config.interval = 20;
    config.decimals = DecimalPolicy::Places(1);
    config.time_format = TimeFormat::TwelveHour;

    let storage = LocalStorage::new(temp_dir.path());
    let engine = EtlEngine::new(PayrollPipeline::new(storage, config));
    let outcome = engine.run().await.unwrap();

    assert_eq!(outcome.output_path, "out/rounded.csv");
    let written = std::fs::read_to_string(temp_dir.path().join("out/rounded.csv")).unwrap();
    let row = written.lines().nth(1).unwrap();
    assert_eq!(
        row,
        "North Ridge,03/05/2024,W-104,Picking,,B7,Bin,08:00:00 AM,04:20:00 PM,8.3,16.5,,,"
    );
}

#[tokio::test]
async fn test_end_to_end_workbook_rounding() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("payroll.xlsx"), payroll_workbook()).unwrap();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = PayrollPipeline::new(storage, cli_config("payroll.xlsx", None));
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(outcome.output_path, "processed_payroll.xlsx");
    assert_eq!(outcome.stats.overnight_shifts, 1);

    let bytes = std::fs::read(temp_dir.path().join("processed_payroll.xlsx")).unwrap();
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1"]);

    let range = workbook.worksheet_range("Sheet1").unwrap();
    let rows: Vec<&[Data]> = range.rows().collect();
    assert_eq!(rows.len(), 2);

    let headers: Vec<String> = rows[0].iter().map(|cell| cell.to_string()).collect();
    assert_eq!(headers, OUTPUT_HEADERS);

    let record = rows[1];
    assert_eq!(record[0], Data::String("South Flat".to_string()));
    assert_eq!(record[1], Data::String("03/05/2024".to_string()));
    // 21:40 → 21:45, 06:20 → 06:15
    assert!(matches!(&record[7], Data::DateTime(dt) if (dt.as_f64() - 1305.0 / 1440.0).abs() < 1e-9));
    assert!(matches!(&record[8], Data::DateTime(dt) if (dt.as_f64() - 375.0 / 1440.0).abs() < 1e-9));
    assert_eq!(record[9], Data::Float(8.5));
    assert_eq!(record[10], Data::Float(18.0));
}

#[tokio::test]
async fn test_missing_columns_are_all_reported() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("payroll.csv"),
        "\
Farm name,Date,Job Name,Job Tags,Block name,Piece Name,Clock-In ,Clock-Out,# Hours,Price $/hr,Price $/piece,Cost per pieces ($)
North Ridge,2024-03-05,Picking,,B7,Bin,08:00,16:00,8,16.5,,
",
    )
    .unwrap();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = PayrollPipeline::new(storage, cli_config("payroll.csv", None));

    match EtlEngine::new(pipeline).run().await {
        Err(EtlError::SchemaError { missing }) => {
            assert_eq!(missing, vec!["Worker ID", "# Pieces"]);
        }
        other => panic!("expected SchemaError, got {:?}", other.map(|o| o.output_path)),
    }
    assert!(!temp_dir.path().join("processed_payroll.csv").exists());
}

#[tokio::test]
async fn test_clock_in_header_without_trailing_space_is_missing() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("payroll.csv"),
        PAYROLL_CSV.replacen("Clock-In ,", "Clock-In,", 1),
    )
    .unwrap();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = PayrollPipeline::new(storage, cli_config("payroll.csv", None));

    assert!(matches!(
        EtlEngine::new(pipeline).run().await,
        Err(EtlError::SchemaError { missing }) if missing == vec!["Clock-In ".to_string()]
    ));
}

#[tokio::test]
async fn test_bad_date_aborts_the_batch() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("payroll.csv"),
        PAYROLL_CSV.replacen("03/05/2024", "someday", 1),
    )
    .unwrap();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = PayrollPipeline::new(storage, cli_config("payroll.csv", None));

    match EtlEngine::new(pipeline).run().await {
        Err(EtlError::DateParseError { row, value }) => {
            assert_eq!(row, 3);
            assert_eq!(value, "someday");
        }
        other => panic!("expected DateParseError, got {:?}", other.map(|o| o.output_path)),
    }
    assert!(!temp_dir.path().join("processed_payroll.csv").exists());
}

#[tokio::test]
async fn test_missing_sheet_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("payroll.xlsx"), payroll_workbook()).unwrap();

    let mut config = cli_config("payroll.xlsx", None);
    config.sheet = "Payroll".to_string();
    let storage = LocalStorage::new(temp_dir.path());
    let result = EtlEngine::new(PayrollPipeline::new(storage, config)).run().await;

    assert!(matches!(result, Err(EtlError::SheetNotFound { .. })));
}
