use crate::support::{card, category, html, listing_page, test_config};
use listing_harvester::export::{
    find_existing_artifact, save_json, ArtifactBook, CellValue, DedupExporter, ExportError,
    JsonKind, AVAILABLE_LABEL, LINK_LABEL,
};
use listing_harvester::site::harvest_categories;
use listing_harvester::OlxSite;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer};

async fn serve_page(server: &MockServer, cards: &[String]) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .respond_with(html(listing_page(cards, None)))
        .mount(server)
        .await;
}

/// Harvests the category once and exports it, like one CLI run
async fn run_once(site: &OlxSite, exporter: &DedupExporter, base_url: &str) -> usize {
    let added = Mutex::new(0);
    let categories = vec![category(base_url, "Електроніка", "elektronika")];

    let report = harvest_categories(site, &categories, Duration::ZERO, |result| {
        let summary = exporter
            .export(&result.records, &result.category.name)
            .expect("export failed");
        *added.lock().unwrap() += summary.added;
    })
    .await;

    assert!(report.success());
    added.into_inner().unwrap()
}

#[tokio::test]
async fn test_repeated_runs_only_add_new_listings() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let base_url = format!("{}/uk", server.uri());
    let config = test_config(&base_url, output.path());
    let site = OlxSite::new(&config).unwrap();
    let exporter = DedupExporter::from_config(&config.output);

    serve_page(
        &server,
        &[
            card("iPhone 13", "iphone-13-ID1", "15 500 грн"),
            card("Samsung S21", "samsung-s21-ID2", "9 999 грн"),
        ],
    )
    .await;
    assert_eq!(run_once(&site, &exporter, &base_url).await, 2);

    // Same listings again, one renamed only by case and spacing, one new
    serve_page(
        &server,
        &[
            card("iPhone 13", "iphone-13-ID1", "14 000 грн"),
            card("  samsung   s21 ", "samsung-s21-ID2", "9 999 грн"),
            card("Pixel 7", "pixel-7-ID3", "11 000 грн"),
        ],
    )
    .await;
    assert_eq!(run_once(&site, &exporter, &base_url).await, 1);

    let artifact = find_existing_artifact(output.path(), "olx", "Електроніка")
        .unwrap()
        .expect("artifact written");
    let book = ArtifactBook::read(&artifact).unwrap();
    let rows = book.sheet("Електроніка").unwrap().data_rows().to_vec();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], CellValue::text("iPhone 13"));
    // First-seen price is kept
    assert_eq!(rows[0][1], CellValue::text("15500"));
    assert_eq!(rows[0][2], CellValue::text(AVAILABLE_LABEL));
    assert_eq!(
        rows[2][3],
        CellValue::Link {
            url: format!("{}/obyavlenie/pixel-7-ID3.html", base_url),
            label: LINK_LABEL.to_string(),
        }
    );

    // Only one artifact file exists for the category
    let xlsx_files = std::fs::read_dir(output.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "xlsx"))
        .count();
    assert_eq!(xlsx_files, 1);
}

#[tokio::test]
async fn test_empty_category_is_refused_by_exporter() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let base_url = format!("{}/uk", server.uri());
    let config = test_config(&base_url, output.path());
    let site = OlxSite::new(&config).unwrap();
    let exporter = DedupExporter::from_config(&config.output);

    serve_page(&server, &[]).await;

    let categories = vec![category(&base_url, "Електроніка", "elektronika")];
    let outcome = Mutex::new(None);
    harvest_categories(&site, &categories, Duration::ZERO, |result| {
        *outcome.lock().unwrap() = Some(exporter.export(&result.records, &result.category.name));
    })
    .await;

    let outcome = outcome.into_inner().unwrap().expect("callback ran");
    assert!(matches!(outcome, Err(ExportError::NoRecords { .. })));
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_json_dumps_next_to_artifact() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let base_url = format!("{}/uk", server.uri());
    let config = test_config(&base_url, output.path());
    let site = OlxSite::new(&config).unwrap();

    serve_page(&server, &[card("iPhone 13", "iphone-13-ID1", "15 500 грн")]).await;

    let categories = vec![category(&base_url, "Електроніка", "elektronika")];
    let report = harvest_categories(&site, &categories, Duration::ZERO, |result| {
        for kind in [JsonKind::Full, JsonKind::Essential] {
            save_json(result, output.path(), "olx", kind).unwrap();
        }
    })
    .await;
    assert_eq!(report.total_products(), 1);

    let essential = std::fs::read_to_string(output.path().join("olx_електроніка_essential.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&essential).unwrap();
    assert_eq!(value["products"][0]["name"], "iPhone 13");
    assert_eq!(value["products"][0]["price"], "15500");
    assert!(output.path().join("olx_електроніка_full.json").exists());
}
