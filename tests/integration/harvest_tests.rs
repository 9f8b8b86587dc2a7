use crate::support::{card, category, html, listing_page, test_config};
use listing_harvester::crawler::{CategoryTraversal, Fetcher, SiteProfile, TraversalSettings};
use listing_harvester::site::{harvest_catalog, ListingSite};
use listing_harvester::OlxSite;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn site_for(server: &MockServer, output: &TempDir) -> (OlxSite, String) {
    let base_url = format!("{}/uk", server.uri());
    let site = OlxSite::new(&test_config(&base_url, output.path())).expect("Failed to build site");
    (site, base_url)
}

#[tokio::test]
async fn test_traversal_stops_at_page_ceiling() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    // Every page claims there is another one
    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .respond_with(html(listing_page(
            &[card("Навушники", "navushniki-ID1", "500 грн")],
            Some(2),
        )))
        .expect(25)
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Електроніка", "elektronika"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.page_count, 25);
    assert_eq!(result.records.len(), 25);
}

#[tokio::test]
async fn test_page_ceiling_holds_for_oversized_settings() {
    let server = MockServer::start().await;
    let base_url = format!("{}/uk", server.uri());

    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .respond_with(html(listing_page(
            &[card("Навушники", "navushniki-ID1", "500 грн")],
            Some(2),
        )))
        .expect(25)
        .mount(&server)
        .await;

    let traversal = CategoryTraversal::new(
        Fetcher::with_client(reqwest::Client::new()),
        &SiteProfile::olx(),
        base_url.clone(),
        TraversalSettings {
            page_delay: Duration::ZERO,
            max_pages: 40,
        },
    )
    .expect("Failed to build traversal");

    let result = traversal
        .run(&category(&base_url, "Електроніка", "elektronika"))
        .await;

    assert_eq!(result.page_count, 25);
    assert_eq!(result.records.len(), 25);
}

#[tokio::test]
async fn test_empty_page_ends_traversal_with_prior_records() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(
            &[card("Телевізор LG", "tv-lg-ID3", "12 000 грн")],
            Some(3),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .and(query_param("page", "3"))
        .respond_with(html(listing_page(&[], Some(4))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .and(query_param("page", "4"))
        .respond_with(html(listing_page(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/elektronika/"))
        .respond_with(html(listing_page(
            &[
                card("iPhone 13", "iphone-13-ID1", "15 500 грн."),
                card("Samsung S21", "samsung-s21-ID2", "9 999 грн"),
            ],
            Some(2),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Електроніка", "elektronika"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.page_count, 3);
    assert_eq!(result.category.product_count, 3);

    let names: Vec<_> = result.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["iPhone 13", "Samsung S21", "Телевізор LG"]);

    let first = &result.records[0];
    assert_eq!(first.price.amount, 15500);
    assert_eq!(first.identifier, "iphone-13-ID1.html");
    assert_eq!(
        first.product_url,
        format!("{}/obyavlenie/iphone-13-ID1.html", base_url)
    );
    assert_eq!(result.records[2].price.amount, 12000);
}

#[tokio::test]
async fn test_fetch_failure_keeps_partial_results() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    Mock::given(method("GET"))
        .and(path("/uk/auto/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/auto/"))
        .respond_with(html(listing_page(
            &[card("Volvo XC60", "volvo-ID7", "15 000 $")],
            Some(2),
        )))
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Авто", "auto"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.page_count, 1);
}

#[tokio::test]
async fn test_unreachable_first_page_is_empty_success() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Авто", "auto"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert!(result.records.is_empty());
    assert_eq!(result.page_count, 0);
}

#[tokio::test]
async fn test_unextractable_cards_end_traversal() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    Mock::given(method("GET"))
        .and(path("/uk/dim/"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&[card("Диван", "dyvan-ID1", "1 грн")], None)))
        .expect(0)
        .mount(&server)
        .await;

    let nameless = r#"<div data-cy="l-card"><span>300 грн</span></div>"#.to_string();
    Mock::given(method("GET"))
        .and(path("/uk/dim/"))
        .respond_with(html(listing_page(&[nameless.clone(), nameless], Some(2))))
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Дім і сад", "dim"))
        .await
        .unwrap();

    assert!(result.is_success());
    assert!(result.records.is_empty());
    assert_eq!(result.skipped_fragments, 2);
}

#[tokio::test]
async fn test_bad_card_does_not_hide_later_cards() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    let nameless = r#"<div data-cy="l-card"><a href="/uk/obyavlenie/x.html"></a></div>"#.to_string();
    Mock::given(method("GET"))
        .and(path("/uk/dim/"))
        .respond_with(html(listing_page(
            &[nameless, card("Крісло", "krislo-ID2", "2 500 грн")],
            None,
        )))
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Дім і сад", "dim"))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].name, "Крісло");
    assert_eq!(result.skipped_fragments, 1);
}

#[tokio::test]
async fn test_show_all_link_replaces_pagination_base() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    // Pagination must continue from the full listing, not the category page
    Mock::given(method("GET"))
        .and(path("/uk/transport/"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/transport/"))
        .respond_with(html(format!(
            r#"<html><body>
                <a data-testid="sub-cat-1-root-link" href="/uk/transport/all/">Показати всі оголошення</a>
                {}
            </body></html>"#,
            card("Not counted", "teaser-ID0", "1 грн")
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/transport/all/"))
        .and(query_param("page", "2"))
        .respond_with(html(listing_page(&[card("Мотоцикл", "moto-ID2", "40 000 грн")], None)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uk/transport/all/"))
        .respond_with(html(listing_page(&[card("Велосипед", "bike-ID1", "4 000 грн")], Some(2))))
        .expect(1)
        .mount(&server)
        .await;

    let result = site
        .listings(&category(&base_url, "Транспорт", "transport"))
        .await
        .unwrap();

    let names: Vec<_> = result.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Велосипед", "Мотоцикл"]);
    assert_eq!(result.page_count, 2);
}

#[tokio::test]
async fn test_category_discovery() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, base_url) = site_for(&server, &output).await;

    Mock::given(method("GET"))
        .and(path("/uk"))
        .respond_with(html(
            r#"<html><body>
                <div data-testid="home-categories-menu-row">
                    <a class="css-1ep67ka" href="/uk/elektronika/"><img src="e.png"/><p>Електроніка</p></a>
                    <a class="css-1ep67ka" href="/uk/auto/"><p>Авто</p></a>
                    <a class="css-1ep67ka" href="/uk/x/"><p>Ок</p></a>
                    <a class="css-1ep67ka" href="https://help.olx.ua/"><p>Допомога</p></a>
                </div>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let categories = site.categories().await;
    let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();

    assert_eq!(names, vec!["Електроніка", "Авто"]);
    assert_eq!(categories[0].url, format!("{}/elektronika/", base_url));
}

#[tokio::test]
async fn test_missing_menu_yields_no_categories() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    let (site, _) = site_for(&server, &output).await;

    Mock::given(method("GET"))
        .and(path("/uk"))
        .respond_with(html("<html><body>maintenance</body></html>".to_string()))
        .mount(&server)
        .await;

    assert!(site.categories().await.is_empty());

    let report = harvest_catalog(&site, Duration::ZERO, |_| {}).await;
    assert!(report.success());
    assert_eq!(report.categories_found, 0);
}
