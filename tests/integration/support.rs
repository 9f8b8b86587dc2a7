use listing_harvester::config::{parse_config, Config};
use listing_harvester::Category;
use std::path::Path;
use wiremock::ResponseTemplate;

/// Configuration pointed at a mock server, with no pacing
pub fn test_config(base_url: &str, output_directory: &Path) -> Config {
    parse_config(&format!(
        r#"
[site]
base-url = "{}"
user-agent = "HarvesterTest/1.0"

[requests]
request-timeout = 5
delay-between-requests = 0
delay-between-categories = 0

[output]
output-directory = '{}'
file-prefix = "olx"
save-json = false
"#,
        base_url,
        output_directory.display()
    ))
    .expect("Failed to parse test config")
}

/// One listing card as the site renders it
pub fn card(name: &str, slug: &str, price: &str) -> String {
    format!(
        r#"<div data-cy="l-card">
            <a class="css-rc5s2u" href="/uk/obyavlenie/{}.html"><h6 class="css-16v5mdi">{}</h6></a>
            <p data-testid="ad-price" class="css-10b0gli">{}</p>
        </div>"#,
        slug, name, price
    )
}

/// A category page; `next_page` adds a pagination-forward link
pub fn listing_page(cards: &[String], next_page: Option<u32>) -> String {
    let next = next_page
        .map(|page| {
            format!(
                r#"<a data-testid="pagination-forward" class="css-pyu9k9" href="?page={}">Наступна</a>"#,
                page
            )
        })
        .unwrap_or_default();

    format!(
        "<html><head><title>OLX</title></head><body><main>{}</main><nav>{}</nav></body></html>",
        cards.concat(),
        next
    )
}

pub fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

pub fn category(base_url: &str, name: &str, slug: &str) -> Category {
    Category::new(name, format!("{}/{}/", base_url, slug))
}
