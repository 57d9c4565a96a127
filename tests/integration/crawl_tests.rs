//! Integration tests for the harvester
//!
//! Most tests drive the coordinator through a scripted in-process fetcher;
//! the last ones use wiremock to run the full HTTP stack end-to-end.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vagas_ripple::config::{Config, OutputFormat};
use vagas_ripple::crawler::{run_crawl, Coordinator, FetchResult, PageFetcher, RunPlan};
use vagas_ripple::storage::MemorySink;
use vagas_ripple::{HarvestError, RecordSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves canned bodies by URL and remembers every request
#[derive(Default)]
struct ScriptedFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
    latency: Duration,
}

impl ScriptedFetcher {
    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(url.into(), body.into());
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.requested.lock().unwrap().push(url.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.pages.get(url) {
            Some(body) => FetchResult::Success {
                final_url: url.to_string(),
                status_code: 200,
                body: body.clone(),
            },
            None => FetchResult::NetworkError {
                error: "Connection failed: refused".to_string(),
            },
        }
    }
}

fn job(id: u32, city: &str, uf: &str) -> Value {
    json!({
        "id": id,
        "titulo": format!("Vaga {}", id),
        "anunciante": {"nome": "Confidencial"},
        "cidade": city,
        "uf": uf,
        "faixaSalarial": "A combinar",
        "descricao": format!("Resumo da vaga {}", id),
    })
}

fn jobs(ids: std::ops::Range<u32>) -> Vec<Value> {
    ids.map(|id| job(id, "Recife", "PE")).collect()
}

/// Embeds a payload the way Next.js does, with `</` escaped so markup inside
/// string values cannot close the script element
fn next_data_script(data: &Value) -> String {
    format!(
        r#"<script id="__NEXT_DATA__" type="application/json">{}</script>"#,
        data.to_string().replace("</", "<\\/")
    )
}

fn listing_page(jobs: Vec<Value>) -> String {
    let data = json!({"props": {"pageProps": {"jobSearch": {"jobSearchResult": {"data": {"jobs": jobs}}}}}});
    format!("<html><body>{}</body></html>", next_data_script(&data))
}

fn config(results_wanted: u32) -> Config {
    let mut config = Config::default();
    config.search.keyword = "vendas".to_string();
    config.crawler.results_wanted = results_wanted;
    config.crawler.pacing_min_ms = 0;
    config.crawler.pacing_max_ms = 0;
    config
}

async fn run(
    config: &Config,
    fetcher: Arc<ScriptedFetcher>,
) -> (Result<vagas_ripple::output::RunSummary, HarvestError>, Arc<MemorySink>) {
    run_plan(RunPlan::resolve(config).unwrap(), fetcher).await
}

async fn run_plan(
    plan: RunPlan,
    fetcher: Arc<ScriptedFetcher>,
) -> (Result<vagas_ripple::output::RunSummary, HarvestError>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let coordinator = Coordinator::new(plan, fetcher, sink.clone());
    (coordinator.run().await, sink)
}

#[tokio::test]
async fn test_overlapping_pages_are_deduplicated() {
    let config = config(20);
    let plan = RunPlan::resolve(&config).unwrap();

    // Page 1: ids 1-12, page 2: ids 11-18 (11 and 12 repeat)
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..13)))
            .with_page(plan.listing_url(2), listing_page(jobs(11..19))),
    );

    let (result, sink) = run(&config, fetcher.clone()).await;
    let summary = result.unwrap();

    assert_eq!(summary.jobs_saved, 18);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.skipped_duplicates, 2);
    assert_eq!(summary.skipped_for_location, 0);
    assert_eq!(sink.batch_sizes(), vec![12, 6]);

    let ids: Vec<String> = sink.records().into_iter().map(|r| r.id).collect();
    let expected: Vec<String> = (1..19).map(|id| id.to_string()).collect();
    assert_eq!(ids, expected);

    // Page 2 yielded fewer than the minimum, so page 3 is never requested
    assert_eq!(fetcher.requested().len(), 2);
}

#[tokio::test]
async fn test_quota_stops_mid_page() {
    let config = config(15);
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..13)))
            .with_page(plan.listing_url(2), listing_page(jobs(11..19))),
    );

    let (result, sink) = run(&config, fetcher).await;
    let summary = result.unwrap();

    assert_eq!(summary.jobs_saved, 15);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(sink.batch_sizes(), vec![12, 3]);
    assert_eq!(sink.records().last().unwrap().id, "15");
}

#[tokio::test]
async fn test_quota_met_on_first_page_requests_nothing_more() {
    let config = config(5);
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..11)))
            .with_page(plan.listing_url(2), listing_page(jobs(11..21))),
    );

    let (result, sink) = run(&config, fetcher.clone()).await;

    assert_eq!(result.unwrap().jobs_saved, 5);
    assert_eq!(sink.records().len(), 5);
    assert_eq!(fetcher.requested(), vec![plan.listing_url(1)]);
}

#[tokio::test]
async fn test_page_ceiling_bounds_pagination() {
    let mut config = config(100);
    config.crawler.max_pages = Some(2);
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..16)))
            .with_page(plan.listing_url(2), listing_page(jobs(16..31)))
            .with_page(plan.listing_url(3), listing_page(jobs(31..46))),
    );

    let (result, _sink) = run(&config, fetcher.clone()).await;

    assert_eq!(result.unwrap().jobs_saved, 30);
    assert_eq!(fetcher.requested().len(), 2);
}

#[tokio::test]
async fn test_empty_page_ends_results() {
    let config = config(50);
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..16)))
            .with_page(plan.listing_url(2), listing_page(Vec::new())),
    );

    let (result, _sink) = run(&config, fetcher.clone()).await;
    let summary = result.unwrap();

    assert_eq!(summary.jobs_saved, 15);
    assert_eq!(summary.pages_processed, 2);
    assert_eq!(summary.errors, 0);
    assert_eq!(fetcher.requested().len(), 2);
}

#[tokio::test]
async fn test_location_filter() {
    let mut config = config(50);
    config.search.location = "São Paulo".to_string();
    let plan = RunPlan::resolve(&config).unwrap();

    let page = vec![
        job(1, "São Paulo", "SP"),
        job(2, "Rio de Janeiro", "RJ"),
        job(3, "Sao Paulo", "SP"),
        json!({"id": 4, "titulo": "Vaga sem local"}),
        json!({"titulo": "Vaga sem id"}),
    ];
    let fetcher = Arc::new(ScriptedFetcher::default().with_page(plan.listing_url(1), listing_page(page)));

    let (result, sink) = run(&config, fetcher).await;
    let summary = result.unwrap();

    assert_eq!(summary.jobs_saved, 2);
    assert_eq!(summary.skipped_for_location, 2);
    assert_eq!(summary.parse_failures, 1);

    let records = sink.records();
    assert_eq!(records[0].location.as_deref(), Some("São Paulo, SP"));
    assert_eq!(records[1].id, "3");
}

#[tokio::test]
async fn test_listing_only_records() {
    let config = config(50);
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default().with_page(plan.listing_url(1), listing_page(jobs(7..8))),
    );

    let (result, sink) = run(&config, fetcher).await;
    result.unwrap();

    let record = &sink.records()[0];
    assert_eq!(record.title, "Vaga 7");
    assert_eq!(record.company.as_deref(), Some("Confidencial"));
    assert_eq!(record.salary.as_deref(), Some("A combinar"));
    assert_eq!(record.description.as_deref(), Some("Resumo da vaga 7"));
    assert_eq!(record.url, "https://www.catho.com.br/vagas/vaga-7/7/");
    assert_eq!(record.apply_url, record.url);
    assert_eq!(record.source, RecordSource::Listing);
}

#[tokio::test]
async fn test_details_enrich_records() {
    let mut config = config(50);
    config.crawler.collect_details = true;
    let plan = RunPlan::resolve(&config).unwrap();

    let detail = json!({"props": {"pageProps": {"jobAdData": {
        "id": 1,
        "titulo": "Vaga 1",
        "contratante": {"nome": "Acme Ltda"},
        "descricao": "<p>Vender <b>muito</b></p><script>track()</script>",
        "beneficios": ["Vale refeição", {"nome": "Plano de saúde"}],
    }}}});
    let posting = json!({
        "@context": "https://schema.org",
        "@type": "JobPosting",
        "title": "Vaga 1",
        "baseSalary": {"currency": "BRL", "value": {"minValue": 1000, "maxValue": 2000}},
        "employmentType": "FULL_TIME",
    });
    let detail_page = format!(
        r#"<html><head><script type="application/ld+json">{}</script></head><body>{}</body></html>"#,
        posting,
        next_data_script(&detail)
    );

    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..4)))
            .with_page(plan.site.job_url("1", "Vaga 1"), detail_page)
            // Job 2's detail page is missing; job 3's has no payload
            .with_page(plan.site.job_url("3", "Vaga 3"), "<html><body>Vaga encerrada</body></html>"),
    );

    let (result, sink) = run(&config, fetcher.clone()).await;
    let summary = result.unwrap();

    assert_eq!(summary.jobs_saved, 3);
    assert_eq!(summary.details_fetched, 1);
    assert_eq!(summary.errors, 2);
    assert_eq!(sink.batch_sizes(), vec![1, 1, 1]);
    assert_eq!(fetcher.requested().len(), 4);

    let records = sink.records();
    let enriched = records.iter().find(|r| r.id == "1").unwrap();
    assert_eq!(enriched.source, RecordSource::Detail);
    assert_eq!(enriched.company.as_deref(), Some("Acme Ltda"));
    assert_eq!(enriched.salary.as_deref(), Some("R$ 1.000 - R$ 2.000"));
    assert_eq!(enriched.description.as_deref(), Some("Vender muito"));
    assert_eq!(
        enriched.benefits.as_deref(),
        Some("Vale refeição, Plano de saúde")
    );

    for id in ["2", "3"] {
        let fallback = records.iter().find(|r| r.id == id).unwrap();
        assert_eq!(fallback.source, RecordSource::Listing);
        assert_eq!(fallback.salary.as_deref(), Some("A combinar"));
    }
}

#[tokio::test]
async fn test_details_respect_quota() {
    let mut config = config(4);
    config.crawler.collect_details = true;
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default().with_page(plan.listing_url(1), listing_page(jobs(1..16))),
    );

    let (result, sink) = run(&config, fetcher.clone()).await;

    assert_eq!(result.unwrap().jobs_saved, 4);
    assert_eq!(sink.records().len(), 4);
    // One listing page plus four detail pages
    assert_eq!(fetcher.requested().len(), 5);
}

#[tokio::test]
async fn test_no_results_is_an_error() {
    let mut config = config(10);
    config.search.location = "Manaus".to_string();
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default().with_page(plan.listing_url(1), listing_page(jobs(1..6))),
    );

    let (result, sink) = run(&config, fetcher).await;

    assert!(matches!(result, Err(HarvestError::NoResults { pages: 1 })));
    assert!(sink.records().is_empty());
    assert_eq!(sink.summary().map(|s| s.skipped_for_location), Some(5));
}

#[tokio::test]
async fn test_page_without_payload_counts_error() {
    let config = config(10);
    let plan = RunPlan::resolve(&config).unwrap();
    let fetcher = Arc::new(
        ScriptedFetcher::default().with_page(plan.listing_url(1), "<html><body>Captcha</body></html>"),
    );

    let (result, sink) = run(&config, fetcher).await;

    assert!(matches!(result, Err(HarvestError::NoResults { .. })));
    assert_eq!(sink.summary().map(|s| s.errors), Some(1));
}

#[tokio::test]
async fn test_detail_page_with_structured_data_only() {
    let mut config = config(50);
    config.crawler.collect_details = true;
    let plan = RunPlan::resolve(&config).unwrap();

    let posting = json!({
        "@type": "JobPosting",
        "title": "Vaga 1",
        "baseSalary": {"currency": "BRL", "value": {"value": 3500}},
    });
    let detail_page = format!(
        r#"<html><head><script type="application/ld+json">{}</script></head><body></body></html>"#,
        posting
    );
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_page(plan.listing_url(1), listing_page(jobs(1..2)))
            .with_page(plan.site.job_url("1", "Vaga 1"), detail_page),
    );

    let (result, sink) = run(&config, fetcher).await;
    let summary = result.unwrap();

    assert_eq!(summary.details_fetched, 1);
    assert_eq!(summary.errors, 0);

    let record = &sink.records()[0];
    assert_eq!(record.source, RecordSource::Detail);
    assert_eq!(record.salary.as_deref(), Some("R$ 3.500"));
}

#[tokio::test]
async fn test_spent_budget_skips_first_listing() {
    let mut plan = RunPlan::resolve(&config(10)).unwrap();
    plan.max_runtime = Duration::ZERO;
    let fetcher = Arc::new(
        ScriptedFetcher::default().with_page(plan.listing_url(1), listing_page(jobs(1..16))),
    );

    let (result, sink) = run_plan(plan, fetcher.clone()).await;

    assert!(matches!(result, Err(HarvestError::NoResults { pages: 0 })));
    assert!(fetcher.requested().is_empty());
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_budget_spent_during_listing_fetch() {
    let mut config = config(50);
    config.crawler.collect_details = true;
    let mut plan = RunPlan::resolve(&config).unwrap();
    plan.max_runtime = Duration::from_millis(20);

    // The listing fetch outlasts the budget: its jobs are still admitted, but
    // their detail pages are not fetched and page 2 is never scheduled
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_latency(Duration::from_millis(60))
            .with_page(plan.listing_url(1), listing_page(jobs(1..16)))
            .with_page(plan.listing_url(2), listing_page(jobs(16..31))),
    );
    let first_url = plan.listing_url(1);

    let (result, sink) = run_plan(plan, fetcher.clone()).await;
    let summary = result.unwrap();

    assert_eq!(fetcher.requested(), vec![first_url]);
    assert_eq!(summary.jobs_saved, 15);
    assert_eq!(summary.details_fetched, 0);
    assert_eq!(summary.pages_processed, 1);
    assert!(sink
        .records()
        .iter()
        .all(|r| r.source == RecordSource::Listing));
}

#[tokio::test]
async fn test_budget_spent_during_listing_fetch_without_details() {
    let mut plan = RunPlan::resolve(&config(50)).unwrap();
    plan.max_runtime = Duration::from_millis(20);
    let fetcher = Arc::new(
        ScriptedFetcher::default()
            .with_latency(Duration::from_millis(60))
            .with_page(plan.listing_url(1), listing_page(jobs(1..16)))
            .with_page(plan.listing_url(2), listing_page(jobs(16..31))),
    );

    let (result, sink) = run_plan(plan, fetcher.clone()).await;

    assert_eq!(result.unwrap().jobs_saved, 15);
    assert_eq!(sink.batch_sizes(), vec![15]);
    assert_eq!(fetcher.requested().len(), 1);
}

#[tokio::test]
async fn test_full_http_harvest_to_jsonl() {
    // Start a mock server
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vagas/vendas/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(jobs(1..4)))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("jobs.jsonl");
    let summary_path = dir.path().join("summary.json");

    let mut config = config(10);
    config.site.base_url = format!("{}/vagas/", mock_server.uri());
    config.output.format = OutputFormat::Jsonl;
    config.output.dataset_path = dataset.to_string_lossy().to_string();
    config.output.summary_path = Some(summary_path.to_string_lossy().to_string());

    let summary = run_crawl(&config, "test-hash").await.unwrap();
    assert_eq!(summary.jobs_saved, 3);

    let lines: Vec<Value> = std::fs::read_to_string(&dataset)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], "1");
    assert_eq!(
        lines[0]["url"],
        format!("{}/vagas/vaga-1/1/", mock_server.uri())
    );

    let exported: Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(exported["jobsSaved"], 3);
    assert_eq!(exported["pagesProcessed"], 1);
}

#[tokio::test]
async fn test_http_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vagas/vendas/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vagas/vendas/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(jobs(1..3))))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(10);
    config.site.base_url = format!("{}/vagas/", mock_server.uri());
    config.fetch.retry_delay_ms = 10;
    config.output.dataset_path = dir.path().join("jobs.db").to_string_lossy().to_string();

    let summary = run_crawl(&config, "test-hash").await.unwrap();

    assert_eq!(summary.jobs_saved, 2);
    assert_eq!(summary.errors, 0);
}

#[tokio::test]
async fn test_http_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vagas/vendas/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = config(10);
    config.site.base_url = format!("{}/vagas/", mock_server.uri());
    config.search.start_url = Some(format!("{}/vagas/vendas/?page=2", mock_server.uri()));
    config.output.format = OutputFormat::Jsonl;
    let dir = tempfile::tempdir().unwrap();
    config.output.dataset_path = dir.path().join("jobs.jsonl").to_string_lossy().to_string();

    let result = run_crawl(&config, "test-hash").await;
    assert!(matches!(result, Err(HarvestError::NoResults { pages: 0 })));
}
