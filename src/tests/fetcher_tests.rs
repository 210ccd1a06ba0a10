// src/tests/fetcher_tests.rs

use serde_json::json;

use super::utils::{date, endpoint, offsets_for, Script, ScriptedSource};
use crate::domain::ListingFilters;
use crate::scraper::{FetchError, ListingFetcher, Termination};

const ATS: &str = "https://internships-api.p.rapidapi.com/active-ats-7d";

#[test]
fn cap_reached_mid_stream_truncates_to_cap() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(47));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 25, &ListingFilters::default());

    assert_eq!(report.listings.len(), 25);
    assert!(matches!(report.termination, Termination::Filled));
    assert_eq!(report.requests, 3);
    assert_eq!(offsets_for(&seen, ATS), vec![0, 10, 20]);

    let titles: Vec<String> = report.listings.iter().map(|l| l.title.clone()).collect();
    let expected: Vec<String> = (0..25).map(|i| format!("Intern {i}")).collect();
    assert_eq!(titles, expected);
}

#[test]
fn exhausted_source_returns_everything_it_has() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(15));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 100, &ListingFilters::default());

    assert_eq!(report.listings.len(), 15);
    assert!(matches!(report.termination, Termination::Exhausted));
    assert_eq!(offsets_for(&seen, ATS), vec![0, 10, 20]);
}

#[test]
fn exact_multiple_of_batch_stops_without_extra_request() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(100));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 20, &ListingFilters::default());

    assert_eq!(report.listings.len(), 20);
    assert_eq!(offsets_for(&seen, ATS), vec![0, 10]);
}

#[test]
fn zero_cap_issues_no_request() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(47));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 0, &ListingFilters::default());

    assert!(report.listings.is_empty());
    assert_eq!(report.requests, 0);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn empty_source_stops_after_first_request() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(0));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 10, &ListingFilters::default());

    assert!(report.listings.is_empty());
    assert!(matches!(report.termination, Termination::Exhausted));
    assert_eq!(offsets_for(&seen, ATS), vec![0]);
}

#[test]
fn rejected_status_keeps_partial_results_without_failure() {
    let source = ScriptedSource::new().with(ATS, Script::Status(403));
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 10, &ListingFilters::default());

    assert!(report.listings.is_empty());
    assert!(report.failure().is_none());
    assert!(matches!(
        report.rejection(),
        Some(FetchError::Rejected { status: 403, .. })
    ));
    assert!(report.into_result().unwrap().is_empty());
}

#[test]
fn network_failure_mid_stream_keeps_earlier_batches() {
    let source = ScriptedSource::new().with(
        ATS,
        Script::DownFrom {
            total: 47,
            offset: 20,
        },
    );
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 40, &ListingFilters::default());

    assert_eq!(report.listings.len(), 20);
    assert!(matches!(
        report.failure(),
        Some(FetchError::Unavailable { .. })
    ));
    assert_eq!(offsets_for(&seen, ATS), vec![0, 10, 20]);

    assert!(matches!(
        report.into_result(),
        Err(FetchError::Unavailable { .. })
    ));
}

#[test]
fn filters_are_sent_with_every_batch() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(30));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);
    let filters = ListingFilters::new(
        Some("engineer".to_string()),
        None,
        Some("Oregon".to_string()),
    );

    fetcher.fetch(&endpoint(ATS), 15, &filters);

    let requests = seen.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(
            request.query,
            vec![
                ("title_filter".to_string(), "engineer".to_string()),
                ("location_filter".to_string(), "Oregon".to_string()),
            ]
        );
    }
}

#[test]
fn posting_dates_lose_time_of_day() {
    let source = ScriptedSource::new().with(ATS, Script::Entries(3));
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 10, &ListingFilters::default());

    assert!(report
        .listings
        .iter()
        .all(|l| l.date_posted == date(2024, 10, 1)));
    assert!(report
        .listings
        .iter()
        .all(|l| l.date_applied.is_none() && l.application_status.is_none()));
}

#[test]
fn unreadable_entries_are_skipped() {
    let source = ScriptedSource::new().with(
        ATS,
        Script::Raw(vec![
            json!({
                "title": "Good",
                "organization": "Acme",
                "date_posted": "2024-10-02T00:00:00",
                "location": "Remote",
                "url": "https://acme.example/good"
            }),
            json!({ "title": "No url or org" }),
            json!({
                "title": "Bad date",
                "organization": "Acme",
                "date_posted": "soon",
                "location": "Remote",
                "url": "https://acme.example/bad"
            }),
        ]),
    );
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 10, &ListingFilters::default());

    assert_eq!(report.listings.len(), 1);
    assert_eq!(report.listings[0].url, "https://acme.example/good");
    assert!(matches!(report.termination, Termination::Exhausted));
}

#[test]
fn batch_of_only_unreadable_entries_ends_fetch() {
    let source = ScriptedSource::new().with(ATS, Script::Raw(vec![json!({ "unexpected": true })]));
    let seen = source.seen();
    let fetcher = ListingFetcher::new(source);

    let report = fetcher.fetch(&endpoint(ATS), 10, &ListingFilters::default());

    assert!(report.listings.is_empty());
    assert!(matches!(report.failure(), Some(FetchError::Malformed { .. })));
    assert_eq!(offsets_for(&seen, ATS), vec![0]);
}
