//! Funnel Core integration tests against a mock SharePoint site

use std::sync::Arc;

use funnel_core::{
    Error,
    lists::{SalesFunnelList, SearchField},
    search::SearchService,
    sharepoint::{ACCEPT_NOMETADATA, ListSource, SharePointClient},
    view::{SearchPhase, SearchView},
};
use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEMS_PATH: &str = r"^/_api/web/lists/getbytitle\('.+'\)/items$";

fn items_path(list: SalesFunnelList) -> String {
    format!("/_api/web/lists/getbytitle('{}')/items", list.url_encoded())
}

fn client(server: &MockServer) -> SharePointClient {
    SharePointClient::builder()
        .site_url(server.uri())
        .build()
        .expect("Failed to create SharePoint client")
}

/// Every list answers with no items unless a more specific mock matches
async fn mount_empty_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .with_priority(10)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_bridge_example_end_to_end() {
    let server = MockServer::start().await;
    mount_empty_lists(&server).await;

    Mock::given(method("GET"))
        .and(path(items_path(SalesFunnelList::Y2024)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{
                "Id": 7,
                "Project": "Bridge Repair",
                "Owner": "J. Lee",
                "BidDate": "2024-03-05T07:00:00Z",
                "EstimatedValue": 1250000
            }]
        })))
        .mount(&server)
        .await;

    let service = SearchService::new(Arc::new(client(&server)));
    let results = service.search_all("bridge", SearchField::All).await;

    assert_eq!(results.len(), 1);
    let item = &results[0];
    assert_eq!(item.source_list, SalesFunnelList::Y2024);
    assert_eq!(
        item.item_url,
        format!("{}/Lists/2024/DispForm.aspx?ID=7", server.uri())
    );
    assert_eq!(item.title, "Bridge Repair");
    assert_eq!(item.owner, "J. Lee");
    assert_eq!(item.bid_date, "3/5/2024");
    assert_eq!(item.award_date, "");
    assert_eq!(item.estimated_value, 1_250_000.0);
}

#[tokio::test]
async fn test_request_shape() {
    let server = MockServer::start().await;
    mount_empty_lists(&server).await;

    let filter = "substringof('O''Brien', Estimator)";
    Mock::given(method("GET"))
        .and(path(items_path(SalesFunnelList::Aggregate)))
        .and(header("Accept", ACCEPT_NOMETADATA))
        .and(query_param("$filter", filter))
        .and(query_param("$top", "50"))
        .and(query_param("$orderby", "Modified desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let service = SearchService::new(Arc::new(client(&server)));
    let results = service.search_all(" O'Brien ", SearchField::Estimator).await;
    assert!(results.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 8);
    for request in &requests {
        let select = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "$select")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert!(select.starts_with("Id,Title,Project,Owner"));
        assert!(select.ends_with("Plant,Place,PISStatus"));
    }
}

#[tokio::test]
async fn test_failing_lists_do_not_fail_search() {
    let server = MockServer::start().await;

    for (i, list) in SalesFunnelList::ALL.into_iter().enumerate() {
        let response = match list {
            SalesFunnelList::Y2021 => ResponseTemplate::new(404),
            _ => ResponseTemplate::new(200).set_body_json(json!({
                "value": [{ "Id": i, "Title": format!("Hit {}", i) }]
            })),
        };
        Mock::given(method("GET"))
            .and(path(items_path(list)))
            .respond_with(response)
            .mount(&server)
            .await;
    }

    let service = SearchService::new(Arc::new(client(&server)));
    let results = service.search_all("hit", SearchField::Title).await;

    assert_eq!(results.len(), 7);
    assert!(
        results
            .iter()
            .all(|item| item.source_list != SalesFunnelList::Y2021)
    );
    let order: Vec<_> = results.iter().map(|item| item.source_list).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[tokio::test]
async fn test_client_reports_unavailable_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(items_path(SalesFunnelList::Y2020)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_items(SalesFunnelList::Y2020, "f", 50)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ListUnavailable { ref list, status: 500 } if list == "2020"
    ));
}

#[tokio::test]
async fn test_malformed_body_is_skipped() {
    let server = MockServer::start().await;
    mount_empty_lists(&server).await;
    Mock::given(method("GET"))
        .and(path(items_path(SalesFunnelList::Y2025)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sign in</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .fetch_items(SalesFunnelList::Y2025, "f", 50)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));

    let service = SearchService::new(Arc::new(client(&server)));
    assert!(service.search_all("dam", SearchField::All).await.is_empty());
}

#[tokio::test]
async fn test_missing_value_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(ITEMS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let items = client(&server)
        .fetch_items(SalesFunnelList::Y2023, "f", 50)
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(ITEMS_PATH))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SharePointClient::builder()
        .site_url(server.uri())
        .access_token("test-token")
        .build()
        .unwrap();
    client
        .fetch_items(SalesFunnelList::Aggregate, "f", 50)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_list_issues_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(items_path(SalesFunnelList::Y2026)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "Id": 11, "Project": "Runway" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = SearchService::new(Arc::new(client(&server)));
    let results = service
        .search_list(SalesFunnelList::Y2026, "run", SearchField::Project)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_list, SalesFunnelList::Y2026);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_short_query_sends_nothing() {
    let server = MockServer::start().await;
    mount_empty_lists(&server).await;

    let service = SearchService::new(Arc::new(client(&server)));
    assert!(service.search_all("a", SearchField::All).await.is_empty());
    assert!(
        service
            .search_list(SalesFunnelList::Y2024, " ", SearchField::All)
            .await
            .is_empty()
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_view_reaches_no_results_over_http() {
    let server = MockServer::start().await;
    mount_empty_lists(&server).await;

    let service = Arc::new(SearchService::new(Arc::new(client(&server))));
    let view = SearchView::new(service);
    let mut rx = view.subscribe();

    view.handle_input("xy");
    view.submit();
    let state = rx.wait_for(|s| !s.is_loading).await.unwrap().clone();

    assert!(state.has_searched);
    assert_eq!(state.phase(), SearchPhase::NoResults);
    assert_eq!(server.received_requests().await.unwrap().len(), 8);

    view.clear();
    let state = view.current_state();
    assert_eq!(state.query, "");
    assert!(state.results.is_empty());
    assert!(!state.has_searched);
}
