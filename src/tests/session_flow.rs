// End-to-end session flows against a mocked Gen3 API:
//  - token exchange (POST /user/credentials/cdis/access_token)
//  - node export (GET /api/{version}/submission/{program}/{project}/export/)
//  - flattening of the stored exports

#[cfg(test)]
mod test {

    use http::header::AUTHORIZATION;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use reqwest::StatusCode;
    use serde_json::json;

    use crate::auth;
    use crate::credentials;
    use crate::error::Gen3Error;
    use crate::tests::common::{
        api_key_for, credentials_json, mock_token_exchange, write_credentials, write_file, FAKE_TOKEN, KEY_ID,
    };
    use crate::utils::constants::ACCESS_TOKEN_PATH;
    use crate::Gen3Session;

    const EXPORT_PATH: &str = "/api/v0/submission/p1/proj1/export/";

    #[tokio::test]
    async fn authenticate_sets_bearer_header() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        let token_mock = mock_token_exchange(&server, FAKE_TOKEN).await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        let token = session.authenticate().await.unwrap();
        assert_eq!(token.value(), FAKE_TOKEN);

        token_mock.assert_async().await;
        assert!(session.is_authenticated());
        assert_eq!(session.base_url(), Some(server.base_url().as_str()));
        assert_eq!(session.auth_headers().get(AUTHORIZATION).unwrap(), "bearer fake_token");
    }

    #[tokio::test]
    async fn authenticate_http_error_carries_status() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock_async(|when, then| {
                when.method(POST).path(ACCESS_TOKEN_PATH);
                then.status(401).body("Unauthorized");
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        match session.authenticate().await.unwrap_err() {
            Gen3Error::Authentication { status, message } => {
                assert_eq!(status, Some(StatusCode::UNAUTHORIZED));
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!session.is_authenticated());
        assert!(session.auth_headers().is_empty());
    }

    #[tokio::test]
    async fn authenticate_missing_access_token() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        server
            .mock_async(|when, then| {
                when.method(POST).path(ACCESS_TOKEN_PATH);
                then.status(200).json_body(json!({}));
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        let err = session.authenticate().await.unwrap_err();
        assert!(matches!(err, Gen3Error::Authentication { .. }));
        assert_eq!(err.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn authenticate_with_unquoted_credentials_file() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        let token_mock = mock_token_exchange(&server, FAKE_TOKEN).await;

        let content = format!("{{\n  api_key: {},\n  key_id: {}\n}}", api_key_for(&server.base_url()), KEY_ID);
        let path = write_file(dir.path(), "credentials.json", &content);

        let mut session = Gen3Session::new(path).unwrap();
        session.authenticate().await.unwrap();
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn free_authenticate_posts_full_credentials() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        let token_mock = mock_token_exchange(&server, "other_token").await;

        let creds = credentials::load(&write_credentials(dir.path(), &server)).unwrap();
        assert_eq!(serde_json::to_value(&creds).unwrap(), credentials_json(&server.base_url()));

        let token = auth::authenticate(&reqwest::Client::new(), &creds).await.unwrap();
        assert_eq!(token.value(), "other_token");
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_stores_raw_and_flattens() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        mock_token_exchange(&server, FAKE_TOKEN).await;
        let body = json!({"data": [{"id": 1, "sex": "F"}, {"id": 2, "sex": "M"}]});
        let export_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(EXPORT_PATH)
                    .query_param("node_label", "subject")
                    .query_param("format", "json")
                    .header("Authorization", "bearer fake_token");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(body.clone());
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        session.authenticate().await.unwrap();

        let fetched = session.fetch("p1", "proj1", "subject").await.unwrap();
        assert_eq!(fetched, &body);
        export_mock.assert_async().await;
        assert_eq!(session.raw("p1/proj1/subject"), Some(&body));
        assert!(session.table("p1/proj1/subject").is_none());

        let report = session.flatten_all();
        assert!(report.is_complete());
        let table = session.table("p1/proj1/subject").unwrap();
        assert_eq!(table.shape(), (2, 2));
        let names: Vec<String> = table.get_columns().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["id", "sex"]);
    }

    #[tokio::test]
    async fn fetch_encodes_node_label_in_query() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        mock_token_exchange(&server, FAKE_TOKEN).await;
        let export_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(EXPORT_PATH)
                    .query_param("node_label", "lab result&x=1")
                    .query_param("format", "json");
                then.status(200).json_body(json!({"data": [{"id": 1}]}));
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        session.authenticate().await.unwrap();
        session.fetch("p1", "proj1", "lab result&x=1").await.unwrap();

        export_mock.assert_async().await;
        assert!(session.raw("p1/proj1/lab result&x=1").is_some());
    }

    #[tokio::test]
    async fn fetch_unauthorized_stores_nothing_and_drops_token() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        mock_token_exchange(&server, FAKE_TOKEN).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(EXPORT_PATH);
                then.status(401).body("token expired");
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        session.authenticate().await.unwrap();

        let err = session.fetch("p1", "proj1", "subject").await.unwrap_err();
        match &err {
            Gen3Error::Fetch { key, status, message } => {
                assert_eq!(key, "p1/proj1/subject");
                assert_eq!(*status, Some(StatusCode::UNAUTHORIZED));
                assert_eq!(message, "token expired");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(session.raw("p1/proj1/subject").is_none());
        assert!(session.raw_store().is_empty());
        assert!(!session.is_authenticated());
        assert!(session.auth_headers().is_empty());
    }

    #[tokio::test]
    async fn fetch_before_authenticate_fails_at_server() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        let export_mock = server
            .mock_async(|when, then| {
                when.method(GET).path(EXPORT_PATH);
                then.status(401).body("missing authorization header");
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        let err = session.fetch("p1", "proj1", "subject").await.unwrap_err();

        export_mock.assert_async().await;
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        // base url was still resolved from the credentials file
        assert_eq!(session.base_url(), Some(server.base_url().as_str()));
        assert!(session.raw_store().is_empty());
    }

    #[tokio::test]
    async fn refetch_overwrites_previous_entry() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        mock_token_exchange(&server, FAKE_TOKEN).await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        session.authenticate().await.unwrap();

        let first = server
            .mock_async(|when, then| {
                when.method(GET).path(EXPORT_PATH);
                then.status(200).json_body(json!({"data": [{"id": 1}], "stale": true}));
            })
            .await;
        session.fetch("p1", "proj1", "subject").await.unwrap();
        first.delete_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path(EXPORT_PATH);
                then.status(200).json_body(json!({"data": [{"id": 2}, {"id": 3}]}));
            })
            .await;
        session.fetch("p1", "proj1", "subject").await.unwrap();

        assert_eq!(session.raw_store().len(), 1);
        assert_eq!(session.raw("p1/proj1/subject"), Some(&json!({"data": [{"id": 2}, {"id": 3}]})));

        session.flatten_all();
        assert_eq!(session.table("p1/proj1/subject").unwrap().height(), 2);
    }

    #[tokio::test]
    async fn fetch_with_explicit_api_version() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        mock_token_exchange(&server, FAKE_TOKEN).await;
        let export_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/submission/program1/AusDiab/export/")
                    .query_param("node_label", "demographic");
                then.status(200).json_body(json!({"data": []}));
            })
            .await;

        let mut session = Gen3Session::new(write_credentials(dir.path(), &server)).unwrap();
        session.authenticate().await.unwrap();
        session
            .fetch_with_version("program1", "AusDiab", "demographic", "v1")
            .await
            .unwrap();

        export_mock.assert_async().await;
        session.flatten_all();
        assert_eq!(session.table("program1/AusDiab/demographic").unwrap().height(), 0);
    }

    #[tokio::test]
    async fn malformed_api_key_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "credentials.json", r#"{"api_key": "abc.def", "key_id": "k"}"#);

        let mut session = Gen3Session::new(path).unwrap();
        assert!(matches!(session.authenticate().await.unwrap_err(), Gen3Error::MalformedToken(_)));
        assert!(matches!(
            session.fetch("p1", "proj1", "subject").await.unwrap_err(),
            Gen3Error::MalformedToken(_)
        ));
    }
}
