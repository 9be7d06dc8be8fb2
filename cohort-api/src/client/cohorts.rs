use cohort_lib::cohort::VALIDATE_NAME_PATH;
use cohort_lib::{RemoteCheck, RemoteVerdict, RemoteError};

use crate::client::error::RequestError;
use crate::client::ApiClient;
use crate::cohorts::{ValidateName, Availability};
use crate::Validator;

impl ValidateName {
    pub fn name<N>(name: N) -> Self
    where
        N: Into<String>
    {
        ValidateName { name: name.into() }
    }

    /// asks the server whether the name is available
    pub async fn send(self, client: &ApiClient) -> Result<RemoteVerdict, RequestError> {
        self.validate()?;

        let res = client.get(VALIDATE_NAME_PATH)?
            .query(&self)
            .send()
            .await?;
        let availability: Availability = ApiClient::read_json(res).await?;

        Ok(availability.into())
    }
}

impl RemoteCheck for ApiClient {
    async fn check(
        &self,
        endpoint: &str,
        field: &str,
        value: &str,
    ) -> Result<RemoteVerdict, RemoteError> {
        let req = self.get(endpoint)?
            .query(&[(field, value)]);

        tracing::debug!("GET {endpoint} {field}={value:?}");

        let res = req.send()
            .await
            .map_err(RequestError::from)?;
        let availability: Availability = ApiClient::read_json(res).await?;

        Ok(availability.into())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Json;

    use cohort_lib::{
        Form,
        FormBinding,
        FormConfig,
        FieldRules,
        FieldErrorKind,
        Methods,
        Rule,
    };

    use super::*;
    use crate::client::ApiClientBuilder;
    use crate::ApiErrorKind;

    async fn validate_name(Query(params): Query<HashMap<String, String>>) -> Json<bool> {
        let taken = params.get("name")
            .map(|v| v == "Existing")
            .unwrap_or(false);

        Json(!taken)
    }

    async fn reserved() -> Json<&'static str> {
        Json("reserved for staff")
    }

    async fn broken() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
    }

    async fn rejected() -> (StatusCode, Json<serde_json::Value>) {
        (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"kind": "Unauthenticated"})))
    }

    async fn garbage() -> &'static str {
        "<html></html>"
    }

    async fn slow() -> Json<bool> {
        tokio::time::sleep(Duration::from_secs(2)).await;

        Json(true)
    }

    async fn serve() -> SocketAddr {
        let router = Router::new()
            .route(VALIDATE_NAME_PATH, get(validate_name))
            .route("/reserved", get(reserved))
            .route("/broken", get(broken))
            .route("/rejected", get(rejected))
            .route("/garbage", get(garbage))
            .route("/slow", get(slow));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await
            .expect("failed to bind test listener");
        let addr = listener.local_addr()
            .expect("failed to retrieve test listener address");

        tokio::spawn(async move {
            axum::serve(listener, router).await
                .expect("test server failed");
        });

        addr
    }

    async fn builder() -> ApiClientBuilder {
        let addr = serve().await;

        ApiClientBuilder::try_from(format!("http://{addr}/").as_str())
            .expect("valid url")
    }

    async fn client() -> ApiClient {
        builder().await.build().expect("failed to build client")
    }

    async fn impatient_client() -> ApiClient {
        let mut builder = builder().await;
        builder.timeout(Duration::from_millis(200));

        builder.build().expect("failed to build client")
    }

    #[tokio::test]
    async fn validate_name_request() {
        let client = client().await;

        let verdict = ValidateName::name("My Cohort-1").send(&client).await
            .expect("request succeeded");
        assert_eq!(verdict, RemoteVerdict::Available);

        let verdict = ValidateName::name("Existing").send(&client).await
            .expect("request succeeded");
        assert_eq!(verdict, RemoteVerdict::Taken(None));

        let err = ValidateName::name("abc!").send(&client).await
            .expect_err("invalid name is not sent");
        let api = err.as_api().expect("validation error");
        assert_eq!(*api.kind(), ApiErrorKind::ValidationFailed);
    }

    #[tokio::test]
    async fn remote_check_verdicts() {
        let client = client().await;

        let verdict = client.check(VALIDATE_NAME_PATH, "name", "Existing").await
            .expect("request succeeded");
        assert_eq!(verdict, RemoteVerdict::Taken(None));

        let verdict = client.check(VALIDATE_NAME_PATH, "name", "Fresh").await
            .expect("request succeeded");
        assert_eq!(verdict, RemoteVerdict::Available);

        let verdict = client.check("/reserved", "name", "Fresh").await
            .expect("request succeeded");
        assert_eq!(verdict, RemoteVerdict::Taken(Some(String::from("reserved for staff"))));
    }

    #[tokio::test]
    async fn remote_check_failures() {
        let client = client().await;

        let err = client.check("/broken", "name", "Fresh").await
            .expect_err("server error");
        assert!(matches!(err, RemoteError::Status(500)), "{err:?}");

        let err = client.check("/garbage", "name", "Fresh").await
            .expect_err("invalid body");
        assert!(matches!(err, RemoteError::InvalidBody(_)), "{err:?}");

        let err = client.check("/rejected", "name", "Fresh").await
            .expect_err("rejected request");
        assert!(matches!(err, RemoteError::Request(_)), "{err:?}");
    }

    #[tokio::test]
    async fn remote_check_timeout() {
        let client = impatient_client().await;

        let err = client.check("/slow", "name", "Fresh").await
            .expect_err("slow endpoint");
        assert!(matches!(err, RemoteError::Timeout), "{err:?}");
    }

    #[tokio::test]
    async fn timeout_blocks_submission() {
        let client = impatient_client().await;
        let config = FormConfig::new("upload-cohort")
            .field(FieldRules::new("name")
                .rule(Rule::Required)
                .rule(Rule::Remote(String::from("/slow"))));
        let form = Form::new()
            .with_class("upload-cohort")
            .text("name", "Fresh");
        let mut binding = FormBinding::bind(&form, config, Methods::new(), &client)
            .expect("valid binding");

        let result = binding.validate(&form).await;
        let err = result.error_for("name").expect("name error");

        assert_eq!(err.kind, FieldErrorKind::RemoteFailure);
        assert!(!binding.submit(&form).await.is_proceed());
    }
}
