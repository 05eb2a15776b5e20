use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tokio::time::sleep;

use crate::prelude::*;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Build a default client.
pub fn try_new() -> Result<Client> {
    Ok(Client::builder().timeout(Duration::from_secs(10)).build()?)
}

/// Send the request, retrying transport failures and server errors with exponential backoff.
///
/// Client errors are returned right away, as are server errors once the attempts are exhausted.
pub async fn send_with_retry(request: RequestBuilder) -> Result<Response> {
    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1;
    loop {
        let attempt_request =
            request.try_clone().context("the request cannot be cloned for retrying")?;
        match attempt_request.send().await {
            Ok(response) if response.status().is_server_error() && attempt < MAX_ATTEMPTS => {
                warn!(attempt, status = %response.status(), ?delay, "server error, retrying…");
            }
            Ok(response) => {
                return Ok(response.error_for_status()?);
            }
            Err(error) if attempt < MAX_ATTEMPTS => {
                warn!(attempt, %error, ?delay, "request failed, retrying…");
            }
            Err(error) => {
                return Err(error).context("the request failed after all attempts");
            }
        }
        sleep(delay).await;
        delay *= 2;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use reqwest::StatusCode;

    use super::*;

    #[tokio::test]
    async fn test_retry_server_error_then_ok() -> Result {
        let mut server = Server::new_async().await;
        let failure = server.mock("GET", "/").with_status(503).expect(1).create_async().await;
        let success =
            server.mock("GET", "/").with_status(200).with_body("ok").expect(1).create_async().await;

        let response = send_with_retry(try_new()?.get(server.url())).await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await?, "ok");
        failure.assert_async().await;
        success.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() -> Result {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", "/").with_status(401).expect(1).create_async().await;

        let error = send_with_retry(try_new()?.get(server.url())).await.err().unwrap();
        assert_eq!(
            error.downcast_ref::<reqwest::Error>().and_then(reqwest::Error::status),
            Some(StatusCode::UNAUTHORIZED),
        );
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_server_error_gives_up_after_all_attempts() -> Result {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", "/").with_status(500).expect(3).create_async().await;

        let result = send_with_retry(try_new()?.get(server.url())).await;
        assert!(result.is_err());
        mock.assert_async().await;
        Ok(())
    }
}
