mod config;
mod credentials;
mod reply;
mod slack;
mod types;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde_json::json;
use vbot_dispatcher::{Dispatcher, Templates};

use config::Config;
use credentials::{DeployKey, S3BlobStore};
use reply::{ReplySink, SlackWebClient};
use slack::SlackRequest;

/// Everything an invocation needs, built once per cold start.
struct AppState<R> {
    signing_secret: String,
    dispatcher: Dispatcher,
    replier: R,
    // Reserved for the r10k deploy flow; no command reads it yet.
    deploy_key: Option<DeployKey>,
}

async fn function_handler<R: ReplySink>(
    state: &AppState<R>,
    event: Request,
) -> Result<Response<Body>, Error> {
    let header = |name: &str| {
        event
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string()
    };
    let slack_signature = header("X-Slack-Signature");
    let slack_timestamp = header("X-Slack-Request-Timestamp");

    if !slack::verify_slack_signature(
        &state.signing_secret,
        event.body(),
        &slack_timestamp,
        &slack_signature,
    ) {
        tracing::warn!("rejecting request with invalid Slack signature");
        return text_response(401, "Unauthorized");
    }

    let Ok(body_string) = String::from_utf8(event.body().to_vec()) else {
        tracing::warn!("rejecting signed request with a non UTF-8 body");
        return text_response(400, "request body is not valid UTF-8");
    };

    // The first delivery already replied; answering again would double-post.
    let retry_num = header("X-Slack-Retry-Num");
    if !retry_num.is_empty() {
        tracing::info!(retry_num = %retry_num, reason = %header("X-Slack-Retry-Reason"), "skipping Slack retry");
        return acknowledge();
    }

    let request = match slack::parse_request(&header("Content-Type"), &body_string) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejecting malformed Slack payload");
            return text_response(400, &e.to_string());
        }
    };

    match request {
        SlackRequest::UrlVerification { challenge } => Ok(Response::builder()
            .status(200)
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "challenge": challenge }).to_string()))?),
        SlackRequest::Ignored(reason) => {
            tracing::debug!(reason = %reason, "event ignored");
            acknowledge()
        }
        SlackRequest::Event { event, target } => {
            if let Some(message) = state.dispatcher.handle(&event) {
                if let Err(e) = state.replier.deliver(&target, &message).await {
                    tracing::error!(error = %e, reply_target = ?target, "failed to deliver reply");
                }
            }
            acknowledge()
        }
    }
}

fn acknowledge() -> Result<Response<Body>, Error> {
    Ok(Response::builder().status(200).body(Body::Empty)?)
}

fn text_response(status: u16, text: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Body::from(text.to_string()))?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .init();

    let config = Config::from_env()?;

    let deploy_key = match &config.deploy_key {
        Some(location) => {
            let store = S3BlobStore::from_env().await;
            Some(credentials::fetch_deploy_key(&store, location).await?)
        }
        None => None,
    };

    let state = AppState {
        signing_secret: config.signing_secret,
        dispatcher: Dispatcher::new(Templates::new(&config.usage_url)),
        replier: SlackWebClient::new(config.bot_token),
        deploy_key,
    };
    tracing::info!(
        deploy_key_bytes = state.deploy_key.as_ref().map(|k| k.as_bytes().len()).unwrap_or(0),
        "vbot receiver ready"
    );

    let state = &state;
    run(service_fn(move |event: Request| async move {
        function_handler(state, event).await
    }))
    .await
}
