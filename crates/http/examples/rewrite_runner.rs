use bytes::BytesMut;
use ext_plugin_http::codec::{FrameCodec, RpcType};
use ext_plugin_http::connection::ReqCallConnection;
use ext_plugin_http::handler::{RequestFilter, make_filter};
use ext_plugin_http::protocol::Request;
use ext_plugin_http::wire::{ReqBuilder, Resp};
use tokio_util::codec::Decoder;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Moves `/api/v1/*` to `/api/v2/*` and tags the request.
fn version_rewrite(req: &mut Request<'_>) {
    let Some(rest) = req.path().strip_prefix(b"/api/v1/") else {
        return;
    };
    let mut path = b"/api/v2/".to_vec();
    path.extend_from_slice(rest);
    req.set_path(path);

    if let Err(e) = req.header().set("X-Api-Version", "2") {
        error!(cause = %e, "can't tag request");
    }
}

/// Drops a header the upstream must never see.
fn strip_debug(req: &mut Request<'_>) {
    req.header().remove("x-debug");
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let filters: Vec<Box<dyn RequestFilter>> = vec![Box::new(make_filter(version_rewrite)), Box::new(make_filter(strip_debug))];

    // frames as the gateway would send them
    let mut input = BytesMut::new();
    let calls = [
        ReqBuilder::new(1, "/api/v1/users").header("X-Debug", "1").build(),
        ReqBuilder::new(2, "/health").build(),
        ReqBuilder::new(3, "/api/v2/users").header("Accept", "*/*").build(),
    ];
    for call in &calls {
        FrameCodec::encode_parts(RpcType::HttpReqCall, call, &mut input).expect("request fits in a frame");
    }

    let mut output = Vec::new();
    if let Err(e) = ReqCallConnection::new(&input[..], &mut output).process(&filters).await {
        error!(cause = %e, "connection failed");
        return;
    }

    let mut output = BytesMut::from(output.as_slice());
    while let Ok(Some(frame)) = FrameCodec.decode(&mut output) {
        let Ok(resp) = Resp::root(&frame.body) else {
            error!("runner sent a malformed reply");
            continue;
        };
        let Some(rewrite) = resp.action_as_rewrite() else {
            continue;
        };
        let headers: Vec<_> = rewrite
            .headers()
            .into_iter()
            .flatten()
            .map(|entry| (String::from_utf8_lossy(entry.name().unwrap_or_default()), entry.value().map(String::from_utf8_lossy)))
            .collect();
        info!(id = resp.id(), path = ?rewrite.path().map(String::from_utf8_lossy), ?headers, "rewrite");
    }
}
