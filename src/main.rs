//! Security awareness dashboard server.
//!
//! Routes:
//!   GET  /          rendered dashboard page
//!   POST /refresh   manual refresh (GET also accepted), redirects to /
//!   GET  /event     pointer event: kind=move|leave|click&region=..&target=..&x=..&y=..
//!   GET  /health    liveness and scheduler state

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use awareness_dash::logging::{log, obj, v_str, Domain, Level};
use awareness_dash::{source_from_config, Dashboard, DashboardConfig, SchedulerState};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = DashboardConfig::from_env()?;
    let source = source_from_config(&cfg)?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("profile", v_str(&format!("{:?}", cfg.profile))),
            ("source", v_str(&source.describe())),
            ("refresh_secs", json!(cfg.refresh_secs)),
            ("bind", v_str(&cfg.bind)),
        ]),
    );

    let dash = Arc::new(Dashboard::new(
        source,
        cfg.profile.chart_set(cfg.pie_label_min_pct),
        Duration::from_secs(cfg.refresh_secs),
    ));
    // A failed first load is shown on the page; the refresh control retries it.
    let _ = dash.initialize().await;

    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    println!("Dashboard running at http://{}", cfg.bind);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, _) = match accepted {
                    Ok(s) => s,
                    Err(e) => {
                        log(Level::Warn, Domain::System, "accept_failed", obj(&[("msg", v_str(&e.to_string()))]));
                        continue;
                    }
                };
                let dash = dash.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, dash).await {
                        log(Level::Debug, Domain::System, "connection_error", obj(&[("msg", v_str(&e.to_string()))]));
                    }
                });
            }
            _ = &mut ctrl_c => {
                dash.shutdown();
                break;
            }
        }
    }
    Ok(())
}

struct Reply {
    status: &'static str,
    content_type: &'static str,
    location: Option<&'static str>,
    body: String,
}

impl Reply {
    fn ok(content_type: &'static str, body: String) -> Self {
        Self { status: "200 OK", content_type, location: None, body }
    }

    fn redirect_home() -> Self {
        Self { status: "303 See Other", content_type: "text/plain", location: Some("/"), body: String::new() }
    }

    fn status(status: &'static str, body: &str) -> Self {
        Self { status, content_type: "text/plain", location: None, body: body.to_string() }
    }
}

async fn serve(stream: TcpStream, dash: Arc<Dashboard>) -> Result<()> {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    if reader.read_line(&mut request).await? == 0 {
        return Ok(());
    }
    // Drain headers; bodies are not used.
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header).await? == 0 || header.trim().is_empty() {
            break;
        }
    }

    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");
    let reply = route(&dash, method, target).await;

    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nCache-Control: no-store\r\nConnection: close\r\nContent-Length: {}\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    if let Some(loc) = reply.location {
        head.push_str(&format!("Location: {}\r\n", loc));
    }
    head.push_str("\r\n");

    let mut stream = reader.into_inner();
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(reply.body.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

async fn route(dash: &Dashboard, method: &str, target: &str) -> Reply {
    let Ok(url) = Url::parse(&format!("http://localhost{}", target)) else {
        return Reply::status("400 Bad Request", "bad request target");
    };
    match (method, url.path()) {
        ("GET", "/") => Reply::ok("text/html; charset=utf-8", dash.page_html()),
        ("GET" | "POST", "/refresh") => {
            // Failures are logged and surfaced as a page notice.
            let _ = dash.refresh().await;
            Reply::redirect_home()
        }
        ("GET", "/event") => pointer_event(dash, &url),
        ("GET", "/health") => {
            let live = dash.state() == SchedulerState::Live;
            let body = json!({
                "status": "ok",
                "state": if live { "live" } else { "idle" },
                "cycles_completed": dash.cycles_completed(),
            });
            Reply::ok("application/json", body.to_string())
        }
        _ => Reply::status("404 Not Found", "Not Found"),
    }
}

fn pointer_event(dash: &Dashboard, url: &Url) -> Reply {
    let mut kind = String::new();
    let mut region = String::new();
    let mut target: Option<usize> = None;
    let (mut x, mut y) = (0.0, 0.0);
    for (k, v) in url.query_pairs() {
        match k.as_ref() {
            "kind" => kind = v.into_owned(),
            "region" => region = v.into_owned(),
            "target" => target = v.parse().ok(),
            "x" => x = v.parse().unwrap_or(0.0),
            "y" => y = v.parse().unwrap_or(0.0),
            _ => {}
        }
    }
    let Some(target) = target else {
        return Reply::status("400 Bad Request", "missing target");
    };
    let handled = match kind.as_str() {
        "move" => dash.pointer_move(&region, target, x, y),
        "leave" => dash.pointer_leave(&region, target),
        "click" => dash.click(&region, target),
        _ => return Reply::status("400 Bad Request", "unknown event kind"),
    };
    let tooltip = dash.with_page(|p| p.tooltip().clone());
    let body = json!({
        "handled": handled,
        "tooltip": {
            "visible": tooltip.visible,
            "content": tooltip.content,
            "x": tooltip.x,
            "y": tooltip.y,
        },
    });
    Reply::ok("application/json", body.to_string())
}
