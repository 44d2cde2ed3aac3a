//! Demo server for a fixture page.
//!
//! | Request                          | Response                      |
//! |----------------------------------|-------------------------------|
//! | `GET /`                          | full page                     |
//! | `POST /ajax?refresh=a,b&source=` | guarded ajax envelope         |
//!
//! Pages are loaded once and kept in a [`PageStore`]. Each page sits behind
//! its own mutex, held for the whole ajax request.

use anyhow::{Context, Result, anyhow};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use super::interaction::Interaction;
use crate::config::Config;
use crate::page::render_page;
use crate::tree::MemoryTree;
use crate::utils::mime::types::{HTML, PLAIN};
use crate::{debug, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Server unblocked by the Ctrl+C handler.
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Loaded pages, keyed by fixture path.
#[derive(Default)]
pub struct PageStore {
    pages: DashMap<PathBuf, Arc<Mutex<MemoryTree>>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page for `fixture`, loading it on first use.
    pub fn get_or_load(&self, fixture: &Path) -> Result<Arc<Mutex<MemoryTree>>> {
        if let Some(page) = self.pages.get(fixture) {
            return Ok(Arc::clone(page.value()));
        }

        let tree = MemoryTree::load(fixture)?;
        let page = self
            .pages
            .entry(fixture.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(tree)));
        Ok(Arc::clone(page.value()))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Bind the server and handle requests until Ctrl+C.
pub fn serve(config: Arc<Config>) -> Result<()> {
    let store = Arc::new(PageStore::new());
    // fail early on a broken fixture
    store.get_or_load(&config.serve.fixture)?;

    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_shutdown(Arc::clone(&server))?;
    log!("serve"; "http://{}", addr);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        let store = Arc::clone(&store);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config, &store) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn register_shutdown(server: Arc<Server>) -> Result<()> {
    if SERVER.set(server).is_err() {
        return Ok(());
    }
    ctrlc::set_handler(|| {
        if let Some(server) = SERVER.get() {
            log!("serve"; "shutting down...");
            server.unblock();
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))
}

fn handle_request(request: Request, config: &Config, store: &PageStore) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((&url, ""));
    debug!("serve"; "{} {}", method, url);

    match (&method, path) {
        (Method::Get, "/") => {
            let page = store.get_or_load(&config.serve.fixture)?;
            let html = render_page(&mut *page.lock());
            match html {
                Ok(html) => send(request, 200, HTML, html),
                Err(e) => send(request, 500, PLAIN, format!("{e:#}")),
            }
        }
        (Method::Post, "/ajax") => respond_ajax(request, query, config, store),
        _ => send(request, 404, PLAIN, "404 Not Found".to_string()),
    }
}

fn respond_ajax(request: Request, query: &str, config: &Config, store: &PageStore) -> Result<()> {
    let interaction = parse_interaction(query);
    let page = store.get_or_load(&config.serve.fixture)?;

    // page lock held for the whole interaction
    let envelope = interaction.run(&mut page.lock());
    let envelope = match envelope {
        Ok(envelope) => envelope,
        Err(e) => return send(request, 400, PLAIN, format!("{e:#}")),
    };

    let response = envelope.into_response(&config.response)?;
    let headers = response
        .headers()
        .map(|(name, value)| header(name, value))
        .collect::<Result<Vec<_>>>()?;

    let mut reply = Response::from_string(response.body);
    for header in headers {
        reply.add_header(header);
    }
    request.respond(reply)?;
    Ok(())
}

/// `refresh=a,b&source=x&redirect=/url&prepend=js&append=js`
fn parse_interaction(query: &str) -> Interaction {
    let mut interaction = Interaction::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match &*key {
            "refresh" => interaction.refresh.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string),
            ),
            "source" => interaction.source = Some(value.into_owned()),
            "redirect" => interaction.redirect = Some(value.into_owned()),
            "prepend" => interaction.prepend.push(value.into_owned()),
            "append" => interaction.append.push(value.into_owned()),
            _ => debug!("serve"; "ignoring query parameter `{}`", key),
        }
    }
    interaction
}

fn send(request: Request, status: u16, content_type: &str, body: String) -> Result<()> {
    let response = Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?);
    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| anyhow!("invalid header `{name}: {value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_interaction() {
        let interaction =
            parse_interaction("refresh=a,%20b&refresh=c&source=btn&append=go%28%29%3B&x=1");

        assert_eq!(interaction.refresh, ["a", "b", "c"]);
        assert_eq!(interaction.source.as_deref(), Some("btn"));
        assert_eq!(interaction.append, ["go();"]);
        assert!(interaction.redirect.is_none());
    }

    #[test]
    fn test_store_loads_once() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[[node]]\nid = \"a\"\n").unwrap();

        let store = PageStore::new();
        let first = store.get_or_load(file.path()).unwrap();
        let second = store.get_or_load(file.path()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }
}
