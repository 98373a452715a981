//! JSONL TCP session server.
//!
//! Binds to host:port and handles newline-delimited JSON requests, one
//! response line per request line. One `Mutex<Session>` serializes every
//! request against a single shared document, the single-writer discipline
//! the engine expects. Thread per connection.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use linkgrid_engine::{EngineError, Row, Session};
use linkgrid_io::{read_document, write_document};
use linkgrid_protocol::{
    ChangePayload, MetadataPayload, Request, Response, RowPayload, ERR_BAD_REQUEST, ERR_INTERNAL,
    ERR_NOT_FOUND, ERR_PARSE, ERR_REMOTE, ERR_VALIDATION, PROTOCOL_VERSION,
};
use linkgrid_sheets::{SheetsClient, SheetsError};

/// Maximum consecutive parse failures before disconnecting a client.
const MAX_PARSE_FAILURES: u32 = 3;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Bind and serve until the process exits. Each accepted connection gets
/// its own thread; all of them share one session.
pub fn run(config: &ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))?;
    let addr = listener.local_addr()?;
    log::info!("session server listening on {addr} (protocol v{PROTOCOL_VERSION})");

    let session = Arc::new(Mutex::new(Session::new()));
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, session) {
                        log::debug!("connection ended: {e}");
                    }
                });
            }
            Err(e) => log::warn!("accept failed: {e}"),
        }
    }
    Ok(())
}

fn handle_connection(stream: TcpStream, session: Arc<Mutex<Session>>) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    log::debug!("client connected: {peer}");

    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut parse_failures = 0u32;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                parse_failures = 0;
                let mut session = session.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                handle_request(&mut session, request)
            }
            Err(e) => {
                parse_failures += 1;
                if parse_failures >= MAX_PARSE_FAILURES {
                    log::warn!("client {peer} dropped after {parse_failures} parse failures");
                    return Ok(());
                }
                Response::error(ERR_BAD_REQUEST, format!("invalid request: {e}"))
            }
        };
        let json = serde_json::to_string(&response)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
    }

    log::debug!("client disconnected: {peer}");
    Ok(())
}

/// Dispatch one request against the session. Everything except the push
/// arm is free of I/O; integration tests drive it directly and exercise
/// the push flow through [`push_changes_to_remote`] with their own client.
pub fn handle_request(session: &mut Session, request: Request) -> Response {
    match request {
        Request::Load { content, source_name } => {
            // All-or-nothing: the session is only touched on a clean parse,
            // so a malformed upload leaves the prior document intact.
            match read_document(&content, &source_name) {
                Ok(document) => {
                    session.load(document);
                    let doc = session.document();
                    Response::Loaded {
                        row_count: doc.row_count(),
                        columns: doc.columns().to_vec(),
                        source_name: doc.source_name().to_string(),
                    }
                }
                Err(e) => Response::error(ERR_PARSE, e.to_string()),
            }
        }
        Request::SetLinkColumns { columns } => match session.set_link_columns(columns.clone()) {
            Ok(link_rows) => Response::LinkColumnsSet { link_rows, columns },
            Err(e) => engine_error(e),
        },
        Request::Metadata => {
            let meta = session.metadata();
            Response::Metadata(MetadataPayload {
                row_count: meta.row_count,
                columns: meta.columns,
                link_rows: meta.link_rows,
                dirty_count: meta.dirty_count,
                is_dirty: meta.is_dirty,
                source_name: meta.source_name,
                link_columns: meta.link_columns,
            })
        }
        Request::Rows { start, count } => Response::Rows {
            rows: session
                .rows_slice(start, count)
                .into_iter()
                .map(|(position, row)| row_payload(position, row))
                .collect(),
        },
        Request::Row { position } => match session.row(position) {
            Some(row) => Response::Row {
                row: row_payload(position, row),
            },
            None => Response::error(ERR_NOT_FOUND, format!("row {position} not found")),
        },
        Request::UpdateCell { position, column, value } => {
            match session.update_cell(position, &column, &value) {
                Ok(()) => {
                    // The edit and the rebuild are two separate steps; the
                    // server sequences them so clients see a fresh index.
                    if session.is_link_column(&column) {
                        session.rebuild_link_index();
                    }
                    let doc = session.document();
                    Response::CellUpdated {
                        is_dirty: doc.is_dirty(),
                        dirty_count: doc.dirty_count(),
                        link_rows: session.link_index().len(),
                    }
                }
                Err(e) => engine_error(e),
            }
        }
        Request::Export => {
            if session.document().columns().is_empty() {
                return Response::error(ERR_VALIDATION, "no document loaded");
            }
            match write_document(session.document()) {
                Ok(content) => Response::Exported {
                    content,
                    file_name: export_file_name(session.document().source_name()),
                },
                Err(e) => Response::error(ERR_INTERNAL, e.to_string()),
            }
        }
        Request::NextLink { from } => Response::LinkPosition {
            position: session.link_index().find_next(from),
        },
        Request::PrevLink { from } => Response::LinkPosition {
            position: session.link_index().find_prev(from),
        },
        Request::LinkRows => Response::LinkRowList {
            positions: session.link_index().positions().to_vec(),
        },
        Request::Changes => Response::ChangeList {
            changes: session
                .changes()
                .into_iter()
                .map(|c| ChangePayload {
                    position: c.row,
                    column: c.column,
                    original: c.original,
                    current: c.current,
                    timestamp_ms: c.timestamp.timestamp_millis(),
                })
                .collect(),
        },
        Request::PushChanges { spreadsheet_id, gid } => {
            match SheetsClient::from_saved_credentials() {
                Ok(client) => {
                    push_changes_to_remote(session, &client, &spreadsheet_id, gid.as_deref())
                }
                Err(e) => sheets_error(e),
            }
        }
        Request::Ping => Response::Pong,
    }
}

/// Flush the change log to a remote sheet and clear the dirty set on
/// success. The change log itself survives the flush; only the dirty
/// markers reset. An empty change log is a successful no-op without any
/// network traffic.
pub fn push_changes_to_remote(
    session: &mut Session,
    client: &SheetsClient,
    spreadsheet_id: &str,
    gid: Option<&str>,
) -> Response {
    if session.document().columns().is_empty() {
        return Response::error(ERR_VALIDATION, "no document loaded");
    }
    let changes = session.changes();
    if changes.is_empty() {
        return Response::ChangesPushed { updated_cells: 0 };
    }
    let title = match client.sheet_title(spreadsheet_id, gid) {
        Ok(title) => title,
        Err(e) => return sheets_error(e),
    };
    match client.push_changes(spreadsheet_id, &title, session.document().columns(), &changes) {
        Ok(updated_cells) => {
            session.document_mut().mark_clean();
            log::info!("pushed {updated_cells} cell(s) to {spreadsheet_id} ({title})");
            Response::ChangesPushed { updated_cells }
        }
        Err(e) => sheets_error(e),
    }
}

fn sheets_error(err: SheetsError) -> Response {
    let code = match err {
        SheetsError::NotAuthenticated => ERR_VALIDATION,
        SheetsError::UnknownColumn(_) => ERR_NOT_FOUND,
        _ => ERR_REMOTE,
    };
    Response::error(code, err.to_string())
}

fn engine_error(err: EngineError) -> Response {
    Response::error(err.code(), err.to_string())
}

fn row_payload(position: usize, row: &Row) -> RowPayload {
    RowPayload {
        position,
        cells: row.clone(),
    }
}

/// `data.csv` → `data-modified.csv`, mirroring the download naming.
fn export_file_name(source_name: &str) -> String {
    if source_name.is_empty() {
        return "document-modified.csv".to_string();
    }
    match source_name.strip_suffix(".csv") {
        Some(stem) => format!("{stem}-modified.csv"),
        None => format!("{source_name}-modified.csv"),
    }
}
