//! End-to-end request dispatch against a real session: the load →
//! designate → navigate → edit → export → audit flow a client drives.

use httpmock::prelude::*;
use linkgrid_cli::server::{handle_request, push_changes_to_remote};
use linkgrid_engine::Session;
use linkgrid_protocol::{Request, Response};
use linkgrid_sheets::{Credentials, SheetsClient};

const SAMPLE_CSV: &str = "Body\n\"<a href='x'>t</a>\"\nplain\n\"<a href=\"\"y\"\">t2</a>\"\n";

fn loaded_session() -> Session {
    let mut session = Session::new();
    let response = handle_request(
        &mut session,
        Request::Load {
            content: SAMPLE_CSV.into(),
            source_name: "sample.csv".into(),
        },
    );
    match response {
        Response::Loaded { row_count, .. } => assert_eq!(row_count, 3),
        other => panic!("load failed: {other:?}"),
    }
    session
}

fn designate(session: &mut Session) {
    let response = handle_request(
        session,
        Request::SetLinkColumns { columns: vec!["Body".into()] },
    );
    match response {
        Response::LinkColumnsSet { link_rows, columns } => {
            assert_eq!(link_rows, 2);
            assert_eq!(columns, vec!["Body".to_string()]);
        }
        other => panic!("designation failed: {other:?}"),
    }
}

fn next_link(session: &mut Session, from: i64) -> Option<usize> {
    match handle_request(session, Request::NextLink { from }) {
        Response::LinkPosition { position } => position,
        other => panic!("unexpected response: {other:?}"),
    }
}

fn prev_link(session: &mut Session, from: i64) -> Option<usize> {
    match handle_request(session, Request::PrevLink { from }) {
        Response::LinkPosition { position } => position,
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn test_navigation_scenario() {
    let mut session = loaded_session();
    designate(&mut session);

    match handle_request(&mut session, Request::LinkRows) {
        Response::LinkRowList { positions } => assert_eq!(positions, vec![0, 2]),
        other => panic!("unexpected response: {other:?}"),
    }

    assert_eq!(next_link(&mut session, -1), Some(0));
    assert_eq!(next_link(&mut session, 0), Some(2));
    assert_eq!(next_link(&mut session, 2), None);
    assert_eq!(prev_link(&mut session, 2), Some(0));
    assert_eq!(prev_link(&mut session, 3), Some(2));
    assert_eq!(prev_link(&mut session, 0), None);
}

#[test]
fn test_edit_rebuilds_index_and_audits() {
    let mut session = loaded_session();
    designate(&mut session);

    let response = handle_request(
        &mut session,
        Request::UpdateCell {
            position: 1,
            column: "Body".into(),
            value: "<a href='z'>new</a>".into(),
        },
    );
    match response {
        Response::CellUpdated { is_dirty, dirty_count, link_rows } => {
            assert!(is_dirty);
            assert_eq!(dirty_count, 1);
            // Edited column is designated, so the server rebuilt the index.
            assert_eq!(link_rows, 3);
        }
        other => panic!("update failed: {other:?}"),
    }

    match handle_request(&mut session, Request::Changes) {
        Response::ChangeList { changes } => {
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].position, 1);
            assert_eq!(changes[0].column, "Body");
            assert_eq!(changes[0].original, "plain");
            assert_eq!(changes[0].current, "<a href='z'>new</a>");
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn test_noop_update_leaves_dirty_state() {
    let mut session = loaded_session();
    let response = handle_request(
        &mut session,
        Request::UpdateCell {
            position: 1,
            column: "Body".into(),
            value: "plain".into(),
        },
    );
    match response {
        Response::CellUpdated { is_dirty, dirty_count, .. } => {
            assert!(!is_dirty);
            assert_eq!(dirty_count, 0);
        }
        other => panic!("update failed: {other:?}"),
    }
    match handle_request(&mut session, Request::Changes) {
        Response::ChangeList { changes } => assert!(changes.is_empty()),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn test_update_errors_are_not_found() {
    let mut session = loaded_session();
    for request in [
        Request::UpdateCell { position: 9, column: "Body".into(), value: "x".into() },
        Request::UpdateCell { position: 0, column: "Nope".into(), value: "x".into() },
        Request::Row { position: 9 },
    ] {
        match handle_request(&mut session, request) {
            Response::Error { code, .. } => assert_eq!(code, "not_found"),
            other => panic!("expected not_found, got {other:?}"),
        }
    }
    // Failed updates left nothing dirty.
    assert!(!session.document().is_dirty());
}

#[test]
fn test_rows_paging_clamps() {
    let mut session = loaded_session();
    match handle_request(&mut session, Request::Rows { start: 1, count: 50 }) {
        Response::Rows { rows } => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].position, 1);
            assert_eq!(rows[1].position, 2);
        }
        other => panic!("unexpected response: {other:?}"),
    }
    match handle_request(&mut session, Request::Rows { start: 10, count: 5 }) {
        Response::Rows { rows } => assert!(rows.is_empty()),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn test_export_round_trips_and_names_file() {
    let mut session = loaded_session();
    match handle_request(&mut session, Request::Export) {
        Response::Exported { content, file_name } => {
            assert_eq!(file_name, "sample-modified.csv");
            // Data round-trips: reloading the export matches the document.
            let reloaded = linkgrid_io::read_document(&content, "x.csv").unwrap();
            assert_eq!(reloaded.all_rows(), session.document().all_rows());
            assert_eq!(reloaded.columns(), session.document().columns());
        }
        other => panic!("export failed: {other:?}"),
    }
}

#[test]
fn test_set_link_columns_empty_is_validation_error() {
    let mut session = loaded_session();
    match handle_request(&mut session, Request::SetLinkColumns { columns: vec![] }) {
        Response::Error { code, .. } => assert_eq!(code, "validation"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_metadata_snapshot() {
    let mut session = loaded_session();
    designate(&mut session);
    match handle_request(&mut session, Request::Metadata) {
        Response::Metadata(meta) => {
            assert_eq!(meta.row_count, 3);
            assert_eq!(meta.columns, vec!["Body".to_string()]);
            assert_eq!(meta.link_rows, 2);
            assert_eq!(meta.source_name, "sample.csv");
            assert_eq!(meta.link_columns, vec!["Body".to_string()]);
            assert!(!meta.is_dirty);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[test]
fn test_ping() {
    let mut session = Session::new();
    assert!(matches!(
        handle_request(&mut session, Request::Ping),
        Response::Pong
    ));
}

fn mock_client(api_base: String) -> SheetsClient {
    SheetsClient::new(Credentials::new("tok".into(), Some(api_base)))
}

#[test]
fn test_push_flushes_dirty_rows_but_keeps_audit() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/sid");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "sheets": [{ "properties": { "sheetId": 0, "title": "Data" } }]
            }));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/v4/spreadsheets/sid/values:batchUpdate")
            .body_includes(r#""range":"Data!A3""#);
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({ "totalUpdatedCells": 1 }));
    });

    let mut session = loaded_session();
    handle_request(
        &mut session,
        Request::UpdateCell {
            position: 2,
            column: "Body".into(),
            value: "edited".into(),
        },
    );
    assert!(session.document().is_dirty());

    let client = mock_client(server.base_url());
    match push_changes_to_remote(&mut session, &client, "sid", None) {
        Response::ChangesPushed { updated_cells } => assert_eq!(updated_cells, 1),
        other => panic!("push failed: {other:?}"),
    }
    update.assert();

    // The dirty set is cleared; the change log survives the flush.
    assert!(!session.document().is_dirty());
    assert_eq!(session.changes().len(), 1);
}

#[test]
fn test_push_with_no_changes_skips_network() {
    // Any request would error against an unreachable address.
    let mut session = loaded_session();
    let client = mock_client("http://127.0.0.1:1".into());
    match push_changes_to_remote(&mut session, &client, "sid", None) {
        Response::ChangesPushed { updated_cells } => assert_eq!(updated_cells, 0),
        other => panic!("push failed: {other:?}"),
    }
}

#[test]
fn test_push_without_document_is_validation_error() {
    let mut session = Session::new();
    let client = mock_client("http://127.0.0.1:1".into());
    match push_changes_to_remote(&mut session, &client, "sid", None) {
        Response::Error { code, .. } => assert_eq!(code, "validation"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn test_push_maps_remote_http_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v4/spreadsheets/sid");
        then.status(403).body("forbidden");
    });

    let mut session = loaded_session();
    handle_request(
        &mut session,
        Request::UpdateCell {
            position: 1,
            column: "Body".into(),
            value: "edited".into(),
        },
    );

    let client = mock_client(server.base_url());
    match push_changes_to_remote(&mut session, &client, "sid", None) {
        Response::Error { code, .. } => assert_eq!(code, "remote_error"),
        other => panic!("expected error, got {other:?}"),
    }
    // A failed push clears nothing.
    assert!(session.document().is_dirty());
}
