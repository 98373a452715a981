// LinkGrid CLI - hyperlink-aware tabular editing, headless.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use linkgrid_cli::{server, CliError, EXIT_SUCCESS};
use linkgrid_engine::{links, Document, LinkIndex};
use linkgrid_io::{read_document_from_path, write_document};
use linkgrid_sheets::{
    clear_credentials, save_credentials, values_to_rows, Credentials, SheetsClient,
};

#[derive(Parser)]
#[command(name = "lgrid")]
#[command(about = "Hyperlink-aware tabular document editor (headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSONL session server
    ///
    /// One shared editing session over TCP localhost; see the protocol
    /// crate for the wire format.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value_t = 4317, env = "LGRID_PORT")]
        port: u16,
    },

    /// List the positions of rows whose designated columns contain a link
    Links {
        file: PathBuf,

        /// Link columns, in scan order
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Emit a JSON array instead of one position per line
        #[arg(long)]
        json: bool,
    },

    /// Replace the href of one anchor inside one cell
    ReplaceHref {
        file: PathBuf,

        #[arg(long)]
        row: usize,

        #[arg(long)]
        column: String,

        /// 0-based anchor ordinal within the cell, in document order
        #[arg(long, default_value_t = 0)]
        ordinal: usize,

        #[arg(long)]
        href: String,

        /// Output path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Round-trip a CSV through load/export (normalizes quoting)
    Export {
        file: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store an API token for remote sheet access
    Login {
        #[arg(long, env = "LGRID_SHEETS_TOKEN")]
        token: String,

        #[arg(long)]
        api_base: Option<String>,
    },

    /// Remove stored remote credentials
    Logout,

    /// Fetch a remote sheet and write it as CSV
    Pull {
        spreadsheet_id: String,

        /// Sheet tab gid (defaults to the first tab)
        #[arg(long)]
        gid: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { host, port } => cmd_serve(host, port),
        Commands::Links { file, columns, json } => cmd_links(&file, columns, json),
        Commands::ReplaceHref { file, row, column, ordinal, href, output } => {
            cmd_replace_href(&file, row, &column, ordinal, &href, output.as_deref())
        }
        Commands::Export { file, output } => cmd_export(&file, output.as_deref()),
        Commands::Login { token, api_base } => cmd_login(token, api_base),
        Commands::Logout => cmd_logout(),
        Commands::Pull { spreadsheet_id, gid, output } => {
            cmd_pull(&spreadsheet_id, gid.as_deref(), output.as_deref())
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.code)
        }
    }
}

fn cmd_serve(host: String, port: u16) -> Result<(), CliError> {
    server::run(&server::ServerConfig { host, port })
        .map_err(|e| CliError::error(format!("server failed: {e}")))
}

fn cmd_links(file: &Path, columns: Vec<String>, json: bool) -> Result<(), CliError> {
    if columns.iter().all(|c| c.trim().is_empty()) {
        return Err(CliError::usage("at least one link column is required"));
    }
    let document = load(file)?;
    let index = LinkIndex::build(document.all_rows(), &columns);

    if json {
        let out = serde_json::to_string(index.positions())
            .map_err(|e| CliError::error(e.to_string()))?;
        println!("{out}");
    } else {
        for position in index.positions() {
            println!("{position}");
        }
    }
    Ok(())
}

fn cmd_replace_href(
    file: &Path,
    row: usize,
    column: &str,
    ordinal: usize,
    href: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let mut document = load(file)?;
    let value = document
        .row(row)
        .and_then(|r| r.get(column))
        .cloned()
        .ok_or_else(|| CliError::error(format!("no cell at row {row}, column '{column}'")))?;

    let link_count = links::extract_links(&value).count();
    if ordinal >= link_count {
        return Err(CliError::error(format!(
            "cell has {link_count} link(s); ordinal {ordinal} is out of range"
        )));
    }

    let replaced = links::replace_href(&value, ordinal, href);
    document
        .update_cell(row, column, &replaced)
        .map_err(|e| CliError::error(e.to_string()))?;
    emit(&document, output)
}

fn cmd_export(file: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let document = load(file)?;
    emit(&document, output)
}

fn cmd_login(token: String, api_base: Option<String>) -> Result<(), CliError> {
    let creds = Credentials::new(token, api_base);
    save_credentials(&creds).map_err(CliError::error)?;
    eprintln!("Credentials saved");
    Ok(())
}

fn cmd_logout() -> Result<(), CliError> {
    clear_credentials().map_err(CliError::error)?;
    eprintln!("Credentials removed");
    Ok(())
}

fn cmd_pull(
    spreadsheet_id: &str,
    gid: Option<&str>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let client = SheetsClient::from_saved_credentials()
        .map_err(|e| CliError::error(e.to_string()))?;
    let title = client
        .sheet_title(spreadsheet_id, gid)
        .map_err(|e| CliError::error(e.to_string()))?;
    let (header, value_rows) = client
        .fetch_values(spreadsheet_id, &title)
        .map_err(|e| CliError::error(e.to_string()))?;

    let rows = values_to_rows(&header, &value_rows);
    let document = Document::from_parts(header, rows, &format!("{title}.csv"))
        .map_err(|e| CliError::error(e.to_string()))?;
    emit(&document, output)
}

fn load(file: &Path) -> Result<Document, CliError> {
    read_document_from_path(file).map_err(|e| CliError::error(e.to_string()))
}

fn emit(document: &Document, output: Option<&Path>) -> Result<(), CliError> {
    let content = write_document(document).map_err(|e| CliError::error(e.to_string()))?;
    match output {
        Some(path) => {
            std::fs::write(path, content).map_err(|e| CliError::error(e.to_string()))?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}
