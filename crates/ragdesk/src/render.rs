//! Terminal rendering of page events.

use ragdesk_client::api::FileRecord;
use ragdesk_client::page::{PageEvent, SourceLine, StatusLevel};
use ragdesk_client::Route;
use tokio::sync::mpsc::UnboundedReceiver;

/// Drain `rx` until every sender is gone.
///
/// Navigation is printed last, after the output of the page it leaves.
pub async fn drain(mut rx: UnboundedReceiver<PageEvent>) -> Option<Route> {
    let mut redirect = None;

    while let Some(event) = rx.recv().await {
        match event {
            PageEvent::ControlEnabled { control, enabled } => {
                tracing::trace!(?control, enabled, "Control state changed");
            }
            PageEvent::Status { level, text } => match level {
                StatusLevel::Info | StatusLevel::Success => println!("{}", text),
                StatusLevel::Warning => eprintln!("warning: {}", text),
                StatusLevel::Error => eprintln!("error: {}", text),
            },
            PageEvent::UserMessage(message) => println!("> {}", message),
            PageEvent::Answer { text, sources } => print!("{}", answer_block(&text, &sources)),
            PageEvent::FileTable(files) => print!("{}", file_table(&files)),
            PageEvent::Redirect(route) => redirect = Some(route),
        }
    }

    if let Some(route) = redirect {
        eprintln!("{}", redirect_hint(route));
    }
    redirect
}

fn redirect_hint(route: Route) -> &'static str {
    match route {
        Route::Login => "Sign in with: ragdesk login --email <EMAIL>",
        Route::Chat => "Ask a question with: ragdesk chat <MESSAGE>",
        Route::Admin => "Manage documents with: ragdesk files list",
    }
}

pub fn answer_block(text: &str, sources: &[SourceLine]) -> String {
    let mut out = format!("\n{}\n", text);
    if !sources.is_empty() {
        out.push_str("\nSources:\n");
        for source in sources {
            out.push_str(&format!("  - {} ({})\n", source.file_name, source.similarity));
        }
    }
    out
}

pub fn file_table(files: &[FileRecord]) -> String {
    if files.is_empty() {
        return "No files uploaded yet.\n".to_string();
    }

    let name_width = files
        .iter()
        .map(|f| f.file_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = format!(
        "{:<36}  {:<name_width$}  {:<8}  {:>6}  {}\n",
        "ID", "NAME", "STATUS", "CHUNKS", "CREATED"
    );
    for file in files {
        out.push_str(&format!(
            "{:<36}  {:<name_width$}  {:<8}  {:>6}  {}\n",
            file.id,
            file.file_name,
            file.status.as_str(),
            file.chunk_count,
            file.created_at
        ));
        if let Some(error) = &file.error_message {
            out.push_str(&format!("{:36}  error: {}\n", "", error));
        }
    }
    out
}
