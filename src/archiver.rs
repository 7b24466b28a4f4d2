use std::path::Path;

use crate::Result;
use crate::cli::Cli;
use crate::export::{messages_to_json, write_to_file};
use crate::files::{Files, HttpFetcher};
use crate::formatter::Slack;
use crate::models::Message;
use crate::settings::Settings;
use crate::slack::Api;
use crate::status::Status;

/// Which exports were requested, relative to the output directory.
#[derive(Debug, Clone, Copy)]
pub struct ExportTargets<'a> {
    pub output_dir: &'a Path,
    pub json: Option<&'a str>,
    pub text: Option<&'a str>,
}

/// Run a full archive: history, name maps, exports, then file downloads.
///
/// API and network failures abort the run. Export and download failures are
/// printed and recorded in the returned [`Status`].
pub fn run(cli: &Cli) -> Result<Status> {
    let settings = Settings::load(&cli.settings)?;
    let start = cli.start_date()?;
    let end = cli.end_date()?;
    let api = Api::new(&cli.token, settings.api);

    println!("Retrieving message history for {}", cli.dm);
    let mut messages = api.get_conv_history(&cli.dm, start, end)?;
    messages.reverse();
    tracing::info!(dm = %cli.dm, count = messages.len(), "Fetched message history");

    println!();
    println!("Retrieving user mappings");
    let user_map = api.get_user_map()?;
    println!("Retrieving conversation mappings");
    let conversation_map = api.get_conversation_map(&user_map)?;
    tracing::info!(
        users = user_map.len(),
        conversations = conversation_map.len(),
        "Built name mappings"
    );

    let slack = Slack::new(&user_map, &conversation_map, cli.date_format);
    let output_dir = cli.output_dir();
    let targets = ExportTargets {
        output_dir: &output_dir,
        json: cli.json.as_deref(),
        text: cli.text.as_deref(),
    };

    let mut status = Status::new();
    export_history(&targets, &messages, &slack, &mut status);

    if let Some(dir) = &cli.files {
        println!("\nRetrieving list of ALL files uploaded to slack");
        let file_list = api.get_file_list(&cli.dm, start, end)?;
        println!("Found {} file(s) that were sent in {}", file_list.len(), cli.dm);

        let files = Files::new(HttpFetcher::new(&cli.token), dir, cli.files_overwrite);
        files.download_files(&file_list, &mut status);
    }

    tracing::info!(%status, "Archive finished");
    status.print_warnings();
    Ok(status)
}

/// Write the requested JSON and text exports. A failed JSON export does not
/// prevent the text export from being attempted.
pub fn export_history(
    targets: &ExportTargets<'_>,
    messages: &[Message],
    slack: &Slack<'_>,
    status: &mut Status,
) {
    if let Some(file) = targets.json {
        println!("Exporting raw json");
        let result = messages_to_json(messages)
            .and_then(|json| write_to_file(targets.output_dir, file, &json));
        if let Err(e) = result {
            println!("{}", e);
            status.export_json_failed = true;
        }
    }

    if let Some(file) = targets.text {
        println!("Formatting text");
        let formatted = slack.format_messages(messages);
        println!("Exporting text");
        if let Err(e) = write_to_file(targets.output_dir, file, &formatted) {
            println!("{}", e);
            status.export_text_failed = true;
        }
    }
}
