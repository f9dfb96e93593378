use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use inbox_core::{
    EnglishTitles, FsInbox, InboxError, InboxRoots, ResolveOptions,
    DEFAULT_MAX_VISIBLE_PARTICIPANTS, inbox_view_to_raw_json, mark_notification_read,
    notification_to_raw_json, render_inbox_markdown, render_notification_markdown, resolve_inbox,
    resolve_notification,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "inbox", version, about = "Resolve thread notifications for a viewer")]
struct Cli {
    /// Notification id, as stored under <INBOX_HOME>/notifications/<id>.json
    notification_id: Option<String>,

    /// User the notifications are resolved for
    #[arg(long)]
    viewer: String,

    /// Output raw JSON instead of markdown
    #[arg(long)]
    raw: bool,

    /// Resolve every notification in the inbox, newest first
    #[arg(long)]
    list: bool,

    /// Mark the notification as read once it resolves; nothing is marked
    /// if resolution fails
    #[arg(long)]
    mark_read: bool,

    /// Participants named in a comments title before "N others"
    #[arg(long, default_value_t = DEFAULT_MAX_VISIBLE_PARTICIPANTS)]
    max_participants: usize,

    /// Leave the room name out of titles
    #[arg(long)]
    hide_room: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> inbox_core::Result<()> {
    let roots = InboxRoots::from_env_or_home()?;
    let inbox = FsInbox::new(&roots.data_root);
    let options = ResolveOptions {
        max_visible_participants: cli.max_participants,
    };
    let show_room = !cli.hide_room;
    tracing::debug!(root = %inbox.root().display(), viewer = %cli.viewer, "opened inbox");

    if cli.list {
        if cli.notification_id.is_some() || cli.mark_read {
            return Err(InboxError::InvalidMode(
                "--list cannot be combined with a notification id or --mark-read".to_string(),
            ));
        }

        let view = resolve_inbox(&inbox, &cli.viewer, &options)?;
        if cli.raw {
            print!("{}", inbox_view_to_raw_json(&view)?);
        } else {
            print!("{}", render_inbox_markdown(&view, show_room, &EnglishTitles));
        }
        return Ok(());
    }

    let Some(notification_id) = cli.notification_id.as_deref() else {
        return Err(InboxError::InvalidMode(
            "a notification id is required unless --list is given".to_string(),
        ));
    };

    let mut item = resolve_notification(&inbox, notification_id, &cli.viewer, &options)?;
    if cli.mark_read {
        mark_notification_read(&inbox, notification_id, Utc::now())?;
        item = resolve_notification(&inbox, notification_id, &cli.viewer, &options)?;
    }
    if cli.raw {
        print!("{}", notification_to_raw_json(&item)?);
    } else {
        print!(
            "{}",
            render_notification_markdown(&item, show_room, &EnglishTitles)
        );
    }

    Ok(())
}
