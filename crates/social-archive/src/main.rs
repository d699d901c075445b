mod bootstrap;
mod report;

use std::io::Write;

use anyhow::Result;
use archive_core::settings::{Command, Settings};
use archive_core::time_utils::resolve_timezone;
use archive_data::analysis::analyze_messages;
use archive_data::follows::FollowSetReconciler;
use report::View;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Social Archive v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Timezone: {}, Format: {}",
        settings.timezone,
        settings.format
    );

    let tz = resolve_timezone(&settings.timezone);
    let json = settings.format == "json";
    let mut out = std::io::stdout().lock();

    match &settings.command {
        Command::Messages { paths, view } => {
            let analysis = analyze_messages(paths, tz);
            let view = View::parse(view);
            if json {
                report::write_messages_json(&mut out, &analysis, view)?;
            } else {
                report::write_messages_text(
                    &mut out,
                    &analysis,
                    view,
                    usize::from(settings.bar_width),
                )?;
            }
        }

        Command::Unfollowers {
            following,
            followers,
        } => match FollowSetReconciler::reconcile(following, followers) {
            Ok(names) => {
                tracing::info!("{} accounts do not follow back", names.len());
                if json {
                    report::write_unfollowers_json(&mut out, &names)?;
                } else {
                    report::write_unfollowers_text(&mut out, &names)?;
                }
            }
            Err(e) => {
                tracing::warn!("Error analyzing follow lists: {}", e);
                report::write_follow_failure(&mut out, &e, json)?;
            }
        },
    }

    out.flush()?;
    Ok(())
}
