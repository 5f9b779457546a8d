// watch: poll the input and re-print the summary when its content changes

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::Local;
use prtrack_io::DatasetCache;

use crate::exit_codes::{EXIT_CONFIG, EXIT_NO_INPUT};
use crate::{print_text, summary_text, CliError, Context};

pub fn cmd_watch(
    ctx: &Context,
    input: Option<PathBuf>,
    interval: u64,
    max_cycles: Option<u64>,
) -> Result<(), CliError> {
    let mut cache = DatasetCache::new(ctx.options.clone());
    let mut shown = None;
    let mut last_problem: Option<String> = None;
    let mut cycle = 0u64;

    loop {
        cycle += 1;

        let polled = ctx.input_path(input.clone()).and_then(|path| {
            cache.get_or_load(&path).map_err(CliError::from_load)
        });

        match polled {
            Ok(lookup) => {
                last_problem = None;
                if shown != Some(lookup.hash) {
                    shown = Some(lookup.hash);
                    log::info!("content changed (fresh parse: {})", lookup.fresh);
                    let mut out = format!("[{}] ", Local::now().format("%H:%M:%S"));
                    out.push_str(&summary_text(ctx, &lookup.loaded, false));
                    out.push('\n');
                    print_text(&out)?;
                }
            }
            Err(e) if e.code == EXIT_CONFIG => return Err(e),
            Err(e) => {
                // Report each distinct problem once, then keep polling
                if last_problem.as_deref() != Some(e.message.as_str()) {
                    let label = if e.code == EXIT_NO_INPUT { "info" } else { "error" };
                    eprintln!("{label}: {}", e.message);
                    if let Some(hint) = &e.hint {
                        eprintln!("hint:  {hint}");
                    }
                    last_problem = Some(e.message);
                }
                shown = None;
            }
        }

        if max_cycles.is_some_and(|max| cycle >= max) {
            return Ok(());
        }
        thread::sleep(Duration::from_secs(interval));
    }
}
