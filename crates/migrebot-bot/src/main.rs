use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use migrebot_bot::{logging, Cli, Handler, Inbound, Reply};
use migrebot_core::{Diary, MemoryCache};

fn main() -> Result<()> {
    let cli = Cli::load();
    logging::init_with_level(&cli.log_level);

    let diary = Diary::open(&cli.database_path)
        .with_context(|| format!("opening {}", cli.database_path.display()))?;

    if cli.check {
        tracing::info!(database = %cli.database_path.display(), "Check succeeded");
        return Ok(());
    }

    fs::create_dir_all(&cli.export_dir)
        .with_context(|| format!("creating {}", cli.export_dir.display()))?;

    let handler = Handler::new(diary, Arc::new(MemoryCache::new()), cli.settings());
    let profile = cli.profile();
    tracing::info!(user_id = cli.user_id, "Reading commands from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let inbound = Inbound::new(cli.user_id, profile.clone(), line);

        match handler.handle(&inbound) {
            Some(Reply::Text(text)) => writeln!(stdout, "{}\n", text)?,
            Some(Reply::Document { file, caption }) => {
                let path = write_export(&cli.export_dir, &file.filename, &file.bytes)?;
                writeln!(
                    stdout,
                    "{}\n📎 {} ({})\n",
                    caption,
                    path.display(),
                    file.format.mime_type()
                )?;
            }
            None => {}
        }
        stdout.flush()?;
    }

    Ok(())
}

fn write_export(dir: &Path, filename: &str, bytes: &[u8]) -> Result<std::path::PathBuf> {
    let path = dir.join(filename);
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
