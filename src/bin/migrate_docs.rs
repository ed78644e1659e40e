//! One-time bucket-to-bucket migration of driver documents. Copies every
//! object from the source bucket directory into the destination bucket
//! directory and prints a per-object outcome plus a summary. Not part of the
//! serving path.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        ))
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(source), Some(dest)) = (args.next(), args.next()) else {
        eprintln!("usage: migrate_docs <source-bucket-dir> <dest-bucket-dir>");
        return std::process::ExitCode::from(2);
    };

    match migrate(Path::new(&source), Path::new(&dest)) {
        Ok((copied, failed)) => {
            tracing::info!(copied, failed, "migration finished");
            if failed > 0 {
                std::process::ExitCode::FAILURE
            } else {
                std::process::ExitCode::SUCCESS
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "migration aborted");
            std::process::ExitCode::FAILURE
        }
    }
}

fn migrate(source: &Path, dest: &Path) -> std::io::Result<(usize, usize)> {
    fs::create_dir_all(dest)?;

    let mut copied = 0;
    let mut failed = 0;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let target = dest.join(entry.file_name());
        match fs::copy(entry.path(), &target) {
            Ok(_) => {
                copied += 1;
                tracing::info!(object = %entry.file_name().to_string_lossy(), "copied");
            }
            Err(err) => {
                // One bad object must not abort the rest of the migration.
                failed += 1;
                tracing::error!(
                    object = %entry.file_name().to_string_lossy(),
                    error = %err,
                    "copy failed"
                );
            }
        }
    }

    Ok((copied, failed))
}
