use crate::args::UploadArgs;
use crate::commands::Out;
use crate::statement::read_headers;
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use std::path::PathBuf;
use tracing::{debug, info};

/// Copies a statement into the uploads directory after checking that it is one we can read.
///
/// # Errors
/// - The file does not have an allowed extension.
/// - The file name has nothing usable left after sanitizing.
/// - The header row is not the expected statement layout.
pub async fn upload(config: Config, args: &UploadArgs) -> Result<Out<PathBuf>> {
    let source = args.file();
    debug!("File upload attempt started for {}", source.display());

    if !config.is_allowed(source) {
        bail!(
            "Invalid file type '{}'. Please upload a {} file.",
            source.display(),
            config.allowed_extensions().join(" or ").to_uppercase()
        )
    }

    let original_name = source
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = secure_filename(&original_name);
    if name.is_empty() {
        bail!("Unable to make a safe file name from '{}'", source.display())
    }

    let bytes = utils::read_bytes(source).await?;
    let check = read_headers(bytes.as_slice())
        .with_context(|| format!("Unable to read the headers of {}", source.display()))?;
    debug!("CSV headers found: {:?}", check.found());
    check.into_result().with_context(|| {
        format!(
            "{} is not a statement we can read, run 'budget headers {}' for details",
            source.display(),
            source.display()
        )
    })?;

    let destination = config.uploads().join(&name);
    let size = utils::copy(source, &destination).await?;
    info!("File size: {size} bytes");

    Ok(Out::new(
        format!("File uploaded successfully: {name}"),
        destination,
    ))
}

/// Reduces a file name to ASCII letters, digits, `.`, `-` and `_` so that it is safe to store.
fn secure_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    replaced.trim_matches(|c| c == '.' || c == '_').to_string()
}
