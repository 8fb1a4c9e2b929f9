use crate::args::HeadersArgs;
use crate::commands::Out;
use crate::model::HeaderCheck;
use crate::statement::read_headers;
use crate::{utils, Result};
use anyhow::Context;
use tracing::debug;

/// Reads the header row of a statement and reports how it compares with the expected columns.
///
/// A mismatch is not an error for this command; the report says what is wrong.
pub async fn headers(args: &HeadersArgs) -> Result<Out<HeaderCheck>> {
    let path = args.file();
    let bytes = utils::read_bytes(path).await?;
    let check = read_headers(bytes.as_slice())
        .with_context(|| format!("Unable to read the headers of {}", path.display()))?;
    debug!("CSV headers found: {:?}", check.found());

    let message = if check.is_match() {
        format!("{} has the expected headers", path.display())
    } else {
        format!("{} does not have the expected headers", path.display())
    };
    Ok(Out::new(message, check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{TestEnv, COFFEE_AND_PAYROLL_CSV};

    #[tokio::test]
    async fn test_headers_match() {
        let env = TestEnv::new().await;
        let path = env.downloaded("jan.csv", COFFEE_AND_PAYROLL_CSV).await;
        let out = headers(&HeadersArgs::new(&path)).await.unwrap();
        assert!(out.structure().unwrap().is_match());
        assert!(out.message().contains("has the expected headers"));
    }

    #[tokio::test]
    async fn test_headers_mismatch() {
        let env = TestEnv::new().await;
        let path = env
            .downloaded("other.csv", "Date,Description,Amount\n01/05/2024,Coffee,-4.50\n")
            .await;
        let out = headers(&HeadersArgs::new(&path)).await.unwrap();
        let check = out.structure().unwrap();
        assert!(!check.is_match());
        assert_eq!(check.unexpected(), ["Date"]);
        let shown = check.to_string();
        assert!(shown.contains("Missing:"));
        assert!(shown.contains("Posting Date"));
    }

    #[tokio::test]
    async fn test_headers_empty_file() {
        let env = TestEnv::new().await;
        let path = env.downloaded("empty.csv", "").await;
        assert!(headers(&HeadersArgs::new(&path)).await.is_err());
    }
}
