use crate::availability::SessionCredential;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};

/// Blank input means `today`; otherwise a `YYYY-MM-DD` date
pub fn parse_start_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Some(today);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Line-based terminal questions for the two run inputs
pub struct Prompt<R, W> {
    lines: Lines<BufReader<R>>,
    out: W,
}

impl<R, W> Prompt<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: BufReader::new(input).lines(),
            out,
        }
    }

    /// Print `question` and read one line; `None` at end of input
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.out
            .write_all(question.as_bytes())
            .await
            .context("Failed to write prompt")?;
        self.out.flush().await.context("Failed to flush prompt")?;

        let line = self
            .lines
            .next_line()
            .await
            .context("Failed to read from stdin")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    pub async fn read_credential(&mut self) -> Result<SessionCredential> {
        let cookie = self
            .ask("Enter your API cookie (from your browser session): ")
            .await?
            .unwrap_or_default();
        Ok(SessionCredential::new(cookie))
    }

    /// Ask until a valid date is given. End of input falls back to `today`.
    pub async fn read_start_date(&mut self, today: NaiveDate) -> Result<NaiveDate> {
        let question = format!("Select start date [{}]: ", today.format("%Y-%m-%d"));
        loop {
            let Some(answer) = self.ask(&question).await? else {
                return Ok(today);
            };
            match parse_start_date(&answer, today) {
                Some(date) => return Ok(date),
                None => {
                    self.out
                        .write_all(b"Please use the YYYY-MM-DD format.\n")
                        .await
                        .context("Failed to write prompt")?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test_case("", Some(today()); "blank is today")]
    #[test_case("  2025-01-01 ", NaiveDate::from_ymd_opt(2025, 1, 1); "explicit date")]
    #[test_case("01/01/2025", None; "wrong format")]
    #[test_case("2025-02-30", None; "impossible date")]
    fn test_parse_start_date(input: &str, expected: Option<NaiveDate>) {
        assert_eq!(parse_start_date(input, today()), expected);
    }

    #[tokio::test]
    async fn test_reads_credential_and_date() {
        let input: &[u8] = b"  session=abc; lang=en  \nnot-a-date\n2025-01-01\n";
        let mut out = Vec::new();
        let mut prompt = Prompt::new(input, &mut out);

        let credential = prompt.read_credential().await.unwrap();
        let date = prompt.read_start_date(today()).await.unwrap();

        assert_eq!(credential.as_str(), "session=abc; lang=en");
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Please use the YYYY-MM-DD format."));
        assert_eq!(shown.matches("Select start date [2026-10-18]").count(), 2);
    }

    #[tokio::test]
    async fn test_end_of_input() {
        let input: &[u8] = b"";
        let mut prompt = Prompt::new(input, tokio::io::sink());

        assert!(prompt.read_credential().await.unwrap().is_empty());
        assert_eq!(prompt.read_start_date(today()).await.unwrap(), today());
    }
}
