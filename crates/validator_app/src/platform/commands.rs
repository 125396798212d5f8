use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use validator_core::{Artifact, JobId, Msg};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  file <path>                          choose the CSV file to upload
  column <name>                        set the email column
  submit                               upload and start validation
  page <n> | next | prev               move between result pages
  limit <n>                            results per page
  delete <id>                          delete a result
  download <id> <report|valid|invalid> save an artifact of a completed job
  refresh                              reload the current page
  help                                 show this text
  quit                                 exit";

/// Parses a prompt line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let input = match command.to_ascii_lowercase().as_str() {
        "file" => {
            if rest.is_empty() {
                bail!("usage: file <path>");
            }
            Input::Msg(Msg::FileSelected(PathBuf::from(rest)))
        }
        "column" => Input::Msg(Msg::EmailColumnChanged(rest.to_string())),
        "submit" => Input::Msg(Msg::SubmitClicked),
        "page" => Input::Msg(Msg::PageRequested(number(rest, "page <n>")?)),
        "next" => Input::Msg(Msg::NextPage),
        "prev" => Input::Msg(Msg::PrevPage),
        "limit" => Input::Msg(Msg::LimitChanged(number(rest, "limit <n>")?)),
        "delete" => Input::Msg(Msg::DeleteClicked {
            job_id: job_id(rest, "delete <id>")?,
        }),
        "download" => {
            let mut parts = rest.split_whitespace();
            let usage = "download <id> <report|valid|invalid>";
            let (Some(id), Some(artifact), None) = (parts.next(), parts.next(), parts.next())
            else {
                bail!("usage: {usage}");
            };
            Input::Msg(Msg::DownloadClicked {
                job_id: JobId::from(id),
                artifact: artifact.parse::<Artifact>().map_err(|err| anyhow!(err))?,
            })
        }
        "refresh" => Input::Msg(Msg::Refresh),
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => bail!("unknown command `{other}`; type `help` for a list"),
    };
    Ok(Some(input))
}

fn number(arg: &str, usage: &str) -> anyhow::Result<u32> {
    arg.parse()
        .with_context(|| format!("usage: {usage} (got `{arg}`)"))
}

fn job_id(arg: &str, usage: &str) -> anyhow::Result<JobId> {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        bail!("usage: {usage}");
    }
    Ok(JobId::from(arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(line: &str) -> Msg {
        match parse_line(line).unwrap() {
            Some(Input::Msg(msg)) => msg,
            other => panic!("{line:?} parsed as {other:?}"),
        }
    }

    #[test]
    fn form_commands_keep_arguments_verbatim() {
        assert_eq!(
            msg("file  /home/ada/My Lists/contacts.csv "),
            Msg::FileSelected(PathBuf::from("/home/ada/My Lists/contacts.csv"))
        );
        assert_eq!(
            msg("column Email Address"),
            Msg::EmailColumnChanged("Email Address".into())
        );
        assert_eq!(msg("column"), Msg::EmailColumnChanged(String::new()));
        assert_eq!(msg("SUBMIT"), Msg::SubmitClicked);
    }

    #[test]
    fn paging_commands() {
        assert_eq!(msg("page 3"), Msg::PageRequested(3));
        assert_eq!(msg("next"), Msg::NextPage);
        assert_eq!(msg("prev"), Msg::PrevPage);
        assert_eq!(msg("limit 50"), Msg::LimitChanged(50));
        assert_eq!(msg("refresh"), Msg::Refresh);
    }

    #[test]
    fn row_commands() {
        assert_eq!(
            msg("delete 665f1c"),
            Msg::DeleteClicked {
                job_id: JobId::from("665f1c")
            }
        );
        assert_eq!(
            msg("download 665f1c Valid"),
            Msg::DownloadClicked {
                job_id: JobId::from("665f1c"),
                artifact: Artifact::Valid,
            }
        );
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("help").unwrap(), Some(Input::Help));
        assert_eq!(parse_line("quit").unwrap(), Some(Input::Quit));
        assert_eq!(parse_line("exit").unwrap(), Some(Input::Quit));
    }

    #[test]
    fn malformed_commands_are_errors() {
        for line in [
            "file",
            "page",
            "page two",
            "limit -5",
            "delete",
            "delete a b",
            "download 665f1c",
            "download 665f1c pdf",
            "download 665f1c report extra",
            "launch",
        ] {
            assert!(parse_line(line).is_err(), "{line:?} should be rejected");
        }
    }
}
